use std::fs;
use std::io::{self, Write};
use std::time::Duration;

use humantime::format_duration;
use log::debug;

use super::{FunctionStats, LineStats};

const LINE_TABLE_HEADERS: &[&str] = &[
    "Line #",
    "Hits",
    "Time",
    "Per Hit",
    "% Time",
    "Line Contents",
];
const SUMMARY_HEADERS: &[&str] = &["Function", "Location", "Hits", "Duration", "% Time"];

/// How a [`LineStats`] is rendered by [`show_text`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ReportOptions {
    /// Seconds per displayed time unit. Defaults to the unit the stats were recorded in.
    pub output_unit: Option<f64>,
    /// Skip functions that recorded no time at all.
    pub strip_zeros: bool,
    /// Append a one-row-per-function summary table.
    pub summarize: bool,
}

impl ReportOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn output_unit(mut self, unit: f64) -> Self {
        self.output_unit = Some(unit);
        self
    }

    #[must_use]
    pub fn strip_zeros(mut self, strip_zeros: bool) -> Self {
        self.strip_zeros = strip_zeros;
        self
    }

    #[must_use]
    pub fn summarize(mut self, summarize: bool) -> Self {
        self.summarize = summarize;
        self
    }
}

/// Writes an annotated listing of every function in `stats` to `out`, followed by a summary table
/// if requested.
///
/// # Errors
///
/// Returns any error from writing to `out`.
pub fn show_text<W: Write>(stats: &LineStats, out: &mut W, options: &ReportOptions) -> io::Result<()> {
    let output_unit = options.output_unit.unwrap_or(stats.unit);
    writeln!(out, "Timer unit: {output_unit:e} s")?;

    for function in &stats.functions {
        if options.strip_zeros && function.total_time() == 0 {
            continue;
        }
        writeln!(out)?;
        show_function(function, stats.unit, output_unit, out)?;
    }

    if options.summarize {
        writeln!(out)?;
        show_summary(stats, out)?;
    }
    Ok(())
}

/// Writes the listing of a single function.
fn show_function<W: Write>(
    function: &FunctionStats,
    unit: f64,
    output_unit: f64,
    out: &mut W,
) -> io::Result<()> {
    #[allow(clippy::cast_precision_loss)]
    let total_time = function.total_time() as f64 * unit;
    writeln!(out, "Total time: {total_time:.6} s")?;
    writeln!(out, "File: {}", function.filename)?;
    writeln!(
        out,
        "Function: {} at line {}",
        function.name, function.first_line
    )?;

    let source = load_source(&function.filename);
    if source.is_none() {
        writeln!(out)?;
        writeln!(out, "Could not find file {}", function.filename)?;
        writeln!(
            out,
            "Are you sure you are running this program from the same directory"
        )?;
        writeln!(out, "that you ran the profiler from?")?;
        writeln!(out, "Continuing without the function's contents.")?;
    }
    writeln!(out)?;

    let recorded = function.lines.iter().map(|record| record.line);
    let (Some(first_recorded), Some(last_line)) = (recorded.clone().min(), recorded.max()) else {
        return Ok(());
    };
    let first_line = function.first_line.min(first_recorded);
    let scale = unit / output_unit;
    #[allow(clippy::cast_precision_loss)]
    let function_time = function.total_time() as f64;

    let mut rows = vec![LINE_TABLE_HEADERS
        .iter()
        .map(|s| (*s).to_string())
        .collect::<Vec<_>>()];
    for line in first_line..=last_line {
        let contents = source
            .as_ref()
            .zip((line as usize).checked_sub(1))
            .and_then(|(source, index)| source.get(index))
            .map(|text| text.trim_end().to_string())
            .unwrap_or_default();
        let cells = match function.lines.iter().find(|record| record.line == line) {
            Some(record) => {
                #[allow(clippy::cast_precision_loss)]
                let time = record.time as f64;
                #[allow(clippy::cast_precision_loss)]
                let per_hit = if record.hits > 0 {
                    time / record.hits as f64
                } else {
                    0.0
                };
                let percent = if function_time > 0.0 {
                    time / function_time * 100.0
                } else {
                    0.0
                };
                vec![
                    line.to_string(),
                    format_with_commas(record.hits),
                    format!("{:.1}", time * scale),
                    format!("{:.1}", per_hit * scale),
                    format!("{percent:.1}"),
                    contents,
                ]
            }
            None => vec![
                line.to_string(),
                String::new(),
                String::new(),
                String::new(),
                String::new(),
                contents,
            ],
        };
        rows.push(cells);
    }

    write_formatted_table(out, &rows, '=', Alignment::TrailingText)
}

/// Writes one row per function with its location, hits and total time.
fn show_summary<W: Write>(stats: &LineStats, out: &mut W) -> io::Result<()> {
    #[allow(clippy::cast_precision_loss)]
    let grand_total = stats
        .functions
        .iter()
        .map(|function| function.total_time() as f64)
        .sum::<f64>();

    let mut rows = vec![SUMMARY_HEADERS
        .iter()
        .map(|s| (*s).to_string())
        .collect::<Vec<_>>()];
    let mut functions: Vec<&FunctionStats> = stats.functions.iter().collect();
    functions.sort_by_key(|function| function.total_time());
    for function in functions {
        #[allow(clippy::cast_precision_loss)]
        let time = function.total_time() as f64;
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let duration = Duration::from_nanos((time * stats.unit * 1e9).round() as u64);
        let percent = if grand_total > 0.0 {
            time / grand_total * 100.0
        } else {
            0.0
        };
        rows.push(vec![
            function.name.clone(),
            format!("{}:{}", function.filename, function.first_line),
            format_with_commas(function.total_hits()),
            format_duration(duration).to_string(),
            format!("{percent:.2}%"),
        ]);
    }
    write_formatted_table(out, &rows, '-', Alignment::LeadingText)
}

/// Which column of a table holds free text. Text columns are left-aligned and unpadded when last;
/// all other columns are right-aligned.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Alignment {
    LeadingText,
    TrailingText,
}

/// Writes a table with aligned columns, using the first row as a header.
/// Automatically adjusts column widths and inserts a separator line.
fn write_formatted_table<W: Write>(
    out: &mut W,
    rows: &[Vec<String>],
    separator: char,
    alignment: Alignment,
) -> io::Result<()> {
    if rows.len() < 2 {
        return Ok(());
    }

    let num_cols = rows[0].len();
    let mut col_widths = vec![0; num_cols];

    // Compute max column widths
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            col_widths[i] = col_widths[i].max(cell.chars().count());
        }
    }

    let write_row = |out: &mut W, row: &[String]| -> io::Result<()> {
        let mut line = String::new();
        for (i, cell) in row.iter().enumerate() {
            let is_text = match alignment {
                Alignment::LeadingText => i == 0,
                Alignment::TrailingText => i + 1 == num_cols,
            };
            if is_text && i + 1 == num_cols {
                line.push_str(cell);
            } else if is_text {
                line.push_str(&format!("{:<width$} ", cell, width = col_widths[i] + 1));
            } else {
                line.push_str(&format!("{:>width$} ", cell, width = col_widths[i] + 1));
            }
        }
        writeln!(out, "{}", line.trim_end())
    };

    write_row(out, &rows[0])?;

    // Separator spans the header
    let total_width: usize = col_widths.iter().map(|w| *w + 2).sum::<usize>();
    writeln!(out, "{}", separator.to_string().repeat(total_width))?;

    for row in &rows[1..] {
        write_row(out, row)?;
    }
    Ok(())
}

/// Reads the lines of `filename`, if it can be read.
fn load_source(filename: &str) -> Option<Vec<String>> {
    match fs::read_to_string(filename) {
        Ok(text) => Some(text.lines().map(str::to_string).collect()),
        Err(error) => {
            debug!("could not read source of {filename}: {error}");
            None
        }
    }
}

/// Formats an integer with thousands separator.
pub fn format_with_commas(value: u64) -> String {
    let s = value.to_string();
    let mut result = String::new();
    let bytes = s.as_bytes();
    let len = bytes.len();

    for (i, &b) in bytes.iter().enumerate() {
        result.push(b as char);
        let digits_left = len - i - 1;
        if digits_left > 0 && digits_left.is_multiple_of(3) {
            result.push(',');
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use tempfile::NamedTempFile;

    use super::*;
    use crate::stats::LineRecord;

    fn sample_stats(filename: &str) -> LineStats {
        LineStats {
            unit: 1e-9,
            functions: vec![
                FunctionStats {
                    filename: filename.to_string(),
                    first_line: 1,
                    name: "f".to_string(),
                    lines: vec![
                        LineRecord {
                            line: 2,
                            hits: 1,
                            time: 3_000,
                        },
                        LineRecord {
                            line: 3,
                            hits: 2,
                            time: 1_000,
                        },
                    ],
                },
                FunctionStats {
                    filename: filename.to_string(),
                    first_line: 10,
                    name: "never_ran".to_string(),
                    lines: vec![],
                },
            ],
        }
    }

    fn render(stats: &LineStats, options: &ReportOptions) -> String {
        let mut out = Vec::new();
        show_text(stats, &mut out, options).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn listing_includes_source_and_timings() {
        let mut source = NamedTempFile::new().unwrap();
        writeln!(source, "def f(x):").unwrap();
        writeln!(source, "    y = x + 10").unwrap();
        writeln!(source, "    return y").unwrap();
        let filename = source.path().to_string_lossy().to_string();

        let text = render(
            &sample_stats(&filename),
            &ReportOptions::new().output_unit(1e-6),
        );
        assert!(text.starts_with("Timer unit: 1e-6 s"));
        assert!(text.contains("Function: f at line 1"));
        assert!(text.contains("Line Contents"));

        let line_2 = text
            .lines()
            .find(|line| line.contains("y = x + 10"))
            .unwrap();
        let cells: Vec<&str> = line_2.split_whitespace().collect();
        // Line #, Hits, Time, Per Hit, % Time, then the source text.
        assert_eq!(&cells[..5], &["2", "1", "3.0", "3.0", "75.0"]);

        let line_3 = text.lines().find(|line| line.contains("return y")).unwrap();
        let cells: Vec<&str> = line_3.split_whitespace().collect();
        assert_eq!(&cells[..5], &["3", "2", "1.0", "0.5", "25.0"]);

        // The function header line has no timings.
        let line_1 = text.lines().find(|line| line.contains("def f(x):")).unwrap();
        assert_eq!(line_1.split_whitespace().next(), Some("1"));
    }

    #[test]
    fn lines_before_the_first_line_are_listed() {
        let stats = LineStats {
            unit: 1e-9,
            functions: vec![FunctionStats {
                filename: "nowhere.rs".to_string(),
                first_line: 10,
                name: "h".to_string(),
                lines: vec![
                    LineRecord {
                        line: 5,
                        hits: 1,
                        time: 900,
                    },
                    LineRecord {
                        line: 12,
                        hits: 1,
                        time: 100,
                    },
                ],
            }],
        };
        let text = render(&stats, &ReportOptions::default());
        let cells = |number: &str| {
            text.lines()
                .map(|line| line.split_whitespace().collect::<Vec<_>>())
                .find(|cells| cells.first() == Some(&number))
                .unwrap()
        };
        assert_eq!(&cells("5")[..5], &["5", "1", "900.0", "900.0", "90.0"]);
        assert_eq!(&cells("12")[..5], &["12", "1", "100.0", "100.0", "10.0"]);
    }

    #[test]
    fn missing_source_is_reported() {
        let text = render(
            &sample_stats("/definitely/not/here.rs"),
            &ReportOptions::default(),
        );
        assert!(text.contains("Could not find file /definitely/not/here.rs"));
        assert!(text.contains("Total time: 0.000004 s"));
    }

    #[test]
    fn strip_zeros_skips_functions_without_time() {
        let stats = sample_stats("nowhere.rs");
        assert!(render(&stats, &ReportOptions::default()).contains("never_ran"));
        assert!(!render(&stats, &ReportOptions::new().strip_zeros(true)).contains("never_ran"));
    }

    #[test]
    fn summary_lists_every_function() {
        let text = render(
            &sample_stats("nowhere.rs"),
            &ReportOptions::new().summarize(true),
        );
        let summary_row = text
            .lines()
            .find(|line| line.starts_with("f ") && line.contains("nowhere.rs:1"))
            .unwrap();
        assert!(summary_row.contains("100.00%"));
        assert!(summary_row.contains("4us"));
        assert!(text.lines().any(|line| line.starts_with("never_ran ")));
    }

    // region Tests for `format_with_commas()`
    #[test]
    fn formats_small_numbers() {
        assert_eq!(format_with_commas(0), "0");
        assert_eq!(format_with_commas(7), "7");
        assert_eq!(format_with_commas(999), "999");
    }

    #[test]
    fn formats_thousands() {
        assert_eq!(format_with_commas(1000), "1,000");
        assert_eq!(format_with_commas(27_171), "27,171");
        assert_eq!(format_with_commas(9_876_543_210), "9,876,543,210");
    }
    // endregion Tests for `format_with_commas()`
}
