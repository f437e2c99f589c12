use lineprof::runtime::Function;
use lineprof::{code, load_stats, show_text, LineProfiler, ReportOptions};
use tempfile::TempDir;

fn checksum() -> Function<u64, u64> {
    Function::new(code!("checksum"), |frame, n: u64| {
        frame.line(line!());
        let mut total = 0;
        for i in 0..n {
            frame.line(line!());
            total = (total + i * 31) % 1_000_003;
        }
        frame.line(line!());
        total
    })
}

fn render(profiler: &LineProfiler, options: &ReportOptions) -> String {
    let mut out = Vec::new();
    profiler.show_text(&mut out, options).unwrap();
    String::from_utf8(out).unwrap()
}

#[test]
fn stats_count_every_line_execution() {
    let checksum = checksum();
    let profiler = LineProfiler::new();
    profiler.wrap(&checksum).call(5);

    let stats = profiler.get_stats();
    let function = stats.function("checksum").unwrap();
    assert_eq!(function.filename, file!());
    let hits: Vec<u64> = function.lines.iter().map(|record| record.hits).collect();
    assert_eq!(hits, vec![1, 5, 1]);
    assert!(function.lines.windows(2).all(|pair| pair[0].line < pair[1].line));
}

#[test]
fn listing_shows_source_lines() {
    let checksum = checksum();
    let profiler = LineProfiler::new();
    profiler.wrap(&checksum).call(3);

    let text = render(&profiler, &ReportOptions::new().output_unit(1e-6));
    assert!(text.starts_with("Timer unit: 1e-6 s"));
    assert!(text.contains(&format!("File: {}", file!())));
    assert!(text.contains("Function: checksum at line"));
    assert!(text.contains("Function::new(code!(\"checksum\")"));

    let loop_row = text
        .lines()
        .find(|line| line.contains("total = (total + i * 31) % 1_000_003;"))
        .unwrap();
    // Not an executed line itself; the row above it is the charged `frame.line` call.
    assert!(loop_row.split_whitespace().nth(1).unwrap().starts_with("total"));

    let charged: Vec<&str> = text
        .lines()
        .filter(|line| line.contains("frame.line(line!());"))
        .collect();
    assert_eq!(charged.len(), 3);
    let hits: Vec<&str> = charged
        .iter()
        .map(|line| line.split_whitespace().nth(1).unwrap())
        .collect();
    assert_eq!(hits, vec!["1", "3", "1"]);
}

#[test]
fn dumped_stats_reproduce_the_report() {
    let checksum = checksum();
    let profiler = LineProfiler::new();
    profiler.wrap(&checksum).call(4);

    let temp_dir = TempDir::new().unwrap();
    let file_path = temp_dir.path().join("checksum.lprof.json");
    profiler.dump_stats(&file_path).unwrap();

    let loaded = load_stats(&file_path).unwrap();
    assert_eq!(loaded, profiler.get_stats());

    let mut from_file = Vec::new();
    show_text(&loaded, &mut from_file, &ReportOptions::default()).unwrap();
    assert_eq!(
        String::from_utf8(from_file).unwrap(),
        render(&profiler, &ReportOptions::default())
    );
}

#[test]
fn unexecuted_functions_can_be_left_out() {
    let checksum = checksum();
    let idle = Function::new(code!("idle"), |frame, (): ()| frame.line(line!()));
    let profiler = LineProfiler::with_functions(&[&checksum, &idle]);
    profiler.run(|| checksum.call(2));

    assert!(render(&profiler, &ReportOptions::default()).contains("Function: idle"));
    let stripped = render(&profiler, &ReportOptions::new().strip_zeros(true));
    assert!(!stripped.contains("Function: idle"));
    assert!(stripped.contains("Function: checksum"));
}
