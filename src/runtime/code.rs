use std::fmt::{self, Display};
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde_derive::{Deserialize, Serialize};

static NEXT_CODE_ID: AtomicU64 = AtomicU64::new(0);

/// The identity of one unit of compiled code. Two functions share a `CodeId` only when they run
/// the same body, so wrappers never collide with the code they wrap.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CodeId(u64);

impl CodeId {
    fn next() -> Self {
        CodeId(NEXT_CODE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl Display for CodeId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "code#{}", self.0)
    }
}

/// Static description of a function body: where it lives and what it is called.
#[derive(Debug)]
pub struct Code {
    id: CodeId,
    name: String,
    filename: String,
    first_line: u32,
}

impl Code {
    /// Allocates a fresh code identity. Call this once per function body.
    pub fn new(name: impl Into<String>, filename: impl Into<String>, first_line: u32) -> Rc<Code> {
        Rc::new(Code {
            id: CodeId::next(),
            name: name.into(),
            filename: filename.into(),
            first_line,
        })
    }

    pub fn id(&self) -> CodeId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn first_line(&self) -> u32 {
        self.first_line
    }
}

/// Builds a [`Code`] for the enclosing source location, naming it `$name`.
///
/// ```
/// let code = lineprof::code!("parse");
/// assert_eq!(code.name(), "parse");
/// assert!(code.filename().ends_with(".rs"));
/// ```
#[macro_export]
macro_rules! code {
    ($name:expr) => {
        $crate::runtime::Code::new($name, file!(), line!())
    };
}
