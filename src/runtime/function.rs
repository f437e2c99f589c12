use std::fmt::{self, Debug};
use std::rc::Rc;

use super::{Code, CodeId, Frame};

/// The externally visible identity of a function: what introspection sees, and what a profiler
/// registers.
#[derive(Clone, Debug)]
pub struct FunctionInfo {
    name: String,
    doc: Option<String>,
    code: Rc<Code>,
    wrapped: Option<Rc<FunctionInfo>>,
}

impl FunctionInfo {
    pub fn new(code: Rc<Code>) -> Self {
        FunctionInfo {
            name: code.name().to_string(),
            doc: None,
            code,
            wrapped: None,
        }
    }

    /// Metadata for a wrapper around `inner` running `code`: the name and doc are copied from
    /// `inner`, and `inner` is recorded as the wrapped target.
    pub fn wrapping(inner: &FunctionInfo, code: Rc<Code>) -> Self {
        FunctionInfo {
            name: inner.name.clone(),
            doc: inner.doc.clone(),
            code,
            wrapped: Some(Rc::new(inner.clone())),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn doc(&self) -> Option<&str> {
        self.doc.as_deref()
    }

    pub fn code(&self) -> &Rc<Code> {
        &self.code
    }

    pub fn code_id(&self) -> CodeId {
        self.code.id()
    }

    /// The callable this one forwards to, if it is a transparent wrapper.
    pub fn wrapped(&self) -> Option<&FunctionInfo> {
        self.wrapped.as_deref()
    }

    pub(crate) fn set_doc(&mut self, doc: String) {
        self.doc = Some(doc);
    }
}

/// Anything with a [`FunctionInfo`] can be registered with a profiler.
pub trait Profilable {
    fn info(&self) -> &FunctionInfo;
}

impl Profilable for FunctionInfo {
    fn info(&self) -> &FunctionInfo {
        self
    }
}

/// A callable whose body runs inside a [`Frame`] of its code. Multiple arguments are passed as a
/// tuple.
///
/// ```
/// use lineprof::runtime::Function;
///
/// let f = Function::new(lineprof::code!("f"), |frame, x: i64| {
///     frame.line(line!());
///     let y = x + 10;
///     frame.line(line!());
///     y
/// })
/// .with_doc("A docstring.");
/// assert_eq!(f.call(10), 20);
/// assert_eq!(f.name(), "f");
/// ```
pub struct Function<A, R> {
    info: FunctionInfo,
    body: Rc<dyn Fn(&Frame, A) -> R>,
}

impl<A, R> Function<A, R> {
    pub fn new(code: Rc<Code>, body: impl Fn(&Frame, A) -> R + 'static) -> Self {
        Function {
            info: FunctionInfo::new(code),
            body: Rc::new(body),
        }
    }

    /// A transparent wrapper around `inner` with its own `code` and `body`. The wrapper takes on
    /// the name and doc of `inner` and records it as the wrapped target.
    pub fn wrapping(
        inner: &impl Profilable,
        code: Rc<Code>,
        body: impl Fn(&Frame, A) -> R + 'static,
    ) -> Self {
        Function {
            info: FunctionInfo::wrapping(inner.info(), code),
            body: Rc::new(body),
        }
    }

    #[must_use]
    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.info.set_doc(doc.into());
        self
    }

    pub fn call(&self, args: A) -> R {
        let frame = Frame::enter(&self.info.code);
        (self.body)(&frame, args)
    }

    pub fn name(&self) -> &str {
        self.info.name()
    }

    pub fn doc(&self) -> Option<&str> {
        self.info.doc()
    }

    pub fn code(&self) -> &Rc<Code> {
        self.info.code()
    }

    pub fn wrapped(&self) -> Option<&FunctionInfo> {
        self.info.wrapped()
    }
}

impl<A, R> Clone for Function<A, R> {
    fn clone(&self) -> Self {
        Function {
            info: self.info.clone(),
            body: Rc::clone(&self.body),
        }
    }
}

impl<A, R> Profilable for Function<A, R> {
    fn info(&self) -> &FunctionInfo {
        &self.info
    }
}

impl<A, R> Debug for Function<A, R> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Function").field("info", &self.info).finish()
    }
}
