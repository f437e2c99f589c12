use std::any::Any;
use std::error::Error;
use std::fmt::{self, Debug};
use std::rc::Rc;

use super::{Code, Frame, FrameId, FunctionInfo, Profilable};

/// An error delivered into a suspended generator by [`Generator::throw`].
pub type Thrown = Box<dyn Error>;

/// A value held for the duration of one resumption and dropped when it ends.
pub type ResumeGuard = Box<dyn Any>;

/// What a suspended generator is resumed with.
#[derive(Debug)]
pub enum Resume<S> {
    Next,
    Send(S),
    Throw(Thrown),
    /// The caller is done with the generator; the body should finish.
    Close,
}

impl<S> Resume<S> {
    /// The value passed by [`Generator::send`], if any.
    pub fn sent(self) -> Option<S> {
        match self {
            Resume::Send(value) => Some(value),
            _ => None,
        }
    }
}

/// The outcome of one resumption.
#[derive(Debug, PartialEq, Eq)]
pub enum GeneratorState<Y, R> {
    Yielded(Y),
    Complete(R),
}

type Step<Y, S, R> = Box<dyn FnMut(&Frame, Resume<S>) -> GeneratorState<Y, R>>;

/// A live generator. Each resumption runs one step of the body inside a frame that keeps the
/// same [`FrameId`] for the whole life of the generator. Yielding suspends the frame; completing
/// or panicking finishes it.
pub struct Generator<Y, S = (), R = ()> {
    code: Rc<Code>,
    frame: FrameId,
    step: Option<Step<Y, S, R>>,
    guard: Option<Rc<dyn Fn() -> ResumeGuard>>,
    started: bool,
    returned: Option<R>,
}

impl<Y, S, R> Generator<Y, S, R> {
    fn new(code: Rc<Code>, step: Step<Y, S, R>) -> Self {
        Generator {
            code,
            frame: FrameId::new(),
            step: Some(step),
            guard: None,
            started: false,
            returned: None,
        }
    }

    /// Holds a value produced by `guard` around every later resumption, including `close`.
    #[must_use]
    pub fn with_resume_guard(mut self, guard: Rc<dyn Fn() -> ResumeGuard>) -> Self {
        self.guard = Some(guard);
        self
    }

    /// Runs the body until it yields or completes. Returns `None` once the generator is
    /// exhausted.
    pub fn resume(&mut self, input: Resume<S>) -> Option<GeneratorState<Y, R>> {
        let mut step = self.step.take()?;
        self.started = true;
        let _guard = self.guard.as_ref().map(|guard| guard());
        let frame = Frame::resume(&self.code, self.frame);
        let state = step(&frame, input);
        if matches!(state, GeneratorState::Yielded(_)) {
            frame.suspend();
            drop(frame);
            self.step = Some(step);
        }
        Some(state)
    }

    /// Resumes without a value. Returns `None` when the generator completes or is exhausted;
    /// the completion value is then available from [`Generator::take_return_value`].
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<Y> {
        self.advance(Resume::Next)
    }

    pub fn send(&mut self, value: S) -> Option<Y> {
        self.advance(Resume::Send(value))
    }

    /// Delivers `error` into a started generator. A generator that never ran is not resumed; it
    /// just ends.
    pub fn throw(&mut self, error: Thrown) -> Option<Y> {
        if !self.started {
            self.step = None;
            return None;
        }
        self.advance(Resume::Throw(error))
    }

    /// Asks a started generator to finish and discards whatever it yields. A generator that
    /// never ran is not resumed. Either way the generator is exhausted afterwards.
    pub fn close(&mut self) {
        if self.started {
            if let Some(GeneratorState::Complete(value)) = self.resume(Resume::Close) {
                self.returned = Some(value);
            }
        }
        self.step = None;
    }

    pub fn is_exhausted(&self) -> bool {
        self.step.is_none()
    }

    pub fn take_return_value(&mut self) -> Option<R> {
        self.returned.take()
    }

    pub fn frame_id(&self) -> FrameId {
        self.frame
    }

    fn advance(&mut self, input: Resume<S>) -> Option<Y> {
        match self.resume(input)? {
            GeneratorState::Yielded(value) => Some(value),
            GeneratorState::Complete(value) => {
                self.returned = Some(value);
                None
            }
        }
    }
}

impl<Y, S, R> Iterator for Generator<Y, S, R> {
    type Item = Y;

    fn next(&mut self) -> Option<Y> {
        Generator::next(self)
    }
}

impl<Y, S, R> Debug for Generator<Y, S, R> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Generator")
            .field("code", &self.code.id())
            .field("frame", &self.frame)
            .field("exhausted", &self.is_exhausted())
            .finish()
    }
}

/// A function whose body is a generator. Calling it runs nothing; it returns a [`Generator`]
/// that runs the body a step at a time.
///
/// ```
/// use lineprof::runtime::{Frame, GeneratorFunction, GeneratorState, Resume};
///
/// let countdown = GeneratorFunction::new(lineprof::code!("countdown"), |start: u32| {
///     let mut n = start;
///     move |frame: &Frame, _resume: Resume<()>| {
///         frame.line(line!());
///         if n == 0 {
///             return GeneratorState::Complete(());
///         }
///         n -= 1;
///         GeneratorState::Yielded(n + 1)
///     }
/// });
/// let values: Vec<u32> = countdown.call(3).collect();
/// assert_eq!(values, vec![3, 2, 1]);
/// ```
pub struct GeneratorFunction<A, Y, S = (), R = ()> {
    info: FunctionInfo,
    factory: Rc<dyn Fn(A) -> Generator<Y, S, R>>,
}

impl<A, Y, S, R> GeneratorFunction<A, Y, S, R>
where
    A: 'static,
    Y: 'static,
    S: 'static,
    R: 'static,
{
    /// `body` receives the arguments and returns the step function of the generator.
    pub fn new<F, B>(code: Rc<Code>, body: B) -> Self
    where
        B: Fn(A) -> F + 'static,
        F: FnMut(&Frame, Resume<S>) -> GeneratorState<Y, R> + 'static,
    {
        let generator_code = Rc::clone(&code);
        GeneratorFunction {
            info: FunctionInfo::new(code),
            factory: Rc::new(move |args| {
                Generator::new(Rc::clone(&generator_code), Box::new(body(args)))
            }),
        }
    }

    /// A transparent wrapper around `inner` that builds its generators with `factory`. The
    /// wrapper takes on the name and doc of `inner` and records it as the wrapped target.
    pub fn wrapping(
        inner: &impl Profilable,
        code: Rc<Code>,
        factory: impl Fn(A) -> Generator<Y, S, R> + 'static,
    ) -> Self {
        GeneratorFunction {
            info: FunctionInfo::wrapping(inner.info(), code),
            factory: Rc::new(factory),
        }
    }
}

impl<A, Y, S, R> GeneratorFunction<A, Y, S, R> {
    #[must_use]
    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.info.set_doc(doc.into());
        self
    }

    pub fn call(&self, args: A) -> Generator<Y, S, R> {
        (self.factory)(args)
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

impl<A, Y, S, R> Clone for GeneratorFunction<A, Y, S, R> {
    fn clone(&self) -> Self {
        GeneratorFunction {
            info: self.info.clone(),
            factory: Rc::clone(&self.factory),
        }
    }
}

impl<A, Y, S, R> Profilable for GeneratorFunction<A, Y, S, R> {
    fn info(&self) -> &FunctionInfo {
        &self.info
    }
}

impl<A, Y, S, R> Debug for GeneratorFunction<A, Y, S, R> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("GeneratorFunction")
            .field("info", &self.info)
            .finish()
    }
}
