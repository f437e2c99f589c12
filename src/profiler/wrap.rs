use std::rc::Rc;

use super::LineProfiler;
use crate::runtime::{Code, Function, GeneratorFunction, ResumeGuard};

impl LineProfiler {
    /// Registers `function` and returns a wrapper that profiles each of its calls. The wrapper
    /// has the name and doc of `function` and records it as the wrapped target.
    pub fn wrap<A, R>(&self, function: &Function<A, R>) -> Function<A, R>
    where
        A: 'static,
        R: 'static,
    {
        self.add_function(function);
        let profiler = self.clone();
        let inner = function.clone();
        Function::wrapping(function, wrapper_code(function.name()), move |_, args| {
            let _session = profiler.session();
            inner.call(args)
        })
    }

    /// Registers `function` and returns a wrapper whose generators profile each resumption
    /// separately: every `next`, `send`, `throw` and `close` is its own enable/disable bracket,
    /// so time between resumptions is never observed.
    pub fn wrap_generator<A, Y, S, R>(
        &self,
        function: &GeneratorFunction<A, Y, S, R>,
    ) -> GeneratorFunction<A, Y, S, R>
    where
        A: 'static,
        Y: 'static,
        S: 'static,
        R: 'static,
    {
        self.add_function(function);
        let profiler = self.clone();
        let guard: Rc<dyn Fn() -> ResumeGuard> =
            Rc::new(move || Box::new(profiler.session()) as ResumeGuard);
        let inner = function.clone();
        GeneratorFunction::wrapping(function, wrapper_code(function.name()), move |args| {
            inner.call(args).with_resume_guard(Rc::clone(&guard))
        })
    }
}

fn wrapper_code(name: &str) -> Rc<Code> {
    Code::new(name, file!(), line!())
}
