//! Bounded calls into candidate-controlled code.

use std::time::Duration;

use deno_core::v8;

use crate::core::types::Failure;
use crate::io::context::get;
use crate::io::engine::SandboxError;
use crate::io::watchdog::Watchdog;

/// Result of a bounded call that finished within its budget.
#[derive(Debug)]
pub enum Completion<T> {
    Returned(T),
    /// The code threw; carries the exception's `message` (or its string form).
    Threw(String),
}

/// Why a guarded check stopped early.
#[derive(Debug, Clone, PartialEq)]
pub enum Stop {
    Failed(Failure),
    Fatal(SandboxError),
}

impl From<Failure> for Stop {
    fn from(failure: Failure) -> Self {
        Stop::Failed(failure)
    }
}

impl From<SandboxError> for Stop {
    fn from(err: SandboxError) -> Self {
        Stop::Fatal(err)
    }
}

/// Runs closures under a `TryCatch` with a watchdog armed for `budget`.
#[derive(Clone)]
pub struct Guard {
    isolate: v8::IsolateHandle,
    budget: Duration,
}

impl Guard {
    pub fn new(isolate: v8::IsolateHandle, budget: Duration) -> Self {
        Self { isolate, budget }
    }

    /// Run `f`, converting exceptions and budget overruns.
    ///
    /// `f` returns `None` when the engine signalled an exception; a caught
    /// exception wins over any returned value.
    pub fn run<'s, T, F>(
        &self,
        scope: &mut v8::HandleScope<'s>,
        f: F,
    ) -> Result<Completion<T>, SandboxError>
    where
        F: FnOnce(&mut v8::HandleScope<'s>) -> Option<T>,
    {
        let tc = &mut v8::TryCatch::new(scope);
        let watchdog = Watchdog::arm(self.isolate.clone(), self.budget);
        let returned = f(tc);
        // Reading the message may run user getters, so it stays under the watchdog.
        let caught = (tc.has_caught() && !tc.has_terminated()).then(|| caught_message(tc));
        let terminated = tc.has_terminated();
        let fired = watchdog.disarm();
        if fired || terminated {
            return Err(SandboxError::ExecutionTimeout {
                budget_ms: self.budget.as_millis() as u64,
            });
        }
        if let Some(message) = caught {
            return Ok(Completion::Threw(message));
        }
        match returned {
            Some(value) => Ok(Completion::Returned(value)),
            None => Ok(Completion::Threw(
                "execution failed without an exception".to_string(),
            )),
        }
    }

    /// Like [`Guard::run`], but an exception becomes [`Failure::Threw`].
    pub fn attempt<'s, T, F>(&self, scope: &mut v8::HandleScope<'s>, f: F) -> Result<T, Stop>
    where
        F: FnOnce(&mut v8::HandleScope<'s>) -> Option<T>,
    {
        match self.run(scope, f)? {
            Completion::Returned(value) => Ok(value),
            Completion::Threw(message) => Err(Failure::Threw { message }.into()),
        }
    }
}

fn caught_message(tc: &mut v8::TryCatch<v8::HandleScope>) -> String {
    match tc.exception() {
        Some(exception) => exception_message(tc, exception),
        None => "unknown exception".to_string(),
    }
}

/// `error.message` for error-like objects, `String(value)` otherwise.
pub fn exception_message(scope: &mut v8::HandleScope, exception: v8::Local<v8::Value>) -> String {
    if let Ok(object) = v8::Local::<v8::Object>::try_from(exception)
        && let Some(message) = get(scope, object, "message")
        && message.is_string()
    {
        return message.to_rust_string_lossy(scope);
    }
    exception.to_rust_string_lossy(scope)
}
