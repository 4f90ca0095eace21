//! Sandbox loader: runs one source file in a fresh context under time budgets.

use std::time::{Duration, Instant};

use deno_core::{JsRuntime, RuntimeOptions, v8};
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::core::types::{SourceKind, SourceUnit};
use crate::core::wrap::wrap_source;
use crate::io::context::{get, isolated_context};
use crate::io::guard::{Completion, Guard, Stop};
use crate::io::watchdog::Watchdog;

/// Time budgets for the two phases of a load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub parse_timeout: Duration,
    pub execution_timeout: Duration,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            parse_timeout: Duration::from_millis(1_000),
            execution_timeout: Duration::from_millis(5_000),
        }
    }
}

/// Sandbox-level problems. Fatal for the batch unless the orchestrator
/// downgrades them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SandboxError {
    #[error("Parsing error: {message}")]
    Parse { message: String },
    #[error("Execution timeout: exceeded {budget_ms} ms")]
    ExecutionTimeout { budget_ms: u64 },
    #[error("Execution error: {message}")]
    Execution { message: String },
}

/// Value produced by loading a source file.
pub enum Artifact {
    /// `module.exports` was populated.
    Exported(v8::Global<v8::Value>),
    /// Return value of the wrapped callable.
    Direct(v8::Global<v8::Value>),
}

impl Artifact {
    pub fn value(&self) -> &v8::Global<v8::Value> {
        match self {
            Artifact::Exported(value) | Artifact::Direct(value) => value,
        }
    }

    pub fn is_exported(&self) -> bool {
        matches!(self, Artifact::Exported(_))
    }

    /// Look up `name` on the artifact under `guard`. Falsy values count as
    /// absent.
    pub fn lookup<'s>(
        &self,
        scope: &mut v8::HandleScope<'s>,
        guard: &Guard,
        name: &str,
    ) -> Result<Option<v8::Local<'s, v8::Value>>, Stop> {
        let value = v8::Local::new(scope, self.value());
        let Ok(object) = v8::Local::<v8::Object>::try_from(value) else {
            return Ok(None);
        };
        let found = guard.attempt(scope, |scope| get(scope, object, name))?;
        if found.boolean_value(scope) {
            Ok(Some(found))
        } else {
            Ok(None)
        }
    }
}

/// Owns the isolate. One engine serves a whole batch on a single thread;
/// every load gets a brand-new context.
pub struct Engine {
    runtime: JsRuntime,
    limits: Limits,
}

impl Engine {
    pub fn new(limits: Limits) -> Self {
        let runtime = JsRuntime::new(RuntimeOptions::default());
        Self { runtime, limits }
    }

    /// Guard bounded by the execution budget, for calls made after loading.
    pub fn guard(&mut self) -> Guard {
        let isolate = self.runtime.v8_isolate().thread_safe_handle();
        Guard::new(isolate, self.limits.execution_timeout)
    }

    pub fn handle_scope(&mut self) -> v8::HandleScope<'_> {
        self.runtime.handle_scope()
    }

    /// Wrap, compile, and run `unit` in a fresh context.
    #[instrument(skip_all, fields(kind = ?unit.kind, bytes = unit.text.len()))]
    pub fn load(&mut self, unit: &SourceUnit) -> Result<Artifact, SandboxError> {
        let wrapped = wrap_source(unit);
        let isolate = self.runtime.v8_isolate().thread_safe_handle();
        let limits = self.limits;
        let run_guard = Guard::new(isolate.clone(), limits.execution_timeout);

        let scope = &mut self.runtime.handle_scope();
        let context = isolated_context(scope).ok_or_else(|| SandboxError::Execution {
            message: "failed to prepare sandbox context".to_string(),
        })?;
        let scope = &mut v8::ContextScope::new(scope, context);

        let started = Instant::now();
        let script = {
            let tc = &mut v8::TryCatch::new(scope);
            let watchdog = Watchdog::arm(isolate, limits.parse_timeout);
            let script =
                v8::String::new(tc, &wrapped).and_then(|code| v8::Script::compile(tc, code, None));
            let fired = watchdog.disarm();
            let elapsed = started.elapsed();
            if fired || elapsed > limits.parse_timeout {
                warn!(elapsed_ms = elapsed.as_millis() as u64, "parse budget exceeded");
                return Err(SandboxError::Parse {
                    message: format!(
                        "parsing exceeded {} ms",
                        limits.parse_timeout.as_millis()
                    ),
                });
            }
            match script {
                Some(script) => script,
                None => {
                    return Err(SandboxError::Parse {
                        message: syntax_error_message(tc),
                    });
                }
            }
        };
        debug!(elapsed_ms = started.elapsed().as_millis() as u64, "compiled");

        let result = match run_guard.run(scope, |scope| call_wrapper(scope, script))? {
            Completion::Returned(value) => value,
            Completion::Threw(message) => return Err(SandboxError::Execution { message }),
        };

        let global = context.global(scope);
        let exports = match run_guard.run(scope, |scope| populated_exports(scope, global))? {
            Completion::Returned(exports) => exports,
            Completion::Threw(message) => return Err(SandboxError::Execution { message }),
        };
        let artifact = match exports {
            Some(exports) => Artifact::Exported(v8::Global::new(scope, exports)),
            None => Artifact::Direct(v8::Global::new(scope, result)),
        };
        debug!(
            exported = artifact.is_exported(),
            expression = unit.kind == SourceKind::Expression,
            "loaded"
        );
        Ok(artifact)
    }
}

/// Run the compiled script to obtain the wrapper, then call it.
fn call_wrapper<'s>(
    scope: &mut v8::HandleScope<'s>,
    script: v8::Local<v8::Script>,
) -> Option<v8::Local<'s, v8::Value>> {
    let wrapper = script.run(scope)?;
    let wrapper = match v8::Local::<v8::Function>::try_from(wrapper) {
        Ok(wrapper) => wrapper,
        Err(_) => {
            let message = v8::String::new(scope, "source did not evaluate to a callable")?;
            let error = v8::Exception::error(scope, message);
            scope.throw_exception(error);
            return None;
        }
    };
    let receiver: v8::Local<v8::Value> = v8::undefined(scope).into();
    wrapper.call(scope, receiver, &[])
}

/// `module.exports` if it holds something: non-nullish and, for objects,
/// at least one own property. The outer `None` means an exception.
fn populated_exports<'s>(
    scope: &mut v8::HandleScope<'s>,
    global: v8::Local<v8::Object>,
) -> Option<Option<v8::Local<'s, v8::Value>>> {
    let module = get(scope, global, "module")?;
    let Ok(module) = v8::Local::<v8::Object>::try_from(module) else {
        return Some(None);
    };
    let exports = get(scope, module, "exports")?;
    if exports.is_null_or_undefined() {
        return Some(None);
    }
    if let Ok(object) = v8::Local::<v8::Object>::try_from(exports) {
        let names = object.get_own_property_names(scope, v8::GetPropertyNamesArgs::default())?;
        if names.length() == 0 {
            return Some(None);
        }
    }
    Some(Some(exports))
}

fn syntax_error_message(tc: &mut v8::TryCatch<v8::HandleScope>) -> String {
    let Some(exception) = tc.exception() else {
        return "source could not be compiled".to_string();
    };
    let mut message = exception.to_rust_string_lossy(tc);
    if let Some(line) = tc.message().and_then(|detail| detail.get_line_number(tc)) {
        message.push_str(&format!(" (line {line})"));
    }
    message
}

