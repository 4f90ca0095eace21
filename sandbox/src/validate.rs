//! Test validator: checks a candidate implementation against its definition.
//!
//! Checks run in a fixed order and stop at the first failure:
//! existence, function name, length bounds, call cases, custom hook.

use deno_core::v8;
use tracing::{debug, info, instrument};

use crate::core::canonical::Canonical;
use crate::core::types::{CaseSummary, Failure, Metrics, SourceUnit, Verdict};
use crate::definition::{Definition, split_case};
use crate::io::context::get;
use crate::io::engine::{Artifact, Engine, SandboxError};
use crate::io::guard::{Completion, Guard, Stop};

/// Outcome of validating one exercise.
#[derive(Debug, Clone, PartialEq)]
pub struct Validation {
    /// Present once the candidate was found and measured, even if a later
    /// check failed.
    pub metrics: Option<Metrics>,
    pub verdict: Verdict,
}

/// Load both sources and run the validation protocol.
///
/// `Err` is reserved for sandbox-level problems (parse errors, uncaught
/// top-level exceptions, exceeded budgets); every recoverable problem is in
/// the returned verdict.
#[instrument(skip_all)]
pub fn validate(
    engine: &mut Engine,
    implementation: &SourceUnit,
    definition: &SourceUnit,
) -> Result<Validation, SandboxError> {
    let candidate = engine.load(implementation)?;
    let definition = engine.load(definition)?;
    let guard = engine.guard();
    let scope = &mut engine.handle_scope();

    let mut metrics = None;
    let verdict = match check(scope, &guard, &candidate, &definition, &mut metrics) {
        Ok(cases) => Verdict::Passed { cases },
        Err(Stop::Failed(failure)) => Verdict::Failed { failure },
        Err(Stop::Fatal(err)) => return Err(err),
    };
    info!(passed = verdict.is_passed(), metrics = ?metrics, "validated");
    Ok(Validation { metrics, verdict })
}

fn check<'s>(
    scope: &mut v8::HandleScope<'s>,
    guard: &Guard,
    candidate: &Artifact,
    definition: &Artifact,
    metrics: &mut Option<Metrics>,
) -> Result<CaseSummary, Stop> {
    let test = Definition::new(scope, definition)?;
    let name = test.name(scope, guard)?;

    let target = candidate
        .lookup(scope, guard, &name)?
        .ok_or(Failure::MissingImplementation)?;
    if let Ok(function) = v8::Local::<v8::Function>::try_from(target) {
        let object: v8::Local<v8::Object> = function.into();
        let (matches, actual) = guard.attempt(scope, |scope| {
            let value = get(scope, object, "name")?;
            let matches = value.is_string() && value.to_rust_string_lossy(scope) == name;
            let actual = value.to_string(scope)?.to_rust_string_lossy(scope);
            Some((matches, actual))
        })?;
        if !matches {
            return Err(Failure::NameMismatch {
                expected: name,
                actual,
            }
            .into());
        }
    }

    let source = guard.attempt(scope, |scope| {
        let text = target.to_string(scope)?;
        Some(text.to_rust_string_lossy(scope))
    })?;
    let measured = Metrics::of(&source);
    *metrics = Some(measured);
    debug!(length = measured.length, lines = measured.lines, "candidate measured");

    test.bounds(scope, guard)?.check(measured.length)?;

    let summary = match test.cases(scope, guard)? {
        Some(cases) => {
            let count = run_cases(scope, guard, &name, target, cases)?;
            CaseSummary::Passed { count }
        }
        None => CaseSummary::NoCases,
    };

    if let Some(hook) = test.hook(scope, guard)? {
        let receiver: v8::Local<v8::Value> = test.object().into();
        if let Completion::Threw(message) =
            guard.run(scope, |scope| hook.call(scope, receiver, &[target]))?
        {
            return Err(Failure::HookFailed { message }.into());
        }
        debug!("hook passed");
    }

    Ok(summary)
}

/// Call the candidate once per case; stop at the first mismatch.
fn run_cases<'s>(
    scope: &mut v8::HandleScope<'s>,
    guard: &Guard,
    name: &str,
    target: v8::Local<'s, v8::Value>,
    cases: v8::Local<'s, v8::Array>,
) -> Result<usize, Stop> {
    let function = v8::Local::<v8::Function>::try_from(target).map_err(|_| {
        Failure::NotCallable {
            name: name.to_string(),
        }
    })?;

    let total = cases.length();
    for index in 0..total {
        let entry = guard.attempt(scope, |scope| cases.get_index(scope, index))?;
        let entry = v8::Local::<v8::Array>::try_from(entry)
            .map_err(|_| Failure::invalid_test(format!("cases[{index}] must be an array")))?;
        let (args, expected) = split_case(scope, guard, entry)?;
        let receiver: v8::Local<v8::Value> = v8::undefined(scope).into();

        let actual = match guard.run(scope, |scope| function.call(scope, receiver, &args))? {
            Completion::Returned(actual) => actual,
            Completion::Threw(message) => {
                return Err(Failure::CaseThrew {
                    index: index as usize,
                    message,
                }
                .into());
            }
        };

        let expected = canonical(scope, guard, expected, index)?;
        let actual = canonical(scope, guard, actual, index)?;
        if expected != actual {
            return Err(Failure::CaseFailed {
                index: index as usize,
                expected: expected.to_string(),
                actual: actual.to_string(),
            }
            .into());
        }
        debug!(index, "case passed");
    }
    Ok(total as usize)
}

fn canonical<'s>(
    scope: &mut v8::HandleScope<'s>,
    guard: &Guard,
    value: v8::Local<'s, v8::Value>,
    index: u32,
) -> Result<Canonical, Stop> {
    let completion = guard.run(scope, |scope| {
        let form = match v8::json::stringify(scope, value) {
            Some(text) => Canonical::from_json_text(&text.to_rust_string_lossy(scope)),
            None => Canonical::Undefined,
        };
        Some(form)
    })?;
    match completion {
        Completion::Returned(form) => Ok(form),
        Completion::Threw(message) => Err(Failure::CaseThrew {
            index: index as usize,
            message,
        }
        .into()),
    }
}
