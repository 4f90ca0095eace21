//! Fresh, isolated global environments for one load each.
//!
//! Every context gets its own global object and its own intrinsics. The
//! global exposes only `module` (an empty export container), `console`, and
//! `global`, which points back at the global object itself.

use std::io::Write;

use deno_core::v8;
use tracing::debug;

/// Create a new context with the minimal global surface installed.
///
/// Returns `None` if the engine could not allocate the surface.
pub fn isolated_context<'s>(scope: &mut v8::HandleScope<'s>) -> Option<v8::Local<'s, v8::Context>> {
    let context = v8::Context::new(scope, Default::default());
    let scope = &mut v8::ContextScope::new(scope, context);
    let global = context.global(scope);

    let module = v8::Object::new(scope);
    set(scope, global, "module", module.into())?;

    let console = v8::Object::new(scope);
    for name in ["log", "info", "debug", "dir"] {
        let method = v8::Function::new(scope, console_stdout)?;
        set(scope, console, name, method.into())?;
    }
    for name in ["warn", "error"] {
        let method = v8::Function::new(scope, console_stderr)?;
        set(scope, console, name, method.into())?;
    }
    set(scope, global, "console", console.into())?;
    set(scope, global, "global", global.into())?;

    debug!("isolated context created");
    Some(context)
}

/// Read a named property of an object.
pub fn get<'s>(
    scope: &mut v8::HandleScope<'s>,
    object: v8::Local<v8::Object>,
    name: &str,
) -> Option<v8::Local<'s, v8::Value>> {
    let key = v8::String::new(scope, name)?;
    object.get(scope, key.into())
}

fn set(
    scope: &mut v8::HandleScope,
    object: v8::Local<v8::Object>,
    name: &str,
    value: v8::Local<v8::Value>,
) -> Option<()> {
    let key = v8::String::new(scope, name)?;
    object.set(scope, key.into(), value)?;
    Some(())
}

fn console_stdout(
    scope: &mut v8::HandleScope,
    args: v8::FunctionCallbackArguments,
    _rv: v8::ReturnValue,
) {
    let line = format_args_line(scope, &args);
    let mut out = std::io::stdout().lock();
    let _ = writeln!(out, "{line}");
}

fn console_stderr(
    scope: &mut v8::HandleScope,
    args: v8::FunctionCallbackArguments,
    _rv: v8::ReturnValue,
) {
    let line = format_args_line(scope, &args);
    let mut err = std::io::stderr().lock();
    let _ = writeln!(err, "{line}");
}

fn format_args_line(scope: &mut v8::HandleScope, args: &v8::FunctionCallbackArguments) -> String {
    let mut parts = Vec::with_capacity(args.length() as usize);
    for index in 0..args.length() {
        parts.push(display_value(scope, args.get(index)));
    }
    parts.join(" ")
}

/// Strings as-is, plain objects as JSON, everything else via `String()`.
fn display_value(scope: &mut v8::HandleScope, value: v8::Local<v8::Value>) -> String {
    if value.is_object() && !value.is_function() {
        let tc = &mut v8::TryCatch::new(scope);
        if let Some(json) = v8::json::stringify(tc, value)
            && !tc.has_caught()
        {
            return json.to_rust_string_lossy(tc);
        }
        return value.to_rust_string_lossy(tc);
    }
    value.to_rust_string_lossy(scope)
}
