//! Sandbox loader behavior: export resolution, isolation, and budgets.

use std::time::Duration;

use sandbox::test_support::{engine, test_limits};
use sandbox::io::guard::Stop;
use sandbox::{Engine, Failure, Limits, SandboxError, SourceUnit};

#[test]
fn populated_exports_win_over_return_value() {
    let mut engine = engine();
    let artifact = engine
        .load(&SourceUnit::implementation(
            "module.exports = { answer: 42 };\nreturn { answer: 0 };",
        ))
        .expect("load");
    assert!(artifact.is_exported());

    let guard = engine.guard();
    let scope = &mut engine.handle_scope();
    let answer = artifact.lookup(scope, &guard, "answer").expect("lookup").expect("answer");
    assert_eq!(answer.number_value(scope), Some(42.0));
}

#[test]
fn return_value_used_when_nothing_exported() {
    let mut engine = engine();
    let artifact = engine
        .load(&SourceUnit::implementation(
            "const add = (a, b) => a + b;\nreturn { add };",
        ))
        .expect("load");
    assert!(!artifact.is_exported());

    let guard = engine.guard();
    let scope = &mut engine.handle_scope();
    let add = artifact.lookup(scope, &guard, "add").expect("lookup").expect("add");
    assert!(add.is_function());
}

#[test]
fn empty_export_object_falls_back_to_return_value() {
    let mut engine = engine();
    let artifact = engine
        .load(&SourceUnit::implementation(
            "module.exports = {};\nreturn { fallback: true };",
        ))
        .expect("load");
    assert!(!artifact.is_exported());

    let guard = engine.guard();
    let scope = &mut engine.handle_scope();
    let fallback = artifact.lookup(scope, &guard, "fallback").expect("lookup").expect("fallback");
    assert!(fallback.is_true());
}

#[test]
fn expression_sources_yield_their_value() {
    let mut engine = engine();
    let artifact = engine
        .load(&SourceUnit::definition(
            "({\n  name: 'add',\n  length: [10, 50], // bounds\n})",
        ))
        .expect("load");

    let guard = engine.guard();
    let scope = &mut engine.handle_scope();
    let name = artifact.lookup(scope, &guard, "name").expect("lookup").expect("name");
    assert_eq!(name.to_rust_string_lossy(scope), "add");
}

#[test]
fn missing_names_and_falsy_values_are_absent() {
    let mut engine = engine();
    let artifact = engine
        .load(&SourceUnit::implementation(
            "module.exports = { nothing: null, zero: 0, empty: '', off: false, one: 1 };",
        ))
        .expect("load");

    let guard = engine.guard();
    let scope = &mut engine.handle_scope();
    for name in ["nothing", "zero", "empty", "off", "add"] {
        assert!(
            artifact.lookup(scope, &guard, name).expect("lookup").is_none(),
            "{name} should be absent"
        );
    }
    assert!(artifact.lookup(scope, &guard, "one").expect("lookup").is_some());
}

#[test]
fn looping_getter_on_lookup_times_out() {
    let mut engine = engine();
    let artifact = engine
        .load(&SourceUnit::implementation(
            "module.exports = { get add() { for (;;) {} } };",
        ))
        .expect("defining a getter does not run it");

    let guard = engine.guard();
    let scope = &mut engine.handle_scope();
    let stop = artifact.lookup(scope, &guard, "add").err().expect("timeout");
    assert_eq!(
        stop,
        Stop::Fatal(SandboxError::ExecutionTimeout { budget_ms: 300 })
    );
}

#[test]
fn throwing_getter_on_lookup_is_reported() {
    let mut engine = engine();
    let artifact = engine
        .load(&SourceUnit::implementation(
            "module.exports = { get add() { throw new Error('nope'); } };",
        ))
        .expect("load");

    let guard = engine.guard();
    let scope = &mut engine.handle_scope();
    let stop = artifact.lookup(scope, &guard, "add").err().expect("throws");
    assert_eq!(
        stop,
        Stop::Failed(Failure::Threw {
            message: "nope".to_string()
        })
    );
}

#[test]
fn looping_proxy_exports_time_out_during_load() {
    let mut engine = engine();
    let err = engine
        .load(&SourceUnit::implementation(
            "module.exports = new Proxy({}, { ownKeys() { for (;;) {} } });",
        ))
        .err()
        .expect("timeout");
    assert_eq!(err, SandboxError::ExecutionTimeout { budget_ms: 300 });
}

#[test]
fn parse_budget_overrun_is_a_parse_error() {
    let mut engine = Engine::new(Limits {
        parse_timeout: Duration::from_nanos(1),
        ..test_limits()
    });
    let err = engine
        .load(&SourceUnit::implementation("module.exports = { ok: 1 };"))
        .err()
        .expect("parse budget");
    match err {
        SandboxError::Parse { message } => {
            assert!(message.contains("parsing exceeded"), "{message}");
        }
        other => panic!("expected parse error, got {other:?}"),
    }
}

#[test]
fn syntax_error_is_a_parse_error() {
    let mut engine = engine();
    let err = engine
        .load(&SourceUnit::implementation("function broken( {"))
        .err()
        .expect("parse error");
    match err {
        SandboxError::Parse { message } => assert!(message.contains("SyntaxError"), "{message}"),
        other => panic!("expected parse error, got {other:?}"),
    }
}

#[test]
fn top_level_throw_is_an_execution_error() {
    let mut engine = engine();
    let err = engine
        .load(&SourceUnit::implementation("throw new Error('boom');"))
        .err()
        .expect("execution error");
    assert_eq!(
        err,
        SandboxError::Execution {
            message: "boom".to_string()
        }
    );
}

#[test]
fn endless_loop_times_out_and_engine_recovers() {
    let mut engine = engine();
    let err = engine
        .load(&SourceUnit::implementation("while (true) {}"))
        .err()
        .expect("timeout");
    assert_eq!(err, SandboxError::ExecutionTimeout { budget_ms: 300 });

    let artifact = engine
        .load(&SourceUnit::implementation("module.exports = { ok: 1 };"))
        .expect("engine usable after timeout");
    assert!(artifact.is_exported());
}

#[test]
fn global_refers_to_the_context_itself() {
    let mut engine = engine();
    let artifact = engine
        .load(&SourceUnit::implementation(
            "module.exports = {\n  same: global === globalThis,\n  module: global.module === module,\n};",
        ))
        .expect("load");

    let guard = engine.guard();
    let scope = &mut engine.handle_scope();
    assert!(artifact.lookup(scope, &guard, "same").expect("lookup").expect("same").is_true());
    assert!(artifact.lookup(scope, &guard, "module").expect("lookup").expect("module").is_true());
}

#[test]
fn contexts_share_no_state() {
    let mut engine = engine();
    engine
        .load(&SourceUnit::implementation(
            "global.leak = 1;\nArray.prototype.extra = 2;\nmodule.exports = { set: true };",
        ))
        .expect("first load");
    let artifact = engine
        .load(&SourceUnit::implementation(
            "module.exports = { seen: typeof leak + ':' + typeof [].extra };",
        ))
        .expect("second load");

    let guard = engine.guard();
    let scope = &mut engine.handle_scope();
    let seen = artifact.lookup(scope, &guard, "seen").expect("lookup").expect("seen");
    assert_eq!(seen.to_rust_string_lossy(scope), "undefined:undefined");
}

#[test]
fn only_the_minimal_surface_is_exposed() {
    let mut engine = engine();
    let artifact = engine
        .load(&SourceUnit::implementation(
            "console.log('visible from candidate', { a: 1 });\nmodule.exports = { kinds: [typeof require, typeof Deno, typeof console.log].join(',') };",
        ))
        .expect("load");

    let guard = engine.guard();
    let scope = &mut engine.handle_scope();
    let kinds = artifact.lookup(scope, &guard, "kinds").expect("lookup").expect("kinds");
    assert_eq!(
        kinds.to_rust_string_lossy(scope),
        "undefined,undefined,function"
    );
}
