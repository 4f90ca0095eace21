//! Validation protocol scenarios, run end-to-end through the engine.

use sandbox::test_support::validate_sources;
use sandbox::{CaseSummary, Failure, Metrics, SandboxError, Verdict};

const ADD: &str = "function add(a, b) { return a + b; }\nmodule.exports = { add };\n";

fn failure(implementation: &str, definition: &str) -> Failure {
    let validation = validate_sources(implementation, definition).expect("validate");
    match validation.verdict {
        Verdict::Failed { failure } => failure,
        other => panic!("expected failure, got {other:?}"),
    }
}

#[test]
fn passing_exercise_reports_case_count() {
    let validation = validate_sources(
        ADD,
        "({ name: 'add', length: [10, 50], cases: [[1, 2, 3], [-1, -1, -2]] })",
    )
    .expect("validate");
    assert_eq!(
        validation.verdict,
        Verdict::Passed {
            cases: CaseSummary::Passed { count: 2 }
        }
    );
    assert_eq!(
        validation.metrics,
        Some(Metrics {
            length: 36,
            lines: 1
        })
    );
}

#[test]
fn below_minimum_length_is_too_short() {
    let validation = validate_sources(
        ADD,
        "({ name: 'add', length: [40, 50], cases: [[1, 2, 3]] })",
    )
    .expect("validate");
    assert_eq!(
        validation.verdict,
        Verdict::Failed {
            failure: Failure::TooShort {
                length: 36,
                min: 40.0
            }
        }
    );
    assert_eq!(validation.metrics.map(|metrics| metrics.length), Some(36));
}

#[test]
fn length_equal_to_a_bound_passes() {
    let implementation = "function f() {}\nmodule.exports = { f };";
    let at_bound = validate_sources(implementation, "({ name: 'f', length: [15, 15] })")
        .expect("validate");
    assert!(at_bound.verdict.is_passed());

    let over = failure(implementation, "({ name: 'f', length: [10, 14] })");
    assert_eq!(over, Failure::TooLong { length: 15, max: 14.0 });
}

#[test]
fn missing_export_is_reported_before_anything_else() {
    let validation = validate_sources(
        "function sum(a, b) { return a + b; }\nmodule.exports = { sum };",
        "({ name: 'add', length: [10, 50], cases: [[1, 2, 3]] })",
    )
    .expect("validate");
    assert_eq!(
        validation.verdict,
        Verdict::Failed {
            failure: Failure::MissingImplementation
        }
    );
    assert_eq!(validation.metrics, None);
    assert_eq!(
        validation.verdict.reason().as_deref(),
        Some("No implementation detected")
    );
}

#[test]
fn misnamed_function_expression_is_rejected() {
    let result = failure(
        "const add = function sum(a, b) { return a + b; };\nmodule.exports = { add };",
        "({ name: 'add', length: [10, 60] })",
    );
    assert_eq!(
        result,
        Failure::NameMismatch {
            expected: "add".to_string(),
            actual: "sum".to_string()
        }
    );
}

#[test]
fn arrow_function_takes_its_binding_name() {
    let validation = validate_sources(
        "const add = (a, b) => a + b;\nmodule.exports = { add };",
        "({ name: 'add', length: [10, 20], cases: [[2, 3, 5]] })",
    )
    .expect("validate");
    assert!(validation.verdict.is_passed());
    assert_eq!(validation.metrics.map(|metrics| metrics.length), Some(15));
}

#[test]
fn returned_mapping_works_like_exports() {
    let validation = validate_sources(
        "const add = (a, b) => a + b;\nreturn { add };",
        "({ name: 'add', length: [1, 100], cases: [[1, 1, 2]] })",
    )
    .expect("validate");
    assert!(validation.verdict.is_passed());
}

#[test]
fn results_compare_by_value_not_identity() {
    let validation = validate_sources(
        "function swap(a, b) { return { b: a, a: b, list: [a, b] }; }\nmodule.exports = { swap };",
        "({ name: 'swap', length: [1, 100], cases: [[1, 2, { a: 2, b: 1, list: [1, 2] }]] })",
    )
    .expect("validate");
    assert_eq!(
        validation.verdict,
        Verdict::Passed {
            cases: CaseSummary::Passed { count: 1 }
        }
    );
}

#[test]
fn first_failing_case_is_reported() {
    let result = failure(
        ADD,
        "({ name: 'add', length: [1, 100], cases: [[1, 1, 2], [1, 2, 0], [2, 2, 0]] })",
    );
    assert_eq!(
        result,
        Failure::CaseFailed {
            index: 1,
            expected: "0".to_string(),
            actual: "3".to_string()
        }
    );
    assert_eq!(result.to_string(), "Case failed: expected 0, result: 3");
}

#[test]
fn undefined_result_does_not_match_null() {
    let result = failure(
        "function nothing() {}\nmodule.exports = { nothing };",
        "({ name: 'nothing', length: [1, 100], cases: [[null]] })",
    );
    assert_eq!(
        result,
        Failure::CaseFailed {
            index: 0,
            expected: "null".to_string(),
            actual: "undefined".to_string()
        }
    );
}

#[test]
fn no_cases_and_no_hook_still_passes() {
    let validation =
        validate_sources(ADD, "({ name: 'add', length: [10, 50] })").expect("validate");
    assert_eq!(
        validation.verdict,
        Verdict::Passed {
            cases: CaseSummary::NoCases
        }
    );
    assert!(validation.metrics.is_some());
}

#[test]
fn hook_receives_the_candidate() {
    let validation = validate_sources(
        ADD,
        "({\n  name: 'add',\n  length: [10, 50],\n  test: (add) => {\n    if (add(2, 2) !== 4) throw new Error('add(2, 2) must be 4');\n  },\n})",
    )
    .expect("validate");
    assert_eq!(
        validation.verdict,
        Verdict::Passed {
            cases: CaseSummary::NoCases
        }
    );
}

#[test]
fn hook_exception_message_is_the_reason() {
    let result = failure(
        ADD,
        "({\n  name: 'add',\n  length: [10, 50],\n  cases: [[1, 2, 3]],\n  test: (add) => {\n    if (add(2, 2) !== 5) throw new Error('add(2, 2) must be 5');\n  },\n})",
    );
    assert_eq!(
        result,
        Failure::HookFailed {
            message: "add(2, 2) must be 5".to_string()
        }
    );
}

#[test]
fn throwing_case_is_a_failure() {
    let result = failure(
        "function add(a, b) { if (a < 0) throw new Error('negative'); return a + b; }\nmodule.exports = { add };",
        "({ name: 'add', length: [1, 200], cases: [[1, 2, 3], [-1, 2, 1]] })",
    );
    assert_eq!(
        result,
        Failure::CaseThrew {
            index: 1,
            message: "negative".to_string()
        }
    );
}

#[test]
fn non_function_with_cases_is_not_callable() {
    let result = failure(
        "module.exports = { add: 42 };",
        "({ name: 'add', length: [1, 10], cases: [[1, 2, 3]] })",
    );
    assert_eq!(
        result,
        Failure::NotCallable {
            name: "add".to_string()
        }
    );
}

#[test]
fn malformed_definition_is_invalid() {
    let result = failure(ADD, "({ name: 'add', cases: [] })");
    assert!(matches!(result, Failure::InvalidTest { .. }), "{result:?}");

    let result = failure(ADD, "({ name: 'add', length: [1, 100], cases: [3] })");
    assert_eq!(result, Failure::invalid_test("cases[0] must be an array"));
}

#[test]
fn endless_case_exceeds_the_execution_budget() {
    let err = validate_sources(
        "function spin() { for (;;) {} }\nmodule.exports = { spin };",
        "({ name: 'spin', length: [1, 100], cases: [[undefined]] })",
    )
    .expect_err("timeout");
    assert_eq!(err, SandboxError::ExecutionTimeout { budget_ms: 300 });
}

#[test]
fn broken_definition_is_a_parse_error() {
    let err = validate_sources(ADD, "({ name: 'add', ").expect_err("parse error");
    assert!(matches!(err, SandboxError::Parse { .. }), "{err:?}");
}

#[test]
fn falsy_export_counts_as_missing() {
    let result = failure(
        "module.exports = { add: 0 };",
        "({ name: 'add', length: [1, 10], cases: [[1, 2, 3]] })",
    );
    assert_eq!(result, Failure::MissingImplementation);
}

#[test]
fn looping_export_getter_exceeds_the_execution_budget() {
    let err = validate_sources(
        "module.exports = { get add() { for (;;) {} } };",
        "({ name: 'add', length: [1, 100] })",
    )
    .expect_err("timeout");
    assert_eq!(err, SandboxError::ExecutionTimeout { budget_ms: 300 });
}

#[test]
fn looping_definition_getter_exceeds_the_execution_budget() {
    let err = validate_sources(ADD, "({ name: 'add', get length() { for (;;) {} } })")
        .expect_err("timeout");
    assert_eq!(err, SandboxError::ExecutionTimeout { budget_ms: 300 });
}

#[test]
fn throwing_definition_getter_is_a_failure() {
    let result = failure(ADD, "({ get name() { throw new Error('no name'); } })");
    assert_eq!(
        result,
        Failure::Threw {
            message: "no name".to_string()
        }
    );
}

#[test]
fn visible_name_property_is_compared() {
    let result = failure(
        "function add(a, b) { return a + b; }\nObject.defineProperty(add, 'name', { value: 'plus' });\nmodule.exports = { add };",
        "({ name: 'add', length: [1, 100] })",
    );
    assert_eq!(
        result,
        Failure::NameMismatch {
            expected: "add".to_string(),
            actual: "plus".to_string()
        }
    );

    let validation = validate_sources(
        "const plus = (a, b) => a + b;\nObject.defineProperty(plus, 'name', { value: 'add' });\nmodule.exports = { add: plus };",
        "({ name: 'add', length: [1, 100], cases: [[1, 2, 3]] })",
    )
    .expect("validate");
    assert!(validation.verdict.is_passed(), "{:?}", validation.verdict);
}

#[test]
fn case_failure_shows_engine_json_text() {
    let result = failure(
        "function pair(a, b) { return { b, a }; }\nmodule.exports = { pair };",
        "({ name: 'pair', length: [1, 100], cases: [[1, 2, { a: 2, b: 1 }]] })",
    );
    assert_eq!(
        result,
        Failure::CaseFailed {
            index: 0,
            expected: r#"{"a":2,"b":1}"#.to_string(),
            actual: r#"{"b":2,"a":1}"#.to_string()
        }
    );
}
