// SPDX-License-Identifier: (MIT OR Apache-2.0)

//! Name resolution, typing and diagnostics of the validator.

use lsl_ast::build::*;
use lsl_ast::{BinaryOp, Component, LslType, PrefixOp, Script, Span};
use lsl_library::{LibraryFunction, LibraryParam, StaticLibrary};
use lsl_validate::{
    Binding, CallTarget, ExpressionKind, NodeKind, StatementKind, ValidationReport, Validator, ValidatorOptions,
    WarningKind,
};

fn quiet() -> ValidatorOptions {
    ValidatorOptions {
        warn_unused: false,
        ..ValidatorOptions::default()
    }
}

fn check_with(library: &StaticLibrary, script: &Script, options: ValidatorOptions) -> ValidationReport {
    let mut validator = Validator::with_options(library, options);
    let mut report = ValidationReport::new();
    validator.validate(script, &mut report).unwrap();
    report
}

fn check(script: &Script) -> ValidationReport {
    check_with(&StaticLibrary::standard(), script, quiet())
}

fn check_all(script: &Script) -> ValidationReport {
    check_with(&StaticLibrary::standard(), script, ValidatorOptions::default())
}

#[test]
fn clean_script_has_no_diagnostics() {
    let script = script_with_entry(vec![expr_stmt(call("llSay", vec![int(0), string("hello")]))]);
    let report = check_all(&script);
    assert!(report.errors.is_empty(), "{:?}", report.errors);
    assert!(report.warnings.is_empty(), "{:?}", report.warnings);
}

#[test]
fn missing_default_state() {
    let library = StaticLibrary::standard();
    let mut validator = Validator::new(&library);
    let mut report = ValidationReport::new();
    let out = validator.validate(&Script::default(), &mut report).unwrap();
    assert!(out.has_errors);
    assert_eq!(report.error_codes(), vec!["E0211"]);
}

#[test]
fn state_rules() {
    let mut script = script_with_entry(vec![state_change("other"), state_change("nowhere")]);
    script.states.push(state("other", vec![event("state_entry", vec![], vec![])]));
    script.states.push(state("other", vec![event("timer", vec![], vec![])]));
    script.states.push(state("default", vec![event("timer", vec![], vec![])]));
    script.states.push(state("empty", vec![]));
    let report = check(&script);
    let mut codes = report.error_codes();
    codes.sort();
    assert_eq!(codes, vec!["E0209", "E0210", "E0212", "E0215"]);
}

#[test]
fn event_handler_checks() {
    let mut script = script_with_entry(vec![]);
    let handlers = &mut script.default_state.as_mut().unwrap().handlers;
    handlers.push(event("state_entry", vec![], vec![]));
    handlers.push(event("no_such_event", vec![], vec![]));
    handlers.push(event("touch_start", vec![param(LslType::String, "n")], vec![]));
    let report = check(&script);
    let mut codes = report.error_codes();
    codes.sort();
    assert_eq!(codes, vec!["E0213", "E0214", "E0313"]);
    let signature = report
        .errors
        .iter()
        .find(|e| e.code() == "E0313")
        .map(|e| e.to_string())
        .unwrap();
    assert!(signature.contains("touch_start(integer num_detected)"), "{signature}");
}

#[test]
fn library_function_collision_is_not_registered() {
    let mut script = script_with_entry(vec![expr_stmt(call("llSay", vec![int(0), string("x")]))]);
    script
        .functions
        .push(function(LslType::Void, "llSay", vec![param(LslType::String, "m")], vec![]));
    let report = check(&script);
    assert_eq!(report.error_codes(), vec!["E0204"]);
}

#[test]
fn duplicate_functions_and_params() {
    let mut script = script_with_entry(vec![]);
    script.functions.push(function(
        LslType::Void,
        "f",
        vec![param(LslType::Integer, "a"), param(LslType::Float, "a")],
        vec![],
    ));
    script.functions.push(function(LslType::Void, "f", vec![], vec![]));
    let report = check(&script);
    let mut codes = report.error_codes();
    codes.sort();
    assert_eq!(codes, vec!["E0202", "E0203"]);
}

#[test]
fn shadowing_warnings() {
    let mut script = script_with_entry(vec![local(LslType::Integer, "g", Some(int(2)))]);
    script.globals.push(var(LslType::Integer, "g", Some(int(1))));
    script.functions.push(function(
        LslType::Void,
        "f",
        vec![param(LslType::Integer, "g"), param(LslType::Integer, "p")],
        vec![local(LslType::Integer, "p", Some(ident("g")))],
    ));
    let report = check(&script);
    assert!(report.errors.is_empty(), "{:?}", report.errors);
    let mut codes = report.warning_codes();
    codes.sort();
    assert_eq!(codes, vec!["W0009", "W0010", "W0011"]);
}

#[test]
fn redefinition_in_same_block_but_not_nested() {
    let script = script_with_entry(vec![
        local(LslType::Integer, "x", None),
        block(vec![local(LslType::Integer, "x", None)]),
        local(LslType::String, "x", None),
    ]);
    let report = check(&script);
    assert_eq!(report.error_codes(), vec!["E0201"]);
}

#[test]
fn library_constant_names_are_reserved() {
    let mut script = script_with_entry(vec![local(LslType::Integer, "TRUE", None)]);
    script.globals.push(var(LslType::Float, "PI", None));
    let report = check(&script);
    assert_eq!(report.error_codes(), vec!["E0205", "E0205"]);
}

#[test]
fn globals_see_only_earlier_globals() {
    let mut script = script_with_entry(vec![]);
    script.globals.push(var(LslType::Integer, "a", Some(ident("b"))));
    script.globals.push(var(LslType::Integer, "b", Some(int(1))));
    script.globals.push(var(LslType::Integer, "c", Some(ident("b"))));
    let report = check(&script);
    assert_eq!(report.error_codes(), vec!["E0200"]);
}

#[test]
fn static_context_rejects_calls_casts_operators_and_parens() {
    let mut script = script_with_entry(vec![]);
    script.globals.push(var(LslType::Integer, "a", Some(call("llAbs", vec![int(1)]))));
    script.globals.push(var(LslType::Float, "b", Some(cast(LslType::Float, int(1)))));
    script.globals.push(var(LslType::Integer, "c", Some(binary(BinaryOp::Add, int(1), int(2)))));
    script.globals.push(var(LslType::Integer, "d", Some(paren(int(1)))));
    script.globals.push(var(LslType::Integer, "e", Some(prefix(PrefixOp::Negate, int(1)))));
    script.globals.push(var(LslType::Vector, "f", Some(ident("ZERO_VECTOR"))));
    let report = check(&script);
    assert_eq!(report.error_codes(), vec!["E0500"; 4]);
}

#[test]
fn initializer_types_are_checked() {
    let script = script_with_entry(vec![
        local(LslType::Integer, "i", Some(string("a"))),
        local(LslType::Float, "f", Some(int(1))),
        local(LslType::Key, "k", Some(string("a"))),
        local(LslType::String, "s", Some(ident("NULL_KEY"))),
    ]);
    let report = check(&script);
    assert_eq!(report.error_codes(), vec!["E0304"]);
}

#[test]
fn user_call_arguments() {
    let mut script = script_with_entry(vec![
        expr_stmt(call("f", vec![int(1)])),
        expr_stmt(call("f", vec![string("x"), int(1)])),
        expr_stmt(call("f", vec![int(1), float("2.0")])),
        expr_stmt(call("missing", vec![])),
    ]);
    script.functions.push(function(
        LslType::Void,
        "f",
        vec![param(LslType::Float, "a"), param(LslType::Integer, "b")],
        vec![],
    ));
    let report = check(&script);
    assert_eq!(report.error_codes(), vec!["E0305", "E0306", "E0306", "E0208"]);
}

#[test]
fn overload_selection() {
    let library = StaticLibrary::standard()
        .with_function(LibraryFunction::new(
            "osPick",
            LslType::Integer,
            vec![LibraryParam::new("a", LslType::Integer)],
        ))
        .with_function(LibraryFunction::new(
            "osPick",
            LslType::String,
            vec![LibraryParam::new("a", LslType::String)],
        ))
        .with_function(LibraryFunction::new(
            "osPick",
            LslType::Key,
            vec![LibraryParam::new("a", LslType::Key)],
        ));

    let script = script_with_entry(vec![expr_stmt(call("osPick", vec![int(1)]))]);
    let mut validator = Validator::with_options(&library, quiet());
    let mut report = ValidationReport::new();
    let out = validator.validate(&script, &mut report).unwrap();
    assert!(report.errors.is_empty(), "{:?}", report.errors);
    let (target, ty) = (0..out.tree.len() as u32)
        .map(lsl_validate::NodeId)
        .find_map(|id| match out.tree.expr(id).map(|e| (&e.kind, e.ty)) {
            Some((ExpressionKind::Call { target, .. }, ty)) => Some((target.clone(), ty)),
            _ => None,
        })
        .unwrap();
    assert!(matches!(target, CallTarget::Library { ref params, .. } if params == &vec![LslType::Integer]));
    assert_eq!(ty, LslType::Integer);

    let script = script_with_entry(vec![
        expr_stmt(call("osPick", vec![string("a")])),
        expr_stmt(call("osPick", vec![float("1.0")])),
    ]);
    let report = check_with(&library, &script, quiet());
    assert_eq!(report.error_codes(), vec!["E0307"]);

    let library = StaticLibrary::new()
        .with_function(LibraryFunction::new("osTie", LslType::Void, vec![LibraryParam::new("a", LslType::String)]))
        .with_function(LibraryFunction::new("osTie", LslType::Void, vec![LibraryParam::new("a", LslType::Key)]))
        .with_event(lsl_library::LibraryEvent::new("state_entry", vec![]));
    let script = script_with_entry(vec![expr_stmt(call(
        "osTie",
        vec![call("osTie", vec![string("a")])],
    ))]);
    let report = check_with(&library, &script, quiet());
    assert_eq!(report.error_codes(), vec!["E0307"]);
    let script = script_with_entry(vec![expr_stmt(call("osTie", vec![ident("k")]))]);
    let report = check_with(&library, &script, quiet());
    assert_eq!(report.error_codes(), vec!["E0200"]);
}

#[test]
fn assignment_targets() {
    let script = script_with_entry(vec![
        local(LslType::Vector, "v", None),
        expr_stmt(binary(BinaryOp::Assign, component(ident("v"), Component::X), float("1.0"))),
        expr_stmt(assign("PI", float("1.0"))),
        expr_stmt(binary(BinaryOp::Assign, int(1), int(2))),
        expr_stmt(prefix(PrefixOp::Increment, ident("TRUE"))),
    ]);
    let report = check(&script);
    assert_eq!(report.error_codes(), vec!["E0315", "E0316", "E0315"]);
}

#[test]
fn component_access() {
    let script = script_with_entry(vec![
        local(LslType::Vector, "v", None),
        local(LslType::Rotation, "r", None),
        local(LslType::Float, "a", Some(component(ident("r"), Component::S))),
        local(LslType::Float, "b", Some(component(ident("v"), Component::S))),
        local(LslType::Float, "c", Some(component(ident("a"), Component::X))),
    ]);
    let report = check(&script);
    assert_eq!(report.error_codes(), vec!["E0314", "E0314"]);
}

#[test]
fn literal_checks() {
    let script = script_with_entry(vec![
        local(LslType::Vector, "v", Some(vector(int(1), string("a"), float("2.0")))),
        local(LslType::List, "l", Some(list(vec![int(1), list(vec![])]))),
        local(LslType::String, "s", Some(string("bad\\q"))),
    ]);
    let report = check(&script);
    assert_eq!(report.error_codes(), vec!["E0309", "E0310", "E0317"]);
}

#[test]
fn string_literals_are_normalized_in_tree() {
    let script = script_with_entry(vec![expr_stmt(call("llOwnerSay", vec![string("a\tb")]))]);
    let library = StaticLibrary::standard();
    let mut validator = Validator::new(&library);
    let mut report = ValidationReport::new();
    let out = validator.validate(&script, &mut report).unwrap();
    let found = (0..out.tree.len() as u32).map(lsl_validate::NodeId).any(|id| {
        matches!(out.tree.expr(id).map(|e| &e.kind), Some(ExpressionKind::String(s)) if s == "\"a\\tb\"")
    });
    assert!(found);
}

#[test]
fn returns() {
    let mut script = script_with_entry(vec![ret(int(1))]);
    script.functions.push(function(LslType::Void, "v", vec![], vec![ret(int(1))]));
    script.functions.push(function(LslType::Integer, "i", vec![], vec![ret_void()]));
    script.functions.push(function(LslType::Integer, "s", vec![], vec![ret(string("x"))]));
    script.functions.push(function(LslType::Float, "f", vec![], vec![ret(int(1))]));
    let report = check(&script);
    let mut codes = report.error_codes();
    codes.sort();
    assert_eq!(codes, vec!["E0400", "E0401", "E0402", "E0403"]);
}

#[test]
fn local_in_braceless_body() {
    let script = script_with_entry(vec![if_(ident("TRUE"), local(LslType::Integer, "x", None))]);
    let report = check(&script);
    assert_eq!(report.error_codes(), vec!["E0216"]);
    assert_eq!(report.warning_codes(), vec!["W0012"]);
}

#[test]
fn conditions_and_operators() {
    let script = script_with_entry(vec![
        if_(call("llOwnerSay", vec![string("x")]), empty()),
        local(LslType::Integer, "i", Some(binary(BinaryOp::Sub, string("a"), int(1)))),
        local(LslType::Integer, "j", Some(prefix(PrefixOp::Not, float("1.0")))),
        local(LslType::Integer, "k", Some(cast(LslType::Integer, vector(int(1), int(2), int(3))))),
    ]);
    let report = check(&script);
    assert_eq!(report.error_codes(), vec!["E0311", "E0300", "E0301", "E0303"]);
}

#[test]
fn undefined_operand_does_not_cascade() {
    let script = script_with_entry(vec![local(
        LslType::Integer,
        "x",
        Some(binary(BinaryOp::Add, ident("nope"), int(1))),
    )]);
    let report = check(&script);
    assert_eq!(report.error_codes(), vec!["E0200"]);
}

#[test]
fn statement_warnings() {
    let script = script_with_entry(vec![
        empty(),
        expr_stmt(ident("TRUE")),
        expr_stmt(cast(LslType::Integer, int(1))),
        expr_stmt(call("llSound", vec![string("a"), float("1.0"), int(0), int(0)])),
        local(LslType::Integer, "x", Some(ident("PRIM_CAST_SHADOWS"))),
        expr_stmt(postfix(lsl_ast::PostfixOp::Increment, ident("x"))),
    ]);
    let report = check(&script);
    assert!(report.errors.is_empty(), "{:?}", report.errors);
    let kinds: Vec<&WarningKind> = report.warnings.iter().map(|w| &w.kind).collect();
    assert!(kinds.contains(&&WarningKind::UselessSemicolon));
    assert!(kinds.contains(&&WarningKind::NoEffect));
    assert!(kinds.contains(&&WarningKind::RedundantCast { ty: LslType::Integer }));
    assert!(kinds.contains(&&WarningKind::DeprecatedFunction { name: "llSound".into() }));
    assert!(kinds.contains(&&WarningKind::DeprecatedConstant {
        name: "PRIM_CAST_SHADOWS".into()
    }));
    assert_eq!(report.warnings.len(), 6);
}

#[test]
fn unused_declarations() {
    let mut script = script_with_entry(vec![local(LslType::Integer, "unused", None)]);
    script.globals.push(var(LslType::Integer, "g", None));
    script.globals.push(var(LslType::Integer, "used", None));
    script.functions.push(function(
        LslType::Integer,
        "f",
        vec![param(LslType::Integer, "p")],
        vec![ret(ident("used"))],
    ));
    let report = check_all(&script);
    let mut codes = report.warning_codes();
    codes.sort();
    assert_eq!(codes, vec!["W0005", "W0006", "W0007", "W0008"]);
}

#[test]
fn references_are_recorded() {
    let mut script = script_with_entry(vec![
        expr_stmt(call("f", vec![])),
        expr_stmt(call("f", vec![])),
    ]);
    script.globals.push(var(LslType::Integer, "g", None));
    script
        .functions
        .push(function(LslType::Void, "f", vec![], vec![expr_stmt(assign("g", int(1)))]));
    let library = StaticLibrary::standard();
    let mut validator = Validator::new(&library);
    let mut report = ValidationReport::new();
    let out = validator.validate(&script, &mut report).unwrap();
    let root = out.script().unwrap();
    let f = out.tree.function(root.functions[0]).unwrap();
    assert_eq!(f.references.len(), 2);
    let g = out.tree.var_decl(root.globals[0]).unwrap();
    assert_eq!(g.references.len(), 1);
    let reference = out.tree.expr(g.references[0]).unwrap();
    assert!(matches!(
        &reference.kind,
        ExpressionKind::Variable { binding: Binding::Global(id), .. } if *id == root.globals[0]
    ));
    assert!(report.warnings.is_empty(), "{:?}", report.warnings);
}

#[test]
fn label_redefinition() {
    let script = script_with_entry(vec![label("a"), block(vec![label("a")])]);
    let report = check(&script);
    assert_eq!(report.error_codes(), vec!["E0206"]);
}

#[test]
fn diagnostics_are_ordered_by_position() {
    let script = script_with_entry(vec![
        expr_stmt(call("llOwnerSay", vec![ident("late").at(30, 34)]).at(20, 35)),
        expr_stmt(call("llOwnerSay", vec![ident("early").at(10, 15)]).at(0, 16)),
    ]);
    let report = check(&script);
    let spans: Vec<Span> = report.errors.iter().map(|e| e.span).collect();
    assert_eq!(spans, vec![Span::new(10, 15), Span::new(30, 34)]);

    let unsorted = check_with(
        &StaticLibrary::standard(),
        &script,
        ValidatorOptions {
            warn_unused: false,
            sort_diagnostics: false,
        },
    );
    let spans: Vec<Span> = unsorted.errors.iter().map(|e| e.span).collect();
    assert_eq!(spans, vec![Span::new(30, 34), Span::new(10, 15)]);
}

#[test]
fn validator_is_reusable() {
    let library = StaticLibrary::standard();
    let mut validator = Validator::with_options(&library, quiet());

    let bad = script_with_entry(vec![expr_stmt(ident("nope"))]);
    let mut first = ValidationReport::new();
    let out = validator.validate(&bad, &mut first).unwrap();
    assert!(out.has_errors);

    let good = script_with_entry(vec![expr_stmt(call("llOwnerSay", vec![string("ok")]))]);
    let mut second = ValidationReport::new();
    let out = validator.validate(&good, &mut second).unwrap();
    assert!(!out.has_errors);
    assert!(second.errors.is_empty());
    assert!(second.warnings.is_empty());
    assert!(matches!(out.tree.kind(out.root), Some(NodeKind::Script(_))));
}

#[test]
fn jump_statements_record_their_target() {
    let script = script_with_entry(vec![jump("x"), label("x")]);
    let library = StaticLibrary::standard();
    let mut validator = Validator::new(&library);
    let mut report = ValidationReport::new();
    let out = validator.validate(&script, &mut report).unwrap();
    let found = (0..out.tree.len() as u32).map(lsl_validate::NodeId).any(|id| {
        matches!(
            out.tree.stmt(id).map(|s| &s.kind),
            Some(StatementKind::Jump { target: Some(_), constant: true, .. })
        )
    });
    assert!(found);
}
