// SPDX-License-Identifier: (MIT OR Apache-2.0)

//! End-to-end generation from built syntax trees.

use lsl_ast::build::*;
use lsl_ast::{BinaryOp, Component, LslType, PostfixOp, Script, Stmt};
use lsl_codegen::{CSharpGenerator, CodegenError, CompilerSettings};
use lsl_library::StaticLibrary;
use lsl_validate::{ValidatedScript, ValidationReport, Validator};

fn validate(script: &Script) -> ValidatedScript {
    let library = StaticLibrary::standard();
    let mut validator = Validator::new(&library);
    let mut report = ValidationReport::new();
    let out = validator.validate(script, &mut report).unwrap();
    assert!(!out.has_errors, "{:?}", report.errors);
    out
}

fn generate(script: &Script) -> String {
    CSharpGenerator::new(CompilerSettings::default())
        .generate(&validate(script))
        .unwrap()
}

fn say(text: &str) -> Stmt {
    expr_stmt(call("llOwnerSay", vec![string(text)]))
}

fn entry_script(globals: Vec<lsl_ast::VarDecl>, body: Vec<Stmt>) -> Script {
    Script {
        globals,
        ..script_with_entry(body)
    }
}

#[test]
fn library_calls_take_native_arguments() {
    let out = generate(&script_with_entry(vec![say("hello")]));
    assert!(out.contains("public void default_event_state_entry()"));
    assert!(out.contains("this.llOwnerSay(\"hello\");"));
    assert!(out.contains("private static class UTILITIES"));
}

#[test]
fn one_stub_per_operator_signature() {
    let script = script_with_entry(vec![
        local(LslType::Integer, "a", Some(int(1))),
        expr_stmt(assign("a", binary(BinaryOp::Add, ident("a"), int(2)))),
        expr_stmt(assign("a", binary(BinaryOp::Add, ident("a"), int(3)))),
        local(LslType::Float, "f", Some(binary(BinaryOp::Add, float("1.0"), int(2)))),
        expr_stmt(call("llOwnerSay", vec![cast(LslType::String, ident("f"))])),
    ]);
    let out = generate(&script);

    let decl = "private LSL_Types.LSLInteger _op_Integer_Add_Integer(LSL_Types.LSLInteger right, LSL_Types.LSLInteger left)";
    assert_eq!(out.matches(decl).count(), 1);
    assert_eq!(out.matches("private LSL_Types.LSLFloat _op_Float_Add_Integer(").count(), 1);
    assert!(out.contains("return left + right;"));
}

#[test]
fn logical_operators_evaluate_right_first_without_short_circuit() {
    let script = entry_script(
        vec![
            var(LslType::Integer, "a", Some(int(1))),
            var(LslType::Integer, "b", Some(int(0))),
        ],
        vec![if_(binary(BinaryOp::And, ident("a"), ident("b")), say("both"))],
    );
    let out = generate(&script);
    assert!(out.contains(
        "if((((bool)(this.Globals.GV_b))&((bool)(this.Globals.GV_a))))"
    ));
    assert!(out.contains("this.GV_a = new LSL_Types.LSLInteger(1);"));
    assert!(out.contains("private GLOBALS Globals = new GLOBALS();"));
}

#[test]
fn unreferenced_globals_and_functions_are_omitted() {
    let script = Script {
        globals: vec![var(LslType::String, "unused", Some(string("x")))],
        functions: vec![function(LslType::Void, "never", vec![], vec![say("x")])],
        ..script_with_entry(vec![say("hi")])
    };
    let out = generate(&script);
    assert!(!out.contains("GV_unused"));
    assert!(!out.contains("FN_never"));
    assert!(!out.contains("class GLOBALS"));
}

#[test]
fn list_arguments_to_user_functions_are_copied() {
    let script = Script {
        globals: vec![var(LslType::List, "g", Some(list(vec![])))],
        functions: vec![function(
            LslType::Void,
            "show",
            vec![param(LslType::List, "l")],
            vec![expr_stmt(call(
                "llOwnerSay",
                vec![cast(LslType::String, call("llGetListLength", vec![ident("l")]))],
            ))],
        )],
        ..script_with_entry(vec![
            expr_stmt(call("show", vec![ident("g")])),
            expr_stmt(call("show", vec![list(vec![int(1)])])),
        ])
    };
    let out = generate(&script);
    assert!(out.contains("public void FN_show(LSL_Types.list PM_l)"));
    assert!(out.contains("FN_show(this.Globals.GV_g);"));
    assert!(out.contains(
        "FN_show(UTILITIES.CopyList((new LSL_Types.list(new LSL_Types.LSLInteger(1)))));"
    ));
    assert!(out.contains("this.llGetListLength(PM_l)"));
}

#[test]
fn jumped_over_declaration_reads_as_default() {
    let script = script_with_entry(vec![
        jump("over"),
        local(LslType::Integer, "x", Some(int(5))),
        label("over"),
        expr_stmt(call("llOwnerSay", vec![cast(LslType::String, ident("x"))])),
    ]);
    let out = generate(&script);
    assert!(out.contains("goto LSLLabel_over;"));
    assert!(out.contains("LSLLabel_over:;"));
    assert!(out.contains("UTILITIES.DefaultInteger"));
    assert!(!out.contains("LSLInteger(5)"));
}

#[test]
fn code_after_return_is_not_emitted() {
    let script = script_with_entry(vec![say("before"), ret_void(), say("after")]);
    let out = generate(&script);
    assert!(out.contains("\"before\""));
    assert!(!out.contains("\"after\""));
}

#[test]
fn block_with_its_own_label_keeps_following_code() {
    let script = script_with_entry(vec![block(vec![block(vec![jump("L"), label("L")]), say("reachable")])]);
    let out = generate(&script);
    assert!(out.contains("goto LSLLabel_L;"));
    assert!(out.contains("this.llOwnerSay(\"reachable\");"));
}

#[test]
fn label_after_return_keeps_following_code() {
    let script = script_with_entry(vec![
        local(LslType::Integer, "c", Some(int(1))),
        if_(ident("c"), jump("L")),
        ret_void(),
        say("skipped"),
        label("L"),
        say("reachable"),
    ]);
    let out = generate(&script);
    assert!(out.contains("LSLLabel_L:;"));
    assert!(out.contains("this.llOwnerSay(\"reachable\");"));
    assert!(!out.contains("\"skipped\""));
}

#[test]
fn writes_to_components_of_jumped_over_locals_keep_only_the_value() {
    let v_x = || component(ident("v"), Component::X);
    let script = script_with_entry(vec![
        jump("over"),
        local(LslType::Vector, "v", None),
        label("over"),
        expr_stmt(binary(BinaryOp::Assign, v_x(), float("1.0"))),
        expr_stmt(binary(BinaryOp::AddAssign, v_x(), float("2.0"))),
        expr_stmt(postfix(PostfixOp::Increment, component(ident("v"), Component::Y))),
        local(LslType::Float, "f", Some(binary(BinaryOp::Assign, v_x(), float("3.0")))),
        expr_stmt(call("llOwnerSay", vec![cast(LslType::String, ident("f"))])),
    ]);
    let out = generate(&script);
    assert!(!out.contains("DefaultVector.x="));
    assert!(!out.contains("DefaultVector.x+="));
    assert!(!out.contains("DefaultVector.y++"));
    assert!(out.contains("UTILITIES.ForceStatement(new LSL_Types.LSLFloat(1.0));"));
    assert!(out.contains("UTILITIES.ForceStatement(new LSL_Types.LSLFloat(2.0));"));
    assert!(out.contains("UTILITIES.ForceStatement(UTILITIES.DefaultVector.y);"));
    assert!(out.contains("_f = (new LSL_Types.LSLFloat(3.0));"));
}

#[test]
fn states_get_prefixed_handlers() {
    let script = Script {
        states: vec![state("open", vec![event("state_entry", vec![], vec![say("open")])])],
        ..script_with_entry(vec![state_change("open")])
    };
    let out = generate(&script);
    assert!(out.contains("public void open_event_state_entry()"));
    assert!(out.contains("this.state(\"open\");"));
    let named = out.find("User Defined State Event Handlers").unwrap();
    let default = out.find("Default State Event Handlers").unwrap();
    assert!(named < default);
}

#[test]
fn server_settings_wrap_and_insert_coop_checks() {
    let script = script_with_entry(vec![while_(int(1), say("spin"))]);
    let settings = CompilerSettings::opensim_server().with_coop_termination();
    let out = CSharpGenerator::new(settings).generate(&validate(&script)).unwrap();

    assert!(out.starts_with("using OpenSim.Region.ScriptEngine.Shared;"));
    assert!(out.contains("namespace SecondLife"));
    assert!(out.contains(
        "public class XEngineScript : OpenSim.Region.ScriptEngine.XEngine.ScriptBase.XEngineScriptBase"
    ));
    assert!(out.contains(
        "public XEngineScript(System.Threading.WaitHandle coopSleepHandle) : base(coopSleepHandle)"
    ));
    // Event body and loop body.
    assert_eq!(out.matches("opensim_reserved_CheckForCoopTermination();").count(), 2);
    assert!(out.trim_end().ends_with('}'));
}

#[test]
fn scripts_with_errors_are_rejected() {
    let library = StaticLibrary::standard();
    let mut validator = Validator::new(&library);
    let mut report = ValidationReport::new();
    let script = script_with_entry(vec![expr_stmt(assign("missing", int(1)))]);
    let out = validator.validate(&script, &mut report).unwrap();
    assert!(out.has_errors);

    let err = CSharpGenerator::new(CompilerSettings::default())
        .generate(&out)
        .unwrap_err();
    assert!(matches!(err, CodegenError::InvalidInput(_)));
}

#[test]
fn reused_generator_is_deterministic() {
    let with_stub = validate(&script_with_entry(vec![
        local(LslType::Integer, "a", Some(binary(BinaryOp::Mul, int(2), int(3)))),
        expr_stmt(call("llOwnerSay", vec![cast(LslType::String, ident("a"))])),
    ]));
    let plain = validate(&script_with_entry(vec![say("x")]));

    let mut generator = CSharpGenerator::new(CompilerSettings::default());
    let first = generator.generate(&with_stub).unwrap();
    let other = generator.generate(&plain).unwrap();
    let again = generator.generate(&with_stub).unwrap();

    assert_eq!(first, again);
    assert!(!other.contains("_op_"));

    let mut sink = Vec::new();
    generator.write_to(&with_stub, &mut sink).unwrap();
    assert_eq!(String::from_utf8(sink).unwrap(), first);
}
