//! End-to-end scenarios, compiling and running each snippet through the
//! full pipeline and asserting on captured stdout.

use ape_compiler::CompilerConfig;
use ape_runtime::Vm;
use std::io::Cursor;

fn run(source: &str) -> String {
    let bytecode = ape_compiler::compile_to_bytes(source, CompilerConfig::new())
        .unwrap_or_else(|e| panic!("compile error: {e}"));
    let mut vm = Vm::new(Vec::new(), Cursor::new(Vec::new()));
    vm.run_script(bytecode)
        .unwrap_or_else(|e| panic!("runtime error: {e}"));
    String::from_utf8(vm.out().clone()).unwrap()
}

fn run_with_input(source: &str, input: &str) -> String {
    let bytecode = ape_compiler::compile_to_bytes(source, CompilerConfig::new()).unwrap();
    let mut vm = Vm::new(Vec::new(), Cursor::new(input.as_bytes().to_vec()));
    vm.run_script(bytecode).unwrap();
    String::from_utf8(vm.out().clone()).unwrap()
}

#[test]
fn scenario_arithmetic() {
    assert_eq!(run("ape x = 2  ape y = 3  tree x ooh y"), "5\n");
}

#[test]
fn scenario_string_concat() {
    assert_eq!(run(r#"ape s = "fo" ooh "ob" ooh "ar"  tree s"#), "foobar\n");
}

#[test]
fn scenario_function_call() {
    assert_eq!(run("tribe add(a,b) { give a ooh b }  tree add(10, 32)"), "42\n");
}

#[test]
fn scenario_while_loop() {
    assert_eq!(run("ape n = 0  banana (n < 3) { tree n  n = n ooh 1 }"), "0\n1\n2\n");
}

#[test]
fn scenario_tumble_catch_unwinds_on_nil_arithmetic() {
    let output = run(r#"tumble { ape b = [1,2]  tree b[9] aah 1 } catch (e) { tree "caught" }"#);
    assert_eq!(output, "caught\n");
}

#[test]
fn scenario_canopy_subscript_assignment() {
    let output = run(r#"ape m = {"k": 1}  m["k"] = m["k"] ooh 41  tree m["k"]"#);
    assert_eq!(output, "42\n");
}

#[test]
fn ask_empty_input_is_nil() {
    assert_eq!(run_with_input("tree ask()", ""), "nil\n");
}

#[test]
fn ask_numeric_input_parses_as_number() {
    assert_eq!(run_with_input("tree ask()", "-12.5\n"), "-12.5\n");
}

#[test]
fn ask_non_numeric_input_is_a_string() {
    assert_eq!(run_with_input("tree ask()", "hello\n"), "hello\n");
}

#[test]
fn bunch_out_of_range_get_is_nil() {
    assert_eq!(run("ape b = [1,2]  tree b[9]"), "nil\n");
}

#[test]
fn canopy_missing_key_is_nil() {
    assert_eq!(run(r#"ape m = {"k": 1}  tree m["missing"]"#), "nil\n");
}
