//! End-to-end compilation tests — script source → lexer → parser → both
//! generated programs.

use std::fs;
use std::io::Write;

use sessionc::{Compiler, SEPARATOR};

/// Helper: compile and panic on failure.
fn compile(src: &str) -> sessionc::CompiledSession {
    Compiler::compile(src).expect("compile failed")
}

fn interval_session_src() -> &'static str {
    "# 10k with intervals\n\
     run 2km (warmup);\n\
     repeat 3 times {\n\
     \x20 run 1km at 12.5kmh +- 0.5;\n\
     \x20 run 2m0s;\n\
     };\n\
     run indefinitely at 70% (cooldown);\n"
}

// =============================================================================
// Full sessions compile and number steps across repeats
// =============================================================================

#[test]
fn interval_session_compiles() {
    let compiled = compile(interval_session_src());
    assert!(compiled.diagnostics.is_empty());

    // warmup is step 0, the repeat children span 1..7, cooldown is 7
    assert!(compiled.remaining.contains("if (step == 0) {"));
    assert!(compiled
        .remaining
        .contains("if (step == 1 || step == 3 || step == 5) {"));
    assert!(compiled
        .remaining
        .contains("if (step == 2 || step == 4 || step == 6) {"));
    assert!(compiled.remaining.contains("if (step == 7) {"));
}

#[test]
fn one_block_per_leaf_in_both_programs() {
    let compiled = compile(interval_session_src());
    // 4 distinct leaves: warmup, two repeat children, cooldown
    assert_eq!(compiled.remaining.matches("if (step == ").count(), 4);
    assert_eq!(compiled.target.matches("if (step == ").count(), 4);
}

#[test]
fn remaining_program_carries_alerts_target_does_not() {
    let compiled = compile(interval_session_src());
    assert!(compiled.remaining.contains("Suunto.alarmBeep();"));
    assert!(compiled.remaining.contains("Suunto.light();"));
    assert!(!compiled.target.contains("Suunto.alarmBeep();"));
}

#[test]
fn target_program_classifies_both_target_kinds() {
    let compiled = compile(interval_session_src());
    assert!(compiled.target.contains("if (13 < SUUNTO_SPEED) {"));
    assert!(compiled
        .target
        .contains("if (71 < (SUUNTO_HR * 100 / SUUNTO_USER_MAX_HR)) {"));
    assert!(compiled.target.contains("prefix = \"cooldown\";"));
}

// =============================================================================
// Output assembly
// =============================================================================

#[test]
fn render_orders_remaining_separator_target() {
    let compiled = compile("run 5km;");
    let output = compiled.render();
    let sep_at = output.find(SEPARATOR).expect("separator missing");
    let result_remaining = output
        .find("RESULT = last_step_distance + 5 - SUUNTO_DISTANCE;")
        .expect("remaining RESULT missing");
    assert!(result_remaining < sep_at);
    // past the separator only the transition remains (no target attached)
    assert!(output[sep_at..].contains("if (step == 0) {"));
    assert!(!output[sep_at..].contains("RESULT"));
}

// =============================================================================
// Diagnostics
// =============================================================================

#[test]
fn lexical_recovery_still_compiles() {
    let compiled = compile("run & 5km;");
    assert_eq!(compiled.diagnostics.len(), 1);
    assert!(compiled.diagnostics[0].message.contains('&'));
    assert!(compiled.remaining.contains("if (step == 0) {"));
}

#[test]
fn lexical_recovery_can_cascade_into_syntax_error() {
    // the stray character leaves no way to complete a step
    let result = Compiler::compile("run &;");
    assert!(result.is_err());
}

#[test]
fn syntax_error_reports_line() {
    let err = Compiler::compile("run 5km;\nrepeat x times { run 1km; };").unwrap_err();
    assert_eq!(err.line, 2);
}

// =============================================================================
// Script file round-trip (the path the binary takes)
// =============================================================================

#[test]
fn compiles_from_script_file() {
    let mut file = tempfile::NamedTempFile::new().expect("tempfile");
    file.write_all(interval_session_src().as_bytes()).expect("write");

    let source = fs::read_to_string(file.path()).expect("read back");
    let compiled = compile(&source);
    assert!(compiled.remaining.contains("if (step == 7) {"));
}
