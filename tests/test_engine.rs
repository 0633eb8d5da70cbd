mod common;

use common::{dstack, engine, run_lines, run_lines_with_args};
use forge::dataspace::STATE_ADDR;
use forge::dictionary::Code;
use forge::stack::{FALSE, TRUE};

// End-to-end transcripts. Each feeds lines through the full QUIT loop and
// compares everything written to standard output, including the newline
// emitted at end-of-input.

#[test]
fn transcript_addition() {
    assert_eq!(run_lines(&["1 2 + ."]), "3   ok\n\n");
}

#[test]
fn transcript_colon_definition() {
    assert_eq!(
        run_lines(&[": SQUARE DUP * ;", "7 SQUARE ."]),
        "  ok\n49   ok\n\n"
    );
}

#[test]
fn transcript_radix_switch() {
    assert_eq!(run_lines(&["HEX", "10 DECIMAL ."]), "  ok\n16   ok\n\n");
}

#[test]
fn transcript_counter() {
    assert_eq!(
        run_lines(&[": COUNTER 0 ;", "COUNTER 1+ ."]),
        "  ok\n1   ok\n\n"
    );
}

#[test]
fn transcript_variable() {
    assert_eq!(
        run_lines(&["VARIABLE X", "42 X ! X @ ."]),
        "  ok\n42   ok\n\n"
    );
}

#[test]
fn transcript_constant() {
    assert_eq!(
        run_lines(&["5 CONSTANT FIVE", "FIVE FIVE + ."]),
        "  ok\n10   ok\n\n"
    );
}

#[test]
fn transcript_deferred_constant() {
    // A defining word used inside a colon definition parses the new name
    // from the input at its own runtime.
    assert_eq!(
        run_lines(&[": C 5 CONSTANT ;", "C FIVE", "FIVE FIVE + ."]),
        "  ok\n  ok\n10   ok\n\n"
    );
}

#[test]
fn transcript_zero_divisor() {
    assert_eq!(
        run_lines(&["1 0 /"]),
        "<<< Error: /: zero divisor >>>\n  ok\n\n"
    );
}

#[test]
fn transcript_unknown_word() {
    assert_eq!(
        run_lines(&["FOO"]),
        "<<< Error: unrecognized word: FOO >>>\n  ok\n\n"
    );
}

#[test]
fn multi_line_definition_suppresses_the_prompt() {
    assert_eq!(
        run_lines(&[": TWICE", "2 * ;", "21 TWICE ."]),
        "  ok\n42   ok\n\n"
    );
}

#[test]
fn empty_lines_still_prompt() {
    assert_eq!(run_lines(&["", ""]), "  ok\n  ok\n\n");
}

#[test]
fn abort_resets_both_stacks_and_state() {
    let (engine, output) = run_lines_with_args(&["forge"], &["1 2 3 1 0 /", ""]);
    assert_eq!(
        output,
        "<<< Error: /: zero divisor >>>\n  ok\n  ok\n\n"
    );
    assert!(engine.dstack.is_empty());
    assert!(engine.rstack.is_empty());
    assert_eq!(engine.data.cell_at(STATE_ADDR, "STATE").unwrap(), FALSE);
}

#[test]
fn bye_leaves_the_loop_without_the_eof_newline() {
    assert_eq!(run_lines(&["1 2 +", "BYE", "3"]), "  ok\n");
}

#[test]
fn quit_is_not_reentrant() {
    assert_eq!(
        run_lines(&["QUIT"]),
        "<<< Error: QUIT: nested entry >>>\n  ok\n\n"
    );
}

#[test]
fn arguments_are_exposed() {
    let (_, output) = run_lines_with_args(&["forge", "alpha"], &["#ARG .", "1 ARG TYPE"]);
    assert_eq!(output, "2   ok\nalpha  ok\n\n");
}

#[test]
fn argument_index_out_of_range_aborts() {
    let (_, output) = run_lines_with_args(&["forge"], &["5 ARG"]);
    assert_eq!(output, "<<< Error: ARG: invalid index >>>\n  ok\n\n");
}

#[test]
fn invariants_hold_after_every_step() {
    let steps = [
        "1 2 3",
        ": SQUARE DUP * ;",
        "4 SQUARE",
        "VARIABLE V 9 V !",
        "HEX FF DECIMAL",
        "5 CONSTANT C5 C5",
    ];
    let mut e = engine();
    for step in steps {
        e.evaluate(step).unwrap();
        assert!(e.dstack.depth() <= e.dstack.capacity());
        assert!(e.rstack.depth() <= e.rstack.capacity());
        assert!(e.data.here() <= e.data.size());
        let state = e.data.cell_at(STATE_ADDR, "STATE").unwrap();
        assert!(state == FALSE || state == TRUE);
        for word in e.dict.iter() {
            match word.code {
                Code::Primitive(_) | Code::Colon | Code::Create | Code::Does => {}
            }
        }
    }
}

#[test]
fn reset_rebuilds_a_clean_engine() {
    let mut e = engine();
    e.evaluate(": JUNK 1 ;").unwrap();
    e.evaluate("1 2 3").unwrap();
    e.reset().unwrap();
    assert!(e.dstack.is_empty());
    assert!(e.evaluate("JUNK").is_err());
    e.evaluate("1 2 + ").unwrap();
    assert_eq!(dstack(&e), vec![3]);
}

#[test]
fn engines_are_independent() {
    let mut a = engine();
    let mut b = engine();
    a.evaluate(": ONLY-IN-A 1 ;").unwrap();
    a.evaluate("ONLY-IN-A").unwrap();
    assert_eq!(dstack(&a), vec![1]);
    assert!(b.evaluate("ONLY-IN-A").is_err());
}
