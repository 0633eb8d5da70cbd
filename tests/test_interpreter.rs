mod common;

use common::{dstack, engine, engine_with_capture, signed};
use forge::error::Abort;

#[test]
fn unknown_word_aborts_with_the_token() {
    let mut e = engine();
    let err = e.evaluate("FOO").unwrap_err();
    assert_eq!(err, Abort::UnknownWord("FOO".to_string()));
    assert_eq!(err.to_string(), "unrecognized word: FOO");
}

#[test]
fn numbers_parse_in_the_current_base() {
    let mut e = engine();
    e.evaluate("2 BASE ! 101 DECIMAL").unwrap();
    assert_eq!(dstack(&e), vec![5]);

    let mut e = engine();
    e.evaluate("HEX ff DECIMAL").unwrap();
    assert_eq!(dstack(&e), vec![255]);

    let mut e = engine();
    e.evaluate("HEX -FF DECIMAL").unwrap();
    assert_eq!(signed(&e), vec![-255]);
}

#[test]
fn digits_outside_the_base_fail_to_parse() {
    let mut e = engine();
    let err = e.evaluate("2 BASE ! 102").unwrap_err();
    assert_eq!(err, Abort::UnknownWord("102".to_string()));
}

#[test]
fn a_bare_minus_is_not_a_number() {
    let mut e = engine();
    assert!(e.evaluate("-").is_err());
}

#[test]
fn negative_numbers_wrap_through_the_cell() {
    let mut e = engine();
    e.evaluate("-1").unwrap();
    assert_eq!(dstack(&e), vec![usize::MAX]);
}

#[test]
fn paren_comments_are_skipped() {
    let mut e = engine();
    e.evaluate("1 ( this is a comment ) 2").unwrap();
    assert_eq!(dstack(&e), vec![1, 2]);
}

#[test]
fn backslash_skips_the_rest_of_the_line() {
    let mut e = engine();
    e.evaluate("1 \\ 2 3 4").unwrap();
    assert_eq!(dstack(&e), vec![1]);
}

#[test]
fn to_in_can_be_stored_to_skip_input() {
    let mut e = engine();
    e.evaluate("SOURCE NIP >IN ! 99").unwrap();
    assert!(dstack(&e).is_empty());
}

#[test]
fn evaluate_runs_a_string() {
    let mut e = engine();
    e.evaluate("S\" 1 2 +\" EVALUATE").unwrap();
    assert_eq!(dstack(&e), vec![3]);
}

#[test]
fn evaluate_restores_the_outer_source() {
    let mut e = engine();
    e.evaluate("S\" 5\" EVALUATE 6").unwrap();
    assert_eq!(dstack(&e), vec![5, 6]);
}

#[test]
fn if_else_then() {
    let mut e = engine();
    e.evaluate(": T IF 1 ELSE 2 THEN ;").unwrap();
    e.evaluate("-1 T 0 T").unwrap();
    assert_eq!(dstack(&e), vec![1, 2]);
}

#[test]
fn if_then_without_else() {
    let mut e = engine();
    e.evaluate(": T DUP 0< IF NEGATE THEN ;").unwrap();
    e.evaluate("-9 T 9 T").unwrap();
    assert_eq!(dstack(&e), vec![9, 9]);
}

#[test]
fn begin_until_loops() {
    let mut e = engine();
    e.evaluate(": COUNTDOWN BEGIN 1- DUP 0= UNTIL DROP ;").unwrap();
    e.evaluate("5 COUNTDOWN").unwrap();
    assert!(dstack(&e).is_empty());
}

#[test]
fn begin_while_repeat_loops() {
    let mut e = engine();
    e.evaluate(": SUM 0 SWAP BEGIN DUP 0> WHILE TUCK + SWAP 1- REPEAT DROP ;")
        .unwrap();
    e.evaluate("5 SUM").unwrap();
    assert_eq!(dstack(&e), vec![15]);
}

#[test]
fn s_quote_in_interpret_state() {
    let (mut e, out) = engine_with_capture();
    e.evaluate("S\" hi there\" TYPE").unwrap();
    assert_eq!(out.text(), "hi there");
}

#[test]
fn s_quote_compiled_into_a_definition() {
    let (mut e, out) = engine_with_capture();
    e.evaluate(": GREETING S\" hello\" ;").unwrap();
    e.evaluate("GREETING TYPE GREETING TYPE").unwrap();
    assert_eq!(out.text(), "hellohello");
}

#[test]
fn dot_quote_prints_at_runtime() {
    let (mut e, out) = engine_with_capture();
    e.evaluate(": T .\" hey\" ; T T").unwrap();
    assert_eq!(out.text(), "heyhey");
}

#[test]
fn abort_quote_fires_only_on_a_true_flag() {
    let mut e = engine();
    e.evaluate(": CHECK 0= ABORT\" must be nonzero\" ;").unwrap();
    e.evaluate("1 CHECK").unwrap();
    assert!(dstack(&e).is_empty());

    let err = e.evaluate("0 CHECK").unwrap_err();
    assert_eq!(err.to_string(), "must be nonzero");
}

#[test]
fn abort_quote_in_interpret_state() {
    let mut e = engine();
    e.evaluate("0 ABORT\" boom\"").unwrap();
    let err = e.evaluate("-1 ABORT\" boom\"").unwrap_err();
    assert_eq!(err.to_string(), "boom");
}

#[test]
fn plain_abort_carries_no_message() {
    let mut e = engine();
    let err = e.evaluate("ABORT").unwrap_err();
    assert_eq!(err.to_string(), "");
}

#[test]
fn bootstrap_arithmetic_conveniences() {
    let mut e = engine();
    e.evaluate("-7 ABS 3 4 MIN 3 4 MAX 7 3 MOD").unwrap();
    assert_eq!(dstack(&e), vec![7, 3, 4, 1]);
}

#[test]
fn spaces_emits_that_many_blanks() {
    let (mut e, out) = engine_with_capture();
    e.evaluate("3 SPACES 0 SPACES").unwrap();
    assert_eq!(out.text(), "   ");
}

#[test]
fn to_num_handles_signs_and_partial_input() {
    let mut e = engine();
    e.evaluate("0 S\" 123\" >NUM").unwrap();
    let values = signed(&e);
    assert_eq!(values[0], 123);
    assert_eq!(values[2], 0);

    let mut e = engine();
    e.evaluate("0 S\" -45\" >NUM").unwrap();
    let values = signed(&e);
    assert_eq!(values[0], -45);
    assert_eq!(values[2], 0);
}

#[test]
fn to_unum_accumulates_onto_the_running_value() {
    let mut e = engine();
    e.evaluate("7 S\" 89xy\" >UNUM").unwrap();
    let values = dstack(&e);
    assert_eq!(values[0], 789);
    assert_eq!(values[2], 2);
}

#[test]
fn word_returns_a_counted_string() {
    let mut e = engine();
    e.evaluate("BL WORD HELLO C@").unwrap();
    assert_eq!(dstack(&e), vec![5]);
}

#[test]
fn word_at_end_of_input_returns_an_empty_token() {
    let mut e = engine();
    e.evaluate("BL WORD").unwrap();
    e.evaluate("C@").unwrap();
    assert_eq!(dstack(&e), vec![0]);
}

#[test]
fn parse_does_not_skip_leading_delimiters() {
    let mut e = engine();
    // One space remains after the one WORD consumed, so PARSE sees " abc".
    e.evaluate("CHAR ) PARSE  abc) NIP").unwrap();
    assert_eq!(dstack(&e), vec![4]);
}
