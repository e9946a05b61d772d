//! End-to-end evaluator tests: scripts in, observable effects out.

use picolet::{Interp, Status, TclError};
use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;

/// A cloneable sink that collects interpreter output for assertions.
#[derive(Clone, Default)]
struct Sink(Rc<RefCell<Vec<u8>>>);

impl Sink {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow()).into_owned()
    }
}

impl Write for Sink {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// An interpreter whose `puts` output lands in the returned sink.
fn interp_with_output() -> (Interp, Sink) {
    let mut interp = Interp::new();
    let sink = Sink::default();
    interp.set_output(Box::new(sink.clone()));
    (interp, sink)
}

#[test]
fn set_then_puts() {
    let (mut interp, out) = interp_with_output();

    assert_eq!(interp.eval("set x 5\nputs $x\n"), Ok(Status::Ok));
    assert_eq!(out.contents(), "5\n");
    assert_eq!(interp.result(), "5");
    assert_eq!(interp.var("x"), Some("5"));
}

#[test]
fn while_loop_counts_to_three() {
    let (mut interp, out) = interp_with_output();

    let script = "set i 0\nwhile {< $i 3} { set i [+ $i 1]; puts $i }\n";
    assert_eq!(interp.eval(script), Ok(Status::Ok));
    assert_eq!(out.contents(), "1\n2\n3\n");
    assert_eq!(interp.var("i"), Some("3"));
}

#[test]
fn proc_squares_via_command_substitution() {
    let (mut interp, out) = interp_with_output();

    let script = "proc sq {n} { return [* $n $n] }\nputs [sq 7]\n";
    assert_eq!(interp.eval(script), Ok(Status::Ok));
    assert_eq!(out.contents(), "49\n");
}

#[test]
fn if_takes_the_right_branch() {
    let (mut interp, out) = interp_with_output();
    interp
        .eval("if {== 1 1} { puts yes } else { puts no }\n")
        .expect("eval failed");
    assert_eq!(out.contents(), "yes\n");

    let (mut interp, out) = interp_with_output();
    interp
        .eval("if {== 1 2} { puts yes } else { puts no }\n")
        .expect("eval failed");
    assert_eq!(out.contents(), "no\n");
}

#[test]
fn undefined_variable_aborts_before_any_output() {
    let (mut interp, out) = interp_with_output();

    assert_eq!(
        interp.eval("puts \"hello $name\""),
        Err(TclError::VariableNotFound)
    );
    assert_eq!(interp.result(), "variable not found: 'name'");
    assert_eq!(out.contents(), "");
}

#[test]
fn braces_preserve_internal_spaces() {
    let (mut interp, out) = interp_with_output();

    interp.eval("set s {a b c}; puts $s\n").expect("eval failed");
    assert_eq!(out.contents(), "a b c\n");
}

#[test]
fn set_then_get_round_trip() {
    let mut interp = Interp::new();
    interp.eval("set v one").expect("eval failed");
    interp.eval("set v two").expect("eval failed");
    assert_eq!(interp.var("v"), Some("two"));
}

#[test]
fn puts_of_a_set_substitution_keeps_the_value_in_the_result() {
    let (mut interp, out) = interp_with_output();

    assert_eq!(interp.eval("puts [set x v]"), Ok(Status::Ok));
    assert_eq!(interp.var("x"), Some("v"));
    assert_eq!(out.contents(), "v\n");
    assert_eq!(interp.result(), "v");
}

#[test]
fn proc_return_leaves_result_and_a_balanced_stack() {
    let mut interp = Interp::new();

    assert_eq!(
        interp.eval("proc f {} { return 42 }\nf\n"),
        Ok(Status::Ok)
    );
    assert_eq!(interp.result(), "42");
    assert_eq!(interp.scope_level(), 0);
}

#[test]
fn procs_see_only_their_own_frame() {
    let mut interp = Interp::new();

    let script = "set g 1\nproc p {} { puts $g }\np\n";
    assert_eq!(interp.eval(script), Err(TclError::VariableNotFound));
    assert_eq!(interp.result(), "variable not found: 'g'");
    assert_eq!(interp.scope_level(), 0);
}

#[test]
fn command_substitution_runs_in_the_callers_frame() {
    let mut interp = Interp::new();

    interp.eval("set x [set y 5]").expect("eval failed");
    assert_eq!(interp.var("x"), Some("5"));
    assert_eq!(interp.var("y"), Some("5"));
}

#[test]
fn multiple_words_concatenate_into_one_argument() {
    let mut interp = Interp::new();

    interp.eval("set y 5\nset z \"x$y\"z\n").expect("eval failed");
    assert_eq!(interp.var("z"), Some("x5z"));
}

#[test]
fn break_and_continue_propagate_to_the_embedder() {
    let mut interp = Interp::new();
    assert_eq!(interp.eval("break"), Ok(Status::Break));
    assert_eq!(interp.eval("continue"), Ok(Status::Continue));
}

#[test]
fn frame_stack_is_balanced_after_errors_inside_procs() {
    let mut interp = Interp::new();

    interp.eval("proc boom {} { no_such_command }").expect("eval failed");
    assert_eq!(interp.eval("boom"), Err(TclError::CommandNotFound));
    assert_eq!(interp.scope_level(), 0);
}

#[test]
fn nested_procs_stack_and_unwind() {
    let mut interp = Interp::new();

    let script = "proc inner {n} { return [+ $n 1] }\n\
                  proc outer {n} { return [inner [inner $n]] }\n\
                  outer 5\n";
    assert_eq!(interp.eval(script), Ok(Status::Ok));
    assert_eq!(interp.result(), "7");
    assert_eq!(interp.scope_level(), 0);
}

#[test]
fn empty_script_leaves_an_empty_result() {
    let (mut interp, out) = interp_with_output();

    assert_eq!(interp.eval(""), Ok(Status::Ok));
    assert_eq!(interp.result(), "");

    assert_eq!(interp.eval("# only a comment\n"), Ok(Status::Ok));
    assert_eq!(interp.result(), "");
    assert_eq!(out.contents(), "");
}

#[test]
fn comments_are_skipped_between_commands() {
    let (mut interp, out) = interp_with_output();

    let script = "# leading comment\nputs one\n# middle comment\nputs two\n";
    interp.eval(script).expect("eval failed");
    assert_eq!(out.contents(), "one\ntwo\n");
}

#[test]
fn trace_records_land_on_the_diagnostic_sink() {
    let mut interp = Interp::new();
    let diag = Sink::default();
    interp.set_diagnostic(Box::new(diag.clone()));
    interp.set_trace_parser(true);

    interp.eval("set x 5\n").expect("eval failed");

    let trace = diag.contents();
    let lines: Vec<&str> = trace.lines().collect();
    assert_eq!(
        lines[0],
        "{\"type\":\"TK_ESC\",\"begin\":0,\"end\":3,\"body\":\"set\"}"
    );
    assert_eq!(
        lines[1],
        "{\"type\":\"TK_SEP\",\"begin\":3,\"end\":4,\"body\":\" \"}"
    );
    // One record per token, EOF included.
    assert_eq!(lines.len(), 7);
    assert_eq!(
        lines[6],
        "{\"type\":\"TK_EOF\",\"begin\":8,\"end\":8,\"body\":\"\"}"
    );
}

#[test]
fn tracing_is_off_by_default() {
    let mut interp = Interp::new();
    let diag = Sink::default();
    interp.set_diagnostic(Box::new(diag.clone()));

    interp.eval("set x 5\n").expect("eval failed");
    assert_eq!(diag.contents(), "");
}
