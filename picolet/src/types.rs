//! Core status and error types.

use crate::interp::Interp;

/// The non-error outcome of evaluating a script or running a command.
///
/// `Return`, `Break`, and `Continue` are ordinary values rather than errors:
/// the `while` command and the procedure-call shim inspect them to implement
/// non-local control flow, and anything they don't handle propagates out of
/// [`Interp::eval`](crate::Interp::eval) to the embedder.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    Ok,
    Return,
    Break,
    Continue,
}

/// What went wrong.  The human-readable message is left in the interpreter's
/// result slot; the kind classifies the cause.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TclError {
    /// Anything without a more specific kind.
    General,
    /// Wrong number of arguments to a command or procedure.
    Arity,
    /// Dispatch found no command under the given name.
    CommandNotFound,
    /// Registration would overwrite an existing command.
    CommandAlreadyDefined,
    /// Variable substitution found no variable in the current frame.
    VariableNotFound,
    /// An argument failed an integer check.
    NotAnInteger,
    /// The arithmetic handler was registered under an unknown name.
    UnknownOperator,
    /// Integer division by zero.
    DivisionByZero,
    /// The eval nesting depth exceeded the recursion limit.
    TooManyNestedCalls,
    /// The output sink refused a write.
    Output,
}

/// The outcome of evaluating a script or running a command handler.
pub type TclResult = Result<Status, TclError>;

/// A native command handler.  Receives the interpreter and the substituted
/// argument vector; `argv[0]` is the name the command was invoked under.
pub type CommandFunc = fn(&mut Interp, &[String]) -> TclResult;
