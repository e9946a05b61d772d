//! picolet: a minimal embeddable Tcl-dialect interpreter.
//!
//! picolet is a descendant of the "picol" miniature Tcl: a single-threaded
//! engine that lexes source text into tokens, substitutes variables and
//! nested command results, and dispatches to built-in or user-defined
//! procedures.  Everything is a string; control flow is a small set of
//! status codes.
//!
//! The [`Interp`] struct is the embedding API:
//!
//! ```
//! use picolet::Interp;
//!
//! let mut interp = Interp::new();
//! interp
//!     .eval("proc double {n} { return [+ $n $n] }")
//!     .expect("proc definition failed");
//! interp.eval("double 21").expect("call failed");
//! assert_eq!(interp.result(), "42");
//! ```
//!
//! The [`Parser`] is public as well, so a host can lex without evaluating
//! (the shell's `--parser-only` mode does exactly that).

pub mod commands;
pub mod interp;
pub mod parser;
mod scope;
pub mod types;

pub use interp::Interp;
pub use parser::{Parser, Token};
pub use types::{CommandFunc, Status, TclError, TclResult};

/// Validates a command's argument count, storing the standard arity error in
/// the interpreter's result slot on mismatch.
///
/// Commands with a fixed argument count pass `min == max` and get the short
/// message form; commands with a range get the bracketed form.
///
/// # Example
///
/// ```
/// use picolet::{check_args, Interp, Status, TclResult};
///
/// fn cmd_shout(interp: &mut Interp, argv: &[String]) -> TclResult {
///     check_args(interp, argv, 2, 2)?;
///     interp.set_result(argv[1].to_uppercase());
///     Ok(Status::Ok)
/// }
///
/// let mut interp = Interp::new();
/// interp.register_command("shout", cmd_shout).expect("name is free");
/// interp.eval("shout hi").expect("eval failed");
/// assert_eq!(interp.result(), "HI");
/// ```
pub fn check_args(
    interp: &mut Interp,
    argv: &[String],
    min: usize,
    max: usize,
) -> Result<(), TclError> {
    if min == max && argv.len() != min {
        let message = format!("wrong number of args for {} (expected {})", argv[0], min);
        return Err(interp.error(TclError::Arity, message));
    }

    if argv.len() < min || argv.len() > max {
        let message = format!(
            "[{}]: wrong number of args (expected {} to {})",
            argv[0], min, max
        );
        return Err(interp.error(TclError::Arity, message));
    }

    Ok(())
}
