//! Shell support for the picolet interpreter: a rustyline REPL, a script
//! runner, and a parser-only token dump.
//!
//! # Example
//!
//! ```no_run
//! use picolet::Interp;
//!
//! // FIRST, create and initialize the interpreter.
//! let mut interp = Interp::new();
//!
//! // NOTE: host commands can be added to the interpreter here.
//!
//! // NEXT, invoke the REPL.
//! picolet_shell::repl(&mut interp);
//! ```

mod shell;

pub use shell::{dump_tokens, repl, script};
