//! The picolet interpreter.
//!
//! The [`Interp`] struct is the primary API for embedding picolet into a
//! Rust application.  Given an `Interp`, the application may:
//!
//! * Evaluate scripts
//! * Extend the language by defining new commands in Rust
//! * Set and get variables in the current scope
//! * Toggle token tracing for parser diagnostics
//!
//! # Interp is not Sync!
//!
//! The `Interp` (and the rest of picolet) is intended for use in a single
//! thread.  Separate interpreters share no state and may live on different
//! threads, but one instance must not be used from two execution contexts at
//! once; embedders serialize access externally.
//!
//! # Creating an Interpreter
//!
//! [`Interp::new`] creates an interpreter populated with the built-in
//! command set; [`Interp::empty`] creates one with no commands at all, as a
//! base for host-specific command languages.
//!
//! # Evaluating Scripts
//!
//! [`Interp::eval`] evaluates a string as a script and leaves the last
//! command's return value (or an error message) in the result slot:
//!
//! ```
//! use picolet::{Interp, Status};
//!
//! let mut interp = Interp::new();
//! let status = interp.eval("set a [+ 2 2]").expect("script failed");
//! assert_eq!(status, Status::Ok);
//! assert_eq!(interp.result(), "4");
//! ```
//!
//! `eval` returns `Ok(Status)` for the non-error outcomes.  A `return`,
//! `break`, or `continue` that no enclosing construct handled propagates all
//! the way out, so the embedder sees it as `Status::Return` and friends.
//! Errors come back as `Err(TclError)` with the message in the result slot:
//!
//! ```
//! use picolet::{Interp, TclError};
//!
//! let mut interp = Interp::new();
//! let err = interp.eval("puts $missing").unwrap_err();
//! assert_eq!(err, TclError::VariableNotFound);
//! assert_eq!(interp.result(), "variable not found: 'missing'");
//! ```
//!
//! # Defining New Commands
//!
//! A host command is a plain Rust function registered under a name:
//!
//! ```
//! use picolet::{check_args, Interp, Status, TclResult};
//!
//! // The command: triple intValue
//! fn cmd_triple(interp: &mut Interp, argv: &[String]) -> TclResult {
//!     check_args(interp, argv, 2, 2)?;
//!     let n: i64 = argv[1].parse().unwrap_or(0);
//!     interp.set_result((n * 3).to_string());
//!     Ok(Status::Ok)
//! }
//!
//! let mut interp = Interp::new();
//! interp.register_command("triple", cmd_triple).expect("name is free");
//! interp.eval("triple 5").expect("eval failed");
//! assert_eq!(interp.result(), "15");
//! ```
//!
//! # Output
//!
//! The core never touches stdout or stderr directly.  `puts` writes to an
//! output sink and token traces go to a diagnostic sink; both default to the
//! process streams and can be replaced with [`Interp::set_output`] and
//! [`Interp::set_diagnostic`].

use crate::commands;
use crate::parser::{Parser, Token};
use crate::scope::ScopeStack;
use crate::types::{CommandFunc, Status, TclError, TclResult};
use indexmap::IndexMap;
use std::io::{self, Write};
use std::rc::Rc;

/// The picolet interpreter.  See the [module level documentation](self) for
/// an overview.
pub struct Interp {
    // Command table, in registration order.
    commands: IndexMap<String, Rc<Command>>,

    // Variable scopes; the bottom frame is the global scope.
    scopes: ScopeStack,

    // The result slot: the last command's return value, or the error
    // message after a failure.
    result: String,

    // Emit one JSON trace record per token to the diagnostic sink.
    trace_parser: bool,

    // Defines the recursion limit for Interp::eval().
    recursion_limit: usize,

    // Current number of eval levels.
    num_levels: usize,

    // Total eval invocations (diagnostic only).
    num_evals: u64,

    // Where `puts` writes.
    out: Box<dyn Write>,

    // Where token traces go.
    diag: Box<dyn Write>,
}

/// A command defined in the interpreter.
enum Command {
    /// A command implemented as a Rust function.
    Native(CommandFunc),

    /// A user-defined procedure.
    Proc(Procedure),
}

impl Command {
    /// Execute the command according to its kind.
    fn execute(&self, interp: &mut Interp, argv: &[String]) -> TclResult {
        match self {
            Command::Native(func) => func(interp, argv),
            Command::Proc(proc) => proc.execute(interp, argv),
        }
    }
}

impl Interp {
    //--------------------------------------------------------------------------------------------
    // Constructors

    /// Creates an interpreter with no commands defined.  Use this when
    /// crafting command languages that shouldn't include the standard
    /// commands, or as a base to which specific command sets can be added.
    ///
    /// # Example
    ///
    /// ```
    /// # use picolet::Interp;
    /// let interp = Interp::empty();
    /// assert!(interp.command_names().is_empty());
    /// ```
    pub fn empty() -> Interp {
        Interp {
            commands: IndexMap::new(),
            scopes: ScopeStack::new(),
            result: String::new(),
            trace_parser: false,
            recursion_limit: 1000,
            num_levels: 0,
            num_evals: 0,
            out: Box::new(io::stdout()),
            diag: Box::new(io::stderr()),
        }
    }

    /// Creates an interpreter pre-populated with the built-in command set:
    /// `puts`, `set`, `if`, `while`, `break`, `continue`, `proc`, `return`,
    /// and the arithmetic and comparison operators.
    pub fn new() -> Interp {
        let mut interp = Interp::empty();
        commands::register_core_commands(&mut interp);
        interp
    }

    //--------------------------------------------------------------------------------------------
    // Script Evaluation

    /// Evaluates a script one command at a time.
    ///
    /// On `Ok(Status::Ok)` the result slot holds the last command's return
    /// value (empty if no command ran).  A `return`, `break`, or `continue`
    /// not handled by any enclosing construct propagates out as its status.
    /// On `Err` the result slot holds a human-readable message.
    ///
    /// Handlers call `eval` recursively for command substitution and for
    /// `if`/`while`/procedure bodies; the nesting depth is bounded by the
    /// [recursion limit](Self::set_recursion_limit).
    pub fn eval(&mut self, script: &str) -> TclResult {
        self.num_evals += 1;
        self.num_levels += 1;

        if self.num_levels > self.recursion_limit {
            self.num_levels -= 1;
            return Err(self.error(
                TclError::TooManyNestedCalls,
                "too many nested calls to eval (infinite loop?)".to_string(),
            ));
        }

        let result = self.eval_script(script);

        self.num_levels -= 1;
        result
    }

    /// The evaluator proper: pulls tokens, substitutes, accumulates words,
    /// and dispatches one command per EOL.
    fn eval_script(&mut self, script: &str) -> TclResult {
        self.result.clear();

        let mut parser = Parser::new(script);
        let mut argv: Vec<String> = Vec::new();

        loop {
            // The previous token kind decides word boundaries; the parser's
            // initial EOL makes the first token start a new word.
            let prev = parser.token();
            let token = parser.next_token();

            if self.trace_parser {
                let _ = writeln!(self.diag, "{}", parser.trace_record());
            }

            let body: String = match token {
                Token::Eof => break,

                Token::Var => {
                    let name = parser.token_body();
                    match self.scopes.get(name) {
                        Some(value) => value.to_string(),
                        None => {
                            return Err(self.error(
                                TclError::VariableNotFound,
                                format!("variable not found: '{name}'"),
                            ));
                        }
                    }
                }

                Token::Cmd => {
                    let status = self.eval(parser.token_body())?;
                    if status != Status::Ok {
                        return Ok(status);
                    }
                    self.result.clone()
                }

                Token::Sep => continue,

                Token::Eol => {
                    if !argv.is_empty() {
                        let status = self.dispatch(&argv)?;
                        if status != Status::Ok {
                            return Ok(status);
                        }
                        argv.clear();
                    }
                    continue;
                }

                Token::Esc | Token::Str => parser.token_body().to_string(),
            };

            // Word accumulation: at a word boundary the body starts a new
            // argument; mid-word it extends the last one, so "x$y"z is a
            // single argument.
            if prev == Token::Sep || prev == Token::Eol {
                argv.push(body);
            } else {
                match argv.last_mut() {
                    Some(last) => last.push_str(&body),
                    None => argv.push(body),
                }
            }
        }

        Ok(Status::Ok)
    }

    /// Looks up `argv[0]` and invokes its handler.
    fn dispatch(&mut self, argv: &[String]) -> TclResult {
        let name = &argv[0];
        let cmd = match self.commands.get(name) {
            Some(cmd) => Rc::clone(cmd),
            None => {
                return Err(self.error(
                    TclError::CommandNotFound,
                    format!("command not found: '{name}'"),
                ));
            }
        };

        cmd.execute(self, argv)
    }

    /// Stores an error message in the result slot and hands the kind back,
    /// for use as `return Err(interp.error(kind, message))`.
    pub fn error(&mut self, kind: TclError, message: String) -> TclError {
        self.result = message;
        kind
    }

    //--------------------------------------------------------------------------------------------
    // Variable Handling

    /// Returns the value of the named variable in the current frame, if it
    /// exists.
    ///
    /// # Example
    ///
    /// ```
    /// # use picolet::Interp;
    /// let mut interp = Interp::new();
    /// interp.eval("set a 1").expect("eval failed");
    /// assert_eq!(interp.var("a"), Some("1"));
    /// assert_eq!(interp.var("b"), None);
    /// ```
    pub fn var(&self, name: &str) -> Option<&str> {
        self.scopes.get(name)
    }

    /// Sets a variable in the current frame, creating it if necessary.
    pub fn set_var(&mut self, name: &str, value: &str) {
        self.scopes.set(name, value);
    }

    /// Pushes a variable scope onto the scope stack.  The procedure-call
    /// shim uses this to create the procedure's local scope; a host command
    /// that pushes a scope must also pop it before returning.
    pub fn push_scope(&mut self) {
        self.scopes.push();
    }

    /// Pops a variable scope off the stack.  Calls to `push_scope` and
    /// `pop_scope` must come in pairs; the global scope is never popped.
    pub fn pop_scope(&mut self) {
        self.scopes.pop();
    }

    /// The current scope level.  The global scope is level 0; each procedure
    /// invocation adds a level for the duration of the call.
    pub fn scope_level(&self) -> usize {
        self.scopes.current()
    }

    //--------------------------------------------------------------------------------------------
    // Command Definition and Handling

    /// Registers a native command.  Fails with `CommandAlreadyDefined` if
    /// the name is taken; commands are never redefined or removed.
    pub fn register_command(&mut self, name: &str, func: CommandFunc) -> Result<(), TclError> {
        self.register(name, Command::Native(func))
    }

    /// Registers a user procedure; this is the `proc` built-in's backend.
    pub(crate) fn register_proc(
        &mut self,
        name: &str,
        params: &str,
        body: &str,
    ) -> Result<(), TclError> {
        let proc = Procedure {
            params: params.to_string(),
            body: body.to_string(),
        };

        self.register(name, Command::Proc(proc))
    }

    fn register(&mut self, name: &str, command: Command) -> Result<(), TclError> {
        if self.commands.contains_key(name) {
            return Err(self.error(
                TclError::CommandAlreadyDefined,
                format!("command already defined: '{name}'"),
            ));
        }

        self.commands.insert(name.to_string(), Rc::new(command));
        Ok(())
    }

    /// Determines whether the interpreter contains a command with the given
    /// name.
    pub fn has_command(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }

    /// The names of the registered commands, in registration order.
    pub fn command_names(&self) -> Vec<String> {
        self.commands.keys().cloned().collect()
    }

    //--------------------------------------------------------------------------------------------
    // Results, Sinks, and Configuration

    /// The result slot: the last command's return value, or the error
    /// message after a failure.
    pub fn result(&self) -> &str {
        &self.result
    }

    /// Replaces the result slot.  Host commands use this to return a value.
    pub fn set_result(&mut self, value: impl Into<String>) {
        self.result = value.into();
    }

    /// Whether token tracing is enabled.
    pub fn trace_parser(&self) -> bool {
        self.trace_parser
    }

    /// Enables or disables token tracing.  While enabled, every token the
    /// evaluator pulls is written to the diagnostic sink as one JSON record:
    /// `{"type":"TK_ESC","begin":0,"end":3,"body":"set"}`.
    pub fn set_trace_parser(&mut self, on: bool) {
        self.trace_parser = on;
    }

    /// Gets the interpreter's recursion limit: how deep the stack of script
    /// evaluations may be.
    pub fn recursion_limit(&self) -> usize {
        self.recursion_limit
    }

    /// Sets the interpreter's recursion limit.  The default is 1000.
    ///
    /// # Example
    /// ```
    /// # use picolet::Interp;
    /// let mut interp = Interp::new();
    /// assert_eq!(interp.recursion_limit(), 1000);
    /// interp.set_recursion_limit(100);
    /// assert_eq!(interp.recursion_limit(), 100);
    /// ```
    pub fn set_recursion_limit(&mut self, limit: usize) {
        self.recursion_limit = limit;
    }

    /// How many times `eval` has been invoked, including recursive calls.
    /// Diagnostic only.
    pub fn eval_count(&self) -> u64 {
        self.num_evals
    }

    /// Replaces the output sink that `puts` writes to (default: stdout).
    pub fn set_output(&mut self, sink: Box<dyn Write>) {
        self.out = sink;
    }

    /// Replaces the diagnostic sink that token traces are written to
    /// (default: stderr).
    pub fn set_diagnostic(&mut self, sink: Box<dyn Write>) {
        self.diag = sink;
    }

    /// Writes one line to the output sink; `puts` is the only built-in
    /// caller, but host commands may use it too.
    pub fn write_line(&mut self, text: &str) -> Result<(), TclError> {
        if let Err(e) = writeln!(self.out, "{text}") {
            return Err(self.error(
                TclError::Output,
                format!("error writing to output sink: {e}"),
            ));
        }

        Ok(())
    }
}

impl Default for Interp {
    fn default() -> Interp {
        Interp::new()
    }
}

/// How a procedure is defined: a formal-parameter string and a body script.
///
/// NOTE: the procedure does not know its own name; the name exists only in
/// the command table.
struct Procedure {
    /// Space-separated formal parameter names, as given to `proc`.
    params: String,

    /// The body script.
    body: String,
}

impl Procedure {
    fn execute(&self, interp: &mut Interp, argv: &[String]) -> TclResult {
        // The parameter list is split on spaces; there is no quoting.
        let formals: Vec<&str> = self.params.split(' ').filter(|f| !f.is_empty()).collect();

        interp.push_scope();

        if formals.len() != argv.len() - 1 {
            let message = format!(
                "wrong number of arguments for {} got {} expected {}",
                argv[0],
                argv.len() - 1,
                formals.len()
            );
            interp.pop_scope();
            return Err(interp.error(TclError::Arity, message));
        }

        for (formal, actual) in formals.iter().zip(&argv[1..]) {
            interp.set_var(formal, actual);
        }

        // The frame must come off on every path, error included.
        let result = interp.eval(&self.body);
        interp.pop_scope();

        // A `return` in the body means the procedure is returning a value.
        match result {
            Ok(Status::Return) => Ok(Status::Ok),
            other => other,
        }
    }
}
