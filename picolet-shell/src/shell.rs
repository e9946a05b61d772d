use picolet::{Interp, Parser, Token};
use rustyline::{error::ReadlineError, history::MemHistory, Config, Editor};
use std::fs;

/// Invokes an interactive REPL for the given interpreter, using `rustyline`
/// line editing.
///
/// The REPL displays a `% ` prompt.  Each non-empty line is evaluated;
/// non-empty results are echoed, error messages are printed.  Press `^C` or
/// `^D` to terminate the REPL, returning control to the caller.
///
/// See [`picolet::Interp`] for details on how to configure and add commands
/// to an interpreter before starting the REPL.
pub fn repl(interp: &mut Interp) {
    let mut rl = Editor::<(), MemHistory>::with_history(Config::default(), MemHistory::new())
        .expect("failed to init rustyline");

    loop {
        match rl.readline("% ") {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                if let Err(e) = rl.add_history_entry(line) {
                    eprintln!("History error: {e}");
                }

                match interp.eval(line) {
                    Ok(_) => {
                        // Don't echo empty results.
                        if !interp.result().is_empty() {
                            println!("{}", interp.result());
                        }
                    }
                    Err(_) => {
                        println!("{}", interp.result());
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                break;
            }
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                println!("I/O Error: {:?}", err);
                break;
            }
        }
    }
}

/// Executes a script file in the context of the given interpreter.
///
/// The variable `arg0` is set to the script path before evaluation.  Returns
/// `true` on success; on a read or evaluation failure the error is printed
/// to stderr and `false` is returned.
pub fn script(interp: &mut Interp, path: &str) -> bool {
    let source = match fs::read_to_string(path) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("{path}: {e}");
            return false;
        }
    };

    interp.set_var("arg0", path);

    match interp.eval(&source) {
        Ok(_) => true,
        Err(_) => {
            eprintln!("{}", interp.result());
            false
        }
    }
}

/// Lexes a source string and prints one JSON trace record per token to
/// stdout, including the final `TK_EOF`.  This is the `--parser-only` mode:
/// nothing is evaluated.
pub fn dump_tokens(source: &str) {
    let mut parser = Parser::new(source);

    loop {
        let token = parser.next_token();
        println!("{}", parser.trace_record());
        if token == Token::Eof {
            break;
        }
    }
}
