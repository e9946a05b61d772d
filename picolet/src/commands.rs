//! The built-in command set.
//!
//! These are the primitives the evaluator cannot express on its own:
//! assignment, output, conditionals, loops, procedure definition, non-local
//! control flow, and integer arithmetic.  Each command validates its arity
//! first; errors leave their message in the result slot.
//!
//! All of the arithmetic and comparison operators share one handler,
//! [`cmd_math`], which dispatches on the name it was invoked under.

use crate::check_args;
use crate::interp::Interp;
use crate::types::{CommandFunc, Status, TclError, TclResult};

/// Registers the built-in command set into the interpreter.
/// [`Interp::new`] calls this; hosts building on [`Interp::empty`] may call
/// it themselves.
pub fn register_core_commands(interp: &mut Interp) {
    let core: &[(&str, CommandFunc)] = &[
        // Basics
        ("puts", cmd_puts),
        ("set", cmd_set),
        // Procs and flow control
        ("proc", cmd_proc),
        ("return", cmd_return),
        ("if", cmd_if),
        ("while", cmd_while),
        ("break", cmd_break),
        ("continue", cmd_continue),
        // Math
        ("+", cmd_math),
        ("-", cmd_math),
        ("*", cmd_math),
        ("/", cmd_math),
        ("==", cmd_math),
        ("!=", cmd_math),
        (">", cmd_math),
        ("<", cmd_math),
        (">=", cmd_math),
        ("<=", cmd_math),
    ];

    for &(name, func) in core {
        // The names above are distinct, so registration cannot collide.
        let _ = interp.register_command(name, func);
    }
}

/// puts text
///
/// Writes the text and a newline to the output sink.  The result slot is
/// left alone, so `puts [set x v]` still leaves `v` in it.
pub fn cmd_puts(interp: &mut Interp, argv: &[String]) -> TclResult {
    check_args(interp, argv, 2, 2)?;

    interp.write_line(&argv[1])?;
    Ok(Status::Ok)
}

/// set name value
///
/// Assigns in the current frame; the value becomes the result.
pub fn cmd_set(interp: &mut Interp, argv: &[String]) -> TclResult {
    check_args(interp, argv, 3, 3)?;

    interp.set_var(&argv[1], &argv[2]);
    interp.set_result(argv[2].clone());
    Ok(Status::Ok)
}

/// Reads the result slot as a condition value after evaluating `cond`;
/// zero is false, everything else is true.
fn condition_value(interp: &mut Interp, cond: &str) -> Result<i64, TclError> {
    let parsed = interp.result().parse::<i64>();
    parsed.map_err(|_| {
        interp.error(
            TclError::NotAnInteger,
            format!("invalid number: '{cond}'"),
        )
    })
}

/// if cond then ?else-word else?
///
/// The word in the `else` position is not inspected; any word is accepted.
pub fn cmd_if(interp: &mut Interp, argv: &[String]) -> TclResult {
    check_args(interp, argv, 3, 5)?;

    let status = interp.eval(&argv[1])?;
    if status != Status::Ok {
        return Ok(status);
    }

    if condition_value(interp, &argv[1])? != 0 {
        interp.eval(&argv[2])
    } else if argv.len() == 5 {
        interp.eval(&argv[4])
    } else {
        Ok(Status::Ok)
    }
}

/// while cond body
pub fn cmd_while(interp: &mut Interp, argv: &[String]) -> TclResult {
    check_args(interp, argv, 3, 3)?;

    loop {
        let status = interp.eval(&argv[1])?;
        if status != Status::Ok {
            return Ok(status);
        }

        if condition_value(interp, &argv[1])? == 0 {
            return Ok(Status::Ok);
        }

        match interp.eval(&argv[2])? {
            Status::Ok | Status::Continue => continue,
            Status::Break => return Ok(Status::Ok),
            status => return Ok(status),
        }
    }
}

/// break
pub fn cmd_break(interp: &mut Interp, argv: &[String]) -> TclResult {
    check_args(interp, argv, 1, 1)?;
    Ok(Status::Break)
}

/// continue
pub fn cmd_continue(interp: &mut Interp, argv: &[String]) -> TclResult {
    check_args(interp, argv, 1, 1)?;
    Ok(Status::Continue)
}

/// proc name params body
///
/// Defines a new command; fails if the name is already taken.
pub fn cmd_proc(interp: &mut Interp, argv: &[String]) -> TclResult {
    check_args(interp, argv, 4, 4)?;

    interp.register_proc(&argv[1], &argv[2], &argv[3])?;
    Ok(Status::Ok)
}

/// return ?value?
pub fn cmd_return(interp: &mut Interp, argv: &[String]) -> TclResult {
    check_args(interp, argv, 1, 2)?;

    let value = argv.get(1).cloned().unwrap_or_default();
    interp.set_result(value);
    Ok(Status::Return)
}

/// Checks that an argument is a plain run of decimal digits and parses it.
/// Signs are not accepted, so negative literals fail here.
fn int_arg(interp: &mut Interp, argv: &[String], idx: usize) -> Result<i64, TclError> {
    let arg = &argv[idx];

    if !arg.is_empty() && arg.bytes().all(|b| b.is_ascii_digit()) {
        if let Ok(value) = arg.parse::<i64>() {
            return Ok(value);
        }
    }

    Err(interp.error(
        TclError::NotAnInteger,
        format!("[{}]: argument {} is not an integer", argv[0], idx),
    ))
}

/// The arithmetic and comparison commands.  The operator is `argv[0]`;
/// comparisons yield "0" or "1".
pub fn cmd_math(interp: &mut Interp, argv: &[String]) -> TclResult {
    check_args(interp, argv, 3, 3)?;

    let a = int_arg(interp, argv, 1)?;
    let b = int_arg(interp, argv, 2)?;

    let value = match argv[0].as_str() {
        "+" => a.wrapping_add(b),
        "-" => a.wrapping_sub(b),
        "*" => a.wrapping_mul(b),
        "/" => {
            if b == 0 {
                return Err(interp.error(
                    TclError::DivisionByZero,
                    "[/]: division by zero".to_string(),
                ));
            }
            a / b
        }
        "==" => (a == b) as i64,
        "!=" => (a != b) as i64,
        ">" => (a > b) as i64,
        "<" => (a < b) as i64,
        ">=" => (a >= b) as i64,
        "<=" => (a <= b) as i64,
        op => {
            return Err(interp.error(
                TclError::UnknownOperator,
                format!("[{op}]: unknown operator"),
            ));
        }
    };

    interp.set_result(value.to_string());
    Ok(Status::Ok)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int_arg_accepts_digit_runs_only() {
        let mut interp = Interp::new();
        let argv: Vec<String> = vec!["+".into(), "42".into(), "-1".into()];

        assert_eq!(int_arg(&mut interp, &argv, 1), Ok(42));
        assert_eq!(int_arg(&mut interp, &argv, 2), Err(TclError::NotAnInteger));
        assert_eq!(interp.result(), "[+]: argument 2 is not an integer");
    }

    #[test]
    fn int_arg_rejects_empty_and_overflowing_input() {
        let mut interp = Interp::new();
        let argv: Vec<String> =
            vec!["*".into(), String::new(), "99999999999999999999".into()];

        assert_eq!(int_arg(&mut interp, &argv, 1), Err(TclError::NotAnInteger));
        assert_eq!(int_arg(&mut interp, &argv, 2), Err(TclError::NotAnInteger));
    }

    #[test]
    fn math_dispatches_on_the_command_name() {
        let mut interp = Interp::new();

        interp.eval("+ 2 3").expect("eval failed");
        assert_eq!(interp.result(), "5");

        interp.eval("<= 2 2").expect("eval failed");
        assert_eq!(interp.result(), "1");
    }
}
