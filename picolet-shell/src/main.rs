use clap::Parser;
use picolet::Interp;

/// A minimal Tcl-dialect shell.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Print one JSON record per parser token to stderr while evaluating
    #[arg(short = 't', long)]
    trace_parser: bool,

    /// Lex the files and print their token streams instead of evaluating
    #[arg(short = 'p', long)]
    parser_only: bool,

    /// Script files to evaluate; with none, starts an interactive session
    #[arg(value_name = "FILES")]
    files: Vec<String>,
}

fn main() {
    let args = Args::parse();

    if args.parser_only {
        for path in &args.files {
            match std::fs::read_to_string(path) {
                Ok(source) => picolet_shell::dump_tokens(&source),
                Err(e) => {
                    eprintln!("{path}: {e}");
                    std::process::exit(1);
                }
            }
        }
        return;
    }

    let mut interp = Interp::new();
    interp.set_trace_parser(args.trace_parser);

    for path in &args.files {
        if !picolet_shell::script(&mut interp, path) {
            std::process::exit(1);
        }
    }

    if args.files.is_empty() {
        picolet_shell::repl(&mut interp);
    }
}
