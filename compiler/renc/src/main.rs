//! Ren CLI

use renc::commands::{eval_code, parse_run_options, run_file};

fn main() {
    renc::init_tracing();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        return;
    }

    let command = &args[1];

    match command.as_str() {
        "run" | "eval" => {
            let options = match parse_run_options(&args[2..]) {
                Ok(options) => options,
                Err(message) => {
                    eprintln!("error: {message}");
                    std::process::exit(1);
                }
            };
            let Some(target) = options.target else {
                if command == "run" {
                    eprintln!("Usage: ren run <file.ren> [options]");
                } else {
                    eprintln!("Usage: ren eval <code> [options]");
                }
                std::process::exit(1);
            };
            if command == "run" {
                run_file(&target, options.config);
            } else {
                eval_code(&target, options.config);
            }
        }
        "help" | "--help" | "-h" => {
            print_usage();
        }
        "version" | "--version" | "-v" => {
            println!("Ren {}", env!("CARGO_PKG_VERSION"));
        }
        _ => {
            if std::path::Path::new(command)
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("ren"))
            {
                match parse_run_options(&args[2..]) {
                    Ok(options) => run_file(command, options.config),
                    Err(message) => {
                        eprintln!("error: {message}");
                        std::process::exit(1);
                    }
                }
            } else {
                eprintln!("Unknown command: {command}");
                eprintln!();
                print_usage();
                std::process::exit(1);
            }
        }
    }
}

fn print_usage() {
    println!("Ren interpreter");
    println!();
    println!("Usage: ren <command> [options]");
    println!();
    println!("Commands:");
    println!("  run <file.ren>       Evaluate a Ren script");
    println!("  eval <code>          Evaluate code and print its value");
    println!("  help                 Show this help message");
    println!("  version              Show version information");
    println!();
    println!("Options:");
    println!("  --max-depth=<n>      Limit nested calls (default: {})", ren_eval::DEFAULT_MAX_DEPTH);
    println!("  --no-max-depth       Remove the call depth limit");
    println!("  --trusted            Panic instead of erroring when a refinement holds a non-logic value");
    println!();
    println!("Set RUST_LOG (e.g. RUST_LOG=ren_eval=debug) for tracing output.");
}
