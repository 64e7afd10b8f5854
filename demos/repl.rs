use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use sexpread::{Environment, ReadConfig, empty_environment, print, read_with_config};
use std::process;

fn main() {
    if let Err(err) = run_repl() {
        eprintln!("The REPL encountered an unexpected error and must exit.");
        eprintln!("Error: {err}");
        process::exit(1);
    }
}

fn run_repl() -> Result<(), ReadlineError> {
    println!("sexpread S-expression reader");
    println!("Enter expressions like: (1 2 . 3) or '(a b)");
    println!("Type :help for more commands, or exit to quit.");
    println!();

    let mut rl = DefaultEditor::new()?;
    let mut env = empty_environment();
    let mut config = ReadConfig {
        handle_comments: true,
        ..ReadConfig::default()
    };

    loop {
        match rl.readline("sexpread> ") {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                let _ = rl.add_history_entry(line);

                let (command, argument) = match line.split_once(char::is_whitespace) {
                    Some((command, argument)) => (command, argument.trim()),
                    None => (line, ""),
                };

                match command {
                    "exit" | ":quit" | ":exit" => {
                        println!("Goodbye!");
                        break;
                    }
                    ":help" => {
                        print_help();
                        continue;
                    }
                    ":env" => {
                        print_environment(&env);
                        continue;
                    }
                    ":bare" => {
                        config.bare_symbols = !config.bare_symbols;
                        println!(
                            "Bare symbols {}",
                            if config.bare_symbols { "enabled" } else { "disabled" }
                        );
                        continue;
                    }
                    ":let" => {
                        match argument.split_once(char::is_whitespace) {
                            Some((name, text)) => match read_with_config(text, config) {
                                Ok(value) => {
                                    println!("{name} = {}", print(&value));
                                    env = env.extend(name, value);
                                }
                                Err(e) => println!("Error: {e}"),
                            },
                            None => println!("Usage: :let <name> <expression>"),
                        }
                        continue;
                    }
                    ":get" => {
                        match env.lookup(argument) {
                            Ok(value) => println!("{}", print(&value)),
                            Err(e) => println!("Error: {e}"),
                        }
                        continue;
                    }
                    _ => {}
                }

                match read_with_config(line, config) {
                    Ok(value) => println!("{}", print(&value)),
                    Err(e) => println!("Error: {e}"),
                }
            }

            Err(ReadlineError::Eof) | Err(ReadlineError::Interrupted) => {
                println!("Goodbye!");
                break;
            }
            Err(err) => return Err(err),
        }
    }

    Ok(())
}

fn print_help() {
    println!("Commands:");
    println!("  :help               - Show this help message");
    println!("  :let <name> <expr>  - Read <expr> and bind it to <name>");
    println!("  :get <name>         - Look up <name> in the environment");
    println!("  :env                - Show environment bindings, newest first");
    println!("  :bare               - Toggle reading bare atoms as symbols");
    println!("  exit, :quit, :exit  - Exit");
    println!();
    println!("Syntax:");
    println!("  Integers: 42, -5");
    println!("  Quoted symbols: 'foo");
    println!("  Lists: (1 2 3), '(1 2), (1 . 2)");
    println!("  Comments: ; to end of line");
    println!();
}

fn print_environment(env: &Environment) {
    if env.is_empty() {
        println!("Environment is empty.");
        return;
    }

    println!("Environment bindings ({} total):", env.len());
    for (name, value) in env.bindings() {
        println!("  {name} = {value}");
    }
}
