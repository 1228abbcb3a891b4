//! REPL implementation
//!
//! Each input line is classified as a one-line note. `:paste` collects a
//! multi-line note until `:end`.

use super::check::classify;
use super::output::{self, OutputFormat};
use anyhow::Result;
use apex_algo::{DetectorRef, DetectorRegistry};
use apex_core::Document;
use colored::Colorize;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

/// Configuration for REPL
pub struct ReplConfig {
    pub algorithms: Vec<String>,
    pub output_format: Option<String>,
}

/// REPL state
struct ReplState {
    registry: DetectorRegistry,
    detectors: Vec<DetectorRef>,
    format: OutputFormat,
    /// Lines collected since `:paste`
    pasting: Option<Vec<String>>,
    count: usize,
}

impl ReplState {
    fn new(config: ReplConfig) -> Result<Self> {
        let registry = DetectorRegistry::with_defaults()?;
        let detectors = registry.select(&config.algorithms)?;
        Ok(Self {
            registry,
            detectors,
            format: config
                .output_format
                .as_deref()
                .map(OutputFormat::parse)
                .unwrap_or_default(),
            pasting: None,
            count: 0,
        })
    }

    fn classify(&mut self, text: &str) -> Result<String> {
        self.count += 1;
        let doc = Document::from_text(format!("repl-{}", self.count), text)?;
        let reports = classify(&doc, &self.detectors)?;
        output::format_rows(&reports, self.format)
    }
}

/// Run the interactive REPL
pub fn run(config: ReplConfig) -> Result<()> {
    let mut state = ReplState::new(config)?;
    println!("{}", "APEX Interactive REPL".cyan().bold());
    println!("Type {} for help, {} to quit", ":help".green(), ":quit".green());
    println!(
        "Algorithms: {}",
        state
            .detectors
            .iter()
            .map(|d| d.name())
            .collect::<Vec<_>>()
            .join(", ")
    );
    println!();

    let mut rl = DefaultEditor::new()?;
    let history_file = dirs::home_dir().map(|mut path| {
        path.push(".apex_history");
        path
    });
    if let Some(ref path) = history_file {
        let _ = rl.load_history(path);
    }

    loop {
        let prompt = if state.pasting.is_some() { "...> " } else { "apex> " };
        match rl.readline(prompt) {
            Ok(line) => {
                if let Some(lines) = &mut state.pasting {
                    if line.trim() != ":end" {
                        lines.push(line);
                        continue;
                    }
                    let text = lines.join("\n");
                    state.pasting = None;
                    print_result(state.classify(&text));
                    continue;
                }

                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                rl.add_history_entry(line)?;

                if line.starts_with(':') {
                    match handle_command(line, &mut state) {
                        Ok(false) => break,
                        Ok(true) => continue,
                        Err(e) => {
                            eprintln!("{}", output::format_error(&e));
                            continue;
                        }
                    }
                }
                print_result(state.classify(line));
            }
            Err(ReadlineError::Interrupted) => {
                if state.pasting.take().is_some() {
                    println!("{}", output::format_warning("paste discarded"));
                } else {
                    println!("^C");
                }
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("^D");
                break;
            }
            Err(err) => {
                eprintln!("Error: {:?}", err);
                break;
            }
        }
    }

    if let Some(ref path) = history_file {
        let _ = rl.save_history(path);
    }
    println!("Goodbye!");
    Ok(())
}

fn print_result(result: Result<String>) {
    match result {
        Ok(table) => println!("{}", table),
        Err(e) => eprintln!("{}", output::format_error(&e)),
    }
}

/// Handle REPL commands (starting with :)
fn handle_command(command: &str, state: &mut ReplState) -> Result<bool> {
    let parts: Vec<&str> = command.split_whitespace().collect();

    match parts[0] {
        ":help" | ":h" => {
            print_help();
            Ok(true)
        }
        ":quit" | ":q" | ":exit" => Ok(false),
        ":paste" | ":p" => {
            println!("Enter the note; finish with {}", ":end".green());
            state.pasting = Some(Vec::new());
            Ok(true)
        }
        ":use" | ":u" => {
            let names: Vec<String> = parts[1..].iter().map(|s| s.to_string()).collect();
            state.detectors = state.registry.select(&names)?;
            println!(
                "{}",
                output::format_success(&format!("{} algorithms selected", state.detectors.len()))
            );
            Ok(true)
        }
        ":list" | ":ls" => {
            for name in state.registry.names() {
                let selected = state.detectors.iter().any(|d| d.name() == name);
                let marker = if selected { "*" } else { " " };
                println!("  {} {}", marker.green(), name);
            }
            Ok(true)
        }
        ":format" | ":f" => {
            let Some(name) = parts.get(1) else {
                anyhow::bail!("Usage: :format <json|pretty|table>");
            };
            state.format = OutputFormat::parse(name);
            Ok(true)
        }
        other => {
            anyhow::bail!("Unknown command: {}. Type :help for help", other);
        }
    }
}

fn print_help() {
    println!("{}", "Commands:".bold());
    println!("  {}             classify the line as a note", "<text>".cyan());
    println!("  {}            start a multi-line note, ended by :end", ":paste".cyan());
    println!("  {}  select algorithms (none selects all)", ":use [names...]".cyan());
    println!("  {}             list algorithms, * marks selected", ":list".cyan());
    println!("  {}   change the output format", ":format <name>".cyan());
    println!("  {}             show this help", ":help".cyan());
    println!("  {}             leave the REPL", ":quit".cyan());
}
