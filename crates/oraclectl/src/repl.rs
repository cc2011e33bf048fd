//! Interactive conversation loop

use anyhow::Result;
use oracle_core::{Oracle, OracleConfig};
use owo_colors::OwoColorize;
use std::io::{self, BufRead, Write};

/// Run the conversational loop until /quit or EOF
pub async fn run(config: OracleConfig) -> Result<()> {
    print_welcome(&config);
    let mut oracle = Oracle::new(config);

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("{} ", ">>>".cyan().bold());
        io::stdout().flush()?;

        let input = match lines.next() {
            Some(Ok(line)) => line.trim().to_string(),
            Some(Err(e)) => {
                eprintln!("Error reading input: {}", e);
                continue;
            }
            None => break, // EOF
        };

        if input.is_empty() {
            continue;
        }

        match input.as_str() {
            "/quit" | "/exit" => break,
            "/clear" => {
                oracle.reset();
                println!("{}", "Conversation cleared.".dimmed());
                continue;
            }
            "/help" => {
                print_help();
                continue;
            }
            _ => {}
        }

        match oracle.respond(&input).await {
            Ok(answer) => {
                println!();
                println!("{}", answer);
                println!();
            }
            Err(e) => {
                eprintln!("{} {}", "error:".red().bold(), e);
                println!();
            }
        }
    }

    println!("{}", "Goodbye.".dimmed());
    Ok(())
}

fn print_welcome(config: &OracleConfig) {
    println!("{}", "Oracle - local model question answering".bold());
    println!("Model: {} via {}", config.model.green(), config.provider);
    match config.search_engine {
        Some(engine) => println!(
            "Search augmentation: {} ({} pages)",
            engine.to_string().green(),
            config.search_pages
        ),
        None => println!("Search augmentation: {}", "disabled".yellow()),
    }
    println!(
        "Type {} to reset the conversation, {} to leave.",
        "/clear".cyan(),
        "/quit".cyan()
    );
    println!();
}

fn print_help() {
    println!();
    println!("  /clear   forget the conversation so far");
    println!("  /help    show this message");
    println!("  /quit    exit");
    println!();
    println!("Anything else is sent to the model as a question.");
    println!();
}
