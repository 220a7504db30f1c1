//! CLI entry point for recordkeep_runner
//!
//! Supports two execution modes:
//! - Interactive: Read instructions from stdin line-by-line
//! - Batch: Read instructions from a playbook file
//!
//! # Examples
//!
//! Interactive mode:
//! ```bash
//! recordkeep-runner
//! > CREATE user_profile {"name": "A", "email": "a@x.com", "age": 30}
//! > READ user_profile 1 name,email
//! > ^D
//! ```
//!
//! Batch mode:
//! ```bash
//! ./recordkeep-runner --playbook scenario.txt --strict
//! ```

use clap::Parser;
use recordkeep_runner::{Instruction, RecordHandler, logging};
use std::convert::TryFrom;
use std::io::{self, BufRead, Write};

#[derive(Parser, Debug)]
#[command(name = "recordkeep-runner")]
#[command(about = "Execute record instruction playbooks", long_about = None)]
struct Args {
    /// Path to a playbook file containing instructions to execute (batch mode)
    #[arg(short, long)]
    playbook: Option<String>,

    /// Reject READ selectors naming fields the resource does not declare
    #[arg(short, long)]
    strict: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut handler = RecordHandler::new(args.strict);

    if let Some(playbook_path) = args.playbook {
        // Batch mode: read from file
        logging::init_tracing("batch");
        run_batch_mode(&mut handler, &playbook_path).await?;
    } else {
        // Interactive mode: read from stdin
        logging::init_tracing("interactive");
        run_interactive_mode(&mut handler).await?;
    }

    Ok(())
}

/// Run in batch mode, reading instructions from a file
async fn run_batch_mode(handler: &mut RecordHandler, file_path: &str) -> anyhow::Result<()> {
    println!("Running batch mode from file: {}", file_path);
    println!();

    let file = std::fs::File::open(file_path)?;
    let reader = io::BufReader::new(file);

    for (line_num, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();

        // Skip empty lines and comments
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        print!("[{}] {} ... ", line_num + 1, line);
        io::stdout().flush()?;

        match Instruction::try_from(line) {
            Ok(instruction) => match handler.execute(&instruction).await {
                Ok(Some(output)) => println!("{}", output),
                Ok(None) => println!(),
                Err(e) => {
                    println!("✗ Error: {}", e);
                    return Err(e);
                }
            },
            Err(e) => {
                println!("✗ Parse error: {}", e);
                return Err(anyhow::anyhow!("{}", e));
            }
        }
    }

    println!();
    println!("Batch execution completed successfully.");
    Ok(())
}

/// Run in interactive mode, reading instructions from stdin
async fn run_interactive_mode(handler: &mut RecordHandler) -> anyhow::Result<()> {
    println!("recordkeep-runner - Interactive Mode");
    println!("====================================");
    println!("Resources: {}", handler.resources().join(", "));
    println!("Press Ctrl+D to exit");
    println!();

    let stdin = io::stdin();
    let mut reader = stdin.lock();
    let mut line = String::new();

    loop {
        print!("> ");
        io::stdout().flush()?;

        line.clear();
        let bytes_read = reader.read_line(&mut line)?;

        // EOF reached
        if bytes_read == 0 {
            println!();
            println!("Goodbye!");
            break;
        }

        let trimmed = line.trim();

        // Skip empty lines and comments
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        // Parse and execute instruction
        match Instruction::try_from(trimmed) {
            Ok(instruction) => match handler.execute(&instruction).await {
                Ok(Some(output)) => println!("{}", output),
                Ok(None) => {}
                // Continue in interactive mode even after errors
                Err(e) => eprintln!("✗ Error: {}", e),
            },
            Err(e) => {
                eprintln!("✗ Parse error: {}", e);
            }
        }
    }

    Ok(())
}
