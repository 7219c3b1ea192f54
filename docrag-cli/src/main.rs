//! `docrag`: ask questions about a text document from the terminal.

mod cli;
mod setup;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use docrag::{AnswerOptions, AnswerPipeline, Retriever};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::cli::{AskArgs, Cli, Commands, SearchArgs};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Ask(args) => run_ask(args).await,
        Commands::Search(args) => run_search(args).await,
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

async fn run_search(args: SearchArgs) -> Result<()> {
    let retriever = setup::ingest(&args.index, args.top_k).await?;
    let result = retriever.query(&args.query, args.top_k).await.context("search failed")?;
    println!("{}", result.render_markdown());
    Ok(())
}

async fn run_ask(args: AskArgs) -> Result<()> {
    let retriever = Arc::new(setup::ingest(&args.index, args.top_k).await?);

    let pipeline = match setup::generator(&args)? {
        Some(generator) => {
            let mut options =
                AnswerOptions::default().with_top_k(args.top_k).with_max_tokens(args.max_tokens);
            if let Some(prompt) = &args.system_prompt {
                options = options.with_system_prompt(prompt.clone());
            }
            Some(AnswerPipeline::new(Arc::clone(&retriever), generator, options)?)
        }
        None => None,
    };

    println!("Ready. Ask a question, or type 'quit' to exit.");
    let mut editor = DefaultEditor::new().context("failed to start line editor")?;
    loop {
        let line = match editor.readline("\nquestion> ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(e) => return Err(e).context("failed to read input"),
        };
        let question = line.trim();
        if matches!(question.to_lowercase().as_str(), "quit" | "q" | "exit") {
            break;
        }
        if question.is_empty() {
            continue;
        }
        record_history(&mut editor, question);

        answer_one(&retriever, pipeline.as_ref(), question, args.top_k).await;
    }
    Ok(())
}

/// Add a line to the session history. Failures are only logged.
fn record_history(editor: &mut DefaultEditor, line: &str) {
    if let Err(e) = editor.add_history_entry(line) {
        debug!(error = %e, "failed to record history entry");
    }
}

/// Answer a single question. Failures are reported and the session goes on.
async fn answer_one(
    retriever: &Retriever,
    pipeline: Option<&AnswerPipeline>,
    question: &str,
    top_k: usize,
) {
    match pipeline {
        Some(pipeline) => match pipeline.ask(question).await {
            Ok(answer) => {
                println!("Retrieved {} chunks for context.", answer.sources.len());
                println!("\n--- Answer ---\n{}\n{}", answer.text, "-".repeat(50));
            }
            Err(e) => eprintln!("error ({} stage): {e}", e.stage()),
        },
        None => match retriever.query(question, top_k).await {
            Ok(result) => println!("{}", result.render_markdown()),
            Err(e) => eprintln!("error ({} stage): {e}", e.stage()),
        },
    }
}
