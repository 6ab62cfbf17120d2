use clap::{Parser, Subcommand};
use colored::Colorize;
use env_logger::Env;
use log::{error, info};
use std::collections::HashSet;
use std::path::PathBuf;

mod libtrivia;

use crate::libtrivia::question::{load_questions, Category, Question};

#[derive(Parser, Debug)]
#[command(name = "Questions Tool")]
#[command(version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,

    #[arg(short, long, default_value = "info")]
    log_level: String,

    questions: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate a questions file.
    Check,
    /// Show how many questions each board cell has.
    Stats,
}

fn main() {
    let args = Args::parse();
    env_logger::Builder::from_env(Env::default().default_filter_or(args.log_level)).init();

    let questions_file = match args.questions {
        Some(f) => f,
        None => {
            error!("{}", "Questions file not specified!".red());
            std::process::exit(1);
        }
    };
    info!(
        "{}",
        format!("Reading questions from {:?}", questions_file).cyan()
    );

    let questions = match load_questions(questions_file.as_path()) {
        Ok(questions) => questions,
        Err(err) => {
            error!(
                "{}",
                format!("Cannot load {:?}: {}", questions_file, err).red()
            );
            std::process::exit(1);
        }
    };

    match args.command {
        Commands::Check => check(&questions),
        Commands::Stats => stats(&questions),
    }
}

fn check(questions: &[Question]) {
    let mut seen = HashSet::new();
    let mut problems = 0;

    for question in questions {
        if !seen.insert(question.id) {
            println!("{}", format!("Duplicate id {}", question.id).red());
            problems += 1;
        }
        if !(1..=5).contains(&question.difficulty) {
            println!(
                "{}",
                format!(
                    "Question {} has difficulty {} (want 1-5)",
                    question.id, question.difficulty
                )
                .red()
            );
            problems += 1;
        }
        if question.clue.trim().is_empty() {
            println!("{}", format!("Question {} has an empty clue", question.id).red());
            problems += 1;
        }
        if question.answer.trim().is_empty() {
            println!(
                "{}",
                format!("Question {} has an empty answer", question.id).red()
            );
            problems += 1;
        }
    }

    if problems == 0 {
        println!(
            "{}",
            format!("{} questions, no problems found.", questions.len()).green()
        );
    } else {
        println!("{}", format!("{} problem(s) found.", problems).red());
        std::process::exit(1);
    }
}

fn stats(questions: &[Question]) {
    println!(
        "{}",
        format!("{} questions total", questions.len()).cyan()
    );
    let header: String = (1..=5).map(|difficulty| format!("{:^5}", difficulty)).collect();
    println!("{:>8}  {}", "", header);
    for category in Category::ALL {
        let row: String = (1..=5)
            .map(|difficulty| {
                let count = questions
                    .iter()
                    .filter(|q| q.category == category && q.difficulty == difficulty)
                    .count();
                format!("{:^5}", count)
            })
            .collect();
        println!("{:>8}  {}", category, row);
    }
}
