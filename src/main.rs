use clap::Parser;
use colored::Colorize;
use env_logger::Env;
use log::debug;
use rand::rng;
use std::path::PathBuf;
use std::str::FromStr;
use text_io::read;

mod libtrivia;

use crate::libtrivia::db::{self, Storage};
use crate::libtrivia::game::{Game, Graded};
use crate::libtrivia::pool::{QuestionPool, ResetPolicy};
use crate::libtrivia::question::{load_questions, prize, Category, Question};
use crate::libtrivia::Error;

#[derive(Debug, PartialEq)]
enum Choice {
    Cell(Category, u8),
    NewGame,
    Quit,
    Invalid,
}

#[derive(Parser, Debug)]
#[command(name = "Trivia Board")]
#[command(version, about, long_about = None)]
struct Args {
    #[arg(short, long, value_name = "FILE", default_value = "questions.json")]
    questions: PathBuf,
    #[arg(short, long, value_name = "FILE", default_value = "trivia.db")]
    db: Option<PathBuf>,
    /// Save slot, one per themed question set.
    #[arg(short, long, default_value = "standard")]
    variant: String,
    #[arg(long, default_value = "10")]
    games_cap: u32,
    #[arg(long, default_value = "150")]
    used_cap: usize,
    #[arg(long, default_value = "0.8")]
    used_fraction: f64,
    #[arg(short, long, default_value = "error")]
    log_level: String,
}

impl Choice {
    fn from_str(input: &str) -> Choice {
        match input.trim() {
            "q" => Choice::Quit,
            "n" => Choice::NewGame,
            input => {
                let mut parts = input.split_whitespace();
                match (parts.next(), parts.next()) {
                    (Some(category), Some(difficulty)) => {
                        match (Category::from_str(category), difficulty.parse::<u8>()) {
                            (Ok(category), Ok(difficulty)) if (1..=5).contains(&difficulty) => {
                                Choice::Cell(category, difficulty)
                            }
                            _ => Choice::Invalid,
                        }
                    }
                    _ => Choice::Invalid,
                }
            }
        }
    }
}

fn main() -> Result<(), Error> {
    let args = Args::parse();
    env_logger::Builder::from_env(Env::default().default_filter_or(args.log_level)).init();

    let db_path = args.db.unwrap_or(PathBuf::from("trivia.db"));
    let store = db::create_or_open(db_path.as_path())?;
    debug!("[DB] Database Connection Successful!");

    let questions = match load_questions(args.questions.as_path()) {
        Ok(questions) => questions,
        Err(err) => {
            println!(
                "{}",
                format!("Cannot load questions from {:?}: {}", args.questions, err).red()
            );
            return finish(store, Err(err));
        }
    };
    if questions.is_empty() {
        println!(
            "{}",
            "The question file is empty. Come back when it has some questions!".yellow()
        );
        return finish(store, Err(Error::NoQuestions));
    }

    let policy = ResetPolicy {
        used_cap: args.used_cap,
        used_fraction: args.used_fraction,
        games_cap: args.games_cap,
    };
    let mut game = Game::new(QuestionPool::new(questions, policy), args.variant);

    let result = run(&mut game, &store);
    finish(store, result)
}

fn run(game: &mut Game, store: &dyn Storage) -> Result<(), Error> {
    game.restore(store)?;
    if game.startup_reset_check(store)? {
        println!(
            "{}",
            "Most of the board has been played. Starting with a fresh question pool!".cyan()
        );
    }

    println!(
        "{}",
        format!(
            "==========> Trivia Board ({} questions) <==========",
            game.pool().total_count()
        )
        .cyan()
    );

    loop {
        print_board(game);
        print!(
            "{} ",
            "Pick a cell (category and difficulty, e.g. `place 3`), n to end the game, q to quit:"
                .cyan()
        );
        let line: String = read!("{}\n");
        let choice = Choice::from_str(line.as_str());
        debug!("choice: {:?}", choice);

        match choice {
            Choice::Quit => {
                println!("{}", "Quitting!".cyan());
                return Ok(());
            }
            Choice::NewGame => {
                let over = game.finish_game(store)?;
                println!(
                    "{}",
                    format!(" Game over! Final score: {} ", over.final_score)
                        .black()
                        .bold()
                        .on_white()
                );
                if over.pool_reset {
                    println!(
                        "{}",
                        "The question pool has been refreshed for the next game.".cyan()
                    );
                }
            }
            Choice::Cell(category, difficulty) => {
                match game.pick(&mut rng(), store, category, difficulty)? {
                    Some(question) => ask(game, &question),
                    None => println!(
                        "{}",
                        "No questions left for that cell. Try another!".yellow()
                    ),
                }
            }
            Choice::Invalid => {
                println!(
                    "{}",
                    "Pick a category (place, person, event, number, food) and a difficulty from 1 to 5."
                        .bright_red()
                );
            }
        }
    }
}

fn ask(game: &mut Game, question: &Question) {
    let won = prize(question.difficulty);
    println!(
        "{}",
        format!("{} for the {}:", question.category, won.name).cyan()
    );
    println!(
        "{}",
        format!(" {} ", question.clue).black().bold().on_white()
    );
    print!("{} ", "Your answer:".cyan());
    let guess: String = read!("{}\n");

    match game.answer(question, guess.as_str()) {
        Graded::Correct { points } => {
            println!(
                "{}",
                format!("Correct! {} (+{} points)", question.answer, points).bright_green()
            );
        }
        Graded::Incorrect => {
            println!(
                "{}",
                format!("Incorrect! The answer was: {}", question.answer).bright_red()
            );
        }
    }
}

fn print_board(game: &Game) {
    let pool = game.pool();
    println!();
    println!(
        "{}",
        format!(
            "Score: {} | Streak: {} | Games played: {} | Questions available: {}",
            game.score(),
            game.streak(),
            pool.games_played(),
            pool.available_count()
        )
        .cyan()
    );
    let header: String = (1..=5)
        .map(|difficulty| format!("{:^7}", difficulty))
        .collect();
    println!("{:>8}  {}", "", header.bold());
    for category in Category::ALL {
        let row: String = (1..=5)
            .map(|difficulty| {
                if pool.cell_available(category, difficulty) == 0 {
                    format!("{:^7}", "-")
                } else {
                    format!("{:^7}", prize(difficulty).value)
                }
            })
            .collect();
        println!("{}  {}", format!("{:>8}", category).bold(), row);
    }
}

fn finish(store: db::SqliteStore, to_error: Result<(), Error>) -> Result<(), Error> {
    db::close_store(store)?;
    to_error
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn choice_parsing() {
        assert_eq!(Choice::from_str("q"), Choice::Quit);
        assert_eq!(Choice::from_str("n"), Choice::NewGame);
        assert_eq!(
            Choice::from_str("place 3"),
            Choice::Cell(Category::Place, 3)
        );
        assert_eq!(
            Choice::from_str("  FOOD 5 "),
            Choice::Cell(Category::Food, 5)
        );
        assert_eq!(Choice::from_str("place 6"), Choice::Invalid);
        assert_eq!(Choice::from_str("place"), Choice::Invalid);
        assert_eq!(Choice::from_str("history 2"), Choice::Invalid);
        assert_eq!(Choice::from_str(""), Choice::Invalid);
    }
}
