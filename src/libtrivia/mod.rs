use std::io;
use thiserror::Error;

pub(crate) mod db;
pub(crate) mod game;
pub(crate) mod pool;
pub(crate) mod question;

#[derive(Debug, Error)]
pub(crate) enum Error {
    #[error("no questions!")]
    NoQuestions,
    #[error("cannot read questions file: {0}")]
    QuestionsRead(#[from] io::Error),
    #[error("cannot encode or decode JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("save state storage: {0}")]
    SaveState(#[from] rusqlite::Error),
}
