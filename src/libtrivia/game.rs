use log::{debug, warn};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::libtrivia::db::Storage;
use crate::libtrivia::pool::QuestionPool;
use crate::libtrivia::question::{prize, Category, Question};
use crate::libtrivia::Error;

/// The persisted slice of the session: the no-repeat window and the games
/// counter. Score and streak belong to the running game and are not saved.
#[derive(Serialize, Deserialize, Debug, Default)]
struct SavedState {
    used_question_ids: Vec<i32>,
    games_played: u32,
}

#[derive(Debug, PartialEq)]
pub(crate) enum Graded {
    Correct { points: u32 },
    Incorrect,
}

#[derive(Debug)]
pub(crate) struct GameOver {
    pub final_score: u32,
    pub pool_reset: bool,
}

/// Loose match: both sides trimmed and lowercased, graded correct on
/// equality or substring containment in either direction.
pub(crate) fn grade(guess: &str, answer: &str) -> bool {
    let guess = guess.trim().to_lowercase();
    let answer = answer.trim().to_lowercase();
    guess == answer || answer.contains(&guess) || guess.contains(&answer)
}

/// One player session: the question pool plus the running score and streak.
/// Constructed explicitly by the front-end; persistence goes through the
/// [`Storage`] handle passed into each state-changing call.
pub(crate) struct Game {
    pool: QuestionPool,
    save_key: String,
    score: u32,
    streak: u32,
}

impl Game {
    pub fn new(pool: QuestionPool, save_key: String) -> Game {
        Game {
            pool,
            save_key,
            score: 0,
            streak: 0,
        }
    }

    pub fn pool(&self) -> &QuestionPool {
        &self.pool
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn streak(&self) -> u32 {
        self.streak
    }

    /// Loads the tracking state saved under this game's variant key.
    /// Missing or unreadable blobs leave the defaults in place.
    pub fn restore(&mut self, store: &dyn Storage) -> Result<(), Error> {
        match store.get(&self.save_key)? {
            None => debug!("[Game] No saved state under '{}'.", self.save_key),
            Some(blob) => match serde_json::from_str::<SavedState>(blob.as_str()) {
                Ok(state) => {
                    debug!(
                        "[Game] Restored {} used ids and {} games played.",
                        state.used_question_ids.len(),
                        state.games_played
                    );
                    self.pool.restore(state.used_question_ids, state.games_played);
                }
                Err(err) => warn!("[Game] Discarding unreadable saved state: {}", err),
            },
        }
        Ok(())
    }

    pub fn save(&self, store: &dyn Storage) -> Result<(), Error> {
        let used_question_ids = self.pool.used_ids();
        if used_question_ids.is_empty() && self.pool.games_played() == 0 {
            // A fresh window is the same as no save at all.
            store.delete(&self.save_key)?;
            return Ok(());
        }
        let state = SavedState {
            used_question_ids,
            games_played: self.pool.games_played(),
        };
        store.set(&self.save_key, serde_json::to_string(&state)?.as_str())?;
        Ok(())
    }

    /// Draws a question for the chosen cell and persists the grown window.
    /// `None` means the cell is exhausted.
    pub fn pick<R: Rng>(
        &mut self,
        rng: &mut R,
        store: &dyn Storage,
        category: Category,
        difficulty: u8,
    ) -> Result<Option<Question>, Error> {
        let question = match self.pool.select_question(rng, category, difficulty) {
            None => return Ok(None),
            Some(question) => question,
        };
        self.save(store)?;
        Ok(Some(question))
    }

    pub fn answer(&mut self, question: &Question, guess: &str) -> Graded {
        if grade(guess, question.answer.as_str()) {
            let won = prize(question.difficulty);
            self.score += won.value;
            self.streak += 1;
            debug!(
                "[Game] Question {} answered correctly, +{} points.",
                question.id, won.value
            );
            Graded::Correct { points: won.value }
        } else {
            debug!("[Game] Question {} answered incorrectly.", question.id);
            self.streak = 0;
            Graded::Incorrect
        }
    }

    /// Ends the current game: counts it, zeroes score and streak, resets the
    /// no-repeat window if the policy says so, and persists.
    pub fn finish_game(&mut self, store: &dyn Storage) -> Result<GameOver, Error> {
        let final_score = self.score;
        debug!("[Game] Game finished with score {}.", final_score);
        self.pool.record_game();
        self.score = 0;
        self.streak = 0;
        let pool_reset = self.pool.should_reset();
        if pool_reset {
            self.pool.reset();
        }
        self.save(store)?;
        Ok(GameOver {
            final_score,
            pool_reset,
        })
    }

    /// Startup half of the reset policy: a window that crossed the threshold
    /// while persisted is cleared before play begins.
    pub fn startup_reset_check(&mut self, store: &dyn Storage) -> Result<bool, Error> {
        if !self.pool.should_reset() {
            return Ok(false);
        }
        self.pool.reset();
        self.save(store)?;
        Ok(true)
    }
}
