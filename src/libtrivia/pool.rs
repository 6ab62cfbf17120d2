use log::{debug, warn};
use rand::seq::IndexedRandom;
use rand::Rng;
use std::collections::HashSet;

use crate::libtrivia::question::{Category, Question};

/// When the no-repeat window resets: once the used set reaches
/// `min(used_cap, used_fraction of the pool)`, or once enough games have
/// been played.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ResetPolicy {
    pub used_cap: usize,
    pub used_fraction: f64,
    pub games_cap: u32,
}

impl Default for ResetPolicy {
    fn default() -> Self {
        ResetPolicy {
            used_cap: 150,
            used_fraction: 0.8,
            games_cap: 10,
        }
    }
}

impl ResetPolicy {
    fn used_threshold(&self, pool_size: usize) -> usize {
        self.used_cap
            .min((pool_size as f64 * self.used_fraction) as usize)
    }
}

/// All loaded questions plus the rolling set of ids already handed out.
/// Selection never repeats an id until [`QuestionPool::reset`] clears the
/// window.
#[derive(Debug)]
pub(crate) struct QuestionPool {
    questions: Vec<Question>,
    used: HashSet<i32>,
    games_played: u32,
    policy: ResetPolicy,
}

impl QuestionPool {
    pub fn new(questions: Vec<Question>, policy: ResetPolicy) -> QuestionPool {
        QuestionPool {
            questions,
            used: HashSet::new(),
            games_played: 0,
            policy,
        }
    }

    /// Picks an unused question for the given cell, uniformly at random,
    /// and marks it used. `None` means the cell is exhausted and the caller
    /// should offer a different one.
    pub fn select_question<R: Rng>(
        &mut self,
        rng: &mut R,
        category: Category,
        difficulty: u8,
    ) -> Option<Question> {
        let matching: Vec<&Question> = self
            .questions
            .iter()
            .filter(|q| {
                q.category == category
                    && q.difficulty == difficulty
                    && !self.used.contains(&q.id)
            })
            .collect();

        if matching.is_empty() {
            warn!(
                "[Setup] No unused questions for {} at difficulty {}.",
                category, difficulty
            );
            return None;
        }

        let question = (*matching.choose(rng)?).clone();
        debug!("[Setup] Picked question {}.", question.id);
        self.used.insert(question.id);
        Some(question)
    }

    pub fn should_reset(&self) -> bool {
        self.used.len() >= self.policy.used_threshold(self.questions.len())
            || self.games_played >= self.policy.games_cap
    }

    pub fn reset(&mut self) {
        debug!(
            "[Setup] Resetting the no-repeat window ({} used, {} games played).",
            self.used.len(),
            self.games_played
        );
        self.used.clear();
        self.games_played = 0;
    }

    pub fn available_count(&self) -> usize {
        self.questions.len() - self.used.len()
    }

    pub fn total_count(&self) -> usize {
        self.questions.len()
    }

    pub fn cell_available(&self, category: Category, difficulty: u8) -> usize {
        self.questions
            .iter()
            .filter(|q| {
                q.category == category
                    && q.difficulty == difficulty
                    && !self.used.contains(&q.id)
            })
            .count()
    }

    pub fn games_played(&self) -> u32 {
        self.games_played
    }

    pub fn record_game(&mut self) {
        self.games_played += 1;
    }

    pub fn used_ids(&self) -> Vec<i32> {
        let mut ids: Vec<i32> = self.used.iter().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Replaces the tracking state with a persisted snapshot. Ids that no
    /// longer exist in the pool are dropped so `used` stays a subset of the
    /// loaded questions.
    pub fn restore(&mut self, used_ids: Vec<i32>, games_played: u32) {
        let known: HashSet<i32> = self.questions.iter().map(|q| q.id).collect();
        let saved = used_ids.len();
        self.used = used_ids.into_iter().filter(|id| known.contains(id)).collect();
        if self.used.len() < saved {
            warn!(
                "[Setup] Dropped {} saved ids no longer in the pool.",
                saved - self.used.len()
            );
        }
        self.games_played = games_played;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn question(id: i32, category: Category, difficulty: u8) -> Question {
        Question {
            id,
            category,
            difficulty,
            clue: format!("clue {}", id),
            answer: format!("answer {}", id),
        }
    }

    fn pool_of(questions: Vec<Question>) -> QuestionPool {
        QuestionPool::new(questions, ResetPolicy::default())
    }

    #[test]
    fn never_repeats_a_question_before_reset() {
        let mut pool = pool_of(vec![
            question(1, Category::Place, 1),
            question(2, Category::Place, 1),
        ]);
        let mut rng = StdRng::seed_from_u64(7);

        let first = pool.select_question(&mut rng, Category::Place, 1).unwrap();
        let second = pool.select_question(&mut rng, Category::Place, 1).unwrap();
        assert_ne!(first.id, second.id);
        assert!(pool.select_question(&mut rng, Category::Place, 1).is_none());
    }

    #[test]
    fn selection_filters_by_cell() {
        let mut pool = pool_of(vec![
            question(1, Category::Place, 1),
            question(2, Category::Person, 1),
            question(3, Category::Place, 2),
        ]);
        let mut rng = StdRng::seed_from_u64(7);

        let picked = pool.select_question(&mut rng, Category::Person, 1).unwrap();
        assert_eq!(picked.id, 2);
        assert!(pool.select_question(&mut rng, Category::Food, 1).is_none());
        assert!(pool.select_question(&mut rng, Category::Place, 5).is_none());
    }

    #[test]
    fn reset_restores_the_full_pool() {
        let mut pool = pool_of(vec![
            question(1, Category::Place, 1),
            question(2, Category::Place, 1),
        ]);
        let mut rng = StdRng::seed_from_u64(7);

        pool.select_question(&mut rng, Category::Place, 1).unwrap();
        pool.record_game();
        assert_eq!(pool.available_count(), 1);

        pool.reset();
        assert_eq!(pool.available_count(), 2);
        assert_eq!(pool.games_played(), 0);
        assert!(!pool.should_reset());
    }

    #[test]
    fn resets_once_enough_of_the_pool_is_used() {
        // threshold = min(150, 10 * 0.8) = 8
        let questions = (0..10).map(|i| question(i, Category::Number, 3)).collect();
        let mut pool = QuestionPool::new(questions, ResetPolicy::default());
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..7 {
            pool.select_question(&mut rng, Category::Number, 3).unwrap();
        }
        assert!(!pool.should_reset());

        pool.select_question(&mut rng, Category::Number, 3).unwrap();
        assert!(pool.should_reset());
    }

    #[test]
    fn the_fixed_cap_wins_over_the_fraction() {
        let questions = (0..20).map(|i| question(i, Category::Event, 2)).collect();
        let policy = ResetPolicy {
            used_cap: 4,
            used_fraction: 0.8,
            games_cap: 10,
        };
        let mut pool = QuestionPool::new(questions, policy);
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..3 {
            pool.select_question(&mut rng, Category::Event, 2).unwrap();
        }
        assert!(!pool.should_reset());

        pool.select_question(&mut rng, Category::Event, 2).unwrap();
        assert!(pool.should_reset());
    }

    #[test]
    fn resets_at_the_games_cap_regardless_of_usage() {
        let questions = (0..5).map(|i| question(i, Category::Place, 1)).collect();
        let mut pool = QuestionPool::new(questions, ResetPolicy::default());

        for _ in 0..9 {
            pool.record_game();
        }
        assert!(!pool.should_reset());

        pool.record_game();
        assert!(pool.should_reset());
    }

    #[test]
    fn restore_drops_ids_missing_from_the_pool() {
        let mut pool = pool_of(vec![
            question(1, Category::Place, 1),
            question(2, Category::Place, 2),
        ]);

        pool.restore(vec![1, 99], 3);
        assert_eq!(pool.available_count(), 1);
        assert_eq!(pool.games_played(), 3);
        assert_eq!(pool.used_ids(), vec![1]);
    }
}
