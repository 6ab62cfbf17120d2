use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::time::Instant;

use crate::libtrivia::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub(crate) enum Category {
    Place,
    Person,
    Event,
    Number,
    Food,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Place,
        Category::Person,
        Category::Event,
        Category::Number,
        Category::Food,
    ];

    fn name(&self) -> &'static str {
        match self {
            Category::Place => "Place",
            Category::Person => "Person",
            Category::Event => "Event",
            Category::Number => "Number",
            Category::Food => "Food",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

impl FromStr for Category {
    type Err = ();

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input.trim().to_lowercase().as_str() {
            "place" => Ok(Category::Place),
            "person" => Ok(Category::Person),
            "event" => Ok(Category::Event),
            "number" => Ok(Category::Number),
            "food" => Ok(Category::Food),
            _ => Err(()),
        }
    }
}

/// One board question. Loaded from the questions file at startup and never
/// mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Question {
    pub id: i32,
    pub category: Category,
    pub difficulty: u8,
    pub clue: String,
    pub answer: String,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct Prize {
    pub name: &'static str,
    pub value: u32,
}

const PRIZES: [Prize; 5] = [
    Prize { name: "Candy", value: 10 },
    Prize { name: "Small Pack", value: 25 },
    Prize { name: "Medium Pack", value: 50 },
    Prize { name: "Big Pack", value: 100 },
    Prize { name: "₱50 Cash", value: 200 },
];

/// Prize for a difficulty, 1-based. Out-of-range difficulties clamp to the
/// nearest prize tier.
pub(crate) fn prize(difficulty: u8) -> Prize {
    PRIZES[difficulty.clamp(1, 5) as usize - 1]
}

pub(crate) fn load_questions(src: &Path) -> Result<Vec<Question>, Error> {
    let now = Instant::now();
    let json = fs::read_to_string(src)?;
    let questions: Vec<Question> = serde_json::from_str(json.as_str())?;
    debug!(
        "[Setup] Loaded {} questions in {} ms.",
        questions.len(),
        now.elapsed().as_millis()
    );
    Ok(questions)
}
