use std::fmt;
use std::str::FromStr;

mod generate;
mod offline;
mod parse;

pub use generate::{DEFAULT_QUESTION_COUNT, QuizGenerator, question_prompt};
pub use offline::{categories, offline_bank};
pub use parse::{BlockResult, Malformed, MalformedReason, ParseOutcome, parse_block, parse_questions};

/// Question language; decides the line labels the parser expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Language {
    #[default]
    En,
    Pl,
}

impl Language {
    pub(crate) fn question_label(self) -> &'static str {
        match self {
            Language::En => "Question:",
            Language::Pl => "Pytanie:",
        }
    }

    pub(crate) fn answer_label(self) -> &'static str {
        match self {
            Language::En => "Answer:",
            Language::Pl => "Odpowiedź:",
        }
    }

    pub(crate) fn image_label(self) -> &'static str {
        match self {
            Language::En => "Image:",
            Language::Pl => "Obrazek:",
        }
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "EN" => Ok(Language::En),
            "PL" => Ok(Language::Pl),
            other => Err(format!("unsupported language: {}", other)),
        }
    }
}

/// One of the four answer slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    A,
    B,
    C,
    D,
}

impl Choice {
    pub const ALL: [Choice; 4] = [Choice::A, Choice::B, Choice::C, Choice::D];

    pub fn letter(self) -> char {
        match self {
            Choice::A => 'A',
            Choice::B => 'B',
            Choice::C => 'C',
            Choice::D => 'D',
        }
    }

    pub fn from_letter(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'A' => Some(Choice::A),
            'B' => Some(Choice::B),
            'C' => Some(Choice::C),
            'D' => Some(Choice::D),
            _ => None,
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Choice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

/// A multiple-choice question with exactly four options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub prompt: String,
    pub options: [String; 4],
    pub correct: Choice,
    pub image: Option<String>,
}

impl Question {
    pub fn option(&self, choice: Choice) -> &str {
        &self.options[choice.index()]
    }

    pub fn is_correct(&self, choice: Choice) -> bool {
        self.correct == choice
    }
}
