//! Strict line grammar for generated question blocks.
//!
//! Blocks are separated by blank lines. Each block must read:
//!
//! ```text
//! Question: <text>
//! A) <text>
//! B) <text>
//! C) <text>
//! D) <text>
//! Answer: <A-D>
//! Image: <url>        (optional)
//! ```
//!
//! Polish blocks use `Pytanie:`, `Odpowiedź:` and `Obrazek:`. Anything else
//! makes the block malformed; malformed blocks are reported, never dropped.

use thiserror::Error;

use crate::{Choice, Language, Question};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MalformedReason {
    #[error("expected a line starting with {expected:?}, found {found:?}")]
    MissingQuestion { expected: &'static str, found: String },
    #[error("question text is empty")]
    EmptyQuestion,
    #[error("expected option {expected}), found {found:?}")]
    BadOption { expected: Choice, found: String },
    #[error("option {0} has no text")]
    EmptyOption(Choice),
    #[error("expected a line starting with {expected:?}, found {found:?}")]
    MissingAnswer { expected: &'static str, found: String },
    #[error("answer {0:?} is not one of A-D")]
    InvalidAnswer(String),
    #[error("block ended before {0}")]
    Truncated(String),
    #[error("unexpected line {0:?}")]
    UnexpectedLine(String),
}

/// Result of parsing one block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockResult {
    Parsed(Question),
    Malformed(MalformedReason),
}

/// A block that failed to parse, by position among the input's blocks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Malformed {
    pub index: usize,
    pub reason: MalformedReason,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseOutcome {
    pub questions: Vec<Question>,
    pub malformed: Vec<Malformed>,
}

impl ParseOutcome {
    pub fn total_blocks(&self) -> usize {
        self.questions.len() + self.malformed.len()
    }

    pub fn is_clean(&self) -> bool {
        self.malformed.is_empty()
    }
}

/// Parse every block in `raw`, keeping parsed questions in input order.
pub fn parse_questions(raw: &str, language: Language) -> ParseOutcome {
    let mut outcome = ParseOutcome::default();

    for (index, block) in split_blocks(raw).iter().enumerate() {
        match parse_block(block, language) {
            BlockResult::Parsed(question) => outcome.questions.push(question),
            BlockResult::Malformed(reason) => {
                log::debug!("question block {} malformed: {}", index + 1, reason);
                outcome.malformed.push(Malformed { index, reason });
            }
        }
    }

    if !outcome.is_clean() {
        log::warn!(
            "{} of {} question block(s) malformed",
            outcome.malformed.len(),
            outcome.total_blocks()
        );
    }
    outcome
}

pub fn parse_block(block: &str, language: Language) -> BlockResult {
    match parse_lines(block, language) {
        Ok(question) => BlockResult::Parsed(question),
        Err(reason) => BlockResult::Malformed(reason),
    }
}

fn split_blocks(raw: &str) -> Vec<String> {
    let mut blocks = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in raw.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                blocks.push(current.join("\n"));
                current.clear();
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        blocks.push(current.join("\n"));
    }
    blocks
}

fn parse_lines(block: &str, language: Language) -> Result<Question, MalformedReason> {
    let mut lines = block.lines().map(str::trim).filter(|l| !l.is_empty());

    let question_label = language.question_label();
    let line = lines
        .next()
        .ok_or_else(|| MalformedReason::Truncated(question_label.to_string()))?;
    let prompt = strip_label(line, question_label).ok_or_else(|| MalformedReason::MissingQuestion {
        expected: question_label,
        found: line.to_string(),
    })?;
    if prompt.is_empty() {
        return Err(MalformedReason::EmptyQuestion);
    }

    let mut options: [String; 4] = Default::default();
    for choice in Choice::ALL {
        let line = lines
            .next()
            .ok_or_else(|| MalformedReason::Truncated(format!("option {})", choice)))?;
        let text = option_text(line, choice).ok_or_else(|| MalformedReason::BadOption {
            expected: choice,
            found: line.to_string(),
        })?;
        if text.is_empty() {
            return Err(MalformedReason::EmptyOption(choice));
        }
        options[choice.index()] = text.to_string();
    }

    let answer_label = language.answer_label();
    let line = lines
        .next()
        .ok_or_else(|| MalformedReason::Truncated(answer_label.to_string()))?;
    let answer = strip_label(line, answer_label).ok_or_else(|| MalformedReason::MissingAnswer {
        expected: answer_label,
        found: line.to_string(),
    })?;
    let correct = parse_answer(answer).ok_or_else(|| MalformedReason::InvalidAnswer(answer.to_string()))?;

    let image = match lines.next() {
        None => None,
        Some(line) => {
            let url = strip_label(line, language.image_label())
                .ok_or_else(|| MalformedReason::UnexpectedLine(line.to_string()))?;
            let placeholder = url.is_empty() || ["none", "brak", "-"].iter().any(|p| url.eq_ignore_ascii_case(p));
            (!placeholder).then(|| url.to_string())
        }
    };

    if let Some(extra) = lines.next() {
        return Err(MalformedReason::UnexpectedLine(extra.to_string()));
    }

    Ok(Question {
        prompt: prompt.to_string(),
        options,
        correct,
        image,
    })
}

/// The trimmed remainder of `line` after `label`, compared ASCII-case-insensitively.
fn strip_label<'a>(line: &'a str, label: &str) -> Option<&'a str> {
    let head = line.get(..label.len())?;
    head.eq_ignore_ascii_case(label)
        .then(|| line[label.len()..].trim())
}

fn option_text(line: &str, choice: Choice) -> Option<&str> {
    let mut chars = line.chars();
    if chars.next()? != choice.letter() || chars.next()? != ')' {
        return None;
    }
    Some(chars.as_str().trim())
}

fn parse_answer(answer: &str) -> Option<Choice> {
    let answer = answer.trim_end_matches([')', '.']);
    let mut chars = answer.chars();
    let letter = chars.next()?;
    if chars.next().is_some() {
        return None;
    }
    Choice::from_letter(letter)
}
