//! Built-in questions for when no generator is available.

use crate::{Choice, Language, Question};

struct Entry {
    prompt: &'static str,
    options: [&'static str; 4],
    correct: Choice,
}

const PL_HISTORY: &[Entry] = &[
    Entry {
        prompt: "Kto był pierwszym królem Polski?",
        options: ["Bolesław Chrobry", "Mieszko I", "Kazimierz Wielki", "Władysław Jagiełło"],
        correct: Choice::A,
    },
    Entry {
        prompt: "W którym roku rozpoczęła się II wojna światowa?",
        options: ["1938", "1939", "1940", "1941"],
        correct: Choice::B,
    },
];

const PL_MATH: &[Entry] = &[Entry {
    prompt: "Ile wynosi suma kątów wewnętrznych trójkąta?",
    options: ["90°", "180°", "270°", "360°"],
    correct: Choice::B,
}];

const EN_HISTORY: &[Entry] = &[
    Entry {
        prompt: "Who was the first king of Poland?",
        options: ["Bolesław Chrobry", "Mieszko I", "Casimir the Great", "Władysław Jagiełło"],
        correct: Choice::A,
    },
    Entry {
        prompt: "In which year did World War II start?",
        options: ["1938", "1939", "1940", "1941"],
        correct: Choice::B,
    },
];

const EN_MATH: &[Entry] = &[Entry {
    prompt: "What is the sum of the interior angles of a triangle?",
    options: ["90°", "180°", "270°", "360°"],
    correct: Choice::B,
}];

fn bank(language: Language) -> &'static [(&'static str, &'static [Entry])] {
    match language {
        Language::Pl => &[("Historia Polski", PL_HISTORY), ("Matematyka", PL_MATH)],
        Language::En => &[("Polish History", EN_HISTORY), ("Math", EN_MATH)],
    }
}

/// Category names available offline for `language`.
pub fn categories(language: Language) -> Vec<&'static str> {
    bank(language).iter().map(|(name, _)| *name).collect()
}

/// Offline questions for a category; empty when the category is unknown.
pub fn offline_bank(language: Language, category: &str) -> Vec<Question> {
    bank(language)
        .iter()
        .find(|(name, _)| *name == category)
        .map(|(_, entries)| entries.iter().map(to_question).collect())
        .unwrap_or_default()
}

fn to_question(entry: &Entry) -> Question {
    Question {
        prompt: entry.prompt.to_string(),
        options: entry.options.map(str::to_string),
        correct: entry.correct,
        image: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories_per_language() {
        assert_eq!(categories(Language::Pl), vec!["Historia Polski", "Matematyka"]);
        assert_eq!(categories(Language::En), vec!["Polish History", "Math"]);
    }

    #[test]
    fn bank_holds_four_option_questions() {
        let history = offline_bank(Language::En, "Polish History");
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].option(history[1].correct), "1939");

        let math = offline_bank(Language::Pl, "Matematyka");
        assert_eq!(math.len(), 1);
        assert_eq!(math[0].option(Choice::B), "180°");
    }

    #[test]
    fn unknown_category_is_empty() {
        assert!(offline_bank(Language::En, "Matematyka").is_empty());
    }
}
