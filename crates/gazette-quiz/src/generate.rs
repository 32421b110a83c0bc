use gazette_core::{GenerationError, GenerationRequest, TextGenerator};

use crate::{Language, ParseOutcome, parse_questions};

/// Questions requested when the caller does not say.
pub const DEFAULT_QUESTION_COUNT: usize = 5;

const MAX_OUTPUT_TOKENS: u32 = 1500;

/// The request text asking for `count` questions in `category`.
pub fn question_prompt(category: &str, count: usize, language: Language) -> String {
    match language {
        Language::Pl => format!(
            "Wygeneruj {count} pytań quizowych z kategorii '{category}'. \
             Każde pytanie powinno mieć 4 odpowiedzi (A, B, C, D), poprawną odpowiedź i opcjonalnie obrazek. \
             Format:\nPytanie: ...\nA) ...\nB) ...\nC) ...\nD) ...\nOdpowiedź: <litera>\nObrazek: <URL> (opcjonalnie)"
        ),
        Language::En => format!(
            "Generate {count} quiz questions for category '{category}'. \
             Each question should have 4 answers (A, B, C, D), the correct answer and optionally an image. \
             Format:\nQuestion: ...\nA) ...\nB) ...\nC) ...\nD) ...\nAnswer: <letter>\nImage: <URL> (optional)"
        ),
    }
}

fn system_line(language: Language) -> &'static str {
    match language {
        Language::Pl => "Jesteś generatorem pytań quizowych.",
        Language::En => "You are a quiz question generator.",
    }
}

/// Asks a [`TextGenerator`] for questions and parses the reply.
#[derive(Debug)]
pub struct QuizGenerator<G> {
    generator: G,
    language: Language,
}

impl<G: TextGenerator> QuizGenerator<G> {
    pub fn new(generator: G, language: Language) -> Self {
        Self { generator, language }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub async fn fetch_questions(&self, category: &str, count: usize) -> Result<ParseOutcome, GenerationError> {
        let request = GenerationRequest {
            system: system_line(self.language).to_string(),
            prompt: question_prompt(category, count, self.language),
            max_output_tokens: MAX_OUTPUT_TOKENS,
        };
        let raw = self.generator.generate(request).await?;
        let outcome = parse_questions(raw.trim(), self.language);
        log::info!(
            "received {} question(s) for '{}' ({} malformed)",
            outcome.questions.len(),
            category,
            outcome.malformed.len()
        );
        Ok(outcome)
    }
}
