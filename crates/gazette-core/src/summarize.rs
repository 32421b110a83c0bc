//! Bounded summaries through an external text-generation service.

use std::future::Future;

use thiserror::Error;

/// Instruction sent with every summary request.
pub const SYSTEM_INSTRUCTION: &str = "Summarize newly published legal acts in plain, accessible language. \
Keep the summary short enough to fit within the output budget.";

#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("generation service returned status {status}: {body}")]
    Api { status: u16, body: String },
    #[error("generation service returned no content")]
    EmptyResponse,
    #[error("generation service not configured: {0}")]
    NotConfigured(String),
}

/// One request to the text-generation service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub system: String,
    pub prompt: String,
    pub max_output_tokens: u32,
}

/// The narrow interface the pipeline needs from a text-generation service.
pub trait TextGenerator: Send + Sync {
    fn generate(
        &self,
        request: GenerationRequest,
    ) -> impl Future<Output = Result<String, GenerationError>> + Send;
}

/// Truncates document text and asks a [`TextGenerator`] for a summary.
#[derive(Debug)]
pub struct SummaryRequester<G> {
    generator: G,
    system_instruction: String,
}

impl<G: TextGenerator> SummaryRequester<G> {
    pub fn new(generator: G) -> Self {
        Self {
            generator,
            system_instruction: SYSTEM_INSTRUCTION.to_string(),
        }
    }

    pub fn with_system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = instruction.into();
        self
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    /// Summarize `text`, submitting at most `max_input_chars` characters of it.
    ///
    /// The returned summary is trimmed; a blank response is an error.
    pub async fn summarize(
        &self,
        text: &str,
        max_input_chars: usize,
        max_output_tokens: u32,
    ) -> Result<String, GenerationError> {
        let prompt = truncate_chars(text, max_input_chars);
        if prompt.len() < text.len() {
            log::debug!(
                "truncated summary input from {} to {} characters",
                text.chars().count(),
                max_input_chars
            );
        }

        let request = GenerationRequest {
            system: self.system_instruction.clone(),
            prompt: prompt.to_string(),
            max_output_tokens,
        };

        let summary = self.generator.generate(request).await?;
        let summary = summary.trim();
        if summary.is_empty() {
            return Err(GenerationError::EmptyResponse);
        }
        Ok(summary.to_string())
    }
}

/// The first `max_chars` characters of `text`, cut on a char boundary.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Records every request and answers with a fixed reply.
    struct Recorder {
        reply: Result<String, ()>,
        seen: Mutex<Vec<GenerationRequest>>,
    }

    impl Recorder {
        fn replying(reply: &str) -> Self {
            Self {
                reply: Ok(reply.to_string()),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                reply: Err(()),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    impl TextGenerator for Recorder {
        async fn generate(&self, request: GenerationRequest) -> Result<String, GenerationError> {
            self.seen.lock().unwrap().push(request);
            match &self.reply {
                Ok(text) => Ok(text.clone()),
                Err(()) => Err(GenerationError::Api {
                    status: 500,
                    body: "boom".into(),
                }),
            }
        }
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate_chars("zażółć gęślą", 4), "zażó");
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("abc", 0), "");
    }

    #[tokio::test]
    async fn long_input_is_cut_before_submission() {
        let requester = SummaryRequester::new(Recorder::replying("Krótko."));
        let text = "a".repeat(50) + &"b".repeat(50);

        let summary = requester.summarize(&text, 50, 120).await.unwrap();

        assert_eq!(summary, "Krótko.");
        let seen = requester.generator().seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].prompt, "a".repeat(50));
        assert_eq!(seen[0].max_output_tokens, 120);
        assert_eq!(seen[0].system, SYSTEM_INSTRUCTION);
    }

    #[tokio::test]
    async fn short_input_is_submitted_whole() {
        let requester = SummaryRequester::new(Recorder::replying("ok"));
        requester.summarize("tekst ustawy", 1_000, 50).await.unwrap();
        let seen = requester.generator().seen.lock().unwrap();
        assert_eq!(seen[0].prompt, "tekst ustawy");
    }

    #[tokio::test]
    async fn reply_is_trimmed() {
        let requester = SummaryRequester::new(Recorder::replying("\n  Summary body.  \n"));
        assert_eq!(requester.summarize("x", 10, 10).await.unwrap(), "Summary body.");
    }

    #[tokio::test]
    async fn blank_reply_is_empty_response() {
        let requester = SummaryRequester::new(Recorder::replying("   \n"));
        let err = requester.summarize("x", 10, 10).await.unwrap_err();
        assert!(matches!(err, GenerationError::EmptyResponse));
    }

    #[tokio::test]
    async fn service_failure_propagates() {
        let requester = SummaryRequester::new(Recorder::failing());
        let err = requester.summarize("x", 10, 10).await.unwrap_err();
        assert!(matches!(err, GenerationError::Api { status: 500, .. }));
    }

    #[tokio::test]
    async fn custom_instruction_is_sent() {
        let requester = SummaryRequester::new(Recorder::replying("ok"))
            .with_system_instruction("Streszczaj nowe ustawy w prostym, zrozumiałym języku.");
        requester.summarize("x", 10, 10).await.unwrap();
        let seen = requester.generator().seen.lock().unwrap();
        assert_eq!(seen[0].system, "Streszczaj nowe ustawy w prostym, zrozumiałym języku.");
    }
}
