// src/services/prompt_gen.rs
//! Writing-prompt generation backed by an OpenAI-compatible chat endpoint.
//!
//! The generator is strictly best-effort: missing configuration, timeouts,
//! non-200 responses, malformed bodies and the daily quota all degrade to a
//! fixed local prompt list, so callers never see a hard failure.

use chrono::{NaiveDate, Utc};
use rand::seq::SliceRandom;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::env;
use std::sync::Mutex;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

const HTTP_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_DAILY_LIMIT: u32 = 200;

const SYSTEM_PROMPT: &str = "You are a journaling companion. Reply with a single \
short, open-ended journaling prompt (one or two sentences). No preamble, no \
numbering, no quotation marks.";

/// Local prompts served whenever the generation service is unavailable.
const FALLBACK_PROMPTS: &[&str] = &[
    "What is one small moment from today you want to remember?",
    "Describe something that challenged you recently and how you responded.",
    "What are three things you are grateful for right now, and why?",
    "Write about a person who influenced you this week.",
    "What is something you are looking forward to? What makes it exciting?",
    "Describe your current mood as if it were weather.",
    "What would you tell yourself from one year ago?",
    "Write about a place where you feel completely at ease.",
    "What habit would you like to build, and what is the smallest first step?",
    "Describe a conversation that stuck with you recently.",
    "What did you learn about yourself this week?",
    "If today had a title like a book chapter, what would it be and why?",
];

#[derive(Debug, Error)]
pub enum PromptGenError {
    #[error("prompt generation not configured")]
    NotConfigured,

    #[error("daily prompt quota exceeded")]
    QuotaExceeded,

    #[error("request failed: {0}")]
    RequestFailed(String),

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: String,
}

/// Day-scoped request counter. Rolls over when the UTC date changes.
#[derive(Debug)]
struct DailyQuota {
    date: NaiveDate,
    used: u32,
}

/// A generated prompt plus where it came from, so the client can tell a
/// live generation from a canned fallback.
#[derive(Debug, Serialize)]
pub struct GeneratedPrompt {
    pub prompt: String,
    pub source: PromptSource,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptSource {
    Ai,
    Fallback,
}

#[derive(Debug)]
pub struct PromptGenService {
    api_key: Option<String>,
    base_url: String,
    model: String,
    daily_limit: u32,
    quota: Mutex<DailyQuota>,
    client: Client,
}

impl PromptGenService {
    pub fn new(api_key: Option<String>, base_url: String, model: String, daily_limit: u32) -> Self {
        let client = Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            api_key,
            base_url,
            model,
            daily_limit,
            quota: Mutex::new(DailyQuota {
                date: Utc::now().date_naive(),
                used: 0,
            }),
            client,
        }
    }

    /// Build the service from `OPENAI_API_KEY` / `OPENAI_BASE_URL` /
    /// `OPENAI_MODEL` / `AI_PROMPT_DAILY_LIMIT`. Without an API key every
    /// request is served from the fallback list.
    pub fn from_env() -> Self {
        let api_key = env::var("OPENAI_API_KEY").ok().filter(|k| !k.is_empty());
        if api_key.is_none() {
            warn!("OPENAI_API_KEY not set; AI prompts will use the local fallback list");
        }
        let base_url =
            env::var("OPENAI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let model = env::var("OPENAI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        let daily_limit = env::var("AI_PROMPT_DAILY_LIMIT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_DAILY_LIMIT);

        Self::new(api_key, base_url, model, daily_limit)
    }

    /// Generate a freewriting prompt. Never fails.
    pub async fn generate_prompt(&self) -> GeneratedPrompt {
        self.generate_or_fallback("Give me a journaling prompt for today.")
            .await
    }

    /// Generate a prompt about a caller-supplied topic. Never fails.
    pub async fn generate_custom_prompt(&self, topic: &str) -> GeneratedPrompt {
        let request = format!("Give me a journaling prompt about: {}", topic);
        self.generate_or_fallback(&request).await
    }

    async fn generate_or_fallback(&self, user_message: &str) -> GeneratedPrompt {
        match self.try_generate(user_message).await {
            Ok(prompt) => GeneratedPrompt {
                prompt,
                source: PromptSource::Ai,
            },
            Err(e) => {
                warn!(error = %e, "Prompt generation failed, serving fallback prompt");
                GeneratedPrompt {
                    prompt: self.fallback_prompt(),
                    source: PromptSource::Fallback,
                }
            }
        }
    }

    async fn try_generate(&self, user_message: &str) -> Result<String, PromptGenError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(PromptGenError::NotConfigured)?;

        self.consume_quota()?;

        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user_message.to_string(),
                },
            ],
            temperature: 0.9,
            max_tokens: 120,
        };

        debug!(model = %self.model, "Sending prompt generation request");

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| PromptGenError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(PromptGenError::RequestFailed(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        let body = response
            .json::<ChatCompletionResponse>()
            .await
            .map_err(|e| PromptGenError::InvalidResponse(e.to_string()))?;

        let content = body
            .choices
            .first()
            .map(|c| c.message.content.trim().to_string())
            .filter(|c| !c.is_empty())
            .ok_or_else(|| PromptGenError::InvalidResponse("no choices in response".to_string()))?;

        info!("Generated AI journaling prompt");
        Ok(content)
    }

    /// Count a request against today's quota, rolling the window at the
    /// UTC date boundary.
    fn consume_quota(&self) -> Result<(), PromptGenError> {
        let mut quota = self
            .quota
            .lock()
            .map_err(|_| PromptGenError::RequestFailed("quota lock poisoned".to_string()))?;

        let today = Utc::now().date_naive();
        if quota.date != today {
            quota.date = today;
            quota.used = 0;
        }

        if quota.used >= self.daily_limit {
            return Err(PromptGenError::QuotaExceeded);
        }

        quota.used += 1;
        Ok(())
    }

    fn fallback_prompt(&self) -> String {
        let mut rng = rand::thread_rng();
        FALLBACK_PROMPTS
            .choose(&mut rng)
            .unwrap_or(&FALLBACK_PROMPTS[0])
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unconfigured() -> PromptGenService {
        PromptGenService::new(None, DEFAULT_BASE_URL.to_string(), DEFAULT_MODEL.to_string(), 5)
    }

    #[tokio::test]
    async fn test_unconfigured_service_falls_back() {
        let service = unconfigured();
        let generated = service.generate_prompt().await;

        assert_eq!(generated.source, PromptSource::Fallback);
        assert!(FALLBACK_PROMPTS.contains(&generated.prompt.as_str()));
    }

    #[tokio::test]
    async fn test_custom_prompt_falls_back_without_key() {
        let service = unconfigured();
        let generated = service.generate_custom_prompt("the ocean").await;

        assert_eq!(generated.source, PromptSource::Fallback);
        assert!(!generated.prompt.is_empty());
    }

    #[test]
    fn test_quota_exhaustion() {
        let service = PromptGenService::new(
            Some("key".to_string()),
            DEFAULT_BASE_URL.to_string(),
            DEFAULT_MODEL.to_string(),
            2,
        );

        assert!(service.consume_quota().is_ok());
        assert!(service.consume_quota().is_ok());
        assert!(matches!(
            service.consume_quota().unwrap_err(),
            PromptGenError::QuotaExceeded
        ));
    }

    #[test]
    fn test_fallback_prompts_are_nonempty() {
        assert!(!FALLBACK_PROMPTS.is_empty());
        for prompt in FALLBACK_PROMPTS {
            assert!(!prompt.trim().is_empty());
        }
    }
}
