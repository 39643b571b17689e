use super::ChatModel;
use crate::config::ServicesConfig;
use crate::{JarvisError, Result};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

const BASE_PROMPT: &str =
    "You are a helpful, brief, and concise voice assistant named Jarvis. Acting like a best friend.";

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

pub fn system_prompt(user_name: Option<&str>) -> String {
    match user_name {
        Some(name) if !name.trim().is_empty() => format!("{} My name is {}.", BASE_PROMPT, name.trim()),
        _ => BASE_PROMPT.to_string(),
    }
}

/// Google Gemini `generateContent` client
pub struct GeminiClient {
    client: reqwest::blocking::Client,
    api_key: Option<String>,
    endpoint: String,
    system_prompt: String,
}

impl GeminiClient {
    pub fn new(client: reqwest::blocking::Client, services: &ServicesConfig) -> Self {
        let endpoint = format!(
            "{}/models/{}:generateContent",
            services.gemini_api_url.trim_end_matches('/'),
            services.gemini_model
        );
        Self {
            client,
            api_key: services.gemini_api_key.clone(),
            endpoint,
            system_prompt: system_prompt(services.user_name.as_deref()),
        }
    }

    fn reply_text(body: GenerateResponse) -> Option<String> {
        let text: String = body
            .candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .filter_map(|p| p.text)
            .collect();
        let text = text.trim().to_string();
        (!text.is_empty()).then_some(text)
    }
}

impl ChatModel for GeminiClient {
    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    fn reply(&mut self, prompt: &str) -> Result<String> {
        let Some(ref key) = self.api_key else {
            return Err(JarvisError::ConfigError("Gemini API key is not configured".into()));
        };

        let request = json!({
            "systemInstruction": { "parts": [{ "text": self.system_prompt }] },
            "contents": [{ "role": "user", "parts": [{ "text": prompt }] }],
        });

        let response = self
            .client
            .post(&self.endpoint)
            .header("x-goog-api-key", key.as_str())
            .json(&request)
            .send()?
            .error_for_status()?;
        let body: GenerateResponse = response.json()?;

        let reply = Self::reply_text(body)
            .ok_or_else(|| JarvisError::HandlerError("empty response from model".into()))?;
        debug!("Gemini replied with {} chars", reply.len());
        Ok(reply)
    }
}
