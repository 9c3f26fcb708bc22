//! Gemini `generateContent` client behind the [`LanguageModel`] capability.
//!
//! The provider payload is adapted to [`ModelResponse`] here and nowhere else.

use std::env;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use docqa_core::config::LlmSettings;
use docqa_core::error::Error;
use docqa_core::traits::LanguageModel;
use docqa_core::types::ModelResponse;

/// Credentials shorter than this are rejected before any request is made.
pub const MIN_API_KEY_LEN: usize = 20;

/// Check a credential read from `var`.
pub fn validate_credential(var: &str, value: Option<String>) -> docqa_core::error::Result<String> {
    match value {
        None => Err(Error::MissingCredential(var.to_string())),
        Some(v) if v.is_empty() => Err(Error::MissingCredential(var.to_string())),
        Some(v) if v.chars().count() < MIN_API_KEY_LEN => Err(Error::InvalidCredential(format!(
            "{var} must be at least {MIN_API_KEY_LEN} characters"
        ))),
        Some(v) => Ok(v),
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<RequestContent<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct RequestContent<'a> {
    role: &'static str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Debug, Clone)]
pub struct GeminiClient {
    base_url: String,
    model: String,
    api_key: String,
    temperature: f32,
    timeout: Duration,
}

impl GeminiClient {
    pub fn new(settings: &LlmSettings, api_key: String) -> Self {
        Self {
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            model: settings.model.clone(),
            api_key,
            temperature: settings.temperature,
            timeout: Duration::from_secs(settings.timeout_secs),
        }
    }

    /// Read and validate the credential named by `settings.api_key_env`.
    pub fn from_env(settings: &LlmSettings) -> docqa_core::error::Result<Self> {
        let key = validate_credential(&settings.api_key_env, env::var(&settings.api_key_env).ok())?;
        Ok(Self::new(settings, key))
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    fn request_body(&self, prompt: &str) -> Result<serde_json::Value> {
        let req = GenerateRequest {
            contents: vec![RequestContent { role: "user", parts: vec![RequestPart { text: prompt }] }],
            generation_config: GenerationConfig { temperature: self.temperature },
        };
        serde_json::to_value(req).context("encoding generate request")
    }
}

/// Concatenate the text parts of the first candidate.
fn parse_response(body: serde_json::Value) -> Result<ModelResponse> {
    let resp: GenerateResponse = serde_json::from_value(body).context("decoding generate response")?;
    let candidate = resp.candidates.into_iter().next().ok_or_else(|| model_error("response contained no candidates"))?;
    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();
    Ok(ModelResponse::new(text))
}

fn model_error(msg: impl Into<String>) -> anyhow::Error {
    Error::Model(msg.into()).into()
}

/// Pull the provider's error message out of a non-2xx body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}

impl LanguageModel for GeminiClient {
    fn invoke(&self, prompt: &str) -> Result<ModelResponse> {
        let body = self.request_body(prompt)?;
        debug!(model = %self.model, prompt_chars = prompt.chars().count(), "calling generateContent");

        let resp = ureq::post(&self.endpoint())
            .query("key", &self.api_key)
            .timeout(self.timeout)
            .send_json(body);

        match resp {
            Ok(r) => {
                let v: serde_json::Value = r.into_json().context("reading generate response")?;
                parse_response(v)
            }
            Err(ureq::Error::Status(code, r)) => {
                let text = r.into_string().unwrap_or_default();
                Err(model_error(format!("Gemini request failed (status {}): {}", code, error_message(&text))))
            }
            // transport errors embed the URL, which carries the key
            Err(ureq::Error::Transport(t)) => match t.message() {
                Some(msg) => Err(model_error(format!("Gemini request failed ({}): {}", t.kind(), msg))),
                None => Err(model_error(format!("Gemini request failed ({})", t.kind()))),
            },
        }
    }
}
