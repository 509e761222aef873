use crate::config::TranslationSettings;
use crate::error::PlaqueError;

use rand::{thread_rng, Rng};
use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde_json::{json, Value};
use tracing::{debug, warn};

use std::sync::OnceLock;
use std::{thread, time::Duration};

const BASE_DELAY_MS: u64 = 800;

pub trait Translator {
    fn translate(&self, text: &str, source: &str, target: &str) -> Result<String, PlaqueError>;
}

impl<F> Translator for F
where
    F: Fn(&str, &str, &str) -> Result<String, PlaqueError>,
{
    fn translate(&self, text: &str, source: &str, target: &str) -> Result<String, PlaqueError> {
        self(text, source, target)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    LibreTranslate,
    OpenAi,
    DeepSeek,
}

impl Provider {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "libretranslate" | "libre" => Some(Provider::LibreTranslate),
            "openai" => Some(Provider::OpenAi),
            "deepseek" => Some(Provider::DeepSeek),
            _ => None,
        }
    }

    fn default_endpoint(self) -> &'static str {
        match self {
            Provider::LibreTranslate => "http://localhost:5000/translate",
            Provider::OpenAi => "https://api.openai.com/v1/chat/completions",
            Provider::DeepSeek => "https://api.deepseek.com/v1/chat/completions",
        }
    }

    fn needs_api_key(self) -> bool {
        !matches!(self, Provider::LibreTranslate)
    }
}

pub struct HttpTranslator {
    client: Client,
    provider: Provider,
    endpoint: String,
    model: String,
    api_key: Option<String>,
    max_retries: usize,
    /// Set once every attempt of a call failed before any response arrived.
    /// Later calls fail immediately instead of waiting out the retries again.
    unreachable: OnceLock<String>,
}

impl HttpTranslator {
    /// The API key is read from the environment variable named in the settings.
    pub fn from_settings(settings: &TranslationSettings) -> Result<Self, PlaqueError> {
        let api_key = std::env::var(&settings.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty());
        Self::new(settings, api_key)
    }

    pub fn new(settings: &TranslationSettings, api_key: Option<String>) -> Result<Self, PlaqueError> {
        let provider = Provider::from_name(&settings.provider).ok_or_else(|| {
            PlaqueError::ModelUnavailable(format!(
                "unsupported translation provider: {}",
                settings.provider
            ))
        })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| PlaqueError::ModelUnavailable(e.to_string()))?;

        let endpoint = settings
            .endpoint
            .clone()
            .unwrap_or_else(|| provider.default_endpoint().to_string());

        Ok(Self {
            client,
            provider,
            endpoint,
            model: settings.model.clone(),
            api_key,
            max_retries: settings.max_retries.max(1),
            unreachable: OnceLock::new(),
        })
    }

    fn body(&self, text: &str, source: &str, target: &str) -> Value {
        match self.provider {
            Provider::LibreTranslate => {
                let mut body = json!({
                    "q": text,
                    "source": source,
                    "target": target,
                    "format": "text"
                });
                if let Some(key) = &self.api_key {
                    body["api_key"] = json!(key);
                }
                body
            }
            Provider::OpenAi | Provider::DeepSeek => json!({
                "model": self.model,
                "messages": [
                    { "role": "system", "content": "You are a professional translator of museum wall labels. Reply with the translation only." },
                    { "role": "user", "content": build_prompt(text, source, target) }
                ],
                "temperature": 0.2
            }),
        }
    }

    fn extract(&self, json: &Value) -> Option<String> {
        let text = match self.provider {
            Provider::LibreTranslate => json.get("translatedText").and_then(|t| t.as_str()),
            Provider::OpenAi | Provider::DeepSeek => json
                .get("choices")
                .and_then(|c| c.get(0))
                .and_then(|c| c.get("message"))
                .and_then(|m| m.get("content"))
                .and_then(|c| c.as_str()),
        };
        text.map(|t| t.trim().to_string())
    }
}

impl Translator for HttpTranslator {
    fn translate(&self, text: &str, source: &str, target: &str) -> Result<String, PlaqueError> {
        if text.trim().is_empty() {
            return Ok(String::new());
        }

        if source.eq_ignore_ascii_case(target) {
            return Err(PlaqueError::UnsupportedLanguagePair {
                source_code: source.to_string(),
                target_code: target.to_string(),
                reason: "source and target are the same language".into(),
            });
        }

        if self.provider.needs_api_key() && self.api_key.is_none() {
            return Err(PlaqueError::ModelUnavailable(
                "no API key configured for translation provider".into(),
            ));
        }

        if let Some(reason) = self.unreachable.get() {
            return Err(PlaqueError::ModelUnavailable(format!(
                "translation backend unreachable: {reason}"
            )));
        }

        let body = self.body(text, source, target);
        let mut last_err = String::from("no attempt made");
        let mut got_response = false;

        for attempt in 0..self.max_retries {
            let mut req = self.client.post(&self.endpoint).json(&body);
            if self.provider.needs_api_key() {
                if let Some(key) = &self.api_key {
                    req = req.bearer_auth(key);
                }
            }

            let resp = match req.send() {
                Ok(r) => r,
                Err(err) => {
                    last_err = err.to_string();
                    if attempt + 1 < self.max_retries {
                        thread::sleep(backoff(attempt));
                    }
                    continue;
                }
            };

            got_response = true;
            let status = resp.status();

            // Read as text first so error bodies survive a failed JSON parse
            let raw = match resp.text() {
                Ok(t) => t,
                Err(err) => {
                    last_err = err.to_string();
                    if attempt + 1 < self.max_retries {
                        thread::sleep(backoff(attempt));
                    }
                    continue;
                }
            };

            if !status.is_success() {
                let message = extract_error_message(status, &raw);

                if is_language_rejection(status) {
                    return Err(PlaqueError::UnsupportedLanguagePair {
                        source_code: source.to_string(),
                        target_code: target.to_string(),
                        reason: message,
                    });
                }

                last_err = message;
                if should_retry_http(status) && attempt + 1 < self.max_retries {
                    warn!("translation attempt {} failed: {last_err}", attempt + 1);
                    thread::sleep(backoff(attempt));
                    continue;
                }
                break;
            }

            match serde_json::from_str::<Value>(&raw) {
                Ok(json) => match self.extract(&json) {
                    Some(t) => {
                        debug!("translated {} chars {source}->{target}", text.len());
                        return Ok(t);
                    }
                    None => last_err = "invalid translation response: missing text".into(),
                },
                Err(_) => last_err = "invalid JSON from translation backend".into(),
            }

            if attempt + 1 < self.max_retries {
                thread::sleep(backoff(attempt));
            }
        }

        if !got_response {
            warn!("translation backend unreachable, skipping remaining requests: {last_err}");
            let _ = self.unreachable.set(last_err.clone());
        }

        Err(PlaqueError::ModelUnavailable(last_err))
    }
}

fn backoff(attempt: usize) -> Duration {
    let jitter: u64 = thread_rng().gen_range(0..200);
    let ms = BASE_DELAY_MS * (2_u64.pow(attempt as u32)) + jitter;
    Duration::from_millis(ms)
}

fn should_retry_http(status: StatusCode) -> bool {
    // 408/429/5xx are usually transient
    status == StatusCode::REQUEST_TIMEOUT
        || status == StatusCode::TOO_MANY_REQUESTS
        || status.is_server_error()
}

fn is_language_rejection(status: StatusCode) -> bool {
    status == StatusCode::BAD_REQUEST || status == StatusCode::UNPROCESSABLE_ENTITY
}

fn extract_error_message(status: StatusCode, body_text: &str) -> String {
    // { "error": { "message": "..." } }, { "error": "..." } or { "message": "..." }
    if let Ok(v) = serde_json::from_str::<Value>(body_text) {
        let msg = v
            .get("error")
            .and_then(|e| e.get("message").or(Some(e)))
            .and_then(|m| m.as_str())
            .or_else(|| v.get("message").and_then(|m| m.as_str()));
        if let Some(msg) = msg {
            return format!("HTTP {}: {}", status.as_u16(), msg);
        }
    }

    let trimmed = body_text.trim();
    let snippet: String = if trimmed.chars().count() > 400 {
        format!("{}...", trimmed.chars().take(400).collect::<String>())
    } else {
        trimmed.to_string()
    };

    format!("HTTP {}: {}", status.as_u16(), snippet)
}

fn build_prompt(text: &str, source: &str, target: &str) -> String {
    let mut p = String::new();
    p.push_str(&format!("Translate from {source} to {target}.\n"));
    p.push_str("Text:\n");
    p.push_str(text.trim());
    p
}
