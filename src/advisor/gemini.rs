//! Gemini `generateContent` transport over blocking HTTP.

use std::time::Duration;

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{AdvisorError, AdvisorTransport};

const API_KEY_HEADER: &str = "x-goog-api-key";

pub struct GeminiTransport {
    client: Client,
    endpoint: String,
    api_key: String,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
}

#[derive(Serialize)]
struct Content<'a> {
    parts: [Part<'a>; 1],
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Default, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Default, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Default, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Default, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

impl GenerateResponse {
    /// Concatenated text of the first candidate.
    fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|candidate| candidate.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|part| part.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }
}

impl GeminiTransport {
    /// `timeout` of `None` waits indefinitely.
    pub fn new(
        api_key: impl Into<String>,
        endpoint: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, AdvisorError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AdvisorError::Transport(format!("failed to create HTTP client: {e}")))?;
        Ok(Self {
            client,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    fn url(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, model)
    }
}

impl AdvisorTransport for GeminiTransport {
    fn generate(&self, model: &str, prompt: &str) -> Result<String, AdvisorError> {
        let body = GenerateRequest {
            contents: [Content {
                parts: [Part { text: prompt }],
            }],
        };
        let url = self.url(model);
        debug!(%url, prompt_bytes = prompt.len(), "sending advisor request");

        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&body)
            .send()
            .map_err(|e| AdvisorError::Transport(format!("HTTP request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(AdvisorError::Transport(format!(
                "advisor service returned {}",
                response.status()
            )));
        }

        let payload: GenerateResponse = response
            .json()
            .map_err(|e| AdvisorError::Transport(format!("malformed advisor response: {e}")))?;
        Ok(payload.text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_body_matches_wire_shape() {
        let body = GenerateRequest {
            contents: [Content {
                parts: [Part { text: "hi" }],
            }],
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({"contents": [{"parts": [{"text": "hi"}]}]})
        );
    }

    #[test]
    fn response_text_joins_first_candidate_parts() {
        let payload: GenerateResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[{"text":"Spend "},{"text":"less."}]}},
                {"content":{"parts":[{"text":"ignored"}]}}]}"#,
        )
        .unwrap();
        assert_eq!(payload.text(), "Spend less.");

        let empty: GenerateResponse = serde_json::from_str(r#"{"candidates":[]}"#).unwrap();
        assert_eq!(empty.text(), "");
    }

    #[test]
    fn url_includes_model_and_trims_slash() {
        let transport = GeminiTransport::new("k", "https://example.test/v1beta/", None).unwrap();
        assert_eq!(
            transport.url("gemini-2.5-flash"),
            "https://example.test/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }
}
