//! Remote content moderation over HTTP.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::service::ContentModerator;

const API_KEY_HEADER: &str = "x-functions-key";

#[derive(Debug, Serialize)]
struct DetectRequest<'a> {
    contents: Vec<DetectContent<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DetectContent<'a> {
    id: String,
    raw_text: &'a str,
}

#[derive(Debug, Deserialize)]
struct DetectResponse {
    #[serde(default)]
    positive: bool,
}

/// Moderator backed by a remote `detect` API.
///
/// Sends `POST {endpoint}/api/{provider}/detect` with a JSON body
/// `{"contents":[{"id":"0","rawText":"..."}]}` and reads the boolean
/// `positive` field of the answer. Any failure counts as "not spam".
pub struct HttpModerator {
    client: Client,
    detect_url: String,
    api_key: Option<String>,
    timeout: Duration,
}

impl HttpModerator {
    pub fn new(
        client: Client,
        endpoint: &str,
        provider: &str,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Self {
        let detect_url = format!("{}/api/{}/detect", endpoint.trim_end_matches('/'), provider);
        Self {
            client,
            detect_url,
            api_key,
            timeout,
        }
    }

    async fn detect(&self, texts: &[String]) -> reqwest::Result<bool> {
        let request = DetectRequest {
            contents: texts
                .iter()
                .enumerate()
                .map(|(i, text)| DetectContent {
                    id: i.to_string(),
                    raw_text: text,
                })
                .collect(),
        };

        let mut builder = self
            .client
            .post(&self.detect_url)
            .timeout(self.timeout)
            .json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.header(API_KEY_HEADER, key);
        }

        let response: DetectResponse = builder.send().await?.error_for_status()?.json().await?;
        Ok(response.positive)
    }
}

#[async_trait]
impl ContentModerator for HttpModerator {
    async fn is_spam(&self, texts: &[String]) -> bool {
        if texts.is_empty() {
            return false;
        }

        match self.detect(texts).await {
            Ok(positive) => positive,
            Err(e) => {
                tracing::warn!("Moderation request failed, treating content as clean: {}", e);
                false
            }
        }
    }

    fn name(&self) -> &'static str {
        "remote"
    }
}
