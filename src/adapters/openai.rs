use crate::config::toml_config::ClassifierConfig;
use crate::core::{Result, SentimentClassifier};
use crate::utils::error::EtlError;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// OpenAI Responses API (`POST /v1/responses`).
pub struct OpenAiClassifier {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
}

#[derive(Debug, Serialize)]
struct ResponsesRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Debug, Deserialize)]
struct ResponsesPayload {
    #[serde(default)]
    output: Vec<OutputItem>,
}

#[derive(Debug, Deserialize)]
struct OutputItem {
    #[serde(default)]
    content: Vec<ContentPart>,
}

#[derive(Debug, Deserialize)]
struct ContentPart {
    text: Option<String>,
}

impl OpenAiClassifier {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            model: model.into(),
        })
    }

    pub fn from_config(config: &ClassifierConfig) -> Result<Self> {
        Self::new(
            config.endpoint.clone(),
            config.api_key.clone().unwrap_or_default(),
            config.model.clone(),
            Duration::from_secs(config.timeout_seconds),
        )
    }
}

#[async_trait]
impl SentimentClassifier for OpenAiClassifier {
    async fn classify(&self, prompt: &str) -> Result<String> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&ResponsesRequest {
                model: &self.model,
                input: prompt,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EtlError::ClassifierError {
                message: format!("HTTP {}: {}", status.as_u16(), body),
            });
        }

        let payload: ResponsesPayload = response.json().await?;

        // 只取第一個 output 的第一段文字
        payload
            .output
            .into_iter()
            .next()
            .and_then(|item| item.content.into_iter().next())
            .and_then(|part| part.text)
            .ok_or_else(|| EtlError::ClassifierError {
                message: "response contained no output text".to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn classifier(server: &MockServer) -> OpenAiClassifier {
        OpenAiClassifier::new(
            server.url("/v1/responses"),
            "sk-test",
            "gpt-4.1-mini",
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_classify_returns_first_output_text() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(POST)
                .path("/v1/responses")
                .header("authorization", "Bearer sk-test")
                .json_body(serde_json::json!({
                    "model": "gpt-4.1-mini",
                    "input": "Texto: hola"
                }));
            then.status(200).json_body(serde_json::json!({
                "id": "resp_1",
                "object": "response",
                "output": [
                    {
                        "type": "message",
                        "role": "assistant",
                        "content": [
                            {"type": "output_text", "text": " positivo\n", "annotations": []}
                        ]
                    }
                ]
            }));
        });

        let text = classifier(&server).classify("Texto: hola").await.unwrap();

        api_mock.assert();
        assert_eq!(text, " positivo\n");
    }

    #[tokio::test]
    async fn test_quota_error_is_reported() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/v1/responses");
            then.status(429)
                .json_body(serde_json::json!({"error": {"message": "quota exceeded"}}));
        });

        let result = classifier(&server).classify("Texto: hola").await;

        assert!(matches!(result, Err(EtlError::ClassifierError { .. })));
    }

    #[tokio::test]
    async fn test_empty_output_is_malformed() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/v1/responses");
            then.status(200).json_body(serde_json::json!({"output": []}));
        });

        let result = classifier(&server).classify("Texto: hola").await;

        assert!(matches!(result, Err(EtlError::ClassifierError { .. })));
    }
}
