//! Local backend: a GGUF model served by a llama.cpp-compatible server.
//!
//! The model file has to be present under `model_path` before any request is
//! attempted; a missing model is reported as `BackendUnavailable` without
//! touching the network. Completions use the server's `POST /completion`
//! endpoint.

use crate::goodboy::client_wrapper::{store_usage, ClientWrapper, TokenUsage};
use crate::goodboy::clients::common::post_json;
use crate::goodboy::error::GoodBoyError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

#[derive(Serialize)]
struct CompletionRequest<'a> {
    prompt: &'a str,
    n_predict: usize,
    temperature: f32,
    stop: [&'a str; 1],
}

#[derive(Deserialize)]
struct CompletionResponse {
    content: String,
    #[serde(default)]
    tokens_evaluated: usize,
    #[serde(default)]
    tokens_predicted: usize,
}

/// Find the GGUF model to use.
///
/// `model_path` may name a `.gguf` file directly or a directory, in which
/// case the alphabetically first `.gguf` file inside it is chosen. When
/// neither works, `./models` is searched the same way.
pub fn locate_model(model_path: &Path) -> Option<PathBuf> {
    if model_path.is_file() && is_gguf(model_path) {
        return Some(model_path.to_path_buf());
    }
    if model_path.is_dir() {
        if let Some(found) = first_gguf_in(model_path) {
            return Some(found);
        }
    }
    let fallback = Path::new("models");
    if fallback != model_path && fallback.is_dir() {
        return first_gguf_in(fallback);
    }
    None
}

fn is_gguf(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("gguf"))
        .unwrap_or(false)
}

fn first_gguf_in(dir: &Path) -> Option<PathBuf> {
    let mut candidates: Vec<PathBuf> = fs::read_dir(dir)
        .ok()?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && is_gguf(p))
        .collect();
    candidates.sort();
    candidates.into_iter().next()
}

/// Client for a llama.cpp server hosting a local GGUF model.
pub struct LocalClient {
    base_url: String,
    model_path: PathBuf,
    model_label: String,
    timeout: Duration,
    token_usage: Mutex<Option<TokenUsage>>,
}

impl LocalClient {
    pub fn new(base_url: &str, model_path: impl Into<PathBuf>) -> Self {
        let model_path = model_path.into();
        let model_label = locate_model(&model_path)
            .and_then(|p| p.file_stem().map(|s| s.to_string_lossy().into_owned()))
            .unwrap_or_else(|| "local-gguf".to_string());
        LocalClient {
            base_url: base_url.to_string(),
            model_path,
            model_label,
            timeout: Duration::from_secs(120),
            token_usage: Mutex::new(None),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl ClientWrapper for LocalClient {
    fn model_name(&self) -> &str {
        &self.model_label
    }

    async fn generate(
        &self,
        prompt: &str,
        max_tokens: usize,
        temperature: f32,
    ) -> Result<String, GoodBoyError> {
        if locate_model(&self.model_path).is_none() {
            return Err(GoodBoyError::BackendUnavailable(format!(
                "no GGUF model found under {}",
                self.model_path.display()
            )));
        }

        let request = CompletionRequest {
            prompt,
            n_predict: max_tokens,
            temperature,
            stop: ["\nUser:"],
        };
        let response: CompletionResponse =
            post_json(&self.base_url, "/completion", &request, None, self.timeout).await?;

        store_usage(
            &self.token_usage,
            TokenUsage {
                input_tokens: response.tokens_evaluated,
                output_tokens: response.tokens_predicted,
                total_tokens: response.tokens_evaluated + response.tokens_predicted,
            },
        );
        Ok(response.content.trim().to_string())
    }

    fn usage_slot(&self) -> Option<&Mutex<Option<TokenUsage>>> {
        Some(&self.token_usage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locates_first_gguf_in_directory() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("notes.txt"), "x").unwrap();
        fs::write(dir.path().join("b-model.gguf"), "x").unwrap();
        fs::write(dir.path().join("a-model.GGUF"), "x").unwrap();
        let found = locate_model(dir.path()).unwrap();
        assert_eq!(found.file_name().unwrap(), "a-model.GGUF");
    }

    #[test]
    fn accepts_direct_model_file() {
        let dir = tempfile::tempdir().unwrap();
        let model = dir.path().join("tiny.gguf");
        fs::write(&model, "x").unwrap();
        assert_eq!(locate_model(&model), Some(model));
    }

    #[tokio::test]
    async fn missing_model_fails_before_any_request() {
        let dir = tempfile::tempdir().unwrap();
        let client = LocalClient::new("http://127.0.0.1:9", dir.path().join("nothing-here"));
        let err = client.generate("hi", 8, 0.5).await.unwrap_err();
        assert!(err.to_string().contains("no GGUF model"));
    }
}
