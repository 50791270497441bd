use async_trait::async_trait;
use chrono::Utc;
use goodboy::client_wrapper::ClientWrapper;
use goodboy::persona::Proposal;
use goodboy::synthesizer::{
    Synthesizer, EMPTY_PROPOSALS_REPLY, FALLBACK_LEAD_IN, SYNTHESIS_MAX_TOKENS,
    SYNTHESIS_SYSTEM_PROMPT, SYNTHESIS_TEMPERATURE,
};
use goodboy::GoodBoyError;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

struct MockClient {
    response: String,
    calls: AtomicUsize,
    prompts: Mutex<Vec<(String, usize, f32)>>,
}

impl MockClient {
    fn new(response: &str) -> Self {
        MockClient {
            response: response.to_string(),
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl ClientWrapper for MockClient {
    fn model_name(&self) -> &str {
        "mock"
    }

    async fn generate(
        &self,
        prompt: &str,
        max_tokens: usize,
        temperature: f32,
    ) -> Result<String, GoodBoyError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts
            .lock()
            .unwrap()
            .push((prompt.to_string(), max_tokens, temperature));
        Ok(self.response.clone())
    }
}

struct OfflineClient;

#[async_trait]
impl ClientWrapper for OfflineClient {
    fn model_name(&self) -> &str {
        "offline"
    }

    async fn generate(
        &self,
        _prompt: &str,
        _max_tokens: usize,
        _temperature: f32,
    ) -> Result<String, GoodBoyError> {
        Err(GoodBoyError::BackendUnavailable("connection refused".to_string()))
    }
}

struct SlowClient;

#[async_trait]
impl ClientWrapper for SlowClient {
    fn model_name(&self) -> &str {
        "slow"
    }

    async fn generate(
        &self,
        _prompt: &str,
        _max_tokens: usize,
        _temperature: f32,
    ) -> Result<String, GoodBoyError> {
        tokio::time::sleep(Duration::from_secs(5)).await;
        Ok("too late".to_string())
    }
}

fn proposal(persona: &str, content: &str) -> Proposal {
    Proposal {
        persona: persona.to_string(),
        content: content.to_string(),
        confidence: Some(0.7),
        timestamp: Utc::now(),
    }
}

#[tokio::test]
async fn test_empty_proposals_skip_the_backend() {
    let client = Arc::new(MockClient::new("unused"));
    let synth = Synthesizer::new(client.clone());
    let result = synth.synthesize("hello", &[], &[]).await;
    assert_eq!(result.text, EMPTY_PROPOSALS_REPLY);
    assert!(!result.used_fallback);
    assert_eq!(client.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_single_call_with_labeled_proposals_and_lessons() {
    let client = Arc::new(MockClient::new("  I'll book Tuesday at 10 and send the invite.  "));
    let synth = Synthesizer::new(client.clone());
    let result = synth
        .synthesize(
            "set up a meeting",
            &[
                proposal("Alfred", "Tuesday 10am works"),
                proposal("Jarvis", "Calendar is free"),
            ],
            &["Always include an agenda".to_string()],
        )
        .await;

    assert_eq!(result.text, "I'll book Tuesday at 10 and send the invite.");
    assert!(!result.used_fallback);

    let prompts = client.prompts.lock().unwrap();
    assert_eq!(prompts.len(), 1);
    let (prompt, max_tokens, temperature) = &prompts[0];
    assert!(prompt.starts_with(SYNTHESIS_SYSTEM_PROMPT));
    assert!(prompt.contains("**Alfred**: Tuesday 10am works"));
    assert!(prompt.contains("**Jarvis**: Calendar is free"));
    assert!(prompt.contains("Relevant Learnings:\n- Always include an agenda"));
    assert!(prompt.ends_with("User: set up a meeting\nAssistant:"));
    assert_eq!(*max_tokens, SYNTHESIS_MAX_TOKENS);
    assert_eq!(*temperature, SYNTHESIS_TEMPERATURE);
}

#[tokio::test]
async fn test_backend_failure_uses_fallback() {
    let synth = Synthesizer::new(Arc::new(OfflineClient));
    let long = "a".repeat(300);
    let result = synth
        .synthesize("q", &[proposal("Analyst", &long), proposal("Jarvis", "short answer")], &[])
        .await;

    assert!(result.used_fallback);
    assert!(result.text.starts_with(FALLBACK_LEAD_IN));
    assert!(result.text.contains(&format!("- {}", "a".repeat(200))));
    assert!(!result.text.contains(&"a".repeat(201)));
    assert!(result.text.ends_with("- short answer"));
}

#[tokio::test]
async fn test_blank_backend_reply_uses_fallback() {
    let synth = Synthesizer::new(Arc::new(MockClient::new("   ")));
    let result = synth.synthesize("q", &[proposal("Jarvis", "fine")], &[]).await;
    assert!(result.used_fallback);
    assert!(!result.text.trim().is_empty());
}

#[tokio::test]
async fn test_deadline_counts_as_backend_failure() {
    let synth = Synthesizer::new(Arc::new(SlowClient)).with_deadline(Duration::from_millis(50));
    let result = synth.synthesize("q", &[proposal("Jarvis", "partial")], &[]).await;
    assert!(result.used_fallback);
    assert!(result.text.contains("- partial"));
}
