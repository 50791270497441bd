use crate::goodboy::error::GoodBoyError;
use async_trait::async_trait;
use std::sync::Mutex;
use std::time::Duration;

/// A ClientWrapper is the text-generation backend GoodBoy talks to.
/// It turns a fully assembled prompt into a completion and nothing more:
/// it keeps no conversation state, no personas and no retries. Personas and
/// the synthesizer build prompts and hand them to a shared ClientWrapper.
// src/goodboy/client_wrapper

/// How many tokens were spent on prompt vs. completion.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TokenUsage {
    pub input_tokens: usize,
    pub output_tokens: usize,
    pub total_tokens: usize,
}

/// Trait defining the interface to a local or cloud text generator.
#[async_trait]
pub trait ClientWrapper: Send + Sync {
    /// Short identifier of the model behind this client, used in logs.
    fn model_name(&self) -> &str;

    /// Produce a completion for `prompt`.
    /// Must fail with [`GoodBoyError::BackendUnavailable`] when no model or
    /// endpoint can serve the request.
    async fn generate(
        &self,
        prompt: &str,
        max_tokens: usize,
        temperature: f32,
    ) -> Result<String, GoodBoyError>;

    /// Generate with a system prompt and optional context block.
    /// The default implementation assembles the prompt with [`build_prompt`]
    /// and delegates to [`generate`](ClientWrapper::generate).
    async fn generate_with_system(
        &self,
        system_prompt: &str,
        user_message: &str,
        context: Option<&str>,
        max_tokens: usize,
        temperature: f32,
    ) -> Result<String, GoodBoyError> {
        let prompt = build_prompt(system_prompt, user_message, context);
        self.generate(&prompt, max_tokens, temperature).await
    }

    /// Hook to retrieve usage from the *last* generate() call.
    fn get_last_usage(&self) -> Option<TokenUsage> {
        self.usage_slot()
            .and_then(|slot| slot.lock().ok().and_then(|u| u.clone()))
    }

    /// Clients that report token usage return their slot here.
    fn usage_slot(&self) -> Option<&Mutex<Option<TokenUsage>>> {
        None
    }
}

/// System prompt, then an optional `Context:` block, then the user turn and
/// an `Assistant:` cue.
pub fn build_prompt(system_prompt: &str, user_message: &str, context: Option<&str>) -> String {
    let mut prompt = String::with_capacity(
        system_prompt.len() + user_message.len() + context.map_or(0, str::len) + 32,
    );
    prompt.push_str(system_prompt);
    if let Some(ctx) = context.filter(|c| !c.trim().is_empty()) {
        prompt.push_str("\n\nContext:\n");
        prompt.push_str(ctx);
    }
    prompt.push_str("\n\nUser: ");
    prompt.push_str(user_message);
    prompt.push_str("\nAssistant:");
    prompt
}

/// Run `generate_with_system` under a deadline. An elapsed deadline is
/// reported as `BackendUnavailable` like any other unreachable backend.
pub async fn generate_with_deadline(
    client: &dyn ClientWrapper,
    system_prompt: &str,
    user_message: &str,
    context: Option<&str>,
    max_tokens: usize,
    temperature: f32,
    deadline: Duration,
) -> Result<String, GoodBoyError> {
    match tokio::time::timeout(
        deadline,
        client.generate_with_system(system_prompt, user_message, context, max_tokens, temperature),
    )
    .await
    {
        Ok(result) => result,
        Err(_) => Err(GoodBoyError::BackendUnavailable(format!(
            "{} did not answer within {:?}",
            client.model_name(),
            deadline
        ))),
    }
}

/// Record usage in a client's slot, ignoring a poisoned lock.
pub(crate) fn store_usage(slot: &Mutex<Option<TokenUsage>>, usage: TokenUsage) {
    if let Ok(mut guard) = slot.lock() {
        *guard = Some(usage);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_includes_context_block_only_when_present() {
        let with_ctx = build_prompt("Be brief.", "hello", Some("Current time: noon"));
        assert_eq!(
            with_ctx,
            "Be brief.\n\nContext:\nCurrent time: noon\n\nUser: hello\nAssistant:"
        );

        let without = build_prompt("Be brief.", "hello", None);
        assert_eq!(without, "Be brief.\n\nUser: hello\nAssistant:");

        let blank = build_prompt("Be brief.", "hello", Some("   "));
        assert_eq!(blank, without);
    }
}
