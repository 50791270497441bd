//! # GoodBoy
//!
//! GoodBoy is the core of a personal assistant that answers every message with a small
//! council of personas instead of a single prompt. The crate provides:
//!
//! * **Personas**: six data-driven council members ([`persona::PersonaRegistry`]) that each
//!   add their own keyword hints and system prompt before calling the model
//! * **Routing**: [`Router`] picks the personas for a request in `auto`, `reflex`, `council`
//!   or `strategic` mode, and accepts routing hints learned from past exchanges
//! * **Synthesis**: [`synthesizer::Synthesizer`] merges the proposals (and any lessons the
//!   user taught) into one first-person reply, with a deterministic fallback when the model
//!   is unreachable
//! * **Memory and learning**: flat JSON/JSONL stores for lessons, conversation turns,
//!   learned routing patterns, evolution metrics, mini-bots, queued actions and an audit trail
//! * **Backends**: a [`ClientWrapper`] trait with a local (llama.cpp server + GGUF) and a
//!   cloud (OpenAI-compatible) implementation
//!
//! Everything is wired together by the [`Brain`].
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use goodboy::{Brain, ChatRequest, GoodBoyConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//!     let config = GoodBoyConfig::load(goodboy::config::DEFAULT_CONFIG_PATH)?;
//!     goodboy::init_logger_with_default(&config.log_level);
//!
//!     let brain = Brain::open(config)?;
//!     let reply = brain.chat(ChatRequest::new("Help me plan a product launch")).await?;
//!     println!("{}", reply.output);
//!     let meta = &reply.route_metadata;
//!     println!("mode: {}, personas: {:?}", meta.mode, meta.agents);
//!     Ok(())
//! }
//! ```
//!
//! ## Teaching
//!
//! Lessons are stored once and surface whenever a later message mentions their topic, one of
//! their tags or words from the instruction:
//!
//! ```rust,no_run
//! use goodboy::api::TeachRequest;
//! use goodboy::Brain;
//!
//! # async fn teach(brain: &Brain) -> Result<(), goodboy::GoodBoyError> {
//! let added = brain
//!     .teach(TeachRequest {
//!         topic: "deploys".into(),
//!         instruction: "always run tests first".into(),
//!         tags: Some(vec!["ci".into()]),
//!     })
//!     .await?;
//! println!("stored lesson {}", added.lesson_id);
//! # Ok(())
//! # }
//! ```
//!
//! ## Custom backends
//!
//! Anything that can turn a prompt into text can drive the council:
//!
//! ```rust
//! use async_trait::async_trait;
//! use goodboy::{ClientWrapper, GoodBoyError};
//!
//! struct Echo;
//!
//! #[async_trait]
//! impl ClientWrapper for Echo {
//!     fn model_name(&self) -> &str {
//!         "echo"
//!     }
//!
//!     async fn generate(&self, prompt: &str, _max_tokens: usize, _temperature: f32)
//!         -> Result<String, GoodBoyError> {
//!         Ok(prompt.lines().last().unwrap_or_default().to_string())
//!     }
//! }
//! ```

use std::sync::Once;

static INIT_LOGGER: Once = Once::new();

/// Initialise the global [`env_logger`] subscriber exactly once, driven by `RUST_LOG`.
///
/// ```rust
/// goodboy::init_logger();
/// log::info!("Logger is ready");
/// ```
pub fn init_logger() {
    INIT_LOGGER.call_once(|| {
        let _ = env_logger::try_init();
    });
}

/// Like [`init_logger`], but falls back to `default_level` when `RUST_LOG` is unset.
pub fn init_logger_with_default(default_level: &str) {
    INIT_LOGGER.call_once(|| {
        let env = env_logger::Env::default().default_filter_or(default_level);
        let _ = env_logger::Builder::from_env(env).try_init();
    });
}

// Import the top-level `goodboy` module.
pub mod goodboy;

// Re-exporting key items for easier external access.
pub use goodboy::action_queue;
pub use goodboy::analysis;
pub use goodboy::api;
pub use goodboy::api::{ChatRequest, ChatResponse};
pub use goodboy::brain;
pub use goodboy::brain::Brain;
pub use goodboy::client_wrapper;
pub use goodboy::client_wrapper::{ClientWrapper, TokenUsage};
pub use goodboy::clients;
pub use goodboy::config;
pub use goodboy::config::GoodBoyConfig;
pub use goodboy::documents;
pub use goodboy::error::GoodBoyError;
pub use goodboy::event;
pub use goodboy::evolution;
pub use goodboy::learning;
pub use goodboy::lessons;
pub use goodboy::memory;
pub use goodboy::minibots;
pub use goodboy::persona;
pub use goodboy::reflex;
pub use goodboy::router;
pub use goodboy::router::{Router, RoutingMode};
pub use goodboy::safety;
pub use goodboy::self_model;
pub use goodboy::synthesizer;
