//! Brain event hooks.
//!
//! Implement [`EventHandler`] and register it with
//! [`Brain::with_event_handler`](crate::brain::Brain::with_event_handler) to
//! watch a request move through the pipeline:
//!
//! ```text
//! RequestReceived
//!   ├─ ReflexTriggered                   (fast path, nothing else follows)
//!   └─ RouteSelected
//!        ├─ PersonaResponded / PersonaFailed   (one per persona)
//!        ├─ Synthesized
//!        └─ InteractionRecorded
//! ```
//!
//! `StorageFailed` may appear anywhere after `Synthesized`; bookkeeping
//! failures are reported here and in the log but do not fail the request.
//!
//! ```rust,no_run
//! use async_trait::async_trait;
//! use goodboy::event::{BrainEvent, EventHandler};
//!
//! struct Printer;
//!
//! #[async_trait]
//! impl EventHandler for Printer {
//!     async fn on_brain_event(&self, event: &BrainEvent) {
//!         if let BrainEvent::RouteSelected { mode, personas, .. } = event {
//!             println!("{} -> {:?}", mode, personas);
//!         }
//!     }
//! }
//! ```

use crate::goodboy::router::RoutingMode;
use async_trait::async_trait;

#[derive(Clone, Debug, PartialEq)]
pub enum BrainEvent {
    RequestReceived {
        message_chars: usize,
        requested_mode: Option<RoutingMode>,
    },
    ReflexTriggered {
        reflex: String,
    },
    RouteSelected {
        mode: RoutingMode,
        personas: Vec<String>,
        rationale: String,
    },
    PersonaResponded {
        persona: String,
        response_length: usize,
    },
    PersonaFailed {
        persona: String,
        error: String,
    },
    Synthesized {
        used_fallback: bool,
        response_length: usize,
    },
    InteractionRecorded {
        confidence: f32,
        success: bool,
    },
    StorageFailed {
        store: String,
        error: String,
    },
}

/// Receives [`BrainEvent`]s. The default implementation ignores them.
#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn on_brain_event(&self, _event: &BrainEvent) {}
}
