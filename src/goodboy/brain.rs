//! The orchestrator.
//!
//! A [`Brain`] owns the backend, the persona registry, the router, the
//! synthesizer and every store, and runs one request through:
//!
//! 1. **Perceive**: validate the request.
//! 2. **Reflex**: very short greetings, thanks and goodbyes get a canned reply.
//! 3. **Analyze**: query type, complexity, user emotion, suggested mode.
//! 4. **Retrieve**: memory context, learned routing hint, relevant lessons.
//! 5. **Route + consult**: the chosen personas answer concurrently.
//! 6. **Synthesize** the proposals into one reply.
//! 7. **Score** the reply; `confidence > 0.6` counts as success.
//! 8. **Record** ledger, patterns, lesson feedback, self-model, actions, audit.
//! 9. **Persist** the exchange to conversation memory and return it.
//!
//! Store access is serialized behind one async mutex that is never held
//! across a backend call. Bookkeeping failures after the reply exists are
//! logged and reported as [`BrainEvent::StorageFailed`] rather than failing
//! the request; direct store operations such as [`Brain::teach`] propagate
//! their errors.
//!
//! # Example
//!
//! ```rust,no_run
//! use goodboy::{Brain, ChatRequest, GoodBoyConfig, RoutingMode};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//!     goodboy::init_logger();
//!     let mut config = GoodBoyConfig::load("data/goodboy_config.json")?;
//!     config.apply_env_overrides();
//!
//!     let brain = Brain::open(config)?;
//!     let reply = brain
//!         .chat(
//!             ChatRequest::new("Schedule a meeting and email the team")
//!                 .with_mode(RoutingMode::Auto),
//!         )
//!         .await?;
//!     println!("{}", reply.output);
//!     for step in &reply.agent_trace {
//!         println!("  {}: {}", step.agent, step.proposal);
//!     }
//!     Ok(())
//! }
//! ```

use crate::goodboy::action_queue::{suggest_actions, ActionQueue, QueuedAction, SuggestedAction};
use crate::goodboy::analysis::{
    analyze_query, is_success, score_confidence, EmotionalTone, QueryAnalysis, QueryType,
    UserEmotion,
};
use crate::goodboy::api::{
    AgentTrace, ChatRequest, ChatResponse, RouteMetadata, TeachRequest, TeachResponse,
};
use crate::goodboy::client_wrapper::ClientWrapper;
use crate::goodboy::clients::client_from_config;
use crate::goodboy::config::GoodBoyConfig;
use crate::goodboy::documents::{chunk_text, DocumentExtractor};
use crate::goodboy::error::GoodBoyError;
use crate::goodboy::event::{BrainEvent, EventHandler};
use crate::goodboy::evolution::{
    EvolutionLedger, EvolutionStatus, GenerationInfo, OverseerSuggestion, ProcessedAction,
};
use crate::goodboy::learning::{extract_keywords, LearningEngine};
use crate::goodboy::lessons::{Lesson, LessonStore};
use crate::goodboy::memory::{ConversationMemory, MemoryContext, MemorySearchHit};
use crate::goodboy::minibots::{MiniBot, MiniBotNursery};
use crate::goodboy::persona::{
    truncate_chars, PersonaContext, PersonaRegistry, Proposal, DEFAULT_PERSONA, ERROR_MARKER,
};
use crate::goodboy::reflex::{InstinctLayer, ReflexHit};
use crate::goodboy::router::{Router, RoutingDecision, RoutingMode};
use crate::goodboy::safety::{AuditLog, SafetyPolicy};
use crate::goodboy::self_model::SelfModel;
use crate::goodboy::synthesizer::Synthesizer;
use futures_util::future::join_all;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;

/// Memory turns shown to personas.
const CONTEXT_WINDOW: usize = 5;
/// Lessons handed to the synthesizer.
const LESSON_LIMIT: usize = 3;
/// Recurrences of one persona combination before a mini-bot is hatched.
const MINIBOT_SPAWN_FREQUENCY: usize = 5;
/// Characters of a lesson chunk stored per lesson on ingestion.
const INGEST_CHUNK_CHARS: usize = 1000;

/// Every persistent store a [`Brain`] writes to.
pub struct BrainStores {
    pub lessons: LessonStore,
    pub memory: ConversationMemory,
    pub ledger: EvolutionLedger,
    pub learning: LearningEngine,
    pub minibots: MiniBotNursery,
    pub actions: ActionQueue,
    pub audit: AuditLog,
    pub self_model: SelfModel,
}

impl BrainStores {
    /// Open every store under `config.data_dir` and `config.memory_dir`.
    pub fn open(config: &GoodBoyConfig, personas: &PersonaRegistry) -> Result<Self, GoodBoyError> {
        let data: &Path = &config.data_dir;
        let memory: &Path = &config.memory_dir;
        Ok(BrainStores {
            lessons: LessonStore::open(data)?,
            memory: ConversationMemory::open(memory)?,
            ledger: EvolutionLedger::open(memory, &personas.names())?,
            learning: LearningEngine::open(memory)?,
            minibots: MiniBotNursery::open(memory)?,
            actions: ActionQueue::open(data),
            audit: AuditLog::open(data),
            self_model: SelfModel::open(data)?,
        })
    }
}

/// What a maintenance pass did.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct MaintenanceReport {
    pub removed_turns: usize,
    pub suggestions: Vec<OverseerSuggestion>,
}

pub struct Brain {
    config: GoodBoyConfig,
    client: Arc<dyn ClientWrapper>,
    personas: PersonaRegistry,
    router: Router,
    synthesizer: Synthesizer,
    safety: SafetyPolicy,
    instinct: Mutex<InstinctLayer>,
    stores: Mutex<BrainStores>,
    event_handler: Option<Arc<dyn EventHandler>>,
}

/// Everything gathered under the store lock before consulting personas.
struct Retrieved {
    persona_ctx: PersonaContext,
    hint: Option<Vec<String>>,
    lessons: Vec<Lesson>,
    introspection: Option<String>,
}

impl Brain {
    /// Assemble a brain from an explicit backend and stores.
    pub fn new(config: GoodBoyConfig, client: Arc<dyn ClientWrapper>, stores: BrainStores) -> Self {
        let personas = PersonaRegistry::council();
        let router = Router::new(&personas);
        let synthesizer =
            Synthesizer::new(Arc::clone(&client)).with_deadline(config.request_timeout());
        let safety = SafetyPolicy::new(config.safety_mode, config.allowed_tools.clone());
        Brain {
            config,
            client,
            personas,
            router,
            synthesizer,
            safety,
            instinct: Mutex::new(InstinctLayer::default()),
            stores: Mutex::new(stores),
            event_handler: None,
        }
    }

    /// Build the backend named by `config.engine` and open the stores.
    pub fn open(config: GoodBoyConfig) -> Result<Self, GoodBoyError> {
        let client = client_from_config(&config);
        Brain::with_client(config, client)
    }

    /// Open the stores for `config` but use `client` as the backend.
    pub fn with_client(
        config: GoodBoyConfig,
        client: Arc<dyn ClientWrapper>,
    ) -> Result<Self, GoodBoyError> {
        let stores = BrainStores::open(&config, &PersonaRegistry::council())?;
        Ok(Brain::new(config, client, stores))
    }

    pub fn with_event_handler(mut self, handler: Arc<dyn EventHandler>) -> Self {
        self.event_handler = Some(handler);
        self
    }

    pub fn config(&self) -> &GoodBoyConfig {
        &self.config
    }

    pub fn personas(&self) -> &PersonaRegistry {
        &self.personas
    }

    async fn emit(&self, event: BrainEvent) {
        if let Some(handler) = &self.event_handler {
            handler.on_brain_event(&event).await;
        }
    }

    /// Answer one chat request.
    ///
    /// Only validation errors are returned; backend trouble shows up in the
    /// reply text and storage trouble in the log.
    pub async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, GoodBoyError> {
        request.validate()?;
        let started = Instant::now();
        let message = request.message.trim().to_string();

        self.emit(BrainEvent::RequestReceived {
            message_chars: message.chars().count(),
            requested_mode: request.mode,
        })
        .await;

        if matches!(request.mode, None | Some(RoutingMode::Reflex)) {
            let hit = self.instinct.lock().await.check(&message);
            if let Some(hit) = hit {
                return Ok(self.reflex_reply(&message, hit, started).await);
            }
        }

        let analysis = analyze_query(&message);
        let mode = request.mode.unwrap_or(analysis.suggested_mode);
        let retrieved = self.retrieve(&message, mode, &analysis).await;

        let decision = self.router.route(&message, mode, retrieved.hint.as_deref());
        self.emit(BrainEvent::RouteSelected {
            mode: decision.mode,
            personas: decision.personas.clone(),
            rationale: decision.rationale.clone(),
        })
        .await;

        let proposals = self
            .consult(&decision.personas, &message, &retrieved.persona_ctx)
            .await;

        let learnings: Vec<String> = retrieved
            .lessons
            .iter()
            .map(|l| l.instruction.clone())
            .collect();
        let synthesis = self
            .synthesizer
            .synthesize(&message, &proposals, &learnings)
            .await;
        self.emit(BrainEvent::Synthesized {
            used_fallback: synthesis.used_fallback,
            response_length: synthesis.text.len(),
        })
        .await;

        let tone = analysis.emotional_tone();
        let output = apply_personality(
            synthesis.text,
            &message,
            &analysis,
            retrieved.introspection.as_deref(),
        );
        let confidence = score_confidence(&message, &output);
        let success = is_success(confidence);

        let actions: Vec<SuggestedAction> = suggest_actions(&message)
            .into_iter()
            .filter(|a| match &a.tool_name {
                Some(tool) if !self.safety.can_execute(tool) => {
                    log::info!(
                        "goodboy::brain: dropping '{}' under {} mode",
                        tool,
                        self.safety.mode()
                    );
                    false
                }
                _ => true,
            })
            .collect();

        self.record(
            &message,
            &output,
            &decision,
            &retrieved.lessons,
            &analysis,
            tone,
            confidence,
            &actions,
        )
        .await;
        self.emit(BrainEvent::InteractionRecorded { confidence, success })
            .await;

        Ok(ChatResponse {
            output,
            agent_trace: proposals
                .into_iter()
                .map(|p| AgentTrace {
                    agent: p.persona,
                    proposal: p.content,
                    confidence: p.confidence,
                })
                .collect(),
            route_metadata: RouteMetadata {
                mode: decision.mode,
                agents: decision.personas,
                rationale: Some(decision.rationale),
                confidence: Some(confidence),
                emotional_tone: Some(tone.to_string()),
                reasoning_time_ms: Some(started.elapsed().as_millis() as u64),
            },
            suggested_actions: actions,
        })
    }

    async fn reflex_reply(&self, message: &str, hit: ReflexHit, started: Instant) -> ChatResponse {
        self.emit(BrainEvent::ReflexTriggered {
            reflex: hit.name.to_string(),
        })
        .await;

        let persisted = self
            .stores
            .lock()
            .await
            .memory
            .add_message(Some(message), Some(hit.response));
        if let Err(e) = persisted {
            self.storage_failed("memory", e).await;
        }

        ChatResponse {
            output: hit.response.to_string(),
            agent_trace: Vec::new(),
            route_metadata: RouteMetadata {
                mode: RoutingMode::Reflex,
                agents: vec![DEFAULT_PERSONA.to_string()],
                rationale: Some(format!("Instinctive reflex: {}", hit.name)),
                confidence: Some(1.0),
                emotional_tone: Some(EmotionalTone::Helpful.to_string()),
                reasoning_time_ms: Some(started.elapsed().as_millis() as u64),
            },
            suggested_actions: Vec::new(),
        }
    }

    async fn retrieve(
        &self,
        message: &str,
        mode: RoutingMode,
        analysis: &QueryAnalysis,
    ) -> Retrieved {
        let stores = self.stores.lock().await;
        let memory_ctx = stores.memory.get_context(CONTEXT_WINDOW);
        let persona_ctx = PersonaContext {
            summary: memory_ctx
                .last_user_message()
                .map(|m| truncate_chars(m, 200)),
            recent_messages: memory_ctx.recent_messages.len(),
            conversation_length: memory_ctx.conversation_length,
        };
        let hint = if mode == RoutingMode::Auto {
            stores.learning.get_routing_hint(&extract_keywords(message))
        } else {
            None
        };
        let introspection = if analysis.query_type == QueryType::SelfInquiry {
            Some(stores.self_model.introspect())
        } else {
            None
        };
        Retrieved {
            persona_ctx,
            hint,
            lessons: stores.lessons.get_relevant_lessons(message, LESSON_LIMIT),
            introspection,
        }
    }

    /// Ask every named persona concurrently; results keep routing order.
    async fn consult(
        &self,
        names: &[String],
        message: &str,
        ctx: &PersonaContext,
    ) -> Vec<Proposal> {
        let mut seats = Vec::new();
        let mut tasks = Vec::new();
        for name in names {
            let Some(persona) = self.personas.get(name) else {
                log::warn!("goodboy::brain: routed to unknown persona {}", name);
                continue;
            };
            let persona = persona.clone();
            let client = Arc::clone(&self.client);
            let message = message.to_string();
            let ctx = ctx.clone();
            let max_tokens = self.config.max_tokens;
            let temperature = self.config.temperature;
            let deadline = self.config.request_timeout();
            seats.push(persona.clone());
            tasks.push(tokio::spawn(async move {
                persona
                    .propose(client.as_ref(), &message, &ctx, max_tokens, temperature, deadline)
                    .await
            }));
        }

        let mut proposals = Vec::with_capacity(tasks.len());
        for (persona, joined) in seats.into_iter().zip(join_all(tasks).await) {
            let proposal = match joined {
                Ok(proposal) => proposal,
                Err(e) => persona.failed_proposal(&format!("task join error: {}", e)),
            };
            if proposal.is_error() {
                self.emit(BrainEvent::PersonaFailed {
                    persona: proposal.persona.clone(),
                    error: proposal.content.clone(),
                })
                .await;
            } else {
                self.emit(BrainEvent::PersonaResponded {
                    persona: proposal.persona.clone(),
                    response_length: proposal.content.len(),
                })
                .await;
            }
            proposals.push(proposal);
        }
        proposals
    }

    #[allow(clippy::too_many_arguments)]
    async fn record(
        &self,
        message: &str,
        output: &str,
        decision: &RoutingDecision,
        lessons: &[Lesson],
        analysis: &QueryAnalysis,
        tone: EmotionalTone,
        confidence: f32,
        actions: &[SuggestedAction],
    ) {
        let success = is_success(confidence);
        let mut failures: Vec<(&'static str, GoodBoyError)> = Vec::new();
        {
            let mut stores = self.stores.lock().await;

            if self.config.enable_evolution {
                if let Err(e) =
                    stores
                        .ledger
                        .record_interaction(message, output, &decision.personas, success)
                {
                    failures.push(("evolution", e));
                }
                if let Err(e) = stores.ledger.reflect_on_performance(message, output, confidence) {
                    failures.push(("reflections", e));
                }
                if let Err(e) =
                    stores
                        .learning
                        .learn_from_interaction(message, &decision.personas, confidence)
                {
                    failures.push(("patterns", e));
                }
            }

            for lesson in lessons {
                if let Err(e) = stores.lessons.mark_lesson_used(&lesson.id, success) {
                    failures.push(("lessons", e));
                }
            }

            if let Err(e) = stores
                .self_model
                .update_after_task(success, analysis.complexity, tone)
            {
                failures.push(("self_model", e));
            }

            if !actions.is_empty() {
                if let Err(e) = stores.actions.enqueue(actions, message, output) {
                    failures.push(("action_queue", e));
                }
            }

            if self.config.enable_mini_bots {
                if let Err(e) = nurture_minibots(&mut stores, message, confidence) {
                    failures.push(("minibots", e));
                }
            }

            if let Err(e) = stores.audit.log_interaction(message, &decision.personas, output) {
                failures.push(("audit", e));
            }

            if let Err(e) = stores.memory.add_message(Some(message), Some(output)) {
                failures.push(("memory", e));
            }
        }

        for (store, e) in failures {
            self.storage_failed(store, e).await;
        }
    }

    async fn storage_failed(&self, store: &str, error: GoodBoyError) {
        log::error!("goodboy::brain: {} store failed: {}", store, error);
        self.emit(BrainEvent::StorageFailed {
            store: store.to_string(),
            error: error.to_string(),
        })
        .await;
    }

    /// Store a user-taught lesson.
    pub async fn teach(&self, request: TeachRequest) -> Result<TeachResponse, GoodBoyError> {
        if request.topic.trim().is_empty() {
            return Err(GoodBoyError::Validation("lesson topic is empty".to_string()));
        }
        let tags = request.tags.unwrap_or_default();
        let lesson = self
            .stores
            .lock()
            .await
            .lessons
            .add_lesson(&request.topic, &request.instruction, &tags)?;
        Ok(TeachResponse {
            status: "added".to_string(),
            lesson_id: lesson.id,
        })
    }

    pub async fn relevant_lessons(&self, query: &str, k: usize) -> Vec<Lesson> {
        self.stores.lock().await.lessons.get_relevant_lessons(query, k)
    }

    /// Explicit lesson feedback. Unknown ids are a no-op returning `false`.
    pub async fn mark_lesson_used(
        &self,
        id: &str,
        was_helpful: bool,
    ) -> Result<bool, GoodBoyError> {
        self.stores.lock().await.lessons.mark_lesson_used(id, was_helpful)
    }

    /// Extract `path`, split it into chunks and store each chunk as a lesson.
    pub async fn ingest_document(
        &self,
        extractor: &dyn DocumentExtractor,
        path: &Path,
        topic: &str,
        tags: &[String],
    ) -> Result<Vec<Lesson>, GoodBoyError> {
        let text = extractor.extract(path)?;
        let chunks = chunk_text(&text, INGEST_CHUNK_CHARS);
        if chunks.is_empty() {
            return Err(GoodBoyError::Validation(format!(
                "{} contains no text",
                path.display()
            )));
        }
        let mut stores = self.stores.lock().await;
        let mut added = Vec::with_capacity(chunks.len());
        for chunk in chunks {
            added.push(stores.lessons.add_lesson(topic, &chunk, tags)?);
        }
        log::info!(
            "goodboy::brain: ingested {} lessons from {}",
            added.len(),
            path.display()
        );
        Ok(added)
    }

    pub async fn search_memory(&self, query: &str, k: usize) -> Vec<MemorySearchHit> {
        self.stores.lock().await.memory.search(query, k)
    }

    pub async fn memory_context(&self, k: usize) -> MemoryContext {
        self.stores.lock().await.memory.get_context(k)
    }

    pub async fn evolution_status(&self) -> EvolutionStatus {
        self.stores.lock().await.ledger.status()
    }

    pub async fn trigger_generation(&self) -> Result<GenerationInfo, GoodBoyError> {
        self.stores.lock().await.ledger.trigger_generation_increment()
    }

    pub async fn process_action(
        &self,
        action_id: &str,
        result: serde_json::Value,
    ) -> Result<ProcessedAction, GoodBoyError> {
        self.stores
            .lock()
            .await
            .ledger
            .process_and_log_action(action_id, result)
    }

    pub async fn pending_actions(&self) -> Result<Vec<QueuedAction>, GoodBoyError> {
        self.stores.lock().await.actions.load_all()
    }

    pub async fn active_minibots(&self) -> Vec<MiniBot> {
        self.stores.lock().await.minibots.active().cloned().collect()
    }

    pub async fn introspect(&self) -> String {
        self.stores.lock().await.self_model.introspect()
    }

    /// Silence or restore a named reflex. Returns false for unknown names.
    pub async fn set_reflex_enabled(&self, name: &str, enabled: bool) -> bool {
        let mut instinct = self.instinct.lock().await;
        if enabled {
            instinct.disinhibit(name)
        } else {
            instinct.inhibit(name)
        }
    }

    /// Housekeeping: age out old memory, rest, run the overseer.
    pub async fn run_maintenance(&self) -> Result<MaintenanceReport, GoodBoyError> {
        let mut stores = self.stores.lock().await;
        let removed_turns = stores
            .memory
            .cleanup_old_entries(self.config.memory_retention_days)?;
        stores.self_model.rest()?;
        let suggestions = stores.ledger.suggest_actions()?;
        Ok(MaintenanceReport {
            removed_turns,
            suggestions,
        })
    }
}

/// Credit an existing mini-bot for `message`, or hatch one when a persona
/// combination keeps recurring.
fn nurture_minibots(
    stores: &mut BrainStores,
    message: &str,
    quality: f32,
) -> Result<Option<MiniBot>, GoodBoyError> {
    if let Some(bot) = stores.minibots.find_for_message(message) {
        let id = bot.id.clone();
        stores.minibots.update_performance(&id, quality)?;
        return Ok(None);
    }

    let Some(optimization) = stores.learning.suggest_routing_optimization() else {
        return Ok(None);
    };
    if optimization.frequency <= MINIBOT_SPAWN_FREQUENCY {
        return Ok(None);
    }
    let trigger = message
        .split_whitespace()
        .take(3)
        .collect::<Vec<_>>()
        .join(" ");
    if trigger.is_empty() || stores.minibots.has_active_trigger(&trigger) {
        return Ok(None);
    }
    let parent = optimization
        .suggested_agents
        .first()
        .cloned()
        .unwrap_or_else(|| DEFAULT_PERSONA.to_string());
    let specialization = format!("{} routing", optimization.suggested_agents.join(" + "));
    stores
        .minibots
        .spawn(&parent, &specialization, &trigger)
        .map(Some)
}

fn apply_personality(
    reply: String,
    message: &str,
    analysis: &QueryAnalysis,
    introspection: Option<&str>,
) -> String {
    if reply.chars().count() < 10 || reply.contains(ERROR_MARKER) {
        return reply;
    }
    let mut reply = reply;
    if analysis.user_emotion == UserEmotion::Confused && !reply.trim_end().ends_with('?') {
        reply.push_str(" Does this help clarify things?");
    }
    if let Some(intro) = introspection {
        if message.to_lowercase().contains("who are you") {
            reply = format!("{}\n\n{}", intro, reply);
        }
    }
    reply
}
