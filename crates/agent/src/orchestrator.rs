//! Turn-at-a-time conversation pipeline.
//!
//! Each turn runs sentiment analysis, intent classification, and routing
//! deterministically, then hands the decided outcome to a handler that may
//! consult the generation and retrieval seams. Collaborator calls are
//! bounded by deadlines and never retried; any failure degrades to a fixed
//! reply so the guest always gets an answer and the session always
//! advances.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info, warn};

use veranda_core::config::AppConfig;
use veranda_core::errors::ApplicationError;
use veranda_core::graph::{format_context, KnowledgeGraph, Preferences};
use veranda_core::intent::{classify, route, Route, TurnSignals};
use veranda_core::negotiation::{
    is_abandonment, is_acceptance, CounterOffer, Decision, NegotiationEngine, NegotiationState,
    NegotiationStatus,
};
use veranda_core::sentiment::{SentimentAnalyzer, SentimentLabel, Severity};
use veranda_core::session::{crisis_mode, ConversationState, TurnRecord};

use crate::llm::GenerationClient;
use crate::prompts;
use crate::retrieval::{DocumentRetriever, OccupancySource};
use crate::store::SessionStore;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TurnRequest {
    pub session_id: String,
    pub text: String,
    /// Loyalty status for new sessions; ignored when the session already
    /// carries one.
    pub loyalty_status: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TurnResponse {
    pub reply: String,
    pub record: TurnRecord,
    /// Negotiation state as of the end of this turn.
    pub negotiation: NegotiationState,
    pub metadata: serde_json::Value,
}

#[derive(Clone, Debug)]
pub struct OrchestratorSettings {
    pub generation_timeout: Duration,
    pub retrieval_timeout: Duration,
    pub retrieval_top_k: usize,
    pub default_occupancy_rate: f64,
    pub max_rounds: u32,
}

impl OrchestratorSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            generation_timeout: Duration::from_secs(config.generation.timeout_secs),
            retrieval_timeout: Duration::from_secs(config.retrieval.timeout_secs),
            retrieval_top_k: config.retrieval.top_k,
            default_occupancy_rate: config.negotiation.default_occupancy_rate,
            max_rounds: config.negotiation.max_rounds,
        }
    }
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

struct HandlerOutput {
    reply: String,
    needs_human_escalation: bool,
    metadata: serde_json::Value,
}

pub struct ConversationOrchestrator {
    analyzer: SentimentAnalyzer,
    engine: NegotiationEngine,
    graph: Arc<KnowledgeGraph>,
    generator: Arc<dyn GenerationClient>,
    retriever: Arc<dyn DocumentRetriever>,
    occupancy: Arc<dyn OccupancySource>,
    store: Arc<dyn SessionStore>,
    settings: OrchestratorSettings,
    // Serializes turns per session; different sessions proceed in parallel.
    session_locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl ConversationOrchestrator {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        analyzer: SentimentAnalyzer,
        engine: NegotiationEngine,
        graph: Arc<KnowledgeGraph>,
        generator: Arc<dyn GenerationClient>,
        retriever: Arc<dyn DocumentRetriever>,
        occupancy: Arc<dyn OccupancySource>,
        store: Arc<dyn SessionStore>,
        settings: OrchestratorSettings,
    ) -> Self {
        Self {
            analyzer,
            engine,
            graph,
            generator,
            retriever,
            occupancy,
            store,
            settings,
            session_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Run one guest turn end to end. Session store failures surface as
    /// errors; everything downstream of analysis degrades to a fixed reply
    /// instead.
    pub async fn handle_turn(
        &self,
        request: TurnRequest,
    ) -> Result<TurnResponse, ApplicationError> {
        let lock = self.session_lock(&request.session_id);
        let _turn_guard = lock.lock().await;

        let mut state = match self.store.load(&request.session_id).await? {
            Some(state) => state,
            None => ConversationState::new(
                request.session_id.clone(),
                request.loyalty_status.clone().unwrap_or_else(|| "none".to_string()),
            ),
        };

        let sentiment = self.analyzer.analyze(&request.text);
        let is_complaint = self.analyzer.is_complaint(&request.text);
        let severity = self.analyzer.severity(&request.text);
        let crisis = crisis_mode(sentiment.label, is_complaint, severity);

        let signals = TurnSignals {
            negotiation_active: state.negotiation.is_active(),
            is_complaint,
            severity: Some(severity),
        };
        let classification = classify(&request.text, &signals);
        let destination = route(classification.intent, crisis, is_complaint);

        let mut record = TurnRecord {
            sentiment,
            is_complaint,
            severity,
            crisis_mode: crisis,
            intent: classification.intent,
            route: destination,
            needs_human_escalation: false,
        };
        state.apply_turn(&request.text, &record, Utc::now());

        debug!(
            session = %state.session_id,
            intent = ?classification.intent,
            route = ?destination,
            rule = classification.rule.unwrap_or("fallback"),
            crisis,
            "turn classified"
        );

        let output = match self.dispatch(destination, &mut state, &request.text, &record).await {
            Ok(output) => output,
            Err(error) => {
                warn!(session = %state.session_id, %error, "turn handler failed, degrading");
                HandlerOutput {
                    reply: prompts::safe_contact_response(),
                    needs_human_escalation: false,
                    metadata: json!({ "error": error.to_string() }),
                }
            }
        };

        record.needs_human_escalation = output.needs_human_escalation;
        state.record_reply(output.reply.clone(), Utc::now());
        let negotiation = state.negotiation.clone();
        self.store.save(state).await?;

        if output.needs_human_escalation {
            info!(session = %request.session_id, "turn escalated to a human host");
        }

        Ok(TurnResponse { reply: output.reply, record, negotiation, metadata: output.metadata })
    }

    fn session_lock(&self, session_id: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.session_locks.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        locks.entry(session_id.to_string()).or_default().clone()
    }

    async fn dispatch(
        &self,
        destination: Route,
        state: &mut ConversationState,
        text: &str,
        record: &TurnRecord,
    ) -> Result<HandlerOutput, ApplicationError> {
        match destination {
            Route::Negotiation => self.handle_negotiation(state, text).await,
            Route::Complaint => self.handle_complaint(record, text).await,
            Route::Recommendation => Ok(self.handle_recommendation(text).await),
            Route::GeneralInfo => Ok(self.handle_general_info(record.sentiment.label, text).await),
        }
    }

    async fn handle_negotiation(
        &self,
        state: &mut ConversationState,
        text: &str,
    ) -> Result<HandlerOutput, ApplicationError> {
        let round = state.negotiation.begin_round();

        if is_abandonment(text) {
            state.negotiation.transition_to(NegotiationStatus::Abandoned)?;
            return Ok(HandlerOutput {
                reply: prompts::abandoned_response(),
                needs_human_escalation: false,
                metadata: json!({ "negotiation_ended": true, "reason": "user_abandoned" }),
            });
        }

        if is_acceptance(text) {
            if let Some(price) = state.negotiation.last_counter_price() {
                state.negotiation.transition_to(NegotiationStatus::Accepted)?;
                state.negotiation.final_price = Some(price);
                return Ok(HandlerOutput {
                    reply: prompts::acceptance_response(state.negotiation.room_type, price),
                    needs_human_escalation: false,
                    metadata: json!({ "negotiation_ended": true, "final_price": price }),
                });
            }
            // No counter on record yet: treat the turn as a fresh offer.
        }

        let Some((room, offer)) = self.engine.extract_room_type_and_offer(text) else {
            state.negotiation.transition_to(NegotiationStatus::Active)?;
            let (reply, awaiting) = match state.negotiation.room_type {
                Some(known_room) => (prompts::price_prompt(known_room), "price_offer"),
                None => (prompts::room_menu(), "room_and_price"),
            };
            return Ok(HandlerOutput {
                reply,
                needs_human_escalation: false,
                metadata: json!({ "awaiting": awaiting }),
            });
        };

        if state.negotiation.initial_offer.is_none() {
            state.negotiation.initial_offer = Some(offer);
        }
        state.negotiation.current_offer = Some(offer);
        state.negotiation.room_type = Some(room);
        state.negotiation.transition_to(NegotiationStatus::Active)?;
        // A fresh offer reopens a closed negotiation; clear any stale close.
        state.negotiation.final_price = None;

        let occupancy_rate = match self.current_occupancy().await {
            Ok(rate) => rate,
            Err(error) => {
                warn!(%error, fallback = self.settings.default_occupancy_rate, "occupancy source unavailable");
                self.settings.default_occupancy_rate
            }
        };

        let outcome = self.engine.negotiate(room, offer, &state.loyalty_status, occupancy_rate);

        state.negotiation.counter_offers.push(CounterOffer {
            round,
            guest_offer: offer,
            decision: outcome.decision,
            counter_price: outcome.quoted_price(),
            add_ons: outcome.add_ons.clone(),
        });
        state.negotiation.add_ons = outcome.add_ons.clone();

        let card = self.engine.rate_card();
        let prompt = prompts::negotiation_prompt(
            &outcome,
            card.base_price(room),
            card.minimum_price(room),
            round,
        );
        let reply = match self.generate(&prompt).await {
            Ok(text) => text,
            Err(error) => {
                warn!(%error, "generation unavailable, using engine message");
                outcome.message.clone()
            }
        };

        match outcome.decision {
            Decision::Accept => {
                state.negotiation.transition_to(NegotiationStatus::Accepted)?;
                state.negotiation.final_price = outcome.final_price;
            }
            Decision::Reject if round >= self.settings.max_rounds => {
                state.negotiation.transition_to(NegotiationStatus::Rejected)?;
            }
            _ => {}
        }

        Ok(HandlerOutput {
            reply,
            needs_human_escalation: false,
            metadata: json!({
                "decision": outcome.decision,
                "occupancy_rate": outcome.occupancy_rate,
                "occupancy_tier": outcome.occupancy_tier,
                "round": round,
                "loyalty_applied": state.loyalty_status != "none",
            }),
        })
    }

    async fn handle_complaint(
        &self,
        record: &TurnRecord,
        text: &str,
    ) -> Result<HandlerOutput, ApplicationError> {
        let needs_human = record.severity == Severity::Critical
            || (record.sentiment.label == SentimentLabel::Angry
                && record.severity == Severity::Severe);

        if needs_human {
            return Ok(HandlerOutput {
                reply: prompts::escalation_response(),
                needs_human_escalation: true,
                metadata: json!({
                    "escalation_reason": record.severity.as_str(),
                    "sentiment_at_escalation": record.sentiment.label,
                }),
            });
        }

        let query =
            self.analyzer.escalation_query(record.sentiment.label, true, record.severity);
        let policy_context = match self.retrieve(query).await {
            Ok(snippets) => snippets.join("\n\n"),
            Err(error) => {
                warn!(%error, "policy retrieval unavailable");
                String::new()
            }
        };

        let prompt = prompts::complaint_prompt(
            record.sentiment.label,
            record.severity,
            text,
            &policy_context,
        );
        let reply = match self.generate(&prompt).await {
            Ok(text) => text,
            Err(error) => {
                warn!(%error, "generation unavailable, using complaint fallback");
                prompts::complaint_fallback()
            }
        };

        Ok(HandlerOutput {
            reply,
            needs_human_escalation: false,
            metadata: json!({
                "complaint_severity": record.severity.as_str(),
                "sentiment": record.sentiment.label,
            }),
        })
    }

    async fn handle_recommendation(&self, text: &str) -> HandlerOutput {
        let preferences = Preferences::from_utterance(text);
        let recommendations = self.graph.query_itinerary(&preferences);
        let graph_context = format_context(&recommendations, &preferences);

        let prompt = prompts::recommendation_prompt(text, &graph_context);
        let reply = match self.generate(&prompt).await {
            Ok(text) => text,
            Err(error) => {
                warn!(%error, "generation unavailable, returning graph context");
                graph_context
            }
        };

        HandlerOutput {
            reply,
            needs_human_escalation: false,
            metadata: json!({
                "source": "graph",
                "recommendations_count": recommendations.len(),
            }),
        }
    }

    async fn handle_general_info(&self, sentiment: SentimentLabel, text: &str) -> HandlerOutput {
        let snippets = match self.retrieve(text).await {
            Ok(snippets) => snippets,
            Err(error) => {
                warn!(%error, "knowledge base retrieval unavailable");
                Vec::new()
            }
        };

        if snippets.is_empty() {
            return HandlerOutput {
                reply: prompts::no_info_response(),
                needs_human_escalation: false,
                metadata: json!({ "no_results": true }),
            };
        }

        let context = snippets.join("\n\n");
        let prompt = prompts::general_info_prompt(&context, text, sentiment);
        let reply = match self.generate(&prompt).await {
            Ok(text) => text,
            Err(error) => {
                warn!(%error, "generation unavailable, using snippet preview");
                prompts::general_info_fallback(&snippets[0])
            }
        };

        HandlerOutput {
            reply,
            needs_human_escalation: false,
            metadata: json!({ "source": "retrieval", "docs_used": snippets.len() }),
        }
    }

    async fn generate(&self, prompt: &str) -> Result<String, ApplicationError> {
        match tokio::time::timeout(self.settings.generation_timeout, self.generator.complete(prompt))
            .await
        {
            Ok(Ok(text)) => Ok(text),
            Ok(Err(error)) => Err(ApplicationError::Generation(error.to_string())),
            Err(_) => Err(ApplicationError::Timeout("generation")),
        }
    }

    async fn retrieve(&self, query: &str) -> Result<Vec<String>, ApplicationError> {
        match tokio::time::timeout(
            self.settings.retrieval_timeout,
            self.retriever.retrieve(query, self.settings.retrieval_top_k),
        )
        .await
        {
            Ok(Ok(snippets)) => Ok(snippets),
            Ok(Err(error)) => Err(ApplicationError::Retrieval(error.to_string())),
            Err(_) => Err(ApplicationError::Timeout("retrieval")),
        }
    }

    async fn current_occupancy(&self) -> Result<f64, ApplicationError> {
        match tokio::time::timeout(self.settings.retrieval_timeout, self.occupancy.current_rate())
            .await
        {
            Ok(Ok(rate)) => Ok(rate),
            Ok(Err(error)) => Err(ApplicationError::Retrieval(error.to_string())),
            Err(_) => Err(ApplicationError::Timeout("occupancy")),
        }
    }
}
