//! Conversation runtime for the Cloudy Hill Cottage guest assistant.
//!
//! This crate wires the deterministic engines from `veranda-core` into a
//! turn-at-a-time pipeline:
//! 1. **Sentiment** - score the guest's emotional state
//! 2. **Intent** - classify and route the turn
//! 3. **Handlers** - negotiate, handle complaints, recommend, or answer
//!    from retrieved context
//! 4. **Persistence** - load and save session state around every turn
//!
//! # Key Types
//!
//! - `ConversationOrchestrator` - main pipeline (see `orchestrator`)
//! - `GenerationClient` / `DocumentRetriever` / `OccupancySource` -
//!   pluggable collaborator seams
//! - `SessionStore` - session persistence, with an in-memory default
//!
//! # Safety Principle
//!
//! The LLM is strictly a phrasing layer. It NEVER decides prices, routing,
//! or escalation. Those are deterministic decisions made by the core
//! engines before any prompt is built, and every collaborator call is
//! bounded by a deadline with a canned degraded reply.

pub mod llm;
pub mod orchestrator;
pub mod prompts;
pub mod retrieval;
pub mod store;

pub use llm::GenerationClient;
pub use orchestrator::{
    ConversationOrchestrator, OrchestratorSettings, TurnRequest, TurnResponse,
};
pub use retrieval::{DocumentRetriever, OccupancySource};
pub use store::{InMemorySessionStore, SessionStore};
