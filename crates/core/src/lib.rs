pub mod config;
pub mod errors;
pub mod graph;
pub mod intent;
pub mod negotiation;
pub mod sentiment;
pub mod session;

pub use config::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};
pub use errors::{ApplicationError, DomainError};
pub use graph::{
    format_context, AttrValue, Entity, EntityKind, KnowledgeGraph, Preferences, Recommendation,
    RelationKind, Relationship, MAX_RECOMMENDATIONS,
};
pub use intent::{classify, route, Classification, Intent, Route, TurnSignals};
pub use negotiation::{
    is_abandonment, is_acceptance, occupancy_tier, AddOn, CounterOffer, Decision,
    NegotiationEngine, NegotiationOutcome, NegotiationState, NegotiationStatus, RateCard, RoomType,
    DEFAULT_OCCUPANCY_RATE, MAX_REJECTED_ROUNDS,
};
pub use sentiment::{SentimentAnalyzer, SentimentLabel, SentimentLexicon, SentimentResult, Severity};
pub use session::{crisis_mode, ConversationState, Message, Role, TurnRecord};
