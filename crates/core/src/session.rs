//! Per-session conversation state.
//!
//! The state is a plain value: the orchestrator loads it from the session
//! store, applies one turn, and writes it back. All mutation here is
//! infallible; negotiation status changes go through
//! [`crate::negotiation::NegotiationState::transition_to`] before the turn
//! is applied.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::intent::{Intent, Route};
use crate::negotiation::NegotiationState;
use crate::sentiment::{SentimentLabel, SentimentResult, Severity};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Guest,
    Host,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    /// Sentiment at the time the message was received; guest turns only.
    pub sentiment: Option<SentimentResult>,
    pub timestamp: DateTime<Utc>,
}

/// Everything decided about a single guest turn before a response is
/// generated. Stored alongside the reply for audit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TurnRecord {
    pub sentiment: SentimentResult,
    pub is_complaint: bool,
    pub severity: Severity,
    pub crisis_mode: bool,
    pub intent: Intent,
    pub route: Route,
    pub needs_human_escalation: bool,
}

/// Angry guests and serious complaints put the session in crisis mode.
pub fn crisis_mode(label: SentimentLabel, is_complaint: bool, severity: Severity) -> bool {
    label == SentimentLabel::Angry
        || (is_complaint && matches!(severity, Severity::Critical | Severity::Severe))
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConversationState {
    pub session_id: String,
    pub loyalty_status: String,
    pub messages: Vec<Message>,
    pub complaint_count: u32,
    pub crisis_mode: bool,
    pub negotiation: NegotiationState,
    pub last_activity: DateTime<Utc>,
}

impl ConversationState {
    pub fn new(session_id: impl Into<String>, loyalty_status: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            loyalty_status: loyalty_status.into(),
            messages: Vec::new(),
            complaint_count: 0,
            crisis_mode: false,
            negotiation: NegotiationState::default(),
            last_activity: Utc::now(),
        }
    }

    /// Record the guest's utterance and this turn's analysis. Always
    /// advances: the message is appended and the activity clock moves even
    /// when later response generation fails.
    pub fn apply_turn(&mut self, text: &str, record: &TurnRecord, at: DateTime<Utc>) {
        self.messages.push(Message {
            role: Role::Guest,
            content: text.to_string(),
            sentiment: Some(record.sentiment),
            timestamp: at,
        });
        if record.is_complaint {
            self.complaint_count += 1;
        }
        self.crisis_mode = record.crisis_mode;
        self.last_activity = at;
    }

    pub fn record_reply(&mut self, content: impl Into<String>, at: DateTime<Utc>) {
        self.messages.push(Message {
            role: Role::Host,
            content: content.into(),
            sentiment: None,
            timestamp: at,
        });
        self.last_activity = at;
    }

    pub fn last_guest_message(&self) -> Option<&Message> {
        self.messages.iter().rev().find(|message| message.role == Role::Guest)
    }

    /// The most recent `limit` messages, oldest first, rendered for prompt
    /// context.
    pub fn transcript(&self, limit: usize) -> String {
        let start = self.messages.len().saturating_sub(limit);
        self.messages[start..]
            .iter()
            .map(|message| {
                let speaker = match message.role {
                    Role::Guest => "Guest",
                    Role::Host => "Host",
                };
                format!("{speaker}: {}", message.content)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::{crisis_mode, ConversationState, Role, TurnRecord};
    use crate::intent::{Intent, Route};
    use crate::sentiment::{SentimentLabel, SentimentResult, Severity};

    fn at(second: u32) -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, second).unwrap()
    }

    fn record(label: SentimentLabel, is_complaint: bool, severity: Severity) -> TurnRecord {
        TurnRecord {
            sentiment: SentimentResult { label, score: 0.0 },
            is_complaint,
            severity,
            crisis_mode: crisis_mode(label, is_complaint, severity),
            intent: Intent::GeneralInfo,
            route: Route::GeneralInfo,
            needs_human_escalation: false,
        }
    }

    #[test]
    fn crisis_mode_requires_anger_or_escalated_complaint() {
        assert!(crisis_mode(SentimentLabel::Angry, false, Severity::Minor));
        assert!(crisis_mode(SentimentLabel::Negative, true, Severity::Critical));
        assert!(crisis_mode(SentimentLabel::Neutral, true, Severity::Severe));
        assert!(!crisis_mode(SentimentLabel::Negative, true, Severity::Moderate));
        assert!(!crisis_mode(SentimentLabel::Negative, false, Severity::Critical));
    }

    #[test]
    fn apply_turn_appends_and_counts_complaints() {
        let mut state = ConversationState::new("s-1", "none");
        state.apply_turn("The shower is cold", &record(SentimentLabel::Negative, true, Severity::Moderate), at(1));
        state.record_reply("So sorry, we'll fix it right away.", at(2));
        state.apply_turn("Still cold!", &record(SentimentLabel::Angry, true, Severity::Moderate), at(3));

        assert_eq!(state.messages.len(), 3);
        assert_eq!(state.complaint_count, 2);
        assert!(state.crisis_mode);
        assert_eq!(state.last_activity, at(3));
        assert_eq!(state.last_guest_message().map(|m| m.content.as_str()), Some("Still cold!"));
    }

    #[test]
    fn guest_messages_carry_their_sentiment_and_host_replies_do_not() {
        let mut state = ConversationState::new("s-1", "none");
        state.apply_turn("The shower is cold", &record(SentimentLabel::Negative, true, Severity::Moderate), at(1));
        state.record_reply("So sorry, we'll fix it right away.", at(2));

        let guest = &state.messages[0];
        assert_eq!(guest.sentiment.map(|s| s.label), Some(SentimentLabel::Negative));
        let host = &state.messages[1];
        assert_eq!(host.role, Role::Host);
        assert!(host.sentiment.is_none());
    }

    #[test]
    fn crisis_mode_reflects_the_latest_turn() {
        let mut state = ConversationState::new("s-1", "none");
        state.apply_turn("This is unacceptable!", &record(SentimentLabel::Angry, true, Severity::Severe), at(1));
        assert!(state.crisis_mode);
        state.apply_turn("Thanks, all good now", &record(SentimentLabel::Positive, false, Severity::Minor), at(2));
        assert!(!state.crisis_mode);
    }

    #[test]
    fn transcript_renders_the_most_recent_window() {
        let mut state = ConversationState::new("s-1", "none");
        for index in 0..4 {
            state.apply_turn(
                &format!("question {index}"),
                &record(SentimentLabel::Neutral, false, Severity::Minor),
                at(index),
            );
            state.record_reply(format!("answer {index}"), at(index));
        }
        let window = state.transcript(3);
        assert_eq!(window, "Host: answer 2\nGuest: question 3\nHost: answer 3");
        assert!(state.messages.iter().any(|m| m.role == Role::Guest));
    }
}
