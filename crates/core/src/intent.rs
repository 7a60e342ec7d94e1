//! Keyword intent classification and handler routing.
//!
//! Classification walks an ordered rule table; the first rule whose guards
//! all hold wins. Keeping the rules as data makes the precedence auditable
//! and lets tests pin each rule individually.

use serde::{Deserialize, Serialize};

use crate::sentiment::Severity;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Negotiation,
    Complaint,
    Recommendation,
    Booking,
    GeneralInfo,
}

/// Handler a classified turn is dispatched to. Booking has no dedicated
/// handler; availability questions are answered from retrieved context.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    Negotiation,
    Complaint,
    Recommendation,
    GeneralInfo,
}

/// Signals gathered before classification runs.
#[derive(Clone, Copy, Debug, Default)]
pub struct TurnSignals {
    pub negotiation_active: bool,
    pub is_complaint: bool,
    pub severity: Option<Severity>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ComplaintGate {
    /// Complaint flagged with critical or severe severity.
    Escalated,
    /// Complaint flagged at any severity.
    Any,
}

struct IntentRule {
    name: &'static str,
    intent: Intent,
    /// Rule only applies while a negotiation round is open.
    needs_active_negotiation: bool,
    /// Any-of keyword match against the lowercased utterance; empty means
    /// no keyword requirement.
    keywords: &'static [&'static str],
    /// Additionally require a room keyword or a "for <digits>" offer shape.
    needs_room_context: bool,
    complaint: Option<ComplaintGate>,
}

const PRICE_WORDS: &[&str] = &[
    "price", "cost", "expensive", "negotiate", "discount", "$", "deal", "offer", "cheaper",
    "dollars", "per night", "a night", "budget", "afford", "how much", "rate", "rates",
];

const ROOM_WORDS: &[&str] = &[
    "room",
    "suite",
    "standard",
    "deluxe",
    "family",
    "cottage",
    "stay",
    "night",
    "book",
    "accommodation",
    "double",
    "triple",
];

// Price signals and push-backs that keep an open negotiation in its lane.
const CONTINUATION_WORDS: &[&str] = &[
    "$",
    "deal",
    "ok",
    "fine",
    "accept",
    "agree",
    "yes",
    "dollars",
    "no",
    "too high",
    "expensive",
    "forget it",
    "nevermind",
];

const RECOMMENDATION_WORDS: &[&str] = &[
    "restaurant",
    "dinner",
    "lunch",
    "eat",
    "food",
    "activity",
    "hike",
    "visit",
    "recommend",
    "things to do",
    "attractions",
    "where can",
];

const BOOKING_WORDS: &[&str] =
    &["book", "reserve", "availability", "check-in", "check-out", "available"];

/// First match wins. Escalated complaints outrank recommendations and
/// bookings; mild complaints only catch what nothing else claimed.
const RULES: &[IntentRule] = &[
    IntentRule {
        name: "negotiation_continuation",
        intent: Intent::Negotiation,
        needs_active_negotiation: true,
        keywords: CONTINUATION_WORDS,
        needs_room_context: false,
        complaint: None,
    },
    IntentRule {
        name: "priced_room_talk",
        intent: Intent::Negotiation,
        needs_active_negotiation: false,
        keywords: PRICE_WORDS,
        needs_room_context: true,
        complaint: None,
    },
    IntentRule {
        name: "direct_price_question",
        intent: Intent::Negotiation,
        needs_active_negotiation: false,
        keywords: &["how much", "what's the price", "pricing"],
        needs_room_context: false,
        complaint: None,
    },
    IntentRule {
        name: "escalated_complaint",
        intent: Intent::Complaint,
        needs_active_negotiation: false,
        keywords: &[],
        needs_room_context: false,
        complaint: Some(ComplaintGate::Escalated),
    },
    IntentRule {
        name: "venue_seeker",
        intent: Intent::Recommendation,
        needs_active_negotiation: false,
        keywords: RECOMMENDATION_WORDS,
        needs_room_context: false,
        complaint: None,
    },
    IntentRule {
        name: "booking_request",
        intent: Intent::Booking,
        needs_active_negotiation: false,
        keywords: BOOKING_WORDS,
        needs_room_context: false,
        complaint: None,
    },
    IntentRule {
        name: "lingering_complaint",
        intent: Intent::Complaint,
        needs_active_negotiation: false,
        keywords: &[],
        needs_room_context: false,
        complaint: Some(ComplaintGate::Any),
    },
];

/// Outcome of one classification pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Classification {
    pub intent: Intent,
    /// Name of the rule that fired; `None` for the general-info fallback.
    pub rule: Option<&'static str>,
}

impl IntentRule {
    fn matches(&self, lower: &str, signals: &TurnSignals) -> bool {
        if self.needs_active_negotiation && !signals.negotiation_active {
            return false;
        }
        match self.complaint {
            Some(ComplaintGate::Escalated) => {
                let escalated = signals.is_complaint
                    && matches!(signals.severity, Some(Severity::Critical | Severity::Severe));
                if !escalated {
                    return false;
                }
            }
            Some(ComplaintGate::Any) => {
                if !signals.is_complaint {
                    return false;
                }
            }
            None => {}
        }
        if !self.keywords.is_empty() && !contains_any(lower, self.keywords) {
            return false;
        }
        if self.needs_room_context && !(contains_any(lower, ROOM_WORDS) || offer_shape(lower)) {
            return false;
        }
        true
    }
}

/// Classify one utterance. Deterministic: same text and signals always
/// produce the same intent.
pub fn classify(text: &str, signals: &TurnSignals) -> Classification {
    let lower = text.to_lowercase();
    for rule in RULES {
        if rule.matches(&lower, signals) {
            return Classification { intent: rule.intent, rule: Some(rule.name) };
        }
    }
    Classification { intent: Intent::GeneralInfo, rule: None }
}

/// Map an intent to a handler. Crisis-mode complaints override whatever the
/// rule table said.
pub fn route(intent: Intent, crisis_mode: bool, is_complaint: bool) -> Route {
    if crisis_mode && is_complaint {
        return Route::Complaint;
    }
    match intent {
        Intent::Negotiation => Route::Negotiation,
        Intent::Complaint => Route::Complaint,
        Intent::Recommendation => Route::Recommendation,
        Intent::Booking | Intent::GeneralInfo => Route::GeneralInfo,
    }
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle))
}

fn offer_shape(lower: &str) -> bool {
    lower.contains("for") && lower.chars().any(|ch| ch.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::{classify, route, Intent, Route, TurnSignals};
    use crate::sentiment::Severity;

    fn quiet() -> TurnSignals {
        TurnSignals::default()
    }

    #[test]
    fn price_with_room_context_is_negotiation() {
        let result = classify("Can you do a better price on the standard room?", &quiet());
        assert_eq!(result.intent, Intent::Negotiation);
        assert_eq!(result.rule, Some("priced_room_talk"));
    }

    #[test]
    fn price_without_room_context_needs_an_offer_shape() {
        assert_eq!(classify("That sounds expensive", &quiet()).intent, Intent::GeneralInfo);
        assert_eq!(classify("Any deal for 40?", &quiet()).intent, Intent::Negotiation);
    }

    #[test]
    fn direct_price_question_skips_room_context() {
        let result = classify("How much do you charge?", &quiet());
        assert_eq!(result.intent, Intent::Negotiation);
        assert_eq!(result.rule, Some("direct_price_question"));
    }

    #[test]
    fn open_negotiation_captures_short_replies() {
        let signals = TurnSignals { negotiation_active: true, ..quiet() };
        assert_eq!(classify("ok, deal", &signals).intent, Intent::Negotiation);
        assert_eq!(classify("no, too high", &signals).intent, Intent::Negotiation);
        // Same replies without an open round fall through.
        assert_eq!(classify("ok, deal", &quiet()).intent, Intent::GeneralInfo);
    }

    #[test]
    fn escalated_complaint_outranks_recommendation_keywords() {
        let signals = TurnSignals {
            is_complaint: true,
            severity: Some(Severity::Critical),
            ..quiet()
        };
        let result = classify("There's a fire near the restaurant!", &signals);
        assert_eq!(result.intent, Intent::Complaint);
        assert_eq!(result.rule, Some("escalated_complaint"));
    }

    #[test]
    fn mild_complaint_defers_to_recommendation_keywords() {
        let signals = TurnSignals {
            is_complaint: true,
            severity: Some(Severity::Minor),
            ..quiet()
        };
        let result = classify("The wifi is slow, where can we eat tonight?", &signals);
        assert_eq!(result.intent, Intent::Recommendation);
    }

    #[test]
    fn mild_complaint_catches_what_nothing_else_claims() {
        let signals = TurnSignals {
            is_complaint: true,
            severity: Some(Severity::Minor),
            ..quiet()
        };
        let result = classify("The wifi is a bit slow", &signals);
        assert_eq!(result.intent, Intent::Complaint);
        assert_eq!(result.rule, Some("lingering_complaint"));
    }

    #[test]
    fn venue_keywords_are_recommendations() {
        assert_eq!(classify("Any good restaurant nearby?", &quiet()).intent, Intent::Recommendation);
        assert_eq!(classify("things to do tomorrow", &quiet()).intent, Intent::Recommendation);
    }

    #[test]
    fn booking_words_classify_as_booking_but_route_to_general_info() {
        let result = classify("Is the cottage available next week?", &quiet());
        // "cottage" is a room word but there is no price word, so the
        // negotiation rule does not fire.
        assert_eq!(result.intent, Intent::Booking);
        assert_eq!(route(result.intent, false, false), Route::GeneralInfo);
    }

    #[test]
    fn unmatched_text_falls_back_to_general_info() {
        let result = classify("Tell me about the hosts", &quiet());
        assert_eq!(result.intent, Intent::GeneralInfo);
        assert_eq!(result.rule, None);
    }

    #[test]
    fn crisis_mode_routes_complaints_regardless_of_intent() {
        assert_eq!(route(Intent::Recommendation, true, true), Route::Complaint);
        assert_eq!(route(Intent::Recommendation, true, false), Route::Recommendation);
        assert_eq!(route(Intent::Negotiation, false, true), Route::Negotiation);
    }
}
