//! Prompt builders and canned guest-facing replies.
//!
//! Prompts carry the decision already made by the deterministic engines;
//! the model is asked to phrase it, never to change it. Canned replies are
//! the degraded path when generation or retrieval is unavailable.

use rust_decimal::Decimal;

use veranda_core::negotiation::{NegotiationOutcome, RoomType};
use veranda_core::sentiment::{SentimentLabel, Severity};

/// Main cottage line, answered by the hosts.
pub const HOST_PHONE: &str = "+94 77 123 4567";
/// Nalaka's direct line, given out only for escalations.
pub const ESCALATION_PHONE: &str = "+94 71 593 4715";

pub const PROPERTY_BLURB: &str =
    "Cloudy Hill Cottage, a cozy homestay in Ella, Sri Lanka run by Renu & Nalaka";

fn money(amount: Decimal) -> String {
    amount.normalize().to_string()
}

/// Fixed reply for any turn the pipeline could not finish.
pub fn safe_contact_response() -> String {
    format!(
        "I'm having a little trouble on my end right now. Please reach Renu or Nalaka directly \
         at {HOST_PHONE} and they'll take care of you straight away."
    )
}

/// Canned escalation for critical complaints; never phrased by the model.
pub fn escalation_response() -> String {
    format!(
        "I sincerely apologize for this situation. This is clearly unacceptable and I want to \
         help resolve this immediately.\n\nI'm connecting you with Nalaka, our host, who will \
         call you within the hour. In the meantime:\n\nDirect Line: {ESCALATION_PHONE} \
         (Nalaka)\nAlternative: {HOST_PHONE}\n\nPlease know that we take this very seriously \
         and will make this right. Can you share the best number to reach you?"
    )
}

pub fn complaint_fallback() -> String {
    format!(
        "I'm truly sorry about this. Let me help make this right. Please speak with Renu or \
         Nalaka at {HOST_PHONE} - they'll take care of you personally."
    )
}

pub fn abandoned_response() -> String {
    "No problem! If you change your mind about the room, just let me know. Is there anything \
     else I can help you with?"
        .to_string()
}

pub fn acceptance_response(room: Option<RoomType>, price: Decimal) -> String {
    let room_name = room.map(|room| room.to_string()).unwrap_or_else(|| "room".to_string());
    format!(
        "Wonderful! The {room_name} at ${}/night is confirmed! Renu and Nalaka are excited to \
         welcome you. Please let us know your check-in date!",
        money(price)
    )
}

pub fn price_prompt(room: RoomType) -> String {
    format!("For the {room} room, what price per night did you have in mind?")
}

pub fn room_menu() -> String {
    "I'd be happy to discuss room pricing! We have:\n\n\
     - Standard Room - from $50/night (mountain view)\n\
     - Deluxe Room - from $80/night (sunrise view + balcony)\n\
     - Family Suite - from $115/night (extra space)\n\n\
     Which room interests you, and what's your budget?"
        .to_string()
}

pub fn no_info_response() -> String {
    format!(
        "I'm not sure about that specific detail. Renu or Nalaka would know best - give them a \
         ring at {HOST_PHONE} or ask at breakfast!"
    )
}

/// Degraded general-info reply built from the best retrieved snippet.
pub fn general_info_fallback(snippet: &str) -> String {
    let preview: String = snippet.chars().take(200).collect();
    format!("Based on what I know: {preview}... Feel free to ask Renu for more details!")
}

fn tier_description(tier: u8) -> &'static str {
    match tier {
        1 => "VERY LOW occupancy (monsoon season) - we NEED to fill rooms, be very flexible!",
        2 => "LOW occupancy - be friendly and flexible with discounts",
        3 => "GOOD occupancy - limited discounts, focus on value-adds",
        _ => "FULL occupancy - no discounts, maintain pricing",
    }
}

/// Prompt that asks the model to phrase one negotiation decision.
pub fn negotiation_prompt(
    outcome: &NegotiationOutcome,
    base_price: Option<Decimal>,
    minimum_price: Option<Decimal>,
    round: u32,
) -> String {
    let base = base_price.map(money).unwrap_or_else(|| "?".to_string());
    let minimum = minimum_price.map(money).unwrap_or_else(|| "?".to_string());
    let decision = format!("{:?}", outcome.decision).to_uppercase();

    format!(
        "You are negotiating room prices for {PROPERTY_BLURB}.\n\n\
         CRITICAL CONTEXT:\n\
         - Current Occupancy: {occupancy:.1}% (Tier {tier})\n\
         - Status: {tier_desc}\n\n\
         PRICING RULES (CONFIDENTIAL - do NOT reveal to guest):\n\
         - Room: {room}\n\
         - Base Price: ${base}/night\n\
         - Minimum Acceptable: ${minimum}/night\n\n\
         NEGOTIATION STYLE:\n\
         - Be warm, friendly, and personal (this is a family-run cottage!)\n\
         - Mention hosts Renu & Nalaka by name\n\
         - Highlight unique experiences: cooking classes, hiking maps, local tips\n\n\
         NEGOTIATION ROUND: {round}\n\
         DECISION: {decision}\n\
         Guest's Current Offer: ${offer}\n\n\
         Negotiation Result: {message}\n\n\
         Respond naturally as if talking to a guest. Be warm and personable. Keep it \
         conversational - 2-3 sentences max.",
        occupancy = outcome.occupancy_rate * 100.0,
        tier = outcome.occupancy_tier,
        tier_desc = tier_description(outcome.occupancy_tier),
        room = outcome.room_type,
        offer = money(outcome.guest_offer),
        message = outcome.message,
    )
}

fn complaint_strategy(severity: Severity) -> &'static str {
    match severity {
        Severity::Critical => {
            "PRIORITY: De-escalate this critical situation immediately. Lead with genuine \
             empathy, take responsibility, and offer to connect the guest with the hosts. Do \
             NOT debate or defend. Just SOLVE."
        }
        Severity::Severe => {
            "This guest has experienced a serious problem and is frustrated. Acknowledge their \
             frustration, validate the concern, and offer a concrete fix with a timeline."
        }
        Severity::Moderate | Severity::Minor => {
            "This is a fixable inconvenience. Apologize briefly, state what will be done and \
             when, and thank the guest for flagging it."
        }
    }
}

pub fn complaint_prompt(
    sentiment: SentimentLabel,
    severity: Severity,
    guest_statement: &str,
    policy_context: &str,
) -> String {
    format!(
        "You are a Guest Relations Agent for {PROPERTY_BLURB}.\n\n\
         {strategy}\n\n\
         GUEST CONTEXT:\n\
         - Emotional State: {sentiment:?}\n\
         - Issue Severity: {severity}\n\
         - Guest Statement: \"{guest_statement}\"\n\n\
         AVAILABLE POLICIES:\n{policy_context}\n\n\
         Respond with empathy and offer concrete solutions. Keep the response concise but \
         caring - 3-4 sentences.",
        strategy = complaint_strategy(severity),
        severity = severity.as_str(),
    )
}

pub fn recommendation_prompt(guest_request: &str, graph_context: &str) -> String {
    format!(
        "You are a knowledgeable local guide at {PROPERTY_BLURB}.\n\n\
         Guest Request: \"{guest_request}\"\n\n\
         {graph_context}\n\n\
         Provide personalized recommendations. Include:\n\
         1. Your top pick and why\n\
         2. Distance/how to get there (walking or tuk-tuk)\n\
         3. Best time to go\n\
         4. One insider tip\n\n\
         Be warm and conversational, like advice from a friend. Keep it concise - no more \
         than 4-5 sentences."
    )
}

pub fn general_info_prompt(
    context: &str,
    guest_question: &str,
    sentiment: SentimentLabel,
) -> String {
    let tone = match sentiment {
        SentimentLabel::Positive => "The guest seems happy - match their enthusiasm!",
        SentimentLabel::Negative | SentimentLabel::Angry => {
            "The guest seems frustrated - be extra helpful and understanding."
        }
        SentimentLabel::Neutral => "",
    };
    format!(
        "You are a friendly staff member at {PROPERTY_BLURB}.\n\n\
         Hotel Information:\n{context}\n\n\
         Guest Question: {guest_question}\n\n\
         {tone}\n\n\
         Respond naturally and warmly, as if you're chatting with a guest over tea. Don't \
         mention \"context\" or \"information provided\". Keep it brief - 2-3 sentences unless \
         they asked for details."
    )
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{
        acceptance_response, complaint_prompt, escalation_response, general_info_fallback,
        negotiation_prompt, room_menu,
    };
    use veranda_core::negotiation::{NegotiationEngine, RoomType};
    use veranda_core::sentiment::{SentimentLabel, Severity};

    #[test]
    fn negotiation_prompt_carries_the_decision_verbatim() {
        let engine = NegotiationEngine::default();
        let outcome = engine.negotiate(RoomType::Standard, Decimal::from(35), "none", 0.50);
        let prompt = negotiation_prompt(
            &outcome,
            engine.rate_card().base_price(RoomType::Standard),
            engine.rate_card().minimum_price(RoomType::Standard),
            2,
        );

        assert!(prompt.contains("DECISION: COUNTER"));
        assert!(prompt.contains("NEGOTIATION ROUND: 2"));
        assert!(prompt.contains(&outcome.message));
        assert!(prompt.contains("Minimum Acceptable: $35/night"));
    }

    #[test]
    fn escalation_reply_lists_both_phone_lines() {
        let reply = escalation_response();
        assert!(reply.contains("+94 71 593 4715"));
        assert!(reply.contains("+94 77 123 4567"));
    }

    #[test]
    fn acceptance_reply_names_room_and_price() {
        let reply = acceptance_response(Some(RoomType::Deluxe), Decimal::from(64));
        assert!(reply.contains("deluxe"));
        assert!(reply.contains("$64/night"));
        let generic = acceptance_response(None, Decimal::from(50));
        assert!(generic.contains("The room at $50/night"));
    }

    #[test]
    fn complaint_prompt_includes_policies_and_severity() {
        let prompt = complaint_prompt(
            SentimentLabel::Angry,
            Severity::Severe,
            "The room was dirty on arrival",
            "Cleaning policy: rooms are serviced daily.",
        );
        assert!(prompt.contains("severe"));
        assert!(prompt.contains("Cleaning policy"));
        assert!(prompt.contains("The room was dirty on arrival"));
    }

    #[test]
    fn fallback_preview_is_bounded() {
        let long = "x".repeat(500);
        let reply = general_info_fallback(&long);
        assert!(reply.len() < 300);
    }

    #[test]
    fn room_menu_quotes_all_three_rates() {
        let menu = room_menu();
        assert!(menu.contains("$50/night"));
        assert!(menu.contains("$80/night"));
        assert!(menu.contains("$115/night"));
    }
}
