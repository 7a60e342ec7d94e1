//! Pricing policy and multi-round negotiation state.
//!
//! The engine itself is a stateless decision function: the caller supplies the
//! guest's offer plus the current occupancy rate and receives a decision
//! record. Round tracking ([`NegotiationState`]) is owned by the orchestrator,
//! which persists it across turns through the session store.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// Occupancy rate assumed when the external occupancy source is unavailable.
pub const DEFAULT_OCCUPANCY_RATE: f64 = 0.247;

/// Rejected decisions at or past this round close the negotiation for good.
pub const MAX_REJECTED_ROUNDS: u32 = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomType {
    Standard,
    Deluxe,
    Family,
}

impl std::fmt::Display for RoomType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Standard => "standard",
            Self::Deluxe => "deluxe",
            Self::Family => "family",
        };
        f.write_str(name)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AddOn {
    Breakfast,
    CookingClass,
    LateCheckout,
    Bicycle,
    PackedLunch,
    AirportPickup,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Accept,
    Counter,
    CounterWithAddons,
    Reject,
    Error,
}

/// Fixed pricing tables, injected at construction. `Default` carries the
/// production rates; tests may supply partial cards to exercise the unknown
/// room-type branch.
#[derive(Clone, Debug)]
pub struct RateCard {
    pub base_prices: Vec<(RoomType, Decimal)>,
    pub minimum_prices: Vec<(RoomType, Decimal)>,
    pub addon_values: Vec<(AddOn, Decimal)>,
    pub loyalty_discounts: Vec<(String, Decimal)>,
    /// Max negotiable discount per occupancy tier 1..=4.
    pub max_discount_by_tier: [Decimal; 4],
}

impl Default for RateCard {
    fn default() -> Self {
        Self {
            base_prices: vec![
                (RoomType::Standard, Decimal::from(50)),
                (RoomType::Deluxe, Decimal::from(80)),
                (RoomType::Family, Decimal::from(115)),
            ],
            minimum_prices: vec![
                (RoomType::Standard, Decimal::from(35)),
                (RoomType::Deluxe, Decimal::from(60)),
                (RoomType::Family, Decimal::from(85)),
            ],
            addon_values: vec![
                (AddOn::Breakfast, Decimal::from(8)),
                (AddOn::CookingClass, Decimal::from(15)),
                (AddOn::LateCheckout, Decimal::from(10)),
                (AddOn::Bicycle, Decimal::from(10)),
                (AddOn::PackedLunch, Decimal::from(5)),
                (AddOn::AirportPickup, Decimal::ZERO),
            ],
            loyalty_discounts: vec![
                ("returning".to_string(), Decimal::new(10, 2)),
                ("extended".to_string(), Decimal::new(10, 2)),
                ("long_stay".to_string(), Decimal::new(15, 2)),
                ("referral".to_string(), Decimal::new(5, 2)),
            ],
            max_discount_by_tier: [
                Decimal::new(30, 2),
                Decimal::new(20, 2),
                Decimal::new(10, 2),
                Decimal::ZERO,
            ],
        }
    }
}

impl RateCard {
    pub fn base_price(&self, room: RoomType) -> Option<Decimal> {
        self.base_prices.iter().find(|(entry, _)| *entry == room).map(|(_, price)| *price)
    }

    pub fn minimum_price(&self, room: RoomType) -> Option<Decimal> {
        self.minimum_prices.iter().find(|(entry, _)| *entry == room).map(|(_, price)| *price)
    }

    pub fn addon_value(&self, addon: AddOn) -> Decimal {
        self.addon_values
            .iter()
            .find(|(entry, _)| *entry == addon)
            .map(|(_, value)| *value)
            .unwrap_or(Decimal::ZERO)
    }

    pub fn addon_total(&self, addons: &[AddOn]) -> Decimal {
        addons.iter().map(|addon| self.addon_value(*addon)).sum()
    }

    /// Loyalty discount as a decimal fraction; unknown statuses (including
    /// "none") get zero.
    pub fn loyalty_discount(&self, status: &str) -> Decimal {
        let normalized = status.trim().to_lowercase();
        self.loyalty_discounts
            .iter()
            .find(|(entry, _)| *entry == normalized)
            .map(|(_, discount)| *discount)
            .unwrap_or(Decimal::ZERO)
    }

    pub fn max_negotiable_discount(&self, tier: u8) -> Decimal {
        let index = usize::from(tier.clamp(1, 4)) - 1;
        self.max_discount_by_tier[index]
    }
}

/// Coarse occupancy bucket, 1 (critical-low) through 4 (full).
pub fn occupancy_tier(rate: f64) -> u8 {
    if rate <= 0.30 {
        1
    } else if rate <= 0.60 {
        2
    } else if rate <= 0.85 {
        3
    } else {
        4
    }
}

/// One decision from the pricing ladder.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NegotiationOutcome {
    pub decision: Decision,
    pub room_type: RoomType,
    pub guest_offer: Decimal,
    pub final_price: Option<Decimal>,
    pub counter_price: Option<Decimal>,
    pub add_ons: Vec<AddOn>,
    pub occupancy_rate: f64,
    pub occupancy_tier: u8,
    pub message: String,
}

impl NegotiationOutcome {
    /// The price a later acceptance would close at: an explicit counter if
    /// present, otherwise the accepted/bundled price.
    pub fn quoted_price(&self) -> Option<Decimal> {
        self.counter_price.or(self.final_price)
    }
}

#[derive(Clone, Debug, Default)]
pub struct NegotiationEngine {
    rate_card: RateCard,
}

impl NegotiationEngine {
    pub fn new(rate_card: RateCard) -> Self {
        Self { rate_card }
    }

    pub fn rate_card(&self) -> &RateCard {
        &self.rate_card
    }

    /// Pull a room type and an offered nightly price out of free text.
    ///
    /// Room type resolves by substring priority (family/suite, then deluxe,
    /// then standard/basic/"room"); price by pattern priority (a `$` amount,
    /// then "<n> per/a night", then "for <n>"). Both must be present.
    pub fn extract_room_type_and_offer(&self, text: &str) -> Option<(RoomType, Decimal)> {
        let lower = text.to_lowercase();

        let room = if lower.contains("family") || lower.contains("suite") {
            Some(RoomType::Family)
        } else if lower.contains("deluxe") {
            Some(RoomType::Deluxe)
        } else if lower.contains("standard") || lower.contains("basic") || lower.contains("room") {
            Some(RoomType::Standard)
        } else {
            None
        };

        let price =
            dollar_amount(text).or_else(|| per_night_amount(&lower)).or_else(|| for_amount(&lower));

        match (room, price) {
            (Some(room), Some(price)) => Some((room, price)),
            _ => None,
        }
    }

    /// The six-branch pricing ladder. Branch order matters: later guards
    /// overlap earlier ones (the low-occupancy add-on branch is a strict
    /// subset of the plain counter branch).
    pub fn negotiate(
        &self,
        room: RoomType,
        guest_offer: Decimal,
        loyalty_status: &str,
        occupancy_rate: f64,
    ) -> NegotiationOutcome {
        let tier = occupancy_tier(occupancy_rate);

        let (Some(base_price), Some(min_price)) =
            (self.rate_card.base_price(room), self.rate_card.minimum_price(room))
        else {
            return NegotiationOutcome {
                decision: Decision::Error,
                room_type: room,
                guest_offer,
                final_price: None,
                counter_price: None,
                add_ons: Vec::new(),
                occupancy_rate,
                occupancy_tier: tier,
                message: "Invalid room type. We have Standard, Deluxe, and Family rooms."
                    .to_string(),
            };
        };

        let loyalty_discount = self.rate_card.loyalty_discount(loyalty_status);
        let max_discount = self.rate_card.max_negotiable_discount(tier);
        let max_offer = base_price * (Decimal::ONE - max_discount - loyalty_discount);

        let outcome = |decision, final_price, counter_price, add_ons: Vec<AddOn>, message| {
            NegotiationOutcome {
                decision,
                room_type: room,
                guest_offer,
                final_price,
                counter_price,
                add_ons,
                occupancy_rate,
                occupancy_tier: tier,
                message,
            }
        };

        if guest_offer >= base_price {
            // Never upsell beyond the ask.
            return outcome(
                Decision::Accept,
                Some(base_price),
                None,
                Vec::new(),
                format!(
                    "Wonderful! The {room} room at ${}/night is confirmed. We look forward to \
                     hosting you!",
                    money(base_price)
                ),
            );
        }

        if guest_offer >= min_price && guest_offer >= max_offer {
            return outcome(
                Decision::Accept,
                Some(guest_offer),
                None,
                Vec::new(),
                format!(
                    "That works for us! The {room} room at ${}/night is yours. Renu and Nalaka \
                     look forward to welcoming you!",
                    money(guest_offer)
                ),
            );
        }

        if guest_offer > min_price && tier <= 2 {
            let add_ons = vec![AddOn::Breakfast, AddOn::LateCheckout];
            let addon_value = self.rate_card.addon_total(&add_ons);
            return outcome(
                Decision::CounterWithAddons,
                Some(guest_offer),
                None,
                add_ons,
                format!(
                    "I can do ${}/night AND include our famous Sri Lankan breakfast plus late \
                     checkout (worth ${})! It's the quiet season, so we'd love to have you.",
                    money(guest_offer),
                    money(addon_value)
                ),
            );
        }

        if guest_offer >= min_price {
            let counter = (guest_offer + Decimal::from(15)).min(max_offer);
            return outcome(
                Decision::Counter,
                None,
                Some(counter),
                Vec::new(),
                format!(
                    "The best I can do is ${}/night for the {room} room. That includes our \
                     complimentary breakfast!",
                    money(counter)
                ),
            );
        }

        if tier == 1 {
            let add_ons = vec![AddOn::Breakfast, AddOn::CookingClass, AddOn::Bicycle];
            let addon_value = self.rate_card.addon_total(&add_ons);
            return outcome(
                Decision::CounterWithAddons,
                Some(min_price),
                None,
                add_ons,
                format!(
                    "It's our quiet season! How about ${}/night with breakfast, a cooking class \
                     with Renu, AND a free bicycle for a day? That's ${} in extras included!",
                    money(min_price),
                    money(addon_value)
                ),
            );
        }

        outcome(
            Decision::Reject,
            None,
            None,
            Vec::new(),
            format!(
                "I appreciate the offer, but ${} is below what we can accept for the {room} \
                 room. Our best rate is ${}/night which includes breakfast.",
                money(guest_offer),
                money(max_offer)
            ),
        )
    }
}

fn money(amount: Decimal) -> String {
    amount.normalize().to_string()
}

fn dollar_amount(text: &str) -> Option<Decimal> {
    let mut search_from = 0;
    while let Some(position) = text[search_from..].find('$') {
        let digits_start = search_from + position + 1;
        let digits: String =
            text[digits_start..].chars().take_while(|ch| ch.is_ascii_digit()).collect();
        if !digits.is_empty() {
            return digits.parse::<u64>().ok().map(Decimal::from);
        }
        search_from = digits_start;
    }
    None
}

fn per_night_amount(lower: &str) -> Option<Decimal> {
    // "40/night" counts as "40 per night".
    let normalized = lower.replace('/', " per ");
    let tokens = tokenize(&normalized);
    for window in tokens.windows(3) {
        if let [amount, separator, tail] = window {
            let separated = separator == "per" || separator == "a";
            if separated && tail.starts_with("night") {
                if let Ok(value) = amount.parse::<u64>() {
                    return Some(Decimal::from(value));
                }
            }
        }
    }
    None
}

fn for_amount(lower: &str) -> Option<Decimal> {
    let tokens = tokenize(lower);
    for window in tokens.windows(2) {
        if let [keyword, amount] = window {
            if keyword == "for" {
                if let Ok(value) = amount.parse::<u64>() {
                    return Some(Decimal::from(value));
                }
            }
        }
    }
    None
}

fn tokenize(text: &str) -> Vec<String> {
    let mut sanitized = String::with_capacity(text.len());
    for character in text.chars() {
        if character.is_ascii_alphanumeric() {
            sanitized.push(character);
        } else {
            sanitized.push(' ');
        }
    }
    sanitized.split_whitespace().map(|token| token.to_string()).collect()
}

const ACCEPTANCE_PHRASES: &[&str] =
    &["ok", "fine", "deal", "accept", "agree", "yes", "book it", "i'll take"];

const ABANDONMENT_PHRASES: &[&str] = &["forget it", "nevermind", "cancel", "stop"];

/// Phrases that close an open round at the last counter on record.
pub fn is_acceptance(text: &str) -> bool {
    let lower = text.to_lowercase();
    ACCEPTANCE_PHRASES.iter().any(|phrase| lower.contains(phrase))
}

/// Phrases that abandon an open negotiation.
pub fn is_abandonment(text: &str) -> bool {
    let lower = text.to_lowercase();
    ABANDONMENT_PHRASES.iter().any(|phrase| lower.contains(phrase))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NegotiationStatus {
    Inactive,
    Active,
    Accepted,
    Rejected,
    Abandoned,
}

impl NegotiationStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Accepted | Self::Rejected | Self::Abandoned)
    }
}

/// One round's ledger entry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CounterOffer {
    pub round: u32,
    pub guest_offer: Decimal,
    pub decision: Decision,
    pub counter_price: Option<Decimal>,
    pub add_ons: Vec<AddOn>,
}

/// Per-session negotiation progress. Exactly one of these lives on each
/// session; terminal states end the round sequence but the record is kept
/// for audit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NegotiationState {
    pub round: u32,
    pub room_type: Option<RoomType>,
    pub initial_offer: Option<Decimal>,
    pub current_offer: Option<Decimal>,
    pub counter_offers: Vec<CounterOffer>,
    pub final_price: Option<Decimal>,
    pub add_ons: Vec<AddOn>,
    pub status: NegotiationStatus,
}

impl Default for NegotiationState {
    fn default() -> Self {
        Self {
            round: 0,
            room_type: None,
            initial_offer: None,
            current_offer: None,
            counter_offers: Vec::new(),
            final_price: None,
            add_ons: Vec::new(),
            status: NegotiationStatus::Inactive,
        }
    }
}

impl NegotiationState {
    pub fn is_active(&self) -> bool {
        self.status == NegotiationStatus::Active
    }

    /// The price an acceptance phrase would close at.
    pub fn last_counter_price(&self) -> Option<Decimal> {
        self.counter_offers.last().and_then(|offer| offer.counter_price)
    }

    /// Rounds only ever move forward.
    pub fn begin_round(&mut self) -> u32 {
        self.round += 1;
        self.round
    }

    pub fn can_transition_to(&self, next: NegotiationStatus) -> bool {
        use NegotiationStatus::{Accepted, Inactive, Rejected};
        if self.status == next {
            return true;
        }
        // A negotiation that never opened cannot close with a verdict; a
        // fresh offer may reopen anything else.
        !(self.status == Inactive && matches!(next, Accepted | Rejected))
    }

    pub fn transition_to(&mut self, next: NegotiationStatus) -> Result<(), DomainError> {
        if self.can_transition_to(next) {
            self.status = next;
            return Ok(());
        }
        Err(DomainError::InvalidNegotiationTransition { from: self.status, to: next })
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{
        is_abandonment, is_acceptance, occupancy_tier, AddOn, Decision, NegotiationEngine,
        NegotiationState, NegotiationStatus, RateCard, RoomType,
    };

    fn engine() -> NegotiationEngine {
        NegotiationEngine::default()
    }

    fn dec(value: u64) -> Decimal {
        Decimal::from(value)
    }

    #[test]
    fn occupancy_tiers_match_thresholds() {
        assert_eq!(occupancy_tier(0.24), 1);
        assert_eq!(occupancy_tier(0.30), 1);
        assert_eq!(occupancy_tier(0.31), 2);
        assert_eq!(occupancy_tier(0.60), 2);
        assert_eq!(occupancy_tier(0.85), 3);
        assert_eq!(occupancy_tier(0.90), 4);
    }

    #[test]
    fn extracts_family_suite_with_dollar_price() {
        let extracted = engine().extract_room_type_and_offer("The family suite is $400");
        assert_eq!(extracted, Some((RoomType::Family, dec(400))));
    }

    #[test]
    fn dollar_pattern_wins_over_later_patterns() {
        let extracted =
            engine().extract_room_type_and_offer("Deluxe room at $65, or maybe 60 per night?");
        assert_eq!(extracted, Some((RoomType::Deluxe, dec(65))));
    }

    #[test]
    fn per_night_pattern_parses_with_slash_and_words() {
        let engine = engine();
        assert_eq!(
            engine.extract_room_type_and_offer("standard room, 40 per night"),
            Some((RoomType::Standard, dec(40)))
        );
        assert_eq!(
            engine.extract_room_type_and_offer("basic room 45/night"),
            Some((RoomType::Standard, dec(45)))
        );
        assert_eq!(
            engine.extract_room_type_and_offer("a room at 38 a night"),
            Some((RoomType::Standard, dec(38)))
        );
    }

    #[test]
    fn for_pattern_is_the_last_resort() {
        let extracted = engine().extract_room_type_and_offer("Can I get the deluxe for 70");
        assert_eq!(extracted, Some((RoomType::Deluxe, dec(70))));
    }

    #[test]
    fn extraction_requires_both_room_and_price() {
        let engine = engine();
        assert_eq!(engine.extract_room_type_and_offer("How about $50?"), None);
        assert_eq!(engine.extract_room_type_and_offer("Do you have a deluxe room?"), None);
        assert_eq!(engine.extract_room_type_and_offer(""), None);
    }

    #[test]
    fn full_price_offer_accepts_at_base() {
        let outcome = engine().negotiate(RoomType::Standard, dec(50), "none", 0.70);
        assert_eq!(outcome.decision, Decision::Accept);
        assert_eq!(outcome.final_price, Some(dec(50)));
        assert!(outcome.add_ons.is_empty());
    }

    #[test]
    fn overpayment_never_upsells_beyond_base() {
        let outcome = engine().negotiate(RoomType::Standard, dec(90), "none", 0.90);
        assert_eq!(outcome.decision, Decision::Accept);
        assert_eq!(outcome.final_price, Some(dec(50)));
    }

    #[test]
    fn offer_above_floor_and_max_offer_is_accepted_as_is() {
        // Tier 2: max_offer = 50 * 0.80 = 40.
        let outcome = engine().negotiate(RoomType::Standard, dec(48), "none", 0.50);
        assert_eq!(outcome.decision, Decision::Accept);
        assert_eq!(outcome.final_price, Some(dec(48)));
    }

    #[test]
    fn low_occupancy_sweetens_instead_of_countering() {
        // 36 > min(35) with tier 2: the add-on branch must win even though
        // the plain counter guard (>= min) also holds.
        let outcome = engine().negotiate(RoomType::Standard, dec(36), "none", 0.50);
        assert_eq!(outcome.decision, Decision::CounterWithAddons);
        assert_eq!(outcome.final_price, Some(dec(36)));
        assert_eq!(outcome.add_ons, vec![AddOn::Breakfast, AddOn::LateCheckout]);
        assert!(outcome.message.contains("$18"));
    }

    #[test]
    fn floor_offer_gets_a_capped_counter() {
        // Exactly at the floor (not above), tier 2: counter = min(35+15, 40).
        let outcome = engine().negotiate(RoomType::Standard, dec(35), "none", 0.50);
        assert_eq!(outcome.decision, Decision::Counter);
        assert_eq!(outcome.counter_price, Some(dec(40)));
        assert_eq!(outcome.final_price, None);
        assert_eq!(outcome.quoted_price(), Some(dec(40)));
    }

    #[test]
    fn counter_is_offer_plus_fifteen_when_below_cap() {
        // Tier 3: max_offer = 80 * 0.90 = 72; 61 + 15 = 76 caps at 72.
        let outcome = engine().negotiate(RoomType::Deluxe, dec(61), "none", 0.70);
        assert_eq!(outcome.decision, Decision::Counter);
        assert_eq!(outcome.counter_price, Some(dec(72)));
    }

    #[test]
    fn critical_low_occupancy_floors_with_rich_addons() {
        let outcome = engine().negotiate(RoomType::Standard, dec(30), "none", 0.247);
        assert_eq!(outcome.decision, Decision::CounterWithAddons);
        assert_eq!(outcome.final_price, Some(dec(35)));
        assert_eq!(outcome.add_ons, vec![AddOn::Breakfast, AddOn::CookingClass, AddOn::Bicycle]);
        assert!(outcome.message.contains("$33"));
    }

    #[test]
    fn lowball_at_healthy_occupancy_is_rejected_quoting_best_rate() {
        let outcome = engine().negotiate(RoomType::Standard, dec(20), "none", 0.70);
        assert_eq!(outcome.decision, Decision::Reject);
        assert_eq!(outcome.final_price, None);
        assert!(outcome.message.contains("$45"));
    }

    #[test]
    fn loyalty_discount_lowers_the_max_offer() {
        // Tier 3 with returning status: max_offer = 50 * (1 - .10 - .10) = 40.
        let outcome = engine().negotiate(RoomType::Standard, dec(42), "returning", 0.70);
        assert_eq!(outcome.decision, Decision::Accept);
        assert_eq!(outcome.final_price, Some(dec(42)));
    }

    #[test]
    fn unknown_loyalty_status_gets_no_discount() {
        let card = RateCard::default();
        assert_eq!(card.loyalty_discount("none"), Decimal::ZERO);
        assert_eq!(card.loyalty_discount("platinum"), Decimal::ZERO);
        assert_eq!(card.loyalty_discount("Long_Stay"), Decimal::new(15, 2));
    }

    #[test]
    fn missing_rate_table_entry_is_an_error_decision() {
        let card = RateCard {
            base_prices: vec![(RoomType::Standard, Decimal::from(50))],
            minimum_prices: vec![(RoomType::Standard, Decimal::from(35))],
            ..RateCard::default()
        };
        let outcome =
            NegotiationEngine::new(card).negotiate(RoomType::Family, dec(100), "none", 0.50);
        assert_eq!(outcome.decision, Decision::Error);
        assert!(outcome.message.contains("Invalid room type"));
    }

    #[test]
    fn acceptance_and_abandonment_phrase_lists() {
        assert!(is_acceptance("ok, deal"));
        assert!(is_acceptance("yes please book it"));
        assert!(is_abandonment("forget it"));
        assert!(is_abandonment("please cancel that"));
        assert!(!is_abandonment("what about breakfast"));
    }

    #[test]
    fn rounds_only_move_forward() {
        let mut state = NegotiationState::default();
        assert_eq!(state.begin_round(), 1);
        assert_eq!(state.begin_round(), 2);
        assert_eq!(state.round, 2);
    }

    #[test]
    fn inactive_negotiation_cannot_close_with_a_verdict() {
        let mut state = NegotiationState::default();
        let error = state.transition_to(NegotiationStatus::Accepted).expect_err("must fail");
        assert!(matches!(
            error,
            crate::errors::DomainError::InvalidNegotiationTransition { .. }
        ));

        state.transition_to(NegotiationStatus::Active).expect("inactive -> active");
        state.transition_to(NegotiationStatus::Accepted).expect("active -> accepted");
        assert!(state.status.is_terminal());
    }

    #[test]
    fn fresh_offer_may_reopen_a_closed_negotiation() {
        let mut state = NegotiationState::default();
        state.transition_to(NegotiationStatus::Active).expect("open");
        state.transition_to(NegotiationStatus::Rejected).expect("close");
        state.transition_to(NegotiationStatus::Active).expect("reopen");
        assert!(state.is_active());
    }
}
