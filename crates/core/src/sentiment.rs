//! Lexical sentiment scoring and complaint/severity detection.
//!
//! The scorer is a pure function of the utterance: weighted word lexicons,
//! negation-phrase handling, and punctuation intensity modifiers. There is no
//! tokenization, only case-insensitive substring containment, which keeps the
//! behavior predictable for short conversational messages (and catches common
//! misspellings listed in the lexicon).

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SentimentLabel {
    Positive,
    Neutral,
    Negative,
    Angry,
}

/// Issue severity buckets, declared in detection priority order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Critical,
    Severe,
    Moderate,
    Minor,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::Severe => "severe",
            Self::Moderate => "moderate",
            Self::Minor => "minor",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SentimentResult {
    pub label: SentimentLabel,
    pub score: f64,
}

impl SentimentResult {
    pub fn neutral() -> Self {
        Self { label: SentimentLabel::Neutral, score: 0.0 }
    }
}

/// Fixed word/phrase tables driving the scorer. Injected at construction so
/// tests (and future properties) can carry their own tables; `Default` is the
/// production lexicon.
#[derive(Clone, Debug)]
pub struct SentimentLexicon {
    pub positive_words: Vec<(String, f64)>,
    pub negative_words: Vec<(String, f64)>,
    pub negation_phrases: Vec<String>,
    pub complaint_phrases: Vec<String>,
    pub severity_groups: Vec<(Severity, Vec<String>)>,
}

fn weighted(entries: &[(&str, f64)]) -> Vec<(String, f64)> {
    entries.iter().map(|(word, weight)| ((*word).to_string(), *weight)).collect()
}

fn phrases(entries: &[&str]) -> Vec<String> {
    entries.iter().map(|phrase| (*phrase).to_string()).collect()
}

impl Default for SentimentLexicon {
    fn default() -> Self {
        Self {
            positive_words: weighted(&[
                ("great", 2.0),
                ("wonderful", 2.0),
                ("excellent", 2.0),
                ("amazing", 2.0),
                ("good", 1.0),
                ("nice", 1.0),
                ("happy", 1.0),
                ("satisfied", 1.0),
                ("perfect", 2.0),
                ("fantastic", 2.0),
                ("lovely", 1.0),
                ("beautiful", 1.0),
                ("enjoyed", 1.0),
                ("love", 2.0),
                ("best", 2.0),
                ("recommend", 1.0),
                ("thank", 1.0),
            ]),
            negative_words: weighted(&[
                ("terrible", -2.0),
                ("horrible", -2.0),
                ("awful", -2.0),
                ("disgusting", -2.0),
                ("broken", -1.0),
                ("rude", -1.0),
                ("disappointed", -1.0),
                ("angry", -2.0),
                ("frustrated", -1.0),
                ("dirty", -1.0),
                ("cold", -1.0),
                ("loud", -1.0),
                ("bad", -1.0),
                ("worst", -2.0),
                ("hate", -2.0),
                ("ruined", -2.0),
                // Common misspellings seen in real guest messages.
                ("dissapointed", -1.0),
                ("dissappointed", -1.0),
                ("disapointed", -1.0),
                ("fustrated", -1.0),
                ("frustarted", -1.0),
                ("unhappy", -1.0),
                ("upset", -1.0),
                ("annoyed", -1.0),
                ("irritated", -1.0),
                ("poor", -1.0),
                ("wrong", -1.0),
                ("fail", -1.0),
                ("failed", -1.0),
                ("unacceptable", -2.0),
                ("ridiculous", -1.0),
                ("pathetic", -2.0),
                ("unsatisfied", -1.0),
                ("dissatisfied", -1.0),
            ]),
            negation_phrases: phrases(&[
                "not satisfied",
                "not happy",
                "not good",
                "not great",
                "not nice",
                "not pleased",
                "not impressed",
                "not recommend",
                "don't like",
                "didn't like",
                "doesn't work",
                "didn't work",
                "wasn't good",
                "weren't good",
                "isn't good",
                "aren't good",
                "never again",
                "won't return",
                "won't come back",
                "not worth",
            ]),
            complaint_phrases: phrases(&[
                "broken",
                "doesn't work",
                "not working",
                "issue",
                "problem",
                "dirty",
                "rude",
                "disappointed",
                "angry",
                "complaint",
                "refund",
                "compensation",
                "fix",
                "manager",
                "not satisfied",
                "dissatisfied",
                "unsatisfied",
                "unhappy",
                "dissapointed",
                "dissappointed",
                "disapointed",
                "poor service",
                "bad service",
                "terrible",
                "horrible",
                "awful",
                "unacceptable",
                "ridiculous",
                "worst",
                "never again",
                "want to speak",
                "speak to manager",
                "very disappointed",
                "not happy",
                "upset",
                "frustrated",
                "annoyed",
            ]),
            severity_groups: vec![
                (
                    Severity::Critical,
                    phrases(&["security", "theft", "health", "emergency", "poisoning", "attack"]),
                ),
                (
                    Severity::Severe,
                    phrases(&["broken", "damaged", "unsafe", "rude", "misconduct", "unacceptable"]),
                ),
                (
                    Severity::Moderate,
                    phrases(&[
                        "dirty",
                        "issue",
                        "problem",
                        "noise",
                        "not ready",
                        "dissatisfied",
                        "unsatisfied",
                    ]),
                ),
                (Severity::Minor, phrases(&["small", "minor", "light", "forgot"])),
            ],
        }
    }
}

#[derive(Clone, Debug)]
pub struct SentimentAnalyzer {
    lexicon: SentimentLexicon,
}

impl Default for SentimentAnalyzer {
    fn default() -> Self {
        Self::new(SentimentLexicon::default())
    }
}

impl SentimentAnalyzer {
    pub fn new(lexicon: SentimentLexicon) -> Self {
        Self { lexicon }
    }

    /// Score one utterance. Always returns a result; the empty string is
    /// neutral with score 0.
    ///
    /// A matched negation phrase subtracts a fixed 1.5 and suppresses all
    /// positive-word scoring for the utterance. Negative words still count
    /// even inside a negated-positive phrase ("not disappointed" matches
    /// "disappointed") - a quirk of the original tables that is preserved
    /// deliberately and pinned by tests.
    pub fn analyze(&self, text: &str) -> SentimentResult {
        let lower = text.to_lowercase();
        let mut score = 0.0_f64;

        let mut negation_found = false;
        for phrase in &self.lexicon.negation_phrases {
            if lower.contains(phrase.as_str()) {
                score -= 1.5;
                negation_found = true;
            }
        }

        for (word, weight) in &self.lexicon.negative_words {
            if lower.contains(word.as_str()) {
                score += weight;
            }
        }

        if !negation_found {
            for (word, weight) in &self.lexicon.positive_words {
                if lower.contains(word.as_str()) {
                    score += weight;
                }
            }
        }

        // Intensity markers: exclamations amplify, a question softens a
        // negative total (a question is a weaker negative statement).
        if text.contains('!') {
            if score < 0.0 {
                score *= 1.3;
            } else {
                score *= 1.2;
            }
        }
        if text.contains('?') && score < 0.0 {
            score *= 0.7;
        }

        if score >= 1.0 {
            SentimentResult { label: SentimentLabel::Positive, score: score.min(2.0) }
        } else if score <= -1.5 {
            SentimentResult { label: SentimentLabel::Angry, score: score.max(-2.0) }
        } else if score < -0.5 {
            SentimentResult { label: SentimentLabel::Negative, score }
        } else {
            SentimentResult { label: SentimentLabel::Neutral, score }
        }
    }

    /// Fixed-phrase complaint check, independent of `analyze`.
    pub fn is_complaint(&self, text: &str) -> bool {
        let lower = text.to_lowercase();
        self.lexicon.complaint_phrases.iter().any(|phrase| lower.contains(phrase.as_str()))
    }

    /// First matching severity group wins, checked critical > severe >
    /// moderate > minor. Defaults to `Minor`.
    pub fn severity(&self, text: &str) -> Severity {
        let lower = text.to_lowercase();
        for (severity, keywords) in &self.lexicon.severity_groups {
            if keywords.iter().any(|keyword| lower.contains(keyword.as_str())) {
                return *severity;
            }
        }
        Severity::Minor
    }

    /// Retrieval query used to fetch policy snippets for the downstream
    /// complaint/general-info prompts.
    pub fn escalation_query(
        &self,
        sentiment: SentimentLabel,
        is_complaint: bool,
        severity: Severity,
    ) -> &'static str {
        if is_complaint {
            return match severity {
                Severity::Critical => "compensation policies critical issues escalation manager",
                Severity::Severe => "compensation policies resolution severe guest issues",
                Severity::Moderate => "compensation policies moderate complaints",
                Severity::Minor => "compensation policies minor issues vouchers",
            };
        }

        if sentiment == SentimentLabel::Negative {
            return "compensation policies conflict resolution negative feedback";
        }

        "hotel amenities services concierge recommendations"
    }
}

#[cfg(test)]
mod tests {
    use super::{SentimentAnalyzer, SentimentLabel, Severity};

    fn analyzer() -> SentimentAnalyzer {
        SentimentAnalyzer::default()
    }

    #[test]
    fn empty_text_is_neutral() {
        let result = analyzer().analyze("");
        assert_eq!(result.label, SentimentLabel::Neutral);
        assert_eq!(result.score, 0.0);
    }

    #[test]
    fn positive_words_sum_and_clamp() {
        let result = analyzer().analyze("The view was amazing and the breakfast was excellent!");
        assert_eq!(result.label, SentimentLabel::Positive);
        assert_eq!(result.score, 2.0);
    }

    #[test]
    fn negation_suppresses_positive_words() {
        let result = analyzer().analyze("not happy with the great service");
        assert_ne!(result.label, SentimentLabel::Positive);
        assert!(result.score < 0.0);
    }

    #[test]
    fn negation_quirk_counts_literal_negatives() {
        // "not disappointed" still matches the negative word "disappointed"
        // on top of the negation penalty. Known asymmetry, preserved.
        let result = analyzer().analyze("I am not happy but not disappointed either");
        // -1.5 negation penalty plus -1.0 for "disappointed", clamped to -2.0.
        assert_eq!(result.score, -2.0);
        assert_eq!(result.label, SentimentLabel::Angry);
    }

    #[test]
    fn exclamation_amplifies_negative_into_angry() {
        let plain = analyzer().analyze("This is wrong");
        let shouted = analyzer().analyze("This is wrong and dirty!");
        assert_eq!(plain.label, SentimentLabel::Negative);
        assert!((plain.score - (-1.0)).abs() < 1e-9);
        assert_eq!(shouted.label, SentimentLabel::Angry);
        assert_eq!(shouted.score, -2.0);
    }

    #[test]
    fn question_mark_softens_negative() {
        let result = analyzer().analyze("Is the room bad?");
        assert_eq!(result.label, SentimentLabel::Negative);
        assert!((result.score - (-0.7)).abs() < 1e-9);
    }

    #[test]
    fn question_mark_does_not_soften_positive() {
        let result = analyzer().analyze("Was the tour good?");
        assert_eq!(result.score, 1.0);
        assert_eq!(result.label, SentimentLabel::Positive);
    }

    #[test]
    fn misspelled_negatives_still_score() {
        let result = analyzer().analyze("so dissapointed and fustrated");
        assert_eq!(result.label, SentimentLabel::Angry);
    }

    #[test]
    fn complaint_detection_matches_fixed_phrases() {
        let analyzer = analyzer();
        assert!(analyzer.is_complaint("The shower is broken"));
        assert!(analyzer.is_complaint("I want a refund"));
        assert!(analyzer.is_complaint("I want to speak to the manager"));
        assert!(!analyzer.is_complaint("What time is breakfast?"));
    }

    #[test]
    fn severity_priority_order_critical_first() {
        let analyzer = analyzer();
        // "broken" (severe) and "health" (critical) both match; critical wins.
        assert_eq!(analyzer.severity("broken lock is a health emergency"), Severity::Critical);
        assert_eq!(analyzer.severity("the fan is broken"), Severity::Severe);
        assert_eq!(analyzer.severity("there is some noise at night"), Severity::Moderate);
        assert_eq!(analyzer.severity("all fine really"), Severity::Minor);
    }

    #[test]
    fn escalation_query_selects_by_severity_then_sentiment() {
        let analyzer = analyzer();
        assert!(analyzer
            .escalation_query(SentimentLabel::Angry, true, Severity::Critical)
            .contains("critical"));
        assert!(analyzer
            .escalation_query(SentimentLabel::Negative, false, Severity::Minor)
            .contains("conflict resolution"));
        assert!(analyzer
            .escalation_query(SentimentLabel::Neutral, false, Severity::Minor)
            .contains("concierge"));
    }
}
