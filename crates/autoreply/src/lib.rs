//! Keyword-triggered canned replies.
//!
//! Rules are data, not code: an ordered table of `(predicate, responses)`
//! loaded from configuration. The first matching rule wins and answers with
//! one of its responses chosen at random: a single-response rule is a plain
//! canned reply, a multi-response rule is a picker.

use {rand::Rng, serde::Deserialize};

/// One reply rule. Matches when the bot is mentioned (if `on_mention`) or
/// when any keyword occurs in the message text.
#[derive(Debug, Clone, Deserialize)]
pub struct ReplyRule {
    #[serde(default)]
    pub keywords: Vec<String>,

    /// Also fire when the bot itself is @mentioned.
    #[serde(default)]
    pub on_mention: bool,

    pub responses: Vec<String>,
}

impl ReplyRule {
    fn matches(&self, text: &str, mentioned: bool) -> bool {
        if self.responses.is_empty() {
            return false;
        }
        if self.on_mention && mentioned {
            return true;
        }
        self.keywords.iter().any(|keyword| text.contains(keyword))
    }
}

/// Ordered rule table; earlier rules shadow later ones.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RuleTable {
    #[serde(default)]
    pub rules: Vec<ReplyRule>,
}

impl RuleTable {
    /// First matching rule's response, chosen at random from that rule's
    /// response set. `None` when nothing matches.
    pub fn respond<R: Rng>(&self, text: &str, mentioned: bool, rng: &mut R) -> Option<&str> {
        let rule = self.rules.iter().find(|rule| rule.matches(text, mentioned))?;
        let index = rng.random_range(0..rule.responses.len());
        Some(rule.responses[index].as_str())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[allow(clippy::unwrap_used)]
#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    fn table() -> RuleTable {
        serde_json::from_str(
            r#"{"rules": [
                {"keywords": ["ping"], "responses": ["pong"]},
                {"keywords": ["draw", "pick"], "on_mention": true,
                 "responses": ["ace", "king", "queen"]},
                {"keywords": ["ping"], "responses": ["shadowed"]}
            ]}"#,
        )
        .unwrap()
    }

    #[test]
    fn first_matching_rule_wins() {
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(table().respond("ping me", false, &mut rng), Some("pong"));
    }

    #[test]
    fn response_is_drawn_from_the_matched_rule_only() {
        let table = table();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let reply = table.respond("pick one", false, &mut rng).unwrap();
            assert!(["ace", "king", "queen"].contains(&reply));
        }
    }

    #[test]
    fn mention_fires_mention_rules() {
        let mut rng = StdRng::seed_from_u64(1);
        let table = table();
        let reply = table.respond("hello there", true, &mut rng).unwrap();
        assert!(["ace", "king", "queen"].contains(&reply));
    }

    #[test]
    fn no_match_yields_nothing() {
        let mut rng = StdRng::seed_from_u64(2);
        assert_eq!(table().respond("quiet words", false, &mut rng), None);
    }

    #[test]
    fn empty_response_sets_never_match() {
        let table: RuleTable =
            serde_json::from_str(r#"{"rules": [{"keywords": ["x"], "responses": []}]}"#).unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(table.respond("x marks", false, &mut rng), None);
    }
}
