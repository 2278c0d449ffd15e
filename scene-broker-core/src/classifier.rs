//! Action Classifier
//!
//! Maps a free-text prompt onto one of the five scene actions by keyword.
//! Deterministic and local: no model call is made to decide the category.
//! Synonyms outside the keyword table are not recognized.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::schema::CommandKind;

/// Category a prompt can be classified into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Spawn,
    Move,
    Replace,
    Rotate,
    Remove,
}

impl Action {
    /// Fixed priority order used when testing a token.
    pub const ALL: [Action; 5] = [
        Action::Spawn,
        Action::Move,
        Action::Replace,
        Action::Rotate,
        Action::Remove,
    ];

    /// Trigger words for this category.
    pub fn keywords(&self) -> &'static [&'static str] {
        match self {
            Action::Spawn => &["spawn", "insert", "add", "put", "place"],
            Action::Move => &["move", "push", "displace", "offset"],
            Action::Replace => &["replace", "substitute"],
            Action::Rotate => &["rotate", "tilt", "turn"],
            Action::Remove => &["remove", "delete", "banish"],
        }
    }

    /// Capitalized name used in user-facing messages.
    pub fn label(&self) -> &'static str {
        match self {
            Action::Spawn => "Spawn",
            Action::Move => "Move",
            Action::Replace => "Replace",
            Action::Rotate => "Rotate",
            Action::Remove => "Remove",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl From<Action> for CommandKind {
    fn from(action: Action) -> Self {
        match action {
            Action::Spawn => CommandKind::Spawn,
            Action::Move => CommandKind::Move,
            Action::Replace => CommandKind::Replace,
            Action::Rotate => CommandKind::Rotate,
            Action::Remove => CommandKind::Remove,
        }
    }
}

/// Outcome of classifying a prompt. `tokens` is kept so the validator can
/// run its positional heuristics without re-tokenizing.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub matched: bool,
    pub action: Option<Action>,
    pub tokens: Vec<String>,
}

const EDGE_PUNCTUATION: &[char] = &['.', ',', ';', ':', '!', '?', '"', '\''];

/// Lower-case, split on whitespace, and strip sentence punctuation from the
/// edges of each token. Interior characters (underscores, digits) survive.
pub fn tokenize(prompt: &str) -> Vec<String> {
    prompt
        .to_lowercase()
        .split_whitespace()
        .map(|t| t.trim_matches(EDGE_PUNCTUATION))
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// First category whose keyword set contains a token, scanning tokens left
/// to right.
pub fn classify_tokens(tokens: &[String]) -> Option<Action> {
    tokens.iter().find_map(|token| {
        Action::ALL
            .into_iter()
            .find(|action| action.keywords().contains(&token.as_str()))
    })
}

pub fn classify(prompt: &str) -> Classification {
    let tokens = tokenize(prompt);
    let action = classify_tokens(&tokens);
    tracing::debug!(?action, token_count = tokens.len(), "Classified prompt");
    Classification {
        matched: action.is_some(),
        action,
        tokens,
    }
}

/// Cheap pre-check: does the prompt mention any action keyword at all?
pub fn has_action_keyword(prompt: &str) -> bool {
    classify_tokens(&tokenize(prompt)).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_strips_edge_punctuation() {
        assert_eq!(
            tokenize("Spawn a turbine_blade next to the engine_stand."),
            vec!["spawn", "a", "turbine_blade", "next", "to", "the", "engine_stand"]
        );
        assert_eq!(tokenize("  \"Move\"   it, now!  "), vec!["move", "it", "now"]);
    }

    #[test]
    fn test_spawn_keywords_classify_regardless_of_context() {
        for prompt in [
            "spawn a wrench",
            "please insert the crate somewhere",
            "could you ADD a bolt",
            "put it here",
            "the blade, place it left",
        ] {
            let c = classify(prompt);
            assert!(c.matched, "{prompt}");
            assert_eq!(c.action, Some(Action::Spawn), "{prompt}");
        }
    }

    #[test]
    fn test_first_keyword_wins() {
        assert_eq!(classify("rotate then move the crate").action, Some(Action::Rotate));
        assert_eq!(classify("move then rotate the crate").action, Some(Action::Move));
    }

    #[test]
    fn test_each_category() {
        assert_eq!(classify("Displace the bench").action, Some(Action::Move));
        assert_eq!(classify("substitute the bench").action, Some(Action::Replace));
        assert_eq!(classify("tilt the wing 30 x").action, Some(Action::Rotate));
        assert_eq!(classify("banish the gremlin").action, Some(Action::Remove));
    }

    #[test]
    fn test_no_match() {
        let c = classify("make the engine shiny");
        assert!(!c.matched);
        assert_eq!(c.action, None);
        assert!(!has_action_keyword("make the engine shiny"));
        // Keywords only match whole tokens.
        assert!(!has_action_keyword("the address label"));
    }

    #[test]
    fn test_action_converts_to_command_kind() {
        assert_eq!(CommandKind::from(Action::Remove), CommandKind::Remove);
    }
}
