//! Precondition Validator
//!
//! Decides whether a classified prompt names enough scene-consistent
//! information to justify the expensive slot-filling call. The object
//! lookups rely on positional heuristics over the token list; each one is a
//! named function below so a better extractor can replace it without
//! touching the per-action rules.
//!
//! When the scene probe fails every lookup fails closed: an object that
//! cannot be confirmed is reported as missing.

use std::sync::Arc;

use crate::classifier::Action;
use crate::probe::{SceneProbe, SceneState};

/// Direction words recognized in free text.
pub const DIRECTION_KEYWORDS: &[&str] = &["left", "right", "front", "back", "top", "bottom"];

/// Axis words recognized in free text.
pub const AXIS_KEYWORDS: &[&str] = &["x", "y", "z"];

pub const LABEL_NEW_PREFAB: &str = "new prefab";
pub const LABEL_REFERENCE_PREFAB: &str = "new reference prefab";
pub const LABEL_OBJECT_TO_REPLACE: &str = "object to replace";
pub const LABEL_DIRECTION: &str = "direction";
pub const LABEL_AXIS: &str = "axis";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationResult {
    Ready,
    Deficient(DeficiencyReport),
}

impl ValidationResult {
    pub fn is_ready(&self) -> bool {
        matches!(self, ValidationResult::Ready)
    }
}

/// Labels for every unmet precondition, in rule order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeficiencyReport {
    pub action: Action,
    pub missing: Vec<&'static str>,
}

impl DeficiencyReport {
    /// `"<Action> Action: Please specify <items> or add one."`
    pub fn message(&self) -> String {
        format!(
            "{} Action: Please specify {} or add one.",
            self.action.label(),
            format_missing_items(&self.missing)
        )
    }
}

/// `[a]` → `a`, `[a, b]` → `a and b`, `[a, b, c]` → `a, b, and c`.
pub fn format_missing_items<S: AsRef<str>>(items: &[S]) -> String {
    match items {
        [] => String::new(),
        [only] => only.as_ref().to_string(),
        [first, second] => format!("{} and {}", first.as_ref(), second.as_ref()),
        [init @ .., last] => {
            let head: Vec<&str> = init.iter().map(AsRef::as_ref).collect();
            format!("{}, and {}", head.join(", "), last.as_ref())
        }
    }
}

// ─── Positional heuristics (best effort) ──────────────────────

/// The token right after the verb: the object for Move, Rotate and Remove.
pub fn primary_object(tokens: &[String]) -> Option<&str> {
    tokens.get(1).map(String::as_str)
}

/// The last token: the spawn anchor, or the incoming prefab for Replace.
pub fn trailing_reference(tokens: &[String]) -> Option<&str> {
    if tokens.len() < 2 {
        return None;
    }
    tokens.last().map(String::as_str)
}

/// Tokens between the verb and the trailing reference that may name the
/// prefab to spawn.
pub fn spawn_prefab_candidates(tokens: &[String]) -> &[String] {
    interior(tokens)
}

/// Tokens between the verb and the trailing reference that may name the
/// object being replaced.
pub fn replaced_object_candidates(tokens: &[String]) -> &[String] {
    interior(tokens)
}

fn interior(tokens: &[String]) -> &[String] {
    if tokens.len() < 3 {
        return &[];
    }
    &tokens[1..tokens.len() - 1]
}

pub fn has_direction_keyword(tokens: &[String]) -> bool {
    tokens.iter().any(|t| DIRECTION_KEYWORDS.contains(&t.as_str()))
}

pub fn has_axis_keyword(tokens: &[String]) -> bool {
    tokens.iter().any(|t| AXIS_KEYWORDS.contains(&t.as_str()))
}

// ─── Rules ────────────────────────────────────────────────────

/// Pure rule evaluation. `scene` is `None` when the probe failed.
pub fn check(action: Action, tokens: &[String], scene: Option<&SceneState>) -> ValidationResult {
    let has_object = |name: Option<&str>| match (scene, name) {
        (Some(s), Some(n)) => s.has_object(n),
        _ => false,
    };
    let has_prefab = |name: Option<&str>| match (scene, name) {
        (Some(s), Some(n)) => s.has_prefab(n),
        _ => false,
    };
    let any_object =
        |candidates: &[String]| candidates.iter().any(|c| has_object(Some(c.as_str())));
    let any_prefab =
        |candidates: &[String]| candidates.iter().any(|c| has_prefab(Some(c.as_str())));

    let mut missing = Vec::new();
    match action {
        Action::Spawn => {
            if !any_prefab(spawn_prefab_candidates(tokens)) {
                missing.push(LABEL_NEW_PREFAB);
            }
            if !has_object(trailing_reference(tokens)) {
                missing.push(LABEL_REFERENCE_PREFAB);
            }
            if !has_direction_keyword(tokens) {
                missing.push(LABEL_DIRECTION);
            }
        }
        Action::Move => {
            if !has_object(primary_object(tokens)) {
                missing.push(LABEL_NEW_PREFAB);
            }
            if !has_direction_keyword(tokens) {
                missing.push(LABEL_DIRECTION);
            }
        }
        Action::Replace => {
            if !any_object(replaced_object_candidates(tokens)) {
                missing.push(LABEL_OBJECT_TO_REPLACE);
            }
            if !has_prefab(trailing_reference(tokens)) {
                missing.push(LABEL_NEW_PREFAB);
            }
        }
        Action::Rotate => {
            if !has_object(primary_object(tokens)) {
                missing.push(LABEL_NEW_PREFAB);
            }
            if !has_axis_keyword(tokens) {
                missing.push(LABEL_AXIS);
            }
        }
        Action::Remove => {
            if !has_object(primary_object(tokens)) {
                missing.push(LABEL_NEW_PREFAB);
            }
        }
    }

    if missing.is_empty() {
        ValidationResult::Ready
    } else {
        ValidationResult::Deficient(DeficiencyReport { action, missing })
    }
}

/// Validator bound to a scene probe.
pub struct PreconditionValidator {
    probe: Arc<dyn SceneProbe>,
}

impl PreconditionValidator {
    pub fn new(probe: Arc<dyn SceneProbe>) -> Self {
        Self { probe }
    }

    pub async fn validate(&self, action: Action, tokens: &[String]) -> ValidationResult {
        let scene = match self.probe.fetch_state().await {
            Ok(state) => Some(state),
            Err(e) => {
                tracing::warn!(%action, "Scene state unavailable, failing closed: {}", e);
                None
            }
        };
        check(action, tokens, scene.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::tokenize;

    fn scene() -> SceneState {
        SceneState::new(
            ["engine_stand", "workbench", "screwdriver"],
            ["turbine_blade", "wrench"],
        )
    }

    #[test]
    fn test_format_missing_items() {
        let empty: [&str; 0] = [];
        assert_eq!(format_missing_items(&empty), "");
        assert_eq!(format_missing_items(&["a"]), "a");
        assert_eq!(format_missing_items(&["a", "b"]), "a and b");
        assert_eq!(format_missing_items(&["a", "b", "c"]), "a, b, and c");
        assert_eq!(format_missing_items(&["a", "b", "c", "d"]), "a, b, c, and d");
    }

    #[test]
    fn test_heuristics() {
        let tokens = tokenize("Spawn a turbine_blade next to the engine_stand");
        assert_eq!(primary_object(&tokens), Some("a"));
        assert_eq!(trailing_reference(&tokens), Some("engine_stand"));
        assert!(spawn_prefab_candidates(&tokens).contains(&"turbine_blade".to_string()));
        assert!(!has_direction_keyword(&tokens));

        let single = tokenize("remove");
        assert_eq!(primary_object(&single), None);
        assert_eq!(trailing_reference(&single), None);
        assert!(spawn_prefab_candidates(&single).is_empty());
    }

    #[test]
    fn test_spawn_without_direction() {
        let tokens = tokenize("Spawn a turbine_blade next to the engine_stand");
        let result = check(Action::Spawn, &tokens, Some(&scene()));
        let ValidationResult::Deficient(report) = result else {
            panic!("Expected Deficient");
        };
        assert_eq!(report.missing, vec!["direction"]);
        assert_eq!(report.message(), "Spawn Action: Please specify direction or add one.");
    }

    #[test]
    fn test_spawn_ready() {
        let tokens = tokenize("Spawn a turbine_blade right of the engine_stand");
        assert_eq!(check(Action::Spawn, &tokens, Some(&scene())), ValidationResult::Ready);
    }

    #[test]
    fn test_spawn_everything_missing() {
        let tokens = tokenize("spawn something somewhere");
        let ValidationResult::Deficient(report) = check(Action::Spawn, &tokens, Some(&scene()))
        else {
            panic!("Expected Deficient");
        };
        assert_eq!(
            report.message(),
            "Spawn Action: Please specify new prefab, new reference prefab, and direction or add one."
        );
    }

    #[test]
    fn test_absent_object_reports_new_prefab_for_move_rotate_remove() {
        for (action, prompt) in [
            (Action::Move, "move ghost left"),
            (Action::Rotate, "rotate ghost 45 x"),
            (Action::Remove, "remove ghost"),
        ] {
            let tokens = tokenize(prompt);
            let ValidationResult::Deficient(report) = check(action, &tokens, Some(&scene())) else {
                panic!("Expected Deficient for {prompt}");
            };
            assert!(report.missing.contains(&LABEL_NEW_PREFAB), "{prompt}");
        }
    }

    #[test]
    fn test_probe_failure_fails_closed() {
        for (action, prompt) in [
            (Action::Move, "move workbench left 3"),
            (Action::Rotate, "rotate screwdriver 45 x"),
            (Action::Remove, "remove workbench"),
        ] {
            let tokens = tokenize(prompt);
            let ValidationResult::Deficient(report) = check(action, &tokens, None) else {
                panic!("Expected Deficient for {prompt}");
            };
            assert_eq!(report.missing, vec![LABEL_NEW_PREFAB], "{prompt}");
        }
    }

    #[test]
    fn test_move_and_rotate_ready() {
        let s = scene();
        assert!(check(Action::Move, &tokenize("move workbench right 3"), Some(&s)).is_ready());
        assert!(check(Action::Rotate, &tokenize("rotate screwdriver 45 degrees x"), Some(&s)).is_ready());
    }

    #[test]
    fn test_rotate_missing_axis() {
        let ValidationResult::Deficient(report) =
            check(Action::Rotate, &tokenize("rotate screwdriver 45"), Some(&scene()))
        else {
            panic!("Expected Deficient");
        };
        assert_eq!(report.message(), "Rotate Action: Please specify axis or add one.");
    }

    #[test]
    fn test_replace_rules() {
        let s = scene();
        assert!(check(Action::Replace, &tokenize("Replace the workbench with wrench"), Some(&s)).is_ready());

        let ValidationResult::Deficient(report) =
            check(Action::Replace, &tokenize("replace the ghost with unicorn"), Some(&s))
        else {
            panic!("Expected Deficient");
        };
        assert_eq!(
            report.message(),
            "Replace Action: Please specify object to replace and new prefab or add one."
        );
    }

    #[tokio::test]
    async fn test_validator_uses_probe() {
        use crate::probe::StaticSceneProbe;

        let validator = PreconditionValidator::new(Arc::new(StaticSceneProbe::new(scene())));
        let result = validator
            .validate(Action::Remove, &tokenize("remove workbench"))
            .await;
        assert!(result.is_ready());
    }
}
