//! Repair the common ways a model gets the config shape wrong
//!
//! Rules run in a fixed order; later rules rely on what earlier ones
//! guarantee (the edition pass assumes all three lists are arrays).
//! Nothing here fails. Values that cannot be repaired are left as they are
//! for the validator to report.

use serde_json::{Map, Value};
use tracing::debug;

use crate::core::model::{ConstraintList, Deck, Edition, Stake, DEFAULT_AUTHOR};

/// Normalize a recovered config in place
pub fn normalize(config: &mut Value) {
    let Some(root) = config.as_object_mut() else {
        debug!("config root is not an object; nothing to normalize");
        return;
    };

    ensure_lists(root);
    fill_defaults(root);
    strip_underscores(root, "deck");
    strip_underscores(root, "stake");
    canonicalize_editions(root);
}

/// Rule 1: `must`, `should` and `mustNot` are always arrays
fn ensure_lists(root: &mut Map<String, Value>) {
    for list in ConstraintList::all() {
        let key = list.key();
        if !root.get(key).is_some_and(Value::is_array) {
            debug!(field = key, found = ?root.get(key), "replacing missing or non-array list with []");
            root.insert(key.to_string(), Value::Array(Vec::new()));
        }
    }
}

/// Rule 2: default deck, stake and author when the model left them out
fn fill_defaults(root: &mut Map<String, Value>) {
    let defaults = [
        ("deck", Deck::default().as_str()),
        ("stake", Stake::default().as_str()),
        ("author", DEFAULT_AUTHOR),
    ];

    for (key, default) in defaults {
        if root.get(key).map_or(true, Value::is_null) {
            debug!(field = key, default, "filling default");
            root.insert(key.to_string(), Value::String(default.to_string()));
        }
    }
}

/// Rule 3: `Red_Deck` -> `RedDeck`, `White_Stake` -> `WhiteStake`
fn strip_underscores(root: &mut Map<String, Value>, key: &str) {
    if let Some(Value::String(s)) = root.get_mut(key) {
        if s.contains('_') {
            let stripped = s.replace('_', "");
            debug!(field = key, from = %s, to = %stripped, "stripped underscores");
            *s = stripped;
        }
    }
}

/// Rule 4: case-insensitive edition names get their canonical spelling
fn canonicalize_editions(root: &mut Map<String, Value>) {
    for list in ConstraintList::all() {
        if let Some(Value::Array(items)) = root.get_mut(list.key()) {
            for item in items.iter_mut() {
                canonicalize_edition(item);
            }
        }
    }
}

fn canonicalize_edition(constraint: &mut Value) {
    let Some(obj) = constraint.as_object_mut() else {
        return;
    };

    if let Some(Value::String(raw)) = obj.get_mut("edition") {
        if let Some(edition) = Edition::from_str_loose(raw) {
            if raw.as_str() != edition.as_str() {
                debug!(from = %raw, to = edition.as_str(), "canonicalized edition");
                *raw = edition.as_str().to_string();
            }
        }
    }

    if let Some(Value::Array(clauses)) = obj.get_mut("clauses") {
        for clause in clauses.iter_mut() {
            canonicalize_edition(clause);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn normalized(mut value: Value) -> Value {
        normalize(&mut value);
        value
    }

    #[test]
    fn test_missing_lists_become_empty() {
        let config = normalized(json!({"name": "x"}));
        assert_eq!(config["must"], json!([]));
        assert_eq!(config["should"], json!([]));
        assert_eq!(config["mustNot"], json!([]));
    }

    #[test]
    fn test_null_and_non_array_lists_become_empty() {
        let config = normalized(json!({"must": null, "should": "Blueprint", "mustNot": {"type": "Joker"}}));
        assert_eq!(config["must"], json!([]));
        assert_eq!(config["should"], json!([]));
        assert_eq!(config["mustNot"], json!([]));
    }

    #[test]
    fn test_existing_lists_kept() {
        let config = normalized(json!({"must": [{"type": "Joker", "value": "Blueprint"}]}));
        assert_eq!(config["must"], json!([{"type": "Joker", "value": "Blueprint"}]));
    }

    #[test]
    fn test_defaults_filled() {
        let config = normalized(json!({}));
        assert_eq!(config["deck"], "Red");
        assert_eq!(config["stake"], "White");
        assert_eq!(config["author"], DEFAULT_AUTHOR);
    }

    #[test]
    fn test_defaults_do_not_override() {
        let config = normalized(json!({"deck": "Plasma", "stake": "Gold", "author": "me"}));
        assert_eq!(config["deck"], "Plasma");
        assert_eq!(config["stake"], "Gold");
        assert_eq!(config["author"], "me");
    }

    #[test]
    fn test_underscores_stripped() {
        let config = normalized(json!({"deck": "Red_Deck", "stake": "White_Stake"}));
        assert_eq!(config["deck"], "RedDeck");
        assert_eq!(config["stake"], "WhiteStake");
    }

    #[test]
    fn test_underscores_only_stripped_from_deck_and_stake() {
        let config = normalized(json!({"name": "my_search", "stake": "_Gold_"}));
        assert_eq!(config["name"], "my_search");
        assert_eq!(config["stake"], "Gold");
    }

    #[test]
    fn test_edition_canonicalized() {
        let config = normalized(json!({
            "must": [{"type": "Joker", "edition": "holographic"}],
            "should": [{"type": "Joker", "edition": "NEGATIVE"}],
            "mustNot": [{"type": "Joker", "edition": "foil"}]
        }));
        assert_eq!(config["must"][0]["edition"], "Holographic");
        assert_eq!(config["should"][0]["edition"], "Negative");
        assert_eq!(config["mustNot"][0]["edition"], "Foil");
    }

    #[test]
    fn test_unknown_edition_left_alone() {
        let config = normalized(json!({
            "must": [{"type": "Joker", "edition": "Not_A_Real_Edition"}, {"type": "Joker", "edition": 3}]
        }));
        assert_eq!(config["must"][0]["edition"], "Not_A_Real_Edition");
        assert_eq!(config["must"][1]["edition"], 3);
    }

    #[test]
    fn test_edition_in_clauses() {
        let config = normalized(json!({
            "must": [{"type": "And", "clauses": [{"type": "Joker", "edition": "polychrome"}]}]
        }));
        assert_eq!(config["must"][0]["clauses"][0]["edition"], "Polychrome");
    }

    #[test]
    fn test_non_object_root_untouched() {
        assert_eq!(normalized(json!([1, 2])), json!([1, 2]));
    }

    #[test]
    fn test_idempotent() {
        let once = normalized(json!({"deck": "Red_Deck", "must": [{"type": "Joker", "edition": "foil"}]}));
        let twice = normalized(once.clone());
        assert_eq!(once, twice);
    }
}
