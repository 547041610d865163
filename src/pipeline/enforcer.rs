//! Game rules the schema cannot express
//!
//! Stickers only show up from a certain stake upward. A config that asks for
//! an Eternal joker on White stake can never match, so the stake is raised
//! to the lowest tier where every requested sticker exists.

use serde::Serialize;
use serde_json::Value;
use tracing::info;

use crate::core::model::{ConstraintList, Stake, Sticker};

/// Minimum stake for each sticker. Stickers not listed have no requirement.
pub const STICKER_MIN_STAKE: &[(Sticker, Stake)] = &[
    (Sticker::Eternal, Stake::Black),
    (Sticker::Rental, Stake::Orange),
    (Sticker::Perishable, Stake::Gold),
];

/// Lowest stake on which a sticker can appear, if it needs one
pub fn required_stake(sticker: Sticker) -> Option<Stake> {
    STICKER_MIN_STAKE
        .iter()
        .find(|(s, _)| *s == sticker)
        .map(|(_, stake)| *stake)
}

/// A stake raise applied by [`enforce`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StakeUpgrade {
    /// Stake before the raise, exactly as it was in the config
    pub from: Value,
    pub to: Stake,
    pub sticker: Sticker,
    /// Constraint that asked for the sticker, e.g. `should[1]`
    pub path: String,
}

/// Raise `stake` until every sticker in `must`, `should` and `mustNot` can
/// appear. Never lowers the stake; returns the raises applied, in order.
///
/// A stake that is not a known tier counts as below White, so any sticker
/// requirement replaces it.
pub fn enforce(config: &mut Value) -> Vec<StakeUpgrade> {
    let mut requests = Vec::new();
    for list in ConstraintList::all() {
        if let Some(Value::Array(items)) = config.get(list.key()) {
            for (i, item) in items.iter().enumerate() {
                collect_stickers(item, format!("{}[{}]", list.key(), i), &mut requests);
            }
        }
    }

    let Some(root) = config.as_object_mut() else {
        return Vec::new();
    };

    let mut current: Option<Stake> = root
        .get("stake")
        .and_then(Value::as_str)
        .and_then(|s| s.parse().ok());

    let mut upgrades = Vec::new();
    for (path, sticker) in requests {
        let Some(required) = required_stake(sticker) else {
            continue;
        };
        // None (unknown stake) orders below every Some(tier)
        if current < Some(required) {
            let from = root.get("stake").cloned().unwrap_or(Value::Null);
            info!(
                from = %from,
                to = required.as_str(),
                sticker = sticker.as_str(),
                constraint = %path,
                "raised stake so the requested sticker can appear"
            );
            root.insert("stake".to_string(), Value::String(required.as_str().to_string()));
            current = Some(required);
            upgrades.push(StakeUpgrade {
                from,
                to: required,
                sticker,
                path,
            });
        }
    }

    upgrades
}

/// Stickers requested by a constraint and its nested clauses
fn collect_stickers(constraint: &Value, path: String, out: &mut Vec<(String, Sticker)>) {
    if let Some(sticker) = constraint
        .get("sticker")
        .and_then(Value::as_str)
        .and_then(|s| s.parse::<Sticker>().ok())
    {
        if sticker != Sticker::None {
            out.push((path.clone(), sticker));
        }
    }

    if let Some(Value::Array(clauses)) = constraint.get("clauses") {
        for (i, clause) in clauses.iter().enumerate() {
            collect_stickers(clause, format!("{}.clauses[{}]", path, i), out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config(stake: &str, must: Value) -> Value {
        json!({"name": "x", "deck": "Red", "stake": stake, "must": must, "should": [], "mustNot": []})
    }

    #[test]
    fn test_table() {
        assert_eq!(required_stake(Sticker::Eternal), Some(Stake::Black));
        assert_eq!(required_stake(Sticker::Rental), Some(Stake::Orange));
        assert_eq!(required_stake(Sticker::Perishable), Some(Stake::Gold));
        assert_eq!(required_stake(Sticker::None), None);
        assert_eq!(Stake::Black.index(), 3);
        assert_eq!(Stake::Orange.index(), 6);
        assert_eq!(Stake::Gold.index(), 7);
    }

    #[test]
    fn test_perishable_forces_gold() {
        let mut value = config("White", json!([{"type": "Joker", "value": "Blueprint", "sticker": "Perishable"}]));
        let upgrades = enforce(&mut value);
        assert_eq!(value["stake"], "Gold");
        assert_eq!(upgrades.len(), 1);
        assert_eq!(upgrades[0].from, json!("White"));
        assert_eq!(upgrades[0].to, Stake::Gold);
        assert_eq!(upgrades[0].sticker, Sticker::Perishable);
        assert_eq!(upgrades[0].path, "must[0]");
    }

    #[test]
    fn test_eternal_raises_to_exactly_black() {
        for stake in ["White", "Red", "Green"] {
            let mut value = config(stake, json!([{"type": "Joker", "sticker": "Eternal"}]));
            enforce(&mut value);
            assert_eq!(value["stake"], "Black", "from {}", stake);
        }
    }

    #[test]
    fn test_never_downgrades() {
        for stake in ["Black", "Blue", "Purple", "Orange", "Gold"] {
            let mut value = config(stake, json!([{"type": "Joker", "sticker": "Eternal"}]));
            let upgrades = enforce(&mut value);
            assert_eq!(value["stake"], stake);
            assert!(upgrades.is_empty());
        }
    }

    #[test]
    fn test_takes_maximum_across_lists() {
        let mut value = json!({
            "stake": "White",
            "must": [{"type": "Joker", "sticker": "Eternal"}],
            "should": [{"type": "Joker", "sticker": "Perishable"}],
            "mustNot": [{"type": "Joker", "sticker": "Rental"}]
        });
        let upgrades = enforce(&mut value);
        assert_eq!(value["stake"], "Gold");
        // Eternal -> Black, then Perishable -> Gold; the later Rental must not undo it
        assert_eq!(upgrades.len(), 2);
        assert_eq!(upgrades[1].from, json!("Black"));
    }

    #[test]
    fn test_must_not_sticker_still_counts() {
        let mut value = json!({"stake": "White", "must": [], "should": [], "mustNot": [{"type": "Joker", "sticker": "Rental"}]});
        enforce(&mut value);
        assert_eq!(value["stake"], "Orange");
    }

    #[test]
    fn test_idempotent() {
        let mut value = json!({
            "stake": "Red",
            "must": [{"type": "Joker", "sticker": "Rental"}],
            "should": [{"type": "Joker", "sticker": "Eternal"}],
            "mustNot": []
        });
        enforce(&mut value);
        let once = value.clone();
        let second = enforce(&mut value);
        assert_eq!(value, once);
        assert!(second.is_empty());
    }

    #[test]
    fn test_unknown_stake_is_replaced() {
        let mut value = config("WhiteStake", json!([{"type": "Joker", "sticker": "Eternal"}]));
        let upgrades = enforce(&mut value);
        assert_eq!(value["stake"], "Black");
        assert_eq!(upgrades[0].from, json!("WhiteStake"));
    }

    #[test]
    fn test_unknown_stake_without_stickers_untouched() {
        let mut value = config("WhiteStake", json!([{"type": "Joker", "sticker": "None"}]));
        assert!(enforce(&mut value).is_empty());
        assert_eq!(value["stake"], "WhiteStake");
    }

    #[test]
    fn test_unknown_sticker_ignored() {
        let mut value = config("White", json!([{"type": "Joker", "sticker": "eternal"}, {"type": "Joker", "sticker": 7}]));
        assert!(enforce(&mut value).is_empty());
        assert_eq!(value["stake"], "White");
    }

    #[test]
    fn test_nested_clause_sticker() {
        let mut value = config(
            "White",
            json!([{"type": "Or", "clauses": [{"type": "Joker"}, {"type": "Joker", "sticker": "Rental"}]}]),
        );
        let upgrades = enforce(&mut value);
        assert_eq!(value["stake"], "Orange");
        assert_eq!(upgrades[0].path, "must[0].clauses[1]");
    }

    #[test]
    fn test_non_object_root() {
        let mut value = json!("just a string");
        assert!(enforce(&mut value).is_empty());
    }
}
