//! Typed view of a search config: decks, stakes, editions, stickers and constraints
//!
//! The pipeline works on untyped JSON because model output can be wrong in
//! any way imaginable. Once a config validates, it can be lifted into
//! [`SearchConfig`] for code that wants real types.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Placeholder written into `author` when the model leaves it out
pub const DEFAULT_AUTHOR: &str = "OuijaGenie";

/// Implements `Display` and `FromStr` (exact, case-sensitive) on top of
/// the enum's `as_str()` and `all()`.
macro_rules! impl_named {
    ($ty:ident, $kind:literal) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = ModelParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::all()
                    .iter()
                    .copied()
                    .find(|v| v.as_str() == s)
                    .ok_or_else(|| ModelParseError::Unknown {
                        kind: $kind,
                        value: s.to_string(),
                    })
            }
        }
    };
}

/// Starting deck
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Deck {
    #[default]
    Red,
    Blue,
    Yellow,
    Green,
    Black,
    Magic,
    Nebula,
    Ghost,
    Abandoned,
    Checkered,
    Zodiac,
    Painted,
    Anaglyph,
    Plasma,
    Erratic,
}

impl Deck {
    pub fn as_str(&self) -> &'static str {
        match self {
            Deck::Red => "Red",
            Deck::Blue => "Blue",
            Deck::Yellow => "Yellow",
            Deck::Green => "Green",
            Deck::Black => "Black",
            Deck::Magic => "Magic",
            Deck::Nebula => "Nebula",
            Deck::Ghost => "Ghost",
            Deck::Abandoned => "Abandoned",
            Deck::Checkered => "Checkered",
            Deck::Zodiac => "Zodiac",
            Deck::Painted => "Painted",
            Deck::Anaglyph => "Anaglyph",
            Deck::Plasma => "Plasma",
            Deck::Erratic => "Erratic",
        }
    }

    pub fn all() -> &'static [Deck] {
        &[
            Deck::Red,
            Deck::Blue,
            Deck::Yellow,
            Deck::Green,
            Deck::Black,
            Deck::Magic,
            Deck::Nebula,
            Deck::Ghost,
            Deck::Abandoned,
            Deck::Checkered,
            Deck::Zodiac,
            Deck::Painted,
            Deck::Anaglyph,
            Deck::Plasma,
            Deck::Erratic,
        ]
    }
}

impl_named!(Deck, "deck");

/// Difficulty tier. Declaration order is the game's order, so the derived
/// `Ord` is the tier order: White < Red < ... < Gold.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub enum Stake {
    #[default]
    White,
    Red,
    Green,
    Black,
    Blue,
    Purple,
    Orange,
    Gold,
}

impl Stake {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stake::White => "White",
            Stake::Red => "Red",
            Stake::Green => "Green",
            Stake::Black => "Black",
            Stake::Blue => "Blue",
            Stake::Purple => "Purple",
            Stake::Orange => "Orange",
            Stake::Gold => "Gold",
        }
    }

    /// All tiers, lowest first
    pub fn all() -> &'static [Stake] {
        &[
            Stake::White,
            Stake::Red,
            Stake::Green,
            Stake::Black,
            Stake::Blue,
            Stake::Purple,
            Stake::Orange,
            Stake::Gold,
        ]
    }

    /// Position in the tier list (White = 0, Gold = 7)
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Tier at a given position, if any
    pub fn from_index(index: usize) -> Option<Stake> {
        Self::all().get(index).copied()
    }
}

impl_named!(Stake, "stake");

/// Card finish
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Edition {
    #[default]
    None,
    Foil,
    Holographic,
    Polychrome,
    Negative,
}

impl Edition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Edition::None => "None",
            Edition::Foil => "Foil",
            Edition::Holographic => "Holographic",
            Edition::Polychrome => "Polychrome",
            Edition::Negative => "Negative",
        }
    }

    pub fn all() -> &'static [Edition] {
        &[
            Edition::None,
            Edition::Foil,
            Edition::Holographic,
            Edition::Polychrome,
            Edition::Negative,
        ]
    }

    /// Case-insensitive lookup, used to repair model spelling
    pub fn from_str_loose(s: &str) -> Option<Edition> {
        Self::all()
            .iter()
            .copied()
            .find(|e| e.as_str().eq_ignore_ascii_case(s))
    }
}

impl_named!(Edition, "edition");

/// Special status marker on a joker; each one only appears from some stake up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Sticker {
    #[default]
    None,
    Eternal,
    Perishable,
    Rental,
}

impl Sticker {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sticker::None => "None",
            Sticker::Eternal => "Eternal",
            Sticker::Perishable => "Perishable",
            Sticker::Rental => "Rental",
        }
    }

    pub fn all() -> &'static [Sticker] {
        &[
            Sticker::None,
            Sticker::Eternal,
            Sticker::Perishable,
            Sticker::Rental,
        ]
    }
}

impl_named!(Sticker, "sticker");

/// What a constraint looks for: an item category or a boolean combinator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConstraintType {
    Joker,
    SoulJoker,
    TarotCard,
    PlanetCard,
    SpectralCard,
    SmallBlindTag,
    BigBlindTag,
    Voucher,
    PlayingCard,
    Boss,
    And,
    Or,
}

impl ConstraintType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConstraintType::Joker => "Joker",
            ConstraintType::SoulJoker => "SoulJoker",
            ConstraintType::TarotCard => "TarotCard",
            ConstraintType::PlanetCard => "PlanetCard",
            ConstraintType::SpectralCard => "SpectralCard",
            ConstraintType::SmallBlindTag => "SmallBlindTag",
            ConstraintType::BigBlindTag => "BigBlindTag",
            ConstraintType::Voucher => "Voucher",
            ConstraintType::PlayingCard => "PlayingCard",
            ConstraintType::Boss => "Boss",
            ConstraintType::And => "And",
            ConstraintType::Or => "Or",
        }
    }

    pub fn all() -> &'static [ConstraintType] {
        &[
            ConstraintType::Joker,
            ConstraintType::SoulJoker,
            ConstraintType::TarotCard,
            ConstraintType::PlanetCard,
            ConstraintType::SpectralCard,
            ConstraintType::SmallBlindTag,
            ConstraintType::BigBlindTag,
            ConstraintType::Voucher,
            ConstraintType::PlayingCard,
            ConstraintType::Boss,
            ConstraintType::And,
            ConstraintType::Or,
        ]
    }

    /// True for `And` / `Or`, which carry nested `clauses` instead of an item
    pub fn is_combinator(&self) -> bool {
        matches!(self, ConstraintType::And | ConstraintType::Or)
    }
}

impl_named!(ConstraintType, "constraint type");

/// Which of the three constraint lists a constraint lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstraintList {
    Must,
    Should,
    MustNot,
}

impl ConstraintList {
    /// JSON key of the list
    pub fn key(&self) -> &'static str {
        match self {
            ConstraintList::Must => "must",
            ConstraintList::Should => "should",
            ConstraintList::MustNot => "mustNot",
        }
    }

    pub fn all() -> &'static [ConstraintList] {
        &[
            ConstraintList::Must,
            ConstraintList::Should,
            ConstraintList::MustNot,
        ]
    }
}

/// Where in the shop or in booster packs a condition may be met
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sources {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shop_slots: Option<Vec<u32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pack_slots: Option<Vec<u32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_shop_slot: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_shop_slot: Option<u32>,
}

/// One required, optional or forbidden condition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constraint {
    #[serde(rename = "type")]
    pub kind: ConstraintType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<String>,

    #[serde(default)]
    pub edition: Edition,

    #[serde(default)]
    pub sticker: Sticker,

    /// Rounds in which the condition is checked (0 = before the first blind)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub antes: Vec<u8>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources: Option<Sources>,

    /// Weight added when a `should` constraint matches
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub clauses: Vec<Constraint>,
}

impl Constraint {
    /// Item identifiers this constraint names, whichever field they came in
    pub fn identifiers(&self) -> Vec<&str> {
        self.value
            .iter()
            .map(String::as_str)
            .chain(self.values.iter().map(String::as_str))
            .collect()
    }

    /// This constraint and every nested clause, depth first
    pub fn walk(&self) -> Vec<&Constraint> {
        let mut out = vec![self];
        for clause in &self.clauses {
            out.extend(clause.walk());
        }
        out
    }
}

/// A validated search config
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchConfig {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,

    pub deck: Deck,

    pub stake: Stake,

    pub must: Vec<Constraint>,

    #[serde(default)]
    pub should: Vec<Constraint>,

    #[serde(default)]
    pub must_not: Vec<Constraint>,
}

impl SearchConfig {
    /// Lift a JSON config into typed form
    pub fn from_value(value: &Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value.clone())
    }

    /// Constraints of one list
    pub fn list(&self, list: ConstraintList) -> &[Constraint] {
        match list {
            ConstraintList::Must => &self.must,
            ConstraintList::Should => &self.should,
            ConstraintList::MustNot => &self.must_not,
        }
    }

    /// Every constraint in every list, nested clauses included
    pub fn constraints(&self) -> impl Iterator<Item = &Constraint> {
        ConstraintList::all()
            .iter()
            .flat_map(move |list| self.list(*list).iter())
            .flat_map(|c| c.walk())
    }

    /// Lowest stake at which every requested sticker can appear
    pub fn required_stake(&self) -> Stake {
        self.constraints()
            .filter_map(|c| crate::pipeline::enforcer::required_stake(c.sticker))
            .max()
            .unwrap_or_default()
    }
}

/// Errors that can occur when parsing model names
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelParseError {
    #[error("unknown {kind}: '{value}'")]
    Unknown { kind: &'static str, value: String },
}
