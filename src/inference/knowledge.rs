//! Static knowledge base handed to the model
//!
//! Slang resolution is the model's job; this table is only prompt material.
//! The pipeline never looks anything up here.

use serde::Serialize;

/// A joker the model should know by name
#[derive(Debug, Clone, Copy, Serialize)]
pub struct JokerEntry {
    pub name: &'static str,
    pub tags: &'static [&'static str],
    #[serde(skip_serializing_if = "is_empty")]
    pub slang: &'static [&'static str],
    #[serde(skip_serializing_if = "is_empty")]
    pub requires: &'static [&'static str],
}

fn is_empty(items: &&'static [&'static str]) -> bool {
    items.is_empty()
}

/// A tarot card the model should know by name
#[derive(Debug, Clone, Copy, Serialize)]
pub struct TarotEntry {
    pub name: &'static str,
    pub tags: &'static [&'static str],
}

/// Slang term and the items it stands for
#[derive(Debug, Clone, Copy, Serialize)]
pub struct SlangEntry {
    pub term: &'static str,
    pub items: &'static [&'static str],
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct KnowledgeBase {
    pub jokers: &'static [JokerEntry],
    pub tarots: &'static [TarotEntry],
    pub slang: &'static [SlangEntry],
}

const ECONOMY: &[&str] = &["GoldenTicket", "BusinessCard", "CouponBook", "Rocket"];

pub const KNOWLEDGE_BASE: KnowledgeBase = KnowledgeBase {
    jokers: &[
        JokerEntry {
            name: "GoldenTicket",
            tags: &["economy", "gold"],
            slang: &[],
            requires: &["TheDevil"],
        },
        JokerEntry {
            name: "BusinessCard",
            tags: &["economy"],
            slang: &["money joker"],
            requires: &[],
        },
        JokerEntry {
            name: "CouponBook",
            tags: &["economy"],
            slang: &["coupon"],
            requires: &[],
        },
        JokerEntry {
            name: "Rocket",
            tags: &["economy"],
            slang: &["money rocket"],
            requires: &[],
        },
        JokerEntry {
            name: "OopsAll6s",
            tags: &["luck", "dice"],
            slang: &["dice", "lucky joker"],
            requires: &[],
        },
        JokerEntry {
            name: "Vagabond",
            tags: &["tarot"],
            slang: &["tarot joker"],
            requires: &[],
        },
        JokerEntry {
            name: "RideTheBus",
            tags: &["mult"],
            slang: &["bus"],
            requires: &[],
        },
        JokerEntry {
            name: "LoyaltyCard",
            tags: &["mult"],
            slang: &["loyalty"],
            requires: &[],
        },
        JokerEntry {
            name: "WeeJoker",
            tags: &["mult"],
            slang: &["wee", "small joker"],
            requires: &[],
        },
        JokerEntry {
            name: "Blueprint",
            tags: &["copy"],
            slang: &["copier", "blueprint"],
            requires: &[],
        },
        JokerEntry {
            name: "Brainstorm",
            tags: &["copy"],
            slang: &["brain"],
            requires: &[],
        },
        JokerEntry {
            name: "BaseballCard",
            tags: &["uncommon"],
            slang: &["baseball"],
            requires: &[],
        },
    ],
    tarots: &[
        TarotEntry {
            name: "TheDevil",
            tags: &["enhancement", "gold"],
        },
        TarotEntry {
            name: "TheWorld",
            tags: &["enhancement", "planet"],
        },
        TarotEntry {
            name: "TheFool",
            tags: &["copy"],
        },
    ],
    slang: &[
        SlangEntry {
            term: "dice",
            items: &["OopsAll6s"],
        },
        SlangEntry {
            term: "lucky",
            items: &["OopsAll6s"],
        },
        SlangEntry {
            term: "money",
            items: &["GoldenTicket", "BusinessCard", "CouponBook"],
        },
        SlangEntry {
            term: "econ",
            items: ECONOMY,
        },
        SlangEntry {
            term: "economy",
            items: ECONOMY,
        },
        SlangEntry {
            term: "wee",
            items: &["WeeJoker"],
        },
        SlangEntry {
            term: "bus",
            items: &["RideTheBus"],
        },
        SlangEntry {
            term: "blueprint",
            items: &["Blueprint"],
        },
        SlangEntry {
            term: "copier",
            items: &["Blueprint"],
        },
        SlangEntry {
            term: "brain",
            items: &["Brainstorm"],
        },
    ],
};

impl KnowledgeBase {
    /// Items a slang term stands for (case-insensitive)
    pub fn resolve(&self, term: &str) -> &'static [&'static str] {
        self.slang
            .iter()
            .find(|s| s.term.eq_ignore_ascii_case(term))
            .map(|s| s.items)
            .unwrap_or_default()
    }

    /// Every item name the knowledge base mentions
    pub fn item_names(&self) -> impl Iterator<Item = &'static str> {
        let jokers = self.jokers.iter().map(|j| j.name);
        let tarots = self.tarots.iter().map(|t| t.name);
        jokers.chain(tarots)
    }
}
