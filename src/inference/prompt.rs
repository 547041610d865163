//! System instruction for the inference service

use rust_embed::Embed;
use serde::Serialize;
use tera::{Context, Tera};
use thiserror::Error;

use crate::core::model::{ConstraintType, Deck, Edition, Stake, Sticker};
use crate::inference::knowledge::{KnowledgeBase, KNOWLEDGE_BASE};
use crate::pipeline::enforcer::STICKER_MIN_STAKE;

#[derive(Embed)]
#[folder = "templates/"]
struct EmbeddedTemplates;

const SYSTEM_TEMPLATE: &str = "system_prompt.tera";

/// Errors that can occur while rendering prompts
#[derive(Debug, Error)]
pub enum PromptError {
    #[error("Template not found: {0}")]
    TemplateNotFound(String),

    #[error("Template error: {0}")]
    Tera(#[from] tera::Error),

    #[error("Failed to serialize knowledge base: {0}")]
    Knowledge(#[from] serde_json::Error),
}

#[derive(Serialize)]
struct StickerRule {
    sticker: &'static str,
    stake: &'static str,
}

/// Renders the system instruction from the embedded template
pub struct PromptBuilder {
    tera: Tera,
    knowledge: KnowledgeBase,
}

impl PromptBuilder {
    /// Builder over the embedded template and knowledge base
    pub fn new() -> Result<Self, PromptError> {
        let file = EmbeddedTemplates::get(SYSTEM_TEMPLATE)
            .ok_or_else(|| PromptError::TemplateNotFound(SYSTEM_TEMPLATE.to_string()))?;
        let content = String::from_utf8_lossy(&file.data);
        Self::from_template(&content)
    }

    /// Builder over a caller-supplied template
    pub fn from_template(template: &str) -> Result<Self, PromptError> {
        let mut tera = Tera::default();
        tera.add_raw_template(SYSTEM_TEMPLATE, template)?;
        Ok(Self {
            tera,
            knowledge: KNOWLEDGE_BASE,
        })
    }

    /// The system instruction sent with every request
    pub fn system_prompt(&self) -> Result<String, PromptError> {
        let mut context = Context::new();
        context.insert("decks", &names(Deck::all(), Deck::as_str));
        context.insert("stakes", &names(Stake::all(), Stake::as_str));
        context.insert("editions", &names(Edition::all(), Edition::as_str));
        context.insert("stickers", &names(Sticker::all(), Sticker::as_str));
        context.insert(
            "constraint_types",
            &names(ConstraintType::all(), ConstraintType::as_str),
        );
        context.insert("min_ante", &0);
        context.insert("max_ante", &39);
        context.insert("default_deck", Deck::default().as_str());
        context.insert("default_stake", Stake::default().as_str());
        context.insert("example_item", "OopsAll6s");

        let sticker_rules: Vec<StickerRule> = STICKER_MIN_STAKE
            .iter()
            .map(|(sticker, stake)| StickerRule {
                sticker: sticker.as_str(),
                stake: stake.as_str(),
            })
            .collect();
        context.insert("sticker_rules", &sticker_rules);
        context.insert("knowledge", &serde_json::to_string(&self.knowledge)?);

        Ok(self.tera.render(SYSTEM_TEMPLATE, &context)?)
    }

    /// The user message for a natural-language request
    pub fn user_prompt(&self, request: &str) -> String {
        format!("Generate a config for: {}", request.trim())
    }
}

fn names<T>(all: &[T], name: fn(&T) -> &'static str) -> Vec<&'static str> {
    all.iter().map(name).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_prompt_renders() {
        let prompt = PromptBuilder::new().unwrap().system_prompt().unwrap();
        assert!(prompt.contains("Balatro Seed Oracle"));
        assert!(prompt.contains("Red, Blue, Yellow"));
        assert!(prompt.contains("White, Red, Green, Black, Blue, Purple, Orange, Gold"));
        assert!(prompt.contains("- Perishable stickers only appear from Gold stake up\n"));
        assert!(prompt.contains("- Eternal stickers only appear from Black stake up\n"));
        assert!(prompt.contains("\"OopsAll6s\""));
        assert!(prompt.contains("Return ONLY the JSON config"));
    }

    #[test]
    fn test_knowledge_is_not_escaped() {
        let prompt = PromptBuilder::new().unwrap().system_prompt().unwrap();
        assert!(prompt.contains(r#"{"jokers":[{"name":"GoldenTicket""#));
        assert!(!prompt.contains("&quot;"));
    }

    #[test]
    fn test_user_prompt() {
        let builder = PromptBuilder::new().unwrap();
        assert_eq!(
            builder.user_prompt("  dice joker on Blue deck \n"),
            "Generate a config for: dice joker on Blue deck"
        );
    }

    #[test]
    fn test_custom_template() {
        let builder = PromptBuilder::from_template("decks: {{ decks | length }}").unwrap();
        assert_eq!(builder.system_prompt().unwrap(), "decks: 15");
    }

    #[test]
    fn test_bad_template() {
        assert!(matches!(
            PromptBuilder::from_template("{{ unclosed"),
            Err(PromptError::Tera(_))
        ));
    }
}
