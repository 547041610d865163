//! Schema introspection
//!
//! Prints the fields and allowed names of the search config, so a person
//! (or a model) can write configs without reading the JSON Schema itself.

use miette::{miette, Result};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::schema::registry::{SchemaRegistry, CONFIG_SCHEMA};

#[derive(clap::Args, Debug)]
pub struct SchemaArgs {
    /// Show raw JSON schema instead of formatted summary
    #[arg(long)]
    pub raw: bool,
}

pub fn run(args: SchemaArgs) -> Result<()> {
    let registry = SchemaRegistry::default();
    let content = registry
        .config_schema()
        .ok_or_else(|| miette!("schema '{}' is not registered", CONFIG_SCHEMA))?;

    if args.raw {
        println!("{}", content);
        return Ok(());
    }

    let schema = registry
        .parsed(CONFIG_SCHEMA)
        .ok_or_else(|| miette!("schema '{}' is not valid JSON", CONFIG_SCHEMA))?;
    print!("{}", summarize(&schema));
    Ok(())
}

/// Formatted summary of the config schema
pub fn summarize(schema: &Value) -> String {
    let mut out = String::new();

    let title = schema["title"].as_str().unwrap_or(CONFIG_SCHEMA);
    let desc = schema["description"].as_str().unwrap_or("");
    out.push_str(&format!("{}\n{}\n", title, "=".repeat(title.len())));
    if !desc.is_empty() {
        out.push_str(&format!("{}\n", desc));
    }

    out.push_str(&fields_section("Fields", schema, schema));
    if let Some(constraint) = schema.pointer("/definitions/constraint") {
        out.push_str(&fields_section("Constraint fields", constraint, schema));
    }
    if let Some(sources) = schema.pointer("/definitions/sources") {
        out.push_str(&fields_section("Source fields", sources, schema));
    }

    out.push_str("\nUse --raw for full JSON schema\n");
    out
}

fn fields_section(heading: &str, object: &Value, root: &Value) -> String {
    let mut out = String::new();
    let Some(props) = object["properties"].as_object() else {
        return out;
    };

    let required: Vec<&str> = object["required"]
        .as_array()
        .map(|arr| arr.iter().filter_map(|v| v.as_str()).collect())
        .unwrap_or_default();

    out.push_str(&format!("\n{}:\n", heading));
    out.push_str(&format!("{:<14} {:<14} {:<5} {}\n", "NAME", "TYPE", "REQ", "DESCRIPTION"));
    out.push_str(&format!("{}\n", "-".repeat(80)));

    // Sort properties for consistent display
    let sorted: BTreeMap<_, _> = props.iter().collect();

    for (name, prop) in &sorted {
        let prop = resolve(prop, root);
        let is_required = if required.contains(&name.as_str()) {
            "yes"
        } else {
            ""
        };
        let prop_desc = prop["description"].as_str().unwrap_or("");
        out.push_str(&format!(
            "{:<14} {:<14} {:<5} {}\n",
            name,
            get_type_str(prop),
            is_required,
            prop_desc
        ));
    }

    let enums: Vec<String> = sorted
        .iter()
        .filter_map(|(name, prop)| {
            let vals: Vec<&str> = resolve(prop, root)["enum"]
                .as_array()?
                .iter()
                .filter_map(|v| v.as_str())
                .collect();
            Some(format!("  {}: {}\n", name, vals.join(", ")))
        })
        .collect();
    if !enums.is_empty() {
        out.push_str("\nAllowed values:\n");
        out.extend(enums);
    }

    out
}

/// Follow a local `$ref` one level
fn resolve<'a>(prop: &'a Value, root: &'a Value) -> &'a Value {
    prop["$ref"]
        .as_str()
        .and_then(|r| r.strip_prefix('#'))
        .and_then(|pointer| root.pointer(pointer))
        .unwrap_or(prop)
}

fn get_type_str(prop: &Value) -> String {
    if prop.get("properties").is_some() {
        return "object".to_string();
    }
    if let Some(t) = prop["type"].as_str() {
        if t == "array" {
            if let Some(items_type) = prop["items"]["type"].as_str() {
                return format!("{}[]", items_type);
            }
            if prop["items"]["$ref"].is_string() {
                return "constraint[]".to_string();
            }
            return "array".to_string();
        }
        return t.to_string();
    }
    "any".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn embedded() -> Value {
        SchemaRegistry::default().parsed(CONFIG_SCHEMA).unwrap()
    }

    #[test]
    fn test_summary_lists_fields_and_enums() {
        let summary = summarize(&embedded());
        assert!(summary.starts_with("Ouija Search Config\n"));
        assert!(summary.contains("mustNot"));
        assert!(summary.contains("constraint[]"));
        assert!(summary.contains("stake: White, Red, Green, Black, Blue, Purple, Orange, Gold"));
        assert!(summary.contains("sticker: None, Eternal, Perishable, Rental"));
        assert!(summary.contains("Source fields:"));
    }

    #[test]
    fn test_type_strings() {
        assert_eq!(get_type_str(&serde_json::json!({"type": "string"})), "string");
        assert_eq!(
            get_type_str(&serde_json::json!({"type": "array", "items": {"type": "integer"}})),
            "integer[]"
        );
        assert_eq!(get_type_str(&serde_json::json!({})), "any");
    }
}
