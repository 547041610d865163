//! Rendering pipeline responses for the terminal
//!
//! Machine-readable output goes to stdout. Status lines go to stderr so
//! `ouija parse out.txt | jq .config` keeps working.

use console::style;
use miette::{miette, IntoDiagnostic, Result};
use tabled::{builder::Builder, settings::Style};

use crate::cli::{GlobalOpts, OutputFormat};
use crate::pipeline::{FailureReport, GenerationReport, Response, StakeUpgrade};
use crate::schema::validator::{InvalidConfig, ValidationError, ValidationWarning};

const MAX_VALUE_WIDTH: usize = 32;

/// Print a response in the requested format
pub fn print_response(response: &Response, global: &GlobalOpts) -> Result<()> {
    match global.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string(response).into_diagnostic()?);
        }
        OutputFormat::Pretty => {
            println!("{}", serde_json::to_string_pretty(response).into_diagnostic()?);
        }
        OutputFormat::Table => match response {
            Response::Generated(report) => print!("{}", render_report(report)?),
            Response::Failed(failure) => print!("{}", render_failure(failure)),
        },
    }

    if !global.quiet && global.format != OutputFormat::Table {
        print_status(response);
    }
    Ok(())
}

/// Error out on anything but a valid config
pub fn require_valid(response: &Response) -> Result<()> {
    match response {
        Response::Generated(report) if report.valid => Ok(()),
        Response::Generated(report) => Err(InvalidConfig::new(report.error_list()).into()),
        Response::Failed(failure) => Err(miette!(
            code = "ouija::recovery::failed",
            help = "Re-run the prompt; the raw response is in the output above",
            "{}",
            failure.error
        )),
    }
}

/// One-line verdict on stderr
fn print_status(response: &Response) {
    match response {
        Response::Generated(report) => {
            for upgrade in &report.upgrades {
                eprintln!("{} {}", style("↑").cyan(), describe_upgrade(upgrade));
            }
            if report.valid {
                eprintln!("{} Config is valid", style("✓").green());
            } else {
                eprintln!(
                    "{} Config has {} error(s)",
                    style("✗").red(),
                    style(report.error_list().len()).red()
                );
            }
            if !report.warnings.is_empty() {
                eprintln!(
                    "{} {} warning(s)",
                    style("!").yellow(),
                    style(report.warnings.len()).yellow()
                );
            }
        }
        Response::Failed(failure) => {
            eprintln!("{} {}", style("✗").red(), failure.error);
        }
    }
}

fn describe_upgrade(upgrade: &StakeUpgrade) -> String {
    let from = upgrade
        .from
        .as_str()
        .map(str::to_string)
        .unwrap_or_else(|| upgrade.from.to_string());
    format!(
        "Stake raised {} -> {} ({} sticker at {})",
        from, upgrade.to, upgrade.sticker, upgrade.path
    )
}

fn render_report(report: &GenerationReport) -> Result<String> {
    let mut out = String::new();
    let name = report.config["name"].as_str().unwrap_or("(unnamed)");

    if report.valid {
        out.push_str(&format!("{} {}\n", style("✓").green().bold(), style(name).bold()));
    } else {
        out.push_str(&format!("{} {}\n", style("✗").red().bold(), style(name).bold()));
    }
    for key in ["deck", "stake"] {
        let value = report.config.get(key).map(display_value).unwrap_or_default();
        out.push_str(&format!("  {:<6} {}\n", key, value));
    }

    if !report.upgrades.is_empty() {
        out.push('\n');
        for upgrade in &report.upgrades {
            out.push_str(&format!("{} {}\n", style("↑").cyan(), describe_upgrade(upgrade)));
        }
    }

    if !report.error_list().is_empty() {
        out.push('\n');
        out.push_str(&error_table(report.error_list()));
        out.push('\n');
    }

    if !report.warnings.is_empty() {
        out.push('\n');
        out.push_str(&warning_table(&report.warnings));
        out.push('\n');
    }

    out.push_str(&format!(
        "\n{}\n",
        serde_json::to_string_pretty(&report.config).into_diagnostic()?
    ));
    Ok(out)
}

fn render_failure(failure: &FailureReport) -> String {
    format!(
        "{} {}\n\n{}\n{}\n",
        style("✗").red().bold(),
        failure.error,
        style("Raw response:").dim(),
        failure.raw_response
    )
}

/// Table of violations: path, rule, offending value, message
pub fn error_table(errors: &[ValidationError]) -> String {
    let mut builder = Builder::default();
    builder.push_record(["PATH", "RULE", "VALUE", "MESSAGE"]);
    for error in errors {
        builder.push_record([
            error.path.clone(),
            error.rule.to_string(),
            truncate_str(&display_value(&error.value), MAX_VALUE_WIDTH),
            error.message.clone(),
        ]);
    }
    builder.build().with(Style::rounded()).to_string()
}

fn warning_table(warnings: &[ValidationWarning]) -> String {
    let mut builder = Builder::default();
    builder.push_record(["PATH", "WARNING"]);
    for warning in warnings {
        builder.push_record([warning.path.as_str(), warning.message.as_str()]);
    }
    builder.build().with(Style::rounded()).to_string()
}

/// Strings without quotes, everything else as JSON
fn display_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => "-".to_string(),
        other => other.to_string(),
    }
}

/// Truncate a string to max_len chars, adding "..." if truncated
fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::Pipeline;
    use crate::schema::validator::Rule;
    use serde_json::json;

    #[test]
    fn test_error_table() {
        let errors = vec![ValidationError {
            path: "must[0].edition".into(),
            rule: Rule::Enum,
            value: json!("Shiny"),
            message: "'Shiny' is not a valid edition".into(),
            help: None,
        }];
        let table = error_table(&errors);
        assert!(table.contains("PATH"));
        assert!(table.contains("must[0].edition"));
        assert!(table.contains("enum"));
        assert!(table.contains("Shiny"));
        assert!(!table.contains("\"Shiny\""));
    }

    #[test]
    fn test_display_value() {
        assert_eq!(display_value(&json!("Gold")), "Gold");
        assert_eq!(display_value(&json!(null)), "-");
        assert_eq!(display_value(&json!([1, 2])), "[1,2]");
    }

    #[test]
    fn test_truncate_str() {
        assert_eq!(truncate_str("hello", 10), "hello");
        assert_eq!(truncate_str("hello world", 8), "hello...");
        assert_eq!(truncate_str("ééééé", 4), "é...");
    }

    #[test]
    fn test_require_valid() {
        let pipeline = Pipeline::new().unwrap();
        let valid = pipeline.respond(r#"{"name": "ok", "must": []}"#);
        assert!(require_valid(&valid).is_ok());

        let invalid = pipeline.respond(r#"{"deck": "Nope"}"#);
        let err = require_valid(&invalid).unwrap_err();
        assert!(err.to_string().contains("2 errors"), "{}", err);

        let failed = pipeline.respond("nothing");
        assert!(require_valid(&failed).is_err());
    }

    #[test]
    fn test_render_report_lists_upgrade() {
        let pipeline = Pipeline::new().unwrap();
        let report = pipeline
            .run(r#"{"name": "p", "stake": "Red", "must": [{"type": "Joker", "sticker": "Rental"}]}"#)
            .unwrap();
        let out = render_report(&report).unwrap();
        assert!(out.contains("Stake raised Red -> Orange (Rental sticker at must[0])"));
    }
}
