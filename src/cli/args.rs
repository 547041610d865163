//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand, ValueEnum};
use miette::Result;
use std::path::PathBuf;

use crate::cli::commands::{
    completions::CompletionsArgs, generate::GenerateArgs, parse::ParseArgs, prompt::PromptArgs,
    schema::SchemaArgs,
};
use crate::core::Config;

#[derive(Parser)]
#[command(name = "ouija")]
#[command(author, version, about = "Balatro seed-search configs from plain language")]
#[command(long_about = "Turns language-model output into validated Balatro seed-search configs: \
recovers the JSON, repairs naming slips, enforces sticker/stake rules and reports what is still wrong.")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "pretty")]
    pub format: OutputFormat,

    /// Only log warnings and errors
    #[arg(long, short = 'q', global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log every pipeline stage
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Config file to use instead of the global one
    #[arg(long, short = 'c', global = true, env = "OUIJA_CONFIG")]
    pub config: Option<PathBuf>,
}

impl GlobalOpts {
    /// Load config, honoring `--config`
    pub fn load_config(&self) -> Result<Config> {
        match &self.config {
            Some(path) => Ok(Config::load_from(path)?),
            None => Ok(Config::load()),
        }
    }

    /// Log filter directive for these options
    pub fn log_directive(&self, config: &Config) -> String {
        if self.verbose {
            "ouija=debug".to_string()
        } else if self.quiet {
            "ouija=warn".to_string()
        } else {
            config.log.clone().unwrap_or_else(|| "ouija=info".to_string())
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run model output (file or stdin) through the pipeline
    Parse(ParseArgs),

    /// Ask the inference service for a config and run it through the pipeline
    Generate(GenerateArgs),

    /// Print the system instruction sent to the inference service
    Prompt(PromptArgs),

    /// Show the config schema
    Schema(SchemaArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Indented JSON
    #[default]
    Pretty,
    /// Single-line JSON (for piping)
    Json,
    /// Human summary with an error table
    Table,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_defaults() {
        let cli = Cli::try_parse_from(["ouija", "parse"]).unwrap();
        assert_eq!(cli.global.format, OutputFormat::Pretty);
        assert!(!cli.global.verbose);
        assert!(matches!(cli.command, Commands::Parse(_)));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["ouija", "parse", "out.txt", "-f", "json", "-v"]).unwrap();
        assert_eq!(cli.global.format, OutputFormat::Json);
        assert!(cli.global.verbose);
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["ouija", "prompt", "-q", "-v"]).is_err());
    }

    #[test]
    fn test_log_directive() {
        let mut config = Config::default();
        let cli = Cli::try_parse_from(["ouija", "prompt"]).unwrap();
        assert_eq!(cli.global.log_directive(&config), "ouija=info");

        config.log = Some("ouija=trace".into());
        assert_eq!(cli.global.log_directive(&config), "ouija=trace");

        let cli = Cli::try_parse_from(["ouija", "prompt", "-q"]).unwrap();
        assert_eq!(cli.global.log_directive(&config), "ouija=warn");
    }
}
