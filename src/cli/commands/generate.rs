//! `ouija generate` - plain-language request to validated config

use miette::{IntoDiagnostic, Result, WrapErr};
use std::path::PathBuf;

use crate::cli::output::{print_response, require_valid};
use crate::cli::GlobalOpts;
use crate::core::Config;
use crate::inference::{
    CommandService, GenerateError, Generator, InferenceService, ReplayService,
};
use crate::pipeline::Response;

#[derive(clap::Args, Debug)]
pub struct GenerateArgs {
    /// What to search for, e.g. "eternal blueprint on plasma deck"
    #[arg(required = true, num_args = 1..)]
    pub prompt: Vec<String>,

    /// Use saved model output instead of calling the inference command
    #[arg(long, value_name = "FILE")]
    pub replay: Option<PathBuf>,

    /// Exit non-zero unless the config is valid
    #[arg(long)]
    pub strict: bool,
}

pub fn run(args: GenerateArgs, global: &GlobalOpts, config: &Config) -> Result<()> {
    let request = args.prompt.join(" ");

    let response = match &args.replay {
        Some(path) => {
            let saved = std::fs::read_to_string(path)
                .into_diagnostic()
                .wrap_err_with(|| format!("Failed to read {}", path.display()))?;
            respond(ReplayService::new(saved), &request)?
        }
        None => {
            let service =
                CommandService::from_config(&config.inference).map_err(GenerateError::from)?;
            respond(service, &request)?
        }
    };

    print_response(&response, global)?;
    if args.strict {
        require_valid(&response)?;
    }
    Ok(())
}

fn respond<S: InferenceService>(service: S, request: &str) -> Result<Response> {
    let generator = Generator::new(service)?;
    Ok(generator.generate(request)?)
}
