//! `ouija parse` - run saved model output through the pipeline

use miette::{IntoDiagnostic, Result, WrapErr};
use std::io::Read;
use std::path::PathBuf;

use crate::cli::output::{print_response, require_valid};
use crate::cli::GlobalOpts;
use crate::pipeline::{FailureReport, Pipeline, Response};

#[derive(clap::Args, Debug)]
pub struct ParseArgs {
    /// File holding the model output (stdin when omitted or `-`)
    pub file: Option<PathBuf>,

    /// Exit non-zero unless the config is valid
    #[arg(long)]
    pub strict: bool,
}

pub fn run(args: ParseArgs, global: &GlobalOpts) -> Result<()> {
    let raw = read_input(args.file.as_ref())?;
    let pipeline = Pipeline::new()?;

    match pipeline.run(&raw) {
        Ok(report) => {
            let response = Response::Generated(report);
            print_response(&response, global)?;
            if args.strict {
                require_valid(&response)?;
            }
        }
        Err(e) => {
            print_response(&Response::Failed(FailureReport::from(&e)), global)?;
            if args.strict {
                return Err(e.into());
            }
        }
    }
    Ok(())
}

fn read_input(file: Option<&PathBuf>) -> Result<String> {
    match file {
        Some(path) if path.as_os_str() != "-" => std::fs::read_to_string(path)
            .into_diagnostic()
            .wrap_err_with(|| format!("Failed to read {}", path.display())),
        _ => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .into_diagnostic()
                .wrap_err("Failed to read model output from stdin")?;
            Ok(buf)
        }
    }
}
