//! `ouija prompt` - show what the model is told

use miette::{IntoDiagnostic, Result};

use crate::inference::PromptBuilder;

#[derive(clap::Args, Debug)]
pub struct PromptArgs {
    /// Also print the user message for this request
    #[arg(long, value_name = "REQUEST")]
    pub request: Option<String>,
}

pub fn run(args: PromptArgs) -> Result<()> {
    let builder = PromptBuilder::new().into_diagnostic()?;
    println!("{}", builder.system_prompt().into_diagnostic()?);
    if let Some(request) = args.request {
        println!("\n{}", builder.user_prompt(&request));
    }
    Ok(())
}
