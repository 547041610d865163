use clap::Parser;
use miette::Result;
use ouija::cli::commands;
use ouija::cli::{Cli, Commands};
use std::io::IsTerminal;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Reset SIGPIPE to default behavior (terminate silently) for proper Unix piping.
    // Without this, piping to `head`, `grep -q`, etc. causes a panic on broken pipe.
    #[cfg(unix)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    let global = cli.global;

    let config = global.load_config()?;
    let directive = global.log_directive(&config);
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_ansi(std::io::stderr().is_terminal())
        .with_env_filter(
            EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new("ouija=info")),
        )
        .init();

    match cli.command {
        Commands::Parse(args) => commands::parse::run(args, &global),
        Commands::Generate(args) => commands::generate::run(args, &global, &config),
        Commands::Prompt(args) => commands::prompt::run(args),
        Commands::Schema(args) => commands::schema::run(args),
        Commands::Completions(args) => commands::completions::run(args),
    }
}
