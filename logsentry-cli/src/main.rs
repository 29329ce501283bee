mod cli;
mod commands;
mod error;
mod output;

use clap::Parser;

use cli::{Cli, Commands, ConfigAction, RulesAction};
use error::CliError;
use output::OutputWriter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_level = cli.log_level.clone().unwrap_or_else(|| "warn".to_owned());
    tracing_subscriber::fmt()
        .with_env_filter(log_level.as_str())
        .with_target(false)
        .init();

    if let Err(e) = run(cli).await {
        eprintln!("error: {e}");
        std::process::exit(e.exit_code());
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let writer = OutputWriter::new(cli.output);

    match &cli.command {
        Commands::Analyze(args) => commands::analyze::run(args, &cli.config, &writer).await,
        Commands::Convert(args) => commands::convert::run(args, &writer).await,
        Commands::Rules(args) => match args.action {
            RulesAction::List => commands::rules::run(&cli.config, &writer).await,
        },
        Commands::Config(args) => match &args.action {
            ConfigAction::Validate => commands::config::run_validate(&cli.config, &writer).await,
            ConfigAction::Show { section } => {
                commands::config::run_show(&cli.config, section.as_deref(), &writer).await
            }
        },
    }
}
