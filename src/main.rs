//! Ledgerd CLI entry point.

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use ledgerd::cli::{commands, Cli, Commands};

fn init_tracing(level: &str, format: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let registry = tracing_subscriber::registry().with(filter);

    if format == "json" {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Missing config files fall back to defaults, so this only fails on
    // genuinely invalid configuration.
    match commands::load_config(cli.config.as_ref()) {
        Ok(config) => init_tracing(&config.logging.level, &config.logging.format),
        Err(err) => {
            init_tracing("info", "pretty");
            ledgerd::cli::handle_error(err, cli.json);
        }
    }

    let result = match cli.command {
        Commands::Init(args) => commands::init::execute(args, cli.json).await,
        Commands::Run(args) => commands::run::execute(args, cli.config, cli.json).await,
        Commands::Sweep(args) => commands::sweep::execute(args, cli.config, cli.json).await,
        Commands::Monitor(args) => commands::monitor::execute(args, cli.config, cli.json).await,
        Commands::Report(args) => commands::report::execute(args, cli.config, cli.json).await,
        Commands::Schedule(args) => commands::schedule::execute(args, cli.config, cli.json).await,
    };

    if let Err(err) = result {
        ledgerd::cli::handle_error(err, cli.json);
    }
}
