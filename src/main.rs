use clap::Parser;
use tracing_subscriber::EnvFilter;

use kiln::commands;
use kiln::output::Output;
use kiln::{Cli, Commands};

fn main() {
    // RUST_LOG=kiln=debug surfaces broker and fetch tracing.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Generate(args) => commands::generate::run(args),
        Commands::Validate(args) => commands::validate::run(args),
        Commands::Schema(args) => commands::schema::run(args),
    };

    if let Err(err) = result {
        Output::error(format!("{err:#}"));
        std::process::exit(1);
    }
}
