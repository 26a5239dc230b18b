//! Catalog features - main entry point

use clap::Parser;
use catalog_features::cli::{cmd_apply, cmd_inspect, cmd_prepare, Cli, Commands};

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "catalog_features=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Prepare {
            train,
            target,
            list_columns,
            nested_columns,
            config,
            sigma,
            output,
            state,
        } => cmd_prepare(
            &train,
            &target,
            &list_columns,
            &nested_columns,
            config.as_deref(),
            sigma,
            &output,
            &state,
        )?,
        Commands::Apply {
            data,
            state,
            list_columns,
            nested_columns,
            sigma,
            output,
        } => cmd_apply(&data, &state, &list_columns, &nested_columns, sigma, &output)?,
        Commands::Inspect { state } => cmd_inspect(&state)?,
    }

    Ok(())
}
