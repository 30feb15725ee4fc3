use anyhow::Context;
use colored::Colorize;

use vellum_server::{ServerConfig, VellumServer};

use crate::cli::*;

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Serve(ref args) => cmd_serve(resolve_config(&cli, args)?).await,
        Command::Config(ref args) => cmd_config(resolve_config(&cli, &args.overrides)?, &cli.format),
    }
}

/// Configuration file (or defaults), then command-line overrides.
fn resolve_config(cli: &Cli, overrides: &ServeArgs) -> anyhow::Result<ServerConfig> {
    let mut config = match &cli.config {
        Some(path) => ServerConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => ServerConfig::default(),
    };
    if let Some(bind) = &overrides.bind {
        config.bind_addr = bind
            .parse()
            .with_context(|| format!("invalid bind address: {bind}"))?;
    }
    if let Some(root) = &overrides.root {
        config.storage_root = root.clone();
    }
    Ok(config)
}

async fn cmd_serve(config: ServerConfig) -> anyhow::Result<()> {
    println!(
        "{} Vellum on {} (root: {})",
        "✓".green().bold(),
        config.bind_addr.to_string().bold(),
        config.storage_root.display()
    );
    let server = VellumServer::open(config)
        .await
        .context("failed to open artifact store")?;
    server.serve().await.context("server error")?;
    Ok(())
}

fn cmd_config(config: ServerConfig, format: &OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Text => print!("{}", config.to_toml_string()?),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&config)?),
    }
    Ok(())
}
