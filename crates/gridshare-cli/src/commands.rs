use std::io::Read;
use std::sync::Arc;

use anyhow::{bail, Context};
use colored::Colorize;
use serde_json::json;
use tracing::warn;

use gridshare_repo::{GridRepository, GridshareConfig, StoreBackend};
use gridshare_server::{share_url, GridshareServer};
use gridshare_types::{GridSubmission, GridView, Visibility};

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = GridshareConfig::load(cli.config.as_deref()).context("loading configuration")?;
    match cli.command {
        Command::Serve(args) => cmd_serve(config, args),
        Command::Store(args) => cmd_store(&open_repo(&config)?, &config, args, cli.format),
        Command::Fetch(args) => cmd_fetch(&open_repo(&config)?, args, cli.format),
        Command::Random => cmd_random(&open_repo(&config)?, cli.format),
        Command::Stats => cmd_stats(&open_repo(&config)?, cli.format),
    }
}

fn open_repo(config: &GridshareConfig) -> anyhow::Result<GridRepository> {
    if config.store.backend == StoreBackend::Memory {
        warn!("memory store selected; nothing persists past this command");
    }
    Ok(GridRepository::from_config(config)?)
}

fn cmd_serve(mut config: GridshareConfig, args: ServeArgs) -> anyhow::Result<()> {
    if let Some(bind) = args.bind {
        config.server.bind_addr = bind;
    }
    let repo = Arc::new(GridRepository::from_config(&config)?);
    println!(
        "gridshare listening on {} (store: {:?})",
        config.server.bind_addr.to_string().bold(),
        config.store.backend
    );
    let runtime = tokio::runtime::Runtime::new().context("starting async runtime")?;
    runtime.block_on(GridshareServer::new(config.server, repo).serve())?;
    Ok(())
}

fn read_input(args: &StoreArgs) -> anyhow::Result<Vec<u8>> {
    if args.file.as_os_str() == "-" {
        let mut buf = Vec::new();
        std::io::stdin().read_to_end(&mut buf).context("reading stdin")?;
        Ok(buf)
    } else {
        std::fs::read(&args.file).with_context(|| format!("reading {}", args.file.display()))
    }
}

fn cmd_store(
    repo: &GridRepository,
    config: &GridshareConfig,
    args: StoreArgs,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let submission = GridSubmission::from_json(&read_input(&args)?)?;
    let (visibility, token) = repo.store_submission(submission)?;
    let url = share_url(&config.server.public_base_url, visibility, token.as_str());
    match format {
        OutputFormat::Json => print_json(&json!({
            "token": token,
            "visibility": visibility,
            "url": url,
        }))?,
        OutputFormat::Text => {
            println!("{} Stored {} grid", "✓".green().bold(), visibility);
            println!("  Token: {}", token.as_str().yellow());
            println!("  URL: {}", url.blue());
        }
    }
    Ok(())
}

fn cmd_fetch(repo: &GridRepository, args: FetchArgs, format: OutputFormat) -> anyhow::Result<()> {
    let visibility = Visibility::from_secret_flag(args.secret);
    let Some(doc) = repo.fetch(&args.token, visibility)? else {
        bail!("no {visibility} grid with token {}", args.token);
    };
    print_view(&args.token, &doc.to_view(), format)
}

fn cmd_random(repo: &GridRepository, format: OutputFormat) -> anyhow::Result<()> {
    let (token, doc) = repo.fetch_random_public()?;
    print_view(token.as_str(), &doc.to_view(), format)
}

fn cmd_stats(repo: &GridRepository, format: OutputFormat) -> anyhow::Result<()> {
    let stats = repo.stats()?;
    match format {
        OutputFormat::Json => print_json(&stats)?,
        OutputFormat::Text => {
            println!("Public grids: {}", stats.public_grids.to_string().bold());
            println!("Secret grids: {}", stats.secret_grids.to_string().bold());
            match stats.cache {
                Some(cache) => println!(
                    "Cache: {}/{} entries, {} hits, {} misses",
                    cache.entries, cache.capacity, cache.hits, cache.misses
                ),
                None => println!("Cache: {}", "disabled".dimmed()),
            }
        }
    }
    Ok(())
}

fn print_view(token: &str, view: &GridView, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => print_json(view)?,
        OutputFormat::Text => {
            let data = &view.grid_data;
            let label = if view.secret { "secret" } else { "public" };
            println!("{} ({})", token.yellow().bold(), label);
            println!("  Class: {}", view.ipb_class);
            println!(
                "  Size: {}x{} ({} blocks), lines {}",
                data.width,
                data.height,
                data.block_count(),
                if data.lines_on { "on" } else { "off" }
            );
            println!("  Library version: {}", view.ipb_version);
            println!("  Created: {}", view.created_at.to_rfc3339().dimmed());
            if let Some(cells) = &view.code_cells {
                println!("  Code cells: {}", cells.len());
            }
        }
    }
    Ok(())
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
