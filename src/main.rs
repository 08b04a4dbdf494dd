use std::io::{self, BufRead};
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use chrono::Utc;
use clap::Parser;
use tracing::{error, info, warn};

use earnwire::{
    aggregator::{Aggregator, AggregatorOptions, CollectPlan},
    config::Config,
    fetcher::{Client, FetchPolicy, session::SessionState, session::SessionStore},
    output,
    reporter::render,
};

/// Collect earnings call transcripts and email or save the results.
#[derive(Debug, Parser)]
#[command(name = "earnwire", version)]
struct Cli {
    /// Number of listing pages to scrape (listing mode)
    #[arg(long, short = 'p')]
    pages: Option<usize>,

    /// Comma-separated tickers to resolve (ticker mode)
    #[arg(long, short = 't')]
    tickers: Option<String>,

    /// Collect and print a summary, but send no email
    #[arg(long)]
    dry_run: bool,

    /// Read a session cookie header from stdin and save the session blob
    #[arg(long)]
    login: bool,

    /// Write results as a JSON artifact to this file instead of emailing
    #[arg(long, short = 'o')]
    output: Option<PathBuf>,

    /// Only log warnings and errors
    #[arg(long, short = 'q')]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.quiet { "warn" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();

    let config = Config::from_env().context("failed to load configuration")?;
    let session_store = SessionStore::new(config.session_dir());

    if cli.login {
        return login(&session_store, config.primary_host());
    }

    let tickers: Option<Vec<String>> = cli
        .tickers
        .as_deref()
        .map(|raw| {
            raw.split(',')
                .map(|t| t.trim().to_uppercase())
                .filter(|t| !t.is_empty())
                .collect()
        })
        .or_else(|| config.tickers().map(<[String]>::to_vec));

    let plan = match tickers {
        Some(tickers) if !tickers.is_empty() => CollectPlan::Tickers(tickers),
        _ => CollectPlan::Listing {
            pages: cli.pages.unwrap_or_else(|| config.pages()),
        },
    };

    let session = session_store.load();
    if session.is_none() {
        warn!("no saved session, paywalled sources will only yield previews");
    }
    let client = Client::new(FetchPolicy::default(), session)
        .map_err(|e| anyhow::anyhow!("failed to build http client: {e}"))?;

    let aggregator = Aggregator::new(
        client,
        config.sources(),
        AggregatorOptions {
            lookback_days: config.lookback_days(),
            ..AggregatorOptions::default()
        },
    );

    // Ctrl-C stops scheduling further targets; in-flight fetches finish.
    let cancel = aggregator.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_err() {
            error!("failed to listen for shutdown signal");
            return;
        }
        info!("shutdown requested, finishing current target");
        cancel.cancel();
    });

    let records = aggregator.collect(&plan).await;
    let scraped_at = Utc::now();

    info!("collected {} transcript(s)", records.len());
    for record in &records {
        info!(
            "  {:<6} | {} | {}",
            record.ticker.as_deref().unwrap_or("N/A"),
            record
                .published_at
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| "N/A".to_string()),
            record.title,
        );
    }

    if let Some(path) = &cli.output {
        output::write_json(path, &records, scraped_at)
            .with_context(|| format!("failed to write {}", path.display()))?;
        info!("wrote {} record(s) to {}", records.len(), path.display());
        return Ok(());
    }

    if records.is_empty() {
        info!("nothing found, no email to send");
        return Ok(());
    }

    if cli.dry_run {
        info!("dry run, skipping email");
        return Ok(());
    }

    let rendered = render(&records, scraped_at);
    let subject = format!(
        "Earnings Call Transcripts - {}",
        scraped_at.format("%Y-%m-%d %H:%M")
    );
    config
        .mailer()
        .send(&subject, &rendered.plain, &rendered.html, None)
        .await
        .context("failed to send email")?;

    Ok(())
}

/// Persist a session captured from an interactive browser login. Expects a
/// raw `Cookie` header value on stdin.
fn login(store: &SessionStore, primary_host: &str) -> Result<()> {
    eprintln!("Paste the Cookie header from an authenticated browser session, then press Enter:");

    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("failed to read from stdin")?;

    let state = SessionState::from_cookie_header(primary_host, line.trim());
    if state.is_empty() {
        bail!("no cookies parsed from input, session not saved");
    }

    store
        .save(&state)
        .with_context(|| format!("failed to write {}", store.state_path().display()))?;
    info!(
        "saved session with {} cookie(s) to {}",
        state.cookies.len(),
        store.state_path().display()
    );
    Ok(())
}
