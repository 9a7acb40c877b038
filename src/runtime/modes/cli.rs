//! CLI mode
//!
//! `add` writes through the link store directly, `visit` plays the part of
//! a headless visitor against a running server.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use colored::Colorize;
use tracing::debug;
use ureq::Agent;
use url::Url;

use crate::cli::{Commands, ConfigCommands};
use crate::collector::{Collector, HostEnvironment, HttpTransport, Navigator, Ticket, boot};
use crate::config::{StaticConfig, get_config};
use crate::services::{CreateLinkRequest, LinkService};
use crate::storage::StorageFactory;

const DEFAULT_SAMPLE_CONFIG_PATH: &str = "config.example.toml";

/// Run a CLI subcommand (everything except `serve`)
pub async fn run_cli(command: Commands) -> Result<()> {
    match command {
        Commands::Serve => bail!("serve is not a CLI command"),
        Commands::Add { args } => add_link(args).await,
        Commands::Visit { url, wait_ms } => visit(&url, Duration::from_millis(wait_ms)).await,
        Commands::Config {
            action: ConfigCommands::Generate { output_path },
        } => generate_config(output_path.as_deref()),
    }
}

async fn add_link(mut args: Vec<String>) -> Result<()> {
    let (code, target) = match args.len() {
        1 => (None, args.remove(0)),
        2 => {
            let target = args.remove(1);
            (Some(args.remove(0)), target)
        }
        _ => bail!("usage: add [SHORT_CODE] <TARGET_URL>"),
    };

    let storage = StorageFactory::create()
        .await
        .context("Failed to open storage")?;
    let service = LinkService::new(storage);
    let result = service
        .create_link(CreateLinkRequest { code, target })
        .await
        .map_err(|e| anyhow!("{}", e.format_simple()))?;

    if result.generated_code {
        println!(
            "{} Generated random code: {}",
            "ℹ".bold().blue(),
            result.code.magenta()
        );
    }
    println!(
        "{} Added short link: {} -> {}",
        "✓".bold().green(),
        result.code.cyan(),
        result.target.blue().underline()
    );
    println!(
        "  {}/{}",
        get_config().server.base_url(),
        result.code
    );

    Ok(())
}

fn generate_config(output_path: Option<&str>) -> Result<()> {
    let path = output_path.unwrap_or(DEFAULT_SAMPLE_CONFIG_PATH);
    StaticConfig::default()
        .save_to_file(path)
        .map_err(|e| anyhow!("Failed to write {}: {}", path, e))?;
    println!("{} Sample configuration written to {}", "✓".bold().green(), path.cyan());
    Ok(())
}

/// What the server answered for a short link
#[derive(Debug, PartialEq, Eq)]
enum VisitPlan {
    /// Bootstrap page with an embedded ticket
    Bootstrap(Ticket),
    /// Plain redirect; no record to correlate
    Redirect(String),
}

fn fetch_plan(page_url: &str, timeout: Duration) -> Result<VisitPlan> {
    let agent: Agent = Agent::config_builder()
        .timeout_global(Some(timeout))
        .max_redirects(0)
        .http_status_as_error(false)
        .build()
        .into();

    let mut resp = agent
        .get(page_url)
        .header("Accept", "text/html")
        .call()
        .with_context(|| format!("Failed to fetch {}", page_url))?;
    let status = resp.status().as_u16();

    if resp.status().is_redirection() {
        let location = resp
            .headers()
            .get("location")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| anyhow!("HTTP {} without Location header", status))?;
        return Ok(VisitPlan::Redirect(location.to_string()));
    }
    if status == 404 {
        bail!("Short link not found: {}", page_url);
    }
    if !resp.status().is_success() {
        bail!("Server answered HTTP {}", status);
    }

    let html = resp
        .body_mut()
        .read_to_string()
        .context("Failed to read bootstrap page")?;
    parse_plan(&html)
}

fn parse_plan(html: &str) -> Result<VisitPlan> {
    Ticket::from_bootstrap_html(html)
        .map(VisitPlan::Bootstrap)
        .ok_or_else(|| anyhow!("Response does not contain a tracking ticket"))
}

fn track_endpoint(page_url: &str) -> Result<String> {
    let url = Url::parse(page_url).with_context(|| format!("Invalid URL: {}", page_url))?;
    Ok(url.join("/api/track")?.to_string())
}

struct PrintNavigator;

impl Navigator for PrintNavigator {
    fn navigate(&self, target: &str) {
        println!("{} Navigating to {}", "→".bold().green(), target.blue().underline());
    }
}

async fn visit(page_url: &str, wait: Duration) -> Result<()> {
    let config = get_config();
    let fetch_timeout = Duration::from_millis(config.collector.delivery_timeout_ms);
    let endpoint = track_endpoint(page_url)?;

    let url = page_url.to_string();
    let plan = tokio::task::spawn_blocking(move || fetch_plan(&url, fetch_timeout))
        .await
        .context("Fetch task failed")??;

    let ticket = match plan {
        VisitPlan::Redirect(target) => {
            println!(
                "{} Server redirected directly (no tracking record)",
                "ℹ".bold().blue()
            );
            PrintNavigator.navigate(&target);
            return Ok(());
        }
        VisitPlan::Bootstrap(ticket) => ticket,
    };
    println!("{} Tracking id: {}", "ℹ".bold().blue(), ticket.id.to_string().magenta());

    let collector = Collector::new(config.collector);
    let env = HostEnvironment::default();
    let transport = Arc::new(HttpTransport::new(endpoint, fetch_timeout));

    let outcome = boot::run(&collector, &env, transport, &PrintNavigator, ticket).await;
    debug!("Navigation done, waiting up to {:?} for delivery", wait);

    match tokio::time::timeout(wait, outcome.delivery).await {
        Ok(Ok(Ok(()))) => println!("{} Fingerprint delivered", "✓".bold().green()),
        Ok(Ok(Err(e))) => println!("{} Fingerprint not delivered: {}", "✗".bold().red(), e),
        Ok(Err(e)) => println!("{} Delivery task failed: {}", "✗".bold().red(), e),
        Err(_) => println!(
            "{} Delivery still pending after {} ms, giving up",
            "!".bold().yellow(),
            wait.as_millis()
        ),
    }

    Ok(())
}
