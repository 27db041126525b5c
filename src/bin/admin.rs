//! CLI administration tool for blog-pingback.
//!
//! Talks to remote blogs directly, without a running server, to debug
//! pingback discovery and delivery.
//!
//! # Usage
//!
//! ```bash
//! # Find the pingback endpoint of a page
//! cargo run --bin admin -- discover https://other.example/post
//!
//! # Check whether a page links to another one
//! cargo run --bin admin -- inspect https://other.example/post https://blog.example/my-post
//!
//! # Send one pingback
//! cargo run --bin admin -- ping https://blog.example/my-post https://other.example/post
//!
//! # Ping every page linked from a rendered post
//! cargo run --bin admin -- notify --source https://blog.example/my-post --file post.html
//!
//! # Generate a value for ADMIN_TOKEN
//! cargo run --bin admin -- token generate
//! ```
//!
//! # Environment Variables
//!
//! - `USER_AGENT` (optional): User-Agent of outbound requests

use blog_pingback::application::services::{AuthService, PingbackSendOutcome, PingbackSender};
use blog_pingback::infrastructure::content::{HtmlLinkExtractor, LinkExtractor};
use blog_pingback::infrastructure::remote::{
    HttpPingTransport, HttpSourceInspector, HttpTargetResolver, SourceInspector, TargetResolver,
    build_http_client,
};
use blog_pingback::utils::url_normalizer::parse_absolute_url;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;
use reqwest::Client;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// CLI tool for debugging pingbacks.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Timeout of each remote request, in seconds
    #[arg(long, global = true, default_value_t = 30)]
    timeout: u64,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level commands.
#[derive(Subcommand)]
enum Commands {
    /// Discover the pingback endpoint of a page
    Discover { url: String },

    /// Fetch a source page and check whether it links to a target
    Inspect { source: String, target: String },

    /// Send a pingback from SOURCE to TARGET
    Ping {
        source: String,
        target: String,

        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Send pingbacks to every page linked from a post
    Notify {
        /// Public URL of the post
        #[arg(long)]
        source: String,

        /// Rendered HTML of the post
        #[arg(long)]
        file: PathBuf,

        /// Maximum number of targets notified at once
        #[arg(long, default_value_t = 5)]
        concurrency: usize,

        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Manage the admin API token
    Token {
        #[command(subcommand)]
        action: TokenAction,
    },
}

/// Token subcommands.
#[derive(Subcommand)]
enum TokenAction {
    /// Print a random token suitable for ADMIN_TOKEN
    Generate,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let timeout = Duration::from_secs(cli.timeout.max(1));

    match cli.command {
        Commands::Discover { url } => discover(&http_client()?, &url, timeout).await?,
        Commands::Inspect { source, target } => {
            inspect(&http_client()?, &source, &target, timeout).await?
        }
        Commands::Ping {
            source,
            target,
            yes,
        } => ping(http_client()?, &source, &target, timeout, yes).await?,
        Commands::Notify {
            source,
            file,
            concurrency,
            yes,
        } => notify(http_client()?, &source, &file, timeout, concurrency, yes).await?,
        Commands::Token {
            action: TokenAction::Generate,
        } => println!("{}", AuthService::generate_token()),
    }

    Ok(())
}

fn http_client() -> Result<Client> {
    let user_agent = std::env::var("USER_AGENT")
        .unwrap_or_else(|_| format!("blog-pingback/{}", env!("CARGO_PKG_VERSION")));
    build_http_client(&user_agent).context("Failed to build HTTP client")
}

fn parse_url(label: &str, input: &str) -> Result<Url> {
    parse_absolute_url(input).with_context(|| format!("Invalid {} URL '{}'", label, input))
}

fn sender(client: Client, timeout: Duration, concurrency: usize) -> PingbackSender {
    PingbackSender::new(
        Arc::new(HttpTargetResolver::new(client.clone())),
        Arc::new(HttpPingTransport::new(client)),
        timeout,
        concurrency,
    )
}

/// Prints the endpoint a page advertises, if any.
async fn discover(client: &Client, url: &str, timeout: Duration) -> Result<()> {
    let target = parse_url("target", url)?;

    println!("{}", "🔎 Pingback discovery".bright_blue().bold());
    println!("  Page: {}", target.as_str().cyan());

    let endpoint = HttpTargetResolver::new(client.clone())
        .resolve_endpoint(&target, timeout)
        .await?;

    match endpoint {
        Some(endpoint) => println!("  Endpoint: {}", endpoint.as_str().green().bold()),
        None => println!("  {}", "No pingback endpoint advertised".yellow()),
    }

    Ok(())
}

/// Runs the same source check the server applies to inbound pingbacks.
async fn inspect(client: &Client, source: &str, target: &str, timeout: Duration) -> Result<()> {
    let source = parse_url("source", source)?;
    let target = parse_url("target", target)?;

    println!("{}", "🔎 Source inspection".bright_blue().bold());
    println!("  Source: {}", source.as_str().cyan());
    println!("  Target: {}", target.as_str().cyan());
    println!();

    let result = HttpSourceInspector::new(client.clone())
        .inspect(&source, &target, timeout)
        .await?;

    println!("  HTML:  {}", yes_no(result.is_html));
    println!("  Links to target: {}", yes_no(result.contains_target_link));
    println!(
        "  Title: {}",
        result.title.as_deref().unwrap_or("(none)").bright_white()
    );

    Ok(())
}

async fn ping(
    client: Client,
    source: &str,
    target: &str,
    timeout: Duration,
    skip_confirm: bool,
) -> Result<()> {
    let source = parse_url("source", source)?;
    let target = parse_url("target", target)?;

    println!("{}", "📡 Send pingback".bright_blue().bold());
    println!("  Source: {}", source.as_str().cyan());
    println!("  Target: {}", target.as_str().cyan());
    println!();

    if !skip_confirm && !confirm("Send this pingback?")? {
        println!("{}", "Cancelled".red());
        return Ok(());
    }

    let outcome = sender(client, timeout, 1).notify(&source, &target).await;
    print_outcome(&outcome);

    Ok(())
}

async fn notify(
    client: Client,
    source: &str,
    file: &Path,
    timeout: Duration,
    concurrency: usize,
    skip_confirm: bool,
) -> Result<()> {
    let source = parse_url("source", source)?;
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;

    let targets = HtmlLinkExtractor.extract(&source, &content);

    println!("{}", "📡 Notify linked pages".bright_blue().bold());
    println!("  Post: {}", source.as_str().cyan());
    println!();

    if targets.is_empty() {
        println!("{}", "No outbound links found".yellow());
        return Ok(());
    }

    println!("{}", "Targets:".bright_white().bold());
    for target in &targets {
        println!("  - {}", target);
    }
    println!();

    let prompt = format!("Send {} pingbacks?", targets.len());
    if !skip_confirm && !confirm(&prompt)? {
        println!("{}", "Cancelled".red());
        return Ok(());
    }

    let outcomes = sender(client, timeout, concurrency.clamp(1, 64))
        .notify_all(&source, &targets)
        .await;

    for outcome in &outcomes {
        print_outcome(outcome);
    }

    let sent = outcomes.iter().filter(|o| o.sent).count();
    println!();
    println!(
        "{} {} of {} sent",
        "Done:".bright_white().bold(),
        sent.to_string().green(),
        outcomes.len()
    );

    Ok(())
}

fn confirm(prompt: &str) -> Result<bool> {
    Ok(Confirm::new()
        .with_prompt(prompt)
        .default(true)
        .interact()?)
}

fn yes_no(value: bool) -> ColoredString {
    if value { "yes".green() } else { "no".red() }
}

fn print_outcome(outcome: &PingbackSendOutcome) {
    let status = match (outcome.sent, outcome.error, outcome.fault_code) {
        (true, _, Some(code)) => format!("SENT, fault {}", code).yellow(),
        (true, _, None) => "SENT".green(),
        (false, Some(kind), _) => kind.as_str().to_uppercase().red(),
        (false, None, _) => "NO ENDPOINT".dimmed(),
    };

    println!("  {:<60} {}", outcome.target, status);
    if let Some(endpoint) = &outcome.endpoint {
        let code = outcome
            .response_status
            .map(|s| s.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!("    via {} (HTTP {})", endpoint.dimmed(), code);
    }
}
