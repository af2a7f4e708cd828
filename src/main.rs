use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;

use wikifeed::api::{ApiClient, Persistence};
use wikifeed::app::{build_http_client, App, AppEvent};
use wikifeed::config::Config;
use wikifeed::content::WikipediaClient;
use wikifeed::keybindings::KeybindingRegistry;
use wikifeed::types::Article;
use wikifeed::ui;
use wikifeed::util::{one_line, strip_control_chars};

/// Get the config directory path (~/.config/wikifeed/)
fn get_config_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home).join(".config").join("wikifeed"))
}

#[derive(Parser, Debug)]
#[command(
    name = "wikifeed",
    about = "Endless feed of Wikipedia article summaries in your terminal"
)]
struct Args {
    /// Config file (default: ~/.config/wikifeed/config.toml)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Backend base URL (overrides WIKIFEED_API_URL and the config file)
    #[arg(long, value_name = "URL")]
    api_url: Option<String>,

    /// Start with search results instead of a random batch
    #[arg(long, value_name = "QUERY")]
    search: Option<String>,

    /// Print your viewing history and exit
    #[arg(long, conflicts_with = "stats")]
    history: bool,

    /// Print your interaction counters and exit
    #[arg(long)]
    stats: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so they never interleave with the alternate screen.
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config_path = match &args.config {
        Some(path) => path.clone(),
        None => default_config_path()?,
    };
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;

    let mut keybindings = KeybindingRegistry::new();
    for problem in keybindings.apply_overrides(&config.keybindings) {
        tracing::warn!(problem = %problem, "Ignoring keybinding override");
    }

    let timeout = config.request_timeout();
    let api_url = config.resolve_api_url(args.api_url.as_deref());
    let api = ApiClient::new(&api_url, config.resolve_api_token(), timeout)
        .context("Failed to create backend client")?;
    let http = build_http_client(timeout).context("Failed to create HTTP client")?;
    let content = WikipediaClient::new(http, &config.content_api_url, timeout)
        .context("Failed to create Wikipedia client")?;

    if args.history {
        return print_history(&api).await;
    }
    if args.stats {
        return print_stats(&api).await;
    }

    let mut app = App::new(Arc::new(content), Arc::new(api), config.feed_settings());
    app.set_theme(config.theme_variant());
    app.keybindings = keybindings;

    let startup = app.controller.start(args.search.as_deref());
    let (event_tx, event_rx) = mpsc::channel::<AppEvent>(32);

    ui::run(&mut app, startup, event_tx, event_rx).await
}

/// Creates the config directory if needed and returns the config file path.
fn default_config_path() -> Result<PathBuf> {
    let config_dir = get_config_dir()?;
    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir).context("Failed to create config directory")?;
    }

    // The config file may hold a bearer token.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        match std::fs::metadata(&config_dir) {
            Ok(metadata) => {
                let mut perms = metadata.permissions();
                perms.set_mode(0o700);
                if let Err(e) = std::fs::set_permissions(&config_dir, perms) {
                    tracing::warn!(
                        path = %config_dir.display(),
                        error = %e,
                        "Failed to set config directory permissions to 0700"
                    );
                }
            }
            Err(e) => {
                tracing::warn!(
                    path = %config_dir.display(),
                    error = %e,
                    "Failed to read config directory metadata"
                );
            }
        }
    }

    Ok(config_dir.join("config.toml"))
}

async fn print_history(api: &ApiClient) -> Result<()> {
    let articles = api
        .history()
        .await
        .with_context(|| sign_in_hint(api))?;

    if articles.is_empty() {
        println!("No articles viewed yet.");
        return Ok(());
    }
    for article in &articles {
        println!("{}", history_line(article));
    }
    Ok(())
}

async fn print_stats(api: &ApiClient) -> Result<()> {
    let stats = api.stats().await.with_context(|| sign_in_hint(api))?;
    if let Some(user) = &stats.user {
        println!("Signed in as {}", user.display_name());
    }
    println!("Articles viewed: {}", stats.total_viewed);
    println!("Articles saved:  {}", stats.total_liked);
    Ok(())
}

fn sign_in_hint(api: &ApiClient) -> String {
    format!(
        "Could not reach your account. Sign in first at {}",
        api.login_url()
    )
}

/// "2026-01-05 14:03  Title  https://..."
fn history_line(article: &Article) -> String {
    let when = article
        .viewed_at_utc()
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "unknown date".to_string());
    format!(
        "{}  {}  {}",
        when,
        one_line(&strip_control_chars(&article.title)),
        strip_control_chars(&article.url)
    )
}
