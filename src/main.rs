use clap::Parser;
use pr_snapshot::config::Config;
use pr_snapshot::report::{self, OutputFormat};
use pr_snapshot::{GitHubClient, GitHubError, PullRequestScope, TokenStore};
use std::path::PathBuf;
use tracing::{debug, info, info_span, warn};
use tracing_subscriber::EnvFilter;

/// PR Snapshot — fetches a GitHub Pull Request's metadata, changed files and
/// before/after file contents as one structured snapshot.
#[derive(Parser, Debug)]
#[command(name = "pr-snapshot", version, about)]
struct Cli {
    /// GitHub Pull Request URL (e.g., https://github.com/org/repo/pull/42)
    ///
    /// Not required when only --save-token is used.
    pr_url: Option<String>,

    /// Write the snapshot as JSON to this file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print the full snapshot as JSON instead of a summary
    #[arg(long)]
    json: bool,

    /// Persist a GitHub token to the token file for later runs
    #[arg(long, value_name = "TOKEN")]
    save_token: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    info!("loading configuration");
    let config = Config::load()?;

    if let Some(token) = cli.save_token.as_deref() {
        let store = config.token_store();
        store.set(token).await?;
        info!(path = %store.path().display(), "saved GitHub token");
    }

    let Some(pr_url) = cli.pr_url.as_deref() else {
        if cli.save_token.is_some() {
            return Ok(());
        }
        return Err("PR URL is required. Usage: pr-snapshot <URL> [--json] [-o FILE]".into());
    };

    let _main_span = info_span!("pr_snapshot", pr_url = %pr_url).entered();

    info!("parsing PR URL");
    let scope = PullRequestScope::from_pr_url(pr_url)?;
    debug!(owner = %scope.repo().owner(), repo = %scope.repo().name(), pr = scope.number(), "parsed PR URL");

    let token = config.resolve_token().await;
    if token.is_none() {
        warn!("no GitHub token configured, using anonymous rate-limited access");
    }
    let client = GitHubClient::new(scope, token, config.client_options())?;

    info!("fetching pull request snapshot from GitHub");
    let snapshot = match client.fetch_snapshot().await {
        Ok(snapshot) => snapshot,
        Err(err) => {
            explain_failure(&err);
            return Err(err.into());
        }
    };
    info!(
        files = snapshot.files().len(),
        additions = snapshot.pull_request().additions,
        deletions = snapshot.pull_request().deletions,
        "fetched snapshot"
    );

    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Terminal
    };
    report::output(&snapshot, format, cli.output.as_deref())?;
    info!("done");

    Ok(())
}

/// Tell the user what to do next for the failures that have a remedy.
fn explain_failure(err: &GitHubError) {
    match err {
        GitHubError::AuthenticationFailed { .. } => {
            eprintln!("hint: provide a token with repo read access via --save-token or GITHUB_TOKEN");
        }
        GitHubError::RateLimited { .. } => match err.retry_after() {
            Some(wait) => eprintln!("hint: rate limit resets in {}s; retry then", wait.as_secs()),
            None => eprintln!("hint: rate limited by GitHub; retry in a few minutes"),
        },
        _ if err.is_retryable() => eprintln!("hint: this failure may be transient; retry the command"),
        _ => {}
    }
}
