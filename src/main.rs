use album_verify::config::{parse_base_url, Config, Credentials};
use album_verify::verify::AttemptReport;
use album_verify::{ChromeBrowser, LoginFlow, SearchAttempt, SearchOutcome, SearchVerifier, Session};
use anyhow::Context;
use clap::Parser;
use std::time::Instant;
use tracing::{error, info};

/// Verify the album app's search behavior through a headless browser.
#[derive(Debug, Parser)]
#[command(name = "album-verify", version, about)]
struct Args {
    /// Base URL of the album app.
    #[arg(long, default_value = "http://localhost:3000/")]
    base_url: String,

    /// Login email.
    #[arg(long, env = "TEST_EMAIL")]
    email: String,

    /// Login password.
    #[arg(long, env = "TEST_PASSWORD")]
    password: String,

    /// Queries to verify, in order, against one session.
    #[arg(long = "query", required = true)]
    queries: Vec<String>,

    /// Maximum seconds to wait for each search outcome.
    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,

    /// Run with a visible browser window.
    #[arg(long)]
    headed: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args = Args::parse();
    let base_url = parse_base_url(&args.base_url)?;
    let credentials = Credentials {
        email: args.email.clone(),
        password: args.password.clone(),
    };

    let mut config = Config::default();
    config.browser.headless = !args.headed;
    config.wait.search_timeout_ms = args.timeout_secs * 1000;

    let mut session = Session::open(ChromeBrowser::new(), &config.browser)
        .await
        .context("cannot open browser session")?;

    // One verification run against the open session; the session is closed
    // afterwards no matter how the run went.
    let run_result = run_queries(&session, &config, &base_url, &credentials, &args.queries).await;
    session.close().await.ok();

    let reports = run_result?;
    let failures = reports.iter().filter(|r| r.outcome.is_failure()).count();
    for report in &reports {
        match &report.outcome {
            SearchOutcome::ResultsFound(count) => {
                info!("Found {count} search results for '{}'", report.query);
            }
            SearchOutcome::NoResultsFound => {
                info!("No search results found for '{}', as expected", report.query);
            }
            SearchOutcome::Failure(cause) => {
                error!("Search for '{}' failed: {cause}", report.query);
            }
        }
    }

    if failures > 0 {
        anyhow::bail!("{failures} of {} search attempts failed", reports.len());
    }
    info!("all {} search attempts verified", reports.len());
    Ok(())
}

async fn run_queries(
    session: &Session<ChromeBrowser>,
    config: &Config,
    base_url: &url::Url,
    credentials: &Credentials,
    queries: &[String],
) -> anyhow::Result<Vec<AttemptReport>> {
    let login = LoginFlow::new(config.selectors.clone(), config.wait.login_timeout());
    login
        .run(session, base_url, credentials)
        .await
        .context("session bootstrap failed")?;

    let verifier = SearchVerifier::new(config.selectors.clone());
    let mut reports = Vec::with_capacity(queries.len());
    for query in queries {
        let attempt = SearchAttempt::new(query.clone(), config.wait.search_timeout());
        let started_at = chrono::Utc::now();
        let clock = Instant::now();
        let outcome = verifier.run(session, &attempt).await;
        reports.push(AttemptReport {
            query: query.clone(),
            outcome,
            started_at,
            elapsed_ms: clock.elapsed().as_millis() as u64,
        });
    }
    Ok(reports)
}
