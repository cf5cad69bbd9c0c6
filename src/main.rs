use std::fs::File;
use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{ArgAction, CommandFactory, Parser};
use time::UtcOffset;

use ssllabs_check::client::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
use ssllabs_check::poller::{PollSettings, DEFAULT_MAX_POLLS, DEFAULT_POLL_INTERVAL};
use ssllabs_check::render::render_with_offset;
use ssllabs_check::types::Assessment;
use ssllabs_check::{run_check, CheckEvent, CheckOptions, ClientConfig, SslLabsClient};

/// ssllabs-check — run an SSL Labs assessment for a domain and print the grade report.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "ssllabs-check",
    version,
    about = "SSL Labs API Checker: run an SSL/TLS assessment for a domain and print the grades.",
    long_about = None
)]
struct Cli {
    /// Domain to check (e.g., example.com).
    #[arg(long)]
    domain: Option<String>,

    /// Publish results on the SSL Labs board.
    #[arg(
        long,
        action = ArgAction::Set,
        num_args = 0..=1,
        default_value_t = false,
        default_missing_value = "true"
    )]
    publish: bool,

    /// Base URL of the assessment API.
    #[arg(long = "api-url", env = "SSLLABS_API_URL", default_value = DEFAULT_BASE_URL)]
    api_url: String,

    /// Seconds to wait between two status checks.
    #[arg(long = "poll-interval-secs", default_value_t = DEFAULT_POLL_INTERVAL.as_secs())]
    poll_interval_secs: u64,

    /// Give up after this many status checks.
    #[arg(
        long = "max-polls",
        default_value_t = DEFAULT_MAX_POLLS,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    max_polls: u32,

    /// Per-request timeout in seconds.
    #[arg(long = "timeout-secs", default_value_t = DEFAULT_TIMEOUT.as_secs())]
    timeout_secs: u64,

    /// Also write the final assessment as pretty JSON to this path.
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();

    let Some(domain) = cli.domain.clone().filter(|d| !d.trim().is_empty()) else {
        let _ = Cli::command().print_help();
        println!();
        process::exit(0);
    };

    init_tracing();

    // The local offset can only be read reliably while the process is single-threaded.
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);

    let outcome = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start runtime")
        .and_then(|rt| rt.block_on(run(cli, domain, offset)));

    if let Err(e) = outcome {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("ssllabs_check=warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli, domain: String, offset: UtcOffset) -> Result<()> {
    let client = SslLabsClient::new(ClientConfig {
        base_url: cli.api_url.clone(),
        timeout: Duration::from_secs(cli.timeout_secs),
    })
    .context("failed to build HTTP client")?;

    let options = CheckOptions {
        domain,
        publish: cli.publish,
        poll: PollSettings {
            interval: Duration::from_secs(cli.poll_interval_secs),
            max_polls: cli.max_polls,
        },
    };

    let report = run_check(&client, &options, |event| print_event(&options.domain, &event))
        .await
        .with_context(|| format!("assessment of {} failed", options.domain))?;
    if report.polled {
        println!();
    }

    let text = render_with_offset(&report.assessment, offset)?;
    print!("{text}");

    if let Some(path) = cli.output.as_deref() {
        write_assessment_json(path, &report.assessment)
            .with_context(|| format!("failed to write JSON to {}", path.display()))?;
        println!("Wrote JSON results to {}", path.display());
    }
    Ok(())
}

fn print_event(domain: &str, event: &CheckEvent) {
    for line in event_lines(domain, event) {
        println!("{line}");
    }
}

fn event_lines(domain: &str, event: &CheckEvent) -> Vec<String> {
    match event {
        CheckEvent::ServiceReachable(info) => {
            let mut lines = vec![
                "SSL Labs API is reachable.".to_string(),
                format!("Criteria Version: {}", info.criteria_version),
                format!("Concurrent assessments allowed: {}", info.max_assessments),
                format!("Current assessments: {}", info.current_assessments),
            ];
            lines.extend(info.messages.iter().map(|m| format!("Service message: {m}")));
            lines
        }
        CheckEvent::Starting => vec![
            format!("Checking SSL/TLS for domain: {domain}"),
            "Starting Assessment ....".to_string(),
        ],
        CheckEvent::Started(assessment) => {
            let mut lines = vec![format!("Assessment started for {}", assessment.host)];
            if !assessment.status.is_terminal() {
                lines.push("Waiting for assessment to complete...".to_string());
            }
            lines
        }
        CheckEvent::Progress(progress) => vec![progress.to_string()],
    }
}

fn write_assessment_json(path: &Path, assessment: &Assessment) -> Result<()> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, assessment)?;
    Ok(())
}
