// # ddnsd - one-shot DDNS updater
//
// This is a THIN integration layer: all reconciliation logic lives in
// ddns-core. Run it from cron or a systemd timer; each invocation performs a
// single resolve → list → reconcile → mutate pass and exits.
//
// ## Configuration
//
// Every setting can be given as a flag or an environment variable; the flag
// wins.
//
// - `-d/--domain`     `SPACESHIP_DDNS_DOMAIN`      (required)
// - `-k/--api-key`    `SPACESHIP_DDNS_API_KEY`     (required)
// - `-s/--api-secret` `SPACESHIP_DDNS_API_SECRET`  (required)
// - `-n/--name`       `SPACESHIP_DDNS_NAME`        (required, "@" for the apex)
// - `--ip-url`        `SPACESHIP_DDNS_IP_URL`      (default https://api.ipify.org)
// - `--api-base`      `SPACESHIP_DDNS_API_BASE`    (default Spaceship records API)
// - `--ttl`           `SPACESHIP_DDNS_TTL`         (default 1800)
// - `--dry-run`       `DDNS_MODE=dry-run`
// - `--log-level`     `DDNS_LOG_LEVEL`             (default info)
//
// ## Example
//
// ```bash
// export SPACESHIP_DDNS_API_KEY=your_key
// export SPACESHIP_DDNS_API_SECRET=your_secret
// ddnsd --domain example.com --name @
// ```

use anyhow::{Context, Result};
use clap::Parser;
use ddns_core::config::{resolve_optional, resolve_setting};
use ddns_core::{Credentials, DdnsConfig, DdnsEngine, RunReport, Target};
use ddns_ip_http::HttpIpSource;
use ddns_provider_spaceship::SpaceshipProvider;
use std::process::ExitCode;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

const ENV_DOMAIN: &str = "SPACESHIP_DDNS_DOMAIN";
const ENV_API_KEY: &str = "SPACESHIP_DDNS_API_KEY";
const ENV_API_SECRET: &str = "SPACESHIP_DDNS_API_SECRET";
const ENV_NAME: &str = "SPACESHIP_DDNS_NAME";
const ENV_IP_URL: &str = "SPACESHIP_DDNS_IP_URL";
const ENV_API_BASE: &str = "SPACESHIP_DDNS_API_BASE";
const ENV_TTL: &str = "SPACESHIP_DDNS_TTL";
const ENV_MODE: &str = "DDNS_MODE";
const ENV_LOG_LEVEL: &str = "DDNS_LOG_LEVEL";

/// Exit codes for different termination scenarios
///
/// - 0: Record set converged (or was already correct)
/// - 1: Configuration error, no network call made
/// - 2: Fatal runtime error (address resolution or listing failed)
/// - 3: At least one add/delete call failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DdnsExitCode {
    Success = 0,
    ConfigError = 1,
    RuntimeError = 2,
    PartialFailure = 3,
}

impl From<DdnsExitCode> for ExitCode {
    fn from(code: DdnsExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Update the A record of a Spaceship-hosted domain to this host's public IPv4 address.
///
/// API key and secret are issued in the Spaceship account's API manager.
#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// Domain to update
    #[arg(short, long)]
    domain: Option<String>,

    /// API key
    #[arg(short = 'k', long)]
    api_key: Option<String>,

    /// API secret
    #[arg(short = 's', long)]
    api_secret: Option<String>,

    /// Record name, "@" for the zone apex
    #[arg(short, long)]
    name: Option<String>,

    /// Address-echo service returning the public IP as plain text
    #[arg(long)]
    ip_url: Option<String>,

    /// Spaceship DNS records API base URL
    #[arg(long)]
    api_base: Option<String>,

    /// TTL in seconds for a newly added record
    #[arg(long)]
    ttl: Option<u32>,

    /// Compute and log the changes without sending them
    #[arg(long)]
    dry_run: bool,

    /// trace, debug, info, warn or error
    #[arg(long)]
    log_level: Option<String>,
}

/// Settings resolved from flags and environment
struct Settings {
    config: DdnsConfig,
    log_level: Level,
}

impl Settings {
    /// Resolve every setting; `lookup` reads the environment
    fn resolve<F>(args: Args, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let credentials = Credentials::new(
            resolve_setting(args.api_key, "API key", ENV_API_KEY, &lookup)?,
            resolve_setting(args.api_secret, "API secret", ENV_API_SECRET, &lookup)?,
        );
        let target = Target::new(
            resolve_setting(args.domain, "domain", ENV_DOMAIN, &lookup)?,
            resolve_setting(args.name, "record name", ENV_NAME, &lookup)?,
        );

        let mut config = DdnsConfig::new(credentials, target);

        if let Some(url) = resolve_optional(args.ip_url, ENV_IP_URL, &lookup) {
            config.endpoints.ip_echo_url = url;
        }
        if let Some(base) = resolve_optional(args.api_base, ENV_API_BASE, &lookup) {
            config.endpoints.provider_base_url = base;
        }

        match args.ttl {
            Some(ttl) => config.engine.ttl = ttl,
            None => {
                if let Some(raw) = lookup(ENV_TTL).filter(|v| !v.trim().is_empty()) {
                    config.engine.ttl = raw
                        .trim()
                        .parse()
                        .with_context(|| format!("{ENV_TTL} must be a number of seconds. Got: {raw}"))?;
                }
            }
        }

        config.engine.dry_run = args.dry_run
            || lookup(ENV_MODE).is_some_and(|mode| mode.trim().eq_ignore_ascii_case("dry-run"));

        config.validate()?;

        let level = resolve_optional(args.log_level, ENV_LOG_LEVEL, &lookup)
            .unwrap_or_else(|| "info".to_string());
        let log_level = parse_level(&level)?;

        Ok(Self { config, log_level })
    }
}

fn parse_level(level: &str) -> Result<Level> {
    match level.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => anyhow::bail!(
            "{ENV_LOG_LEVEL} '{}' is not valid. \
            Valid levels: trace, debug, info, warn, error",
            level
        ),
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    let settings = match Settings::resolve(args, |name| std::env::var(name).ok()) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            return DdnsExitCode::ConfigError.into();
        }
    };

    if let Err(code) = init_tracing(settings.log_level) {
        return code.into();
    }

    // One thread of control; every call is awaited in order
    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return DdnsExitCode::RuntimeError.into();
        }
    };

    rt.block_on(run(settings.config)).into()
}

fn init_tracing(level: Level) -> std::result::Result<(), DdnsExitCode> {
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();

    tracing::subscriber::set_global_default(subscriber).map_err(|e| {
        eprintln!("Failed to set tracing subscriber: {}", e);
        DdnsExitCode::RuntimeError
    })
}

/// Build the components and perform one run
async fn run(config: DdnsConfig) -> DdnsExitCode {
    info!(
        "Updating {} (provider: spaceship{})",
        config.target.fqdn(),
        if config.engine.dry_run { ", DRY-RUN" } else { "" }
    );

    let engine = match build_engine(&config) {
        Ok(engine) => engine,
        Err(e) => {
            error!("Startup error: {}", e);
            return if e.is_config() {
                DdnsExitCode::ConfigError
            } else {
                DdnsExitCode::RuntimeError
            };
        }
    };

    match engine.run_once().await {
        Ok(report) => exit_code_for(&report),
        Err(e) => {
            error!("Run aborted: {}", e);
            DdnsExitCode::RuntimeError
        }
    }
}

fn build_engine(config: &DdnsConfig) -> ddns_core::Result<DdnsEngine> {
    let ip_source = HttpIpSource::new(config.endpoints.ip_echo_url.clone())?;
    let provider = SpaceshipProvider::from_config(config)?;
    DdnsEngine::new(Box::new(ip_source), Box::new(provider), config)
}

/// Any failed mutation makes the run exit non-zero
fn exit_code_for(report: &RunReport) -> DdnsExitCode {
    if report.is_success() {
        return DdnsExitCode::Success;
    }

    for failure in report.failures() {
        error!("Failed to {} {}", failure.kind(), failure.record());
    }
    DdnsExitCode::PartialFailure
}
