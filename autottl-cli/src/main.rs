use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

use autottl::logging::{init_logging_with_level, is_initialized, LoggingMode};
use autottl::{
    human_interval, unix_now, AutoTtl, AutoTtlConfig, FeedStats, FileSessionStore,
    MemorySessionStore, MemorySource, SessionStore, SourceId, TimeField,
};

pub mod report;

use report::{render_json, render_stats_rows, render_ttl_rows, StatsRow, TtlRow};

/// Adaptive TTL estimates
///
/// Reads feeds and their entry timestamps from a JSON fixture and prints the
/// polling interval each feed should get, or a ranking of feeds by activity.
/// Burst state is kept in a session file between runs.
#[derive(Parser, Debug)]
#[command(name = "autottl")]
#[command(about = "Adaptive polling intervals from feed publication history")]
#[command(version)]
pub struct Args {
    /// JSON fixture with feeds and entries
    #[arg(short, long, global = true)]
    pub fixture: Option<PathBuf>,

    /// Fallback interval in seconds
    #[arg(long, global = true)]
    pub default_interval: Option<i64>,

    /// Upper bound on the interval in seconds
    #[arg(long, global = true)]
    pub max_interval: Option<i64>,

    /// Lower bound on the interval in seconds
    #[arg(long, global = true)]
    pub min_interval: Option<i64>,

    /// Most recent entries considered per feed
    #[arg(long, global = true)]
    pub sample_count: Option<usize>,

    /// Timestamp semantic: "lastSeen" (observed) or "date" (declared)
    #[arg(long, global = true, value_parser = ["lastSeen", "date"])]
    pub time_field: Option<String>,

    /// New entries per window above which a feed is bursting
    #[arg(long, global = true)]
    pub burst_threshold: Option<usize>,

    /// Quiet windows required to leave burst
    #[arg(long, global = true)]
    pub burst_max_miss: Option<u32>,

    /// Session file for burst state (defaults to the user cache dir)
    #[arg(long, global = true)]
    pub session: Option<PathBuf>,

    /// Keep burst state in memory for this run only
    #[arg(long, global = true, conflicts_with = "session")]
    pub ephemeral: bool,

    /// Evaluate against this Unix time instead of the clock
    #[arg(long, global = true)]
    pub now: Option<i64>,

    /// Print JSON instead of a table
    #[arg(long, global = true)]
    pub json: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Print the adjusted TTL of each feed
    Ttl {
        /// Feed ids
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Rank feeds by mean interval, most active first
    Stats {
        /// List feeds with an explicit TTL instead of automatic ones
        #[arg(long)]
        manual: bool,
    },
    /// Format a number of seconds as a calendar duration
    Humanize {
        #[arg(allow_negative_numbers = true)]
        seconds: i64,
    },
}

impl Command {
    fn needs_fixture(&self) -> bool {
        !matches!(self, Command::Humanize { .. })
    }
}

impl Args {
    /// Validate command line arguments
    pub fn validate(&self) -> Result<()> {
        if self.command.needs_fixture() && self.fixture.is_none() {
            return Err(anyhow::anyhow!(
                "A fixture is required: pass --fixture or set AUTOTTL_FIXTURE"
            ));
        }

        match self.log_level.to_lowercase().as_str() {
            "error" | "warn" | "info" | "debug" | "trace" => {}
            _ => {
                return Err(anyhow::anyhow!(
                    "Invalid log level '{}'. Valid levels: error, warn, info, debug, trace",
                    self.log_level
                ));
            }
        }

        self.autottl_config()
            .validate()
            .context("Invalid interval settings")?;

        Ok(())
    }

    /// Library configuration with command line overrides applied
    pub fn autottl_config(&self) -> AutoTtlConfig {
        let defaults = AutoTtlConfig::default();
        let mut config = AutoTtlConfig::new().with_intervals(
            self.default_interval.unwrap_or(defaults.default_interval),
            self.min_interval.unwrap_or(defaults.min_interval),
            self.max_interval.unwrap_or(defaults.max_interval),
        );

        if let Some(count) = self.sample_count {
            config = config.with_sample_count(count);
        }
        if let Some(field) = &self.time_field {
            config = config.with_time_field(TimeField::from(field.clone()));
        }
        if self.burst_threshold.is_some() || self.burst_max_miss.is_some() {
            config = config.with_burst(
                self.burst_threshold.unwrap_or(defaults.burst_threshold),
                self.burst_max_miss.unwrap_or(defaults.burst_max_miss),
            );
        }

        config
    }
}

/// Where burst state lives for this run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionLocation {
    File(PathBuf),
    UserCache,
    Ephemeral,
}

/// Configuration derived from command line arguments and environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub autottl: AutoTtlConfig,
    pub fixture: Option<PathBuf>,
    pub session: SessionLocation,
    pub now: Option<i64>,
    pub json: bool,
    pub log_level: String,
    pub command: Command,
}

impl From<Args> for Config {
    fn from(args: Args) -> Self {
        let session = match (&args.session, args.ephemeral) {
            (_, true) => SessionLocation::Ephemeral,
            (Some(path), false) => SessionLocation::File(path.clone()),
            (None, false) => SessionLocation::UserCache,
        };

        Self {
            autottl: args.autottl_config(),
            fixture: args.fixture,
            session,
            now: args.now,
            json: args.json,
            log_level: args.log_level,
            command: args.command,
        }
    }
}

impl Config {
    /// Create configuration from command line arguments and environment variables
    pub fn from_env() -> Result<Self> {
        let mut args = Args::parse();

        if args.fixture.is_none() {
            if let Ok(fixture) = std::env::var("AUTOTTL_FIXTURE") {
                args.fixture = Some(PathBuf::from(fixture));
            }
        }

        if args.session.is_none() {
            if let Ok(session) = std::env::var("AUTOTTL_SESSION") {
                args.session = Some(PathBuf::from(session));
            }
        }

        if let Ok(now) = std::env::var("AUTOTTL_NOW") {
            args.now = Some(
                now.parse()
                    .context("Invalid AUTOTTL_NOW environment variable")?,
            );
        }

        if let Ok(log_level) = std::env::var("AUTOTTL_LOG_LEVEL") {
            args.log_level = log_level;
        }

        args.validate()?;

        Ok(Config::from(args))
    }

    /// Log configuration summary
    pub fn log_summary(&self) {
        info!("Configuration:");
        info!(
            "  Intervals: default {}s, min {}s, max {}s",
            self.autottl.default_interval,
            self.autottl.min_interval,
            self.autottl.max_interval
        );
        info!("  Sample count: {}", self.autottl.sample_count);
        info!("  Time field: {}", self.autottl.time_field);
        info!(
            "  Burst: threshold {}, max miss {}",
            self.autottl.burst_threshold, self.autottl.burst_max_miss
        );
        info!("  Session: {:?}", self.session);
    }

    fn load_source(&self) -> Result<Arc<MemorySource>> {
        let path = self
            .fixture
            .as_ref()
            .context("No fixture configured")?;
        let source = MemorySource::from_path(path)
            .with_context(|| format!("Failed to load fixture {}", path.display()))?;
        Ok(Arc::new(source))
    }

    fn open_sessions(&self) -> Result<Arc<dyn SessionStore>> {
        let store: Arc<dyn SessionStore> = match &self.session {
            SessionLocation::File(path) => Arc::new(FileSessionStore::new(path)),
            SessionLocation::UserCache => Arc::new(
                FileSessionStore::open_default().context("Failed to locate session file")?,
            ),
            SessionLocation::Ephemeral => Arc::new(MemorySessionStore::new()),
        };
        Ok(store)
    }

    fn now(&self) -> i64 {
        self.now.unwrap_or_else(unix_now)
    }
}

/// Initialize tracing with the specified log level
/// Install the stderr subscriber unless one is already in place
fn init_tracing(log_level: &str) -> Result<()> {
    if is_initialized() {
        return Ok(());
    }
    init_logging_with_level(LoggingMode::Development, Some(&log_level.to_lowercase()))
        .context("Failed to initialize logging")
}

fn run(config: &Config) -> Result<String> {
    match &config.command {
        Command::Humanize { seconds } => Ok(format!("{}\n", human_interval(*seconds))),
        Command::Ttl { ids } => run_ttl(config, ids),
        Command::Stats { manual } => run_stats(config, !manual),
    }
}

fn run_ttl(config: &Config, ids: &[String]) -> Result<String> {
    let source = config.load_source()?;
    let auto = AutoTtl::new(config.autottl.clone(), source, config.open_sessions()?)?;
    let now = config.now();

    let mut rows = Vec::with_capacity(ids.len());
    for id in ids.iter().map(SourceId::new) {
        let ttl = auto
            .adjusted_ttl_at(&id, now)
            .with_context(|| format!("Failed to adjust TTL for {}", id))?;
        let status = auto.status_at(&id, now)?;
        debug!(source = %id, ttl, %status, "computed ttl");
        rows.push(TtlRow::new(id, ttl, status));
    }

    if config.json {
        Ok(render_json(&rows)?)
    } else {
        Ok(render_ttl_rows(&rows))
    }
}

fn run_stats(config: &Config, auto_ttl_only: bool) -> Result<String> {
    let source = config.load_source()?;
    let stats = FeedStats::new(&config.autottl, Arc::clone(&source), Arc::clone(&source));
    let auto = AutoTtl::new(config.autottl.clone(), source, config.open_sessions()?)?;
    let now = config.now();

    let ranked = stats
        .list_sources(auto_ttl_only)
        .context("Failed to rank feeds")?;
    info!("Ranked {} feed(s)", ranked.len());

    let rows = ranked
        .into_iter()
        .map(|summary| -> Result<StatsRow> {
            let status = auto.summary_status(&summary, now)?;
            Ok(StatsRow::new(summary, status))
        })
        .collect::<Result<Vec<_>>>()?;

    if config.json {
        Ok(render_json(&rows)?)
    } else {
        Ok(render_stats_rows(&rows))
    }
}

fn main() -> Result<()> {
    let config = Config::from_env()?;

    init_tracing(&config.log_level)?;
    config.log_summary();

    let output = run(&config)?;
    print!("{}", output);
    Ok(())
}
