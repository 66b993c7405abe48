use clap::Parser;
use core::time::Duration;
use std::path::PathBuf;
use userlog_core::{
    ActionCatalog, DEFAULT_ACTIONS, DEFAULT_EMAIL_DOMAIN, Error, LOG_ENTRY_LIMIT, Result,
};

/// Runtime configuration for the `userlog-pipeline` binary.
///
/// These settings control how much work a run performs, how wide each worker
/// pool is, how much the queues between stages may buffer, and what content is
/// synthesized. All values are parsed from CLI arguments or environment
/// variables (a `.env` file is honored), with defaults that reproduce a run of
/// 100 users over 100 workers per stage.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "userlog-pipeline",
    version,
    about = "Synthesizes user activity logs and writes one report per user"
)]
pub struct CliArgs {
    /// Total number of users (jobs) to synthesize and persist.
    ///
    /// Job ids are dense over `0..NUM_JOBS`; each produces `uid<id>.txt`.
    ///
    /// Environment variable: `NUM_JOBS`
    #[arg(long, env = "NUM_JOBS", default_value_t = 100)]
    pub num_jobs: u64,

    /// Number of workers in each pool.
    ///
    /// The generation and persistence pools are the same size and fixed for
    /// the whole run.
    ///
    /// Environment variable: `NUM_WORKERS`
    #[arg(long, env = "NUM_WORKERS", default_value_t = 100)]
    pub num_workers: usize,

    /// Capacity of each bounded queue between pipeline stages.
    ///
    /// Lower values tighten backpressure between the job source, the
    /// generation pool and the persistence pool; higher values let producers
    /// run further ahead.
    ///
    /// Environment variable: `QUEUE_CAPACITY`
    #[arg(long, env = "QUEUE_CAPACITY", default_value_t = 100)]
    pub queue_capacity: usize,

    /// Directory receiving one report per user. Cleared before each run.
    ///
    /// Environment variable: `OUTPUT_DIR`
    #[arg(long, env = "OUTPUT_DIR", default_value = "users")]
    pub output_dir: PathBuf,

    /// Simulated processing latency per generated user, in milliseconds.
    ///
    /// Environment variable: `GENERATION_DELAY_MS`
    #[arg(long, env = "GENERATION_DELAY_MS", default_value_t = 100)]
    pub generation_delay_ms: u64,

    /// Simulated latency per written report, in milliseconds.
    ///
    /// Environment variable: `WRITE_DELAY_MS`
    #[arg(long, env = "WRITE_DELAY_MS", default_value_t = 1000)]
    pub write_delay_ms: u64,

    /// Upper bound (inclusive) on log entries per user.
    ///
    /// Each user's log length is drawn uniformly from `0..=MAX_LOG_ENTRIES`.
    /// Values above 100000 are rejected.
    ///
    /// Environment variable: `MAX_LOG_ENTRIES`
    #[arg(long, env = "MAX_LOG_ENTRIES", default_value_t = 999)]
    pub max_log_entries: usize,

    /// Domain used to derive `user<id>@<domain>` emails.
    ///
    /// Environment variable: `EMAIL_DOMAIN`
    #[arg(long, env = "EMAIL_DOMAIN", default_value = DEFAULT_EMAIL_DOMAIN)]
    pub email_domain: String,

    /// Comma separated list of actions a log entry may record.
    ///
    /// Environment variable: `ACTIONS`
    #[arg(
        long,
        env = "ACTIONS",
        value_delimiter = ',',
        default_values_t = DEFAULT_ACTIONS.map(String::from)
    )]
    pub actions: Vec<String>,

    /// Base seed for the per-worker random generators.
    ///
    /// When unset, every worker is seeded from the operating system.
    ///
    /// Environment variable: `SEED`
    #[arg(long, env = "SEED")]
    pub seed: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub num_jobs: u64,
    pub num_workers: usize,
    pub queue_capacity: usize,
    pub output_dir: PathBuf,
    pub generation_delay: Duration,
    pub write_delay: Duration,
    pub max_log_entries: usize,
    pub email_domain: String,
    pub catalog: ActionCatalog,
    pub seed: Option<u64>,
}

impl PipelineConfig {
    /// Checks every bound a run relies on.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] naming the offending setting.
    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: String| Err(Error::InvalidConfig { reason });

        if self.num_workers == 0 {
            return invalid("NUM_WORKERS must be greater than 0".to_string());
        }

        if self.queue_capacity == 0 {
            return invalid("QUEUE_CAPACITY must be greater than 0".to_string());
        }

        if self.max_log_entries > LOG_ENTRY_LIMIT {
            return invalid(format!(
                "MAX_LOG_ENTRIES must be at most {LOG_ENTRY_LIMIT}, got {}",
                self.max_log_entries
            ));
        }

        if self.email_domain.trim().is_empty() {
            return invalid("EMAIL_DOMAIN must not be empty".to_string());
        }

        Ok(())
    }
}

impl TryFrom<CliArgs> for PipelineConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> core::result::Result<Self, Self::Error> {
        let catalog = ActionCatalog::new(args.actions.iter().map(|a| a.trim().to_string()))?;

        let config = Self {
            num_jobs: args.num_jobs,
            num_workers: args.num_workers,
            queue_capacity: args.queue_capacity,
            output_dir: args.output_dir,
            generation_delay: Duration::from_millis(args.generation_delay_ms),
            write_delay: Duration::from_millis(args.write_delay_ms),
            max_log_entries: args.max_log_entries,
            email_domain: args.email_domain,
            catalog,
            seed: args.seed,
        };
        config.validate()?;
        Ok(config)
    }
}
