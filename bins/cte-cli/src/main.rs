//! cte: command-line harness for the Capture the Ether challenges.
//!
//! Lists the challenge catalogue, runs exploit scenarios against the
//! vulnerable and fixed variants, and computes the hashes the lottery
//! contracts commit to.

use std::path::PathBuf;
use std::process;

use anyhow::{anyhow, bail, Context, Result};
use clap::{ArgGroup, Args, Parser, Subcommand, ValueEnum};
use tracing::{error, info, warn};

use cte_challenges::catalogue::{ChallengeId, Variant};
use cte_challenges::config::ChallengeConfig;
use cte_core::commitment::{commitment_hash, keccak256, pack, Token};
use cte_core::types::Hash256;
use cte_core::U256;
use cte_exploits::{load_config, Scenario, ScenarioReport};

/// Capture the Ether: vulnerable and fixed contract puzzles, modeled.
#[derive(Parser, Debug)]
#[command(name = "cte", version, about = "Capture the Ether challenge harness")]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "CTE_LOG", default_value = "info")]
    log_level: String,

    /// Log output format
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    /// JSON file overriding challenge parameters
    #[arg(long, global = true, env = "CTE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List every challenge with its variants and weakness.
    List,
    /// Run exploit scenarios.
    Run(RunArgs),
    /// Compute a lottery commitment or answer hash.
    Hash(HashArgs),
    /// Print the effective challenge parameters as JSON.
    Config,
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Challenge slug (see `cte list`), or "all"
    challenge: String,

    /// Which variants to attack
    #[arg(long, value_enum, default_value_t = VariantArg::Both)]
    variant: VariantArg,

    /// Print the full reports as JSON
    #[arg(long)]
    json: bool,

    /// Seed for block hashes and owner secrets (64 hex digits)
    #[arg(long)]
    seed: Option<Hash256>,
}

#[derive(Args, Debug)]
#[command(group(ArgGroup::new("preimage").required(true).args(["uint8", "uint256"])))]
struct HashArgs {
    /// Answer for `keccak256(uint8 n, bytes32 salt)`
    #[arg(long, requires = "salt")]
    uint8: Option<u8>,

    /// Salt for the commitment (64 hex digits)
    #[arg(long, requires = "uint8")]
    salt: Option<Hash256>,

    /// Decimal answer for `keccak256(uint256 n)`
    #[arg(long)]
    uint256: Option<String>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum LogFormat {
    Text,
    Json,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum VariantArg {
    Vulnerable,
    Fixed,
    Both,
}

impl VariantArg {
    fn variants(self) -> &'static [Variant] {
        match self {
            Self::Vulnerable => &[Variant::Vulnerable],
            Self::Fixed => &[Variant::Fixed],
            Self::Both => &[Variant::Vulnerable, Variant::Fixed],
        }
    }
}

/// Settings assembled from flags, environment and the optional config file.
#[derive(Debug)]
struct CliConfig {
    log_level: String,
    log_format: LogFormat,
    challenges: ChallengeConfig,
}

impl CliConfig {
    fn from_cli(cli: &Cli) -> Result<Self> {
        let challenges = match &cli.config {
            Some(path) => load_config(path)?,
            None => ChallengeConfig::default(),
        };
        Ok(Self {
            log_level: cli.log_level.clone(),
            log_format: cli.log_format,
            challenges,
        })
    }
}

fn main() {
    let cli = Cli::parse();
    let config = match CliConfig::from_cli(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e:#}");
            process::exit(2);
        }
    };

    init_logging(&config.log_level, config.log_format);

    if let Err(e) = dispatch(cli.command, &config) {
        error!("{e:#}");
        process::exit(1);
    }
}

fn dispatch(command: Commands, config: &CliConfig) -> Result<()> {
    match command {
        Commands::List => {
            print!("{}", render_list());
            Ok(())
        }
        Commands::Run(args) => run(&args, config),
        Commands::Hash(args) => {
            println!("{}", hash_preimage(&args)?);
            Ok(())
        }
        Commands::Config => {
            let json = serde_json::to_string_pretty(&config.challenges)
                .context("failed to serialize config")?;
            println!("{json}");
            Ok(())
        }
    }
}

fn render_list() -> String {
    let mut out = String::new();
    for id in ChallengeId::ALL {
        let variants: Vec<String> = id.variants().iter().map(|v| v.to_string()).collect();
        out.push_str(&format!(
            "{:<26} {:<8} {:<18} {}\n",
            id.slug(),
            id.category(),
            variants.join("/"),
            id.weakness()
        ));
    }
    out
}

/// Challenges named by `selector`: one slug, or every challenge for "all".
fn select(selector: &str) -> Result<Vec<ChallengeId>> {
    if selector == "all" {
        return Ok(ChallengeId::ALL.to_vec());
    }
    let id = selector
        .parse::<ChallengeId>()
        .map_err(|e| anyhow!("{e} (try `cte list`)"))?;
    Ok(vec![id])
}

fn run(args: &RunArgs, config: &CliConfig) -> Result<()> {
    let ids = select(&args.challenge)?;
    let mut reports = Vec::new();
    for id in ids {
        let mut scenario = Scenario::new(id).with_config(config.challenges.clone());
        if let Some(seed) = args.seed {
            scenario = scenario.with_seed(seed);
        }
        for variant in args.variant.variants() {
            if id.variants().contains(variant) {
                reports.push(scenario.run(*variant));
            }
        }
    }
    if reports.is_empty() {
        bail!("{} has no {:?} variant to run", args.challenge, args.variant);
    }

    if args.json {
        let json = serde_json::to_string_pretty(&reports).context("failed to serialize reports")?;
        println!("{json}");
    } else {
        for report in &reports {
            println!("{}", summary_line(report));
        }
    }

    let surprises = unexpected(&reports);
    info!(scenarios = reports.len(), unexpected = surprises, "run finished");
    if surprises > 0 {
        warn!(unexpected = surprises, "some scenarios did not end as expected");
        bail!("{surprises} scenario(s) ended unexpectedly");
    }
    Ok(())
}

fn summary_line(report: &ScenarioReport) -> String {
    let status = if report.completed { "COMPLETED" } else { "held" };
    let mut line = format!(
        "{:<26} {:<10} {:<9} balance={} wei",
        report.challenge.slug(),
        report.variant,
        status,
        report.balance
    );
    if let Some(err) = &report.error {
        line.push_str(&format!(" ({err})"));
    }
    line
}

/// Reports whose outcome contradicts the variant: a vulnerable challenge
/// left standing or a fixed one completed.
fn unexpected(reports: &[ScenarioReport]) -> usize {
    reports
        .iter()
        .filter(|r| r.completed != (r.variant == Variant::Vulnerable))
        .count()
}

fn hash_preimage(args: &HashArgs) -> Result<Hash256> {
    match (args.uint8, args.salt, &args.uint256) {
        (Some(n), Some(salt), None) => Ok(commitment_hash(n, &salt)),
        (None, None, Some(decimal)) => {
            let n = U256::from_dec_str(decimal).map_err(|e| anyhow!("invalid uint256 {decimal}: {e:?}"))?;
            Ok(keccak256(pack(&[Token::Uint256(n)])))
        }
        _ => bail!("pass either --uint8 with --salt, or --uint256"),
    }
}

/// Initialize tracing subscriber with the given log level and output format.
///
/// Pass `LogFormat::Json` for structured JSON output. Logs go to stderr so
/// reports on stdout stay machine-readable.
fn init_logging(level_str: &str, format: LogFormat) {
    use tracing_subscriber::filter::EnvFilter;
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level_str));

    match format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init(),
        LogFormat::Text => tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_level(true)
                    .with_writer(std::io::stderr),
            )
            .init(),
    }
}
