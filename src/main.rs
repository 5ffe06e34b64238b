use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use logdecode::config::{self, Config};
use logdecode::domain::abi::{CandidateStore, InterfaceDefinition};
use logdecode::domain::{RawLog, RpcLog, TracingSink, TransactionContext};
use logdecode::export::{self, OutputFormat};
use logdecode::infrastructure::{AbiScanner, OpenChainCandidateStore};
use logdecode::store::{LayeredCandidateStore, MemoryCandidateStore, SqliteCandidateStore};
use logdecode::LogDecoder;

#[derive(Debug, Parser)]
#[command(
    name = "logdecode",
    version,
    about = "Decode EVM event logs, verified or best-guess"
)]
struct Args {
    /// Fragment database (defaults to the configured or data-dir path)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Decode one log object, or an array of them
    Decode {
        /// Log JSON as returned by eth_getLogs: inline, a file path, or `-` for stdin
        log: String,

        /// Verified ABI of the target contract
        #[arg(long)]
        abi: Option<PathBuf>,

        /// Transaction target (defaults to the log's emitting address)
        #[arg(long, conflicts_with = "no_target")]
        target: Option<String>,

        /// Treat the transaction as a contract creation
        #[arg(long)]
        no_target: bool,

        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Fall back to OpenChain when the local store has no candidate
        #[arg(long)]
        remote: bool,
    },
    /// Import fragments from build artifacts (out/ or artifacts/ directories)
    Import {
        /// Roots to scan (defaults to configured abi_paths, then the current directory)
        paths: Vec<PathBuf>,
    },
    /// Show what the fragment database holds
    Stats,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = config::load();
    config::init_tracing(&config.log)?;

    match args.command {
        Command::Decode {
            log,
            abi,
            target,
            no_target,
            format,
            remote,
        } => {
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()
                .context("Failed to create Tokio runtime")?;
            let options = DecodeOptions {
                log,
                abi,
                target,
                no_target,
                format,
                remote: remote || config.remote_lookup,
            };
            runtime.block_on(run_decode(args.db, &config, options))
        }
        Command::Import { paths } => run_import(args.db, &config, paths),
        Command::Stats => run_stats(args.db, &config),
    }
}

struct DecodeOptions {
    log: String,
    abi: Option<PathBuf>,
    target: Option<String>,
    no_target: bool,
    format: OutputFormat,
    remote: bool,
}

async fn run_decode(db: Option<PathBuf>, config: &Config, options: DecodeOptions) -> Result<()> {
    let logs = read_logs(&options.log)?;
    let known_interface = match &options.abi {
        Some(path) => Some(load_definition(path)?),
        None => None,
    };

    let store = build_store(db, config, options.remote)?;
    let decoder =
        LogDecoder::new(store, Arc::new(TracingSink)).with_lookup_timeout(config.lookup_timeout());

    let mut outcomes = Vec::with_capacity(logs.len());
    for log in &logs {
        let mut context = if options.no_target {
            TransactionContext::without_target()
        } else {
            TransactionContext::new(options.target.clone().unwrap_or_else(|| log.address.clone()))
        };
        context.known_interface = known_interface.clone();
        outcomes.push(decoder.decode(log, &context).await);
    }

    let stdout = io::stdout();
    export::write_outcomes(stdout.lock(), options.format, &outcomes)
}

fn run_import(db: Option<PathBuf>, config: &Config, paths: Vec<PathBuf>) -> Result<()> {
    let mut roots = if paths.is_empty() {
        config.abi_roots()
    } else {
        paths
    };
    if roots.is_empty() {
        roots.push(std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));
    }

    let store = open_sqlite(db, config)?;
    let report = AbiScanner::scan_roots(&roots);
    for error in &report.errors {
        tracing::warn!(%error, "skipped artifact");
    }

    let written = store.record_all(
        report
            .fragments
            .iter()
            .map(|(fragment, path)| (fragment, path.display().to_string())),
    )?;
    tracing::info!(
        fragments = written,
        files = report.scanned_files,
        errors = report.errors.len(),
        scan_ms = report.scan_ms as u64,
        "import finished"
    );
    println!(
        "imported {} fragments from {} files ({} errors) in {} ms",
        written,
        report.scanned_files,
        report.errors.len(),
        report.scan_ms
    );
    Ok(())
}

fn run_stats(db: Option<PathBuf>, config: &Config) -> Result<()> {
    let store = open_sqlite(db, config)?;
    let stats = store.stats()?;
    println!("fragments:   {}", stats.fragments);
    println!("identifiers: {}", stats.identifiers);
    match stats.newest {
        Some(newest) => println!("newest:      {}", newest.format("%Y-%m-%d %H:%M:%S UTC")),
        None => println!("newest:      -"),
    }
    Ok(())
}

fn build_store(
    db: Option<PathBuf>,
    config: &Config,
    remote: bool,
) -> Result<Arc<dyn CandidateStore>> {
    let local: Arc<dyn CandidateStore> = match db.or_else(|| config.candidate_db_path()) {
        Some(path) => Arc::new(open_sqlite_at(&path)?),
        None => {
            tracing::warn!("no data directory, decoding without stored fragments");
            Arc::new(MemoryCandidateStore::new())
        }
    };
    if !remote {
        return Ok(local);
    }

    let remote = OpenChainCandidateStore::new(config.openchain_url(), config.lookup_timeout())?;
    Ok(Arc::new(LayeredCandidateStore::new(local, Arc::new(remote))))
}

fn open_sqlite(db: Option<PathBuf>, config: &Config) -> Result<SqliteCandidateStore> {
    let Some(path) = db.or_else(|| config.candidate_db_path()) else {
        bail!("no fragment database path; pass --db or set candidate_db");
    };
    open_sqlite_at(&path)
}

fn open_sqlite_at(path: &Path) -> Result<SqliteCandidateStore> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("create data dir {}", parent.display()))?;
    }
    SqliteCandidateStore::open(path)
}

fn load_definition(path: &Path) -> Result<InterfaceDefinition> {
    let content =
        fs::read_to_string(path).with_context(|| format!("read abi {}", path.display()))?;
    InterfaceDefinition::from_json(&content).with_context(|| format!("parse abi {}", path.display()))
}

fn read_logs(input: &str) -> Result<Vec<RawLog>> {
    let content = if input == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("read log from stdin")?;
        buf
    } else if Path::new(input).is_file() {
        fs::read_to_string(input).with_context(|| format!("read log {input}"))?
    } else {
        input.to_string()
    };

    let value: serde_json::Value = serde_json::from_str(&content).context("log is not JSON")?;
    let rpc_logs: Vec<RpcLog> = if value.is_array() {
        serde_json::from_value(value)?
    } else {
        vec![serde_json::from_value(value)?]
    };

    rpc_logs
        .into_iter()
        .map(|log| RawLog::try_from(log).map_err(anyhow::Error::from))
        .collect()
}
