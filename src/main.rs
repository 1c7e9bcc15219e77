use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use clap::builder::RangedU64ValueParser;
use tracing::info;

use deps_scanner::cli::{FAILURE_EXIT_CODE, parse_args};
use deps_scanner::config::{DEFAULT_PUBLIC_INDEX_URL, FETCH_TIMEOUT_MS, ScanConfig, default_concurrency};
use deps_scanner::parser::{DirectDependencies, load_direct_dependencies, load_lock_file};
use deps_scanner::report::{ReportFormat, render};
use deps_scanner::scan::Scanner;
use deps_scanner::version::comparator::VersionScheme;
use deps_scanner::version::registries::PypiIndexClient;

#[derive(Parser)]
#[command(name = "scan-deps")]
#[command(version, about = "Report locked packages that are behind their package index")]
struct Cli {
    /// Path to poetry.lock
    lock_file: PathBuf,

    /// Path to pyproject.toml, used to tell direct from transitive dependencies
    manifest: Option<PathBuf>,

    /// Output layout
    #[arg(long, value_enum, default_value_t = ReportFormat::Table)]
    format: ReportFormat,

    /// Version ordering used to pick the latest release
    #[arg(long, value_enum, default_value_t = VersionScheme::Pep440)]
    version_scheme: VersionScheme,

    /// Maximum number of packages checked at the same time
    #[arg(long, default_value_t = default_concurrency(), value_parser = RangedU64ValueParser::<usize>::new().range(1..))]
    jobs: usize,

    /// Timeout for a single index request in milliseconds
    #[arg(long, default_value_t = FETCH_TIMEOUT_MS)]
    timeout_ms: u64,

    /// Base URL of the public registry's JSON API
    #[arg(long, default_value = DEFAULT_PUBLIC_INDEX_URL)]
    public_index: String,
}

impl Cli {
    fn scan_config(&self) -> ScanConfig {
        ScanConfig {
            max_concurrency: self.jobs,
            fetch_timeout: Duration::from_millis(self.timeout_ms),
            version_scheme: self.version_scheme,
            public_index_url: self.public_index.clone(),
        }
    }
}

fn main() -> ExitCode {
    let cli = match parse_args::<Cli>() {
        Ok(cli) => cli,
        Err(code) => return code,
    };
    let _guard = deps_scanner::logging::init();

    let result = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")
        .and_then(|runtime| runtime.block_on(run(&cli)));

    match result {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(FAILURE_EXIT_CODE)
        }
    }
}

async fn run(cli: &Cli) -> anyhow::Result<String> {
    let packages = load_lock_file(&cli.lock_file)
        .with_context(|| format!("Failed to load lock file {}", cli.lock_file.display()))?;
    let direct_dependencies = cli
        .manifest
        .as_deref()
        .map(load_manifest)
        .transpose()?
        .flatten();

    let config = cli.scan_config();
    info!(
        "Loaded {} packages from {}",
        packages.len(),
        cli.lock_file.display()
    );

    let client = PypiIndexClient::new(config.fetch_timeout)
        .context("Failed to build HTTP client")?;
    let scanner = Scanner::new(Arc::new(client), &config);
    let report = scanner.scan(packages, direct_dependencies.as_ref()).await;

    Ok(render(&report, cli.format))
}

fn load_manifest(path: &Path) -> anyhow::Result<Option<DirectDependencies>> {
    load_direct_dependencies(path)
        .with_context(|| format!("Failed to load manifest {}", path.display()))
}
