#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

use anyhow::Result;
use clap::Parser;
use ghproxy::server;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ghproxy", about = "GitHub API proxy with path-simplified request metrics")]
struct Cli {
    /// Path to proxy config file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Listen address, overrides the config file
    #[arg(short, long)]
    listen: Option<String>,

    /// Admin API listen address (for health/metrics/simplify)
    #[arg(long)]
    admin_listen: Option<String>,

    /// Tokio worker threads (default: number of CPUs)
    #[arg(long)]
    worker_threads: Option<usize>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut builder = tokio::runtime::Builder::new_multi_thread();
    if let Some(n) = cli.worker_threads.filter(|n| *n > 0) {
        builder.worker_threads(n);
    }
    let rt = builder.enable_all().build()?;

    rt.block_on(server::bootstrap::run(server::bootstrap::BootstrapArgs {
        config_path: cli.config,
        listen: cli.listen,
        admin_listen: cli.admin_listen,
    }))
}
