//! rblscan - check IP addresses against DNS blacklists.
//!
//! This is the command-line interface for the rblscan library.

use anyhow::Result;
use clap::{Parser, Subcommand};
use rblscan::{target, zones, CheckConfig, CheckEngine, PrintSink};
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for the blacklist checker.
#[derive(Parser, Debug)]
#[clap(author, version, about = "Check IP addresses against DNS blacklists", long_about = None)]
struct Args {
    /// Verbose mode
    #[clap(short, long, global = true)]
    verbose: bool,

    /// Name server to use
    #[clap(short, long, global = true, default_value = "8.8.8.8:53")]
    nameserver: SocketAddr,

    /// How many requests to process at one time
    #[clap(short, long, global = true, default_value_t = 15)]
    queue: usize,

    /// Give up on a pair after this many failed attempts instead of
    /// retrying forever
    #[clap(long, global = true)]
    retry_limit: Option<u32>,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check an IP address against the available blacklists
    Ip {
        /// IPv4 address to check
        address: Ipv4Addr,
    },
    /// Check every host in a CIDR block against the available blacklists
    Cidr {
        /// CIDR block to expand, e.g. 192.0.2.0/28
        block: String,
    },
    /// List the available blacklists
    List,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    match &args.command {
        Command::List => {
            for zone in zones::builtin_zones() {
                println!("{zone}");
            }
            Ok(())
        }
        Command::Ip { address } => run_checks(vec![*address], &args).await,
        Command::Cidr { block } => {
            // a malformed block aborts before anything is queued
            let network = target::parse_cidr(block)?;
            run_checks(target::expand_hosts(&network), &args).await
        }
    }
}

async fn run_checks(addresses: Vec<Ipv4Addr>, args: &Args) -> Result<()> {
    let mut builder = CheckConfig::builder()
        .nameserver(args.nameserver)
        .queue_size(args.queue);
    if let Some(limit) = args.retry_limit {
        builder = builder.retry_limit(limit);
    }
    let config = builder.build()?;

    let engine = CheckEngine::new(config);
    let summary = engine.run(&addresses, Arc::new(PrintSink)).await;
    debug!(?summary, "run complete");
    Ok(())
}

/// Route diagnostics to stderr; stdout carries only report lines.
fn init_logging(verbose: bool) {
    let default_filter = if verbose { "rblscan=debug" } else { "rblscan=warn" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .init();
}
