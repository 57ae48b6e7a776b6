//! Command that prints one or `-n count` unique identifiers

use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use uniqueid::{DailyLogSink, Generator, NodeId, NoopSink, Sink, SystemClock};

/// Runtime configuration for the `uniqueid` binary.
///
/// Values come from command-line arguments or environment variables, which may also be set in a
/// `.env` file in the working directory.
#[derive(Parser, Debug, Clone)]
#[command(name = "uniqueid", version, about = "Prints time-ordered unique identifiers")]
struct CliArgs {
    /// Node identifier embedded in every identifier; exactly six bytes of UTF-8.
    ///
    /// A random node identifier is drawn when omitted.
    ///
    /// Environment variable: `UNIQUEID_NODE_ID`
    #[arg(env = "UNIQUEID_NODE_ID")]
    node_id: Option<String>,

    /// Number of identifiers to print.
    #[arg(short = 'n', long, default_value_t = 1)]
    count: usize,

    /// Directory receiving one `YYYY-MM-DD.log` file per UTC day of generated identifiers.
    ///
    /// Environment variable: `UNIQUEID_LOG_DIR`
    #[arg(long, env = "UNIQUEID_LOG_DIR")]
    log_dir: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();

    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let node_id = match &args.node_id {
        Some(text) => text
            .parse::<NodeId>()
            .with_context(|| format!("invalid node identifier {text:?}"))?,
        None => NodeId::random(),
    };
    tracing::debug!(?node_id, count = args.count, log_dir = ?args.log_dir, "starting");

    let sink: Arc<dyn Sink + Send + Sync> = match args.log_dir {
        Some(dir) => Arc::new(DailyLogSink::new(dir)),
        None => Arc::new(NoopSink),
    };
    let generator = Generator::with_sink(SystemClock, node_id, sink);

    let mut buf = io::BufWriter::new(io::stdout().lock());
    for _ in 0..args.count {
        let id = generator.generate().context("could not generate identifier")?;
        writeln!(buf, "{id}")?;
    }
    buf.flush()?;
    Ok(())
}
