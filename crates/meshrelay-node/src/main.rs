//! `meshrelay-node` demo binary.
//!
//! Boots a single mesh node over [`LoopbackAdapter`] — there is no real
//! radio driver in this workspace, so this is useful only for exercising
//! `init`/`send`/`deinit` and watching the resulting `tracing` output, not
//! for talking to another device. End-to-end multi-node behavior is what
//! `meshrelay-harness` drives instead.
//!
//! # Usage
//!
//! ```bash
//! meshrelay-node --mesh-id 0xFAFBFCFD --channel 6
//! ```

use std::sync::Arc;

use clap::Parser;
use meshrelay_core::MeshConfig;
use meshrelay_node::{LoopbackAdapter, MeshNode, SystemEnv};
use meshrelay_proto::{Hwid, MeshId};
use meshrelay_radio::Completion;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// meshrelay demo node
#[derive(Parser, Debug)]
#[command(name = "meshrelay-node")]
#[command(about = "Runs a single meshrelay node over a loopback radio adapter")]
#[command(version)]
struct Args {
    /// 32-bit network identifier
    #[arg(long, default_value_t = 0xFAFB_FCFD, value_parser = parse_hex_u32)]
    mesh_id: u32,

    /// Radio channel, 1..=14
    #[arg(long, default_value = "1")]
    channel: u8,

    /// Work-queue capacity
    #[arg(long, default_value = "32")]
    queue_size: usize,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn parse_hex_u32(s: &str) -> Result<u32, std::num::ParseIntError> {
    s.strip_prefix("0x").map_or_else(|| s.parse(), |hex| u32::from_str_radix(hex, 16))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    tracing_subscriber::registry().with(fmt::layer()).with(filter).init();

    let config =
        MeshConfig { mesh_id: MeshId(args.mesh_id), channel: args.channel, queue_size: args.queue_size, ..MeshConfig::default() };
    tracing::info!(?config, "starting meshrelay node over loopback");

    let local_hwid = Hwid([1, 2, 3, 4, 5, 6]);
    let completion = Arc::new(Completion::new());
    let (node, _gateway) =
        MeshNode::init_with(config, local_hwid, SystemEnv::new(), LoopbackAdapter::new(Arc::clone(&completion)), completion)
            .await?;

    let mut events = node.subscribe();
    node.send(Hwid::BROADCAST, b"hello mesh".to_vec())?;

    if let Ok(event) = events.recv().await {
        tracing::info!(?event, "received application event");
    }

    Ok(())
}
