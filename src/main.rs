use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use kelips_dht::{GroupContact, HttpTransport, Kelips, KelipsConfig, KelipsError, Peer, Transport};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 3 {
        eprintln!("Usage: {} --bind <addr:port> [--k <n>] [--join <addr:port>]", args[0]);
        eprintln!("Example: {} --bind 127.0.0.1:10000", args[0]);
        eprintln!(
            "Example: {} --bind 127.0.0.1:10001 --join 127.0.0.1:10000",
            args[0]
        );
        std::process::exit(1);
    }

    let mut bind_addr: Option<SocketAddr> = None;
    let mut join_peers: Vec<String> = vec![];
    let mut k: u64 = 3;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--bind" => {
                bind_addr = Some(args[i + 1].parse()?);
                i += 2;
            }
            "--join" => {
                join_peers.push(args[i + 1].clone());
                i += 2;
            }
            "--k" => {
                k = args[i + 1].parse()?;
                i += 2;
            }
            _ => {
                i += 1;
            }
        }
    }

    let bind_addr = bind_addr.expect("--bind is required");
    let host = bind_addr.to_string();

    tracing::info!("Starting node on {} with {} affinity groups", host, k);

    let transport = Arc::new(HttpTransport::new());
    let mut conf = KelipsConfig::new(k);
    conf.transport = Some(transport.clone());

    let kelips = Kelips::new(&host, conf)?;
    tracing::info!("Home affinity group: {}", kelips.home_id());

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    kelips.start(listener).await?;

    // Without a gossip substrate the demo learns peers from the command
    // line; peers sharing our home group additionally get told about us.
    for peer in &join_peers {
        let group = match kelips.add_peer(Peer::new(peer)) {
            Ok(group) => {
                tracing::info!("Added peer={} group={}", peer, group);
                group
            }
            Err(KelipsError::ContactExists) => continue,
            Err(e) => {
                tracing::warn!("Failed to add peer {}: {}", peer, e);
                continue;
            }
        };

        if group == kelips.home_id() {
            let target = GroupContact::new(group, peer.clone());
            if let Err(e) = transport.add_peer(&target, &Peer::new(&host)).await {
                tracing::debug!("Peer announce to {} skipped: {}", peer, e);
            }
        }
    }

    tracing::info!("Press Ctrl+C to shutdown");
    tokio::signal::ctrl_c().await?;

    kelips.shutdown(Duration::from_secs(5)).await?;
    Ok(())
}
