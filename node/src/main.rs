mod config;
mod dataset;

use std::{
    fs::File,
    io::{self, BufWriter},
};

use collective::{GroupHub, GroupMember, GroupMembership, Role};
use coordinator::{Coordinator, RunConfig, TextSink};
use log::{info, warn};
use tokio::{
    net::{TcpListener, TcpStream},
    signal,
};
use worker::{WorkerConfig, WorkerLoop};

use crate::config::{CoordinatorConfig, NodeConfig, WorkerNodeConfig};

#[tokio::main]
async fn main() -> io::Result<()> {
    env_logger::init();

    let Some(path) = std::env::args().nth(1) else {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "usage: node <config.json>",
        ));
    };

    match config::load(&path)? {
        NodeConfig::Coordinator(cfg) => run_coordinator(cfg).await,
        NodeConfig::Worker(cfg) => run_worker(cfg).await,
    }
}

async fn run_coordinator(cfg: CoordinatorConfig) -> io::Result<()> {
    let run_cfg = RunConfig::new(cfg.worker_num, cfg.iter_num)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
    if cfg.dim == 0 {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "dim must be positive",
        ));
    }
    let membership = GroupMembership::new(cfg.worker_num).map_err(io::Error::from)?;

    let listener = TcpListener::bind(&cfg.listen_addr).await?;
    info!(addr = cfg.listen_addr.as_str(), worker_num = cfg.worker_num; "waiting for workers");

    let mut transports = Vec::with_capacity(cfg.worker_num);
    while transports.len() < cfg.worker_num {
        let (stream, peer) = listener.accept().await?;
        info!("worker connected from {peer}");
        transports.push(stream.into_split());
    }

    let hub = GroupHub::form(membership, transports)
        .await
        .map_err(io::Error::from)?;

    let file = File::create(&cfg.output_path)?;
    let mut sink = TextSink::new(BufWriter::new(file))?;

    let initial = vec![0.0; cfg.dim];
    let driver = Coordinator::new(run_cfg, hub);

    tokio::select! {
        result = driver.run(&initial, &mut sink) => {
            let records = result.map_err(io::Error::from)?;
            info!(iterations = records.len(); "run complete");
            Ok(())
        }
        _ = signal::ctrl_c() => {
            warn!("interrupted, abandoning run");
            Ok(())
        }
    }
}

async fn run_worker(cfg: WorkerNodeConfig) -> io::Result<()> {
    let worker_cfg =
        WorkerConfig::new(cfg.iter_num, cfg.learning_rate).map_err(io::Error::from)?;
    let partition = dataset::build_partition(cfg.dataset)?;
    info!(index = cfg.index, rows = partition.rows(); "partition ready");

    let stream = TcpStream::connect(&cfg.coordinator_addr).await?;
    let (rx, tx) = stream.into_split();
    let member = GroupMember::join(Role::Worker { index: cfg.index }, rx, tx)
        .await
        .map_err(io::Error::from)?;

    let metrics = WorkerLoop::new(worker_cfg, partition)
        .run(member)
        .await
        .map_err(io::Error::from)?;
    info!(iterations = metrics.iterations; "worker done");

    Ok(())
}
