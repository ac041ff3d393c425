//! Full end-to-end run over real TCP loopback: one coordinator, two
//! workers, a converging one-dimensional regression.

use collective::{GroupHub, GroupMember, GroupMembership, Role};
use coordinator::{Coordinator, RunConfig, TextSink};
use tokio::net::{TcpListener, TcpStream};
use worker::{DataPartition, WorkerConfig, WorkerLoop};

#[tokio::test]
async fn two_workers_converge_over_tcp() -> std::io::Result<()> {
    const ITERS: usize = 20;
    const LR: f32 = 0.05;

    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;

    // Both partitions sample y = 2x exactly.
    let partitions = [
        DataPartition::new(1, vec![1.0, 2.0], vec![2.0, 4.0]).unwrap(),
        DataPartition::new(1, vec![3.0, 0.5], vec![6.0, 1.0]).unwrap(),
    ];

    let mut workers = Vec::new();
    for (index, partition) in partitions.into_iter().enumerate() {
        let cfg = WorkerConfig::new(ITERS, LR).unwrap();
        workers.push(tokio::spawn(async move {
            let stream = TcpStream::connect(addr).await.unwrap();
            let (rx, tx) = stream.into_split();
            let member = GroupMember::join(Role::Worker { index }, rx, tx)
                .await
                .unwrap();
            WorkerLoop::new(cfg, partition).run(member).await.unwrap()
        }));
    }

    let mut transports = Vec::new();
    for _ in 0..2 {
        let (stream, _) = listener.accept().await?;
        transports.push(stream.into_split());
    }

    let hub = GroupHub::form(GroupMembership::new(2).unwrap(), transports)
        .await
        .unwrap();
    let cfg = RunConfig::new(2, ITERS).unwrap();
    let mut sink = TextSink::new(Vec::new())?;

    let records = Coordinator::new(cfg, hub)
        .run(&[0.0], &mut sink)
        .await
        .unwrap();

    assert_eq!(records.len(), ITERS);
    for (index, record) in records.iter().enumerate() {
        assert_eq!(record.index, index);
        assert!(!record.converged);
    }

    let first = records.first().unwrap().total_error.unwrap();
    let last = records.last().unwrap().total_error.unwrap();
    assert!(last < first, "error went from {first} to {last}");

    let weight = records.last().unwrap().weights[0];
    assert!(
        (weight - 2.0).abs() < 0.2,
        "weight {weight} did not approach 2.0"
    );

    for task in workers {
        let metrics = task.await.unwrap();
        assert_eq!(metrics.iterations, ITERS as u64);
    }

    let text = String::from_utf8(sink.into_inner()).unwrap();
    assert!(text.contains("iteration limit reached"));

    Ok(())
}
