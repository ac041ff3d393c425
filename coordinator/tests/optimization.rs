use collective::{GroupHub, GroupMember, GroupMembership, Role};
use coordinator::{Coordinator, CoordinatorError, IterationRecord, RunConfig, TextSink};
use tokio::io::{DuplexStream, ReadHalf, WriteHalf, duplex, split};

const BUF_SIZE: usize = 4096;

type Hub = GroupHub<ReadHalf<DuplexStream>, WriteHalf<DuplexStream>>;
type Member = GroupMember<ReadHalf<DuplexStream>, WriteHalf<DuplexStream>>;

/// Builds a formed hub plus `n` joined members over in-memory transports.
async fn group(n: usize) -> (Hub, Vec<Member>) {
    let membership = GroupMembership::new(n).unwrap();
    let mut transports = Vec::new();
    let mut members = Vec::new();

    for index in 0..n {
        let (hub_side, member_side) = duplex(BUF_SIZE);
        let (m_rx, m_tx) = split(member_side);

        transports.push(split(hub_side));
        members.push(
            GroupMember::join(Role::Worker { index }, m_rx, m_tx)
                .await
                .unwrap(),
        );
    }

    let hub = GroupHub::form(membership, transports).await.unwrap();
    (hub, members)
}

/// Scripted worker: contributes fixed values each iteration instead of
/// computing them, but follows the exact protocol a real worker does.
async fn run_scripted(
    mut member: Member,
    iterations: usize,
    gradient: Vec<f32>,
    weights: Vec<Vec<f32>>,
    error: f32,
) {
    let mut buf = Vec::new();
    member.recv_broadcast(&mut buf).await.unwrap().unwrap();

    for weights in weights.into_iter().take(iterations) {
        if member.contribute_vector(&gradient).await.unwrap().is_none() {
            break;
        }
        if member.recv_broadcast(&mut buf).await.unwrap().is_none() {
            break;
        }
        if member.contribute_vector(&weights).await.unwrap().is_none() {
            break;
        }
        if member.recv_broadcast(&mut buf).await.unwrap().is_none() {
            break;
        }
        if member.contribute_scalar(error).await.unwrap().is_none() {
            break;
        }
    }

    member.await_shutdown().await.unwrap();
}

#[tokio::test]
async fn full_run_emits_one_record_per_iteration() {
    const ITERS: usize = 3;
    let (hub, mut members) = group(2).await;

    // Per-worker contributions: gradients [1,2] and [3,4] sum to [4,6];
    // stepped weights [0,0] and [2,2] average to [1,1]; errors 0.5 and 1.5
    // sum to 2.0.
    let scripts = [
        (vec![1.0, 2.0], vec![0.0, 0.0], 0.5),
        (vec![3.0, 4.0], vec![2.0, 2.0], 1.5),
    ];
    for (gradient, weights, error) in scripts {
        let member = members.remove(0);
        tokio::spawn(run_scripted(
            member,
            ITERS,
            gradient,
            vec![weights; ITERS],
            error,
        ));
    }

    let cfg = RunConfig::new(2, ITERS).unwrap();
    let mut sink = TextSink::new(Vec::new()).unwrap();
    let records = Coordinator::new(cfg, hub)
        .run(&[0.0, 0.0], &mut sink)
        .await
        .unwrap();

    assert_eq!(records.len(), ITERS);
    assert_eq!(
        records[0],
        IterationRecord {
            index: 0,
            weights: vec![1.0, 1.0],
            total_error: Some(2.0),
            converged: false,
        }
    );
    for (index, record) in records.iter().enumerate() {
        assert_eq!(record.index, index);
        assert!(!record.converged);
        assert_eq!(record.total_error, Some(2.0));
        assert_eq!(record.weights, vec![1.0, 1.0]);
    }

    let text = String::from_utf8(sink.into_inner()).unwrap();
    assert!(text.contains("run ended: iteration limit reached after 3 iterations"));
}

#[tokio::test]
async fn nan_weights_terminate_the_run_early() {
    const ITERS: usize = 3;
    const NAN_AT: usize = 2;
    let (hub, mut members) = group(2).await;

    // Worker 0's stepped weights turn non-finite at iteration 2; the
    // average picks the NaN up in position 0 only.
    for index in 0..2 {
        let member = members.remove(0);
        let mut weights = vec![vec![1.0, 1.0]; ITERS];
        if index == 0 {
            weights[NAN_AT] = vec![f32::NAN, 1.0];
        }
        tokio::spawn(run_scripted(member, ITERS, vec![1.0, 1.0], weights, 0.5));
    }

    let cfg = RunConfig::new(2, ITERS).unwrap();
    let mut sink = TextSink::new(Vec::new()).unwrap();
    let records = Coordinator::new(cfg, hub)
        .run(&[0.0, 0.0], &mut sink)
        .await
        .unwrap();

    // Exactly NAN_AT + 1 records and nothing after the terminal one.
    assert_eq!(records.len(), NAN_AT + 1);
    for record in &records[..NAN_AT] {
        assert!(!record.converged);
        assert_eq!(record.total_error, Some(1.0));
    }

    let last = &records[NAN_AT];
    assert_eq!(last.index, NAN_AT);
    assert!(last.converged);
    assert_eq!(last.total_error, None);
    assert!(last.weights[0].is_nan());
    assert_eq!(last.weights[1], 1.0);

    let text = String::from_utf8(sink.into_inner()).unwrap();
    assert!(text.contains("one of the worker nodes has converged"));
    assert!(text.contains("run ended: convergence detected at iteration 2"));
}

#[tokio::test]
async fn empty_initial_weights_are_rejected() {
    let (hub, _members) = group(1).await;

    let cfg = RunConfig::new(1, 1).unwrap();
    let mut sink = TextSink::new(Vec::new()).unwrap();
    let err = Coordinator::new(cfg, hub)
        .run(&[], &mut sink)
        .await
        .unwrap_err();

    assert!(matches!(err, CoordinatorError::EmptyInitialWeights));
}
