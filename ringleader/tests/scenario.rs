//! End-to-end runs of the scenario layer.

use ringleader::{NodeId, RingConfig, RingError, ScriptedFailover, run_scenario};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

#[tokio::test]
async fn scripted_failover_reports_expected_leaders() {
    init_tracing();
    let mut scenario = ScriptedFailover::new();
    run_scenario(RingConfig::new(4), &mut scenario)
        .await
        .expect("scenario");

    // Initial leader 0; 3 wins once 0 is out; after 0 recovers and 3
    // fails, 2 is the maximum active id.
    assert_eq!(
        scenario.leaders,
        vec![NodeId(0), NodeId(3), NodeId(2)],
        "leader history over the script"
    );
}

#[tokio::test]
async fn scripted_failover_rejects_undersized_rings() {
    init_tracing();
    let mut scenario = ScriptedFailover::new();
    let outcome = run_scenario(RingConfig::new(2), &mut scenario).await;
    assert!(matches!(outcome, Err(RingError::InvalidConfig(_))));
    assert!(scenario.leaders.is_empty());
}

#[tokio::test]
async fn scripted_failover_works_on_larger_rings() {
    init_tracing();
    let mut scenario = ScriptedFailover::new();
    run_scenario(RingConfig::new(6), &mut scenario)
        .await
        .expect("scenario");

    // With six nodes the same script loses 0 and later 3, so the elections
    // see maxima 5 and 5.
    assert_eq!(scenario.leaders, vec![NodeId(0), NodeId(5), NodeId(5)]);
}
