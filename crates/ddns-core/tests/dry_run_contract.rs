//! Contract Test: Dry-Run Mode
//!
//! In dry-run mode the engine still resolves, lists and reconciles, but
//! sends no mutation.

mod common;

use common::*;
use ddns_core::{DdnsEngine, MutationKind, MutationOutcome};
use std::net::Ipv4Addr;

#[tokio::test]
async fn dry_run_sends_no_mutation() {
    let provider = MockDnsProvider::new(vec![a_record("@", "1.1.1.1")]);
    let mut config = minimal_config("@");
    config.engine.dry_run = true;

    let engine = DdnsEngine::new(
        Box::new(StaticIpSource::new(Ipv4Addr::new(2, 2, 2, 2))),
        Box::new(MockDnsProvider::sharing_state_with(&provider)),
        &config,
    )
    .unwrap();

    let report = engine.run_once().await.unwrap();

    assert_eq!(report.plan.mutation_count(), 2);
    assert!(report.is_success());
    assert!(report
        .outcomes
        .iter()
        .all(|o| matches!(o, MutationOutcome::Skipped { .. })));
    assert_eq!(report.outcomes[0].kind(), MutationKind::Delete);
    assert_eq!(report.outcomes[1].kind(), MutationKind::Add);

    assert_eq!(provider.calls(), vec![Call::List("example.com".to_string())]);
    assert_eq!(provider.records(), vec![a_record("@", "1.1.1.1")]);
}
