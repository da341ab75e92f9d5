// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

mod helpers;

use alloy::primitives::B256;
use anyhow::Result;
use cv_events::VoteError;
use cv_fhe::{build_vote, decrypt_handles};
use cv_test_helpers::MockSession;
use helpers::{rig, CONTRACT, VOTER};
use std::sync::Arc;

#[actix::test]
async fn test_listing_skips_failing_session_index() -> Result<()> {
    let rig = rig();
    rig.chain.add_session(MockSession::open(VOTER, 3600));
    rig.chain.add_session(MockSession::open(VOTER, 3600));
    rig.chain.add_session(MockSession::open(VOTER, 3600));
    rig.chain.fail_reads_for(1);

    let sessions = rig.synchronizer.load_sessions(None).await?;
    let ids: Vec<u64> = sessions.iter().map(|s| s.session_id).collect();
    assert_eq!(ids, vec![0, 2]);
    Ok(())
}

#[actix::test]
async fn test_resolved_sessions_expose_revealed_tally() -> Result<()> {
    let rig = rig();
    rig.chain.add_session(MockSession::resolved(VOTER, 7, 4));
    rig.chain.add_session(MockSession::open(VOTER, 3600));

    let sessions = rig.synchronizer.load_sessions(None).await?;
    assert!(sessions[0].tally.is_revealed());
    assert_eq!(sessions[0].tally.yes_votes(), 7);
    assert_eq!(sessions[0].tally.no_votes(), 4);
    assert!(!sessions[0].is_active);
    assert!(!sessions[1].tally.is_revealed());
    assert!(sessions[1].is_active);

    let completed = rig.synchronizer.completed_sessions().await;
    assert_eq!(completed.len(), 1);
    assert_eq!(completed[0].session_id, 0);
    Ok(())
}

#[actix::test]
async fn test_auto_initialize_fires_on_wallet_connect() -> Result<()> {
    use cv_events::{wait_for_event, FheStatus, VotingEvent};

    let rig = rig();
    let ready = wait_for_event(&rig.bus, |e| {
        matches!(
            e,
            VotingEvent::FheStatusChanged {
                status: FheStatus::Ready,
            }
        )
    });

    let _watcher = cv_fhe::spawn_auto_initialize(rig.instances.clone());
    rig.wallet.connect(VOTER, helpers::CHAIN_ID);

    ready.await?;
    assert_eq!(rig.sdk.bootstrap_count(), 1);
    assert!(rig.instances.get().is_some());

    // reconnects do not bootstrap again
    rig.wallet.disconnect();
    rig.wallet.connect(VOTER, helpers::CHAIN_ID);
    rig.instances.initialize().await.unwrap();
    assert_eq!(rig.sdk.bootstrap_count(), 1);
    Ok(())
}

#[actix::test]
async fn test_concurrent_initialization_bootstraps_once() -> Result<()> {
    let rig = rig();
    rig.wallet.connect(VOTER, helpers::CHAIN_ID);
    let manager = rig.instances.clone();

    let attempts: Vec<_> = (0..8)
        .map(|_| {
            let manager = manager.clone();
            actix::spawn(async move { manager.initialize().await.is_ok() })
        })
        .collect();
    for attempt in attempts {
        assert!(attempt.await?);
    }

    assert_eq!(rig.sdk.bootstrap_count(), 1);
    assert!(rig.instances.get().is_some());
    Ok(())
}

#[actix::test]
async fn test_build_vote_maps_booleans_exactly() -> Result<()> {
    use cv_fhe::InputValue;

    let rig = rig();
    rig.connect_and_init().await;
    let instance = rig.instances.get().unwrap();

    build_vote(instance.as_ref(), CONTRACT, VOTER, true).await.unwrap();
    assert_eq!(
        rig.sdk.instance().last_request().unwrap().values,
        vec![InputValue::U32(1)]
    );

    build_vote(instance.as_ref(), CONTRACT, VOTER, false).await.unwrap();
    assert_eq!(
        rig.sdk.instance().last_request().unwrap().values,
        vec![InputValue::U32(0)]
    );
    Ok(())
}

#[actix::test]
async fn test_decrypt_batch_error_cases() -> Result<()> {
    let rig = rig();
    rig.connect_and_init().await;
    let instance = rig.instances.get().unwrap();

    // empty input short-circuits before any relayer call
    let err = decrypt_handles(instance.as_ref(), &[]).await.unwrap_err();
    assert!(matches!(err, VoteError::EmptyInput));
    assert_eq!(rig.sdk.instance().decrypt_call_count(), 0);

    // a batch result missing h2 names h2
    let h1 = B256::repeat_byte(0x01);
    let h2 = B256::repeat_byte(0x02);
    rig.sdk
        .instance()
        .set_decrypt_json(format!(r#"{{"{h1}": "0x01"}}"#));
    let err = decrypt_handles(instance.as_ref(), &[h1, h2]).await.unwrap_err();
    match err {
        VoteError::MissingValue(named) => assert_eq!(named, h2.to_string()),
        other => panic!("expected MissingValue, got {other:?}"),
    }
    Ok(())
}

#[actix::test]
async fn test_failed_bootstrap_allows_retry() -> Result<()> {
    use cv_evm::Wallet;
    use cv_fhe::{InstanceConfig, InstanceManager};
    use cv_test_helpers::MockRelayerSdk;

    let sdk = Arc::new(MockRelayerSdk::new());
    sdk.fail_init();

    let wallet = Wallet::new();
    wallet.connect(VOTER, helpers::CHAIN_ID);
    let manager = InstanceManager::new(
        sdk.clone(),
        InstanceConfig {
            chain_id: helpers::CHAIN_ID,
            network_url: "http://localhost:8545/".to_string(),
        },
        wallet,
    );

    let err = manager.initialize().await.unwrap_err();
    assert!(matches!(err, VoteError::SdkNotLoaded(_)));
    assert!(manager.get().is_none());
    Ok(())
}
