// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

mod helpers;

use anyhow::Result;
use cv_events::{wait_for_event, VoteError, VotePhase, VotingEvent};
use cv_fhe::InputValue;
use cv_test_helpers::MockSession;
use helpers::{phases, rig, CONTRACT, VOTER};
use std::time::Duration;

#[actix::test]
async fn test_cast_vote_happy_path() -> Result<()> {
    let rig = rig();
    rig.chain.add_session(MockSession::open(VOTER, 3600));
    rig.connect_and_init().await;
    rig.synchronizer.load_sessions(Some(VOTER)).await?;

    let done = wait_for_event(&rig.bus, |e| {
        matches!(
            e,
            VotingEvent::VotePhaseChanged {
                phase: VotePhase::Done,
                ..
            }
        )
    });

    let confirmation = rig.orchestrator.cast_vote(0, true).await.unwrap();
    assert!(confirmation.success);
    done.await?;

    // exactly one vote transaction reached the chain
    assert_eq!(rig.chain.vote_tx_count(), 1);

    // the encrypted input was bound to this contract and user, carrying 1
    let request = rig.sdk.instance().last_request().unwrap();
    assert_eq!(request.contract_address, CONTRACT);
    assert_eq!(request.user_address, VOTER);
    assert_eq!(request.values, vec![InputValue::U32(1)]);

    let events = rig.events().await;
    assert_eq!(
        phases(&events, 0),
        vec![
            VotePhase::CheckingEligibility,
            VotePhase::Encrypting,
            VotePhase::Submitting,
            VotePhase::Confirming,
            VotePhase::Refreshing,
            VotePhase::Done,
        ]
    );

    // the refresh observed the new vote; nothing was patched locally
    let session = rig.synchronizer.session(0).await.unwrap();
    assert!(session.has_voted);
    Ok(())
}

#[actix::test]
async fn test_no_vote_maps_to_zero() -> Result<()> {
    let rig = rig();
    rig.chain.add_session(MockSession::open(VOTER, 3600));
    rig.connect_and_init().await;
    rig.synchronizer.load_sessions(Some(VOTER)).await?;

    rig.orchestrator.cast_vote(0, false).await.unwrap();

    let request = rig.sdk.instance().last_request().unwrap();
    assert_eq!(request.values, vec![InputValue::U32(0)]);
    Ok(())
}

#[actix::test]
async fn test_failed_encryption_sends_no_transaction() -> Result<()> {
    let rig = rig();
    rig.chain.add_session(MockSession::open(VOTER, 3600));
    rig.connect_and_init().await;
    rig.synchronizer.load_sessions(Some(VOTER)).await?;
    rig.sdk.instance().fail_encryption();

    let failed = wait_for_event(&rig.bus, |e| {
        matches!(
            e,
            VotingEvent::VotePhaseChanged {
                phase: VotePhase::Failed,
                ..
            }
        )
    });

    let err = rig.orchestrator.cast_vote(0, true).await.unwrap_err();
    assert!(matches!(err, VoteError::Relayer(_)));
    failed.await?;

    // terminal failure with zero write calls
    assert_eq!(rig.chain.vote_tx_count(), 0);
    let events = rig.events().await;
    assert_eq!(*phases(&events, 0).last().unwrap(), VotePhase::Failed);
    Ok(())
}

#[actix::test]
async fn test_already_voted_fails_before_encrypting() -> Result<()> {
    let rig = rig();
    rig.chain.add_session(MockSession::open(VOTER, 3600));
    rig.chain.mark_voted(0, VOTER);
    rig.connect_and_init().await;
    rig.synchronizer.load_sessions(Some(VOTER)).await?;

    let err = rig.orchestrator.cast_vote(0, true).await.unwrap_err();
    assert!(matches!(err, VoteError::AlreadyVoted { session_id: 0, .. }));

    // the ciphertext builder was never invoked, nothing was submitted
    assert_eq!(rig.sdk.instance().encrypt_call_count(), 0);
    assert_eq!(rig.chain.vote_tx_count(), 0);
    Ok(())
}

#[actix::test]
async fn test_disconnected_wallet_is_rejected() -> Result<()> {
    let rig = rig();
    rig.chain.add_session(MockSession::open(VOTER, 3600));
    rig.connect_and_init().await;
    rig.synchronizer.load_sessions(Some(VOTER)).await?;
    rig.wallet.disconnect();

    let err = rig.orchestrator.cast_vote(0, true).await.unwrap_err();
    assert!(matches!(err, VoteError::WalletNotConnected));
    assert_eq!(rig.sdk.instance().encrypt_call_count(), 0);
    assert_eq!(rig.chain.vote_tx_count(), 0);
    Ok(())
}

#[actix::test]
async fn test_vote_before_initialization_is_rejected() -> Result<()> {
    let rig = rig();
    rig.chain.add_session(MockSession::open(VOTER, 3600));
    rig.wallet.connect(VOTER, helpers::CHAIN_ID);
    rig.synchronizer.load_sessions(Some(VOTER)).await?;

    let err = rig.orchestrator.cast_vote(0, true).await.unwrap_err();
    assert!(matches!(err, VoteError::NotInitialized));
    assert_eq!(rig.chain.vote_tx_count(), 0);
    Ok(())
}

#[actix::test]
async fn test_rejected_transaction_wraps_cause() -> Result<()> {
    let rig = rig();
    rig.chain.add_session(MockSession::open(VOTER, 3600));
    rig.connect_and_init().await;
    rig.synchronizer.load_sessions(Some(VOTER)).await?;
    rig.chain.fail_votes();

    let err = rig.orchestrator.cast_vote(0, true).await.unwrap_err();
    match err {
        VoteError::Transaction(cause) => {
            assert!(cause.to_string().contains("user rejected"))
        }
        other => panic!("expected Transaction, got {other:?}"),
    }
    assert_eq!(rig.chain.vote_tx_count(), 0);
    Ok(())
}

#[actix::test]
async fn test_create_session_persists_metadata_for_assumed_id() -> Result<()> {
    let rig = rig();
    // two pre-existing sessions created by other clients
    rig.chain.add_session(MockSession::open(VOTER, 3600));
    rig.chain.add_session(MockSession::open(VOTER, 3600));
    rig.connect_and_init().await;

    let session_id = rig
        .orchestrator
        .create_session("Fund the guild", "Quarterly budget vote", Duration::from_secs(7200))
        .await
        .unwrap();

    assert_eq!(session_id, 2);
    let sessions = rig.synchronizer.snapshot().await;
    assert_eq!(sessions.len(), 3);
    assert_eq!(sessions[2].title, "Fund the guild");
    assert_eq!(sessions[2].description, "Quarterly budget vote");
    // the pre-existing sessions fall back to placeholders
    assert_eq!(sessions[0].title, "Voting Session #1");
    Ok(())
}

#[actix::test]
async fn test_reveal_and_peek_tally() -> Result<()> {
    use alloy::primitives::B256;

    let rig = rig();
    rig.chain.add_session(MockSession::open(VOTER, 3600));
    rig.connect_and_init().await;

    rig.orchestrator.request_reveal(0).await.unwrap();

    let yes_handle = B256::repeat_byte(0x01);
    let no_handle = B256::repeat_byte(0x02);
    rig.chain.set_reveal_handles(0, yes_handle, no_handle);
    rig.sdk.instance().set_decrypt_json(format!(
        r#"{{"clearValues": {{"{yes_handle}": "0x03", "{no_handle}": "0x02"}}, "decryptionProof": "0xbb"}}"#
    ));

    let decrypted = wait_for_event(&rig.bus, |e| {
        matches!(e, VotingEvent::TallyDecrypted { .. })
    });

    let (yes_votes, no_votes) = rig.orchestrator.peek_tally(0).await.unwrap();
    assert_eq!((yes_votes, no_votes), (3, 2));
    // one batched decrypt call for both handles
    assert_eq!(rig.sdk.instance().decrypt_call_count(), 1);

    match decrypted.await? {
        VotingEvent::TallyDecrypted {
            session_id,
            yes_votes,
            no_votes,
        } => {
            assert_eq!((session_id, yes_votes, no_votes), (0, 3, 2));
        }
        other => panic!("unexpected event {other}"),
    }
    Ok(())
}
