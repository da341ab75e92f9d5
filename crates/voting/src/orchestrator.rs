// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use actix::Addr;
use alloy::primitives::Address;
use anyhow::anyhow;
use cv_events::{EventBus, VoteError, VotePhase, VotingError, VotingEvent};
use cv_evm::{Confirmation, VotingRead, VotingWrite, Wallet};
use cv_fhe::{build_vote, decrypt_handles, InstanceManager};
use cv_sessions::SessionSynchronizer;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Sequences a vote attempt through encryption, submission, confirmation
/// and refresh, publishing each phase on the bus. Owns no state of its
/// own; every check reads the wallet, the instance manager, or the latest
/// session snapshot.
pub struct VoteOrchestrator {
    wallet: Wallet,
    instances: Arc<InstanceManager>,
    reader: Arc<dyn VotingRead>,
    writer: Arc<dyn VotingWrite>,
    synchronizer: Arc<SessionSynchronizer>,
    bus: Addr<EventBus<VotingEvent>>,
    contract_address: Address,
}

impl VoteOrchestrator {
    pub fn new(
        wallet: Wallet,
        instances: Arc<InstanceManager>,
        reader: Arc<dyn VotingRead>,
        writer: Arc<dyn VotingWrite>,
        synchronizer: Arc<SessionSynchronizer>,
        bus: Addr<EventBus<VotingEvent>>,
        contract_address: Address,
    ) -> Self {
        Self {
            wallet,
            instances,
            reader,
            writer,
            synchronizer,
            bus,
            contract_address,
        }
    }

    pub fn synchronizer(&self) -> &Arc<SessionSynchronizer> {
        &self.synchronizer
    }

    /// Cast an encrypted yes/no vote on a session. No transaction leaves
    /// this client unless eligibility and encryption both succeed.
    pub async fn cast_vote(
        &self,
        session_id: u64,
        vote_yes: bool,
    ) -> Result<Confirmation, VoteError> {
        match self.try_cast_vote(session_id, vote_yes).await {
            Ok(confirmation) => {
                self.phase(session_id, VotePhase::Done);
                Ok(confirmation)
            }
            Err(err) => {
                self.phase(session_id, VotePhase::Failed);
                self.report(&err);
                Err(err)
            }
        }
    }

    async fn try_cast_vote(
        &self,
        session_id: u64,
        vote_yes: bool,
    ) -> Result<Confirmation, VoteError> {
        self.phase(session_id, VotePhase::CheckingEligibility);
        let user = self.wallet.address().ok_or(VoteError::WalletNotConnected)?;
        let instance = self.instances.get().ok_or(VoteError::NotInitialized)?;

        // Best-effort gate against the latest snapshot; the contract
        // re-checks on-chain and remains authoritative.
        if let Some(session) = self.synchronizer.session(session_id).await {
            if session.has_voted {
                return Err(VoteError::AlreadyVoted {
                    session_id,
                    address: user.to_string(),
                });
            }
        }

        self.phase(session_id, VotePhase::Encrypting);
        let encrypted =
            build_vote(instance.as_ref(), self.contract_address, user, vote_yes).await?;

        self.phase(session_id, VotePhase::Submitting);
        let tx_hash = self
            .writer
            .send_vote(session_id, encrypted.handle, encrypted.proof)
            .await
            .map_err(VoteError::transaction)?;
        info!(tx = %tx_hash, session_id, "Encrypted vote submitted");
        self.bus.do_send(VotingEvent::VoteSubmitted {
            session_id,
            tx_hash: tx_hash.to_string(),
        });

        self.phase(session_id, VotePhase::Confirming);
        let confirmation = self
            .writer
            .confirm(tx_hash)
            .await
            .map_err(VoteError::transaction)?;
        if !confirmation.success {
            return Err(VoteError::transaction(anyhow!(
                "transaction {tx_hash} reverted"
            )));
        }

        self.phase(session_id, VotePhase::Refreshing);
        self.refresh(Some(user)).await;

        Ok(confirmation)
    }

    /// Create a new voting session and persist its title/description
    /// locally. The new id is assumed to be the pre-transaction session
    /// count; the ABI offers no creation event to read it back, and the
    /// metadata is cosmetic if another creator races this one.
    pub async fn create_session(
        &self,
        title: &str,
        description: &str,
        duration: Duration,
    ) -> Result<u64, VoteError> {
        let user = self.wallet.address().ok_or(VoteError::WalletNotConnected)?;

        let session_id = self
            .reader
            .get_session_count()
            .await
            .map_err(VoteError::transaction)?;

        info!(session_id, "Creating voting session");
        let tx_hash = self
            .writer
            .send_create_session(duration.as_secs())
            .await
            .map_err(VoteError::transaction)?;

        let confirmation = self
            .writer
            .confirm(tx_hash)
            .await
            .map_err(VoteError::transaction)?;
        if !confirmation.success {
            return Err(VoteError::transaction(anyhow!(
                "transaction {tx_hash} reverted"
            )));
        }

        if let Err(err) = self
            .synchronizer
            .create_session_metadata(session_id, title, description)
            .await
        {
            // the session exists on-chain either way; only the local
            // labels are lost
            warn!(session_id, "Failed to persist session metadata: {err}");
        }

        self.bus.do_send(VotingEvent::SessionCreated {
            session_id,
            tx_hash: tx_hash.to_string(),
        });
        self.refresh(Some(user)).await;

        Ok(session_id)
    }

    /// Ask the contract to publish the tally handles for decryption. The
    /// final cleartexts arrive via the contract's resolve callback, which
    /// the relayer invokes, not this client.
    pub async fn request_reveal(&self, session_id: u64) -> Result<Confirmation, VoteError> {
        let user = self.wallet.address().ok_or(VoteError::WalletNotConnected)?;

        let tx_hash = self
            .writer
            .send_request_reveal(session_id)
            .await
            .map_err(VoteError::transaction)?;
        let confirmation = self
            .writer
            .confirm(tx_hash)
            .await
            .map_err(VoteError::transaction)?;
        if !confirmation.success {
            return Err(VoteError::transaction(anyhow!(
                "transaction {tx_hash} reverted"
            )));
        }

        self.bus.do_send(VotingEvent::TallyRevealRequested {
            session_id,
            tx_hash: tx_hash.to_string(),
        });
        self.refresh(Some(user)).await;

        Ok(confirmation)
    }

    /// Publicly decrypt the published tally handles in one batch, ahead of
    /// the on-chain resolve callback, so the result can be shown while the
    /// callback is pending.
    pub async fn peek_tally(&self, session_id: u64) -> Result<(u64, u64), VoteError> {
        let instance = self.instances.get().ok_or(VoteError::NotInitialized)?;

        let handles = self
            .reader
            .reveal_handles(session_id)
            .await
            .map_err(VoteError::transaction)?;

        let batch = decrypt_handles(
            instance.as_ref(),
            &[handles.yes_votes, handles.no_votes],
        )
        .await?;
        let (yes_votes, no_votes) = (batch.values[0], batch.values[1]);

        self.bus.do_send(VotingEvent::TallyDecrypted {
            session_id,
            yes_votes,
            no_votes,
        });
        Ok((yes_votes, no_votes))
    }

    /// Reload everything from the source of truth. Vote counts are never
    /// mutated optimistically; a failed refresh after a confirmed
    /// transaction is reported but does not undo the success.
    pub async fn refresh(&self, connected: Option<Address>) {
        match self.synchronizer.load_sessions(connected).await {
            Ok(sessions) => self.bus.do_send(VotingEvent::SessionsRefreshed {
                count: sessions.len(),
            }),
            Err(err) => {
                warn!("Failed to refresh sessions: {err}");
                self.bus.do_send(VotingEvent::VotingError(VotingError::new(
                    cv_events::VotingErrorType::Session,
                    &err.to_string(),
                )));
            }
        }
    }

    fn phase(&self, session_id: u64, phase: VotePhase) {
        self.bus
            .do_send(VotingEvent::VotePhaseChanged { session_id, phase });
    }

    fn report(&self, err: &VoteError) {
        self.bus.do_send(VotingEvent::VotingError(err.into()));
    }
}
