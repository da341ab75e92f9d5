// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use alloy::{
    network::EthereumWallet,
    primitives::{Address, Bytes, TxHash, B256, U256},
    providers::{
        fillers::{
            BlobGasFiller, ChainIdFiller, FillProvider, GasFiller, JoinFill, NonceFiller,
            WalletFiller,
        },
        Identity, PendingTransactionConfig, Provider, ProviderBuilder, RootProvider,
    },
    rpc::types::{BlockNumberOrTag, Filter, TransactionReceipt},
    signers::local::PrivateKeySigner,
    sol,
    sol_types::SolEvent,
};
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use cv_config::ChainConfig;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::debug;

sol! {
    #[derive(Debug)]
    #[sol(rpc)]
    contract SimpleVoting {
        event TallyRevealRequested(uint256 indexed sessionId, bytes32 yesVotesHandle, bytes32 noVotesHandle);

        function createSession(uint256 durationSeconds) external;
        function getSession(uint256 sessionId) external view returns (address creator, uint256 endTime, bool resolved, uint32 yesVotes, uint32 noVotes);
        function getSessionCount() external view returns (uint256);
        function hasVoted(uint256 sessionId, address voter) external view returns (bool);
        function sessions(uint256 sessionId) external view returns (address creator, uint256 endTime, bool resolved, uint32 revealedYes, uint32 revealedNo, bool revealRequested);
        function requestTallyReveal(uint256 sessionId) external;
        function resolveTallyCallback(uint256 sessionId, bytes calldata cleartexts, bytes calldata decryptionProof) external;
        function vote(uint256 sessionId, bytes32 encryptedVote, bytes calldata proof) external;
    }
}

/// On-chain FHE ciphertext verification blows well past the default gas
/// estimate, so the vote call carries an explicit allowance.
pub const VOTE_GAS_LIMIT: u64 = 5_000_000;
pub const CREATE_SESSION_GAS_LIMIT: u64 = 500_000;

/// The `getSession` view: vote counters are zero until the reveal callback
/// has landed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionInfo {
    pub creator: Address,
    pub end_time: u64,
    pub resolved: bool,
    pub yes_votes: u32,
    pub no_votes: u32,
}

/// The raw `sessions` storage struct, which additionally exposes whether a
/// reveal has been requested.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionRecord {
    pub creator: Address,
    pub end_time: u64,
    pub resolved: bool,
    pub revealed_yes: u32,
    pub revealed_no: u32,
    pub reveal_requested: bool,
}

/// Ciphertext handles published by `TallyRevealRequested`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RevealHandles {
    pub yes_votes: B256,
    pub no_votes: B256,
}

/// Receipt summary returned once a transaction is included.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Confirmation {
    pub tx_hash: TxHash,
    pub block_number: Option<u64>,
    pub gas_used: u64,
    pub success: bool,
}

impl From<TransactionReceipt> for Confirmation {
    fn from(receipt: TransactionReceipt) -> Self {
        Self {
            tx_hash: receipt.transaction_hash,
            block_number: receipt.block_number,
            gas_used: receipt.gas_used,
            success: receipt.status(),
        }
    }
}

/// Read-only operations on the voting contract
#[async_trait]
pub trait VotingRead: Send + Sync {
    /// Total number of sessions ever created; ids are assigned
    /// sequentially from zero and never reused.
    async fn get_session_count(&self) -> Result<u64>;

    async fn get_session(&self, session_id: u64) -> Result<SessionInfo>;

    async fn get_session_record(&self, session_id: u64) -> Result<SessionRecord>;

    async fn has_voted(&self, session_id: u64, address: Address) -> Result<bool>;

    /// Handles published by the most recent `TallyRevealRequested` event
    /// for this session.
    async fn reveal_handles(&self, session_id: u64) -> Result<RevealHandles>;
}

/// Signer-backed operations. Each `send_*` broadcasts and returns the tx
/// hash; `confirm` awaits inclusion with the chain client's own wait
/// semantics (no extra timeout on top).
#[async_trait]
pub trait VotingWrite: Send + Sync {
    async fn send_create_session(&self, duration_seconds: u64) -> Result<TxHash>;

    async fn send_vote(&self, session_id: u64, encrypted_vote: B256, proof: Bytes)
        -> Result<TxHash>;

    async fn send_request_reveal(&self, session_id: u64) -> Result<TxHash>;

    async fn confirm(&self, tx_hash: TxHash) -> Result<Confirmation>;
}

/// Generic type to represent different provider types
pub trait ProviderType: Send {
    type Provider: Provider + Send + Sync + 'static;
}

/// Marker type for read-only provider
#[derive(Clone)]
pub struct ReadOnly;
impl ProviderType for ReadOnly {
    type Provider = VotingReadOnlyProvider;
}

/// Marker type for read-write provider
#[derive(Clone)]
pub struct ReadWrite;
impl ProviderType for ReadWrite {
    type Provider = VotingWriteProvider;
}

pub type VotingReadOnlyProvider = FillProvider<
    JoinFill<
        Identity,
        JoinFill<GasFiller, JoinFill<BlobGasFiller, JoinFill<NonceFiller, ChainIdFiller>>>,
    >,
    RootProvider,
>;

pub type VotingWriteProvider = FillProvider<
    JoinFill<
        JoinFill<
            Identity,
            JoinFill<GasFiller, JoinFill<BlobGasFiller, JoinFill<NonceFiller, ChainIdFiller>>>,
        >,
        WalletFiller<EthereumWallet>,
    >,
    RootProvider,
>;

/// Voting contract handle, generic over its provider capability
#[derive(Clone)]
pub struct VotingContract<T: ProviderType> {
    provider: Arc<T::Provider>,
    contract_address: Address,
    deploy_block: Option<u64>,
    _marker: PhantomData<T>,
}

impl<T: ProviderType> VotingContract<T> {
    pub fn address(&self) -> &Address {
        &self.contract_address
    }

    /// Bound historical log queries to the contract's deploy block instead
    /// of scanning from genesis.
    pub fn with_deploy_block(mut self, deploy_block: Option<u64>) -> Self {
        self.deploy_block = deploy_block;
        self
    }
}

pub type VotingReadContract = VotingContract<ReadOnly>;
pub type VotingWriteContract = VotingContract<ReadWrite>;

pub struct VotingContractFactory;

impl VotingContractFactory {
    pub async fn create_read(
        rpc_url: &str,
        contract_address: &str,
    ) -> Result<VotingContract<ReadOnly>> {
        let provider = ProviderBuilder::new().connect(rpc_url).await?;

        Ok(VotingContract::<ReadOnly> {
            provider: Arc::new(provider),
            contract_address: contract_address.parse()?,
            deploy_block: None,
            _marker: PhantomData,
        })
    }

    pub async fn create_write(
        rpc_url: &str,
        contract_address: &str,
        signer: PrivateKeySigner,
    ) -> Result<VotingContract<ReadWrite>> {
        let wallet = EthereumWallet::from(signer);
        let provider = ProviderBuilder::new().wallet(wallet).connect(rpc_url).await?;

        Ok(VotingContract::<ReadWrite> {
            provider: Arc::new(provider),
            contract_address: contract_address.parse()?,
            deploy_block: None,
            _marker: PhantomData,
        })
    }

    /// Read-only handle from chain configuration
    pub async fn read_from_config(chain: &ChainConfig) -> Result<VotingContract<ReadOnly>> {
        let rpc = chain.rpc_url()?;
        let contract = &chain.contracts.voting;
        Ok(Self::create_read(&rpc.as_http_url()?, contract.address())
            .await?
            .with_deploy_block(contract.deploy_block()))
    }

    /// Signer-backed handle from chain configuration
    pub async fn write_from_config(
        chain: &ChainConfig,
        signer: PrivateKeySigner,
    ) -> Result<VotingContract<ReadWrite>> {
        let rpc = chain.rpc_url()?;
        let contract = &chain.contracts.voting;
        Ok(Self::create_write(&rpc.as_http_url()?, contract.address(), signer)
            .await?
            .with_deploy_block(contract.deploy_block()))
    }
}

#[async_trait]
impl<T> VotingRead for VotingContract<T>
where
    T: ProviderType + Send + Sync,
{
    async fn get_session_count(&self) -> Result<u64> {
        let contract = SimpleVoting::new(self.contract_address, &self.provider);
        let count = contract.getSessionCount().call().await?;
        Ok(count.saturating_to::<u64>())
    }

    async fn get_session(&self, session_id: u64) -> Result<SessionInfo> {
        let contract = SimpleVoting::new(self.contract_address, &self.provider);
        let session = contract.getSession(U256::from(session_id)).call().await?;
        Ok(SessionInfo {
            creator: session.creator,
            end_time: session.endTime.saturating_to::<u64>(),
            resolved: session.resolved,
            yes_votes: session.yesVotes,
            no_votes: session.noVotes,
        })
    }

    async fn get_session_record(&self, session_id: u64) -> Result<SessionRecord> {
        let contract = SimpleVoting::new(self.contract_address, &self.provider);
        let record = contract.sessions(U256::from(session_id)).call().await?;
        Ok(SessionRecord {
            creator: record.creator,
            end_time: record.endTime.saturating_to::<u64>(),
            resolved: record.resolved,
            revealed_yes: record.revealedYes,
            revealed_no: record.revealedNo,
            reveal_requested: record.revealRequested,
        })
    }

    async fn has_voted(&self, session_id: u64, address: Address) -> Result<bool> {
        let contract = SimpleVoting::new(self.contract_address, &self.provider);
        let voted = contract.hasVoted(U256::from(session_id), address).call().await?;
        Ok(voted)
    }

    async fn reveal_handles(&self, session_id: u64) -> Result<RevealHandles> {
        let from_block = self
            .deploy_block
            .map(BlockNumberOrTag::Number)
            .unwrap_or(BlockNumberOrTag::Earliest);

        let filter = Filter::new()
            .address(self.contract_address)
            .event_signature(SimpleVoting::TallyRevealRequested::SIGNATURE_HASH)
            .topic1(B256::from(U256::from(session_id)))
            .from_block(from_block);

        let logs = self.provider.get_logs(&filter).await?;
        let log = logs
            .last()
            .ok_or_else(|| anyhow!("no TallyRevealRequested event for session {session_id}"))?;

        let decoded = log.log_decode::<SimpleVoting::TallyRevealRequested>()?;
        debug!(session_id, "Decoded tally reveal handles from logs");
        Ok(RevealHandles {
            yes_votes: decoded.inner.data.yesVotesHandle,
            no_votes: decoded.inner.data.noVotesHandle,
        })
    }
}

#[async_trait]
impl VotingWrite for VotingContract<ReadWrite> {
    async fn send_create_session(&self, duration_seconds: u64) -> Result<TxHash> {
        let contract = SimpleVoting::new(self.contract_address, &self.provider);
        let pending = contract
            .createSession(U256::from(duration_seconds))
            .gas(CREATE_SESSION_GAS_LIMIT)
            .send()
            .await?;
        Ok(*pending.tx_hash())
    }

    async fn send_vote(
        &self,
        session_id: u64,
        encrypted_vote: B256,
        proof: Bytes,
    ) -> Result<TxHash> {
        let contract = SimpleVoting::new(self.contract_address, &self.provider);
        let pending = contract
            .vote(U256::from(session_id), encrypted_vote, proof)
            .gas(VOTE_GAS_LIMIT)
            .send()
            .await?;
        Ok(*pending.tx_hash())
    }

    async fn send_request_reveal(&self, session_id: u64) -> Result<TxHash> {
        let contract = SimpleVoting::new(self.contract_address, &self.provider);
        let pending = contract
            .requestTallyReveal(U256::from(session_id))
            .send()
            .await?;
        Ok(*pending.tx_hash())
    }

    async fn confirm(&self, tx_hash: TxHash) -> Result<Confirmation> {
        let pending = self
            .provider
            .watch_pending_transaction(PendingTransactionConfig::new(tx_hash))
            .await?;
        let hash = pending.await?;
        let receipt = self
            .provider
            .get_transaction_receipt(hash)
            .await?
            .with_context(|| format!("transaction {hash} confirmed but receipt unavailable"))?;
        Ok(receipt.into())
    }
}
