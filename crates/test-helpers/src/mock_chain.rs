// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use alloy::primitives::{Address, Bytes, TxHash, B256};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::Utc;
use cv_evm::{
    Confirmation, RevealHandles, SessionInfo, SessionRecord, VotingRead, VotingWrite,
};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

#[derive(Clone, Debug)]
pub struct MockSession {
    pub creator: Address,
    pub end_time: u64,
    pub resolved: bool,
    pub yes_votes: u32,
    pub no_votes: u32,
    pub reveal_requested: bool,
    pub voters: HashSet<Address>,
}

impl MockSession {
    /// An open session ending the given number of seconds from now.
    pub fn open(creator: Address, ends_in_secs: i64) -> Self {
        Self {
            creator,
            end_time: (Utc::now().timestamp() + ends_in_secs) as u64,
            resolved: false,
            yes_votes: 0,
            no_votes: 0,
            reveal_requested: false,
            voters: HashSet::new(),
        }
    }

    pub fn resolved(creator: Address, yes_votes: u32, no_votes: u32) -> Self {
        Self {
            creator,
            end_time: (Utc::now().timestamp() - 3600) as u64,
            resolved: true,
            yes_votes,
            no_votes,
            reveal_requested: true,
            voters: HashSet::new(),
        }
    }
}

/// In-memory stand-in for the voting contract: sequential ids, per-address
/// vote flags, failure injection for reads and votes, and counters for
/// every write so tests can assert that no transaction left the client.
pub struct MockVotingChain {
    sender: Address,
    sessions: Mutex<Vec<MockSession>>,
    reveal_handles: Mutex<HashMap<u64, RevealHandles>>,
    failing_reads: Mutex<HashSet<u64>>,
    fail_votes: AtomicBool,
    pub vote_txs: AtomicUsize,
    pub create_txs: AtomicUsize,
    pub reveal_txs: AtomicUsize,
    tx_counter: AtomicUsize,
}

impl MockVotingChain {
    /// `sender` plays the role of `msg.sender` for write calls.
    pub fn new(sender: Address) -> Self {
        Self {
            sender,
            sessions: Mutex::new(Vec::new()),
            reveal_handles: Mutex::new(HashMap::new()),
            failing_reads: Mutex::new(HashSet::new()),
            fail_votes: AtomicBool::new(false),
            vote_txs: AtomicUsize::new(0),
            create_txs: AtomicUsize::new(0),
            reveal_txs: AtomicUsize::new(0),
            tx_counter: AtomicUsize::new(0),
        }
    }

    pub fn add_session(&self, session: MockSession) -> u64 {
        let mut sessions = self.sessions.lock().unwrap();
        sessions.push(session);
        (sessions.len() - 1) as u64
    }

    pub fn mark_voted(&self, session_id: u64, address: Address) {
        self.sessions.lock().unwrap()[session_id as usize]
            .voters
            .insert(address);
    }

    pub fn fail_reads_for(&self, session_id: u64) {
        self.failing_reads.lock().unwrap().insert(session_id);
    }

    pub fn fail_votes(&self) {
        self.fail_votes.store(true, Ordering::SeqCst);
    }

    pub fn set_reveal_handles(&self, session_id: u64, yes_votes: B256, no_votes: B256) {
        self.reveal_handles.lock().unwrap().insert(
            session_id,
            RevealHandles {
                yes_votes,
                no_votes,
            },
        );
    }

    pub fn vote_tx_count(&self) -> usize {
        self.vote_txs.load(Ordering::SeqCst)
    }

    fn next_tx_hash(&self) -> TxHash {
        let n = self.tx_counter.fetch_add(1, Ordering::SeqCst) as u8;
        TxHash::repeat_byte(n.wrapping_add(1))
    }

    fn session(&self, session_id: u64) -> Result<MockSession> {
        if self.failing_reads.lock().unwrap().contains(&session_id) {
            return Err(anyhow!("rpc error loading session {session_id}"));
        }
        self.sessions
            .lock()
            .unwrap()
            .get(session_id as usize)
            .cloned()
            .ok_or_else(|| anyhow!("unknown session {session_id}"))
    }
}

#[async_trait]
impl VotingRead for MockVotingChain {
    async fn get_session_count(&self) -> Result<u64> {
        Ok(self.sessions.lock().unwrap().len() as u64)
    }

    async fn get_session(&self, session_id: u64) -> Result<SessionInfo> {
        let session = self.session(session_id)?;
        Ok(SessionInfo {
            creator: session.creator,
            end_time: session.end_time,
            resolved: session.resolved,
            yes_votes: if session.resolved { session.yes_votes } else { 0 },
            no_votes: if session.resolved { session.no_votes } else { 0 },
        })
    }

    async fn get_session_record(&self, session_id: u64) -> Result<SessionRecord> {
        let session = self.session(session_id)?;
        Ok(SessionRecord {
            creator: session.creator,
            end_time: session.end_time,
            resolved: session.resolved,
            revealed_yes: session.yes_votes,
            revealed_no: session.no_votes,
            reveal_requested: session.reveal_requested,
        })
    }

    async fn has_voted(&self, session_id: u64, address: Address) -> Result<bool> {
        Ok(self.session(session_id)?.voters.contains(&address))
    }

    async fn reveal_handles(&self, session_id: u64) -> Result<RevealHandles> {
        self.reveal_handles
            .lock()
            .unwrap()
            .get(&session_id)
            .copied()
            .ok_or_else(|| anyhow!("no TallyRevealRequested event for session {session_id}"))
    }
}

#[async_trait]
impl VotingWrite for MockVotingChain {
    async fn send_create_session(&self, duration_seconds: u64) -> Result<TxHash> {
        self.create_txs.fetch_add(1, Ordering::SeqCst);
        self.add_session(MockSession::open(self.sender, duration_seconds as i64));
        Ok(self.next_tx_hash())
    }

    async fn send_vote(
        &self,
        session_id: u64,
        _encrypted_vote: B256,
        _proof: Bytes,
    ) -> Result<TxHash> {
        if self.fail_votes.load(Ordering::SeqCst) {
            return Err(anyhow!("user rejected the signature request"));
        }
        self.vote_txs.fetch_add(1, Ordering::SeqCst);
        self.mark_voted(session_id, self.sender);
        Ok(self.next_tx_hash())
    }

    async fn send_request_reveal(&self, session_id: u64) -> Result<TxHash> {
        self.reveal_txs.fetch_add(1, Ordering::SeqCst);
        self.sessions.lock().unwrap()[session_id as usize].reveal_requested = true;
        Ok(self.next_tx_hash())
    }

    async fn confirm(&self, tx_hash: TxHash) -> Result<Confirmation> {
        Ok(Confirmation {
            tx_hash,
            block_number: Some(1),
            gas_used: 21_000,
            success: true,
        })
    }
}
