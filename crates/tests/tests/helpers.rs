// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

#![allow(dead_code)]

use actix::Addr;
use alloy::primitives::Address;
use cv_data::{SessionMetaStore, SledDb};
use cv_events::{
    new_event_bus_with_history, EventBus, GetEvents, HistoryCollector, VotePhase, VotingEvent,
};
use cv_evm::Wallet;
use cv_fhe::{InstanceConfig, InstanceManager};
use cv_logger::SimpleLogger;
use cv_sessions::SessionSynchronizer;
use cv_test_helpers::{MockRelayerSdk, MockVotingChain};
use cv_voting::VoteOrchestrator;
use std::sync::Arc;

pub const VOTER: Address = Address::repeat_byte(0x11);
pub const CONTRACT: Address = Address::repeat_byte(0xc0);
pub const CHAIN_ID: u64 = 31337;

pub struct TestRig {
    pub wallet: Wallet,
    pub chain: Arc<MockVotingChain>,
    pub sdk: Arc<MockRelayerSdk>,
    pub instances: Arc<InstanceManager>,
    pub synchronizer: Arc<SessionSynchronizer>,
    pub orchestrator: VoteOrchestrator,
    pub bus: Addr<EventBus<VotingEvent>>,
    pub history: Addr<HistoryCollector<VotingEvent>>,
    _data_dir: tempfile::TempDir,
}

pub fn rig() -> TestRig {
    let (bus, history) = new_event_bus_with_history::<VotingEvent>();
    SimpleLogger::attach("test", bus.clone());

    let data_dir = tempfile::tempdir().unwrap();
    let meta = SessionMetaStore::new(SledDb::new(data_dir.path()).unwrap());

    let chain = Arc::new(MockVotingChain::new(VOTER));
    let synchronizer = Arc::new(SessionSynchronizer::new(chain.clone(), meta));

    let wallet = Wallet::new();
    let sdk = Arc::new(MockRelayerSdk::new());
    let config = InstanceConfig {
        chain_id: CHAIN_ID,
        network_url: "http://localhost:8545/".to_string(),
    };
    let instances = Arc::new(
        InstanceManager::new(sdk.clone(), config, wallet.clone()).with_bus(bus.clone()),
    );

    let orchestrator = VoteOrchestrator::new(
        wallet.clone(),
        instances.clone(),
        chain.clone(),
        chain.clone(),
        synchronizer.clone(),
        bus.clone(),
        CONTRACT,
    );

    TestRig {
        wallet,
        chain,
        sdk,
        instances,
        synchronizer,
        orchestrator,
        bus,
        history,
        _data_dir: data_dir,
    }
}

impl TestRig {
    pub async fn connect_and_init(&self) {
        self.wallet.connect(VOTER, CHAIN_ID);
        self.instances.initialize().await.unwrap();
    }

    pub async fn events(&self) -> Vec<VotingEvent> {
        self.history.send(GetEvents::new()).await.unwrap()
    }
}

pub fn phases(events: &[VotingEvent], for_session: u64) -> Vec<VotePhase> {
    events
        .iter()
        .filter_map(|event| match event {
            VotingEvent::VotePhaseChanged { session_id, phase } if *session_id == for_session => {
                Some(*phase)
            }
            _ => None,
        })
        .collect()
}
