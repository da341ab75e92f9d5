// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::traits::Event;
use actix::Message;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

/// Lifecycle of the encryption instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FheStatus {
    Idle,
    Loading,
    Ready,
    Error,
}

impl Display for FheStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FheStatus::Idle => "idle",
            FheStatus::Loading => "loading",
            FheStatus::Ready => "ready",
            FheStatus::Error => "error",
        };
        write!(f, "{s}")
    }
}

/// Phases of a single vote attempt, in submission order. `Failed` is
/// reachable from every other phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VotePhase {
    Idle,
    CheckingEligibility,
    Encrypting,
    Submitting,
    Confirming,
    Refreshing,
    Done,
    Failed,
}

impl Display for VotePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            VotePhase::Idle => "idle",
            VotePhase::CheckingEligibility => "checking-eligibility",
            VotePhase::Encrypting => "encrypting",
            VotePhase::Submitting => "submitting",
            VotePhase::Confirming => "confirming",
            VotePhase::Refreshing => "refreshing",
            VotePhase::Done => "done",
            VotePhase::Failed => "failed",
        };
        write!(f, "{s}")
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VotingErrorType {
    Environment,
    Fhe,
    Evm,
    Data,
    Session,
    Vote,
}

#[derive(Message, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[rtype(result = "()")]
pub struct VotingError {
    pub err_type: VotingErrorType,
    pub message: String,
}

impl VotingError {
    pub fn new(err_type: VotingErrorType, message: &str) -> Self {
        Self {
            err_type,
            message: message.to_string(),
        }
    }
}

impl Display for VotingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl From<&crate::VoteError> for VotingError {
    fn from(err: &crate::VoteError) -> Self {
        Self {
            err_type: err.err_type(),
            message: err.to_string(),
        }
    }
}

/// Everything the voting core broadcasts on the bus. The presentation
/// layer renders these (toasts, spinners); nothing in the core consumes
/// them except the logger.
#[derive(Message, Clone, Debug, Serialize, Deserialize)]
#[rtype(result = "()")]
pub enum VotingEvent {
    FheStatusChanged {
        status: FheStatus,
    },
    VotePhaseChanged {
        session_id: u64,
        phase: VotePhase,
    },
    VoteSubmitted {
        session_id: u64,
        tx_hash: String,
    },
    SessionCreated {
        session_id: u64,
        tx_hash: String,
    },
    TallyRevealRequested {
        session_id: u64,
        tx_hash: String,
    },
    TallyDecrypted {
        session_id: u64,
        yes_votes: u64,
        no_votes: u64,
    },
    SessionsRefreshed {
        count: usize,
    },
    VotingError(VotingError),
}

impl Display for VotingEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use VotingEvent::*;
        match self {
            FheStatusChanged { status } => write!(f, "FheStatusChanged({status})"),
            VotePhaseChanged { session_id, phase } => {
                write!(f, "VotePhaseChanged({session_id}, {phase})")
            }
            VoteSubmitted { session_id, .. } => write!(f, "VoteSubmitted({session_id})"),
            SessionCreated { session_id, .. } => write!(f, "SessionCreated({session_id})"),
            TallyRevealRequested { session_id, .. } => {
                write!(f, "TallyRevealRequested({session_id})")
            }
            TallyDecrypted {
                session_id,
                yes_votes,
                no_votes,
            } => write!(f, "TallyDecrypted({session_id}, yes={yes_votes}, no={no_votes})"),
            SessionsRefreshed { count } => write!(f, "SessionsRefreshed({count})"),
            VotingError(err) => write!(f, "VotingError({:?})", err.err_type),
        }
    }
}

impl Event for VotingEvent {
    fn event_type(&self) -> String {
        use VotingEvent::*;
        let s = match self {
            FheStatusChanged { .. } => "FheStatusChanged",
            VotePhaseChanged { .. } => "VotePhaseChanged",
            VoteSubmitted { .. } => "VoteSubmitted",
            SessionCreated { .. } => "SessionCreated",
            TallyRevealRequested { .. } => "TallyRevealRequested",
            TallyDecrypted { .. } => "TallyDecrypted",
            SessionsRefreshed { .. } => "SessionsRefreshed",
            VotingError(_) => "VotingError",
        };
        s.to_string()
    }
}
