// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use alloy::primitives::Address;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Vote counters carry different meaning before and after the reveal, so
/// the view model keeps them as distinct states instead of one pair of
/// fields that silently changes semantics.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum Tally {
    /// The chain still holds encrypted aggregates; the counters it reports
    /// stay at zero until the reveal callback lands.
    Pending { yes_votes: u32, no_votes: u32 },
    /// Final cleartext counts.
    Revealed { yes_votes: u32, no_votes: u32 },
}

impl Tally {
    pub fn yes_votes(&self) -> u32 {
        match self {
            Tally::Pending { yes_votes, .. } | Tally::Revealed { yes_votes, .. } => *yes_votes,
        }
    }

    pub fn no_votes(&self) -> u32 {
        match self {
            Tally::Pending { no_votes, .. } | Tally::Revealed { no_votes, .. } => *no_votes,
        }
    }

    pub fn total_votes(&self) -> u32 {
        self.yes_votes() + self.no_votes()
    }

    pub fn is_revealed(&self) -> bool {
        matches!(self, Tally::Revealed { .. })
    }
}

/// One voting session as the presentation layer consumes it: on-chain
/// state merged with local metadata.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionView {
    pub session_id: u64,
    pub title: String,
    pub description: String,
    pub creator: Address,
    pub end_time: DateTime<Utc>,
    pub resolved: bool,
    pub reveal_requested: bool,
    pub has_voted: bool,
    pub is_active: bool,
    pub tally: Tally,
}

impl SessionView {
    pub fn total_votes(&self) -> u32 {
        self.tally.total_votes()
    }
}

/// Deterministic stand-ins for sessions another client created, whose
/// title and description never reached this browser's store.
pub fn placeholder_title(session_id: u64) -> String {
    format!("Voting Session #{}", session_id + 1)
}

pub fn placeholder_description(creator: &Address) -> String {
    let addr = creator.to_string();
    format!(
        "On-chain encrypted voting session created by {}...{}",
        &addr[..6],
        &addr[addr.len() - 4..]
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholders_are_deterministic() {
        assert_eq!(placeholder_title(0), "Voting Session #1");
        assert_eq!(placeholder_title(4), "Voting Session #5");

        let creator = Address::repeat_byte(0xab);
        let description = placeholder_description(&creator);
        assert!(description.starts_with("On-chain encrypted voting session created by 0x"));
        assert!(description.contains("..."));
        assert_eq!(description, placeholder_description(&creator));
    }

    #[test]
    fn test_tally_accessors() {
        let pending = Tally::Pending {
            yes_votes: 0,
            no_votes: 0,
        };
        assert!(!pending.is_revealed());
        assert_eq!(pending.total_votes(), 0);

        let revealed = Tally::Revealed {
            yes_votes: 3,
            no_votes: 2,
        };
        assert!(revealed.is_revealed());
        assert_eq!(revealed.yes_votes(), 3);
        assert_eq!(revealed.no_votes(), 2);
        assert_eq!(revealed.total_votes(), 5);
    }
}
