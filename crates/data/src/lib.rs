// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

mod meta_store;
mod sled_db;
mod wallet_votes;

pub use meta_store::*;
pub use sled_db::*;
pub use wallet_votes::*;
