// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

mod error;
mod eventbus;
mod traits;
mod voting_event;

pub use error::*;
pub use eventbus::*;
pub use traits::*;
pub use voting_event::*;
