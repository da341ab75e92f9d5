// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

mod builder;
mod decrypt;
mod http_relayer;
mod instance;
mod sdk;

pub use builder::*;
pub use decrypt::*;
pub use http_relayer::*;
pub use instance::*;
pub use sdk::*;
