// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use actix::{Actor, Addr, Context, Handler};
use cv_events::{EventBus, Subscribe, VotingEvent};
use tracing::{error, info, Level};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

pub fn setup_tracing(log_level: Level) {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::filter::LevelFilter::from_level(
            log_level,
        ))
        .init();
}

/// Subscribes to every bus event and writes it to the log, scoped under a
/// name so multiple clients in one process stay distinguishable.
pub struct SimpleLogger {
    name: String,
}

impl SimpleLogger {
    pub fn attach(name: &str, bus: Addr<EventBus<VotingEvent>>) -> Addr<Self> {
        let addr = Self {
            name: name.to_owned(),
        }
        .start();
        bus.do_send(Subscribe::new("*", addr.clone().recipient()));
        info!(node = %name, "READY!");
        addr
    }
}

impl Actor for SimpleLogger {
    type Context = Context<Self>;
}

impl Handler<VotingEvent> for SimpleLogger {
    type Result = ();

    fn handle(&mut self, msg: VotingEvent, _: &mut Self::Context) -> Self::Result {
        match &msg {
            VotingEvent::VotingError(err) => {
                error!(me = %self.name, evt = %msg, "ERROR! {}", err.message)
            }
            _ => info!(me = %self.name, evt = %msg, "Event Broadcasted"),
        }
    }
}
