// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::traits::Event;
use actix::prelude::*;
use anyhow::anyhow;
use std::collections::{HashMap, VecDeque};
use std::marker::PhantomData;

/// Central EventBus for the client. Components publish lifecycle events to
/// this bus by sending it messages; listeners subscribe by event type or
/// with the `"*"` wildcard.
pub struct EventBus<E: Event> {
    listeners: HashMap<String, Vec<Recipient<E>>>,
}

impl<E: Event> Actor for EventBus<E> {
    type Context = Context<Self>;
}

impl<E: Event> EventBus<E> {
    pub fn new() -> Self {
        EventBus {
            listeners: HashMap::new(),
        }
    }
}

impl<E: Event> Default for EventBus<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Event> Handler<E> for EventBus<E> {
    type Result = ();

    fn handle(&mut self, event: E, _: &mut Context<Self>) {
        if let Some(listeners) = self.listeners.get("*") {
            for listener in listeners {
                listener.do_send(event.clone());
            }
        }

        if let Some(listeners) = self.listeners.get(&event.event_type()) {
            for listener in listeners {
                listener.do_send(event.clone());
            }
        }

        tracing::trace!(">>> {}", event);
    }
}

#[derive(Message)]
#[rtype(result = "()")]
pub struct Subscribe<E: Event> {
    pub event_type: String,
    pub listener: Recipient<E>,
}

impl<E: Event> Subscribe<E> {
    pub fn new(event_type: impl Into<String>, listener: Recipient<E>) -> Self {
        Self {
            event_type: event_type.into(),
            listener,
        }
    }
}

impl<E: Event> Handler<Subscribe<E>> for EventBus<E> {
    type Result = ();

    fn handle(&mut self, msg: Subscribe<E>, _: &mut Context<Self>) {
        self.listeners
            .entry(msg.event_type)
            .or_default()
            .push(msg.listener);
    }
}

//////////////////////////////////////////////////////////////////////////////
// History Collector
//////////////////////////////////////////////////////////////////////////////

#[derive(Message)]
#[rtype(result = "Vec<E>")]
pub struct GetEvents<E: Event>(PhantomData<E>);

impl<E: Event> GetEvents<E> {
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<E: Event> Default for GetEvents<E> {
    fn default() -> Self {
        Self::new()
    }
}

/// Actor to subscribe to EventBus to capture all history
pub struct HistoryCollector<E: Event> {
    history: VecDeque<E>,
}

impl<E: Event> HistoryCollector<E> {
    pub fn new() -> Self {
        Self {
            history: VecDeque::new(),
        }
    }
}

impl<E: Event> Default for HistoryCollector<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Event> Actor for HistoryCollector<E> {
    type Context = Context<Self>;
}

impl<E: Event> Handler<E> for HistoryCollector<E> {
    type Result = E::Result;
    fn handle(&mut self, msg: E, _: &mut Self::Context) -> Self::Result {
        self.history.push_back(msg);
    }
}

impl<E: Event> Handler<GetEvents<E>> for HistoryCollector<E> {
    type Result = Vec<E>;

    fn handle(&mut self, _: GetEvents<E>, _: &mut Context<Self>) -> Vec<E> {
        self.history.iter().cloned().collect()
    }
}

/// Function to help with testing when we want to maintain a vec of events
pub fn new_event_bus_with_history<E: Event>() -> (Addr<EventBus<E>>, Addr<HistoryCollector<E>>) {
    let bus = EventBus::<E>::new().start();
    let history = HistoryCollector::new().start();
    bus.do_send(Subscribe::new("*", history.clone().recipient()));
    (bus, history)
}

//////////////////////////////////////////////////////////////////////////////
// Event Waiter
//////////////////////////////////////////////////////////////////////////////

type WaitPredicate<E> = Box<dyn Fn(&E) -> bool>;

struct EventWaiter<E: Event> {
    predicate: WaitPredicate<E>,
    sender: Option<tokio::sync::oneshot::Sender<E>>,
}

impl<E: Event> Actor for EventWaiter<E> {
    type Context = Context<Self>;
}

impl<E: Event> Handler<E> for EventWaiter<E> {
    type Result = ();

    fn handle(&mut self, msg: E, ctx: &mut Self::Context) -> Self::Result {
        if (self.predicate)(&msg) {
            if let Some(sender) = self.sender.take() {
                let _ = sender.send(msg);
            }
            ctx.stop();
        }
    }
}

/// Resolve once the bus broadcasts an event matching the predicate.
/// Subscribe before triggering the action under test or the event may be
/// missed.
pub fn wait_for_event<E: Event, F>(
    bus: &Addr<EventBus<E>>,
    predicate: F,
) -> impl std::future::Future<Output = anyhow::Result<E>>
where
    F: Fn(&E) -> bool + 'static,
{
    let (tx, rx) = tokio::sync::oneshot::channel();
    let waiter = EventWaiter {
        predicate: Box::new(predicate) as WaitPredicate<E>,
        sender: Some(tx),
    }
    .start();
    bus.do_send(Subscribe::new("*", waiter.recipient()));

    async move { rx.await.map_err(|_| anyhow!("event waiter dropped")) }
}
