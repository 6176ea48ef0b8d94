//! Subscription scheduler
//!
//! One recurring task per client drives every subscription. Each tick, in
//! order: query the server run state, flush deferred removals, stop if
//! nothing is subscribed any more, fire run-state edge callbacks, then
//! process every watched variable while the server is running. Ticks are
//! synchronous and bounded, so they never overlap; a failed state query
//! skips the tick instead of killing the task.
//!
//! Callbacks are dispatched with no engine lock held, so they are free to
//! subscribe or unsubscribe; such changes still follow the deferred-removal
//! rule and take structural effect at the next tick.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use crate::client::{ClientInner, EventCallback};
use crate::variable::VarInner;

/// Transition of the runtime's program between two scheduler ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerEvent {
    /// The program started executing
    Started,
    /// The program stopped
    Stopped,
}

#[derive(Debug, PartialEq, Eq)]
enum TickFlow {
    Continue,
    Stop,
}

pub(crate) fn spawn(client: Arc<ClientInner>) -> JoinHandle<()> {
    tokio::spawn(run(client))
}

async fn run(client: Arc<ClientInner>) {
    // Fresh edge-detection context for every scheduler start. If the
    // sample fails, the first good tick records the state without firing.
    let initial = match client.server_running() {
        Ok(running) => Some(running),
        Err(e) => {
            warn!(error = %e, "initial server state query failed");
            None
        }
    };
    client.subs.lock().server_was_running = initial;

    let period = client.poll_interval;
    let mut interval = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    debug!("subscription scheduler started");

    loop {
        interval.tick().await;
        if run_tick(&client) == TickFlow::Stop {
            debug!("subscription scheduler stopped");
            break;
        }
    }
}

fn run_tick(client: &Arc<ClientInner>) -> TickFlow {
    let running = match client.server_running() {
        Ok(running) => running,
        Err(e) => {
            warn!(error = %e, "server state query failed, skipping tick");
            return TickFlow::Continue;
        }
    };

    let event: Option<ServerEvent>;
    let event_cbs: Vec<EventCallback>;
    let vars: Vec<Arc<VarInner>>;
    {
        let mut subs = client.subs.lock();

        // Deferred removals apply at tick start, never mid-iteration.
        let event_removals: Vec<u64> = subs.event_removals.drain().collect();
        for id in event_removals {
            subs.event_subs.remove(&id);
        }
        let var_removals: Vec<Arc<VarInner>> = subs.var_removals.drain(..).collect();
        for var in var_removals {
            subs.var_subs.retain(|v| !Arc::ptr_eq(v, &var));
        }

        if subs.event_subs.is_empty() && subs.var_subs.is_empty() {
            subs.scheduler = None;
            return TickFlow::Stop;
        }

        event = match subs.server_was_running {
            Some(previous) if previous != running => Some(if running {
                ServerEvent::Started
            } else {
                ServerEvent::Stopped
            }),
            _ => None,
        };
        subs.server_was_running = Some(running);

        event_cbs = if event.is_some() {
            subs.event_subs.values().cloned().collect()
        } else {
            Vec::new()
        };
        vars = if running { subs.var_subs.clone() } else { Vec::new() };
    }

    if let Some(event) = event {
        debug!(?event, "server run state changed");
        for callback in &event_cbs {
            callback(event);
        }
    }

    let mut dropped: Vec<Arc<VarInner>> = Vec::new();
    for var in &vars {
        if !var.process_tick(client) {
            dropped.push(var.clone());
        }
    }

    // Self-unsubscribed variables leave at the start of the next tick.
    if !dropped.is_empty() {
        let mut subs = client.subs.lock();
        subs.var_removals.extend(dropped);
    }

    TickFlow::Continue
}
