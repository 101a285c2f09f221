/*
 * Copyright (c) 2024. Govcraft
 *
 * Licensed under either of
 *   * Apache License, Version 2.0 (the "License");
 *     you may not use this file except in compliance with the License.
 *     You may obtain a copy of the License at http://www.apache.org/licenses/LICENSE-2.0
 *   * MIT license: http://opensource.org/licenses/MIT
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the applicable License for the specific language governing permissions and
 * limitations under that License.
 */

//! The dispatcher: routes commands to per-aggregate actors and fans events
//! out to observers.

mod aggregate_actor;
mod dispatch;
mod remote;
mod subscription;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, warn};

use crate::actor::ActorHandle;
use crate::bus::aggregate_actor::AggregateActor;
use crate::bus::dispatch::Dispatch;
use crate::common::{BusError, BusResult, EventRef, ObserverFn};
use crate::identity::AggregateId;
use crate::message::{Command, CommandDone, CommandResult};
use crate::traits::{Aggregate, Event};

pub use remote::{RemotePublishFn, RemoteSubmitFn};
pub use subscription::SubscriptionId;

/// The bus serializes command and event notification on behalf of
/// registered aggregates and lets observers subscribe to immediate event
/// notification.
///
/// Cloning a `Bus` yields another handle onto the same dispatcher. Both
/// registries are owned by the bus loop: every mutation goes through an
/// action on that loop, so register/unregister/observe/unsubscribe have a
/// total order.
#[derive(Clone)]
pub struct Bus {
    actor: ActorHandle,
    aggregates: Arc<DashMap<AggregateId, AggregateActor>>,
    observers: Arc<DashMap<SubscriptionId, ObserverFn>>,
    dispatch: Dispatch,
    tracker: TaskTracker,
}

impl Bus {
    /// Instantiates a new bus, ready to process commands and events.
    ///
    /// Must be called from within a tokio runtime. Cancelling `scope`
    /// shuts down the bus and every aggregate actor registered on it.
    pub fn new(scope: &CancellationToken) -> Self {
        let aggregates: Arc<DashMap<AggregateId, AggregateActor>> = Arc::new(DashMap::new());
        let observers: Arc<DashMap<SubscriptionId, ObserverFn>> = Arc::new(DashMap::new());
        let tracker = TaskTracker::new();

        let on_command = {
            let aggregates = aggregates.clone();
            move |command: Command| {
                let aggregates = aggregates.clone();
                async move { route_command(&aggregates, command) }
            }
        };
        let on_event = {
            let aggregates = aggregates.clone();
            let observers = observers.clone();
            let tracker = tracker.clone();
            move |event: EventRef| {
                let aggregates = aggregates.clone();
                let observers = observers.clone();
                let tracker = tracker.clone();
                async move { deliver_event(&aggregates, &observers, &tracker, event) }
            }
        };

        let actor = ActorHandle::spawn(scope, on_command, on_event, true);
        let dispatch = Dispatch::new(actor.clone());
        Self {
            actor,
            aggregates,
            observers,
            dispatch,
            tracker,
        }
    }

    /// Submits `command` to the local bus, or hands it to the remote-submit
    /// hook when its destination is not local.
    pub fn submit(&self, command: Command) -> BusResult<()> {
        self.dispatch.submit(command)
    }

    /// Publishes `event` on the local bus, or hands it to the
    /// remote-publish hook when its destination is non-zero and not local.
    pub fn publish<E: Event>(&self, event: E) -> BusResult<()> {
        self.dispatch.publish(Arc::new(event))
    }

    /// Registers `aggregate` to handle commands on this bus.
    ///
    /// `ready` states whether the aggregate can process commands right
    /// away; if false, its commands queue until a
    /// [`ServiceReady`](crate::message::ServiceReady) event arrives.
    /// Registering the same id twice is a no-op reusing the first actor.
    pub async fn register(&self, aggregate: Arc<dyn Aggregate>, ready: bool) -> BusResult<()> {
        let id = aggregate.aggregate_id();
        if id.is_zero() {
            return Err(BusError::ZeroAggregateId);
        }
        let aggregates = self.aggregates.clone();
        let dispatch = self.dispatch.clone();
        let scope = self.actor.scope().clone();
        self.actor
            .act(move || {
                debug!(aggregate = %id, "registering aggregate");
                aggregates
                    .entry(id)
                    .or_insert_with(|| AggregateActor::new(&scope, dispatch, aggregate, ready));
                Ok(())
            })
            .await
    }

    /// Removes the aggregate registered under `id` and shuts its actor
    /// down. Unknown ids are treated as success.
    pub async fn unregister(&self, id: AggregateId) -> BusResult<()> {
        let aggregates = self.aggregates.clone();
        self.actor
            .act(move || {
                debug!(aggregate = %id, "de-registering aggregate");
                match aggregates.remove(&id) {
                    Some((_, actor)) => actor.shutdown(),
                    None => Ok(()),
                }
            })
            .await
    }

    /// Subscribes `handler` to immediate notification of every event.
    pub async fn observe<F>(&self, handler: F) -> BusResult<SubscriptionId>
    where
        F: Fn(EventRef) + Send + Sync + 'static,
    {
        let id = SubscriptionId::generate();
        let handler: ObserverFn = Arc::new(handler);
        let observers = self.observers.clone();
        self.actor
            .act(move || {
                observers.insert(id, handler);
                Ok(())
            })
            .await?;
        Ok(id)
    }

    /// Removes subscription `id`. Removing an unknown subscription is not
    /// an error.
    pub async fn unsubscribe(&self, id: SubscriptionId) -> BusResult<()> {
        let observers = self.observers.clone();
        self.actor
            .act(move || {
                observers.remove(&id);
                Ok(())
            })
            .await
    }

    /// Submits `command` and waits for its completion event.
    ///
    /// Returns on whichever comes first: the
    /// [`CommandDone`](crate::message::CommandDone) addressed back to the
    /// command's source, cancellation of `wait`, or cancellation of the
    /// command's own scope. The one-shot completion observer is removed on
    /// every exit path.
    pub async fn launch(&self, wait: &CancellationToken, command: Command) -> CommandResult {
        self.launch_inner(wait, None, command).await
    }

    /// A variation of [`launch`](Self::launch) which takes a timeout
    /// instead of a wait scope. Expiry of the deadline is reported
    /// distinctly from cancellation.
    pub async fn launch_wait(&self, command: Command, max_wait: Duration) -> CommandResult {
        let wait = CancellationToken::new();
        self.launch_inner(&wait, Some(max_wait), command).await
    }

    async fn launch_inner(
        &self,
        wait: &CancellationToken,
        deadline: Option<Duration>,
        command: Command,
    ) -> CommandResult {
        let descriptor = command.descriptor().to_owned();
        let issuer = command.source().clone();

        // One-off subscription for the completion event. The reply channel
        // holds one slot; later matches are dropped on the floor.
        let (reply_tx, mut reply_rx) = mpsc::channel::<CommandResult>(1);
        let subscription = match self
            .observe(move |event| {
                if let Some(done) = event.as_any().downcast_ref::<CommandDone>() {
                    if done.dst == issuer {
                        let _ = reply_tx.try_send(done.result());
                    }
                }
            })
            .await
        {
            Ok(id) => id,
            Err(err) => {
                return CommandResult::from_err(BusError::SubscribeFailed {
                    descriptor,
                    source: Box::new(err),
                })
            }
        };

        if let Err(err) = self.submit(command.clone()) {
            let _ = self.unsubscribe(subscription).await;
            return CommandResult::from_err(BusError::SubmitFailed {
                descriptor,
                source: Box::new(err),
            });
        }

        let expired = async {
            match deadline {
                Some(max_wait) => tokio::time::sleep(max_wait).await,
                None => std::future::pending().await,
            }
        };
        let result = tokio::select! {
            reply = reply_rx.recv() => {
                reply.unwrap_or_else(|| CommandResult::from_err(BusError::Shutdown))
            }
            _ = expired => CommandResult::from_err(BusError::DeadlineExceeded(descriptor.clone())),
            _ = wait.cancelled() => CommandResult::from_err(BusError::WaitCanceled(descriptor.clone())),
            _ = command.scope().cancelled() => {
                CommandResult::from_err(BusError::CommandCanceled(descriptor.clone()))
            }
        };

        let _ = self.unsubscribe(subscription).await;
        result
    }

    /// Replaces the hook invoked for commands with a non-local destination.
    pub fn set_remote_submit(&self, hook: RemoteSubmitFn) {
        self.dispatch.set_remote_submit(hook);
    }

    /// Replaces the hook invoked for events with a non-local destination.
    pub fn set_remote_publish(&self, hook: RemotePublishFn) {
        self.dispatch.set_remote_publish(hook);
    }

    /// One-line account of the registries, computed on the bus loop.
    pub async fn summary(&self) -> String {
        let (tx, rx) = oneshot::channel();
        let aggregates = self.aggregates.clone();
        let observers = self.observers.clone();
        let outcome = self
            .actor
            .act(move || {
                let _ = tx.send(format!(
                    "bus (aggregates: {}, subscriptions: {})",
                    aggregates.len(),
                    observers.len()
                ));
                Ok(())
            })
            .await;
        if let Err(err) = outcome {
            return format!("bus in error: {err}");
        }
        rx.await
            .unwrap_or_else(|_| format!("bus in error: {}", BusError::Shutdown))
    }

    /// Cancels the bus scope; every registered aggregate actor follows.
    pub fn shutdown(&self) -> BusResult<()> {
        self.actor.shutdown()
    }

    /// True while the bus is able to process commands and events.
    pub fn is_active(&self) -> bool {
        self.actor.is_active()
    }

    /// Active references on the bus actor.
    pub fn refs(&self) -> u32 {
        self.actor.refs()
    }

    /// The bus actor's cancellation scope.
    pub fn scope(&self) -> &CancellationToken {
        self.actor.scope()
    }
}

impl fmt::Debug for Bus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bus")
            .field("aggregates", &self.aggregates.len())
            .field("subscriptions", &self.observers.len())
            .field("active", &self.is_active())
            .finish()
    }
}

/// Routes one inbound command to its aggregate actor, on the bus loop.
fn route_command(aggregates: &DashMap<AggregateId, AggregateActor>, command: Command) {
    // Most-specific match (node + kind + instance) first.
    if let Some(target) = aggregates.get(command.dest()) {
        let id = target.id();
        if let Err(err) = target.submit(command) {
            error!(aggregate = %id, error = %err, "failed to submit command");
        }
        return;
    }
    // No specific instance: fall back to the general manager of this kind.
    if !command.dest().instance.is_empty() {
        let root = AggregateId::new(command.dest().kind, "");
        if let Some(target) = aggregates.get(&root) {
            let id = target.id();
            if let Err(err) = target.submit(command) {
                error!(aggregate = %id, error = %err, "failed to submit command");
            }
            return;
        }
    }

    // No match means a legitimate command has no handler, which is a
    // configuration bug, not a runtime condition to limp through.
    error!(command = %command, destination = %command.dest(), "no aggregate handler registered for command");
    std::process::exit(1);
}

/// Delivers one inbound event, on the bus loop.
fn deliver_event(
    aggregates: &DashMap<AggregateId, AggregateActor>,
    observers: &DashMap<SubscriptionId, ObserverFn>,
    tracker: &TaskTracker,
    event: EventRef,
) {
    // 1. The destination aggregate receives the event on its own mailbox.
    if let Some(target) = aggregates.get(&event.dest()) {
        let id = target.id();
        if let Err(err) = target.publish(event.clone()) {
            warn!(aggregate = %id, error = %err, "failed to publish event to aggregate");
        }
    }

    // 2. Observers run in parallel, each on its own task, so none of them
    // can block the bus or each other.
    for entry in observers.iter() {
        let handler = entry.value().clone();
        let event = event.clone();
        tracker.spawn(async move { handler(event) });
    }
}
