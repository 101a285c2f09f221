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

use std::fmt;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use crate::actor::ActorHandle;
use crate::bus::dispatch::Dispatch;
use crate::common::{BusError, BusResult, EventRef};
use crate::message::{Command, CommandDone, ServiceReady};
use crate::traits::Aggregate;

/// Serializes command and event handling on behalf of one registered
/// aggregate.
#[derive(Clone)]
pub(crate) struct AggregateActor {
    aggregate: Arc<dyn Aggregate>,
    actor: ActorHandle,
}

impl AggregateActor {
    /// Binds `aggregate` to a freshly spawned actor.
    ///
    /// When `ready` is false, commands queue until a
    /// [`ServiceReady`] event for this aggregate arrives.
    pub(crate) fn new(
        scope: &CancellationToken,
        dispatch: Dispatch,
        aggregate: Arc<dyn Aggregate>,
        ready: bool,
    ) -> Self {
        let on_command = {
            let aggregate = aggregate.clone();
            move |command: Command| {
                let aggregate = aggregate.clone();
                let dispatch = dispatch.clone();
                async move { handle_command(aggregate, dispatch, command).await }
            }
        };
        let on_event = {
            let aggregate = aggregate.clone();
            move |event: EventRef| {
                let aggregate = aggregate.clone();
                async move {
                    if event.as_any().downcast_ref::<ServiceReady>().is_some() {
                        // Consumed by the command gate; not passed on.
                        debug!(aggregate = %aggregate.aggregate_id(), "ready to process commands");
                    } else {
                        aggregate.handle_event(event).await;
                    }
                }
            }
        };
        let actor = ActorHandle::spawn(scope, on_command, on_event, ready);
        Self { aggregate, actor }
    }

    pub(crate) fn id(&self) -> crate::identity::AggregateId {
        self.aggregate.aggregate_id()
    }

    pub(crate) fn submit(&self, command: Command) -> BusResult<()> {
        self.actor.submit(command)
    }

    pub(crate) fn publish(&self, event: EventRef) -> BusResult<()> {
        self.actor.publish(event)
    }

    pub(crate) fn shutdown(&self) -> BusResult<()> {
        self.actor.shutdown()
    }
}

impl fmt::Debug for AggregateActor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AggregateActor")
            .field("id", &self.aggregate.aggregate_id())
            .finish_non_exhaustive()
    }
}

/// Runs one command through the aggregate and reports its completion.
async fn handle_command(aggregate: Arc<dyn Aggregate>, dispatch: Dispatch, command: Command) {
    let own_id = aggregate.aggregate_id();
    let addressed = command.dest().clone();

    // The destination identifies the matching aggregate, with the one
    // exception that a specific command (instance != "") may be handled by
    // the general manager (instance == "") of its node and kind.
    let exact = addressed == own_id;
    let general = own_id.instance.is_empty()
        && addressed.kind == own_id.kind
        && addressed.node == own_id.node;
    if !exact && !general {
        error!(
            aggregate = %own_id,
            destination = %addressed,
            "refusing to handle command for mismatching aggregate id"
        );
        return;
    }
    if command.scope().is_cancelled() {
        warn!(aggregate = %own_id, command = %command, "command canceled before handling");
        return;
    }

    let outcome = aggregate.handle_command(&command).await;

    // The completion reports the addressed identity as its source: when the
    // general manager dispatched the command, the reply must still come
    // from the id the command was addressed to.
    let (next, done) = match outcome {
        Ok(outcome) => (
            outcome.next,
            CommandDone::success(addressed, &command, outcome.status),
        ),
        Err(err) => (None, CommandDone::failure(addressed, &command, &err)),
    };

    if let Err(err) = dispatch.publish(Arc::new(done)) {
        if !matches!(err, BusError::Shutdown) {
            error!(aggregate = %own_id, error = %err, "failed to publish command completion");
        }
    }

    // The follow-up goes out only after the completion event, so observers
    // of the first completion see it before the chained command's effects.
    if let Some(next) = next {
        if let Err(err) = dispatch.submit(next) {
            error!(aggregate = %own_id, error = %err, "failed to submit follow-up command");
        }
    }
}
