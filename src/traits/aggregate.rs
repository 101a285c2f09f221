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

use async_trait::async_trait;

use crate::common::EventRef;
use crate::identity::AggregateId;
use crate::message::Command;

/// What an aggregate hands back from [`Aggregate::handle_command`].
///
/// `status` becomes the status text of the published
/// [`CommandDone`](crate::message::CommandDone); `next`, when set, is the
/// follow-up command submitted after that event.
#[derive(Debug, Default)]
pub struct Outcome {
    /// Next command in sequence, submitted after the completion event.
    pub next: Option<Command>,
    /// Success status reported to the command issuer; may be empty.
    pub status: String,
}

impl Outcome {
    /// Completion with no return value.
    pub fn done() -> Self {
        Self::default()
    }

    /// Completion with a status text.
    pub fn status(status: impl Into<String>) -> Self {
        Self {
            next: None,
            status: status.into(),
        }
    }

    /// Completion that chains a follow-up command.
    pub fn chain(next: Command) -> Self {
        Self {
            next: Some(next),
            status: String::new(),
        }
    }
}

/// An aggregate entity: a distinct subsystem with a cluster-unique identity
/// that owns a slice of state.
///
/// The bus guarantees that `handle_command` and `handle_event` never run
/// concurrently for one registered aggregate, so implementations that need
/// mutable state can use uncontended interior mutability.
#[async_trait]
pub trait Aggregate: Send + Sync + 'static {
    /// The cluster-unique id of this aggregate.
    fn aggregate_id(&self) -> AggregateId;

    /// Handles one command addressed to this aggregate.
    ///
    /// A [`CommandDone`](crate::message::CommandDone) event is published on
    /// the aggregate's behalf whether this returns `Ok` or `Err`.
    async fn handle_command(&self, command: &Command) -> anyhow::Result<Outcome>;

    /// Handles an event addressed to this aggregate.
    ///
    /// The default implementation ignores the event. `ServiceReady` is
    /// consumed by the runtime and never arrives here.
    async fn handle_event(&self, _event: EventRef) {}
}
