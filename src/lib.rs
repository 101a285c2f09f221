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

#![forbid(unsafe_code)]
//! Crossbar Core Library
//!
//! Crossbar is a combined event/command bus which guarantees that the
//! handlers of registered aggregates run serialized, one message at a time,
//! in arrival order, while event observers are notified in parallel on
//! their own tasks.
//!
//! The building blocks are the generic serialized [`actor`] loop, the
//! aggregate/observer [`bus`] built on top of it, and the [`identity`],
//! [`message`] and [`traits`] layers they exchange.

pub(crate) mod actor;
pub(crate) mod bus;
/// Common utilities and structures used throughout the crate.
pub(crate) mod common;
pub(crate) mod identity;
pub(crate) mod message;
/// Trait definitions used by bus participants.
pub(crate) mod traits;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use async_trait::async_trait;
    pub use tokio_util::sync::CancellationToken;

    pub use crate::actor::ActorHandle;
    pub use crate::bus::{Bus, RemotePublishFn, RemoteSubmitFn, SubscriptionId};
    pub use crate::common::{BusError, BusResult, EventRef, ObserverFn};
    pub use crate::identity::{node_id, set_node_id, AggregateId, ParseIdError, ResourceType};
    pub use crate::message::{root_scope, Command, CommandDone, CommandResult, ServiceReady};
    pub use crate::traits::{Aggregate, CommandPayload, Event, Outcome};
}
