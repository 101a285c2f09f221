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

//! Shared type aliases for handler closures and event references.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::message::Command;
use crate::traits::Event;

/// A reference-counted, type-erased event as it travels through the bus.
///
/// Events are shared between the destination aggregate and every observer,
/// so they are handed around behind an `Arc` rather than cloned.
pub type EventRef = Arc<dyn Event>;

/// An observer callback registered with [`Bus::observe`](crate::bus::Bus::observe).
///
/// Observers run on their own spawned task per delivered event and must not
/// assume any ordering relative to other observers or the destination
/// aggregate.
pub type ObserverFn = Arc<dyn Fn(EventRef) + Send + Sync + 'static>;

/// Crate-internal: pinned, boxed future returned by message handlers.
pub(crate) type FutureBox = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// Crate-internal: the boxed command callback driven by an actor loop.
pub(crate) type CommandHandlerFn = Box<dyn Fn(Command) -> FutureBox + Send + 'static>;

/// Crate-internal: the boxed event callback driven by an actor loop.
pub(crate) type EventHandlerFn = Box<dyn Fn(EventRef) -> FutureBox + Send + 'static>;
