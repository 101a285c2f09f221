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

//! The generic serialized execution loop.
//!
//! An actor is one task fed by three mailboxes (events, commands, actions)
//! that invokes its two callbacks strictly one message at a time. Everything
//! above it, the bus and the per-aggregate adapters, is built from this
//! primitive.

mod handle;
mod runner;

pub use handle::ActorHandle;
pub(crate) use runner::{ActionEnvelope, ActorRunner, MailboxKeepalive};
