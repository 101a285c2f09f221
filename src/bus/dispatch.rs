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

use std::sync::Arc;

use parking_lot::RwLock;

use crate::actor::ActorHandle;
use crate::bus::remote::{RemoteHooks, RemotePublishFn, RemoteSubmitFn};
use crate::common::{BusResult, EventRef};
use crate::message::Command;

/// Remote-aware ingress to the bus loop.
///
/// Holds the bus actor's handle plus the remote hooks and nothing else,
/// so aggregate actors can carry one without keeping the registry maps
/// alive.
#[derive(Clone)]
pub(crate) struct Dispatch {
    actor: ActorHandle,
    remote: Arc<RwLock<RemoteHooks>>,
}

impl Dispatch {
    pub(crate) fn new(actor: ActorHandle) -> Self {
        Self {
            actor,
            remote: Arc::new(RwLock::new(RemoteHooks::default())),
        }
    }

    /// Submits `command` to the local bus, or forwards it to the remote
    /// bus its destination lives on.
    pub(crate) fn submit(&self, command: Command) -> BusResult<()> {
        if !command.dest().is_local() {
            let hooks = self.remote.read();
            return (hooks.submit)(command.scope(), &command);
        }
        self.actor.submit(command)
    }

    /// Publishes `event` on the local bus, or forwards it to the remote
    /// bus its destination lives on.
    pub(crate) fn publish(&self, event: EventRef) -> BusResult<()> {
        let dest = event.dest();
        if !dest.is_zero() && !dest.is_local() {
            let hooks = self.remote.read();
            return (hooks.publish)(self.actor.scope(), &event);
        }
        self.actor.publish(event)
    }

    pub(crate) fn set_remote_submit(&self, hook: RemoteSubmitFn) {
        self.remote.write().submit = hook;
    }

    pub(crate) fn set_remote_publish(&self, hook: RemotePublishFn) {
        self.remote.write().publish = hook;
    }
}
