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

//! Extension points for non-local delivery.
//!
//! The bus itself ignores remoteness beyond these two hooks: a command
//! whose destination is not local goes to the submit hook, an event whose
//! destination is non-zero and not local goes to the publish hook.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::common::{BusError, BusResult, EventRef};
use crate::message::Command;

/// Forwards a command to the bus on the destination node.
pub type RemoteSubmitFn =
    Arc<dyn Fn(&CancellationToken, &Command) -> BusResult<()> + Send + Sync + 'static>;

/// Forwards an event to the bus on the destination node.
pub type RemotePublishFn =
    Arc<dyn Fn(&CancellationToken, &EventRef) -> BusResult<()> + Send + Sync + 'static>;

/// The currently installed remote hooks. Defaults are stubs that report
/// [`BusError::RemoteNotImplemented`].
pub(crate) struct RemoteHooks {
    pub(crate) submit: RemoteSubmitFn,
    pub(crate) publish: RemotePublishFn,
}

impl Default for RemoteHooks {
    fn default() -> Self {
        Self {
            submit: Arc::new(|_, _| Err(BusError::RemoteNotImplemented("remote submit"))),
            publish: Arc::new(|_, _| Err(BusError::RemoteNotImplemented("remote publish"))),
        }
    }
}
