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

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::common::BusError;
use crate::identity::AggregateId;
use crate::message::{Command, CommandResult};
use crate::traits::{CommandPayload, Event};

/// Published whenever a command completes, success or not.
///
/// `src` is the identity the command was addressed to, which in the
/// general-manager case differs from the id of the aggregate that actually
/// dispatched it; the reply must come from the addressed identity. `dst`
/// is the command's issuer.
#[derive(Debug, Clone)]
pub struct CommandDone {
    /// Aggregate reporting the completion.
    pub src: AggregateId,
    /// Issuer of the command, the intended receiver of this event.
    pub dst: AggregateId,
    /// Payload descriptor of the original command.
    pub descriptor: String,
    /// Payload of the original command.
    pub payload: Arc<dyn CommandPayload>,
    /// Success status as text; may be empty.
    pub status: String,
    /// Stringified failure; empty means the command succeeded.
    pub error: String,
}

impl CommandDone {
    /// Completion event for a command whose handler returned a status.
    pub fn success(src: AggregateId, command: &Command, status: impl Into<String>) -> Self {
        Self {
            src,
            dst: command.source().clone(),
            descriptor: command.descriptor().to_owned(),
            payload: command.payload_arc(),
            status: status.into(),
            error: String::new(),
        }
    }

    /// Completion event for a command whose handler failed.
    pub fn failure(src: AggregateId, command: &Command, error: &anyhow::Error) -> Self {
        Self {
            src,
            dst: command.source().clone(),
            descriptor: command.descriptor().to_owned(),
            payload: command.payload_arc(),
            status: String::new(),
            error: error.to_string(),
        }
    }

    /// Converts the completion into the result handed back by launch.
    pub fn result(&self) -> CommandResult {
        if self.error.is_empty() {
            CommandResult::ok(self.status.clone())
        } else {
            CommandResult {
                result: self.status.clone(),
                err: Some(BusError::CommandFailed(self.error.clone())),
            }
        }
    }
}

impl Event for CommandDone {
    fn source(&self) -> AggregateId {
        self.src.clone()
    }

    fn dest(&self) -> AggregateId {
        self.dst.clone()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl fmt::Display for CommandDone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CommandDone({}, {})", self.descriptor, self.result())
    }
}
