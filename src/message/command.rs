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
use std::sync::OnceLock;

use tokio_util::sync::CancellationToken;

use crate::common::{BusError, BusResult};
use crate::identity::AggregateId;
use crate::traits::CommandPayload;

static ROOT_SCOPE: OnceLock<CancellationToken> = OnceLock::new();

/// The process-global root cancellation scope.
///
/// Every command scope is derived from it, so cancelling it abandons all
/// in-flight commands at once.
pub fn root_scope() -> &'static CancellationToken {
    ROOT_SCOPE.get_or_init(CancellationToken::new)
}

/// A request for an aggregate to do something.
///
/// Commands are immutable once constructed; clones share the payload and
/// the cancellation scope. Exactly one
/// [`CommandDone`](crate::message::CommandDone) is published per command
/// accepted by the bus.
#[derive(Debug, Clone)]
pub struct Command {
    src: AggregateId,
    dst: AggregateId,
    payload: Arc<dyn CommandPayload>,
    descriptor: String,
    scope: CancellationToken,
}

impl Command {
    /// Creates a command from `src` to `dst`.
    ///
    /// The payload descriptor must be non-empty; an empty string payload is
    /// rejected with [`BusError::EmptyDescriptor`]. The command's
    /// cancellation scope is derived from the [`root_scope`].
    pub fn new<P: CommandPayload>(
        src: AggregateId,
        dst: AggregateId,
        payload: P,
    ) -> BusResult<Self> {
        let descriptor = payload.descriptor();
        if descriptor.is_empty() {
            return Err(BusError::EmptyDescriptor);
        }
        Ok(Self {
            src,
            dst,
            payload: Arc::new(payload),
            descriptor,
            scope: root_scope().child_token(),
        })
    }

    /// The simplest use case: a command an aggregate addresses to itself.
    pub fn local<P: CommandPayload>(aggregate: AggregateId, payload: P) -> BusResult<Self> {
        Self::new(aggregate.clone(), aggregate, payload)
    }

    /// Re-derives this command's scope as a child of `parent` and returns
    /// the command together with a token that cancels it.
    pub fn with_scope(mut self, parent: &CancellationToken) -> (Self, CancellationToken) {
        self.scope = parent.child_token();
        let cancel = self.scope.clone();
        (self, cancel)
    }

    /// The subsystem issuing this command.
    pub fn source(&self) -> &AggregateId {
        &self.src
    }

    /// The designated receiver of this command.
    pub fn dest(&self) -> &AggregateId {
        &self.dst
    }

    /// Human-readable name of the payload.
    pub fn descriptor(&self) -> &str {
        &self.descriptor
    }

    /// The type-erased payload.
    pub fn payload(&self) -> &dyn CommandPayload {
        self.payload.as_ref()
    }

    /// Crate-internal: the shared payload handle, for the completion event.
    pub(crate) fn payload_arc(&self) -> Arc<dyn CommandPayload> {
        self.payload.clone()
    }

    /// Downcasts the payload to a concrete type.
    pub fn payload_as<P: CommandPayload>(&self) -> Option<&P> {
        self.payload.as_any().downcast_ref()
    }

    /// The cancellation scope of this command.
    ///
    /// Cancellation is advisory: a handler already running is expected to
    /// observe the scope and short-circuit.
    pub fn scope(&self) -> &CancellationToken {
        &self.scope
    }

    /// True if this command is not meant to leave the local bus.
    pub fn is_local(&self) -> bool {
        self.src.is_local() && self.dst.is_local()
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.descriptor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::ResourceType;

    #[derive(Debug)]
    struct FormatDisk {
        target: String,
    }

    impl CommandPayload for FormatDisk {
        fn as_any(&self) -> &dyn std::any::Any {
            self
        }
    }

    fn test_id() -> AggregateId {
        AggregateId {
            node: "node".to_owned(),
            kind: ResourceType::Cpu,
            instance: "0".to_owned(),
        }
    }

    #[test]
    fn struct_payload_descriptor_is_type_name() {
        let cmd = Command::local(
            test_id(),
            FormatDisk {
                target: "/dev/sda".to_owned(),
            },
        )
        .unwrap();
        assert_eq!(cmd.descriptor(), "FormatDisk");
        assert_eq!(cmd.to_string(), "FormatDisk");
        assert_eq!(cmd.payload_as::<FormatDisk>().unwrap().target, "/dev/sda");
        assert!(cmd.payload_as::<String>().is_none());
    }

    #[test]
    fn string_payload_is_its_own_descriptor() {
        let cmd = Command::local(test_id(), "reset counters".to_owned()).unwrap();
        assert_eq!(cmd.descriptor(), "reset counters");

        let cmd = Command::local(test_id(), "probe").unwrap();
        assert_eq!(cmd.descriptor(), "probe");
    }

    #[test]
    fn empty_string_payload_is_rejected() {
        assert!(matches!(
            Command::local(test_id(), String::new()),
            Err(BusError::EmptyDescriptor)
        ));
        assert!(matches!(
            Command::local(test_id(), ""),
            Err(BusError::EmptyDescriptor)
        ));
    }

    #[test]
    fn scope_follows_parent_cancellation() {
        let parent = CancellationToken::new();
        let cmd = Command::local(test_id(), "slow job").unwrap();
        let (cmd, cancel) = cmd.with_scope(&parent);
        assert!(!cmd.scope().is_cancelled());

        parent.cancel();
        assert!(cmd.scope().is_cancelled());
        // The returned handle reports the same scope.
        assert!(cancel.is_cancelled());
    }

    #[test]
    fn source_and_dest_are_recorded() {
        let src = test_id();
        let dst = AggregateId {
            node: "node".to_owned(),
            kind: ResourceType::Memory,
            instance: String::new(),
        };
        let cmd = Command::new(src.clone(), dst.clone(), "ping").unwrap();
        assert_eq!(cmd.source(), &src);
        assert_eq!(cmd.dest(), &dst);
    }
}
