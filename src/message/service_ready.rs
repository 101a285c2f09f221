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

use crate::identity::AggregateId;
use crate::traits::Event;

/// Enables command processing in an aggregate.
///
/// Applies only to aggregates registered with `ready = false`: their
/// incoming commands are queued but not handled until a `ServiceReady`
/// arrives and opens the command gate. The gate never closes again short
/// of shutdown.
#[derive(Debug, Clone)]
pub struct ServiceReady {
    /// Aggregate to unblock.
    pub aggregate: AggregateId,
}

impl Event for ServiceReady {
    fn source(&self) -> AggregateId {
        self.aggregate.clone()
    }

    fn dest(&self) -> AggregateId {
        self.aggregate.clone()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl fmt::Display for ServiceReady {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ServiceReady({})", self.aggregate)
    }
}
