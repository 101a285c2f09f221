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

use crossbar::prelude::*;

/// The canonical struct payload: its type name doubles as the descriptor.
#[derive(Debug, Clone)]
pub struct SimpleCommand {
    pub name: String,
}

impl CommandPayload for SimpleCommand {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A plain domain event for fan-out tests.
#[derive(Debug, Clone)]
pub struct TestEvent {
    pub src: AggregateId,
    pub dst: AggregateId,
    pub kind: String,
}

impl TestEvent {
    pub fn new(src: AggregateId, dst: AggregateId, kind: impl Into<String>) -> Self {
        Self {
            src,
            dst,
            kind: kind.into(),
        }
    }
}

impl Event for TestEvent {
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
