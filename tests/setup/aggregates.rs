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

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::time::Duration;

use anyhow::anyhow;
use parking_lot::Mutex;

use crossbar::prelude::*;

use crate::setup::messages::TestEvent;

/// Records every handled command and event; replies `"OK"` to everything.
pub struct Recorder {
    id: AggregateId,
    pub handled: Mutex<Vec<String>>,
    pub events: Mutex<Vec<String>>,
}

impl Recorder {
    pub fn new(id: AggregateId) -> Self {
        Self {
            id,
            handled: Mutex::new(Vec::new()),
            events: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl Aggregate for Recorder {
    fn aggregate_id(&self) -> AggregateId {
        self.id.clone()
    }

    async fn handle_command(&self, command: &Command) -> anyhow::Result<Outcome> {
        self.handled.lock().push(command.descriptor().to_owned());
        Ok(Outcome::status("OK"))
    }

    async fn handle_event(&self, event: EventRef) {
        if let Some(event) = event.as_any().downcast_ref::<TestEvent>() {
            self.events.lock().push(event.kind.clone());
        } else {
            self.events.lock().push(format!("{event:?}"));
        }
    }
}

/// Never finishes handling a command; used to exercise launch deadlines.
pub struct Sleeper {
    id: AggregateId,
}

impl Sleeper {
    pub fn new(id: AggregateId) -> Self {
        Self { id }
    }
}

#[async_trait]
impl Aggregate for Sleeper {
    fn aggregate_id(&self) -> AggregateId {
        self.id.clone()
    }

    async fn handle_command(&self, _command: &Command) -> anyhow::Result<Outcome> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(Outcome::done())
    }
}

/// Fails every command with the same error.
pub struct Failing {
    id: AggregateId,
}

impl Failing {
    pub fn new(id: AggregateId) -> Self {
        Self { id }
    }
}

#[async_trait]
impl Aggregate for Failing {
    fn aggregate_id(&self) -> AggregateId {
        self.id.clone()
    }

    async fn handle_command(&self, _command: &Command) -> anyhow::Result<Outcome> {
        Err(anyhow!("boom"))
    }
}

/// Chains a follow-up command off the first command it sees.
pub struct Chainer {
    id: AggregateId,
    pub handled: Mutex<Vec<String>>,
}

impl Chainer {
    pub fn new(id: AggregateId) -> Self {
        Self {
            id,
            handled: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl Aggregate for Chainer {
    fn aggregate_id(&self) -> AggregateId {
        self.id.clone()
    }

    async fn handle_command(&self, command: &Command) -> anyhow::Result<Outcome> {
        self.handled.lock().push(command.descriptor().to_owned());
        if command.descriptor() == "StartChain" {
            let next = Command::local(self.id.clone(), "FollowUp")?;
            return Ok(Outcome {
                next: Some(next),
                status: "chained".to_owned(),
            });
        }
        Ok(Outcome::status("follow-up done"))
    }
}

/// Detects overlapping handler invocations while recording arrival order.
pub struct Serializer {
    id: AggregateId,
    in_flight: AtomicU32,
    pub overlapped: AtomicBool,
    pub handled: Mutex<Vec<String>>,
}

impl Serializer {
    pub fn new(id: AggregateId) -> Self {
        Self {
            id,
            in_flight: AtomicU32::new(0),
            overlapped: AtomicBool::new(false),
            handled: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl Aggregate for Serializer {
    fn aggregate_id(&self) -> AggregateId {
        self.id.clone()
    }

    async fn handle_command(&self, command: &Command) -> anyhow::Result<Outcome> {
        if self.in_flight.fetch_add(1, Ordering::SeqCst) != 0 {
            self.overlapped.store(true, Ordering::SeqCst);
        }
        tokio::time::sleep(Duration::from_millis(1)).await;
        self.handled.lock().push(command.descriptor().to_owned());
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(Outcome::done())
    }
}
