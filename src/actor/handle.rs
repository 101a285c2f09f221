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
use std::future::Future;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::trace;

use crate::actor::{ActionEnvelope, ActorRunner, MailboxKeepalive};
use crate::common::{BusError, BusResult, EventRef, FutureBox};
use crate::message::Command;

/// A clonable handle for interacting with one serialized actor loop.
///
/// The loop itself runs on its own task; handles only carry the mailbox
/// senders, the cancellation scope and the reference counter. Cloning a
/// handle does not touch the reference count; callers that need the
/// mailboxes to outlive the loop's drain phase use [`retain`](Self::retain)
/// and [`release`](Self::release) explicitly.
#[derive(Clone)]
pub struct ActorHandle {
    event_tx: mpsc::UnboundedSender<EventRef>,
    command_tx: mpsc::UnboundedSender<Command>,
    action_tx: mpsc::Sender<ActionEnvelope>,
    scope: CancellationToken,
    refs: Arc<AtomicU32>,
    errors: Arc<Mutex<Option<mpsc::UnboundedReceiver<BusError>>>>,
    tracker: TaskTracker,
}

impl ActorHandle {
    /// Spawns a new actor in running state and returns its handle.
    ///
    /// `scope` is the parent cancellation scope; the actor runs on a child
    /// of it, so cancelling the parent shuts the actor down. `on_command`
    /// and `on_event` are the loop's two callbacks. When `ready` is false
    /// the command mailbox is not polled until a
    /// [`ServiceReady`](crate::message::ServiceReady) event arrives;
    /// commands submitted before that moment queue up and are delivered in
    /// order afterwards.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn<C, CF, E, EF>(
        scope: &CancellationToken,
        on_command: C,
        on_event: E,
        ready: bool,
    ) -> Self
    where
        C: Fn(Command) -> CF + Send + 'static,
        CF: Future<Output = ()> + Send + 'static,
        E: Fn(EventRef) -> EF + Send + 'static,
        EF: Future<Output = ()> + Send + 'static,
    {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (action_tx, action_rx) = mpsc::channel(action_queue_depth());
        let (err_tx, err_rx) = mpsc::unbounded_channel();

        let scope = scope.child_token();
        // New instances always start with a reference count of 1, owned by
        // the loop.
        let refs = Arc::new(AtomicU32::new(1));
        let tracker = TaskTracker::new();

        let runner = ActorRunner {
            event_rx,
            command_rx,
            action_rx,
            err_tx,
            scope: scope.clone(),
            refs: refs.clone(),
            on_command: Box::new(move |command| -> FutureBox { Box::pin(on_command(command)) }),
            on_event: Box::new(move |event| -> FutureBox { Box::pin(on_event(event)) }),
            gate_open: ready,
            keepalive: MailboxKeepalive {
                event_tx: event_tx.clone(),
                command_tx: command_tx.clone(),
                action_tx: action_tx.clone(),
            },
        };
        tracker.spawn(runner.run());
        tracker.close();

        Self {
            event_tx,
            command_tx,
            action_tx,
            scope,
            refs,
            errors: Arc::new(Mutex::new(Some(err_rx))),
            tracker,
        }
    }

    /// Publishes `event` onto this actor's event mailbox.
    pub fn publish(&self, event: EventRef) -> BusResult<()> {
        if !self.is_active() {
            return Err(BusError::Shutdown);
        }
        self.event_tx.send(event).map_err(|_| BusError::Shutdown)
    }

    /// Submits `command` onto this actor's command mailbox.
    pub fn submit(&self, command: Command) -> BusResult<()> {
        if !self.is_active() {
            return Err(BusError::Shutdown);
        }
        self.command_tx
            .send(command)
            .map_err(|_| BusError::Shutdown)
    }

    /// Enqueues `action` to run on the loop, mutating actor-owned state
    /// without races.
    ///
    /// Returns the reply channel; reading it synchronizes with the loop.
    /// If the actor is already shut down the channel is pre-filled with
    /// [`BusError::Shutdown`].
    pub async fn action<F>(&self, action: F) -> oneshot::Receiver<BusResult<()>>
    where
        F: FnOnce() -> BusResult<()> + Send + 'static,
    {
        let (reply_tx, reply_rx) = oneshot::channel();
        if !self.is_active() {
            let _ = reply_tx.send(Err(BusError::Shutdown));
            return reply_rx;
        }
        let envelope = ActionEnvelope {
            run: Box::new(action),
            reply: reply_tx,
        };
        if let Err(mpsc::error::SendError(envelope)) = self.action_tx.send(envelope).await {
            let _ = envelope.reply.send(Err(BusError::Shutdown));
        }
        reply_rx
    }

    /// Runs `action` on the loop and waits for its result.
    pub async fn act<F>(&self, action: F) -> BusResult<()>
    where
        F: FnOnce() -> BusResult<()> + Send + 'static,
    {
        match self.action(action).await.await {
            Ok(result) => result,
            // The loop dropped the reply while draining.
            Err(_) => Err(BusError::Shutdown),
        }
    }

    /// Cancels the actor's scope and returns immediately.
    ///
    /// Never waits for the loop to exit: a handler may call `shutdown` on
    /// its own actor, and waiting here would deadlock. The loop observes
    /// the cancelled scope, drains, and drops the reference count to 0.
    pub fn shutdown(&self) -> BusResult<()> {
        if !self.is_active() {
            return Err(BusError::Shutdown);
        }
        trace!("shutting down actor");
        self.scope.cancel();
        Ok(())
    }

    /// True while the actor is able to accept events and commands.
    pub fn is_active(&self) -> bool {
        !self.scope.is_cancelled()
    }

    /// The actor's cancellation scope, for deriving child scopes.
    pub fn scope(&self) -> &CancellationToken {
        &self.scope
    }

    /// Number of active references: 1 means only the loop, 0 means dead.
    pub fn refs(&self) -> u32 {
        self.refs.load(Ordering::Acquire)
    }

    /// Registers an external reference; the loop will not close its
    /// mailboxes until it is released.
    pub fn retain(&self) -> u32 {
        self.refs.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// Releases a reference taken with [`retain`](Self::retain).
    pub fn release(&self) -> u32 {
        self.refs.fetch_sub(1, Ordering::AcqRel) - 1
    }

    /// Takes the read side of the actor's error channel.
    ///
    /// Internal loop anomalies are reported here; the channel closes when
    /// the loop terminates. Returns `None` on every call after the first.
    pub fn errors(&self) -> Option<mpsc::UnboundedReceiver<BusError>> {
        self.errors.lock().take()
    }

    /// The tracker of the loop task; `wait` completes once the loop has
    /// fully terminated.
    pub fn tracker(&self) -> &TaskTracker {
        &self.tracker
    }
}

impl fmt::Debug for ActorHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActorHandle")
            .field("active", &self.is_active())
            .field("refs", &self.refs())
            .finish_non_exhaustive()
    }
}

fn action_queue_depth() -> usize {
    std::env::var("CROSSBAR_ACTION_QUEUE_DEPTH")
        .ok()
        .and_then(|value| value.parse().ok())
        .filter(|depth| *depth > 0)
        .unwrap_or(1)
}
