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

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{error, trace};

use crate::common::{BusError, BusResult, CommandHandlerFn, EventHandlerFn, EventRef};
use crate::message::{Command, ServiceReady};

// Time to wait for other holders to release their reference, and the
// maximum number of such waits before giving up.
const REF_WAIT_INTERVAL: Duration = Duration::from_secs(1);
const REF_MAX_WAITS: u32 = 60;

/// An internal action plus the slot its return value is delivered on.
pub(crate) struct ActionEnvelope {
    pub(crate) run: Box<dyn FnOnce() -> BusResult<()> + Send + 'static>,
    pub(crate) reply: oneshot::Sender<BusResult<()>>,
}

/// Sender clones held by the loop so the mailboxes stay open for producers
/// until the loop itself closes them during cleanup.
pub(crate) struct MailboxKeepalive {
    pub(crate) event_tx: mpsc::UnboundedSender<EventRef>,
    pub(crate) command_tx: mpsc::UnboundedSender<Command>,
    pub(crate) action_tx: mpsc::Sender<ActionEnvelope>,
}

/// The consumer half of an actor: owns the mailbox receivers and the two
/// callbacks, and runs until the scope is cancelled.
pub(crate) struct ActorRunner {
    pub(crate) event_rx: mpsc::UnboundedReceiver<EventRef>,
    pub(crate) command_rx: mpsc::UnboundedReceiver<Command>,
    pub(crate) action_rx: mpsc::Receiver<ActionEnvelope>,
    pub(crate) err_tx: mpsc::UnboundedSender<BusError>,
    pub(crate) scope: CancellationToken,
    pub(crate) refs: Arc<AtomicU32>,
    pub(crate) on_command: CommandHandlerFn,
    pub(crate) on_event: EventHandlerFn,
    pub(crate) gate_open: bool,
    pub(crate) keepalive: MailboxKeepalive,
}

impl ActorRunner {
    pub(crate) async fn run(mut self) {
        while !self.scope.is_cancelled() {
            // Biased order: an already-enqueued completion event is handled
            // before a simultaneously enqueued follow-up command, which is
            // what keeps reply-before-chain observable.
            tokio::select! {
                biased;
                _ = self.scope.cancelled() => {}
                Some(envelope) = self.action_rx.recv() => {
                    let ActionEnvelope { run, reply } = envelope;
                    if reply.send(run()).is_err() {
                        let _ = self.err_tx.send(BusError::ActionReplyDropped);
                    }
                }
                Some(event) = self.event_rx.recv() => {
                    // The ServiceReady event serves to unblock the command
                    // mailbox.
                    if event.as_any().downcast_ref::<ServiceReady>().is_some() {
                        self.gate_open = true;
                    }
                    (self.on_event)(event).await;
                }
                Some(command) = self.command_rx.recv(), if self.gate_open => {
                    (self.on_command)(command).await;
                }
            }
        }
        self.cleanup().await;
    }

    /// Waits out external references, then closes and drains the mailboxes.
    ///
    /// The loop is the only place allowed to close the mailboxes: closing
    /// them while another holder is mid-send would race, so the count must
    /// fall back to 1 (the loop itself) first. Whatever is still queued at
    /// that point is discarded; delivery is lossy on shutdown.
    async fn cleanup(mut self) {
        let mut rounds = 0;
        while self.refs.load(Ordering::Acquire) > 1 {
            if rounds >= REF_MAX_WAITS {
                error!(
                    refs = self.refs.load(Ordering::Acquire),
                    "timed out waiting for actor references to be released"
                );
                std::process::exit(1);
            }
            sleep(REF_WAIT_INTERVAL).await;
            rounds += 1;
        }

        self.event_rx.close();
        self.command_rx.close();
        self.action_rx.close();
        drop(self.err_tx);
        drop(self.keepalive);

        let mut discarded: u32 = 0;
        while self.event_rx.recv().await.is_some() {
            discarded += 1;
        }
        while self.command_rx.recv().await.is_some() {
            discarded += 1;
        }
        // Pending actions are dropped as well; their reply slots close and
        // waiting callers observe Shutdown.
        while self.action_rx.recv().await.is_some() {
            discarded += 1;
        }
        if discarded > 0 {
            trace!(discarded, "dropped queued messages during shutdown");
        }

        // Now the reference count reaches 0.
        self.refs.fetch_sub(1, Ordering::AcqRel);
    }
}
