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

use thiserror::Error;

/// Errors surfaced by actors and the bus.
///
/// [`BusError::Shutdown`] is a sentinel: every submit/publish/action path
/// returns it once the target's cancellation scope has fired, and callers
/// decide whether that is a problem. The launch variants carry the command
/// descriptor so the failure reads like the original request.
#[derive(Debug, Error)]
pub enum BusError {
    /// The target actor's processing loop has terminated.
    #[error("processing loop terminated")]
    Shutdown,

    /// A command was constructed with an empty payload descriptor.
    #[error("attempt to submit a command with an empty descriptor")]
    EmptyDescriptor,

    /// An aggregate with a zero id cannot be registered.
    #[error("attempt to register an aggregate with a zero id")]
    ZeroAggregateId,

    /// A remote hook was invoked but none has been installed.
    #[error("{0} is not implemented")]
    RemoteNotImplemented(&'static str),

    /// Launch could not install its one-shot completion observer.
    #[error("failed to subscribe to {descriptor} completion: {source}")]
    SubscribeFailed {
        descriptor: String,
        source: Box<BusError>,
    },

    /// Launch could not submit the command.
    #[error("failed to submit {descriptor}: {source}")]
    SubmitFailed {
        descriptor: String,
        source: Box<BusError>,
    },

    /// Launch gave up waiting for the completion event.
    #[error("timed out waiting for {0} to complete")]
    DeadlineExceeded(String),

    /// The wait scope handed to launch was canceled first.
    #[error("wait scope canceled before {0} completed")]
    WaitCanceled(String),

    /// The command's own scope was canceled while waiting.
    #[error("command {0} canceled")]
    CommandCanceled(String),

    /// The aggregate handler reported a failure.
    #[error("{0}")]
    CommandFailed(String),

    /// An action ran but its reply receiver was already gone.
    #[error("action reply channel dropped before completion")]
    ActionReplyDropped,
}

/// Convenience alias for fallible bus operations.
pub type BusResult<T> = Result<T, BusError>;
