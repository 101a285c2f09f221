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

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crossbar::prelude::*;

use crate::setup::wait_until;

mod setup;

fn recording_actor(
    scope: &CancellationToken,
    ready: bool,
) -> (ActorHandle, Arc<Mutex<Vec<String>>>) {
    let handled: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let seen = handled.clone();
    let actor = ActorHandle::spawn(
        scope,
        move |command: Command| {
            let seen = seen.clone();
            async move {
                seen.lock().push(command.descriptor().to_owned());
            }
        },
        |_event| async {},
        ready,
    );
    (actor, handled)
}

/// A freshly spawned actor is active, holds exactly one reference (the
/// loop's own), and processes a submitted command.
#[tokio::test]
async fn starts_active_with_one_reference() -> anyhow::Result<()> {
    setup::init();
    let scope = CancellationToken::new();
    let (actor, handled) = recording_actor(&scope, true);

    assert!(actor.is_active());
    assert_eq!(actor.refs(), 1);

    let id = AggregateId::new(ResourceType::Cpu, "boot");
    actor.submit(Command::local(id, "warmup")?)?;
    assert!(wait_until(Duration::from_secs(2), || handled.lock().len() == 1).await);

    actor.shutdown()?;
    Ok(())
}

/// Commands submitted to a not-yet-ready actor queue up untouched; a
/// `ServiceReady` event opens the gate and they are delivered in
/// submission order.
#[tokio::test]
async fn gate_holds_commands_until_service_ready() -> anyhow::Result<()> {
    setup::init();
    let scope = CancellationToken::new();
    let (actor, handled) = recording_actor(&scope, false);

    let id = AggregateId::new(ResourceType::Cpu, "gated");
    for name in ["first", "second", "third"] {
        actor.submit(Command::local(id.clone(), name)?)?;
    }

    tokio::time::sleep(Duration::from_millis(150)).await;
    assert!(
        handled.lock().is_empty(),
        "commands ran before the gate opened"
    );

    actor.publish(Arc::new(ServiceReady {
        aggregate: id.clone(),
    }))?;
    assert!(wait_until(Duration::from_secs(2), || handled.lock().len() == 3).await);
    assert_eq!(*handled.lock(), ["first", "second", "third"]);

    actor.shutdown()?;
    Ok(())
}

/// After shutdown every ingress path reports the `Shutdown` sentinel, and
/// the loop drains to a reference count of zero.
#[tokio::test]
async fn shutdown_is_a_sentinel_not_a_wait() -> anyhow::Result<()> {
    setup::init();
    let scope = CancellationToken::new();
    let (actor, _handled) = recording_actor(&scope, true);
    let id = AggregateId::new(ResourceType::Memory, "halt");

    actor.shutdown()?;
    assert!(!actor.is_active());
    assert!(matches!(actor.shutdown(), Err(BusError::Shutdown)));
    assert!(matches!(
        actor.submit(Command::local(id.clone(), "late")?),
        Err(BusError::Shutdown)
    ));
    assert!(matches!(
        actor.publish(Arc::new(ServiceReady { aggregate: id })),
        Err(BusError::Shutdown)
    ));
    let reply = actor.action(|| Ok(())).await;
    assert!(matches!(reply.await, Ok(Err(BusError::Shutdown))));

    actor.tracker().wait().await;
    assert_eq!(actor.refs(), 0);
    Ok(())
}

/// Reading an action's reply channel synchronizes with the loop: the
/// side effect is visible once the reply arrives.
#[tokio::test]
async fn actions_run_on_the_loop() -> anyhow::Result<()> {
    setup::init();
    let scope = CancellationToken::new();
    let (actor, _handled) = recording_actor(&scope, true);

    let touched = Arc::new(AtomicBool::new(false));
    let flag = touched.clone();
    actor
        .act(move || {
            flag.store(true, Ordering::SeqCst);
            Ok(())
        })
        .await?;
    assert!(touched.load(Ordering::SeqCst));

    actor.shutdown()?;
    Ok(())
}

/// An external reference keeps the mailboxes open: the loop parks in its
/// drain phase until the reference is released.
#[tokio::test]
async fn retained_reference_delays_mailbox_closure() -> anyhow::Result<()> {
    setup::init();
    let scope = CancellationToken::new();
    let (actor, _handled) = recording_actor(&scope, true);

    assert_eq!(actor.retain(), 2);
    actor.shutdown()?;

    // The loop must still be waiting on the leaked reference.
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(actor.refs(), 2);
    assert!(
        tokio::time::timeout(Duration::from_millis(100), actor.tracker().wait())
            .await
            .is_err(),
        "loop terminated while a reference was still held"
    );

    assert_eq!(actor.release(), 1);
    actor.tracker().wait().await;
    assert_eq!(actor.refs(), 0);
    Ok(())
}

/// The error channel can be taken exactly once and closes with the loop.
#[tokio::test]
async fn error_channel_taken_once_and_closed_on_exit() -> anyhow::Result<()> {
    setup::init();
    let scope = CancellationToken::new();
    let (actor, _handled) = recording_actor(&scope, true);

    let mut errors = actor.errors().expect("first take yields the receiver");
    assert!(actor.errors().is_none());

    actor.shutdown()?;
    actor.tracker().wait().await;
    assert!(errors.recv().await.is_none());
    Ok(())
}

/// Cancelling the parent scope shuts the actor down without an explicit
/// `shutdown` call.
#[tokio::test]
async fn parent_scope_cancellation_propagates() -> anyhow::Result<()> {
    setup::init();
    let scope = CancellationToken::new();
    let (actor, _handled) = recording_actor(&scope, true);

    scope.cancel();
    assert!(!actor.is_active());
    actor.tracker().wait().await;
    assert_eq!(actor.refs(), 0);
    Ok(())
}

/// Concurrent producers never observe overlapping handler invocations,
/// and each producer's commands arrive in its own submission order.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn handlers_are_serialized_per_actor() -> anyhow::Result<()> {
    setup::init();
    let scope = CancellationToken::new();

    let handled: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let in_flight = Arc::new(AtomicU32::new(0));
    let overlapped = Arc::new(AtomicBool::new(false));

    let actor = {
        let handled = handled.clone();
        let in_flight = in_flight.clone();
        let overlapped = overlapped.clone();
        ActorHandle::spawn(
            &scope,
            move |command: Command| {
                let handled = handled.clone();
                let in_flight = in_flight.clone();
                let overlapped = overlapped.clone();
                async move {
                    if in_flight.fetch_add(1, Ordering::SeqCst) != 0 {
                        overlapped.store(true, Ordering::SeqCst);
                    }
                    tokio::time::sleep(Duration::from_millis(1)).await;
                    handled.lock().push(command.descriptor().to_owned());
                    in_flight.fetch_sub(1, Ordering::SeqCst);
                }
            },
            |_event| async {},
            true,
        )
    };

    const PRODUCERS: usize = 3;
    const PER_PRODUCER: usize = 10;
    let id = AggregateId::new(ResourceType::Cpu, "shared");
    let mut workers = Vec::new();
    for producer in 0..PRODUCERS {
        let actor = actor.clone();
        let id = id.clone();
        workers.push(tokio::spawn(async move {
            for seq in 0..PER_PRODUCER {
                let payload = format!("p{producer}-{seq:02}");
                actor
                    .submit(Command::local(id.clone(), payload).unwrap())
                    .unwrap();
            }
        }));
    }
    for worker in workers {
        worker.await?;
    }

    assert!(
        wait_until(Duration::from_secs(5), || handled.lock().len()
            == PRODUCERS * PER_PRODUCER)
        .await
    );
    assert!(!overlapped.load(Ordering::SeqCst), "handlers overlapped");

    let seen = handled.lock().clone();
    for producer in 0..PRODUCERS {
        let prefix = format!("p{producer}-");
        let per_producer: Vec<_> = seen
            .iter()
            .filter(|name| name.starts_with(&prefix))
            .collect();
        let mut sorted = per_producer.clone();
        sorted.sort();
        assert_eq!(per_producer, sorted, "producer {producer} order broken");
    }

    actor.shutdown()?;
    Ok(())
}
