//! Many command-handling threads sharing one rejection factory.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use thiserror::Error;

use causa_core::{CommandId, EventId, Message, UserId};
use causa_events::testing::{FixedClock, SequentialIds};
use causa_events::{
    ActorContext, Command, DomainRejection, EventAssembler, Rejection, RejectionConfig,
    RejectionFactory,
};

const THREADS: usize = 8;
const PER_THREAD: usize = 250;

#[derive(Debug, Error)]
#[error("order {0} already shipped")]
struct AlreadyShipped(usize);

impl DomainRejection for AlreadyShipped {
    fn message_thrown(&self) -> Message {
        Message::new("orders.rejection.AlreadyShipped", json!({ "order": self.0 }))
    }
}

fn command(n: usize) -> Arc<Command> {
    Arc::new(Command::new(
        CommandId::new(),
        Message::new("orders.command.Ship", json!({ "order": n })),
        ActorContext::new(UserId::new(), None, Utc::now()),
    ))
}

fn reject_concurrently<G, C>(factory: &RejectionFactory<G, C>) -> Vec<(EventId, CommandId, CommandId)>
where
    G: causa_events::IdGenerator,
    C: causa_events::Clock,
{
    std::thread::scope(|s| {
        let handles: Vec<_> = (0..THREADS)
            .map(|t| {
                s.spawn(move || {
                    (0..PER_THREAD)
                        .map(|i| {
                            let cmd = command(t * PER_THREAD + i);
                            let failure = Rejection::new(AlreadyShipped(i));
                            let event = factory.reject(&cmd, &failure).unwrap();
                            let rejected = event.context().rejection().unwrap().command().id();
                            (event.id(), cmd.id(), rejected)
                        })
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect()
    })
}

#[test]
fn concurrent_rejections_get_unique_ids_and_own_commands() {
    causa_observability::init();

    let factory = RejectionFactory::with_assembler(
        EventAssembler::with_collaborators(SequentialIds::new(), FixedClock::at(Utc::now())),
        RejectionConfig::default(),
    );

    let results = reject_concurrently(&factory);
    assert_eq!(results.len(), THREADS * PER_THREAD);

    let ids: HashSet<EventId> = results.iter().map(|(id, _, _)| *id).collect();
    assert_eq!(ids.len(), THREADS * PER_THREAD);
    assert!(results.iter().all(|(_, cmd, rejected)| cmd == rejected));
    assert!(ids.contains(&SequentialIds::id((THREADS * PER_THREAD) as u64)));
}

#[test]
fn default_factory_is_shareable_across_threads() {
    let factory = RejectionFactory::new();
    let results = reject_concurrently(&factory);

    let ids: HashSet<EventId> = results.iter().map(|(id, _, _)| *id).collect();
    assert_eq!(ids.len(), THREADS * PER_THREAD);
}
