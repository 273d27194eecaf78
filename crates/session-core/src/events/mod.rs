//! Inter-component notifications. The teacher wires its aggregation
//! pipeline together with a callback-based `EventBus`
//! (`events/event_bus.rs`); here the collaborators don't know about each
//! other at all — they each read flags off the shared store and push onto
//! a `crossbeam_channel` queue the next stage drains, so a slow downstream
//! consumer backs up in its own queue instead of blocking the producer's
//! call stack.

use chrono::NaiveDateTime;
use crossbeam_channel::{Receiver, Sender};
use session_data::Interval;

#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// A base bar landed for `symbol`/`interval` at `at` — the derived-bar
    /// generator's trigger to look for intervals it can now advance.
    BaseBarAppended {
        symbol: String,
        interval: Interval,
        at: NaiveDateTime,
    },
    /// A derived bar was produced — the quality engine's trigger to
    /// recompute expected-vs-actual counts for that interval.
    DerivedBarAppended {
        symbol: String,
        interval: Interval,
        at: NaiveDateTime,
    },
    /// The quality engine found (or closed) a gap.
    GapDetected {
        symbol: String,
        interval: Interval,
        missing_count: u32,
    },
    SymbolActivated {
        symbol: String,
    },
    SymbolRemoved {
        symbol: String,
    },
}

/// A bounded multi-producer multi-consumer queue of [`SessionEvent`]s. Kept
/// deliberately small (the teacher's default channel depth) — a queue that
/// grows without bound just delays the moment a stuck consumer is noticed.
pub fn channel(capacity: usize) -> (EventSender, EventReceiver) {
    let (tx, rx) = crossbeam_channel::bounded(capacity);
    (EventSender(tx), EventReceiver(rx))
}

#[derive(Clone)]
pub struct EventSender(Sender<SessionEvent>);

impl EventSender {
    /// Drops the event and logs rather than blocking the caller when the
    /// queue is full — a lagging consumer must never stall bar ingestion.
    pub fn send(&self, event: SessionEvent) {
        if self.0.try_send(event).is_err() {
            tracing::warn!("session event queue full, dropping event");
        }
    }
}

pub struct EventReceiver(Receiver<SessionEvent>);

impl EventReceiver {
    pub fn try_recv(&self) -> Option<SessionEvent> {
        self.0.try_recv().ok()
    }

    pub fn drain(&self) -> Vec<SessionEvent> {
        self.0.try_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    #[test]
    fn events_flow_through_in_order() {
        let (tx, rx) = channel(8);
        let ts = NaiveDateTime::parse_from_str("2024-01-02 09:30:00", "%Y-%m-%d %H:%M:%S").unwrap();
        tx.send(SessionEvent::BaseBarAppended {
            symbol: "AAPL".to_string(),
            interval: Interval::parse("1m").unwrap(),
            at: ts,
        });
        tx.send(SessionEvent::SymbolActivated { symbol: "AAPL".to_string() });

        let drained = rx.drain();
        assert_eq!(drained.len(), 2);
    }

    #[test]
    fn a_full_queue_drops_instead_of_blocking() {
        let (tx, rx) = channel(1);
        tx.send(SessionEvent::SymbolActivated { symbol: "A".to_string() });
        tx.send(SessionEvent::SymbolActivated { symbol: "B".to_string() });
        assert_eq!(rx.drain().len(), 1);
    }
}
