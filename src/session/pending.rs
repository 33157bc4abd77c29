//! Reply slots awaiting their correlated reply frame.

use std::collections::HashMap;

use bytes::Bytes;
use tokio::sync::oneshot;

/// Sender half of a reply slot. `None` signals that the session ended first.
pub(crate) type ReplySlot = oneshot::Sender<Option<Bytes>>;

/// Table of outstanding requests keyed by correlation id.
///
/// Every slot leaves the table exactly once: fulfilled with a payload,
/// evicted, or failed on teardown. Sending on a slot whose receiver is gone
/// is a no-op.
#[derive(Debug, Default)]
pub(super) struct PendingReplies {
    slots: HashMap<u64, ReplySlot>,
}

impl PendingReplies {
    pub(super) fn register(&mut self, correlation_id: u64, slot: ReplySlot) {
        if let Some(stale) = self.slots.insert(correlation_id, slot) {
            let _ = stale.send(None);
        }
    }

    /// Fail the slot registered under `correlation_id`, if any.
    pub(super) fn evict(&mut self, correlation_id: u64) -> bool {
        self.slots
            .remove(&correlation_id)
            .map(|slot| slot.send(None))
            .is_some()
    }

    /// Deliver `payload` to the matching slot. Returns `false` for an unknown id.
    pub(super) fn fulfil(&mut self, correlation_id: u64, payload: Bytes) -> bool {
        self.slots
            .remove(&correlation_id)
            .map(|slot| slot.send(Some(payload)))
            .is_some()
    }

    /// Fail every outstanding slot, returning how many there were.
    pub(super) fn fail_all(&mut self) -> usize {
        let count = self.slots.len();
        for (_, slot) in self.slots.drain() {
            let _ = slot.send(None);
        }
        count
    }

    pub(super) fn len(&self) -> usize { self.slots.len() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fulfil_delivers_payload_once() {
        let mut pending = PendingReplies::default();
        let (tx, mut rx) = oneshot::channel();
        pending.register(3, tx);

        assert!(pending.fulfil(3, Bytes::from_static(b"[\"ok\"]")));
        assert_eq!(rx.try_recv(), Ok(Some(Bytes::from_static(b"[\"ok\"]"))));
        assert!(!pending.fulfil(3, Bytes::new()), "duplicate reply must be discarded");
        assert_eq!(pending.len(), 0);
    }

    #[test]
    fn fulfil_on_abandoned_slot_frees_it() {
        let mut pending = PendingReplies::default();
        let (tx, rx) = oneshot::channel();
        pending.register(1, tx);
        drop(rx);

        assert!(pending.fulfil(1, Bytes::new()));
        assert_eq!(pending.len(), 0);
    }

    #[test]
    fn evict_fails_occupant() {
        let mut pending = PendingReplies::default();
        let (tx, mut rx) = oneshot::channel();
        pending.register(9, tx);

        assert!(pending.evict(9));
        assert_eq!(rx.try_recv(), Ok(None));
        assert!(!pending.evict(9));
    }

    #[test]
    fn register_over_occupied_id_fails_previous_slot() {
        let mut pending = PendingReplies::default();
        let (first_tx, mut first_rx) = oneshot::channel();
        let (second_tx, mut second_rx) = oneshot::channel();
        pending.register(5, first_tx);
        pending.register(5, second_tx);

        assert_eq!(first_rx.try_recv(), Ok(None));
        assert!(pending.fulfil(5, Bytes::from_static(b"1")));
        assert_eq!(second_rx.try_recv(), Ok(Some(Bytes::from_static(b"1"))));
    }

    #[test]
    fn fail_all_empties_table() {
        let mut pending = PendingReplies::default();
        let receivers: Vec<_> = (1..=3)
            .map(|id| {
                let (tx, rx) = oneshot::channel();
                pending.register(id, tx);
                rx
            })
            .collect();

        assert_eq!(pending.fail_all(), 3);
        assert_eq!(pending.len(), 0);
        for mut rx in receivers {
            assert_eq!(rx.try_recv(), Ok(None));
        }
    }
}
