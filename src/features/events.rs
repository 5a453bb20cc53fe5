use crate::features::card::ParseResult;
use std::collections::VecDeque;

/// One-time instructions for the host. Never part of saved state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanEvent {
    FinishWithResult(ParseResult),
    RequestPermission(i32),
    LaunchManualAdd,
    LaunchImagePicker,
    LaunchPdfPicker,
    LaunchPkpassPicker,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsumerId(u64);

/// Unbounded FIFO with a single consumer.
///
/// Emitting never blocks. Events wait in the queue while no consumer is
/// attached and are handed out exactly once, in emission order.
#[derive(Debug)]
pub struct EventQueue<E> {
    pending: VecDeque<E>,
    consumer: Option<ConsumerId>,
    next_id: u64,
}

impl<E> EventQueue<E> {
    pub const fn new() -> Self {
        Self {
            pending: VecDeque::new(),
            consumer: None,
            next_id: 0,
        }
    }

    pub fn emit(&mut self, event: E) {
        self.pending.push_back(event);
    }

    /// Registers the consumer, replacing any previous one.
    pub fn attach(&mut self) -> ConsumerId {
        let id = ConsumerId(self.next_id);
        self.next_id += 1;
        self.consumer = Some(id);
        id
    }

    pub fn detach(&mut self, id: ConsumerId) -> bool {
        if self.consumer == Some(id) {
            self.consumer = None;
            true
        } else {
            false
        }
    }

    pub fn is_attached(&self) -> bool {
        self.consumer.is_some()
    }

    pub fn poll(&mut self, id: ConsumerId) -> Option<E> {
        if self.consumer != Some(id) {
            return None;
        }
        self.pending.pop_front()
    }

    pub fn drain(&mut self, id: ConsumerId) -> Vec<E> {
        if self.consumer != Some(id) {
            return Vec::new();
        }
        self.pending.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

impl<E> Default for EventQueue<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffered_events_come_out_in_emission_order() {
        let mut queue = EventQueue::new();
        queue.emit(ScanEvent::LaunchManualAdd);
        queue.emit(ScanEvent::RequestPermission(101));
        let id = queue.attach();
        assert_eq!(queue.poll(id), Some(ScanEvent::LaunchManualAdd));
        assert_eq!(queue.poll(id), Some(ScanEvent::RequestPermission(101)));
        assert_eq!(queue.poll(id), None);
    }

    #[test]
    fn detached_queue_keeps_events_until_reattached() {
        let mut queue = EventQueue::new();
        let id = queue.attach();
        assert!(queue.detach(id));
        queue.emit(1);
        queue.emit(2);
        assert!(queue.drain(id).is_empty());
        assert_eq!(queue.len(), 2);

        let again = queue.attach();
        assert_eq!(queue.drain(again), vec![1, 2]);
        assert!(queue.drain(again).is_empty());
    }

    #[test]
    fn stale_consumer_cannot_steal_events() {
        let mut queue = EventQueue::new();
        let old = queue.attach();
        let current = queue.attach();
        queue.emit("e");
        assert_eq!(queue.poll(old), None);
        assert!(!queue.detach(old));
        assert!(queue.is_attached());
        assert_eq!(queue.poll(current), Some("e"));
        assert!(queue.is_empty());
    }
}
