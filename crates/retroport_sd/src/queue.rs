use std::collections::VecDeque;

/// Level the card drives when it has nothing queued. The bus idles low.
pub const IDLE_BYTE: u8 = 0x00;

/// Bytes waiting to be shifted out to the host, in transmission order.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ResponseQueue {
    bytes: VecDeque<u8>,
}

impl ResponseQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `bytes` to the tail, keeping their order.
    pub fn enqueue(&mut self, bytes: &[u8]) {
        self.bytes.extend(bytes.iter().copied());
    }

    /// Pop the head, or [`IDLE_BYTE`] if nothing is pending.
    pub fn dequeue_or_default(&mut self) -> u8 {
        self.bytes.pop_front().unwrap_or(IDLE_BYTE)
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dequeues_in_insertion_order() {
        let mut queue = ResponseQueue::new();
        queue.enqueue(&[0x01, 0x02]);
        queue.enqueue(&[0x03]);
        assert_eq!(queue.len(), 3);
        assert_eq!(queue.dequeue_or_default(), 0x01);
        assert_eq!(queue.dequeue_or_default(), 0x02);
        assert_eq!(queue.dequeue_or_default(), 0x03);
        assert!(queue.is_empty());
    }

    #[test]
    fn empty_queue_yields_idle_byte() {
        let mut queue = ResponseQueue::new();
        assert_eq!(queue.dequeue_or_default(), IDLE_BYTE);
        assert_eq!(queue.dequeue_or_default(), IDLE_BYTE);
        assert!(queue.is_empty());
    }
}
