use std::collections::VecDeque;

use crate::Fragment;

/// Pure data structure for the ordered queue of pending speech fragments.
///
/// Append-only at the back, consumed from the front. The front element is the
/// fragment that is playing (or about to play); it is only popped once its
/// playback has terminated. No I/O, no playback state.
#[derive(Debug, Default)]
pub struct FragmentQueue {
    queue: VecDeque<Fragment>,
    next_seq: u64,
}

impl FragmentQueue {
    pub fn new() -> Self {
        Self {
            queue: VecDeque::new(),
            next_seq: 1,
        }
    }

    /// Append a fragment, stamping its arrival position. Returns that position.
    pub fn push(&mut self, fragment: Fragment) -> u64 {
        let seq = self.next_seq.max(1);
        self.next_seq = seq + 1;
        self.queue.push_back(fragment.stamped(seq));
        seq
    }

    /// Peek at the front of the queue.
    pub fn front(&self) -> Option<&Fragment> {
        self.queue.front()
    }

    /// Pop from the front of the queue.
    pub fn pop_front(&mut self) -> Option<Fragment> {
        self.queue.pop_front()
    }

    /// Drop every pending fragment. Sequence numbers keep increasing so log
    /// lines stay unambiguous across streams.
    pub fn clear(&mut self) {
        self.queue.clear();
    }

    /// Sequence numbers of the queued fragments, front first.
    pub fn sequence(&self) -> Vec<u64> {
        self.queue.iter().map(Fragment::seq).collect()
    }

    /// Number of fragments in the queue.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Whether the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
