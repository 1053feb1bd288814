//! Bounded FIFO queue of nodes eligible to attempt transmission.

/// Fixed-capacity FIFO of pending provider nodes.
///
/// The backing arena holds `node_count + 1` slots; the spare slot lets
/// head/tail indices distinguish a full queue from an empty one without a
/// separate counter. Capacity never changes: a node is enqueued at most once
/// per trial (only on its uninfected-to-infected transition), so the queue can
/// never overflow a correctly sized arena.
///
/// Strict FIFO order is what makes the stop criteria well defined: providers
/// are serviced in the order they were infected.
///
/// # Examples
/// ```
/// use epicast_core::ActiveSet;
///
/// let mut active = ActiveSet::with_capacity(4);
/// active.push(2);
/// active.push(0);
/// assert_eq!(active.pop(), Some(2));
/// assert_eq!(active.pop(), Some(0));
/// assert!(active.is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct ActiveSet {
    slots: Box<[usize]>,
    head: usize,
    tail: usize,
}

impl ActiveSet {
    /// Creates a queue able to hold `node_count` entries.
    #[must_use]
    pub fn with_capacity(node_count: usize) -> Self {
        Self {
            slots: vec![0; node_count + 1].into_boxed_slice(),
            head: 0,
            tail: 0,
        }
    }

    /// Returns whether the queue holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.head == self.tail
    }

    /// Returns whether every slot but the sentinel is occupied.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.head == (self.tail + 1) % self.slots.len()
    }

    /// Returns the number of queued entries.
    #[must_use]
    pub fn len(&self) -> usize {
        (self.tail + self.slots.len() - self.head) % self.slots.len()
    }

    /// Appends `node` at the tail.
    ///
    /// # Panics
    /// Debug builds panic when the queue is full; callers guarantee spare
    /// capacity by enqueuing each node at most once.
    pub fn push(&mut self, node: usize) {
        debug_assert!(!self.is_full(), "active set capacity exceeded");
        self.slots[self.tail] = node;
        self.tail = (self.tail + 1) % self.slots.len();
    }

    /// Removes and returns the node at the head, oldest first.
    pub fn pop(&mut self) -> Option<usize> {
        if self.is_empty() {
            return None;
        }
        let node = self.slots[self.head];
        self.head = (self.head + 1) % self.slots.len();
        Some(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::VecDeque;

    use proptest::prelude::*;

    #[test]
    fn starts_empty() {
        let active = ActiveSet::with_capacity(3);
        assert!(active.is_empty());
        assert!(!active.is_full());
        assert_eq!(active.len(), 0);
    }

    #[test]
    fn pops_in_insertion_order() {
        let mut active = ActiveSet::with_capacity(3);
        active.push(7);
        active.push(1);
        active.push(4);
        assert!(active.is_full());
        assert_eq!(active.pop(), Some(7));
        assert_eq!(active.pop(), Some(1));
        assert_eq!(active.pop(), Some(4));
        assert_eq!(active.pop(), None);
    }

    #[test]
    fn wraps_around_the_sentinel_slot() {
        let mut active = ActiveSet::with_capacity(2);
        active.push(0);
        assert_eq!(active.pop(), Some(0));
        // Head and tail have advanced; further traffic must wrap.
        active.push(1);
        active.push(2);
        assert!(active.is_full());
        assert_eq!(active.pop(), Some(1));
        assert_eq!(active.pop(), Some(2));
        assert!(active.is_empty());
    }

    #[test]
    #[should_panic(expected = "active set capacity exceeded")]
    fn push_beyond_capacity_panics_in_debug() {
        let mut active = ActiveSet::with_capacity(1);
        active.push(0);
        active.push(1);
    }

    proptest! {
        /// Arbitrary push/pop interleavings behave exactly like a VecDeque.
        #[test]
        fn behaves_like_vecdeque(ops in proptest::collection::vec(any::<Option<u8>>(), 0..64)) {
            let mut active = ActiveSet::with_capacity(64);
            let mut model: VecDeque<usize> = VecDeque::new();
            for op in ops {
                match op {
                    Some(node) if model.len() < 64 => {
                        active.push(usize::from(node));
                        model.push_back(usize::from(node));
                    }
                    Some(_) => {}
                    None => prop_assert_eq!(active.pop(), model.pop_front()),
                }
                prop_assert_eq!(active.len(), model.len());
                prop_assert_eq!(active.is_empty(), model.is_empty());
            }
            while let Some(expected) = model.pop_front() {
                prop_assert_eq!(active.pop(), Some(expected));
            }
            prop_assert!(active.is_empty());
        }
    }
}
