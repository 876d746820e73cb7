//! A fixed capacity binary min-heap addressed by external index.
//!
//! Dijkstra needs to lower the cost of a node that is already queued. A plain `BinaryHeap` can
//! only push a duplicate entry and skip stale ones later; here every index `0..capacity` has at
//! most one slot, and its key can be changed in place in `O(log n)`.

use error_chain::bail;

use crate::errors::*;

#[derive(Debug, Clone)]
struct HeapEntry<K> {
    index: usize,
    key: K,
}

#[derive(Debug, Clone)]
pub struct IndexMinPriorityQueue<K> {
    // 0-based binary heap: parent = (i - 1) / 2, children = 2i + 1, 2i + 2
    heap: Vec<HeapEntry<K>>,
    // external index -> position in `heap`
    positions: Vec<Option<usize>>,
}

impl<K: PartialOrd> IndexMinPriorityQueue<K> {
    pub fn new(capacity: usize) -> IndexMinPriorityQueue<K> {
        IndexMinPriorityQueue {
            heap: Vec::with_capacity(capacity),
            positions: vec![None; capacity],
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.positions.len()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Is `index` currently queued? Out of range indices never are.
    #[inline]
    pub fn contains(&self, index: usize) -> bool {
        self.positions.get(index).map_or(false, Option::is_some)
    }

    pub fn insert(&mut self, index: usize, key: K) -> Result<()> {
        self.check_range(index)?;
        if self.contains(index) {
            bail!(ErrorKind::QueueIndexPresent(index));
        }

        let position = self.heap.len();
        self.heap.push(HeapEntry { index, key });
        self.positions[index] = Some(position);
        self.sift_up(position);
        Ok(())
    }

    pub fn key_at(&self, index: usize) -> Result<&K> {
        let position = self.position_of(index)?;
        Ok(&self.heap[position].key)
    }

    pub fn min_index(&self) -> Result<usize> {
        self.heap.first().map(|entry| entry.index).ok_or_else(|| ErrorKind::EmptyQueue.into())
    }

    pub fn min_key(&self) -> Result<&K> {
        self.heap.first().map(|entry| &entry.key).ok_or_else(|| ErrorKind::EmptyQueue.into())
    }

    /// Removes the minimum entry and returns the index that held it.
    pub fn delete_min(&mut self) -> Result<usize> {
        if self.heap.is_empty() {
            bail!(ErrorKind::EmptyQueue);
        }
        Ok(self.remove_at(0).index)
    }

    /// Removes `index` from wherever it is in the heap, returning its key.
    pub fn delete(&mut self, index: usize) -> Result<K> {
        let position = self.position_of(index)?;
        Ok(self.remove_at(position).key)
    }

    /// Replaces the key at `index`, sifting whichever way the new key requires.
    pub fn change_key(&mut self, index: usize, key: K) -> Result<()> {
        let position = self.position_of(index)?;
        self.heap[position].key = key;
        self.sift_up(position);
        self.sift_down(position);
        Ok(())
    }

    /// Lowers the key at `index`. The new key must be strictly smaller than the current one.
    pub fn decrease_key(&mut self, index: usize, key: K) -> Result<()> {
        let position = self.position_of(index)?;
        if !(key < self.heap[position].key) {
            bail!(ErrorKind::KeyNotDecreased(index));
        }
        self.heap[position].key = key;
        self.sift_up(position);
        Ok(())
    }

    /// Raises the key at `index`. The new key must be strictly larger than the current one.
    pub fn increase_key(&mut self, index: usize, key: K) -> Result<()> {
        let position = self.position_of(index)?;
        if !(key > self.heap[position].key) {
            bail!(ErrorKind::KeyNotIncreased(index));
        }
        self.heap[position].key = key;
        self.sift_down(position);
        Ok(())
    }

    fn check_range(&self, index: usize) -> Result<()> {
        if index < self.capacity() {
            Ok(())
        } else {
            Err(ErrorKind::QueueIndexOutOfRange(index, self.capacity()).into())
        }
    }

    fn position_of(&self, index: usize) -> Result<usize> {
        self.check_range(index)?;
        self.positions[index].ok_or_else(|| ErrorKind::QueueIndexAbsent(index).into())
    }

    fn remove_at(&mut self, position: usize) -> HeapEntry<K> {
        let last = self.heap.len() - 1;
        self.swap(position, last);
        let removed = self.heap.swap_remove(last);
        self.positions[removed.index] = None;

        // The entry moved into `position` came from the bottom of the heap and may need to go
        // either way when `position` was not the root.
        if position < self.heap.len() {
            self.sift_up(position);
            self.sift_down(position);
        }
        removed
    }

    fn swap(&mut self, a: usize, b: usize) {
        self.heap.swap(a, b);
        self.positions[self.heap[a].index] = Some(a);
        self.positions[self.heap[b].index] = Some(b);
    }

    #[inline]
    fn less(&self, a: usize, b: usize) -> bool {
        self.heap[a].key < self.heap[b].key
    }

    fn sift_up(&mut self, mut position: usize) {
        while position > 0 {
            let parent = (position - 1) / 2;
            if self.less(position, parent) {
                self.swap(position, parent);
                position = parent;
            } else {
                break;
            }
        }
    }

    fn sift_down(&mut self, mut position: usize) {
        let len = self.heap.len();
        loop {
            let left = 2 * position + 1;
            let right = left + 1;
            let mut smallest = position;

            if left < len && self.less(left, smallest) {
                smallest = left;
            }
            if right < len && self.less(right, smallest) {
                smallest = right;
            }
            if smallest == position {
                break;
            }

            self.swap(position, smallest);
            position = smallest;
        }
    }
}
