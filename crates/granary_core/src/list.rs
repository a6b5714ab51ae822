//! Singly linked ordered list backed by an index arena.
//!
//! Nodes live in a `Vec` and link to each other by index. Removing a node
//! `swap_remove`s it out of the arena and repoints whichever link referred to
//! the node that moved into its slot, so every live index stays valid.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::StorageError;

#[derive(Debug, Clone)]
struct Node<T> {
    value: T,
    next: Option<usize>,
}

/// Insertion-ordered, index-addressable container.
///
/// Positional access walks from the head and is O(n). Elements can be
/// removed mid-traversal through [`CursorMut`].
#[derive(Clone)]
pub struct OrderedList<T> {
    nodes: Vec<Node<T>>,
    head: Option<usize>,
    tail: Option<usize>,
}

/// Where a `swap_remove` moved the former last node, as `(from, to)`.
type Relocation = Option<(usize, usize)>;

impl<T> OrderedList<T> {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            head: None,
            tail: None,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    pub fn push_back(&mut self, value: T) {
        let idx = self.nodes.len();
        self.nodes.push(Node { value, next: None });
        match self.tail {
            Some(tail) => self.nodes[tail].next = Some(idx),
            None => self.head = Some(idx),
        }
        self.tail = Some(idx);
    }

    pub fn first(&self) -> Option<&T> {
        self.head.map(|idx| &self.nodes[idx].value)
    }

    pub fn get(&self, index: usize) -> Result<&T, StorageError> {
        let idx = self.slot_at(index)?;
        Ok(&self.nodes[idx].value)
    }

    pub fn get_mut(&mut self, index: usize) -> Result<&mut T, StorageError> {
        let idx = self.slot_at(index)?;
        Ok(&mut self.nodes[idx].value)
    }

    /// Replaces the element at `index`, returning the previous one.
    pub fn set(&mut self, index: usize, value: T) -> Result<T, StorageError> {
        let idx = self.slot_at(index)?;
        Ok(std::mem::replace(&mut self.nodes[idx].value, value))
    }

    pub fn remove(&mut self, index: usize) -> Result<T, StorageError> {
        let len = self.len();
        if index >= len {
            return Err(StorageError::IndexOutOfRange { index, len });
        }
        let mut prev = None;
        let mut idx = self.head;
        for _ in 0..index {
            prev = idx;
            idx = idx.and_then(|i| self.nodes[i].next);
        }
        let idx = idx.ok_or(StorageError::IndexOutOfRange { index, len })?;
        let (value, _) = self.unlink(prev, idx);
        Ok(value)
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.head = None;
        self.tail = None;
    }

    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            list: self,
            next: self.head,
            remaining: self.len(),
        }
    }

    pub fn cursor_mut(&mut self) -> CursorMut<'_, T> {
        let current = self.head;
        CursorMut {
            list: self,
            current,
            yielded: None,
            retained: None,
        }
    }

    /// New list holding clones of the matching elements, in order.
    pub fn filter<P>(&self, mut predicate: P) -> OrderedList<T>
    where
        T: Clone,
        P: FnMut(&T) -> bool,
    {
        self.iter().filter(|item| predicate(item)).cloned().collect()
    }

    pub fn for_each<F>(&self, mut action: F)
    where
        F: FnMut(&T),
    {
        for item in self {
            action(item);
        }
    }

    pub fn for_each_mut<F>(&mut self, mut action: F)
    where
        F: FnMut(&mut T),
    {
        let mut idx = self.head;
        while let Some(i) = idx {
            action(&mut self.nodes[i].value);
            idx = self.nodes[i].next;
        }
    }

    /// Deletes matching elements in place. Returns how many were removed.
    pub fn remove_if<P>(&mut self, mut predicate: P) -> usize
    where
        P: FnMut(&T) -> bool,
    {
        let mut removed = 0;
        let mut cursor = self.cursor_mut();
        while let Some(item) = cursor.next() {
            if predicate(item) && cursor.remove().is_ok() {
                removed += 1;
            }
        }
        removed
    }

    /// Stable adjacent-swap sort: full passes repeat until one makes no swap.
    ///
    /// Only strictly greater neighbours are swapped, so equal elements keep
    /// their relative order.
    pub fn sort_by<F>(&mut self, mut compare: F)
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        if self.len() < 2 {
            return;
        }
        loop {
            let mut swapped = false;
            let mut prev: Option<usize> = None;
            let mut current = self.head;
            while let Some(cur) = current {
                let Some(next) = self.nodes[cur].next else {
                    break;
                };
                if compare(&self.nodes[cur].value, &self.nodes[next].value) == Ordering::Greater {
                    let after = self.nodes[next].next;
                    self.nodes[cur].next = after;
                    self.nodes[next].next = Some(cur);
                    match prev {
                        Some(p) => self.nodes[p].next = Some(next),
                        None => self.head = Some(next),
                    }
                    if after.is_none() {
                        self.tail = Some(cur);
                    }
                    // `cur` moved one step right; compare it against its new neighbour.
                    prev = Some(next);
                    swapped = true;
                } else {
                    prev = Some(cur);
                    current = Some(next);
                }
            }
            if !swapped {
                break;
            }
        }
    }

    pub fn sort_by_key<K, F>(&mut self, mut key: F)
    where
        K: Ord,
        F: FnMut(&T) -> K,
    {
        self.sort_by(|a, b| key(a).cmp(&key(b)));
    }

    fn slot_at(&self, index: usize) -> Result<usize, StorageError> {
        let len = self.len();
        if index >= len {
            return Err(StorageError::IndexOutOfRange { index, len });
        }
        let mut idx = self.head;
        for _ in 0..index {
            idx = idx.and_then(|i| self.nodes[i].next);
        }
        idx.ok_or(StorageError::IndexOutOfRange { index, len })
    }

    /// Unlinks `idx`, whose predecessor in list order is `prev`.
    fn unlink(&mut self, prev: Option<usize>, idx: usize) -> (T, Relocation) {
        let next = self.nodes[idx].next;
        match prev {
            Some(p) => self.nodes[p].next = next,
            None => self.head = next,
        }
        if self.tail == Some(idx) {
            self.tail = prev;
        }

        let last = self.nodes.len() - 1;
        let removed = self.nodes.swap_remove(idx);
        if idx == last {
            return (removed.value, None);
        }

        // The former last node now sits at `idx`; repoint whatever linked to it.
        let relocate = |slot: &mut Option<usize>| {
            if *slot == Some(last) {
                *slot = Some(idx);
            }
        };
        relocate(&mut self.head);
        relocate(&mut self.tail);
        for node in &mut self.nodes {
            relocate(&mut node.next);
        }
        (removed.value, Some((last, idx)))
    }
}

impl<T> Default for OrderedList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for OrderedList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T: PartialEq> PartialEq for OrderedList<T> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<T: Eq> Eq for OrderedList<T> {}

impl<T> FromIterator<T> for OrderedList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut list = OrderedList::new();
        list.extend(iter);
        list
    }
}

impl<T> Extend<T> for OrderedList<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for item in iter {
            self.push_back(item);
        }
    }
}

impl<'a, T> IntoIterator for &'a OrderedList<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T> IntoIterator for OrderedList<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut idx = self.head;
        while let Some(i) = idx {
            order.push(i);
            idx = self.nodes[i].next;
        }
        let mut slots: Vec<Option<T>> = self.nodes.into_iter().map(|n| Some(n.value)).collect();
        order
            .into_iter()
            .filter_map(|i| slots[i].take())
            .collect::<Vec<_>>()
            .into_iter()
    }
}

impl<T: Serialize> Serialize for OrderedList<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for OrderedList<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Vec::<T>::deserialize(deserializer).map(OrderedList::from_iter)
    }
}

// ---------------------------------------------------------------------------
// Traversal
// ---------------------------------------------------------------------------

pub struct Iter<'a, T> {
    list: &'a OrderedList<T>,
    next: Option<usize>,
    remaining: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let idx = self.next?;
        let node = &self.list.nodes[idx];
        self.next = node.next;
        self.remaining -= 1;
        Some(&node.value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

/// Forward cursor that can delete the element it most recently yielded.
///
/// `retained` is the last yielded node still in the list, i.e. the
/// predecessor of `yielded`; it is what `remove` relinks around.
pub struct CursorMut<'a, T> {
    list: &'a mut OrderedList<T>,
    current: Option<usize>,
    yielded: Option<usize>,
    retained: Option<usize>,
}

impl<T> CursorMut<'_, T> {
    pub fn has_next(&self) -> bool {
        self.current.is_some()
    }

    /// Advances and returns the next element, or `None` at the end.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<&mut T> {
        let idx = self.current?;
        if self.yielded.is_some() {
            self.retained = self.yielded;
        }
        self.yielded = Some(idx);
        self.current = self.list.nodes[idx].next;
        Some(&mut self.list.nodes[idx].value)
    }

    /// Like [`CursorMut::next`], but exhaustion is an error.
    pub fn try_next(&mut self) -> Result<&mut T, StorageError> {
        self.next().ok_or(StorageError::NoSuchElement)
    }

    /// Removes the element returned by the last call to `next`.
    pub fn remove(&mut self) -> Result<T, StorageError> {
        let idx = self.yielded.take().ok_or(StorageError::InvalidCursorState)?;
        let (value, relocation) = self.list.unlink(self.retained, idx);
        if let Some((from, to)) = relocation {
            for slot in [&mut self.current, &mut self.retained] {
                if *slot == Some(from) {
                    *slot = Some(to);
                }
            }
        }
        Ok(value)
    }
}
