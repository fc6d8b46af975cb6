//! Arena-backed doubly linked list.
//!
//! Nodes live in a `Vec` and link to each other by slot index instead of by
//! pointer. A slot id stays valid until the node in it is removed; vacant slots
//! are chained into a free list and handed out again before the arena grows.
//!
//! The front of the list is the oldest node and the back is the newest, which is
//! the orientation the LRU store uses for its recency order.

extern crate alloc;

use alloc::vec::Vec;
use core::fmt;

/// Stable handle to a node in a [`List`].
pub(crate) type SlotId = usize;

/// Link value meaning "no node".
const NIL: SlotId = usize::MAX;

struct Node<T> {
    val: T,
    prev: SlotId,
    next: SlotId,
}

enum Slot<T> {
    Occupied(Node<T>),
    Vacant { next_free: SlotId },
}

/// Doubly linked list whose nodes are stored in an index-addressed arena.
pub(crate) struct List<T> {
    slots: Vec<Slot<T>>,
    /// Oldest node.
    head: SlotId,
    /// Newest node.
    tail: SlotId,
    free_head: SlotId,
    len: usize,
}

impl<T> List<T> {
    pub(crate) fn new() -> Self {
        List {
            slots: Vec::new(),
            head: NIL,
            tail: NIL,
            free_head: NIL,
            len: 0,
        }
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn node(&self, id: SlotId) -> Option<&Node<T>> {
        match self.slots.get(id) {
            Some(Slot::Occupied(node)) => Some(node),
            _ => None,
        }
    }

    fn node_mut(&mut self, id: SlotId) -> Option<&mut Node<T>> {
        match self.slots.get_mut(id) {
            Some(Slot::Occupied(node)) => Some(node),
            _ => None,
        }
    }

    pub(crate) fn get(&self, id: SlotId) -> Option<&T> {
        self.node(id).map(|node| &node.val)
    }

    pub(crate) fn get_mut(&mut self, id: SlotId) -> Option<&mut T> {
        self.node_mut(id).map(|node| &mut node.val)
    }

    /// Returns the oldest value.
    pub(crate) fn front(&self) -> Option<&T> {
        self.get(self.head)
    }

    /// Returns the newest value.
    pub(crate) fn back(&self) -> Option<&T> {
        self.get(self.tail)
    }

    /// Returns the slot id of the newest node.
    pub(crate) fn back_id(&self) -> Option<SlotId> {
        (self.tail != NIL).then_some(self.tail)
    }

    /// Appends `val` as the newest node and returns its slot id.
    pub(crate) fn push_back(&mut self, val: T) -> SlotId {
        let node = Node {
            val,
            prev: self.tail,
            next: NIL,
        };

        let id = if self.free_head != NIL {
            let id = self.free_head;
            if let Slot::Vacant { next_free } = self.slots[id] {
                self.free_head = next_free;
            }
            self.slots[id] = Slot::Occupied(node);
            id
        } else {
            self.slots.push(Slot::Occupied(node));
            self.slots.len() - 1
        };

        if let Some(old_tail) = self.node_mut(self.tail) {
            old_tail.next = id;
        } else {
            self.head = id;
        }
        self.tail = id;
        self.len += 1;
        id
    }

    /// Unlinks the node at `id` from its neighbors without freeing the slot.
    fn unlink(&mut self, id: SlotId) {
        let (prev, next) = match self.node(id) {
            Some(node) => (node.prev, node.next),
            None => return,
        };

        match self.node_mut(prev) {
            Some(p) => p.next = next,
            None => self.head = next,
        }
        match self.node_mut(next) {
            Some(n) => n.prev = prev,
            None => self.tail = prev,
        }
    }

    /// Removes the node at `id` and returns its value.
    pub(crate) fn remove(&mut self, id: SlotId) -> Option<T> {
        self.node(id)?;
        self.unlink(id);

        let slot = core::mem::replace(
            &mut self.slots[id],
            Slot::Vacant {
                next_free: self.free_head,
            },
        );
        self.free_head = id;
        self.len -= 1;

        match slot {
            Slot::Occupied(node) => Some(node.val),
            Slot::Vacant { .. } => None,
        }
    }

    /// Removes and returns the oldest value.
    pub(crate) fn pop_front(&mut self) -> Option<T> {
        self.remove(self.head)
    }

    /// Makes the node at `id` the newest one. No-op if it already is.
    pub(crate) fn move_to_back(&mut self, id: SlotId) {
        if id == self.tail || self.node(id).is_none() {
            return;
        }
        self.unlink(id);

        let old_tail = self.tail;
        if let Some(node) = self.node_mut(id) {
            node.prev = old_tail;
            node.next = NIL;
        }
        match self.node_mut(old_tail) {
            Some(t) => t.next = id,
            None => self.head = id,
        }
        self.tail = id;
    }

    /// Drops every node and releases the arena.
    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.head = NIL;
        self.tail = NIL;
        self.free_head = NIL;
        self.len = 0;
    }

    /// Iterates from the oldest to the newest value.
    pub(crate) fn iter(&self) -> Iter<'_, T> {
        Iter {
            list: self,
            cursor: self.head,
            remaining: self.len,
        }
    }
}

impl<T> Default for List<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for List<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("List")
            .field("len", &self.len)
            .field("slots", &self.slots.len())
            .finish()
    }
}

/// Oldest-to-newest iterator over a [`List`].
pub(crate) struct Iter<'a, T> {
    list: &'a List<T>,
    cursor: SlotId,
    remaining: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.list.node(self.cursor)?;
        self.cursor = node.next;
        self.remaining -= 1;
        Some(&node.val)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    fn collect<T: Clone>(list: &List<T>) -> Vec<T> {
        list.iter().cloned().collect()
    }

    #[test]
    fn test_push_back_orders_oldest_first() {
        let mut list = List::new();
        assert!(list.is_empty());
        list.push_back(1);
        list.push_back(2);
        list.push_back(3);
        assert_eq!(list.len(), 3);
        assert_eq!(collect(&list), [1, 2, 3]);
        assert_eq!(list.front(), Some(&1));
        assert_eq!(list.back(), Some(&3));
    }

    #[test]
    fn test_pop_front() {
        let mut list = List::new();
        list.push_back("a");
        list.push_back("b");
        assert_eq!(list.pop_front(), Some("a"));
        assert_eq!(list.pop_front(), Some("b"));
        assert_eq!(list.pop_front(), None);
        assert!(list.is_empty());
        assert_eq!(list.front(), None);
        assert_eq!(list.back(), None);
    }

    #[test]
    fn test_remove_middle_and_ends() {
        let mut list = List::new();
        let a = list.push_back(1);
        let b = list.push_back(2);
        let c = list.push_back(3);
        let d = list.push_back(4);

        assert_eq!(list.remove(b), Some(2));
        assert_eq!(collect(&list), [1, 3, 4]);
        assert_eq!(list.remove(a), Some(1));
        assert_eq!(collect(&list), [3, 4]);
        assert_eq!(list.remove(d), Some(4));
        assert_eq!(collect(&list), [3]);
        assert_eq!(list.front(), list.back());
        assert_eq!(list.remove(c), Some(3));
        assert!(list.is_empty());
    }

    #[test]
    fn test_remove_stale_id_is_none() {
        let mut list = List::new();
        let a = list.push_back(1);
        assert_eq!(list.remove(a), Some(1));
        assert_eq!(list.remove(a), None);
        assert_eq!(list.remove(42), None);
        assert_eq!(list.len(), 0);
    }

    #[test]
    fn test_move_to_back() {
        let mut list = List::new();
        let a = list.push_back(1);
        let b = list.push_back(2);
        let c = list.push_back(3);

        list.move_to_back(a);
        assert_eq!(collect(&list), [2, 3, 1]);

        list.move_to_back(c);
        assert_eq!(collect(&list), [2, 1, 3]);

        // already the newest
        list.move_to_back(c);
        assert_eq!(collect(&list), [2, 1, 3]);

        list.move_to_back(b);
        assert_eq!(collect(&list), [1, 3, 2]);
        assert_eq!(list.back_id(), Some(b));
    }

    #[test]
    fn test_move_single_node() {
        let mut list = List::new();
        let a = list.push_back(7);
        list.move_to_back(a);
        assert_eq!(collect(&list), [7]);
        assert_eq!(list.front(), Some(&7));
    }

    #[test]
    fn test_slots_are_reused() {
        let mut list = List::new();
        let a = list.push_back(1);
        let b = list.push_back(2);
        list.remove(a);
        list.remove(b);

        let c = list.push_back(3);
        let d = list.push_back(4);
        assert!(c == a || c == b);
        assert!(d == a || d == b);
        assert_eq!(list.slots.len(), 2);
        assert_eq!(collect(&list), [3, 4]);
    }

    #[test]
    fn test_get_mut_updates_in_place() {
        let mut list = List::new();
        let a = list.push_back(1);
        if let Some(v) = list.get_mut(a) {
            *v = 10;
        }
        assert_eq!(list.get(a), Some(&10));
    }

    #[test]
    fn test_clear() {
        let mut list = List::new();
        for i in 0..10 {
            list.push_back(i);
        }
        list.clear();
        assert!(list.is_empty());
        assert_eq!(list.iter().count(), 0);
        list.push_back(99);
        assert_eq!(collect(&list), [99]);
    }

    #[test]
    fn test_large_list_drops_without_recursion() {
        let mut list = List::new();
        for i in 0..200_000u32 {
            list.push_back(alloc::vec![i as u8; 4]);
        }
        assert_eq!(list.iter().len(), 200_000);
        drop(list);
    }

    #[test]
    fn test_concurrent_access_behind_mutex() {
        extern crate std;
        use std::sync::{Arc, Mutex};

        let list = Arc::new(Mutex::new(List::new()));
        let mut pool = scoped_threadpool::Pool::new(4);

        pool.scoped(|scope| {
            for t in 0..4u32 {
                let list = Arc::clone(&list);
                scope.execute(move || {
                    for i in 0..100u32 {
                        let mut guard = list.lock().unwrap();
                        let id = guard.push_back(t * 1000 + i);
                        if i % 2 == 0 {
                            guard.move_to_back(id);
                        } else {
                            guard.remove(id);
                        }
                    }
                });
            }
        });

        let guard = list.lock().unwrap();
        assert_eq!(guard.len(), 200);
        assert_eq!(guard.iter().count(), 200);
    }
}
