//! Doubly linked child list for multi-child containers.
//!
//! The container only keeps `first`, `last` and `count`; the links live in
//! each child's parent data and are reached through [`SiblingStore`].

use super::NodeId;

/// Previous/next links of one child.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Siblings {
    pub previous: Option<NodeId>,
    pub next: Option<NodeId>,
}

/// Storage for sibling links, keyed by node.
pub(crate) trait SiblingStore {
    fn siblings(&self, id: NodeId) -> Siblings;
    fn set_siblings(&mut self, id: NodeId, siblings: Siblings);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChildList {
    pub first: Option<NodeId>,
    pub last: Option<NodeId>,
    pub count: usize,
}

impl ChildList {
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Splice `child` in right after `after`, or at the front when `after`
    /// is `None`. The caller guarantees `after` belongs to this list and
    /// `child` belongs to none.
    pub(crate) fn insert(&mut self, store: &mut impl SiblingStore, child: NodeId, after: Option<NodeId>) {
        match after {
            None => {
                let next = self.first;
                store.set_siblings(
                    child,
                    Siblings {
                        previous: None,
                        next,
                    },
                );
                if let Some(next) = next {
                    let mut links = store.siblings(next);
                    links.previous = Some(child);
                    store.set_siblings(next, links);
                }
                self.first = Some(child);
                if self.last.is_none() {
                    self.last = Some(child);
                }
            }
            Some(after) => {
                let mut after_links = store.siblings(after);
                let next = after_links.next;
                store.set_siblings(
                    child,
                    Siblings {
                        previous: Some(after),
                        next,
                    },
                );
                after_links.next = Some(child);
                store.set_siblings(after, after_links);
                match next {
                    Some(next) => {
                        let mut links = store.siblings(next);
                        links.previous = Some(child);
                        store.set_siblings(next, links);
                    }
                    None => self.last = Some(child),
                }
            }
        }
        self.count += 1;
    }

    /// Unlink `child`, re-joining its neighbours.
    pub(crate) fn remove(&mut self, store: &mut impl SiblingStore, child: NodeId) {
        let links = store.siblings(child);

        match links.previous {
            Some(previous) => {
                let mut previous_links = store.siblings(previous);
                previous_links.next = links.next;
                store.set_siblings(previous, previous_links);
            }
            None => self.first = links.next,
        }
        match links.next {
            Some(next) => {
                let mut next_links = store.siblings(next);
                next_links.previous = links.previous;
                store.set_siblings(next, next_links);
            }
            None => self.last = links.previous,
        }

        store.set_siblings(child, Siblings::default());
        self.count = self.count.saturating_sub(1);
    }

    /// Children from first to last.
    pub(crate) fn forward<'a, S: SiblingStore>(&self, store: &'a S) -> impl Iterator<Item = NodeId> + 'a {
        let mut current = self.first;
        std::iter::from_fn(move || {
            let id = current?;
            current = store.siblings(id).next;
            Some(id)
        })
    }

    /// Children from last to first.
    pub(crate) fn backward<'a, S: SiblingStore>(&self, store: &'a S) -> impl Iterator<Item = NodeId> + 'a {
        let mut current = self.last;
        std::iter::from_fn(move || {
            let id = current?;
            current = store.siblings(id).previous;
            Some(id)
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[derive(Default)]
    struct MapStore(HashMap<NodeId, Siblings>);

    impl SiblingStore for MapStore {
        fn siblings(&self, id: NodeId) -> Siblings {
            self.0.get(&id).copied().unwrap_or_default()
        }

        fn set_siblings(&mut self, id: NodeId, siblings: Siblings) {
            self.0.insert(id, siblings);
        }
    }

    fn id(index: u32) -> NodeId {
        NodeId::new(index, 0)
    }

    fn assert_consistent(list: &ChildList, store: &MapStore, expected: &[u32]) {
        let forward: Vec<NodeId> = list.forward(store).collect();
        let mut backward: Vec<NodeId> = list.backward(store).collect();
        backward.reverse();
        let expected: Vec<NodeId> = expected.iter().map(|&i| id(i)).collect();
        assert_eq!(forward, expected);
        assert_eq!(backward, expected);
        assert_eq!(list.count, expected.len());
        assert_eq!(list.first, expected.first().copied());
        assert_eq!(list.last, expected.last().copied());
    }

    #[test]
    fn test_insert_into_empty_list() {
        let mut store = MapStore::default();
        let mut list = ChildList::default();
        list.insert(&mut store, id(1), None);
        assert_consistent(&list, &store, &[1]);
    }

    #[test]
    fn test_insert_after_appends_and_splices() {
        let mut store = MapStore::default();
        let mut list = ChildList::default();
        list.insert(&mut store, id(1), None);
        list.insert(&mut store, id(3), Some(id(1)));
        list.insert(&mut store, id(2), Some(id(1)));
        assert_consistent(&list, &store, &[1, 2, 3]);
    }

    #[test]
    fn test_insert_without_anchor_prepends() {
        let mut store = MapStore::default();
        let mut list = ChildList::default();
        list.insert(&mut store, id(2), None);
        list.insert(&mut store, id(1), None);
        assert_consistent(&list, &store, &[1, 2]);
    }

    #[test]
    fn test_remove_edges_and_middle() {
        let mut store = MapStore::default();
        let mut list = ChildList::default();
        let mut after = None;
        for i in 1..=5 {
            list.insert(&mut store, id(i), after);
            after = Some(id(i));
        }

        list.remove(&mut store, id(3));
        assert_consistent(&list, &store, &[1, 2, 4, 5]);
        list.remove(&mut store, id(1));
        assert_consistent(&list, &store, &[2, 4, 5]);
        list.remove(&mut store, id(5));
        assert_consistent(&list, &store, &[2, 4]);
        list.remove(&mut store, id(2));
        list.remove(&mut store, id(4));
        assert_consistent(&list, &store, &[]);
        assert!(list.is_empty());
    }

    #[test]
    fn test_mixed_operations_stay_consistent() {
        let mut store = MapStore::default();
        let mut list = ChildList::default();
        let mut model: Vec<u32> = Vec::new();

        // Deterministic pseudo-random sequence of inserts and removes
        let mut seed: u32 = 7;
        for next_id in 0..60u32 {
            seed = seed.wrapping_mul(1103515245).wrapping_add(12345);
            if !model.is_empty() && seed % 3 == 0 {
                let victim = model.remove((seed as usize / 3) % model.len());
                list.remove(&mut store, id(victim));
            } else {
                let position = if model.is_empty() {
                    0
                } else {
                    (seed as usize / 7) % (model.len() + 1)
                };
                let after = if position == 0 {
                    None
                } else {
                    Some(id(model[position - 1]))
                };
                list.insert(&mut store, id(next_id), after);
                model.insert(position, next_id);
            }
            assert_consistent(&list, &store, &model);
        }
    }
}
