use super::process_control_block::ProcessControlBlock;
use super::store::{PcbId, PcbStore};

// One queue exists per discipline, so the discipline also names the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueOrder {
    Priority,
    Fifo,
}

pub(crate) struct PcbQueue {
    order: QueueOrder,
    head: Option<usize>,
    tail: Option<usize>,
    count: usize,
}

impl PcbQueue {
    pub fn new(order: QueueOrder) -> PcbQueue {
        PcbQueue {
            order,
            head: None,
            tail: None,
            count: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.count
    }

    /// Returns false if the id is stale or the PCB is already queued.
    pub fn insert(&mut self, store: &mut PcbStore, id: PcbId) -> bool {
        let index = match store.index_of(id) {
            Some(index) if store.node(index).link.owner.is_none() => index,
            _ => return false,
        };

        let before = match self.order {
            QueueOrder::Fifo => None,
            QueueOrder::Priority => {
                let priority = store.node(index).pcb.get_priority();
                let mut cursor = self.head;
                while let Some(current) = cursor {
                    let node = store.node(current);
                    if node.pcb.get_priority() < priority {
                        break;
                    }
                    cursor = node.link.next;
                }
                cursor
            }
        };

        match before {
            Some(next) => self.link_before(store, index, next),
            None => self.link_at_tail(store, index),
        }

        store.node_mut(index).link.owner = Some(self.order);
        self.count += 1;

        true
    }

    pub fn remove(&mut self, store: &mut PcbStore, id: PcbId) -> bool {
        let index = match store.index_of(id) {
            Some(index) if store.node(index).link.owner == Some(self.order) => index,
            _ => return false,
        };

        let link = store.node(index).link;

        match link.prev {
            Some(prev) => store.node_mut(prev).link.next = link.next,
            None => self.head = link.next,
        }
        match link.next {
            Some(next) => store.node_mut(next).link.prev = link.prev,
            None => self.tail = link.prev,
        }

        let node = store.node_mut(index);
        node.link.prev = None;
        node.link.next = None;
        node.link.owner = None;
        self.count -= 1;

        true
    }

    pub fn pop_front(&mut self, store: &mut PcbStore) -> Option<PcbId> {
        let id = store.id_at(self.head?);
        self.remove(store, id);
        Some(id)
    }

    pub fn find_by_name(&self, store: &PcbStore, name: &str) -> Option<PcbId> {
        let mut cursor = self.head;
        while let Some(current) = cursor {
            let node = store.node(current);
            if node.pcb.get_name() == name {
                return Some(store.id_at(current));
            }
            cursor = node.link.next;
        }

        None
    }

    pub fn iter<'a>(&self, store: &'a PcbStore) -> QueueIter<'a> {
        QueueIter {
            store,
            cursor: self.head,
        }
    }

    fn link_at_tail(&mut self, store: &mut PcbStore, index: usize) {
        store.node_mut(index).link.prev = self.tail;
        store.node_mut(index).link.next = None;

        match self.tail {
            Some(tail) => store.node_mut(tail).link.next = Some(index),
            None => self.head = Some(index),
        }
        self.tail = Some(index);
    }

    fn link_before(&mut self, store: &mut PcbStore, index: usize, next: usize) {
        let prev = store.node(next).link.prev;

        store.node_mut(index).link.prev = prev;
        store.node_mut(index).link.next = Some(next);
        store.node_mut(next).link.prev = Some(index);

        match prev {
            Some(prev) => store.node_mut(prev).link.next = Some(index),
            None => self.head = Some(index),
        }
    }
}

pub struct QueueIter<'a> {
    store: &'a PcbStore,
    cursor: Option<usize>,
}

impl<'a> Iterator for QueueIter<'a> {
    type Item = &'a ProcessControlBlock;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.store.node(self.cursor?);
        self.cursor = node.link.next;
        Some(&node.pcb)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::process_control_block::{Priority, ProcessClass};
    use crate::kernel::stack::StackAllocator;

    fn new_store() -> PcbStore {
        PcbStore::new(StackAllocator::new(64 * 1024), 1024)
    }

    fn add(store: &mut PcbStore, queue: &mut PcbQueue, name: &str, priority: i64) -> PcbId {
        let id = store
            .allocate(name, ProcessClass::Application, Priority::new(priority).unwrap())
            .unwrap();
        assert!(queue.insert(store, id));
        id
    }

    fn names(queue: &PcbQueue, store: &PcbStore) -> Vec<String> {
        queue.iter(store).map(|pcb| pcb.get_name().to_string()).collect()
    }

    #[test]
    fn test_queue_priority_insert_descending() {
        let mut store = new_store();
        let mut queue = PcbQueue::new(QueueOrder::Priority);

        add(&mut store, &mut queue, "low", 1);
        add(&mut store, &mut queue, "high", 9);
        add(&mut store, &mut queue, "mid", 5);

        assert_eq!(names(&queue, &store), vec!["high", "mid", "low"]);
        assert_eq!(queue.len(), 3);
    }

    #[test]
    fn test_queue_priority_insert_is_stable() {
        let mut store = new_store();
        let mut queue = PcbQueue::new(QueueOrder::Priority);

        add(&mut store, &mut queue, "a", 5);
        add(&mut store, &mut queue, "b", 7);
        add(&mut store, &mut queue, "c", 5);
        add(&mut store, &mut queue, "d", 7);
        add(&mut store, &mut queue, "e", 5);

        assert_eq!(names(&queue, &store), vec!["b", "d", "a", "c", "e"]);
    }

    #[test]
    fn test_queue_fifo_ignores_priority() {
        let mut store = new_store();
        let mut queue = PcbQueue::new(QueueOrder::Fifo);

        add(&mut store, &mut queue, "a", 1);
        add(&mut store, &mut queue, "b", 9);
        add(&mut store, &mut queue, "c", 4);

        assert_eq!(names(&queue, &store), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_queue_remove_head_middle_tail() {
        let mut store = new_store();
        let mut queue = PcbQueue::new(QueueOrder::Fifo);

        let a = add(&mut store, &mut queue, "a", 1);
        let b = add(&mut store, &mut queue, "b", 1);
        let c = add(&mut store, &mut queue, "c", 1);
        let d = add(&mut store, &mut queue, "d", 1);

        assert!(queue.remove(&mut store, b));
        assert_eq!(names(&queue, &store), vec!["a", "c", "d"]);
        assert!(queue.remove(&mut store, a));
        assert_eq!(names(&queue, &store), vec!["c", "d"]);
        assert!(queue.remove(&mut store, d));
        assert_eq!(names(&queue, &store), vec!["c"]);
        assert!(queue.remove(&mut store, c));
        assert_eq!(queue.len(), 0);
        assert_eq!(queue.iter(&store).count(), 0);

        // Re-inserting after the queue drained must rebuild head and tail.
        assert!(queue.insert(&mut store, a));
        assert!(queue.insert(&mut store, b));
        assert_eq!(names(&queue, &store), vec!["a", "b"]);
    }

    #[test]
    fn test_queue_remove_not_member() {
        let mut store = new_store();
        let mut ready = PcbQueue::new(QueueOrder::Priority);
        let mut blocked = PcbQueue::new(QueueOrder::Fifo);

        let a = add(&mut store, &mut ready, "a", 1);

        assert!(!blocked.remove(&mut store, a));
        assert_eq!(ready.len(), 1);
        assert_eq!(blocked.len(), 0);
    }

    #[test]
    fn test_queue_insert_rejects_owned_node() {
        let mut store = new_store();
        let mut ready = PcbQueue::new(QueueOrder::Priority);
        let mut blocked = PcbQueue::new(QueueOrder::Fifo);

        let a = add(&mut store, &mut ready, "a", 1);

        assert!(!blocked.insert(&mut store, a));
        assert!(!ready.insert(&mut store, a));
        assert_eq!(ready.len(), 1);
        assert_eq!(store.get_owner(a), Some(QueueOrder::Priority));
    }

    #[test]
    fn test_queue_find_by_name() {
        let mut store = new_store();
        let mut queue = PcbQueue::new(QueueOrder::Priority);

        add(&mut store, &mut queue, "a", 1);
        let b = add(&mut store, &mut queue, "b", 2);

        assert_eq!(queue.find_by_name(&store, "b"), Some(b));
        assert_eq!(queue.find_by_name(&store, "zz"), None);
    }

    #[test]
    fn test_queue_count_matches_traversal() {
        let mut store = new_store();
        let mut queue = PcbQueue::new(QueueOrder::Priority);

        let ids: Vec<PcbId> = (0..8)
            .map(|i| add(&mut store, &mut queue, &format!("p{}", i), i % 4))
            .collect();
        for id in ids.iter().step_by(3) {
            queue.remove(&mut store, *id);
        }

        assert_eq!(queue.len(), queue.iter(&store).count());
    }

    #[test]
    fn test_queue_pop_front() {
        let mut store = new_store();
        let mut queue = PcbQueue::new(QueueOrder::Priority);

        add(&mut store, &mut queue, "a", 1);
        let b = add(&mut store, &mut queue, "b", 8);

        assert_eq!(queue.pop_front(&mut store), Some(b));
        assert_eq!(store.get_owner(b), None);
        assert_eq!(names(&queue, &store), vec!["a"]);
        assert!(queue.pop_front(&mut store).is_some());
        assert_eq!(queue.pop_front(&mut store), None);
    }
}
