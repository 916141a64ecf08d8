use log::debug;

use super::process_control_block::{ProcessClass, ProcessControlBlock, Priority};
use super::queue::QueueOrder;
use super::stack::StackAllocator;
use super::KernelError;

/// A deleted PCB's id never resolves again, even after its slot is reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PcbId {
    index: usize,
    generation: u32,
}

#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct Link {
    pub prev: Option<usize>,
    pub next: Option<usize>,
    pub owner: Option<QueueOrder>,
}

pub(crate) struct PcbNode {
    pub pcb: ProcessControlBlock,
    pub link: Link,
}

struct Slot {
    generation: u32,
    node: Option<PcbNode>,
}

pub(crate) struct PcbStore {
    slots: Vec<Slot>,
    free_slots: Vec<usize>,
    stacks: StackAllocator,
    stack_size: usize,
}

impl PcbStore {
    pub fn new(stacks: StackAllocator, stack_size: usize) -> PcbStore {
        PcbStore {
            slots: Vec::new(),
            free_slots: Vec::new(),
            stacks,
            stack_size,
        }
    }

    pub fn allocate(&mut self, name: &str, class: ProcessClass, priority: Priority) -> Result<PcbId, KernelError> {
        let stack = self.stacks.acquire(self.stack_size)?;
        let node = PcbNode {
            pcb: ProcessControlBlock::new(name, class, priority, stack),
            link: Link::default(),
        };

        let index = match self.free_slots.pop() {
            Some(index) => {
                self.slots[index].node = Some(node);
                index
            }
            None => {
                self.slots.push(Slot { generation: 0, node: Some(node) });
                self.slots.len() - 1
            }
        };

        debug!("pcb '{}' allocated in slot {}", name, index);

        Ok(PcbId {
            index,
            generation: self.slots[index].generation,
        })
    }

    pub fn release(&mut self, id: PcbId) -> bool {
        let slot = match self.slots.get_mut(id.index) {
            Some(slot) if slot.generation == id.generation => slot,
            _ => return false,
        };

        let node = match slot.node.take() {
            Some(node) => node,
            None => return false,
        };
        debug_assert!(node.link.owner.is_none(), "released a PCB that is still queued");

        slot.generation = slot.generation.wrapping_add(1);
        self.free_slots.push(id.index);

        debug!("pcb '{}' released from slot {}", node.pcb.get_name(), id.index);
        self.stacks.release(node.pcb.into_stack());

        true
    }

    pub fn get(&self, id: PcbId) -> Option<&ProcessControlBlock> {
        self.index_of(id).map(|index| &self.node(index).pcb)
    }

    pub fn get_mut(&mut self, id: PcbId) -> Option<&mut ProcessControlBlock> {
        let index = self.index_of(id)?;
        Some(&mut self.node_mut(index).pcb)
    }

    pub fn get_owner(&self, id: PcbId) -> Option<QueueOrder> {
        self.index_of(id).and_then(|index| self.node(index).link.owner)
    }

    pub fn len(&self) -> usize {
        self.slots.len() - self.free_slots.len()
    }

    pub fn get_stacks(&self) -> &StackAllocator {
        &self.stacks
    }

    pub(super) fn index_of(&self, id: PcbId) -> Option<usize> {
        match self.slots.get(id.index) {
            Some(slot) if slot.generation == id.generation && slot.node.is_some() => Some(id.index),
            _ => None,
        }
    }

    pub(super) fn id_at(&self, index: usize) -> PcbId {
        PcbId {
            index,
            generation: self.slots[index].generation,
        }
    }

    pub(super) fn node(&self, index: usize) -> &PcbNode {
        match &self.slots[index].node {
            Some(node) => node,
            None => panic!("No pcb in slot: {}", index),
        }
    }

    pub(super) fn node_mut(&mut self, index: usize) -> &mut PcbNode {
        match &mut self.slots[index].node {
            Some(node) => node,
            None => panic!("No pcb in slot: {}", index),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_store(region_size: usize) -> PcbStore {
        PcbStore::new(StackAllocator::new(region_size), 1024)
    }

    fn prio(value: i64) -> Priority {
        Priority::new(value).unwrap()
    }

    #[test]
    fn test_store_allocate_then_get() {
        let mut store = new_store(4096);
        let id = store.allocate("P1", ProcessClass::System, prio(3)).unwrap();

        let pcb = store.get(id).unwrap();
        assert_eq!(pcb.get_name(), "P1");
        assert_eq!(pcb.get_priority(), prio(3));
        assert_eq!(store.get_owner(id), None);
        assert_eq!(store.len(), 1);
        assert_eq!(store.get_stacks().get_in_use(), 1024);
    }

    #[test]
    fn test_store_release_frees_stack() {
        let mut store = new_store(4096);
        let id = store.allocate("P1", ProcessClass::System, prio(3)).unwrap();

        assert!(store.release(id));
        assert_eq!(store.len(), 0);
        assert_eq!(store.get_stacks().get_in_use(), 0);
        assert!(store.get(id).is_none());
    }

    #[test]
    fn test_store_double_release_is_rejected() {
        let mut store = new_store(4096);
        let id = store.allocate("P1", ProcessClass::System, prio(3)).unwrap();

        assert!(store.release(id));
        assert!(!store.release(id));
    }

    #[test]
    fn test_store_stale_id_after_slot_reuse() {
        let mut store = new_store(4096);
        let old = store.allocate("P1", ProcessClass::System, prio(3)).unwrap();
        store.release(old);

        let new = store.allocate("P2", ProcessClass::Application, prio(4)).unwrap();

        assert_ne!(old, new);
        assert!(store.get(old).is_none());
        assert_eq!(store.get(new).unwrap().get_name(), "P2");
    }

    #[test]
    fn test_store_allocation_failure_leaves_nothing_behind() {
        let mut store = new_store(1024);
        store.allocate("P1", ProcessClass::System, prio(3)).unwrap();

        let result = store.allocate("P2", ProcessClass::System, prio(3));

        assert_eq!(
            result.unwrap_err(),
            KernelError::AllocationFailure { requested: 1024, available: 0 }
        );
        assert_eq!(store.len(), 1);
    }
}
