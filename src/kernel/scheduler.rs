use log::{debug, info, warn};

use super::process_control_block::{validate_name, ExecutionState, Priority, ProcessClass, ProcessControlBlock};
use super::queue::{PcbQueue, QueueIter, QueueOrder};
use super::stack::StackAllocator;
use super::store::{PcbId, PcbStore};
use super::KernelError;

// Only this type moves a PCB between queues. Suspension never changes
// queue membership.
pub struct Scheduler {
    store: PcbStore,
    ready: PcbQueue,
    blocked: PcbQueue,
}

impl Scheduler {
    pub fn new(stack_size: usize, stack_region_size: usize) -> Scheduler {
        Scheduler {
            store: PcbStore::new(StackAllocator::new(stack_region_size), stack_size),
            ready: PcbQueue::new(QueueOrder::Priority),
            blocked: PcbQueue::new(QueueOrder::Fifo),
        }
    }

    pub fn create(&mut self, name: &str, class: ProcessClass, priority: i64) -> Result<(), KernelError> {
        validate_name(name)?;
        let priority = Priority::new(priority)?;

        if self.locate(name).is_some() {
            warn!("create rejected: '{}' already exists", name);
            return Err(KernelError::DuplicateName(name.to_string()));
        }

        let id = self.store.allocate(name, class, priority).map_err(|err| {
            warn!("create '{}' failed: {}", name, err);
            err
        })?;
        self.ready.insert(&mut self.store, id);

        info!("created '{}' ({}, priority {})", name, class, priority);
        Ok(())
    }

    pub fn delete(&mut self, name: &str) -> Result<(), KernelError> {
        let id = self.lookup(name)?;

        let unlinked = match self.store.get_owner(id) {
            Some(QueueOrder::Priority) => self.ready.remove(&mut self.store, id),
            Some(QueueOrder::Fifo) => self.blocked.remove(&mut self.store, id),
            None => false,
        };
        debug_assert!(unlinked, "located pcb '{}' was not queued", name);

        let released = self.store.release(id);
        debug_assert!(released, "pcb '{}' was already released", name);

        info!("deleted '{}'", name);
        Ok(())
    }

    pub fn block(&mut self, name: &str) -> Result<(), KernelError> {
        let id = self.lookup(name)?;
        self.expect_state(id, ExecutionState::Ready)?;

        self.ready.remove(&mut self.store, id);
        self.pcb_mut(id).state = ExecutionState::Blocked;
        self.blocked.insert(&mut self.store, id);

        debug!("'{}' moved ready -> blocked", name);
        Ok(())
    }

    pub fn unblock(&mut self, name: &str) -> Result<(), KernelError> {
        let id = self.lookup(name)?;
        self.expect_state(id, ExecutionState::Blocked)?;

        self.blocked.remove(&mut self.store, id);
        self.pcb_mut(id).state = ExecutionState::Ready;
        self.ready.insert(&mut self.store, id);

        debug!("'{}' moved blocked -> ready", name);
        Ok(())
    }

    pub fn suspend(&mut self, name: &str) -> Result<(), KernelError> {
        let id = self.lookup(name)?;
        self.pcb_mut(id).suspended = true;

        debug!("'{}' suspended", name);
        Ok(())
    }

    pub fn resume(&mut self, name: &str) -> Result<(), KernelError> {
        let id = self.lookup(name)?;

        let pcb = self.pcb_mut(id);
        if !pcb.suspended {
            return Err(KernelError::InvalidState {
                name: name.to_string(),
                state: pcb.state,
                suspended: false,
            });
        }
        pcb.suspended = false;

        debug!("'{}' resumed", name);
        Ok(())
    }

    pub fn set_priority(&mut self, name: &str, priority: i64) -> Result<(), KernelError> {
        let priority = Priority::new(priority)?;
        let id = self.lookup(name)?;

        // Reinserting would move it behind its equal-priority peers.
        if self.pcb(id).get_priority() == priority {
            debug!("'{}' already has priority {}", name, priority);
            return Ok(());
        }

        let owner = self.store.get_owner(id);
        if owner == Some(QueueOrder::Priority) {
            self.ready.remove(&mut self.store, id);
        }

        self.pcb_mut(id).set_priority(priority);

        if owner == Some(QueueOrder::Priority) {
            self.ready.insert(&mut self.store, id);
        }

        debug!("'{}' priority set to {}", name, priority);
        Ok(())
    }

    pub fn find(&self, name: &str) -> Option<&ProcessControlBlock> {
        self.locate(name).and_then(|id| self.store.get(id))
    }

    pub fn ready(&self) -> QueueIter<'_> {
        self.ready.iter(&self.store)
    }

    pub fn blocked(&self) -> QueueIter<'_> {
        self.blocked.iter(&self.store)
    }

    pub fn ready_count(&self) -> usize {
        self.ready.len()
    }

    pub fn blocked_count(&self) -> usize {
        self.blocked.len()
    }

    pub fn stack_bytes_in_use(&self) -> usize {
        self.store.get_stacks().get_in_use()
    }

    pub fn stack_region_size(&self) -> usize {
        self.store.get_stacks().get_region_size()
    }

    pub fn shutdown(&mut self) -> usize {
        let mut released = 0;

        for queue in [&mut self.ready, &mut self.blocked] {
            while let Some(id) = queue.pop_front(&mut self.store) {
                self.store.release(id);
                released += 1;
            }
        }
        debug_assert_eq!(self.store.len(), 0);

        info!("shutdown released {} pcb(s)", released);
        released
    }

    fn locate(&self, name: &str) -> Option<PcbId> {
        self.ready
            .find_by_name(&self.store, name)
            .or_else(|| self.blocked.find_by_name(&self.store, name))
    }

    fn lookup(&self, name: &str) -> Result<PcbId, KernelError> {
        self.locate(name).ok_or_else(|| {
            warn!("no process named '{}'", name);
            KernelError::NotFound(name.to_string())
        })
    }

    fn expect_state(&self, id: PcbId, expected: ExecutionState) -> Result<(), KernelError> {
        let pcb = self.pcb(id);
        if pcb.state != expected {
            warn!("'{}' is {}, expected {}", pcb.get_name(), pcb.state, expected);
            return Err(KernelError::InvalidState {
                name: pcb.get_name().to_string(),
                state: pcb.state,
                suspended: pcb.suspended,
            });
        }

        Ok(())
    }

    fn pcb(&self, id: PcbId) -> &ProcessControlBlock {
        match self.store.get(id) {
            Some(pcb) => pcb,
            None => panic!("Located pcb vanished from the store"),
        }
    }

    fn pcb_mut(&mut self, id: PcbId) -> &mut ProcessControlBlock {
        match self.store.get_mut(id) {
            Some(pcb) => pcb,
            None => panic!("Located pcb vanished from the store"),
        }
    }
}
