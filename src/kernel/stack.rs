use log::debug;

use super::KernelError;

pub const MAX_STACK_SIZE: usize = 1024;

pub const DEFAULT_REGION_SIZE: usize = 64 * 1024;

/// Consumed by [`StackAllocator::release`], so it cannot be released twice.
#[derive(Debug)]
pub struct StackHandle {
    bottom: usize,
    buffer: Box<[u8]>,
}

impl StackHandle {
    pub fn bottom(&self) -> usize {
        self.bottom
    }

    pub fn top(&self) -> usize {
        self.bottom + self.buffer.len()
    }

    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }
}

// First-fit over a simulated address region. Nothing executes on the buffers.
pub(crate) struct StackAllocator {
    region_size: usize,
    // (start, len), sorted by start, never adjacent.
    free_ranges: Vec<(usize, usize)>,
}

impl StackAllocator {
    pub fn new(region_size: usize) -> StackAllocator {
        let free_ranges = if region_size == 0 {
            Vec::new()
        } else {
            vec![(0, region_size)]
        };

        StackAllocator {
            region_size,
            free_ranges,
        }
    }

    pub fn acquire(&mut self, capacity: usize) -> Result<StackHandle, KernelError> {
        if capacity == 0 || capacity > MAX_STACK_SIZE {
            return Err(KernelError::InvalidStackSize(capacity));
        }

        let slot = self
            .free_ranges
            .iter()
            .position(|&(_, len)| len >= capacity)
            .ok_or(KernelError::AllocationFailure {
                requested: capacity,
                available: self.get_available(),
            })?;

        let mut buffer = Vec::new();
        if buffer.try_reserve_exact(capacity).is_err() {
            return Err(KernelError::AllocationFailure {
                requested: capacity,
                available: 0,
            });
        }
        buffer.resize(capacity, 0u8);

        let (start, len) = self.free_ranges[slot];
        if len == capacity {
            self.free_ranges.remove(slot);
        } else {
            self.free_ranges[slot] = (start + capacity, len - capacity);
        }

        debug!("stack acquired at {:#06x}..{:#06x}", start, start + capacity);

        Ok(StackHandle {
            bottom: start,
            buffer: buffer.into_boxed_slice(),
        })
    }

    pub fn release(&mut self, handle: StackHandle) {
        let start = handle.bottom();
        let mut len = handle.capacity();
        drop(handle);

        debug!("stack released at {:#06x}..{:#06x}", start, start + len);

        let idx = self.free_ranges.partition_point(|&(s, _)| s < start);

        // Merge with the following range.
        if let Some(&(next_start, next_len)) = self.free_ranges.get(idx) {
            if start + len == next_start {
                len += next_len;
                self.free_ranges.remove(idx);
            }
        }

        // Merge with the preceding range.
        if idx > 0 {
            let (prev_start, prev_len) = self.free_ranges[idx - 1];
            if prev_start + prev_len == start {
                self.free_ranges[idx - 1] = (prev_start, prev_len + len);
                return;
            }
        }

        self.free_ranges.insert(idx, (start, len));
    }

    pub fn get_available(&self) -> usize {
        self.free_ranges.iter().map(|&(_, len)| len).sum()
    }

    pub fn get_region_size(&self) -> usize {
        self.region_size
    }

    pub fn get_in_use(&self) -> usize {
        self.region_size - self.get_available()
    }
}
