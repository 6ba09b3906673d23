//! Process memory sampling.
//!
//! Resident set size comes from the operating system via `sysinfo`. Heap figures
//! come from `CountingAllocator`, a thin wrapper over the system allocator that
//! the binary installs as its global allocator. When it is not installed (unit
//! tests, embedding in another binary) the heap counters read zero.

use std::alloc::{GlobalAlloc, Layout, System as SystemAlloc};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use sysinfo::{ProcessesToUpdate, System};

const BYTES_PER_MEGABYTE: u64 = 1024 * 1024;

static HEAP_USED: AtomicUsize = AtomicUsize::new(0);
static HEAP_PEAK: AtomicUsize = AtomicUsize::new(0);

/// Global allocator that counts live heap bytes.
///
/// ```ignore
/// #[global_allocator]
/// static ALLOCATOR: vigil::memory::CountingAllocator = vigil::memory::CountingAllocator;
/// ```
pub struct CountingAllocator;

impl CountingAllocator {
    fn record_alloc(size: usize) {
        let used = HEAP_USED.fetch_add(size, Ordering::Relaxed) + size;
        HEAP_PEAK.fetch_max(used, Ordering::Relaxed);
    }

    fn record_dealloc(size: usize) {
        HEAP_USED.fetch_sub(size, Ordering::Relaxed);
    }
}

// SAFETY: every call is forwarded unchanged to the system allocator; the
// counters are bookkeeping only and never influence the returned pointers.
unsafe impl GlobalAlloc for CountingAllocator {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        let ptr = SystemAlloc.alloc(layout);
        if !ptr.is_null() {
            Self::record_alloc(layout.size());
        }
        ptr
    }

    unsafe fn alloc_zeroed(&self, layout: Layout) -> *mut u8 {
        let ptr = SystemAlloc.alloc_zeroed(layout);
        if !ptr.is_null() {
            Self::record_alloc(layout.size());
        }
        ptr
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        SystemAlloc.dealloc(ptr, layout);
        Self::record_dealloc(layout.size());
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        let new_ptr = SystemAlloc.realloc(ptr, layout, new_size);
        if !new_ptr.is_null() {
            Self::record_dealloc(layout.size());
            Self::record_alloc(new_size);
        }
        new_ptr
    }
}

#[derive(Debug, thiserror::Error)]
pub enum MemoryError {
    #[error("Unable to determine current process id: {0}")]
    Pid(&'static str),

    #[error("Process {0} not found in system process table")]
    ProcessNotFound(u32),
}

/// Memory counters for the current process, in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryUsage {
    /// Resident set size
    pub rss: u64,
    /// Peak of `heap_used` since startup. Never decreases; this is not the
    /// allocator's current reservation.
    pub heap_total: u64,
    /// Live heap bytes
    pub heap_used: u64,
    /// Resident memory not accounted for by the heap
    pub external: u64,
}

impl MemoryUsage {
    /// Take a fresh sample of the current process.
    pub fn sample() -> Result<Self, MemoryError> {
        let pid = sysinfo::get_current_pid().map_err(MemoryError::Pid)?;

        let mut system = System::new();
        system.refresh_processes(ProcessesToUpdate::Some(&[pid]), true);
        let rss = system
            .process(pid)
            .map(|process| process.memory())
            .ok_or(MemoryError::ProcessNotFound(pid.as_u32()))?;

        Ok(Self::from_parts(
            rss,
            HEAP_USED.load(Ordering::Relaxed) as u64,
            HEAP_PEAK.load(Ordering::Relaxed) as u64,
        ))
    }

    fn from_parts(rss: u64, heap_used: u64, heap_peak: u64) -> Self {
        Self {
            rss,
            heap_total: heap_peak.max(heap_used),
            heap_used,
            external: rss.saturating_sub(heap_used),
        }
    }
}

/// Format a byte count as whole megabytes, rounding half up: `"12 MB"`.
pub fn format_megabytes(bytes: u64) -> String {
    let megabytes = (bytes + BYTES_PER_MEGABYTE / 2) / BYTES_PER_MEGABYTE;
    format!("{megabytes} MB")
}

/// Format a duration as whole seconds, rounding to nearest: `"42 seconds"`.
pub fn format_seconds(duration: Duration) -> String {
    format!("{} seconds", duration.as_secs_f64().round() as u64)
}
