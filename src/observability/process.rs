//! Process memory sampling.

/// Resident and virtual memory of the current process, in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryUsage {
    pub resident_bytes: u64,
    pub virtual_bytes: u64,
}

impl MemoryUsage {
    pub fn resident_mb(&self) -> u64 {
        self.resident_bytes / 1024 / 1024
    }

    pub fn virtual_mb(&self) -> u64 {
        self.virtual_bytes / 1024 / 1024
    }
}

const PAGE_SIZE: u64 = 4096;

/// Sample memory usage. `None` where the platform exposes no cheap source.
#[cfg(target_os = "linux")]
pub fn memory_usage() -> Option<MemoryUsage> {
    let statm = std::fs::read_to_string("/proc/self/statm").ok()?;
    parse_statm(&statm)
}

#[cfg(not(target_os = "linux"))]
pub fn memory_usage() -> Option<MemoryUsage> {
    None
}

/// `/proc/self/statm`: size resident shared text lib data dt, in pages.
fn parse_statm(statm: &str) -> Option<MemoryUsage> {
    let mut fields = statm.split_whitespace();
    let size: u64 = fields.next()?.parse().ok()?;
    let resident: u64 = fields.next()?.parse().ok()?;
    Some(MemoryUsage {
        resident_bytes: resident * PAGE_SIZE,
        virtual_bytes: size * PAGE_SIZE,
    })
}
