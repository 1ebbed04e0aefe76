//! Process and host resource sampling for the health endpoints.

use std::sync::Mutex;
use std::time::Instant;

use serde::Serialize;
use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, System};

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Bytes to megabytes, rounded to two decimals.
pub fn to_mb(bytes: u64) -> f64 {
    round2(bytes as f64 / BYTES_PER_MB)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Memory held by this process, in MB.
///
/// The process has no managed heap, so the basic view reports resident and virtual
/// size in its place; the detailed view adds host totals in [`SystemMemory`].
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct MemoryUsage {
    pub resident: f64,
    #[serde(rename = "virtual")]
    pub virtual_size: f64,
}

/// Process memory plus host totals, in MB.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SystemMemory {
    pub resident: f64,
    #[serde(rename = "virtual")]
    pub virtual_size: f64,
    pub host_total: f64,
    pub host_used: f64,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct CpuUsage {
    /// Percent of one core since the previous sample; 0 on the first sample.
    pub usage: f64,
    pub cores: usize,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ResourceSample {
    pub resident_bytes: u64,
    pub virtual_bytes: u64,
    pub cpu_percent: f32,
    pub host_total_bytes: u64,
    pub host_used_bytes: u64,
}

impl ResourceSample {
    pub fn memory(&self) -> MemoryUsage {
        MemoryUsage {
            resident: to_mb(self.resident_bytes),
            virtual_size: to_mb(self.virtual_bytes),
        }
    }

    pub fn system_memory(&self) -> SystemMemory {
        SystemMemory {
            resident: to_mb(self.resident_bytes),
            virtual_size: to_mb(self.virtual_bytes),
            host_total: to_mb(self.host_total_bytes),
            host_used: to_mb(self.host_used_bytes),
        }
    }

    pub fn cpu(&self) -> CpuUsage {
        CpuUsage {
            usage: round2(f64::from(self.cpu_percent)),
            cores: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
        }
    }
}

/// Process-scoped handle that owns the start instant and the `sysinfo` sampler.
pub struct HealthMonitor {
    started_at: Instant,
    pid: Option<Pid>,
    system: Mutex<System>,
}

impl HealthMonitor {
    pub fn new() -> Self {
        Self {
            started_at: Instant::now(),
            pid: sysinfo::get_current_pid().ok(),
            system: Mutex::new(System::new()),
        }
    }

    /// Seconds since the monitor was created, i.e. since server start.
    pub fn uptime(&self) -> f64 {
        round2(self.started_at.elapsed().as_secs_f64())
    }

    pub fn sample(&self) -> ResourceSample {
        // A poisoned sampler still holds valid counters.
        let mut system = self
            .system
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        system.refresh_memory();
        let mut sample = ResourceSample {
            host_total_bytes: system.total_memory(),
            host_used_bytes: system.used_memory(),
            ..ResourceSample::default()
        };

        if let Some(pid) = self.pid {
            system.refresh_processes_specifics(
                ProcessesToUpdate::Some(&[pid]),
                true,
                ProcessRefreshKind::nothing().with_memory().with_cpu(),
            );
            if let Some(process) = system.process(pid) {
                sample.resident_bytes = process.memory();
                sample.virtual_bytes = process.virtual_memory();
                sample.cpu_percent = process.cpu_usage();
            }
        }

        sample
    }
}

impl Default for HealthMonitor {
    fn default() -> Self {
        Self::new()
    }
}
