//! System stats snapshots and the `sysinfo` backed sampler.

use chrono::{DateTime, Local};
use std::collections::VecDeque;
use std::path::Path;
use sysinfo::{Components, Disks, Networks, ProcessesToUpdate, System};

pub const HISTORY_LEN: usize = 60;
pub const TOP_PROCESSES: usize = 3;
const PROCESS_NAME_LEN: usize = 25;
const MIN_PROCESS_PERCENT: f32 = 0.1;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryStats {
    pub percent: f32,
    pub used: u64,
    pub total: u64,
    pub available: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DiskStats {
    pub percent: f32,
    pub used: u64,
    pub total: u64,
    pub free: u64,
}

impl Default for DiskStats {
    fn default() -> Self {
        Self {
            percent: 0.0,
            used: 0,
            total: 1,
            free: 1,
        }
    }
}

/// Cumulative interface counters since boot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NetworkStats {
    pub bytes_sent: u64,
    pub bytes_recv: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProcessUsage {
    pub name: String,
    pub cpu_percent: f32,
    pub memory_percent: f32,
}

/// One poll worth of metrics. Replaced wholesale on every sample.
#[derive(Debug, Clone, PartialEq)]
pub struct StatsSnapshot {
    pub taken_at: DateTime<Local>,
    pub cpu_percent: f32,
    pub memory: MemoryStats,
    pub disk: DiskStats,
    pub network: NetworkStats,
    /// `None` when no suitable sensor exists.
    pub temperature: Option<f32>,
    pub top_cpu: Vec<ProcessUsage>,
    pub top_memory: Vec<ProcessUsage>,
    pub cpu_history: Vec<f32>,
    pub memory_history: Vec<f32>,
}

impl Default for StatsSnapshot {
    fn default() -> Self {
        Self {
            taken_at: Local::now(),
            cpu_percent: 0.0,
            memory: MemoryStats::default(),
            disk: DiskStats::default(),
            network: NetworkStats::default(),
            temperature: None,
            top_cpu: Vec::new(),
            top_memory: Vec::new(),
            cpu_history: Vec::new(),
            memory_history: Vec::new(),
        }
    }
}

impl StatsSnapshot {
    pub fn temperature_label(&self) -> String {
        match self.temperature {
            Some(t) => format!("{t:.0}°C"),
            None => "N/A".into(),
        }
    }
}

/// Anything that can produce a snapshot. Implementations must not fail;
/// sub-readings that cannot be taken degrade to placeholders.
pub trait MetricsSource: Send {
    fn sample(&mut self) -> StatsSnapshot;
}

/// Ring buffers of recent CPU and memory percentages.
#[derive(Debug, Clone)]
pub struct History {
    capacity: usize,
    cpu: VecDeque<f32>,
    memory: VecDeque<f32>,
}

impl History {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            cpu: VecDeque::with_capacity(capacity),
            memory: VecDeque::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, cpu: f32, memory: f32) {
        if self.cpu.len() == self.capacity {
            self.cpu.pop_front();
        }
        if self.memory.len() == self.capacity {
            self.memory.pop_front();
        }
        self.cpu.push_back(cpu);
        self.memory.push_back(memory);
    }

    pub fn cpu(&self) -> Vec<f32> {
        self.cpu.iter().copied().collect()
    }

    pub fn memory(&self) -> Vec<f32> {
        self.memory.iter().copied().collect()
    }
}

fn percent(part: u64, total: u64) -> f32 {
    if total == 0 {
        0.0
    } else {
        (part as f64 / total as f64 * 100.0) as f32
    }
}

fn is_ignored_process(name: &str) -> bool {
    name.is_empty() || name.contains("Idle") || name == "System" || name == "[kernel_task]"
}

fn truncate_name(name: &str) -> String {
    name.chars().take(PROCESS_NAME_LEN).collect()
}

/// Top entries by `key`, dropping anything at or below the noise floor.
pub fn top_by<F>(processes: &[ProcessUsage], key: F) -> Vec<ProcessUsage>
where
    F: Fn(&ProcessUsage) -> f32,
{
    let mut candidates: Vec<&ProcessUsage> = processes
        .iter()
        .filter(|p| key(p) > MIN_PROCESS_PERCENT)
        .collect();
    candidates.sort_by(|a, b| {
        key(b)
            .partial_cmp(&key(a))
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    candidates
        .into_iter()
        .take(TOP_PROCESSES)
        .cloned()
        .collect()
}

/// Human readable byte count, one decimal place.
pub fn format_bytes(bytes: u64) -> String {
    if bytes == 0 {
        return "0 B".into();
    }
    let mut value = bytes as f64;
    for unit in ["B", "KB", "MB", "GB", "TB"] {
        if value < 1024.0 {
            return format!("{value:.1} {unit}");
        }
        value /= 1024.0;
    }
    format!("{value:.1} PB")
}

fn cpu_sensor_label(label: &str) -> bool {
    let label = label.to_lowercase();
    ["cpu", "package", "core", "tctl", "tdie"]
        .iter()
        .any(|needle| label.contains(needle))
}

/// Sampler backed by `sysinfo`.
///
/// CPU usage comes from the difference between two successive counter
/// refreshes, so construction performs one priming refresh.
pub struct SysinfoSource {
    system: System,
    history: History,
    num_cores: usize,
}

impl SysinfoSource {
    pub fn new() -> Self {
        let mut system = System::new();
        system.refresh_cpu_usage();
        system.refresh_memory();
        let num_cores = system.cpus().len().max(1);
        Self {
            system,
            history: History::new(HISTORY_LEN),
            num_cores,
        }
    }

    fn memory(&self) -> MemoryStats {
        let total = self.system.total_memory();
        let used = self.system.used_memory();
        MemoryStats {
            percent: percent(used, total),
            used,
            total,
            available: self.system.available_memory(),
        }
    }

    fn disk() -> DiskStats {
        let disks = Disks::new_with_refreshed_list();
        let root = if cfg!(windows) { Path::new("C:\\") } else { Path::new("/") };
        let (total, free) = match disks.list().iter().find(|d| d.mount_point() == root) {
            Some(disk) => (disk.total_space(), disk.available_space()),
            None => disks.list().iter().fold((0u64, 0u64), |(t, f), d| {
                (t + d.total_space(), f + d.available_space())
            }),
        };
        if total == 0 {
            tracing::debug!("no disk usage available; reporting placeholder");
            return DiskStats::default();
        }
        let used = total.saturating_sub(free);
        DiskStats {
            percent: percent(used, total),
            used,
            total,
            free,
        }
    }

    fn network() -> NetworkStats {
        let networks = Networks::new_with_refreshed_list();
        let mut stats = NetworkStats::default();
        for (_name, data) in networks.iter() {
            stats.bytes_recv = stats.bytes_recv.saturating_add(data.total_received());
            stats.bytes_sent = stats.bytes_sent.saturating_add(data.total_transmitted());
        }
        stats
    }

    fn temperature() -> Option<f32> {
        let components = Components::new_with_refreshed_list();
        components
            .iter()
            .filter(|c| cpu_sensor_label(c.label()))
            .find_map(|c| {
                let reading: Option<f32> = c.temperature().into();
                reading.filter(|t| t.is_finite() && *t > 0.0)
            })
    }

    fn processes(&mut self) -> Vec<ProcessUsage> {
        self.system.refresh_processes(ProcessesToUpdate::All, true);
        let total_memory = self.system.total_memory();
        let cores = self.num_cores as f32;
        self.system
            .processes()
            .values()
            .filter_map(|process| {
                let name = process.name().to_string_lossy();
                if is_ignored_process(&name) {
                    return None;
                }
                Some(ProcessUsage {
                    name: truncate_name(&name),
                    cpu_percent: process.cpu_usage() / cores,
                    memory_percent: percent(process.memory(), total_memory),
                })
            })
            .collect()
    }
}

impl Default for SysinfoSource {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsSource for SysinfoSource {
    fn sample(&mut self) -> StatsSnapshot {
        self.system.refresh_cpu_usage();
        self.system.refresh_memory();
        let cpu_percent = self.system.global_cpu_usage();
        let memory = self.memory();
        let processes = self.processes();
        self.history.push(cpu_percent, memory.percent);
        StatsSnapshot {
            taken_at: Local::now(),
            cpu_percent,
            memory,
            disk: Self::disk(),
            network: Self::network(),
            temperature: Self::temperature(),
            top_cpu: top_by(&processes, |p| p.cpu_percent),
            top_memory: top_by(&processes, |p| p.memory_percent),
            cpu_history: self.history.cpu(),
            memory_history: self.history.memory(),
        }
    }
}
