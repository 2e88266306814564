//! Live snapshot provider backed by sysinfo
//!
//! Supplies point-in-time host facts to the engine. Categories the platform
//! cannot read (no sensors, no counters) return empty reading lists, which
//! the sampler treats as "unavailable for this iteration".

use advisor_lib::sampler::SnapshotProvider;
use advisor_lib::{HardwareFacts, MetricCategory, MetricReading, UtilizationSnapshot};
use anyhow::Result;
use async_trait::async_trait;
use std::collections::BTreeSet;
use sysinfo::{Components, Disks, Networks, System};
use tokio::sync::Mutex;

const BYTES_PER_GIB: f64 = 1024.0 * 1024.0 * 1024.0;
const BYTES_PER_MIB: f64 = 1024.0 * 1024.0;
const BYTES_PER_KIB: f64 = 1024.0;

/// Snapshot provider reading live host state through sysinfo
pub struct LiveProvider {
    system: Mutex<System>,
    components: Mutex<Components>,
    disks: Mutex<Disks>,
    networks: Mutex<Networks>,
}

impl LiveProvider {
    pub fn new() -> Self {
        let mut system = System::new_all();
        system.refresh_all();
        Self {
            system: Mutex::new(system),
            components: Mutex::new(Components::new_with_refreshed_list()),
            disks: Mutex::new(Disks::new_with_refreshed_list()),
            networks: Mutex::new(Networks::new_with_refreshed_list()),
        }
    }

    async fn cpu_readings(&self) -> Vec<MetricReading> {
        let mut sys = self.system.lock().await;
        sys.refresh_cpu_usage();

        let mut readings = vec![MetricReading::new(
            "Load",
            sys.global_cpu_usage() as f64,
            "%",
        )];
        if let Some(max_freq) = sys.cpus().iter().map(|c| c.frequency()).max() {
            readings.push(MetricReading::new("ClockMHz", max_freq as f64, "MHz"));
        }
        readings
    }

    async fn memory_readings(&self) -> Vec<MetricReading> {
        let mut sys = self.system.lock().await;
        sys.refresh_memory();

        vec![
            MetricReading::new(
                "AvailableMB",
                sys.available_memory() as f64 / BYTES_PER_MIB,
                "MB",
            ),
            MetricReading::new("UsedMB", sys.used_memory() as f64 / BYTES_PER_MIB, "MB"),
        ]
    }

    async fn disk_readings(&self) -> Vec<MetricReading> {
        let mut disks = self.disks.lock().await;
        disks.refresh(false);

        // Byte counts are deltas since the previous refresh, so each poll
        // reports per-interval I/O.
        let mut read_bytes = 0u64;
        let mut written_bytes = 0u64;
        let mut available = 0u64;
        for disk in disks.iter() {
            let usage = disk.usage();
            read_bytes += usage.read_bytes;
            written_bytes += usage.written_bytes;
            available += disk.available_space();
        }

        vec![
            MetricReading::new("ReadMB", read_bytes as f64 / BYTES_PER_MIB, "MB"),
            MetricReading::new("WriteMB", written_bytes as f64 / BYTES_PER_MIB, "MB"),
            MetricReading::new("AvailableGB", available as f64 / BYTES_PER_GIB, "GB"),
        ]
    }

    async fn network_readings(&self) -> Vec<MetricReading> {
        let mut networks = self.networks.lock().await;
        networks.refresh(false);

        let mut received = 0u64;
        let mut transmitted = 0u64;
        for (_name, data) in networks.iter() {
            received += data.received();
            transmitted += data.transmitted();
        }

        vec![
            MetricReading::new("RxKB", received as f64 / BYTES_PER_KIB, "KB"),
            MetricReading::new("TxKB", transmitted as f64 / BYTES_PER_KIB, "KB"),
        ]
    }

    async fn thermal_readings(&self) -> Vec<MetricReading> {
        let mut components = self.components.lock().await;
        components.refresh(false);

        components
            .iter()
            .filter_map(|c| {
                c.temperature().map(|t| {
                    MetricReading::new(
                        format!("{}.C", c.label().replace(' ', "")),
                        t as f64,
                        "C",
                    )
                })
            })
            .collect()
    }
}

impl Default for LiveProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SnapshotProvider for LiveProvider {
    async fn query_category(&self, category: MetricCategory) -> Result<Vec<MetricReading>> {
        match category {
            MetricCategory::Cpu => Ok(self.cpu_readings().await),
            MetricCategory::Memory => Ok(self.memory_readings().await),
            MetricCategory::Disk => Ok(self.disk_readings().await),
            MetricCategory::Network => Ok(self.network_readings().await),
            MetricCategory::Thermal => Ok(self.thermal_readings().await),
            // sysinfo exposes no power draw or battery counters
            MetricCategory::Power => Ok(vec![]),
        }
    }

    async fn running_process_names(&self) -> Result<Vec<String>> {
        let mut sys = self.system.lock().await;
        sys.refresh_all();

        let mut names: Vec<String> = sys
            .processes()
            .values()
            .map(|p| p.name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names.dedup();
        Ok(names)
    }

    async fn installed_software_names(&self) -> Result<Vec<String>> {
        // No portable registry of installed software; running processes carry
        // the classification load on their own.
        Ok(vec![])
    }

    async fn hardware_facts(&self) -> Result<HardwareFacts> {
        let sys = self.system.lock().await;

        Ok(HardwareFacts {
            cpu_cores: sys.physical_core_count().map(|c| c as u32),
            cpu_threads: Some(sys.cpus().len() as u32),
            cpu_max_clock_mhz: sys.cpus().iter().map(|c| c.frequency() as u32).max(),
            // sysinfo exposes no GPU facts
            has_dedicated_gpu: None,
            total_ram_gb: Some(sys.total_memory() as f64 / BYTES_PER_GIB),
            bottlenecks: BTreeSet::new(),
        })
    }

    async fn utilization(&self) -> Result<UtilizationSnapshot> {
        let peak_thermal = {
            let mut components = self.components.lock().await;
            components.refresh(false);
            components
                .iter()
                .filter_map(|c| c.temperature())
                .map(f64::from)
                .fold(None, |max: Option<f64>, t| {
                    Some(max.map_or(t, |m| m.max(t)))
                })
        };

        let mut sys = self.system.lock().await;
        sys.refresh_cpu_usage();
        sys.refresh_memory();

        let total = sys.total_memory() as f64;
        let memory_available_percent = if total > 0.0 {
            sys.available_memory() as f64 / total * 100.0
        } else {
            0.0
        };

        Ok(UtilizationSnapshot {
            cpu_utilization_percent: sys.global_cpu_usage() as f64,
            memory_available_percent,
            peak_thermal_celsius: peak_thermal,
        })
    }
}
