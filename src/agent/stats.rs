use procfs::prelude::*;
use procfs::{CpuInfo, LoadAverage, Meminfo};

use crate::cluster::{MemberTelemetry, SpaceUsage, StoragePool, StoragePools};

#[derive(Debug)]
pub enum Error {
    ProcRead(procfs::ProcError),
}

impl From<procfs::ProcError> for Error {
    fn from(e: procfs::ProcError) -> Self {
        Error::ProcRead(e)
    }
}

type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, Copy)]
pub struct DiskSpace {
    pub total: u64,
    pub free: u64,
}

impl From<&sysinfo::Disk> for DiskSpace {
    fn from(disk: &sysinfo::Disk) -> Self {
        DiskSpace {
            total: disk.total_space(),
            free: disk.available_space(),
        }
    }
}

/// Reads a telemetry snapshot for this node: RAM from /proc/meminfo (procfs
/// already converts the kB fields to bytes), core count from /proc/cpuinfo,
/// the load triple from /proc/loadavg, and every mounted disk summed into
/// the `local` storage pool.
pub fn collect(server_name: &str) -> Result<MemberTelemetry> {
    let mem = Meminfo::from_file("/proc/meminfo")?;
    let cpu_info = CpuInfo::from_file("/proc/cpuinfo")?;
    let load = LoadAverage::from_file("/proc/loadavg")?;

    let disks = sysinfo::Disks::new_with_refreshed_list();
    let disks: Vec<DiskSpace> = disks.iter().map(|d| d.into()).collect();

    Ok(MemberTelemetry {
        server_name: server_name.to_string(),
        total_ram: mem.mem_total,
        free_ram: mem.mem_free,
        load_averages: vec![load.one as f64, load.five as f64, load.fifteen as f64],
        logical_cpus: cpu_info.num_cores() as u32,
        storage_pools: Some(StoragePools {
            local: Some(StoragePool {
                space: Some(local_pool(&disks)),
            }),
        }),
    })
}

fn local_pool(disks: &[DiskSpace]) -> SpaceUsage {
    let total: u64 = disks.iter().map(|d| d.total).sum();
    let free: u64 = disks.iter().map(|d| d.free).sum();
    SpaceUsage {
        total,
        used: total.saturating_sub(free),
    }
}
