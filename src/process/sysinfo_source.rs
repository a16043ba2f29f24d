// Process table via sysinfo; counters from /proc/<pid>/io on Linux, sysinfo disk usage elsewhere.

use super::{ProcessKey, ProcessMetadata, ProcessSource};
use crate::error::ProcessQueryError;
use crate::models::RawCounterSnapshot;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};
use std::time::Instant;
use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, System, UpdateKind};

pub struct SysinfoProcessSource {
    sys: Mutex<System>,
    #[cfg_attr(not(target_os = "linux"), allow(dead_code))]
    proc_root: PathBuf,
}

impl Default for SysinfoProcessSource {
    fn default() -> Self {
        Self::new("/proc")
    }
}

impl SysinfoProcessSource {
    pub fn new(proc_root: impl Into<PathBuf>) -> Self {
        Self {
            sys: Mutex::new(System::new()),
            proc_root: proc_root.into(),
        }
    }

    fn sys(&self) -> std::io::Result<MutexGuard<'_, System>> {
        self.sys
            .lock()
            .map_err(|e| std::io::Error::other(format!("sysinfo lock poisoned: {}", e)))
    }

    fn refresh_kind() -> ProcessRefreshKind {
        let kind = ProcessRefreshKind::nothing().with_exe(UpdateKind::OnlyIfNotSet);
        // /proc/<pid>/io is read directly on Linux so permission errors stay visible.
        #[cfg(not(target_os = "linux"))]
        let kind = kind.with_disk_usage();
        kind
    }
}

impl ProcessSource for SysinfoProcessSource {
    fn enumerate(&self) -> std::io::Result<Vec<ProcessKey>> {
        let mut sys = self.sys()?;
        sys.refresh_processes_specifics(ProcessesToUpdate::All, true, Self::refresh_kind());
        Ok(sys
            .processes()
            .iter()
            .map(|(pid, process)| ProcessKey {
                pid: pid.as_u32(),
                start_time: process.start_time(),
            })
            .collect())
    }

    #[cfg(target_os = "linux")]
    fn io_counters(&self, pid: u32) -> Result<RawCounterSnapshot, ProcessQueryError> {
        let path = self.proc_root.join(pid.to_string()).join("io");
        let content =
            std::fs::read_to_string(&path).map_err(|e| ProcessQueryError::from_io(pid, &e))?;
        let now = Instant::now();
        let io = crate::linux::parse_proc_io(&content).ok_or_else(|| {
            ProcessQueryError::Unavailable {
                pid,
                reason: format!("malformed {}", path.display()),
            }
        })?;
        Ok(RawCounterSnapshot::new(
            now,
            io.read_bytes,
            io.write_bytes,
            io.syscr,
            io.syscw,
        ))
    }

    #[cfg(not(target_os = "linux"))]
    fn io_counters(&self, pid: u32) -> Result<RawCounterSnapshot, ProcessQueryError> {
        let sys = self.sys().map_err(|e| ProcessQueryError::Unavailable {
            pid,
            reason: e.to_string(),
        })?;
        let process = sys
            .process(Pid::from_u32(pid))
            .ok_or(ProcessQueryError::Exited(pid))?;
        let usage = process.disk_usage();
        Ok(RawCounterSnapshot::new(
            Instant::now(),
            usage.total_read_bytes,
            usage.total_written_bytes,
            0,
            0,
        ))
    }

    fn metadata(&self, pid: u32) -> Option<ProcessMetadata> {
        let sys = self.sys().ok()?;
        let process = sys.process(Pid::from_u32(pid))?;
        Some(ProcessMetadata {
            name: Some(process.name().to_string_lossy().into_owned()),
            icon_ref: process.exe().map(|p| p.display().to_string()),
        })
    }
}
