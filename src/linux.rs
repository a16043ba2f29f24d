// Linux-specific helpers: /proc/diskstats, /proc/<pid>/io, /sys block + net attributes.

use std::path::Path;

/// Sector unit used by /proc/diskstats regardless of the device's physical sector size.
pub const DISKSTATS_SECTOR_BYTES: u64 = 512;

/// One line of /proc/diskstats, reduced to the counters we sample.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiskStatLine {
    pub name: String,
    pub reads_completed: u64,
    pub sectors_read: u64,
    pub writes_completed: u64,
    pub sectors_written: u64,
}

impl DiskStatLine {
    pub fn read_bytes(&self) -> u64 {
        self.sectors_read.saturating_mul(DISKSTATS_SECTOR_BYTES)
    }

    pub fn write_bytes(&self) -> u64 {
        self.sectors_written.saturating_mul(DISKSTATS_SECTOR_BYTES)
    }
}

/// Parses /proc/diskstats content. Lines with fewer than the 14 classic fields are skipped.
///
/// Format: major minor name reads r_merged r_sectors r_time writes w_merged w_sectors ...
pub fn parse_diskstats(content: &str) -> Vec<DiskStatLine> {
    content
        .lines()
        .filter_map(|line| {
            let parts: Vec<&str> = line.split_whitespace().collect();
            if parts.len() < 14 {
                return None;
            }
            let field = |idx: usize| parts.get(idx).and_then(|s| s.parse::<u64>().ok());
            Some(DiskStatLine {
                name: parts[2].to_string(),
                reads_completed: field(3)?,
                sectors_read: field(5)?,
                writes_completed: field(7)?,
                sectors_written: field(9)?,
            })
        })
        .collect()
}

/// Virtual block devices that never carry useful hardware counters.
pub fn is_virtual_block_device(name: &str) -> bool {
    name.starts_with("loop") || name.starts_with("ram") || name.starts_with("zram")
}

/// Cumulative counters from /proc/<pid>/io.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProcIo {
    pub read_bytes: u64,
    pub write_bytes: u64,
    pub syscr: u64,
    pub syscw: u64,
}

/// Parses /proc/<pid>/io. `read_bytes` and `write_bytes` are required; syscall counts are not.
pub fn parse_proc_io(content: &str) -> Option<ProcIo> {
    let mut read_bytes = None;
    let mut write_bytes = None;
    let mut syscr = 0;
    let mut syscw = 0;
    for line in content.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let Ok(value) = value.trim().parse::<u64>() else {
            continue;
        };
        match key.trim() {
            "read_bytes" => read_bytes = Some(value),
            "write_bytes" => write_bytes = Some(value),
            "syscr" => syscr = value,
            "syscw" => syscw = value,
            _ => {}
        }
    }
    Some(ProcIo {
        read_bytes: read_bytes?,
        write_bytes: write_bytes?,
        syscr,
        syscw,
    })
}

/// Read a sysfs/procfs attribute, trimmed; `None` if missing or empty.
pub fn read_trimmed(path: &Path) -> Option<String> {
    let v = std::fs::read_to_string(path).ok()?;
    let v = v.trim();
    if v.is_empty() {
        return None;
    }
    Some(v.to_string())
}

/// Read network interface link speed from <sys_root>/class/net/<interface>/speed.
/// Returns speed in bits per second, or 0 if unavailable (virtual links report -1).
pub fn interface_speed(sys_root: &Path, interface_name: &str) -> u64 {
    #[cfg(target_os = "linux")]
    {
        let path = sys_root.join("class/net").join(interface_name).join("speed");
        if let Some(content) = read_trimmed(&path)
            && let Ok(mbps) = content.parse::<i64>()
            && mbps > 0
        {
            return (mbps as u64) * 1_000_000;
        }
    }
    #[cfg(not(target_os = "linux"))]
    let _ = (sys_root, interface_name);
    0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_diskstats_whole_disks_and_partitions() {
        let content = "\
   8       0 sda 1234 0 56789 100 5678 0 98765 200 0 150 300 0 0 0 0
   8       1 sda1 1000 0 50000 80 5000 0 90000 180 0 130 260 0 0 0 0
 259       0 nvme0n1 9999 0 123456 500 8888 0 654321 400 5 1000 2000 0 0 0 0
   7       0 loop0 1 2 3
";
        let disks = parse_diskstats(content);
        assert_eq!(disks.len(), 3);
        assert_eq!(disks[0].name, "sda");
        assert_eq!(disks[0].reads_completed, 1234);
        assert_eq!(disks[0].read_bytes(), 56789 * 512);
        assert_eq!(disks[0].writes_completed, 5678);
        assert_eq!(disks[0].write_bytes(), 98765 * 512);
        assert_eq!(disks[2].name, "nvme0n1");
    }

    #[test]
    fn diskstats_line_with_garbage_counter_is_skipped() {
        let content = "8 0 sda x 0 1 0 1 0 1 0 0 0 0\n8 16 sdb 1 0 1 0 1 0 1 0 0 0 0\n";
        let disks = parse_diskstats(content);
        assert_eq!(disks.len(), 1);
        assert_eq!(disks[0].name, "sdb");
    }

    #[test]
    fn virtual_devices_are_recognised() {
        assert!(is_virtual_block_device("loop3"));
        assert!(is_virtual_block_device("zram0"));
        assert!(is_virtual_block_device("ram1"));
        assert!(!is_virtual_block_device("sda"));
        assert!(!is_virtual_block_device("nvme0n1"));
    }

    #[test]
    fn parses_proc_io() {
        let content = "rchar: 323934931\nwchar: 323929600\nsyscr: 632687\nsyscw: 632675\n\
                       read_bytes: 4096\nwrite_bytes: 323932160\ncancelled_write_bytes: 0\n";
        let io = parse_proc_io(content).unwrap();
        assert_eq!(io.read_bytes, 4096);
        assert_eq!(io.write_bytes, 323932160);
        assert_eq!(io.syscr, 632687);
        assert_eq!(io.syscw, 632675);
    }

    #[test]
    fn proc_io_without_byte_counters_is_none() {
        assert!(parse_proc_io("rchar: 1\nwchar: 2\n").is_none());
        assert!(parse_proc_io("").is_none());
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn interface_speed_reads_mbps_and_ignores_negative() {
        let dir = tempfile::TempDir::new().unwrap();
        let eth = dir.path().join("class/net/eth0");
        let veth = dir.path().join("class/net/veth1");
        std::fs::create_dir_all(&eth).unwrap();
        std::fs::create_dir_all(&veth).unwrap();
        std::fs::write(eth.join("speed"), "1000\n").unwrap();
        std::fs::write(veth.join("speed"), "-1\n").unwrap();
        assert_eq!(interface_speed(dir.path(), "eth0"), 1_000_000_000);
        assert_eq!(interface_speed(dir.path(), "veth1"), 0);
        assert_eq!(interface_speed(dir.path(), "missing"), 0);
    }
}
