// src/model/disk.rs

/// A managed disk size as offered by the cloud, keyed in the rate card by `meter_name`.
#[derive(Debug, PartialEq, Eq)]
pub struct ManagedDisk {
    pub display_name: &'static str,
    pub meter_name: &'static str,
    pub size_gb: u32,
}

impl ManagedDisk {
    const fn new(display_name: &'static str, meter_name: &'static str, size_gb: u32) -> Self {
        Self {
            display_name,
            meter_name,
            size_gb,
        }
    }
}

/// SSD-backed disks, ascending by size.
pub static PREMIUM_DISKS: [ManagedDisk; 7] = [
    ManagedDisk::new("P4", "Premium Storage - Page Blob/P4 (Units)", 32),
    ManagedDisk::new("P6", "Premium Storage - Page Blob/P6 (Units)", 64),
    ManagedDisk::new("P10", "Premium Storage - Page Blob/P10 (Units)", 128),
    ManagedDisk::new("P20", "Premium Storage - Page Blob/P20 (Units)", 512),
    ManagedDisk::new("P30", "Premium Storage - Page Blob/P30 (Units)", 1024),
    ManagedDisk::new("P40", "Premium Storage - Page Blob/P40 (Units)", 2048),
    ManagedDisk::new("P50", "Premium Storage - Page Blob/P50 (Units)", 4095),
];

/// HDD-backed disks, ascending by size.
pub static STANDARD_DISKS: [ManagedDisk; 7] = [
    ManagedDisk::new("S4", "Standard Managed Disk/S4 (Units)", 32),
    ManagedDisk::new("S6", "Standard Managed Disk/S6 (Units)", 64),
    ManagedDisk::new("S10", "Standard Managed Disk/S10 (Units)", 128),
    ManagedDisk::new("S20", "Standard Managed Disk/S20 (Units)", 512),
    ManagedDisk::new("S30", "Standard Managed Disk/S30 (Units)", 1024),
    ManagedDisk::new("S40", "Standard Managed Disk/S40 (Units)", 2048),
    ManagedDisk::new("S50", "Standard Managed Disk/S50 (Units)", 4095),
];

/// Case-insensitive lookup of a disk by display name (e.g. `"p10"`).
pub fn find_disk(catalog: &'static [ManagedDisk], display_name: &str) -> Option<&'static ManagedDisk> {
    catalog
        .iter()
        .find(|d| d.display_name.eq_ignore_ascii_case(display_name.trim()))
}

/// One row of a packing result: `count` disks of the same size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MappedDisk {
    pub disk: &'static ManagedDisk,
    pub count: u32,
}

/// Total number of disks across all rows, saturating at `u32::MAX`.
pub fn disk_count(disks: &[MappedDisk]) -> u32 {
    disks.iter().fold(0u32, |acc, d| acc.saturating_add(d.count))
}

/// Render as `"2 x P30; 1 x P4"`.
pub fn disk_list_str(disks: &[MappedDisk]) -> String {
    let mut out = String::new();
    for d in disks {
        out.push_str(&format!("{} x {}; ", d.count, d.disk.display_name));
    }
    if out.len() > 2 && out.ends_with("; ") {
        out.truncate(out.len() - 2);
    }
    out
}
