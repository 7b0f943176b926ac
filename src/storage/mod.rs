// src/storage/mod.rs
use crate::model::disk::{find_disk, ManagedDisk, MappedDisk, PREMIUM_DISKS, STANDARD_DISKS};
use crate::model::MappingResult;
use tracing::trace;

/// Largest capacity, per storage class, that packs into fewer than
/// `u32::MAX` disks on any path.
pub const MAX_STORAGE_GB: f64 = 4095.0 * (1u64 << 30) as f64;

/// Once the walk has descended this many sizes, every further size it
/// touches takes one unit rounded up.
const ROUND_UP_DEPTH: u32 = 2;

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
#[error("OS disk '{name}' is not in the {catalog} disk catalog")]
pub struct UnknownOsDisk {
    pub name: String,
    pub catalog: &'static str,
}

/// Pack `capacity_gb` onto sizes from `catalog` (ascending).
///
/// With `disk_count == 0` the walk goes largest-first, filling greedily and
/// then rounding up at the second size level. With an explicit count every
/// disk gets the smallest size holding an equal share of the capacity.
pub fn pack_disks(
    catalog: &'static [ManagedDisk],
    capacity_gb: f64,
    disk_count: u32,
) -> Vec<MappedDisk> {
    let mut mapped = Vec::new();
    if catalog.is_empty() {
        return mapped;
    }

    if disk_count == 0 {
        let mut remaining = capacity_gb;
        let mut depth = 1;
        for disk in catalog.iter().rev() {
            if remaining <= 0.0 {
                break;
            }
            let size = f64::from(disk.size_gb);
            let mut count: u32 = 0;
            if remaining >= size {
                let mut whole = (remaining / size).floor();
                if whole * size > remaining {
                    whole -= 1.0;
                }
                remaining -= whole * size;
                count = whole as u32;
                if depth >= ROUND_UP_DEPTH {
                    remaining -= size;
                    count = count.saturating_add(1);
                } else {
                    depth += 1;
                }
            } else if depth >= ROUND_UP_DEPTH {
                remaining -= size;
                count += 1;
            }
            if count > 0 {
                mapped.push(MappedDisk { disk, count });
            }
        }
    } else {
        let share = capacity_gb / f64::from(disk_count);
        let last = catalog.len() - 1;
        if let Some((_, disk)) = catalog
            .iter()
            .enumerate()
            .find(|(i, d)| f64::from(d.size_gb) >= share || *i == last)
        {
            let count = (capacity_gb / f64::from(disk.size_gb)).ceil() as u32;
            mapped.push(MappedDisk { disk, count });
        }
    }
    mapped
}

/// Add one OS disk, merging into an existing row of the same size.
pub fn add_os_disk(disks: &mut Vec<MappedDisk>, os_disk: &'static ManagedDisk) {
    match disks.iter_mut().find(|d| d.disk.size_gb == os_disk.size_gb) {
        Some(row) => row.count = row.count.saturating_add(1),
        None => disks.push(MappedDisk {
            disk: os_disk,
            count: 1,
        }),
    }
}

/// Fill the premium/standard disk lists of `result` from its spec.
/// The OS disk lands on premium storage whenever SSD capacity was requested.
pub fn map_storage(
    result: &mut MappingResult,
    os_disk_ssd: &str,
    os_disk_hdd: &str,
) -> Result<(), UnknownOsDisk> {
    let spec = &result.spec.value;
    let os_premium = spec.ssd_storage_gb > 0.0;

    let mut premium = Vec::new();
    let mut standard = Vec::new();
    if spec.ssd_storage_gb > 0.0 {
        premium = pack_disks(&PREMIUM_DISKS, spec.ssd_storage_gb, spec.ssd_disk_count);
    }
    if spec.hdd_storage_gb > 0.0 {
        standard = pack_disks(&STANDARD_DISKS, spec.hdd_storage_gb, spec.hdd_disk_count);
    }

    if os_premium {
        let os_disk = find_disk(&PREMIUM_DISKS, os_disk_ssd).ok_or_else(|| UnknownOsDisk {
            name: os_disk_ssd.to_string(),
            catalog: "premium",
        })?;
        add_os_disk(&mut premium, os_disk);
    } else {
        let os_disk = find_disk(&STANDARD_DISKS, os_disk_hdd).ok_or_else(|| UnknownOsDisk {
            name: os_disk_hdd.to_string(),
            catalog: "standard",
        })?;
        add_os_disk(&mut standard, os_disk);
    }

    trace!(
        instance = %spec.instance_name,
        premium = premium.len(),
        standard = standard.len(),
        "storage mapped"
    );
    result.projected.premium_disks = premium;
    result.projected.standard_disks = standard;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::disk::{disk_count, disk_list_str};
    use crate::model::VmSpec;

    fn total_gb(disks: &[MappedDisk]) -> u32 {
        disks.iter().map(|d| d.disk.size_gb * d.count).sum()
    }

    #[test]
    fn packs_1500_gb_in_two_tiers() {
        let disks = pack_disks(&STANDARD_DISKS, 1500.0, 0);
        assert_eq!(disk_list_str(&disks), "1 x S30; 1 x S20");
        assert!(disks.len() <= 2);
        assert!(total_gb(&disks) >= 1500);
    }

    #[test]
    fn small_capacity_rounds_up_after_second_level() {
        // P6 is the first size that fits; P4 then takes the remainder plus one.
        let disks = pack_disks(&PREMIUM_DISKS, 100.0, 0);
        assert_eq!(disk_list_str(&disks), "1 x P6; 2 x P4");
        assert!(total_gb(&disks) >= 100);

        let disks = pack_disks(&PREMIUM_DISKS, 4095.0, 0);
        assert_eq!(disk_list_str(&disks), "1 x P50");

        let disks = pack_disks(&PREMIUM_DISKS, 5000.0, 0);
        assert_eq!(disk_list_str(&disks), "1 x P50; 1 x P40");
        assert!(total_gb(&disks) >= 5000);
    }

    #[test]
    fn explicit_count_uses_smallest_fitting_size() {
        let disks = pack_disks(&STANDARD_DISKS, 300.0, 3);
        assert_eq!(disks.len(), 1);
        assert_eq!(disks[0].disk.display_name, "S10");
        assert_eq!(disks[0].count, 3);

        let disks = pack_disks(&STANDARD_DISKS, 1500.0, 2);
        assert_eq!(disk_list_str(&disks), "2 x S30");
    }

    #[test]
    fn explicit_count_beyond_largest_size_uses_largest() {
        let disks = pack_disks(&PREMIUM_DISKS, 10000.0, 1);
        assert_eq!(disk_list_str(&disks), "3 x P50");
    }

    #[test]
    fn largest_accepted_capacity_counts_without_overflow() {
        let disks = pack_disks(&PREMIUM_DISKS, MAX_STORAGE_GB, 0);
        assert_eq!(disks[0].disk.display_name, "P50");
        assert_eq!(disks.len(), 1);
        assert_eq!(disks[0].count, 1 << 30);

        let disks = pack_disks(&STANDARD_DISKS, MAX_STORAGE_GB, 1);
        assert_eq!(disk_list_str(&disks), format!("{} x S50", 1u32 << 30));
    }

    #[test]
    fn huge_storage_maps_without_panicking() -> anyhow::Result<()> {
        let mut spec = VmSpec::default();
        spec.value.ssd_storage_gb = MAX_STORAGE_GB;
        spec.value.ssd_disk_count = 1;
        spec.value.hdd_storage_gb = MAX_STORAGE_GB;
        let mut result = MappingResult::new(spec);
        map_storage(&mut result, "P4", "S4")?;
        assert_eq!(
            disk_count(&result.projected.premium_disks),
            (1 << 30) + 1
        );
        assert_eq!(result.data_disk_count(), 1 << 31);
        Ok(())
    }

    #[test]
    fn os_disk_merges_into_matching_row() {
        let mut disks = vec![MappedDisk {
            disk: &STANDARD_DISKS[0],
            count: 2,
        }];
        add_os_disk(&mut disks, &STANDARD_DISKS[0]);
        assert_eq!(disk_list_str(&disks), "3 x S4");

        add_os_disk(&mut disks, &STANDARD_DISKS[2]);
        assert_eq!(disk_list_str(&disks), "3 x S4; 1 x S10");
    }

    #[test]
    fn os_disk_follows_ssd_capacity() -> anyhow::Result<()> {
        let mut spec = VmSpec::default();
        spec.value.ssd_storage_gb = 200.0;
        spec.value.hdd_storage_gb = 1500.0;
        spec.value.hdd_disk_count = 2;
        let mut result = MappingResult::new(spec);
        map_storage(&mut result, "P4", "S4")?;
        assert_eq!(disk_list_str(&result.projected.premium_disks), "1 x P10; 2 x P6; 1 x P4");
        assert_eq!(disk_list_str(&result.projected.standard_disks), "2 x S30");
        assert_eq!(disk_count(&result.projected.premium_disks), 4);

        let mut result = MappingResult::new(VmSpec::default());
        map_storage(&mut result, "P4", "s6")?;
        assert!(result.projected.premium_disks.is_empty());
        assert_eq!(disk_list_str(&result.projected.standard_disks), "1 x S6");
        Ok(())
    }

    #[test]
    fn unknown_os_disk_is_an_error() {
        let mut result = MappingResult::new(VmSpec::default());
        let err = map_storage(&mut result, "P4", "Z9").unwrap_err();
        assert_eq!(err.name, "Z9");
        assert_eq!(err.catalog, "standard");
    }
}
