use super::disk::{disk_count, MappedDisk};
use super::sku::VmSize;
use super::spec::VmSpec;

/// Everything the pipeline derives for one inventory row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectedSku {
    pub vm_size: Option<VmSize>,
    pub premium_disks: Vec<MappedDisk>,
    pub standard_disks: Vec<MappedDisk>,
    pub compute_hour_rate: f64,
    pub compute_monthly_cost: f64,
    pub premium_disk_monthly_cost: f64,
    pub standard_disk_monthly_cost: f64,
    pub total_monthly_cost: f64,
    pub monthly_margin: f64,
    pub mapped_by_override: bool,
    pub no_map_found: bool,
    pub comment: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MappingResult {
    pub spec: VmSpec,
    pub projected: ProjectedSku,
}

impl MappingResult {
    pub fn new(spec: VmSpec) -> Self {
        Self {
            spec,
            projected: ProjectedSku::default(),
        }
    }

    /// Mapped disks less the OS disk, never negative.
    pub fn data_disk_count(&self) -> u32 {
        let total = disk_count(&self.projected.premium_disks)
            .saturating_add(disk_count(&self.projected.standard_disks));
        total.saturating_sub(1)
    }

    pub fn has_premium_disks(&self) -> bool {
        !self.projected.premium_disks.is_empty()
    }
}
