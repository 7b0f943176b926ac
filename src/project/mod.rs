// src/project/mod.rs
pub mod catalog;

use crate::model::{MappingResult, OsFamily, OverrideSpec, VmSize};
use crate::rates::meter::{compute_resource, is_premium_supported};
use crate::rates::RateCalc;
use tracing::{debug, trace};

pub const MAPPED_BY_RECORD_OVERRIDE: &str =
    "Azure VM has been mapped as per override value in input file";
pub const RECORD_OVERRIDE_TOO_FEW_DISKS: &str = "Unable to map as per Override value in input file as number of disks mapped for VM exceed max disk count for the specified Override SKU";
pub const RECORD_OVERRIDE_NOT_FOUND: &str = "Unable to map as per Override value in input file as value specified is not found/valid in the Azure region";
pub const MAPPED_BY_OVERRIDE_FILE: &str = "Azure VM has been mapped as per Override file";
pub const OVERRIDE_FILE_TOO_FEW_DISKS: &str = "Unable to map as per Override file as number of disks mapped for VM exceed max disk count for the specified Override SKU";
pub const OVERRIDE_FILE_NOT_FOUND: &str = "Unable to map as per Override file as value specified is not found/valid in the Azure region";
pub const NO_MAP_FOUND: &str = "No Azure VM SKU found to map the input VM specifications. Check the list of included Azure VM SKUs in options";

/// Read-only inputs shared by every projection in a run.
#[derive(Debug, Clone, Copy)]
pub struct ProjectionContext<'a> {
    /// Pricing region, e.g. `US West`.
    pub region: &'a str,
    pub catalog: &'a [VmSize],
    pub rates: &'a RateCalc,
    pub core_coefficient: f64,
    pub memory_coefficient: f64,
}

struct OverrideComments {
    mapped: &'static str,
    too_few_disks: &'static str,
    not_found: &'static str,
}

const RECORD_OVERRIDE: OverrideComments = OverrideComments {
    mapped: MAPPED_BY_RECORD_OVERRIDE,
    too_few_disks: RECORD_OVERRIDE_TOO_FEW_DISKS,
    not_found: RECORD_OVERRIDE_NOT_FOUND,
};

const FILE_OVERRIDE: OverrideComments = OverrideComments {
    mapped: MAPPED_BY_OVERRIDE_FILE,
    too_few_disks: OVERRIDE_FILE_TOO_FEW_DISKS,
    not_found: OVERRIDE_FILE_NOT_FOUND,
};

impl<'a> ProjectionContext<'a> {
    fn find_sku(&self, name: &str) -> Option<&'a VmSize> {
        let name = name.trim();
        self.catalog.iter().find(|s| s.name.eq_ignore_ascii_case(name))
    }

    /// Compute-hour rate for `sku`; `None` when the region does not price it.
    fn compute_rate(&self, sku: &VmSize, os: OsFamily) -> Option<f64> {
        match self.rates.rate(&compute_resource(&sku.name, os, self.region)) {
            Ok(rate) => Some(rate),
            Err(e) => {
                debug!(sku = %sku.name, error = %e, "series not priced in region");
                None
            }
        }
    }

    /// Try to pin `result` to the named SKU. Returns true when mapped; on
    /// failure the comment explains why and the caller falls through.
    fn apply_override(
        &self,
        result: &mut MappingResult,
        sku_name: &str,
        os: OsFamily,
        data_disks: u32,
        comments: &OverrideComments,
    ) -> bool {
        let projected = &mut result.projected;
        let Some(sku) = self.find_sku(sku_name) else {
            projected.comment = comments.not_found.to_string();
            return false;
        };
        if sku.max_data_disk_count < data_disks {
            projected.comment = comments.too_few_disks.to_string();
            return false;
        }
        let Some(rate) = self.compute_rate(sku, os) else {
            projected.comment = comments.not_found.to_string();
            return false;
        };
        projected.vm_size = Some(sku.clone());
        projected.compute_hour_rate = rate;
        projected.comment = comments.mapped.to_string();
        true
    }
}

fn matches_rule(result: &MappingResult, rule: &OverrideSpec, os: OsFamily, data_disks: u32) -> bool {
    let spec = &result.spec.value;
    let has_ssd = spec.ssd_storage_gb > 0.0;
    rule.is_valid
        && rule.value.cpu_cores == spec.cpu_cores
        && rule.value.memory_mb == spec.memory_mb
        && rule.value.os == Some(os)
        && rule.value.has_ssd_storage == has_ssd
        && rule.value.number_of_data_disks == data_disks
        && !rule.value.azure_vm_override.trim().is_empty()
}

/// Choose a SKU for one valid, storage-mapped result.
///
/// Precedence: the record's own override, then the first matching rule in
/// `overrides`, then the cheapest catalog SKU that covers the scaled cores
/// and memory and supports the mapped disks.
#[tracing::instrument(level = "trace", skip_all, fields(instance = %result.spec.value.instance_name))]
pub fn project(
    result: &mut MappingResult,
    ctx: &ProjectionContext<'_>,
    overrides: Option<&[OverrideSpec]>,
) {
    let data_disks = result.data_disk_count();
    let Some(os) = result.spec.value.os else {
        result.projected.no_map_found = true;
        result.projected.comment = NO_MAP_FOUND.to_string();
        return;
    };

    let record_override = result.spec.value.azure_vm_override.trim().to_string();
    let mut mapped = !record_override.is_empty()
        && ctx.apply_override(result, &record_override, os, data_disks, &RECORD_OVERRIDE);

    if !mapped {
        if let Some(rule) = overrides
            .unwrap_or_default()
            .iter()
            .find(|r| matches_rule(result, r, os, data_disks))
        {
            let sku_name = rule.value.azure_vm_override.trim().to_string();
            mapped = ctx.apply_override(result, &sku_name, os, data_disks, &FILE_OVERRIDE);
        }
    }

    if mapped {
        result.projected.mapped_by_override = true;
        result.projected.no_map_found = false;
        return;
    }

    let wants_premium = result.has_premium_disks();
    let min_cores = ctx.core_coefficient * f64::from(result.spec.value.cpu_cores);
    let min_memory = ctx.memory_coefficient * result.spec.value.memory_mb;

    let mut best: Option<(&VmSize, f64)> = None;
    for sku in ctx.catalog {
        if is_premium_supported(&sku.name) != wants_premium {
            continue;
        }
        if sku.max_data_disk_count < data_disks {
            continue;
        }
        if f64::from(sku.number_of_cores) < min_cores || sku.memory_in_mb < min_memory {
            continue;
        }
        let Some(rate) = ctx.compute_rate(sku, os) else {
            continue;
        };
        if best.map_or(true, |(_, current)| rate < current) {
            best = Some((sku, rate));
        }
    }

    let projected = &mut result.projected;
    projected.mapped_by_override = false;
    match best {
        Some((sku, rate)) => {
            trace!(sku = %sku.name, rate, "best fit");
            projected.vm_size = Some(sku.clone());
            projected.compute_hour_rate = rate;
            projected.no_map_found = false;
        }
        None => {
            projected.vm_size = None;
            projected.compute_hour_rate = 0.0;
            projected.no_map_found = true;
            projected.comment = NO_MAP_FOUND.to_string();
        }
    }
}
