// src/overrides/mod.rs
//! Builds the override sheet for the next run: one row per distinct VM
//! signature, carrying the SKU best-fit search picks for it.

use crate::model::{MappingResult, OsFamily, OverrideSpec, OverrideSpecValue, VmSpec, VmSpecValue};
use crate::project::{project, ProjectionContext};
use std::collections::HashSet;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct Signature {
    os: OsFamily,
    cores: u32,
    memory_bits: u64,
    data_disks: u32,
    has_ssd: bool,
}

impl Signature {
    fn of(result: &MappingResult) -> Option<Self> {
        let spec = &result.spec.value;
        Some(Self {
            os: spec.os?,
            cores: spec.cpu_cores,
            memory_bits: spec.memory_mb.to_bits(),
            data_disks: result.data_disk_count(),
            has_ssd: result.has_premium_disks(),
        })
    }
}

/// A copy of `result` stripped of its record override, keeping the same
/// storage composition and mapped disks.
fn without_override(result: &MappingResult) -> MappingResult {
    let v = &result.spec.value;
    let spec = VmSpec {
        raw: Default::default(),
        value: VmSpecValue {
            instance_name: String::new(),
            os: v.os,
            cpu_cores: v.cpu_cores,
            memory_mb: v.memory_mb,
            ssd_storage_gb: v.ssd_storage_gb,
            ssd_disk_count: v.ssd_disk_count,
            hdd_storage_gb: v.hdd_storage_gb,
            hdd_disk_count: v.hdd_disk_count,
            price_per_month: 0.0,
            azure_vm_override: String::new(),
            comments: String::new(),
        },
        is_valid: true,
        validation_message: String::new(),
    };
    let mut synthetic = MappingResult::new(spec);
    synthetic.projected.premium_disks = result.projected.premium_disks.clone();
    synthetic.projected.standard_disks = result.projected.standard_disks.clone();
    synthetic
}

/// Distinct signatures of valid results, first occurrence wins. Results
/// pinned by an override are re-projected without any override so the sheet
/// always records the canonical best fit.
#[tracing::instrument(level = "info", skip_all, fields(results = results.len()))]
pub fn dedupe(results: &[MappingResult], ctx: &ProjectionContext<'_>) -> Vec<OverrideSpec> {
    let mut seen: HashSet<Signature> = HashSet::new();
    let mut out = Vec::new();

    for result in results.iter().filter(|r| r.spec.is_valid) {
        let Some(sig) = Signature::of(result) else {
            continue;
        };
        if !seen.insert(sig) {
            continue;
        }

        let resolved;
        let source = if result.projected.mapped_by_override {
            let mut synthetic = without_override(result);
            project(&mut synthetic, ctx, None);
            debug!(
                instance = %result.spec.value.instance_name,
                sku = ?synthetic.projected.vm_size.as_ref().map(|s| &s.name),
                "re-resolved override-mapped result"
            );
            resolved = synthetic;
            &resolved
        } else {
            result
        };

        let vm = source.projected.vm_size.as_ref();
        out.push(OverrideSpec {
            raw: Default::default(),
            value: OverrideSpecValue {
                os: Some(sig.os),
                cpu_cores: sig.cores,
                memory_mb: result.spec.value.memory_mb,
                number_of_data_disks: sig.data_disks,
                has_ssd_storage: sig.has_ssd,
                azure_vm_override: String::new(),
                mapped_sku: vm.map(|s| s.name.clone()).unwrap_or_default(),
                mapped_cores: vm.map_or(0, |s| s.number_of_cores),
                mapped_memory_mb: vm.map_or(0.0, |s| s.memory_in_mb),
                comments: String::new(),
            },
            is_valid: true,
            validation_message: String::new(),
        });
    }

    info!(unique = out.len(), "override signatures");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::disk::{MappedDisk, PREMIUM_DISKS, STANDARD_DISKS};
    use crate::model::{Meter, VmSize};
    use crate::rates::RateCalc;
    use std::collections::BTreeMap;

    fn size(name: &str, cores: u32, memory_mb: f64) -> VmSize {
        VmSize {
            name: name.into(),
            number_of_cores: cores,
            os_disk_size_in_mb: 0,
            resource_disk_size_in_mb: 0,
            memory_in_mb: memory_mb,
            max_data_disk_count: 8,
        }
    }

    fn meter(sub: &str, rate: f64) -> Meter {
        Meter {
            name: "Compute Hours".into(),
            category: "Virtual Machines".into(),
            subcategory: sub.into(),
            region: "US West".into(),
            rates: BTreeMap::from([("0".to_string(), rate)]),
            ..Meter::default()
        }
    }

    fn result(name: &str, cores: u32, memory_mb: f64, sku: &str, by_override: bool) -> MappingResult {
        let mut spec = VmSpec::default();
        spec.is_valid = true;
        spec.value.instance_name = name.into();
        spec.value.os = Some(OsFamily::Linux);
        spec.value.cpu_cores = cores;
        spec.value.memory_mb = memory_mb;
        let mut r = MappingResult::new(spec);
        r.projected.standard_disks.push(MappedDisk {
            disk: &STANDARD_DISKS[0],
            count: 1,
        });
        r.projected.vm_size = Some(size(sku, 8, 32768.0));
        r.projected.mapped_by_override = by_override;
        r
    }

    #[test]
    fn first_signature_wins_and_overrides_are_re_resolved() {
        let catalog = vec![size("Standard_D2_v2", 2, 7168.0), size("Standard_D3_v2", 4, 14336.0)];
        let rates = RateCalc::new(vec![
            meter("Standard_D2_v2 VM", 0.15),
            meter("Standard_D3_v2 VM", 0.30),
        ]);
        let ctx = ProjectionContext {
            region: "US West",
            catalog: &catalog,
            rates: &rates,
            core_coefficient: 1.0,
            memory_coefficient: 1.0,
        };

        let mut invalid = result("bad", 2, 4096.0, "Standard_D2_v2", false);
        invalid.spec.is_valid = false;
        let mut premium = result("ssd", 2, 4096.0, "Standard_DS2_v2", false);
        premium.projected.standard_disks.clear();
        premium.projected.premium_disks.push(MappedDisk {
            disk: &PREMIUM_DISKS[0],
            count: 1,
        });

        let results = vec![
            invalid,
            result("a", 2, 4096.0, "Standard_D4_v2", true),
            result("b", 2, 4096.0, "Standard_D3_v2", false),
            premium,
            result("c", 4, 8192.0, "Standard_D3_v2", false),
        ];
        let rows = dedupe(&results, &ctx);
        assert_eq!(rows.len(), 3);

        assert_eq!(rows[0].value.mapped_sku, "Standard_D2_v2");
        assert_eq!(rows[0].value.mapped_cores, 2);
        assert_eq!(rows[0].value.mapped_memory_mb, 7168.0);
        assert!(!rows[0].value.has_ssd_storage);
        assert_eq!(rows[0].value.number_of_data_disks, 0);

        assert!(rows[1].value.has_ssd_storage);
        assert_eq!(rows[1].value.mapped_sku, "Standard_DS2_v2");
        assert_eq!(rows[2].value.mapped_sku, "Standard_D3_v2");
        assert!(rows.iter().all(|r| r.value.azure_vm_override.is_empty()));
    }

    #[test]
    fn repeated_dedupe_is_stable() {
        let catalog = vec![size("Standard_D2_v2", 2, 7168.0), size("Standard_D3_v2", 4, 14336.0)];
        let rates = RateCalc::new(vec![
            meter("Standard_D2_v2 VM", 0.15),
            meter("Standard_D3_v2 VM", 0.30),
        ]);
        let ctx = ProjectionContext {
            region: "US West",
            catalog: &catalog,
            rates: &rates,
            core_coefficient: 1.0,
            memory_coefficient: 1.0,
        };
        let results = vec![
            result("a", 4, 8192.0, "Standard_D4_v2", true),
            result("b", 2, 4096.0, "Standard_D2_v2", false),
            result("c", 4, 8192.0, "Standard_D3_v2", false),
            result("d", 2, 4096.0, "Standard_D3_v2", true),
        ];

        let first = dedupe(&results, &ctx);
        let second = dedupe(&results, &ctx);
        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
        assert_eq!(first[0].value.mapped_sku, "Standard_D3_v2");
        assert_eq!(first[1].value.mapped_sku, "Standard_D2_v2");
    }

    #[test]
    fn unmapped_signature_has_blank_sku() {
        let catalog: Vec<VmSize> = Vec::new();
        let rates = RateCalc::new(Vec::new());
        let ctx = ProjectionContext {
            region: "US West",
            catalog: &catalog,
            rates: &rates,
            core_coefficient: 1.0,
            memory_coefficient: 1.0,
        };
        let mut r = result("a", 2, 4096.0, "", false);
        r.projected.vm_size = None;
        r.projected.no_map_found = true;
        let rows = dedupe(&[r], &ctx);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].value.mapped_sku, "");
        assert_eq!(rows[0].value.mapped_cores, 0);
    }
}
