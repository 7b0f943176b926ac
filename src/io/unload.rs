// src/io/unload.rs
//! Renders results into sheet rows. Valid records print their coerced
//! values; invalid records echo the original cells.

use crate::config::MemoryUnit;
use crate::model::disk::disk_list_str;
use crate::model::{
    MappingResult, OsFamily, OverrideField, OverrideSpec, VmField, VmSpec, VmSpecValue,
};

const YES: &str = "Yes";
const NO: &str = "No";

/// Round to two decimals and print without trailing zeros.
pub fn fmt_num(v: f64) -> String {
    let r = (v * 100.0).round() / 100.0;
    if r == 0.0 {
        "0".to_string()
    } else {
        format!("{}", r)
    }
}

fn fmt_memory(memory_mb: f64, unit: MemoryUnit) -> String {
    match unit {
        MemoryUnit::Gb => fmt_num(memory_mb / 1024.0),
        MemoryUnit::Mb => fmt_num(memory_mb),
    }
}

fn yes_no(b: bool) -> &'static str {
    if b {
        YES
    } else {
        NO
    }
}

fn os_str(os: Option<OsFamily>) -> String {
    os.map(|o| o.as_str().to_string()).unwrap_or_default()
}

fn cur(label: &str, currency: &str) -> String {
    format!("{label}({currency})")
}

/// The 11 inventory column headers.
pub fn vm_specs_header(unit: MemoryUnit, currency: &str) -> Vec<String> {
    VmField::DEFAULT_SEQUENCE
        .iter()
        .map(|f| match f {
            VmField::Memory => format!("{}{}", f.label(), unit.suffix()),
            VmField::PricePerMonth => cur(f.label(), currency),
            _ => f.label().to_string(),
        })
        .collect()
}

/// One inventory row in sheet form.
pub fn vm_spec_row(spec: &VmSpec, unit: MemoryUnit) -> Vec<String> {
    if !spec.is_valid {
        return VmField::DEFAULT_SEQUENCE
            .iter()
            .map(|f| spec.raw.get(*f).to_string())
            .collect();
    }
    let v = &spec.value;
    vec![
        v.instance_name.clone(),
        os_str(v.os),
        v.cpu_cores.to_string(),
        fmt_memory(v.memory_mb, unit),
        fmt_num(v.ssd_storage_gb),
        v.ssd_disk_count.to_string(),
        fmt_num(v.hdd_storage_gb),
        v.hdd_disk_count.to_string(),
        fmt_num(v.price_per_month),
        v.azure_vm_override.clone(),
        v.comments.clone(),
    ]
}

fn sample_vm_spec() -> VmSpec {
    VmSpec {
        value: VmSpecValue {
            instance_name: "WebVM".into(),
            os: Some(OsFamily::Windows),
            cpu_cores: 4,
            memory_mb: 6144.0,
            ssd_storage_gb: 0.0,
            ssd_disk_count: 2,
            hdd_storage_gb: 1500.0,
            hdd_disk_count: 2,
            price_per_month: 325.0,
            azure_vm_override: String::new(),
            comments: "This VM is hosting an internal website".into(),
        },
        is_valid: true,
        ..VmSpec::default()
    }
}

/// Header plus one example row, ready to be filled in by the user.
pub fn sample_sheet(unit: MemoryUnit, currency: &str) -> Vec<Vec<String>> {
    vec![
        vm_specs_header(unit, currency),
        vm_spec_row(&sample_vm_spec(), unit),
    ]
}

/// The 25 column headers of the mapping sheet.
pub fn mapping_header(unit: MemoryUnit, currency: &str) -> Vec<String> {
    let mut h = vm_specs_header(unit, currency);
    h.push("Is Valid?".into());
    h.push("Validation Message".into());
    h.push("Mapped Azure VM SKU".into());
    h.push("Azure VM Cores".into());
    h.push(format!("Azure VM Memory{}", unit.suffix()));
    h.push(cur("Compute Hours Monthly Cost", currency));
    h.push(cur("Premium Disks Monthly Cost", currency));
    h.push(cur("Standard Disks Monthly Cost", currency));
    h.push(cur("Azure VM Total Monthly Cost", currency));
    h.push(cur("Monthly Gross Margin Estimates", currency));
    h.push("Premium Disks".into());
    h.push("Standard Disks".into());
    h.push(cur("Compute Hours Rate", currency));
    h.push("Mapping Comments".into());
    h
}

/// One mapping sheet row. Projection columns stay blank for invalid
/// records; SKU and cost columns stay blank when nothing was mapped.
pub fn mapping_row(result: &MappingResult, unit: MemoryUnit) -> Vec<String> {
    let spec = &result.spec;
    let mut row = vm_spec_row(spec, unit);
    row.push(yes_no(spec.is_valid).to_string());
    row.push(spec.validation_message.clone());

    if !spec.is_valid {
        row.resize(25, String::new());
        return row;
    }

    let p = &result.projected;
    let mapped = p.vm_size.as_ref().filter(|_| !p.no_map_found);
    let when_mapped = |v: f64| mapped.map(|_| fmt_num(v)).unwrap_or_default();

    row.push(mapped.map(|s| s.name.clone()).unwrap_or_default());
    row.push(mapped.map(|s| s.number_of_cores.to_string()).unwrap_or_default());
    row.push(mapped.map(|s| fmt_memory(s.memory_in_mb, unit)).unwrap_or_default());
    row.push(when_mapped(p.compute_monthly_cost));
    row.push(fmt_num(p.premium_disk_monthly_cost));
    row.push(fmt_num(p.standard_disk_monthly_cost));
    row.push(when_mapped(p.total_monthly_cost));
    row.push(when_mapped(p.monthly_margin));
    row.push(disk_list_str(&p.premium_disks));
    row.push(disk_list_str(&p.standard_disks));
    row.push(when_mapped(p.compute_hour_rate));
    row.push(p.comment.clone());
    row
}

fn override_signature_headers(unit: MemoryUnit) -> Vec<String> {
    [
        OverrideField::OperatingSystem,
        OverrideField::CpuCores,
        OverrideField::Memory,
        OverrideField::NumberOfDataDisks,
        OverrideField::HasSsdStorage,
        OverrideField::AzureVmOverride,
        OverrideField::MappedSku,
    ]
    .iter()
    .map(|f| match f {
        OverrideField::Memory => format!("{}{}", f.label(), unit.suffix()),
        _ => f.label().to_string(),
    })
    .collect()
}

/// Headers of the generated override sheet (10 columns, same layout the
/// override input is read with by default).
pub fn unique_overrides_header(unit: MemoryUnit) -> Vec<String> {
    let mut h = override_signature_headers(unit);
    h.push(OverrideField::MappedCores.label().to_string());
    h.push(format!("{}{}", OverrideField::MappedMemory.label(), unit.suffix()));
    h.push(OverrideField::Comments.label().to_string());
    h
}

pub fn unique_override_row(spec: &OverrideSpec, unit: MemoryUnit) -> Vec<String> {
    let v = &spec.value;
    let has_sku = !v.mapped_sku.trim().is_empty();
    vec![
        os_str(v.os),
        v.cpu_cores.to_string(),
        fmt_memory(v.memory_mb, unit),
        v.number_of_data_disks.to_string(),
        yes_no(v.has_ssd_storage).to_string(),
        String::new(),
        v.mapped_sku.clone(),
        if has_sku {
            v.mapped_cores.to_string()
        } else {
            String::new()
        },
        if has_sku {
            fmt_memory(v.mapped_memory_mb, unit)
        } else {
            String::new()
        },
        String::new(),
    ]
}

/// Headers of the validated echo of an override input sheet.
pub fn validated_overrides_header(unit: MemoryUnit) -> Vec<String> {
    let mut h = override_signature_headers(unit);
    h.push(OverrideField::Comments.label().to_string());
    h.push("Is Valid?".into());
    h.push("Validation Message".into());
    h
}

pub fn validated_override_row(spec: &OverrideSpec, unit: MemoryUnit) -> Vec<String> {
    let mut row = if spec.is_valid {
        let v = &spec.value;
        vec![
            os_str(v.os),
            v.cpu_cores.to_string(),
            fmt_memory(v.memory_mb, unit),
            v.number_of_data_disks.to_string(),
            yes_no(v.has_ssd_storage).to_string(),
            v.azure_vm_override.clone(),
            v.mapped_sku.clone(),
            v.comments.clone(),
        ]
    } else {
        let r = &spec.raw;
        vec![
            r.operating_system.clone(),
            r.cpu_cores.clone(),
            r.memory.clone(),
            r.number_of_data_disks.clone(),
            r.has_ssd_storage.clone(),
            r.azure_vm_override.clone(),
            r.mapped_sku.clone(),
            r.comments.clone(),
        ]
    };
    row.push(yes_no(spec.is_valid).to_string());
    row.push(spec.validation_message.clone());
    row
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::disk::{MappedDisk, STANDARD_DISKS};
    use crate::model::{OverrideSpecValue, VmSize, VmSpecRaw};

    #[test]
    fn number_formatting() {
        assert_eq!(fmt_num(6.0), "6");
        assert_eq!(fmt_num(0.1 + 0.2), "0.3");
        assert_eq!(fmt_num(269.456), "269.46");
        assert_eq!(fmt_num(-0.001), "0");
        assert_eq!(fmt_num(-12.5), "-12.5");
    }

    #[test]
    fn headers_have_expected_widths() {
        let h = mapping_header(MemoryUnit::Gb, "USD");
        assert_eq!(h.len(), 25);
        assert_eq!(h[3], "Memory(in GB)");
        assert_eq!(h[8], "Price Per Month(USD)");
        assert_eq!(h[24], "Mapping Comments");
        assert_eq!(unique_overrides_header(MemoryUnit::Mb).len(), 10);
        assert_eq!(unique_overrides_header(MemoryUnit::Mb)[8], "Azure VM Memory(in MB)");
        assert_eq!(validated_overrides_header(MemoryUnit::Gb).len(), 10);
    }

    #[test]
    fn invalid_row_echoes_original_cells() {
        let mut raw = VmSpecRaw::default();
        raw.instance_name = "db01".into();
        raw.cpu_cores = "four".into();
        raw.memory = "16".into();
        let spec = VmSpec {
            raw,
            is_valid: false,
            validation_message: "Validation Failed: 'CPU Cores' should be a positive integer".into(),
            ..VmSpec::default()
        };
        let row = mapping_row(&MappingResult::new(spec), MemoryUnit::Gb);
        assert_eq!(row.len(), 25);
        assert_eq!(row[0], "db01");
        assert_eq!(row[2], "four");
        assert_eq!(row[3], "16");
        assert_eq!(row[11], "No");
        assert!(row[13..].iter().all(String::is_empty));
    }

    #[test]
    fn mapped_row_prints_projection() {
        let mut spec = VmSpec::default();
        spec.is_valid = true;
        spec.value.instance_name = "web".into();
        spec.value.os = Some(OsFamily::Windows);
        spec.value.cpu_cores = 4;
        spec.value.memory_mb = 6144.0;
        let mut r = MappingResult::new(spec);
        r.projected.vm_size = Some(VmSize {
            name: "Standard_A4_v2".into(),
            number_of_cores: 4,
            os_disk_size_in_mb: 0,
            resource_disk_size_in_mb: 0,
            memory_in_mb: 8192.0,
            max_data_disk_count: 8,
        });
        r.projected.compute_hour_rate = 0.254;
        r.projected.compute_monthly_cost = 188.976;
        r.projected.standard_disks.push(MappedDisk {
            disk: &STANDARD_DISKS[0],
            count: 1,
        });
        let row = mapping_row(&r, MemoryUnit::Gb);
        assert_eq!(row[1], "Windows");
        assert_eq!(row[3], "6");
        assert_eq!(row[11], "Yes");
        assert_eq!(row[13], "Standard_A4_v2");
        assert_eq!(row[15], "8");
        assert_eq!(row[16], "188.98");
        assert_eq!(row[22], "1 x S4");
        assert_eq!(row[23], "0.25");

        r.projected.vm_size = None;
        r.projected.no_map_found = true;
        let row = mapping_row(&r, MemoryUnit::Gb);
        assert_eq!(row[13], "");
        assert_eq!(row[16], "");
        assert_eq!(row[17], "0");
    }

    #[test]
    fn sample_sheet_rows() {
        let sheet = sample_sheet(MemoryUnit::Gb, "USD");
        assert_eq!(sheet.len(), 2);
        assert_eq!(sheet[0].len(), 11);
        assert_eq!(
            sheet[1],
            vec![
                "WebVM",
                "Windows",
                "4",
                "6",
                "0",
                "2",
                "1500",
                "2",
                "325",
                "",
                "This VM is hosting an internal website"
            ]
        );
        assert_eq!(sample_sheet(MemoryUnit::Mb, "USD")[1][3], "6144");
    }

    #[test]
    fn unique_row_blanks_cores_without_sku() {
        let spec = OverrideSpec {
            value: OverrideSpecValue {
                os: Some(OsFamily::Linux),
                cpu_cores: 2,
                memory_mb: 4096.0,
                ..OverrideSpecValue::default()
            },
            is_valid: true,
            ..OverrideSpec::default()
        };
        let row = unique_override_row(&spec, MemoryUnit::Gb);
        assert_eq!(row, vec!["Linux", "2", "4", "0", "No", "", "", "", "", ""]);
    }
}
