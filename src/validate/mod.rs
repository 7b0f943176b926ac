// src/validate/mod.rs
//! Coerces raw sheet cells into typed specs. Bad data never errors: the
//! record is flagged invalid and the reason is appended to its message.

use crate::model::{
    OsFamily, OverrideField, OverrideSpec, OverrideSpecRaw, OverrideSpecValue, VmField, VmSpec,
    VmSpecRaw, VmSpecValue,
};
use crate::storage::MAX_STORAGE_GB;

pub const MAX_LEN_OVERRIDE: usize = 25;
pub const MAX_LEN_COMMENTS: usize = 1000;

const FAILED_PREFIX: &str = "Validation Failed: ";

/// Accumulates per-field diagnostics for one record.
#[derive(Debug)]
struct Diagnostics {
    is_valid: bool,
    message: String,
}

impl Diagnostics {
    fn new() -> Self {
        Self {
            is_valid: true,
            message: String::new(),
        }
    }

    fn fail(&mut self, msg: String) {
        self.is_valid = false;
        self.message.push_str(&msg);
    }

    fn note(&mut self, msg: String) {
        self.message.push_str(&msg);
    }

    fn missing(&mut self, label: &str) {
        self.fail(format!("Missing '{label}'; "));
    }

    fn finish(self) -> (bool, String) {
        let mut message = if self.is_valid {
            self.message
        } else {
            format!("{FAILED_PREFIX}{}", self.message)
        };
        if message.len() > 2 && message.ends_with("; ") {
            message.truncate(message.len() - 2);
        }
        (self.is_valid, message)
    }
}

fn parse_f64(s: &str) -> Option<f64> {
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_uppercase().contains(&needle.to_uppercase())
}

fn validate_os(
    raw: &str,
    label: &str,
    windows_keywords: &[String],
    linux_keywords: &[String],
    diag: &mut Diagnostics,
) -> Option<OsFamily> {
    let raw = raw.trim();
    if raw.is_empty() {
        diag.missing(label);
        return None;
    }
    let exact = |keys: &[String]| keys.iter().any(|k| k.trim().eq_ignore_ascii_case(raw));
    let partial = |keys: &[String]| keys.iter().any(|k| contains_ci(raw, k.trim()));

    if exact(windows_keywords) {
        Some(OsFamily::Windows)
    } else if exact(linux_keywords) {
        Some(OsFamily::Linux)
    } else {
        let assumed = if partial(windows_keywords) {
            OsFamily::Windows
        } else if partial(linux_keywords) {
            OsFamily::Linux
        } else {
            diag.fail(format!("Invalid '{label}'; "));
            return None;
        };
        diag.note(format!("'{label}' value:'{raw}' assumed as '{assumed}'; "));
        Some(assumed)
    }
}

fn validate_cores(raw: &str, label: &str, diag: &mut Diagnostics) -> u32 {
    let raw = raw.trim();
    if raw.is_empty() {
        diag.missing(label);
        return 0;
    }
    match raw.parse::<u32>() {
        Ok(v) if v > 0 => v,
        _ => {
            diag.fail(format!("'{label}' should be a positive integer; "));
            0
        }
    }
}

fn validate_memory(raw: &str, label: &str, memory_in_gb: bool, diag: &mut Diagnostics) -> f64 {
    let raw = raw.trim();
    if raw.is_empty() {
        diag.missing(label);
        return 0.0;
    }
    match parse_f64(raw) {
        Some(v) if v > 0.0 => {
            if memory_in_gb {
                v * 1024.0
            } else {
                v
            }
        }
        _ => {
            diag.fail(format!("'{label}' should be a positive number; "));
            0.0
        }
    }
}

/// Blank means zero; anything else must be a finite number >= 0.
fn validate_non_negative(raw: &str, label: &str, diag: &mut Diagnostics) -> f64 {
    let raw = raw.trim();
    if raw.is_empty() {
        return 0.0;
    }
    match parse_f64(raw) {
        Some(v) if v >= 0.0 => v,
        _ => {
            diag.fail(format!("'{label}' should be a non-negative number; "));
            0.0
        }
    }
}

/// Storage capacity: non-negative and small enough to pack into disks.
fn validate_storage(raw: &str, label: &str, diag: &mut Diagnostics) -> f64 {
    let value = validate_non_negative(raw, label, diag);
    if value > MAX_STORAGE_GB {
        diag.fail(format!("'{label}' should not exceed {MAX_STORAGE_GB} GB; "));
        return 0.0;
    }
    value
}

fn validate_count(raw: &str, label: &str, required: bool, diag: &mut Diagnostics) -> u32 {
    let raw = raw.trim();
    if raw.is_empty() {
        if required {
            diag.missing(label);
        }
        return 0;
    }
    match raw.parse::<u32>() {
        Ok(v) => v,
        Err(_) => {
            diag.fail(format!("'{label}' should be a non-negative number; "));
            0
        }
    }
}

fn truncate_chars(s: &str, max: usize) -> (String, bool) {
    match s.char_indices().nth(max) {
        Some((idx, _)) => (s[..idx].to_string(), true),
        None => (s.to_string(), false),
    }
}

fn validate_text(raw: &str, label: &str, max: usize, diag: &mut Diagnostics) -> String {
    let raw = raw.trim();
    let (value, truncated) = truncate_chars(raw, max);
    if truncated {
        diag.note(format!("'{label}' should not exceed {max} chars; "));
    }
    value
}

/// Validate one inventory row.
pub fn validate_vm_spec(
    raw: VmSpecRaw,
    memory_in_gb: bool,
    windows_keywords: &[String],
    linux_keywords: &[String],
) -> VmSpec {
    let mut diag = Diagnostics::new();
    let mut value = VmSpecValue::default();

    let name = raw.instance_name.trim();
    if name.is_empty() {
        diag.missing(VmField::InstanceName.label());
    } else {
        value.instance_name = name.to_string();
    }
    value.os = validate_os(
        &raw.operating_system,
        VmField::OperatingSystem.label(),
        windows_keywords,
        linux_keywords,
        &mut diag,
    );
    value.cpu_cores = validate_cores(&raw.cpu_cores, VmField::CpuCores.label(), &mut diag);
    value.memory_mb = validate_memory(&raw.memory, VmField::Memory.label(), memory_in_gb, &mut diag);
    value.ssd_storage_gb =
        validate_storage(&raw.ssd_storage_gb, VmField::SsdStorageGb.label(), &mut diag);
    value.ssd_disk_count =
        validate_count(&raw.ssd_disk_count, VmField::SsdDiskCount.label(), false, &mut diag);
    value.hdd_storage_gb =
        validate_storage(&raw.hdd_storage_gb, VmField::HddStorageGb.label(), &mut diag);
    value.hdd_disk_count =
        validate_count(&raw.hdd_disk_count, VmField::HddDiskCount.label(), false, &mut diag);
    value.price_per_month =
        validate_non_negative(&raw.price_per_month, VmField::PricePerMonth.label(), &mut diag);
    value.azure_vm_override = validate_text(
        &raw.azure_vm_override,
        VmField::AzureVmOverride.label(),
        MAX_LEN_OVERRIDE,
        &mut diag,
    );
    value.comments = validate_text(
        &raw.comments,
        VmField::Comments.label(),
        MAX_LEN_COMMENTS,
        &mut diag,
    );

    let (is_valid, validation_message) = diag.finish();
    VmSpec {
        raw,
        value,
        is_valid,
        validation_message,
    }
}

fn parse_yes_no(raw: &str) -> Option<bool> {
    const YES: [&str; 2] = ["Yes", "Y"];
    const NO: [&str; 2] = ["No", "N"];
    if YES.iter().any(|y| y.eq_ignore_ascii_case(raw)) {
        Some(true)
    } else if NO.iter().any(|n| n.eq_ignore_ascii_case(raw)) {
        Some(false)
    } else {
        None
    }
}

/// Validate one row of an override sheet. The mapped cores/memory columns are
/// informational and are read leniently.
pub fn validate_override_spec(
    raw: OverrideSpecRaw,
    memory_in_gb: bool,
    windows_keywords: &[String],
    linux_keywords: &[String],
) -> OverrideSpec {
    let mut diag = Diagnostics::new();
    let mut value = OverrideSpecValue::default();

    value.os = validate_os(
        &raw.operating_system,
        OverrideField::OperatingSystem.label(),
        windows_keywords,
        linux_keywords,
        &mut diag,
    );
    value.cpu_cores = validate_cores(&raw.cpu_cores, OverrideField::CpuCores.label(), &mut diag);
    value.memory_mb = validate_memory(
        &raw.memory,
        OverrideField::Memory.label(),
        memory_in_gb,
        &mut diag,
    );
    value.number_of_data_disks = validate_count(
        &raw.number_of_data_disks,
        OverrideField::NumberOfDataDisks.label(),
        true,
        &mut diag,
    );

    let has_ssd = raw.has_ssd_storage.trim();
    let label = OverrideField::HasSsdStorage.label();
    if has_ssd.is_empty() {
        diag.missing(label);
    } else {
        match parse_yes_no(has_ssd) {
            Some(v) => value.has_ssd_storage = v,
            None => diag.fail(format!("'{label}' should be 'Yes' or 'No'; ")),
        }
    }

    value.mapped_sku = validate_text(
        &raw.mapped_sku,
        OverrideField::MappedSku.label(),
        MAX_LEN_OVERRIDE,
        &mut diag,
    );
    value.azure_vm_override = validate_text(
        &raw.azure_vm_override,
        OverrideField::AzureVmOverride.label(),
        MAX_LEN_OVERRIDE,
        &mut diag,
    );
    value.comments = validate_text(
        &raw.comments,
        OverrideField::Comments.label(),
        MAX_LEN_COMMENTS,
        &mut diag,
    );
    value.mapped_cores = raw.mapped_cores.trim().parse().unwrap_or(0);
    value.mapped_memory_mb = parse_f64(raw.mapped_memory.trim())
        .filter(|v| *v >= 0.0)
        .map(|v| if memory_in_gb { v * 1024.0 } else { v })
        .unwrap_or(0.0);

    let (is_valid, validation_message) = diag.finish();
    OverrideSpec {
        raw,
        value,
        is_valid,
        validation_message,
    }
}
