//! Maps catalog names onto rate-card meter descriptors.

use super::ResourceInfo;
use crate::model::{ManagedDisk, OsFamily};
use once_cell::sync::Lazy;
use regex::Regex;

pub const COMPUTE_CATEGORY: &str = "Virtual Machines";
pub const COMPUTE_NAME: &str = "Compute Hours";
pub const STORAGE_CATEGORY: &str = "Storage";
pub const STORAGE_SUBCATEGORY: &str = "Locally Redundant";

static PREMIUM_CAPABLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(_[DG]S|_[FLM]\d{1,3}s)").unwrap());
static A_SERIES: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^(Basic|Standard)_(A.+)$").unwrap());
static DG_PREMIUM: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^(Standard_[DG])S(.+)$").unwrap());
static FLM_PREMIUM: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^(Standard_[FLM])(.+)S$").unwrap());

/// Whether the SKU can attach premium (SSD) disks.
pub fn is_premium_supported(sku_name: &str) -> bool {
    PREMIUM_CAPABLE.is_match(sku_name)
}

/// Name under which the rate card prices a SKU. Premium-capable variants
/// share the price of their standard sibling.
pub fn pricing_size_name(sku_name: &str) -> String {
    if !sku_name.contains("v2") {
        if let Some(c) = A_SERIES.captures(sku_name) {
            return if c[1].eq_ignore_ascii_case("Basic") {
                format!("Basic.{}", &c[2])
            } else {
                c[2].to_string()
            };
        }
    }
    if let Some(c) = DG_PREMIUM.captures(sku_name) {
        return format!("{}{}", &c[1], &c[2]);
    }
    if let Some(c) = FLM_PREMIUM.captures(sku_name) {
        return format!("{}{}", &c[1], &c[2]);
    }
    sku_name.to_string()
}

pub fn compute_resource(sku_name: &str, os: OsFamily, region: &str) -> ResourceInfo {
    let size = pricing_size_name(sku_name);
    let subcategory = match os {
        OsFamily::Windows => format!("{size} VM ({os})"),
        OsFamily::Linux => format!("{size} VM"),
    };
    ResourceInfo {
        category: COMPUTE_CATEGORY.to_string(),
        subcategory,
        name: COMPUTE_NAME.to_string(),
        region: region.to_string(),
    }
}

pub fn disk_resource(disk: &ManagedDisk, region: &str) -> ResourceInfo {
    ResourceInfo {
        category: STORAGE_CATEGORY.to_string(),
        subcategory: STORAGE_SUBCATEGORY.to_string(),
        name: disk.meter_name.to_string(),
        region: region.to_string(),
    }
}
