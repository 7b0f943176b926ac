use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// One VM size from the compute catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VmSize {
    pub name: String,
    #[serde(default)]
    pub number_of_cores: u32,
    #[serde(rename = "osDiskSizeInMB", default)]
    pub os_disk_size_in_mb: u64,
    #[serde(rename = "resourceDiskSizeInMB", default)]
    pub resource_disk_size_in_mb: u64,
    #[serde(rename = "memoryInMB", default)]
    pub memory_in_mb: f64,
    #[serde(default)]
    pub max_data_disk_count: u32,
}

/// Envelope returned by the `vmSizes` endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VmSizeList {
    #[serde(default)]
    pub value: Vec<VmSize>,
}

/// VM families that can be included in the mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SkuSeries {
    #[serde(rename = "Basic_A")]
    BasicA,
    #[serde(rename = "Standard_A")]
    StandardA,
    #[serde(rename = "Standard_D")]
    StandardD,
    #[serde(rename = "Standard_F")]
    StandardF,
    #[serde(rename = "Standard_G")]
    StandardG,
    #[serde(rename = "Standard_H")]
    StandardH,
    #[serde(rename = "Standard_L")]
    StandardL,
    #[serde(rename = "Standard_NC")]
    StandardNc,
    #[serde(rename = "Standard_NV")]
    StandardNv,
}

static SERIES_PATTERNS: Lazy<[Regex; 9]> = Lazy::new(|| {
    [
        r"(?i)^Basic_A(.+)$",
        r"(?i)^Standard_A(.+)$",
        r"(?i)^Standard_D(.+)$",
        r"(?i)^Standard_F(.+)$",
        r"(?i)^Standard_G(.+)$",
        r"(?i)^Standard_H(.+)$",
        r"(?i)^Standard_L(.+)$",
        r"(?i)^Standard_NC(.+)$",
        r"(?i)^Standard_NV(.+)$",
    ]
    .map(|p| Regex::new(p).unwrap())
});

impl SkuSeries {
    pub const ALL: [SkuSeries; 9] = [
        SkuSeries::BasicA,
        SkuSeries::StandardA,
        SkuSeries::StandardD,
        SkuSeries::StandardF,
        SkuSeries::StandardG,
        SkuSeries::StandardH,
        SkuSeries::StandardL,
        SkuSeries::StandardNc,
        SkuSeries::StandardNv,
    ];

    fn index(self) -> usize {
        self as usize
    }

    pub fn matches(self, sku_name: &str) -> bool {
        SERIES_PATTERNS[self.index()].is_match(sku_name)
    }
}
