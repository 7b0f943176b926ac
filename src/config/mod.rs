// src/config/mod.rs
pub mod regions;

use crate::model::disk::{find_disk, PREMIUM_DISKS, STANDARD_DISKS};
use crate::model::{OverrideField, SkuSeries, VmField};
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::hash::Hash;
use std::{fs, path::Path};
use tracing::info;

/// Unit the inventory sheet expresses memory in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemoryUnit {
    #[serde(rename = "GB")]
    Gb,
    #[serde(rename = "MB")]
    Mb,
}

impl MemoryUnit {
    pub fn is_gb(self) -> bool {
        self == MemoryUnit::Gb
    }

    pub fn suffix(self) -> &'static str {
        match self {
            MemoryUnit::Gb => "(in GB)",
            MemoryUnit::Mb => "(in MB)",
        }
    }
}

/// User-tunable mapping options, loaded from YAML. Missing keys take defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    pub vm_specs_skip_lines: usize,
    pub override_skip_lines: usize,
    pub vm_specs_sequence: Vec<VmField>,
    pub override_sequence: Vec<OverrideField>,
    pub windows_keywords: Vec<String>,
    pub linux_keywords: Vec<String>,
    pub series_included: Vec<SkuSeries>,
    pub core_coefficient: f64,
    pub memory_coefficient: f64,
    pub os_disk_hdd: String,
    pub os_disk_ssd: String,
    pub memory_unit: MemoryUnit,
    pub hours_per_month: f64,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            vm_specs_skip_lines: 1,
            override_skip_lines: 1,
            vm_specs_sequence: VmField::DEFAULT_SEQUENCE.to_vec(),
            override_sequence: OverrideField::DEFAULT_SEQUENCE.to_vec(),
            windows_keywords: vec!["Windows".into()],
            linux_keywords: vec!["Linux".into(), "CentOS".into(), "Ubuntu".into()],
            series_included: SkuSeries::ALL.to_vec(),
            core_coefficient: 1.0,
            memory_coefficient: 1.0,
            os_disk_hdd: "S4".into(),
            os_disk_ssd: "P4".into(),
            memory_unit: MemoryUnit::Gb,
            hours_per_month: 744.0,
        }
    }
}

fn is_permutation<T: Copy + Eq + Hash>(sequence: &[T], all: &[T]) -> bool {
    let seen: HashSet<T> = sequence.iter().copied().collect();
    sequence.len() == all.len() && seen.len() == all.len() && all.iter().all(|f| seen.contains(f))
}

impl Options {
    /// Read options from a YAML file and validate them.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading options file {}", path.display()))?;
        let opts: Options = serde_yaml::from_str(&text)
            .with_context(|| format!("parsing options YAML {}", path.display()))?;
        opts.validate()?;
        info!(path = %path.display(), "loaded options");
        Ok(opts)
    }

    pub fn validate(&self) -> Result<()> {
        for (name, coef) in [
            ("core_coefficient", self.core_coefficient),
            ("memory_coefficient", self.memory_coefficient),
        ] {
            if !(coef > 0.0 && coef <= 1.0) {
                bail!("{name} must be within (0, 1], got {coef}");
            }
        }
        if !(self.hours_per_month > 0.0 && self.hours_per_month.is_finite()) {
            bail!("hours_per_month must be positive, got {}", self.hours_per_month);
        }
        if !is_permutation(&self.vm_specs_sequence, &VmField::DEFAULT_SEQUENCE) {
            bail!("vm_specs_sequence must list every VM spec column exactly once");
        }
        if !is_permutation(&self.override_sequence, &OverrideField::DEFAULT_SEQUENCE) {
            bail!("override_sequence must list every override column exactly once");
        }
        if find_disk(&STANDARD_DISKS, &self.os_disk_hdd).is_none() {
            bail!("os_disk_hdd '{}' is not a standard disk", self.os_disk_hdd);
        }
        if find_disk(&PREMIUM_DISKS, &self.os_disk_ssd).is_none() {
            bail!("os_disk_ssd '{}' is not a premium disk", self.os_disk_ssd);
        }
        if self.series_included.is_empty() {
            bail!("series_included must name at least one VM series");
        }
        if self.windows_keywords.iter().chain(&self.linux_keywords).any(|k| k.trim().is_empty()) {
            bail!("OS keywords must not be blank");
        }
        Ok(())
    }
}
