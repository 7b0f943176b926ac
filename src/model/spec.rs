// src/model/spec.rs
use serde::{Deserialize, Serialize};
use std::fmt;

/// Operating system family of an input VM.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OsFamily {
    Windows,
    Linux,
}

impl OsFamily {
    pub fn as_str(self) -> &'static str {
        match self {
            OsFamily::Windows => "Windows",
            OsFamily::Linux => "Linux",
        }
    }
}

impl fmt::Display for OsFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Columns of the VM inventory sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VmField {
    InstanceName,
    OperatingSystem,
    CpuCores,
    Memory,
    SsdStorageGb,
    SsdDiskCount,
    HddStorageGb,
    HddDiskCount,
    PricePerMonth,
    AzureVmOverride,
    Comments,
}

impl VmField {
    pub const DEFAULT_SEQUENCE: [VmField; 11] = [
        VmField::InstanceName,
        VmField::OperatingSystem,
        VmField::CpuCores,
        VmField::Memory,
        VmField::SsdStorageGb,
        VmField::SsdDiskCount,
        VmField::HddStorageGb,
        VmField::HddDiskCount,
        VmField::PricePerMonth,
        VmField::AzureVmOverride,
        VmField::Comments,
    ];

    /// Human label used in diagnostics and sheet headers.
    pub fn label(self) -> &'static str {
        match self {
            VmField::InstanceName => "Instance Name",
            VmField::OperatingSystem => "Operating System",
            VmField::CpuCores => "CPU Cores",
            VmField::Memory => "Memory",
            VmField::SsdStorageGb => "SSD Storage In GB",
            VmField::SsdDiskCount => "SSD Number of Disks",
            VmField::HddStorageGb => "HDD Storage In GB",
            VmField::HddDiskCount => "HDD Number of Disks",
            VmField::PricePerMonth => "Price Per Month",
            VmField::AzureVmOverride => "Azure VM Override",
            VmField::Comments => "Comments",
        }
    }
}

/// Columns of the override sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OverrideField {
    OperatingSystem,
    CpuCores,
    Memory,
    NumberOfDataDisks,
    HasSsdStorage,
    AzureVmOverride,
    MappedSku,
    MappedCores,
    MappedMemory,
    Comments,
}

impl OverrideField {
    pub const DEFAULT_SEQUENCE: [OverrideField; 10] = [
        OverrideField::OperatingSystem,
        OverrideField::CpuCores,
        OverrideField::Memory,
        OverrideField::NumberOfDataDisks,
        OverrideField::HasSsdStorage,
        OverrideField::AzureVmOverride,
        OverrideField::MappedSku,
        OverrideField::MappedCores,
        OverrideField::MappedMemory,
        OverrideField::Comments,
    ];

    pub fn label(self) -> &'static str {
        match self {
            OverrideField::OperatingSystem => "Operating System",
            OverrideField::CpuCores => "CPU Cores",
            OverrideField::Memory => "Memory",
            OverrideField::NumberOfDataDisks => "Number Of Data Disks",
            OverrideField::HasSsdStorage => "Has SSD Storage",
            OverrideField::AzureVmOverride => "Azure VM Override",
            OverrideField::MappedSku => "Mapped Azure VM SKU",
            OverrideField::MappedCores => "Azure VM Cores",
            OverrideField::MappedMemory => "Azure VM Memory",
            OverrideField::Comments => "Comments",
        }
    }
}

/// Original cell text of an inventory row. Absent columns are blank.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VmSpecRaw {
    pub instance_name: String,
    pub operating_system: String,
    pub cpu_cores: String,
    pub memory: String,
    pub ssd_storage_gb: String,
    pub ssd_disk_count: String,
    pub hdd_storage_gb: String,
    pub hdd_disk_count: String,
    pub price_per_month: String,
    pub azure_vm_override: String,
    pub comments: String,
}

impl VmSpecRaw {
    pub fn get(&self, field: VmField) -> &str {
        match field {
            VmField::InstanceName => &self.instance_name,
            VmField::OperatingSystem => &self.operating_system,
            VmField::CpuCores => &self.cpu_cores,
            VmField::Memory => &self.memory,
            VmField::SsdStorageGb => &self.ssd_storage_gb,
            VmField::SsdDiskCount => &self.ssd_disk_count,
            VmField::HddStorageGb => &self.hdd_storage_gb,
            VmField::HddDiskCount => &self.hdd_disk_count,
            VmField::PricePerMonth => &self.price_per_month,
            VmField::AzureVmOverride => &self.azure_vm_override,
            VmField::Comments => &self.comments,
        }
    }

    pub fn set(&mut self, field: VmField, value: String) {
        let slot = match field {
            VmField::InstanceName => &mut self.instance_name,
            VmField::OperatingSystem => &mut self.operating_system,
            VmField::CpuCores => &mut self.cpu_cores,
            VmField::Memory => &mut self.memory,
            VmField::SsdStorageGb => &mut self.ssd_storage_gb,
            VmField::SsdDiskCount => &mut self.ssd_disk_count,
            VmField::HddStorageGb => &mut self.hdd_storage_gb,
            VmField::HddDiskCount => &mut self.hdd_disk_count,
            VmField::PricePerMonth => &mut self.price_per_month,
            VmField::AzureVmOverride => &mut self.azure_vm_override,
            VmField::Comments => &mut self.comments,
        };
        *slot = value;
    }
}

/// Coerced values. Fields that failed validation keep their defaults.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VmSpecValue {
    pub instance_name: String,
    pub os: Option<OsFamily>,
    pub cpu_cores: u32,
    pub memory_mb: f64,
    pub ssd_storage_gb: f64,
    pub ssd_disk_count: u32,
    pub hdd_storage_gb: f64,
    pub hdd_disk_count: u32,
    pub price_per_month: f64,
    pub azure_vm_override: String,
    pub comments: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct VmSpec {
    pub raw: VmSpecRaw,
    pub value: VmSpecValue,
    pub is_valid: bool,
    pub validation_message: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverrideSpecRaw {
    pub operating_system: String,
    pub cpu_cores: String,
    pub memory: String,
    pub number_of_data_disks: String,
    pub has_ssd_storage: String,
    pub azure_vm_override: String,
    pub mapped_sku: String,
    pub mapped_cores: String,
    pub mapped_memory: String,
    pub comments: String,
}

impl OverrideSpecRaw {
    pub fn get(&self, field: OverrideField) -> &str {
        match field {
            OverrideField::OperatingSystem => &self.operating_system,
            OverrideField::CpuCores => &self.cpu_cores,
            OverrideField::Memory => &self.memory,
            OverrideField::NumberOfDataDisks => &self.number_of_data_disks,
            OverrideField::HasSsdStorage => &self.has_ssd_storage,
            OverrideField::AzureVmOverride => &self.azure_vm_override,
            OverrideField::MappedSku => &self.mapped_sku,
            OverrideField::MappedCores => &self.mapped_cores,
            OverrideField::MappedMemory => &self.mapped_memory,
            OverrideField::Comments => &self.comments,
        }
    }

    pub fn set(&mut self, field: OverrideField, value: String) {
        let slot = match field {
            OverrideField::OperatingSystem => &mut self.operating_system,
            OverrideField::CpuCores => &mut self.cpu_cores,
            OverrideField::Memory => &mut self.memory,
            OverrideField::NumberOfDataDisks => &mut self.number_of_data_disks,
            OverrideField::HasSsdStorage => &mut self.has_ssd_storage,
            OverrideField::AzureVmOverride => &mut self.azure_vm_override,
            OverrideField::MappedSku => &mut self.mapped_sku,
            OverrideField::MappedCores => &mut self.mapped_cores,
            OverrideField::MappedMemory => &mut self.mapped_memory,
            OverrideField::Comments => &mut self.comments,
        };
        *slot = value;
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverrideSpecValue {
    pub os: Option<OsFamily>,
    pub cpu_cores: u32,
    pub memory_mb: f64,
    pub number_of_data_disks: u32,
    pub has_ssd_storage: bool,
    pub azure_vm_override: String,
    pub mapped_sku: String,
    /// Zero when no SKU was resolved.
    pub mapped_cores: u32,
    pub mapped_memory_mb: f64,
    pub comments: String,
}

/// One row of the override sheet: a VM signature and the SKU it should map to.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverrideSpec {
    pub raw: OverrideSpecRaw,
    pub value: OverrideSpecValue,
    pub is_valid: bool,
    pub validation_message: String,
}
