pub mod disk;
pub mod ratecard;
pub mod result;
pub mod sku;
pub mod spec;

pub use disk::{ManagedDisk, MappedDisk, PREMIUM_DISKS, STANDARD_DISKS};
pub use ratecard::{Meter, RateCard};
pub use result::{MappingResult, ProjectedSku};
pub use sku::{SkuSeries, VmSize, VmSizeList};
pub use spec::{
    OsFamily, OverrideField, OverrideSpec, OverrideSpecRaw, OverrideSpecValue, VmField, VmSpec,
    VmSpecRaw, VmSpecValue,
};
