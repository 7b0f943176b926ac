use crate::model::{SkuSeries, VmSize};
use std::collections::HashSet;
use tracing::debug;

/// Keep the SKUs belonging to `series`, grouped in series order and in
/// catalog order within a series. Promotional SKUs are dropped and a SKU
/// matching several series is kept once, under the first.
pub fn filter_vm_sizes(sizes: &[VmSize], series: &[SkuSeries]) -> Vec<VmSize> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut out = Vec::new();
    for s in series {
        for size in sizes {
            if size.name.to_uppercase().contains("PROMO") || !s.matches(&size.name) {
                continue;
            }
            if seen.insert(size.name.as_str()) {
                out.push(size.clone());
            }
        }
    }
    debug!(catalog = sizes.len(), kept = out.len(), "filtered VM sizes");
    out
}
