use super::RawTable;
use crate::model::{OverrideField, OverrideSpecRaw, VmField, VmSpecRaw};
use tracing::warn;

/// Assign cells to inventory fields by position. Rows shorter than the
/// sequence are dropped.
pub fn vm_specs_from_table(table: &RawTable, sequence: &[VmField]) -> Vec<VmSpecRaw> {
    let mut out = Vec::with_capacity(table.rows.len());
    for (i, row) in table.rows.iter().enumerate() {
        if row.len() < sequence.len() {
            warn!(row = i, cells = row.len(), expected = sequence.len(), "discarding short VM spec row");
            continue;
        }
        let mut raw = VmSpecRaw::default();
        for (field, cell) in sequence.iter().zip(row) {
            raw.set(*field, cell.clone());
        }
        out.push(raw);
    }
    out
}

pub fn override_specs_from_table(table: &RawTable, sequence: &[OverrideField]) -> Vec<OverrideSpecRaw> {
    let mut out = Vec::with_capacity(table.rows.len());
    for (i, row) in table.rows.iter().enumerate() {
        if row.len() < sequence.len() {
            warn!(row = i, cells = row.len(), expected = sequence.len(), "discarding short override row");
            continue;
        }
        let mut raw = OverrideSpecRaw::default();
        for (field, cell) in sequence.iter().zip(row) {
            raw.set(*field, cell.clone());
        }
        out.push(raw);
    }
    out
}
