// src/cost/mod.rs
use crate::model::{MappedDisk, MappingResult};
use crate::rates::meter::disk_resource;
use crate::rates::{RateCalc, RateError};

/// Monthly price of a disk list: unit rate times count per row.
pub fn disks_monthly_cost(
    disks: &[MappedDisk],
    region: &str,
    rates: &RateCalc,
) -> Result<f64, RateError> {
    disks.iter().try_fold(0.0, |acc, d| {
        let rate = rates.rate(&disk_resource(d.disk, region))?;
        Ok(acc + rate * f64::from(d.count))
    })
}

/// Fill the cost fields of a projected result. Results without a SKU keep
/// every cost at zero. A disk size the rate card does not price is an error.
pub fn aggregate(
    result: &mut MappingResult,
    region: &str,
    rates: &RateCalc,
    hours_per_month: f64,
) -> Result<(), RateError> {
    let price_per_month = result.spec.value.price_per_month;
    let p = &mut result.projected;
    if p.vm_size.is_none() || p.no_map_found {
        return Ok(());
    }
    p.premium_disk_monthly_cost = disks_monthly_cost(&p.premium_disks, region, rates)?;
    p.standard_disk_monthly_cost = disks_monthly_cost(&p.standard_disks, region, rates)?;
    p.compute_monthly_cost = p.compute_hour_rate * hours_per_month;
    p.total_monthly_cost =
        p.compute_monthly_cost + p.premium_disk_monthly_cost + p.standard_disk_monthly_cost;
    p.monthly_margin = price_per_month - p.total_monthly_cost;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::disk::{PREMIUM_DISKS, STANDARD_DISKS};
    use crate::model::{Meter, VmSize, VmSpec};
    use std::collections::BTreeMap;

    fn disk_meter(name: &str, rate: f64) -> Meter {
        Meter {
            name: name.into(),
            category: "Storage".into(),
            subcategory: "Locally Redundant".into(),
            region: "US West".into(),
            rates: BTreeMap::from([("0".to_string(), rate)]),
            ..Meter::default()
        }
    }

    fn rates() -> RateCalc {
        RateCalc::new(vec![
            disk_meter("Standard Managed Disk/S30 (Units)", 40.96),
            disk_meter("Standard Managed Disk/S4 (Units)", 1.54),
            disk_meter("Premium Storage - Page Blob/P4 (Units)", 5.28),
        ])
    }

    fn mapped_result() -> MappingResult {
        let mut spec = VmSpec::default();
        spec.value.price_per_month = 325.0;
        let mut r = MappingResult::new(spec);
        r.projected.vm_size = Some(VmSize {
            name: "Standard_A4_v2".into(),
            number_of_cores: 4,
            os_disk_size_in_mb: 0,
            resource_disk_size_in_mb: 0,
            memory_in_mb: 8192.0,
            max_data_disk_count: 8,
        });
        r.projected.compute_hour_rate = 0.25;
        r.projected.standard_disks = vec![
            MappedDisk {
                disk: &STANDARD_DISKS[4],
                count: 2,
            },
            MappedDisk {
                disk: &STANDARD_DISKS[0],
                count: 1,
            },
        ];
        r
    }

    #[test]
    fn totals_and_margin() -> Result<(), RateError> {
        let rates = rates();
        let mut r = mapped_result();
        aggregate(&mut r, "US West", &rates, 744.0)?;
        let p = &r.projected;
        assert_eq!(p.compute_monthly_cost, 186.0);
        assert!((p.standard_disk_monthly_cost - 83.46).abs() < 1e-9);
        assert_eq!(p.premium_disk_monthly_cost, 0.0);
        assert!((p.total_monthly_cost - 269.46).abs() < 1e-9);
        assert!((p.monthly_margin - 55.54).abs() < 1e-9);
        Ok(())
    }

    #[test]
    fn unmapped_result_costs_nothing() -> Result<(), RateError> {
        let rates = rates();
        let mut r = mapped_result();
        r.projected.vm_size = None;
        r.projected.no_map_found = true;
        aggregate(&mut r, "US West", &rates, 744.0)?;
        assert_eq!(r.projected.total_monthly_cost, 0.0);
        assert_eq!(r.projected.standard_disk_monthly_cost, 0.0);
        assert_eq!(r.projected.monthly_margin, 0.0);
        Ok(())
    }

    #[test]
    fn unpriced_disk_is_fatal() {
        let rates = rates();
        let mut r = mapped_result();
        r.projected.premium_disks.push(MappedDisk {
            disk: &PREMIUM_DISKS[6],
            count: 1,
        });
        let err = aggregate(&mut r, "US West", &rates, 744.0).unwrap_err();
        assert!(matches!(err, RateError::MeterNotFound { ref name, .. } if name.contains("P50")));
    }
}
