// src/rates/mod.rs
pub mod meter;

use crate::model::Meter;
use std::collections::HashMap;
use std::fmt;
use tracing::debug;

/// Identifies one rate-card meter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceInfo {
    pub category: String,
    pub subcategory: String,
    pub name: String,
    pub region: String,
}

impl fmt::Display for ResourceInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "MeterCategory:{}, MeterSubCategory:{}, MeterName:{}, Region:{}",
            self.category, self.subcategory, self.name, self.region
        )
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RateError {
    #[error("Meter not found in Rate Card. MeterCategory:{category}, MeterSubCategory:{subcategory}, MeterName:{name}, Region:{region}")]
    MeterNotFound {
        category: String,
        subcategory: String,
        name: String,
        region: String,
    },
}

type MeterKey = (String, String, String);

fn key(category: &str, subcategory: &str, name: &str) -> MeterKey {
    (
        category.to_lowercase(),
        subcategory.to_lowercase(),
        name.to_lowercase(),
    )
}

/// Read-only price lookup over a rate card.
///
/// Meters are indexed by lowercased (category, subcategory, name); each
/// bucket keeps card order so the first match wins as in a linear scan.
#[derive(Debug, Default)]
pub struct RateCalc {
    meters: Vec<Meter>,
    index: HashMap<MeterKey, Vec<usize>>,
}

impl RateCalc {
    pub fn new(meters: Vec<Meter>) -> Self {
        let mut index: HashMap<MeterKey, Vec<usize>> = HashMap::new();
        for (i, m) in meters.iter().enumerate() {
            index
                .entry(key(&m.category, &m.subcategory, &m.name))
                .or_default()
                .push(i);
        }
        debug!(meters = meters.len(), keys = index.len(), "rate card indexed");
        Self { meters, index }
    }

    pub fn len(&self) -> usize {
        self.meters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meters.is_empty()
    }

    /// Meter for `info`: an exact region match first, then a region-less meter.
    pub fn find(&self, info: &ResourceInfo) -> Option<&Meter> {
        let bucket = self
            .index
            .get(&key(&info.category, &info.subcategory, &info.name))?;
        let region = info.region.trim();
        let candidates = bucket.iter().map(|&i| &self.meters[i]);
        candidates
            .clone()
            .find(|m| m.region.eq_ignore_ascii_case(region))
            .or_else(|| candidates.clone().find(|m| m.region.trim().is_empty()))
    }

    /// Unit price for `info`.
    pub fn rate(&self, info: &ResourceInfo) -> Result<f64, RateError> {
        self.find(info)
            .map(Meter::unit_price)
            .ok_or_else(|| RateError::MeterNotFound {
                category: info.category.clone(),
                subcategory: info.subcategory.clone(),
                name: info.name.clone(),
                region: info.region.clone(),
            })
    }
}
