use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Rate card document as returned by the billing API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateCard {
    #[serde(rename = "Meters", default)]
    pub meters: Option<Vec<Meter>>,
    #[serde(rename = "Currency", default)]
    pub currency: String,
    #[serde(rename = "Locale", default)]
    pub locale: String,
    #[serde(rename = "IsTaxIncluded", default)]
    pub is_tax_included: bool,
}

/// A priced billable item.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Meter {
    #[serde(rename = "id", default)]
    pub id: String,
    #[serde(rename = "name", default)]
    pub name: String,
    #[serde(rename = "category", default)]
    pub category: String,
    #[serde(rename = "subcategory", default)]
    pub subcategory: String,
    #[serde(rename = "unit", default)]
    pub unit: String,
    #[serde(rename = "region", default)]
    pub region: String,
    /// Tier threshold → unit price.
    #[serde(rename = "rates", default)]
    pub rates: BTreeMap<String, f64>,
    #[serde(rename = "effectiveDate", default)]
    pub effective_date: String,
    #[serde(rename = "includedQuantity", default)]
    pub included_quantity: f64,
}

impl Meter {
    /// Price of the tier with the smallest numeric threshold key, usually
    /// `"0"`. Tiers are picked by key, not by their order in the document,
    /// and usage is treated as flat. Non-numeric keys sort last.
    pub fn unit_price(&self) -> f64 {
        self.rates
            .iter()
            .min_by(|(a, _), (b, _)| {
                let a = a.trim().parse::<f64>().unwrap_or(f64::MAX);
                let b = b.trim().parse::<f64>().unwrap_or(f64::MAX);
                a.total_cmp(&b)
            })
            .map(|(_, rate)| *rate)
            .unwrap_or(0.0)
    }
}

impl RateCard {
    /// Parse the raw JSON document, rejecting a card with no meters.
    pub fn parse(raw: &str) -> Result<Self> {
        let card: RateCard = serde_json::from_str(raw).context("parsing rate card JSON")?;
        match &card.meters {
            Some(meters) if !meters.is_empty() => Ok(card),
            _ => bail!("Error occured while fetching Rate Card. No records received."),
        }
    }

    pub fn meters(&self) -> &[Meter] {
        self.meters.as_deref().unwrap_or(&[])
    }

    pub fn into_meters(self) -> Vec<Meter> {
        self.meters.unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_card_and_picks_lowest_threshold_tier() -> Result<()> {
        let raw = r#"{
            "Currency": "USD",
            "Locale": "en-US",
            "IsTaxIncluded": false,
            "Meters": [{
                "id": "abc",
                "name": "Compute Hours",
                "category": "Virtual Machines",
                "subcategory": "D1 VM",
                "unit": "1 Hour",
                "region": "US West",
                "rates": {"10": 0.05, "0": 0.08},
                "effectiveDate": "2017-01-01T00:00:00Z",
                "includedQuantity": 0
            }]
        }"#;
        let card = RateCard::parse(raw)?;
        assert_eq!(card.currency, "USD");
        assert_eq!(card.meters().len(), 1);
        assert_eq!(card.meters()[0].unit_price(), 0.08);
        Ok(())
    }

    #[test]
    fn rejects_empty_card() {
        assert!(RateCard::parse(r#"{"Currency": "USD", "Meters": []}"#).is_err());
        assert!(RateCard::parse(r#"{"Currency": "USD"}"#).is_err());
        assert!(RateCard::parse("not json").is_err());
    }

    #[test]
    fn tiers_compare_numerically() {
        let meter = Meter {
            rates: BTreeMap::from([
                ("100".to_string(), 0.02),
                ("20".to_string(), 0.04),
                ("other".to_string(), 0.01),
            ]),
            ..Meter::default()
        };
        assert_eq!(meter.unit_price(), 0.04);
    }

    #[test]
    fn meter_without_tiers_is_free() {
        assert_eq!(Meter::default().unit_price(), 0.0);
    }
}
