//! Price-to-credits configuration
//!
//! Credit packs can come from the config file as a list, or from a single
//! `price_id=credits,...` string that is easy to set through the
//! environment. Both are merged; table entries win on conflict.

use serde::Deserialize;

use crate::domain::credits::PriceCreditTable;

use super::error::ValidationError;

/// One purchasable credit pack.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreditPack {
    pub price_id: String,
    pub credits: u32,
}

/// Pricing configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PricingConfig {
    /// Credit packs, usually from the config file
    #[serde(default)]
    pub packs: Vec<CreditPack>,

    /// Inline table, e.g. `price_a=1,price_b=3`
    #[serde(default)]
    pub table: Option<String>,
}

impl PricingConfig {
    /// Build the immutable lookup table.
    pub fn to_table(&self) -> Result<PriceCreditTable, ValidationError> {
        let mut entries: Vec<(String, u32)> = self
            .packs
            .iter()
            .map(|pack| (pack.price_id.clone(), pack.credits))
            .collect();

        if let Some(table) = &self.table {
            entries.extend(parse_table(table)?);
        }

        PriceCreditTable::new(entries)
            .map_err(|e| ValidationError::InvalidPriceTable(e.to_string()))
    }

    /// Validate pricing configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.to_table().map(|_| ())
    }
}

fn parse_table(table: &str) -> Result<Vec<(String, u32)>, ValidationError> {
    table
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let (price_id, credits) = entry.split_once('=').ok_or_else(|| {
                ValidationError::InvalidPriceTable(format!(
                    "expected price_id=credits, got {:?}",
                    entry
                ))
            })?;
            let credits = credits.trim().parse::<u32>().map_err(|_| {
                ValidationError::InvalidPriceTable(format!(
                    "credits for {} must be a positive integer",
                    price_id.trim()
                ))
            })?;
            Ok((price_id.trim().to_string(), credits))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_string_is_parsed() {
        let config = PricingConfig {
            table: Some("price_a=1, price_b = 3,".to_string()),
            ..Default::default()
        };

        let table = config.to_table().unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.credits_for("price_b").unwrap(), 3);
    }

    #[test]
    fn packs_and_table_are_merged() {
        let config = PricingConfig {
            packs: vec![
                CreditPack {
                    price_id: "price_a".to_string(),
                    credits: 1,
                },
                CreditPack {
                    price_id: "price_b".to_string(),
                    credits: 3,
                },
            ],
            table: Some("price_b=4,price_c=10".to_string()),
        };

        let table = config.to_table().unwrap();

        assert_eq!(table.len(), 3);
        assert_eq!(table.credits_for("price_a").unwrap(), 1);
        assert_eq!(table.credits_for("price_b").unwrap(), 4);
    }

    #[test]
    fn empty_pricing_is_rejected() {
        assert!(matches!(
            PricingConfig::default().validate(),
            Err(ValidationError::InvalidPriceTable(_))
        ));
    }

    #[test]
    fn zero_credits_are_rejected() {
        let config = PricingConfig {
            table: Some("price_free=0".to_string()),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn malformed_entries_are_rejected() {
        for bad in ["price_a", "price_a=many", "price_a=-1"] {
            let config = PricingConfig {
                table: Some(bad.to_string()),
                ..Default::default()
            };
            assert!(config.validate().is_err(), "accepted {:?}", bad);
        }
    }

    #[test]
    fn price_ids_keep_their_case() {
        let config = PricingConfig {
            table: Some("price_1RrF9XJ5UE8iZKVwKll2NABR=1".to_string()),
            ..Default::default()
        };
        let table = config.to_table().unwrap();
        assert!(table.credits_for("price_1RrF9XJ5UE8iZKVwKll2NABR").is_ok());
        assert!(table.credits_for("price_1rrf9xj5ue8izkvwkll2nabr").is_err());
    }
}
