//! Record normalization.
//!
//! Every source maps its raw response through [`RecordBuilder`], which fills
//! anything missing or blank with sentinel text so no field is ever dropped.

use crate::models::{DataSource, DrugRecord, TextOrList};

/// Generic placeholder for a value the source did not supply.
pub const NOT_AVAILABLE: &str = "Not available";

/// Date placeholder for the generative tiers.
pub const NOT_FROM_THIS_SOURCE: &str = "Not available from this source";

/// Date placeholder for the label registry, which is product-level only.
pub const BATCH_SPECIFIC_UNAVAILABLE: &str = "Batch-specific, not available in this database";

/// Builder for [`DrugRecord`].
#[derive(Debug, Clone)]
pub struct RecordBuilder {
    source: DataSource,
    date_fallback: &'static str,
    drug_name: Option<String>,
    generic_name: Option<String>,
    manufacturer: Option<String>,
    manufacturing_date: Option<String>,
    expiry_date: Option<String>,
    uses: Option<TextOrList>,
    dosage: Option<String>,
    side_effects: Option<TextOrList>,
    storage: Option<String>,
    nafdac_number: Option<String>,
}

impl RecordBuilder {
    pub fn new(source: DataSource) -> Self {
        Self {
            source,
            date_fallback: NOT_AVAILABLE,
            drug_name: None,
            generic_name: None,
            manufacturer: None,
            manufacturing_date: None,
            expiry_date: None,
            uses: None,
            dosage: None,
            side_effects: None,
            storage: None,
            nafdac_number: None,
        }
    }

    /// Sentinel used when manufacturing or expiry date is missing.
    pub fn date_fallback(mut self, sentinel: &'static str) -> Self {
        self.date_fallback = sentinel;
        self
    }

    pub fn drug_name(mut self, value: Option<String>) -> Self {
        self.drug_name = value;
        self
    }

    pub fn generic_name(mut self, value: Option<String>) -> Self {
        self.generic_name = value;
        self
    }

    pub fn manufacturer(mut self, value: Option<String>) -> Self {
        self.manufacturer = value;
        self
    }

    pub fn manufacturing_date(mut self, value: Option<String>) -> Self {
        self.manufacturing_date = value;
        self
    }

    pub fn expiry_date(mut self, value: Option<String>) -> Self {
        self.expiry_date = value;
        self
    }

    pub fn uses(mut self, value: Option<TextOrList>) -> Self {
        self.uses = value;
        self
    }

    pub fn dosage(mut self, value: Option<String>) -> Self {
        self.dosage = value;
        self
    }

    pub fn side_effects(mut self, value: Option<TextOrList>) -> Self {
        self.side_effects = value;
        self
    }

    pub fn storage(mut self, value: Option<String>) -> Self {
        self.storage = value;
        self
    }

    pub fn nafdac_number(mut self, value: Option<String>) -> Self {
        self.nafdac_number = value;
        self
    }

    pub fn build(self) -> DrugRecord {
        DrugRecord {
            drug_name: or_sentinel(self.drug_name, NOT_AVAILABLE),
            generic_name: or_sentinel(self.generic_name, NOT_AVAILABLE),
            manufacturer: or_sentinel(self.manufacturer, NOT_AVAILABLE),
            manufacturing_date: or_sentinel(self.manufacturing_date, self.date_fallback),
            expiry_date: or_sentinel(self.expiry_date, self.date_fallback),
            uses: list_or_sentinel(self.uses),
            dosage: or_sentinel(self.dosage, NOT_AVAILABLE),
            side_effects: list_or_sentinel(self.side_effects),
            storage: or_sentinel(self.storage, NOT_AVAILABLE),
            nafdac_number: non_blank(self.nafdac_number),
            data_source: self.source,
        }
    }
}

/// Trimmed value, or `None` when absent or blank.
pub fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn or_sentinel(value: Option<String>, sentinel: &str) -> String {
    non_blank(value).unwrap_or_else(|| sentinel.to_string())
}

fn list_or_sentinel(value: Option<TextOrList>) -> TextOrList {
    match value {
        Some(TextOrList::List(items)) => {
            let items: Vec<String> = items
                .into_iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
            if items.is_empty() {
                TextOrList::text(NOT_AVAILABLE)
            } else {
                TextOrList::List(items)
            }
        }
        Some(TextOrList::Text(text)) => TextOrList::text(or_sentinel(Some(text), NOT_AVAILABLE)),
        None => TextOrList::text(NOT_AVAILABLE),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_builder_fills_every_field() {
        let record = RecordBuilder::new(DataSource::UsFda).build();

        assert_eq!(record.drug_name, NOT_AVAILABLE);
        assert_eq!(record.generic_name, NOT_AVAILABLE);
        assert_eq!(record.manufacturer, NOT_AVAILABLE);
        assert_eq!(record.manufacturing_date, NOT_AVAILABLE);
        assert_eq!(record.expiry_date, NOT_AVAILABLE);
        assert_eq!(record.uses, TextOrList::text(NOT_AVAILABLE));
        assert_eq!(record.dosage, NOT_AVAILABLE);
        assert_eq!(record.side_effects, TextOrList::text(NOT_AVAILABLE));
        assert_eq!(record.storage, NOT_AVAILABLE);
        assert_eq!(record.nafdac_number, None);
        assert_eq!(record.data_source, DataSource::UsFda);
    }

    #[test]
    fn test_date_fallback() {
        let record = RecordBuilder::new(DataSource::AiKnowledgeBase)
            .date_fallback(NOT_FROM_THIS_SOURCE)
            .expiry_date(Some("2027-06".into()))
            .build();

        assert_eq!(record.manufacturing_date, NOT_FROM_THIS_SOURCE);
        assert_eq!(record.expiry_date, "2027-06");
    }

    #[test]
    fn test_blank_values_become_sentinels() {
        let record = RecordBuilder::new(DataSource::SimulatedNafdac)
            .drug_name(Some("  ".into()))
            .uses(Some(TextOrList::List(vec!["".into(), " ".into()])))
            .side_effects(Some(TextOrList::text("")))
            .nafdac_number(Some(" ".into()))
            .build();

        assert_eq!(record.drug_name, NOT_AVAILABLE);
        assert_eq!(record.uses, TextOrList::text(NOT_AVAILABLE));
        assert_eq!(record.side_effects, TextOrList::text(NOT_AVAILABLE));
        assert_eq!(record.nafdac_number, None);
    }

    #[test]
    fn test_values_are_trimmed() {
        let record = RecordBuilder::new(DataSource::SimulatedNafdac)
            .drug_name(Some(" Alabukun ".into()))
            .uses(Some(TextOrList::List(vec![" Headache ".into(), "".into()])))
            .nafdac_number(Some("04-0489 ".into()))
            .build();

        assert_eq!(record.drug_name, "Alabukun");
        assert_eq!(record.uses, TextOrList::List(vec!["Headache".into()]));
        assert_eq!(record.nafdac_number.as_deref(), Some("04-0489"));
    }
}
