use std::collections::BTreeMap;

use self::highway::{HighwayAttributes, HighwayRecord, HIGHWAY_KEY};
use self::osm::Document;

pub mod highway;
pub mod osm;

/// Highway value to its aggregated record, iterated in ascending order of the
/// highway value. Fully built before the report is rendered.

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct HighwaySummary {
    pub records: BTreeMap<String, HighwayRecord>,
}

impl HighwaySummary {
    pub fn add(&mut self, attributes: HighwayAttributes) {
        self.records.entry(attributes.highway)
            .or_default()
            .add(attributes.width, attributes.surface);
    }

    pub fn from_document(document: &Document) -> HighwaySummary {
        let mut summary = HighwaySummary::default();
        for element in document.elements_with_tag(HIGHWAY_KEY) {
            summary.add(element.into());
        }
        summary
    }

    pub fn element_count(&self) -> u64 {
        self.records.values().map(|record| record.count).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
