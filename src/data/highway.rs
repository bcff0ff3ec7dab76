use std::collections::BTreeSet;

use super::osm::{Element, MISSING_VALUE};

pub const HIGHWAY_KEY: &str = "highway";
pub const WIDTH_KEY: &str = "width";
pub const SURFACE_KEY: &str = "surface";

/// Substituted for a `width` or `surface` tag the element does not carry.
pub const NOT_AVAILABLE: &str = "N/A";

/// The attributes of one highway element that end up in the report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighwayAttributes {
    pub highway: String,
    pub width: String,
    pub surface: String,
}

impl From<&Element> for HighwayAttributes {
    fn from(element: &Element) -> Self {
        let tags = element.tag_map();
        HighwayAttributes {
            highway: tags.get_or(HIGHWAY_KEY, MISSING_VALUE),
            width: tags.get_or(WIDTH_KEY, NOT_AVAILABLE),
            surface: tags.get_or(SURFACE_KEY, NOT_AVAILABLE),
        }
    }
}

/// `(width, surface)` pair. Ordered by width, then surface.
pub type AttributeCombination = (String, String);

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HighwayRecord {
    /// Number of elements seen with this highway value.
    pub count: u64,
    pub combinations: BTreeSet<AttributeCombination>,
}

impl HighwayRecord {
    pub fn add(&mut self, width: String, surface: String) {
        self.count += 1;
        self.combinations.insert((width, surface));
    }
}
