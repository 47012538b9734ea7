//! Outage categories and category-indexed maps.

use core::fmt;
use core::ops::{Index, IndexMut};
use core::str::FromStr;

/// The classification of one second of telemetry.
///
/// The first four variants are outage types; [`Category::Connected`] covers
/// every second that does not count as an outage under the current
/// thresholds, including outages overruled by throughput.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Category {
    /// Synthetic filler for seconds that were lost between snapshots.
    Unrecorded,
    /// No satellite was scheduled for the terminal.
    #[cfg_attr(feature = "serde", serde(rename = "nosatellite"))]
    NoSatellite,
    /// The terminal reported an obstruction, or the second was reclassified
    /// because it borders one.
    Obstructed,
    /// Loss with a satellite in view and no obstruction.
    Betadown,
    /// Not an outage.
    Connected,
}

impl Category {
    /// Every category, in map order.
    pub const ALL: [Category; 5] = [
        Category::Unrecorded,
        Category::NoSatellite,
        Category::Obstructed,
        Category::Betadown,
        Category::Connected,
    ];

    /// The outage categories (everything except `Connected`).
    pub const OUTAGES: [Category; 4] = [
        Category::Unrecorded,
        Category::NoSatellite,
        Category::Obstructed,
        Category::Betadown,
    ];

    /// Stable lowercase name, used in config files and serialized output.
    pub const fn name(&self) -> &'static str {
        match self {
            Category::Unrecorded => "unrecorded",
            Category::NoSatellite => "nosatellite",
            Category::Obstructed => "obstructed",
            Category::Betadown => "betadown",
            Category::Connected => "connected",
        }
    }

    /// Returns true for every category except `Connected`.
    pub const fn is_outage(&self) -> bool {
        !matches!(self, Category::Connected)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a string does not name a category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseCategoryError;

impl fmt::Display for ParseCategoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("expected one of: unrecorded, nosatellite, obstructed, betadown, connected")
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ParseCategoryError {}

impl FromStr for Category {
    type Err = ParseCategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.name().eq_ignore_ascii_case(s.trim()))
            .ok_or(ParseCategoryError)
    }
}

/// A value for each [`Category`].
///
/// Named fields rather than a keyed collection: every category is always
/// present and serializes under its lowercase name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CategoryMap<T> {
    pub unrecorded: T,
    pub nosatellite: T,
    pub obstructed: T,
    pub betadown: T,
    pub connected: T,
}

impl<T: Clone> CategoryMap<T> {
    /// A map with the same value for every category.
    pub fn filled(value: T) -> Self {
        Self {
            unrecorded: value.clone(),
            nosatellite: value.clone(),
            obstructed: value.clone(),
            betadown: value.clone(),
            connected: value,
        }
    }
}

impl<T> CategoryMap<T> {
    /// Build a map by calling `f` once per category.
    pub fn from_fn(mut f: impl FnMut(Category) -> T) -> Self {
        Self {
            unrecorded: f(Category::Unrecorded),
            nosatellite: f(Category::NoSatellite),
            obstructed: f(Category::Obstructed),
            betadown: f(Category::Betadown),
            connected: f(Category::Connected),
        }
    }

    /// Iterate over `(category, value)` pairs in [`Category::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = (Category, &T)> {
        Category::ALL.into_iter().map(move |c| (c, &self[c]))
    }
}

impl<T> Index<Category> for CategoryMap<T> {
    type Output = T;

    fn index(&self, category: Category) -> &T {
        match category {
            Category::Unrecorded => &self.unrecorded,
            Category::NoSatellite => &self.nosatellite,
            Category::Obstructed => &self.obstructed,
            Category::Betadown => &self.betadown,
            Category::Connected => &self.connected,
        }
    }
}

impl<T> IndexMut<Category> for CategoryMap<T> {
    fn index_mut(&mut self, category: Category) -> &mut T {
        match category {
            Category::Unrecorded => &mut self.unrecorded,
            Category::NoSatellite => &mut self.nosatellite,
            Category::Obstructed => &mut self.obstructed,
            Category::Betadown => &mut self.betadown,
            Category::Connected => &mut self.connected,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_category_names() {
        for category in Category::ALL {
            assert_eq!(category.name().parse::<Category>(), Ok(category));
        }
        assert_eq!(" Obstructed ".parse::<Category>(), Ok(Category::Obstructed));
        assert!("snr".parse::<Category>().is_err());
    }

    #[test]
    fn test_category_map_indexing() {
        let mut map: CategoryMap<u32> = CategoryMap::default();
        map[Category::Betadown] += 3;
        map[Category::Connected] = 7;

        assert_eq!(map.betadown, 3);
        assert_eq!(map.connected, 7);
        let total: u32 = map.iter().map(|(_, v)| *v).sum();
        assert_eq!(total, 10);
    }

    #[test]
    fn test_only_connected_is_not_outage() {
        assert!(!Category::Connected.is_outage());
        assert!(Category::OUTAGES.iter().all(Category::is_outage));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&Category::NoSatellite).unwrap();
        assert_eq!(json, "\"nosatellite\"");

        let map = CategoryMap::from_fn(|c| c == Category::Obstructed);
        let value = serde_json::to_value(map).unwrap();
        assert_eq!(value["obstructed"], true);
        assert_eq!(value["nosatellite"], false);
    }
}
