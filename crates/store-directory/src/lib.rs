use std::borrow::Cow;
use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result, ensure};
use chrono::Weekday;
use serde::Deserialize;

pub use hours::WeeklyHours;
pub use panel::{DayRow, OverlayPanel, QrBlock};

/// Display order of the weekly hours block.
pub const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

pub fn day_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct StoreRecord {
    #[serde(alias = "storeNumber")]
    pub store_number: String,
    #[serde(default)]
    pub address: String,
    /// Weekday keys (`monday` .. `sunday`) sit directly on the record.
    #[serde(flatten)]
    pub hours: WeeklyHours,
    #[serde(default)]
    pub qr_code: Option<String>,
}

/// Lookup table of store records keyed by store number.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct StoreDirectory {
    stores: Vec<StoreRecord>,
}

impl StoreDirectory {
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read store directory {}", path.display()))?;
        Self::from_yaml_str(&raw)
            .with_context(|| format!("invalid store directory {}", path.display()))
    }

    pub fn from_yaml_str(raw: &str) -> Result<Self> {
        let directory: Self = serde_yaml::from_str(raw)?;
        directory.validate()?;
        Ok(directory)
    }

    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for (idx, store) in self.stores.iter().enumerate() {
            let number = store.store_number.trim();
            ensure!(
                !number.is_empty(),
                "stores[{}].store-number must not be blank",
                idx
            );
            ensure!(
                seen.insert(number),
                "duplicate store-number '{}' in store directory",
                number
            );
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.stores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stores.is_empty()
    }

    pub fn find(&self, store_number: &str) -> Option<&StoreRecord> {
        let wanted = store_number.trim();
        self.stores
            .iter()
            .find(|store| store.store_number.trim() == wanted)
    }

    /// Builds the overlay for `store_number`, or `None` when no record matches.
    pub fn build_overlay(&self, store_number: &str) -> Option<OverlayPanel> {
        self.find(store_number).map(OverlayPanel::from_record)
    }
}

mod hours {
    use super::*;

    #[derive(Debug, Clone, Default, Deserialize)]
    #[serde(rename_all = "kebab-case", default)]
    pub struct WeeklyHours {
        pub monday: Option<String>,
        pub tuesday: Option<String>,
        pub wednesday: Option<String>,
        pub thursday: Option<String>,
        pub friday: Option<String>,
        pub saturday: Option<String>,
        pub sunday: Option<String>,
    }

    impl WeeklyHours {
        const CLOSED: &'static str = "Closed";

        fn raw(&self, day: Weekday) -> Option<&String> {
            match day {
                Weekday::Mon => self.monday.as_ref(),
                Weekday::Tue => self.tuesday.as_ref(),
                Weekday::Wed => self.wednesday.as_ref(),
                Weekday::Thu => self.thursday.as_ref(),
                Weekday::Fri => self.friday.as_ref(),
                Weekday::Sat => self.saturday.as_ref(),
                Weekday::Sun => self.sunday.as_ref(),
            }
        }

        pub fn for_day(&self, day: Weekday) -> Cow<'_, str> {
            match self.raw(day) {
                Some(text) if !text.trim().is_empty() => Cow::Borrowed(text.trim()),
                _ => Cow::Borrowed(Self::CLOSED),
            }
        }
    }
}

mod panel {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct DayRow {
        pub weekday: Weekday,
        pub label: String,
        pub hours: String,
    }

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct QrBlock {
        pub image: String,
        pub caption: String,
    }

    /// Business-hours block composited next to every displayed image.
    ///
    /// All content is owned, so a `clone()` is a fully independent copy.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct OverlayPanel {
        pub headline: String,
        pub location: String,
        pub days: Vec<DayRow>,
        pub qr: Option<QrBlock>,
    }

    impl OverlayPanel {
        pub const HEADLINE: &'static str = "Office Hours";
        pub const QR_CAPTION: &'static str = "Make an appointment or find another office";

        pub fn from_record(record: &StoreRecord) -> Self {
            let days = WEEK
                .iter()
                .map(|day| DayRow {
                    weekday: *day,
                    label: format!("{}:", day_name(*day)),
                    hours: record.hours.for_day(*day).into_owned(),
                })
                .collect();
            let qr = record
                .qr_code
                .as_ref()
                .filter(|src| !src.trim().is_empty())
                .map(|src| QrBlock {
                    image: src.trim().to_string(),
                    caption: Self::QR_CAPTION.to_string(),
                });
            Self {
                headline: Self::HEADLINE.to_string(),
                location: record.address.trim().to_string(),
                days,
                qr,
            }
        }

        pub fn hours_for(&self, day: Weekday) -> Option<&str> {
            self.days
                .iter()
                .find(|row| row.weekday == day)
                .map(|row| row.hours.as_str())
        }

        /// Flattened text rendering, top to bottom.
        pub fn lines(&self) -> Vec<String> {
            let mut lines = Vec::with_capacity(self.days.len() + 4);
            lines.push(self.headline.clone());
            if !self.location.is_empty() {
                lines.push(self.location.clone());
            }
            for row in &self.days {
                lines.push(format!("{} {}", row.label, row.hours));
            }
            if let Some(qr) = &self.qr {
                lines.push(format!("[qr: {}] {}", qr.image, qr.caption));
            }
            lines
        }
    }
}
