use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use anyhow::{Context, bail};
use chrono::{Datelike, NaiveDate, Weekday};
use once_cell::sync::Lazy;

/// Chilean public holidays, (month, day) per year.
const CHILE_2025: &[(u32, u32)] = &[
    (1, 1),   // Año Nuevo
    (4, 18),  // Viernes Santo
    (4, 19),  // Sábado Santo
    (5, 1),   // Día del Trabajador
    (5, 21),  // Glorias Navales
    (6, 20),  // Pueblos Indígenas
    (6, 29),  // San Pedro y San Pablo
    (7, 16),  // Virgen del Carmen
    (8, 15),  // Asunción
    (9, 18),  // Independencia
    (9, 19),  // Glorias del Ejército
    (10, 31), // Iglesias Evangélicas
    (12, 8),  // Inmaculada Concepción
    (12, 25), // Navidad
];

const CHILE_2026: &[(u32, u32)] = &[
    (1, 1),
    (4, 3),
    (4, 4),
    (5, 1),
    (5, 21),
    (6, 20),
    (6, 29),
    (7, 16),
    (8, 15),
    (9, 18),
    (9, 19),
    (10, 12),
    (10, 31),
    (12, 8),
    (12, 25),
];

static BUILT_IN: Lazy<HolidayCalendar> = Lazy::new(|| {
    let mut calendar = HolidayCalendar::empty();
    for (year, days) in [(2025, CHILE_2025), (2026, CHILE_2026)] {
        let dates = days
            .iter()
            .filter_map(|&(m, d)| NaiveDate::from_ymd_opt(year, m, d));
        calendar.set_year(year, dates);
    }
    calendar
});

/// Public holidays indexed by year. A year without an entry has no
/// holidays; only weekends are excluded for it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HolidayCalendar {
    by_year: BTreeMap<i32, BTreeSet<NaiveDate>>,
}

impl HolidayCalendar {
    pub fn empty() -> Self {
        Self::default()
    }

    /// The holiday tables the service ships with.
    pub fn built_in() -> Self {
        BUILT_IN.clone()
    }

    /// Built-in tables overlaid with a JSON file of the form
    /// `{"2027": ["2027-01-01", ...]}`. A year present in the file replaces
    /// the built-in list for that year.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading holiday file {}", path.display()))?;
        let mut calendar = Self::built_in();
        calendar.merge_json(&raw)?;
        Ok(calendar)
    }

    pub fn merge_json(&mut self, raw: &str) -> anyhow::Result<()> {
        let table: BTreeMap<i32, Vec<NaiveDate>> =
            serde_json::from_str(raw).context("holiday file must map years to ISO dates")?;

        for (year, dates) in table {
            if let Some(stray) = dates.iter().find(|d| d.year() != year) {
                bail!("holiday {stray} is listed under year {year}");
            }
            self.set_year(year, dates);
        }
        Ok(())
    }

    pub fn set_year(&mut self, year: i32, dates: impl IntoIterator<Item = NaiveDate>) {
        self.by_year.insert(year, dates.into_iter().collect());
    }

    pub fn holidays(&self, year: i32) -> Vec<NaiveDate> {
        self.by_year
            .get(&year)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn is_holiday(&self, date: NaiveDate) -> bool {
        self.by_year
            .get(&date.year())
            .is_some_and(|set| set.contains(&date))
    }

    pub fn is_business_day(&self, date: NaiveDate) -> bool {
        !matches!(date.weekday(), Weekday::Sat | Weekday::Sun) && !self.is_holiday(date)
    }
}

/// Working days in `[start, end]`, both ends included. Each date is checked
/// against the holiday table of its own year, so ranges may cross a new year.
pub fn business_days(start: NaiveDate, end: NaiveDate, calendar: &HolidayCalendar) -> u32 {
    start
        .iter_days()
        .take_while(|day| *day <= end)
        .filter(|day| calendar.is_business_day(*day))
        .count() as u32
}
