use crate::models::{CategoryRow, ConversionRow, ConversionStats, Record};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

pub const UNKNOWN_CATEGORY: &str = "unknown";

/// County values that mean "not asked yet" rather than a place.
pub const EXCLUDED_COUNTIES: [&str; 2] = ["questionar cliente", "sem informação"];

const CONVERTED_STATUSES: [&str; 2] = ["convertido", "converted"];
const NOT_ARCHIVED: [&str; 3] = ["nao", "não", "no"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryField {
    Origin,
    County,
    Status,
}

impl CategoryField {
    fn raw(self, record: &Record) -> Option<&str> {
        match self {
            CategoryField::Origin => record.origin.as_deref(),
            CategoryField::County => record.county.as_deref(),
            CategoryField::Status => record.status.as_deref(),
        }
    }

    fn excluded(self) -> &'static [&'static str] {
        match self {
            CategoryField::Origin | CategoryField::Status => &[],
            CategoryField::County => &EXCLUDED_COUNTIES,
        }
    }
}

/// Lower-cases a category, maps blanks to [`UNKNOWN_CATEGORY`] and returns
/// `None` for values the field excludes.
pub fn normalize_category(field: CategoryField, raw: Option<&str>) -> Option<String> {
    let value = raw
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_lowercase)
        .unwrap_or_else(|| UNKNOWN_CATEGORY.to_string());
    if field.excluded().contains(&value.as_str()) {
        None
    } else {
        Some(value)
    }
}

pub fn is_converted(record: &Record) -> bool {
    record
        .status
        .as_deref()
        .map(|status| status.trim().to_lowercase())
        .is_some_and(|status| CONVERTED_STATUSES.contains(&status.as_str()))
}

pub fn is_active(record: &Record) -> bool {
    record
        .archived
        .as_deref()
        .map(|archived| archived.trim().to_lowercase())
        .is_some_and(|archived| NOT_ARCHIVED.contains(&archived.as_str()))
}

pub fn active_count<'a, I>(records: I) -> usize
where
    I: IntoIterator<Item = &'a Record>,
{
    records.into_iter().filter(|record| is_active(record)).count()
}

pub fn tally<'a, I>(records: I, field: CategoryField) -> BTreeMap<String, usize>
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut counts = BTreeMap::new();
    for record in records {
        if let Some(category) = normalize_category(field, field.raw(record)) {
            *counts.entry(category).or_insert(0) += 1;
        }
    }
    counts
}

/// One row per category seen in either period, largest current count first.
pub fn compare_by<'a, C, P>(current: C, previous: P, field: CategoryField) -> Vec<CategoryRow>
where
    C: IntoIterator<Item = &'a Record>,
    P: IntoIterator<Item = &'a Record>,
{
    let current = tally(current, field);
    let previous = tally(previous, field);
    let categories: BTreeSet<&String> = current.keys().chain(previous.keys()).collect();

    let mut rows: Vec<CategoryRow> = categories
        .into_iter()
        .map(|category| CategoryRow {
            category: category.clone(),
            current: current.get(category).copied().unwrap_or(0),
            previous: previous.get(category).copied().unwrap_or(0),
        })
        .collect();
    rows.sort_by(|a, b| {
        rank(
            (a.current, a.previous, a.category.as_str()),
            (b.current, b.previous, b.category.as_str()),
        )
    });
    rows
}

/// Percentage rounded to one decimal; zero when there is nothing to divide.
pub fn conversion_rate(converted: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let rate = converted as f64 / total as f64 * 100.0;
    (rate * 10.0).round() / 10.0
}

pub fn conversion_by<'a, C, P>(current: C, previous: P, field: CategoryField) -> Vec<ConversionRow>
where
    C: IntoIterator<Item = &'a Record>,
    P: IntoIterator<Item = &'a Record>,
{
    let current = conversion_tally(current, field);
    let previous = conversion_tally(previous, field);
    let categories: BTreeSet<&String> = current.keys().chain(previous.keys()).collect();

    let mut rows: Vec<ConversionRow> = categories
        .into_iter()
        .map(|category| ConversionRow {
            category: category.clone(),
            current: current.get(category).copied().unwrap_or_default(),
            previous: previous.get(category).copied().unwrap_or_default(),
        })
        .collect();
    rows.sort_by(|a, b| {
        rank(
            (a.current.total, a.previous.total, a.category.as_str()),
            (b.current.total, b.previous.total, b.category.as_str()),
        )
    });
    rows
}

fn conversion_tally<'a, I>(records: I, field: CategoryField) -> BTreeMap<String, ConversionStats>
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut stats: BTreeMap<String, ConversionStats> = BTreeMap::new();
    for record in records {
        let Some(category) = normalize_category(field, field.raw(record)) else {
            continue;
        };
        let entry = stats.entry(category).or_default();
        entry.total += 1;
        if is_converted(record) {
            entry.converted += 1;
        }
    }
    for entry in stats.values_mut() {
        entry.rate = conversion_rate(entry.converted, entry.total);
    }
    stats
}

fn rank(a: (usize, usize, &str), b: (usize, usize, &str)) -> Ordering {
    b.0.cmp(&a.0)
        .then_with(|| b.1.cmp(&a.1))
        .then_with(|| a.2.cmp(b.2))
}
