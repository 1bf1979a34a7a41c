//! Period bucketing and period-over-period windows.
//!
//! Every granularity has one meaning here: weeks start on Sunday, and `all`
//! groups by calendar year. Bucket keys are ISO-style strings so they sort in
//! chronological order.

use crate::models::{Bucket, Record};
use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

const MONTHS_LONG: [&str; 12] = [
    "janeiro", "fevereiro", "março", "abril", "maio", "junho", "julho", "agosto", "setembro",
    "outubro", "novembro", "dezembro",
];

const MONTHS_SHORT: [&str; 12] = [
    "jan", "fev", "mar", "abr", "mai", "jun", "jul", "ago", "set", "out", "nov", "dez",
];

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Years a registration timestamp may carry. Period arithmetic stays far from
/// chrono's representable limits inside this range.
const YEARS: std::ops::RangeInclusive<i32> = 1..=9999;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    #[serde(alias = "today")]
    Day,
    Week,
    #[default]
    Month,
    Year,
    All,
}

impl Granularity {
    pub const ALL: [Granularity; 5] = [
        Granularity::Day,
        Granularity::Week,
        Granularity::Month,
        Granularity::Year,
        Granularity::All,
    ];
}

/// Closed interval; `end` is the last representable instant of the period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl Interval {
    pub fn contains(&self, ts: NaiveDateTime) -> bool {
        self.start <= ts && ts <= self.end
    }

    fn capped_at(self, now: NaiveDateTime) -> Self {
        Self {
            start: self.start,
            end: self.end.min(now),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketKey {
    pub key: String,
    pub label: String,
    pub start: NaiveDate,
}

/// Records of the selected period and, when a comparison exists, of the one
/// before it.
#[derive(Debug, Default)]
pub struct PeriodSplit<'a> {
    pub current: Vec<&'a Record>,
    pub previous: Option<Vec<&'a Record>>,
}

/// Parses the ISO-style timestamps the spreadsheet hands back. Offsets are
/// dropped after conversion to the offset's own wall clock. Years outside
/// 1..=9999 are rejected.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    parse_any(raw).filter(|ts| YEARS.contains(&ts.year()))
}

fn parse_any(raw: &str) -> Option<NaiveDateTime> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Some(ts.naive_local());
    }
    for format in DATETIME_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(value, format) {
            return Some(ts);
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .map(|date| date.and_time(NaiveTime::MIN))
}

/// Pairs each record with its registration timestamp, dropping (and logging)
/// records whose timestamp is absent or malformed.
pub fn timestamped<'a, I>(records: I) -> impl Iterator<Item = (&'a Record, NaiveDateTime)>
where
    I: IntoIterator<Item = &'a Record>,
{
    records.into_iter().filter_map(|record| {
        let Some(raw) = record
            .registered_at
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
        else {
            warn!(
                record_id = %record.id,
                kind = record.kind.as_str(),
                "skipping record without registration timestamp"
            );
            return None;
        };
        match parse_timestamp(raw) {
            Some(ts) => Some((record, ts)),
            None => {
                warn!(
                    record_id = %record.id,
                    kind = record.kind.as_str(),
                    value = raw,
                    "skipping record with malformed registration timestamp"
                );
                None
            }
        }
    })
}

pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_sunday()))
}

pub fn period_start(granularity: Granularity, date: NaiveDate) -> NaiveDate {
    match granularity {
        Granularity::Day => date,
        Granularity::Week => week_start(date),
        Granularity::Month => date - Duration::days(i64::from(date.day0())),
        Granularity::Year | Granularity::All => date - Duration::days(i64::from(date.ordinal0())),
    }
}

/// Moves a period start by `periods` whole periods. `start` must already be
/// aligned with [`period_start`].
pub fn shift_period(granularity: Granularity, start: NaiveDate, periods: i32) -> Option<NaiveDate> {
    let months = |count: u32| {
        if periods >= 0 {
            start.checked_add_months(Months::new(count))
        } else {
            start.checked_sub_months(Months::new(count))
        }
    };
    match granularity {
        Granularity::Day => start.checked_add_signed(Duration::days(i64::from(periods))),
        Granularity::Week => start.checked_add_signed(Duration::weeks(i64::from(periods))),
        Granularity::Month => months(periods.unsigned_abs()),
        Granularity::Year | Granularity::All => months(periods.unsigned_abs().checked_mul(12)?),
    }
}

fn period_interval(granularity: Granularity, date: NaiveDate) -> Option<Interval> {
    let start = period_start(granularity, date);
    let next = shift_period(granularity, start, 1)?;
    Some(Interval {
        start: start.and_time(NaiveTime::MIN),
        end: next.and_time(NaiveTime::MIN) - Duration::nanoseconds(1),
    })
}

/// The period containing `now`. `None` for [`Granularity::All`], which is
/// unbounded.
pub fn current_interval(granularity: Granularity, now: NaiveDateTime) -> Option<Interval> {
    match granularity {
        Granularity::All => None,
        _ => period_interval(granularity, now.date()),
    }
}

/// The period immediately before the one containing `now`. `None` for
/// [`Granularity::All`]: there is nothing to compare against.
pub fn previous_interval(granularity: Granularity, now: NaiveDateTime) -> Option<Interval> {
    if granularity == Granularity::All {
        return None;
    }
    let current = period_start(granularity, now.date());
    period_interval(granularity, shift_period(granularity, current, -1)?)
}

/// The previous period cut at the same elapsed offset as `now` inside the
/// current one.
pub fn realtime_previous_interval(granularity: Granularity, now: NaiveDateTime) -> Option<Interval> {
    let current = current_interval(granularity, now)?;
    let previous = previous_interval(granularity, now)?;
    let elapsed = now - current.start;
    Some(previous.capped_at(previous.start + elapsed))
}

/// Splits `records` into the current and previous periods relative to `now`.
///
/// With `realtime` set, records dated after `now` are left out of the current
/// period and the previous period is truncated to the same elapsed stretch.
pub fn filter_period<'a, I>(
    records: I,
    granularity: Granularity,
    now: NaiveDateTime,
    realtime: bool,
) -> PeriodSplit<'a>
where
    I: IntoIterator<Item = &'a Record>,
{
    split_dated(timestamped(records), granularity, now, realtime)
}

/// [`filter_period`] over records already paired with their timestamps.
pub fn split_dated<'a, I>(
    dated: I,
    granularity: Granularity,
    now: NaiveDateTime,
    realtime: bool,
) -> PeriodSplit<'a>
where
    I: IntoIterator<Item = (&'a Record, NaiveDateTime)>,
{
    let current_window = current_interval(granularity, now).map(|window| {
        if realtime {
            window.capped_at(now)
        } else {
            window
        }
    });
    let previous_window = if realtime {
        realtime_previous_interval(granularity, now)
    } else {
        previous_interval(granularity, now)
    };

    let mut split = PeriodSplit {
        current: Vec::new(),
        previous: previous_window.map(|_| Vec::new()),
    };
    for (record, ts) in dated {
        let in_current = match current_window {
            Some(window) => window.contains(ts),
            None => !realtime || ts <= now,
        };
        if in_current {
            split.current.push(record);
        }
        if let (Some(window), Some(previous)) = (previous_window, split.previous.as_mut()) {
            if window.contains(ts) {
                previous.push(record);
            }
        }
    }
    split
}

pub fn bucket_for(ts: NaiveDateTime, granularity: Granularity) -> BucketKey {
    let start = period_start(granularity, ts.date());
    let (key, label) = match granularity {
        Granularity::Day => (
            start.format("%Y-%m-%d").to_string(),
            format!(
                "{:02} {} {}",
                start.day(),
                MONTHS_LONG[start.month0() as usize],
                start.year()
            ),
        ),
        Granularity::Week => {
            let end = start + Duration::days(6);
            (
                start.format("%Y-%m-%d").to_string(),
                format!(
                    "Semana {} ({} - {})",
                    week_number(start),
                    day_month(start),
                    day_month(end)
                ),
            )
        }
        Granularity::Month => (
            start.format("%Y-%m").to_string(),
            format!("{} {}", MONTHS_LONG[start.month0() as usize], start.year()),
        ),
        Granularity::Year | Granularity::All => {
            let year = start.format("%Y").to_string();
            (year.clone(), year)
        }
    };
    BucketKey { key, label, start }
}

/// Compact label for chart axes.
pub fn short_label(granularity: Granularity, start: NaiveDate) -> String {
    match granularity {
        Granularity::Day | Granularity::Week => start.format("%d/%m").to_string(),
        Granularity::Month => format!(
            "{}/{}",
            MONTHS_SHORT[start.month0() as usize],
            start.format("%y")
        ),
        Granularity::Year | Granularity::All => start.format("%Y").to_string(),
    }
}

/// Groups records by period, most recent bucket first.
pub fn group_by_period<'a, I>(records: I, granularity: Granularity) -> Vec<Bucket>
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut groups: BTreeMap<NaiveDate, (BucketKey, Vec<Record>)> = BTreeMap::new();
    for (record, ts) in timestamped(records) {
        let bucket = bucket_for(ts, granularity);
        groups
            .entry(bucket.start)
            .or_insert_with(|| (bucket, Vec::new()))
            .1
            .push(record.clone());
    }

    groups
        .into_values()
        .rev()
        .map(|(bucket, records)| Bucket {
            key: bucket.key,
            label: bucket.label,
            count: records.len(),
            records,
        })
        .collect()
}

// Week 1 is the Sunday-started week that contains 1 January.
fn week_number(start: NaiveDate) -> u32 {
    let end = start + Duration::days(6);
    let first_day = end - Duration::days(i64::from(end.ordinal0()));
    let first_week = week_start(first_day);
    ((start - first_week).num_days() / 7 + 1) as u32
}

fn day_month(date: NaiveDate) -> String {
    format!("{:02} {}", date.day(), MONTHS_SHORT[date.month0() as usize])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RecordKind;

    fn record(id: &str, registered_at: Option<&str>) -> Record {
        Record {
            id: id.to_string(),
            kind: RecordKind::Contact,
            name: None,
            email: None,
            phone: None,
            address: None,
            registered_at: registered_at.map(str::to_string),
            origin: None,
            county: None,
            status: None,
            archived: None,
        }
    }

    fn at(raw: &str) -> NaiveDateTime {
        parse_timestamp(raw).expect("valid timestamp")
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parses_iso_variants() {
        assert_eq!(at("2024-03-01"), date(2024, 3, 1).and_hms_opt(0, 0, 0).unwrap());
        assert_eq!(
            at("2024-03-01T10:15:30"),
            date(2024, 3, 1).and_hms_opt(10, 15, 30).unwrap()
        );
        assert_eq!(at("2024-03-01 10:15"), date(2024, 3, 1).and_hms_opt(10, 15, 0).unwrap());
        assert_eq!(
            at("2024-03-01T10:15:30.250Z"),
            date(2024, 3, 1).and_hms_milli_opt(10, 15, 30, 250).unwrap()
        );
        assert_eq!(parse_timestamp("not-a-date"), None);
        assert_eq!(parse_timestamp("01/03/2024"), None);
        assert_eq!(parse_timestamp("   "), None);
    }

    #[test]
    fn month_buckets_are_most_recent_first() {
        let records = vec![
            record("1", Some("2024-03-01")),
            record("2", Some("2024-03-08")),
            record("3", Some("2024-04-01")),
        ];

        let buckets = group_by_period(&records, Granularity::Month);
        let keys: Vec<_> = buckets.iter().map(|b| (b.key.as_str(), b.count)).collect();
        assert_eq!(keys, vec![("2024-04", 1), ("2024-03", 2)]);
        assert_eq!(buckets[0].label, "abril 2024");
        assert_eq!(buckets[1].label, "março 2024");
    }

    #[test]
    fn malformed_timestamps_never_form_a_bucket() {
        let records = vec![
            record("ok", Some("2024-03-01")),
            record("bad", Some("not-a-date")),
            record("missing", None),
            record("blank", Some("")),
        ];

        for granularity in Granularity::ALL {
            let buckets = group_by_period(&records, granularity);
            assert_eq!(buckets.len(), 1);
            assert_eq!(buckets[0].records.len(), 1);
            assert_eq!(buckets[0].records[0].id, "ok");
        }
    }

    #[test]
    fn extreme_years_are_skipped_not_bucketed() {
        let min = NaiveDate::MIN.to_string();
        let max = NaiveDate::MAX.to_string();
        let records = vec![
            record("min", Some(min.as_str())),
            record("max", Some(max.as_str())),
            record("ten-thousand", Some("10000-01-01")),
            record("year-zero", Some("0000-06-01")),
            record("first", Some("0001-01-01")),
            record("ok", Some("2024-03-01")),
            record("last", Some("9999-12-31T23:59:59")),
        ];
        assert_eq!(parse_timestamp(&min), None);
        assert_eq!(parse_timestamp(&max), None);
        assert_eq!(parse_timestamp("10000-01-01"), None);

        for granularity in Granularity::ALL {
            let buckets = group_by_period(&records, granularity);
            let ids: Vec<_> = buckets
                .iter()
                .flat_map(|bucket| bucket.records.iter().map(|r| r.id.as_str()))
                .collect();
            assert_eq!(ids, vec!["last", "ok", "first"]);

            let split = filter_period(&records, granularity, at("9999-12-31T23:59:59"), true);
            assert!(split.current.iter().any(|r| r.id == "last"));
            let split = filter_period(&records, granularity, at("0001-01-01"), false);
            assert!(split.current.iter().all(|r| r.id != "min"));
        }
    }

    #[test]
    fn buckets_partition_valid_records() {
        let records: Vec<Record> = [
            "2022-12-31T23:59:59",
            "2023-01-01",
            "2023-06-15T08:00:00",
            "2024-02-29",
            "2024-03-03",
            "2024-03-09",
            "2024-03-10",
            "garbage",
        ]
        .iter()
        .enumerate()
        .map(|(index, raw)| record(&index.to_string(), Some(raw)))
        .collect();

        for granularity in Granularity::ALL {
            let buckets = group_by_period(&records, granularity);
            let mut ids: Vec<String> = buckets
                .iter()
                .flat_map(|bucket| bucket.records.iter().map(|r| r.id.clone()))
                .collect();
            ids.sort();
            assert_eq!(ids, vec!["0", "1", "2", "3", "4", "5", "6"], "{granularity:?}");
            assert!(buckets.windows(2).all(|pair| pair[0].key > pair[1].key));
        }
    }

    #[test]
    fn weeks_start_on_sunday() {
        // 2024-03-03 is a Sunday, 2024-03-09 the Saturday after it.
        let sunday = bucket_for(at("2024-03-03T00:00:00"), Granularity::Week);
        let saturday = bucket_for(at("2024-03-09T23:00:00"), Granularity::Week);
        let next_sunday = bucket_for(at("2024-03-10"), Granularity::Week);

        assert_eq!(sunday.key, "2024-03-03");
        assert_eq!(saturday.key, "2024-03-03");
        assert_eq!(next_sunday.key, "2024-03-10");
        assert_eq!(sunday.label, "Semana 10 (03 mar - 09 mar)");
    }

    #[test]
    fn week_spanning_new_year_is_week_one() {
        let bucket = bucket_for(at("2024-12-30"), Granularity::Week);
        assert_eq!(bucket.key, "2024-12-29");
        assert_eq!(bucket.label, "Semana 1 (29 dez - 04 jan)");
    }

    #[test]
    fn day_and_year_labels() {
        let day = bucket_for(at("2024-03-01T18:30:00"), Granularity::Day);
        assert_eq!(day.key, "2024-03-01");
        assert_eq!(day.label, "01 março 2024");

        let year = bucket_for(at("2024-03-01"), Granularity::Year);
        let all = bucket_for(at("2024-03-01"), Granularity::All);
        assert_eq!(year, all);
        assert_eq!(year.key, "2024");
    }

    #[test]
    fn bucketing_is_deterministic() {
        let ts = at("2024-07-19T11:00:00");
        for granularity in Granularity::ALL {
            assert_eq!(bucket_for(ts, granularity), bucket_for(ts, granularity));
        }
    }

    #[test]
    fn all_groups_by_year() {
        let records = vec![
            record("a", Some("2022-05-01")),
            record("b", Some("2024-01-10")),
            record("c", Some("2023-11-30")),
            record("d", Some("2024-08-08")),
        ];

        let buckets = group_by_period(&records, Granularity::All);
        let keys: Vec<_> = buckets.iter().map(|b| b.key.as_str()).collect();
        assert_eq!(keys, vec!["2024", "2023", "2022"]);
        assert_eq!(buckets[0].count, 2);
        assert_eq!(previous_interval(Granularity::All, at("2024-08-09")), None);
    }

    #[test]
    fn previous_intervals() {
        let now = at("2024-03-13T15:00:00");

        let day = previous_interval(Granularity::Day, now).unwrap();
        assert_eq!(day.start, at("2024-03-12"));
        assert!(day.contains(at("2024-03-12T23:59:59")));
        assert!(!day.contains(at("2024-03-13")));

        // Wednesday; the current week began on Sunday 2024-03-10.
        let week = previous_interval(Granularity::Week, now).unwrap();
        assert_eq!(week.start, at("2024-03-03"));
        assert!(week.contains(at("2024-03-09T23:59:59")));
        assert!(!week.contains(at("2024-03-10")));

        let month = previous_interval(Granularity::Month, at("2024-01-20")).unwrap();
        assert_eq!(month.start, at("2023-12-01"));
        assert!(month.contains(at("2023-12-31T23:59:59.999")));
        assert!(!month.contains(at("2024-01-01")));

        let year = previous_interval(Granularity::Year, now).unwrap();
        assert_eq!(year.start, at("2023-01-01"));
        assert!(year.contains(at("2023-12-31T12:00:00")));
    }

    #[test]
    fn current_and_previous_weeks_use_the_same_boundaries() {
        let now = at("2024-03-16T09:00:00");
        let current = current_interval(Granularity::Week, now).unwrap();
        let previous = previous_interval(Granularity::Week, now).unwrap();
        assert_eq!(current.start.date(), bucket_for(now, Granularity::Week).start);
        assert_eq!(previous.end + Duration::nanoseconds(1), current.start);
    }

    #[test]
    fn realtime_truncates_previous_period() {
        let now = at("2024-03-15T12:00:00");
        let previous = realtime_previous_interval(Granularity::Month, now).unwrap();
        assert_eq!(previous.start, at("2024-02-01"));
        assert_eq!(previous.end, at("2024-02-15T12:00:00"));

        // March 31st reaches past the end of February.
        let late = realtime_previous_interval(Granularity::Month, at("2024-03-31T12:00:00")).unwrap();
        assert_eq!(late.end, previous_interval(Granularity::Month, now).unwrap().end);
    }

    #[test]
    fn filter_period_splits_current_and_previous() {
        let records = vec![
            record("feb-early", Some("2024-02-03")),
            record("feb-late", Some("2024-02-25")),
            record("mar-past", Some("2024-03-02")),
            record("mar-future", Some("2024-03-28")),
            record("broken", Some("soon")),
        ];
        let now = at("2024-03-15T12:00:00");

        let split = filter_period(&records, Granularity::Month, now, false);
        let ids = |list: &[&Record]| list.iter().map(|r| r.id.clone()).collect::<Vec<_>>();
        assert_eq!(ids(&split.current), vec!["mar-past", "mar-future"]);
        assert_eq!(ids(split.previous.as_deref().unwrap()), vec!["feb-early", "feb-late"]);

        let live = filter_period(&records, Granularity::Month, now, true);
        assert_eq!(ids(&live.current), vec!["mar-past"]);
        assert_eq!(ids(live.previous.as_deref().unwrap()), vec!["feb-early"]);
    }

    #[test]
    fn filter_all_has_no_previous_period() {
        let records = vec![
            record("old", Some("2019-01-01")),
            record("future", Some("2030-01-01")),
        ];
        let now = at("2024-03-15");

        let split = filter_period(&records, Granularity::All, now, false);
        assert_eq!(split.current.len(), 2);
        assert!(split.previous.is_none());

        let live = filter_period(&records, Granularity::All, now, true);
        assert_eq!(live.current.len(), 1);
    }

    #[test]
    fn short_labels() {
        assert_eq!(short_label(Granularity::Day, date(2024, 3, 5)), "05/03");
        assert_eq!(short_label(Granularity::Month, date(2024, 3, 1)), "mar/24");
        assert_eq!(short_label(Granularity::All, date(2024, 1, 1)), "2024");
    }

    #[test]
    fn shift_period_steps_whole_periods() {
        assert_eq!(
            shift_period(Granularity::Month, date(2024, 1, 1), -1),
            Some(date(2023, 12, 1))
        );
        assert_eq!(
            shift_period(Granularity::Year, date(2024, 1, 1), -2),
            Some(date(2022, 1, 1))
        );
        assert_eq!(
            shift_period(Granularity::Week, date(2024, 3, 10), 1),
            Some(date(2024, 3, 17))
        );
    }
}
