use crate::aggregate::{active_count, compare_by, conversion_by, CategoryField};
use crate::models::{
    BucketSummary, DashboardResponse, PeriodCounts, PeriodQuery, Record, TrendPoint,
};
use crate::period::{
    bucket_for, group_by_period, period_start, shift_period, short_label, split_dated,
    timestamped, Granularity,
};
use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};
use std::collections::HashMap;

pub const TREND_PERIODS: usize = 20;

pub fn build_dashboard(
    contacts: &[Record],
    leads: &[Record],
    query: PeriodQuery,
) -> DashboardResponse {
    build_dashboard_at(Local::now().naive_local(), contacts, leads, query)
}

pub fn build_dashboard_at(
    now: NaiveDateTime,
    contacts: &[Record],
    leads: &[Record],
    query: PeriodQuery,
) -> DashboardResponse {
    // Contacts feed both the split and the trend; parse them once.
    let dated_contacts: Vec<_> = timestamped(contacts).collect();
    let contact_split = split_dated(
        dated_contacts.iter().copied(),
        query.period,
        now,
        query.realtime,
    );
    let lead_split = split_dated(timestamped(leads), query.period, now, query.realtime);

    let previous_contacts = contact_split.previous.as_deref().unwrap_or_default();
    let previous_leads = lead_split.previous.as_deref().unwrap_or_default();

    let buckets = group_by_period(contact_split.current.iter().copied(), query.period);

    DashboardResponse {
        period: query.period,
        realtime: query.realtime,
        generated_at: now.format("%Y-%m-%dT%H:%M:%S").to_string(),
        comparison: contact_split.previous.is_some(),
        contacts: PeriodCounts {
            current: contact_split.current.len(),
            previous: contact_split.previous.as_ref().map(Vec::len),
        },
        leads: PeriodCounts {
            current: lead_split.current.len(),
            previous: lead_split.previous.as_ref().map(Vec::len),
        },
        active_contacts: active_count(contacts),
        origins: compare_by(
            contact_split.current.iter().copied(),
            previous_contacts.iter().copied(),
            CategoryField::Origin,
        ),
        counties: compare_by(
            contact_split.current.iter().copied(),
            previous_contacts.iter().copied(),
            CategoryField::County,
        ),
        conversion_by_origin: conversion_by(
            contact_split.current.iter().copied(),
            previous_contacts.iter().copied(),
            CategoryField::Origin,
        ),
        statuses: compare_by(
            contact_split.current.iter().copied(),
            previous_contacts.iter().copied(),
            CategoryField::Status,
        ),
        lead_origins: compare_by(
            lead_split.current.iter().copied(),
            previous_leads.iter().copied(),
            CategoryField::Origin,
        ),
        buckets: buckets.iter().map(BucketSummary::from).collect(),
        trend: trend_from_timestamps(
            dated_contacts.iter().map(|&(_, ts)| ts),
            query.period,
            now,
            query.realtime,
        ),
    }
}

/// Registrations per period for up to [`TREND_PERIODS`] periods ending at the
/// one containing `now`, oldest first. The series stops at the period of the
/// earliest registration.
pub fn registration_trend<'a, I>(
    records: I,
    granularity: Granularity,
    now: NaiveDateTime,
    realtime: bool,
) -> Vec<TrendPoint>
where
    I: IntoIterator<Item = &'a Record>,
{
    trend_from_timestamps(
        timestamped(records).map(|(_, ts)| ts),
        granularity,
        now,
        realtime,
    )
}

fn trend_from_timestamps<I>(
    timestamps: I,
    granularity: Granularity,
    now: NaiveDateTime,
    realtime: bool,
) -> Vec<TrendPoint>
where
    I: IntoIterator<Item = NaiveDateTime>,
{
    let mut counts: HashMap<NaiveDate, usize> = HashMap::new();
    let mut earliest: Option<NaiveDate> = None;
    for ts in timestamps {
        if realtime && ts > now {
            continue;
        }
        let start = period_start(granularity, ts.date());
        *counts.entry(start).or_insert(0) += 1;
        earliest = Some(earliest.map_or(start, |known| known.min(start)));
    }

    let mut start = period_start(granularity, now.date());
    let earliest = earliest.unwrap_or(start);
    let mut points = Vec::with_capacity(TREND_PERIODS);
    for step in 0..TREND_PERIODS {
        if step > 0 {
            match shift_period(granularity, start, -1) {
                Some(previous) if previous >= earliest => start = previous,
                _ => break,
            }
        }
        points.push(TrendPoint {
            key: bucket_for(start.and_time(NaiveTime::MIN), granularity).key,
            label: short_label(granularity, start),
            count: counts.get(&start).copied().unwrap_or(0),
        });
    }
    points.reverse();
    points
}
