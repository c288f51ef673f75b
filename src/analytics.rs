//! Time-period filtering and summary aggregation over the collections.
//!
//! All period cutoffs are anchored at local midnight and boundary instants
//! are inclusive, for every collection alike.

use std::str::FromStr;

use chrono::{DateTime, Duration, Local, Months};

use crate::models::{Pharmacy, UploadRecord, WellnessProgram};

/// A named relative time window for filtering records by date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Period {
    /// Since local midnight today
    Today,
    /// The last 7 days
    Week,
    /// The last calendar month
    Month,
    /// The last calendar year
    Year,
    /// No cutoff
    #[default]
    All,
}

impl Period {
    /// Display name as used by the period selector.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Today => "today",
            Self::Week => "week",
            Self::Month => "month",
            Self::Year => "year",
            Self::All => "all",
        }
    }
}

impl FromStr for Period {
    type Err = std::convert::Infallible;

    // Unknown selections fall back to "all", like the period selector did.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s {
            "today" => Self::Today,
            "week" => Self::Week,
            "month" => Self::Month,
            "year" => Self::Year,
            _ => Self::All,
        })
    }
}

fn local_midnight(now: &DateTime<Local>) -> DateTime<Local> {
    now.date_naive()
        .and_hms_opt(0, 0, 0)
        .and_then(|naive| naive.and_local_timezone(Local).earliest())
        .unwrap_or(*now)
}

/// The inclusive cutoff instant for a period, or `None` for no cutoff.
#[must_use]
pub fn period_start(period: Period, now: &DateTime<Local>) -> Option<DateTime<Local>> {
    let midnight = local_midnight(now);
    match period {
        Period::Today => Some(midnight),
        Period::Week => Some(midnight - Duration::days(7)),
        Period::Month => midnight.checked_sub_months(Months::new(1)),
        Period::Year => midnight.checked_sub_months(Months::new(12)),
        Period::All => None,
    }
}

/// Records whose date falls inside the period. The boundary instant itself
/// is included.
pub fn filter_by_period<'a, T, F>(
    records: &'a [T],
    period: Period,
    now: &DateTime<Local>,
    date_of: F,
) -> Vec<&'a T>
where
    F: Fn(&T) -> DateTime<Local>,
{
    let Some(cutoff) = period_start(period, now) else {
        return records.iter().collect();
    };
    records
        .iter()
        .filter(|record| date_of(record) >= cutoff)
        .collect()
}

/// Group values by identity and return the `k` most frequent, descending by
/// count. Ties keep first-seen order.
pub fn top_k_by_frequency<I>(values: I, k: usize) -> Vec<(String, usize)>
where
    I: IntoIterator<Item = String>,
{
    let mut counts: Vec<(String, usize)> = Vec::new();
    for value in values {
        match counts.iter_mut().find(|(key, _)| *key == value) {
            Some((_, count)) => *count += 1,
            None => counts.push((value, 1)),
        }
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts.truncate(k);
    counts
}

/// Aggregate of one upload type in the analytics table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadTypeSummary {
    /// The declared upload type
    pub name: String,
    /// Number of imports of this type
    pub count: usize,
    /// Total records those imports applied
    pub records: usize,
}

/// The top `k` upload types by import count, ties in first-seen order.
#[must_use]
pub fn top_upload_types(uploads: &[UploadRecord], k: usize) -> Vec<UploadTypeSummary> {
    let ranked = top_k_by_frequency(uploads.iter().map(|u| u.upload_type.clone()), k);
    ranked
        .into_iter()
        .map(|(name, count)| {
            let records = uploads
                .iter()
                .filter(|u| u.upload_type == name)
                .map(|u| u.records_count)
                .sum();
            UploadTypeSummary {
                name,
                count,
                records,
            }
        })
        .collect()
}

/// Summary counts for the analytics page.
#[derive(Debug, Clone)]
pub struct AnalyticsReport {
    /// The selected period
    pub period: Period,
    /// Imports completed inside the period
    pub uploads_in_period: usize,
    /// Top upload types inside the period
    pub top_upload_types: Vec<UploadTypeSummary>,
    /// All registered pharmacies
    pub total_pharmacies: usize,
    /// Pharmacies created inside the period
    pub new_pharmacies: usize,
    /// All wellness programs
    pub total_programs: usize,
    /// Sum of program prices
    pub total_program_value: f64,
    /// Programs whose end date has not passed
    pub active_programs: usize,
}

/// Build the analytics report for one period.
#[must_use]
pub fn report(
    pharmacies: &[Pharmacy],
    programs: &[WellnessProgram],
    uploads: &[UploadRecord],
    period: Period,
    now: &DateTime<Local>,
) -> AnalyticsReport {
    let uploads_in_period = filter_by_period(uploads, period, now, |u| u.date);
    let filtered: Vec<UploadRecord> = uploads_in_period.iter().map(|u| (*u).clone()).collect();
    let new_pharmacies = filter_by_period(pharmacies, period, now, |p| p.created_at).len();

    let today = now.date_naive();
    AnalyticsReport {
        period,
        uploads_in_period: filtered.len(),
        top_upload_types: top_upload_types(&filtered, 5),
        total_pharmacies: pharmacies.len(),
        new_pharmacies,
        total_programs: programs.len(),
        total_program_value: programs.iter().map(|p| p.price).sum(),
        active_programs: programs.iter().filter(|p| p.end_date >= today).count(),
    }
}
