//! Top-line metrics: totals, segment distribution, and monthly trend buckets.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use rand::rngs::StdRng;
use rand::Rng;
use serde::Serialize;

use crate::dataset::Value;

/// Number of trailing monthly buckets retained for output.
pub const TREND_WINDOW_MONTHS: usize = 12;

/// First synthetic month label when the filler trend is generated.
const FALLBACK_REFERENCE_YEAR: i32 = 2024;

/// Documented fallback when the segment distribution is empty.
const TOP_SEGMENT_FALLBACK: &str = "Champions";

/// Date layouts accepted for temporal cells, tried in order after RFC 3339.
const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d"];
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];

/// One named segment in the distribution, aggregated by name.
#[derive(Debug, Clone, Serialize)]
pub struct SegmentSummary {
    pub name: String,
    pub member_count: usize,
    /// Share of all records, rounded half-up to a whole percent.
    pub percentage: u32,
}

/// One month of activity: `month` is a `YYYY-MM` key.
#[derive(Debug, Clone, Serialize)]
pub struct MonthlyBucket {
    pub month: String,
    pub customer_count: usize,
    pub revenue: f64,
}

/// Trend window, ascending by month key.
///
/// `estimated` marks the synthetic filler produced when no date in the
/// dataset could be parsed — display filler, not a derived statistic.
#[derive(Debug, Clone, Serialize)]
pub struct MonthlyTrend {
    pub buckets: Vec<MonthlyBucket>,
    pub estimated: bool,
}

/// Aggregated analysis output.
#[derive(Debug, Clone, Serialize)]
pub struct Metrics {
    pub total_customers: usize,
    pub total_revenue: f64,
    pub avg_revenue_per_customer: f64,
    pub segment_distribution: Vec<SegmentSummary>,
    pub monthly_trend: MonthlyTrend,
    pub top_segment: String,
}

/// Parse a temporal cell into a date.
///
/// Only textual dates are supported; numeric cells are not interpreted as
/// timestamps. Returns `None` on failure — unparseable dates are excluded
/// from bucketing, never zero-filled.
pub fn parse_date(value: &Value) -> Option<NaiveDate> {
    let text = value.as_text()?;
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.date_naive());
    }
    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return Some(dt.date());
        }
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(text, format) {
            return Some(date);
        }
    }
    None
}

/// Aggregate per-record attributes into output metrics.
///
/// All three slices are per-record and must share one length (row order).
/// The RNG only feeds the jitter of the synthetic filler trend.
pub fn build_metrics(
    segment_names: &[String],
    monetary_values: &[f64],
    dates: &[Option<NaiveDate>],
    rng: &mut StdRng,
) -> Metrics {
    let total_customers = segment_names.len();
    let total_revenue: f64 = monetary_values.iter().sum();
    let avg_revenue_per_customer = if total_customers == 0 {
        0.0
    } else {
        total_revenue / total_customers as f64
    };

    let segment_distribution = segment_distribution(segment_names, total_customers);
    // Strict comparison keeps the first-seen segment on ties.
    let mut top: Option<&SegmentSummary> = None;
    for summary in &segment_distribution {
        if top.map_or(true, |t| summary.member_count > t.member_count) {
            top = Some(summary);
        }
    }
    let top_segment = top
        .map(|s| s.name.clone())
        .unwrap_or_else(|| TOP_SEGMENT_FALLBACK.to_string());

    let monthly_trend = monthly_trend(monetary_values, dates, total_customers, total_revenue, rng);

    Metrics {
        total_customers,
        total_revenue,
        avg_revenue_per_customer,
        segment_distribution,
        monthly_trend,
        top_segment,
    }
}

/// Group records by segment name, first-appearance order.
fn segment_distribution(segment_names: &[String], total: usize) -> Vec<SegmentSummary> {
    let mut distribution: Vec<SegmentSummary> = Vec::new();
    for name in segment_names {
        match distribution.iter_mut().find(|s| &s.name == name) {
            Some(summary) => summary.member_count += 1,
            None => distribution.push(SegmentSummary {
                name: name.clone(),
                member_count: 1,
                percentage: 0,
            }),
        }
    }
    for summary in &mut distribution {
        summary.percentage =
            (summary.member_count as f64 / total as f64 * 100.0).round() as u32;
    }
    distribution
}

fn monthly_trend(
    monetary_values: &[f64],
    dates: &[Option<NaiveDate>],
    total_customers: usize,
    total_revenue: f64,
    rng: &mut StdRng,
) -> MonthlyTrend {
    let mut buckets: BTreeMap<String, (usize, f64)> = BTreeMap::new();
    for (date, revenue) in dates.iter().zip(monetary_values.iter()) {
        if let Some(date) = date {
            let key = format!("{:04}-{:02}", date.year(), date.month());
            let entry = buckets.entry(key).or_insert((0, 0.0));
            entry.0 += 1;
            entry.1 += revenue;
        }
    }

    if buckets.is_empty() {
        return filler_trend(total_customers, total_revenue, rng);
    }

    let skip = buckets.len().saturating_sub(TREND_WINDOW_MONTHS);
    let buckets = buckets
        .into_iter()
        .skip(skip)
        .map(|(month, (customer_count, revenue))| MonthlyBucket {
            month,
            customer_count,
            revenue,
        })
        .collect();
    MonthlyTrend {
        buckets,
        estimated: false,
    }
}

/// Synthetic display filler for datasets with no parseable dates: twelve
/// months starting at a fixed reference, row counts spread evenly, revenue
/// split per month and jittered in [0.8, 1.2].
fn filler_trend(total_customers: usize, total_revenue: f64, rng: &mut StdRng) -> MonthlyTrend {
    let base = total_customers / TREND_WINDOW_MONTHS;
    let remainder = total_customers % TREND_WINDOW_MONTHS;
    let revenue_per_month = total_revenue / TREND_WINDOW_MONTHS as f64;

    let buckets = (0..TREND_WINDOW_MONTHS)
        .map(|i| {
            let jitter: f64 = rng.gen_range(0.8..1.2);
            MonthlyBucket {
                month: format!("{FALLBACK_REFERENCE_YEAR:04}-{:02}", i + 1),
                customer_count: base + usize::from(i < remainder),
                revenue: revenue_per_month * jitter,
            }
        })
        .collect();
    MonthlyTrend {
        buckets,
        estimated: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(3)
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_date_formats() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        for raw in [
            "2024-03-09",
            "2024-03-09T10:30:00",
            "2024-03-09 10:30:00",
            "2024-03-09T10:30:00+01:00",
            "03/09/2024",
            "2024/03/09",
        ] {
            assert_eq!(parse_date(&Value::Text(raw.to_string())), Some(date), "{raw}");
        }
        assert_eq!(parse_date(&Value::Text("soon".to_string())), None);
        assert_eq!(parse_date(&Value::Number(20240309.0)), None);
        assert_eq!(parse_date(&Value::Missing), None);
    }

    #[test]
    fn test_distribution_percentages_and_order() {
        let segment_names = names(&["Core Customers", "Premium", "Core Customers"]);
        let metrics = build_metrics(&segment_names, &[100.0, 900.0, 110.0], &[None, None, None], &mut rng());

        assert_eq!(metrics.total_customers, 3);
        assert_eq!(metrics.segment_distribution.len(), 2);
        // First-appearance order preserved.
        assert_eq!(metrics.segment_distribution[0].name, "Core Customers");
        assert_eq!(metrics.segment_distribution[0].member_count, 2);
        assert_eq!(metrics.segment_distribution[0].percentage, 67);
        assert_eq!(metrics.segment_distribution[1].percentage, 33);
        assert_eq!(metrics.top_segment, "Core Customers");

        let sum: u32 = metrics
            .segment_distribution
            .iter()
            .map(|s| s.percentage)
            .sum();
        assert!((sum as i64 - 100).unsigned_abs() as usize <= metrics.segment_distribution.len());
    }

    #[test]
    fn test_top_segment_tie_goes_to_first_seen() {
        let segment_names = names(&["Regular", "Premium", "Premium", "Regular"]);
        let metrics = build_metrics(
            &segment_names,
            &[1.0, 1.0, 1.0, 1.0],
            &[None, None, None, None],
            &mut rng(),
        );
        assert_eq!(metrics.top_segment, "Regular");
    }

    #[test]
    fn test_monthly_buckets_window() {
        // 15 distinct months; only the most recent 12 survive.
        let mut dates = Vec::new();
        let mut revenues = Vec::new();
        let mut segment_names = Vec::new();
        for month in 0..15u32 {
            let (y, m) = (2023 + (month / 12) as i32, month % 12 + 1);
            dates.push(NaiveDate::from_ymd_opt(y, m, 10));
            revenues.push(50.0);
            segment_names.push("Regular".to_string());
        }
        let metrics = build_metrics(&segment_names, &revenues, &dates, &mut rng());

        let trend = &metrics.monthly_trend;
        assert!(!trend.estimated);
        assert_eq!(trend.buckets.len(), TREND_WINDOW_MONTHS);
        assert_eq!(trend.buckets.first().unwrap().month, "2023-04");
        assert_eq!(trend.buckets.last().unwrap().month, "2024-03");
        let mut sorted = trend.buckets.iter().map(|b| b.month.clone()).collect::<Vec<_>>();
        sorted.sort();
        assert_eq!(
            sorted,
            trend.buckets.iter().map(|b| b.month.clone()).collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_unparseable_dates_excluded() {
        let segment_names = names(&["Regular", "Regular", "Regular"]);
        let dates = vec![NaiveDate::from_ymd_opt(2024, 5, 1), None, None];
        let metrics = build_metrics(&segment_names, &[10.0, 20.0, 30.0], &dates, &mut rng());
        let trend = &metrics.monthly_trend;
        assert!(!trend.estimated);
        assert_eq!(trend.buckets.len(), 1);
        assert_eq!(trend.buckets[0].customer_count, 1);
        assert_eq!(trend.buckets[0].revenue, 10.0);
    }

    #[test]
    fn test_filler_trend_when_no_dates() {
        let segment_names = names(&["Regular"; 26]);
        let revenues = vec![12.0; 26];
        let dates = vec![None; 26];
        let metrics = build_metrics(&segment_names, &revenues, &dates, &mut rng());

        let trend = &metrics.monthly_trend;
        assert!(trend.estimated);
        assert_eq!(trend.buckets.len(), TREND_WINDOW_MONTHS);
        // Counts spread evenly and still account for every record.
        let count: usize = trend.buckets.iter().map(|b| b.customer_count).sum();
        assert_eq!(count, 26);
        let per_month = 26.0 * 12.0 / TREND_WINDOW_MONTHS as f64;
        for bucket in &trend.buckets {
            assert!(bucket.revenue >= per_month * 0.8 && bucket.revenue <= per_month * 1.2);
        }
    }

    #[test]
    fn test_empty_distribution_defaults() {
        let metrics = build_metrics(&[], &[], &[], &mut rng());
        assert_eq!(metrics.total_customers, 0);
        assert_eq!(metrics.avg_revenue_per_customer, 0.0);
        assert_eq!(metrics.top_segment, TOP_SEGMENT_FALLBACK);
        assert!(metrics.monthly_trend.estimated);
    }
}
