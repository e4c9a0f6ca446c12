use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One line of the order/shipment export.
///
/// Headers are matched by the export's own labels, or by the English aliases.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderRecord {
    #[serde(rename = "発注番号", alias = "order_number")]
    pub order_number: String,
    #[serde(rename = "発行区分", alias = "issue_type")]
    pub issue_type: i64,
    #[serde(rename = "発注日", alias = "order_date", deserialize_with = "crate::loader::de_date")]
    pub order_date: NaiveDate,
    #[serde(rename = "数量", alias = "quantity")]
    pub quantity: i64,
    #[serde(rename = "納入期日", alias = "due_date", deserialize_with = "crate::loader::de_date")]
    pub due_date: NaiveDate,
    #[serde(rename = "売上金額JPY", alias = "sales_jpy")]
    pub sales: f64,
    #[serde(rename = "仕入金額JPY", alias = "purchase_jpy")]
    pub purchase: f64,
    #[serde(rename = "生産工場", alias = "factory")]
    pub factory: String,
    #[serde(rename = "納入先", alias = "destination")]
    pub destination: String,
    #[serde(rename = "品名", alias = "item_name")]
    pub item_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    #[default]
    Daily,
    Monthly,
}

impl Granularity {
    pub const ALL: [Granularity; 2] = [Granularity::Daily, Granularity::Monthly];

    pub fn short_label(self) -> &'static str {
        match self {
            Granularity::Daily => "日次",
            Granularity::Monthly => "月次",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Granularity::Daily => "日次 (daily)",
            Granularity::Monthly => "月次 (monthly)",
        }
    }
}

/// What a period with zero sales shows as its margin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarginPolicy {
    /// Leave the period out of the margin line.
    #[default]
    Omit,
    /// Plot the period at 0%.
    Zero,
}

/// Inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(a: NaiveDate, b: NaiveDate) -> Self {
        if a <= b {
            Self { start: a, end: b }
        } else {
            Self { start: b, end: a }
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    pub fn clamp(&self, bounds: &DateRange) -> Self {
        let start = self.start.clamp(bounds.start, bounds.end);
        let end = self.end.clamp(bounds.start, bounds.end);
        Self::new(start, end)
    }

    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PeriodKey {
    Day(NaiveDate),
    Month { year: i32, month: u32 },
}

impl PeriodKey {
    pub fn from_date(date: NaiveDate, granularity: Granularity) -> Self {
        match granularity {
            Granularity::Daily => PeriodKey::Day(date),
            Granularity::Monthly => PeriodKey::Month {
                year: date.year(),
                month: date.month(),
            },
        }
    }
}

impl fmt::Display for PeriodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PeriodKey::Day(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            PeriodKey::Month { year, month } => write!(f, "{year:04}-{month:02}"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PeriodRecord {
    pub period: String,
    pub sales: f64,
    pub purchase: f64,
    pub gross_profit: f64,
    /// `None` when the period has no sales.
    pub gross_margin_pct: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParetoRecord {
    pub item_name: String,
    pub sales: f64,
    pub cumulative_pct: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrossTabCell {
    pub destination: String,
    pub factory: String,
    pub count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn range_normalizes_and_is_inclusive() {
        let r = DateRange::new(d(2024, 3, 1), d(2024, 1, 1));
        assert_eq!(r.start, d(2024, 1, 1));
        assert!(r.contains(d(2024, 1, 1)));
        assert!(r.contains(d(2024, 3, 1)));
        assert!(!r.contains(d(2024, 3, 2)));
        assert_eq!(r.days(), 60);
    }

    #[test]
    fn clamp_keeps_selection_inside_bounds() {
        let bounds = DateRange::new(d(2024, 1, 10), d(2024, 1, 20));
        let r = DateRange::new(d(2024, 1, 1), d(2024, 2, 1)).clamp(&bounds);
        assert_eq!(r, bounds);
    }

    #[test]
    fn period_labels() {
        let date = d(2024, 2, 5);
        assert_eq!(PeriodKey::from_date(date, Granularity::Daily).to_string(), "2024-02-05");
        assert_eq!(PeriodKey::from_date(date, Granularity::Monthly).to_string(), "2024-02");
    }

    #[test]
    fn granularity_labels() {
        assert_eq!(Granularity::Daily.short_label(), "日次");
        assert_eq!(Granularity::Monthly.short_label(), "月次");
        assert!(Granularity::Monthly.label().starts_with("月次"));
    }

    #[test]
    fn month_keys_sort_chronologically() {
        let dec = PeriodKey::from_date(d(2023, 12, 31), Granularity::Monthly);
        let jan = PeriodKey::from_date(d(2024, 1, 1), Granularity::Monthly);
        assert!(dec < jan);
    }
}
