use crate::model::{DateRange, Granularity, MarginPolicy, OrderRecord, PeriodKey, PeriodRecord};
use statrs::statistics::Statistics;
use std::collections::BTreeMap;

/// Earliest and latest order date, or `None` for an empty dataset.
pub fn date_bounds(orders: &[OrderRecord]) -> Option<DateRange> {
    let min = orders.iter().map(|o| o.order_date).min()?;
    let max = orders.iter().map(|o| o.order_date).max()?;
    Some(DateRange::new(min, max))
}

pub fn filter_by_range<'a>(orders: &'a [OrderRecord], range: &DateRange) -> Vec<&'a OrderRecord> {
    orders.iter().filter(|o| range.contains(o.order_date)).collect()
}

pub fn group_by_period(
    rows: &[&OrderRecord],
    granularity: Granularity,
    policy: MarginPolicy,
) -> Vec<PeriodRecord> {
    let mut map: BTreeMap<PeriodKey, (f64, f64)> = BTreeMap::new();

    for row in rows {
        let key = PeriodKey::from_date(row.order_date, granularity);
        let entry = map.entry(key).or_default();
        entry.0 += row.sales;
        entry.1 += row.purchase;
    }

    map.into_iter()
        .map(|(key, (sales, purchase))| {
            let gross_profit = sales - purchase;
            let gross_margin_pct = if sales != 0.0 {
                Some(gross_profit / sales * 100.0)
            } else {
                match policy {
                    MarginPolicy::Omit => None,
                    MarginPolicy::Zero => Some(0.0),
                }
            };

            PeriodRecord {
                period: key.to_string(),
                sales,
                purchase,
                gross_profit,
                gross_margin_pct,
            }
        })
        .collect()
}

pub fn total_sales(periods: &[PeriodRecord]) -> f64 {
    periods.iter().map(|p| p.sales).sum()
}

pub fn total_gross_profit(periods: &[PeriodRecord]) -> f64 {
    periods.iter().map(|p| p.gross_profit).sum()
}

/// Margin over the whole selection, `None` when nothing was sold.
pub fn overall_margin_pct(periods: &[PeriodRecord]) -> Option<f64> {
    let sales = total_sales(periods);
    (sales != 0.0).then(|| total_gross_profit(periods) / sales * 100.0)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeriodSummary {
    pub mean: f64,
    pub min: f64,
    pub max: f64,
}

pub fn summarize_periods(periods: &[PeriodRecord]) -> Option<PeriodSummary> {
    if periods.is_empty() {
        return None;
    }
    let sales: Vec<f64> = periods.iter().map(|p| p.sales).collect();

    Some(PeriodSummary {
        mean: Statistics::mean(&sales),
        min: Statistics::min(&sales),
        max: Statistics::max(&sales),
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::NaiveDate;

    pub(crate) fn order(date: &str, sales: f64, purchase: f64) -> OrderRecord {
        OrderRecord {
            order_number: "0001".into(),
            issue_type: 1,
            order_date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            quantity: 1,
            due_date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            sales,
            purchase,
            factory: "F1".into(),
            destination: "D1".into(),
            item_name: "Item".into(),
        }
    }

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn sample() -> Vec<OrderRecord> {
        vec![
            order("2024-01-05", 100.0, 60.0),
            order("2024-01-20", 200.0, 120.0),
            order("2024-02-10", 300.0, 150.0),
        ]
    }

    #[test]
    fn bounds_of_empty_dataset() {
        assert!(date_bounds(&[]).is_none());
        let b = date_bounds(&sample()).unwrap();
        assert_eq!(b.start, d("2024-01-05"));
        assert_eq!(b.end, d("2024-02-10"));
    }

    #[test]
    fn filter_is_inclusive_and_never_grows() {
        let orders = sample();
        let range = DateRange::new(d("2024-01-05"), d("2024-01-20"));
        let rows = filter_by_range(&orders, &range);
        assert_eq!(rows.len(), 2);
        assert!(rows.len() <= orders.len());
        assert!(rows.iter().all(|o| range.contains(o.order_date)));
    }

    #[test]
    fn monthly_example() {
        let orders = sample();
        let range = date_bounds(&orders).unwrap();
        let rows = filter_by_range(&orders, &range);
        let periods = group_by_period(&rows, Granularity::Monthly, MarginPolicy::Omit);

        assert_eq!(periods.len(), 2);

        let jan = &periods[0];
        assert_eq!(jan.period, "2024-01");
        assert_eq!(jan.sales, 300.0);
        assert_eq!(jan.purchase, 180.0);
        assert_eq!(jan.gross_profit, 120.0);
        assert!((jan.gross_margin_pct.unwrap() - 40.0).abs() < 1e-9);

        let feb = &periods[1];
        assert_eq!(feb.period, "2024-02");
        assert_eq!(feb.sales, 300.0);
        assert_eq!(feb.purchase, 150.0);
        assert_eq!(feb.gross_profit, 150.0);
        assert!((feb.gross_margin_pct.unwrap() - 50.0).abs() < 1e-9);
    }

    #[test]
    fn daily_groups_by_exact_date_in_order() {
        let orders = vec![
            order("2024-01-07", 10.0, 5.0),
            order("2024-01-05", 20.0, 5.0),
            order("2024-01-07", 30.0, 5.0),
        ];
        let rows: Vec<&OrderRecord> = orders.iter().collect();
        let periods = group_by_period(&rows, Granularity::Daily, MarginPolicy::Omit);

        let labels: Vec<&str> = periods.iter().map(|p| p.period.as_str()).collect();
        assert_eq!(labels, ["2024-01-05", "2024-01-07"]);
        assert_eq!(periods[1].sales, 40.0);
    }

    #[test]
    fn grouping_preserves_total_sales() {
        let orders = vec![
            order("2023-12-31", 12.5, 1.0),
            order("2024-01-01", 7.5, 1.0),
            order("2024-01-31", 80.0, 1.0),
            order("2024-03-15", 0.25, 1.0),
        ];
        let rows: Vec<&OrderRecord> = orders.iter().collect();
        let filtered_total: f64 = rows.iter().map(|o| o.sales).sum();

        for granularity in Granularity::ALL {
            let periods = group_by_period(&rows, granularity, MarginPolicy::Omit);
            assert!((total_sales(&periods) - filtered_total).abs() < 1e-9);
        }

        let monthly = group_by_period(&rows, Granularity::Monthly, MarginPolicy::Omit);
        assert_eq!(monthly.len(), 3);
    }

    #[test]
    fn zero_sales_margin_follows_policy() {
        let orders = vec![order("2024-01-01", 0.0, 50.0)];
        let rows: Vec<&OrderRecord> = orders.iter().collect();

        let omitted = group_by_period(&rows, Granularity::Daily, MarginPolicy::Omit);
        assert_eq!(omitted[0].gross_margin_pct, None);
        assert_eq!(omitted[0].gross_profit, -50.0);

        let zeroed = group_by_period(&rows, Granularity::Daily, MarginPolicy::Zero);
        assert_eq!(zeroed[0].gross_margin_pct, Some(0.0));
    }

    #[test]
    fn empty_selection_totals() {
        let periods = group_by_period(&[], Granularity::Monthly, MarginPolicy::Omit);
        assert!(periods.is_empty());
        assert_eq!(total_sales(&periods), 0.0);
        assert_eq!(overall_margin_pct(&periods), None);
        assert_eq!(summarize_periods(&periods), None);
    }

    #[test]
    fn period_summary() {
        let orders = sample();
        let rows: Vec<&OrderRecord> = orders.iter().collect();
        let periods = group_by_period(&rows, Granularity::Daily, MarginPolicy::Omit);
        let summary = summarize_periods(&periods).unwrap();

        assert!((summary.mean - 200.0).abs() < 1e-9);
        assert_eq!(summary.min, 100.0);
        assert_eq!(summary.max, 300.0);
        assert!((overall_margin_pct(&periods).unwrap() - 45.0).abs() < 1e-9);
    }
}
