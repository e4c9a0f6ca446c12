use crate::heatmap::{cross_tabulate, CrossTab};
use crate::model::{DateRange, Granularity, MarginPolicy, OrderRecord, ParetoRecord, PeriodRecord};
use crate::pareto::build_pareto;
use crate::stats::{
    filter_by_range, group_by_period, overall_margin_pct, summarize_periods, total_gross_profit,
    total_sales, PeriodSummary,
};

/// Current selector values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Selection {
    pub granularity: Granularity,
    pub range: DateRange,
}

/// Everything one render needs, rebuilt whenever the selection changes.
#[derive(Debug, Clone, Default)]
pub struct DashboardView {
    pub filtered_rows: usize,
    pub periods: Vec<PeriodRecord>,
    pub total_sales: f64,
    pub total_gross_profit: f64,
    pub overall_margin_pct: Option<f64>,
    pub summary: Option<PeriodSummary>,
    pub crosstab: CrossTab,
    pub pareto: Vec<ParetoRecord>,
}

pub fn build_view(
    orders: &[OrderRecord],
    selection: &Selection,
    policy: MarginPolicy,
) -> DashboardView {
    let rows = filter_by_range(orders, &selection.range);
    let periods = group_by_period(&rows, selection.granularity, policy);

    tracing::debug!(
        rows = rows.len(),
        periods = periods.len(),
        granularity = ?selection.granularity,
        start = %selection.range.start,
        end = %selection.range.end,
        "rebuilt dashboard view"
    );

    DashboardView {
        filtered_rows: rows.len(),
        total_sales: total_sales(&periods),
        total_gross_profit: total_gross_profit(&periods),
        overall_margin_pct: overall_margin_pct(&periods),
        summary: summarize_periods(&periods),
        crosstab: cross_tabulate(&rows),
        pareto: build_pareto(&rows),
        periods,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::tests::order;
    use chrono::NaiveDate;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn orders() -> Vec<OrderRecord> {
        vec![
            order("2024-01-05", 100.0, 60.0),
            order("2024-01-20", 200.0, 120.0),
            order("2024-02-10", 300.0, 150.0),
        ]
    }

    #[test]
    fn full_range_monthly() {
        let selection = Selection {
            granularity: Granularity::Monthly,
            range: DateRange::new(d("2024-01-05"), d("2024-02-10")),
        };
        let view = build_view(&orders(), &selection, MarginPolicy::Omit);

        assert_eq!(view.filtered_rows, 3);
        assert_eq!(view.periods.len(), 2);
        assert_eq!(view.total_sales, 600.0);
        assert_eq!(view.total_gross_profit, 270.0);
        assert_eq!(view.crosstab.count("D1", "F1"), 3);
        assert_eq!(view.pareto.len(), 1);
        assert_eq!(view.pareto[0].cumulative_pct, Some(100.0));
    }

    #[test]
    fn range_excluding_everything() {
        let selection = Selection {
            granularity: Granularity::Daily,
            range: DateRange::new(d("2023-01-01"), d("2023-12-31")),
        };
        let view = build_view(&orders(), &selection, MarginPolicy::Omit);

        assert_eq!(view.filtered_rows, 0);
        assert!(view.periods.is_empty());
        assert_eq!(view.total_sales, 0.0);
        assert_eq!(view.overall_margin_pct, None);
        assert!(view.summary.is_none());
        assert!(view.crosstab.is_empty());
        assert!(view.pareto.is_empty());
    }

    #[test]
    fn kpi_equals_filtered_sales() {
        let selection = Selection {
            granularity: Granularity::Daily,
            range: DateRange::new(d("2024-01-06"), d("2024-02-10")),
        };
        let view = build_view(&orders(), &selection, MarginPolicy::Omit);
        assert_eq!(view.filtered_rows, 2);
        assert_eq!(view.total_sales, 500.0);
    }
}
