use crate::model::{OrderRecord, ParetoRecord};
use std::collections::HashMap;

/// Sales per item, largest first, with the running share of total sales.
///
/// Items with equal sales are ordered by name.
pub fn build_pareto(rows: &[&OrderRecord]) -> Vec<ParetoRecord> {
    let mut per_item: HashMap<&str, f64> = HashMap::new();
    for row in rows {
        *per_item.entry(row.item_name.as_str()).or_default() += row.sales;
    }

    let mut items: Vec<(&str, f64)> = per_item.into_iter().collect();
    items.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));

    let total: f64 = items.iter().map(|(_, sales)| sales).sum();
    let last = items.len().saturating_sub(1);
    let mut running = 0.0;

    items
        .into_iter()
        .enumerate()
        .map(|(i, (name, sales))| {
            running += sales;
            let cumulative_pct = if total != 0.0 {
                Some(if i == last { 100.0 } else { running / total * 100.0 })
            } else {
                None
            };
            ParetoRecord {
                item_name: name.to_string(),
                sales,
                cumulative_pct,
            }
        })
        .collect()
}
