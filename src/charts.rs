use crate::heatmap::{blues, CrossTab};
use crate::model::{ParetoRecord, PeriodRecord};
use crate::ui::{format_compact_yen, format_yen};
use egui::{Align2, Color32, FontId, RichText, Sense, Stroke, Ui, Vec2};
use egui_plot::{
    AxisHints, Bar, BarChart, GridMark, HLine, HPlacement, Legend, Line, LineStyle, Plot,
    PlotPoint, Points,
};
use std::ops::RangeInclusive;

const SALES_BAR: Color32 = Color32::from_rgb(100, 149, 237); // cornflowerblue
const MARGIN_LINE: Color32 = Color32::from_rgb(240, 128, 128); // lightcoral
const PARETO_BAR: Color32 = Color32::from_rgba_premultiplied(90, 90, 90, 179);
const PARETO_LINE: Color32 = Color32::from_rgb(0, 0, 255);
const PARETO_THRESHOLD: f64 = 80.0;

const SALES_SERIES: &str = "Sales";
const MARGIN_SERIES: &str = "Gross margin %";
const CUMULATIVE_SERIES: &str = "Cumulative %";

/// Linear map between a right-hand axis and the plot's own (left) y axis.
///
/// egui_plot has a single y scale per plot, so right-axis series are drawn in
/// left-axis units and the right axis labels are converted back.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SecondaryAxis {
    primary: (f64, f64),
    secondary: (f64, f64),
}

impl SecondaryAxis {
    pub fn fit(primary: (f64, f64), secondary: (f64, f64)) -> Self {
        Self {
            primary: widen(primary),
            secondary: widen(secondary),
        }
    }

    pub fn to_primary(&self, v: f64) -> f64 {
        let t = (v - self.secondary.0) / (self.secondary.1 - self.secondary.0);
        self.primary.0 + t * (self.primary.1 - self.primary.0)
    }

    pub fn to_secondary(&self, y: f64) -> f64 {
        let t = (y - self.primary.0) / (self.primary.1 - self.primary.0);
        self.secondary.0 + t * (self.secondary.1 - self.secondary.0)
    }
}

fn widen((lo, hi): (f64, f64)) -> (f64, f64) {
    if hi - lo > f64::EPSILON {
        (lo, hi)
    } else {
        (lo, lo + 1.0)
    }
}

/// Range covering every value and zero.
fn span_with_zero(values: impl Iterator<Item = f64>) -> (f64, f64) {
    values.fold((0.0, 0.0), |(lo, hi), v| (lo.min(v), hi.max(v)))
}

/// Label for an ordinal x position, empty between categories.
fn category_label(labels: &[String], x: f64) -> String {
    let idx = x.round();
    if (x - idx).abs() > 1e-6 || idx < 0.0 {
        return String::new();
    }
    labels.get(idx as usize).cloned().unwrap_or_default()
}

/// Contiguous runs of defined values, so undefined points leave a gap.
fn segments(values: &[Option<f64>]) -> Vec<Vec<[f64; 2]>> {
    let mut runs = Vec::new();
    let mut current = Vec::new();
    for (i, v) in values.iter().enumerate() {
        match v {
            Some(v) if v.is_finite() => current.push([i as f64, *v]),
            _ => {
                if !current.is_empty() {
                    runs.push(std::mem::take(&mut current));
                }
            }
        }
    }
    if !current.is_empty() {
        runs.push(current);
    }
    runs
}

fn left_axis<'a>(title: &str) -> AxisHints<'a> {
    AxisHints::new_y()
        .label(title.to_string())
        .formatter(|mark: GridMark, _range: &RangeInclusive<f64>| format_compact_yen(mark.value))
}

fn right_axis<'a>(title: &str, axis: SecondaryAxis) -> AxisHints<'a> {
    AxisHints::new_y()
        .label(title.to_string())
        .placement(HPlacement::Right)
        .formatter(move |mark: GridMark, _range: &RangeInclusive<f64>| {
            format!("{:.0}%", axis.to_secondary(mark.value))
        })
}

/// Sales bars with the gross margin line on its own axis.
pub fn trend_chart(ui: &mut Ui, periods: &[PeriodRecord]) {
    let labels: Vec<String> = periods.iter().map(|p| p.period.clone()).collect();
    let margins: Vec<Option<f64>> = periods.iter().map(|p| p.gross_margin_pct).collect();

    let axis = SecondaryAxis::fit(
        span_with_zero(periods.iter().map(|p| p.sales)),
        span_with_zero(margins.iter().flatten().copied()),
    );

    let bars: Vec<Bar> = periods
        .iter()
        .enumerate()
        .map(|(i, p)| Bar::new(i as f64, p.sales).name(&p.period).width(0.7))
        .collect();
    let chart = BarChart::new(SALES_SERIES, bars)
        .color(SALES_BAR)
        .element_formatter(Box::new(|bar: &Bar, _chart: &BarChart| {
            format!("period: {}\nsales: {}", bar.name, format_yen(bar.value))
        }));

    let x_labels = labels.clone();
    let hover_labels = labels;
    let hover_margins = margins.clone();

    Plot::new("trend_chart")
        .height(400.0)
        .legend(Legend::default())
        .allow_scroll(false)
        .allow_zoom(false)
        .allow_drag(false)
        .x_axis_formatter(move |mark: GridMark, _range: &RangeInclusive<f64>| {
            category_label(&x_labels, mark.value)
        })
        .custom_y_axes(vec![
            left_axis("売上金額JPY"),
            right_axis("粗利率 (%)", axis),
        ])
        .label_formatter(move |name: &str, value: &PlotPoint| {
            let period = category_label(&hover_labels, value.x);
            if name == MARGIN_SERIES && !period.is_empty() {
                let idx = value.x.round() as usize;
                match hover_margins.get(idx).copied().flatten() {
                    Some(m) => format!("period: {period}\nmargin: {m:.1}%"),
                    None => format!("period: {period}\nmargin: n/a"),
                }
            } else {
                String::new()
            }
        })
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(chart);
            for run in segments(&margins) {
                let mapped: Vec<[f64; 2]> =
                    run.iter().map(|[x, m]| [*x, axis.to_primary(*m)]).collect();
                plot_ui.line(
                    Line::new(MARGIN_SERIES, mapped.clone())
                        .color(MARGIN_LINE)
                        .width(2.0),
                );
                plot_ui.points(
                    Points::new(MARGIN_SERIES, mapped)
                        .color(MARGIN_LINE)
                        .radius(3.5),
                );
            }
        });
}

/// Sales per item, largest first, with the cumulative share on a fixed 0–100 axis.
pub fn pareto_chart(ui: &mut Ui, pareto: &[ParetoRecord]) {
    let labels: Vec<String> = pareto.iter().map(|p| p.item_name.clone()).collect();
    let shares: Vec<Option<f64>> = pareto.iter().map(|p| p.cumulative_pct).collect();

    let axis = SecondaryAxis::fit(
        span_with_zero(pareto.iter().map(|p| p.sales)),
        (0.0, 100.0),
    );

    let bars: Vec<Bar> = pareto
        .iter()
        .enumerate()
        .map(|(i, p)| Bar::new(i as f64, p.sales).name(&p.item_name).width(0.7))
        .collect();
    let chart = BarChart::new(SALES_SERIES, bars)
        .color(PARETO_BAR)
        .element_formatter(Box::new(|bar: &Bar, _chart: &BarChart| {
            format!("品名: {}\nsales: {}", bar.name, format_yen(bar.value))
        }));

    let x_labels = labels.clone();
    let hover_labels = labels;
    let hover_shares = shares.clone();

    Plot::new("pareto_chart")
        .height(400.0)
        .legend(Legend::default())
        .allow_scroll(false)
        .allow_zoom(false)
        .allow_drag(false)
        .include_y(axis.to_primary(100.0))
        .x_axis_formatter(move |mark: GridMark, _range: &RangeInclusive<f64>| {
            category_label(&x_labels, mark.value)
        })
        .custom_y_axes(vec![
            left_axis("売上金額JPY"),
            right_axis("累計構成比 (%)", axis),
        ])
        .label_formatter(move |name: &str, value: &PlotPoint| {
            let item = category_label(&hover_labels, value.x);
            if name == CUMULATIVE_SERIES && !item.is_empty() {
                let idx = value.x.round() as usize;
                match hover_shares.get(idx).copied().flatten() {
                    Some(s) => format!("品名: {item}\ncumulative: {s:.1}%"),
                    None => format!("品名: {item}\ncumulative: n/a"),
                }
            } else {
                String::new()
            }
        })
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(chart);
            for run in segments(&shares) {
                let mapped: Vec<[f64; 2]> =
                    run.iter().map(|[x, s]| [*x, axis.to_primary(*s)]).collect();
                plot_ui.line(
                    Line::new(CUMULATIVE_SERIES, mapped.clone())
                        .color(PARETO_LINE)
                        .width(2.0),
                );
                plot_ui.points(
                    Points::new(CUMULATIVE_SERIES, mapped)
                        .color(PARETO_LINE)
                        .radius(3.5),
                );
            }
            plot_ui.hline(
                HLine::new("80%", axis.to_primary(PARETO_THRESHOLD))
                    .color(Color32::RED)
                    .style(LineStyle::Dashed { length: 5.0 }),
            );
        });
}

/// Order counts per factory (columns) and destination (rows).
pub fn heatmap_grid(ui: &mut Ui, tab: &CrossTab) {
    const CELL: Vec2 = Vec2::new(64.0, 28.0);

    if tab.is_empty() {
        ui.label(RichText::new("No orders to tabulate").small().weak());
        return;
    }

    let max = tab.max_count().max(1) as f32;
    let cells = tab.triples();
    let rows = tab.destinations.len();

    egui::ScrollArea::horizontal()
        .id_salt("heatmap_scroll")
        .show(ui, |ui| {
            egui::Grid::new("heatmap")
                .spacing([2.0, 2.0])
                .show(ui, |ui| {
                    ui.label(RichText::new("納入先 \\ 生産工場").small().weak());
                    for factory in &tab.factories {
                        ui.label(RichText::new(factory).strong());
                    }
                    ui.end_row();

                    for (r, destination) in tab.destinations.iter().enumerate() {
                        ui.label(RichText::new(destination).strong());
                        for c in 0..tab.factories.len() {
                            let cell = &cells[c * rows + r];
                            let count = cell.count;
                            let t = count as f32 / max;
                            let (rect, response) = ui.allocate_exact_size(CELL, Sense::hover());
                            ui.painter().rect_filled(rect, 2.0, blues(t));

                            let text_color = if t > 0.55 { Color32::WHITE } else { Color32::BLACK };
                            ui.painter().text(
                                rect.center(),
                                Align2::CENTER_CENTER,
                                count.to_string(),
                                FontId::proportional(13.0),
                                text_color,
                            );

                            response.on_hover_text(format!(
                                "納入先: {}\n生産工場: {}\ncount: {count}",
                                cell.destination, cell.factory
                            ));
                        }
                        ui.end_row();
                    }
                });
        });

    ui.add_space(6.0);
    ui.horizontal(|ui| {
        ui.label(RichText::new("Count").small());
        ui.label(RichText::new("0").small());
        let (rect, _) = ui.allocate_exact_size(Vec2::new(160.0, 12.0), Sense::hover());
        let steps = 32;
        let step_w = rect.width() / steps as f32;
        for i in 0..steps {
            let x = rect.left() + i as f32 * step_w;
            let cell = egui::Rect::from_min_size(egui::pos2(x, rect.top()), Vec2::new(step_w + 0.5, rect.height()));
            ui.painter().rect_filled(cell, 0.0, blues(i as f32 / (steps - 1) as f32));
        }
        ui.painter().rect_stroke(rect, 0.0, Stroke::new(1.0, Color32::GRAY), egui::StrokeKind::Inside);
        ui.label(RichText::new(tab.max_count().to_string()).small());
    });
}
