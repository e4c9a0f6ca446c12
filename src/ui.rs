use crate::charts::{heatmap_grid, pareto_chart, trend_chart};
use crate::config::DashboardConfig;
use crate::loader::load_orders;
use crate::model::{DateRange, Granularity, OrderRecord};
use crate::pipeline::{build_view, DashboardView, Selection};
use crate::stats::date_bounds;
use chrono::{Duration, NaiveDate};
use eframe::egui;
use egui::{Color32, Context, FontFamily, FontId, Margin, RichText, Stroke, Visuals};
use egui_extras::{Column, TableBuilder};

const ACCENT: Color32 = Color32::from_rgb(255, 75, 75);
const MUTED: Color32 = Color32::from_rgb(110, 110, 120);

pub fn set_custom_style(ctx: &Context) {
    let mut visuals = Visuals::light();

    visuals.panel_fill = Color32::from_rgb(255, 255, 255);
    visuals.window_fill = Color32::from_rgb(255, 255, 255);
    visuals.faint_bg_color = Color32::from_rgb(240, 242, 246);
    visuals.extreme_bg_color = Color32::from_rgb(248, 249, 251);

    visuals.widgets.inactive.bg_fill = Color32::from_rgb(240, 242, 246);
    visuals.widgets.hovered.bg_stroke = Stroke::new(1.0, ACCENT);
    visuals.widgets.active.bg_stroke = Stroke::new(1.5, ACCENT);
    visuals.selection.bg_fill = Color32::from_rgb(255, 205, 205);
    visuals.selection.stroke = Stroke::new(1.0, ACCENT);

    ctx.set_visuals(visuals);

    let mut style = (*ctx.style()).clone();

    style.spacing.item_spacing = egui::vec2(8.0, 6.0);
    style.spacing.window_margin = Margin::same(12);
    style.spacing.button_padding = egui::vec2(10.0, 6.0);

    style.text_styles.insert(
        egui::TextStyle::Body,
        FontId::new(15.0, FontFamily::Proportional),
    );
    style.text_styles.insert(
        egui::TextStyle::Heading,
        FontId::new(22.0, FontFamily::Proportional),
    );
    style.text_styles.insert(
        egui::TextStyle::Button,
        FontId::new(15.0, FontFamily::Proportional),
    );

    ctx.set_style(style);
}

pub struct SalesDashboardApp {
    config: DashboardConfig,
    orders: Vec<OrderRecord>,
    load_error: Option<String>,
    bounds: Option<DateRange>,

    // Selectors, as day offsets from `bounds.start`
    granularity: Granularity,
    start_offset: i64,
    end_offset: i64,

    view: DashboardView,
}

impl SalesDashboardApp {
    pub fn new(config: DashboardConfig) -> Self {
        let mut app = Self {
            granularity: config.default_granularity,
            config,
            orders: vec![],
            load_error: None,
            bounds: None,
            start_offset: 0,
            end_offset: 0,
            view: DashboardView::default(),
        };
        app.reload();
        app
    }

    /// Re-reads the CSV. The range resets to the full data span whenever the
    /// data's date bounds change; otherwise the current range is kept.
    pub fn reload(&mut self) {
        let previous = self.selection().map(|s| s.range);
        let previous_bounds = self.bounds;

        match load_orders(&self.config.data_path) {
            Ok(orders) => {
                self.orders = orders;
                self.load_error = None;
            }
            Err(e) => {
                self.orders.clear();
                self.load_error = Some(e.to_string());
            }
        }

        self.bounds = date_bounds(&self.orders);
        if let Some(bounds) = self.bounds {
            let range = match previous {
                Some(r) if previous_bounds == Some(bounds) => r.clamp(&bounds),
                _ => bounds,
            };
            self.start_offset = (range.start - bounds.start).num_days();
            self.end_offset = (range.end - bounds.start).num_days();
        } else {
            self.start_offset = 0;
            self.end_offset = 0;
        }

        self.recompute();
    }

    pub fn selection(&self) -> Option<Selection> {
        let bounds = self.bounds?;
        Some(Selection {
            granularity: self.granularity,
            range: DateRange::new(
                bounds.start + Duration::days(self.start_offset),
                bounds.start + Duration::days(self.end_offset),
            ),
        })
    }

    pub fn recompute(&mut self) {
        self.view = match self.selection() {
            Some(selection) => build_view(&self.orders, &selection, self.config.margin_policy),
            None => DashboardView::default(),
        };
    }

    fn offset_date(&self, offset: i64) -> Option<NaiveDate> {
        self.bounds.map(|b| b.start + Duration::days(offset))
    }

    fn selectors(&mut self, ui: &mut egui::Ui) {
        let mut changed = false;

        ui.label(RichText::new("View by").strong());
        egui::ComboBox::from_id_salt("granularity")
            .selected_text(self.granularity.label())
            .show_ui(ui, |ui| {
                for g in Granularity::ALL {
                    if ui.selectable_value(&mut self.granularity, g, g.label()).clicked() {
                        changed = true;
                    }
                }
            });

        ui.add_space(12.0);
        ui.label(RichText::new("表示する期間を入力").strong());

        let Some(bounds) = self.bounds else {
            ui.label(RichText::new("No orders loaded").color(MUTED));
            return;
        };
        let span = bounds.days();

        ui.label(RichText::new("From").small().color(MUTED));
        if ui
            .add(egui::Slider::new(&mut self.start_offset, 0..=span).show_value(false))
            .changed()
        {
            self.end_offset = self.end_offset.max(self.start_offset);
            changed = true;
        }
        ui.label(RichText::new("To").small().color(MUTED));
        if ui
            .add(egui::Slider::new(&mut self.end_offset, 0..=span).show_value(false))
            .changed()
        {
            self.start_offset = self.start_offset.min(self.end_offset);
            changed = true;
        }

        if let (Some(start), Some(end)) = (
            self.offset_date(self.start_offset),
            self.offset_date(self.end_offset),
        ) {
            ui.label(format!("{start}  →  {end}"));
        }

        ui.add_space(12.0);
        if ui.button("Full range").clicked() {
            self.start_offset = 0;
            self.end_offset = span;
            changed = true;
        }

        if changed {
            self.recompute();
        }
    }

    fn kpi(&self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            metric(ui, "総売上金額 (JPY)", &format_yen(self.view.total_sales));
            ui.add_space(32.0);
            metric(ui, "粗利 (JPY)", &format_yen(self.view.total_gross_profit));
            ui.add_space(32.0);
            let margin = self
                .view
                .overall_margin_pct
                .map(|m| format!("{m:.1}%"))
                .unwrap_or_else(|| "n/a".into());
            metric(ui, "粗利率", &margin);
        });

        if let Some(summary) = self.view.summary {
            ui.label(
                RichText::new(format!(
                    "{} periods · mean {} · low {} · peak {}",
                    self.view.periods.len(),
                    format_yen(summary.mean),
                    format_yen(summary.min),
                    format_yen(summary.max),
                ))
                .small()
                .color(MUTED),
            );
        }
    }

    fn period_table(&self, ui: &mut egui::Ui) {
        egui::CollapsingHeader::new("Period detail")
            .default_open(false)
            .show(ui, |ui| {
                if ui
                    .button("📋 Copy as JSON")
                    .on_hover_text("Copy the period table to the clipboard")
                    .clicked()
                {
                    match serde_json::to_string_pretty(&self.view.periods) {
                        Ok(json) => ui.ctx().copy_text(json),
                        Err(e) => tracing::warn!(error = %e, "could not serialize periods"),
                    }
                }

                TableBuilder::new(ui)
                    .striped(true)
                    .vscroll(false)
                    .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
                    .column(Column::exact(110.0)) // Period
                    .column(Column::exact(140.0)) // Sales
                    .column(Column::exact(140.0)) // Purchase
                    .column(Column::exact(140.0)) // Gross profit
                    .column(Column::remainder()) // Margin
                    .header(24.0, |mut header| {
                        for title in ["period", "売上金額JPY", "仕入金額JPY", "粗利", "粗利率"] {
                            header.col(|ui| {
                                ui.label(RichText::new(title).strong());
                            });
                        }
                    })
                    .body(|body| {
                        body.rows(22.0, self.view.periods.len(), |mut row| {
                            let p = &self.view.periods[row.index()];
                            row.col(|ui| {
                                ui.label(&p.period);
                            });
                            row.col(|ui| {
                                ui.label(format_yen(p.sales));
                            });
                            row.col(|ui| {
                                ui.label(format_yen(p.purchase));
                            });
                            row.col(|ui| {
                                let color = if p.gross_profit < 0.0 { ACCENT } else { Color32::BLACK };
                                ui.label(RichText::new(format_yen(p.gross_profit)).color(color));
                            });
                            row.col(|ui| {
                                match p.gross_margin_pct {
                                    Some(m) => ui.label(format!("{m:.1}%")),
                                    None => ui.label(RichText::new("n/a").color(MUTED)),
                                };
                            });
                        });
                    });
            });
    }
}

fn metric(ui: &mut egui::Ui, label: &str, value: &str) {
    ui.vertical(|ui| {
        ui.label(RichText::new(label).small().color(MUTED));
        ui.label(RichText::new(value).size(32.0).strong());
    });
}

impl eframe::App for SalesDashboardApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        egui::TopBottomPanel::top("top").show(ctx, |ui| {
            ui.add_space(4.0);
            ui.horizontal(|ui| {
                ui.heading(RichText::new("売上ダッシュボード").strong().size(26.0));
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("⟳ Reload").clicked() {
                        self.reload();
                    }
                    ui.label(
                        RichText::new(self.config.data_path.display().to_string())
                            .small()
                            .color(MUTED),
                    );
                });
            });
            ui.add_space(4.0);
        });

        egui::SidePanel::left("selectors")
            .min_width(220.0)
            .max_width(300.0)
            .show(ctx, |ui| {
                ui.add_space(8.0);
                self.selectors(ui);
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            if let Some(err) = &self.load_error {
                ui.vertical_centered(|ui| {
                    ui.add_space(60.0);
                    ui.label(RichText::new("Could not load order data").size(22.0).color(ACCENT));
                    ui.add_space(8.0);
                    ui.label(RichText::new(err).monospace());
                });
                return;
            }

            egui::ScrollArea::vertical().show(ui, |ui| {
                self.kpi(ui);
                ui.add_space(8.0);

                if self.view.filtered_rows == 0 {
                    ui.label(RichText::new("No orders in the selected range").italics().color(MUTED));
                }

                ui.separator();
                ui.heading(format!("{}の売上金額と粗利率の推移", self.granularity.short_label()));
                trend_chart(ui, &self.view.periods);

                ui.separator();
                ui.heading("Count of Orders: 生産工場 vs 納入先");
                heatmap_grid(ui, &self.view.crosstab);

                ui.separator();
                ui.heading("Pareto Chart: 売上高と累計構成比 (商品別)");
                pareto_chart(ui, &self.view.pareto);

                ui.separator();
                self.period_table(ui);
            });
        });
    }
}

/// `¥1,234,567`, rounded to whole yen.
pub fn format_yen(value: f64) -> String {
    if !value.is_finite() {
        return "n/a".into();
    }
    let rounded = value.round();
    let digits = format!("{:.0}", rounded.abs());

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if rounded < 0.0 {
        format!("-¥{grouped}")
    } else {
        format!("¥{grouped}")
    }
}

/// Short axis label, e.g. `¥1.25M`.
pub fn format_compact_yen(value: f64) -> String {
    let sign = if value < 0.0 { "-" } else { "" };
    let v = value.abs();
    if v >= 1_000_000_000.0 {
        format!("{sign}¥{:.2}B", v / 1_000_000_000.0)
    } else if v >= 1_000_000.0 {
        format!("{sign}¥{:.2}M", v / 1_000_000.0)
    } else if v >= 1_000.0 {
        format!("{sign}¥{:.1}K", v / 1_000.0)
    } else {
        format!("{sign}¥{v:.0}")
    }
}
