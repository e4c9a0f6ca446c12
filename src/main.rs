mod charts;
mod config;
mod error;
mod heatmap;
mod loader;
mod model;
mod pareto;
mod pipeline;
mod stats;
mod ui;

use config::DashboardConfig;
use eframe::egui;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use ui::SalesDashboardApp;

fn main() -> eframe::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = config::load_config().unwrap_or_else(|e| {
        tracing::error!(error = %e, "falling back to default config");
        DashboardConfig::default()
    });

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 960.0])
            .with_min_inner_size([900.0, 600.0]),
        ..Default::default()
    };

    eframe::run_native(
        "売上ダッシュボード",
        options,
        Box::new(|cc| {
            let mut fonts = egui::FontDefinitions::default();

            if let Some(path) = &config.font_path {
                match std::fs::read(path) {
                    Ok(data) => {
                        fonts.font_data.insert(
                            "cjk".to_owned(),
                            egui::FontData::from_owned(data).into(),
                        );
                        for family in [egui::FontFamily::Proportional, egui::FontFamily::Monospace] {
                            if let Some(list) = fonts.families.get_mut(&family) {
                                list.insert(0, "cjk".to_owned());
                            }
                        }
                        tracing::info!("installed font {}", path.display());
                    }
                    Err(e) => tracing::warn!(error = %e, "cannot read font {}", path.display()),
                }
            }

            cc.egui_ctx.set_fonts(fonts);
            ui::set_custom_style(&cc.egui_ctx);
            Ok(Box::new(SalesDashboardApp::new(config)))
        }),
    )
}
