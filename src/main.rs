use anyhow::Result;
use busan_dash::{
    dashboard::{ParquetExporter, Renderer},
    Dashboard, DashboardConfig, PanelOutcome,
};
use std::{env, path::PathBuf, time::Instant};
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .init();
    info!("startup");

    // ─── 2) load config ──────────────────────────────────────────────
    let config = match env::args().nth(1) {
        Some(path) => DashboardConfig::load(&PathBuf::from(path))?,
        None => {
            info!("no config given; using stock data/ layout");
            DashboardConfig::default()
        }
    };
    info!(
        data_dir = %config.data_dir.display(),
        encodings = ?config.encodings,
        "config loaded"
    );

    // ─── 3) build panels ─────────────────────────────────────────────
    let start = Instant::now();
    let dashboard = Dashboard::new(config);
    let outcomes = dashboard.build_all();

    // ─── 4) hand off to the renderer ─────────────────────────────────
    let mut exporter = ParquetExporter::new(&dashboard.config().output_dir)?;
    exporter.render(&outcomes, &dashboard.config().render)?;

    // ─── 5) summary ──────────────────────────────────────────────────
    let built = outcomes.iter().filter(|o| o.is_built()).count();
    for panel in outcomes.iter().filter_map(PanelOutcome::panel) {
        for problem in &panel.section_errors {
            warn!(panel = panel.id.as_str(), error = %problem, "panel partially built");
        }
    }
    for outcome in &outcomes {
        if let PanelOutcome::Failed { id, message } = outcome {
            warn!(panel = id.as_str(), error = %message, "panel unavailable");
        }
    }
    info!(
        built,
        failed = outcomes.len() - built,
        cached_tables = dashboard.cache().len(),
        out = %exporter.out_dir().display(),
        elapsed = ?start.elapsed(),
        "done"
    );
    Ok(())
}
