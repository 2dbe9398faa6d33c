mod bootstrap;

use anyhow::{Context, Result};
use dash_core::error::DashError;
use dash_core::settings::Settings;
use dash_runtime::loader;
use dash_runtime::session::DashboardSession;
use dash_runtime::views;
use dash_ui::app::{App, Tab};

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::load_with_last_used();

    bootstrap::ensure_directories()?;
    bootstrap::setup_logging(&settings.log_level, settings.log_file.as_deref(), settings.json)?;

    tracing::info!("fridge-dash v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "View: {}, Theme: {}, Files: {}",
        settings.view,
        settings.theme,
        settings.files.len()
    );

    let mut session = build_session(&settings).await?;

    if settings.json {
        let export = views::export(&mut session);
        let json = serde_json::to_string_pretty(&export)?;
        println!("{}", json);
        return Ok(());
    }

    let app = App::new(&settings.theme, Tab::from_name(&settings.view), session);

    // The loop exits on 'q' / Ctrl+C inside the TUI; the OS-level handler
    // covers signals delivered while the terminal is in raw mode.
    tokio::select! {
        result = app.run() => {
            result.map_err(|e| DashError::Terminal(e.to_string()))?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Ctrl+C received; shutting down");
        }
    }

    Ok(())
}

/// Load the requested files and apply the CLI selections to a new session.
async fn build_session(settings: &Settings) -> Result<DashboardSession> {
    let mut session = DashboardSession::new();

    if settings.files.is_empty() {
        tracing::info!("no files given; starting with an empty dashboard");
    } else {
        for file in loader::load_paths(&settings.files).await? {
            session.upload(file);
        }
    }

    if let Some(name) = &settings.select {
        session.select(name).context("--select")?;
    }
    if !settings.compare.is_empty() {
        session
            .set_comparison(settings.compare.clone())
            .context("--compare")?;
    }
    session.set_overlay(settings.overlay_variables()?);
    session.set_normalize(settings.normalize);
    session.apply_color_overrides(&settings.color_overrides()?)?;

    Ok(session)
}
