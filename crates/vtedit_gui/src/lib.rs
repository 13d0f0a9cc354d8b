//! Native egui front end for the vtedit engine.
//!
//! Exposes a `run` helper so the workspace root can launch the editor
//! without duplicating initialization logic.

mod app;
mod input;
mod layout;
mod paint;

use app::EditorApp;
use eframe::egui;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use vtedit_core::config::env_flag_enabled;
use vtedit_core::EditorConfig;

const DEFAULT_LOG_FILTER: &str = "vtedit=warn,vtedit_core=info,vtedit_gui=info";

fn suppress_vulkan_loader_debug() {
    if env_flag_enabled("VTEDIT_KEEP_VK_DEBUG") {
        return;
    }
    std::env::remove_var("VK_LOADER_DEBUG");
}

fn init_tracing() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

/// Start the editor window with tracing enabled, opening `path` if given.
///
/// # Errors
/// Propagates any `eframe` initialization or runtime error, including app
/// creation failures when the file cannot be read or the edit worker cannot
/// start.
pub fn run(path: Option<PathBuf>) -> eframe::Result<()> {
    suppress_vulkan_loader_debug();
    init_tracing();

    let mut app = EditorApp::new(EditorConfig::from_env(), path.as_deref())
        .map_err(|err| eframe::Error::AppCreation(Box::new(err)))?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(app::DEFAULT_WINDOW_SIZE)
            .with_min_inner_size(app::MIN_WINDOW_SIZE)
            .with_title(app.window_title()),
        ..Default::default()
    };

    eframe::run_native(
        app::APP_NAME,
        options,
        Box::new(move |cc| {
            app.restore(cc.storage);
            Ok(Box::new(app))
        }),
    )
}
