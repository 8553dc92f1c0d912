//! `novade-compositing`: runs the compositor on the headless display until
//! SIGINT or SIGTERM.

use anyhow::Context;
use novade_compositing::display::{HeadlessDisplay, WindowId};
use novade_compositing::runtime::Runtime;
use novade_compositing::scene::HeadlessSceneFactory;
use novade_core::config::{ConfigLoader, CoreConfig};
use novade_core::logging::{init_logging, init_minimal_logging};

const SCREEN_WIDTH: u32 = 1920;
const SCREEN_HEIGHT: u32 = 1080;
const OVERLAY_WINDOW: WindowId = WindowId(1);

fn load_config() -> anyhow::Result<CoreConfig> {
    match ConfigLoader::load() {
        Ok(config) => {
            init_logging(&config.logging, false).context("Failed to initialize logging")?;
            Ok(config)
        }
        Err(err) => {
            init_minimal_logging();
            tracing::warn!(error = %err, "Could not load configuration, using defaults");
            Ok(CoreConfig::default())
        }
    }
}

fn main() -> anyhow::Result<()> {
    let config = load_config()?;
    tracing::info!(
        backend = config.compositing.backend.as_str(),
        max_fps = config.compositing.max_fps,
        "Starting NovaDE compositing"
    );

    let display = HeadlessDisplay::with_all_extensions(SCREEN_WIDTH, SCREEN_HEIGHT);
    let scene_factory = Box::new(HeadlessSceneFactory::new(OVERLAY_WINDOW));
    let mut runtime =
        Runtime::new(display, scene_factory, config.compositing).context("Failed to create event loop")?;
    runtime.install_signal_handlers().context("Failed to install signal handlers")?;

    #[cfg(feature = "dbus")]
    let _bus = match novade_compositing::dbus::serve(runtime.control_sender()) {
        Ok(connection) => {
            novade_compositing::dbus::forward_events(connection.clone(), runtime.subscribe());
            Some(connection)
        }
        Err(err) => {
            tracing::warn!(error = %err, "Session bus unavailable, remote control disabled");
            None
        }
    };

    runtime.compositor_mut().setup();
    if !runtime.compositor().is_active() {
        let reason = runtime.compositor().compositing_not_possible_reason();
        if !reason.is_empty() {
            tracing::warn!(reason = %reason, "Running without compositing");
        }
    }

    runtime.run().context("Event loop failed")?;
    runtime.shutdown();
    tracing::info!("NovaDE compositing stopped");
    Ok(())
}
