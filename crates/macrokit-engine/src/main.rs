//! MacroKit engine entry point.
//!
//! Headless runner: loads the config and the macro library, installs the
//! global trigger hotkeys, and serves them until Ctrl-C. Recording and
//! macro editing go through the library API; this binary is the always-on
//! playback side.

#[cfg(not(target_os = "windows"))]
fn main() -> anyhow::Result<()> {
    anyhow::bail!("the macrokit binary needs the Windows input APIs; the library and its tests build everywhere");
}

#[cfg(target_os = "windows")]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    use std::sync::Arc;
    use std::time::Duration;

    use tracing::info;
    use tracing_subscriber::EnvFilter;

    use macrokit_engine::application::hotkeys::HotkeyRegistry;
    use macrokit_engine::application::play::{PlaybackOptions, Player};
    use macrokit_engine::application::trigger::TriggerDispatcher;
    use macrokit_engine::infrastructure::hotkey_hook::windows::WindowsHotkeyHook;
    use macrokit_engine::infrastructure::input_capture::windows::WindowsInputSource;
    use macrokit_engine::infrastructure::input_synthesis::windows::WindowsSynthesizer;
    use macrokit_engine::infrastructure::storage::{config, MacroStore};
    use macrokit_engine::infrastructure::window_info::windows::WindowsWindowTitle;

    let app_config = config::load_config()?;

    // Structured logging; RUST_LOG overrides the configured level.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&app_config.general.log_level)),
        )
        .init();

    info!("MacroKit engine starting");

    let store = MacroStore::open(app_config.macros_dir()?)?;
    let macros = store.load_all()?;
    info!(count = macros.len(), dir = %store.dir().display(), "macro library loaded");

    let registry = HotkeyRegistry::new(
        Arc::new(WindowsHotkeyHook::new()),
        Duration::from_secs(app_config.hotkeys.heartbeat_secs),
        Duration::from_millis(app_config.hotkeys.cooldown_ms),
    );

    let player = Arc::new(Player::new(
        Arc::new(WindowsSynthesizer::new()),
        Arc::new(WindowsInputSource::new()),
    ));

    let dispatcher = TriggerDispatcher::new(
        Arc::clone(&player),
        Arc::new(WindowsWindowTitle::new()),
        PlaybackOptions {
            speed: app_config.playback.default_speed,
            ..PlaybackOptions::default()
        },
    );
    dispatcher.bind_emergency_stop(&registry);
    dispatcher.bind_macros(&registry, &macros);
    registry.start()?;

    info!("MacroKit engine ready. Press Ctrl-C to exit.");
    tokio::signal::ctrl_c().await?;
    info!("shutdown signal received");

    registry.stop();
    player.stop();

    info!("MacroKit engine stopped");
    Ok(())
}
