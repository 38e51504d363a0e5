//! Tickforge simulation engine binary.
//!
//! Wires a freshly built `WorldState` into a `WorldLoop`, hands that to
//! an `EngineManager`, and runs it on a background thread until the
//! process receives a shutdown signal.
//!
//! # Startup sequence
//!
//! 1. Initialize structured logging (tracing).
//! 2. Load configuration from `tickforge-config.yaml`, or defaults.
//! 3. Build the starting `WorldState` (plain grid -- world-generation
//!    content is the embedder's responsibility, not this binary's).
//! 4. Build the `WorldLoop` and hand it to an `EngineManager`.
//! 5. Start the background tick loop.
//! 6. Wait for Ctrl-C, then stop the loop and log the final tick.

mod error;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tickforge_agents::{ItemRegistry, SkillRegistry};
use tickforge_core::{EngineManager, SimulationConfig, WorldLoop};
use tickforge_types::Tile;
use tickforge_world::{Grid, WorldState};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration loading or starting the engine
/// manager fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(true)
        .init();

    info!("tickforge-engine starting");

    let config = load_config()?;
    info!(
        world_name = config.world.name,
        seed = config.world.seed,
        width = config.world.width,
        height = config.world.height,
        tick_interval_ms = config.world.tick_interval_ms,
        agent_decision_timeout_ms = config.world.agent_decision_timeout_ms,
        "configuration loaded"
    );

    // World-generation content (terrain, starting population, item and
    // class tables) is the embedder's to supply; this binary only needs
    // a grid of the configured dimensions to exist.
    let world = WorldState::new(
        config.world.seed,
        Grid::filled(config.world.width, config.world.height, Tile::Floor),
    );

    let world_loop = WorldLoop::new(
        world,
        Vec::new(),
        config.agents,
        Arc::new(ItemRegistry::new()),
        Arc::new(SkillRegistry::new()),
        Duration::from_millis(config.world.agent_decision_timeout_ms),
    );

    let manager = EngineManager::new(world_loop, config.world.tick_interval_ms);
    manager.start().map_err(|source| EngineError::Engine { source })?;
    info!(tick_interval_ms = manager.tick_interval_ms(), "world loop running");

    tokio::signal::ctrl_c().await?;
    info!("shutdown signal received");

    manager.stop().map_err(|source| EngineError::Engine { source })?;

    let final_tick = manager.latest_snapshot().map(|snapshot| snapshot.tick);
    info!(?final_tick, status = ?manager.status(), "tickforge-engine shutdown complete");

    Ok(())
}

/// Load the simulation configuration from `tickforge-config.yaml`,
/// relative to the current working directory, falling back to defaults
/// if the file is absent.
fn load_config() -> Result<SimulationConfig, EngineError> {
    let config_path = Path::new("tickforge-config.yaml");
    if config_path.exists() {
        Ok(SimulationConfig::from_file(config_path)?)
    } else {
        info!("config file not found, using defaults");
        Ok(SimulationConfig::default())
    }
}
