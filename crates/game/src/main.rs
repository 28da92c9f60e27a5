//! Ragdoll range - headless shooting range for the damage and ragdoll pipeline

mod config;
mod range;

use anyhow::Result;
use config::RangeConfig;
use range::Range;
use std::time::Duration;

/// Simulated render rate. Physics runs at its own fixed rate underneath.
const FRAME_RATE: f64 = 90.0;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = RangeConfig::load();
    log::info!(
        "Starting ragdoll range: {} targets at {:.0}m, {:.0}s limit",
        config.targets,
        config.distance,
        config.duration
    );

    let mut range = Range::new(&config)?;
    let frame = Duration::from_secs_f64(1.0 / FRAME_RATE);
    while !range.is_finished() {
        range.frame(frame);
    }

    let stats = &range.stats;
    println!("Ragdoll range finished after {:.2}s", range.time.elapsed_seconds());
    println!("  shots fired   {}", stats.shots);
    println!("  hits          {}", stats.hits);
    println!("  expired       {}", stats.misses);
    println!("  damage dealt  {:.1}", stats.damage_dealt);
    println!("  kills         {}/{}", stats.kills, config.targets);
    println!("  corpses gone  {}", stats.despawned);
    println!("  still standing {}", range.targets_alive());
    Ok(())
}
