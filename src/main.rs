use std::io::Write;

use anyhow::Context;
use menu_primitive::config::Config;
use menu_primitive::{replay, Scenario};

static USAGE: &str = "usage: menu-primitive <scenario.toml>";

fn main() -> anyhow::Result<()> {
    if let Ok(env_filter) = tracing_subscriber::EnvFilter::try_from_default_env() {
        tracing_subscriber::fmt()
            .compact()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        let filter = Config::with(|config| config.log_filter.clone());
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .compact()
            .with_writer(std::io::stderr)
            .init();
    }

    let Some(path) = std::env::args().nth(1) else {
        eprintln!("{USAGE}");
        std::process::exit(2);
    };

    let scenario =
        Scenario::load(&path).with_context(|| format!("Failed to load scenario {path}"))?;
    let options = Config::with(|config| config.menu_options());
    tracing::info!(
        "Replaying {} steps over {} menus",
        scenario.steps.len(),
        scenario.menus.len()
    );

    let frames = replay::run(&scenario, options).context("Failed to build menu tree")?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for frame in &frames {
        serde_json::to_writer(&mut out, frame)?;
        writeln!(out)?;
    }
    out.flush()?;
    Ok(())
}
