use std::env;
use std::ffi::OsString;
use std::path::PathBuf;

use grid_engine::LoopConfig;
use tracing::info;
use tracing_subscriber::EnvFilter;

pub(crate) const SCRIPT_ENV_VAR: &str = "GRID_GAMES_SCRIPT";

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ScriptSource {
    File(PathBuf),
    Walkthrough,
}

pub(crate) struct AppWiring {
    pub(crate) config: LoopConfig,
    pub(crate) script: ScriptSource,
}

pub(crate) fn build_app() -> AppWiring {
    init_tracing();
    info!("=== Grid Games Startup ===");

    let script = resolve_script_source(env::args_os().nth(1), env::var_os(SCRIPT_ENV_VAR));
    let config = LoopConfig::from_env();
    info!(
        script = ?script,
        max_steps_per_action = ?config.max_steps_per_action,
        "app_configured"
    );

    AppWiring { config, script }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}

/// The command-line argument wins over the environment variable.
fn resolve_script_source(arg: Option<OsString>, env_value: Option<OsString>) -> ScriptSource {
    arg.into_iter()
        .chain(env_value)
        .find(|value| !value.is_empty())
        .map(|value| ScriptSource::File(PathBuf::from(value)))
        .unwrap_or(ScriptSource::Walkthrough)
}
