use std::io::{self, Write};
use std::process::ExitCode;

use grid_engine::{ActionOutcome, EngineError, GameAction, GameRunner, GameState};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, info};

use super::bootstrap::{AppWiring, ScriptSource};
use super::maze::{maze_camera, maze_levels, walkthrough, MazeGame, MAZE_GAME_ID};
use super::script::{load_script, ScriptError};

#[derive(Debug, Error)]
pub(crate) enum RunError {
    #[error(transparent)]
    Script(#[from] ScriptError),
    #[error("game engine rejected the run: {0}")]
    Engine(#[from] EngineError),
    #[error("failed to encode action report: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("failed to write action report: {0}")]
    Write(#[source] io::Error),
}

/// One JSON line per performed action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct ActionReport {
    pub(crate) action: GameAction,
    pub(crate) frame_count: usize,
    pub(crate) state: GameState,
    pub(crate) score: u32,
    pub(crate) level_index: usize,
    pub(crate) last_frame_digest: Option<String>,
}

impl ActionReport {
    fn new(outcome: &ActionOutcome, level_index: usize) -> Self {
        Self {
            action: outcome.action,
            frame_count: outcome.frames.len(),
            state: outcome.state,
            score: outcome.score,
            level_index,
            last_frame_digest: outcome.frames.last().map(|frame| frame.digest()),
        }
    }
}

pub(crate) fn run(app: AppWiring) -> ExitCode {
    let stdout = io::stdout();
    match play(&app, &mut stdout.lock()) {
        Ok(state) => {
            info!(final_state = ?state, "run_finished");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!(error = %err, "run_failed");
            ExitCode::FAILURE
        }
    }
}

pub(crate) fn play(app: &AppWiring, out: &mut impl Write) -> Result<GameState, RunError> {
    let actions = match &app.script {
        ScriptSource::File(path) => load_script(path)?,
        ScriptSource::Walkthrough => walkthrough(),
    };

    let levels = maze_levels()?;
    let rules = MazeGame::new(levels.len())?;
    let mut runner = GameRunner::with_config(
        MAZE_GAME_ID,
        &levels,
        Some(maze_camera()?),
        rules,
        app.config.clone(),
    )?;
    info!(
        game_id = MAZE_GAME_ID,
        level_count = levels.len(),
        action_count = actions.len(),
        "run_started"
    );

    for action in actions {
        let outcome = runner.perform_action(action)?;
        let report = ActionReport::new(&outcome, runner.context().level_index());
        serde_json::to_writer(&mut *out, &report).map_err(RunError::Encode)?;
        writeln!(out).map_err(RunError::Write)?;
    }

    Ok(runner.state())
}
