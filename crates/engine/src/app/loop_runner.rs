use std::env;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::EngineError;

use super::action::{GameAction, GameState};
use super::game::{Game, GameContext};
use super::level::Level;
use super::rendering::{Camera, Frame};

pub const MAX_STEPS_ENV_VAR: &str = "GRID_ENGINE_MAX_STEPS";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoopConfig {
    /// `None` lets an action step until the game completes it.
    pub max_steps_per_action: Option<u32>,
}

impl LoopConfig {
    /// Defaults overridden by [`MAX_STEPS_ENV_VAR`] when it is set.
    pub fn from_env() -> Self {
        let config = Self::default();
        Self {
            max_steps_per_action: resolve_max_steps(config.max_steps_per_action),
        }
    }

    pub fn with_max_steps_per_action(mut self, max_steps: Option<u32>) -> Self {
        self.max_steps_per_action = max_steps;
        self
    }
}

fn resolve_max_steps(config_max_steps: Option<u32>) -> Option<u32> {
    match env::var(MAX_STEPS_ENV_VAR) {
        Ok(value) => parse_max_steps(&value).unwrap_or_else(|| {
            warn!(
                env_var = MAX_STEPS_ENV_VAR,
                value = value.as_str(),
                "invalid max-steps env var value; falling back to config"
            );
            config_max_steps
        }),
        Err(env::VarError::NotPresent) => config_max_steps,
        Err(err) => {
            warn!(
                env_var = MAX_STEPS_ENV_VAR,
                error = %err,
                "unable to read max-steps env var; falling back to config"
            );
            config_max_steps
        }
    }
}

/// Outer `None` means unparsable; `0` means unbounded.
fn parse_max_steps(value: &str) -> Option<Option<u32>> {
    match value.trim().parse::<u32>() {
        Ok(0) => Some(None),
        Ok(steps) => Some(Some(steps)),
        Err(_) => None,
    }
}

/// Everything produced by one call to [`GameRunner::perform_action`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionOutcome {
    pub game_id: String,
    pub frames: Vec<Frame>,
    pub state: GameState,
    pub score: u32,
    pub action: GameAction,
}

/// Owns a game's rules and its private copies of every level.
pub struct GameRunner<G: Game> {
    ctx: GameContext,
    rules: G,
    config: LoopConfig,
}

impl<G: Game> GameRunner<G> {
    /// Clones `levels`, then enters the first one.
    pub fn new(
        game_id: impl Into<String>,
        levels: &[Level],
        camera: Option<Camera>,
        rules: G,
    ) -> Result<Self, EngineError> {
        Self::with_config(game_id, levels, camera, rules, LoopConfig::default())
    }

    pub fn with_config(
        game_id: impl Into<String>,
        levels: &[Level],
        camera: Option<Camera>,
        rules: G,
        config: LoopConfig,
    ) -> Result<Self, EngineError> {
        let ctx = GameContext::new(game_id, levels, camera.unwrap_or_default())?;
        let mut runner = Self { ctx, rules, config };
        runner.set_level(0)?;
        Ok(runner)
    }

    pub fn context(&self) -> &GameContext {
        &self.ctx
    }

    pub fn context_mut(&mut self) -> &mut GameContext {
        &mut self.ctx
    }

    pub fn rules(&self) -> &G {
        &self.rules
    }

    pub fn rules_mut(&mut self) -> &mut G {
        &mut self.rules
    }

    pub fn config(&self) -> &LoopConfig {
        &self.config
    }

    pub fn state(&self) -> GameState {
        self.ctx.state()
    }

    pub fn score(&self) -> u32 {
        self.ctx.score()
    }

    /// Unlike [`GameContext::set_level`], runs `on_set_level` immediately.
    pub fn set_level(&mut self, index: usize) -> Result<(), EngineError> {
        self.ctx.set_level(index)?;
        self.dispatch_level_hooks()
    }

    pub fn set_level_by_name(&mut self, name: &str) -> Result<(), EngineError> {
        self.ctx.set_level_by_name(name)?;
        self.dispatch_level_hooks()
    }

    /// Camera view of the current level with the game's overlay on top.
    pub fn render(&self) -> Frame {
        let mut frame = self.ctx.render_frame();
        self.rules.render_interface(&self.ctx, &mut frame);
        frame
    }

    pub fn perform_action(&mut self, action: GameAction) -> Result<ActionOutcome, EngineError> {
        if action.is_reset() {
            return self.reset(action);
        }

        if self.ctx.state().is_terminal() {
            warn!(
                game_id = %self.ctx.game_id(),
                action = %action,
                state = ?self.ctx.state(),
                "action_ignored"
            );
            return Ok(self.outcome(action, Vec::new()));
        }

        self.ctx.begin_action(action);
        let mut frames = Vec::new();
        let mut steps = 0u32;
        while !self.ctx.is_action_complete() {
            if let Some(max_steps) = self.config.max_steps_per_action {
                if steps >= max_steps {
                    warn!(
                        game_id = %self.ctx.game_id(),
                        action = %action,
                        steps,
                        "step_ceiling_reached"
                    );
                    return Err(EngineError::ActionIncomplete { steps });
                }
            }
            self.rules.step(&mut self.ctx)?;
            steps += 1;
            self.dispatch_level_hooks()?;
            frames.push(self.render());
        }
        self.ctx.finish_action();

        debug!(
            game_id = %self.ctx.game_id(),
            action = %action,
            frame_count = frames.len(),
            state = ?self.ctx.state(),
            score = self.ctx.score(),
            "action_performed"
        );
        Ok(self.outcome(action, frames))
    }

    fn reset(&mut self, action: GameAction) -> Result<ActionOutcome, EngineError> {
        let full = self.ctx.action_count() == 0;
        if full {
            self.ctx.full_reset()?;
        } else {
            self.ctx.level_reset()?;
        }
        self.dispatch_level_hooks()?;
        self.ctx.mark_reset(action);
        info!(
            game_id = %self.ctx.game_id(),
            full,
            level_index = self.ctx.level_index(),
            "game_reset"
        );
        let frames = vec![self.render()];
        Ok(self.outcome(action, frames))
    }

    fn dispatch_level_hooks(&mut self) -> Result<(), EngineError> {
        while self.ctx.take_pending_level_hook() {
            self.rules.on_set_level(&mut self.ctx)?;
        }
        Ok(())
    }

    fn outcome(&self, action: GameAction, frames: Vec<Frame>) -> ActionOutcome {
        ActionOutcome {
            game_id: self.ctx.game_id().to_string(),
            frames,
            state: self.ctx.state(),
            score: self.ctx.score(),
            action,
        }
    }
}
