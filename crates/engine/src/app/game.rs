use tracing::info;

use crate::EngineError;

use super::action::{GameAction, GameState};
use super::level::Level;
use super::rendering::{Camera, Frame};
use super::sprite::Sprite;

/// Rules of a concrete game, driven by [`crate::GameRunner`].
///
/// `step` must eventually call [`GameContext::complete_action`]; the runner
/// keeps stepping and rendering until it does.
pub trait Game {
    fn step(&mut self, ctx: &mut GameContext) -> Result<(), EngineError>;

    /// Runs after every level switch, with the new level already current.
    fn on_set_level(&mut self, _ctx: &mut GameContext) -> Result<(), EngineError> {
        Ok(())
    }

    fn render_interface(&self, _ctx: &GameContext, _frame: &mut Frame) {}
}

/// Everything a [`Game`] may read or mutate while handling an action.
#[derive(Debug, Clone)]
pub struct GameContext {
    game_id: String,
    pristine_levels: Vec<Level>,
    levels: Vec<Level>,
    level_index: usize,
    camera: Camera,
    state: GameState,
    score: u32,
    action: Option<GameAction>,
    action_complete: bool,
    action_count: u32,
    pending_level_hooks: u32,
}

impl GameContext {
    pub(crate) fn new(
        game_id: impl Into<String>,
        levels: &[Level],
        camera: Camera,
    ) -> Result<Self, EngineError> {
        if levels.is_empty() {
            return Err(EngineError::EmptySceneList);
        }
        Ok(Self {
            game_id: game_id.into(),
            pristine_levels: levels.to_vec(),
            levels: levels.to_vec(),
            level_index: 0,
            camera,
            state: GameState::NotPlayed,
            score: 0,
            action: None,
            action_complete: false,
            action_count: 0,
            pending_level_hooks: 0,
        })
    }

    pub fn game_id(&self) -> &str {
        &self.game_id
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn set_score(&mut self, score: u32) {
        self.score = score;
    }

    pub fn action(&self) -> Option<GameAction> {
        self.action
    }

    /// Completed actions since the last reset.
    pub fn action_count(&self) -> u32 {
        self.action_count
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn level_index(&self) -> usize {
        self.level_index
    }

    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    pub fn is_last_level(&self) -> bool {
        self.level_index + 1 == self.levels.len()
    }

    pub fn current_level(&self) -> &Level {
        &self.levels[self.level_index]
    }

    pub fn current_level_mut(&mut self) -> &mut Level {
        &mut self.levels[self.level_index]
    }

    pub fn complete_action(&mut self) {
        self.action_complete = true;
    }

    pub fn is_action_complete(&self) -> bool {
        self.action_complete
    }

    pub fn win(&mut self) {
        self.state = GameState::Win;
        info!(game_id = %self.game_id, score = self.score, "game_won");
    }

    pub fn lose(&mut self) {
        self.state = GameState::GameOver;
        info!(game_id = %self.game_id, score = self.score, "game_lost");
    }

    /// Switches level and resizes the camera to the level's grid size.
    ///
    /// The `on_set_level` hook is queued and runs once control returns to
    /// the runner.
    pub fn set_level(&mut self, index: usize) -> Result<(), EngineError> {
        let Some(level) = self.levels.get(index) else {
            return Err(EngineError::IndexOutOfRange {
                what: "level",
                index: index as i64,
                len: self.levels.len(),
            });
        };
        if let Some((width, height)) = level.grid_size() {
            self.camera.resize(width, height)?;
        }
        self.level_index = index;
        self.pending_level_hooks += 1;
        info!(
            game_id = %self.game_id,
            level_index = index,
            level_name = ?self.current_level().name(),
            sprite_count = self.current_level().sprite_count(),
            "level_set"
        );
        Ok(())
    }

    pub fn set_level_by_name(&mut self, name: &str) -> Result<(), EngineError> {
        let index = self
            .levels
            .iter()
            .position(|level| level.name() == Some(name))
            .ok_or_else(|| EngineError::LevelNotFound {
                name: name.to_string(),
            })?;
        self.set_level(index)
    }

    /// Scores the finished level and enters a fresh copy of the next one,
    /// or wins when the current level is the last.
    pub fn next_level(&mut self) -> Result<(), EngineError> {
        if self.is_last_level() {
            self.win();
            return Ok(());
        }
        self.score += 1;
        let next = self.level_index + 1;
        self.levels[next] = self.pristine_levels[next].clone();
        self.set_level(next)
    }

    /// Restores every level, returns to the first one and zeroes the score.
    pub fn full_reset(&mut self) -> Result<(), EngineError> {
        self.levels = self.pristine_levels.clone();
        self.score = 0;
        self.action_count = 0;
        self.set_level(0)
    }

    /// Restores only the current level.
    pub fn level_reset(&mut self) -> Result<(), EngineError> {
        let index = self.level_index;
        self.levels[index] = self.pristine_levels[index].clone();
        self.action_count = 0;
        self.set_level(index)
    }

    /// Moves the first sprite named `name`, reverting when it would collide.
    ///
    /// Returns clones of every sprite hit; an empty result means the move
    /// was kept.
    pub fn try_move(&mut self, name: &str, dx: i32, dy: i32) -> Result<Vec<Sprite>, EngineError> {
        let level = &mut self.levels[self.level_index];
        let index = level
            .sprite_index_by_name(name)
            .ok_or_else(|| EngineError::EntityNotFound {
                name: name.to_string(),
            })?;
        level.sprites_mut()[index].move_by(dx, dy);

        let sprites = level.sprites();
        let moved = &sprites[index];
        let collisions: Vec<Sprite> = sprites
            .iter()
            .filter(|other| moved.collides_with(other))
            .cloned()
            .collect();

        if !collisions.is_empty() {
            level.sprites_mut()[index].move_by(-dx, -dy);
        }
        Ok(collisions)
    }

    pub fn render_frame(&self) -> Frame {
        self.camera.render(self.current_level().sprites())
    }

    pub(crate) fn begin_action(&mut self, action: GameAction) {
        self.action = Some(action);
        self.action_complete = false;
    }

    pub(crate) fn finish_action(&mut self) {
        self.action_count += 1;
        if self.state == GameState::NotPlayed {
            self.state = GameState::NotFinished;
        }
    }

    pub(crate) fn mark_reset(&mut self, action: GameAction) {
        self.action = Some(action);
        self.action_complete = true;
        self.state = GameState::NotFinished;
    }

    pub(crate) fn take_pending_level_hook(&mut self) -> bool {
        if self.pending_level_hooks == 0 {
            return false;
        }
        self.pending_level_hooks -= 1;
        true
    }
}
