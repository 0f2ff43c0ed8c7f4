use grid_engine::{
    BlockingMode, Camera, EngineError, Frame, Game, GameAction, GameContext, Level,
    RenderableUserDisplay, Sprite, ToggleableUserDisplay,
};
use tracing::{debug, info};

pub(crate) const MAZE_GAME_ID: &str = "simple_maze";

const PLAYER: &str = "player";
const EXIT: &str = "exit";
const PLAYER_COLOR: i8 = 8;
const EXIT_COLOR: i8 = 9;
const WALL: i8 = 5;
const OPEN: i8 = -1;
const BACKGROUND: i8 = 0;
const PIP_DONE: i8 = 14;
const PIP_PENDING: i8 = 3;

const MAZE_1: [[i8; 8]; 8] = [
    [WALL, WALL, WALL, WALL, WALL, WALL, WALL, WALL],
    [WALL, OPEN, OPEN, OPEN, WALL, OPEN, OPEN, WALL],
    [WALL, OPEN, WALL, OPEN, WALL, OPEN, WALL, WALL],
    [WALL, OPEN, WALL, OPEN, OPEN, OPEN, OPEN, WALL],
    [WALL, OPEN, WALL, WALL, WALL, WALL, OPEN, WALL],
    [WALL, OPEN, OPEN, OPEN, OPEN, WALL, OPEN, WALL],
    [WALL, WALL, WALL, WALL, OPEN, OPEN, OPEN, WALL],
    [WALL, WALL, WALL, WALL, WALL, WALL, WALL, WALL],
];

const MAZE_2: [[i8; 12]; 12] = [
    [WALL, WALL, WALL, WALL, WALL, WALL, WALL, WALL, WALL, WALL, WALL, WALL],
    [WALL, OPEN, OPEN, OPEN, WALL, OPEN, OPEN, OPEN, OPEN, OPEN, OPEN, WALL],
    [WALL, OPEN, WALL, OPEN, WALL, OPEN, WALL, WALL, WALL, WALL, OPEN, WALL],
    [WALL, OPEN, WALL, OPEN, OPEN, OPEN, OPEN, OPEN, OPEN, WALL, OPEN, WALL],
    [WALL, OPEN, WALL, WALL, WALL, WALL, WALL, WALL, OPEN, WALL, OPEN, WALL],
    [WALL, OPEN, OPEN, OPEN, OPEN, OPEN, OPEN, WALL, OPEN, WALL, OPEN, WALL],
    [WALL, WALL, WALL, WALL, WALL, WALL, OPEN, WALL, OPEN, WALL, OPEN, WALL],
    [WALL, OPEN, OPEN, OPEN, OPEN, WALL, OPEN, WALL, OPEN, WALL, OPEN, WALL],
    [WALL, OPEN, WALL, WALL, OPEN, WALL, OPEN, WALL, OPEN, WALL, OPEN, WALL],
    [WALL, OPEN, WALL, OPEN, OPEN, WALL, OPEN, OPEN, OPEN, WALL, OPEN, WALL],
    [WALL, OPEN, OPEN, OPEN, WALL, WALL, WALL, WALL, WALL, WALL, OPEN, WALL],
    [WALL, WALL, WALL, WALL, WALL, WALL, WALL, WALL, WALL, WALL, WALL, WALL],
];

/// Walk the player onto the exit to clear a level; clearing the last one wins.
pub(crate) struct MazeGame {
    progress: ToggleableUserDisplay,
    blocked_moves: u32,
}

impl MazeGame {
    pub(crate) fn new(level_count: usize) -> Result<Self, EngineError> {
        let pairs = (0..level_count)
            .map(|index| -> Result<(Sprite, Sprite), EngineError> {
                let x = 1 + 2 * index as i32;
                Ok((pip(PIP_DONE, x)?, pip(PIP_PENDING, x)?))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            progress: ToggleableUserDisplay::new(&pairs),
            blocked_moves: 0,
        })
    }

    pub(crate) fn blocked_moves(&self) -> u32 {
        self.blocked_moves
    }
}

impl Game for MazeGame {
    fn step(&mut self, ctx: &mut GameContext) -> Result<(), EngineError> {
        let (dx, dy) = match ctx.action() {
            Some(GameAction::Action1) => (0, -1),
            Some(GameAction::Action2) => (0, 1),
            Some(GameAction::Action3) => (-1, 0),
            Some(GameAction::Action4) => (1, 0),
            _ => (0, 0),
        };

        if (dx, dy) != (0, 0) {
            let hits = ctx.try_move(PLAYER, dx, dy)?;
            if hits.iter().any(|sprite| sprite.name() == EXIT) {
                info!(level_index = ctx.level_index(), "maze_exit_reached");
                ctx.next_level()?;
            } else if !hits.is_empty() {
                self.blocked_moves += 1;
                debug!(dx, dy, blocked_moves = self.blocked_moves, "move_blocked");
            }
        }

        ctx.complete_action();
        Ok(())
    }

    fn on_set_level(&mut self, ctx: &mut GameContext) -> Result<(), EngineError> {
        for index in 0..self.progress.len() {
            if index < ctx.level_index() {
                self.progress.enable(index)?;
            } else {
                self.progress.disable(index)?;
            }
        }
        Ok(())
    }

    fn render_interface(&self, _ctx: &GameContext, frame: &mut Frame) {
        self.progress.render_interface(frame);
    }
}

pub(crate) fn maze_levels() -> Result<Vec<Level>, EngineError> {
    Ok(vec![
        maze_level("corridors", rows_of(&MAZE_1), (8, 8), (6, 6))?,
        maze_level("switchbacks", rows_of(&MAZE_2), (12, 12), (10, 10))?,
    ])
}

pub(crate) fn maze_camera() -> Result<Camera, EngineError> {
    Ok(Camera::with_viewport(8, 8)?
        .with_background(BACKGROUND)
        .with_letterbox(BACKGROUND))
}

fn maze_level(
    name: &str,
    walls: Vec<Vec<i8>>,
    grid_size: (u32, u32),
    exit_at: (i32, i32),
) -> Result<Level, EngineError> {
    let maze = Sprite::from_rows(walls)?
        .with_name(format!("maze_{name}"))
        .with_layer(-1)
        .with_blocking(BlockingMode::PixelPerfect);
    let player = Sprite::from_rows(vec![vec![PLAYER_COLOR]])?
        .with_name(PLAYER)
        .with_position(1, 1)
        .with_blocking(BlockingMode::BoundingBox);
    let exit = Sprite::from_rows(vec![vec![EXIT_COLOR]])?
        .with_name(EXIT)
        .with_position(exit_at.0, exit_at.1)
        .with_blocking(BlockingMode::BoundingBox);
    Ok(Level::new(vec![maze, player, exit])
        .with_name(name)
        .with_grid_size(grid_size.0, grid_size.1))
}

fn pip(color: i8, x: i32) -> Result<Sprite, EngineError> {
    Ok(Sprite::from_rows(vec![vec![color]])?
        .with_position(x, 1)
        .with_layer(10))
}

/// Reset followed by the shortest route through every level.
pub(crate) fn walkthrough() -> Vec<GameAction> {
    let mut actions = vec![GameAction::Reset];
    actions.extend(LEVEL_1_ROUTE);
    actions.extend(level_2_route());
    actions
}

const LEVEL_1_ROUTE: [GameAction; 10] = [
    GameAction::Action2,
    GameAction::Action2,
    GameAction::Action2,
    GameAction::Action2,
    GameAction::Action4,
    GameAction::Action4,
    GameAction::Action4,
    GameAction::Action2,
    GameAction::Action4,
    GameAction::Action4,
];

fn level_2_route() -> Vec<GameAction> {
    let mut route = vec![GameAction::Action4; 2];
    route.extend([GameAction::Action2; 2]);
    route.extend([GameAction::Action4; 2]);
    route.extend([GameAction::Action1; 2]);
    route.extend([GameAction::Action4; 5]);
    route.extend([GameAction::Action2; 9]);
    route
}

fn rows_of<const N: usize>(rows: &[[i8; N]]) -> Vec<Vec<i8>> {
    rows.iter().map(|row| row.to_vec()).collect()
}
