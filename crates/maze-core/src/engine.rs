//! Frame-loop driver tying tracker input, control mapping and the game
//! together.
//!
//! One `tick` per display frame: read the latest tracked point, map it to a
//! force, advance the game. The presentation layer renders from the
//! read-only accessors afterwards.

use crate::control::ControlMapper;
use crate::game::{Game, GameStatus, ShapeState};
use crate::maze::{BuildError, MazeLayout};
use crate::tracker::TrackerSlot;

/// Discrete user commands the driver honors. Quit is the embedding
/// process's concern, not the core's.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Start over. Only honored once the game is decided.
    Reset,
    /// Show/hide the tracker debug view. No effect on the simulation.
    ToggleAuxView,
}

/// The assembled core: game, mapper and tracker mailbox.
pub struct Engine {
    pub game: Game,
    pub mapper: ControlMapper,
    tracker: TrackerSlot,
    force: [f32; 2],
    aux_view: bool,
}

impl Engine {
    /// Builds the world and wires up an empty tracker slot.
    pub fn new(layout: MazeLayout, screen: [f32; 2]) -> Result<Self, BuildError> {
        let game = Game::new(layout)?;
        Ok(Self {
            game,
            mapper: ControlMapper::new(screen),
            tracker: TrackerSlot::new(),
            force: [0.0, 0.0],
            aux_view: true,
        })
    }

    /// A handle to the tracker mailbox for the producer side.
    pub fn tracker(&self) -> TrackerSlot {
        self.tracker.clone()
    }

    /// Runs one frame: tracker read, control mapping, game update.
    ///
    /// With nothing in the slot yet the mapper yields zero force; once a
    /// point has been published it is reused until the producer replaces
    /// it, so a slow tracker never stalls or jerks the player.
    pub fn tick(&mut self) {
        let raw = self.tracker.latest().map(|point| [point.x, point.y]);
        self.force = self.mapper.update(raw);
        self.game.update(self.force);
    }

    /// Handles a user command.
    pub fn command(&mut self, command: Command) -> Result<(), BuildError> {
        match command {
            Command::Reset => {
                if self.game.status().is_terminal() {
                    self.game.reset()?;
                } else {
                    tracing::debug!("[engine] reset ignored while playing");
                }
            }
            Command::ToggleAuxView => {
                self.aux_view = !self.aux_view;
            }
        }
        Ok(())
    }

    /// The force applied this frame, for debug visualization.
    pub fn force(&self) -> [f32; 2] {
        self.force
    }

    /// Whether the tracker debug view is shown.
    pub fn aux_view(&self) -> bool {
        self.aux_view
    }

    pub fn status(&self) -> &GameStatus {
        self.game.status()
    }

    /// Render handoff: every shape's position, orientation and category.
    pub fn shape_states(&self) -> Vec<ShapeState> {
        self.game.shape_states()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::GamePhase;
    use crate::tracker::TrackedPoint;
    use rapier2d::prelude::Vector;

    const SCREEN: [f32; 2] = [640.0, 480.0];

    fn engine() -> Engine {
        Engine::new(MazeLayout::classic(), SCREEN).unwrap()
    }

    fn lose(engine: &mut Engine) {
        let body = engine
            .game
            .maze
            .physics
            .get_rigid_body_mut(engine.game.maze.player_body)
            .unwrap();
        body.set_translation(Vector::new(125.0, 650.0), true);
        body.set_linvel(Vector::new(0.0, 0.0), true);
        engine.tick();
        assert!(engine.status().lost());
    }

    #[test]
    fn test_tick_without_tracker_input_applies_no_force() {
        let mut engine = engine();
        engine.tick();
        assert_eq!(engine.force(), [0.0, 0.0]);
        assert_eq!(engine.status().phase, GamePhase::Playing);
    }

    #[test]
    fn test_tracked_point_drives_the_player() {
        let mut engine = engine();
        let producer = engine.tracker();

        producer.publish(TrackedPoint::new(0, 1.0, 0.5));
        for _ in 0..50 {
            engine.tick();
        }

        assert!(engine.force()[0] > 100.0, "force: {:?}", engine.force());

        // The point sticks until the producer replaces it.
        let force = engine.force();
        engine.tick();
        assert!((engine.force()[0] - force[0]).abs() < 5.0);
    }

    #[test]
    fn test_reset_ignored_while_playing() {
        let mut engine = engine();
        for _ in 0..3 {
            engine.tick();
        }
        let frame = engine.game.maze.physics.current_frame();

        engine.command(Command::Reset).unwrap();
        // Still the same world: a rebuild would restart the frame counter.
        assert_eq!(engine.game.maze.physics.current_frame(), frame);
    }

    #[test]
    fn test_reset_honored_after_losing() {
        let mut engine = engine();
        lose(&mut engine);

        engine.command(Command::Reset).unwrap();
        assert_eq!(engine.status().phase, GamePhase::Playing);
        assert_eq!(engine.status().keys_collected, 0);
        assert_eq!(engine.game.maze.physics.current_frame(), 0);
    }

    #[test]
    fn test_toggle_aux_view_only_flips_the_flag() {
        let mut engine = engine();
        assert!(engine.aux_view());

        engine.command(Command::ToggleAuxView).unwrap();
        assert!(!engine.aux_view());
        assert_eq!(engine.status().phase, GamePhase::Playing);

        engine.command(Command::ToggleAuxView).unwrap();
        assert!(engine.aux_view());
    }

    #[test]
    fn test_shape_states_expose_render_data() {
        let engine = engine();
        let states = engine.shape_states();
        assert_eq!(states.len(), 40);
    }
}
