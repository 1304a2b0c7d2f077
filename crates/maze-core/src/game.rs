//! Game state machine and per-frame simulation update.

use rapier2d::prelude::Vector;
use serde::{Deserialize, Serialize};

use crate::collision::{Category, CollisionDispatch};
use crate::maze::{BuildError, MazeLayout, MazeWorld};
use crate::physics::SUBSTEPS;

/// Game phase. `Won` and `Lost` are terminal until an explicit reset.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum GamePhase {
    #[default]
    Playing,
    Won,
    Lost,
}

/// Game progress, mutated only by collision handlers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameStatus {
    pub keys_collected: u32,
    /// Keys the player must hold before the exit opens (from the layout).
    pub required_keys: u32,
    pub phase: GamePhase,
}

impl GameStatus {
    /// Fresh status for a new game.
    pub fn new(required_keys: u32) -> Self {
        Self {
            keys_collected: 0,
            required_keys,
            phase: GamePhase::Playing,
        }
    }

    pub fn won(&self) -> bool {
        self.phase == GamePhase::Won
    }

    pub fn lost(&self) -> bool {
        self.phase == GamePhase::Lost
    }

    /// True once the game is decided; terminal until reset.
    pub fn is_terminal(&self) -> bool {
        self.phase != GamePhase::Playing
    }
}

/// Geometry of one shape, for the presentation layer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Geometry {
    Ball {
        radius: f32,
    },
    /// Thick segment; endpoints are local to the shape's position.
    Capsule {
        start: [f32; 2],
        end: [f32; 2],
        radius: f32,
    },
}

/// Read-only snapshot of one shape for rendering.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ShapeState {
    pub category: Option<Category>,
    pub sensor: bool,
    pub position: [f32; 2],
    pub rotation: f32,
    pub geometry: Geometry,
}

/// The running game: a built world, its layout (kept for resets), the
/// dispatch table and the current status.
pub struct Game {
    layout: MazeLayout,
    pub maze: MazeWorld,
    status: GameStatus,
    dispatch: CollisionDispatch,
}

impl Game {
    /// Builds the world from the layout and registers the standard rules.
    pub fn new(layout: MazeLayout) -> Result<Self, BuildError> {
        let maze = layout.build()?;
        let status = GameStatus::new(layout.required_keys);
        Ok(Self {
            layout,
            maze,
            status,
            dispatch: CollisionDispatch::standard_rules(),
        })
    }

    /// Advances the game by one frame.
    ///
    /// While playing, the control vector drives the player body; in a
    /// terminal phase no new input is applied, though residual velocity and
    /// damping still act. The frame is integrated in equal substeps, and
    /// each substep's newly begun overlaps run through the dispatch table
    /// in report order, so a handler sees the key count as committed by
    /// handlers earlier in the same frame.
    pub fn update(&mut self, control: [f32; 2]) {
        if self.status.phase == GamePhase::Playing {
            if let Some(body) = self.maze.physics.get_rigid_body_mut(self.maze.player_body) {
                body.set_linvel(Vector::new(control[0], control[1]), true);
            }
        }

        for _ in 0..SUBSTEPS {
            let begun = self.maze.physics.step();
            for (a, b) in begun {
                self.dispatch
                    .dispatch(&mut self.status, &mut self.maze.physics, a, b);
            }
        }
    }

    /// Hard reset: rebuilds the whole world from the retained layout and
    /// clears the status. Incremental teardown is deliberately avoided.
    pub fn reset(&mut self) -> Result<(), BuildError> {
        self.maze = self.layout.build()?;
        self.status = GameStatus::new(self.layout.required_keys);
        tracing::info!("[game] reset");
        Ok(())
    }

    pub fn status(&self) -> &GameStatus {
        &self.status
    }

    pub fn layout(&self) -> &MazeLayout {
        &self.layout
    }

    /// Current world position of the player body.
    pub fn player_position(&self) -> Option<[f32; 2]> {
        self.maze
            .physics
            .get_rigid_body(self.maze.player_body)
            .map(|body| {
                let pos = body.translation();
                [pos.x, pos.y]
            })
    }

    /// Snapshots every shape in the world for the presentation layer.
    pub fn shape_states(&self) -> Vec<ShapeState> {
        self.maze
            .physics
            .collider_set
            .iter()
            .map(|(_, collider)| {
                let pos = collider.translation();
                let geometry = if let Some(ball) = collider.shape().as_ball() {
                    Geometry::Ball {
                        radius: ball.radius,
                    }
                } else if let Some(capsule) = collider.shape().as_capsule() {
                    Geometry::Capsule {
                        start: [capsule.segment.a.x, capsule.segment.a.y],
                        end: [capsule.segment.b.x, capsule.segment.b.y],
                        radius: capsule.radius,
                    }
                } else {
                    Geometry::Ball { radius: 0.0 }
                };

                ShapeState {
                    category: Category::from_user_data(collider.user_data),
                    sensor: collider.is_sensor(),
                    position: [pos.x, pos.y],
                    rotation: collider.rotation().angle(),
                    geometry,
                }
            })
            .collect()
    }
}
