//! Collision categories and the category-pair dispatch table.
//!
//! Shapes that matter to the game rules carry a `Category` tag in their
//! collider `user_data`. When a step reports a newly begun overlap, the
//! dispatch table looks up the unordered category pair and runs the first
//! matching handler. Handlers mutate the game status (and may remove
//! colliders); their return value says whether the physical response should
//! proceed, which only matters for solid-solid pairs. Sensors never resolve
//! physically regardless.

use rapier2d::prelude::ColliderHandle;
use serde::{Deserialize, Serialize};

use crate::game::{GamePhase, GameStatus};
use crate::physics::PhysicsWorld;

/// Tag selecting collision-response handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Player,
    Key,
    Exit,
    Wall,
}

impl Category {
    /// Encodes the category for storage in collider `user_data`.
    /// Zero is reserved for uncategorized shapes (obstacle, door panels).
    pub const fn user_data(self) -> u128 {
        match self {
            Self::Player => 1,
            Self::Key => 2,
            Self::Exit => 3,
            Self::Wall => 4,
        }
    }

    /// Decodes a category from collider `user_data`.
    pub const fn from_user_data(data: u128) -> Option<Self> {
        match data {
            1 => Some(Self::Player),
            2 => Some(Self::Key),
            3 => Some(Self::Exit),
            4 => Some(Self::Wall),
            _ => None,
        }
    }
}

/// A collision handler. Receives the colliders normalized so that the first
/// handle carries the first registered category. Returns whether the
/// physical collision response should proceed.
pub type Handler =
    fn(&mut GameStatus, &mut PhysicsWorld, ColliderHandle, ColliderHandle) -> bool;

/// Registry mapping unordered category pairs to handlers.
#[derive(Default)]
pub struct CollisionDispatch {
    rules: Vec<(Category, Category, Handler)>,
}

impl CollisionDispatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// The game's fixed interaction rules: key pickup, exit check, wall
    /// touch.
    pub fn standard_rules() -> Self {
        let mut dispatch = Self::new();
        dispatch.on(Category::Player, Category::Key, on_player_key);
        dispatch.on(Category::Player, Category::Exit, on_player_exit);
        dispatch.on(Category::Player, Category::Wall, on_player_wall);
        dispatch
    }

    /// Registers a handler for an unordered category pair.
    pub fn on(&mut self, a: Category, b: Category, handler: Handler) {
        self.rules.push((a, b, handler));
    }

    /// Looks up and runs the handler for a begun overlap.
    ///
    /// The pair matches regardless of which collider is which; the handler
    /// gets the colliders in registered-category order. Pairs with no
    /// matching rule (or with an uncategorized or already-removed shape)
    /// resolve physically as usual.
    pub fn dispatch(
        &self,
        status: &mut GameStatus,
        world: &mut PhysicsWorld,
        a: ColliderHandle,
        b: ColliderHandle,
    ) -> bool {
        let Some(ca) = category_of(world, a) else {
            return true;
        };
        let Some(cb) = category_of(world, b) else {
            return true;
        };

        for &(x, y, handler) in &self.rules {
            if ca == x && cb == y {
                return handler(status, world, a, b);
            }
            if ca == y && cb == x {
                return handler(status, world, b, a);
            }
        }
        true
    }
}

fn category_of(world: &PhysicsWorld, handle: ColliderHandle) -> Option<Category> {
    world
        .collider_set
        .get(handle)
        .and_then(|collider| Category::from_user_data(collider.user_data))
}

/// Player touched a key: remove it from the world for good and count it.
fn on_player_key(
    status: &mut GameStatus,
    world: &mut PhysicsWorld,
    _player: ColliderHandle,
    key: ColliderHandle,
) -> bool {
    if status.is_terminal() {
        return false;
    }

    // Removal is idempotent: a duplicate event for the same key in one
    // frame finds it already gone and is skipped silently.
    if world.remove_collider(key) {
        status.keys_collected += 1;
        tracing::info!(
            "[game] key collected ({}/{})",
            status.keys_collected,
            status.required_keys
        );
    }

    false
}

/// Player touched the exit: wins if enough keys are held.
fn on_player_exit(
    status: &mut GameStatus,
    _world: &mut PhysicsWorld,
    _player: ColliderHandle,
    _exit: ColliderHandle,
) -> bool {
    if status.is_terminal() {
        return false;
    }

    if status.keys_collected >= status.required_keys {
        status.phase = GamePhase::Won;
        tracing::info!("[game] exit reached, game won");
    }

    false
}

/// Player touched a wall: game over. The contact still resolves physically,
/// so the player visibly bounces at the moment of death.
fn on_player_wall(
    status: &mut GameStatus,
    _world: &mut PhysicsWorld,
    _player: ColliderHandle,
    _wall: ColliderHandle,
) -> bool {
    if status.is_terminal() {
        return true;
    }

    status.phase = GamePhase::Lost;
    tracing::info!("[game] player touched a wall, game over");
    true
}
