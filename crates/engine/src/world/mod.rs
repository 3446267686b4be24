mod behavior;
mod collision;
mod engine;
mod entity;
mod events;
mod layer;
mod state;

pub use behavior::{
    create_behavior, AiBehavior, AiPattern, Behavior, BehaviorKind, BehaviorType,
    CollectibleBehavior, CollectibleEffect, CollisionContext, CollisionResponse, ObstacleBehavior,
    PlayerBehavior, TriggerAction, TriggerBehavior, UpdateContext, AI_CIRCLE_RADIUS,
    AI_RANDOM_TURN_CHANCE, DEFAULT_AI_SPEED, DEFAULT_COLLECTIBLE_VALUE, DEFAULT_PLAYER_JUMP_HEIGHT,
    DEFAULT_PLAYER_SPEED,
};
pub use collision::resolve_collisions;
pub use engine::{EngineError, FrameReport, GameEngine};
pub use entity::{Body, Entity, EntityId, EntityIdAllocator};
pub use events::{EventQueue, GameEvent};
pub use layer::{Layer, LayerId};
pub use state::{
    GameState, Settings, DEFAULT_FRICTION, DEFAULT_GRAVITY, DEFAULT_GRID_SIZE,
    DEFAULT_WORLD_HEIGHT, DEFAULT_WORLD_WIDTH,
};
