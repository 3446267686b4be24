//! Per-entity behaviors.
//!
//! A behavior is a tagged variant plus the shared `collidable` flag. `update`,
//! `on_collision`, `process_input` and `export` dispatch on the variant; adding a
//! kind means adding one case to [`BehaviorKind`] and its arms below.

use std::f64::consts::TAU;

use rand::rngs::SmallRng;
use rand::Rng;
use tracing::{debug, info, warn};

use super::entity::{Body, Entity};
use super::events::{EventQueue, GameEvent};
use super::state::{GameState, Settings};
use crate::app::InputSnapshot;
use crate::content::BehaviorRecord;

pub const DEFAULT_PLAYER_SPEED: f64 = 5.0;
pub const DEFAULT_PLAYER_JUMP_HEIGHT: f64 = 10.0;
pub const DEFAULT_AI_SPEED: f64 = 2.0;
pub const DEFAULT_COLLECTIBLE_VALUE: f64 = 1.0;
pub const AI_CIRCLE_RADIUS: f64 = 50.0;
pub const AI_RANDOM_TURN_CHANCE: f64 = 0.02;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BehaviorType {
    Static,
    Player,
    Ai,
    Collectible,
    Obstacle,
    Trigger,
}

impl BehaviorType {
    pub const ALL: [BehaviorType; 6] = [
        BehaviorType::Static,
        BehaviorType::Player,
        BehaviorType::Ai,
        BehaviorType::Collectible,
        BehaviorType::Obstacle,
        BehaviorType::Trigger,
    ];

    pub fn as_token(self) -> &'static str {
        match self {
            Self::Static => "static",
            Self::Player => "player",
            Self::Ai => "ai",
            Self::Collectible => "collectible",
            Self::Obstacle => "obstacle",
            Self::Trigger => "trigger",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|behavior_type| behavior_type.as_token() == token)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AiPattern {
    #[default]
    Patrol,
    Circle,
    Random,
}

impl AiPattern {
    pub fn as_token(self) -> &'static str {
        match self {
            Self::Patrol => "patrol",
            Self::Circle => "circle",
            Self::Random => "random",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "patrol" => Some(Self::Patrol),
            "circle" => Some(Self::Circle),
            "random" => Some(Self::Random),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CollectibleEffect {
    #[default]
    Score,
    Health,
    Speed,
}

impl CollectibleEffect {
    pub fn as_token(self) -> &'static str {
        match self {
            Self::Score => "score",
            Self::Health => "health",
            Self::Speed => "speed",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "score" => Some(Self::Score),
            "health" => Some(Self::Health),
            "speed" => Some(Self::Speed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TriggerAction {
    #[default]
    None,
    Win,
    Lose,
    NextLevel,
    Teleport,
    Custom(String),
}

impl TriggerAction {
    pub fn as_token(&self) -> &str {
        match self {
            Self::None => "none",
            Self::Win => "win",
            Self::Lose => "lose",
            Self::NextLevel => "nextLevel",
            Self::Teleport => "teleport",
            Self::Custom(action) => action,
        }
    }

    pub fn from_token(token: &str) -> Self {
        match token {
            "none" => Self::None,
            "win" => Self::Win,
            "lose" => Self::Lose,
            "nextLevel" => Self::NextLevel,
            "teleport" => Self::Teleport,
            other => Self::Custom(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerBehavior {
    pub speed: f64,
    pub jump_height: f64,
    pub jumping: bool,
}

impl PlayerBehavior {
    pub fn new(speed: f64, jump_height: f64) -> Self {
        Self {
            speed,
            jump_height,
            jumping: false,
        }
    }

    fn update(&mut self, body: &mut Body, settings: &Settings) {
        if !self.jumping {
            return;
        }
        body.velocity_y += settings.gravity;
        body.y += body.velocity_y;
        if body.bottom() >= settings.height {
            body.y = settings.height - body.height;
            body.velocity_y = 0.0;
            self.jumping = false;
        }
    }

    fn on_collision(&mut self, body: &mut Body, other: &Entity) {
        let solid_obstacle = matches!(
            other.behavior.as_ref().map(|behavior| &behavior.kind),
            Some(BehaviorKind::Obstacle(ObstacleBehavior { solid: true }))
        );
        if !solid_obstacle {
            return;
        }

        let obstacle = &other.body;
        let overlap_x = (body.right() - obstacle.x).min(obstacle.right() - body.x);
        let overlap_y = (body.bottom() - obstacle.y).min(obstacle.bottom() - body.y);

        if overlap_x < overlap_y {
            if body.x < obstacle.x {
                body.x = obstacle.x - body.width;
            } else {
                body.x = obstacle.right();
            }
        } else if body.y < obstacle.y {
            body.y = obstacle.y - body.height;
            body.velocity_y = 0.0;
            self.jumping = false;
        } else {
            body.y = obstacle.bottom();
            body.velocity_y = 0.0;
        }
    }

    fn process_input(&mut self, body: &mut Body, input: &InputSnapshot, settings: &Settings) {
        let (axis_x, axis_y) = input.movement_axes();
        body.move_by(axis_x * self.speed, axis_y * self.speed);
        clamp_into_world(body, settings);

        if input.jump_pressed() && !self.jumping {
            body.velocity_y = -self.jump_height;
            self.jumping = true;
        }
    }
}

fn clamp_into_world(body: &mut Body, settings: &Settings) {
    if body.x < 0.0 {
        body.x = 0.0;
    }
    if body.y < 0.0 {
        body.y = 0.0;
    }
    if body.right() > settings.width {
        body.x = settings.width - body.width;
    }
    if body.bottom() > settings.height {
        body.y = settings.height - body.height;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AiBehavior {
    pub pattern: AiPattern,
    pub speed: f64,
    /// Patrol sign (+1/-1) for `Patrol`, heading in radians for `Random`.
    pub direction: f64,
    pub timer: f64,
    pub orbit_center: Option<(f64, f64)>,
}

impl AiBehavior {
    pub fn new(pattern: AiPattern, speed: f64) -> Self {
        Self {
            pattern,
            speed,
            direction: 1.0,
            timer: 0.0,
            orbit_center: None,
        }
    }

    fn update(&mut self, body: &mut Body, settings: &Settings, rng: &mut SmallRng, dt: f64) {
        self.timer += dt;

        match self.pattern {
            AiPattern::Patrol => {
                body.x += self.speed * self.direction;
                if body.x <= 0.0 || body.right() >= settings.width {
                    self.direction = -self.direction;
                }
            }
            AiPattern::Circle => {
                let (center_x, center_y) = *self.orbit_center.get_or_insert((body.x, body.y));
                let angle = self.timer * self.speed;
                body.x = center_x + angle.cos() * AI_CIRCLE_RADIUS;
                body.y = center_y + angle.sin() * AI_CIRCLE_RADIUS;
            }
            AiPattern::Random => {
                if rng.gen::<f64>() < AI_RANDOM_TURN_CHANCE {
                    self.direction = rng.gen::<f64>() * TAU;
                }

                body.x += self.direction.cos() * self.speed;
                body.y += self.direction.sin() * self.speed;

                if body.x <= 0.0 || body.right() >= settings.width {
                    self.direction = std::f64::consts::PI - self.direction;
                }
                if body.y <= 0.0 || body.bottom() >= settings.height {
                    self.direction = -self.direction;
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CollectibleBehavior {
    pub value: f64,
    pub effect: CollectibleEffect,
}

impl CollectibleBehavior {
    fn on_collision(&mut self, other: &mut Entity, state: &mut GameState) -> CollisionResponse {
        if !other.is_player() {
            return CollisionResponse::None;
        }

        match self.effect {
            CollectibleEffect::Score => state.score += self.value.round() as i64,
            CollectibleEffect::Health => {
                if let Some(health) = other.health.as_mut() {
                    *health += self.value;
                }
            }
            CollectibleEffect::Speed => {
                if let Some(speed) = other.behavior.as_mut().and_then(Behavior::speed_mut) {
                    *speed += self.value;
                }
            }
        }
        debug!(
            collector = %other.id,
            effect = self.effect.as_token(),
            value = self.value,
            "collectible_consumed"
        );
        CollisionResponse::Consumed
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObstacleBehavior {
    pub solid: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TriggerBehavior {
    pub action: TriggerAction,
    pub target: Option<(f64, f64)>,
    pub triggered: bool,
}

impl TriggerBehavior {
    pub fn new(action: TriggerAction) -> Self {
        Self {
            action,
            target: None,
            triggered: false,
        }
    }

    fn on_collision(
        &mut self,
        other: &mut Entity,
        state: &mut GameState,
        events: &mut EventQueue,
    ) {
        if self.triggered || !other.is_player() {
            return;
        }
        self.triggered = true;

        match &self.action {
            TriggerAction::Win => {
                info!("win_triggered");
                state.running = false;
                events.emit(GameEvent::Win);
            }
            TriggerAction::Lose => {
                info!("lose_triggered");
                state.running = false;
                events.emit(GameEvent::Lose);
            }
            TriggerAction::NextLevel => {
                info!("next_level_triggered");
                events.emit(GameEvent::NextLevel);
            }
            TriggerAction::Teleport => {
                if let Some((x, y)) = self.target {
                    other.body.set_position(x, y);
                    debug!(entity = %other.id, x, y, "teleported");
                }
            }
            action @ (TriggerAction::None | TriggerAction::Custom(_)) => {
                info!(action = action.as_token(), "trigger_activated");
                events.emit(GameEvent::Trigger {
                    action: action.as_token().to_string(),
                });
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BehaviorKind {
    Static,
    Player(PlayerBehavior),
    Ai(AiBehavior),
    Collectible(CollectibleBehavior),
    Obstacle(ObstacleBehavior),
    Trigger(TriggerBehavior),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionResponse {
    None,
    /// The entity owning this behavior has been used up and must leave the world.
    Consumed,
}

pub struct UpdateContext<'a> {
    pub settings: &'a Settings,
    pub rng: &'a mut SmallRng,
}

pub struct CollisionContext<'a> {
    pub settings: &'a Settings,
    pub state: &'a mut GameState,
    pub events: &'a mut EventQueue,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Behavior {
    pub collidable: bool,
    pub kind: BehaviorKind,
}

impl Behavior {
    pub fn new(kind: BehaviorKind) -> Self {
        Self {
            collidable: true,
            kind,
        }
    }

    pub fn static_behavior() -> Self {
        Self::new(BehaviorKind::Static)
    }

    pub fn player(speed: f64, jump_height: f64) -> Self {
        Self::new(BehaviorKind::Player(PlayerBehavior::new(speed, jump_height)))
    }

    pub fn ai(pattern: AiPattern, speed: f64) -> Self {
        Self::new(BehaviorKind::Ai(AiBehavior::new(pattern, speed)))
    }

    pub fn collectible(value: f64, effect: CollectibleEffect) -> Self {
        Self::new(BehaviorKind::Collectible(CollectibleBehavior { value, effect }))
    }

    pub fn obstacle(solid: bool) -> Self {
        Self::new(BehaviorKind::Obstacle(ObstacleBehavior { solid }))
    }

    pub fn trigger(action: TriggerAction) -> Self {
        Self::new(BehaviorKind::Trigger(TriggerBehavior::new(action)))
    }

    pub fn with_collidable(mut self, collidable: bool) -> Self {
        self.collidable = collidable;
        self
    }

    pub fn behavior_type(&self) -> BehaviorType {
        match self.kind {
            BehaviorKind::Static => BehaviorType::Static,
            BehaviorKind::Player(_) => BehaviorType::Player,
            BehaviorKind::Ai(_) => BehaviorType::Ai,
            BehaviorKind::Collectible(_) => BehaviorType::Collectible,
            BehaviorKind::Obstacle(_) => BehaviorType::Obstacle,
            BehaviorKind::Trigger(_) => BehaviorType::Trigger,
        }
    }

    pub fn is_player(&self) -> bool {
        matches!(self.kind, BehaviorKind::Player(_))
    }

    pub fn speed_mut(&mut self) -> Option<&mut f64> {
        match &mut self.kind {
            BehaviorKind::Player(player) => Some(&mut player.speed),
            BehaviorKind::Ai(ai) => Some(&mut ai.speed),
            _ => None,
        }
    }

    pub fn update(&mut self, body: &mut Body, ctx: &mut UpdateContext<'_>, dt: f64) {
        match &mut self.kind {
            BehaviorKind::Player(player) => player.update(body, ctx.settings),
            BehaviorKind::Ai(ai) => ai.update(body, ctx.settings, ctx.rng, dt),
            BehaviorKind::Static
            | BehaviorKind::Collectible(_)
            | BehaviorKind::Obstacle(_)
            | BehaviorKind::Trigger(_) => {}
        }
    }

    pub fn on_collision(
        &mut self,
        body: &mut Body,
        other: &mut Entity,
        ctx: &mut CollisionContext<'_>,
    ) -> CollisionResponse {
        match &mut self.kind {
            BehaviorKind::Player(player) => {
                player.on_collision(body, other);
                CollisionResponse::None
            }
            BehaviorKind::Collectible(collectible) => collectible.on_collision(other, ctx.state),
            BehaviorKind::Trigger(trigger) => {
                trigger.on_collision(other, ctx.state, ctx.events);
                CollisionResponse::None
            }
            BehaviorKind::Static | BehaviorKind::Ai(_) | BehaviorKind::Obstacle(_) => {
                CollisionResponse::None
            }
        }
    }

    /// Keyboard movement; only player behaviors react.
    pub fn process_input(&mut self, body: &mut Body, input: &InputSnapshot, settings: &Settings) {
        if let BehaviorKind::Player(player) = &mut self.kind {
            player.process_input(body, input, settings);
        }
    }

    /// Construction parameters only; transient state (timers, jump flags, orbit
    /// centers, triggered flags) is not persisted.
    pub fn export(&self) -> BehaviorRecord {
        let mut record = BehaviorRecord::of_type(self.behavior_type().as_token());
        match &self.kind {
            BehaviorKind::Static => {}
            BehaviorKind::Player(player) => {
                record.speed = Some(player.speed);
                record.jump_height = Some(player.jump_height);
            }
            BehaviorKind::Ai(ai) => {
                record.pattern = Some(ai.pattern.as_token().to_string());
                record.speed = Some(ai.speed);
            }
            BehaviorKind::Collectible(collectible) => {
                record.value = Some(collectible.value);
                record.effect = Some(collectible.effect.as_token().to_string());
            }
            BehaviorKind::Obstacle(obstacle) => {
                record.solid = Some(obstacle.solid);
            }
            BehaviorKind::Trigger(trigger) => {
                record.action = Some(trigger.action.as_token().to_string());
                if let Some((x, y)) = trigger.target {
                    record.target_x = Some(x);
                    record.target_y = Some(y);
                }
            }
        }
        record
    }
}

/// Builds a behavior from its record. Missing fields take the variant defaults;
/// an unknown type is not an error and yields a static behavior.
pub fn create_behavior(record: &BehaviorRecord) -> Behavior {
    let Some(behavior_type) = BehaviorType::from_token(&record.kind) else {
        warn!(
            behavior_type = record.kind.as_str(),
            "behavior_type_unknown"
        );
        return Behavior::static_behavior();
    };

    match behavior_type {
        BehaviorType::Static => Behavior::static_behavior(),
        BehaviorType::Player => Behavior::player(
            record.speed.unwrap_or(DEFAULT_PLAYER_SPEED),
            record.jump_height.unwrap_or(DEFAULT_PLAYER_JUMP_HEIGHT),
        ),
        BehaviorType::Ai => {
            let pattern = match record.pattern.as_deref() {
                None => AiPattern::default(),
                Some(token) => AiPattern::from_token(token).unwrap_or_else(|| {
                    warn!(pattern = token, "ai_pattern_unknown");
                    AiPattern::default()
                }),
            };
            Behavior::ai(pattern, record.speed.unwrap_or(DEFAULT_AI_SPEED))
        }
        BehaviorType::Collectible => {
            let effect = match record.effect.as_deref() {
                None => CollectibleEffect::default(),
                Some(token) => CollectibleEffect::from_token(token).unwrap_or_else(|| {
                    warn!(effect = token, "collectible_effect_unknown");
                    CollectibleEffect::default()
                }),
            };
            Behavior::collectible(record.value.unwrap_or(DEFAULT_COLLECTIBLE_VALUE), effect)
        }
        BehaviorType::Obstacle => Behavior::obstacle(record.solid.unwrap_or(true)),
        BehaviorType::Trigger => {
            let action = record
                .action
                .as_deref()
                .map(TriggerAction::from_token)
                .unwrap_or_default();
            let mut trigger = TriggerBehavior::new(action);
            if let (Some(x), Some(y)) = (record.target_x, record.target_y) {
                trigger.target = Some((x, y));
            }
            Behavior::new(BehaviorKind::Trigger(trigger))
        }
    }
}
