use rand::rngs::SmallRng;
use rand::SeedableRng;
use tracing::{debug, error, info};

use super::behavior::{create_behavior, Behavior, CollisionContext, UpdateContext};
use super::collision::resolve_collisions;
use super::entity::{Body, Entity, EntityId, EntityIdAllocator};
use super::events::{EventQueue, GameEvent};
use super::layer::{Layer, LayerId};
use super::state::{GameState, Settings};
use crate::app::{render_world, InputSnapshot, RenderSink};
use crate::content::{
    DocumentError, EntityRecord, GameDocument, LayerRecord, Metadata, SettingsRecord,
};

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("entity id `{0}` already exists")]
    DuplicateEntity(EntityId),
    #[error("layer id `{0}` already exists")]
    DuplicateLayer(LayerId),
    #[error("layer `{0}` not found")]
    UnknownLayer(LayerId),
    #[error("entity `{0}` not found")]
    UnknownEntity(EntityId),
    #[error(transparent)]
    Document(#[from] DocumentError),
}

/// Outcome of one [`GameEngine::frame`] call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameReport {
    /// False when no frame was scheduled; nothing else happened.
    pub ran: bool,
    /// Whether the update phase ran (false while paused).
    pub updated: bool,
    pub delta_seconds: f64,
    pub events: Vec<GameEvent>,
    /// Whether another frame is scheduled after this one.
    pub scheduled: bool,
}

pub struct GameEngine {
    settings: Settings,
    state: GameState,
    metadata: Metadata,
    entities: Vec<Entity>,
    layers: Vec<Layer>,
    allocator: EntityIdAllocator,
    events: EventQueue,
    rng: SmallRng,
    last_timestamp_ms: f64,
    frame_scheduled: bool,
}

impl Default for GameEngine {
    fn default() -> Self {
        Self::with_rng(Settings::default(), SmallRng::from_entropy())
    }
}

impl GameEngine {
    pub fn new(settings: Settings) -> Self {
        Self::with_rng(settings, SmallRng::from_entropy())
    }

    /// Deterministic engine for tests and replays.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(Settings::default(), SmallRng::seed_from_u64(seed))
    }

    fn with_rng(settings: Settings, rng: SmallRng) -> Self {
        Self {
            settings,
            state: GameState::default(),
            metadata: Metadata::default(),
            entities: Vec::new(),
            layers: Vec::new(),
            allocator: EntityIdAllocator::default(),
            events: EventQueue::default(),
            rng,
            last_timestamp_ms: 0.0,
            frame_scheduled: false,
        }
    }

    pub fn reseed(&mut self, seed: u64) {
        self.rng = SmallRng::seed_from_u64(seed);
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn is_scheduled(&self) -> bool {
        self.frame_scheduled
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn entity(&self, id: &EntityId) -> Option<&Entity> {
        self.entities.iter().find(|entity| &entity.id == id)
    }

    pub fn entity_mut(&mut self, id: &EntityId) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|entity| &entity.id == id)
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn layer(&self, id: &LayerId) -> Option<&Layer> {
        self.layers.iter().find(|layer| &layer.id == id)
    }

    pub fn layer_mut(&mut self, id: &LayerId) -> Option<&mut Layer> {
        self.layers.iter_mut().find(|layer| &layer.id == id)
    }

    pub fn layer_index(&self, id: &LayerId) -> Option<usize> {
        self.layers.iter().position(|layer| &layer.id == id)
    }

    /// Layer currently holding `id`, if any.
    pub fn layer_of(&self, id: &EntityId) -> Option<&LayerId> {
        self.layers
            .iter()
            .find(|layer| layer.contains(id))
            .map(|layer| &layer.id)
    }

    pub fn start(&mut self, now_ms: f64) {
        if self.state.running {
            return;
        }
        self.state.running = true;
        self.state.paused = false;
        self.last_timestamp_ms = now_ms;
        self.frame_scheduled = true;
        info!(entities = self.entities.len(), "game_started");
    }

    pub fn pause(&mut self) {
        if !self.state.running || self.state.paused {
            return;
        }
        self.state.paused = true;
        info!("game_paused");
    }

    /// The interval spent paused is not counted toward the next delta.
    pub fn resume(&mut self, now_ms: f64) {
        if !self.state.running || !self.state.paused {
            return;
        }
        self.state.paused = false;
        self.last_timestamp_ms = now_ms;
        info!("game_resumed");
    }

    pub fn stop(&mut self) {
        let was_running = self.state.running;
        self.state.running = false;
        self.state.paused = false;
        self.frame_scheduled = false;
        if was_running {
            info!(score = self.state.score, time = self.state.time, "game_stopped");
        }
    }

    /// Stops and empties the world. Settings and metadata survive.
    pub fn reset(&mut self) {
        self.stop();
        self.entities.clear();
        self.layers.clear();
        self.events.clear();
        self.allocator.reset();
        self.state = GameState::default();
        debug!("game_reset");
    }

    /// Runs one scheduled frame: timing, update (unless paused), render.
    pub fn frame(
        &mut self,
        now_ms: f64,
        input: &InputSnapshot,
        sink: &mut dyn RenderSink,
    ) -> FrameReport {
        if !self.frame_scheduled {
            return FrameReport::default();
        }

        let delta_seconds = ((now_ms - self.last_timestamp_ms) / 1000.0).max(0.0);
        self.last_timestamp_ms = now_ms;
        self.state.time += delta_seconds;

        let updated = !self.state.paused;
        if updated {
            self.update(delta_seconds, input);
        }
        self.render(sink);

        let events = self.events.drain_frame();
        for event in &events {
            debug!(event = event.name(), "game_event");
        }
        if !self.state.running {
            self.stop();
        }

        FrameReport {
            ran: true,
            updated,
            delta_seconds,
            events,
            scheduled: self.frame_scheduled,
        }
    }

    /// Update phase: behaviors in arena order, then collisions, then player input.
    pub fn update(&mut self, delta_seconds: f64, input: &InputSnapshot) {
        let mut update_ctx = UpdateContext {
            settings: &self.settings,
            rng: &mut self.rng,
        };
        for entity in &mut self.entities {
            let Entity { body, behavior, .. } = entity;
            if let Some(behavior) = behavior {
                behavior.update(body, &mut update_ctx, delta_seconds);
            }
        }

        let consumed = {
            let mut collision_ctx = CollisionContext {
                settings: &self.settings,
                state: &mut self.state,
                events: &mut self.events,
            };
            resolve_collisions(&mut self.entities, &mut collision_ctx)
        };
        for id in consumed {
            self.remove_entity(&id);
        }

        for entity in &mut self.entities {
            let Entity { body, behavior, .. } = entity;
            if let Some(behavior) = behavior {
                behavior.process_input(body, input, &self.settings);
            }
        }
    }

    pub fn render(&self, sink: &mut dyn RenderSink) {
        render_world(self, sink);
    }

    /// Events emitted by direct [`GameEngine::update`] calls since the last drain.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.events.drain_frame()
    }

    /// Builds an entity from its record and appends it to the arena only. Callers
    /// must follow with [`GameEngine::add_to_layer`]; prefer
    /// [`GameEngine::spawn_into_layer`].
    pub fn create_entity(&mut self, record: &EntityRecord) -> Result<EntityId, EngineError> {
        let id = match record.id.as_deref() {
            Some(raw) => {
                let id = EntityId::new(raw);
                if self.entity(&id).is_some() {
                    return Err(EngineError::DuplicateEntity(id));
                }
                id
            }
            None => self.next_free_entity_id(),
        };

        let width = positive_or(record.width, self.settings.grid_size);
        let height = positive_or(record.height, self.settings.grid_size);
        let mut entity = Entity::new(
            id.clone(),
            record.emoji.clone(),
            Body::new(record.x, record.y, width, height),
        );
        entity.behavior = record.behavior.as_ref().map(create_behavior);
        entity.health = record.health;

        self.entities.push(entity);
        Ok(id)
    }

    pub fn add_to_layer(&mut self, layer_id: &LayerId, id: &EntityId) -> Result<(), EngineError> {
        if self.entity(id).is_none() {
            return Err(EngineError::UnknownEntity(id.clone()));
        }
        if self.layer_of(id).is_some() {
            return Err(EngineError::DuplicateEntity(id.clone()));
        }
        let layer = self
            .layer_mut(layer_id)
            .ok_or_else(|| EngineError::UnknownLayer(layer_id.clone()))?;
        layer.add_entity_id(id.clone());
        Ok(())
    }

    /// Creates the entity and appends it to `layer_id` as one step.
    pub fn spawn_into_layer(
        &mut self,
        layer_id: &LayerId,
        record: &EntityRecord,
    ) -> Result<EntityId, EngineError> {
        if self.layer(layer_id).is_none() {
            return Err(EngineError::UnknownLayer(layer_id.clone()));
        }
        let id = self.create_entity(record)?;
        self.add_to_layer(layer_id, &id)?;
        Ok(id)
    }

    /// Removes the entity from the arena and from its layer.
    pub fn remove_entity(&mut self, id: &EntityId) -> Option<Entity> {
        for layer in &mut self.layers {
            if layer.remove_entity_id(id) {
                break;
            }
        }
        let index = self.entities.iter().position(|entity| &entity.id == id)?;
        Some(self.entities.remove(index))
    }

    pub fn set_behavior(&mut self, id: &EntityId, behavior: Option<Behavior>) -> bool {
        match self.entity_mut(id) {
            Some(entity) => {
                entity.behavior = behavior;
                true
            }
            None => false,
        }
    }

    pub fn add_layer(&mut self, layer: Layer) -> Result<(), EngineError> {
        if self.layer(&layer.id).is_some() {
            return Err(EngineError::DuplicateLayer(layer.id));
        }
        self.layers.push(layer);
        Ok(())
    }

    /// Removes the layer together with every entity it holds.
    pub fn remove_layer(&mut self, id: &LayerId) -> Option<Layer> {
        let index = self.layer_index(id)?;
        let layer = self.layers.remove(index);
        self.entities
            .retain(|entity| !layer.entity_ids().contains(&entity.id));
        Some(layer)
    }

    /// Moves the layer at `from` so that it ends up at index `to`.
    pub fn move_layer(&mut self, from: usize, to: usize) -> bool {
        if from >= self.layers.len() || to >= self.layers.len() || from == to {
            return false;
        }
        let layer = self.layers.remove(from);
        self.layers.insert(to, layer);
        true
    }

    /// Replaces the world with `document`. On failure the engine is left reset
    /// with its previous settings and metadata.
    pub fn load_game(&mut self, document: &GameDocument) -> Result<(), EngineError> {
        let previous_settings = self.settings;
        let previous_metadata = self.metadata.clone();
        self.reset();

        match self.populate(document) {
            Ok(()) => {
                info!(
                    title = self.metadata.title.as_str(),
                    layers = self.layers.len(),
                    entities = self.entities.len(),
                    "game_loaded"
                );
                Ok(())
            }
            Err(load_error) => {
                error!(error = %load_error, "game_load_failed");
                self.reset();
                self.settings = previous_settings;
                self.metadata = previous_metadata;
                Err(load_error)
            }
        }
    }

    pub fn load_game_json(&mut self, raw: &str) -> Result<(), EngineError> {
        let document = GameDocument::from_json_str(raw).map_err(|parse_error| {
            error!(error = %parse_error, "game_load_failed");
            parse_error
        })?;
        self.load_game(&document)
    }

    fn populate(&mut self, document: &GameDocument) -> Result<(), EngineError> {
        document.settings.merge_into(&mut self.settings);
        self.metadata = document.metadata.clone();

        for (index, record) in document.layers.iter().enumerate() {
            let layer_id = record
                .id
                .as_deref()
                .map(LayerId::new)
                .unwrap_or_else(|| LayerId(format!("layer_{index}")));
            let mut layer = Layer::new(layer_id.clone(), record.name.clone());
            layer.visible = record.visible;
            layer.locked = record.locked;
            self.add_layer(layer)?;

            for entity in &record.entities {
                self.spawn_into_layer(&layer_id, entity)?;
            }
        }
        Ok(())
    }

    /// Snapshot of the world as a document. Selection and transient behavior
    /// state are not part of it.
    pub fn export_game(&self) -> GameDocument {
        let layers = self
            .layers
            .iter()
            .map(|layer| LayerRecord {
                id: Some(layer.id.as_str().to_string()),
                name: layer.name.clone(),
                visible: layer.visible,
                locked: layer.locked,
                entities: layer
                    .entity_ids()
                    .iter()
                    .filter_map(|id| self.entity(id))
                    .map(export_entity)
                    .collect(),
            })
            .collect();

        GameDocument {
            metadata: self.metadata.clone(),
            settings: SettingsRecord::from_settings(&self.settings),
            layers,
        }
    }

    pub fn export_game_json(&self) -> Result<String, EngineError> {
        Ok(self.export_game().to_json_pretty()?)
    }

    fn next_free_entity_id(&mut self) -> EntityId {
        loop {
            let id = self.allocator.allocate();
            if self.entity(&id).is_none() {
                return id;
            }
        }
    }
}

fn positive_or(value: Option<f64>, fallback: f64) -> f64 {
    match value {
        Some(value) if value > 0.0 => value,
        _ => fallback,
    }
}

fn export_entity(entity: &Entity) -> EntityRecord {
    EntityRecord {
        id: Some(entity.id.as_str().to_string()),
        emoji: entity.emoji.clone(),
        x: entity.body.x,
        y: entity.body.y,
        width: Some(entity.body.width),
        height: Some(entity.body.height),
        behavior: entity.behavior.as_ref().map(Behavior::export),
        health: entity.health,
    }
}
