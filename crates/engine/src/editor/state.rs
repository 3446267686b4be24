use tracing::{debug, warn};

use crate::content::{BehaviorRecord, EntityRecord};
use crate::world::{create_behavior, BehaviorType, EntityId, GameEngine, LayerId};

pub const DEFAULT_EDITOR_GRID_SIZE: f64 = 32.0;
pub const MIN_ZOOM: f64 = 0.5;
pub const MAX_ZOOM: f64 = 3.0;
pub const ZOOM_STEP: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditorMode {
    #[default]
    Place,
    Select,
    Delete,
}

impl EditorMode {
    pub fn as_token(self) -> &'static str {
        match self {
            Self::Place => "place",
            Self::Select => "select",
            Self::Delete => "delete",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "place" => Some(Self::Place),
            "select" => Some(Self::Select),
            "delete" => Some(Self::Delete),
            _ => None,
        }
    }
}

/// What a pointer press did, so the front-end knows what to refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PointerOutcome {
    Ignored,
    Placed(EntityId),
    Selected(EntityId),
    Deleted(EntityId),
    Deselected,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct DragState {
    offset_x: f64,
    offset_y: f64,
}

#[derive(Debug, Clone)]
pub struct EditorState {
    pub mode: EditorMode,
    pub grid_size: f64,
    pub snap_to_grid: bool,
    pub show_grid: bool,
    zoom: f64,
    pub(super) current_layer: Option<LayerId>,
    current_emoji: Option<String>,
    selected: Option<EntityId>,
    drag: Option<DragState>,
    pub(super) next_layer_serial: u64,
}

impl Default for EditorState {
    fn default() -> Self {
        Self {
            mode: EditorMode::Place,
            grid_size: DEFAULT_EDITOR_GRID_SIZE,
            snap_to_grid: true,
            show_grid: true,
            zoom: 1.0,
            current_layer: None,
            current_emoji: None,
            selected: None,
            drag: None,
            next_layer_serial: 0,
        }
    }
}

impl EditorState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fresh editor over `engine`: default layers when it has none, first
    /// layer current.
    pub fn attach(engine: &mut GameEngine) -> Self {
        let mut editor = Self::default();
        editor.ensure_default_layers(engine);
        if let Some(first) = engine.layers().first().map(|layer| layer.id.clone()) {
            editor.select_layer(engine, &first);
        }
        editor
    }

    pub fn current_layer(&self) -> Option<&LayerId> {
        self.current_layer.as_ref()
    }

    pub fn current_emoji(&self) -> Option<&str> {
        self.current_emoji.as_deref()
    }

    /// Picking an emoji switches to place mode.
    pub fn select_emoji(&mut self, emoji: impl Into<String>) {
        self.current_emoji = Some(emoji.into());
        self.mode = EditorMode::Place;
    }

    pub fn selected(&self) -> Option<&EntityId> {
        self.selected.as_ref()
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn zoom_in(&mut self) -> f64 {
        self.zoom = round_zoom(self.zoom + ZOOM_STEP).min(MAX_ZOOM);
        self.zoom
    }

    pub fn zoom_out(&mut self) -> f64 {
        self.zoom = round_zoom(self.zoom - ZOOM_STEP).max(MIN_ZOOM);
        self.zoom
    }

    /// Floors a coordinate onto the grid when snapping is on.
    pub fn snap(&self, value: f64) -> f64 {
        if self.snap_to_grid && self.grid_size > 0.0 {
            (value / self.grid_size).floor() * self.grid_size
        } else {
            value
        }
    }

    /// Nothing happens without an unlocked current layer.
    pub fn pointer_down(&mut self, engine: &mut GameEngine, x: f64, y: f64) -> PointerOutcome {
        let Some(layer_id) = self.current_layer.clone() else {
            return PointerOutcome::Ignored;
        };
        match engine.layer(&layer_id) {
            Some(layer) if !layer.locked => {}
            _ => return PointerOutcome::Ignored,
        }

        match self.mode {
            EditorMode::Place => self.place_at(engine, &layer_id, x, y),
            EditorMode::Select => match self.find_entity_at(engine, x, y) {
                Some(id) => {
                    self.select_entity(engine, &id);
                    if let Some(entity) = engine.entity(&id) {
                        self.drag = Some(DragState {
                            offset_x: x - entity.body.x,
                            offset_y: y - entity.body.y,
                        });
                    }
                    PointerOutcome::Selected(id)
                }
                None => {
                    self.deselect_entity(engine);
                    PointerOutcome::Deselected
                }
            },
            EditorMode::Delete => match self.find_entity_at(engine, x, y) {
                Some(id) => {
                    self.delete_entity(engine, &id);
                    PointerOutcome::Deleted(id)
                }
                None => {
                    self.deselect_entity(engine);
                    PointerOutcome::Deselected
                }
            },
        }
    }

    fn place_at(
        &mut self,
        engine: &mut GameEngine,
        layer_id: &LayerId,
        x: f64,
        y: f64,
    ) -> PointerOutcome {
        let Some(emoji) = self.current_emoji.clone() else {
            return PointerOutcome::Ignored;
        };
        let record = EntityRecord {
            id: None,
            emoji,
            x: self.snap(x),
            y: self.snap(y),
            width: Some(self.grid_size),
            height: Some(self.grid_size),
            behavior: Some(BehaviorRecord::of_type(BehaviorType::Static.as_token())),
            health: None,
        };
        match engine.spawn_into_layer(layer_id, &record) {
            Ok(id) => {
                self.select_entity(engine, &id);
                debug!(
                    entity = id.as_str(),
                    layer = layer_id.as_str(),
                    "editor_entity_placed"
                );
                PointerOutcome::Placed(id)
            }
            Err(error) => {
                warn!(error = %error, "editor_place_failed");
                PointerOutcome::Ignored
            }
        }
    }

    /// Moves the dragged entity, keeping the grab offset. Returns false when
    /// nothing is being dragged.
    pub fn pointer_move(&mut self, engine: &mut GameEngine, x: f64, y: f64) -> bool {
        let (Some(drag), Some(id)) = (self.drag, self.selected.as_ref()) else {
            return false;
        };
        let new_x = self.snap(x - drag.offset_x);
        let new_y = self.snap(y - drag.offset_y);
        match engine.entity_mut(id) {
            Some(entity) => {
                entity.body.set_position(new_x, new_y);
                true
            }
            None => false,
        }
    }

    pub fn pointer_up(&mut self) {
        self.drag = None;
    }

    /// Topmost entity under the point: last layer first, hidden layers
    /// skipped, later entities before earlier ones. Edges count as inside.
    pub fn find_entity_at(&self, engine: &GameEngine, x: f64, y: f64) -> Option<EntityId> {
        engine
            .layers()
            .iter()
            .rev()
            .filter(|layer| layer.visible)
            .flat_map(|layer| layer.entity_ids().iter().rev())
            .find(|id| {
                engine
                    .entity(id)
                    .is_some_and(|entity| entity.body.contains_point(x, y))
            })
            .cloned()
    }

    pub fn select_entity(&mut self, engine: &mut GameEngine, id: &EntityId) -> bool {
        if engine.entity(id).is_none() {
            return false;
        }
        self.deselect_entity(engine);
        if let Some(entity) = engine.entity_mut(id) {
            entity.selected = true;
        }
        self.selected = Some(id.clone());
        debug!(entity = id.as_str(), "editor_entity_selected");
        true
    }

    pub fn deselect_entity(&mut self, engine: &mut GameEngine) {
        self.drag = None;
        if let Some(id) = self.selected.take() {
            if let Some(entity) = engine.entity_mut(&id) {
                entity.selected = false;
            }
        }
    }

    pub fn delete_entity(&mut self, engine: &mut GameEngine, id: &EntityId) -> bool {
        if engine.remove_entity(id).is_none() {
            return false;
        }
        if self.selected.as_ref() == Some(id) {
            self.selected = None;
            self.drag = None;
        }
        debug!(entity = id.as_str(), "editor_entity_deleted");
        true
    }

    /// Replaces the selected entity's behavior with a default one of `kind`.
    pub fn change_behavior_type(&mut self, engine: &mut GameEngine, kind: BehaviorType) -> bool {
        self.apply_behavior_record(engine, &BehaviorRecord::of_type(kind.as_token()))
    }

    /// Rebuilds the selected entity's behavior from edited fields.
    pub fn apply_behavior_record(
        &mut self,
        engine: &mut GameEngine,
        record: &BehaviorRecord,
    ) -> bool {
        let Some(id) = self.selected.clone() else {
            return false;
        };
        let replaced = engine.set_behavior(&id, Some(create_behavior(record)));
        if replaced {
            debug!(
                entity = id.as_str(),
                behavior = record.kind.as_str(),
                "editor_behavior_set"
            );
        }
        replaced
    }

    /// Construction fields of the selected entity's behavior, for a
    /// properties panel.
    pub fn selected_behavior(&self, engine: &GameEngine) -> Option<BehaviorRecord> {
        let entity = engine.entity(self.selected.as_ref()?)?;
        entity.behavior.as_ref().map(|behavior| behavior.export())
    }

    /// Drops selection and drag state that no longer match the engine, for
    /// example after a load. A selection that survives gets its flag back.
    pub fn sync_with_engine(&mut self, engine: &mut GameEngine) {
        self.drag = None;
        if let Some(id) = self.selected.clone() {
            match engine.entity_mut(&id) {
                Some(entity) => entity.selected = true,
                None => self.selected = None,
            }
        }
        let current_is_valid = self
            .current_layer
            .as_ref()
            .is_some_and(|id| engine.layer(id).is_some());
        if !current_is_valid {
            self.current_layer = engine.layers().first().map(|layer| layer.id.clone());
        }
    }
}

fn round_zoom(zoom: f64) -> f64 {
    (zoom * 10.0).round() / 10.0
}
