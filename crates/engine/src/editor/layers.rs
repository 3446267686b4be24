use tracing::{debug, info, warn};

use super::EditorState;
use crate::world::{GameEngine, Layer, LayerId};

const BACKGROUND_LAYER_ID: &str = "layer_background";
const GAMEPLAY_LAYER_ID: &str = "layer_gameplay";

impl EditorState {
    /// Adds Background and Gameplay layers to an engine that has none.
    pub fn ensure_default_layers(&mut self, engine: &mut GameEngine) -> bool {
        if !engine.layers().is_empty() {
            return false;
        }
        for (id, name) in [
            (BACKGROUND_LAYER_ID, "Background"),
            (GAMEPLAY_LAYER_ID, "Gameplay"),
        ] {
            if let Err(error) = engine.add_layer(Layer::new(LayerId::from(id), name)) {
                warn!(error = %error, "editor_default_layer_failed");
            }
        }
        info!("editor_default_layers_created");
        true
    }

    /// Makes `id` the placement target and clears the entity selection.
    pub fn select_layer(&mut self, engine: &mut GameEngine, id: &LayerId) -> bool {
        if engine.layer(id).is_none() {
            return false;
        }
        self.current_layer = Some(id.clone());
        self.deselect_entity(engine);
        debug!(layer = id.as_str(), "editor_layer_selected");
        true
    }

    /// Appends `Layer N` (N = new layer count) and selects it.
    pub fn add_layer(&mut self, engine: &mut GameEngine) -> LayerId {
        let id = loop {
            self.next_layer_serial += 1;
            let candidate = LayerId::new(format!("layer_{}", self.next_layer_serial));
            if engine.layer(&candidate).is_none() {
                break candidate;
            }
        };
        let name = format!("Layer {}", engine.layers().len() + 1);
        if let Err(error) = engine.add_layer(Layer::new(id.clone(), name)) {
            warn!(error = %error, "editor_add_layer_failed");
        }
        self.select_layer(engine, &id);
        id
    }

    /// Removes the current layer and its entities, then selects the layer now
    /// at the same position (or the new last one). The only layer is kept.
    pub fn delete_current_layer(&mut self, engine: &mut GameEngine) -> Option<Layer> {
        let current = self.current_layer.clone()?;
        if engine.layers().len() <= 1 {
            warn!(layer = current.as_str(), "editor_cannot_delete_only_layer");
            return None;
        }
        let index = engine.layer_index(&current)?;

        self.deselect_entity(engine);
        let removed = engine.remove_layer(&current)?;
        let next_index = index.min(engine.layers().len().saturating_sub(1));
        if let Some(next) = engine.layers().get(next_index).map(|layer| layer.id.clone()) {
            self.select_layer(engine, &next);
        }
        info!(
            layer = current.as_str(),
            entities = removed.len(),
            "editor_layer_deleted"
        );
        Some(removed)
    }

    /// Returns the new visibility, or `None` for an unknown layer.
    pub fn toggle_layer_visibility(
        &mut self,
        engine: &mut GameEngine,
        id: &LayerId,
    ) -> Option<bool> {
        let layer = engine.layer_mut(id)?;
        layer.visible = !layer.visible;
        Some(layer.visible)
    }

    /// Returns the new lock state, or `None` for an unknown layer.
    pub fn toggle_layer_lock(&mut self, engine: &mut GameEngine, id: &LayerId) -> Option<bool> {
        let layer = engine.layer_mut(id)?;
        layer.locked = !layer.locked;
        Some(layer.locked)
    }

    /// Moves `dragged` to the position `target` held. No-op on self or
    /// unknown ids.
    pub fn reorder_layers(
        &mut self,
        engine: &mut GameEngine,
        dragged: &LayerId,
        target: &LayerId,
    ) -> bool {
        if dragged == target {
            return false;
        }
        let (Some(from), Some(to)) = (engine.layer_index(dragged), engine.layer_index(target))
        else {
            return false;
        };
        engine.move_layer(from, to)
    }
}

#[cfg(test)]
mod tests {
    use crate::content::EntityRecord;
    use crate::editor::{EditorState, PointerOutcome};
    use crate::world::{GameEngine, LayerId};

    fn layer_names(engine: &GameEngine) -> Vec<String> {
        engine.layers().iter().map(|layer| layer.name.clone()).collect()
    }

    #[test]
    fn attach_creates_defaults_and_selects_the_first() {
        let mut engine = GameEngine::with_seed(1);
        let editor = EditorState::attach(&mut engine);
        assert_eq!(layer_names(&engine), vec!["Background", "Gameplay"]);
        assert_eq!(
            editor.current_layer(),
            Some(&LayerId::from("layer_background"))
        );
    }

    #[test]
    fn defaults_are_not_added_to_a_populated_engine() {
        let mut engine = GameEngine::with_seed(1);
        let mut editor = EditorState::attach(&mut engine);
        assert!(!editor.ensure_default_layers(&mut engine));
        assert_eq!(engine.layers().len(), 2);
    }

    #[test]
    fn added_layers_are_numbered_and_selected() {
        let mut engine = GameEngine::with_seed(1);
        let mut editor = EditorState::attach(&mut engine);
        let id = editor.add_layer(&mut engine);
        assert_eq!(layer_names(&engine)[2], "Layer 3");
        assert_eq!(editor.current_layer(), Some(&id));

        let another = editor.add_layer(&mut engine);
        assert_ne!(id, another);
        assert_eq!(layer_names(&engine)[3], "Layer 4");
    }

    #[test]
    fn deleting_a_layer_removes_its_entities_and_selects_a_neighbor() {
        let mut engine = GameEngine::with_seed(1);
        let mut editor = EditorState::attach(&mut engine);
        editor.select_emoji("🌳");
        let placed = match editor.pointer_down(&mut engine, 0.0, 0.0) {
            PointerOutcome::Placed(id) => id,
            other => panic!("expected placement, got {other:?}"),
        };
        let keep = engine
            .spawn_into_layer(
                &LayerId::from("layer_gameplay"),
                &EntityRecord::new("keep", "🦸", 64.0, 0.0),
            )
            .expect("keep");

        let removed = editor.delete_current_layer(&mut engine).expect("deleted");
        assert_eq!(removed.id, LayerId::from("layer_background"));
        assert!(engine.entity(&placed).is_none());
        assert!(engine.entity(&keep).is_some());
        assert!(editor.selected().is_none());
        assert_eq!(
            editor.current_layer(),
            Some(&LayerId::from("layer_gameplay"))
        );

        assert!(editor.delete_current_layer(&mut engine).is_none());
        assert_eq!(engine.layers().len(), 1);
    }

    #[test]
    fn deleting_the_last_layer_selects_the_new_last() {
        let mut engine = GameEngine::with_seed(1);
        let mut editor = EditorState::attach(&mut engine);
        editor.select_layer(&mut engine, &LayerId::from("layer_gameplay"));
        editor.delete_current_layer(&mut engine).expect("deleted");
        assert_eq!(
            editor.current_layer(),
            Some(&LayerId::from("layer_background"))
        );
    }

    #[test]
    fn toggles_flip_flags_and_report_unknown_layers() {
        let mut engine = GameEngine::with_seed(1);
        let mut editor = EditorState::attach(&mut engine);
        let background = LayerId::from("layer_background");
        assert_eq!(
            editor.toggle_layer_visibility(&mut engine, &background),
            Some(false)
        );
        assert_eq!(
            editor.toggle_layer_visibility(&mut engine, &background),
            Some(true)
        );
        assert_eq!(editor.toggle_layer_lock(&mut engine, &background), Some(true));
        assert_eq!(
            editor.toggle_layer_lock(&mut engine, &LayerId::from("nope")),
            None
        );
    }

    #[test]
    fn reorder_moves_dragged_into_target_slot() {
        let mut engine = GameEngine::with_seed(1);
        let mut editor = EditorState::attach(&mut engine);
        let third = editor.add_layer(&mut engine);
        let background = LayerId::from("layer_background");

        assert!(editor.reorder_layers(&mut engine, &third, &background));
        assert_eq!(layer_names(&engine), vec!["Layer 3", "Background", "Gameplay"]);

        assert!(!editor.reorder_layers(&mut engine, &third, &third));
        assert!(!editor.reorder_layers(&mut engine, &third, &LayerId::from("nope")));
        assert_eq!(layer_names(&engine), vec!["Layer 3", "Background", "Gameplay"]);
    }
}
