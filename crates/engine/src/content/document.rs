//! Serialized game document: the single save and interchange format.
//!
//! Keys are camelCase. Unknown keys are ignored and missing keys fall back to
//! engine defaults when the document is loaded.

use serde::{Deserialize, Serialize};

use crate::world::Settings;

pub const DEFAULT_TITLE: &str = "Emoji RPG Game";
pub const DEFAULT_AUTHOR: &str = "User";
pub const DEFAULT_DESCRIPTION: &str = "A game created with Emoji RPG Builder";
pub const DEFAULT_VERSION: &str = "1.0";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Metadata {
    pub title: String,
    pub author: String,
    pub description: String,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<String>,
}

impl Default for Metadata {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            author: DEFAULT_AUTHOR.to_string(),
            description: DEFAULT_DESCRIPTION.to_string(),
            version: DEFAULT_VERSION.to_string(),
            name: None,
            saved_at: None,
        }
    }
}

/// Partial settings; absent fields keep the engine's current value on load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SettingsRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gravity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub friction: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grid_size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
}

impl SettingsRecord {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            gravity: Some(settings.gravity),
            friction: Some(settings.friction),
            grid_size: Some(settings.grid_size),
            width: Some(settings.width),
            height: Some(settings.height),
        }
    }

    pub fn merge_into(&self, settings: &mut Settings) {
        if let Some(gravity) = self.gravity {
            settings.gravity = gravity;
        }
        if let Some(friction) = self.friction {
            settings.friction = friction;
        }
        if let Some(grid_size) = self.grid_size {
            settings.grid_size = grid_size;
        }
        if let Some(width) = self.width {
            settings.width = width;
        }
        if let Some(height) = self.height {
            settings.height = height;
        }
    }
}

/// Flattened behavior: `type` plus whichever construction fields the variant uses.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BehaviorRecord {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jump_height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effect: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub solid: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_y: Option<f64>,
}

impl BehaviorRecord {
    pub fn of_type(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub emoji: String,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(default)]
    pub behavior: Option<BehaviorRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health: Option<f64>,
}

impl EntityRecord {
    pub fn new(id: impl Into<String>, emoji: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            id: Some(id.into()),
            emoji: emoji.into(),
            x,
            y,
            ..Self::default()
        }
    }

    pub fn with_behavior(mut self, behavior: BehaviorRecord) -> Self {
        self.behavior = Some(behavior);
        self
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerRecord {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default)]
    pub locked: bool,
    #[serde(default)]
    pub entities: Vec<EntityRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GameDocument {
    pub metadata: Metadata,
    pub settings: SettingsRecord,
    pub layers: Vec<LayerRecord>,
}

#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("parse game document: {source}")]
    Parse {
        #[source]
        source: serde_json::Error,
    },
    #[error("parse game document at {path}: {source}")]
    ParseAt {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("encode game document: {0}")]
    Encode(#[source] serde_json::Error),
}

impl GameDocument {
    pub fn from_json_str(raw: &str) -> Result<Self, DocumentError> {
        let mut deserializer = serde_json::Deserializer::from_str(raw);
        let document: Self = serde_path_to_error::deserialize(&mut deserializer)
            .map_err(DocumentError::from_path_error)?;
        deserializer
            .end()
            .map_err(|source| DocumentError::Parse { source })?;
        Ok(document)
    }

    pub fn from_json_value(value: serde_json::Value) -> Result<Self, DocumentError> {
        serde_path_to_error::deserialize(value).map_err(DocumentError::from_path_error)
    }

    pub fn to_json_pretty(&self) -> Result<String, DocumentError> {
        serde_json::to_string_pretty(self).map_err(DocumentError::Encode)
    }

    pub fn entity_count(&self) -> usize {
        self.layers.iter().map(|layer| layer.entities.len()).sum()
    }
}

impl DocumentError {
    fn from_path_error(error: serde_path_to_error::Error<serde_json::Error>) -> Self {
        let path = error.path().to_string();
        let source = error.into_inner();
        if path.is_empty() || path == "." {
            Self::Parse { source }
        } else {
            Self::ParseAt { path, source }
        }
    }
}
