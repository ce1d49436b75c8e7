//! Edit Session Controller
//!
//! Owns the mutable editing state and the placement table. All table writes
//! go through [`EditSession::commit_transform`].

use serde::Serialize;

use glam::Vec3;
use layout_core::{
    LayoutConfig, PlacementTable, PotConfig, StructureConfig, TransformDescriptor,
};

use crate::error::{EditError, Result};

/// Active gizmo mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransformMode {
    #[default]
    Translate,
    Rotate,
    Scale,
}

impl TransformMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransformMode::Translate => "translate",
            TransformMode::Rotate => "rotate",
            TransformMode::Scale => "scale",
        }
    }

    /// w / e / r
    pub fn from_key(key: char) -> Option<Self> {
        match key.to_ascii_lowercase() {
            'w' => Some(TransformMode::Translate),
            'e' => Some(TransformMode::Rotate),
            'r' => Some(TransformMode::Scale),
            _ => None,
        }
    }
}

impl std::str::FromStr for TransformMode {
    type Err = EditError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "translate" => Ok(TransformMode::Translate),
            "rotate" => Ok(TransformMode::Rotate),
            "scale" => Ok(TransformMode::Scale),
            _ => Err(EditError::UnknownTransformMode {
                name: s.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for TransformMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of the editing flags, as shown to the host UI
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditSessionState {
    pub edit_mode: bool,
    pub selected: Option<String>,
    pub hovered: Option<String>,
    pub transform_mode: TransformMode,
    pub dragging: bool,
}

#[derive(Debug, Clone)]
pub struct EditSession {
    state: EditSessionState,
    structure: StructureConfig,
    pot: Option<PotConfig>,
    table: PlacementTable,
    /// Table as loaded, for `reset_component`
    defaults: PlacementTable,
}

impl EditSession {
    /// Start a session from a validated layout
    pub fn new(config: LayoutConfig) -> Result<Self> {
        config.validate()?;
        let table = PlacementTable::from_specs(&config.components)?;
        Ok(Self {
            state: EditSessionState::default(),
            structure: config.structure,
            pot: config.pot,
            defaults: table.clone(),
            table,
        })
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Self::new(LayoutConfig::from_json_str(json)?)
    }

    pub fn state(&self) -> &EditSessionState {
        &self.state
    }

    /// Read-only view; writes go through `commit_transform`
    pub fn table(&self) -> &PlacementTable {
        &self.table
    }

    pub fn structure(&self) -> &StructureConfig {
        &self.structure
    }

    pub fn pot(&self) -> Option<&PotConfig> {
        self.pot.as_ref()
    }

    pub fn is_edit_mode(&self) -> bool {
        self.state.edit_mode
    }

    pub fn selected(&self) -> Option<&str> {
        self.state.selected.as_deref()
    }

    pub fn hovered(&self) -> Option<&str> {
        self.state.hovered.as_deref()
    }

    pub fn transform_mode(&self) -> TransformMode {
        self.state.transform_mode
    }

    pub fn is_dragging(&self) -> bool {
        self.state.dragging
    }

    pub fn enter_edit_mode(&mut self) {
        if !self.state.edit_mode {
            self.state.edit_mode = true;
            tracing::info!("edit mode entered");
        }
    }

    /// Clears selection and hover, ends any drag and resets the mode
    pub fn exit_edit_mode(&mut self) {
        if self.state.edit_mode {
            tracing::info!("edit mode exited");
        }
        self.state = EditSessionState::default();
    }

    /// Single selection; `None` clears it. Returns whether the selection changed.
    ///
    /// Ignored outside edit mode and while a drag is in progress.
    pub fn select_component(&mut self, id: Option<&str>) -> bool {
        if !self.state.edit_mode || self.state.dragging {
            return false;
        }
        if let Some(id) = id.filter(|id| !self.table.contains(id)) {
            tracing::warn!(%id, "select ignored: unknown component");
            return false;
        }
        if self.state.selected.as_deref() == id {
            return false;
        }
        self.state.selected = id.map(str::to_string);
        tracing::debug!(selected = ?self.state.selected, "selection changed");
        true
    }

    /// Hover highlight only; ignored outside edit mode
    pub fn set_hovered_component(&mut self, id: Option<&str>) -> bool {
        if !self.state.edit_mode {
            return false;
        }
        if let Some(id) = id.filter(|id| !self.table.contains(id)) {
            tracing::warn!(%id, "hover ignored: unknown component");
            return false;
        }
        if self.state.hovered.as_deref() == id {
            return false;
        }
        self.state.hovered = id.map(str::to_string);
        true
    }

    /// No-op unless a component is selected
    pub fn set_transform_mode(&mut self, mode: TransformMode) -> bool {
        if self.state.selected.is_none() {
            return false;
        }
        self.state.transform_mode = mode;
        true
    }

    /// Keyboard shortcut for the transform mode
    pub fn handle_key(&mut self, key: char) -> bool {
        TransformMode::from_key(key).is_some_and(|mode| self.set_transform_mode(mode))
    }

    pub(crate) fn begin_drag(&mut self) -> bool {
        if !self.state.edit_mode || self.state.selected.is_none() || self.state.dragging {
            return false;
        }
        self.state.dragging = true;
        true
    }

    pub(crate) fn end_drag(&mut self) -> bool {
        std::mem::replace(&mut self.state.dragging, false)
    }

    /// Overwrite `id`'s placement with gizmo values; rotation arrives in radians
    pub fn commit_transform(
        &mut self,
        id: &str,
        position: Vec3,
        rotation_radians: Vec3,
        scale: Vec3,
    ) -> Result<()> {
        let descriptor = TransformDescriptor::from_radians(position, rotation_radians, scale);
        self.commit(id, descriptor)
    }

    fn commit(&mut self, id: &str, descriptor: TransformDescriptor) -> Result<()> {
        self.table.commit(id, descriptor)?;
        tracing::debug!(
            %id,
            position = ?descriptor.position,
            rotation = ?descriptor.rotation_degrees,
            scale = ?descriptor.scale,
            "transform committed"
        );
        Ok(())
    }

    /// Restore the placement the session started with
    pub fn reset_component(&mut self, id: &str) -> Result<()> {
        let Some(&initial) = self.defaults.transform(id) else {
            return Err(EditError::UnknownComponent { id: id.to_string() });
        };
        self.commit(id, initial)
    }

    /// Current layout in the shape the loader reads
    pub fn snapshot(&self) -> LayoutConfig {
        LayoutConfig {
            structure: self.structure.clone(),
            pot: self.pot.clone(),
            components: self.table.to_specs(),
        }
    }

    /// Pretty JSON of [`snapshot`](Self::snapshot), components in catalog order
    pub fn export_config(&self) -> Result<String> {
        let json = serde_json::to_string_pretty(&self.snapshot())?;
        tracing::info!(components = self.table.len(), bytes = json.len(), "layout exported");
        Ok(json)
    }
}
