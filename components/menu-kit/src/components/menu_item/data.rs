use serde::Serialize;

/// Type of menu item
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MenuItemKind {
    Action {
        label: String,
    },
    /// Item that opens the menu registered under `submenu_id`
    Submenu {
        label: String,
        submenu_id: String,
    },
    Separator,
}

/// Pure data for a registered menu item
///
/// No rendering, no callbacks. Activation callbacks live in the owning
/// [`MenuController`](crate::components::menu::MenuController).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct MenuItem {
    /// Unique within its menu
    pub id: String,

    pub kind: MenuItemKind,

    pub disabled: bool,
}

impl MenuItem {
    pub fn new(id: impl Into<String>, kind: MenuItemKind) -> Self {
        Self {
            id: id.into(),
            kind,
            disabled: false,
        }
    }

    /// Create an action item
    pub fn action(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(
            id,
            MenuItemKind::Action {
                label: label.into(),
            },
        )
    }

    /// Create a separator
    pub fn separator(id: impl Into<String>) -> Self {
        Self::new(id, MenuItemKind::Separator)
    }

    /// Create an item that opens a nested menu
    pub fn submenu(
        id: impl Into<String>,
        label: impl Into<String>,
        submenu_id: impl Into<String>,
    ) -> Self {
        Self::new(
            id,
            MenuItemKind::Submenu {
                label: label.into(),
                submenu_id: submenu_id.into(),
            },
        )
    }

    // === Getters ===

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> &MenuItemKind {
        &self.kind
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    pub fn is_separator(&self) -> bool {
        matches!(self.kind, MenuItemKind::Separator)
    }

    /// Neither disabled nor a separator
    pub fn is_eligible(&self) -> bool {
        !self.disabled && !self.is_separator()
    }

    pub fn label(&self) -> Option<&str> {
        match &self.kind {
            MenuItemKind::Action { label } => Some(label),
            MenuItemKind::Submenu { label, .. } => Some(label),
            MenuItemKind::Separator => None,
        }
    }

    pub fn submenu_id(&self) -> Option<&str> {
        match &self.kind {
            MenuItemKind::Submenu { submenu_id, .. } => Some(submenu_id),
            _ => None,
        }
    }

    pub fn has_submenu(&self) -> bool {
        self.submenu_id().is_some()
    }

    // === Builder API ===

    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }

    pub fn with_disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    // === State Mutations ===

    pub fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
    }
}
