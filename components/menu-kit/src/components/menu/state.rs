use serde::Serialize;

use crate::components::menu_item::MenuItem;

/// Back-reference from a submenu to the item that owns it in the parent menu
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct ParentRef {
    pub menu_id: String,
    pub item_id: String,
}

impl ParentRef {
    pub fn new(menu_id: impl Into<String>, item_id: impl Into<String>) -> Self {
        Self {
            menu_id: menu_id.into(),
            item_id: item_id.into(),
        }
    }
}

/// Highlight movement requested by keyboard navigation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Next,
    Previous,
    First,
    Last,
}

/// Read-only view handed to presentational elements
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MenuSnapshot {
    pub id: String,
    pub is_open: bool,
    pub highlighted_item_id: Option<String>,
    pub item_order: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<ParentRef>,
}

/// State for one menu instance
///
/// Pure state management - no rendering, no focus, no callbacks.
/// Keeps the two invariants of a menu:
/// - a highlighted id is always a registered, eligible item
/// - a closed menu has no highlight
#[derive(Clone, Debug, Hash)]
pub struct MenuState {
    id: String,

    /// Accessible label of the menu surface
    label: Option<String>,

    is_open: bool,

    highlighted: Option<String>,

    parent: Option<ParentRef>,

    /// Registered items, in render order
    items: Vec<MenuItem>,
}

impl MenuState {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: None,
            is_open: false,
            highlighted: None,
            parent: None,
            items: Vec::new(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_parent(mut self, parent: ParentRef) -> Self {
        self.parent = Some(parent);
        self
    }

    // === Getters ===

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn is_open(&self) -> bool {
        self.is_open
    }

    pub fn highlighted(&self) -> Option<&str> {
        self.highlighted.as_deref()
    }

    pub fn parent(&self) -> Option<&ParentRef> {
        self.parent.as_ref()
    }

    pub fn items(&self) -> &[MenuItem] {
        &self.items
    }

    pub fn item(&self, id: &str) -> Option<&MenuItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn highlighted_item(&self) -> Option<&MenuItem> {
        self.highlighted.as_deref().and_then(|id| self.item(id))
    }

    pub fn item_order(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(|item| item.id.as_str())
    }

    pub fn is_highlighted(&self, item_id: &str) -> bool {
        self.highlighted.as_deref() == Some(item_id)
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.items.iter().position(|item| item.id == id)
    }

    pub fn snapshot(&self) -> MenuSnapshot {
        MenuSnapshot {
            id: self.id.clone(),
            is_open: self.is_open,
            highlighted_item_id: self.highlighted.clone(),
            item_order: self.item_order().map(str::to_string).collect(),
            parent: self.parent.clone(),
        }
    }

    // === State Mutations ===

    /// Open or close the menu. Closing clears the highlight.
    pub fn set_open(&mut self, open: bool) {
        self.is_open = open;
        if !open {
            self.highlighted = None;
        }
    }

    /// Highlight an item. Returns false (and changes nothing) if the menu is
    /// closed or the item is unknown, disabled or a separator.
    pub fn highlight(&mut self, item_id: &str) -> bool {
        if !self.is_open {
            return false;
        }
        match self.item(item_id) {
            Some(item) if item.is_eligible() => {
                self.highlighted = Some(item.id.clone());
                true
            }
            _ => false,
        }
    }

    pub fn clear_highlight(&mut self) {
        self.highlighted = None;
    }

    /// Append an item. Duplicate ids are rejected.
    pub fn register_item(&mut self, item: MenuItem) -> bool {
        let index = self.items.len();
        self.register_item_at(index, item)
    }

    /// Insert an item at a render position (clamped to the end).
    pub fn register_item_at(&mut self, index: usize, item: MenuItem) -> bool {
        if self.position(&item.id).is_some() {
            return false;
        }
        let index = index.min(self.items.len());
        self.items.insert(index, item);
        true
    }

    /// Remove an item. Removing the highlighted item clears the highlight.
    pub fn unregister_item(&mut self, item_id: &str) -> Option<MenuItem> {
        let index = self.position(item_id)?;
        if self.is_highlighted(item_id) {
            self.highlighted = None;
        }
        Some(self.items.remove(index))
    }

    /// Toggle an item's disabled flag. A highlighted item that becomes
    /// disabled loses the highlight.
    pub fn set_item_disabled(&mut self, item_id: &str, disabled: bool) -> bool {
        let Some(index) = self.position(item_id) else {
            return false;
        };
        self.items[index].set_disabled(disabled);
        if disabled && self.is_highlighted(item_id) {
            self.highlighted = None;
        }
        true
    }

    /// Replace the whole item list, keeping the highlight only if it is
    /// still eligible. Returns the ids that were dropped as duplicates.
    pub fn set_items(&mut self, items: Vec<MenuItem>) -> Vec<String> {
        let mut duplicates = Vec::new();
        self.items.clear();
        for item in items {
            let id = item.id.clone();
            if !self.register_item(item) {
                duplicates.push(id);
            }
        }

        let still_eligible = self
            .highlighted_item()
            .map(MenuItem::is_eligible)
            .unwrap_or(false);
        if !still_eligible {
            self.highlighted = None;
        }
        duplicates
    }

    // === Navigation Logic ===

    /// Move the highlight. Returns true if the highlight changed.
    pub fn move_highlight(&mut self, direction: Direction) -> bool {
        if !self.is_open {
            return false;
        }
        let current = self.highlighted.as_deref().and_then(|id| self.position(id));
        let target = match direction {
            Direction::Next => Self::find_next_eligible(&self.items, current, true),
            Direction::Previous => Self::find_next_eligible(&self.items, current, false),
            Direction::First => Self::find_next_eligible(&self.items, None, true),
            Direction::Last => Self::find_next_eligible(&self.items, None, false),
        };

        let Some(index) = target else {
            return false;
        };
        let changed = current != Some(index);
        self.highlighted = Some(self.items[index].id.clone());
        changed
    }

    /// Find the next eligible item, scanning circularly from `current`.
    ///
    /// With no current position, forward starts at the first item and
    /// backward at the last.
    pub(crate) fn find_next_eligible(
        items: &[MenuItem],
        current: Option<usize>,
        forward: bool,
    ) -> Option<usize> {
        if items.is_empty() {
            return None;
        }
        let len = items.len();

        let start = match current {
            Some(idx) if forward => (idx + 1) % len,
            Some(idx) => (idx + len - 1) % len,
            None if forward => 0,
            None => len - 1,
        };

        let mut idx = start;
        for _ in 0..len {
            if items[idx].is_eligible() {
                return Some(idx);
            }
            idx = if forward {
                (idx + 1) % len
            } else {
                (idx + len - 1) % len
            };
        }

        None
    }
}
