//! Attribute sets for the presentational elements of a menu
//!
//! The renderer binds these onto its elements verbatim; nothing here knows
//! about markup or styling.

use serde::Serialize;

use super::controller::MenuController;
use super::tree::MenuTree;

/// Ordered attribute list, as bound onto one element
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct AriaAttributes(Vec<(&'static str, String)>);

impl AriaAttributes {
    fn set(&mut self, name: &'static str, value: impl Into<String>) {
        let value = value.into();
        match self.0.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => *slot = value,
            None => self.0.push((name, value)),
        }
    }

    fn with(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.set(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(existing, _)| *existing == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.0.iter().map(|(name, value)| (*name, value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

fn bool_attr(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

/// Button that opens a root menu
pub fn trigger(menu: &MenuController) -> AriaAttributes {
    AriaAttributes::default()
        .with("aria-haspopup", "menu")
        .with("aria-expanded", bool_attr(menu.is_open()))
        .with("aria-controls", menu.id())
}

/// The menu surface
pub fn menu_surface(menu: &MenuController) -> AriaAttributes {
    let mut attributes = AriaAttributes::default()
        .with("id", menu.id())
        .with("role", "menu")
        .with("aria-orientation", "vertical");
    if let Some(label) = menu.state().label() {
        attributes.set("aria-label", label);
    }
    attributes
}

/// One registered item of `menu_id`. Unknown ids produce an empty set.
///
/// Separators get separator semantics; items owning a submenu also act as
/// that submenu's trigger.
pub fn item(tree: &MenuTree, menu_id: &str, item_id: &str) -> AriaAttributes {
    let Some(menu) = tree.controller(menu_id) else {
        return AriaAttributes::default();
    };
    let Some(item) = menu.state().item(item_id) else {
        return AriaAttributes::default();
    };

    if item.is_separator() {
        return AriaAttributes::default()
            .with("role", "separator")
            .with("aria-orientation", "horizontal");
    }

    let mut attributes = AriaAttributes::default().with("role", "menuitem");
    if item.is_disabled() {
        attributes.set("aria-disabled", "true");
    }
    if let Some(submenu_id) = item.submenu_id() {
        attributes.set("aria-haspopup", "menu");
        attributes.set("aria-expanded", bool_attr(tree.is_open(submenu_id)));
        attributes.set("aria-controls", submenu_id);
    }
    if menu.is_highlighted(item_id) {
        attributes.set("data-highlighted", "true");
    }
    attributes
}
