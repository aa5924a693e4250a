//! Toolkit-agnostic interaction model for popup menus
//!
//! Pure state: open/closed, highlighted item, keyboard and pointer
//! interpretation, deferred focus transfer and derived ARIA attributes.
//! Rendering is left to whoever binds a [`MenuTree`] to real elements.

pub mod components;
pub mod input;

// Re-export commonly used items
pub use components::menu::{
    FocusTarget, MenuController, MenuOptions, MenuSnapshot, MenuTree, ParentRef, TreeOutcome,
};
pub use components::menu_item::{MenuItem, MenuItemKind};
pub use input::Key;

/// Convenience prelude for front ends
pub mod prelude {
    pub use crate::components::menu::aria;
    pub use crate::components::menu::{
        Activation, CloseOptions, Direction, FocusTarget, InitialHighlight, KeyOutcome,
        MenuController, MenuOptions, MenuSnapshot, MenuState, MenuTree, ParentRef, TreeOutcome,
    };
    pub use crate::components::menu_item::{MenuItem, MenuItemKind};
    pub use crate::input::{keycodes, Key};
}
