pub mod aria;
mod controller;
mod focus;
mod state;
mod tree;
mod typeahead;

pub use controller::{
    ActivateCallback, Activation, CloseOptions, InitialHighlight, KeyOutcome, MenuController,
};
pub use focus::{FocusTarget, PendingFocus};
pub use state::{Direction, MenuSnapshot, MenuState, ParentRef};
pub use tree::{MenuOptions, MenuTree, TreeOutcome};
pub use typeahead::{Typeahead, DEFAULT_TYPEAHEAD_TIMEOUT};
