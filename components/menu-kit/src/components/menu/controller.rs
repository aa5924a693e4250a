use std::collections::HashMap;
use std::rc::Rc;
use std::time::{Duration, Instant};

use tracing::{debug, trace, warn};

use super::focus::{FocusTarget, PendingFocus};
use super::state::{Direction, MenuSnapshot, MenuState, ParentRef};
use super::typeahead::Typeahead;
use crate::components::menu_item::MenuItem;
use crate::input::Key;

/// Callback invoked when a leaf item is activated
pub type ActivateCallback = Rc<dyn Fn(&MenuItem)>;

/// Which item gets highlighted when a menu opens
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum InitialHighlight {
    #[default]
    First,
    Last,
    None,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CloseOptions {
    pub restore_focus_to_trigger: bool,
}

impl CloseOptions {
    /// Explicit dismissal: focus goes back to the trigger
    pub const DISMISS: Self = Self {
        restore_focus_to_trigger: true,
    };

    /// Focus is moving elsewhere (into a submenu, or an ancestor is closing)
    pub const SILENT: Self = Self {
        restore_focus_to_trigger: false,
    };
}

impl Default for CloseOptions {
    fn default() -> Self {
        Self::DISMISS
    }
}

/// Result of `activate_highlighted`
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Activation {
    /// Nothing highlighted, or the menu is closed
    None,
    /// The highlighted item owns a submenu which should be opened
    OpenSubmenu(String),
    /// A leaf item was activated and this menu closed
    Activated(String),
}

/// Result of handing a key to one controller in the dispatch chain
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum KeyOutcome {
    /// Let the parent menu try
    Unhandled,
    Handled,
    OpenSubmenu(String),
    /// This menu closed itself (Escape, or ArrowLeft inside a submenu)
    Closed,
    Activated(String),
    /// Focus is leaving the menu tree altogether
    DismissTree,
}

/// Interaction controller for one menu
///
/// Owns the [`MenuState`] exclusively. Triggers and items only read through
/// the getters and report intents through the operations below. Every
/// operation is total: requests that make no sense for the current state are
/// ignored.
#[derive(Clone)]
pub struct MenuController {
    state: MenuState,
    typeahead: Typeahead,
    pending_focus: PendingFocus,
    on_activate: HashMap<String, ActivateCallback>,
}

impl MenuController {
    // === Construction ===

    pub fn new(id: impl Into<String>) -> Self {
        Self {
            state: MenuState::new(id),
            typeahead: Typeahead::default(),
            pending_focus: PendingFocus::default(),
            on_activate: HashMap::new(),
        }
    }

    /// Create a controller for a submenu owned by `parent`
    pub fn submenu(id: impl Into<String>, parent: ParentRef) -> Self {
        let mut controller = Self::new(id);
        controller.state = controller.state.with_parent(parent);
        controller
    }

    // === Builder API ===

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.state = self.state.with_label(label);
        self
    }

    pub fn with_typeahead_timeout(mut self, timeout: Duration) -> Self {
        self.typeahead = Typeahead::new(timeout);
        self
    }

    pub fn with_items(mut self, items: Vec<MenuItem>) -> Self {
        self.set_items(items);
        self
    }

    pub fn set_typeahead_timeout(&mut self, timeout: Duration) {
        self.typeahead = Typeahead::new(timeout);
    }

    // === Getters ===

    pub fn id(&self) -> &str {
        self.state.id()
    }

    pub fn state(&self) -> &MenuState {
        &self.state
    }

    pub fn is_open(&self) -> bool {
        self.state.is_open()
    }

    pub fn highlighted(&self) -> Option<&str> {
        self.state.highlighted()
    }

    pub fn is_highlighted(&self, item_id: &str) -> bool {
        self.state.is_highlighted(item_id)
    }

    pub fn parent(&self) -> Option<&ParentRef> {
        self.state.parent()
    }

    pub fn snapshot(&self) -> MenuSnapshot {
        self.state.snapshot()
    }

    pub fn pending_focus(&self) -> Option<&FocusTarget> {
        self.pending_focus.peek()
    }

    /// Take the deferred focus intent, to be applied after rendering
    pub fn take_pending_focus(&mut self) -> Option<FocusTarget> {
        self.pending_focus.take()
    }

    // === Open / Close ===

    pub fn open(&mut self) {
        self.open_with(InitialHighlight::First);
    }

    pub fn open_with(&mut self, initial: InitialHighlight) {
        if self.state.is_open() {
            return;
        }
        self.state.set_open(true);
        match initial {
            InitialHighlight::First => {
                self.state.move_highlight(Direction::First);
            }
            InitialHighlight::Last => {
                self.state.move_highlight(Direction::Last);
            }
            InitialHighlight::None => {}
        }
        self.pending_focus
            .issue(FocusTarget::Menu(self.state.id().to_string()));
        debug!(
            menu = self.state.id(),
            highlighted = ?self.state.highlighted(),
            "menu opened"
        );
    }

    pub fn close(&mut self, options: CloseOptions) {
        if !self.state.is_open() {
            return;
        }
        self.state.set_open(false);
        self.typeahead.reset();
        if options.restore_focus_to_trigger {
            self.pending_focus
                .issue(FocusTarget::Trigger(self.state.id().to_string()));
        } else {
            self.pending_focus.cancel();
        }
        debug!(
            menu = self.state.id(),
            restore_focus = options.restore_focus_to_trigger,
            "menu closed"
        );
    }

    pub fn toggle(&mut self) {
        if self.state.is_open() {
            self.close(CloseOptions::DISMISS);
        } else {
            self.open();
        }
    }

    /// Final close on unmount: closed, with no focus transfer left behind
    pub fn teardown(&mut self) {
        self.close(CloseOptions::SILENT);
        self.pending_focus.cancel();
    }

    // === Highlight ===

    pub fn highlight(&mut self, item_id: &str) -> bool {
        let changed = self.state.highlight(item_id);
        if changed {
            trace!(menu = self.state.id(), item = item_id, "highlight");
        }
        changed
    }

    pub fn move_highlight(&mut self, direction: Direction) -> bool {
        let changed = self.state.move_highlight(direction);
        trace!(
            menu = self.state.id(),
            ?direction,
            highlighted = ?self.state.highlighted(),
            "move highlight"
        );
        changed
    }

    /// Highlight by typed character. Returns true if an item matched.
    pub fn typeahead(&mut self, ch: char, now: Instant) -> bool {
        if !self.state.is_open() {
            return false;
        }
        let current = self
            .state
            .highlighted()
            .and_then(|id| self.state.item_order().position(|item| item == id));

        self.typeahead.push(ch, now);
        let mut found = self.typeahead.find_match(self.state.items(), current);
        if found.is_none() && self.typeahead.buffer().chars().count() > 1 {
            self.typeahead.restart(ch, now);
            found = self.typeahead.find_match(self.state.items(), current);
        }

        let Some(index) = found else {
            trace!(
                menu = self.state.id(),
                query = self.typeahead.buffer(),
                "typeahead: no match"
            );
            return false;
        };
        let item_id = self.state.items()[index].id.clone();
        self.highlight(&item_id);
        true
    }

    // === Activation ===

    pub fn on_activate<F>(&mut self, item_id: impl Into<String>, callback: F)
    where
        F: Fn(&MenuItem) + 'static,
    {
        self.on_activate.insert(item_id.into(), Rc::new(callback));
    }

    /// Activate the highlighted item.
    ///
    /// Submenu items are reported back without any state change; opening the
    /// submenu is the tree's job. Leaf items run their callback and close
    /// this menu. A root menu restores focus to its trigger, a submenu does
    /// not (the root's close takes care of it).
    pub fn activate_highlighted(&mut self) -> Activation {
        if !self.state.is_open() {
            return Activation::None;
        }
        let Some(item) = self.state.highlighted_item().cloned() else {
            return Activation::None;
        };

        if let Some(submenu_id) = item.submenu_id() {
            return Activation::OpenSubmenu(submenu_id.to_string());
        }

        debug!(menu = self.state.id(), item = item.id(), "item activated");
        if let Some(callback) = self.on_activate.get(item.id()).cloned() {
            callback(&item);
        }

        let options = if self.state.parent().is_some() {
            CloseOptions::SILENT
        } else {
            CloseOptions::DISMISS
        };
        self.close(options);
        Activation::Activated(item.id)
    }

    // === Item membership ===

    pub fn register_item(&mut self, item: MenuItem) -> bool {
        let id = item.id.clone();
        let added = self.state.register_item(item);
        if !added {
            self.warn_duplicate(&id);
        }
        added
    }

    pub fn register_item_at(&mut self, index: usize, item: MenuItem) -> bool {
        let id = item.id.clone();
        let added = self.state.register_item_at(index, item);
        if !added {
            self.warn_duplicate(&id);
        }
        added
    }

    pub fn unregister_item(&mut self, item_id: &str) -> Option<MenuItem> {
        let removed = self.state.unregister_item(item_id);
        if removed.is_some() {
            self.on_activate.remove(item_id);
        }
        removed
    }

    pub fn set_item_disabled(&mut self, item_id: &str, disabled: bool) -> bool {
        let found = self.state.set_item_disabled(item_id, disabled);
        if found {
            trace!(
                menu = self.state.id(),
                item = item_id,
                disabled,
                "item disabled flag changed"
            );
        } else {
            warn!(menu = self.state.id(), item = item_id, "unknown item cannot be disabled");
        }
        found
    }

    pub fn set_items(&mut self, items: Vec<MenuItem>) {
        for id in self.state.set_items(items) {
            self.warn_duplicate(&id);
        }
        let state = &self.state;
        self.on_activate.retain(|id, _| state.item(id).is_some());
    }

    fn warn_duplicate(&self, item_id: &str) {
        warn!(
            menu = self.state.id(),
            item = item_id,
            "duplicate menu item id ignored"
        );
    }

    // === Keyboard ===

    /// Interpret a key for this menu alone.
    ///
    /// Closed menus never handle keys; the trigger does.
    pub fn handle_key(&mut self, key: Key, now: Instant) -> KeyOutcome {
        if !self.state.is_open() {
            return KeyOutcome::Unhandled;
        }

        match key {
            Key::ArrowDown => self.navigate(Direction::Next),
            Key::ArrowUp => self.navigate(Direction::Previous),
            Key::Home => self.navigate(Direction::First),
            Key::End => self.navigate(Direction::Last),
            Key::ArrowRight => match self.state.highlighted_item().and_then(MenuItem::submenu_id) {
                Some(submenu_id) => KeyOutcome::OpenSubmenu(submenu_id.to_string()),
                None => KeyOutcome::Unhandled,
            },
            Key::ArrowLeft if self.state.parent().is_some() => {
                self.close(CloseOptions::DISMISS);
                KeyOutcome::Closed
            }
            Key::ArrowLeft => KeyOutcome::Unhandled,
            Key::Escape => {
                self.close(CloseOptions::DISMISS);
                KeyOutcome::Closed
            }
            Key::Enter | Key::Space => match self.activate_highlighted() {
                Activation::None => KeyOutcome::Handled,
                Activation::OpenSubmenu(id) => KeyOutcome::OpenSubmenu(id),
                Activation::Activated(id) => KeyOutcome::Activated(id),
            },
            Key::Tab => KeyOutcome::DismissTree,
            Key::Character(ch) if key.is_printable() => {
                self.typeahead(ch, now);
                KeyOutcome::Handled
            }
            Key::Character(_) => KeyOutcome::Unhandled,
        }
    }

    fn navigate(&mut self, direction: Direction) -> KeyOutcome {
        self.move_highlight(direction);
        KeyOutcome::Handled
    }
}

impl std::fmt::Debug for MenuController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MenuController")
            .field("state", &self.state)
            .field("typeahead", &self.typeahead.buffer())
            .field("pending_focus", &self.pending_focus.peek())
            .field("callbacks", &self.on_activate.len())
            .finish()
    }
}
