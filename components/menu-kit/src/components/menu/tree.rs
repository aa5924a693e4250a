use std::collections::HashMap;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, warn};

use super::controller::{Activation, CloseOptions, InitialHighlight, KeyOutcome, MenuController};
use super::focus::{FocusTarget, PendingFocus};
use super::state::{MenuSnapshot, ParentRef};
use super::typeahead::DEFAULT_TYPEAHEAD_TIMEOUT;
use crate::input::Key;

/// Behaviour knobs shared by every menu in a tree
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MenuOptions {
    pub typeahead_timeout: Duration,
    /// Whether a click outside the menu hands focus back to the root trigger
    pub restore_focus_on_outside_click: bool,
}

impl Default for MenuOptions {
    fn default() -> Self {
        Self {
            typeahead_timeout: DEFAULT_TYPEAHEAD_TIMEOUT,
            restore_focus_on_outside_click: true,
        }
    }
}

/// What a dispatched input ended up doing
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TreeOutcome {
    Ignored,
    Handled,
    Activated { menu_id: String, item_id: String },
}

/// A root menu and its nested submenus
///
/// Controllers are stored in a registry keyed by menu id. A submenu points
/// at its parent through the [`ParentRef`](super::ParentRef) in its state;
/// the parent item points at the submenu through its `submenu_id`. Neither
/// side owns the other, both are resolved through the registry.
///
/// Input is dispatched along the open chain, deepest menu first, bubbling to
/// the parent while unhandled. Focus intents issued during one input are
/// collected into a single pending slot; the deepest menu's intent wins.
#[derive(Debug)]
pub struct MenuTree {
    root: String,
    menus: HashMap<String, MenuController>,
    /// Mount order, for stable iteration
    order: Vec<String>,
    pending_focus: PendingFocus,
    options: MenuOptions,
}

impl MenuTree {
    // === Construction ===

    pub fn new(root: MenuController) -> Self {
        Self::with_options(root, MenuOptions::default())
    }

    pub fn with_options(mut root: MenuController, options: MenuOptions) -> Self {
        root.set_typeahead_timeout(options.typeahead_timeout);
        let id = root.id().to_string();
        let mut menus = HashMap::new();
        menus.insert(id.clone(), root);
        Self {
            root: id.clone(),
            menus,
            order: vec![id],
            pending_focus: PendingFocus::default(),
            options,
        }
    }

    /// Mount a submenu controller. Its parent must already be mounted.
    pub fn mount_submenu(&mut self, mut controller: MenuController) -> bool {
        let id = controller.id().to_string();
        if self.menus.contains_key(&id) {
            warn!(menu = %id, "duplicate menu id ignored");
            return false;
        }
        let Some(parent) = controller.parent() else {
            warn!(menu = %id, "submenu mounted without a parent");
            return false;
        };
        let Some(parent_menu) = self.menus.get(&parent.menu_id) else {
            warn!(menu = %id, parent = %parent.menu_id, "submenu parent is not mounted");
            return false;
        };
        let linked = parent_menu
            .state()
            .item(&parent.item_id)
            .and_then(|item| item.submenu_id())
            == Some(id.as_str());
        if !linked {
            warn!(
                menu = %id,
                parent = %parent.menu_id,
                item = %parent.item_id,
                "parent item does not reference this submenu"
            );
            return false;
        }

        controller.set_typeahead_timeout(self.options.typeahead_timeout);
        debug!(menu = %id, "submenu mounted");
        self.menus.insert(id.clone(), controller);
        self.order.push(id);
        true
    }

    /// Unmount a menu and every submenu below it.
    ///
    /// Unmounted menus end closed with no pending focus transfer.
    pub fn unmount(&mut self, menu_id: &str) {
        let mut doomed = self.descendants(menu_id);
        doomed.push(menu_id.to_string());

        for id in &doomed {
            if let Some(mut controller) = self.menus.remove(id) {
                controller.teardown();
                debug!(menu = %id, "menu unmounted");
            }
        }
        self.order.retain(|id| !doomed.contains(id));

        let stale = self
            .pending_focus
            .peek()
            .map(|target| doomed.iter().any(|id| id == target.menu_id()))
            .unwrap_or(false);
        if stale {
            self.pending_focus.cancel();
        }
    }

    // === Getters ===

    pub fn root_id(&self) -> &str {
        &self.root
    }

    pub fn options(&self) -> &MenuOptions {
        &self.options
    }

    pub fn is_empty(&self) -> bool {
        self.menus.is_empty()
    }

    pub fn controller(&self, menu_id: &str) -> Option<&MenuController> {
        self.menus.get(menu_id)
    }

    /// Direct access for membership changes (register/unregister items,
    /// activation callbacks). Use the tree operations for open/close so
    /// submenu links stay consistent.
    pub fn controller_mut(&mut self, menu_id: &str) -> Option<&mut MenuController> {
        self.menus.get_mut(menu_id)
    }

    pub fn root(&self) -> Option<&MenuController> {
        self.menus.get(&self.root)
    }

    pub fn is_open(&self, menu_id: &str) -> bool {
        self.menus
            .get(menu_id)
            .map(MenuController::is_open)
            .unwrap_or(false)
    }

    pub fn snapshots(&self) -> Vec<MenuSnapshot> {
        self.order
            .iter()
            .filter_map(|id| self.menus.get(id))
            .map(MenuController::snapshot)
            .collect()
    }

    /// Submenus whose parent link points at `menu_id`
    fn children(&self, menu_id: &str) -> Vec<String> {
        self.order
            .iter()
            .filter(|id| {
                self.menus
                    .get(*id)
                    .and_then(MenuController::parent)
                    .map(|parent| parent.menu_id == menu_id)
                    .unwrap_or(false)
            })
            .cloned()
            .collect()
    }

    /// All menus below `menu_id`
    fn descendants(&self, menu_id: &str) -> Vec<String> {
        let mut found = Vec::new();
        let mut frontier = vec![menu_id.to_string()];
        while let Some(id) = frontier.pop() {
            for child in self.children(&id) {
                if child != menu_id && !found.contains(&child) {
                    frontier.push(child.clone());
                    found.push(child);
                }
            }
        }
        found
    }

    fn open_child(&self, menu_id: &str) -> Option<String> {
        self.children(menu_id)
            .into_iter()
            .find(|id| self.is_open(id))
    }

    /// Open menus from the root down to the deepest open submenu
    pub fn open_chain(&self) -> Vec<String> {
        let mut chain = Vec::new();
        if !self.is_open(&self.root) {
            return chain;
        }
        let mut current = self.root.clone();
        loop {
            chain.push(current.clone());
            match self.open_child(&current) {
                Some(child) if !chain.contains(&child) => current = child,
                _ => break,
            }
        }
        chain
    }

    fn depth(&self, menu_id: &str) -> usize {
        let mut depth = 0;
        let mut current = menu_id;
        while let Some(parent) = self.menus.get(current).and_then(MenuController::parent) {
            depth += 1;
            current = parent.menu_id.as_str();
            if depth > self.menus.len() {
                break;
            }
        }
        depth
    }

    // === Focus ===

    /// Move focus intents from the controllers into the tree's slot,
    /// shallowest first so the deepest intent supersedes the others.
    fn collect_focus(&mut self) {
        let mut ids = self.order.clone();
        ids.sort_by_key(|id| self.depth(id));
        for id in ids {
            if let Some(target) = self
                .menus
                .get_mut(&id)
                .and_then(MenuController::take_pending_focus)
            {
                self.pending_focus.issue(target);
            }
        }
    }

    /// Take the focus effect to apply now that the state update is done
    pub fn take_pending_focus(&mut self) -> Option<FocusTarget> {
        self.collect_focus();
        self.pending_focus.take()
    }

    // === Open / Close ===

    /// Open a submenu from its parent item, keeping the parent open
    pub fn open_submenu(&mut self, submenu_id: &str) -> bool {
        let Some(parent) = self
            .menus
            .get(submenu_id)
            .and_then(MenuController::parent)
            .cloned()
        else {
            return false;
        };
        if !self.is_open(&parent.menu_id) || !self.owns_submenu(&parent, submenu_id) {
            return false;
        }

        for sibling in self.children(&parent.menu_id) {
            if sibling != submenu_id {
                self.close_menu(&sibling, CloseOptions::SILENT);
            }
        }
        let highlighted = self
            .menus
            .get_mut(&parent.menu_id)
            .map(|parent_menu| parent_menu.highlight(&parent.item_id))
            .unwrap_or(false);
        if !highlighted {
            return false;
        }
        if let Some(submenu) = self.menus.get_mut(submenu_id) {
            submenu.open();
        }
        true
    }

    /// Whether `parent` names an eligible item that opens `submenu_id`
    fn owns_submenu(&self, parent: &ParentRef, submenu_id: &str) -> bool {
        self.menus
            .get(&parent.menu_id)
            .and_then(|menu| menu.state().item(&parent.item_id))
            .map(|item| item.is_eligible() && item.submenu_id() == Some(submenu_id))
            .unwrap_or(false)
    }

    /// Close a menu and everything open below it.
    ///
    /// Descendants close silently. When a submenu closes with focus restore,
    /// its parent item gets the highlight back.
    pub fn close_menu(&mut self, menu_id: &str, options: CloseOptions) {
        let mut below = self.descendants(menu_id);
        below.sort_by_key(|id| std::cmp::Reverse(self.depth(id)));
        for id in below {
            if let Some(controller) = self.menus.get_mut(&id) {
                controller.close(CloseOptions::SILENT);
            }
        }

        let Some(controller) = self.menus.get_mut(menu_id) else {
            return;
        };
        controller.close(options);
        let parent = controller.parent().cloned();

        if options.restore_focus_to_trigger {
            self.restore_parent_highlight(parent.as_ref());
        }
    }

    fn restore_parent_highlight(&mut self, parent: Option<&ParentRef>) {
        if let Some(parent) = parent {
            if let Some(parent_menu) = self.menus.get_mut(&parent.menu_id) {
                parent_menu.highlight(&parent.item_id);
            }
        }
    }

    /// Close the whole tree
    pub fn close_all(&mut self, options: CloseOptions) {
        let root = self.root.clone();
        self.close_menu(&root, options);
    }

    // === Activation ===

    pub fn activate_highlighted(&mut self, menu_id: &str) -> TreeOutcome {
        let activation = match self.menus.get_mut(menu_id) {
            Some(controller) => controller.activate_highlighted(),
            None => return TreeOutcome::Ignored,
        };
        let outcome = self.apply_activation(menu_id, activation);
        self.collect_focus();
        outcome
    }

    fn apply_activation(&mut self, menu_id: &str, activation: Activation) -> TreeOutcome {
        match activation {
            Activation::None => TreeOutcome::Ignored,
            Activation::OpenSubmenu(submenu_id) => {
                if self.open_submenu(&submenu_id) {
                    TreeOutcome::Handled
                } else {
                    warn!(menu = menu_id, submenu = %submenu_id, "submenu is not mounted");
                    TreeOutcome::Ignored
                }
            }
            Activation::Activated(item_id) => {
                self.finish_activation();
                TreeOutcome::Activated {
                    menu_id: menu_id.to_string(),
                    item_id,
                }
            }
        }
    }

    /// After a leaf activation the whole chain closes and focus returns to
    /// the root trigger.
    fn finish_activation(&mut self) {
        let root = self.root.clone();
        if self.is_open(&root) {
            self.close_menu(&root, CloseOptions::DISMISS);
        }
    }

    // === Keyboard ===

    pub fn handle_key(&mut self, key: Key) -> TreeOutcome {
        self.handle_key_at(key, Instant::now())
    }

    /// Dispatch a key along the open chain, deepest menu first
    pub fn handle_key_at(&mut self, key: Key, now: Instant) -> TreeOutcome {
        let chain = self.open_chain();
        let outcome = if chain.is_empty() {
            self.handle_trigger_key(key)
        } else {
            self.dispatch(&chain, key, now)
        };
        self.collect_focus();
        outcome
    }

    fn dispatch(&mut self, chain: &[String], key: Key, now: Instant) -> TreeOutcome {
        for menu_id in chain.iter().rev() {
            let Some(controller) = self.menus.get_mut(menu_id) else {
                continue;
            };
            let outcome = controller.handle_key(key, now);
            let parent = controller.parent().cloned();

            match outcome {
                KeyOutcome::Unhandled => continue,
                KeyOutcome::Handled => return TreeOutcome::Handled,
                KeyOutcome::OpenSubmenu(submenu_id) => {
                    return self.apply_activation(menu_id, Activation::OpenSubmenu(submenu_id));
                }
                KeyOutcome::Closed => {
                    self.restore_parent_highlight(parent.as_ref());
                    return TreeOutcome::Handled;
                }
                KeyOutcome::Activated(item_id) => {
                    return self.apply_activation(menu_id, Activation::Activated(item_id));
                }
                KeyOutcome::DismissTree => {
                    self.close_all(CloseOptions::SILENT);
                    return TreeOutcome::Handled;
                }
            }
        }
        TreeOutcome::Ignored
    }

    /// Keys reaching the root trigger while every menu is closed
    fn handle_trigger_key(&mut self, key: Key) -> TreeOutcome {
        let initial = match key {
            Key::Enter | Key::Space | Key::ArrowDown => InitialHighlight::First,
            Key::ArrowUp => InitialHighlight::Last,
            _ => return TreeOutcome::Ignored,
        };
        match self.menus.get_mut(&self.root) {
            Some(root) => {
                root.open_with(initial);
                TreeOutcome::Handled
            }
            None => TreeOutcome::Ignored,
        }
    }

    // === Pointer ===

    /// Click on a menu's trigger. For a submenu the trigger is its parent item.
    pub fn click_trigger(&mut self, menu_id: &str) -> TreeOutcome {
        let Some(controller) = self.menus.get(menu_id) else {
            return TreeOutcome::Ignored;
        };
        let is_open = controller.is_open();
        let is_root = controller.parent().is_none();

        let outcome = match (is_root, is_open) {
            (_, true) => {
                self.close_menu(menu_id, CloseOptions::DISMISS);
                TreeOutcome::Handled
            }
            (true, false) => {
                // Pointer opens focus the surface, leaving the first item
                // for ArrowDown
                if let Some(root) = self.menus.get_mut(menu_id) {
                    root.open_with(InitialHighlight::None);
                }
                TreeOutcome::Handled
            }
            (false, false) => {
                if self.open_submenu(menu_id) {
                    TreeOutcome::Handled
                } else {
                    TreeOutcome::Ignored
                }
            }
        };
        self.collect_focus();
        outcome
    }

    /// Pointer moved over an item. Submenus opened from other items close.
    pub fn hover_item(&mut self, menu_id: &str, item_id: &str) -> TreeOutcome {
        let highlighted = match self.menus.get_mut(menu_id) {
            Some(controller) if controller.is_open() => controller.highlight(item_id),
            _ => return TreeOutcome::Ignored,
        };
        if !highlighted {
            return TreeOutcome::Ignored;
        }

        for child in self.children(menu_id) {
            let owned_by_item = self
                .menus
                .get(&child)
                .and_then(MenuController::parent)
                .map(|parent| parent.item_id == item_id)
                .unwrap_or(false);
            if !owned_by_item {
                self.close_menu(&child, CloseOptions::SILENT);
            }
        }
        self.collect_focus();
        TreeOutcome::Handled
    }

    /// Click on an item: highlight it, then activate it
    pub fn click_item(&mut self, menu_id: &str, item_id: &str) -> TreeOutcome {
        if self.hover_item(menu_id, item_id) == TreeOutcome::Ignored {
            return TreeOutcome::Ignored;
        }
        self.activate_highlighted(menu_id)
    }

    /// Click anywhere outside the open menus
    pub fn click_outside(&mut self) -> TreeOutcome {
        if !self.is_open(&self.root) {
            return TreeOutcome::Ignored;
        }
        let options = CloseOptions {
            restore_focus_to_trigger: self.options.restore_focus_on_outside_click,
        };
        self.close_all(options);
        self.collect_focus();
        TreeOutcome::Handled
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::components::menu_item::MenuItem;

    /// File
    /// ├── New
    /// ├── Open Recent ▸ (recent)
    /// │   ├── a.txt
    /// │   └── More ▸ (more)
    /// │       ├── b.txt
    /// │       └── c.txt
    /// ├── ---
    /// └── Share ▸ (share)
    ///     └── Email
    fn create_tree() -> MenuTree {
        let root = MenuController::new("file").with_items(vec![
            MenuItem::action("new", "New"),
            MenuItem::submenu("recent-item", "Open Recent", "recent"),
            MenuItem::separator("sep"),
            MenuItem::submenu("share-item", "Share", "share"),
        ]);
        let mut tree = MenuTree::new(root);
        tree.mount_submenu(
            MenuController::submenu("recent", ParentRef::new("file", "recent-item")).with_items(
                vec![
                    MenuItem::action("a", "a.txt"),
                    MenuItem::submenu("more-item", "More", "more"),
                ],
            ),
        );
        tree.mount_submenu(
            MenuController::submenu("more", ParentRef::new("recent", "more-item")).with_items(
                vec![MenuItem::action("b", "b.txt"), MenuItem::action("c", "c.txt")],
            ),
        );
        tree.mount_submenu(
            MenuController::submenu("share", ParentRef::new("file", "share-item"))
                .with_items(vec![MenuItem::action("email", "Email")]),
        );
        tree
    }

    fn key(tree: &mut MenuTree, key: Key) -> TreeOutcome {
        tree.handle_key_at(key, Instant::now())
    }

    /// Open file > recent > more via the keyboard
    fn open_two_levels(tree: &mut MenuTree) {
        key(tree, Key::ArrowDown); // open root, highlight "new"
        key(tree, Key::ArrowDown); // "recent-item"
        key(tree, Key::ArrowRight); // open recent, highlight "a"
        key(tree, Key::ArrowDown); // "more-item"
        key(tree, Key::ArrowRight); // open more, highlight "b"
        tree.take_pending_focus();
    }

    #[test]
    fn test_trigger_keys_open_root() {
        let mut tree = create_tree();

        assert_eq!(key(&mut tree, Key::Escape), TreeOutcome::Ignored);
        assert_eq!(key(&mut tree, Key::ArrowUp), TreeOutcome::Handled);
        let root = tree.root().unwrap();
        assert!(root.is_open());
        assert_eq!(root.highlighted(), Some("share-item"));
        assert_eq!(
            tree.take_pending_focus(),
            Some(FocusTarget::Menu("file".into()))
        );
    }

    #[test]
    fn test_open_chain() {
        let mut tree = create_tree();
        assert!(tree.open_chain().is_empty());

        open_two_levels(&mut tree);
        assert_eq!(tree.open_chain(), ["file", "recent", "more"]);
        assert_eq!(tree.controller("more").unwrap().highlighted(), Some("b"));
    }

    #[test]
    fn test_submenu_activation_keeps_parent_open() {
        let mut tree = create_tree();
        key(&mut tree, Key::ArrowDown);
        key(&mut tree, Key::ArrowDown);

        assert_eq!(key(&mut tree, Key::Enter), TreeOutcome::Handled);
        assert!(tree.is_open("file"));
        assert!(tree.is_open("recent"));
        assert_eq!(
            tree.controller("file").unwrap().highlighted(),
            Some("recent-item")
        );
        assert_eq!(
            tree.take_pending_focus(),
            Some(FocusTarget::Menu("recent".into()))
        );
    }

    #[test]
    fn test_escape_closes_one_level_at_a_time() {
        let mut tree = create_tree();
        open_two_levels(&mut tree);

        key(&mut tree, Key::Escape);
        assert_eq!(tree.open_chain(), ["file", "recent"]);
        assert_eq!(
            tree.controller("recent").unwrap().highlighted(),
            Some("more-item")
        );
        assert_eq!(
            tree.take_pending_focus(),
            Some(FocusTarget::Trigger("more".into()))
        );

        key(&mut tree, Key::Escape);
        assert_eq!(tree.open_chain(), ["file"]);
        assert_eq!(
            tree.controller("file").unwrap().highlighted(),
            Some("recent-item")
        );

        key(&mut tree, Key::Escape);
        assert!(tree.open_chain().is_empty());
        assert_eq!(
            tree.take_pending_focus(),
            Some(FocusTarget::Trigger("file".into()))
        );
    }

    #[test]
    fn test_arrow_left_closes_submenu() {
        let mut tree = create_tree();
        open_two_levels(&mut tree);

        key(&mut tree, Key::ArrowLeft);
        assert_eq!(tree.open_chain(), ["file", "recent"]);
        key(&mut tree, Key::ArrowLeft);
        assert_eq!(tree.open_chain(), ["file"]);
        // At the root ArrowLeft has nowhere to go
        assert_eq!(key(&mut tree, Key::ArrowLeft), TreeOutcome::Ignored);
        assert!(tree.is_open("file"));
    }

    #[test]
    fn test_unhandled_key_bubbles_to_parent() {
        let mut tree = create_tree();
        key(&mut tree, Key::ArrowDown);
        key(&mut tree, Key::ArrowDown);
        key(&mut tree, Key::ArrowRight); // recent open, "a" highlighted

        // "a" has no submenu, so ArrowRight bubbles up to file whose
        // highlighted item's submenu is already open
        assert_eq!(key(&mut tree, Key::ArrowRight), TreeOutcome::Handled);
        assert_eq!(tree.open_chain(), ["file", "recent"]);
        assert_eq!(tree.controller("recent").unwrap().highlighted(), Some("a"));
    }

    #[test]
    fn test_leaf_activation_closes_chain() {
        let activated = Rc::new(RefCell::new(Vec::new()));
        let mut tree = create_tree();
        let sink = activated.clone();
        tree.controller_mut("more")
            .unwrap()
            .on_activate("b", move |item| sink.borrow_mut().push(item.id.clone()));
        open_two_levels(&mut tree);

        assert_eq!(
            key(&mut tree, Key::Enter),
            TreeOutcome::Activated {
                menu_id: "more".into(),
                item_id: "b".into()
            }
        );
        assert_eq!(*activated.borrow(), vec!["b".to_string()]);
        assert!(tree.open_chain().is_empty());
        assert!(tree.snapshots().iter().all(|s| s.highlighted_item_id.is_none()));
        assert_eq!(
            tree.take_pending_focus(),
            Some(FocusTarget::Trigger("file".into()))
        );
    }

    #[test]
    fn test_root_activation_restores_focus() {
        let mut tree = create_tree();
        key(&mut tree, Key::Enter);
        assert_eq!(
            key(&mut tree, Key::Space),
            TreeOutcome::Activated {
                menu_id: "file".into(),
                item_id: "new".into()
            }
        );
        assert_eq!(
            tree.take_pending_focus(),
            Some(FocusTarget::Trigger("file".into()))
        );
    }

    #[test]
    fn test_opening_submenu_closes_sibling() {
        let mut tree = create_tree();
        tree.click_trigger("file");
        tree.click_trigger("recent");
        assert!(tree.is_open("recent"));

        tree.click_trigger("share");
        assert!(tree.is_open("share"));
        assert!(!tree.is_open("recent"));
        assert_eq!(
            tree.controller("file").unwrap().highlighted(),
            Some("share-item")
        );
    }

    #[test]
    fn test_hover_closes_unrelated_submenus() {
        let mut tree = create_tree();
        open_two_levels(&mut tree);

        assert_eq!(tree.hover_item("file", "new"), TreeOutcome::Handled);
        assert_eq!(tree.open_chain(), ["file"]);
        assert_eq!(tree.take_pending_focus(), None);

        // Hovering separators or disabled items changes nothing
        assert_eq!(tree.hover_item("file", "sep"), TreeOutcome::Ignored);
        assert_eq!(tree.controller("file").unwrap().highlighted(), Some("new"));
    }

    #[test]
    fn test_hover_on_owner_keeps_submenu() {
        let mut tree = create_tree();
        open_two_levels(&mut tree);

        tree.hover_item("file", "recent-item");
        assert_eq!(tree.open_chain(), ["file", "recent", "more"]);
    }

    #[test]
    fn test_click_item() {
        let mut tree = create_tree();
        tree.click_trigger("file");

        assert_eq!(tree.click_item("file", "share-item"), TreeOutcome::Handled);
        assert!(tree.is_open("share"));

        assert_eq!(
            tree.click_item("share", "email"),
            TreeOutcome::Activated {
                menu_id: "share".into(),
                item_id: "email".into()
            }
        );
        assert!(!tree.is_open("file"));
    }

    #[test]
    fn test_click_outside() {
        let mut tree = create_tree();
        assert_eq!(tree.click_outside(), TreeOutcome::Ignored);

        open_two_levels(&mut tree);
        assert_eq!(tree.click_outside(), TreeOutcome::Handled);
        assert!(tree.open_chain().is_empty());
        assert_eq!(
            tree.take_pending_focus(),
            Some(FocusTarget::Trigger("file".into()))
        );
    }

    #[test]
    fn test_click_outside_without_focus_restore() {
        let root = MenuController::new("menu").with_items(vec![MenuItem::action("a", "A")]);
        let mut tree = MenuTree::with_options(
            root,
            MenuOptions {
                restore_focus_on_outside_click: false,
                ..Default::default()
            },
        );
        tree.click_trigger("menu");
        tree.take_pending_focus();

        tree.click_outside();
        assert!(!tree.is_open("menu"));
        assert_eq!(tree.take_pending_focus(), None);
    }

    #[test]
    fn test_tab_dismisses_tree_silently() {
        let mut tree = create_tree();
        open_two_levels(&mut tree);

        key(&mut tree, Key::Tab);
        assert!(tree.open_chain().is_empty());
        assert_eq!(tree.take_pending_focus(), None);
    }

    #[test]
    fn test_trigger_click_toggles() {
        let mut tree = create_tree();
        tree.click_trigger("file");
        assert!(tree.is_open("file"));
        assert_eq!(tree.controller("file").unwrap().highlighted(), None);
        assert_eq!(
            tree.take_pending_focus(),
            Some(FocusTarget::Menu("file".into()))
        );

        // ArrowDown then lands on the first item
        key(&mut tree, Key::ArrowDown);
        assert_eq!(tree.controller("file").unwrap().highlighted(), Some("new"));

        tree.click_trigger("file");
        assert!(!tree.is_open("file"));
    }

    #[test]
    fn test_disabled_item_cannot_open_its_submenu() {
        let root = MenuController::new("root").with_items(vec![
            MenuItem::action("a", "A"),
            MenuItem::submenu("prefs", "Preferences", "sub").disabled(),
        ]);
        let mut tree = MenuTree::new(root);
        assert!(tree.mount_submenu(
            MenuController::submenu("sub", ParentRef::new("root", "prefs"))
                .with_items(vec![MenuItem::action("settings", "Settings")]),
        ));
        tree.click_trigger("root");
        tree.hover_item("root", "a");
        tree.take_pending_focus();

        assert_eq!(tree.click_trigger("sub"), TreeOutcome::Ignored);
        assert!(!tree.is_open("sub"));
        assert_eq!(tree.open_chain(), ["root"]);
        assert_eq!(tree.controller("root").unwrap().highlighted(), Some("a"));
        assert_eq!(tree.take_pending_focus(), None);

        // Enabling the item makes the submenu reachable again
        tree.controller_mut("root")
            .unwrap()
            .set_item_disabled("prefs", false);
        assert_eq!(tree.click_trigger("sub"), TreeOutcome::Handled);
        assert_eq!(tree.open_chain(), ["root", "sub"]);
        assert_eq!(
            tree.controller("root").unwrap().highlighted(),
            Some("prefs")
        );
    }

    #[test]
    fn test_outcome_serialization() {
        let activated = TreeOutcome::Activated {
            menu_id: "file".into(),
            item_id: "new".into(),
        };
        assert_eq!(
            serde_json::to_value(&activated).unwrap(),
            serde_json::json!({ "outcome": "activated", "menu_id": "file", "item_id": "new" })
        );
        assert_eq!(
            serde_json::to_value(TreeOutcome::Ignored).unwrap(),
            serde_json::json!({ "outcome": "ignored" })
        );
    }

    #[test]
    fn test_unmount_submenu_tears_down_descendants() {
        let mut tree = create_tree();
        open_two_levels(&mut tree);

        tree.unmount("recent");
        assert!(tree.controller("recent").is_none());
        assert!(tree.controller("more").is_none());
        assert_eq!(tree.open_chain(), ["file"]);
        assert_eq!(tree.take_pending_focus(), None);
    }

    #[test]
    fn test_unmount_root_reaches_terminal_state() {
        let mut tree = create_tree();
        open_two_levels(&mut tree);
        key(&mut tree, Key::Escape);

        tree.unmount("file");
        assert!(tree.is_empty());
        assert_eq!(tree.take_pending_focus(), None);
        assert_eq!(key(&mut tree, Key::ArrowDown), TreeOutcome::Ignored);
    }

    #[test]
    fn test_mount_rejects_orphans_and_duplicates() {
        let mut tree = create_tree();
        assert!(!tree.mount_submenu(MenuController::new("loose")));
        assert!(!tree.mount_submenu(MenuController::submenu(
            "orphan",
            ParentRef::new("missing", "item")
        )));
        assert!(!tree.mount_submenu(MenuController::submenu(
            "recent",
            ParentRef::new("file", "recent-item")
        )));
        // "new" is a plain action and opens nothing
        assert!(!tree.mount_submenu(MenuController::submenu(
            "unlinked",
            ParentRef::new("file", "new")
        )));
        assert!(tree.controller("unlinked").is_none());
    }

    #[test]
    fn test_typeahead_through_tree() {
        let mut tree = create_tree();
        let now = Instant::now();
        tree.handle_key_at(Key::Enter, now);

        tree.handle_key_at(Key::Character('s'), now);
        assert_eq!(
            tree.controller("file").unwrap().highlighted(),
            Some("share-item")
        );
    }
}
