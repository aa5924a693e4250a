//! Scenario files: a menu hierarchy plus a scripted sequence of inputs
//!
//! ```toml
//! [[menus]]
//! id = "menu-example"
//! label = "Code"
//! items = [
//!   { id = "about", label = "About" },
//!   { id = "sep", separator = true },
//!   { id = "prefs", label = "Preferences", submenu = "sub-menu" },
//! ]
//!
//! [[menus]]
//! id = "sub-menu"
//! parent = { menu = "menu-example", item = "prefs" }
//! items = [{ id = "settings", label = "Settings" }]
//!
//! [[steps]]
//! action = "key"
//! key = "ArrowDown"
//! ```

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use menu_kit::{Key, MenuController, MenuItem, MenuOptions, MenuTree, ParentRef};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("failed to read scenario {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid scenario: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("scenario defines no root menu")]
    NoRootMenu,
    #[error("scenario defines several root menus: {0:?}")]
    MultipleRoots(Vec<String>),
    #[error("menu `{menu}` references unknown parent menu `{parent}`")]
    UnknownParent { menu: String, parent: String },
    #[error("menu `{menu}` is not opened by item `{item}` of `{parent}`")]
    UnlinkedSubmenu {
        menu: String,
        parent: String,
        item: String,
    },
    #[error("duplicate menu id `{0}`")]
    DuplicateMenu(String),
    #[error("step {step}: unknown key `{key}`")]
    UnknownKey { step: usize, key: String },
}

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub menus: Vec<MenuDef>,
    #[serde(default)]
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MenuDef {
    pub id: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub parent: Option<ParentDef>,
    #[serde(default)]
    pub items: Vec<ItemDef>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParentDef {
    pub menu: String,
    pub item: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ItemDef {
    pub id: String,
    /// Defaults to the id
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default)]
    pub separator: bool,
    #[serde(default)]
    pub submenu: Option<String>,
}

impl ItemDef {
    pub fn to_item(&self) -> MenuItem {
        if self.separator {
            return MenuItem::separator(&self.id);
        }
        let label = self.label.clone().unwrap_or_else(|| self.id.clone());
        let item = match &self.submenu {
            Some(submenu_id) => MenuItem::submenu(&self.id, label, submenu_id),
            None => MenuItem::action(&self.id, label),
        };
        item.with_disabled(self.disabled)
    }
}

/// One scripted input
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    /// Named key (`ArrowDown`, `Escape`, ...) or a single character
    Key { key: String },
    /// Characters typed one after another without delay
    Type { text: String },
    Hover { menu: String, item: String },
    Click { menu: String, item: String },
    ClickTrigger { menu: String },
    ClickOutside,
    Unmount { menu: String },
    /// Advance the replay clock
    Wait { ms: u64 },
}

impl Scenario {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ScenarioError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ScenarioError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, ScenarioError> {
        let scenario: Scenario = toml::from_str(content)?;
        scenario.validate()?;
        Ok(scenario)
    }

    fn validate(&self) -> Result<(), ScenarioError> {
        let mut ids = HashSet::new();
        for menu in &self.menus {
            if !ids.insert(menu.id.as_str()) {
                return Err(ScenarioError::DuplicateMenu(menu.id.clone()));
            }
        }

        for menu in &self.menus {
            if let Some(parent) = &menu.parent {
                if !ids.contains(parent.menu.as_str()) {
                    return Err(ScenarioError::UnknownParent {
                        menu: menu.id.clone(),
                        parent: parent.menu.clone(),
                    });
                }
            }
        }
        self.root()?;

        for (index, step) in self.steps.iter().enumerate() {
            if let Step::Key { key } = step {
                if Key::from_name(key).is_none() {
                    return Err(ScenarioError::UnknownKey {
                        step: index,
                        key: key.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// The single menu without a parent
    pub fn root(&self) -> Result<&MenuDef, ScenarioError> {
        let roots: Vec<&MenuDef> = self.menus.iter().filter(|m| m.parent.is_none()).collect();
        match roots.as_slice() {
            [] => Err(ScenarioError::NoRootMenu),
            [root] => Ok(root),
            many => Err(ScenarioError::MultipleRoots(
                many.iter().map(|m| m.id.clone()).collect(),
            )),
        }
    }

    /// Mount every menu, parents before their submenus
    pub fn build_tree(&self, options: MenuOptions) -> Result<MenuTree, ScenarioError> {
        let root = self.root()?;
        let mut tree = MenuTree::with_options(build_controller(root), options);

        let mut pending: Vec<&MenuDef> =
            self.menus.iter().filter(|m| m.parent.is_some()).collect();
        while !pending.is_empty() {
            let before = pending.len();
            let mut unlinked = None;
            pending.retain(|def| {
                let Some(parent) = &def.parent else {
                    return false;
                };
                let ready = tree.controller(&parent.menu).is_some();
                if ready && !tree.mount_submenu(build_controller(def)) {
                    unlinked.get_or_insert_with(|| ScenarioError::UnlinkedSubmenu {
                        menu: def.id.clone(),
                        parent: parent.menu.clone(),
                        item: parent.item.clone(),
                    });
                }
                !ready
            });
            if let Some(err) = unlinked {
                return Err(err);
            }
            if pending.len() == before {
                // Parents exist but form a cycle that never reaches the root
                let def = pending[0];
                return Err(ScenarioError::UnknownParent {
                    menu: def.id.clone(),
                    parent: def
                        .parent
                        .as_ref()
                        .map(|p| p.menu.clone())
                        .unwrap_or_default(),
                });
            }
        }
        Ok(tree)
    }
}

fn build_controller(def: &MenuDef) -> MenuController {
    let mut controller = match &def.parent {
        Some(parent) => {
            MenuController::submenu(&def.id, ParentRef::new(&parent.menu, &parent.item))
        }
        None => MenuController::new(&def.id),
    };
    if let Some(label) = &def.label {
        controller = controller.with_label(label);
    }
    controller.with_items(def.items.iter().map(ItemDef::to_item).collect())
}
