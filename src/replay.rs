//! Drive a [`MenuTree`] through a scenario's steps on a simulated clock

use std::time::{Duration, Instant};

use menu_kit::{FocusTarget, Key, MenuOptions, MenuSnapshot, MenuTree, TreeOutcome};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::scenario::{Scenario, ScenarioError, Step};

/// Observable result of one step
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frame {
    pub step: usize,
    pub input: Step,
    #[serde(flatten)]
    pub outcome: TreeOutcome,
    /// Focus effect applied after the step, if any
    pub focus: Option<FocusTarget>,
    pub menus: Vec<MenuSnapshot>,
}

impl Frame {
    pub fn activated(&self) -> Option<&str> {
        match &self.outcome {
            TreeOutcome::Activated { item_id, .. } => Some(item_id),
            _ => None,
        }
    }
}

pub struct Replay {
    tree: MenuTree,
    started: Instant,
    elapsed: Duration,
    step: usize,
}

impl Replay {
    pub fn new(scenario: &Scenario, options: MenuOptions) -> Result<Self, ScenarioError> {
        let mut tree = scenario.build_tree(options)?;
        for menu in &scenario.menus {
            let Some(controller) = tree.controller_mut(&menu.id) else {
                continue;
            };
            for item in menu.items.iter().filter(|i| !i.separator && i.submenu.is_none()) {
                let menu_id = menu.id.clone();
                controller.on_activate(&item.id, move |item| {
                    info!("{menu_id}: activated {} ({:?})", item.id, item.label());
                });
            }
        }

        Ok(Self {
            tree,
            started: Instant::now(),
            elapsed: Duration::ZERO,
            step: 0,
        })
    }

    pub fn tree(&self) -> &MenuTree {
        &self.tree
    }

    fn now(&self) -> Instant {
        self.started + self.elapsed
    }

    /// Apply one step and commit its focus effect
    pub fn apply(&mut self, input: &Step) -> Frame {
        let outcome = match input {
            Step::Key { key } => match Key::from_name(key) {
                Some(key) => self.tree.handle_key_at(key, self.now()),
                None => {
                    warn!("Ignoring unknown key {key:?}");
                    TreeOutcome::Ignored
                }
            },
            Step::Type { text } => {
                let now = self.now();
                text.chars()
                    .map(|ch| self.tree.handle_key_at(Key::Character(ch), now))
                    .fold(TreeOutcome::Ignored, strongest)
            }
            Step::Hover { menu, item } => self.tree.hover_item(menu, item),
            Step::Click { menu, item } => self.tree.click_item(menu, item),
            Step::ClickTrigger { menu } => self.tree.click_trigger(menu),
            Step::ClickOutside => self.tree.click_outside(),
            Step::Unmount { menu } => {
                self.tree.unmount(menu);
                TreeOutcome::Handled
            }
            Step::Wait { ms } => {
                self.elapsed += Duration::from_millis(*ms);
                TreeOutcome::Ignored
            }
        };

        let focus = self.tree.take_pending_focus();
        debug!(step = self.step, ?outcome, ?focus, "step applied");
        let frame = Frame {
            step: self.step,
            input: input.clone(),
            outcome,
            focus,
            menus: self.tree.snapshots(),
        };
        self.step += 1;
        frame
    }
}

/// Keep the most significant outcome of a burst of keys
fn strongest(current: TreeOutcome, next: TreeOutcome) -> TreeOutcome {
    let activated = |outcome: &TreeOutcome| matches!(outcome, TreeOutcome::Activated { .. });
    if activated(&current) {
        current
    } else if activated(&next) || current == TreeOutcome::Ignored {
        next
    } else {
        current
    }
}

/// Replay every step of `scenario`, one frame per step
pub fn run(scenario: &Scenario, options: MenuOptions) -> Result<Vec<Frame>, ScenarioError> {
    let mut replay = Replay::new(scenario, options)?;
    Ok(scenario.steps.iter().map(|step| replay.apply(step)).collect())
}
