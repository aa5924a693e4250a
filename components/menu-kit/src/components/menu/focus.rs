use serde::Serialize;

/// Element that should receive focus once a state update has been committed
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "target", content = "menu_id", rename_all = "snake_case")]
pub enum FocusTarget {
    /// The trigger of a menu. For a submenu this is its parent item.
    Trigger(String),
    /// The menu surface itself
    Menu(String),
}

impl FocusTarget {
    pub fn menu_id(&self) -> &str {
        match self {
            FocusTarget::Trigger(id) | FocusTarget::Menu(id) => id,
        }
    }
}

/// One-slot deferred focus command
///
/// Issuing a new intent replaces any intent that has not been taken yet.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct PendingFocus {
    slot: Option<FocusTarget>,
}

impl PendingFocus {
    pub fn issue(&mut self, target: FocusTarget) {
        if let Some(previous) = self.slot.replace(target) {
            tracing::trace!(?previous, "focus intent superseded");
        }
    }

    pub fn peek(&self) -> Option<&FocusTarget> {
        self.slot.as_ref()
    }

    pub fn take(&mut self) -> Option<FocusTarget> {
        self.slot.take()
    }

    pub fn cancel(&mut self) {
        self.slot = None;
    }

    pub fn is_pending(&self) -> bool {
        self.slot.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_newer_intent_supersedes() {
        let mut pending = PendingFocus::default();
        pending.issue(FocusTarget::Menu("menu".into()));
        pending.issue(FocusTarget::Trigger("menu".into()));

        assert_eq!(pending.take(), Some(FocusTarget::Trigger("menu".into())));
        assert_eq!(pending.take(), None);
    }

    #[test]
    fn test_cancel() {
        let mut pending = PendingFocus::default();
        pending.issue(FocusTarget::Menu("menu".into()));
        assert!(pending.is_pending());

        pending.cancel();
        assert!(!pending.is_pending());
        assert_eq!(pending.peek(), None);
    }

    #[test]
    fn test_target_serialization() {
        let json = serde_json::to_value(FocusTarget::Trigger("sub-menu".into())).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "target": "trigger", "menu_id": "sub-menu" })
        );
    }
}
