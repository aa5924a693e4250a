use std::time::{Duration, Instant};

use crate::components::menu_item::MenuItem;

/// Default window in which typed characters accumulate into one query
pub const DEFAULT_TYPEAHEAD_TIMEOUT: Duration = Duration::from_millis(500);

/// Typed-prefix buffer for keyboard navigation by label
///
/// Characters typed within `timeout` of each other accumulate. A buffer made
/// of one repeated character (`"ccc"`) is treated as a request to cycle
/// through items starting with that character.
#[derive(Clone, Debug, Hash)]
pub struct Typeahead {
    timeout: Duration,
    buffer: String,
    last_input: Option<Instant>,
}

impl Typeahead {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            buffer: String::new(),
            last_input: None,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    pub fn reset(&mut self) {
        self.buffer.clear();
        self.last_input = None;
    }

    /// Append a character, starting a new query if the window has elapsed
    pub fn push(&mut self, ch: char, now: Instant) -> &str {
        let expired = self
            .last_input
            .map(|last| now.saturating_duration_since(last) > self.timeout)
            .unwrap_or(true);
        if expired {
            self.buffer.clear();
        }
        self.buffer.extend(ch.to_lowercase());
        self.last_input = Some(now);
        &self.buffer
    }

    /// Drop everything typed so far and start over from `ch`
    pub fn restart(&mut self, ch: char, now: Instant) -> &str {
        self.buffer.clear();
        self.push(ch, now)
    }

    /// Find the item the current buffer points at, given the position of the
    /// highlighted item.
    pub fn find_match(&self, items: &[MenuItem], current: Option<usize>) -> Option<usize> {
        find_match(items, current, &self.buffer)
    }
}

impl Default for Typeahead {
    fn default() -> Self {
        Self::new(DEFAULT_TYPEAHEAD_TIMEOUT)
    }
}

/// Search eligible items for a label starting with `query` (already lower
/// case).
///
/// A repeated single character searches from the item after `current`, so
/// repeated keystrokes cycle; a longer prefix searches from `current` itself
/// so refining the query keeps the highlight where it is when it still
/// matches.
pub(crate) fn find_match(items: &[MenuItem], current: Option<usize>, query: &str) -> Option<usize> {
    let mut chars = query.chars();
    let first = chars.next()?;
    let repeated = chars.all(|c| c == first);

    let (prefix, start) = if repeated {
        let start = current.map(|idx| idx + 1).unwrap_or(0);
        (&query[..first.len_utf8()], start)
    } else {
        (query, current.unwrap_or(0))
    };

    let len = items.len();
    (0..len)
        .map(|offset| (start + offset) % len)
        .find(|&idx| {
            let item = &items[idx];
            item.is_eligible()
                && item
                    .label()
                    .map(|label| label.trim_start().to_lowercase().starts_with(prefix))
                    .unwrap_or(false)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items() -> Vec<MenuItem> {
        vec![
            MenuItem::action("about", "About"),
            MenuItem::action("check", "Check for Updates"),
            MenuItem::separator("sep"),
            MenuItem::action("settings", "Settings"),
            MenuItem::action("save", "Save"),
            MenuItem::action("share", "Share").disabled(),
        ]
    }

    #[test]
    fn test_single_character() {
        assert_eq!(find_match(&items(), None, "c"), Some(1));
        assert_eq!(find_match(&items(), None, "s"), Some(3));
        assert_eq!(find_match(&items(), None, "z"), None);
    }

    #[test]
    fn test_repeated_character_cycles() {
        let items = items();
        // From "Settings", "ss" moves on to "Save" and skips disabled "Share"
        assert_eq!(find_match(&items, Some(3), "ss"), Some(4));
        assert_eq!(find_match(&items, Some(4), "sss"), Some(3));
    }

    #[test]
    fn test_single_match_stays() {
        assert_eq!(find_match(&items(), Some(1), "cc"), Some(1));
    }

    #[test]
    fn test_prefix_refines_from_current() {
        let items = items();
        assert_eq!(find_match(&items, Some(3), "se"), Some(3));
        assert_eq!(find_match(&items, Some(3), "sa"), Some(4));
    }

    #[test]
    fn test_case_insensitive() {
        let items = vec![MenuItem::action("x", "eXtensions")];
        assert_eq!(find_match(&items, None, "ext"), Some(0));
    }

    #[test]
    fn test_buffer_expires() {
        let mut typeahead = Typeahead::new(Duration::from_millis(500));
        let start = Instant::now();

        typeahead.push('C', start);
        assert_eq!(typeahead.push('h', start + Duration::from_millis(200)), "ch");
        assert_eq!(typeahead.push('s', start + Duration::from_millis(900)), "s");
    }

    #[test]
    fn test_reset() {
        let mut typeahead = Typeahead::default();
        typeahead.push('a', Instant::now());
        typeahead.reset();
        assert_eq!(typeahead.buffer(), "");
        assert_eq!(typeahead.timeout(), DEFAULT_TYPEAHEAD_TIMEOUT);
    }
}
