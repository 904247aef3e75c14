//! Multi-select over the ordered gallery listing, plus next/previous navigation.

use std::collections::BTreeSet;

/// Keyboard modifiers held during a click.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClickModifiers {
    pub shift: bool,
    /// Ctrl on Linux/Windows, Cmd on macOS.
    pub toggle: bool,
}

/// Selected item ids plus the anchor for shift-range selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemSelection {
    selected: BTreeSet<String>,
    anchor: Option<String>,
}

impl ItemSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.selected.contains(id)
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.selected.iter().map(String::as_str)
    }

    pub fn clear(&mut self) {
        self.selected.clear();
        self.anchor = None;
    }

    /// Apply a click on `id`, where `items` is the listing in display order.
    ///
    /// * shift with an anchor in `items`: add the inclusive range between them
    /// * toggle: flip `id`
    /// * plain: select only `id`, or clear if `id` was already the sole selection
    ///
    /// The clicked item becomes the new anchor.
    pub fn click<S: AsRef<str>>(&mut self, items: &[S], id: &str, mods: ClickModifiers) {
        let position = |needle: &str| items.iter().position(|i| i.as_ref() == needle);
        let range = match (&self.anchor, mods.shift) {
            (Some(anchor), true) => position(anchor).zip(position(id)),
            _ => None,
        };

        if let Some((a, b)) = range {
            let (start, end) = if a <= b { (a, b) } else { (b, a) };
            self.selected
                .extend(items[start..=end].iter().map(|i| i.as_ref().to_string()));
        } else if mods.toggle {
            if !self.selected.remove(id) {
                self.selected.insert(id.to_string());
            }
        } else {
            let sole = self.selected.len() == 1 && self.selected.contains(id);
            self.selected.clear();
            if !sole {
                self.selected.insert(id.to_string());
            }
        }
        self.anchor = Some(id.to_string());
    }

    /// Drop ids that are no longer in the listing.
    pub fn retain_listed<S: AsRef<str>>(&mut self, items: &[S]) {
        self.selected
            .retain(|id| items.iter().any(|i| i.as_ref() == id.as_str()));
        if let Some(anchor) = &self.anchor {
            if !items.iter().any(|i| i.as_ref() == anchor.as_str()) {
                self.anchor = None;
            }
        }
    }
}

/// Index after `current` in a list of `len` items, wrapping. `None` when the list is empty.
pub fn next_index(current: Option<usize>, len: usize) -> Option<usize> {
    if len == 0 {
        return None;
    }
    Some(match current {
        Some(i) if i < len => (i + 1) % len,
        _ => 0,
    })
}

/// Index before `current`, wrapping. `None` when the list is empty.
pub fn prev_index(current: Option<usize>, len: usize) -> Option<usize> {
    if len == 0 {
        return None;
    }
    Some(match current {
        Some(i) if i < len => (i + len - 1) % len,
        _ => len - 1,
    })
}
