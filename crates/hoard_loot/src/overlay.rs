//! # Disablement Overlay
//!
//! Per-owner sets of disabled component ids and tags. The overlay persists
//! across evaluations and is only mutated when the owner's configuration
//! changes; the generator reads it.

use std::collections::BTreeSet;

/// One layer's worth of enable/disable changes.
///
/// Applied disable-then-enable, ids before tags.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OverlayDelta {
    /// Ids to add to the disabled set.
    pub disable_ids: Vec<String>,
    /// Ids to remove from the disabled set.
    pub enable_ids: Vec<String>,
    /// Tags to add to the disabled set.
    pub disable_tags: Vec<String>,
    /// Tags to remove from the disabled set.
    pub enable_tags: Vec<String>,
}

impl OverlayDelta {
    /// Returns true if applying this delta changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.disable_ids.is_empty()
            && self.enable_ids.is_empty()
            && self.disable_tags.is_empty()
            && self.enable_tags.is_empty()
    }
}

/// The `disabledIds` / `disabledTags` pair gating every node.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DisablementOverlay {
    disabled_ids: BTreeSet<String>,
    disabled_tags: BTreeSet<String>,
}

impl DisablementOverlay {
    /// Creates an overlay with nothing disabled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears both sets. Called when a base layer is (re)applied.
    pub fn reset_to_base(&mut self) {
        self.disabled_ids.clear();
        self.disabled_tags.clear();
    }

    /// Adds ids to the disabled set.
    pub fn apply_disable_ids<I, S>(&mut self, ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.disabled_ids.extend(ids.into_iter().map(Into::into));
    }

    /// Removes ids from the disabled set.
    pub fn apply_enable_ids<I, S>(&mut self, ids: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for id in ids {
            self.disabled_ids.remove(id.as_ref());
        }
    }

    /// Adds tags to the disabled set.
    pub fn apply_disable_tags<I, S>(&mut self, tags: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.disabled_tags.extend(tags.into_iter().map(Into::into));
    }

    /// Removes tags from the disabled set.
    pub fn apply_enable_tags<I, S>(&mut self, tags: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for tag in tags {
            self.disabled_tags.remove(tag.as_ref());
        }
    }

    /// Applies a delta in the fixed order.
    pub fn apply_delta(&mut self, delta: &OverlayDelta) {
        self.apply_disable_ids(delta.disable_ids.iter().cloned());
        self.apply_enable_ids(&delta.enable_ids);
        self.apply_disable_tags(delta.disable_tags.iter().cloned());
        self.apply_enable_tags(&delta.enable_tags);
    }

    /// Returns true if a node with this identity is not disabled.
    #[must_use]
    pub fn permits(&self, component_id: Option<&str>, tags: &BTreeSet<String>) -> bool {
        if component_id.is_some_and(|id| self.disabled_ids.contains(id)) {
            return false;
        }
        self.disabled_tags.is_disjoint(tags)
    }

    /// Disabled ids, sorted.
    pub fn disabled_ids(&self) -> impl Iterator<Item = &str> {
        self.disabled_ids.iter().map(String::as_str)
    }

    /// Disabled tags, sorted.
    pub fn disabled_tags(&self) -> impl Iterator<Item = &str> {
        self.disabled_tags.iter().map(String::as_str)
    }
}
