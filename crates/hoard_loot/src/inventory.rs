//! # Inventory Fill
//!
//! The single downstream consumer of generated loot. The generator decides
//! *what* drops; the inventory decides *where* it goes.
//!
//! Slots are allocated when the inventory is created. Filling never grows the
//! inventory: whatever does not fit is handed back to the caller.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use hoard_core::{shuffle, RandomSource};
use serde::Deserialize;

use crate::schema::{ContentPreset, LootDrop};

/// Stack size used when nothing else is known about an item.
pub const DEFAULT_MAX_STACK: u32 = 64;

/// Per-item placement rules.
pub trait ItemRules {
    /// Category used by slot accept lists, if the item has one.
    fn category(&self, preset: &ContentPreset) -> Option<&str>;

    /// Largest stack one slot may hold. Values below 1 are treated as 1.
    fn max_stack(&self, preset: &ContentPreset) -> u32;
}

/// Authored rules for one item.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ItemDef {
    /// Slot category.
    #[serde(default)]
    pub category: Option<String>,
    /// Stack limit; the catalog default when absent.
    #[serde(default)]
    pub max_stack: Option<u32>,
}

/// Item rules keyed by preset id, with a fallback stack size.
#[derive(Clone, Debug)]
pub struct ItemCatalog {
    items: BTreeMap<String, ItemDef>,
    default_max_stack: u32,
}

impl ItemCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new(default_max_stack: u32) -> Self {
        Self {
            items: BTreeMap::new(),
            default_max_stack,
        }
    }

    /// Adds or replaces the rules for one item.
    pub fn insert(&mut self, preset: impl Into<String>, def: ItemDef) {
        self.items.insert(preset.into(), def);
    }

    /// Number of items with explicit rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if no item has explicit rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl Default for ItemCatalog {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_STACK)
    }
}

impl ItemRules for ItemCatalog {
    fn category(&self, preset: &ContentPreset) -> Option<&str> {
        self.items.get(preset.as_str())?.category.as_deref()
    }

    fn max_stack(&self, preset: &ContentPreset) -> u32 {
        self.items
            .get(preset.as_str())
            .and_then(|def| def.max_stack)
            .unwrap_or(self.default_max_stack)
    }
}

/// A stack of one preset in a slot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ItemStack {
    /// The preset stored.
    pub preset: ContentPreset,
    /// Number of items in this stack.
    pub count: u32,
}

/// One inventory slot.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Slot {
    accepts: BTreeSet<String>,
    stack: Option<ItemStack>,
}

impl Slot {
    /// An empty slot that takes any item.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty slot restricted to the given categories.
    ///
    /// An empty list accepts anything.
    #[must_use]
    pub fn accepting<I, S>(categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            accepts: categories.into_iter().map(Into::into).collect(),
            stack: None,
        }
    }

    /// Returns true if an item of `category` may be placed in this slot
    /// while it is empty.
    #[must_use]
    pub fn accepts(&self, category: Option<&str>) -> bool {
        self.accepts.is_empty() || category.is_some_and(|c| self.accepts.contains(c))
    }

    /// The stack held, if any.
    #[inline]
    #[must_use]
    pub fn stack(&self) -> Option<&ItemStack> {
        self.stack.as_ref()
    }

    /// Returns true if this slot holds nothing.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stack.is_none()
    }

    /// Empties this slot.
    #[inline]
    pub fn clear(&mut self) {
        self.stack = None;
    }
}

/// A fixed set of slots.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Inventory {
    slots: Vec<Slot>,
}

impl Inventory {
    /// Creates `slot_count` unrestricted empty slots.
    #[must_use]
    pub fn new(slot_count: usize) -> Self {
        Self {
            slots: vec![Slot::new(); slot_count],
        }
    }

    /// Creates an inventory from prepared slots.
    #[must_use]
    pub fn with_slots(slots: Vec<Slot>) -> Self {
        Self { slots }
    }

    /// Total number of slots.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of occupied slots.
    #[must_use]
    pub fn used_slots(&self) -> usize {
        self.slots.iter().filter(|s| !s.is_empty()).count()
    }

    /// A slot by index.
    #[inline]
    #[must_use]
    pub fn get(&self, slot: usize) -> Option<&Slot> {
        self.slots.get(slot)
    }

    /// Iterates slots in index order.
    pub fn slots(&self) -> impl Iterator<Item = &Slot> {
        self.slots.iter()
    }

    /// Total count of a preset across all slots.
    #[must_use]
    pub fn count_item(&self, preset: &str) -> u32 {
        self.slots
            .iter()
            .filter_map(Slot::stack)
            .filter(|s| s.preset.as_str() == preset)
            .map(|s| s.count)
            .sum()
    }

    /// Empties every slot, keeping accept lists.
    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(Slot::clear);
    }

    /// Places `items` and returns what did not fit.
    ///
    /// With `shuffle`, the slot walk order is shuffled first with the shared
    /// stream (one draw per swap position). For each item, in order, the walk
    /// skips slots holding another preset and empty slots that reject the
    /// item's category, drops full slots from the walk, and tops up the first
    /// usable slot. A remainder that did not fit is placed next.
    pub fn fill<R>(
        &mut self,
        items: Vec<LootDrop>,
        shuffle_slots: bool,
        rng: &mut R,
        rules: &dyn ItemRules,
    ) -> Vec<LootDrop>
    where
        R: RandomSource + ?Sized,
    {
        let mut order: Vec<usize> = (0..self.slots.len()).collect();
        if shuffle_slots {
            shuffle(rng, &mut order);
        }

        let mut queue: VecDeque<LootDrop> = items.into();
        let mut leftovers = Vec::new();

        while let Some(item) = queue.pop_front() {
            if item.count == 0 {
                continue;
            }
            if order.is_empty() {
                leftovers.push(item);
                continue;
            }

            let max = rules.max_stack(&item.preset).max(1);
            let category = rules.category(&item.preset);
            let mut placed = false;
            let mut k = 0;

            while k < order.len() {
                let slot = &mut self.slots[order[k]];
                let held = match &slot.stack {
                    Some(stack) if stack.count >= rules.max_stack(&stack.preset).max(1) => {
                        order.remove(k);
                        continue;
                    }
                    Some(stack) if stack.preset != item.preset => {
                        k += 1;
                        continue;
                    }
                    Some(stack) => stack.count,
                    None if !slot.accepts(category) => {
                        k += 1;
                        continue;
                    }
                    None => 0,
                };

                let moved = (max - held).min(item.count);
                slot.stack = Some(ItemStack {
                    preset: item.preset.clone(),
                    count: held + moved,
                });
                if item.count > moved {
                    queue.push_front(LootDrop {
                        preset: item.preset.clone(),
                        count: item.count - moved,
                    });
                }
                placed = true;
                break;
            }

            if !placed {
                leftovers.push(item);
            }
        }

        leftovers
    }
}
