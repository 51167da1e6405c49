/*!
 The set façade over the item graph.

 Sets carry no ordering guarantee in the format, but the backing sequence
 preserves decode or insertion order so traversal and re-encoding are
 deterministic. The wire layout is identical to an array apart from the
 marker nibble.
*/

use std::cell::{Cell, Ref, RefCell};
use std::rc::Rc;

use crate::plist::models::{Item, ItemRef};

/// An unordered collection of items
#[derive(Debug, Default)]
pub struct BpSet {
    items: RefCell<Vec<ItemRef>>,
    child_refs: Vec<u64>,
    expanded: Cell<bool>,
}

impl BpSet {
    pub fn new() -> Self {
        Self {
            items: RefCell::new(Vec::new()),
            child_refs: Vec::new(),
            expanded: Cell::new(true),
        }
    }

    /// A set shell holding only child references, produced by the decoder
    pub(crate) fn unexpanded(child_refs: Vec<u64>) -> Self {
        Self {
            items: RefCell::new(Vec::with_capacity(child_refs.len())),
            child_refs,
            expanded: Cell::new(false),
        }
    }

    pub(crate) fn child_refs(&self) -> &[u64] {
        &self.child_refs
    }

    pub(crate) fn is_expanded(&self) -> bool {
        self.expanded.get()
    }

    pub(crate) fn push_resolved(&self, item: ItemRef) {
        self.items.borrow_mut().push(item);
    }

    pub(crate) fn mark_expanded(&self) {
        self.expanded.set(true);
    }

    /// Add a value and return the set for chaining
    pub fn with(self, item: impl Into<Item>) -> Self {
        self.push(item);
        self
    }

    pub fn push(&self, item: impl Into<Item>) {
        self.items.borrow_mut().push(Rc::new(item.into()));
    }

    pub fn push_item(&self, item: ItemRef) {
        self.items.borrow_mut().push(item);
    }

    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }

    /// Borrow the backing sequence for iteration
    pub fn items(&self) -> Ref<'_, Vec<ItemRef>> {
        self.items.borrow()
    }

    pub fn into_item(self) -> ItemRef {
        Rc::new(Item::Set(self))
    }
}

impl PartialEq for BpSet {
    fn eq(&self, other: &Self) -> bool {
        *self.items.borrow() == *other.items.borrow()
    }
}

impl Clone for BpSet {
    fn clone(&self) -> Self {
        Self {
            items: RefCell::new(self.items.borrow().clone()),
            child_refs: self.child_refs.clone(),
            expanded: Cell::new(self.expanded.get()),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::plist::set::BpSet;

    #[test]
    fn test_with_preserves_insertion_order() {
        let set = BpSet::new().with(3).with(1).with(2);

        assert_eq!(set.len(), 3);
        let values: Vec<i64> = set
            .items()
            .iter()
            .filter_map(|item| item.long_value())
            .collect();
        assert_eq!(values, vec![3, 1, 2]);
    }
}
