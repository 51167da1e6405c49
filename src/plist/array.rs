/*!
 The ordered array façade over the item graph.

 An array built through the API owns its items immediately. An array created
 by the decoder starts out holding only the object table indexes of its
 children; the decoder populates the backing sequence through its resolution
 cache exactly once, after which the array behaves like any other.
*/

use std::cell::{Cell, Ref, RefCell};
use std::rc::Rc;

use crate::plist::models::{Item, ItemRef};

/// An ordered sequence of items
#[derive(Debug, Default)]
pub struct BpArray {
    items: RefCell<Vec<ItemRef>>,
    /// Object table indexes of the children, present only on decoded arrays
    child_refs: Vec<u64>,
    expanded: Cell<bool>,
}

impl BpArray {
    pub fn new() -> Self {
        Self {
            items: RefCell::new(Vec::new()),
            child_refs: Vec::new(),
            expanded: Cell::new(true),
        }
    }

    /// An array shell holding only child references, produced by the decoder
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

    /// Attach a resolved child during expansion
    pub(crate) fn push_resolved(&self, item: ItemRef) {
        self.items.borrow_mut().push(item);
    }

    pub(crate) fn mark_expanded(&self) {
        self.expanded.set(true);
    }

    /// Append a value and return the array for chaining
    pub fn with(self, item: impl Into<Item>) -> Self {
        self.push(item);
        self
    }

    /// Append an already-shared item and return the array for chaining
    pub fn with_item(self, item: ItemRef) -> Self {
        self.push_item(item);
        self
    }

    pub fn push(&self, item: impl Into<Item>) {
        self.push_item(Rc::new(item.into()));
    }

    pub fn push_item(&self, item: ItemRef) {
        self.items.borrow_mut().push(item);
    }

    /// The item at `index`, as a shared handle
    pub fn get(&self, index: usize) -> Option<ItemRef> {
        self.items.borrow().get(index).cloned()
    }

    /// Replace the item at `index`, returning the previous item
    pub fn set(&self, index: usize, item: impl Into<Item>) -> Option<ItemRef> {
        let mut items = self.items.borrow_mut();
        let slot = items.get_mut(index)?;
        Some(std::mem::replace(slot, Rc::new(item.into())))
    }

    /// Remove and return the item at `index`
    pub fn remove(&self, index: usize) -> Option<ItemRef> {
        let mut items = self.items.borrow_mut();
        if index < items.len() {
            Some(items.remove(index))
        } else {
            None
        }
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
        Rc::new(Item::Array(self))
    }
}

impl PartialEq for BpArray {
    fn eq(&self, other: &Self) -> bool {
        // Value equality: only the resolved contents matter
        *self.items.borrow() == *other.items.borrow()
    }
}

impl Clone for BpArray {
    fn clone(&self) -> Self {
        Self {
            items: RefCell::new(self.items.borrow().clone()),
            child_refs: self.child_refs.clone(),
            expanded: Cell::new(self.expanded.get()),
        }
    }
}
