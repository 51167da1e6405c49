/*!
 The ordered dictionary façade over the item graph.

 Keys are compared by their canonical text: anything key-like normalizes to
 text through [`DictKey`] before insertion or lookup, so a symbolic key and
 the literal string it renders to land on the same slot. Entries preserve
 insertion order and a hash index keeps lookup O(1).
*/

use std::cell::{Cell, Ref, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use crate::plist::models::{BpString, Item, ItemRef};

/// Anything that can act as a dictionary key
///
/// Implementations produce the canonical text form the dictionary stores
/// and compares by. Implement this for symbolic key types (enums of known
/// field names) to avoid scattering string literals.
pub trait DictKey {
    fn to_key(&self) -> BpString;
}

impl DictKey for &str {
    fn to_key(&self) -> BpString {
        BpString::new(*self)
    }
}

impl DictKey for String {
    fn to_key(&self) -> BpString {
        BpString::new(self.as_str())
    }
}

impl DictKey for BpString {
    fn to_key(&self) -> BpString {
        self.clone()
    }
}

impl DictKey for &BpString {
    fn to_key(&self) -> BpString {
        (*self).clone()
    }
}

/// Conversion used by the non-throwing typed lookup [`BpDict::get_or`]
pub trait FromItem: Sized {
    fn from_item(item: &Item) -> Option<Self>;
}

impl FromItem for bool {
    fn from_item(item: &Item) -> Option<Self> {
        item.as_bool()
    }
}

impl FromItem for i32 {
    fn from_item(item: &Item) -> Option<Self> {
        item.int_value()
    }
}

impl FromItem for i64 {
    fn from_item(item: &Item) -> Option<Self> {
        item.long_value()
    }
}

impl FromItem for f32 {
    fn from_item(item: &Item) -> Option<Self> {
        item.as_real().map(|value| value as f32)
    }
}

impl FromItem for f64 {
    fn from_item(item: &Item) -> Option<Self> {
        item.as_real()
    }
}

impl FromItem for String {
    fn from_item(item: &Item) -> Option<Self> {
        item.as_str().map(String::from)
    }
}

impl FromItem for Vec<u8> {
    fn from_item(item: &Item) -> Option<Self> {
        item.as_data().map(Vec::from)
    }
}

/// An insertion-ordered mapping from string keys to items
#[derive(Debug, Default)]
pub struct BpDict {
    /// Key and value handles in insertion order; keys are always `Item::String`
    entries: RefCell<Vec<(ItemRef, ItemRef)>>,
    /// Canonical key text to entry position
    index: RefCell<HashMap<String, usize>>,
    key_refs: Vec<u64>,
    value_refs: Vec<u64>,
    expanded: Cell<bool>,
}

impl BpDict {
    pub fn new() -> Self {
        Self {
            entries: RefCell::new(Vec::new()),
            index: RefCell::new(HashMap::new()),
            key_refs: Vec::new(),
            value_refs: Vec::new(),
            expanded: Cell::new(true),
        }
    }

    /// A dictionary shell holding only key and value references, produced
    /// by the decoder
    pub(crate) fn unexpanded(key_refs: Vec<u64>, value_refs: Vec<u64>) -> Self {
        Self {
            entries: RefCell::new(Vec::with_capacity(key_refs.len())),
            index: RefCell::new(HashMap::with_capacity(key_refs.len())),
            key_refs,
            value_refs,
            expanded: Cell::new(false),
        }
    }

    pub(crate) fn key_refs(&self) -> &[u64] {
        &self.key_refs
    }

    pub(crate) fn value_refs(&self) -> &[u64] {
        &self.value_refs
    }

    pub(crate) fn is_expanded(&self) -> bool {
        self.expanded.get()
    }

    /// Attach a resolved entry during expansion. The key handle must hold
    /// an `Item::String`; the decoder rejects anything else before calling.
    pub(crate) fn push_resolved(&self, text: &str, key: ItemRef, value: ItemRef) {
        let mut entries = self.entries.borrow_mut();
        let mut index = self.index.borrow_mut();
        if let Some(position) = index.get(text) {
            entries[*position].1 = value;
        } else {
            index.insert(text.to_string(), entries.len());
            entries.push((key, value));
        }
    }

    pub(crate) fn mark_expanded(&self) {
        self.expanded.set(true);
    }

    /// Insert a value and return the dictionary for chaining
    pub fn with(self, key: impl DictKey, value: impl Into<Item>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert an already-shared item and return the dictionary for chaining
    pub fn with_item(self, key: impl DictKey, value: ItemRef) -> Self {
        self.insert_item(key, value);
        self
    }

    /// Insert a value, returning the value it displaced if the canonical
    /// key text was already present
    pub fn insert(&self, key: impl DictKey, value: impl Into<Item>) -> Option<ItemRef> {
        self.insert_item(key, Rc::new(value.into()))
    }

    pub fn insert_item(&self, key: impl DictKey, value: ItemRef) -> Option<ItemRef> {
        let key = key.to_key();
        let mut entries = self.entries.borrow_mut();
        let mut index = self.index.borrow_mut();
        if let Some(position) = index.get(key.as_str()) {
            let slot = &mut entries[*position].1;
            Some(std::mem::replace(slot, value))
        } else {
            index.insert(key.as_str().to_string(), entries.len());
            entries.push((Rc::new(Item::String(key)), value));
            None
        }
    }

    /// The value stored under the key's canonical text, if any
    pub fn get(&self, key: impl DictKey) -> Option<ItemRef> {
        let key = key.to_key();
        let entries = self.entries.borrow();
        let index = self.index.borrow();
        index
            .get(key.as_str())
            .map(|position| entries[*position].1.clone())
    }

    /// Typed lookup that never fails: a missing key or a value of the wrong
    /// shape both resolve to `default`
    pub fn get_or<T: FromItem>(&self, key: impl DictKey, default: T) -> T {
        self.get(key)
            .and_then(|item| T::from_item(&item))
            .unwrap_or(default)
    }

    pub fn contains_key(&self, key: impl DictKey) -> bool {
        let key = key.to_key();
        self.index.borrow().contains_key(key.as_str())
    }

    /// Remove the entry stored under the key, returning its value
    pub fn remove(&self, key: impl DictKey) -> Option<ItemRef> {
        let key = key.to_key();
        let mut entries = self.entries.borrow_mut();
        let mut index = self.index.borrow_mut();
        let position = index.remove(key.as_str())?;
        let (_, value) = entries.remove(position);
        for slot in index.values_mut() {
            if *slot > position {
                *slot -= 1;
            }
        }
        Some(value)
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Borrow the entries in insertion order
    pub fn entries(&self) -> Ref<'_, Vec<(ItemRef, ItemRef)>> {
        self.entries.borrow()
    }

    pub fn into_item(self) -> ItemRef {
        Rc::new(Item::Dict(self))
    }
}

impl PartialEq for BpDict {
    fn eq(&self, other: &Self) -> bool {
        *self.entries.borrow() == *other.entries.borrow()
    }
}

impl Clone for BpDict {
    fn clone(&self) -> Self {
        Self {
            entries: RefCell::new(self.entries.borrow().clone()),
            index: RefCell::new(self.index.borrow().clone()),
            key_refs: self.key_refs.clone(),
            value_refs: self.value_refs.clone(),
            expanded: Cell::new(self.expanded.get()),
        }
    }
}
