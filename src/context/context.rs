//! The immutable, ordered, keyed element bag.

use super::{ContextElement, Key};
use core::fmt;
use smallvec::SmallVec;
use std::ops::Add;
use std::slice;

/// An immutable, ordered composition of [`ContextElement`]s.
///
/// A context holds at most one element per [`Key`]. Composing with an
/// element whose key is already present replaces the earlier element in
/// place, keeping its position. All composition produces a new context;
/// a parent is never affected by its children extending theirs.
///
/// Contexts in the wild carry zero, one, or two elements, so storage is an
/// inline small-vector that spills to the heap only beyond two.
#[derive(Clone, Default)]
pub struct Context {
    elements: SmallVec<[ContextElement; 2]>,
}

impl Context {
    /// Creates an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of elements in this context.
    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// True when the context carries no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Looks up the element stored under `key`, if any.
    #[must_use]
    pub fn get(&self, key: Key) -> Option<&ContextElement> {
        self.elements.iter().find(|e| e.key() == key)
    }

    /// Returns a new context with `element` added.
    ///
    /// An existing element with the same key is replaced in place.
    #[must_use]
    pub fn with(&self, element: ContextElement) -> Self {
        let mut next = self.clone();
        if let Some(slot) = next.elements.iter_mut().find(|e| e.key() == element.key()) {
            *slot = element;
        } else {
            next.elements.push(element);
        }
        next
    }

    /// Returns a new context combining `self` with every element of
    /// `other`, in `other`'s order. On key collisions `other` wins.
    #[must_use]
    pub fn merge(&self, other: &Self) -> Self {
        let mut merged = self.clone();
        for element in other {
            merged = merged.with(element.clone());
        }
        merged
    }

    /// Iterates elements in composition order.
    pub fn iter(&self) -> slice::Iter<'_, ContextElement> {
        self.elements.iter()
    }
}

impl Add<ContextElement> for Context {
    type Output = Self;

    fn add(self, element: ContextElement) -> Self {
        self.with(element)
    }
}

impl Add<&Self> for Context {
    type Output = Self;

    fn add(self, other: &Self) -> Self {
        self.merge(other)
    }
}

impl<'a> IntoIterator for &'a Context {
    type Item = &'a ContextElement;
    type IntoIter = slice::Iter<'a, ContextElement>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl fmt::Debug for Context {
    // Payloads are opaque; the Debug form lists keys only.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.elements.iter().map(ContextElement::key))
            .finish()
    }
}
