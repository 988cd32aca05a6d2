//! Points-to sets
//!
//! Sorted-vec sparse representation. Sets only grow during solving; that
//! append-only discipline over a finite instance universe is what bounds
//! the fixpoint.
//!
//! - Insert: O(n) worst case, O(log n) for the common already-present probe
//! - Union: O(n + m) sorted merge
//! - Iteration: sorted, duplicate-free

use crate::shared::models::InstId;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointsToSet {
    elements: Vec<InstId>,
}

impl PointsToSet {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn singleton(element: InstId) -> Self {
        Self {
            elements: vec![element],
        }
    }

    /// Insert an element. Returns true if the set grew.
    #[inline]
    pub fn insert(&mut self, element: InstId) -> bool {
        match self.elements.binary_search(&element) {
            Ok(_) => false,
            Err(pos) => {
                self.elements.insert(pos, element);
                true
            }
        }
    }

    #[inline]
    pub fn contains(&self, element: InstId) -> bool {
        self.elements.binary_search(&element).is_ok()
    }

    /// Union another set in. Returns true if this set grew.
    pub fn union_with(&mut self, other: &PointsToSet) -> bool {
        if other.elements.is_empty() {
            return false;
        }
        if self.elements.is_empty() {
            self.elements = other.elements.clone();
            return true;
        }

        let mut merged = Vec::with_capacity(self.elements.len() + other.elements.len());
        let (mut i, mut j) = (0, 0);
        let mut grew = false;
        while i < self.elements.len() && j < other.elements.len() {
            match self.elements[i].cmp(&other.elements[j]) {
                Ordering::Less => {
                    merged.push(self.elements[i]);
                    i += 1;
                }
                Ordering::Greater => {
                    merged.push(other.elements[j]);
                    j += 1;
                    grew = true;
                }
                Ordering::Equal => {
                    merged.push(self.elements[i]);
                    i += 1;
                    j += 1;
                }
            }
        }
        merged.extend_from_slice(&self.elements[i..]);
        if j < other.elements.len() {
            grew = true;
            merged.extend_from_slice(&other.elements[j..]);
        }

        self.elements = merged;
        grew
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = InstId> + '_ {
        self.elements.iter().copied()
    }

    #[inline]
    pub fn as_slice(&self) -> &[InstId] {
        &self.elements
    }
}

impl FromIterator<InstId> for PointsToSet {
    fn from_iter<T: IntoIterator<Item = InstId>>(iter: T) -> Self {
        let mut elements: Vec<InstId> = iter.into_iter().collect();
        elements.sort_unstable();
        elements.dedup();
        Self { elements }
    }
}
