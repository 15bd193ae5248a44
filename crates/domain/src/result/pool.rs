//! Bundle number allocation pool.

use std::collections::BTreeSet;

/// Tracks the bundle numbers of one numbering scope.
///
/// A number is "in use" iff it is in the allocated set and not in the freed
/// set. Freeing re-admits a number for exactly one reuse; re-claiming it
/// removes it from the freed set again. The pool never forgets an allocated
/// number, so automatic generation is monotonic over the life of the result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BundleNumberPool {
    allocated: BTreeSet<u32>,
    freed: BTreeSet<u32>,
}

impl BundleNumberPool {
    /// Returns the next number for automatic generation:
    /// `max(allocated) + 1`, or 1 for an empty pool.
    pub fn next_number(&self) -> u32 {
        self.allocated.last().map_or(1, |max| max + 1)
    }

    /// Returns true if the number is currently in use by a bundle.
    pub fn is_in_use(&self, number: u32) -> bool {
        self.allocated.contains(&number) && !self.freed.contains(&number)
    }

    /// Returns true if the number may be claimed: either never allocated,
    /// or allocated and subsequently freed.
    pub fn can_claim(&self, number: u32) -> bool {
        !self.allocated.contains(&number) || self.freed.contains(&number)
    }

    /// Returns true if the number is allocated and can be freed.
    pub fn can_free(&self, number: u32) -> bool {
        self.is_in_use(number)
    }

    /// Marks the number as in use.
    pub fn claim(&mut self, number: u32) {
        self.allocated.insert(number);
        self.freed.remove(&number);
    }

    /// Re-admits the number for reuse.
    pub fn free(&mut self, number: u32) {
        self.freed.insert(number);
    }

    /// Returns the numbers currently in use, ascending.
    pub fn numbers_in_use(&self) -> impl Iterator<Item = u32> + '_ {
        self.allocated
            .iter()
            .copied()
            .filter(|n| !self.freed.contains(n))
    }
}
