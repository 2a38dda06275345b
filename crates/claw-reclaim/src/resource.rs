//! Resource vectors over named dimensions.
//!
//! A [`Resource`] tracks non-negative quantities keyed by dimension name
//! (`cpu`, `memory`, and any extended key a cluster wants). It supports
//! the operations the reclaim algorithm needs: cheap cloning, addition
//! (used to accumulate what a round of eviction has freed), and the
//! "zero tolerance" `≤` comparison the minimality check in spec §4.3/§9
//! relies on.

use std::collections::BTreeMap;

/// Well-known dimension name for CPU, in millicores.
pub const CPU: &str = "cpu";
/// Well-known dimension name for memory, in bytes.
pub const MEMORY: &str = "memory";

/// A non-negative vector over named resource dimensions.
///
/// Dimensions absent from the map are treated as zero. Arithmetic
/// saturates at zero and at `i64::MAX` rather than panicking or wrapping,
/// since a resource vector is assumed quantity, not a signed balance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resource {
    dims: BTreeMap<String, i64>,
}

impl Resource {
    /// Creates an all-zero resource vector.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Creates a resource vector from `(dimension, quantity)` pairs.
    #[must_use]
    pub fn new(dims: impl IntoIterator<Item = (impl Into<String>, i64)>) -> Self {
        let mut map = BTreeMap::new();
        for (k, v) in dims {
            map.insert(k.into(), v.max(0));
        }
        Self { dims: map }
    }

    /// Convenience constructor for a `{cpu, memory}` vector.
    #[must_use]
    pub fn cpu_mem(cpu_millicores: i64, memory_bytes: i64) -> Self {
        Self::new([(CPU, cpu_millicores), (MEMORY, memory_bytes)])
    }

    /// Returns the quantity along `dimension`, or zero if absent.
    #[must_use]
    pub fn get(&self, dimension: &str) -> i64 {
        self.dims.get(dimension).copied().unwrap_or(0)
    }

    /// Sets the quantity along `dimension`, clamped to non-negative.
    pub fn set(&mut self, dimension: impl Into<String>, quantity: i64) {
        self.dims.insert(dimension.into(), quantity.max(0));
    }

    /// Returns the sum of `self` and `other`, dimension-wise.
    #[must_use]
    pub fn add(&self, other: &Self) -> Self {
        let mut result = self.dims.clone();
        for (dim, qty) in &other.dims {
            let entry = result.entry(dim.clone()).or_insert(0);
            *entry = entry.saturating_add(*qty);
        }
        Self { dims: result }
    }

    /// Returns true if every dimension of `self` is less than or equal to
    /// the corresponding dimension of `other`, with the "zero tolerance"
    /// mask: a dimension whose request in `self` is already `<= 0` is
    /// treated as satisfied regardless of `other`, matching the scheduler
    /// convention that a zero or negative request can never be the reason
    /// a `≤` check fails.
    #[must_use]
    pub fn less_equal_zero(&self, other: &Self) -> bool {
        for (dim, qty) in &self.dims {
            if *qty <= 0 {
                continue;
            }
            if *qty > other.get(dim) {
                return false;
            }
        }
        true
    }

    /// Returns true if every dimension is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.dims.values().all(|v| *v == 0)
    }

    /// Iterates over the non-zero dimensions.
    pub fn dimensions(&self) -> impl Iterator<Item = (&str, i64)> {
        self.dims
            .iter()
            .filter(|(_, v)| **v != 0)
            .map(|(k, v)| (k.as_str(), *v))
    }
}

impl std::fmt::Display for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{")?;
        for (i, (dim, qty)) in self.dims.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{dim}={qty}")?;
        }
        write!(f, "}}")
    }
}
