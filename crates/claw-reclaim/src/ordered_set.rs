//! A priority container parameterized by a runtime comparator.
//!
//! [`std::collections::BinaryHeap`] requires its element type to implement
//! `Ord`, but spec §4.1/§9 requires the comparator to be supplied by the
//! session at construction time — different sessions order the same
//! `Queue`/`Job`/`Task` types differently. [`OrderedSet`] is a small
//! array-backed binary heap using the same sift-up/sift-down shape as the
//! standard heap, but holding a boxed `less` closure instead of relying on
//! a trait impl.

/// A priority-ordered container over `T`, max-heap under the supplied
/// `less` comparator: `pop` always removes an element `x` such that no
/// remaining element `y` has `less(x, y)`.
///
/// No duplicate detection is performed; callers are responsible for
/// uniqueness where the algorithm requires it. Pop order among elements
/// the comparator considers equal is unspecified (spec §4.1: "stability is
/// not required").
pub struct OrderedSet<'a, T> {
    items: Vec<T>,
    less: Box<dyn Fn(&T, &T) -> bool + 'a>,
}

impl<'a, T> OrderedSet<'a, T> {
    /// Creates an empty ordered set using `less(a, b)` to mean "a has lower
    /// priority than b". The comparator may borrow from its environment
    /// (for instance a `&Session`), hence the `'a` lifetime rather than a
    /// `'static` bound.
    pub fn new(less: impl Fn(&T, &T) -> bool + 'a) -> Self {
        Self {
            items: Vec::new(),
            less: Box::new(less),
        }
    }

    /// Inserts `item`.
    pub fn push(&mut self, item: T) {
        self.items.push(item);
        self.sift_up(self.items.len() - 1);
    }

    /// Removes and returns a maximum element under the comparator, or
    /// `None` if empty.
    pub fn pop(&mut self) -> Option<T> {
        if self.items.is_empty() {
            return None;
        }
        let last = self.items.len() - 1;
        self.items.swap(0, last);
        let top = self.items.pop();
        if !self.items.is_empty() {
            self.sift_down(0);
        }
        top
    }

    /// Returns true if the set holds no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    fn sift_up(&mut self, mut i: usize) {
        while i > 0 {
            let parent = (i - 1) / 2;
            if (self.less)(&self.items[parent], &self.items[i]) {
                self.items.swap(parent, i);
                i = parent;
            } else {
                break;
            }
        }
    }

    fn sift_down(&mut self, mut i: usize) {
        let len = self.items.len();
        loop {
            let left = 2 * i + 1;
            let right = 2 * i + 2;
            let mut largest = i;
            if left < len && (self.less)(&self.items[largest], &self.items[left]) {
                largest = left;
            }
            if right < len && (self.less)(&self.items[largest], &self.items[right]) {
                largest = right;
            }
            if largest == i {
                break;
            }
            self.items.swap(i, largest);
            i = largest;
        }
    }
}
