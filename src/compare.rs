//! Orderings used to place keys in an [`OrderedTree`](crate::OrderedTree).

/// A strict weak ordering over keys.
///
/// Implementations must stay irreflexive, asymmetric and transitive for as long as a tree
/// uses them. The tree never checks this, and an inconsistent ordering will scramble it.
///
/// Two keys are treated as the same key when neither is `less` than the other.
pub trait Compare<K: ?Sized> {
    fn less(&self, a: &K, b: &K) -> bool;

    /// Whether `a` and `b` are equivalent under this ordering.
    fn equivalent(&self, a: &K, b: &K) -> bool {
        !self.less(a, b) && !self.less(b, a)
    }
}

/// Ascending order, through [`Ord`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Less;

impl<K: Ord + ?Sized> Compare<K> for Less {
    fn less(&self, a: &K, b: &K) -> bool {
        a < b
    }
}

/// Descending order, through [`Ord`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Greater;

impl<K: Ord + ?Sized> Compare<K> for Greater {
    fn less(&self, a: &K, b: &K) -> bool {
        a > b
    }
}

/// Wraps any `Fn(&K, &K) -> bool` "is less than" predicate.
#[derive(Debug, Clone, Copy, Default)]
pub struct FnCompare<F>(pub F);

impl<K: ?Sized, F: Fn(&K, &K) -> bool> Compare<K> for FnCompare<F> {
    fn less(&self, a: &K, b: &K) -> bool {
        (self.0)(a, b)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stock_orderings() {
        assert!(Less.less(&1, &2));
        assert!(!Less.less(&2, &2));
        assert!(Greater.less(&2, &1));
        assert!(Less.equivalent(&3, &3));
        assert!(!Greater.equivalent(&3, &4));
    }

    #[test]
    fn test_fn_compare_by_length() {
        let by_len = FnCompare(|a: &&str, b: &&str| a.len() < b.len());
        assert!(by_len.less(&"ab", &"abc"));
        // same length means same key as far as the tree is concerned
        assert!(by_len.equivalent(&"ab", &"cd"));
    }
}
