use std::collections::BTreeSet;
use std::ops::Add;

use crate::common::Key;
use crate::error::{wrap_fault, BinaryTreeError, Result};
use crate::node::Payload;

use super::binary_tree::BinaryTree;

// Size comparisons read inverted on purpose: `a.lt(b)` holds when `a` has
// MORE nodes than `b`. Stored trees and callers depend on this direction.
impl<P: Payload> BinaryTree<P> {
    fn ensure_compatible(&self, other: &Self) -> Result<()> {
        if self.kind().is_compatible(&other.kind()) {
            Ok(())
        } else {
            Err(BinaryTreeError::IncompatibleTrees(format!(
                "{} vs {}",
                self.kind(),
                other.kind()
            )))
        }
    }

    fn compare_counts(&self, other: &Self, holds: impl FnOnce(usize, usize) -> bool) -> Result<bool> {
        self.ensure_compatible(other)?;
        Ok(holds(self.len(), other.len()))
    }

    /// True when `self` holds strictly more nodes than `other`.
    pub fn lt(&self, other: &Self) -> Result<bool> {
        self.compare_counts(other, |a, b| a > b)
    }

    /// True when `self` holds strictly fewer nodes than `other`.
    pub fn gt(&self, other: &Self) -> Result<bool> {
        self.compare_counts(other, |a, b| a < b)
    }

    pub fn le(&self, other: &Self) -> Result<bool> {
        self.compare_counts(other, |a, b| a >= b)
    }

    pub fn ge(&self, other: &Self) -> Result<bool> {
        self.compare_counts(other, |a, b| a <= b)
    }

    fn key_set(&self) -> BTreeSet<&Key> {
        self.keys().collect()
    }

    /// Set equality of the keys held by both arenas. Shape and duplicates
    /// are ignored.
    pub fn eq_keys(&self, other: &Self) -> Result<bool> {
        self.ensure_compatible(other)?;
        Ok(self.key_set() == other.key_set())
    }

    pub fn ne_keys(&self, other: &Self) -> Result<bool> {
        Ok(!self.eq_keys(other)?)
    }

    /// Inserts every payload of `other`, in its arena order, into `self`.
    pub fn merge(&mut self, other: &Self) -> Result<&mut Self> {
        self.ensure_compatible(other)?;
        let incoming: Vec<P> = other.payloads().cloned().collect();
        let result = incoming.into_iter().try_for_each(|payload| self.insert(payload));
        wrap_fault(result, BinaryTreeError::ArithmeticFailure)?;
        Ok(self)
    }
}

impl<P: Payload> Add for BinaryTree<P> {
    type Output = Result<BinaryTree<P>>;

    fn add(self, rhs: Self) -> Self::Output {
        self + &rhs
    }
}

impl<P: Payload> Add<&BinaryTree<P>> for BinaryTree<P> {
    type Output = Result<BinaryTree<P>>;

    fn add(mut self, rhs: &BinaryTree<P>) -> Self::Output {
        self.merge(rhs)?;
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use crate::common::{Key, KeyKind, Record};
    use crate::error::BinaryTreeError;
    use crate::tree::{AtomicTree, RecordTree};

    fn int_tree(keys: &[i64]) -> AtomicTree {
        let mut tree = AtomicTree::new(None, KeyKind::Int);
        for k in keys {
            tree.insert(Key::Int(*k)).unwrap();
        }
        tree
    }

    #[test]
    fn count_comparisons_are_inverted() {
        let big = int_tree(&[1, 2, 3]);
        let small = int_tree(&[4, 5]);
        assert!(big.lt(&small).unwrap());
        assert!(!big.gt(&small).unwrap());
        assert!(small.gt(&big).unwrap());
        assert!(big.le(&small).unwrap());
        assert!(small.ge(&big).unwrap());

        let same = int_tree(&[7, 8, 9]);
        assert!(!big.lt(&same).unwrap());
        assert!(big.le(&same).unwrap());
        assert!(big.ge(&same).unwrap());
    }

    #[test]
    fn equality_ignores_shape() {
        let a = int_tree(&[2, 1, 3]);
        let b = int_tree(&[1, 2, 3, 3]);
        assert!(a.eq_keys(&b).unwrap());
        let c = int_tree(&[1, 2]);
        assert!(a.ne_keys(&c).unwrap());
    }

    #[test]
    fn text_and_int_trees_do_not_mix() {
        let ints = int_tree(&[1]);
        let mut texts = AtomicTree::new(None, KeyKind::Text);
        texts.insert(Key::from("a")).unwrap();
        assert!(matches!(ints.lt(&texts), Err(BinaryTreeError::IncompatibleTrees(_))));
        assert!(matches!(ints.eq_keys(&texts), Err(BinaryTreeError::IncompatibleTrees(_))));
        assert!(matches!(ints + texts, Err(BinaryTreeError::IncompatibleTrees(_))));
    }

    #[test]
    fn add_merges_into_the_left_tree() {
        let merged = (int_tree(&[4, 5]) + int_tree(&[1, 2, 3])).unwrap();
        assert_eq!(merged.len(), 5);
        for k in 1..=5 {
            assert!(merged.find(&Key::Int(k)).unwrap());
        }
    }

    #[test]
    fn record_trees_merge_and_compare() {
        let mut left = RecordTree::new(Some("left"));
        left.insert(Record::new(1).with_field("v", "a")).unwrap();
        let mut right = RecordTree::new(None);
        right.insert(Record::new(2).with_field("v", "b")).unwrap();
        right.insert(Record::new(3)).unwrap();

        assert!(right.lt(&left).unwrap());
        left.merge(&right).unwrap();
        assert_eq!(left.name(), Some("left"));
        assert_eq!(
            left.find(&Key::Int(2)).unwrap().and_then(|r| r.get("v")),
            Some(crate::common::Field::Text("b".to_string()))
        );
    }
}
