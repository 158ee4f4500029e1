use nested_set_storage::{Boundary, NestedSetNode};

use crate::NestedSetError;

/// The closed `[left, right]` interval a node occupies on the boundary line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Interval {
    /// The left boundary
    pub left: Boundary,
    /// The right boundary
    pub right: Boundary,
}

impl Interval {
    /// Construct an interval from its two boundaries
    pub fn new(left: Boundary, right: Boundary) -> Self {
        Self { left, right }
    }

    /// The allocated interval of `node`
    pub fn of<Node>(node: &Node) -> Result<Self, NestedSetError>
    where
        Node: NestedSetNode + ?Sized,
    {
        match (node.left(), node.right()) {
            (Some(left), Some(right)) => Ok(Self { left, right }),
            _ => Err(NestedSetError::Unallocated(format!("{}", node.id()))),
        }
    }

    /// The number of boundary positions the interval covers, itself included
    pub fn width(&self) -> Boundary {
        self.right - self.left + 1
    }

    /// True if `boundary` lies within the interval, ends included
    pub fn encloses(&self, boundary: Boundary) -> bool {
        self.left <= boundary && boundary <= self.right
    }

    /// True if the interval holds no other node
    pub fn is_leaf(&self) -> bool {
        self.right - self.left == 1
    }
}

#[cfg(test)]
mod tests {
    use nested_set_storage::Node;

    use crate::{Interval, NestedSetError};

    #[test]
    fn it_measures_width_including_both_ends() {
        assert_eq!(Interval::new(2, 5).width(), 4);
        assert!(Interval::new(3, 4).is_leaf());
        assert!(!Interval::new(2, 5).is_leaf());
    }

    #[test]
    fn it_refuses_unallocated_nodes() {
        let result = Interval::of(&Node::new(1u64));

        assert!(matches!(result, Err(NestedSetError::Unallocated(_))));
    }
}
