use std::{fmt::Display, str::FromStr};

use nested_set_storage::NodeId;

use crate::NestedSetError;

/// Where a node goes relative to its target, without the target itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Immediately before the target, as its sibling
    Left,
    /// Immediately after the target, as its sibling
    Right,
    /// As the last child of the target
    Child,
    /// As a root
    Root,
}

impl FromStr for Placement {
    type Err = NestedSetError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        match token {
            "left" => Ok(Placement::Left),
            "right" => Ok(Placement::Right),
            "child" => Ok(Placement::Child),
            "root" => Ok(Placement::Root),
            other => Err(NestedSetError::UnknownPosition(other.to_owned())),
        }
    }
}

impl Display for Placement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let token = match self {
            Placement::Left => "left",
            Placement::Right => "right",
            Placement::Child => "child",
            Placement::Root => "root",
        };
        write!(f, "{token}")
    }
}

/// The destination of a move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MovePosition<Id> {
    /// Become the left sibling of the target
    LeftOf(Id),
    /// Become the right sibling of the target
    RightOf(Id),
    /// Become the last child of the target
    ChildOf(Id),
    /// Become a root of the scope
    Root,
}

impl<Id> MovePosition<Id>
where
    Id: NodeId,
{
    /// Combine a position token (`left`, `right`, `child` or `root`) with an
    /// optional target
    pub fn from_token(token: &str, target: Option<Id>) -> Result<Self, NestedSetError> {
        let placement = Placement::from_str(token)?;
        match (placement, target) {
            (Placement::Root, _) => Ok(MovePosition::Root),
            (Placement::Left, Some(target)) => Ok(MovePosition::LeftOf(target)),
            (Placement::Right, Some(target)) => Ok(MovePosition::RightOf(target)),
            (Placement::Child, Some(target)) => Ok(MovePosition::ChildOf(target)),
            (placement, None) => Err(NestedSetError::MissingTarget(placement.to_string())),
        }
    }

    /// The placement part of this position
    pub fn placement(&self) -> Placement {
        match self {
            MovePosition::LeftOf(_) => Placement::Left,
            MovePosition::RightOf(_) => Placement::Right,
            MovePosition::ChildOf(_) => Placement::Child,
            MovePosition::Root => Placement::Root,
        }
    }

    /// The target of this position, if it has one
    pub fn target(&self) -> Option<&Id> {
        match self {
            MovePosition::LeftOf(target)
            | MovePosition::RightOf(target)
            | MovePosition::ChildOf(target) => Some(target),
            MovePosition::Root => None,
        }
    }
}
