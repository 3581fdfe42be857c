use thiserror::Error;

use crate::layout::{BoxConstraints, Size};
use crate::tree::NodeId;

/// Errors raised by layout, paint and tree mutation.
///
/// Layout failures carry `trace`, the chain of render-object kinds from the
/// root down to the node that failed (`View → Flex → Padding`).
#[derive(Debug, Error)]
pub enum Error {
    #[error("{context} was given unbounded constraints {constraints:?} (at {trace})")]
    UnboundedConstraints {
        context: String,
        constraints: BoxConstraints,
        trace: String,
    },

    #[error("constraints {constraints:?} are not normalized (at {trace})")]
    InvalidConstraints {
        constraints: BoxConstraints,
        trace: String,
    },

    #[error("size {size:?} does not satisfy {constraints:?} (at {trace})")]
    SizeOutOfBounds {
        size: Size,
        constraints: BoxConstraints,
        trace: String,
    },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("node {0:?} does not exist")]
    UnknownNode(NodeId),

    #[error("node {child:?} already has parent {parent:?}")]
    AlreadyAdopted { child: NodeId, parent: NodeId },

    #[error("adopting {child:?} under {parent:?} would create a cycle")]
    WouldCreateCycle { parent: NodeId, child: NodeId },

    #[error("{kind} node {parent:?} cannot take another child")]
    TooManyChildren { parent: NodeId, kind: &'static str },

    #[error("{child:?} is not a child of {parent:?}")]
    NotAChild { parent: NodeId, child: NodeId },

    #[error("the pipeline has no root node")]
    NoRoot,

    #[error("node {0:?} has not been laid out")]
    NotLaidOut(NodeId),
}

pub type Result<T> = std::result::Result<T, Error>;
