use crate::cell::Cell;

/// Ways an inconsistent stream of observations can break the knowledge base.
///
/// None of these are recoverable: once returned from a mutating call, the
/// knowledge base refuses further updates with [`KnowledgeError::Poisoned`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum KnowledgeError {
    #[error("contradiction: {count} mines claimed among {} cells", .cells.len())]
    Contradiction { count: isize, cells: Vec<Cell> },
    #[error("cell {cell} is both a known mine and known safe")]
    Conflict { cell: Cell },
    #[error("cell {cell} is a known mine and cannot be observed")]
    ObservedMine { cell: Cell },
    #[error("cell {cell} reported {second} nearby mines after reporting {first}")]
    InconsistentObservation { cell: Cell, first: u8, second: u8 },
    #[error("cell {cell} is outside a {height}x{width} board")]
    OutOfBounds {
        cell: Cell,
        height: usize,
        width: usize,
    },
    #[error("knowledge base was invalidated by an earlier contradiction")]
    Poisoned,
}

pub type Result<T> = std::result::Result<T, KnowledgeError>;
