use crate::line::Line;

/// Errors reported by the effect coordinator.
///
/// Validation errors are returned before any hardware write happens, so a
/// rejected call leaves the lines exactly as they were.
#[derive(Debug, thiserror::Error)]
pub enum EffectError {
    /// Numeric display value outside the 7-bit range.
    #[error("number {0} is out of range, expected 0 < n < 128")]
    OutOfRange(i64),
    #[error("repeat count must be at least 1")]
    ZeroRepeat,
    #[error("line selection is empty")]
    EmptySelection,
    /// 1-based line index does not exist in the configured line set.
    #[error("line index {0} is out of range")]
    LineIndex(usize),
    #[error("line {0} is not owned by the coordinator")]
    UnknownLine(Line),
    /// `close()` was called while an effect holds the lines.
    #[error("an effect is still running")]
    Busy,
    #[error("coordinator is closed")]
    Closed,
    #[error("at least {required} lines are required, got {actual}")]
    NotEnoughLines { required: usize, actual: usize },
    #[error("at most {max} lines are supported, got {actual}")]
    TooManyLines { max: usize, actual: usize },
    #[error("line {0} is configured more than once")]
    DuplicateLine(Line),
    #[error("failed to spawn indicator worker: {0}")]
    Spawn(#[from] std::io::Error),
}

impl EffectError {
    /// Returns true for errors caused by bad caller input.
    pub const fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::OutOfRange(_)
                | Self::ZeroRepeat
                | Self::EmptySelection
                | Self::LineIndex(_)
                | Self::UnknownLine(_)
        )
    }
}

pub type Result<T, E = EffectError> = core::result::Result<T, E>;
