//! Error kinds and thread-local "last error" surface.
//!
//! PurC surfaces failures two ways: every fallible operation returns a
//! `Result`, and in addition sets a thread-local "current error" so that
//! call sites which only see an invalid-marker return value can still
//! recover the reason.

use std::cell::RefCell;
use std::fmt;

/// Every named error kind in the error-propagation policy, plus the
/// observer-veto sub-kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PurcErrorKind {
    OutOfMemory,
    InvalidValue,
    WrongDataType,
    ArgumentMissed,
    NotSupported,
    NotFound,
    Duplicated,
    OutOfBounds,
    InvalidOperand,
    BadEncoding,
    UnexpectedEof,
    UnexpectedCharacter,
    UnexpectedComma,
    UnexpectedRightBracket,
    MaxDepthExceeded,
    /// A pre-change observer returned `false` and vetoed the mutation.
    ObserverVetoed,
}

impl PurcErrorKind {
    pub fn as_str(self) -> &'static str {
        use PurcErrorKind::*;
        match self {
            OutOfMemory => "OUT_OF_MEMORY",
            InvalidValue => "INVALID_VALUE",
            WrongDataType => "WRONG_DATA_TYPE",
            ArgumentMissed => "ARGUMENT_MISSED",
            NotSupported => "NOT_SUPPORTED",
            NotFound => "NOT_FOUND",
            Duplicated => "DUPLICATED",
            OutOfBounds => "OUT_OF_BOUNDS",
            InvalidOperand => "INVALID_OPERAND",
            BadEncoding => "BAD_ENCODING",
            UnexpectedEof => "UNEXPECTED_EOF",
            UnexpectedCharacter => "UNEXPECTED_CHARACTER",
            UnexpectedComma => "UNEXPECTED_COMMA",
            UnexpectedRightBracket => "UNEXPECTED_RIGHT_BRACKET",
            MaxDepthExceeded => "MAX_DEPTH_EXCEEDED",
            ObserverVetoed => "INVALID_VALUE/OBSERVER_VETOED",
        }
    }
}

impl fmt::Display for PurcErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An error value: a kind plus a human-readable message.
///
/// The payload is just the message string rather than a full `Variant`,
/// since attaching an arbitrary `Variant` here would make `purc-core`
/// depend on the mutable container types defined in `purc-runtime` (which
/// itself depends on `purc-core`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurcError {
    pub kind: PurcErrorKind,
    pub message: String,
}

impl PurcError {
    pub fn new(kind: PurcErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for PurcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for PurcError {}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, PurcError>;

thread_local! {
    static LAST_ERROR: RefCell<Option<PurcError>> = const { RefCell::new(None) };
}

/// Record `err` as the thread's current error and return it unchanged, so
/// this can be chained at the point an operation fails:
/// `return Err(set_error(PurcError::new(..)))`.
pub fn set_error(err: PurcError) -> PurcError {
    LAST_ERROR.with(|slot| *slot.borrow_mut() = Some(err.clone()));
    err
}

/// `purc_get_last_error()`: read the thread-local current error without
/// clearing it.
pub fn last_error() -> Option<PurcError> {
    LAST_ERROR.with(|slot| slot.borrow().clone())
}

/// Take (and clear) the thread-local current error.
pub fn take_error() -> Option<PurcError> {
    LAST_ERROR.with(|slot| slot.borrow_mut().take())
}

/// `purc_clr_error()`.
pub fn clear_error() {
    LAST_ERROR.with(|slot| *slot.borrow_mut() = None);
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    // The test harness can reuse a worker thread across test bodies, and
    // LAST_ERROR is thread-local, so these run serially to avoid one test
    // observing another's leftover state on a shared thread.

    #[test]
    #[serial]
    fn set_and_take_round_trips() {
        clear_error();
        assert!(last_error().is_none());

        set_error(PurcError::new(PurcErrorKind::NotFound, "no such key"));
        assert_eq!(last_error().unwrap().kind, PurcErrorKind::NotFound);

        let taken = take_error().unwrap();
        assert_eq!(taken.message, "no such key");
        assert!(last_error().is_none());
    }

    #[test]
    #[serial]
    fn clear_resets_state() {
        clear_error();
        set_error(PurcError::new(PurcErrorKind::Duplicated, "dup"));
        assert!(last_error().is_some());
        clear_error();
        assert!(last_error().is_none());
    }

    #[test]
    fn display_includes_kind_and_message() {
        let err = PurcError::new(PurcErrorKind::OutOfBounds, "index 9 >= len 3");
        assert_eq!(err.to_string(), "OUT_OF_BOUNDS: index 9 >= len 3");
    }
}
