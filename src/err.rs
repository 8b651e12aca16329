use thiserror::Error;

pub type Result<T> = std::result::Result<T, DecodeError>;

/// Failures while turning bytes into a [`crate::LayoutResource`] (or the container around it).
///
/// Offsets are byte offsets relative to the span that was being decoded; decoders that hand a
/// sub-span to a nested decoder rebase the nested error with [`DecodeError::rebased`], so an error
/// surfacing from [`crate::KeyboardLayoutBundle::parse`] carries a file offset.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("buffer too small for {what} at offset {offset} (need {need} bytes, have {have})")]
    OutOfBounds {
        what: &'static str,
        offset: usize,
        need: usize,
        have: usize,
    },

    #[error("{what} at offset {offset} declares {count} elements which do not fit the table")]
    MalformedTable {
        what: &'static str,
        offset: usize,
        count: usize,
    },

    #[error("entry {index}: invalid {what} at offset {offset}")]
    MalformedEntry {
        index: usize,
        what: &'static str,
        offset: usize,
    },

    #[error("invalid utf-16 text for {what} at offset {offset}")]
    InvalidText { what: &'static str, offset: usize },

    #[error("invalid container magic, expected `0xABCDEF02`, found `{found:#010X}`")]
    UnrecognizedMagic { found: u32 },

    #[error("keyboard type entry {index}: {records} state records but {names} state names")]
    StateNamesMismatch {
        index: usize,
        records: usize,
        names: usize,
    },
}

impl DecodeError {
    /// Shift the reported offset by `base`, used when a sub-span error crosses into its parent.
    pub fn rebased(self, base: usize) -> Self {
        match self {
            DecodeError::OutOfBounds {
                what,
                offset,
                need,
                have,
            } => DecodeError::OutOfBounds {
                what,
                offset: offset.saturating_add(base),
                need,
                have,
            },
            DecodeError::MalformedTable {
                what,
                offset,
                count,
            } => DecodeError::MalformedTable {
                what,
                offset: offset.saturating_add(base),
                count,
            },
            DecodeError::MalformedEntry {
                index,
                what,
                offset,
            } => DecodeError::MalformedEntry {
                index,
                what,
                offset: offset.saturating_add(base),
            },
            DecodeError::InvalidText { what, offset } => DecodeError::InvalidText {
                what,
                offset: offset.saturating_add(base),
            },
            other => other,
        }
    }

    /// Offset of the failure, when the error kind carries one.
    pub fn offset(&self) -> Option<usize> {
        match self {
            DecodeError::OutOfBounds { offset, .. }
            | DecodeError::MalformedTable { offset, .. }
            | DecodeError::MalformedEntry { offset, .. }
            | DecodeError::InvalidText { offset, .. } => Some(*offset),
            DecodeError::UnrecognizedMagic { .. } | DecodeError::StateNamesMismatch { .. } => None,
        }
    }
}

/// Failures while resolving a key stroke (sequence) against a decoded keyboard type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("key code {key_code} is out of range (code table has {code_count} codes)")]
    KeyCodeOutOfRange { key_code: u16, code_count: u16 },

    #[error("modifier table selected code table {table_index}, but only {table_count} exist")]
    CodeTableOutOfRange {
        table_index: usize,
        table_count: usize,
    },

    #[error("dead-key state {index} referenced, but the keyboard type has no state index")]
    MissingStateIndex { index: u16 },

    #[error("dead-key state {index} referenced, but the state index has {len} records")]
    StateIndexOutOfRange { index: u16, len: usize },

    #[error("dead-key composition revisited state {state}")]
    CompositionCycle { state: u16 },
}
