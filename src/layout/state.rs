//! Dead-key state tables: the state records, the index that addresses them, the terminator
//! list and the human readable state names.

use log::{trace, warn};
use serde::Serialize;

use crate::err::{DecodeError, Result};
use crate::utils::{bytes, decode_utf16le_trim_nul};

/// The only transition format that carries `(trigger, target)` pairs.
const TRANSITION_FORMAT_PAIRS: u16 = 1;

/// `default_output`, `fallback_state`, transition count and transition format.
const STATE_RECORD_HEADER_SIZE: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Transition {
    pub trigger: u16,
    pub target: u16,
}

/// One node of the dead-key automaton.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StateRecord {
    /// Tagged value produced when no transition matches.
    pub default_output: u16,
    /// State retried when no transition matches; `0` means none.
    pub fallback_state: u16,
    /// `None` for terminal records (any transition format other than pairs).
    pub transitions: Option<Vec<Transition>>,
}

impl StateRecord {
    pub fn decode(span: &[u8]) -> Result<Self> {
        let default_output = bytes::read_u16_le_r(span, 0, "state record default output")?;
        let fallback_state = bytes::read_u16_le_r(span, 2, "state record fallback state")?;
        let count = usize::from(bytes::read_u16_le_r(span, 4, "state record count")?);
        let format = bytes::read_u16_le_r(span, 6, "state record format")?;

        let transitions = if format == TRANSITION_FORMAT_PAIRS {
            bytes::require_table(span, 8, count, 4, "state record transitions")?;
            let mut transitions = Vec::with_capacity(count);
            for i in 0..count {
                let off = 8 + i * 4;
                transitions.push(Transition {
                    trigger: bytes::read_u16_le_r(span, off, "state transition trigger")?,
                    target: bytes::read_u16_le_r(span, off + 2, "state transition target")?,
                });
            }
            Some(transitions)
        } else {
            if count != 0 {
                warn!(
                    "state record with unsupported transition format {} ({} entries), treating as terminal",
                    format, count
                );
            }
            None
        };

        Ok(StateRecord {
            default_output,
            fallback_state,
            transitions,
        })
    }

    /// Target of the first transition whose trigger equals `trigger`.
    pub fn target_for(&self, trigger: u16) -> Option<u16> {
        self.transitions
            .as_deref()?
            .iter()
            .find(|t| t.trigger == trigger)
            .map(|t| t.target)
    }
}

/// Arena of state records, addressed by the 14-bit index carried in dead-key values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StateIndex {
    pub format: u16,
    pub records: Vec<StateRecord>,
}

impl StateIndex {
    /// Decode the state index at `state_span`.
    ///
    /// Record offsets are relative to `enclosing_span` (the whole layout resource), not to
    /// `state_span`. Errors are reported relative to `enclosing_span`.
    pub fn decode(state_span: &[u8], enclosing_span: &[u8]) -> Result<Self> {
        let base = bytes::offset_within(enclosing_span, state_span).unwrap_or(0);

        let format = bytes::read_u16_le_r(state_span, 0, "state index format")
            .map_err(|e| e.rebased(base))?;
        let count = usize::from(
            bytes::read_u16_le_r(state_span, 2, "state index count")
                .map_err(|e| e.rebased(base))?,
        );
        let offsets = bytes::read_u32_vec_le_r(state_span, 4, count, "state index offsets")
            .map_err(|e| e.rebased(base))?;

        let mut records = Vec::with_capacity(count);
        for offset in offsets {
            let offset = offset as usize;
            bytes::require_table(
                enclosing_span,
                offset,
                1,
                STATE_RECORD_HEADER_SIZE,
                "state record",
            )?;
            let span = bytes::tail_r(enclosing_span, offset, "state record")?;
            records.push(StateRecord::decode(span).map_err(|e| e.rebased(offset))?);
        }

        trace!("state index: {} records", records.len());

        Ok(StateIndex { format, records })
    }

    pub fn get(&self, index: u16) -> Option<&StateRecord> {
        self.records.get(usize::from(index))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Candidate terminating values for dead-key sequences, kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StateTerminators {
    pub format: u16,
    pub terminators: Vec<u16>,
}

impl StateTerminators {
    pub fn decode(span: &[u8]) -> Result<Self> {
        let format = bytes::read_u16_le_r(span, 0, "state terminators format")?;
        let count = usize::from(bytes::read_u16_le_r(span, 2, "state terminators count")?);
        let terminators = bytes::read_u16_vec_le_r(span, 4, count, "state terminators")?;

        Ok(StateTerminators {
            format,
            terminators,
        })
    }
}

/// Labels for dead-key states, parallel to [`StateIndex::records`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StateNames {
    pub format: u16,
    pub names: Vec<String>,
}

impl StateNames {
    /// Decode state names. Each name runs from its offset to the next one (the last to the end
    /// of `span`); trailing NULs are stripped.
    pub fn decode(span: &[u8], lossy: bool) -> Result<Self> {
        let format = bytes::read_u16_le_r(span, 0, "state names format")?;
        let count = usize::from(bytes::read_u16_le_r(span, 2, "state names count")?);
        let offsets = bytes::read_u16_vec_le_r(span, 4, count, "state name offsets")?;

        let mut names = Vec::with_capacity(count);
        for (i, &start) in offsets.iter().enumerate() {
            let start = usize::from(start);
            let end = offsets
                .get(i + 1)
                .map_or(span.len(), |&next| usize::from(next));

            let text = end
                .checked_sub(start)
                .and_then(|len| span.get(start..start + len))
                .ok_or(DecodeError::MalformedTable {
                    what: "state name span",
                    offset: 4 + i * 2,
                    count,
                })?;

            let name = decode_utf16le_trim_nul(text, lossy).map_err(|_| {
                DecodeError::InvalidText {
                    what: "state name",
                    offset: start,
                }
            })?;
            names.push(name);
        }

        Ok(StateNames { format, names })
    }
}
