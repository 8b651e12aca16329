use std::ops::RangeInclusive;

use log::{debug, warn};
use serde::Serialize;

use super::{CodeTable, ModifierTable, StateIndex, StateNames, StateTerminators};
use crate::err::{DecodeError, Result};
use crate::settings::DecodeSettings;
use crate::utils::bytes;

/// Size of one keyboard type entry in the layout resource's entry table.
pub const KEYBOARD_TYPE_ENTRY_SIZE: usize = 28;

/// The tables that apply to one range of the layout resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyboardType {
    pub first: u32,
    pub last: u32,
    pub modifier_table: ModifierTable,
    pub code_table: CodeTable,
    pub state_index: Option<StateIndex>,
    pub state_terminators: Option<StateTerminators>,
    pub state_names: Option<StateNames>,
}

/// Raw offsets of one entry, all relative to the start of the layout resource.
#[derive(Debug, Clone, Copy)]
struct EntryOffsets {
    first: u32,
    last: u32,
    modifier_table: u32,
    code_table: u32,
    state_index: u32,
    state_terminators: u32,
    state_names: u32,
}

impl EntryOffsets {
    fn read(record: &[u8]) -> Result<Self> {
        Ok(EntryOffsets {
            first: bytes::read_u32_le_r(record, 0, "keyboard type first")?,
            last: bytes::read_u32_le_r(record, 4, "keyboard type last")?,
            modifier_table: bytes::read_u32_le_r(record, 8, "modifier table offset")?,
            code_table: bytes::read_u32_le_r(record, 12, "code table offset")?,
            state_index: bytes::read_u32_le_r(record, 16, "state index offset")?,
            state_terminators: bytes::read_u32_le_r(record, 20, "state terminators offset")?,
            state_names: bytes::read_u32_le_r(record, 24, "state names offset")?,
        })
    }
}

/// Borrow the tail of `resource` at `offset`; zero and out-of-resource offsets are malformed.
fn table_span<'a>(
    resource: &'a [u8],
    index: usize,
    offset: u32,
    what: &'static str,
) -> Result<&'a [u8]> {
    let off = offset as usize;
    if off == 0 || off >= resource.len() {
        return Err(DecodeError::MalformedEntry {
            index,
            what,
            offset: off,
        });
    }
    Ok(&resource[off..])
}

fn optional_span<'a>(
    resource: &'a [u8],
    index: usize,
    offset: u32,
    what: &'static str,
) -> Result<Option<&'a [u8]>> {
    if offset == 0 {
        return Ok(None);
    }
    table_span(resource, index, offset, what).map(Some)
}

impl KeyboardType {
    /// Decode entry `index` from its 28-byte `record`, resolving offsets against `resource`.
    pub fn decode(
        record: &[u8],
        resource: &[u8],
        index: usize,
        settings: &DecodeSettings,
    ) -> Result<Self> {
        let offsets = EntryOffsets::read(record)?;
        debug!("keyboard type {}: {:?}", index, offsets);

        let at = |offset: u32| move |e: DecodeError| e.rebased(offset as usize);

        let span = table_span(resource, index, offsets.modifier_table, "modifier table")?;
        let modifier_table = ModifierTable::decode(span).map_err(at(offsets.modifier_table))?;

        let span = table_span(resource, index, offsets.code_table, "code table")?;
        let code_table = CodeTable::decode(span).map_err(at(offsets.code_table))?;

        let state_index = optional_span(resource, index, offsets.state_index, "state index")?
            .map(|span| StateIndex::decode(span, resource))
            .transpose()?;

        let state_terminators = optional_span(
            resource,
            index,
            offsets.state_terminators,
            "state terminators",
        )?
        .map(|span| StateTerminators::decode(span).map_err(at(offsets.state_terminators)))
        .transpose()?;

        let state_names = optional_span(resource, index, offsets.state_names, "state names")?
            .map(|span| {
                StateNames::decode(span, settings.should_decode_text_lossy())
                    .map_err(at(offsets.state_names))
            })
            .transpose()?;

        if let (Some(records), Some(names)) = (&state_index, &state_names) {
            if records.len() != names.names.len() {
                if settings.should_enforce_state_names() {
                    return Err(DecodeError::StateNamesMismatch {
                        index,
                        records: records.len(),
                        names: names.names.len(),
                    });
                }
                warn!(
                    "keyboard type {}: {} state records but {} state names",
                    index,
                    records.len(),
                    names.names.len()
                );
            }
        }

        Ok(KeyboardType {
            first: offsets.first,
            last: offsets.last,
            modifier_table,
            code_table,
            state_index,
            state_terminators,
            state_names,
        })
    }

    pub fn code_range(&self) -> RangeInclusive<u32> {
        self.first..=self.last
    }

    pub fn covers(&self, code_point: u32) -> bool {
        self.code_range().contains(&code_point)
    }

    /// Name of dead-key state `index`, when the resource carries state names.
    pub fn state_name(&self, index: u16) -> Option<&str> {
        self.state_names
            .as_ref()?
            .names
            .get(usize::from(index))
            .map(String::as_str)
    }
}
