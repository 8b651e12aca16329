use log::trace;
use serde::Serialize;

use crate::err::Result;
use crate::utils::bytes;

/// Maps a modifier combination code to the code table that should be consulted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModifierTable {
    pub format: u16,
    pub default_table_index: u16,
    pub table_indices: Vec<u8>,
}

impl ModifierTable {
    /// Decode a modifier table; `span` starts at the table and runs to the end of the resource.
    pub fn decode(span: &[u8]) -> Result<Self> {
        let format = bytes::read_u16_le_r(span, 0, "modifier table format")?;
        let default_table_index = bytes::read_u16_le_r(span, 2, "modifier table default")?;
        let count = bytes::read_u32_le_r(span, 4, "modifier table count")? as usize;

        bytes::require_table(span, 8, count, 1, "modifier table indices")?;
        let table_indices = bytes::slice_r(span, 8, count, "modifier table indices")?.to_vec();

        trace!(
            "modifier table: format {:#06x}, default {}, {} combinations",
            format, default_table_index, count
        );

        Ok(ModifierTable {
            format,
            default_table_index,
            table_indices,
        })
    }

    /// Code table index for `modifiers`, falling back to the default for unlisted combinations.
    pub fn table_index(&self, modifiers: u8) -> usize {
        self.table_indices
            .get(usize::from(modifiers))
            .map_or(usize::from(self.default_table_index), |&i| usize::from(i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::err::DecodeError;
    use pretty_assertions::assert_eq;

    fn modifier_table_bytes(default: u16, indices: &[u8]) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend_from_slice(&0x2001u16.to_le_bytes());
        buf.extend_from_slice(&default.to_le_bytes());
        buf.extend_from_slice(&(indices.len() as u32).to_le_bytes());
        buf.extend_from_slice(indices);
        buf
    }

    #[test]
    fn test_decodes_modifier_table() {
        let table = ModifierTable::decode(&modifier_table_bytes(3, &[0, 1, 1, 2])).unwrap();
        assert_eq!(
            table,
            ModifierTable {
                format: 0x2001,
                default_table_index: 3,
                table_indices: vec![0, 1, 1, 2],
            }
        );
    }

    #[test]
    fn test_unlisted_modifiers_use_default_table() {
        let table = ModifierTable::decode(&modifier_table_bytes(7, &[0, 4])).unwrap();
        assert_eq!(table.table_index(1), 4);
        assert_eq!(table.table_index(2), 7);
        assert_eq!(table.table_index(u8::MAX), 7);
    }

    #[test]
    fn test_indices_may_end_exactly_at_span_end() {
        let buf = modifier_table_bytes(1, &[0, 2, 1]);
        let table = ModifierTable::decode(&buf).unwrap();
        assert_eq!(table.table_indices, vec![0, 2, 1]);

        let empty = ModifierTable::decode(&modifier_table_bytes(1, &[])).unwrap();
        assert!(empty.table_indices.is_empty());
        assert_eq!(empty.table_index(0), 1);
    }

    #[test]
    fn test_count_past_span_is_malformed() {
        let mut buf = modifier_table_bytes(0, &[0, 1]);
        buf[4..8].copy_from_slice(&3u32.to_le_bytes());
        assert!(matches!(
            ModifierTable::decode(&buf),
            Err(DecodeError::MalformedTable {
                offset: 8,
                count: 3,
                ..
            })
        ));
    }
}
