use log::trace;
use serde::Serialize;

use crate::err::Result;
use crate::utils::bytes;

/// Parallel key-code → tagged value tables, one per modifier table entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodeTable {
    pub format: u16,
    pub code_count: u16,
    pub tables: Vec<Vec<u16>>,
}

impl CodeTable {
    /// Decode a code table. Table offsets are relative to the start of `span`.
    pub fn decode(span: &[u8]) -> Result<Self> {
        let format = bytes::read_u16_le_r(span, 0, "code table format")?;
        let code_count = bytes::read_u16_le_r(span, 2, "code table code count")?;
        let table_count = bytes::read_u32_le_r(span, 4, "code table count")? as usize;

        let offsets = bytes::read_u32_vec_le_r(span, 8, table_count, "code table offsets")?;

        let mut tables = Vec::with_capacity(table_count);
        for offset in offsets {
            tables.push(bytes::read_u16_vec_le_r(
                span,
                offset as usize,
                usize::from(code_count),
                "code table values",
            )?);
        }

        trace!(
            "code table: format {:#06x}, {} tables of {} codes",
            format,
            tables.len(),
            code_count
        );

        Ok(CodeTable {
            format,
            code_count,
            tables,
        })
    }

    pub fn table(&self, table_index: usize) -> Option<&[u16]> {
        self.tables.get(table_index).map(Vec::as_slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::err::DecodeError;
    use pretty_assertions::assert_eq;

    fn code_table_bytes(code_count: u16, tables: &[&[u16]]) -> Vec<u8> {
        let header = 8 + 4 * tables.len();
        let mut buf = Vec::new();
        buf.extend_from_slice(&0x3001u16.to_le_bytes());
        buf.extend_from_slice(&code_count.to_le_bytes());
        buf.extend_from_slice(&(tables.len() as u32).to_le_bytes());
        for i in 0..tables.len() {
            let offset = header + i * 2 * usize::from(code_count);
            buf.extend_from_slice(&(offset as u32).to_le_bytes());
        }
        for table in tables {
            for value in *table {
                buf.extend_from_slice(&value.to_le_bytes());
            }
        }
        buf
    }

    #[test]
    fn test_every_table_has_code_count_entries() {
        let table =
            CodeTable::decode(&code_table_bytes(3, &[&[0x61, 0x62, 0x63], &[0x41, 0x42, 0x43]]))
                .unwrap();
        assert_eq!(table.code_count, 3);
        assert_eq!(table.tables.len(), 2);
        assert!(table.tables.iter().all(|t| t.len() == 3));
        assert_eq!(table.table(1), Some(&[0x41, 0x42, 0x43][..]));
        assert_eq!(table.table(2), None);
    }

    #[test]
    fn test_zero_tables_is_empty_not_an_error() {
        let table = CodeTable::decode(&code_table_bytes(128, &[])).unwrap();
        assert_eq!(table.code_count, 128);
        assert!(table.tables.is_empty());
    }

    #[test]
    fn test_offsets_are_relative_to_table_start() {
        // Two tables sharing the same values.
        let mut buf = Vec::new();
        buf.extend_from_slice(&0x3001u16.to_le_bytes());
        buf.extend_from_slice(&1u16.to_le_bytes());
        buf.extend_from_slice(&2u32.to_le_bytes());
        buf.extend_from_slice(&16u32.to_le_bytes());
        buf.extend_from_slice(&16u32.to_le_bytes());
        buf.extend_from_slice(&0x0041u16.to_le_bytes());

        let table = CodeTable::decode(&buf).unwrap();
        assert_eq!(table.tables, vec![vec![0x0041], vec![0x0041]]);
    }

    #[test]
    fn test_table_running_past_span_is_malformed() {
        let mut buf = code_table_bytes(2, &[&[0x61, 0x62]]);
        buf.truncate(buf.len() - 1);
        assert!(matches!(
            CodeTable::decode(&buf),
            Err(DecodeError::MalformedTable { offset: 12, count: 2, .. })
        ));
    }
}
