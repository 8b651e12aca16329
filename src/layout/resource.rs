use log::debug;
use serde::Serialize;

use super::KeyboardType;
use super::keyboard_type::KEYBOARD_TYPE_ENTRY_SIZE;
use crate::err::Result;
use crate::settings::DecodeSettings;
use crate::utils::bytes;

const ENTRY_TABLE_OFFSET: usize = 12;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LayoutHeader {
    pub format: u16,
    pub data_version: u16,
    pub feature_offset: u32,
    pub entry_count: u32,
}

/// Trailing feature block, bounds-checked but otherwise uninterpreted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeatureInfo {
    pub format: u16,
    pub reserved: u16,
    pub max_output_string_length: u32,
}

/// One decoded keyboard layout resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LayoutResource {
    pub header: LayoutHeader,
    /// In declaration order.
    pub entries: Vec<KeyboardType>,
    pub feature_info: Option<FeatureInfo>,
}

impl LayoutResource {
    pub fn decode(span: &[u8]) -> Result<Self> {
        Self::decode_with_settings(span, &DecodeSettings::default())
    }

    pub fn decode_with_settings(span: &[u8], settings: &DecodeSettings) -> Result<Self> {
        let header = LayoutHeader {
            format: bytes::read_u16_le_r(span, 0, "layout header format")?,
            data_version: bytes::read_u16_le_r(span, 2, "layout data version")?,
            feature_offset: bytes::read_u32_le_r(span, 4, "layout feature offset")?,
            entry_count: bytes::read_u32_le_r(span, 8, "layout entry count")?,
        };
        debug!("layout header: {:?}", header);

        let count = header.entry_count as usize;
        bytes::require_table(
            span,
            ENTRY_TABLE_OFFSET,
            count,
            KEYBOARD_TYPE_ENTRY_SIZE,
            "keyboard type entries",
        )?;

        let mut entries = Vec::with_capacity(count);
        for index in 0..count {
            let offset = ENTRY_TABLE_OFFSET + index * KEYBOARD_TYPE_ENTRY_SIZE;
            let record = bytes::slice_r(span, offset, KEYBOARD_TYPE_ENTRY_SIZE, "keyboard type")?;
            entries.push(KeyboardType::decode(record, span, index, settings)?);
        }

        // The feature block sits right after the entry table.
        let feature_info = if header.feature_offset != 0 {
            let offset = ENTRY_TABLE_OFFSET + count * KEYBOARD_TYPE_ENTRY_SIZE;
            let block = bytes::slice_r(span, offset, 8, "feature block")?;
            Some(FeatureInfo {
                format: bytes::read_u16_le_r(block, 0, "feature format")?,
                reserved: bytes::read_u16_le_r(block, 2, "feature reserved")?,
                max_output_string_length: bytes::read_u32_le_r(
                    block,
                    4,
                    "feature max output length",
                )?,
            })
        } else {
            None
        };

        Ok(LayoutResource {
            header,
            entries,
            feature_info,
        })
    }

    /// First keyboard type whose range contains `code_point`.
    pub fn keyboard_type_for(&self, code_point: u32) -> Option<&KeyboardType> {
        self.entries.iter().find(|entry| entry.covers(code_point))
    }
}
