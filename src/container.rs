//! The keyboard layouts container (`*.dat`): a directory of named layout resources.
//!
//! Header: `magic: u32`, `entry_count: u32`, `directory_offset: u32`, followed (at
//! `directory_offset`) by `entry_count` 64-byte directory entries. Every offset in the container
//! is relative to the start of the file.

use log::debug;
use serde::Serialize;

use crate::err::{DecodeError, Result};
use crate::layout::LayoutResource;
use crate::settings::DecodeSettings;
use crate::utils::bytes;

pub const CONTAINER_MAGIC: u32 = 0xABCD_EF02;
pub const DIRECTORY_ENTRY_SIZE: usize = 64;

#[derive(Debug, Clone, Serialize)]
pub struct KeyboardLayoutBundle<'a> {
    #[serde(skip)]
    pub data: &'a [u8],
    /// In directory order.
    pub layouts: Vec<NamedLayout<'a>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NamedLayout<'a> {
    pub name: String,
    pub number: u32,
    pub flags: u32,
    pub locale: u32,
    pub unknown_flags: u32,
    pub resource: LayoutResource,
    #[serde(skip)]
    pub ranges: &'a [u8],
    #[serde(skip)]
    pub icon: &'a [u8],
    #[serde(skip)]
    pub modifier_plist: &'a [u8],
    #[serde(skip)]
    pub plist: &'a [u8],
}

impl<'a> KeyboardLayoutBundle<'a> {
    pub fn parse(data: &'a [u8]) -> Result<Self> {
        Self::parse_with_settings(data, &DecodeSettings::default())
    }

    pub fn parse_with_settings(data: &'a [u8], settings: &DecodeSettings) -> Result<Self> {
        let magic = bytes::read_u32_le_r(data, 0, "container magic")?;
        if magic != CONTAINER_MAGIC {
            return Err(DecodeError::UnrecognizedMagic { found: magic });
        }

        let entry_count = bytes::read_u32_le_r(data, 4, "container entry count")? as usize;
        let directory = bytes::read_u32_le_r(data, 8, "container directory offset")? as usize;
        bytes::require_table(
            data,
            directory,
            entry_count,
            DIRECTORY_ENTRY_SIZE,
            "container directory",
        )?;

        let mut layouts = Vec::with_capacity(entry_count);
        for index in 0..entry_count {
            let offset = directory + index * DIRECTORY_ENTRY_SIZE;
            let entry = bytes::slice_r(data, offset, DIRECTORY_ENTRY_SIZE, "directory entry")?;
            layouts.push(parse_directory_entry(data, entry, offset, index, settings)?);
        }

        Ok(KeyboardLayoutBundle { data, layouts })
    }

    /// First layout called `name`.
    pub fn layout(&self, name: &str) -> Option<&NamedLayout<'a>> {
        self.layouts.iter().find(|l| l.name == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.layouts.iter().map(|l| l.name.as_str())
    }
}

fn parse_directory_entry<'a>(
    data: &'a [u8],
    entry: &[u8],
    entry_offset: usize,
    index: usize,
    settings: &DecodeSettings,
) -> Result<NamedLayout<'a>> {
    let mut fields = [0u32; 16];
    for (i, field) in fields.iter_mut().enumerate() {
        *field = bytes::read_u32_le_r(entry, i * 4, "directory entry field")
            .map_err(|e| e.rebased(entry_offset))?;
    }
    let [
        reserved,
        name_offset,
        number_offset,
        flags,
        locale,
        unknown_flags,
        data_size,
        data_offset,
        ranges_size,
        ranges_offset,
        icon_size,
        icon_offset,
        modifier_plist_size,
        modifier_plist_offset,
        plist_size,
        plist_offset,
    ] = fields;

    if reserved != 0 {
        return Err(DecodeError::MalformedEntry {
            index,
            what: "directory reserved field",
            offset: entry_offset,
        });
    }

    let name = read_name(data, name_offset as usize)?;
    let number = bytes::read_u32_le_r(data, number_offset as usize, "layout number")?;
    debug!("layout {} `{}` (#{})", index, name, number);

    let span = |offset: u32, size: u32, what: &'static str| {
        bytes::slice_r(data, offset as usize, size as usize, what)
    };

    let resource_span = span(data_offset, data_size, "layout data")?;
    let resource = LayoutResource::decode_with_settings(resource_span, settings)
        .map_err(|e| e.rebased(data_offset as usize))?;

    Ok(NamedLayout {
        name,
        number,
        flags,
        locale,
        unknown_flags,
        resource,
        ranges: span(ranges_offset, ranges_size, "layout ranges")?,
        icon: span(icon_offset, icon_size, "layout icon")?,
        modifier_plist: span(
            modifier_plist_offset,
            modifier_plist_size,
            "layout modifier plist",
        )?,
        plist: span(plist_offset, plist_size, "layout plist")?,
    })
}

/// NUL-terminated UTF-8 name at `offset`; an unterminated name runs to the end of the file.
fn read_name(data: &[u8], offset: usize) -> Result<String> {
    let tail = bytes::tail_r(data, offset, "layout name")?;
    let end = tail.iter().position(|&b| b == 0).unwrap_or(tail.len());
    String::from_utf8(tail[..end].to_vec()).map_err(|_| DecodeError::InvalidText {
        what: "layout name",
        offset,
    })
}
