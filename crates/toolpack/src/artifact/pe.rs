//! Minimal PE/COFF reader for managed assemblies
//!
//! Only the headers needed to reach the CLI (COR20) header are parsed.

use thiserror::Error;

const DOS_SIGNATURE: &[u8; 2] = b"MZ";
const PE_SIGNATURE: &[u8; 4] = b"PE\0\0";
const PE_OFFSET_FIELD: usize = 0x3C;
const COFF_HEADER_SIZE: usize = 20;
const SECTION_HEADER_SIZE: usize = 40;

const PE32_MAGIC: u16 = 0x10B;
const PE32_PLUS_MAGIC: u16 = 0x20B;
const CLI_HEADER_DIRECTORY: usize = 14;

const NATIVE_ENTRYPOINT_FLAG: u32 = 0x10;
const METHOD_DEF_TABLE: u32 = 0x06;
const FILE_TABLE: u32 = 0x26;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PeError {
    #[error("file is truncated while reading {0}")]
    Truncated(&'static str),

    #[error("missing {0} signature")]
    BadSignature(&'static str),

    #[error("unknown optional header magic {0:#x}")]
    UnknownMagic(u16),

    #[error("not a managed assembly")]
    NotManaged,

    #[error("RVA {0:#x} is not inside any section")]
    UnmappedRva(u32),
}

/// How a managed image declares its entry point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryPoint {
    /// Metadata token of a `MethodDef` or `File` row
    Token(u32),
    /// RVA of a native entry point (mixed-mode images)
    Native(u32),
}

#[derive(Debug, Clone, Copy)]
struct Section {
    virtual_address: u32,
    virtual_size: u32,
    raw_size: u32,
    raw_pointer: u32,
}

impl Section {
    fn file_offset(&self, rva: u32) -> Option<usize> {
        let delta = rva.checked_sub(self.virtual_address)?;
        // Bytes past the raw data are zero-fill and not in the file
        let extent = match self.virtual_size {
            0 => self.raw_size,
            size => size.min(self.raw_size),
        };
        if delta >= extent {
            return None;
        }
        usize::try_from(self.raw_pointer.checked_add(delta)?).ok()
    }
}

fn read_u16(bytes: &[u8], offset: usize, what: &'static str) -> Result<u16, PeError> {
    bytes
        .get(offset..offset.checked_add(2).ok_or(PeError::Truncated(what))?)
        .and_then(|b| b.try_into().ok())
        .map(u16::from_le_bytes)
        .ok_or(PeError::Truncated(what))
}

fn read_u32(bytes: &[u8], offset: usize, what: &'static str) -> Result<u32, PeError> {
    bytes
        .get(offset..offset.checked_add(4).ok_or(PeError::Truncated(what))?)
        .and_then(|b| b.try_into().ok())
        .map(u32::from_le_bytes)
        .ok_or(PeError::Truncated(what))
}

/// Read the entry point declared in the CLI header of `image`
///
/// Returns `Ok(None)` for a managed library without an entry point.
///
/// # Errors
///
/// Returns [`PeError`] if `image` is not a well-formed managed PE file.
pub fn entry_point(image: &[u8]) -> Result<Option<EntryPoint>, PeError> {
    if !image.starts_with(DOS_SIGNATURE) {
        return Err(PeError::BadSignature("DOS"));
    }

    let pe_offset = read_u32(image, PE_OFFSET_FIELD, "DOS header")? as usize;
    if image.get(pe_offset..pe_offset.saturating_add(4)) != Some(PE_SIGNATURE.as_slice()) {
        return Err(PeError::BadSignature("PE"));
    }

    let coff = pe_offset + 4;
    let section_count = read_u16(image, coff + 2, "COFF header")? as usize;
    let optional_size = read_u16(image, coff + 16, "COFF header")? as usize;

    let optional = coff + COFF_HEADER_SIZE;
    let directories = match read_u16(image, optional, "optional header")? {
        PE32_MAGIC => optional + 96,
        PE32_PLUS_MAGIC => optional + 112,
        other => return Err(PeError::UnknownMagic(other)),
    };
    let directory_count = read_u32(image, directories - 4, "optional header")? as usize;
    if directory_count <= CLI_HEADER_DIRECTORY {
        return Err(PeError::NotManaged);
    }

    let cli_entry = directories + CLI_HEADER_DIRECTORY * 8;
    let cli_rva = read_u32(image, cli_entry, "data directories")?;
    let cli_size = read_u32(image, cli_entry + 4, "data directories")?;
    if cli_rva == 0 || cli_size == 0 {
        return Err(PeError::NotManaged);
    }

    let sections = (0..section_count)
        .map(|i| {
            let at = optional + optional_size + i * SECTION_HEADER_SIZE;
            Ok(Section {
                virtual_size: read_u32(image, at + 8, "section table")?,
                virtual_address: read_u32(image, at + 12, "section table")?,
                raw_size: read_u32(image, at + 16, "section table")?,
                raw_pointer: read_u32(image, at + 20, "section table")?,
            })
        })
        .collect::<Result<Vec<_>, PeError>>()?;

    let cli_header = sections
        .iter()
        .find_map(|s| s.file_offset(cli_rva))
        .ok_or(PeError::UnmappedRva(cli_rva))?;

    let flags = read_u32(image, cli_header + 16, "CLI header")?;
    let entry = read_u32(image, cli_header + 20, "CLI header")?;

    if flags & NATIVE_ENTRYPOINT_FLAG != 0 {
        return Ok((entry != 0).then_some(EntryPoint::Native(entry)));
    }

    let table = entry >> 24;
    let row = entry & 0x00FF_FFFF;
    let is_entry = (table == METHOD_DEF_TABLE || table == FILE_TABLE) && row != 0;

    Ok(is_entry.then_some(EntryPoint::Token(entry)))
}

/// Synthetic managed images for tests
#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    pub(crate) const PE_OFFSET: usize = 0x80;
    const SECTION_RVA: u32 = 0x2000;
    const SECTION_FILE_OFFSET: usize = 0x200;
    const CLI_RVA: u32 = SECTION_RVA + 8;

    pub(crate) fn put_u16(image: &mut [u8], at: usize, value: u16) {
        image[at..at + 2].copy_from_slice(&value.to_le_bytes());
    }

    pub(crate) fn put_u32(image: &mut [u8], at: usize, value: u32) {
        image[at..at + 4].copy_from_slice(&value.to_le_bytes());
    }

    /// PE32 image with one `.text` section holding the CLI header
    pub(crate) fn image(magic: u16, flags: u32, entry: u32) -> Vec<u8> {
        let mut image = vec![0u8; 0x400];
        image[..2].copy_from_slice(DOS_SIGNATURE);
        put_u32(&mut image, PE_OFFSET_FIELD, PE_OFFSET as u32);
        image[PE_OFFSET..PE_OFFSET + 4].copy_from_slice(PE_SIGNATURE);

        let coff = PE_OFFSET + 4;
        let optional_size: u16 = if magic == PE32_PLUS_MAGIC { 240 } else { 224 };
        put_u16(&mut image, coff, 0x14C);
        put_u16(&mut image, coff + 2, 1);
        put_u16(&mut image, coff + 16, optional_size);

        let optional = coff + COFF_HEADER_SIZE;
        let directories = optional + if magic == PE32_PLUS_MAGIC { 112 } else { 96 };
        put_u16(&mut image, optional, magic);
        put_u32(&mut image, directories - 4, 16);
        put_u32(&mut image, directories + CLI_HEADER_DIRECTORY * 8, CLI_RVA);
        put_u32(&mut image, directories + CLI_HEADER_DIRECTORY * 8 + 4, 72);

        let section = optional + optional_size as usize;
        image[section..section + 5].copy_from_slice(b".text");
        put_u32(&mut image, section + 8, 0x100);
        put_u32(&mut image, section + 12, SECTION_RVA);
        put_u32(&mut image, section + 16, 0x200);
        put_u32(&mut image, section + 20, SECTION_FILE_OFFSET as u32);

        let cli = SECTION_FILE_OFFSET + 8;
        put_u32(&mut image, cli, 72);
        put_u16(&mut image, cli + 4, 2);
        put_u16(&mut image, cli + 6, 5);
        put_u32(&mut image, cli + 16, flags);
        put_u32(&mut image, cli + 20, entry);

        image
    }

    /// PE32 IL-only image with the given entry point token
    pub(crate) fn managed_image(entry: u32) -> Vec<u8> {
        image(PE32_MAGIC, 0x1, entry)
    }
}
