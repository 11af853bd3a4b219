//! TIFF tag value reading.
//!
//! Values can be stored either inline in the IFD entry (for small values)
//! or at an offset in the file (for larger values like description strings).
//! Offset values are fetched with a single range read.

use bytes::Bytes;

use crate::error::{IoError, TiffError};
use crate::io::RangeReader;

use super::parser::{IfdEntry, TiffHeader};
use super::tags::{FieldType, TiffTag};

// =============================================================================
// ValueReader
// =============================================================================

/// Reads tag values from a TIFF file.
///
/// Combines a RangeReader with the TIFF header so values are decoded with
/// the file's byte order and offset width.
pub struct ValueReader<'a, R: RangeReader> {
    reader: &'a R,
    header: &'a TiffHeader,
}

impl<'a, R: RangeReader> ValueReader<'a, R> {
    /// Create a new ValueReader.
    pub fn new(reader: &'a R, header: &'a TiffHeader) -> Self {
        Self { reader, header }
    }

    /// Read raw bytes for an IFD entry's value.
    ///
    /// For inline values, returns the bytes from the entry.
    /// For offset values, fetches the bytes from the file.
    pub async fn read_bytes(&self, entry: &IfdEntry) -> Result<Bytes, TiffError> {
        let size = entry
            .value_byte_size()
            .ok_or(TiffError::UnknownFieldType(entry.field_type_raw))?;

        if entry.is_inline {
            return Ok(Bytes::copy_from_slice(
                &entry.value_offset_bytes[..size as usize],
            ));
        }

        let offset = entry.value_offset(self.header.byte_order);
        let file_size = self.reader.size();
        if offset.saturating_add(size) > file_size {
            return Err(TiffError::Io(IoError::RangeOutOfBounds {
                offset,
                requested: size,
                size: file_size,
            }));
        }

        Ok(self.reader.read_exact_at(offset, size as usize).await?)
    }

    /// Read a single SHORT or LONG value.
    pub async fn read_u32(&self, tag: TiffTag, entry: &IfdEntry) -> Result<u32, TiffError> {
        if let Some(value) = entry.inline_u32(self.header.byte_order) {
            return Ok(value);
        }

        let field_type = entry
            .field_type
            .ok_or(TiffError::UnknownFieldType(entry.field_type_raw))?;

        if entry.count != 1 {
            return Err(TiffError::InvalidTagValue {
                tag: tag.name(),
                message: format!("expected count 1, got {}", entry.count),
            });
        }

        let bytes = self.read_bytes(entry).await?;
        let byte_order = self.header.byte_order;

        match field_type {
            FieldType::Short => Ok(byte_order.read_u16(&bytes) as u32),
            FieldType::Long => Ok(byte_order.read_u32(&bytes)),
            _ => Err(TiffError::InvalidTagValue {
                tag: tag.name(),
                message: format!("expected Short or Long, got {:?}", field_type),
            }),
        }
    }

    /// Read a single RATIONAL value as a float.
    pub async fn read_rational(&self, tag: TiffTag, entry: &IfdEntry) -> Result<f64, TiffError> {
        if entry.field_type != Some(FieldType::Rational) || entry.count < 1 {
            return Err(TiffError::InvalidTagValue {
                tag: tag.name(),
                message: format!(
                    "expected Rational, got type {} count {}",
                    entry.field_type_raw, entry.count
                ),
            });
        }

        let bytes = self.read_bytes(entry).await?;
        let byte_order = self.header.byte_order;
        let numerator = byte_order.read_u32(&bytes[0..4]);
        let denominator = byte_order.read_u32(&bytes[4..8]);

        if denominator == 0 {
            return Err(TiffError::InvalidTagValue {
                tag: tag.name(),
                message: "zero denominator".to_string(),
            });
        }

        Ok(numerator as f64 / denominator as f64)
    }

    /// Read a string value from an entry (ASCII type).
    ///
    /// Everything from the first NUL on is dropped; invalid UTF-8 is
    /// replaced rather than rejected.
    pub async fn read_string(&self, tag: TiffTag, entry: &IfdEntry) -> Result<String, TiffError> {
        let field_type = entry
            .field_type
            .ok_or(TiffError::UnknownFieldType(entry.field_type_raw))?;

        if field_type != FieldType::Ascii {
            return Err(TiffError::InvalidTagValue {
                tag: tag.name(),
                message: format!("expected Ascii type for string, got {:?}", field_type),
            });
        }

        let bytes = self.read_bytes(entry).await?;

        let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
        Ok(String::from_utf8_lossy(&bytes[..end]).into_owned())
    }
}

// =============================================================================
// Tests
// =============================================================================
