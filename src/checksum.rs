#![deny(missing_docs)]

//! Table checksums.

use std::num::Wrapping;

use crate::binary::read::ReadScope;
use crate::binary::U32Be;
use crate::error::ParseError;

/// Calculate a checksum of `data` according to the OpenType table checksum algorithm
///
/// A trailing partial word is treated as if padded with zeros to a 32-bit boundary, which is how
/// tables that are not a multiple of four bytes long are checksummed.
///
/// https://docs.microsoft.com/en-us/typography/opentype/spec/otff#calculating-checksums
pub fn table_checksum(data: &[u8]) -> Result<Wrapping<u32>, ParseError> {
    let whole_words = data.len() / 4;
    let mut ctxt = ReadScope::new(data).ctxt();
    let array = ctxt.read_array::<U32Be>(whole_words)?;
    let sum: Wrapping<u32> = array.iter().map(Wrapping).sum();

    let tail = &data[whole_words * 4..];
    if tail.is_empty() {
        return Ok(sum);
    }
    let mut last = [0u8; 4];
    last[..tail.len()].copy_from_slice(tail);
    Ok(sum + Wrapping(u32::from_be_bytes(last)))
}
