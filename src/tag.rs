//! Table tags.

use std::fmt;

/// Build a tag from its four bytes.
///
/// ```
/// # use ttextract::tag;
/// assert_eq!(tag::GLYF, 0x676C7966);
/// ```
macro_rules! tag {
    ($w:expr) => {
        u32::from_be_bytes(*$w)
    };
}

/// Wraps a tag to display it as text, or in hex if it isn't printable ASCII.
#[derive(PartialEq, Eq, Clone, Copy)]
pub struct DisplayTag(pub u32);

impl fmt::Display for DisplayTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bytes = self.0.to_be_bytes();
        if bytes.iter().all(|b| b.is_ascii() && !b.is_ascii_control()) {
            bytes.iter().try_for_each(|&b| fmt::Write::write_char(f, char::from(b)))
        } else {
            write!(f, "0x{:08x}", self.0)
        }
    }
}

impl fmt::Debug for DisplayTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}'", self)
    }
}

pub const CMAP: u32 = tag!(b"cmap");
pub const GLYF: u32 = tag!(b"glyf");
pub const HEAD: u32 = tag!(b"head");
pub const HHEA: u32 = tag!(b"hhea");
pub const HMTX: u32 = tag!(b"hmtx");
pub const LOCA: u32 = tag!(b"loca");
pub const MAXP: u32 = tag!(b"maxp");
pub const NAME: u32 = tag!(b"name");
pub const OS_2: u32 = tag!(b"OS/2");
pub const POST: u32 = tag!(b"post");
pub const TRUE: u32 = tag!(b"true");
pub const VHEA: u32 = tag!(b"vhea");
pub const VMTX: u32 = tag!(b"vmtx");
