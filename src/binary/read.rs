//! Parse binary data
//!
//! All font parsing in this crate goes through the types in this module. A `ReadScope` is a
//! borrowed view of some bytes; a `ReadCtxt` is a cursor into a scope. Big-endian primitive
//! types are read through the marker types in `crate::binary` (`U16Be`, `I16Be`, ...).

use std::cmp::Ordering;
use std::fmt;
use std::marker::PhantomData;

use crate::binary::{I16Be, I32Be, U16Be, U32Be, U8};
use crate::error::ParseError;

/// Returned when a read runs past the end of the data.
#[derive(Debug, Copy, Clone)]
pub struct ReadEof {}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ReadScope<'a> {
    base: usize,
    data: &'a [u8],
}

#[derive(Clone)]
pub struct ReadCtxt<'a> {
    scope: ReadScope<'a>,
    offset: usize,
}

pub trait ReadBinary {
    type HostType<'a>: Sized;

    fn read<'a>(ctxt: &mut ReadCtxt<'a>) -> Result<Self::HostType<'a>, ParseError>;
}

/// Like `ReadBinary` but reading depends on values from elsewhere in the font, such as a glyph
/// count or a table length.
pub trait ReadBinaryDep {
    type Args<'a>: Copy;
    type HostType<'a>: Sized;

    fn read_dep<'a>(
        ctxt: &mut ReadCtxt<'a>,
        args: Self::Args<'a>,
    ) -> Result<Self::HostType<'a>, ParseError>;
}

/// A value occupying exactly `SIZE` bytes.
pub trait ReadFixed {
    type HostType: Sized;

    const SIZE: usize;

    /// Decode a value from `data`, which is exactly `SIZE` bytes long.
    fn read_fixed(data: &[u8]) -> Self::HostType;
}

/// A record built from a fixed size tuple of primitive values.
pub trait ReadFrom {
    type ReadType: ReadFixed;

    fn read_from(value: <Self::ReadType as ReadFixed>::HostType) -> Self;
}

impl<T> ReadFixed for T
where
    T: ReadFrom,
{
    type HostType = T;

    const SIZE: usize = T::ReadType::SIZE;

    fn read_fixed(data: &[u8]) -> T {
        T::read_from(T::ReadType::read_fixed(data))
    }
}

impl<T> ReadBinary for T
where
    T: ReadFixed,
{
    type HostType<'a> = T::HostType;

    fn read<'a>(ctxt: &mut ReadCtxt<'a>) -> Result<Self::HostType<'a>, ParseError> {
        let data = ctxt.read_slice(T::SIZE)?;
        Ok(T::read_fixed(data))
    }
}

impl<T> ReadBinaryDep for T
where
    T: ReadBinary,
{
    type Args<'a> = ();
    type HostType<'a> = T::HostType<'a>;

    fn read_dep<'a>(
        ctxt: &mut ReadCtxt<'a>,
        (): Self::Args<'_>,
    ) -> Result<Self::HostType<'a>, ParseError> {
        T::read(ctxt)
    }
}

/// A lazily decoded array of fixed size values.
pub struct ReadArray<'a, T: ReadFixed> {
    scope: ReadScope<'a>,
    length: usize,
    phantom: PhantomData<T>,
}

pub struct ReadArrayIter<'a, T: ReadFixed> {
    scope: ReadScope<'a>,
    index: usize,
    length: usize,
    phantom: PhantomData<T>,
}

impl<'a> ReadScope<'a> {
    pub fn new(data: &'a [u8]) -> ReadScope<'a> {
        ReadScope { base: 0, data }
    }

    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// The absolute position of this scope within the outermost scope it was derived from.
    pub fn base(&self) -> usize {
        self.base
    }

    pub fn offset(&self, offset: usize) -> ReadScope<'a> {
        ReadScope {
            base: self.base + offset,
            data: self.data.get(offset..).unwrap_or(&[]),
        }
    }

    /// A scope of `length` bytes starting at `offset`.
    ///
    /// An empty scope may start anywhere. Otherwise `offset` must fall inside this scope
    /// (`BadOffset`) and the scope must hold `length` bytes after it (`BadEof`).
    pub fn offset_length(&self, offset: usize, length: usize) -> Result<ReadScope<'a>, ParseError> {
        if length == 0 {
            return Ok(ReadScope {
                base: self.base + offset,
                data: &[],
            });
        }
        if offset >= self.data.len() {
            return Err(ParseError::BadOffset);
        }
        let end = offset.checked_add(length).ok_or(ParseError::BadEof)?;
        match self.data.get(offset..end) {
            Some(data) => Ok(ReadScope {
                base: self.base + offset,
                data,
            }),
            None => Err(ParseError::BadEof),
        }
    }

    pub fn ctxt(&self) -> ReadCtxt<'a> {
        ReadCtxt {
            scope: *self,
            offset: 0,
        }
    }

    pub fn read<T: ReadBinaryDep<Args<'a> = ()>>(&self) -> Result<T::HostType<'a>, ParseError> {
        self.ctxt().read::<T>()
    }

    pub fn read_dep<T: ReadBinaryDep>(
        &self,
        args: T::Args<'a>,
    ) -> Result<T::HostType<'a>, ParseError> {
        self.ctxt().read_dep::<T>(args)
    }
}

impl<'a> ReadCtxt<'a> {
    /// Check a condition, returning `ParseError::BadValue` if `false`.
    pub fn check(&self, cond: bool) -> Result<(), ParseError> {
        if cond {
            Ok(())
        } else {
            Err(ParseError::BadValue)
        }
    }

    /// Check a condition, returning `ParseError::BadVersion` if `false`.
    ///
    /// ```
    /// use ttextract::binary::read::ReadScope;
    /// use ttextract::error::ParseError;
    ///
    /// let scope = ReadScope::new(&[0, 2]);
    /// let mut ctxt = scope.ctxt();
    /// let major_version = ctxt.read_u16be().expect("unable to read version");
    ///
    /// assert!(ctxt.check_version(major_version == 2).is_ok());
    /// assert_eq!(ctxt.check_version(major_version == 1), Err(ParseError::BadVersion));
    /// ```
    pub fn check_version(&self, cond: bool) -> Result<(), ParseError> {
        if cond {
            Ok(())
        } else {
            Err(ParseError::BadVersion)
        }
    }

    /// The unread part of the scope.
    pub fn scope(&self) -> ReadScope<'a> {
        self.scope.offset(self.offset)
    }

    pub fn read<T: ReadBinaryDep<Args<'a> = ()>>(&mut self) -> Result<T::HostType<'a>, ParseError> {
        T::read_dep(self, ())
    }

    pub fn read_dep<T: ReadBinaryDep>(
        &mut self,
        args: T::Args<'a>,
    ) -> Result<T::HostType<'a>, ParseError> {
        T::read_dep(self, args)
    }

    /// Number of bytes left to read in this context.
    pub fn remaining(&self) -> usize {
        self.scope.data.len().saturating_sub(self.offset)
    }

    fn read_bytes<const N: usize>(&mut self) -> Result<[u8; N], ReadEof> {
        let mut bytes = [0; N];
        bytes.copy_from_slice(self.read_slice(N)?);
        Ok(bytes)
    }

    pub fn read_u8(&mut self) -> Result<u8, ReadEof> {
        self.read_bytes::<1>().map(u8::from_be_bytes)
    }

    pub fn read_u16be(&mut self) -> Result<u16, ReadEof> {
        self.read_bytes().map(u16::from_be_bytes)
    }

    pub fn read_i16be(&mut self) -> Result<i16, ReadEof> {
        self.read_bytes().map(i16::from_be_bytes)
    }

    pub fn read_u32be(&mut self) -> Result<u32, ReadEof> {
        self.read_bytes().map(u32::from_be_bytes)
    }

    pub fn read_i32be(&mut self) -> Result<i32, ReadEof> {
        self.read_bytes().map(i32::from_be_bytes)
    }

    pub fn read_i64be(&mut self) -> Result<i64, ReadEof> {
        self.read_bytes().map(i64::from_be_bytes)
    }

    pub fn read_array<T: ReadFixed>(
        &mut self,
        length: usize,
    ) -> Result<ReadArray<'a, T>, ParseError> {
        let byte_len = length.checked_mul(T::SIZE).ok_or(ParseError::LimitExceeded)?;
        let scope = self.read_scope(byte_len)?;
        Ok(ReadArray {
            scope,
            length,
            phantom: PhantomData,
        })
    }

    /// Read an array of up to `length` items, stopping early if the data runs out.
    ///
    /// Metrics tables in subset fonts are sometimes shorter than their declared counts.
    pub fn read_array_upto<T: ReadFixed>(
        &mut self,
        length: usize,
    ) -> Result<ReadArray<'a, T>, ParseError> {
        let length = length.min(self.remaining() / T::SIZE);
        self.read_array(length)
    }

    pub fn read_scope(&mut self, length: usize) -> Result<ReadScope<'a>, ReadEof> {
        let scope = self
            .scope
            .offset_length(self.offset, length)
            .map_err(|_| ReadEof {})?;
        self.offset += length;
        Ok(scope)
    }

    pub fn read_slice(&mut self, length: usize) -> Result<&'a [u8], ReadEof> {
        self.read_scope(length).map(|scope| scope.data)
    }
}

impl<'a, T: ReadFixed> ReadArray<'a, T> {
    pub fn empty() -> ReadArray<'a, T> {
        ReadArray {
            scope: ReadScope::new(&[]),
            length: 0,
            phantom: PhantomData,
        }
    }

    pub fn len(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Return `BadIndex` unless `index` is within the array.
    pub fn check_index(&self, index: usize) -> Result<(), ParseError> {
        if index < self.length {
            Ok(())
        } else {
            Err(ParseError::BadIndex)
        }
    }

    pub fn get_item(&self, index: usize) -> Option<T::HostType> {
        if index >= self.length {
            return None;
        }
        let start = index * T::SIZE;
        self.scope
            .data
            .get(start..start + T::SIZE)
            .map(T::read_fixed)
    }

    pub fn last(&self) -> Option<T::HostType> {
        self.get_item(self.length.checked_sub(1)?)
    }

    pub fn to_vec(&self) -> Vec<T::HostType> {
        self.iter().collect()
    }

    pub fn iter(&self) -> ReadArrayIter<'a, T> {
        ReadArrayIter {
            scope: self.scope,
            index: 0,
            length: self.length,
            phantom: PhantomData,
        }
    }

    /// Binary search a sorted array, like `slice::binary_search_by`.
    pub fn binary_search_by<F>(&self, mut f: F) -> Result<usize, usize>
    where
        F: FnMut(T::HostType) -> Ordering,
    {
        let (mut left, mut right) = (0, self.length);
        while left < right {
            let mid = left + (right - left) / 2;
            let item = match self.get_item(mid) {
                Some(item) => item,
                None => return Err(left),
            };
            match f(item) {
                Ordering::Less => left = mid + 1,
                Ordering::Greater => right = mid,
                Ordering::Equal => return Ok(mid),
            }
        }
        Err(left)
    }
}

impl<'a, T: ReadFixed> Clone for ReadArray<'a, T> {
    fn clone(&self) -> Self {
        ReadArray {
            scope: self.scope,
            length: self.length,
            phantom: PhantomData,
        }
    }
}

impl<'a, 'b, T: ReadFixed> IntoIterator for &'b ReadArray<'a, T> {
    type Item = T::HostType;
    type IntoIter = ReadArrayIter<'a, T>;

    fn into_iter(self) -> ReadArrayIter<'a, T> {
        self.iter()
    }
}

impl<'a, T: ReadFixed> Iterator for ReadArrayIter<'a, T> {
    type Item = T::HostType;

    fn next(&mut self) -> Option<T::HostType> {
        if self.index >= self.length {
            return None;
        }
        let start = self.index * T::SIZE;
        self.index += 1;
        self.scope
            .data
            .get(start..start + T::SIZE)
            .map(T::read_fixed)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.length - self.index;
        (remaining, Some(remaining))
    }
}

impl<'a, T: ReadFixed> ExactSizeIterator for ReadArrayIter<'a, T> {}

impl<'a, T> fmt::Debug for ReadArray<'a, T>
where
    T: ReadFixed,
    T::HostType: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl ReadFixed for U8 {
    type HostType = u8;

    const SIZE: usize = 1;

    fn read_fixed(data: &[u8]) -> u8 {
        data[0]
    }
}

impl ReadFixed for U16Be {
    type HostType = u16;

    const SIZE: usize = 2;

    fn read_fixed(data: &[u8]) -> u16 {
        u16::from_be_bytes([data[0], data[1]])
    }
}

impl ReadFixed for I16Be {
    type HostType = i16;

    const SIZE: usize = 2;

    fn read_fixed(data: &[u8]) -> i16 {
        i16::from_be_bytes([data[0], data[1]])
    }
}

impl ReadFixed for U32Be {
    type HostType = u32;

    const SIZE: usize = 4;

    fn read_fixed(data: &[u8]) -> u32 {
        u32::from_be_bytes([data[0], data[1], data[2], data[3]])
    }
}

impl ReadFixed for I32Be {
    type HostType = i32;

    const SIZE: usize = 4;

    fn read_fixed(data: &[u8]) -> i32 {
        i32::from_be_bytes([data[0], data[1], data[2], data[3]])
    }
}

impl<T1, T2> ReadFixed for (T1, T2)
where
    T1: ReadFixed,
    T2: ReadFixed,
{
    type HostType = (T1::HostType, T2::HostType);

    const SIZE: usize = T1::SIZE + T2::SIZE;

    fn read_fixed(data: &[u8]) -> Self::HostType {
        let (first, second) = data.split_at(T1::SIZE);
        (T1::read_fixed(first), T2::read_fixed(second))
    }
}

impl<T1, T2, T3> ReadFixed for (T1, T2, T3)
where
    T1: ReadFixed,
    T2: ReadFixed,
    T3: ReadFixed,
{
    type HostType = (T1::HostType, T2::HostType, T3::HostType);

    const SIZE: usize = T1::SIZE + T2::SIZE + T3::SIZE;

    fn read_fixed(data: &[u8]) -> Self::HostType {
        let (first, rest) = data.split_at(T1::SIZE);
        let (second, third) = rest.split_at(T2::SIZE);
        (
            T1::read_fixed(first),
            T2::read_fixed(second),
            T3::read_fixed(third),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_primitives() {
        let scope = ReadScope::new(&[1, 2, 0xFF, 0xFE, 0, 0, 0, 9]);
        let mut ctxt = scope.ctxt();

        assert_eq!(ctxt.read::<U16Be>().unwrap(), 0x102);
        assert_eq!(ctxt.read_i16be().unwrap(), -2);
        assert_eq!(ctxt.read::<(U16Be, U16Be)>().unwrap(), (0, 9));
        assert_eq!(ctxt.remaining(), 0);
        assert!(ctxt.read_u8().is_err());
    }

    #[test]
    fn offset_length_bounds() {
        let scope = ReadScope::new(&[1, 2, 3]);

        assert!(scope.offset_length(99, 0).is_ok());
        assert_eq!(scope.offset_length(99, 1), Err(ParseError::BadOffset));
        assert_eq!(scope.offset_length(2, 2), Err(ParseError::BadEof));
        assert_eq!(scope.offset_length(1, 2).unwrap().data(), &[2, 3]);
        assert_eq!(scope.offset_length(1, 2).unwrap().base(), 1);
    }

    #[test]
    fn short_array_is_truncated() {
        let scope = ReadScope::new(&[0, 1, 0, 2, 0]);
        let array = scope.ctxt().read_array_upto::<U16Be>(10).unwrap();

        assert_eq!(array.to_vec(), vec![1, 2]);
    }

    #[test]
    fn array_access() {
        let scope = ReadScope::new(&[0, 1, 0, 2, 0, 4]);
        let array = scope.ctxt().read_array::<U16Be>(3).unwrap();

        assert_eq!(array.get_item(1), Some(2));
        assert_eq!(array.get_item(3), None);
        assert_eq!(array.last(), Some(4));
        assert_eq!(array.check_index(3), Err(ParseError::BadIndex));
        assert_eq!(array.binary_search_by(|item| item.cmp(&4)), Ok(2));
        assert_eq!(array.binary_search_by(|item| item.cmp(&3)), Err(2));
        assert_eq!(format!("{:?}", array), "[1, 2, 4]");
    }
}
