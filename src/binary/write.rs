//! Write binary data

use crate::binary::{I16Be, U16Be, U32Be};
use crate::error::WriteError;

/// An in-memory buffer that implements `WriteContext`.
#[derive(Debug, Default)]
pub struct WriteBuffer {
    data: Vec<u8>,
}

/// A type that can be written to a `WriteContext` in binary form.
pub trait WriteBinary<HostType = Self> {
    /// Write the binary representation of `val` to `ctxt`.
    fn write<C: WriteContext>(ctxt: &mut C, val: HostType) -> Result<(), WriteError>;
}

/// Something binary data can be written to.
pub trait WriteContext {
    /// Write every value of `iter` as a `T`.
    fn write_iter<T, HostType>(
        &mut self,
        iter: impl Iterator<Item = HostType>,
    ) -> Result<(), WriteError>
    where
        Self: Sized,
        T: WriteBinary<HostType>,
    {
        for val in iter {
            T::write(self, val)?;
        }

        Ok(())
    }

    fn write_bytes(&mut self, data: &[u8]) -> Result<(), WriteError>;

    fn write_zeros(&mut self, count: usize) -> Result<(), WriteError>;

    /// The total number of bytes written so far.
    fn bytes_written(&self) -> usize;
}

impl WriteBuffer {
    pub fn new() -> Self {
        WriteBuffer { data: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        WriteBuffer {
            data: Vec::with_capacity(capacity),
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.data
    }
}

impl WriteContext for WriteBuffer {
    fn write_bytes(&mut self, data: &[u8]) -> Result<(), WriteError> {
        self.data.extend_from_slice(data);
        Ok(())
    }

    fn write_zeros(&mut self, count: usize) -> Result<(), WriteError> {
        self.data.resize(self.data.len() + count, 0);
        Ok(())
    }

    fn bytes_written(&self) -> usize {
        self.data.len()
    }
}

impl WriteBinary<u16> for U16Be {
    fn write<C: WriteContext>(ctxt: &mut C, val: u16) -> Result<(), WriteError> {
        ctxt.write_bytes(&val.to_be_bytes())
    }
}

impl WriteBinary<i16> for I16Be {
    fn write<C: WriteContext>(ctxt: &mut C, val: i16) -> Result<(), WriteError> {
        ctxt.write_bytes(&val.to_be_bytes())
    }
}

impl WriteBinary<u32> for U32Be {
    fn write<C: WriteContext>(ctxt: &mut C, val: u32) -> Result<(), WriteError> {
        ctxt.write_bytes(&val.to_be_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binary::read::ReadScope;

    #[test]
    fn write_big_endian() {
        let mut buffer = WriteBuffer::new();
        U16Be::write(&mut buffer, 0x1234).unwrap();
        I16Be::write(&mut buffer, -2).unwrap();
        U32Be::write(&mut buffer, 7).unwrap();
        buffer.write_zeros(2).unwrap();

        assert_eq!(buffer.bytes(), &[0x12, 0x34, 0xFF, 0xFE, 0, 0, 0, 7, 0, 0]);
        assert_eq!(buffer.bytes_written(), 10);
    }

    #[test]
    fn written_values_read_back() {
        let values = [0u16, 1, 0x8000, 0xFFFF];
        let mut buffer = WriteBuffer::with_capacity(values.len() * 2);
        buffer.write_iter::<U16Be, _>(values.iter().copied()).unwrap();
        let data = buffer.into_inner();

        let array = ReadScope::new(&data)
            .ctxt()
            .read_array::<U16Be>(values.len())
            .unwrap();
        assert_eq!(array.to_vec(), values);
    }
}
