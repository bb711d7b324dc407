use crate::{codec, CodecError, ElementKind, RawBuffer, Value, ViewElement, ViewError};

/// Unstrided byte-level access to a buffer from a fixed starting offset.
///
/// Offsets passed to the accessors are relative to that start and may be unaligned.
#[derive(Debug, Clone, derive_new::new)]
pub struct ByteView {
    buffer: RawBuffer,
    byte_offset: usize,
}

impl ByteView {
    pub fn buffer(&self) -> &RawBuffer {
        &self.buffer
    }

    pub fn byte_offset(&self) -> usize {
        self.byte_offset
    }

    pub fn byte_length(&self) -> usize {
        self.buffer.byte_length().saturating_sub(self.byte_offset)
    }

    pub fn get<T: ViewElement>(&self, byte_offset: usize) -> Result<T, CodecError> {
        let bytes = self.buffer.read();
        codec::decode(window(&bytes, self.byte_offset), byte_offset)
    }

    pub fn set<T: ViewElement>(&self, byte_offset: usize, value: T) -> Result<(), CodecError> {
        let mut bytes = self.buffer.write();
        codec::encode(window_mut(&mut bytes, self.byte_offset), byte_offset, value)
    }

    pub fn get_value(&self, kind: ElementKind, byte_offset: usize) -> Result<Value, CodecError> {
        let bytes = self.buffer.read();
        kind.codec().decode(window(&bytes, self.byte_offset), byte_offset)
    }

    pub fn set_value(
        &self,
        kind: ElementKind,
        byte_offset: usize,
        value: &Value,
    ) -> Result<(), ViewError> {
        let mut bytes = self.buffer.write();
        let window = window_mut(&mut bytes, self.byte_offset);
        kind.codec().encode(window, byte_offset, value)
    }
}

fn window(bytes: &[u8], start: usize) -> &[u8] {
    bytes.get(start..).unwrap_or_default()
}

fn window_mut(bytes: &mut [u8], start: usize) -> &mut [u8] {
    bytes.get_mut(start..).unwrap_or_default()
}
