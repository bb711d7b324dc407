use std::ops::Range;

use crate::{dtype::with_element_type, ElementKind, Value, ViewElement, ViewError};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    #[error("Cannot access {width} bytes at offset {byte_offset}, buffer holds {byte_length} bytes")]
    OutOfBounds {
        byte_offset: usize,
        width: usize,
        byte_length: usize,
    },
}

fn span(byte_length: usize, byte_offset: usize, width: usize) -> Result<Range<usize>, CodecError> {
    match byte_offset.checked_add(width) {
        Some(end) if end <= byte_length => Ok(byte_offset..end),
        _ => Err(CodecError::OutOfBounds {
            byte_offset,
            width,
            byte_length,
        }),
    }
}

/// Reads a little-endian `T` starting at `byte_offset`.
pub fn decode<T: ViewElement>(bytes: &[u8], byte_offset: usize) -> Result<T, CodecError> {
    let range = span(bytes.len(), byte_offset, T::KIND.size_of())?;
    Ok(T::read_le(&bytes[range]))
}

/// Writes `value` little-endian starting at `byte_offset`.
pub fn encode<T: ViewElement>(
    bytes: &mut [u8],
    byte_offset: usize,
    value: T,
) -> Result<(), CodecError> {
    let range = span(bytes.len(), byte_offset, T::KIND.size_of())?;
    value.write_le(&mut bytes[range]);
    Ok(())
}

/// Runtime codec for a single [`ElementKind`], working in terms of [`Value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_new::new)]
pub struct ElementCodec {
    kind: ElementKind,
}

impl ElementCodec {
    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    pub fn width(&self) -> usize {
        self.kind.size_of()
    }

    pub fn decode(&self, bytes: &[u8], byte_offset: usize) -> Result<Value, CodecError> {
        with_element_type!(self.kind, E => decode::<E>(bytes, byte_offset).map(E::to_value))
    }

    /// Coerces `value` into the codec's kind before writing; nothing is written on failure.
    pub fn encode(&self, bytes: &mut [u8], byte_offset: usize, value: &Value) -> Result<(), ViewError> {
        with_element_type!(self.kind, E => {
            let element = E::from_value(value)?;
            encode::<E>(bytes, byte_offset, element)?;
            Ok(())
        })
    }
}

impl From<ElementKind> for ElementCodec {
    fn from(kind: ElementKind) -> Self {
        ElementCodec::new(kind)
    }
}

impl ElementKind {
    pub fn codec(self) -> ElementCodec {
        ElementCodec::new(self)
    }
}
