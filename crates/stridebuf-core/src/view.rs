use std::marker::PhantomData;

use crate::{
    codec, ByteView, CodecError, ElementKind, RawBuffer, Value, ValueError, ViewDescriptor,
    ViewElement,
};

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ViewError {
    #[error("Byte offset {byte_offset} is past the end of a {byte_length} byte buffer")]
    OffsetOutOfRange {
        byte_offset: usize,
        byte_length: usize,
    },
    #[error("Start offset of a {kind} view should be a multiple of {width}, got {byte_offset}")]
    MisalignedOffset {
        kind: ElementKind,
        width: usize,
        byte_offset: usize,
    },
    #[error("Byte length of a {kind} view should be a multiple of {width}, {remaining} bytes remain")]
    MisalignedLength {
        kind: ElementKind,
        width: usize,
        remaining: usize,
    },
    #[error("{count} {kind} elements at offset {byte_offset} do not fit in a {byte_length} byte buffer")]
    CountExceedsBuffer {
        kind: ElementKind,
        count: usize,
        byte_offset: usize,
        byte_length: usize,
    },
    #[error("{count} {kind} elements do not fit in addressable memory")]
    LengthOverflow { kind: ElementKind, count: usize },
    #[error("A stride of {stride} {kind} elements does not fit in addressable memory")]
    StrideOverflow { kind: ElementKind, stride: usize },
    #[error("Index {index} is out of bounds for a view of length {len}")]
    IndexOutOfBounds { index: usize, len: usize },
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error(transparent)]
    Value(#[from] ValueError),
}

/// What a view is constructed from.
#[derive(Debug, Clone)]
pub enum Source {
    /// View existing bytes without copying.
    Buffer(RawBuffer),
    /// Allocate a zeroed buffer holding this many elements.
    Length(usize),
    /// Allocate a buffer and populate it from these values.
    Values(Vec<Value>),
}

impl From<RawBuffer> for Source {
    fn from(buffer: RawBuffer) -> Self {
        Source::Buffer(buffer)
    }
}

impl From<usize> for Source {
    fn from(len: usize) -> Self {
        Source::Length(len)
    }
}

impl From<Vec<Value>> for Source {
    fn from(values: Vec<Value>) -> Self {
        Source::Values(values)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Extent {
    /// Dense views keep the element count they were built with.
    Fixed(usize),
    /// Strided views fill whatever remains of the buffer.
    Derived,
}

/// A view of `T` elements laid out `stride` elements apart in a shared [`RawBuffer`].
///
/// With a stride of 1 this is a plain dense view. Indexed writes go straight to the
/// shared buffer and are visible through every other view of it.
#[derive(Clone)]
pub struct StridedView<T: ViewElement> {
    buffer: RawBuffer,
    descriptor: ViewDescriptor,
    extent: Extent,
    _marker: PhantomData<T>,
}

impl<T: ViewElement> StridedView<T> {
    pub const WIDTH: usize = T::KIND.size_of();

    fn dense(buffer: RawBuffer, byte_offset: usize, len: usize) -> Self {
        Self {
            buffer,
            descriptor: ViewDescriptor::dense(byte_offset),
            extent: Extent::Fixed(len),
            _marker: PhantomData,
        }
    }

    /// A dense view over a fresh zeroed buffer.
    pub fn zeros(len: usize) -> Result<Self, ViewError> {
        let n_bytes = len
            .checked_mul(Self::WIDTH)
            .ok_or(ViewError::LengthOverflow {
                kind: T::KIND,
                count: len,
            })?;
        Ok(Self::dense(RawBuffer::zeros(n_bytes), 0, len))
    }

    /// A dense view over a fresh buffer holding `values`.
    pub fn from_values(values: &[T]) -> Self {
        let buffer = RawBuffer::zeros(values.len() * Self::WIDTH);
        {
            let mut bytes = buffer.write();
            for (chunk, value) in bytes.chunks_exact_mut(Self::WIDTH).zip(values) {
                value.write_le(chunk);
            }
        }
        Self::dense(buffer, 0, values.len())
    }

    /// Views `buffer` without copying.
    ///
    /// A `stride` of `None`, 0 or 1 gives a dense view whose length is `count`, or
    /// the remaining bytes divided by the element width. A larger stride gives a
    /// strided view whose length always fills the remaining bytes; `count` is
    /// accepted for symmetry but does not bound it.
    pub fn from_buffer(
        buffer: RawBuffer,
        byte_offset: usize,
        count: Option<usize>,
        stride: Option<usize>,
    ) -> Result<Self, ViewError> {
        let byte_length = buffer.byte_length();
        if byte_offset > byte_length {
            return Err(ViewError::OffsetOutOfRange {
                byte_offset,
                byte_length,
            });
        }

        match stride {
            Some(stride) if stride > 1 => {
                if stride.checked_mul(Self::WIDTH).is_none() {
                    return Err(ViewError::StrideOverflow {
                        kind: T::KIND,
                        stride,
                    });
                }
                Ok(Self::strided(buffer, byte_offset, count, stride))
            }
            _ => Self::dense_over(buffer, byte_offset, count),
        }
    }

    fn dense_over(
        buffer: RawBuffer,
        byte_offset: usize,
        count: Option<usize>,
    ) -> Result<Self, ViewError> {
        let (kind, width, byte_length) = (T::KIND, Self::WIDTH, buffer.byte_length());
        if byte_offset % width != 0 {
            return Err(ViewError::MisalignedOffset {
                kind,
                width,
                byte_offset,
            });
        }
        let remaining = byte_length - byte_offset;
        let len = match count {
            Some(count) => {
                let fits = count.checked_mul(width).is_some_and(|n| n <= remaining);
                if !fits {
                    return Err(ViewError::CountExceedsBuffer {
                        kind,
                        count,
                        byte_offset,
                        byte_length,
                    });
                }
                count
            }
            None if remaining % width != 0 => {
                return Err(ViewError::MisalignedLength {
                    kind,
                    width,
                    remaining,
                })
            }
            None => remaining / width,
        };
        log::debug!(
            "Dense {} view of {} elements at offset {}",
            kind,
            len,
            byte_offset
        );
        Ok(Self::dense(buffer, byte_offset, len))
    }

    fn strided(buffer: RawBuffer, byte_offset: usize, count: Option<usize>, stride: usize) -> Self {
        let view = Self {
            buffer,
            descriptor: ViewDescriptor::new(byte_offset, stride),
            extent: Extent::Derived,
            _marker: PhantomData,
        };
        let len = view.len();
        if let Some(count) = count.filter(|&c| c != len) {
            log::warn!(
                "Requested count {} ignored for strided {} view, length derived from buffer is {}",
                count,
                T::KIND,
                len
            );
        }
        log::debug!(
            "Strided {} view {:?} of {} elements over {} bytes",
            T::KIND,
            view.descriptor,
            len,
            view.buffer.byte_length()
        );
        view
    }

    /// Builds a view the way a native typed view constructor would.
    ///
    /// Only a [`Source::Buffer`] looks at `byte_offset`, `count` and `stride`; the
    /// other sources always allocate a dense view of their own.
    pub fn from_source(
        source: impl Into<Source>,
        byte_offset: usize,
        count: Option<usize>,
        stride: Option<usize>,
    ) -> Result<Self, ViewError> {
        match source.into() {
            Source::Buffer(buffer) => Self::from_buffer(buffer, byte_offset, count, stride),
            Source::Length(len) => Self::zeros(len),
            Source::Values(values) => {
                let elements = values
                    .iter()
                    .map(T::from_value)
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Self::from_values(&elements))
            }
        }
    }
}

impl<T: ViewElement> StridedView<T> {
    pub fn kind(&self) -> ElementKind {
        T::KIND
    }

    pub fn buffer(&self) -> &RawBuffer {
        &self.buffer
    }

    pub fn descriptor(&self) -> ViewDescriptor {
        self.descriptor
    }

    pub fn byte_offset(&self) -> usize {
        self.descriptor.byte_offset()
    }

    pub fn stride(&self) -> usize {
        self.descriptor.stride()
    }

    pub fn is_strided(&self) -> bool {
        self.descriptor.is_strided()
    }

    pub fn len(&self) -> usize {
        match self.extent {
            Extent::Fixed(len) => len,
            Extent::Derived => self
                .descriptor
                .derived_len(self.buffer.byte_length(), Self::WIDTH),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bytes covered by the logical elements alone, gaps excluded.
    pub fn byte_length(&self) -> usize {
        self.len() * Self::WIDTH
    }

    /// Byte offset of logical element `index` in the underlying buffer.
    pub fn element_offset(&self, index: usize) -> usize {
        self.descriptor.element_offset(index, Self::WIDTH)
    }

    fn check_index(&self, index: usize) -> Result<usize, ViewError> {
        let len = self.len();
        if index >= len {
            return Err(ViewError::IndexOutOfBounds { index, len });
        }
        Ok(self.element_offset(index))
    }

    pub fn get(&self, index: usize) -> Result<T, ViewError> {
        let offset = self.check_index(index)?;
        Ok(codec::decode(&self.buffer.read(), offset)?)
    }

    pub fn set(&self, index: usize, value: T) -> Result<(), ViewError> {
        let offset = self.check_index(index)?;
        Ok(codec::encode(&mut self.buffer.write(), offset, value)?)
    }

    /// Infallible for `index < len`: the length derivation guarantees the bytes exist.
    pub(crate) fn read(&self, index: usize) -> T {
        let offset = self.element_offset(index);
        debug_assert!(offset + Self::WIDTH <= self.buffer.byte_length());
        T::read_le(&self.buffer.read()[offset..offset + Self::WIDTH])
    }

    /// Negative indices count back from the end.
    pub fn at(&self, index: isize) -> Option<T> {
        let len = self.len();
        let index = if index < 0 {
            len.checked_sub(index.unsigned_abs())?
        } else {
            index as usize
        };
        (index < len).then(|| self.read(index))
    }

    pub fn fill(&self, value: T) {
        let len = self.len();
        let mut bytes = self.buffer.write();
        for index in 0..len {
            let offset = self.element_offset(index);
            value.write_le(&mut bytes[offset..offset + Self::WIDTH]);
        }
    }

    pub fn to_vec(&self) -> Vec<T> {
        self.iter().collect()
    }

    /// Byte-level access to the buffer, anchored at this view's byte offset.
    pub fn byte_view(&self) -> ByteView {
        ByteView::new(self.buffer.clone(), self.byte_offset())
    }
}

impl<T: ViewElement> std::fmt::Debug for StridedView<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let len = self.len();
        let shown = len.min(64);
        let values = (0..shown).map(|i| self.read(i)).collect::<Vec<_>>();
        f.debug_struct("StridedView")
            .field("kind", &T::KIND)
            .field("descriptor", &self.descriptor)
            .field("len", &len)
            .field("values", &values)
            .finish()
    }
}
