use serde::{Deserialize, Serialize};

/// Where a view starts in its buffer and how far apart its elements are.
///
/// `stride` counts elements, not bytes: consecutive logical elements are
/// `stride * width` bytes apart.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ViewDescriptor {
    byte_offset: usize,
    stride: usize,
}

impl ViewDescriptor {
    /// A stride of 0 is treated as 1.
    pub fn new(byte_offset: usize, stride: usize) -> Self {
        Self {
            byte_offset,
            stride: stride.max(1),
        }
    }

    pub fn dense(byte_offset: usize) -> Self {
        Self::new(byte_offset, 1)
    }

    pub fn byte_offset(&self) -> usize {
        self.byte_offset
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn is_strided(&self) -> bool {
        self.stride > 1
    }

    /// Bytes between consecutive logical elements.
    pub fn pitch(&self, width: usize) -> usize {
        self.stride * width
    }

    pub fn element_offset(&self, index: usize, width: usize) -> usize {
        self.byte_offset + index * self.pitch(width)
    }

    /// Number of whole strides that fit between `byte_offset` and the end of the buffer.
    ///
    /// Zero when the pitch overflows `usize`, since not even one stride fits.
    pub fn derived_len(&self, buffer_length: usize, width: usize) -> usize {
        let remaining = buffer_length.saturating_sub(self.byte_offset);
        match self.stride.checked_mul(width) {
            Some(pitch) if pitch > 0 => remaining / pitch,
            _ => 0,
        }
    }
}

impl std::fmt::Debug for ViewDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[+{}:{}]", self.byte_offset, self.stride)
    }
}
