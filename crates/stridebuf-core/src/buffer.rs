use parking_lot::{
    MappedRwLockReadGuard, MappedRwLockWriteGuard, RwLock, RwLockReadGuard, RwLockWriteGuard,
};
use std::sync::Arc;

/// Owned bytes with 8 byte alignment, backed by whole words.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlignedBytes {
    words: Vec<u64>,
    n_bytes: usize,
}

impl AlignedBytes {
    pub fn zeros(n_bytes: usize) -> Self {
        Self {
            words: vec![0u64; n_bytes.div_ceil(8)],
            n_bytes,
        }
    }

    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mut raw = Self::zeros(bytes.len());
        raw.as_bytes_mut().copy_from_slice(bytes);
        raw
    }

    pub fn n_bytes(&self) -> usize {
        self.n_bytes
    }

    pub fn as_bytes(&self) -> &[u8] {
        &bytemuck::cast_slice::<u64, u8>(&self.words)[..self.n_bytes]
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut bytemuck::cast_slice_mut::<u64, u8>(&mut self.words)[..self.n_bytes]
    }
}

/// A fixed-size block of bytes shared between views.
///
/// Cloning a `RawBuffer` hands out another reference to the same bytes; equality
/// is identity. The bytes are freed once the last handle, or the last view holding
/// one, is dropped. Use [`RawBuffer::deep_clone`] for an independent copy.
#[derive(Clone)]
pub struct RawBuffer {
    inner: Arc<RwLock<AlignedBytes>>,
    byte_length: usize,
}

impl RawBuffer {
    pub fn zeros(byte_length: usize) -> Self {
        Self::from(AlignedBytes::zeros(byte_length))
    }

    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self::from(AlignedBytes::from_bytes(bytes))
    }

    /// Fixed at allocation.
    pub fn byte_length(&self) -> usize {
        self.byte_length
    }

    pub fn read(&self) -> MappedRwLockReadGuard<'_, [u8]> {
        RwLockReadGuard::map(self.inner.read(), |raw| raw.as_bytes())
    }

    pub fn write(&self) -> MappedRwLockWriteGuard<'_, [u8]> {
        RwLockWriteGuard::map(self.inner.write(), |raw| raw.as_bytes_mut())
    }

    pub fn to_vec(&self) -> Vec<u8> {
        self.read().to_vec()
    }

    pub fn ptr_eq(&self, other: &RawBuffer) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Number of live handles, views included.
    pub fn handle_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }

    pub fn deep_clone(&self) -> Self {
        Self::from(self.inner.read().clone())
    }
}

impl From<AlignedBytes> for RawBuffer {
    fn from(raw: AlignedBytes) -> Self {
        let byte_length = raw.n_bytes();
        RawBuffer {
            inner: Arc::new(RwLock::new(raw)),
            byte_length,
        }
    }
}

impl From<Vec<u8>> for RawBuffer {
    fn from(bytes: Vec<u8>) -> Self {
        Self::from_bytes(&bytes)
    }
}

impl From<&[u8]> for RawBuffer {
    fn from(bytes: &[u8]) -> Self {
        Self::from_bytes(bytes)
    }
}

impl PartialEq for RawBuffer {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for RawBuffer {}

impl std::fmt::Debug for RawBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let bytes = self.read();
        let shown = bytes.len().min(64);
        f.debug_struct("RawBuffer")
            .field("byte_length", &self.byte_length)
            .field("bytes", &&bytes[..shown])
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alignment_and_length() {
        let raw = AlignedBytes::zeros(13);
        assert_eq!(raw.as_bytes().len(), 13);
        assert_eq!(raw.as_bytes().as_ptr() as usize % 8, 0);
        assert!(AlignedBytes::zeros(0).as_bytes().is_empty());
    }

    #[test]
    fn test_shared_identity() {
        let a = RawBuffer::from_bytes(&[1, 2, 3]);
        let b = a.clone();
        assert_eq!(a, b);
        assert_eq!(a.handle_count(), 2);

        b.write()[0] = 9;
        assert_eq!(a.to_vec(), vec![9, 2, 3]);

        let c = a.deep_clone();
        assert_ne!(a, c);
        c.write()[1] = 7;
        assert_eq!(a.to_vec(), vec![9, 2, 3]);
        assert_eq!(c.to_vec(), vec![9, 7, 3]);

        drop(b);
        assert_eq!(a.handle_count(), 1);
    }
}
