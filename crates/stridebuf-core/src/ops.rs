//! Derived operations. Copies always land in a fresh dense buffer; `bulk_set` writes
//! through to the shared one.
use crate::{codec, StridedView, ViewElement, ViewError};

/// Resolves a possibly negative index against `len`, clamping into `0..=len`.
pub(crate) fn relative_index(index: isize, len: usize) -> usize {
    if index < 0 {
        len.saturating_sub(index.unsigned_abs())
    } else {
        (index as usize).min(len)
    }
}

impl<T: ViewElement> StridedView<T> {
    /// Copies elements `start..end` into a new dense view.
    ///
    /// `None` means the start or end of the view. Negative bounds count back from the
    /// end; an empty range gives an empty view.
    pub fn slice(&self, start: Option<isize>, end: Option<isize>) -> Self {
        let len = self.len();
        let start = start.map_or(0, |s| relative_index(s, len));
        let end = end.map_or(len, |e| relative_index(e, len));
        let values = (start..end.max(start))
            .map(|i| self.read(i))
            .collect::<Vec<_>>();
        log::trace!("Sliced {}..{} of a {} view", start, end, T::KIND);
        Self::from_values(&values)
    }

    /// Writes `values` into consecutive logical elements starting at `offset`.
    ///
    /// Values that would land past the end of the view are dropped. Returns how many
    /// were written.
    pub fn bulk_set(&self, values: &[T], offset: usize) -> Result<usize, ViewError> {
        let n = values.len().min(self.len().saturating_sub(offset));
        let mut bytes = self.buffer().write();
        for (i, value) in values[..n].iter().enumerate() {
            codec::encode(&mut bytes, self.element_offset(offset + i), *value)?;
        }
        Ok(n)
    }

    /// Copies every element of `other` into this view starting at `offset`.
    pub fn copy_from(&self, other: &StridedView<T>, offset: usize) -> Result<usize, ViewError> {
        //decode first, the two views may share a buffer
        let values = other.to_vec();
        self.bulk_set(&values, offset)
    }

    pub fn map<F: FnMut(T) -> T>(&self, f: F) -> Self {
        let values = self.iter().map(f).collect::<Vec<_>>();
        Self::from_values(&values)
    }

    pub fn filter<P: FnMut(&T) -> bool>(&self, predicate: P) -> Self {
        let values = self.iter().filter(predicate).collect::<Vec<_>>();
        log::trace!("Kept {} of {} {} elements", values.len(), self.len(), T::KIND);
        Self::from_values(&values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RawBuffer;

    fn interleaved_f32() -> (RawBuffer, StridedView<f32>) {
        let main = StridedView::<f32>::from_values(&[0., 0., 1., 1., 2., 2., 3., 3.]);
        let buffer = main.buffer().clone();
        let view = StridedView::<f32>::from_buffer(buffer.clone(), 0, Some(4), Some(2)).unwrap();
        (buffer, view)
    }

    #[test]
    fn test_relative_index() {
        assert_eq!(relative_index(-1, 4), 3);
        assert_eq!(relative_index(-9, 4), 0);
        assert_eq!(relative_index(9, 4), 4);
        assert_eq!(relative_index(2, 4), 2);
    }

    #[test]
    fn test_slice_copies() {
        let (buffer, view) = interleaved_f32();
        let copy = view.slice(None, None);
        assert_eq!(copy.len(), 4);
        assert_eq!(copy.byte_length(), 16);
        assert_eq!(copy.buffer().byte_length(), 16);
        assert_ne!(copy.buffer(), &buffer);
        assert_eq!(copy.to_vec(), vec![0., 1., 2., 3.]);

        let inner = view.slice(Some(1), Some(-1));
        assert_eq!(inner.to_vec(), vec![1., 2.]);
        assert_eq!(inner.buffer().byte_length(), 8);

        assert!(view.slice(Some(3), Some(1)).is_empty());
    }

    #[test]
    fn test_bulk_set() {
        let (buffer, view) = interleaved_f32();
        assert_eq!(view.bulk_set(&[4., 5., 6., 7.], 0).unwrap(), 4);
        assert_eq!(view.to_vec(), vec![4., 5., 6., 7.]);
        let main = StridedView::<f32>::from_buffer(buffer, 0, None, None).unwrap();
        assert_eq!(main.to_vec(), vec![4., 0., 5., 1., 6., 2., 7., 3.]);
    }

    #[test]
    fn test_bulk_set_offset_and_truncation() {
        let (buffer, view) = interleaved_f32();
        assert_eq!(view.bulk_set(&[4., 5.], 2).unwrap(), 2);
        assert_eq!(view.to_vec(), vec![0., 1., 4., 5.]);
        let main = StridedView::<f32>::from_buffer(buffer, 0, None, None).unwrap();
        assert_eq!(main.to_vec(), vec![0., 0., 1., 1., 4., 2., 5., 3.]);

        assert_eq!(view.bulk_set(&[9., 9., 9.], 3).unwrap(), 1);
        assert_eq!(view.bulk_set(&[9.], 10).unwrap(), 0);
        assert_eq!(view.to_vec(), vec![0., 1., 4., 9.]);
    }

    #[test]
    fn test_copy_from_aliasing_view() {
        let buffer = RawBuffer::from_bytes(&[1, 2, 3, 4, 5, 6]);
        let evens = StridedView::<u8>::from_buffer(buffer.clone(), 0, None, Some(2)).unwrap();
        let odds = StridedView::<u8>::from_buffer(buffer.clone(), 1, None, Some(2)).unwrap();
        //the odd view only has room for two strides
        assert_eq!(odds.len(), 2);
        assert_eq!(odds.copy_from(&evens, 0).unwrap(), 2);
        assert_eq!(buffer.to_vec(), vec![1, 1, 3, 3, 5, 6]);
    }

    #[test]
    fn test_map_and_filter() {
        let (buffer, view) = interleaved_f32();
        let mapped = view.map(|v| v + 1.);
        assert_eq!(mapped.to_vec(), vec![1., 2., 3., 4.]);
        assert_eq!(mapped.buffer().byte_length(), 16);
        assert_ne!(mapped.buffer(), &buffer);

        let filtered = view.filter(|v| v % 2. == 0.);
        assert_eq!(filtered.to_vec(), vec![0., 2.]);
        assert_eq!(filtered.byte_length(), 8);
        assert_eq!(filtered.buffer().byte_length(), 8);

        mapped.set(0, 100.).unwrap();
        assert_eq!(view.get(0).unwrap(), 0.);
    }
}
