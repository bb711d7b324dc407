use futures_util::stream::{BoxStream, StreamExt};

use crate::{
    dtype::with_element_type, ByteView, Clamped, ElementKind, RawBuffer, Source, StridedView,
    Value, ViewDescriptor, ViewElement, ViewError,
};

/// A view whose element kind is only known at runtime.
#[derive(Clone, Debug)]
pub enum AnyView {
    Int8(StridedView<i8>),
    Uint8(StridedView<u8>),
    Uint8Clamped(StridedView<Clamped>),
    Int16(StridedView<i16>),
    Uint16(StridedView<u16>),
    Int32(StridedView<i32>),
    Uint32(StridedView<u32>),
    Float32(StridedView<f32>),
    Float64(StridedView<f64>),
    BigInt64(StridedView<i64>),
    BigUint64(StridedView<u64>),
}

macro_rules! dispatch {
    ($self:expr, $v:ident => $body:expr) => {
        match $self {
            AnyView::Int8($v) => $body,
            AnyView::Uint8($v) => $body,
            AnyView::Uint8Clamped($v) => $body,
            AnyView::Int16($v) => $body,
            AnyView::Uint16($v) => $body,
            AnyView::Int32($v) => $body,
            AnyView::Uint32($v) => $body,
            AnyView::Float32($v) => $body,
            AnyView::Float64($v) => $body,
            AnyView::BigInt64($v) => $body,
            AnyView::BigUint64($v) => $body,
        }
    };
}

/// Like `dispatch!`, wrapping the resulting view back into the same variant.
macro_rules! rewrap {
    ($self:expr, $v:ident => $body:expr) => {
        match $self {
            AnyView::Int8($v) => AnyView::Int8($body),
            AnyView::Uint8($v) => AnyView::Uint8($body),
            AnyView::Uint8Clamped($v) => AnyView::Uint8Clamped($body),
            AnyView::Int16($v) => AnyView::Int16($body),
            AnyView::Uint16($v) => AnyView::Uint16($body),
            AnyView::Int32($v) => AnyView::Int32($body),
            AnyView::Uint32($v) => AnyView::Uint32($body),
            AnyView::Float32($v) => AnyView::Float32($body),
            AnyView::Float64($v) => AnyView::Float64($body),
            AnyView::BigInt64($v) => AnyView::BigInt64($body),
            AnyView::BigUint64($v) => AnyView::BigUint64($body),
        }
    };
}

macro_rules! any_view_from {
    ($t:ty, $v:ident) => {
        impl From<StridedView<$t>> for AnyView {
            fn from(view: StridedView<$t>) -> Self {
                AnyView::$v(view)
            }
        }
    };
}

any_view_from!(i8, Int8);
any_view_from!(u8, Uint8);
any_view_from!(Clamped, Uint8Clamped);
any_view_from!(i16, Int16);
any_view_from!(u16, Uint16);
any_view_from!(i32, Int32);
any_view_from!(u32, Uint32);
any_view_from!(f32, Float32);
any_view_from!(f64, Float64);
any_view_from!(i64, BigInt64);
any_view_from!(u64, BigUint64);

/// Creates a view of `kind` elements.
///
/// A buffer source with a stride above 1 gives a strided view over that buffer. Every
/// other source behaves like the native typed view constructor. See
/// [`StridedView::from_source`].
pub fn make_view(
    kind: ElementKind,
    source: impl Into<Source>,
    byte_offset: usize,
    count: Option<usize>,
    stride: Option<usize>,
) -> Result<AnyView, ViewError> {
    let source = source.into();
    with_element_type!(kind, E => {
        StridedView::<E>::from_source(source, byte_offset, count, stride).map(AnyView::from)
    })
}

fn bulk_set_values<E: ViewElement>(
    view: &StridedView<E>,
    values: &[Value],
    offset: usize,
) -> Result<usize, ViewError> {
    let elements = values
        .iter()
        .map(E::from_value)
        .collect::<Result<Vec<_>, _>>()?;
    view.bulk_set(&elements, offset)
}

fn map_values<E: ViewElement>(
    view: &StridedView<E>,
    f: &mut dyn FnMut(Value) -> Value,
) -> Result<StridedView<E>, ViewError> {
    let values = view
        .iter()
        .map(|v| E::from_value(&f(v.to_value())))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(StridedView::from_values(&values))
}

impl AnyView {
    pub fn kind(&self) -> ElementKind {
        dispatch!(self, v => v.kind())
    }

    pub fn buffer(&self) -> &RawBuffer {
        dispatch!(self, v => v.buffer())
    }

    pub fn descriptor(&self) -> ViewDescriptor {
        dispatch!(self, v => v.descriptor())
    }

    pub fn byte_offset(&self) -> usize {
        dispatch!(self, v => v.byte_offset())
    }

    pub fn stride(&self) -> usize {
        dispatch!(self, v => v.stride())
    }

    pub fn is_strided(&self) -> bool {
        dispatch!(self, v => v.is_strided())
    }

    pub fn len(&self) -> usize {
        dispatch!(self, v => v.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn byte_length(&self) -> usize {
        dispatch!(self, v => v.byte_length())
    }

    pub fn get(&self, index: usize) -> Result<Value, ViewError> {
        dispatch!(self, v => Ok(v.get(index)?.to_value()))
    }

    pub fn set(&self, index: usize, value: &Value) -> Result<(), ViewError> {
        dispatch!(self, v => v.set(index, ViewElement::from_value(value)?))
    }

    pub fn at(&self, index: isize) -> Option<Value> {
        dispatch!(self, v => v.at(index).map(ViewElement::to_value))
    }

    pub fn fill(&self, value: &Value) -> Result<(), ViewError> {
        dispatch!(self, v => {
            v.fill(ViewElement::from_value(value)?);
            Ok(())
        })
    }

    /// Coerces every value before writing any, so a mismatch leaves the buffer untouched.
    pub fn bulk_set(&self, values: &[Value], offset: usize) -> Result<usize, ViewError> {
        dispatch!(self, v => bulk_set_values(v, values, offset))
    }

    pub fn slice(&self, start: Option<isize>, end: Option<isize>) -> AnyView {
        rewrap!(self, v => v.slice(start, end))
    }

    /// The results of `f` are coerced back into this view's kind.
    pub fn map<F: FnMut(Value) -> Value>(&self, mut f: F) -> Result<AnyView, ViewError> {
        Ok(rewrap!(self, v => map_values(v, &mut f)?))
    }

    pub fn filter<P: FnMut(&Value) -> bool>(&self, mut predicate: P) -> AnyView {
        rewrap!(self, v => v.filter(|x| predicate(&x.to_value())))
    }

    pub fn to_vec(&self) -> Vec<Value> {
        self.iter().collect()
    }

    pub fn iter(&self) -> Box<dyn Iterator<Item = Value> + '_> {
        dispatch!(self, v => Box::new(v.iter().map(ViewElement::to_value)))
    }

    pub fn stream(&self) -> BoxStream<'_, Value> {
        dispatch!(self, v => v.stream().map(ViewElement::to_value).boxed())
    }

    pub fn byte_view(&self) -> ByteView {
        dispatch!(self, v => v.byte_view())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ValueError;
    use strum::IntoEnumIterator;

    #[test]
    fn test_every_kind_strided() {
        let buffer = RawBuffer::zeros(64);
        for kind in ElementKind::iter() {
            let view = make_view(kind, buffer.clone(), 0, None, Some(2)).unwrap();
            assert_eq!(view.kind(), kind);
            assert_eq!(view.len(), 64 / (2 * kind.size_of()));
            assert_eq!(view.byte_length(), view.len() * kind.size_of());
            assert_eq!(view.buffer(), &buffer);

            let (zero, one) = if kind.is_bigint() {
                (Value::BigInt(0), Value::BigInt(1))
            } else {
                (Value::Number(0.0), Value::Number(1.0))
            };
            view.set(1, &one).unwrap();
            assert_eq!(view.get(1).unwrap(), one);
            let raw = view.byte_view().get_value(kind, 2 * kind.size_of()).unwrap();
            assert_eq!(raw, one, "{} element 1 sits one stride in", kind);
            view.set(1, &zero).unwrap();
        }
    }

    #[test]
    fn test_literal_sources_are_dense() {
        let view = make_view(
            ElementKind::Int16,
            vec![Value::from(1), Value::from(-2), Value::from(70000)],
            4,
            Some(10),
            Some(3),
        )
        .unwrap();
        assert!(!view.is_strided());
        assert_eq!(view.byte_offset(), 0);
        assert_eq!(
            view.to_vec(),
            vec![Value::from(1), Value::from(-2), Value::from(4464)]
        );

        let zeros = make_view(ElementKind::BigUint64, 2usize, 0, None, None).unwrap();
        assert_eq!(zeros.to_vec(), vec![Value::BigInt(0); 2]);
    }

    #[test]
    fn test_type_mismatch_propagates() {
        let view = make_view(ElementKind::Float32, 4usize, 0, None, None).unwrap();
        assert!(matches!(
            view.set(0, &Value::BigInt(1)),
            Err(ViewError::Value(ValueError::TypeMismatch { .. }))
        ));
        let err = view.bulk_set(&[Value::from(1), Value::BigInt(2)], 0);
        assert!(err.is_err());
        assert_eq!(view.to_vec(), vec![Value::Number(0.0); 4]);

        let err = view.map(|_| Value::BigInt(7));
        assert!(matches!(err, Err(ViewError::Value(_))));
    }

    #[test]
    fn test_derived_ops() {
        let view = make_view(
            ElementKind::Uint8,
            RawBuffer::from_bytes(&[0, 0, 1, 1, 2, 2, 3, 3]),
            0,
            Some(4),
            Some(2),
        )
        .unwrap();
        let doubled = view.map(|v| Value::Number(v.as_f64() * 2.0)).unwrap();
        assert_eq!(doubled.kind(), ElementKind::Uint8);
        assert_eq!(doubled.to_vec(), [0, 2, 4, 6].map(Value::from).to_vec());

        let odd = view.filter(|v| v.as_f64() % 2.0 == 1.0);
        assert_eq!(odd.to_vec(), [1, 3].map(Value::from).to_vec());
        assert_ne!(odd.buffer(), view.buffer());

        let tail = view.slice(Some(-2), None);
        assert_eq!(tail.to_vec(), [2, 3].map(Value::from).to_vec());
        assert_eq!(view.at(-1), Some(Value::from(3)));

        let streamed = pollster::block_on(view.stream().collect::<Vec<_>>());
        assert_eq!(streamed, view.to_vec());
    }
}
