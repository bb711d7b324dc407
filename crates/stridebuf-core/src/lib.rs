//! Element-typed views over shared byte buffers, with an optional stride between
//! logical elements.
mod any_view;
mod buffer;
mod byte_view;
mod codec;
mod descriptor;
mod dtype;
mod iter;
mod ops;
mod value;
mod view;

pub use any_view::*;
pub use buffer::*;
pub use byte_view::*;
pub use codec::*;
pub use descriptor::*;
pub use dtype::{Clamped, ElementKind, ViewElement};
pub use iter::*;
pub use value::*;
pub use view::*;

pub type Int8View = StridedView<i8>;
pub type Uint8View = StridedView<u8>;
pub type Uint8ClampedView = StridedView<Clamped>;
pub type Int16View = StridedView<i16>;
pub type Uint16View = StridedView<u16>;
pub type Int32View = StridedView<i32>;
pub type Uint32View = StridedView<u32>;
pub type Float32View = StridedView<f32>;
pub type Float64View = StridedView<f64>;
pub type Int64View = StridedView<i64>;
pub type Uint64View = StridedView<u64>;

pub mod prelude {
    pub use crate::{
        make_view, AnyView, ElementKind, RawBuffer, Source, StridedView, Value, ViewElement,
    };
}
