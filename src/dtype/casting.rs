//! Safe casting between element types
//!
//! A cast is safe when every value of the source type is exactly representable in
//! the target type. The one historical exception is kept: 64-bit integers are
//! considered to cast safely to 64-bit floats.

use super::{DType, DTypeKind};

/// Whether `from` can be cast to `to` without losing information
pub fn can_cast_safely(from: DType, to: DType) -> bool {
    if from == to {
        return true;
    }

    let from_size = from.itemsize();
    let to_size = to.itemsize();

    match (from.kind(), to.kind()) {
        (DTypeKind::Bool, _) => true,
        (_, DTypeKind::Object) => true,
        (DTypeKind::Object, _) => false,

        (DTypeKind::Signed, DTypeKind::Signed) | (DTypeKind::Unsigned, DTypeKind::Unsigned) => {
            to_size >= from_size
        }
        (DTypeKind::Unsigned, DTypeKind::Signed) => to_size > from_size,
        (DTypeKind::Signed | DTypeKind::Unsigned, DTypeKind::Float) => {
            to_size >= float_size_for_integer(from_size)
        }
        (DTypeKind::Signed | DTypeKind::Unsigned, DTypeKind::Complex) => {
            to_size / 2 >= float_size_for_integer(from_size)
        }

        (DTypeKind::Float, DTypeKind::Float) => to_size >= from_size,
        (DTypeKind::Float, DTypeKind::Complex) => to_size / 2 >= from_size,
        (DTypeKind::Complex, DTypeKind::Complex) => to_size >= from_size,

        _ => false,
    }
}

/// Smallest float width that holds every integer of the given width
fn float_size_for_integer(int_size: usize) -> usize {
    (int_size * 2).min(8)
}
