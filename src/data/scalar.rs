//! Closed set of element types with a runtime tag.
//!
//! Arrays keep their values in an [`ArrayBuffer`], a tagged union with one
//! `Vec<T>` variant per supported element type. Typed access goes through the
//! [`Scalar`] trait, which compares the requested type's tag against the
//! stored one instead of reinterpreting memory.

use std::fmt;

use num_traits::{NumCast, ToPrimitive};
use serde::{Deserialize, Serialize};

/// Element type tag for runtime-typed arrays.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub enum ScalarType {
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    I64,
    U64,
    F32,
    F64,
}

impl ScalarType {
    /// Every supported element type, smallest integers first.
    pub const ALL: [ScalarType; 10] = [
        ScalarType::I8,
        ScalarType::U8,
        ScalarType::I16,
        ScalarType::U16,
        ScalarType::I32,
        ScalarType::U32,
        ScalarType::I64,
        ScalarType::U64,
        ScalarType::F32,
        ScalarType::F64,
    ];

    /// Returns a stable string label for the scalar type.
    pub fn as_str(self) -> &'static str {
        match self {
            ScalarType::I8 => "int8_t",
            ScalarType::U8 => "uint8_t",
            ScalarType::I16 => "int16_t",
            ScalarType::U16 => "uint16_t",
            ScalarType::I32 => "int32_t",
            ScalarType::U32 => "uint32_t",
            ScalarType::I64 => "int64_t",
            ScalarType::U64 => "uint64_t",
            ScalarType::F32 => "float",
            ScalarType::F64 => "double",
        }
    }

    /// Parse a scalar type from a string label.
    ///
    /// Accepts both the labels produced by [`as_str`](Self::as_str) and the
    /// Rust primitive names (`"f32"`, `"i64"`, ...).
    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "int8_t" | "i8" => Some(ScalarType::I8),
            "uint8_t" | "u8" => Some(ScalarType::U8),
            "int16_t" | "i16" => Some(ScalarType::I16),
            "uint16_t" | "u16" => Some(ScalarType::U16),
            "int32_t" | "i32" => Some(ScalarType::I32),
            "uint32_t" | "u32" => Some(ScalarType::U32),
            "int64_t" | "i64" => Some(ScalarType::I64),
            "uint64_t" | "u64" => Some(ScalarType::U64),
            "float" | "f32" => Some(ScalarType::F32),
            "double" | "f64" => Some(ScalarType::F64),
            _ => None,
        }
    }

    /// Size of one element in bytes.
    pub fn size(self) -> usize {
        match self {
            ScalarType::I8 | ScalarType::U8 => 1,
            ScalarType::I16 | ScalarType::U16 => 2,
            ScalarType::I32 | ScalarType::U32 | ScalarType::F32 => 4,
            ScalarType::I64 | ScalarType::U64 | ScalarType::F64 => 8,
        }
    }

    /// True for `F32` and `F64`.
    pub fn is_float(self) -> bool {
        matches!(self, ScalarType::F32 | ScalarType::F64)
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tagged element storage; one variant per [`ScalarType`].
#[derive(Clone, Debug, PartialEq)]
pub enum ArrayBuffer {
    I8(Vec<i8>),
    U8(Vec<u8>),
    I16(Vec<i16>),
    U16(Vec<u16>),
    I32(Vec<i32>),
    U32(Vec<u32>),
    I64(Vec<i64>),
    U64(Vec<u64>),
    F32(Vec<f32>),
    F64(Vec<f64>),
}

/// Evaluate `$body` with `$v` bound to the inner `Vec` of whichever variant
/// `$buf` holds.
macro_rules! with_buffer {
    ($buf:expr, $v:ident => $body:expr) => {
        match $buf {
            ArrayBuffer::I8($v) => $body,
            ArrayBuffer::U8($v) => $body,
            ArrayBuffer::I16($v) => $body,
            ArrayBuffer::U16($v) => $body,
            ArrayBuffer::I32($v) => $body,
            ArrayBuffer::U32($v) => $body,
            ArrayBuffer::I64($v) => $body,
            ArrayBuffer::U64($v) => $body,
            ArrayBuffer::F32($v) => $body,
            ArrayBuffer::F64($v) => $body,
        }
    };
}
pub(crate) use with_buffer;

/// Evaluate `$body` with the type alias `$t` naming the Rust type behind the
/// [`ScalarType`] value `$ty`.
macro_rules! with_scalar_type {
    ($ty:expr, $t:ident => $body:expr) => {
        match $ty {
            $crate::data::scalar::ScalarType::I8 => {
                type $t = i8;
                $body
            }
            $crate::data::scalar::ScalarType::U8 => {
                type $t = u8;
                $body
            }
            $crate::data::scalar::ScalarType::I16 => {
                type $t = i16;
                $body
            }
            $crate::data::scalar::ScalarType::U16 => {
                type $t = u16;
                $body
            }
            $crate::data::scalar::ScalarType::I32 => {
                type $t = i32;
                $body
            }
            $crate::data::scalar::ScalarType::U32 => {
                type $t = u32;
                $body
            }
            $crate::data::scalar::ScalarType::I64 => {
                type $t = i64;
                $body
            }
            $crate::data::scalar::ScalarType::U64 => {
                type $t = u64;
                $body
            }
            $crate::data::scalar::ScalarType::F32 => {
                type $t = f32;
                $body
            }
            $crate::data::scalar::ScalarType::F64 => {
                type $t = f64;
                $body
            }
        }
    };
}
pub(crate) use with_scalar_type;

impl ArrayBuffer {
    /// Zero-filled buffer of `len` elements.
    pub fn zeroed(scalar_type: ScalarType, len: usize) -> Self {
        match scalar_type {
            ScalarType::I8 => ArrayBuffer::I8(vec![0; len]),
            ScalarType::U8 => ArrayBuffer::U8(vec![0; len]),
            ScalarType::I16 => ArrayBuffer::I16(vec![0; len]),
            ScalarType::U16 => ArrayBuffer::U16(vec![0; len]),
            ScalarType::I32 => ArrayBuffer::I32(vec![0; len]),
            ScalarType::U32 => ArrayBuffer::U32(vec![0; len]),
            ScalarType::I64 => ArrayBuffer::I64(vec![0; len]),
            ScalarType::U64 => ArrayBuffer::U64(vec![0; len]),
            ScalarType::F32 => ArrayBuffer::F32(vec![0.0; len]),
            ScalarType::F64 => ArrayBuffer::F64(vec![0.0; len]),
        }
    }

    /// Scalar type tag for this buffer.
    pub fn scalar_type(&self) -> ScalarType {
        match self {
            ArrayBuffer::I8(_) => ScalarType::I8,
            ArrayBuffer::U8(_) => ScalarType::U8,
            ArrayBuffer::I16(_) => ScalarType::I16,
            ArrayBuffer::U16(_) => ScalarType::U16,
            ArrayBuffer::I32(_) => ScalarType::I32,
            ArrayBuffer::U32(_) => ScalarType::U32,
            ArrayBuffer::I64(_) => ScalarType::I64,
            ArrayBuffer::U64(_) => ScalarType::U64,
            ArrayBuffer::F32(_) => ScalarType::F32,
            ArrayBuffer::F64(_) => ScalarType::F64,
        }
    }

    /// Length in elements.
    pub fn len(&self) -> usize {
        with_buffer!(self, v => v.len())
    }

    /// Return true if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Resize to `new_len` elements; new elements are zero.
    pub fn resize(&mut self, new_len: usize) {
        with_buffer!(self, v => v.resize(new_len, Default::default()))
    }

    /// Set every element to zero, keeping the length.
    pub fn zero_fill(&mut self) {
        with_buffer!(self, v => v.iter_mut().for_each(|x| *x = Default::default()))
    }

    /// Raw little-endian (native) byte view of the elements.
    pub fn as_bytes(&self) -> &[u8] {
        with_buffer!(self, v => bytemuck::cast_slice(v.as_slice()))
    }

    /// Element `i` converted to `f64`, if in range.
    pub fn value_f64(&self, i: usize) -> Option<f64> {
        with_buffer!(self, v => v.get(i).and_then(|x| x.to_f64()))
    }

    /// Store `value` at element `i`, converting to the buffer's type.
    ///
    /// Returns `false` if `i` is out of range or `value` is not representable.
    pub fn set_value_f64(&mut self, i: usize, value: f64) -> bool {
        with_buffer!(self, v => {
            match (v.get_mut(i), NumCast::from(value)) {
                (Some(slot), Some(x)) => {
                    *slot = x;
                    true
                }
                _ => false,
            }
        })
    }
}

/// Maps a Rust element type to its [`ScalarType`] tag and buffer variant.
pub trait Scalar:
    bytemuck::Pod + Default + NumCast + PartialOrd + fmt::Debug + Send + Sync + 'static
{
    /// Scalar type tag for this concrete type.
    const SCALAR_TYPE: ScalarType;

    /// Wrap a typed vector into a tagged buffer.
    fn wrap(data: Vec<Self>) -> ArrayBuffer;
    /// Borrow the typed vector if the tag matches.
    fn unwrap(buffer: &ArrayBuffer) -> Option<&Vec<Self>>;
    /// Mutably borrow the typed vector if the tag matches.
    fn unwrap_mut(buffer: &mut ArrayBuffer) -> Option<&mut Vec<Self>>;
}

macro_rules! impl_scalar {
    ($($t:ty => $variant:ident),* $(,)?) => {
        $(
            impl Scalar for $t {
                const SCALAR_TYPE: ScalarType = ScalarType::$variant;

                fn wrap(data: Vec<Self>) -> ArrayBuffer {
                    ArrayBuffer::$variant(data)
                }

                fn unwrap(buffer: &ArrayBuffer) -> Option<&Vec<Self>> {
                    if let ArrayBuffer::$variant(v) = buffer { Some(v) } else { None }
                }

                fn unwrap_mut(buffer: &mut ArrayBuffer) -> Option<&mut Vec<Self>> {
                    if let ArrayBuffer::$variant(v) = buffer { Some(v) } else { None }
                }
            }
        )*
    };
}

impl_scalar!(
    i8 => I8,
    u8 => U8,
    i16 => I16,
    u16 => U16,
    i32 => I32,
    u32 => U32,
    i64 => I64,
    u64 => U64,
    f32 => F32,
    f64 => F64,
);
