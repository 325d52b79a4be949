//! TypedArray: a runtime-typed, tuple-oriented numeric buffer.
//!
//! Every array has a shape of `tuples x components` and one element type
//! chosen at runtime. The flat buffer always holds exactly
//! `tuples * components` elements, i.e. `tuples * components * size_of(T)`
//! bytes.
//!
//! Typed views are borrowed from the array; a [`resize`](TypedArray::resize)
//! needs `&mut self`, so the borrow checker already forbids keeping a view
//! across a reallocation.

use crate::data::scalar::{ArrayBuffer, Scalar, ScalarType, with_buffer};
use crate::debug_invariants::DebugInvariants;
use crate::pipeline_error::PipelineError;

/// Content policy applied by [`TypedArray::resize_with`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum ResizeMode {
    /// Keep the first `min(old, new)` tuples; new tuples are zero.
    #[default]
    Preserve,
    /// Zero every tuple after resizing.
    Reinitialize,
}

/// Type, tuple count and component count of an array, without its contents.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ArrayShape {
    pub scalar_type: ScalarType,
    pub tuples: usize,
    pub components: usize,
}

/// Runtime-typed array of `tuples x components` elements.
#[derive(Clone, Debug, PartialEq)]
pub struct TypedArray {
    name: String,
    tuples: usize,
    components: usize,
    buffer: ArrayBuffer,
}

fn checked_len(tuples: usize, components: usize) -> Result<usize, PipelineError> {
    if components == 0 {
        return Err(PipelineError::InvalidShape(
            "component count must be at least 1".into(),
        ));
    }
    tuples.checked_mul(components).ok_or_else(|| {
        PipelineError::InvalidShape(format!(
            "{tuples} tuples x {components} components overflows"
        ))
    })
}

impl TypedArray {
    /// Create a zero-filled array.
    ///
    /// # Errors
    /// `InvalidShape` if `components == 0` or the element count overflows.
    pub fn new(
        scalar_type: ScalarType,
        tuples: usize,
        components: usize,
        name: impl Into<String>,
    ) -> Result<Self, PipelineError> {
        let len = checked_len(tuples, components)?;
        Ok(Self {
            name: name.into(),
            tuples,
            components,
            buffer: ArrayBuffer::zeroed(scalar_type, len),
        })
    }

    /// Wrap an existing vector; its length must be a multiple of `components`.
    pub fn from_vec<T: Scalar>(
        name: impl Into<String>,
        components: usize,
        data: Vec<T>,
    ) -> Result<Self, PipelineError> {
        if components == 0 || data.len() % components != 0 {
            return Err(PipelineError::InvalidShape(format!(
                "{} values cannot be split into tuples of {components} components",
                data.len()
            )));
        }
        Ok(Self {
            name: name.into(),
            tuples: data.len() / components,
            components,
            buffer: T::wrap(data),
        })
    }

    /// Zero-filled array with this array's type and a new name and shape.
    pub fn zeros_like(
        &self,
        name: impl Into<String>,
        tuples: usize,
        components: usize,
    ) -> Result<Self, PipelineError> {
        Self::new(self.scalar_type(), tuples, components, name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn scalar_type(&self) -> ScalarType {
        self.buffer.scalar_type()
    }

    pub fn number_of_tuples(&self) -> usize {
        self.tuples
    }

    pub fn number_of_components(&self) -> usize {
        self.components
    }

    /// Shape descriptor; carries no contents.
    pub fn shape(&self) -> ArrayShape {
        ArrayShape {
            scalar_type: self.scalar_type(),
            tuples: self.tuples,
            components: self.components,
        }
    }

    /// Number of elements (`tuples * components`).
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Buffer size in bytes.
    pub fn byte_len(&self) -> usize {
        self.len() * self.scalar_type().size()
    }

    /// Raw contents for exporters.
    pub fn as_bytes(&self) -> &[u8] {
        self.buffer.as_bytes()
    }

    /// Tagged buffer, for callers that dispatch over every element type.
    pub fn buffer(&self) -> &ArrayBuffer {
        &self.buffer
    }

    /// Resize to `new_tuples`, keeping existing tuples and zero-filling new ones.
    pub fn resize(&mut self, new_tuples: usize) -> Result<(), PipelineError> {
        self.resize_with(new_tuples, ResizeMode::Preserve)
    }

    /// Resize to `new_tuples` with an explicit content policy.
    pub fn resize_with(&mut self, new_tuples: usize, mode: ResizeMode) -> Result<(), PipelineError> {
        let len = checked_len(new_tuples, self.components)?;
        self.buffer.resize(len);
        if mode == ResizeMode::Reinitialize {
            self.buffer.zero_fill();
        }
        self.tuples = new_tuples;
        #[cfg(any(debug_assertions, feature = "check-invariants"))]
        self.debug_assert_invariants();
        Ok(())
    }

    /// Whole buffer as `&[T]`.
    ///
    /// # Errors
    /// `TypeMismatch` if `T` is not the stored element type.
    pub fn as_slice<T: Scalar>(&self) -> Result<&[T], PipelineError> {
        T::unwrap(&self.buffer)
            .map(Vec::as_slice)
            .ok_or(PipelineError::TypeMismatch {
                expected: T::SCALAR_TYPE,
                found: self.scalar_type(),
            })
    }

    /// Whole buffer as `&mut [T]`.
    pub fn as_mut_slice<T: Scalar>(&mut self) -> Result<&mut [T], PipelineError> {
        let found = self.scalar_type();
        T::unwrap_mut(&mut self.buffer)
            .map(Vec::as_mut_slice)
            .ok_or(PipelineError::TypeMismatch {
                expected: T::SCALAR_TYPE,
                found,
            })
    }

    /// Overwrite the whole buffer with `values`.
    ///
    /// # Errors
    /// `TypeMismatch` if `T` is not the stored element type, `InvalidShape`
    /// if `values` does not hold exactly [`len`](Self::len) elements.
    pub fn copy_from<T: Scalar>(&mut self, values: &[T]) -> Result<(), PipelineError> {
        if values.len() != self.len() {
            return Err(PipelineError::InvalidShape(format!(
                "`{}` holds {} values, got {}",
                self.name,
                self.len(),
                values.len()
            )));
        }
        self.as_mut_slice::<T>()?.copy_from_slice(values);
        Ok(())
    }

    /// Components of tuple `i`.
    pub fn tuple<T: Scalar>(&self, i: usize) -> Result<&[T], PipelineError> {
        let range = self.tuple_range(i)?;
        Ok(&self.as_slice::<T>()?[range])
    }

    /// Mutable components of tuple `i`.
    pub fn tuple_mut<T: Scalar>(&mut self, i: usize) -> Result<&mut [T], PipelineError> {
        let range = self.tuple_range(i)?;
        Ok(&mut self.as_mut_slice::<T>()?[range])
    }

    /// Element at flat index `i` as `f64`, whatever the stored type.
    pub fn value_f64(&self, i: usize) -> Option<f64> {
        self.buffer.value_f64(i)
    }

    /// Store `value` at flat index `i`, converting to the stored type.
    pub fn set_value_f64(&mut self, i: usize, value: f64) -> Result<(), PipelineError> {
        if self.buffer.set_value_f64(i, value) {
            Ok(())
        } else {
            Err(PipelineError::InvalidShape(format!(
                "cannot store {value} at index {i} of `{}` ({} elements of {})",
                self.name,
                self.len(),
                self.scalar_type()
            )))
        }
    }

    /// Set every element to `value` converted to the stored type.
    ///
    /// # Errors
    /// `InvalidParameter` if `value` is not representable in the element type.
    pub fn fill_f64(&mut self, value: f64) -> Result<(), PipelineError> {
        let ty = self.scalar_type();
        let unrepresentable = || {
            PipelineError::invalid_parameter(
                self.name.clone(),
                format!("{value} is not representable as {ty}"),
            )
        };
        with_buffer!(&mut self.buffer, v => {
            let x = num_traits::NumCast::from(value).ok_or_else(unrepresentable)?;
            v.iter_mut().for_each(|slot| *slot = x);
        });
        Ok(())
    }

    fn tuple_range(&self, i: usize) -> Result<std::ops::Range<usize>, PipelineError> {
        if i >= self.tuples {
            return Err(PipelineError::InvalidShape(format!(
                "tuple {i} out of range for `{}` with {} tuples",
                self.name, self.tuples
            )));
        }
        let start = i * self.components;
        Ok(start..start + self.components)
    }
}

impl DebugInvariants for TypedArray {
    fn debug_assert_invariants(&self) {
        crate::debug_invariants!(self.validate_invariants(), "TypedArray");
    }

    fn validate_invariants(&self) -> Result<(), PipelineError> {
        let expected = checked_len(self.tuples, self.components)?;
        if self.buffer.len() != expected {
            return Err(PipelineError::InvalidShape(format!(
                "`{}` holds {} elements, expected {} x {} = {expected}",
                self.name,
                self.buffer.len(),
                self.tuples,
                self.components
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn euler() -> TypedArray {
        TypedArray::from_vec("EulerAngles", 3, vec![1.0f32, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap()
    }

    #[test]
    fn new_is_zeroed_with_expected_size() {
        let a = TypedArray::new(ScalarType::I16, 4, 2, "Mask").unwrap();
        assert_eq!(a.len(), 8);
        assert_eq!(a.byte_len(), 16);
        assert!(a.as_slice::<i16>().unwrap().iter().all(|&x| x == 0));
    }

    #[test]
    fn copy_from_checks_length_and_type() {
        let mut a = euler();
        a.copy_from(&[6.0f32, 5.0, 4.0, 3.0, 2.0, 1.0]).unwrap();
        assert_eq!(a.tuple::<f32>(1).unwrap(), &[3.0, 2.0, 1.0]);
        assert!(matches!(
            a.copy_from(&[1.0f32; 3]),
            Err(PipelineError::InvalidShape(_))
        ));
        assert!(matches!(
            a.copy_from(&[1i32; 6]),
            Err(PipelineError::TypeMismatch { .. })
        ));
        assert_eq!(a.as_slice::<f32>().unwrap()[0], 6.0);
    }

    #[test]
    fn zero_components_is_invalid_shape() {
        let err = TypedArray::new(ScalarType::F32, 4, 0, "x").unwrap_err();
        assert!(matches!(err, PipelineError::InvalidShape(_)));
    }

    #[test]
    fn overflow_is_invalid_shape() {
        let err = TypedArray::new(ScalarType::U8, usize::MAX, 2, "x").unwrap_err();
        assert!(matches!(err, PipelineError::InvalidShape(_)));
    }

    #[test]
    fn resize_preserves_prefix_and_zero_fills() {
        let mut a = euler();
        a.resize(3).unwrap();
        assert_eq!(a.number_of_tuples(), 3);
        assert_eq!(a.tuple::<f32>(1).unwrap(), &[4.0, 5.0, 6.0]);
        assert_eq!(a.tuple::<f32>(2).unwrap(), &[0.0, 0.0, 0.0]);
        a.resize(1).unwrap();
        assert_eq!(a.as_slice::<f32>().unwrap(), &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn resize_reinitialize_clears() {
        let mut a = euler();
        a.resize_with(2, ResizeMode::Reinitialize).unwrap();
        assert!(a.as_slice::<f32>().unwrap().iter().all(|&x| x == 0.0));
    }

    #[test]
    fn typed_access_checks_tag() {
        let a = euler();
        let err = a.as_slice::<f64>().unwrap_err();
        assert_eq!(
            err,
            PipelineError::TypeMismatch {
                expected: ScalarType::F64,
                found: ScalarType::F32
            }
        );
        assert!(a.tuple::<i32>(0).is_err());
    }

    #[test]
    fn tuple_out_of_range() {
        let a = euler();
        assert!(matches!(
            a.tuple::<f32>(2),
            Err(PipelineError::InvalidShape(_))
        ));
    }

    #[test]
    fn fill_and_generic_values() {
        let mut a = TypedArray::new(ScalarType::U8, 3, 1, "Phases").unwrap();
        a.fill_f64(7.0).unwrap();
        assert_eq!(a.as_slice::<u8>().unwrap(), &[7, 7, 7]);
        assert!(a.fill_f64(-3.0).is_err());
        a.set_value_f64(1, 9.0).unwrap();
        assert_eq!(a.value_f64(1), Some(9.0));
        assert!(a.set_value_f64(3, 1.0).is_err());
    }

    #[test]
    fn from_vec_rejects_ragged_input() {
        assert!(TypedArray::from_vec("x", 3, vec![1i32, 2]).is_err());
    }
}
