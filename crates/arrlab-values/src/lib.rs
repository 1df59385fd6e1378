//! Typed array containers for the arrlab environment.
//!
//! All shapes are column-major: axis 0 varies fastest and trailing axes are
//! outermost. Readers that bridge row-major storage formats are responsible
//! for reversing axis order before constructing these values.

use std::fmt;

/// Element type tags for host values, ordered by matching precedence:
/// wider and more precise types rank before narrower ones, strings last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementType {
    Float64,
    Float32,
    UInt64,
    Int64,
    UInt32,
    Int32,
    UInt16,
    Int16,
    Byte,
    Str,
    Undefined,
}

impl ElementType {
    /// Byte width of one element, `None` for strings and `Undefined`.
    pub fn byte_width(self) -> Option<usize> {
        match self {
            ElementType::Float64 | ElementType::UInt64 | ElementType::Int64 => Some(8),
            ElementType::Float32 | ElementType::UInt32 | ElementType::Int32 => Some(4),
            ElementType::UInt16 | ElementType::Int16 => Some(2),
            ElementType::Byte => Some(1),
            ElementType::Str | ElementType::Undefined => None,
        }
    }

    pub fn is_numeric(self) -> bool {
        self.byte_width().is_some()
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ElementType::Float64 => "double",
            ElementType::Float32 => "single",
            ElementType::UInt64 => "uint64",
            ElementType::Int64 => "int64",
            ElementType::UInt32 => "uint32",
            ElementType::Int32 => "int32",
            ElementType::UInt16 => "uint16",
            ElementType::Int16 => "int16",
            ElementType::Byte => "byte",
            ElementType::Str => "string",
            ElementType::Undefined => "undefined",
        };
        write!(f, "{name}")
    }
}

/// Dense numeric array: contiguous data plus a column-major shape.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericArray<T> {
    pub data: Vec<T>,
    pub shape: Vec<usize>,
}

impl<T: Clone + Default> NumericArray<T> {
    pub fn new(data: Vec<T>, shape: Vec<usize>) -> Result<Self, String> {
        let expected: usize = shape.iter().product();
        if data.len() != expected {
            return Err(format!(
                "array data length {} doesn't match shape {:?} ({} elements)",
                data.len(),
                shape,
                expected
            ));
        }
        Ok(NumericArray { data, shape })
    }

    pub fn zeros(shape: Vec<usize>) -> Self {
        let len: usize = shape.iter().product();
        NumericArray {
            data: vec![T::default(); len],
            shape,
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// N-D array of string scalars.
#[derive(Debug, Clone, PartialEq)]
pub struct StringArray {
    pub data: Vec<String>,
    pub shape: Vec<usize>,
}

impl StringArray {
    pub fn new(data: Vec<String>, shape: Vec<usize>) -> Result<Self, String> {
        let expected: usize = shape.iter().product();
        if data.len() != expected {
            return Err(format!(
                "StringArray data length {} doesn't match shape {:?} ({} elements)",
                data.len(),
                shape,
                expected
            ));
        }
        Ok(StringArray { data, shape })
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// A fully typed host value: one buffer, one shape, one element type.
///
/// Numeric variants expose the buffer as raw bytes so a native read call can
/// populate it in place; once constructed a value is never resized.
#[derive(Debug, Clone, PartialEq)]
pub enum HostValue {
    Byte(NumericArray<u8>),
    Int16(NumericArray<i16>),
    UInt16(NumericArray<u16>),
    Int32(NumericArray<i32>),
    UInt32(NumericArray<u32>),
    Int64(NumericArray<i64>),
    UInt64(NumericArray<u64>),
    Float32(NumericArray<f32>),
    Float64(NumericArray<f64>),
    Str(StringArray),
}

impl HostValue {
    /// Allocate a zero-filled value of the given element type and shape.
    ///
    /// `Undefined` has no host representation and is rejected; callers are
    /// expected to have turned it into an unsupported-type error already.
    pub fn zeros(ty: ElementType, shape: Vec<usize>) -> Result<HostValue, String> {
        Ok(match ty {
            ElementType::Byte => HostValue::Byte(NumericArray::zeros(shape)),
            ElementType::Int16 => HostValue::Int16(NumericArray::zeros(shape)),
            ElementType::UInt16 => HostValue::UInt16(NumericArray::zeros(shape)),
            ElementType::Int32 => HostValue::Int32(NumericArray::zeros(shape)),
            ElementType::UInt32 => HostValue::UInt32(NumericArray::zeros(shape)),
            ElementType::Int64 => HostValue::Int64(NumericArray::zeros(shape)),
            ElementType::UInt64 => HostValue::UInt64(NumericArray::zeros(shape)),
            ElementType::Float32 => HostValue::Float32(NumericArray::zeros(shape)),
            ElementType::Float64 => HostValue::Float64(NumericArray::zeros(shape)),
            ElementType::Str => {
                let len: usize = shape.iter().product();
                HostValue::Str(StringArray {
                    data: vec![String::new(); len],
                    shape,
                })
            }
            ElementType::Undefined => {
                return Err("cannot allocate a value of undefined element type".to_string())
            }
        })
    }

    pub fn element_type(&self) -> ElementType {
        match self {
            HostValue::Byte(_) => ElementType::Byte,
            HostValue::Int16(_) => ElementType::Int16,
            HostValue::UInt16(_) => ElementType::UInt16,
            HostValue::Int32(_) => ElementType::Int32,
            HostValue::UInt32(_) => ElementType::UInt32,
            HostValue::Int64(_) => ElementType::Int64,
            HostValue::UInt64(_) => ElementType::UInt64,
            HostValue::Float32(_) => ElementType::Float32,
            HostValue::Float64(_) => ElementType::Float64,
            HostValue::Str(_) => ElementType::Str,
        }
    }

    pub fn shape(&self) -> &[usize] {
        match self {
            HostValue::Byte(a) => &a.shape,
            HostValue::Int16(a) => &a.shape,
            HostValue::UInt16(a) => &a.shape,
            HostValue::Int32(a) => &a.shape,
            HostValue::UInt32(a) => &a.shape,
            HostValue::Int64(a) => &a.shape,
            HostValue::UInt64(a) => &a.shape,
            HostValue::Float32(a) => &a.shape,
            HostValue::Float64(a) => &a.shape,
            HostValue::Str(a) => &a.shape,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            HostValue::Byte(a) => a.len(),
            HostValue::Int16(a) => a.len(),
            HostValue::UInt16(a) => a.len(),
            HostValue::Int32(a) => a.len(),
            HostValue::UInt32(a) => a.len(),
            HostValue::Int64(a) => a.len(),
            HostValue::UInt64(a) => a.len(),
            HostValue::Float32(a) => a.len(),
            HostValue::Float64(a) => a.len(),
            HostValue::Str(a) => a.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Mutable raw-byte view of the numeric buffer, `None` for strings.
    ///
    /// This is the destination a native read call fills in place.
    pub fn as_mut_bytes(&mut self) -> Option<&mut [u8]> {
        match self {
            HostValue::Byte(a) => Some(a.data.as_mut_slice()),
            HostValue::Int16(a) => Some(bytemuck::cast_slice_mut(a.data.as_mut_slice())),
            HostValue::UInt16(a) => Some(bytemuck::cast_slice_mut(a.data.as_mut_slice())),
            HostValue::Int32(a) => Some(bytemuck::cast_slice_mut(a.data.as_mut_slice())),
            HostValue::UInt32(a) => Some(bytemuck::cast_slice_mut(a.data.as_mut_slice())),
            HostValue::Int64(a) => Some(bytemuck::cast_slice_mut(a.data.as_mut_slice())),
            HostValue::UInt64(a) => Some(bytemuck::cast_slice_mut(a.data.as_mut_slice())),
            HostValue::Float32(a) => Some(bytemuck::cast_slice_mut(a.data.as_mut_slice())),
            HostValue::Float64(a) => Some(bytemuck::cast_slice_mut(a.data.as_mut_slice())),
            HostValue::Str(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_array_rejects_length_mismatch() {
        let err = NumericArray::new(vec![1.0f64, 2.0], vec![3]).unwrap_err();
        assert!(err.contains("doesn't match shape"));
    }

    #[test]
    fn zeros_allocates_full_extent() {
        let v = HostValue::zeros(ElementType::Float64, vec![2, 3]).unwrap();
        assert_eq!(v.len(), 6);
        assert_eq!(v.shape(), &[2, 3]);
        assert_eq!(v.element_type(), ElementType::Float64);
    }

    #[test]
    fn zeros_rejects_undefined() {
        assert!(HostValue::zeros(ElementType::Undefined, vec![1]).is_err());
    }

    #[test]
    fn byte_view_matches_element_width() {
        let mut v = HostValue::zeros(ElementType::Int16, vec![4]).unwrap();
        assert_eq!(v.as_mut_bytes().expect("numeric").len(), 8);
    }

    #[test]
    fn byte_view_is_write_through() {
        let mut v = HostValue::zeros(ElementType::Float64, vec![2]).unwrap();
        let bytes = v.as_mut_bytes().expect("numeric");
        bytes[..8].copy_from_slice(&1.5f64.to_ne_bytes());
        match v {
            HostValue::Float64(a) => assert_eq!(a.data, vec![1.5, 0.0]),
            other => panic!("unexpected value {other:?}"),
        }
    }

    #[test]
    fn strings_have_no_byte_view() {
        let mut v = HostValue::zeros(ElementType::Str, vec![2]).unwrap();
        assert!(v.as_mut_bytes().is_none());
    }
}
