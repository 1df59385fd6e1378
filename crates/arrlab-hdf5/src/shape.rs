//! Rank and extent derivation, including array-typed elements.
//!
//! The external library stores extents outermost-first (row-major); host
//! values are column-major (innermost-first). [`compose_host_shape`] is the
//! single place the reversal happens: applied anywhere else, or skipped,
//! dimension order would be transposed silently.

use log::debug;

use crate::error::{introspection_error, H5Error, H5Result};
use crate::library::{H5Library, Hid, TypeClass};
use crate::MAX_RANK;

/// Scalar element type beneath a datatype, plus the element's own extents
/// (outermost first, empty for plain scalars).
///
/// The handle is freshly acquired; the caller owns it and must guard it.
pub(crate) struct ArrayElement {
    pub dtype: Hid,
    pub extents: Vec<u64>,
}

/// Detect an array-typed element and extract its scalar base type.
///
/// Plain scalar datatypes are duplicated instead so downstream handling is
/// uniform either way.
pub(crate) fn array_element<L: H5Library + ?Sized>(lib: &L, dtype: Hid) -> H5Result<ArrayElement> {
    if lib.type_class(dtype) == TypeClass::Array {
        let rank = lib.array_rank(dtype);
        if rank < 0 {
            return Err(introspection_error(lib));
        }
        let rank = rank as usize;
        if rank > MAX_RANK {
            return Err(H5Error::Introspection(format!(
                "array element rank {rank} exceeds supported maximum {MAX_RANK}"
            )));
        }
        let mut dims = [0u64; MAX_RANK];
        if lib.array_extents(dtype, &mut dims) < 0 {
            return Err(introspection_error(lib));
        }
        debug!("array datatype of rank {rank}, extents {:?}", &dims[..rank]);
        let base = lib.array_base_type(dtype);
        if !base.is_valid() {
            return Err(introspection_error(lib));
        }
        Ok(ArrayElement {
            dtype: base,
            extents: dims[..rank].to_vec(),
        })
    } else {
        let copy = lib.copy_type(dtype);
        if !copy.is_valid() {
            return Err(introspection_error(lib));
        }
        Ok(ArrayElement {
            dtype: copy,
            extents: Vec::new(),
        })
    }
}

/// Rank and per-axis extents of a simple dataspace, outermost first.
pub(crate) fn dataspace_extents<L: H5Library + ?Sized>(lib: &L, space: Hid) -> H5Result<Vec<u64>> {
    let rank = lib.simple_extent_rank(space);
    if rank < 0 {
        return Err(introspection_error(lib));
    }
    let rank = rank as usize;
    if rank > MAX_RANK {
        return Err(H5Error::Introspection(format!(
            "dataspace rank {rank} exceeds supported maximum {MAX_RANK}"
        )));
    }
    let mut dims = [0u64; MAX_RANK];
    if lib.simple_extent_dims(space, &mut dims) < 0 {
        return Err(introspection_error(lib));
    }
    debug!("dataspace rank {rank}, extents {:?}", &dims[..rank]);
    Ok(dims[..rank].to_vec())
}

/// Compose the host shape: element sub-array axes reversed, then dataset
/// axes reversed. Resulting rank is the sum of both ranks.
pub(crate) fn compose_host_shape(elem_extents: &[u64], data_extents: &[u64]) -> Vec<usize> {
    let mut shape = Vec::with_capacity(elem_extents.len() + data_extents.len());
    shape.extend(elem_extents.iter().rev().map(|&d| d as usize));
    shape.extend(data_extents.iter().rev().map(|&d| d as usize));
    shape
}

/// Host-order (column-major) extents of a bare dataspace handle.
///
/// The dataspace is caller-owned and is not released here.
pub fn dataspace_shape<L: H5Library + ?Sized>(lib: &L, space: Hid) -> H5Result<Vec<usize>> {
    let extents = dataspace_extents(lib, space)?;
    Ok(compose_host_shape(&[], &extents))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::NamedType;
    use crate::testing::{FakeLibrary, FakeType};

    #[test]
    fn compose_reverses_dataset_axes() {
        assert_eq!(compose_host_shape(&[], &[2, 3, 4]), vec![4, 3, 2]);
    }

    #[test]
    fn compose_prepends_reversed_element_axes() {
        // rank-2 dataset [5,6] with a rank-1 array element [3]
        assert_eq!(compose_host_shape(&[3], &[5, 6]), vec![3, 6, 5]);
        // rank sums
        assert_eq!(compose_host_shape(&[2, 3], &[5, 6]).len(), 4);
        assert_eq!(compose_host_shape(&[2, 3], &[5, 6]), vec![3, 2, 6, 5]);
    }

    #[test]
    fn compose_of_scalar_is_empty() {
        assert!(compose_host_shape(&[], &[]).is_empty());
    }

    #[test]
    fn scalar_datatype_yields_rank_zero_element() {
        let lib = FakeLibrary::new();
        let dt = lib.add_datatype(FakeType::named(NamedType::NativeDouble));
        let elem = array_element(&lib, dt).expect("scalar element");
        assert!(elem.extents.is_empty());
        assert!(elem.dtype.is_valid());
        assert_ne!(elem.dtype, dt);
        lib.close_type(elem.dtype);
    }

    #[test]
    fn array_datatype_yields_base_type_and_extents() {
        let lib = FakeLibrary::new();
        let dt = lib.add_datatype(FakeType::array(
            FakeType::named(NamedType::NativeInt32),
            &[3, 4],
        ));
        let elem = array_element(&lib, dt).expect("array element");
        assert_eq!(elem.extents, vec![3, 4]);
        assert!(lib.is_type(elem.dtype, NamedType::NativeInt32));
        lib.close_type(elem.dtype);
    }

    #[test]
    fn dataspace_shape_is_host_order() {
        let lib = FakeLibrary::new();
        let space = lib.create_simple_space(&[2, 3, 4]);
        let shape = dataspace_shape(&lib, space).expect("shape");
        assert_eq!(shape, vec![4, 3, 2]);
        lib.close_space(space);
    }

    #[test]
    fn failed_extent_query_is_introspection_error() {
        let lib = FakeLibrary::new();
        let space = lib.create_simple_space(&[2]);
        lib.fail_next(crate::testing::FailPoint::ExtentDims);
        let err = dataspace_extents(&lib, space).unwrap_err();
        assert!(matches!(err, H5Error::Introspection(_)));
        lib.close_space(space);
    }
}
