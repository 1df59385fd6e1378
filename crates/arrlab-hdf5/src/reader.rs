//! Read orchestration: one pipeline for attributes and datasets.
//!
//! Both object kinds go through the same linear sequence — acquire and guard
//! the dataspace and datatype, detect an array-typed element, resolve the
//! host shape, map the element type, allocate, read — differing only in
//! which acquisition and transfer entry points they use. [`H5Object`]
//! captures that difference so the pipeline is written once.
//!
//! There is no retry and no partial success: the first failing step aborts
//! the whole call with the library's diagnostic text, and every handle
//! acquired before that step is released by its guard as the call unwinds.

use arrlab_values::{ElementType, HostValue, StringArray};
use log::debug;

use crate::error::{introspection_error, open_error, read_error, H5Error, H5Result};
use crate::guard::{SpaceGuard, TypeGuard};
use crate::library::{H5Library, Hid};
use crate::shape::{array_element, compose_host_shape, dataspace_extents};
use crate::typemap::{map_element_type, transfer_type};

/// The two object kinds a read can target, reduced to the three entry
/// points where they differ: get-space, get-type, and the transfer call.
trait H5Object: Copy {
    fn handle(self) -> Hid;
    fn label(self) -> &'static str;
    fn space<L: H5Library + ?Sized>(self, lib: &L) -> Hid;
    fn datatype<L: H5Library + ?Sized>(self, lib: &L) -> Hid;
    /// Full-extent, zero-offset selection before the read. Datasets select
    /// on the file space and return a guarded memory space of identical
    /// extents; attributes have no selection step.
    fn select_all<'l, L: H5Library + ?Sized>(
        self,
        lib: &'l L,
        space: Hid,
        extents: &[u64],
    ) -> H5Result<Option<SpaceGuard<'l, L>>>;
    fn read<L: H5Library + ?Sized>(
        self,
        lib: &L,
        memtype: Hid,
        memspace: Hid,
        filespace: Hid,
        dest: &mut [u8],
    ) -> i32;
}

#[derive(Clone, Copy)]
struct AttributeObject(Hid);

#[derive(Clone, Copy)]
struct DatasetObject(Hid);

impl H5Object for AttributeObject {
    fn handle(self) -> Hid {
        self.0
    }

    fn label(self) -> &'static str {
        "attribute"
    }

    fn space<L: H5Library + ?Sized>(self, lib: &L) -> Hid {
        lib.attribute_space(self.0)
    }

    fn datatype<L: H5Library + ?Sized>(self, lib: &L) -> Hid {
        lib.attribute_type(self.0)
    }

    fn select_all<'l, L: H5Library + ?Sized>(
        self,
        _lib: &'l L,
        _space: Hid,
        _extents: &[u64],
    ) -> H5Result<Option<SpaceGuard<'l, L>>> {
        Ok(None)
    }

    fn read<L: H5Library + ?Sized>(
        self,
        lib: &L,
        memtype: Hid,
        _memspace: Hid,
        _filespace: Hid,
        dest: &mut [u8],
    ) -> i32 {
        lib.read_attribute(self.0, memtype, dest)
    }
}

impl H5Object for DatasetObject {
    fn handle(self) -> Hid {
        self.0
    }

    fn label(self) -> &'static str {
        "dataset"
    }

    fn space<L: H5Library + ?Sized>(self, lib: &L) -> Hid {
        lib.dataset_space(self.0)
    }

    fn datatype<L: H5Library + ?Sized>(self, lib: &L) -> Hid {
        lib.dataset_type(self.0)
    }

    fn select_all<'l, L: H5Library + ?Sized>(
        self,
        lib: &'l L,
        space: Hid,
        extents: &[u64],
    ) -> H5Result<Option<SpaceGuard<'l, L>>> {
        if !extents.is_empty() && lib.select_full_hyperslab(space, extents) < 0 {
            return Err(introspection_error(lib));
        }
        let memspace = lib.create_simple_space(extents);
        if !memspace.is_valid() {
            return Err(open_error(lib));
        }
        let guard = SpaceGuard::new(lib, memspace);
        if !extents.is_empty() && lib.select_full_hyperslab(memspace, extents) < 0 {
            return Err(introspection_error(lib));
        }
        Ok(Some(guard))
    }

    fn read<L: H5Library + ?Sized>(
        self,
        lib: &L,
        memtype: Hid,
        memspace: Hid,
        filespace: Hid,
        dest: &mut [u8],
    ) -> i32 {
        lib.read_dataset(self.0, memtype, memspace, filespace, dest)
    }
}

/// Read an attribute's entire contents into a host value.
///
/// The attribute handle is caller-owned: it is never released here and
/// stays valid whether the read succeeds or fails.
pub fn read_attribute<L: H5Library + ?Sized>(lib: &L, attr: Hid) -> H5Result<HostValue> {
    read_object(lib, AttributeObject(attr))
}

/// Read a dataset's entire contents into a host value.
///
/// Always reads the full extent; no partial or strided access is exposed.
/// The dataset handle is caller-owned and stays valid on failure.
pub fn read_dataset<L: H5Library + ?Sized>(lib: &L, dset: Hid) -> H5Result<HostValue> {
    read_object(lib, DatasetObject(dset))
}

fn read_object<L: H5Library + ?Sized, O: H5Object>(lib: &L, obj: O) -> H5Result<HostValue> {
    let space = obj.space(lib);
    if !space.is_valid() {
        return Err(introspection_error(lib));
    }
    let _space_guard = SpaceGuard::new(lib, space);

    let dtype = obj.datatype(lib);
    if !dtype.is_valid() {
        return Err(introspection_error(lib));
    }
    let _dtype_guard = TypeGuard::new(lib, dtype);

    // Array-typed elements contribute their own rank; plain scalars come
    // back as a rank-0 sub-array so the rest of the pipeline is uniform.
    let elem = array_element(lib, dtype)?;
    let _elem_guard = TypeGuard::new(lib, elem.dtype);

    let data_extents = dataspace_extents(lib, space)?;
    let shape = compose_host_shape(&elem.extents, &data_extents);

    let mapped = map_element_type(lib, elem.dtype);
    debug!(
        "{} {}: element type {mapped}, host shape {shape:?}",
        obj.label(),
        obj.handle().raw()
    );
    if mapped == ElementType::Undefined {
        return Err(H5Error::UnsupportedType {
            type_id: elem.dtype.raw(),
        });
    }

    let memspace = obj.select_all(lib, space, &data_extents)?;
    let memspace_hid = memspace.as_ref().map(|g| g.hid()).unwrap_or(Hid::ALL);

    if mapped == ElementType::Str {
        // Strings ignore the selection and always read everything.
        return read_strings(lib, obj, dtype, &shape);
    }

    let mut value = HostValue::zeros(mapped, shape).map_err(H5Error::Allocation)?;

    let base = match transfer_type(mapped) {
        Some(named) => lib.named_type(named),
        None => {
            return Err(H5Error::UnsupportedType {
                type_id: elem.dtype.raw(),
            })
        }
    };
    // For array-typed elements the transfer type is a native array type of
    // the element's extents, released after the read.
    let mut _transfer_guard = None;
    let memtype = if elem.extents.is_empty() {
        base
    } else {
        let arr = lib.create_array_type(base, &elem.extents);
        if !arr.is_valid() {
            return Err(open_error(lib));
        }
        _transfer_guard = Some(TypeGuard::new(lib, arr));
        arr
    };

    let status = match value.as_mut_bytes() {
        Some(dest) => obj.read(lib, memtype, memspace_hid, space, dest),
        None => -1,
    };
    if status < 0 {
        return Err(read_error(lib));
    }

    Ok(value)
}

/// Fixed-width null-terminated string path.
///
/// Only the leading axis count is honored; strings beyond one dimension
/// are not attempted.
fn read_strings<L: H5Library + ?Sized, O: H5Object>(
    lib: &L,
    obj: O,
    file_dtype: Hid,
    shape: &[usize],
) -> H5Result<HostValue> {
    let count = shape.first().copied().unwrap_or(1);
    let disk_width = lib.type_size(file_dtype);
    if disk_width == 0 {
        return Err(introspection_error(lib));
    }
    let width = disk_width + 1; // room for the terminator
    debug!("string read: {count} slots, {width} bytes each");

    let mut buf = vec![0u8; count * width];
    let memtype = lib.create_string_type(width);
    if !memtype.is_valid() {
        return Err(open_error(lib));
    }
    let _memtype_guard = TypeGuard::new(lib, memtype);

    if obj.read(lib, memtype, Hid::ALL, Hid::ALL, &mut buf) < 0 {
        return Err(read_error(lib));
    }

    let mut data = Vec::with_capacity(count);
    for slot in buf.chunks_exact(width) {
        let end = slot.iter().position(|&b| b == 0).unwrap_or(slot.len());
        data.push(String::from_utf8_lossy(&slot[..end]).into_owned());
    }
    let value = StringArray::new(data, vec![count]).map_err(H5Error::Allocation)?;
    Ok(HostValue::Str(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::NamedType;
    use crate::testing::{FakeLibrary, FakeType};

    #[test]
    fn scalar_attribute_reads_one_element() {
        let lib = FakeLibrary::new();
        let attr = lib.add_attribute(
            FakeType::named(NamedType::NativeInt32),
            &[],
            7i32.to_ne_bytes().to_vec(),
        );
        let value = read_attribute(&lib, attr).expect("read");
        assert_eq!(value.element_type(), arrlab_values::ElementType::Int32);
        assert_eq!(value.len(), 1);
        assert!(value.shape().is_empty());
        match value {
            HostValue::Int32(a) => assert_eq!(a.data, vec![7]),
            other => panic!("unexpected value {other:?}"),
        }
    }

    #[test]
    fn scalar_string_attribute_has_count_one() {
        let lib = FakeLibrary::new();
        let attr = lib.add_string_attribute(4, &["ok"], &[]);
        let value = read_attribute(&lib, attr).expect("read");
        match value {
            HostValue::Str(a) => {
                assert_eq!(a.shape, vec![1]);
                assert_eq!(a.data, vec!["ok".to_string()]);
            }
            other => panic!("unexpected value {other:?}"),
        }
    }

    #[test]
    fn invalid_attribute_handle_is_introspection_failure() {
        let lib = FakeLibrary::new();
        let err = read_attribute(&lib, Hid(9999)).unwrap_err();
        assert!(matches!(err, H5Error::Introspection(_)));
    }
}
