//! In-memory [`H5Library`] implementation for tests.
//!
//! [`FakeLibrary`] keeps synthetic attributes, datasets, dataspaces, and
//! datatypes in a table keyed by handle, mirrors the C API's return
//! conventions (invalid handle / negative status plus an error-stack
//! message), counts every derived handle it opens and closes, and supports
//! one-shot failure injection at each call site the bridge exercises.
//!
//! Like the real library, the fake's diagnostic state is per-instance and
//! not synchronized; `RefCell` keeps it single-threaded by construction.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

use crate::library::{H5Library, Hid, NamedType, TypeClass};
use crate::typemap::CATALOG;

/// Call sites where a one-shot failure can be injected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailPoint {
    GetSpace,
    GetType,
    ArrayRank,
    ArrayExtents,
    CopyType,
    ExtentRank,
    ExtentDims,
    SelectHyperslab,
    CreateMemSpace,
    CreateArrayType,
    CreateStringType,
    Read,
}

/// Synthetic datatype descriptions for fake objects.
///
/// Fixed-width string types compare equal to the C string encoding, the way
/// sized copies of it do in the real library.
#[derive(Debug, Clone, PartialEq)]
pub struct FakeType(Repr);

#[derive(Debug, Clone, PartialEq)]
enum Repr {
    Named(NamedType),
    FixedString { width: usize },
    Array { base: Box<Repr>, extents: Vec<u64> },
    Opaque,
}

impl FakeType {
    pub fn named(named: NamedType) -> Self {
        FakeType(Repr::Named(named))
    }

    pub fn string(width: usize) -> Self {
        FakeType(Repr::FixedString { width })
    }

    pub fn array(base: FakeType, extents: &[u64]) -> Self {
        FakeType(Repr::Array {
            base: Box::new(base.0),
            extents: extents.to_vec(),
        })
    }

    /// A datatype with no catalog match.
    pub fn opaque() -> Self {
        FakeType(Repr::Opaque)
    }
}

fn named_size(named: NamedType) -> usize {
    for &(n, elem) in CATALOG {
        if n == named {
            return elem.byte_width().unwrap_or(1);
        }
    }
    1
}

fn repr_size(repr: &Repr) -> usize {
    match repr {
        Repr::Named(n) => named_size(*n),
        Repr::FixedString { width } => *width,
        Repr::Array { base, extents } => {
            repr_size(base) * extents.iter().product::<u64>() as usize
        }
        Repr::Opaque => 1,
    }
}

fn repr_class(repr: &Repr) -> TypeClass {
    match repr {
        Repr::Named(n) => {
            for &(named, elem) in CATALOG {
                if named == *n {
                    return if elem == arrlab_values::ElementType::Str {
                        TypeClass::Str
                    } else if matches!(
                        elem,
                        arrlab_values::ElementType::Float32 | arrlab_values::ElementType::Float64
                    ) {
                        TypeClass::Float
                    } else {
                        TypeClass::Integer
                    };
                }
            }
            TypeClass::Other
        }
        Repr::FixedString { .. } => TypeClass::Str,
        Repr::Array { .. } => TypeClass::Array,
        Repr::Opaque => TypeClass::Other,
    }
}

#[derive(Debug, Clone)]
enum Stored {
    Bytes(Vec<u8>),
    Strings(Vec<String>),
}

#[derive(Debug, Clone)]
struct ObjData {
    ty: Repr,
    extents: Vec<u64>,
    data: Stored,
}

#[derive(Debug, Clone)]
enum Entry {
    Attribute(ObjData),
    Dataset(ObjData),
    Space { extents: Vec<u64>, derived: bool },
    Datatype { ty: Repr, derived: bool },
    Predefined(NamedType),
}

#[derive(Default)]
struct State {
    next: i64,
    objects: HashMap<i64, Entry>,
    predefined: HashMap<NamedType, i64>,
    fail: HashSet<FailPoint>,
    open_spaces: usize,
    open_types: usize,
    space_creations: usize,
    type_creations: usize,
    // (major, minor) like the library's two-level error stack
    last_error: (String, Option<String>),
}

impl State {
    fn alloc(&mut self, entry: Entry) -> Hid {
        let hid = self.next + 100;
        self.next += 1;
        self.objects.insert(hid, entry);
        Hid(hid)
    }

    fn take_failure(&mut self, point: FailPoint) -> bool {
        self.fail.remove(&point)
    }

    fn set_error(&mut self, major: &str, minor: Option<&str>) {
        self.last_error = (major.to_string(), minor.map(str::to_string));
    }

    fn open_derived_space(&mut self, extents: Vec<u64>) -> Hid {
        self.open_spaces += 1;
        self.space_creations += 1;
        self.alloc(Entry::Space {
            extents,
            derived: true,
        })
    }

    fn open_derived_type(&mut self, ty: Repr) -> Hid {
        self.open_types += 1;
        self.type_creations += 1;
        self.alloc(Entry::Datatype { ty, derived: true })
    }

    fn resolve_type(&self, hid: Hid) -> Option<Repr> {
        match self.objects.get(&hid.raw()) {
            Some(Entry::Datatype { ty, .. }) => Some(ty.clone()),
            Some(Entry::Predefined(named)) => Some(Repr::Named(*named)),
            _ => None,
        }
    }
}

/// An in-memory stand-in for the external storage library.
pub struct FakeLibrary {
    state: RefCell<State>,
}

impl Default for FakeLibrary {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeLibrary {
    pub fn new() -> Self {
        FakeLibrary {
            state: RefCell::new(State::default()),
        }
    }

    /// Register a caller-owned datatype object (not counted as derived).
    pub fn add_datatype(&self, ty: FakeType) -> Hid {
        self.state.borrow_mut().alloc(Entry::Datatype {
            ty: ty.0,
            derived: false,
        })
    }

    /// Register an attribute with raw native-order element bytes.
    pub fn add_attribute(&self, ty: FakeType, extents: &[u64], bytes: Vec<u8>) -> Hid {
        self.state.borrow_mut().alloc(Entry::Attribute(ObjData {
            ty: ty.0,
            extents: extents.to_vec(),
            data: Stored::Bytes(bytes),
        }))
    }

    /// Register a dataset with raw native-order element bytes.
    pub fn add_dataset(&self, ty: FakeType, extents: &[u64], bytes: Vec<u8>) -> Hid {
        self.state.borrow_mut().alloc(Entry::Dataset(ObjData {
            ty: ty.0,
            extents: extents.to_vec(),
            data: Stored::Bytes(bytes),
        }))
    }

    pub fn add_f64_dataset(&self, extents: &[u64], values: &[f64]) -> Hid {
        let mut bytes = Vec::with_capacity(values.len() * 8);
        for v in values {
            bytes.extend_from_slice(&v.to_ne_bytes());
        }
        self.add_dataset(FakeType::named(NamedType::NativeDouble), extents, bytes)
    }

    pub fn add_u64_dataset(&self, extents: &[u64], values: &[u64]) -> Hid {
        let mut bytes = Vec::with_capacity(values.len() * 8);
        for v in values {
            bytes.extend_from_slice(&v.to_ne_bytes());
        }
        self.add_dataset(FakeType::named(NamedType::StdU64Le), extents, bytes)
    }

    /// Register a 1-D dataset of fixed-width strings.
    pub fn add_string_dataset(&self, width: usize, values: &[&str]) -> Hid {
        self.state.borrow_mut().alloc(Entry::Dataset(ObjData {
            ty: Repr::FixedString { width },
            extents: vec![values.len() as u64],
            data: Stored::Strings(values.iter().map(|s| s.to_string()).collect()),
        }))
    }

    /// Register an attribute of fixed-width strings with the given extents.
    pub fn add_string_attribute(&self, width: usize, values: &[&str], extents: &[u64]) -> Hid {
        self.state.borrow_mut().alloc(Entry::Attribute(ObjData {
            ty: Repr::FixedString { width },
            extents: extents.to_vec(),
            data: Stored::Strings(values.iter().map(|s| s.to_string()).collect()),
        }))
    }

    /// Arm a one-shot failure at the given call site.
    pub fn fail_next(&self, point: FailPoint) {
        self.state.borrow_mut().fail.insert(point);
    }

    /// Number of derived dataspace handles currently open.
    pub fn open_space_count(&self) -> usize {
        self.state.borrow().open_spaces
    }

    /// Number of derived datatype handles currently open.
    pub fn open_type_count(&self) -> usize {
        self.state.borrow().open_types
    }

    /// Total derived dataspace handles ever opened.
    pub fn space_creations(&self) -> usize {
        self.state.borrow().space_creations
    }

    /// Total derived datatype handles ever opened.
    pub fn type_creations(&self) -> usize {
        self.state.borrow().type_creations
    }

    /// Whether a handle still refers to a live object.
    pub fn is_open(&self, hid: Hid) -> bool {
        self.state.borrow().objects.contains_key(&hid.raw())
    }

    fn object_space(&self, hid: Hid, attribute: bool) -> Hid {
        let mut st = self.state.borrow_mut();
        if st.take_failure(FailPoint::GetSpace) {
            st.set_error("unable to open object", Some("can't get dataspace"));
            return Hid(-1);
        }
        let extents = match st.objects.get(&hid.raw()) {
            Some(Entry::Attribute(obj)) if attribute => obj.extents.clone(),
            Some(Entry::Dataset(obj)) if !attribute => obj.extents.clone(),
            _ => {
                st.set_error("invalid arguments to routine", Some("inappropriate type"));
                return Hid(-1);
            }
        };
        st.open_derived_space(extents)
    }

    fn object_type(&self, hid: Hid, attribute: bool) -> Hid {
        let mut st = self.state.borrow_mut();
        if st.take_failure(FailPoint::GetType) {
            st.set_error("unable to open object", Some("can't get datatype"));
            return Hid(-1);
        }
        let ty = match st.objects.get(&hid.raw()) {
            Some(Entry::Attribute(obj)) if attribute => obj.ty.clone(),
            Some(Entry::Dataset(obj)) if !attribute => obj.ty.clone(),
            _ => {
                st.set_error("invalid arguments to routine", Some("inappropriate type"));
                return Hid(-1);
            }
        };
        st.open_derived_type(ty)
    }

    fn object_read(&self, hid: Hid, attribute: bool, memtype: Hid, dest: &mut [u8]) -> i32 {
        let mut st = self.state.borrow_mut();
        if st.take_failure(FailPoint::Read) {
            st.set_error("read failed", Some("filter returned failure during read"));
            return -1;
        }
        let obj = match st.objects.get(&hid.raw()) {
            Some(Entry::Attribute(obj)) if attribute => obj.clone(),
            Some(Entry::Dataset(obj)) if !attribute => obj.clone(),
            _ => {
                st.set_error("invalid arguments to routine", Some("inappropriate type"));
                return -1;
            }
        };
        let memrepr = match st.resolve_type(memtype) {
            Some(r) => r,
            None => {
                st.set_error("invalid arguments to routine", Some("not a datatype"));
                return -1;
            }
        };
        match obj.data {
            Stored::Bytes(bytes) => {
                let elem_count: u64 = obj.extents.iter().product();
                let expected = repr_size(&memrepr) * elem_count as usize;
                if dest.len() != bytes.len() || dest.len() != expected {
                    st.set_error(
                        "datatype conversion failed",
                        Some("no appropriate function for conversion path"),
                    );
                    return -1;
                }
                dest.copy_from_slice(&bytes);
                0
            }
            Stored::Strings(values) => {
                let width = match memrepr {
                    Repr::FixedString { width } => width,
                    _ => {
                        st.set_error(
                            "datatype conversion failed",
                            Some("not a string datatype"),
                        );
                        return -1;
                    }
                };
                let slots = dest.len() / width;
                for (slot, value) in (0..slots).zip(values.iter()) {
                    let out = &mut dest[slot * width..(slot + 1) * width];
                    out.fill(0);
                    let text = value.as_bytes();
                    let len = text.len().min(width - 1);
                    out[..len].copy_from_slice(&text[..len]);
                }
                0
            }
        }
    }
}

impl H5Library for FakeLibrary {
    fn attribute_space(&self, attr: Hid) -> Hid {
        self.object_space(attr, true)
    }

    fn attribute_type(&self, attr: Hid) -> Hid {
        self.object_type(attr, true)
    }

    fn dataset_space(&self, dset: Hid) -> Hid {
        self.object_space(dset, false)
    }

    fn dataset_type(&self, dset: Hid) -> Hid {
        self.object_type(dset, false)
    }

    fn type_class(&self, dtype: Hid) -> TypeClass {
        let st = self.state.borrow();
        match st.resolve_type(dtype) {
            Some(repr) => repr_class(&repr),
            None => TypeClass::Other,
        }
    }

    fn array_rank(&self, dtype: Hid) -> i32 {
        let mut st = self.state.borrow_mut();
        if st.take_failure(FailPoint::ArrayRank) {
            st.set_error("datatype query failed", Some("can't get array rank"));
            return -1;
        }
        match st.resolve_type(dtype) {
            Some(Repr::Array { extents, .. }) => extents.len() as i32,
            _ => {
                st.set_error("invalid arguments to routine", Some("not an array datatype"));
                -1
            }
        }
    }

    fn array_extents(&self, dtype: Hid, dims: &mut [u64]) -> i32 {
        let mut st = self.state.borrow_mut();
        if st.take_failure(FailPoint::ArrayExtents) {
            st.set_error("datatype query failed", Some("can't get array dims"));
            return -1;
        }
        match st.resolve_type(dtype) {
            Some(Repr::Array { extents, .. }) if extents.len() <= dims.len() => {
                dims[..extents.len()].copy_from_slice(&extents);
                extents.len() as i32
            }
            _ => {
                st.set_error("invalid arguments to routine", Some("not an array datatype"));
                -1
            }
        }
    }

    fn array_base_type(&self, dtype: Hid) -> Hid {
        let mut st = self.state.borrow_mut();
        match st.resolve_type(dtype) {
            Some(Repr::Array { base, .. }) => st.open_derived_type(*base),
            _ => {
                st.set_error("invalid arguments to routine", Some("not an array datatype"));
                Hid(-1)
            }
        }
    }

    fn copy_type(&self, dtype: Hid) -> Hid {
        let mut st = self.state.borrow_mut();
        if st.take_failure(FailPoint::CopyType) {
            st.set_error("unable to copy datatype", None);
            return Hid(-1);
        }
        match st.resolve_type(dtype) {
            Some(repr) => st.open_derived_type(repr),
            None => {
                st.set_error("invalid arguments to routine", Some("not a datatype"));
                Hid(-1)
            }
        }
    }

    fn type_size(&self, dtype: Hid) -> usize {
        let st = self.state.borrow();
        match st.resolve_type(dtype) {
            Some(repr) => repr_size(&repr),
            None => 0,
        }
    }

    fn is_type(&self, dtype: Hid, named: NamedType) -> bool {
        let st = self.state.borrow();
        match st.resolve_type(dtype) {
            Some(Repr::Named(n)) => n == named,
            // sized string copies compare equal to the C string encoding
            Some(Repr::FixedString { .. }) => named == NamedType::CString,
            _ => false,
        }
    }

    fn simple_extent_rank(&self, space: Hid) -> i32 {
        let mut st = self.state.borrow_mut();
        if st.take_failure(FailPoint::ExtentRank) {
            st.set_error("dataspace query failed", Some("can't get rank"));
            return -1;
        }
        match st.objects.get(&space.raw()) {
            Some(Entry::Space { extents, .. }) => extents.len() as i32,
            _ => {
                st.set_error("invalid arguments to routine", Some("not a dataspace"));
                -1
            }
        }
    }

    fn simple_extent_dims(&self, space: Hid, dims: &mut [u64]) -> i32 {
        let mut st = self.state.borrow_mut();
        if st.take_failure(FailPoint::ExtentDims) {
            st.set_error("dataspace query failed", Some("can't get extents"));
            return -1;
        }
        match st.objects.get(&space.raw()) {
            Some(Entry::Space { extents, .. }) if extents.len() <= dims.len() => {
                dims[..extents.len()].copy_from_slice(extents);
                extents.len() as i32
            }
            _ => {
                st.set_error("invalid arguments to routine", Some("not a dataspace"));
                -1
            }
        }
    }

    fn select_full_hyperslab(&self, space: Hid, counts: &[u64]) -> i32 {
        let mut st = self.state.borrow_mut();
        if st.take_failure(FailPoint::SelectHyperslab) {
            st.set_error("dataspace selection failed", Some("can't select hyperslab"));
            return -1;
        }
        match st.objects.get(&space.raw()) {
            Some(Entry::Space { extents, .. }) if extents == counts => 0,
            Some(Entry::Space { .. }) => {
                st.set_error(
                    "dataspace selection failed",
                    Some("selection extends past the extent"),
                );
                -1
            }
            _ => {
                st.set_error("invalid arguments to routine", Some("not a dataspace"));
                -1
            }
        }
    }

    fn create_simple_space(&self, extents: &[u64]) -> Hid {
        let mut st = self.state.borrow_mut();
        if st.take_failure(FailPoint::CreateMemSpace) {
            st.set_error("unable to create dataspace", None);
            return Hid(-1);
        }
        st.open_derived_space(extents.to_vec())
    }

    fn named_type(&self, named: NamedType) -> Hid {
        let mut st = self.state.borrow_mut();
        if let Some(&hid) = st.predefined.get(&named) {
            return Hid(hid);
        }
        let hid = st.alloc(Entry::Predefined(named));
        st.predefined.insert(named, hid.raw());
        hid
    }

    fn create_array_type(&self, base: Hid, extents: &[u64]) -> Hid {
        let mut st = self.state.borrow_mut();
        if st.take_failure(FailPoint::CreateArrayType) {
            st.set_error("unable to create array datatype", None);
            return Hid(-1);
        }
        match st.resolve_type(base) {
            Some(repr) => st.open_derived_type(Repr::Array {
                base: Box::new(repr),
                extents: extents.to_vec(),
            }),
            None => {
                st.set_error("invalid arguments to routine", Some("not a datatype"));
                Hid(-1)
            }
        }
    }

    fn create_string_type(&self, width: usize) -> Hid {
        let mut st = self.state.borrow_mut();
        if st.take_failure(FailPoint::CreateStringType) {
            st.set_error("unable to create string datatype", None);
            return Hid(-1);
        }
        st.open_derived_type(Repr::FixedString { width })
    }

    fn read_attribute(&self, attr: Hid, memtype: Hid, dest: &mut [u8]) -> i32 {
        self.object_read(attr, true, memtype, dest)
    }

    fn read_dataset(
        &self,
        dset: Hid,
        memtype: Hid,
        memspace: Hid,
        filespace: Hid,
        dest: &mut [u8],
    ) -> i32 {
        for space in [memspace, filespace] {
            if space == Hid::ALL {
                continue;
            }
            let st = self.state.borrow();
            if !matches!(st.objects.get(&space.raw()), Some(Entry::Space { .. })) {
                drop(st);
                self.state
                    .borrow_mut()
                    .set_error("invalid arguments to routine", Some("not a dataspace"));
                return -1;
            }
        }
        self.object_read(dset, false, memtype, dest)
    }

    fn close_space(&self, space: Hid) -> i32 {
        let mut st = self.state.borrow_mut();
        match st.objects.remove(&space.raw()) {
            Some(Entry::Space { derived, .. }) => {
                if derived {
                    st.open_spaces -= 1;
                }
                0
            }
            Some(other) => {
                st.objects.insert(space.raw(), other);
                st.set_error("invalid arguments to routine", Some("not a dataspace"));
                -1
            }
            None => {
                st.set_error("invalid arguments to routine", Some("not a dataspace"));
                -1
            }
        }
    }

    fn close_type(&self, dtype: Hid) -> i32 {
        let mut st = self.state.borrow_mut();
        match st.objects.remove(&dtype.raw()) {
            Some(Entry::Datatype { derived, .. }) => {
                if derived {
                    st.open_types -= 1;
                }
                0
            }
            Some(Entry::Predefined(named)) => {
                // predefined types are immortal, closing them is an error
                st.objects.insert(dtype.raw(), Entry::Predefined(named));
                st.set_error("invalid arguments to routine", Some("immutable datatype"));
                -1
            }
            Some(other) => {
                st.objects.insert(dtype.raw(), other);
                st.set_error("invalid arguments to routine", Some("not a datatype"));
                -1
            }
            None => {
                st.set_error("invalid arguments to routine", Some("not a datatype"));
                -1
            }
        }
    }

    fn last_error_message(&self) -> String {
        let st = self.state.borrow();
        let (major, minor) = &st.last_error;
        match minor {
            Some(text) => text.clone(),
            None if major.is_empty() => "unspecified library error".to_string(),
            None => major.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_handles_are_counted() {
        let lib = FakeLibrary::new();
        let attr = lib.add_attribute(
            FakeType::named(NamedType::NativeDouble),
            &[2],
            vec![0u8; 16],
        );
        let space = lib.attribute_space(attr);
        let dtype = lib.attribute_type(attr);
        assert_eq!(lib.open_space_count(), 1);
        assert_eq!(lib.open_type_count(), 1);
        assert_eq!(lib.close_space(space), 0);
        assert_eq!(lib.close_type(dtype), 0);
        assert_eq!(lib.open_space_count(), 0);
        assert_eq!(lib.open_type_count(), 0);
    }

    #[test]
    fn diagnostics_prefer_minor_text() {
        let lib = FakeLibrary::new();
        assert!(!lib.attribute_space(Hid(12345)).is_valid());
        assert_eq!(lib.last_error_message(), "inappropriate type");
    }

    #[test]
    fn fail_points_are_one_shot() {
        let lib = FakeLibrary::new();
        let attr = lib.add_attribute(FakeType::named(NamedType::NativeUint8), &[1], vec![0u8]);
        lib.fail_next(FailPoint::GetSpace);
        assert!(!lib.attribute_space(attr).is_valid());
        let space = lib.attribute_space(attr);
        assert!(space.is_valid());
        lib.close_space(space);
    }

    #[test]
    fn predefined_types_resist_closing() {
        let lib = FakeLibrary::new();
        let native = lib.named_type(NamedType::NativeInt64);
        assert_eq!(lib.named_type(NamedType::NativeInt64), native);
        assert!(lib.close_type(native) < 0);
        assert!(lib.is_open(native));
    }
}
