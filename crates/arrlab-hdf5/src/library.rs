//! The external-library boundary.
//!
//! Everything the bridge needs from the storage library is expressed as the
//! [`H5Library`] trait over opaque [`Hid`] handles, keeping the C API's
//! return conventions: acquisition calls hand back a handle that may be
//! invalid, status calls return a negative value on failure, and the
//! diagnostic text for the most recent failure is drained through a separate
//! call ([`H5Library::last_error_message`]) that must run before any other
//! library call can overwrite the error stack.
//!
//! The library's diagnostic stack is global, thread-local state owned by the
//! library itself; implementations are not required to be `Sync` and callers
//! must serialize cross-thread use externally.

/// Opaque handle to an open library object (file, group, dataset, attribute,
/// dataspace, or datatype). Negative raw values are invalid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Hid(pub i64);

impl Hid {
    /// The "select everything" sentinel accepted by transfer calls in place
    /// of an explicit dataspace, matching the library's `H5S_ALL`.
    pub const ALL: Hid = Hid(0);

    pub fn is_valid(self) -> bool {
        self.0 >= 0
    }

    pub fn raw(self) -> i64 {
        self.0
    }
}

/// Datatype class as reported by the library. Only `Array` changes the
/// bridge's behavior; the scalar classes are carried for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeClass {
    Integer,
    Float,
    Str,
    Array,
    Other,
}

/// Named type encodings the bridge can ask the library about.
///
/// One variant per predefined datatype consulted by the mapping catalog
/// (platform aliases, both byte orders) plus the native in-memory encodings
/// used as transfer types. Names follow the library's own taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NamedType {
    // floating point
    NativeDouble,
    NativeFloat,
    // 64-bit unsigned
    NativeUllong,
    AlphaU64,
    IntelU64,
    MipsU64,
    NativeUint64,
    NativeUintFast64,
    NativeUintLeast64,
    StdU64Be,
    StdU64Le,
    // 64-bit signed (and the equal-width aliases the catalog folds in here)
    NativeLlong,
    IeeeF64Be,
    IeeeF64Le,
    IntelB64,
    IntelF64,
    IntelI64,
    MipsB64,
    MipsF64,
    MipsI64,
    NativeB64,
    NativeInt64,
    NativeIntFast64,
    NativeIntLeast64,
    StdB64Be,
    StdB64Le,
    StdI64Be,
    StdI64Le,
    UnixD64Be,
    UnixD64Le,
    AlphaB64,
    AlphaF64,
    AlphaI64,
    // 32-bit unsigned
    NativeUlong,
    AlphaU32,
    IntelU32,
    MipsU32,
    NativeUint32,
    NativeUintFast32,
    NativeUintLeast32,
    StdU32Be,
    StdU32Le,
    // 32-bit signed
    NativeHbool,
    NativeLong,
    AlphaB32,
    AlphaF32,
    AlphaI32,
    IeeeF32Be,
    IeeeF32Le,
    IntelB32,
    IntelF32,
    IntelI32,
    MipsB32,
    MipsF32,
    MipsI32,
    NativeB32,
    NativeInt32,
    NativeIntFast32,
    NativeIntLeast32,
    StdB32Be,
    StdB32Le,
    StdI32Be,
    StdI32Le,
    UnixD32Be,
    UnixD32Le,
    // 16-bit unsigned
    NativeUint,
    NativeUint16,
    NativeUintFast16,
    NativeUintLeast16,
    StdU16Be,
    StdU16Le,
    AlphaU16,
    IntelU16,
    MipsU16,
    // 16-bit signed
    NativeInt,
    NativeInt16,
    NativeIntFast16,
    NativeIntLeast16,
    StdB16Be,
    StdB16Le,
    StdI16Be,
    StdI16Le,
    AlphaB16,
    AlphaI16,
    IntelB16,
    IntelI16,
    MipsB16,
    MipsI16,
    NativeB16,
    // 8-bit unsigned
    AlphaU8,
    MipsU8,
    IntelU8,
    NativeUint8,
    NativeUintFast8,
    NativeUintLeast8,
    StdU8Be,
    StdU8Le,
    NativeUshort,
    // 8-bit signed
    NativeInt8,
    AlphaB8,
    AlphaI8,
    IntelB8,
    IntelI8,
    MipsI8,
    NativeB8,
    NativeIntFast8,
    NativeIntLeast8,
    NativeShort,
    MipsB8,
    StdB8Be,
    StdB8Le,
    StdI8Be,
    StdI8Le,
    // character / string encodings
    CString,
    FortranString,
    NativeChar,
    NativeSchar,
    NativeUchar,
}

/// Capability surface of the external storage library.
///
/// Methods mirror the C entry points one to one so a thin FFI binding can
/// implement this trait without branching logic; [`crate::testing`] provides
/// an in-memory implementation for tests.
pub trait H5Library {
    // --- introspection -----------------------------------------------------

    /// Dataspace of an attribute; invalid handle on failure.
    fn attribute_space(&self, attr: Hid) -> Hid;
    /// Datatype of an attribute; invalid handle on failure.
    fn attribute_type(&self, attr: Hid) -> Hid;
    /// Dataspace of a dataset; invalid handle on failure.
    fn dataset_space(&self, dset: Hid) -> Hid;
    /// Datatype of a dataset; invalid handle on failure.
    fn dataset_type(&self, dset: Hid) -> Hid;

    /// Class of a datatype.
    fn type_class(&self, dtype: Hid) -> TypeClass;
    /// Rank of an array datatype's element; negative on failure.
    fn array_rank(&self, dtype: Hid) -> i32;
    /// Per-axis extents (outermost first) of an array datatype's element,
    /// written into `dims`; negative status on failure.
    fn array_extents(&self, dtype: Hid, dims: &mut [u64]) -> i32;
    /// Scalar type beneath an array datatype; a fresh handle the caller owns.
    fn array_base_type(&self, dtype: Hid) -> Hid;
    /// Duplicate a datatype; a fresh handle the caller owns.
    fn copy_type(&self, dtype: Hid) -> Hid;
    /// On-disk size of one element in bytes; 0 on failure.
    fn type_size(&self, dtype: Hid) -> usize;
    /// Whether `dtype` equals the given predefined encoding.
    fn is_type(&self, dtype: Hid, named: NamedType) -> bool;

    /// Rank of a simple dataspace; negative on failure.
    fn simple_extent_rank(&self, space: Hid) -> i32;
    /// Per-axis extents (outermost first) of a simple dataspace, written
    /// into `dims`; negative status on failure.
    fn simple_extent_dims(&self, space: Hid, dims: &mut [u64]) -> i32;

    // --- selection ---------------------------------------------------------

    /// Select the full extent (offset zero, the given counts) on a
    /// dataspace; negative status on failure.
    fn select_full_hyperslab(&self, space: Hid, counts: &[u64]) -> i32;
    /// Create a simple dataspace with the given extents; the caller owns the
    /// returned handle. Invalid handle on failure.
    fn create_simple_space(&self, extents: &[u64]) -> Hid;

    // --- type construction -------------------------------------------------

    /// Handle for a predefined encoding. Predefined handles are immortal and
    /// are never passed to [`H5Library::close_type`].
    fn named_type(&self, named: NamedType) -> Hid;
    /// Fixed-size array type over `base`; a fresh handle the caller owns.
    fn create_array_type(&self, base: Hid, extents: &[u64]) -> Hid;
    /// Fixed-width (null-padded) string type; a fresh handle the caller owns.
    fn create_string_type(&self, width: usize) -> Hid;

    // --- transfer ----------------------------------------------------------

    /// Read an attribute's entire contents into `dest` using the in-memory
    /// encoding `memtype`; negative status on failure.
    fn read_attribute(&self, attr: Hid, memtype: Hid, dest: &mut [u8]) -> i32;
    /// Read a dataset through the given selections into `dest`; either
    /// dataspace may be [`Hid::ALL`]. Negative status on failure.
    fn read_dataset(&self, dset: Hid, memtype: Hid, memspace: Hid, filespace: Hid, dest: &mut [u8])
        -> i32;

    // --- lifecycle ---------------------------------------------------------

    /// Release a dataspace handle; status is ignored by guards.
    fn close_space(&self, space: Hid) -> i32;
    /// Release a datatype handle; status is ignored by guards.
    fn close_type(&self, dtype: Hid) -> i32;

    // --- diagnostics -------------------------------------------------------

    /// Walk the library's error stack upward and return the most specific
    /// message available, preferring a minor code's text over the generic
    /// major category. Must be called immediately after the failing call.
    fn last_error_message(&self) -> String;
}
