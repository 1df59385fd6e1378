//! HDF5 read bridge for the arrlab environment.
//!
//! Translates the storage library's datatype taxonomy and row-major
//! dataspaces into arrlab's fixed set of element types and column-major
//! shapes, and orchestrates whole-object reads of attributes and datasets
//! into [`arrlab_values::HostValue`]s.
//!
//! The storage library itself is consumed as a black box through the
//! [`H5Library`] trait; `testing::FakeLibrary` is an in-memory
//! implementation for tests. Every handle derived during a read (dataspace,
//! datatype, element type, transfer type, memory space) is owned by exactly
//! one guard and released on every exit path; handles passed in by the
//! caller are never released here.
//!
//! All calls are synchronous and single-threaded: the library's diagnostic
//! stack is global state, so concurrent use of one library instance from
//! multiple threads needs external synchronization.

pub mod error;
pub mod guard;
pub mod library;
pub mod reader;
pub mod shape;
pub mod testing;
pub mod typemap;

pub use error::{H5Error, H5Result};
pub use guard::{SpaceGuard, TypeGuard};
pub use library::{H5Library, Hid, NamedType, TypeClass};
pub use reader::{read_attribute, read_dataset};
pub use shape::dataspace_shape;
pub use typemap::{map_element_type, CATALOG};

/// Maximum supported rank, matching the storage library's own cap.
/// Exceeding it is an introspection failure, never a silent truncation.
pub const MAX_RANK: usize = 32;
