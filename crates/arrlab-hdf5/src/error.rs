//! Failure taxonomy for the bridge.
//!
//! Every failure is terminal for the current read call: nothing here is
//! retried, no value is ever returned partially populated, and handles
//! supplied by the caller stay open and valid for the caller to reuse.

use thiserror::Error;

use crate::library::H5Library;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum H5Error {
    /// A handle-acquisition call returned an invalid handle.
    #[error("hdf5 open failed: {0}")]
    Open(String),
    /// A rank, extent, or class query failed or exceeded the supported rank.
    #[error("hdf5 introspection failed: {0}")]
    Introspection(String),
    /// The datatype matched nothing in the mapping catalog.
    #[error("unsupported data format {type_id}")]
    UnsupportedType { type_id: i64 },
    /// A host buffer or temporary native buffer could not be obtained.
    #[error("allocation failed: {0}")]
    Allocation(String),
    /// The transfer call reported failure.
    #[error("hdf5 read failed: {0}")]
    Read(String),
}

pub type H5Result<T> = Result<T, H5Error>;

// Drain the diagnostic stack immediately after the failing call, before any
// other library call can overwrite it.

pub(crate) fn open_error<L: H5Library + ?Sized>(lib: &L) -> H5Error {
    H5Error::Open(lib.last_error_message())
}

pub(crate) fn introspection_error<L: H5Library + ?Sized>(lib: &L) -> H5Error {
    H5Error::Introspection(lib.last_error_message())
}

pub(crate) fn read_error<L: H5Library + ?Sized>(lib: &L) -> H5Error {
    H5Error::Read(lib.last_error_message())
}
