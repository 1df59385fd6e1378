//! Scoped ownership of intermediate library handles.
//!
//! Each guard owns exactly one handle and releases it when dropped, on every
//! exit path. Close failures during unwind are ignored: they must not mask
//! the error that caused the unwind, and `Drop` cannot propagate them
//! anyway. Guards are neither copyable nor reusable, and handles supplied by
//! the caller are never wrapped in one.

use log::trace;

use crate::library::{H5Library, Hid};

/// Owns a dataspace handle for the current scope.
pub struct SpaceGuard<'l, L: H5Library + ?Sized> {
    lib: &'l L,
    hid: Hid,
}

impl<'l, L: H5Library + ?Sized> SpaceGuard<'l, L> {
    pub fn new(lib: &'l L, hid: Hid) -> Self {
        SpaceGuard { lib, hid }
    }

    pub fn hid(&self) -> Hid {
        self.hid
    }
}

impl<L: H5Library + ?Sized> Drop for SpaceGuard<'_, L> {
    fn drop(&mut self) {
        self.lib.close_space(self.hid);
        trace!("released dataspace handle {}", self.hid.raw());
    }
}

/// Owns a datatype handle for the current scope.
///
/// Nested types produce independent guards: the element type extracted from
/// an array type is released separately from the array type itself.
pub struct TypeGuard<'l, L: H5Library + ?Sized> {
    lib: &'l L,
    hid: Hid,
}

impl<'l, L: H5Library + ?Sized> TypeGuard<'l, L> {
    pub fn new(lib: &'l L, hid: Hid) -> Self {
        TypeGuard { lib, hid }
    }

    pub fn hid(&self) -> Hid {
        self.hid
    }
}

impl<L: H5Library + ?Sized> Drop for TypeGuard<'_, L> {
    fn drop(&mut self) {
        self.lib.close_type(self.hid);
        trace!("released datatype handle {}", self.hid.raw());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeLibrary;
    use crate::library::NamedType;

    #[test]
    fn space_guard_releases_on_drop() {
        let lib = FakeLibrary::new();
        let space = lib.create_simple_space(&[4]);
        assert!(space.is_valid());
        assert_eq!(lib.open_space_count(), 1);
        {
            let _guard = SpaceGuard::new(&lib, space);
            assert_eq!(lib.open_space_count(), 1);
        }
        assert_eq!(lib.open_space_count(), 0);
    }

    #[test]
    fn type_guard_releases_on_panic_unwind() {
        let lib = FakeLibrary::new();
        let base = lib.named_type(NamedType::NativeDouble);
        let arr = lib.create_array_type(base, &[3]);
        assert_eq!(lib.open_type_count(), 1);
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = TypeGuard::new(&lib, arr);
            panic!("unwind");
        }));
        assert!(result.is_err());
        assert_eq!(lib.open_type_count(), 0);
    }

    #[test]
    fn nested_guards_release_independently() {
        let lib = FakeLibrary::new();
        let base = lib.named_type(NamedType::NativeFloat);
        let outer = lib.create_array_type(base, &[2]);
        let inner = lib.copy_type(base);
        {
            let _outer = TypeGuard::new(&lib, outer);
            {
                let _inner = TypeGuard::new(&lib, inner);
            }
            assert_eq!(lib.open_type_count(), 1);
        }
        assert_eq!(lib.open_type_count(), 0);
    }
}
