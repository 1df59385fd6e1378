//! Datatype classification: external encodings to host element types.
//!
//! The catalog is an ordered table consulted top to bottom, first match
//! wins. Order is the tie-break policy: several platform taxonomies alias
//! distinct semantic types to equal-width encodings, so wider and more
//! precise entries come first (native double/float, then 64-bit, 32-bit,
//! 16-bit, 8-bit, character encodings last). Classification is total and
//! performs no I/O; an encoding with no catalog entry maps to
//! [`ElementType::Undefined`] and failure handling stays with the caller.
//!
//! Known quirk, preserved deliberately: every unsigned 64-bit encoding maps
//! to [`ElementType::Int64`], so unsigned 64-bit data is read through the
//! signed path. Hosts already depend on that numeric behavior; see the
//! `unsigned_64_funnels_into_signed_64` test before changing it.

use arrlab_values::ElementType;

use crate::library::{H5Library, Hid, NamedType};

/// Ordered mapping catalog. Precedence lives in the row order.
pub const CATALOG: &[(NamedType, ElementType)] = &[
    (NamedType::NativeDouble, ElementType::Float64),
    (NamedType::NativeFloat, ElementType::Float32),
    // 64-bit unsigned: funneled into Int64 (see module docs)
    (NamedType::NativeUllong, ElementType::Int64),
    (NamedType::AlphaU64, ElementType::Int64),
    (NamedType::IntelU64, ElementType::Int64),
    (NamedType::MipsU64, ElementType::Int64),
    (NamedType::NativeUint64, ElementType::Int64),
    (NamedType::NativeUintFast64, ElementType::Int64),
    (NamedType::NativeUintLeast64, ElementType::Int64),
    (NamedType::StdU64Be, ElementType::Int64),
    (NamedType::StdU64Le, ElementType::Int64),
    // 64-bit signed and equal-width aliases
    (NamedType::NativeLlong, ElementType::Int64),
    (NamedType::IeeeF64Be, ElementType::Int64),
    (NamedType::IeeeF64Le, ElementType::Int64),
    (NamedType::IntelB64, ElementType::Int64),
    (NamedType::IntelF64, ElementType::Int64),
    (NamedType::IntelI64, ElementType::Int64),
    (NamedType::MipsB64, ElementType::Int64),
    (NamedType::MipsF64, ElementType::Int64),
    (NamedType::MipsI64, ElementType::Int64),
    (NamedType::NativeB64, ElementType::Int64),
    (NamedType::NativeInt64, ElementType::Int64),
    (NamedType::NativeIntFast64, ElementType::Int64),
    (NamedType::NativeIntLeast64, ElementType::Int64),
    (NamedType::StdB64Be, ElementType::Int64),
    (NamedType::StdB64Le, ElementType::Int64),
    (NamedType::StdI64Be, ElementType::Int64),
    (NamedType::StdI64Le, ElementType::Int64),
    (NamedType::UnixD64Be, ElementType::Int64),
    (NamedType::UnixD64Le, ElementType::Int64),
    (NamedType::AlphaB64, ElementType::Int64),
    (NamedType::AlphaF64, ElementType::Int64),
    (NamedType::AlphaI64, ElementType::Int64),
    // 32-bit unsigned
    (NamedType::NativeUlong, ElementType::UInt32),
    (NamedType::AlphaU32, ElementType::UInt32),
    (NamedType::IntelU32, ElementType::UInt32),
    (NamedType::MipsU32, ElementType::UInt32),
    (NamedType::NativeUint32, ElementType::UInt32),
    (NamedType::NativeUintFast32, ElementType::UInt32),
    (NamedType::NativeUintLeast32, ElementType::UInt32),
    (NamedType::StdU32Be, ElementType::UInt32),
    (NamedType::StdU32Le, ElementType::UInt32),
    // 32-bit signed and equal-width aliases
    (NamedType::NativeHbool, ElementType::Int32),
    (NamedType::NativeLong, ElementType::Int32),
    (NamedType::AlphaB32, ElementType::Int32),
    (NamedType::AlphaF32, ElementType::Int32),
    (NamedType::AlphaI32, ElementType::Int32),
    (NamedType::IeeeF32Be, ElementType::Int32),
    (NamedType::IeeeF32Le, ElementType::Int32),
    (NamedType::IntelB32, ElementType::Int32),
    (NamedType::IntelF32, ElementType::Int32),
    (NamedType::IntelI32, ElementType::Int32),
    (NamedType::MipsB32, ElementType::Int32),
    (NamedType::MipsF32, ElementType::Int32),
    (NamedType::MipsI32, ElementType::Int32),
    (NamedType::NativeB32, ElementType::Int32),
    (NamedType::NativeInt32, ElementType::Int32),
    (NamedType::NativeIntFast32, ElementType::Int32),
    (NamedType::NativeIntLeast32, ElementType::Int32),
    (NamedType::StdB32Be, ElementType::Int32),
    (NamedType::StdB32Le, ElementType::Int32),
    (NamedType::StdI32Be, ElementType::Int32),
    (NamedType::StdI32Le, ElementType::Int32),
    (NamedType::UnixD32Be, ElementType::Int32),
    (NamedType::UnixD32Le, ElementType::Int32),
    // 16-bit unsigned
    (NamedType::NativeUint, ElementType::UInt16),
    (NamedType::NativeUint16, ElementType::UInt16),
    (NamedType::NativeUintFast16, ElementType::UInt16),
    (NamedType::NativeUintLeast16, ElementType::UInt16),
    (NamedType::StdU16Be, ElementType::UInt16),
    (NamedType::StdU16Le, ElementType::UInt16),
    (NamedType::AlphaU16, ElementType::UInt16),
    (NamedType::IntelU16, ElementType::UInt16),
    (NamedType::MipsU16, ElementType::UInt16),
    // 16-bit signed
    (NamedType::NativeInt, ElementType::Int16),
    (NamedType::NativeInt16, ElementType::Int16),
    (NamedType::NativeIntFast16, ElementType::Int16),
    (NamedType::NativeIntLeast16, ElementType::Int16),
    (NamedType::StdB16Be, ElementType::Int16),
    (NamedType::StdB16Le, ElementType::Int16),
    (NamedType::StdI16Be, ElementType::Int16),
    (NamedType::StdI16Le, ElementType::Int16),
    (NamedType::AlphaB16, ElementType::Int16),
    (NamedType::AlphaI16, ElementType::Int16),
    (NamedType::IntelB16, ElementType::Int16),
    (NamedType::IntelI16, ElementType::Int16),
    (NamedType::MipsB16, ElementType::Int16),
    (NamedType::MipsI16, ElementType::Int16),
    (NamedType::NativeB16, ElementType::Int16),
    // 8-bit, unsigned first
    (NamedType::AlphaU8, ElementType::Byte),
    (NamedType::MipsU8, ElementType::Byte),
    (NamedType::IntelU8, ElementType::Byte),
    (NamedType::NativeUint8, ElementType::Byte),
    (NamedType::NativeUintFast8, ElementType::Byte),
    (NamedType::NativeUintLeast8, ElementType::Byte),
    (NamedType::StdU8Be, ElementType::Byte),
    (NamedType::StdU8Le, ElementType::Byte),
    (NamedType::NativeUshort, ElementType::Byte),
    (NamedType::NativeInt8, ElementType::Byte),
    (NamedType::AlphaB8, ElementType::Byte),
    (NamedType::AlphaI8, ElementType::Byte),
    (NamedType::IntelB8, ElementType::Byte),
    (NamedType::IntelI8, ElementType::Byte),
    (NamedType::MipsI8, ElementType::Byte),
    (NamedType::NativeB8, ElementType::Byte),
    (NamedType::NativeIntFast8, ElementType::Byte),
    (NamedType::NativeIntLeast8, ElementType::Byte),
    (NamedType::NativeShort, ElementType::Byte),
    (NamedType::MipsB8, ElementType::Byte),
    (NamedType::StdB8Be, ElementType::Byte),
    (NamedType::StdB8Le, ElementType::Byte),
    (NamedType::StdI8Be, ElementType::Byte),
    (NamedType::StdI8Le, ElementType::Byte),
    // character and string encodings, last
    (NamedType::CString, ElementType::Str),
    (NamedType::FortranString, ElementType::Str),
    (NamedType::NativeChar, ElementType::Str),
    (NamedType::NativeSchar, ElementType::Str),
    (NamedType::NativeUchar, ElementType::Str),
];

/// Classify a datatype handle against the catalog.
pub fn map_element_type<L: H5Library + ?Sized>(lib: &L, dtype: Hid) -> ElementType {
    for &(named, elem) in CATALOG {
        if lib.is_type(dtype, named) {
            return elem;
        }
    }
    ElementType::Undefined
}

/// Native in-memory encoding used as the transfer type for a mapped element
/// type. Fixed 1:1; `Str` and `Undefined` have no numeric transfer type.
pub(crate) fn transfer_type(elem: ElementType) -> Option<NamedType> {
    match elem {
        ElementType::Byte => Some(NamedType::NativeUint8),
        ElementType::Int16 => Some(NamedType::NativeInt16),
        ElementType::UInt16 => Some(NamedType::NativeUint16),
        ElementType::Int32 => Some(NamedType::NativeInt32),
        ElementType::UInt32 => Some(NamedType::NativeUint32),
        ElementType::Int64 => Some(NamedType::NativeInt64),
        ElementType::UInt64 => Some(NamedType::NativeUint64),
        ElementType::Float32 => Some(NamedType::NativeFloat),
        ElementType::Float64 => Some(NamedType::NativeDouble),
        ElementType::Str | ElementType::Undefined => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeLibrary, FakeType};

    fn map_named(named: NamedType) -> ElementType {
        let lib = FakeLibrary::new();
        let hid = lib.add_datatype(FakeType::named(named));
        map_element_type(&lib, hid)
    }

    #[test]
    fn catalog_is_total_over_named_types() {
        // Every catalog row classifies to a concrete element type.
        let lib = FakeLibrary::new();
        for &(named, expected) in CATALOG {
            let hid = lib.add_datatype(FakeType::named(named));
            let got = map_element_type(&lib, hid);
            assert_eq!(got, expected, "{named:?}");
            assert_ne!(got, ElementType::Undefined, "{named:?}");
        }
    }

    #[test]
    fn one_representative_per_width_class() {
        assert_eq!(map_named(NamedType::StdU8Le), ElementType::Byte);
        assert_eq!(map_named(NamedType::StdI8Le), ElementType::Byte);
        assert_eq!(map_named(NamedType::StdI16Le), ElementType::Int16);
        assert_eq!(map_named(NamedType::StdU16Le), ElementType::UInt16);
        assert_eq!(map_named(NamedType::StdI32Le), ElementType::Int32);
        assert_eq!(map_named(NamedType::StdU32Le), ElementType::UInt32);
        assert_eq!(map_named(NamedType::StdI64Le), ElementType::Int64);
        assert_eq!(map_named(NamedType::NativeFloat), ElementType::Float32);
        assert_eq!(map_named(NamedType::NativeDouble), ElementType::Float64);
        assert_eq!(map_named(NamedType::CString), ElementType::Str);
    }

    #[test]
    fn equal_width_encodings_respect_catalog_precedence() {
        // Native double is a 64-bit float; the IEEE F64 aliases rank in the
        // signed-64 family. Equal width, different catalog rank.
        assert_eq!(map_named(NamedType::NativeDouble), ElementType::Float64);
        assert_eq!(map_named(NamedType::IeeeF64Le), ElementType::Int64);
        assert_eq!(map_named(NamedType::IeeeF64Be), ElementType::Int64);
    }

    #[test]
    fn unsigned_64_funnels_into_signed_64() {
        // Preserved host-visible behavior: unsigned 64-bit encodings are
        // classified as Int64 and read through the signed path. Flip this
        // test only with a deliberate compatibility decision.
        for named in [
            NamedType::NativeUllong,
            NamedType::NativeUint64,
            NamedType::StdU64Le,
            NamedType::StdU64Be,
        ] {
            assert_eq!(map_named(named), ElementType::Int64, "{named:?}");
        }
    }

    #[test]
    fn unknown_encoding_maps_to_undefined() {
        let lib = FakeLibrary::new();
        let hid = lib.add_datatype(FakeType::opaque());
        assert_eq!(map_element_type(&lib, hid), ElementType::Undefined);
    }
}
