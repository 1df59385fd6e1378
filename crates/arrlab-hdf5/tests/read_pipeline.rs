//! End-to-end reads against the in-memory library fake.

use arrlab_hdf5::testing::{FailPoint, FakeLibrary, FakeType};
use arrlab_hdf5::{read_attribute, read_dataset, H5Error, NamedType};
use arrlab_values::{ElementType, HostValue};

fn i32_bytes(values: &[i32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(values.len() * 4);
    for v in values {
        bytes.extend_from_slice(&v.to_ne_bytes());
    }
    bytes
}

#[test]
fn zeroed_float64_dataset_round_trips() {
    let lib = FakeLibrary::new();
    let dset = lib.add_f64_dataset(&[2, 2], &[0.0; 4]);

    let value = read_dataset(&lib, dset).expect("read");
    assert_eq!(value.element_type(), ElementType::Float64);
    assert_eq!(value.len(), 4);
    assert_eq!(value.shape(), &[2, 2]);
    match value {
        HostValue::Float64(a) => assert!(a.data.iter().all(|&v| v == 0.0)),
        other => panic!("unexpected value {other:?}"),
    }

    // no derived handle survives the call
    assert_eq!(lib.open_space_count(), 0);
    assert_eq!(lib.open_type_count(), 0);
}

#[test]
fn dataset_axes_are_reversed_for_the_host() {
    let lib = FakeLibrary::new();
    let values: Vec<f64> = (0..24).map(f64::from).collect();
    let dset = lib.add_f64_dataset(&[2, 3, 4], &values);

    let value = read_dataset(&lib, dset).expect("read");
    assert_eq!(value.shape(), &[4, 3, 2]);
    match value {
        // the buffer is filled in storage order, only the axis labels flip
        HostValue::Float64(a) => assert_eq!(a.data, values),
        other => panic!("unexpected value {other:?}"),
    }
}

#[test]
fn array_typed_element_composes_into_one_shape() {
    let lib = FakeLibrary::new();
    // rank-2 dataset [5,6] whose element is a rank-1 array of 3 ints
    let element = FakeType::array(FakeType::named(NamedType::NativeInt32), &[3]);
    let data = i32_bytes(&vec![1; 5 * 6 * 3]);
    let dset = lib.add_dataset(element, &[5, 6], data);

    let value = read_dataset(&lib, dset).expect("read");
    assert_eq!(value.element_type(), ElementType::Int32);
    assert_eq!(value.shape(), &[3, 6, 5]);
    assert_eq!(value.len(), 90);
    assert_eq!(lib.open_space_count(), 0);
    assert_eq!(lib.open_type_count(), 0);
}

#[test]
fn attribute_with_array_element_composes_too() {
    let lib = FakeLibrary::new();
    let element = FakeType::array(FakeType::named(NamedType::NativeDouble), &[2, 3]);
    let attr = lib.add_attribute(element, &[4], vec![0u8; 4 * 6 * 8]);

    let value = read_attribute(&lib, attr).expect("read");
    assert_eq!(value.shape(), &[3, 2, 4]);
    assert_eq!(lib.open_type_count(), 0);
}

#[test]
fn string_dataset_round_trips_without_terminators() {
    let lib = FakeLibrary::new();
    let dset = lib.add_string_dataset(8, &["alpha", "be", "gamma"]);

    let value = read_dataset(&lib, dset).expect("read");
    assert_eq!(value.element_type(), ElementType::Str);
    match value {
        HostValue::Str(a) => {
            assert_eq!(a.shape, vec![3]);
            assert_eq!(a.data, vec!["alpha", "be", "gamma"]);
            assert!(a.data.iter().all(|s| !s.contains('\0')));
        }
        other => panic!("unexpected value {other:?}"),
    }
    assert_eq!(lib.open_space_count(), 0);
    assert_eq!(lib.open_type_count(), 0);
}

#[test]
fn string_attribute_round_trips() {
    let lib = FakeLibrary::new();
    let attr = lib.add_string_attribute(6, &["one", "two"], &[2]);

    let value = read_attribute(&lib, attr).expect("read");
    match value {
        HostValue::Str(a) => assert_eq!(a.data, vec!["one", "two"]),
        other => panic!("unexpected value {other:?}"),
    }
}

#[test]
fn unsigned_64_bit_data_reads_through_the_signed_path() {
    // Preserved compatibility quirk: unsigned 64-bit encodings classify as
    // Int64, so the value comes back as signed with reinterpreted bits.
    let lib = FakeLibrary::new();
    let dset = lib.add_u64_dataset(&[3], &[1, 2, u64::MAX]);

    let value = read_dataset(&lib, dset).expect("read");
    assert_eq!(value.element_type(), ElementType::Int64);
    match value {
        HostValue::Int64(a) => assert_eq!(a.data, vec![1, 2, -1]),
        other => panic!("unexpected value {other:?}"),
    }
}

#[test]
fn unsupported_type_aborts_before_any_read() {
    let lib = FakeLibrary::new();
    let dset = lib.add_dataset(FakeType::opaque(), &[2], vec![0u8; 2]);

    let err = read_dataset(&lib, dset).unwrap_err();
    assert!(matches!(err, H5Error::UnsupportedType { .. }));
    // the caller's handle is untouched and every derived handle is closed
    assert!(lib.is_open(dset));
    assert_eq!(lib.open_space_count(), 0);
    assert_eq!(lib.open_type_count(), 0);
}

#[test]
fn read_failure_still_releases_every_handle() {
    let lib = FakeLibrary::new();
    let element = FakeType::array(FakeType::named(NamedType::NativeDouble), &[3]);
    let dset = lib.add_dataset(element, &[2], vec![0u8; 2 * 3 * 8]);
    lib.fail_next(FailPoint::Read);

    let err = read_dataset(&lib, dset).unwrap_err();
    assert!(matches!(err, H5Error::Read(_)));

    // file space + memory space, object type + element type + transfer type
    assert_eq!(lib.space_creations(), 2);
    assert_eq!(lib.type_creations(), 3);
    assert_eq!(lib.open_space_count(), 0);
    assert_eq!(lib.open_type_count(), 0);
    assert!(lib.is_open(dset));
}

#[test]
fn failed_space_acquisition_is_an_introspection_error() {
    let lib = FakeLibrary::new();
    let dset = lib.add_f64_dataset(&[2], &[0.0, 0.0]);
    lib.fail_next(FailPoint::GetSpace);

    let err = read_dataset(&lib, dset).unwrap_err();
    assert!(matches!(err, H5Error::Introspection(_)));
    assert_eq!(lib.open_space_count(), 0);
}

#[test]
fn failed_type_acquisition_releases_the_space() {
    let lib = FakeLibrary::new();
    let dset = lib.add_f64_dataset(&[2], &[0.0, 0.0]);
    lib.fail_next(FailPoint::GetType);

    let err = read_dataset(&lib, dset).unwrap_err();
    assert!(matches!(err, H5Error::Introspection(_)));
    assert_eq!(lib.space_creations(), 1);
    assert_eq!(lib.open_space_count(), 0);
    assert_eq!(lib.open_type_count(), 0);
}

#[test]
fn error_carries_the_library_diagnostic_text() {
    let lib = FakeLibrary::new();
    let dset = lib.add_f64_dataset(&[2], &[0.0, 0.0]);
    lib.fail_next(FailPoint::Read);

    match read_dataset(&lib, dset).unwrap_err() {
        H5Error::Read(msg) => assert_eq!(msg, "filter returned failure during read"),
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn scalar_dataset_reads_one_element() {
    let lib = FakeLibrary::new();
    let dset = lib.add_dataset(
        FakeType::named(NamedType::NativeDouble),
        &[],
        1.25f64.to_ne_bytes().to_vec(),
    );

    let value = read_dataset(&lib, dset).expect("read");
    assert!(value.shape().is_empty());
    match value {
        HostValue::Float64(a) => assert_eq!(a.data, vec![1.25]),
        other => panic!("unexpected value {other:?}"),
    }
}
