use shaped_nbt::{
    Config, Error, ListOf, Malformed, ScalarKind, SequenceForm, ShapeKind, TagID, from_slice_be,
    from_slice_le, from_slice_with, nbt_record,
};
use zerocopy::byteorder::BigEndian;

nbt_record! {
    #[derive(Debug, Clone, PartialEq)]
    struct Scenario {
        a: i32,
        b: Vec<i32>,
    }
}

nbt_record! {
    #[derive(Debug, PartialEq)]
    struct GenericList {
        a: i32,
        b: ListOf<i32>,
    }
}

nbt_record! {
    #[derive(Debug, PartialEq)]
    struct OnlyA {
        a: i32,
    }
}

nbt_record! {
    #[derive(Debug, PartialEq)]
    struct Item {
        id: i16,
    }
}

/// Builds a big-endian document from a root name and raw field bytes.
fn compound(name: &str, fields: &[&[u8]]) -> Vec<u8> {
    let mut out = vec![0x0A];
    out.extend_from_slice(&(name.len() as u16).to_be_bytes());
    out.extend_from_slice(name.as_bytes());
    for field in fields {
        out.extend_from_slice(field);
    }
    out.push(0x00);
    out
}

fn field(tag: u8, name: &str, payload: &[u8]) -> Vec<u8> {
    let mut out = vec![tag];
    out.extend_from_slice(&(name.len() as u16).to_be_bytes());
    out.extend_from_slice(name.as_bytes());
    out.extend_from_slice(payload);
    out
}

fn int_array(values: &[i32]) -> Vec<u8> {
    let mut out = (values.len() as i32).to_be_bytes().to_vec();
    for value in values {
        out.extend_from_slice(&value.to_be_bytes());
    }
    out
}

fn field_a() -> Vec<u8> {
    field(0x03, "a", &5i32.to_be_bytes())
}

fn field_b() -> Vec<u8> {
    field(0x0B, "b", &int_array(&[1, 2, 3]))
}

fn expected() -> Scenario {
    Scenario {
        a: 5,
        b: vec![1, 2, 3],
    }
}

#[test]
fn test_scenario_decodes() {
    let data = compound("", &[&field_a(), &field_b()]);
    assert_eq!(from_slice_be::<Scenario>(&data).unwrap(), expected());
}

#[test]
fn test_field_order_is_irrelevant() {
    let data = compound("", &[&field_b(), &field_a()]);
    assert_eq!(from_slice_be::<Scenario>(&data).unwrap(), expected());
}

#[test]
fn test_root_name_is_returned() {
    let data = compound("level", &[&field_a(), &field_b()]);
    let (name, value) = from_slice_with::<BigEndian, Scenario>(&data, &Config::default()).unwrap();
    assert_eq!(name, "level");
    assert_eq!(value, expected());
}

#[test]
fn test_int_array_rejected_for_generic_list() {
    let data = compound("", &[&field_a(), &field_b()]);
    let err = from_slice_be::<GenericList>(&data).unwrap_err();
    assert!(matches!(
        err,
        Error::TagShapeMismatch {
            tag: TagID::IntArray,
            expected: ShapeKind::Sequence {
                element: Some(ScalarKind::Int),
                form: SequenceForm::List,
            },
        }
    ));
}

#[test]
fn test_generic_list_satisfies_int_sequence() {
    let mut list = vec![0x03];
    list.extend_from_slice(&int_array(&[1, 2, 3]));
    let data = compound("", &[&field_a(), &field(0x09, "b", &list)]);
    assert_eq!(from_slice_be::<Scenario>(&data).unwrap(), expected());
    assert_eq!(
        from_slice_be::<GenericList>(&data).unwrap(),
        GenericList {
            a: 5,
            b: ListOf(vec![1, 2, 3]),
        }
    );
}

#[test]
fn test_one_field_too_many() {
    let data = compound("", &[&field_a(), &field_b()]);
    let err = from_slice_be::<OnlyA>(&data).unwrap_err();
    assert!(matches!(
        err,
        Error::ArityMismatch {
            expected: 1,
            found: 2
        }
    ));
}

#[test]
fn test_one_field_too_few() {
    let data = compound("", &[&field_a()]);
    let err = from_slice_be::<Scenario>(&data).unwrap_err();
    assert!(matches!(
        err,
        Error::ArityMismatch {
            expected: 2,
            found: 1
        }
    ));
}

#[test]
fn test_unknown_field() {
    let data = compound("", &[&field(0x03, "z", &5i32.to_be_bytes()), &field_b()]);
    let err = from_slice_be::<Scenario>(&data).unwrap_err();
    assert!(matches!(err, Error::UnknownField(name) if name == "z"));
}

#[test]
fn test_duplicate_field() {
    let data = compound("", &[&field_a(), &field_a()]);
    let err = from_slice_be::<Scenario>(&data).unwrap_err();
    assert!(matches!(err, Error::DuplicateField(name) if name == "a"));
}

#[test]
fn test_field_tag_must_match_shape() {
    let data = compound("", &[&field(0x04, "a", &5i64.to_be_bytes()), &field_b()]);
    let err = from_slice_be::<Scenario>(&data).unwrap_err();
    assert!(matches!(
        err,
        Error::TagShapeMismatch {
            tag: TagID::Long,
            expected: ShapeKind::Scalar(ScalarKind::Int),
        }
    ));
}

#[test]
fn test_root_array_checks_elements() {
    let mut data = vec![0x0B];
    data.extend_from_slice(&int_array(&[1]));
    let err = from_slice_be::<Vec<i16>>(&data).unwrap_err();
    assert!(matches!(
        err,
        Error::ElementTypeMismatch {
            element: TagID::Int,
            expected: ShapeKind::Scalar(ScalarKind::Short),
        }
    ));
    assert_eq!(from_slice_be::<Vec<i32>>(&data).unwrap(), [1]);
    assert_eq!(from_slice_be::<Vec<u32>>(&data).unwrap(), [1]);
}

#[test]
fn test_list_element_tag_must_match() {
    // List of one String
    let data = [0x09, 0x08, 0x00, 0x00, 0x00, 0x01, 0x00, 0x01, b'x'];
    let err = from_slice_be::<Vec<i32>>(&data).unwrap_err();
    assert!(matches!(
        err,
        Error::ElementTypeMismatch {
            element: TagID::String,
            ..
        }
    ));
    assert_eq!(from_slice_be::<Vec<String>>(&data).unwrap(), ["x"]);
}

#[test]
fn test_records_inside_list() {
    let data = compound(
        "",
        &[&field(
            0x09,
            "items",
            &[
                0x0A, 0x00, 0x00, 0x00, 0x02, //
                0x02, 0x00, 0x02, b'i', b'd', 0x00, 0x01, 0x00, //
                0x02, 0x00, 0x02, b'i', b'd', 0x00, 0x02, 0x00,
            ],
        )],
    );

    nbt_record! {
        #[derive(Debug, PartialEq)]
        struct Inventory {
            items: Vec<Item>,
        }
    }

    let inventory: Inventory = from_slice_be(&data).unwrap();
    assert_eq!(inventory.items, [Item { id: 1 }, Item { id: 2 }]);
}

#[test]
fn test_empty_list_of_end() {
    let data = [0x09, 0x00, 0x00, 0x00, 0x00, 0x00];
    assert!(from_slice_be::<Vec<Item>>(&data).unwrap().is_empty());
    assert!(from_slice_be::<Vec<i16>>(&data).unwrap().is_empty());
}

#[test]
fn test_non_empty_list_of_end() {
    let data = [0x09, 0x00, 0x00, 0x00, 0x00, 0x01];
    let err = from_slice_be::<Vec<Item>>(&data).unwrap_err();
    assert!(matches!(
        err,
        Error::MalformedStream(Malformed::EndElementWithLength(1))
    ));
}

#[test]
fn test_byte_and_long_arrays() {
    let data = [0x07, 0x00, 0x00, 0x00, 0x03, 0x01, 0x80, 0xFF];
    assert_eq!(from_slice_be::<Vec<i8>>(&data).unwrap(), [1, -128, -1]);
    assert_eq!(from_slice_be::<Vec<u8>>(&data).unwrap(), [1, 0x80, 0xFF]);

    let mut data = vec![0x0C, 0x00, 0x00, 0x00, 0x02];
    data.extend_from_slice(&i64::MAX.to_be_bytes());
    data.extend_from_slice(&(-2i64).to_be_bytes());
    assert_eq!(from_slice_be::<Vec<i64>>(&data).unwrap(), [i64::MAX, -2]);
    assert_eq!(
        from_slice_be::<Vec<u64>>(&data).unwrap(),
        [i64::MAX as u64, u64::MAX - 1]
    );
}

#[test]
fn test_long_array_rejected_for_ints() {
    let data = [0x0C, 0x00, 0x00, 0x00, 0x00];
    let err = from_slice_be::<Vec<i32>>(&data).unwrap_err();
    assert!(matches!(
        err,
        Error::ElementTypeMismatch {
            element: TagID::Long,
            ..
        }
    ));

    // Inside a compound the array tag itself is checked against the field shape.
    let data = compound("", &[&field_a(), &field(0x0C, "b", &[0, 0, 0, 0])]);
    let err = from_slice_be::<Scenario>(&data).unwrap_err();
    assert!(matches!(
        err,
        Error::TagShapeMismatch {
            tag: TagID::LongArray,
            ..
        }
    ));
}

#[test]
fn test_little_endian() {
    let data = [
        0x0A, 0x00, 0x00, //
        0x03, 0x01, 0x00, b'a', 0x05, 0x00, 0x00, 0x00, //
        0x0B, 0x01, 0x00, b'b', 0x01, 0x00, 0x00, 0x00, 0x09, 0x00, 0x00, 0x00, //
        0x00,
    ];
    assert_eq!(
        from_slice_le::<Scenario>(&data).unwrap(),
        Scenario { a: 5, b: vec![9] }
    );
}

#[test]
fn test_maps_collect_every_entry() {
    use std::collections::HashMap;

    let data = compound(
        "",
        &[
            &field(0x02, "x", &1i16.to_be_bytes()),
            &field(0x02, "y", &2i16.to_be_bytes()),
        ],
    );
    let map: HashMap<String, i16> = from_slice_be(&data).unwrap();
    assert_eq!(map.len(), 2);
    assert_eq!(map["x"], 1);
    assert_eq!(map["y"], 2);

    let data = compound("", &[&field(0x03, "x", &1i32.to_be_bytes())]);
    let err = from_slice_be::<HashMap<String, i16>>(&data).unwrap_err();
    assert!(matches!(
        err,
        Error::TagShapeMismatch {
            tag: TagID::Int,
            expected: ShapeKind::Scalar(ScalarKind::Short),
        }
    ));
}

#[test]
fn test_map_rejects_repeated_key() {
    use std::collections::BTreeMap;

    let data = compound(
        "",
        &[
            &field(0x02, "x", &1i16.to_be_bytes()),
            &field(0x02, "x", &2i16.to_be_bytes()),
        ],
    );
    let err = from_slice_be::<BTreeMap<String, i16>>(&data).unwrap_err();
    assert!(matches!(err, Error::DuplicateField(name) if name == "x"));
}
