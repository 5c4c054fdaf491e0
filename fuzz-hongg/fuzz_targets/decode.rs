use std::collections::BTreeMap;

use honggfuzz::fuzz;
use shaped_nbt::{BigEndian, Decode, Encode, LittleEndian, ListOf, from_slice, nbt_record, to_vec};

nbt_record! {
    struct Inner {
        name: String,
        values: ListOf<i32>,
        children: Vec<Inner>,
    }
}

nbt_record! {
    struct Outer {
        byte: i8,
        short: i16,
        long: i64,
        double: f64,
        bytes: Vec<u8>,
        longs: Vec<i64>,
        inner: Inner,
        tags: BTreeMap<String, Vec<String>>,
    }
}

/// Anything that decodes must re-encode to a stable document.
fn check<T: Encode + Decode>(data: &[u8]) {
    if let Ok(value) = from_slice::<BigEndian, T>(data) {
        let bytes = to_vec::<BigEndian>(&value).unwrap();
        let again = from_slice::<BigEndian, T>(&bytes).unwrap();
        assert_eq!(to_vec::<BigEndian>(&again).unwrap(), bytes);
    }
    if let Ok(value) = from_slice::<LittleEndian, T>(data) {
        let bytes = to_vec::<LittleEndian>(&value).unwrap();
        let again = from_slice::<LittleEndian, T>(&bytes).unwrap();
        assert_eq!(to_vec::<LittleEndian>(&again).unwrap(), bytes);
    }
}

fn main() {
    loop {
        fuzz!(|data: &[u8]| {
            check::<Outer>(data);
            check::<Inner>(data);
            check::<Vec<Inner>>(data);
            check::<Vec<i32>>(data);
            check::<BTreeMap<String, i16>>(data);
        });
    }
}
