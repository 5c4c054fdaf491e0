//! Hand-written schema walkers driving the engines directly.

use std::io::{Read, Write};

use shaped_nbt::{
    ByteOrder, Decode, Decoder, Encode, Encoder, Error, Field, Result, ScalarKind, Schema,
    SequenceForm, Shape, ShapeKind, TagID, from_slice_be, to_vec_be,
};

/// A 2D point stored as a compound `{x, y}`.
#[derive(Debug, PartialEq)]
struct Point {
    x: f32,
    y: f32,
}

impl Schema for Point {
    fn shape() -> Shape {
        static FIELDS: [Field; 2] = [
            Field::new("x", <f32 as Schema>::shape),
            Field::new("y", <f32 as Schema>::shape),
        ];
        Shape::Record(&FIELDS)
    }
}

impl Encode for Point {
    fn encode<W: Write, O: ByteOrder>(&self, encoder: Encoder<'_, W, O>) -> Result<()> {
        let mut compound = encoder.begin_compound()?;
        compound.write_field(0, &self.x)?;
        compound.write_field(1, &self.y)?;
        compound.end()
    }
}

impl Decode for Point {
    fn decode<R: Read, O: ByteOrder>(decoder: Decoder<'_, R, O>) -> Result<Self> {
        let mut compound = decoder.begin_compound()?;
        let (mut x, mut y) = (None, None);
        while let Some(index) = compound.next_field()? {
            match index {
                0 => x = Some(compound.read_value()?),
                _ => y = Some(compound.read_value()?),
            }
        }
        Ok(Point {
            x: x.ok_or(Error::MissingField("x"))?,
            y: y.ok_or(Error::MissingField("y"))?,
        })
    }
}

/// A polyline that records how many points the stream announced.
#[derive(Debug, PartialEq)]
struct Polyline {
    announced: u32,
    points: Vec<Point>,
}

impl Schema for Polyline {
    fn shape() -> Shape {
        Shape::list_of(<Point as Schema>::shape)
    }
}

impl Decode for Polyline {
    fn decode<R: Read, O: ByteOrder>(decoder: Decoder<'_, R, O>) -> Result<Self> {
        let mut list = decoder.begin_list()?;
        let announced = list.len();
        assert_eq!(list.element_tag(), TagID::Compound);
        let mut points = Vec::new();
        while let Some(point) = list.next_element()? {
            points.push(point);
        }
        assert_eq!(list.remaining(), 0);
        Ok(Polyline { announced, points })
    }
}

/// Writes a field by an index the record does not declare.
struct OutOfRange;

impl Schema for OutOfRange {
    fn shape() -> Shape {
        Point::shape()
    }
}

impl Encode for OutOfRange {
    fn encode<W: Write, O: ByteOrder>(&self, encoder: Encoder<'_, W, O>) -> Result<()> {
        let mut compound = encoder.begin_compound()?;
        compound.write_field(2, &0f32)?;
        compound.end()
    }
}

/// Reads a value without advancing to a field first.
#[derive(Debug)]
struct Eager;

impl Schema for Eager {
    fn shape() -> Shape {
        Point::shape()
    }
}

impl Decode for Eager {
    fn decode<R: Read, O: ByteOrder>(decoder: Decoder<'_, R, O>) -> Result<Self> {
        let mut compound = decoder.begin_compound()?;
        let _: f32 = compound.read_value()?;
        Ok(Eager)
    }
}

/// Reads exactly the declared number of fields, then closes the compound.
#[derive(Debug, PartialEq)]
struct Counted(Vec<f32>);

impl Schema for Counted {
    fn shape() -> Shape {
        Point::shape()
    }
}

impl Decode for Counted {
    fn decode<R: Read, O: ByteOrder>(decoder: Decoder<'_, R, O>) -> Result<Self> {
        let mut compound = decoder.begin_compound()?;
        let mut values = Vec::new();
        for _ in 0..compound.field_count() {
            if compound.next_field()?.is_some() {
                values.push(compound.read_value()?);
            }
        }
        compound.end()?;
        Ok(Counted(values))
    }
}

/// Closes the compound after its first field.
#[derive(Debug)]
struct Hasty;

impl Schema for Hasty {
    fn shape() -> Shape {
        Point::shape()
    }
}

impl Decode for Hasty {
    fn decode<R: Read, O: ByteOrder>(decoder: Decoder<'_, R, O>) -> Result<Self> {
        let mut compound = decoder.begin_compound()?;
        if compound.next_field()?.is_some() {
            let _: f32 = compound.read_value()?;
        }
        compound.end()?;
        Ok(Hasty)
    }
}

/// `Point` with one more field.
struct Point3 {
    x: f32,
    y: f32,
    z: f32,
}

impl Schema for Point3 {
    fn shape() -> Shape {
        static FIELDS: [Field; 3] = [
            Field::new("x", <f32 as Schema>::shape),
            Field::new("y", <f32 as Schema>::shape),
            Field::new("z", <f32 as Schema>::shape),
        ];
        Shape::Record(&FIELDS)
    }
}

impl Encode for Point3 {
    fn encode<W: Write, O: ByteOrder>(&self, encoder: Encoder<'_, W, O>) -> Result<()> {
        let mut compound = encoder.begin_compound()?;
        compound.write_field(0, &self.x)?;
        compound.write_field(1, &self.y)?;
        compound.write_field(2, &self.z)?;
        compound.end()
    }
}

/// A recursive record, structurally identical to `Branch`.
struct Twig;

impl Schema for Twig {
    fn shape() -> Shape {
        static FIELDS: [Field; 1] = [Field::new("kids", <Vec<Twig> as Schema>::shape)];
        Shape::Record(&FIELDS)
    }
}

struct Branch;

impl Schema for Branch {
    fn shape() -> Shape {
        static FIELDS: [Field; 1] = [Field::new("kids", <Vec<Branch> as Schema>::shape)];
        Shape::Record(&FIELDS)
    }
}

#[test]
fn test_shape_introspection() {
    let shape = Point::shape();
    assert_eq!(shape.kind(), ShapeKind::Record);
    assert_eq!(shape.field_count(), 2);
    assert_eq!(shape.field_name(1), Some("y"));
    assert_eq!(shape.field_name(2), None);
    assert_eq!(shape.field_index("x"), Some(0));
    assert_eq!(shape.field_index("X"), None);
    assert_eq!(
        shape.field_shape(0).map(|shape| shape.kind()),
        Some(ShapeKind::Scalar(ScalarKind::Float))
    );
    assert!(shape.element_shape().is_none());

    let polyline = Polyline::shape();
    assert_eq!(
        polyline.kind(),
        ShapeKind::Sequence {
            element: None,
            form: SequenceForm::Auto
        }
    );
    assert_eq!(polyline.element_shape().map(|shape| shape.field_count()), Some(2));
    assert_eq!(polyline.field_count(), 0);
}

#[test]
fn test_hand_written_walkers() {
    let points = vec![Point { x: 1.0, y: 2.0 }, Point { x: -1.5, y: 0.25 }];
    let bytes = to_vec_be(&points).unwrap();
    let polyline: Polyline = from_slice_be(&bytes).unwrap();
    assert_eq!(polyline.announced, 2);
    assert_eq!(polyline.points, points);
}

#[test]
fn test_undeclared_field_index() {
    let err = to_vec_be(&OutOfRange).unwrap_err();
    assert!(matches!(err, Error::UnknownField(name) if name == "#2"));
}

#[test]
fn test_read_value_without_field() {
    let bytes = to_vec_be(&Point { x: 0.0, y: 0.0 }).unwrap();
    let err = from_slice_be::<Eager>(&bytes).unwrap_err();
    assert!(matches!(err, Error::Message(_)));
}

#[test]
fn test_missing_field_message() {
    assert_eq!(Error::MissingField("x").to_string(), "missing field `x`");
}

#[test]
fn test_end_consumes_the_terminator() {
    let bytes = to_vec_be(&Point { x: 1.0, y: 2.0 }).unwrap();
    assert_eq!(
        from_slice_be::<Counted>(&bytes).unwrap(),
        Counted(vec![1.0, 2.0])
    );

    let bytes = to_vec_be(&Point3 {
        x: 1.0,
        y: 2.0,
        z: 3.0,
    })
    .unwrap();
    let err = from_slice_be::<Counted>(&bytes).unwrap_err();
    assert!(matches!(
        err,
        Error::ArityMismatch {
            expected: 2,
            found: 3
        }
    ));
}

#[test]
fn test_end_before_every_field() {
    let bytes = to_vec_be(&Point { x: 1.0, y: 2.0 }).unwrap();
    let err = from_slice_be::<Hasty>(&bytes).unwrap_err();
    assert!(matches!(err, Error::MissingField("y")));
}

#[test]
fn test_shape_conformance() {
    assert!(Point::shape().conforms_to(&Point::shape()));
    assert!(!Point3::shape().conforms_to(&Point::shape()));
    assert!(!<Vec<i16> as Schema>::shape().conforms_to(&<Vec<String> as Schema>::shape()));
    assert!(
        !<Vec<i32> as Schema>::shape().conforms_to(&<shaped_nbt::ListOf<i32> as Schema>::shape())
    );
    assert!(<Vec<u32> as Schema>::shape().conforms_to(&<Vec<i32> as Schema>::shape()));
    assert!(Twig::shape().conforms_to(&Branch::shape()));
}
