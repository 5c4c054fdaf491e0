//! The schema-level description of values.
//!
//! The codec never discovers structure from data. Every position in a document
//! is described by a [`Shape`] supplied by the value's [`Schema`] impl, and the
//! wire tag written or accepted there is derived from that shape.
//!
//! Nested shapes are stored as `fn() -> Shape` so a record can refer to
//! itself without building an infinite tree:
//!
//! ```
//! use shaped_nbt::{Field, Schema, Shape};
//!
//! struct Node {
//!     children: Vec<Node>,
//! }
//!
//! impl Schema for Node {
//!     fn shape() -> Shape {
//!         static FIELDS: [Field; 1] = [Field::new("children", <Vec<Node> as Schema>::shape)];
//!         Shape::Record(&FIELDS)
//!     }
//! }
//!
//! let shape = Node::shape();
//! assert_eq!(shape.field_count(), 1);
//! assert_eq!(shape.field_name(0), Some("children"));
//! ```

use std::{fmt, ptr};

use crate::TagID;

/// A lazily evaluated shape, used for nested positions.
pub type ShapeFn = fn() -> Shape;

/// The scalar kinds a shape can declare.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum ScalarKind {
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
    String,
}

/// How a sequence chooses between the compact array tags and `List`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub enum SequenceForm {
    /// Byte, int and long elements use `ByteArray`, `IntArray` and `LongArray`;
    /// everything else uses `List`.
    #[default]
    Auto,
    /// Always a generic `List`, even for byte, int and long elements.
    List,
}

/// One named field of a record shape.
#[derive(Clone, Copy, Debug)]
pub struct Field {
    pub name: &'static str,
    pub shape: ShapeFn,
}

impl Field {
    pub const fn new(name: &'static str, shape: ShapeFn) -> Self {
        Self { name, shape }
    }

    #[inline]
    pub fn shape(&self) -> Shape {
        (self.shape)()
    }
}

/// The description of a value's structure.
#[derive(Clone, Copy, Debug)]
pub enum Shape {
    Scalar(ScalarKind),
    /// A fixed-arity record; fields are matched by name on decode.
    Record(&'static [Field]),
    /// String-keyed entries whose values all share one shape.
    Map(ShapeFn),
    /// A homogeneous ordered collection.
    Sequence { element: ShapeFn, form: SequenceForm },
}

/// The coarse classification of a [`Shape`] that tag compatibility is checked against.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum ShapeKind {
    Scalar(ScalarKind),
    Record,
    Map,
    /// `element` is the element's scalar kind, or `None` for non-scalar elements.
    Sequence {
        element: Option<ScalarKind>,
        form: SequenceForm,
    },
}

impl Shape {
    pub const fn list_of(element: ShapeFn) -> Self {
        Self::Sequence {
            element,
            form: SequenceForm::Auto,
        }
    }

    pub fn kind(&self) -> ShapeKind {
        match *self {
            Shape::Scalar(kind) => ShapeKind::Scalar(kind),
            Shape::Record(_) => ShapeKind::Record,
            Shape::Map(_) => ShapeKind::Map,
            Shape::Sequence { element, form } => ShapeKind::Sequence {
                element: match element() {
                    Shape::Scalar(kind) => Some(kind),
                    _ => None,
                },
                form,
            },
        }
    }

    /// The declared fields of a record, empty for every other shape.
    pub fn fields(&self) -> &'static [Field] {
        match *self {
            Shape::Record(fields) => fields,
            _ => &[],
        }
    }

    pub fn field_count(&self) -> usize {
        self.fields().len()
    }

    pub fn field_name(&self, index: usize) -> Option<&'static str> {
        self.fields().get(index).map(|field| field.name)
    }

    /// Finds a field by exact name.
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields().iter().position(|field| field.name == name)
    }

    pub fn field_shape(&self, index: usize) -> Option<Shape> {
        self.fields().get(index).map(Field::shape)
    }

    /// Returns `true` if a value of this shape, written where `declared` is
    /// expected, reads back under `declared`.
    ///
    /// Both shapes must map to the same tag at every level, and records must
    /// carry the same field names. A pair of records already under comparison
    /// is assumed to conform, so recursive shapes terminate.
    pub fn conforms_to(&self, declared: &Shape) -> bool {
        conforms(self, declared, &mut Vec::new())
    }

    /// The element shape of a sequence, or the value shape of a map.
    pub fn element_shape(&self) -> Option<Shape> {
        match *self {
            Shape::Sequence { element, .. } => Some(element()),
            Shape::Map(value) => Some(value()),
            _ => None,
        }
    }
}

type RecordPair = (*const Field, *const Field);

fn conforms(shape: &Shape, declared: &Shape, assumed: &mut Vec<RecordPair>) -> bool {
    if TagID::for_shape(shape) != TagID::for_shape(declared) {
        return false;
    }
    match (*shape, *declared) {
        (Shape::Scalar(kind), Shape::Scalar(expected)) => kind == expected,
        (Shape::Record(fields), Shape::Record(expected)) => {
            if ptr::eq(fields, expected) {
                return true;
            }
            let pair = (fields.as_ptr(), expected.as_ptr());
            if assumed.contains(&pair) {
                return true;
            }
            if fields.len() != expected.len() {
                return false;
            }
            assumed.push(pair);
            fields.iter().all(|field| {
                expected
                    .iter()
                    .find(|other| other.name == field.name)
                    .is_some_and(|other| conforms(&field.shape(), &other.shape(), assumed))
            })
        }
        (Shape::Map(value), Shape::Map(expected)) => conforms(&value(), &expected(), assumed),
        (Shape::Sequence { element, .. }, Shape::Sequence { element: expected, .. }) => {
            conforms(&element(), &expected(), assumed)
        }
        _ => false,
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ScalarKind::Byte => "byte",
            ScalarKind::Short => "short",
            ScalarKind::Int => "int",
            ScalarKind::Long => "long",
            ScalarKind::Float => "float",
            ScalarKind::Double => "double",
            ScalarKind::String => "string",
        })
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShapeKind::Scalar(kind) => write!(f, "{kind}"),
            ShapeKind::Record => f.write_str("record"),
            ShapeKind::Map => f.write_str("map"),
            ShapeKind::Sequence { element, form } => {
                let prefix = match form {
                    SequenceForm::Auto => "sequence",
                    SequenceForm::List => "list",
                };
                match element {
                    Some(kind) => write!(f, "{prefix} of {kind}"),
                    None => write!(f, "{prefix} of compounds or lists"),
                }
            }
        }
    }
}

/// Introspection capability: the shape of every value of a type.
///
/// Implemented for the std scalar, string, collection and map types, and by
/// [`nbt_record!`](crate::nbt_record) for records.
pub trait Schema {
    fn shape() -> Shape;
}
