use std::fmt;

use crate::{Error, Result, ScalarKind, SequenceForm, Shape, ShapeKind};

/// The one-byte wire identifier selecting a value's binary representation.
#[repr(u8)]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum TagID {
    End = 0,
    Byte = 1,
    Short = 2,
    Int = 3,
    Long = 4,
    Float = 5,
    Double = 6,
    ByteArray = 7,
    String = 8,
    List = 9,
    Compound = 10,
    IntArray = 11,
    LongArray = 12,
}

impl TagID {
    /// Looks up a tag by its wire id.
    ///
    /// # Example
    ///
    /// ```
    /// use shaped_nbt::TagID;
    ///
    /// assert_eq!(TagID::from_id(11).unwrap(), TagID::IntArray);
    /// assert!(TagID::from_id(13).is_err());
    /// ```
    pub fn from_id(id: u8) -> Result<Self> {
        Ok(match id {
            0 => Self::End,
            1 => Self::Byte,
            2 => Self::Short,
            3 => Self::Int,
            4 => Self::Long,
            5 => Self::Float,
            6 => Self::Double,
            7 => Self::ByteArray,
            8 => Self::String,
            9 => Self::List,
            10 => Self::Compound,
            11 => Self::IntArray,
            12 => Self::LongArray,
            _ => return Err(Error::UnknownTag(id)),
        })
    }

    /// The tag the encoder writes for a value of the given shape.
    ///
    /// Byte, int and long sequences in [`SequenceForm::Auto`] become compact
    /// arrays; every other sequence becomes a generic `List`.
    pub fn for_shape(shape: &Shape) -> Self {
        match *shape {
            Shape::Scalar(kind) => Self::for_scalar(kind),
            Shape::Record(_) | Shape::Map(_) => Self::Compound,
            Shape::Sequence { element, form } => match (form, element()) {
                (SequenceForm::Auto, Shape::Scalar(ScalarKind::Byte)) => Self::ByteArray,
                (SequenceForm::Auto, Shape::Scalar(ScalarKind::Int)) => Self::IntArray,
                (SequenceForm::Auto, Shape::Scalar(ScalarKind::Long)) => Self::LongArray,
                _ => Self::List,
            },
        }
    }

    pub const fn for_scalar(kind: ScalarKind) -> Self {
        match kind {
            ScalarKind::Byte => Self::Byte,
            ScalarKind::Short => Self::Short,
            ScalarKind::Int => Self::Int,
            ScalarKind::Long => Self::Long,
            ScalarKind::Float => Self::Float,
            ScalarKind::Double => Self::Double,
            ScalarKind::String => Self::String,
        }
    }

    /// Returns `true` if a value carrying this tag can satisfy `kind`.
    ///
    /// # Example
    ///
    /// ```
    /// use shaped_nbt::{ScalarKind, SequenceForm, ShapeKind, TagID};
    ///
    /// let ints = ShapeKind::Sequence {
    ///     element: Some(ScalarKind::Int),
    ///     form: SequenceForm::Auto,
    /// };
    /// assert!(TagID::IntArray.is_compatible(ints));
    /// assert!(TagID::List.is_compatible(ints));
    /// assert!(!TagID::LongArray.is_compatible(ints));
    /// assert!(TagID::Compound.is_compatible(ShapeKind::Map));
    /// ```
    pub const fn is_compatible(self, kind: ShapeKind) -> bool {
        match self {
            Self::End => false,
            Self::Byte => matches!(kind, ShapeKind::Scalar(ScalarKind::Byte)),
            Self::Short => matches!(kind, ShapeKind::Scalar(ScalarKind::Short)),
            Self::Int => matches!(kind, ShapeKind::Scalar(ScalarKind::Int)),
            Self::Long => matches!(kind, ShapeKind::Scalar(ScalarKind::Long)),
            Self::Float => matches!(kind, ShapeKind::Scalar(ScalarKind::Float)),
            Self::Double => matches!(kind, ShapeKind::Scalar(ScalarKind::Double)),
            Self::String => matches!(kind, ShapeKind::Scalar(ScalarKind::String)),
            Self::Compound => matches!(kind, ShapeKind::Record | ShapeKind::Map),
            Self::List => matches!(kind, ShapeKind::Sequence { .. }),
            Self::ByteArray => matches!(
                kind,
                ShapeKind::Sequence {
                    element: Some(ScalarKind::Byte),
                    form: SequenceForm::Auto
                }
            ),
            Self::IntArray => matches!(
                kind,
                ShapeKind::Sequence {
                    element: Some(ScalarKind::Int),
                    form: SequenceForm::Auto
                }
            ),
            Self::LongArray => matches!(
                kind,
                ShapeKind::Sequence {
                    element: Some(ScalarKind::Long),
                    form: SequenceForm::Auto
                }
            ),
        }
    }

    /// The element tag implied by a compact array tag.
    pub const fn array_element(self) -> Option<Self> {
        match self {
            Self::ByteArray => Some(Self::Byte),
            Self::IntArray => Some(Self::Int),
            Self::LongArray => Some(Self::Long),
            _ => None,
        }
    }

    /// Returns `true` if this is a primitive tag type.
    ///
    /// Primitive tags are: Byte, Short, Int, Long, Float, Double.
    pub const fn is_primitive(self) -> bool {
        matches!(
            self,
            Self::Byte | Self::Short | Self::Int | Self::Long | Self::Float | Self::Double
        )
    }

    /// Returns `true` if this is an array tag type.
    ///
    /// # Example
    ///
    /// ```
    /// use shaped_nbt::TagID;
    ///
    /// assert!(TagID::ByteArray.is_array());
    /// assert!(TagID::LongArray.is_array());
    /// assert!(!TagID::List.is_array());
    /// ```
    pub const fn is_array(self) -> bool {
        matches!(self, Self::ByteArray | Self::IntArray | Self::LongArray)
    }

    /// Returns `true` if this is a composite tag type (List or Compound).
    pub const fn is_composite(self) -> bool {
        matches!(self, Self::List | Self::Compound)
    }

    /// Returns `true` for `List` and the three compact array tags.
    pub const fn is_sequence(self) -> bool {
        matches!(
            self,
            Self::List | Self::ByteArray | Self::IntArray | Self::LongArray
        )
    }
}

impl TryFrom<u8> for TagID {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        Self::from_id(value)
    }
}

impl fmt::Display for TagID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::End => "TAG_End",
            Self::Byte => "TAG_Byte",
            Self::Short => "TAG_Short",
            Self::Int => "TAG_Int",
            Self::Long => "TAG_Long",
            Self::Float => "TAG_Float",
            Self::Double => "TAG_Double",
            Self::ByteArray => "TAG_Byte_Array",
            Self::String => "TAG_String",
            Self::List => "TAG_List",
            Self::Compound => "TAG_Compound",
            Self::IntArray => "TAG_Int_Array",
            Self::LongArray => "TAG_Long_Array",
        };
        f.write_str(name)
    }
}
