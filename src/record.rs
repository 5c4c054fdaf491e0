//! Declarative records.

/// Declares a struct together with its [`Schema`](crate::Schema),
/// [`Encode`](crate::Encode) and [`Decode`](crate::Decode) impls.
///
/// Each field becomes a compound entry named after the field. A field can be
/// given a different wire name with `=> "Name"` after its type. Fields are
/// written in declaration order and may arrive in any order on decode.
///
/// # Example
///
/// ```
/// use shaped_nbt::{from_slice_be, nbt_record, to_vec_be};
///
/// nbt_record! {
///     #[derive(Debug, PartialEq)]
///     pub struct Player {
///         pub name: String => "Name",
///         pub health: f32 => "Health",
///         pub pos: Vec<f64> => "Pos",
///     }
/// }
///
/// let player = Player {
///     name: "Steve".into(),
///     health: 20.0,
///     pos: vec![0.5, 64.0, -3.5],
/// };
/// let bytes = to_vec_be(&player).unwrap();
/// assert_eq!(from_slice_be::<Player>(&bytes).unwrap(), player);
/// ```
#[macro_export]
macro_rules! nbt_record {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$field_meta:meta])*
                $field_vis:vis $field:ident : $ty:ty $(=> $wire:literal)?
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis struct $name {
            $(
                $(#[$field_meta])*
                $field_vis $field: $ty,
            )*
        }

        impl $crate::Schema for $name {
            fn shape() -> $crate::Shape {
                static FIELDS: &[$crate::Field] = &[
                    $(
                        $crate::Field::new(
                            $crate::__nbt_field_name!($field $(, $wire)?),
                            <$ty as $crate::Schema>::shape,
                        ),
                    )*
                ];
                $crate::Shape::Record(FIELDS)
            }
        }

        impl $crate::Encode for $name {
            #[allow(unused_mut, unused_variables, unused_assignments)]
            fn encode<W: ::std::io::Write, O: $crate::ByteOrder>(
                &self,
                encoder: $crate::Encoder<'_, W, O>,
            ) -> $crate::Result<()> {
                let mut compound = encoder.begin_compound()?;
                let mut index = 0usize;
                $(
                    compound.write_field(index, &self.$field)?;
                    index += 1;
                )*
                compound.end()
            }
        }

        impl $crate::Decode for $name {
            #[allow(unused_variables)]
            fn decode<R: ::std::io::Read, O: $crate::ByteOrder>(
                decoder: $crate::Decoder<'_, R, O>,
            ) -> $crate::Result<Self> {
                let mut compound = decoder.begin_compound()?;
                $(
                    let mut $field: ::core::option::Option<$ty> = ::core::option::Option::None;
                )*
                while let ::core::option::Option::Some(index) = compound.next_field()? {
                    let name = compound.field_name(index);
                    $(
                        if name == ::core::option::Option::Some($crate::__nbt_field_name!($field $(, $wire)?)) {
                            $field = ::core::option::Option::Some(compound.read_value()?);
                            continue;
                        }
                    )*
                    return ::core::result::Result::Err($crate::Error::UnknownField(
                        ::std::format!("#{index}"),
                    ));
                }
                compound.end()?;
                ::core::result::Result::Ok(Self {
                    $(
                        $field: $field.ok_or($crate::Error::MissingField(
                            $crate::__nbt_field_name!($field $(, $wire)?),
                        ))?,
                    )*
                })
            }
        }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __nbt_field_name {
    ($field:ident) => {
        ::core::stringify!($field)
    };
    ($field:ident, $wire:literal) => {
        $wire
    };
}
