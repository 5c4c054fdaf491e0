//! Schema-driven NBT encoding and decoding.
//!
//! Values describe their structure through [`Schema`] and move data through
//! [`Encode`] and [`Decode`]. The codec derives every wire tag from that
//! structure and checks every tag it reads against it.
//!
//! ```
//! use shaped_nbt::{from_slice_be, nbt_record, to_vec_be};
//!
//! nbt_record! {
//!     #[derive(Debug, PartialEq)]
//!     struct Spawn {
//!         a: i32,
//!         b: Vec<i32>,
//!     }
//! }
//!
//! let spawn = Spawn { a: 5, b: vec![1, 2, 3] };
//! let bytes = to_vec_be(&spawn).unwrap();
//! assert_eq!(from_slice_be::<Spawn>(&bytes).unwrap(), spawn);
//! ```

pub use zerocopy::BigEndian;
pub use zerocopy::LittleEndian;
pub use zerocopy::NativeEndian;

mod config;
pub mod de;
mod error;
mod impls;
mod io;
mod record;
pub mod ser;
mod shape;
mod tag;
mod util;

pub use config::*;
pub use de::*;
pub use error::*;
pub use impls::*;
pub use io::*;
pub use ser::*;
pub use shape::*;
pub use tag::*;
pub(crate) use util::cold_path;
pub use util::ByteOrder;
