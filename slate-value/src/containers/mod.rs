//! C1: the shared capability containers the value model is built on
//! (spec §3.1/§4.1). Each container is a cheap-to-clone handle around an
//! `Rc`-shared backing store, following the teacher's shared-handle
//! convention rather than hand-rolled retain/release counting.

pub mod array;
pub mod bignum;
pub mod buffer;
pub mod object;
pub mod string;

pub use array::{ArrayError, SlateArray};
pub use bignum::SlateBigInt;
pub use buffer::{BufferBuilder, BufferError, BufferReader, Endian, SlateBuffer};
pub use object::SlateObject;
pub use string::{SlateString, StringBuilder, StringError};
