//! Shared primitives: Keccak digests and the library error type.

mod keccak;
mod result;

pub use self::keccak::{keccak256, keccak512};
pub use self::result::{Error, Result};
