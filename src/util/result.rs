//! Standard error and result types for the library.
use rlp::DecoderError;
use secp256k1::Error as Secp256k1Error;

/// Standard error type used in the library
#[derive(Debug)]
pub enum Error {
    /// An argument provided is invalid
    BadArgument(String),
    /// The data given is not valid
    BadData(String),
    /// The RLP structure could not be decoded
    DecoderError(DecoderError),
    /// The state is not valid for the requested operation
    IllegalState(String),
    /// The signature is not valid
    InvalidSignature(String),
    /// Error in the Secp256k1 library
    Secp256k1Error(Secp256k1Error),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::BadArgument(s) => write!(f, "Bad argument: {}", s),
            Error::BadData(s) => write!(f, "Bad data: {}", s),
            Error::DecoderError(e) => write!(f, "RLP decoder error: {}", e),
            Error::IllegalState(s) => write!(f, "Illegal state: {}", s),
            Error::InvalidSignature(s) => write!(f, "Invalid signature: {}", s),
            Error::Secp256k1Error(e) => write!(f, "Secp256k1 error: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::DecoderError(e) => Some(e),
            Error::Secp256k1Error(e) => Some(e),
            _ => None,
        }
    }
}

impl From<DecoderError> for Error {
    fn from(e: DecoderError) -> Self {
        Error::DecoderError(e)
    }
}

impl From<Secp256k1Error> for Error {
    fn from(e: Secp256k1Error) -> Self {
        Error::Secp256k1Error(e)
    }
}

/// Standard Result used in the library
pub type Result<T> = std::result::Result<T, Error>;
