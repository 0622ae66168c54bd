pub mod decode_error;
pub use decode_error as DecodeError;

pub type CResult<T> = Result<T, decode_error::ReError>;
