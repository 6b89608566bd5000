//! Signed access tokens.

pub mod codec;

pub use codec::TokenCodec;
