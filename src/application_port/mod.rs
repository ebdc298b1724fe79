mod credential_verifier;
mod session_service;
mod token_codec;

pub use credential_verifier::*;
pub use session_service::*;
pub use token_codec::*;
