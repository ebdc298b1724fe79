mod credential_verifier_fake;
mod session_service_fake;
mod session_service_impl;
mod token_codec_impl;

pub use credential_verifier_fake::*;
pub use session_service_fake::*;
pub use session_service_impl::*;
pub use token_codec_impl::*;
