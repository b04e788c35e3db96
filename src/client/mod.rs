//! Client-side navigation: the Traverson engine and its collaborators.

pub mod hop;
pub mod resolver;
pub mod template;
pub mod traverson;

pub use hop::LinkSelector;
pub use resolver::LinkResolver;
pub use traverson::{ResourceStream, Traverson, TypedStream};

#[cfg(feature = "blocking")]
pub use resolver::ReqwestResolver;
