//! HAL value objects: links, curies, collections, representations, and
//! typed-embedding descriptors.

pub mod curies;
pub mod embedded;
pub mod link;
pub mod links;
pub mod representation;
pub mod type_info;

pub use curies::{Curies, CurieTemplate};
pub use embedded::Embedded;
pub use link::{Link, CURIES_REL};
pub use links::{Links, LinksBuilder};
pub use representation::Representation;
pub use type_info::{EmbeddedTypeInfo, TypedNode, TypedResource};
