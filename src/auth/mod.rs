pub mod claims;
pub mod extractors;

pub use extractors::{AuthUser, Viewer};
