pub mod viewer;

pub use viewer::{AuthenticatedUser, ViewerContext};
