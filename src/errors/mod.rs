pub mod types;
pub mod identity;
pub use types::{FixError, SharedError};
pub use identity::ErrorIdentity;
