pub mod set;

pub use set::{set_permissions, SetPermissionsCommand, SetPermissionsError};
