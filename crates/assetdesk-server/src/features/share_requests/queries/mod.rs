pub mod list;

pub use list::{ListShareRequestsError, ListShareRequestsQuery};
