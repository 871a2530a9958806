pub mod list;

pub use list::VersionQueryError;
