pub mod list;

pub use list::ListAccessLogsError;
