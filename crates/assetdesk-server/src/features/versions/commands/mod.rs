pub mod create;

pub use create::CreateVersionError;
