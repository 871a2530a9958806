//! External sharing workflow
//!
//! PENDING -> APPROVED | REJECTED (admin) or CANCELLED (requester). Terminal
//! states never move again.

pub mod commands;
pub mod queries;
pub mod routes;

pub use commands::{
    CreateShareRequestCommand, CreateShareRequestError, DecideShareRequestCommand,
    DecideShareRequestError,
};
pub use queries::{ListShareRequestsError, ListShareRequestsQuery};
pub use routes::share_requests_routes;
