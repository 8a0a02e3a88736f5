//! Service Layer
//!
//! Business logic between the HTTP handlers and the store. Services
//! validate input, generate ids, hash and check credentials, and translate
//! storage outcomes into API errors. Handlers stay thin.

mod account_service;
mod activity_service;
mod note_service;

pub use account_service::*;
pub use activity_service::*;
pub use note_service::*;
