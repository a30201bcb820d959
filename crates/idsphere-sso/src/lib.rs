//! Protocol dispatcher for IDSphere login completion.
//!
//! After a front-end authenticates a subject, the deep-link parameters it
//! carried decide which protocol engine finishes the login. The
//! first-match order is part of the platform's compatibility contract.

pub mod dispatcher;

pub use dispatcher::{select_engine, LoginError, LoginOutcome, Protocol, SsoDispatcher};
