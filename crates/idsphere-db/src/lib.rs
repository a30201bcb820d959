//! Database layer of the IDSphere identity provider.
//!
//! All mutable SSO state lives here: registered relying parties, subject
//! records, the three short-lived ticket shapes, and the revoked-bearer
//! table. Engines never touch SQL directly; they go through the stores in
//! [`store`].

pub mod error;
pub mod migrations;
pub mod models;
pub mod pool;
pub mod store;

pub use error::{DbError, DbResult};
pub use pool::connect;
pub use store::{SiteRegistry, SubjectStore, TicketStore};
