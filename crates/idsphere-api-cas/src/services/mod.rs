//! CAS services.

pub mod ticket;

pub use ticket::{CasGrant, CasTicketService};
