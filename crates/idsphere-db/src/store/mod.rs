//! Stores: the query layer the protocol engines talk to.

pub mod sites;
pub mod subjects;
pub mod tickets;

pub use sites::SiteRegistry;
pub use subjects::SubjectStore;
pub use tickets::TicketStore;
