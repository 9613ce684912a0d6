//! Types shared between the CivicFlow relay and client.

pub mod report;
pub mod routing;

pub use report::{EmailDraft, Priority, Report};
pub use routing::{Bucket, Contact, RoutingTable};
