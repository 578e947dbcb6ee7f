//! Naming handlers.
//!
//! Command and query handlers for the name application workflow:
//!
//! ## Commands
//! - Applying for a name, normal or special
//! - Accepting, rejecting, and cancelling applications
//! - Setting a name administratively
//! - Enabling or disabling one's own name, for a fee
//!
//! ## Queries
//! - Listing pending applications (admin)
//!
//! Currency gateway calls are made here, never while the session lock is
//! held. Each multi-step command compensates on a best-effort basis when a
//! later step fails.

mod accept_application;
mod apply_for_name;
mod cancel_application;
mod list_applications;
mod refund;
mod reject_application;
mod set_name;
mod toggle_name;

#[cfg(test)]
mod test_support;

// Commands
pub use accept_application::{
    AcceptApplicationCommand, AcceptApplicationHandler, AcceptApplicationResult,
};
pub use apply_for_name::{
    ApplyForNameCommand, ApplyForNameHandler, ApplyForNameResult, NameValidation,
};
pub use cancel_application::{
    CancelApplicationCommand, CancelApplicationHandler, CancelApplicationResult,
};
pub use reject_application::{
    RejectApplicationCommand, RejectApplicationHandler, RejectApplicationResult,
};
pub use set_name::{SetNameCommand, SetNameHandler, SetNameResult};
pub use toggle_name::{ToggleNameCommand, ToggleNameHandler, ToggleNameResult};

// Queries
pub use list_applications::{
    ListApplicationsHandler, ListApplicationsQuery, ListApplicationsResult,
};
