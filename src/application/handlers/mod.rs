//! Application handlers.
//!
//! Command and query handlers that orchestrate the registry, the queue, and
//! the currency gateway.

pub mod naming;

pub use naming::{
    AcceptApplicationCommand, AcceptApplicationHandler, AcceptApplicationResult,
    ApplyForNameCommand, ApplyForNameHandler, ApplyForNameResult, CancelApplicationCommand,
    CancelApplicationHandler, CancelApplicationResult, ListApplicationsHandler,
    ListApplicationsQuery, ListApplicationsResult, NameValidation, RejectApplicationCommand,
    RejectApplicationHandler, RejectApplicationResult, SetNameCommand, SetNameHandler,
    SetNameResult, ToggleNameCommand, ToggleNameHandler, ToggleNameResult,
};
