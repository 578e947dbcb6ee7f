//! Application layer - Session, services, and handlers.
//!
//! `Session` owns the critical section and the connection-bound table
//! accessors. `NameRegistry` and `ApplicationQueue` run their check-then-act
//! sequences inside it. Handlers compose the two with the currency gateway.

mod application_queue;
pub mod handlers;
mod name_checker;
mod name_registry;
mod rows;
mod session;

pub use application_queue::ApplicationQueue;
pub use name_checker::NameChecker;
pub use name_registry::NameRegistry;
pub use session::{Session, SessionGuard, TableAccessor};

pub use handlers::{
    AcceptApplicationCommand, AcceptApplicationHandler, AcceptApplicationResult,
    ApplyForNameCommand, ApplyForNameHandler, ApplyForNameResult, CancelApplicationCommand,
    CancelApplicationHandler, CancelApplicationResult, ListApplicationsHandler,
    ListApplicationsQuery, ListApplicationsResult, NameValidation, RejectApplicationCommand,
    RejectApplicationHandler, RejectApplicationResult, SetNameCommand, SetNameHandler,
    SetNameResult, ToggleNameCommand, ToggleNameHandler, ToggleNameResult,
};
