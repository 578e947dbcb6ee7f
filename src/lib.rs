//! CJK Name Registry - Name reservation and registration engine
//!
//! Owners reserve a 2 to 4 ideograph display name through a paid
//! application that an administrator accepts or rejects, or the owner
//! cancels. Names and open applications are globally unique; rejected and
//! cancelled applications are refunded through an external currency ledger.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod telemetry;
