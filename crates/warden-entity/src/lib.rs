//! # warden-entity
//!
//! Domain records exchanged with extensions ([`ExtMap`], [`AuthRecord`],
//! [`PrincipalRecord`]) and the entities the login flow produces
//! ([`LocalUser`], [`SessionData`], audit entries and accounting reports).

pub mod audit;
pub mod record;
pub mod session;
pub mod user;

pub use audit::{AccountingReport, AuditEntry, AuditLogType, ReportReason};
pub use record::{AuthRecord, ExtMap, PrincipalRecord};
pub use session::SessionData;
pub use user::LocalUser;
