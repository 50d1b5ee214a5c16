//! # warden-auth
//!
//! Login orchestration for Warden. A [`LoginCommand`] turns a login request
//! into an authenticated session:
//!
//! - `authn`: credential verification, identity mapping and result-code interpretation
//! - `principal`: principal resolution and local directory projection
//! - `gate`: login permission and admin evaluation
//! - `issuer`: session token issuance and expiry negotiation
//! - `audit`: audit log and accounting report sinks
//! - `login`: the login state machine tying the steps together

pub mod audit;
pub mod authn;
pub mod gate;
pub mod issuer;
pub mod login;
pub mod principal;

pub use audit::{
    AccountingDispatcher, AccountingSink, AuditLogDirector, MemoryAccountingSink, MemoryAuditLog,
    TracingAccountingSink, TracingAuditLog,
};
pub use gate::{ActionGroup, PermissionChecker, PermissionQuery, StaticPermissionTable};
pub use issuer::{SessionIssuer, negotiate_hard_limit};
pub use login::{
    AuthFailureReason, AuthType, LoginCommand, LoginDependencies, LoginFailure, LoginMessage,
    LoginParameters, LoginReturnValue, LoginStage, UserMessage,
};
pub use principal::map_principal_record_to_user;
