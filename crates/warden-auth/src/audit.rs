//! Audit log and accounting sinks.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{error, info};
use warden_core::AppResult;
use warden_entity::{
    AccountingReport, AuditEntry, AuditLogType, AuthRecord, PrincipalRecord, ReportReason,
};

/// Receives audit events.
#[async_trait]
pub trait AuditLogDirector: Send + Sync + std::fmt::Debug {
    /// Records `log_type` against `user_name`.
    async fn log(&self, user_name: &str, log_type: AuditLogType);
}

/// Emits audit events as `tracing` events on the `warden::audit` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAuditLog;

#[async_trait]
impl AuditLogDirector for TracingAuditLog {
    async fn log(&self, user_name: &str, log_type: AuditLogType) {
        info!(
            target: "warden::audit",
            user = %user_name,
            event = %log_type,
            "Audit event"
        );
    }
}

/// Keeps audit entries in memory.
#[derive(Debug, Default)]
pub struct MemoryAuditLog {
    entries: Mutex<Vec<AuditEntry>>,
}

impl MemoryAuditLog {
    /// Creates an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// All entries, oldest first.
    pub async fn entries(&self) -> Vec<AuditEntry> {
        self.entries.lock().await.clone()
    }

    /// Entries of `log_type`.
    pub async fn entries_of(&self, log_type: AuditLogType) -> Vec<AuditEntry> {
        self.entries
            .lock()
            .await
            .iter()
            .filter(|entry| entry.log_type == log_type)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl AuditLogDirector for MemoryAuditLog {
    async fn log(&self, user_name: &str, log_type: AuditLogType) {
        self.entries
            .lock()
            .await
            .push(AuditEntry::new(user_name, log_type));
    }
}

/// Receives accounting reports.
#[async_trait]
pub trait AccountingSink: Send + Sync + std::fmt::Debug {
    /// Sink name used in logs.
    fn name(&self) -> &str;

    /// Delivers one report.
    async fn report(&self, report: &AccountingReport) -> AppResult<()>;
}

/// Writes reports as `tracing` events on the `warden::accounting` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAccountingSink;

#[async_trait]
impl AccountingSink for TracingAccountingSink {
    fn name(&self) -> &str {
        "tracing"
    }

    async fn report(&self, report: &AccountingReport) -> AppResult<()> {
        info!(
            target: "warden::accounting",
            reason = ?report.reason,
            authz = %report.authz_name,
            login = report.login_name.as_deref().unwrap_or_default(),
            principal = report.auth_record.principal().unwrap_or_default(),
            "{}",
            report.message
        );
        Ok(())
    }
}

/// Keeps reports in memory.
#[derive(Debug, Default)]
pub struct MemoryAccountingSink {
    reports: Mutex<Vec<AccountingReport>>,
}

impl MemoryAccountingSink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// All reports, oldest first.
    pub async fn reports(&self) -> Vec<AccountingReport> {
        self.reports.lock().await.clone()
    }
}

#[async_trait]
impl AccountingSink for MemoryAccountingSink {
    fn name(&self) -> &str {
        "memory"
    }

    async fn report(&self, report: &AccountingReport) -> AppResult<()> {
        self.reports.lock().await.push(report.clone());
        Ok(())
    }
}

/// Fans reports out to every registered sink. Sink errors are logged and
/// never reach the caller.
#[derive(Debug, Clone, Default)]
pub struct AccountingDispatcher {
    sinks: Vec<Arc<dyn AccountingSink>>,
}

impl AccountingDispatcher {
    /// Creates a dispatcher without sinks.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a sink.
    pub fn with_sink(mut self, sink: Arc<dyn AccountingSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    /// Number of registered sinks.
    pub fn sink_count(&self) -> usize {
        self.sinks.len()
    }

    /// Builds a report and delivers it to every sink.
    pub async fn report(
        &self,
        reason: ReportReason,
        authz_name: &str,
        login_name: Option<&str>,
        auth_record: &AuthRecord,
        principal_record: Option<&PrincipalRecord>,
        message: String,
    ) {
        let report = AccountingReport::new(
            reason,
            authz_name,
            login_name.map(str::to_string),
            auth_record.clone(),
            principal_record.cloned(),
            message,
        );

        for sink in &self.sinks {
            if let Err(e) = sink.report(&report).await {
                error!(sink = %sink.name(), reason = ?reason, error = %e, "Accounting sink failed");
            }
        }
    }
}
