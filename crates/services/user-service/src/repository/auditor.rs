//! Source of the identity recorded in audit columns.

use chrono::{DateTime, Utc};

use domain::{Auditable, SYSTEM_AUDITOR};

/// Supplies the principal responsible for a write.
pub trait Auditor: Send + Sync {
    fn current_auditor(&self) -> String;
}

/// Records a fixed identity, `SYSTEM` unless configured otherwise.
#[derive(Debug, Clone)]
pub struct SystemAuditor {
    name: String,
}

impl SystemAuditor {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Default for SystemAuditor {
    fn default() -> Self {
        Self::new(SYSTEM_AUDITOR)
    }
}

impl Auditor for SystemAuditor {
    fn current_auditor(&self) -> String {
        self.name.clone()
    }
}

/// Identity and time shared by every row touched in one write.
#[derive(Debug, Clone)]
pub(crate) struct AuditStamp {
    pub by: String,
    pub at: DateTime<Utc>,
}

impl AuditStamp {
    pub fn now(auditor: &dyn Auditor) -> Self {
        Self {
            by: auditor.current_auditor(),
            at: Utc::now(),
        }
    }

    /// Audit fields for a row written for the first time.
    pub fn created(&self) -> Auditable {
        let mut audit = Auditable::default();
        audit.record_creation(&self.by, self.at);
        audit
    }
}
