//! Audit metadata carried by every persisted row.

use chrono::{DateTime, Utc};

/// Who created and last modified a row, and when.
///
/// Maintained by the persistence layer; never part of the JSON shape.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Auditable {
    pub created_by: Option<String>,
    pub created_date: Option<DateTime<Utc>>,
    pub last_modified_by: Option<String>,
    pub last_modified_date: Option<DateTime<Utc>>,
}

impl Auditable {
    /// Stamp a row on first persist. Both pairs are set.
    pub fn record_creation(&mut self, auditor: &str, at: DateTime<Utc>) {
        self.created_by = Some(auditor.to_string());
        self.created_date = Some(at);
        self.record_modification(auditor, at);
    }

    /// Stamp a row on a later persist. The creation pair is left alone.
    pub fn record_modification(&mut self, auditor: &str, at: DateTime<Utc>) {
        self.last_modified_by = Some(auditor.to_string());
        self.last_modified_date = Some(at);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_modification_keeps_creation() {
        let created = Utc::now();
        let modified = created + Duration::seconds(5);

        let mut audit = Auditable::default();
        audit.record_creation("SYSTEM", created);
        audit.record_modification("admin", modified);

        assert_eq!(audit.created_by.as_deref(), Some("SYSTEM"));
        assert_eq!(audit.created_date, Some(created));
        assert_eq!(audit.last_modified_by.as_deref(), Some("admin"));
        assert_eq!(audit.last_modified_date, Some(modified));
    }
}
