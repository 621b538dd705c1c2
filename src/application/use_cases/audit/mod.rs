pub mod list_audit_logs;
pub mod record_event;
