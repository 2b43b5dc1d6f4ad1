//! Connection section validation.

use super::helpers::validate_range;
use crate::schema::{
    ChatStatusConfig, CONNECT_TIMEOUT_RANGE, PING_INTERVAL_RANGE, RETRY_INTERVAL_RANGE,
};

/// Validate relay address and timer ranges.
pub(crate) fn validate_connection(errors: &mut Vec<String>, config: &ChatStatusConfig) {
    let conn = &config.connection;

    let server = conn.server.trim();
    if server.is_empty() {
        errors.push("connection.server must not be empty".into());
    } else if server.contains("://") || server.contains('/') {
        errors.push(format!(
            "connection.server = {server:?} must be a bare host, without scheme or path"
        ));
    }

    validate_range(
        errors,
        "connection.ping_interval_seconds",
        conn.ping_interval_seconds,
        PING_INTERVAL_RANGE,
    );
    validate_range(
        errors,
        "connection.retry_interval_seconds",
        conn.retry_interval_seconds,
        RETRY_INTERVAL_RANGE,
    );
    validate_range(
        errors,
        "connection.connect_timeout_seconds",
        conn.connect_timeout_seconds,
        CONNECT_TIMEOUT_RANGE,
    );
}
