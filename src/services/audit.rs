use tracing::warn;

use crate::repositories::error_logs as error_logs_repo;

/// Write an audit row to `error_logs` without blocking the caller. Failures
/// are logged and swallowed; the response must never wait on audit I/O.
pub fn log_error_background(user_id: Option<String>, error_message: String, context: String) {
    tokio::spawn(async move {
        if let Err(err) = error_logs_repo::insert_error_log(
            user_id.as_deref(),
            &error_message,
            None,
            Some(&context),
        )
        .await
        {
            warn!(error = %err, context = %context, "failed to write error_logs row");
        }
    });
}
