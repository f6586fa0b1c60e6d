use tracing::{error, info};

use crate::errors::KiautoError;

pub fn log_app_startup() {
    info!(
        event = "core.app.startup_completed",
        version = env!("CARGO_PKG_VERSION")
    );
}

pub fn log_app_shutdown() {
    info!(event = "core.app.shutdown_started");
}

/// Log a typed core error together with its error code.
pub fn log_core_error<E: KiautoError>(error: &E) {
    error!(
        event = "core.app.error_occurred",
        error = %error,
        error_code = error.error_code(),
        user_error = error.is_user_error()
    );
}
