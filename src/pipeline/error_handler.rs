use log::error;

use crate::errors::MultiError;

/// Log an error for the user. A [`MultiError`] gets one line per contained error, never one
/// joined line, preceded by the outermost context when there is one.
pub fn report_errors(err: &anyhow::Error) {
    match err.downcast_ref::<MultiError>() {
        Some(multi) => {
            let top = err.to_string();
            if top != multi.to_string() {
                error!("{}", top);
            }
            for single in multi.errors() {
                error!("{}", single);
            }
        }
        None => error!("{:#}", err),
    }
}
