//! Validator factory.

use std::sync::Arc;

use anyhow::Result;

use flagquiz_core::config::{ClientSettings, ValidatorMode};
use flagquiz_core::store::AnswerStore;
use flagquiz_core::traits::{AnswerValidator, LocalValidator};

use crate::http::HttpValidator;

/// Create the validator described by `settings`.
///
/// Local mode judges against `store`; remote mode ignores it and talks to the
/// service at `base_url`.
pub fn create_validator(
    settings: &ClientSettings,
    store: Arc<AnswerStore>,
) -> Result<Arc<dyn AnswerValidator>> {
    match settings.mode {
        ValidatorMode::Local => Ok(Arc::new(LocalValidator::new(store))),
        ValidatorMode::Remote => {
            let Some(base_url) = settings.base_url.as_deref() else {
                anyhow::bail!("remote validator mode requires client.base_url");
            };
            tracing::info!("validating answers against {base_url}");
            Ok(Arc::new(HttpValidator::new(base_url, Some(settings.timeout()))?))
        }
    }
}
