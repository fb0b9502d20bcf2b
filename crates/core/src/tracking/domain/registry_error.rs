use std::borrow::Cow;

use thiserror::Error;

/// The only failure a track registry reports.
///
/// Unknown cameras or tracks are not errors: lookups return nothing and
/// removals are no-ops.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("invalid {field}: {reason}")]
    InvalidArgument {
        field: &'static str,
        reason: Cow<'static, str>,
    },
}

impl RegistryError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<Cow<'static, str>>) -> Self {
        Self::InvalidArgument {
            field,
            reason: reason.into(),
        }
    }
}
