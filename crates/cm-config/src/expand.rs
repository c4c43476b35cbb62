//! Environment variable expansion for `html.softbreak`.
//!
//! The soft break is the only free-form string in `cmark.toml`, and the one
//! value that commonly differs between environments (a newline for files, a
//! space or `<br />` for previews), so it is the field that accepts `${VAR}`.

use std::borrow::Cow;

use crate::ConfigError;

/// Name of the variable whose lookup failed.
struct MissingVar(String);

/// Expand `${VAR}` and `${VAR:-default}` in `value`.
///
/// Strings without `${` are returned untouched, so a lone `$` in markup
/// stays as written.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    if !value.contains("${") {
        return Ok(value.to_owned());
    }

    let lookup = |var: &str| {
        std::env::var(var)
            .map(Some)
            .map_err(|_| MissingVar(var.to_owned()))
    };
    shellexpand::env_with_context(value, lookup)
        .map(Cow::into_owned)
        .map_err(|err| ConfigError::EnvVar {
            field: field.to_owned(),
            message: format!("${{{}}} not set", err.cause.0),
        })
}
