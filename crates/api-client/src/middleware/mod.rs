//! Request interceptors: the tenant envelope and path scoping
//!
//! Every outgoing request carries the same fixed headers derived from the
//! runtime configuration, plus a bearer token when a session exists.

use magicsaas_runtime_config::RuntimeConfig;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue};

use crate::error::{ApiError, ApiResult};

// Lowercase, as `HeaderName::from_static` requires; HTTP names are case-insensitive.
pub const X_TENANT_ID: &str = "x-tenant-id";
pub const X_PETALA_TYPE: &str = "x-petala-type";
pub const X_PETALA_NAME: &str = "x-petala-name";
pub const X_ENVIRONMENT: &str = "x-environment";
pub const X_MAGICSAAS_VERSION: &str = "x-magicsaas-version";
pub const X_REQUEST_ID: &str = "x-request-id";

/// Headers fixed for the lifetime of a configuration
pub fn envelope_headers(config: &RuntimeConfig) -> ApiResult<HeaderMap> {
    let mut headers = HeaderMap::new();
    insert(&mut headers, X_TENANT_ID, &config.tenant.id)?;
    insert(&mut headers, X_PETALA_TYPE, config.petala.petala_type.slug())?;
    insert(&mut headers, X_PETALA_NAME, &config.petala.name)?;
    insert(&mut headers, X_ENVIRONMENT, config.environment.as_str())?;
    insert(&mut headers, X_MAGICSAAS_VERSION, &config.version)?;
    Ok(headers)
}

/// Per-attempt headers: correlation id and, when signed in, the bearer token
pub fn attempt_headers(request_id: &str, token: Option<&str>) -> ApiResult<HeaderMap> {
    let mut headers = HeaderMap::new();
    insert(&mut headers, X_REQUEST_ID, request_id)?;
    if let Some(token) = token.filter(|t| !t.is_empty()) {
        let mut value = header_value("authorization", &format!("Bearer {token}"))?;
        value.set_sensitive(true);
        headers.insert(AUTHORIZATION, value);
    }
    Ok(headers)
}

fn insert(headers: &mut HeaderMap, name: &'static str, value: &str) -> ApiResult<()> {
    headers.insert(HeaderName::from_static(name), header_value(name, value)?);
    Ok(())
}

fn header_value(name: &'static str, value: &str) -> ApiResult<HeaderValue> {
    HeaderValue::from_str(value).map_err(|e| ApiError::InvalidHeader {
        name,
        reason: e.to_string(),
    })
}

/// Scope `path` under `base_path` unless it is already scoped
///
/// The base counts as present only at a segment boundary, so
/// `/petalas/fashion-outlet` is not treated as being under
/// `/petalas/fashion`.
pub fn normalize_path(base_path: &str, path: &str) -> String {
    let base = base_path.trim_end_matches('/');
    let path = if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    };

    if base.is_empty() {
        return path;
    }

    if let Some(rest) = path.strip_prefix(base) {
        if rest.is_empty() || rest.starts_with(['/', '?', '#']) {
            return path;
        }
    }

    format!("{base}{path}")
}
