use reqwest::StatusCode;

/// Failures surfaced by this crate.
///
/// Public functions return [`anyhow::Result`]; callers that need to tell the
/// kinds apart downcast with `err.downcast_ref::<petfinder::Error>()`.
/// Transport failures stay as [`reqwest::Error`] inside the `anyhow::Error`.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Missing configuration: {field} ({hint})")]
    MissingConfig { field: &'static str, hint: String },

    #[error("{}", format_http_error(.status, .url, .title.as_deref(), .detail.as_deref()))]
    Http {
        status: StatusCode,
        url: String,
        title: Option<String>,
        detail: Option<String>,
    },

    #[error("failed to decode response body: {0}")]
    Decode(String),

    #[error("missing field `{field}`")]
    MissingField { field: &'static str },

    #[error("unexpected response shape: {0}")]
    Schema(String),
}

impl Error {
    /// HTTP status of a rejected request, if this is an [`Error::Http`].
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

// Petfinder answers errors with RFC 7807 problem details:
// {"type":...,"status":400,"title":"...","detail":"...","invalid-params":[...]}
#[derive(Debug, serde::Deserialize)]
pub(crate) struct ProblemDetails {
    #[serde(default, rename = "type")]
    pub(crate) kind: Option<String>,
    #[serde(default)]
    pub(crate) status: Option<u16>,
    #[serde(default)]
    pub(crate) title: Option<String>,
    #[serde(default)]
    pub(crate) detail: Option<String>,
    #[serde(default, rename = "invalid-params")]
    pub(crate) invalid_params: Vec<InvalidParam>,
}

#[derive(Debug, serde::Deserialize)]
pub(crate) struct InvalidParam {
    #[serde(default)]
    pub(crate) path: Option<String>,
    #[serde(default)]
    pub(crate) message: Option<String>,
}

/// Builds an [`Error::Http`] from a non-2xx response body.
pub(crate) fn http_error(status: StatusCode, url: &str, body: &str) -> Error {
    let (title, detail) = match serde_json::from_str::<ProblemDetails>(body) {
        Ok(problem) => {
            let mut detail = problem.detail;
            let params = problem
                .invalid_params
                .iter()
                .filter_map(|p| match (p.path.as_deref(), p.message.as_deref()) {
                    (Some(n), Some(m)) => Some(format!("{}: {}", n, m)),
                    (None, Some(m)) => Some(m.to_string()),
                    _ => None,
                })
                .collect::<Vec<_>>();
            if !params.is_empty() {
                let joined = params.join("; ");
                detail = Some(match detail {
                    Some(d) => format!("{} ({})", d, joined),
                    None => joined,
                });
            }
            if let Some(kind) = problem.kind.as_deref() {
                tracing::debug!(status = ?problem.status, kind, "petfinder problem response");
            }
            (problem.title, detail)
        }
        Err(_) => {
            let text = body.trim();
            (None, (!text.is_empty()).then(|| text.to_string()))
        }
    };

    Error::Http {
        status,
        url: url.to_string(),
        title,
        detail,
    }
}

fn format_http_error(
    status: &StatusCode,
    url: &str,
    title: Option<&str>,
    detail: Option<&str>,
) -> String {
    let status = *status;
    let title = title.unwrap_or("");
    let detail = detail.unwrap_or("");

    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return format!(
            "Petfinder authentication failed (HTTP {}).\n- Check PETFINDER_KEY and PETFINDER_SECRET\n- Access tokens expire after an hour; build a new repository to fetch a fresh one\n\nServer message: {}\n{}\nrequest: {}",
            status.as_u16(),
            title,
            detail,
            url
        );
    }

    if status == StatusCode::BAD_REQUEST {
        return format!(
            "Petfinder rejected the search (HTTP 400); the location must be a postal code, a state abbreviation or \"city, state\".\n\nServer message: {}\n{}\nrequest: {}",
            title, detail, url
        );
    }

    format!(
        "API request failed: HTTP {} for url ({})\n{}\n{}",
        status.as_u16(),
        url,
        title,
        detail
    )
}
