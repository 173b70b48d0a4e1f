use anyhow::{Context, Result};
use reqwest::Url;
use reqwest::blocking::Client as HttpClient;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT};

use crate::config::{ClientConfig, load_config_with};
use crate::dog::Dog;
use crate::envelope::{ResponseKind, load};
use crate::error::{Error, http_error};
use crate::token::TokenProvider;

/// What to do with an animal that cannot be mapped into a [`Dog`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MalformedRecords {
    /// Fail the whole fetch (default).
    #[default]
    Abort,
    /// Log the record at `warn` and leave it out of the result.
    Skip,
}

/// Searches Petfinder for adoptable dogs around one location.
///
/// Building a repository performs network I/O: the access token is fetched
/// once in [`PetfinderRepository::new`] and reused for every search made
/// through this instance. Tokens are not refreshed; build a new repository
/// when the old one starts answering 401.
#[derive(Debug, Clone)]
pub struct PetfinderRepository {
    headers: HeaderMap,
    url_root: String,
    location: String,
    malformed: MalformedRecords,

    http: HttpClient,
}

impl PetfinderRepository {
    /// Builds a repository with credentials from `PETFINDER_KEY` /
    /// `PETFINDER_SECRET` or a `.petfinderrc` file.
    ///
    /// Fails with [`Error::MissingConfig`] before any request is made when
    /// either secret is absent.
    pub fn from_env(location: impl Into<String>) -> Result<Self> {
        Self::from_lookup(location, |name| std::env::var(name).ok())
    }

    pub(crate) fn from_lookup<F>(location: impl Into<String>, var: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let cfg = load_config_with(None, None, None, var)?;
        Self::new(location, cfg)
    }

    pub fn new(location: impl Into<String>, cfg: ClientConfig) -> Result<Self> {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("petfinder-rs/{}", env!("CARGO_PKG_VERSION")))
                .unwrap_or(HeaderValue::from_static("petfinder-rs")),
        );

        let http = HttpClient::builder()
            .default_headers(default_headers)
            .build()
            .context("failed to build HTTP client")?;

        let token = TokenProvider::with_client(http.clone(), cfg.url.as_str())
            .get_access_token(&cfg.credentials)?;

        let mut bearer = HeaderValue::from_str(&format!("Bearer {}", token))
            .context("access token is not a valid header value")?;
        bearer.set_sensitive(true);
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, bearer);

        Ok(Self {
            headers,
            url_root: cfg.url,
            location: location.into(),
            malformed: MalformedRecords::default(),
            http,
        })
    }

    pub fn with_malformed_records(mut self, policy: MalformedRecords) -> Self {
        self.malformed = policy;
        self
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn url_root(&self) -> &str {
        &self.url_root
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    /// `{url_root}/animals?type=dog&status=adoptable&distance=50&location=...`
    pub fn search_url(&self) -> Result<Url> {
        let base = format!("{}/animals", self.url_root.trim_end_matches('/'));
        Url::parse_with_params(
            &base,
            &[
                ("type", "dog"),
                ("status", "adoptable"),
                ("distance", "50"),
                ("location", self.location.as_str()),
            ],
        )
        .with_context(|| format!("invalid API url {}", base))
    }

    /// Fetches the first page of adoptable dogs within 50 miles of the
    /// location, in the order Petfinder returns them.
    ///
    /// A non-2xx answer (e.g. a location Petfinder cannot resolve) fails with
    /// [`Error::Http`].
    pub fn get_dogs_by_location(&self) -> Result<Vec<Dog>> {
        let url = self.search_url()?;
        tracing::debug!(url = %url, "searching animals");

        let resp = self
            .http
            .get(url.clone())
            .headers(self.headers.clone())
            .send()
            .with_context(|| format!("search request to {} failed", url))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().unwrap_or_else(|e| {
                tracing::debug!(%status, error = %e, "failed to read error body");
                String::new()
            });
            return Err(http_error(status, url.as_str(), &text).into());
        }

        let body = resp
            .bytes()
            .with_context(|| format!("failed to read search response (url={})", url))?;
        let animals = match load(&body, ResponseKind::Animals)? {
            serde_json::Value::Array(items) => items,
            other => {
                return Err(Error::Schema(format!("`animals` is not an array: {}", other)).into());
            }
        };

        let dogs = self.compile_dogs(&animals)?;
        tracing::debug!(
            received = animals.len(),
            mapped = dogs.len(),
            location = %self.location,
            "search complete"
        );
        Ok(dogs)
    }

    fn compile_dogs(&self, animals: &[serde_json::Value]) -> Result<Vec<Dog>> {
        let mut dogs = Vec::with_capacity(animals.len());
        for (index, raw) in animals.iter().enumerate() {
            match Dog::from_json(raw) {
                Ok(dog) => dogs.push(dog),
                Err(e) if self.malformed == MalformedRecords::Skip => {
                    tracing::warn!(index, error = %e, "skipping malformed animal record");
                }
                Err(e) => return Err(e.context(format!("animal #{} could not be mapped", index))),
            }
        }
        Ok(dogs)
    }
}
