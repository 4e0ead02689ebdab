use crate::files::FileRequest;
use thiserror::Error;
use url::Url;

pub const METRICS_PATH: &str = "/api/metrics";
pub const HEALTH_PATH: &str = "/api/health";
pub const PUSH_PATH: &str = "/ws";
pub const TOKEN_PARAM: &str = "token";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Transport(String),
    #[error("http {status}: {body}")]
    Status { status: u16, body: String },
    #[error("{0}")]
    Rejected(String),
    #[error("malformed response: {0}")]
    Malformed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid console url {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("unsupported console url scheme {0}; expected http or https")]
    UnsupportedScheme(String),
}

/// Every backend URL the console talks to, derived once from the console
/// URL. The token is forwarded verbatim and never refreshed.
///
/// Metrics polling authenticates with an `Authorization` header while the
/// push channel and every file endpoint carry `?token=`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    base: Url,
    push_base: Url,
    token: Option<String>,
}

impl Endpoints {
    /// `token_override` wins over a `token` query parameter on `raw`.
    pub fn from_console_url(raw: &str, token_override: Option<&str>) -> Result<Self, ConfigError> {
        let parsed = Url::parse(raw.trim()).map_err(|err| ConfigError::InvalidUrl {
            url: raw.to_string(),
            reason: err.to_string(),
        })?;
        let push_scheme = match parsed.scheme() {
            "http" => "ws",
            "https" => "wss",
            other => return Err(ConfigError::UnsupportedScheme(other.to_string())),
        };
        let query_token = parsed
            .query_pairs()
            .find(|(key, _)| key == TOKEN_PARAM)
            .map(|(_, value)| value.into_owned());
        let token = token_override
            .map(str::to_string)
            .or(query_token)
            .filter(|value| !value.is_empty());

        let mut base = parsed;
        base.set_path("/");
        base.set_query(None);
        base.set_fragment(None);
        let mut push_base = base.clone();
        push_base
            .set_scheme(push_scheme)
            .map_err(|_| ConfigError::InvalidUrl {
                url: raw.to_string(),
                reason: format!("cannot derive {push_scheme} url"),
            })?;

        Ok(Self {
            base,
            push_base,
            token,
        })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn metrics_url(&self) -> Url {
        self.with_path(&self.base, METRICS_PATH)
    }

    pub fn health_url(&self) -> Url {
        self.with_path(&self.base, HEALTH_PATH)
    }

    /// `Authorization` header value for the metrics endpoint.
    pub fn bearer(&self) -> Option<String> {
        self.token.as_ref().map(|token| format!("Bearer {token}"))
    }

    pub fn push_url(&self) -> Url {
        let mut url = self.with_path(&self.push_base, PUSH_PATH);
        self.append_token(&mut url);
        url
    }

    pub fn file_url(&self, request: &FileRequest) -> Url {
        let mut url = self.with_path(&self.base, request.endpoint());
        {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in request.query() {
                pairs.append_pair(key, &value);
            }
        }
        self.append_token(&mut url);
        url
    }

    fn with_path(&self, root: &Url, path: &str) -> Url {
        let mut url = root.clone();
        url.set_path(path);
        url
    }

    fn append_token(&self, url: &mut Url) {
        if let Some(token) = &self.token {
            url.query_pairs_mut().append_pair(TOKEN_PARAM, token);
        }
    }
}
