use serde::Deserialize;
use serde_json::value::RawValue;
use std::time::Duration;

const AGENT_POLICIES_API: [&str; 3] = ["api", "fleet", "agent_policies"];
const PER_PAGE: usize = 100;

/// Raw JSON text of a single Fleet document.
pub type RawDocument = String;

#[derive(thiserror::Error, Debug)]
pub enum FetchError {
    #[error("request to {url} failed")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("unexpected status {status} from {url}: {body}")]
    Status {
        url: String,
        status: u16,
        body: String,
    },
    #[error("could not decode response from {url}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Where agent policies come from.
pub trait PolicySource {
    fn get_raw_policy(&self, id: &str) -> Result<RawDocument, FetchError>;
    fn list_raw_policies(&self) -> Result<Vec<RawDocument>, FetchError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Auth {
    None,
    Basic { username: String, password: String },
    ApiKey(String),
}

#[derive(Debug, Clone)]
pub struct FleetConfig {
    pub host: String,
    pub auth: Auth,
    pub insecure: bool,
    pub timeout: Duration,
}

pub struct FleetClient {
    base: reqwest::Url,
    auth: Auth,
    http: reqwest::blocking::Client,
}

#[derive(Deserialize)]
struct ItemResponse {
    item: Box<RawValue>,
}

#[derive(Deserialize)]
struct ListResponse {
    #[serde(default)]
    items: Vec<Box<RawValue>>,
    #[serde(default)]
    total: usize,
}

impl FleetClient {
    pub fn new(config: FleetConfig) -> anyhow::Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .danger_accept_invalid_certs(config.insecure)
            .build()?;
        let base = reqwest::Url::parse(&config.host)
            .map_err(|e| anyhow::anyhow!("invalid Kibana host '{}': {}", config.host, e))?;
        if base.cannot_be_a_base() {
            anyhow::bail!("invalid Kibana host '{}': not a base URL", config.host);
        }
        Ok(Self {
            base,
            auth: config.auth,
            http,
        })
    }

    /// `{base}/api/fleet/agent_policies[/{id}]`, each segment percent-encoded.
    fn policies_url(&self, id: Option<&str>) -> reqwest::Url {
        let mut url = self.base.clone();
        // `new` rejects cannot-be-a-base URLs, so segments are always available.
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend(AGENT_POLICIES_API);
            if let Some(id) = id {
                segments.push(id);
            }
        }
        url
    }

    fn get(&self, url: reqwest::Url) -> Result<String, FetchError> {
        tracing::debug!(%url, "GET");
        let mut req = self.http.get(url.clone()).header("kbn-xsrf", "fleetdump");
        req = match &self.auth {
            Auth::None => req,
            Auth::Basic { username, password } => req.basic_auth(username, Some(password)),
            Auth::ApiKey(key) => req.header("Authorization", format!("ApiKey {}", key)),
        };
        let url = url.to_string();
        let resp = req.send().map_err(|source| FetchError::Http {
            url: url.clone(),
            source,
        })?;
        let status = resp.status();
        let body = resp.text().map_err(|source| FetchError::Http {
            url: url.clone(),
            source,
        })?;
        if !status.is_success() {
            return Err(FetchError::Status {
                url,
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }

    fn decode<'a, T: Deserialize<'a>>(path: &str, body: &'a str) -> Result<T, FetchError> {
        serde_json::from_str(body).map_err(|source| FetchError::Decode {
            url: path.to_string(),
            source,
        })
    }
}

impl PolicySource for FleetClient {
    fn get_raw_policy(&self, id: &str) -> Result<RawDocument, FetchError> {
        let url = self.policies_url(Some(id));
        let label = url.to_string();
        let body = self.get(url)?;
        let resp: ItemResponse = Self::decode(&label, &body)?;
        Ok(resp.item.get().to_string())
    }

    fn list_raw_policies(&self) -> Result<Vec<RawDocument>, FetchError> {
        let mut policies = Vec::new();
        let mut page = 1usize;
        loop {
            let mut url = self.policies_url(None);
            url.query_pairs_mut()
                .append_pair("full", "true")
                .append_pair("page", &page.to_string())
                .append_pair("perPage", &PER_PAGE.to_string());
            let label = url.to_string();
            let body = self.get(url)?;
            let resp: ListResponse = Self::decode(&label, &body)?;
            let fetched = resp.items.len();
            policies.extend(resp.items.into_iter().map(|raw| raw.get().to_string()));
            tracing::debug!(page, fetched, total = resp.total, "listed agent policies");
            if fetched == 0 || policies.len() >= resp.total {
                break;
            }
            page += 1;
        }
        Ok(policies)
    }
}
