use crate::error::{QueryError, Result};
use crate::instance::{InstanceProfile, InstanceSnapshot};
use reqwest::Client;
use reqwest::header::ACCEPT;
use serde::de::DeserializeOwned;
use std::time::{Duration, Instant};
use tracing::{debug, info};
use url::Url;

/// Well-known path of an instance's own profile record.
pub const PROFILE_PATH: &str = "/api/v1/instance";
/// Well-known path of an instance's federated peer list.
pub const PEERS_PATH: &str = "/api/v1/instance/peers";

const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_USER_AGENT: &str = concat!(
    "Peerscope/",
    env!("CARGO_PKG_VERSION"),
    " (https://github.com/trapdoorsec/peerscope)"
);

/// Fetch-and-parse boundary towards remote instances.
///
/// Cloning is cheap: the underlying connection pool is shared.
#[derive(Debug, Clone)]
pub struct InstanceClient {
    client: Client,
    scheme: &'static str,
    timeout_secs: u64,
    user_agent: String,
}

impl InstanceClient {
    pub fn new() -> Result<Self> {
        Self::with_timeout(DEFAULT_TIMEOUT_SECS)
    }

    pub fn with_timeout(timeout_secs: u64) -> Result<Self> {
        Self::build(timeout_secs, DEFAULT_USER_AGENT.to_string(), "https")
    }

    pub fn with_user_agent(self, user_agent: impl Into<String>) -> Result<Self> {
        Self::build(self.timeout_secs, user_agent.into(), self.scheme)
    }

    /// Talk plain HTTP instead of HTTPS. Only useful for local instances.
    pub fn with_plain_http(mut self) -> Self {
        self.scheme = "http";
        self
    }

    fn build(timeout_secs: u64, user_agent: String, scheme: &'static str) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent.as_str())
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs((timeout_secs / 2).max(1)))
            .pool_max_idle_per_host(8)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(60))
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()?;

        Ok(Self {
            client,
            scheme,
            timeout_secs,
            user_agent,
        })
    }

    pub fn timeout_secs(&self) -> u64 {
        self.timeout_secs
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Build the absolute URL of `path` on the instance `host`.
    pub fn endpoint(&self, host: &str, path: &str) -> Result<Url> {
        let raw = format!("{}://{}{}", self.scheme, host, path);
        Url::parse(&raw).map_err(|e| QueryError::InvalidEndpoint(format!("{}: {}", raw, e)))
    }

    pub async fn fetch_profile(&self, host: &str) -> Result<InstanceProfile> {
        self.get_json(host, PROFILE_PATH).await
    }

    pub async fn fetch_peers(&self, host: &str) -> Result<Vec<String>> {
        self.get_json(host, PEERS_PATH).await
    }

    /// Fetch profile and peers concurrently. Either failure fails the query.
    pub async fn query(&self, host: &str) -> Result<InstanceSnapshot> {
        info!("Querying instance {}", host);
        let start = Instant::now();

        let (profile, peers) = tokio::try_join!(self.fetch_profile(host), self.fetch_peers(host))?;

        info!(
            "Instance {} reported {} peers in {:?}",
            host,
            peers.len(),
            start.elapsed()
        );
        Ok(InstanceSnapshot { profile, peers })
    }

    async fn get_json<T: DeserializeOwned>(&self, host: &str, path: &str) -> Result<T> {
        let url = self.endpoint(host, path)?;
        debug!("Fetching {}", url);

        let start = Instant::now();
        let response = self
            .client
            .get(url.clone())
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(QueryError::Status {
                url: url.to_string(),
                status,
            });
        }

        let body = response.bytes().await?;
        debug!(
            "{} answered {} ({} bytes) in {:?}",
            url,
            status,
            body.len(),
            start.elapsed()
        );

        serde_json::from_slice(&body).map_err(|source| QueryError::Malformed {
            url: url.to_string(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::InstanceStats;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{method, path},
    };

    fn local_client() -> InstanceClient {
        InstanceClient::with_timeout(2).unwrap().with_plain_http()
    }

    fn host_of(server: &MockServer) -> String {
        server.address().to_string()
    }

    async fn mount_json(server: &MockServer, at: &str, body: serde_json::Value) {
        Mock::given(method("GET"))
            .and(path(at))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .expect(1)
            .mount(server)
            .await;
    }

    #[test]
    fn test_endpoint_uses_https_by_default() {
        let client = InstanceClient::new().unwrap();
        let url = client.endpoint("example.social", PEERS_PATH).unwrap();
        assert_eq!(url.as_str(), "https://example.social/api/v1/instance/peers");
    }

    #[test]
    fn test_endpoint_rejects_garbage_host() {
        let client = InstanceClient::new().unwrap();
        let err = client.endpoint("not a host", PROFILE_PATH).unwrap_err();
        assert!(matches!(err, QueryError::InvalidEndpoint(_)));
    }

    #[tokio::test]
    async fn test_query_joins_profile_and_peers() {
        let server = MockServer::start().await;
        mount_json(
            &server,
            PROFILE_PATH,
            serde_json::json!({
                "uri": "example.social",
                "title": "Example",
                "description": "An example instance",
                "thumbnail": "https://example.social/thumb.png",
                "stats": { "user_count": 12, "status_count": 340, "domain_count": 2 },
                "registrations": true
            }),
        )
        .await;
        mount_json(
            &server,
            PEERS_PATH,
            serde_json::json!(["a.social", "b.social"]),
        )
        .await;

        let snapshot = local_client().query(&host_of(&server)).await.unwrap();

        assert_eq!(snapshot.profile.uri, "example.social");
        assert_eq!(snapshot.profile.title, "Example");
        assert_eq!(
            snapshot.profile.thumbnail.as_deref(),
            Some("https://example.social/thumb.png")
        );
        assert_eq!(snapshot.profile.stats.map(|s| s.user_count), Some(12));
        assert_eq!(snapshot.peers, vec!["a.social", "b.social"]);
    }

    #[tokio::test]
    async fn test_minimal_profile_defaults_optional_fields() {
        let server = MockServer::start().await;
        mount_json(&server, PROFILE_PATH, serde_json::json!({ "uri": "tiny.social" })).await;

        let profile = local_client()
            .fetch_profile(&host_of(&server))
            .await
            .unwrap();

        assert_eq!(profile, InstanceProfile::new("tiny.social"));
    }

    #[tokio::test]
    async fn test_null_fields_read_as_defaults() {
        let server = MockServer::start().await;
        mount_json(
            &server,
            PROFILE_PATH,
            serde_json::json!({
                "uri": "quiet.social",
                "title": null,
                "description": null,
                "thumbnail": null,
                "languages": null,
                "stats": { "user_count": null, "status_count": 5, "domain_count": null }
            }),
        )
        .await;

        let profile = local_client()
            .fetch_profile(&host_of(&server))
            .await
            .unwrap();

        assert_eq!(profile.uri, "quiet.social");
        assert!(profile.title.is_empty());
        assert!(profile.description.is_empty());
        assert!(profile.languages.is_empty());
        assert_eq!(
            profile.stats,
            Some(InstanceStats {
                user_count: 0,
                status_count: 5,
                domain_count: 0,
            })
        );
    }

    #[tokio::test]
    async fn test_error_status_fails_the_whole_query() {
        let server = MockServer::start().await;
        mount_json(&server, PROFILE_PATH, serde_json::json!({ "uri": "x.social" })).await;
        Mock::given(method("GET"))
            .and(path(PEERS_PATH))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = local_client().query(&host_of(&server)).await.unwrap_err();

        match err {
            QueryError::Status { status, .. } => assert_eq!(status.as_u16(), 503),
            other => panic!("expected status error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_malformed_peer_list() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(PEERS_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>nope</html>"))
            .mount(&server)
            .await;

        let err = local_client()
            .fetch_peers(&host_of(&server))
            .await
            .unwrap_err();

        assert!(matches!(err, QueryError::Malformed { .. }));
        assert!(!err.is_transport());
    }

    #[tokio::test]
    async fn test_profile_without_uri_is_malformed() {
        let server = MockServer::start().await;
        mount_json(&server, PROFILE_PATH, serde_json::json!({ "title": "No uri" })).await;

        let err = local_client()
            .fetch_profile(&host_of(&server))
            .await
            .unwrap_err();

        assert!(matches!(err, QueryError::Malformed { .. }));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_transport_error() {
        // Port 1 is essentially never listening
        let err = local_client().fetch_peers("127.0.0.1:1").await.unwrap_err();
        assert!(err.is_transport(), "unexpected error: {:?}", err);
    }
}
