use bytes::Bytes;
use portal_auth::common::envelope;
use portal_auth::{AuthContext, RefreshCoordinator, Service, Session};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use crate::classifier::classify;
use crate::error::ApiError;
use crate::request::{query_pairs, ApiRequest, RequestData};
use crate::transport::{Body, HttpRequest, HttpResponse, ReqwestTransport, Transport};

/// Client for one backend service.
///
/// Attaches the bearer token to protected endpoints, normalises both HTTP and
/// envelope status codes, and answers a 401 with at most one
/// refresh-and-retry through the shared [`RefreshCoordinator`].
pub struct Client<T = ReqwestTransport> {
    base_url: String,
    transport: T,
    coordinator: Arc<RefreshCoordinator>,
}

impl Client<ReqwestTransport> {
    pub fn new(
        base_url: impl Into<String>,
        coordinator: Arc<RefreshCoordinator>,
        timeout: Duration,
    ) -> Result<Self, ApiError> {
        let transport =
            ReqwestTransport::new(timeout).map_err(|e| ApiError::Network(e.to_string()))?;
        Ok(Self::with_transport(base_url, transport, coordinator))
    }

    pub fn for_service(ctx: &AuthContext, service: Service) -> Result<Self, ApiError> {
        Self::new(
            ctx.settings.service_url(service),
            ctx.coordinator.clone(),
            ctx.settings.request_timeout(),
        )
    }
}

impl<T: Transport> Client<T> {
    pub fn with_transport(
        base_url: impl Into<String>,
        transport: T,
        coordinator: Arc<RefreshCoordinator>,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            transport,
            coordinator,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn send<R>(&self, request: R) -> Result<R::Response, ApiError>
    where
        R: ApiRequest,
    {
        let response = self.execute(&request).await?;
        decode(&response.body)
    }

    /// Like [`send`](Self::send) but hands back the raw body, for file
    /// downloads.
    pub async fn download<R>(&self, request: R) -> Result<Bytes, ApiError>
    where
        R: ApiRequest,
    {
        Ok(self.execute(&request).await?.body)
    }

    async fn execute<R: ApiRequest>(&self, request: &R) -> Result<HttpResponse, ApiError> {
        let endpoint = request.endpoint();
        let class = classify(&endpoint);
        let mut http = self.build(request, &endpoint)?;

        let session = if class.is_public {
            None
        } else {
            self.coordinator.tokens().get()
        };
        http.bearer = session.as_ref().map(|s| s.access_token().to_string());

        match self.dispatch(http.clone()).await {
            Err(ApiError::Unauthorized) if class.refresh_eligible => {
                let Some(fresh) = self.fresh_session(session.as_deref()).await else {
                    tracing::debug!("{} {}: no session after refresh", R::METHOD, endpoint);
                    return Err(ApiError::Unauthorized);
                };

                tracing::debug!("Retrying {} {} with refreshed token", R::METHOD, endpoint);
                http.bearer = Some(fresh.access_token().to_string());
                // A second 401 is final
                self.dispatch(http).await
            }
            other => other,
        }
    }

    /// A token that differs from the one that was rejected. If another call
    /// already refreshed, reuse its result instead of refreshing again.
    async fn fresh_session(&self, rejected: Option<&Session>) -> Option<Arc<Session>> {
        if let Some(current) = self.coordinator.tokens().get() {
            let superseded = rejected.is_none_or(|r| r.access_token() != current.access_token());
            if superseded {
                return Some(current);
            }
        }
        self.coordinator.ensure_fresh_token().await
    }

    fn build<R: ApiRequest>(&self, request: &R, endpoint: &str) -> Result<HttpRequest, ApiError> {
        let mut http = HttpRequest {
            method: R::METHOD,
            url: format!("{}{}", self.base_url, endpoint),
            bearer: None,
            query: Vec::new(),
            body: Body::Empty,
        };

        match request.data() {
            RequestData::Empty => {}
            RequestData::Query(data) => http.query = query_pairs(data)?,
            RequestData::Json(data) => http.body = Body::Json(serde_json::to_value(data)?),
            RequestData::Multipart(form) => http.body = Body::Multipart(form),
        }

        Ok(http)
    }

    async fn dispatch(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let response = self
            .transport
            .execute(request)
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        normalize(response)
    }
}

/// Map HTTP and embedded envelope failures onto [`ApiError`]. The envelope
/// status wins when the transport said 2xx.
fn normalize(response: HttpResponse) -> Result<HttpResponse, ApiError> {
    let json = serde_json::from_slice::<Value>(&response.body).ok();

    let status = if envelope::is_failure(response.status) {
        response.status
    } else {
        match json.as_ref().and_then(envelope::embedded_status) {
            Some(embedded) if envelope::is_failure(embedded) => embedded,
            _ => return Ok(response),
        }
    };

    let message = json
        .as_ref()
        .and_then(envelope::error_message)
        .unwrap_or_else(|| fallback_message(status, &response.body));

    Err(match status {
        401 => ApiError::Unauthorized,
        403 => ApiError::Forbidden(message),
        status => ApiError::Business { status, message },
    })
}

fn fallback_message(status: u16, body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body);
    let text = text.trim();
    if !text.is_empty() && text.len() <= 200 {
        return text.to_string();
    }
    reqwest::StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("Request failed")
        .to_string()
}

fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, ApiError> {
    let value = if body.iter().all(u8::is_ascii_whitespace) {
        Value::Null
    } else {
        serde_json::from_slice(body)?
    };
    Ok(serde_json::from_value(envelope::into_data(value))?)
}

/// One client per backend service, all sharing the session.
pub struct ServiceClients {
    pub auth: Client,
    pub jobs: Client,
    pub applications: Client,
    pub notifications: Client,
}

impl ServiceClients {
    pub fn new(ctx: &AuthContext) -> Result<Self, ApiError> {
        Ok(Self {
            auth: Client::for_service(ctx, Service::Auth)?,
            jobs: Client::for_service(ctx, Service::Jobs)?,
            applications: Client::for_service(ctx, Service::Applications)?,
            notifications: Client::for_service(ctx, Service::Notifications)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::request::EmptyResponse;
    use crate::transport::TransportError;
    use portal_auth::{
        AuthClientError, Identity, RefreshFuture, SessionRecordStore, TokenGrant, TokenRefresher,
        TokenStore,
    };
    use std::borrow::Cow;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    type Responder = Box<dyn Fn(&HttpRequest) -> HttpResponse + Send + Sync>;

    /// Answers from a closure after a short delay and records what it saw.
    struct ScriptedTransport {
        respond: Responder,
        seen: Mutex<Vec<HttpRequest>>,
    }

    impl ScriptedTransport {
        fn new(respond: impl Fn(&HttpRequest) -> HttpResponse + Send + Sync + 'static) -> Self {
            Self {
                respond: Box::new(respond),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn seen(&self) -> Vec<HttpRequest> {
            self.seen.lock().unwrap().clone()
        }
    }

    impl Transport for ScriptedTransport {
        async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
            tokio::time::sleep(Duration::from_millis(10)).await;
            let response = (self.respond)(&request);
            self.seen.lock().unwrap().push(request);
            Ok(response)
        }
    }

    struct Unreachable;

    impl Transport for Unreachable {
        async fn execute(&self, _: HttpRequest) -> Result<HttpResponse, TransportError> {
            Err(TransportError("connection refused".into()))
        }
    }

    struct FakeRefresher {
        calls: AtomicUsize,
        token: Option<&'static str>,
    }

    impl FakeRefresher {
        fn new(token: Option<&'static str>) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                token,
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl TokenRefresher for FakeRefresher {
        fn refresh(&self) -> RefreshFuture<'_> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Box::pin(async move {
                tokio::time::sleep(Duration::from_millis(50)).await;
                match self.token {
                    Some(token) => Ok(TokenGrant {
                        access_token: token.to_string(),
                        expires_in: Some(900),
                        username: "ana".to_string(),
                        roles: vec!["CANDIDATE".to_string()],
                        company_id: None,
                    }),
                    None => Err(AuthClientError::Unauthorized("expired".into())),
                }
            })
        }
    }

    struct Stats;

    impl ApiRequest for Stats {
        type Data = ();
        type Response = Value;

        fn endpoint(&self) -> Cow<'_, str> {
            "/api/applications/stats".into()
        }
    }

    struct PublicJobs;

    impl ApiRequest for PublicJobs {
        type Data = ();
        type Response = Value;

        fn endpoint(&self) -> Cow<'_, str> {
            "/api/jobs/public".into()
        }
    }

    struct Logout;

    impl ApiRequest for Logout {
        type Data = ();
        type Response = EmptyResponse;
        const METHOD: reqwest::Method = reqwest::Method::POST;

        fn endpoint(&self) -> Cow<'_, str> {
            "/api/auth/logout".into()
        }
    }

    struct Harness {
        _dir: tempfile::TempDir,
        tokens: Arc<TokenStore>,
        refresher: Arc<FakeRefresher>,
        client: Arc<Client<ScriptedTransport>>,
    }

    fn harness(refresh_to: Option<&'static str>, transport: ScriptedTransport) -> Harness {
        let dir = tempfile::tempdir().unwrap();
        let tokens = Arc::new(TokenStore::new(SessionRecordStore::new(dir.path()).unwrap()));
        tokens.set(Session::new(
            "T1",
            None,
            Identity {
                username: "ana".into(),
                roles: Default::default(),
                company_id: None,
            },
        ));
        let refresher = FakeRefresher::new(refresh_to);
        let coordinator = RefreshCoordinator::new(refresher.clone(), tokens.clone());
        let client = Arc::new(Client::with_transport(
            "http://backend.test/",
            transport,
            coordinator,
        ));
        Harness {
            _dir: dir,
            tokens,
            refresher,
            client,
        }
    }

    fn reply(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            body: Bytes::from(body.to_string()),
        }
    }

    /// 401 for anything but `T2`.
    fn accepts_t2(request: &HttpRequest) -> HttpResponse {
        match request.bearer.as_deref() {
            Some("T2") => reply(200, r#"{"status":200,"data":{"ok":true}}"#),
            _ => reply(401, r#"{"message":"Token expired"}"#),
        }
    }

    async fn send_concurrently(client: &Arc<Client<ScriptedTransport>>, n: usize) -> Vec<Result<Value, ApiError>> {
        let mut set = tokio::task::JoinSet::new();
        for _ in 0..n {
            let client = client.clone();
            set.spawn(async move { client.send(Stats).await });
        }
        let mut results = Vec::new();
        while let Some(result) = set.join_next().await {
            results.push(result.unwrap());
        }
        results
    }

    #[tokio::test]
    async fn concurrent_401s_share_one_refresh_and_retry_once() {
        let h = harness(Some("T2"), ScriptedTransport::new(accepts_t2));

        let results = send_concurrently(&h.client, 5).await;

        assert_eq!(h.refresher.calls(), 1);
        for result in results {
            assert_eq!(result.unwrap(), serde_json::json!({"ok": true}));
        }

        let seen = h.client.transport.seen();
        assert_eq!(seen.len(), 10);
        assert_eq!(seen.iter().filter(|r| r.bearer.as_deref() == Some("T1")).count(), 5);
        assert_eq!(seen.iter().filter(|r| r.bearer.as_deref() == Some("T2")).count(), 5);
        assert_eq!(h.tokens.get().unwrap().access_token(), "T2");
    }

    #[tokio::test]
    async fn failed_refresh_fails_every_caller() {
        let h = harness(None, ScriptedTransport::new(accepts_t2));

        let results = send_concurrently(&h.client, 3).await;

        assert_eq!(h.refresher.calls(), 1);
        assert!(results.iter().all(|r| matches!(r, Err(ApiError::Unauthorized))));
        assert!(h.tokens.get().is_none());
        // Nobody retried without a token
        assert_eq!(h.client.transport.seen().len(), 3);
    }

    #[tokio::test]
    async fn second_401_is_final() {
        let h = harness(Some("T2"), ScriptedTransport::new(|_| reply(401, "")));

        let err = h.client.send(Stats).await.unwrap_err();

        assert!(matches!(err, ApiError::Unauthorized));
        assert_eq!(err.kind(), ErrorKind::Unauthorized);
        assert_eq!(h.refresher.calls(), 1);
        assert_eq!(h.client.transport.seen().len(), 2);
    }

    #[tokio::test]
    async fn embedded_401_in_a_200_triggers_refresh() {
        let h = harness(
            Some("T2"),
            ScriptedTransport::new(|request| match request.bearer.as_deref() {
                Some("T2") => reply(200, r#"{"data":{"ok":true}}"#),
                _ => reply(200, r#"{"status":401,"message":"Token expired"}"#),
            }),
        );

        assert!(h.client.send(Stats).await.is_ok());
        assert_eq!(h.refresher.calls(), 1);
    }

    #[tokio::test]
    async fn forbidden_never_refreshes() {
        let h = harness(
            Some("T2"),
            ScriptedTransport::new(|_| reply(403, r#"{"message":"HR only"}"#)),
        );

        let err = h.client.send(Stats).await.unwrap_err();

        assert!(matches!(err, ApiError::Forbidden(ref m) if m == "HR only"));
        assert_eq!(h.refresher.calls(), 0);

        let h = harness(
            Some("T2"),
            ScriptedTransport::new(|_| reply(200, r#"{"status":"403","message":"nope"}"#)),
        );
        assert_eq!(h.client.send(Stats).await.unwrap_err().kind(), ErrorKind::Forbidden);
        assert_eq!(h.refresher.calls(), 0);
    }

    #[tokio::test]
    async fn public_endpoints_never_carry_the_token() {
        let h = harness(
            Some("T2"),
            ScriptedTransport::new(|request| match request.bearer {
                Some(_) => reply(400, "unexpected bearer"),
                None => reply(200, r#"{"data":{"content":[]}}"#),
            }),
        );

        assert!(h.client.send(PublicJobs).await.is_ok());
        assert!(h.client.transport.seen()[0].bearer.is_none());
    }

    #[tokio::test]
    async fn public_401_surfaces_without_refresh() {
        let h = harness(Some("T2"), ScriptedTransport::new(|_| reply(401, "")));

        assert!(matches!(
            h.client.send(PublicJobs).await,
            Err(ApiError::Unauthorized)
        ));
        assert_eq!(h.refresher.calls(), 0);
    }

    #[tokio::test]
    async fn logout_is_authenticated_but_not_refreshed() {
        let h = harness(Some("T2"), ScriptedTransport::new(|_| reply(401, "")));

        assert!(h.client.send(Logout).await.is_err());
        assert_eq!(h.client.transport.seen()[0].bearer.as_deref(), Some("T1"));
        assert_eq!(h.refresher.calls(), 0);
    }

    #[tokio::test]
    async fn late_401_reuses_an_already_refreshed_token() {
        let h = harness(Some("T3"), ScriptedTransport::new(accepts_t2));
        let rejected = h.tokens.get();
        h.tokens.set(Session::new(
            "T2",
            None,
            Identity {
                username: "ana".into(),
                roles: Default::default(),
                company_id: None,
            },
        ));

        let fresh = h.client.fresh_session(rejected.as_deref()).await.unwrap();

        assert_eq!(fresh.access_token(), "T2");
        assert_eq!(h.refresher.calls(), 0);
    }

    #[tokio::test]
    async fn business_errors_keep_status_and_message() {
        let h = harness(
            None,
            ScriptedTransport::new(|_| reply(409, r#"{"status":409,"message":"Already applied"}"#)),
        );

        match h.client.send(Stats).await.unwrap_err() {
            ApiError::Business { status, message } => {
                assert_eq!(status, 409);
                assert_eq!(message, "Already applied");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn malformed_success_body_is_a_decode_error() {
        let h = harness(None, ScriptedTransport::new(|_| reply(200, "<html>")));

        let err = h.client.send(Stats).await.unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
        assert_eq!(err.kind(), ErrorKind::Network);
    }

    #[tokio::test]
    async fn empty_body_decodes_as_empty_response() {
        let h = harness(None, ScriptedTransport::new(|_| reply(204, "")));
        assert!(h.client.send(Logout).await.is_ok());
    }

    #[tokio::test]
    async fn download_returns_raw_bytes() {
        let h = harness(None, ScriptedTransport::new(|_| reply(200, "%PDF-1.7")));
        let bytes = h.client.download(Stats).await.unwrap();
        assert_eq!(&bytes[..], b"%PDF-1.7");
    }

    #[tokio::test]
    async fn transport_failure_is_a_network_error() {
        let dir = tempfile::tempdir().unwrap();
        let tokens = Arc::new(TokenStore::new(SessionRecordStore::new(dir.path()).unwrap()));
        let coordinator = RefreshCoordinator::new(FakeRefresher::new(None), tokens);
        let client = Client::with_transport("http://backend.test", Unreachable, coordinator);

        let err = client.send(Stats).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Network);
    }

    #[test]
    fn urls_join_without_double_slash() {
        let h = harness(None, ScriptedTransport::new(|_| reply(200, "")));
        let request = h.client.build(&Stats, &Stats.endpoint()).unwrap();
        assert_eq!(request.url, "http://backend.test/api/applications/stats");
    }
}
