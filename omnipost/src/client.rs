use crate::error::ApiError;
use crate::media::MediaFile;
use crate::models::*;
use crate::session::Session;
use crate::transport::{ApiRequest, ApiResponse, Method, ReqwestTransport, Transport};
use lazy_static::lazy_static;
use log::{debug, info, warn};
use regex::Regex;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

pub static DEFAULT_API_URL: &str = "http://localhost:8000/api";

/// Gateway to the backend REST API.
///
/// Every call carries the session's access credential. When the backend rejects it with a 401,
/// the client performs a single refresh exchange and replays the original request once; if the
/// refresh can't happen the session is cleared and the call fails with
/// [`ApiError::SessionExpired`].
///
/// Concurrent callers sharing a client each run that protocol on their own; refreshes are not
/// coalesced.
pub struct ApiClient {
    transport: Box<dyn Transport>,
    session: Session,
}

impl ApiClient {
    pub fn new(base_url: &str, session: Session) -> Result<Self, ApiError> {
        Ok(Self::with_transport(ReqwestTransport::new(base_url)?, session))
    }

    pub fn with_transport<T: Transport + 'static>(transport: T, session: Session) -> Self {
        ApiClient {
            transport: Box::new(transport),
            session,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Sends a request with the refresh-on-401 protocol. `retried` marks the replayed copy; a
    /// rejection of that copy is handed back unchanged.
    fn dispatch(&self, req: &ApiRequest, retried: bool) -> Result<ApiResponse, ApiError> {
        let bearer = self.session.access_token()?;
        debug!(
            "{} {} query={:?} retried={}",
            req.method, req.path, req.query, retried
        );
        let res = self.transport.send(req, bearer.as_deref())?;
        if !res.is_unauthorized() || retried {
            return res.into_result();
        }

        let rejection = res.into_error();
        match self.refresh_session() {
            Ok(()) => self.dispatch(req, true),
            Err(reason) => {
                warn!("refresh after {} {} failed: {}", req.method, req.path, reason);
                self.session.expire();
                let (status, message) = match rejection {
                    ApiError::Http {
                        status, message, ..
                    } => (status, message),
                    other => (401, other.to_string()),
                };
                Err(ApiError::SessionExpired {
                    status,
                    message,
                    reason: Box::new(reason),
                })
            }
        }
    }

    /// Single attempt, no refresh. Used for the auth endpoints themselves, where a 401 means bad
    /// credentials rather than an expired session.
    fn dispatch_public(&self, req: &ApiRequest) -> Result<ApiResponse, ApiError> {
        let bearer = self.session.access_token()?;
        debug!("{} {} (no refresh)", req.method, req.path);
        self.transport.send(req, bearer.as_deref())?.into_result()
    }

    fn call<T: DeserializeOwned>(&self, req: ApiRequest) -> Result<T, ApiError> {
        self.dispatch(&req, false)?.json()
    }

    fn call_unit(&self, req: ApiRequest) -> Result<(), ApiError> {
        self.dispatch(&req, false).map(|_| ())
    }

    /// Exchanges the stored refresh credential for a new credential pair and persists both.
    ///
    /// Fails with [`ApiError::NotAuthenticated`] without touching the network if no refresh
    /// credential is stored. Does not clear anything on failure; that is up to the caller.
    pub fn refresh_session(&self) -> Result<(), ApiError> {
        let refresh_token = self
            .session
            .refresh_token()?
            .ok_or(ApiError::NotAuthenticated)?;
        let req = ApiRequest::post("/auth/refresh").json(&RefreshRequest {
            refreshToken: refresh_token,
        })?;
        debug!("{} {}", req.method, req.path);
        let tokens: AuthTokens = self.transport.send(&req, None)?.into_result()?.json()?;
        self.session.set_tokens(&tokens)?;
        info!("refreshed session credentials");
        Ok(())
    }

    /// Creates a new session, and stores the resulting credential pair
    pub fn login(&self, credentials: &LoginCredentials) -> Result<User, ApiError> {
        let req = ApiRequest::post("/auth/login").json(credentials)?;
        let resp: AuthResponse = self.dispatch_public(&req)?.json()?;
        self.session.set_tokens(&resp.tokens)?;
        info!("logged in as {}", resp.user.username);
        Ok(resp.user)
    }

    pub fn register(&self, data: &RegisterData) -> Result<User, ApiError> {
        let req = ApiRequest::post("/auth/register").json(data)?;
        let resp: AuthResponse = self.dispatch_public(&req)?.json()?;
        self.session.set_tokens(&resp.tokens)?;
        info!("registered account {}", resp.user.username);
        Ok(resp.user)
    }

    /// Ends the session server-side. Local credentials are cleared whatever happens to the
    /// remote call; its error (if any) is still returned.
    pub fn logout(&self) -> Result<(), ApiError> {
        let remote = self.call_unit(ApiRequest::post("/auth/logout"));
        let cleared = self.session.clear();
        remote?;
        cleared
    }

    pub fn current_user(&self) -> Result<User, ApiError> {
        self.call(ApiRequest::get("/auth/me"))
    }

    pub fn connected_accounts(&self) -> Result<Vec<SocialAccount>, ApiError> {
        self.call(ApiRequest::get("/accounts"))
    }

    /// Starts OAuth linking; the returned URL is where the user authorizes the platform
    pub fn connect_account(&self, platform: Platform) -> Result<ConnectResponse, ApiError> {
        self.call(ApiRequest::post(&format!("/accounts/connect/{platform}")))
    }

    pub fn disconnect_account(&self, account_id: &str) -> Result<(), ApiError> {
        let id = path_segment(account_id)?;
        self.call_unit(ApiRequest::delete(&format!("/accounts/{id}")))
    }

    pub fn handle_oauth_callback(
        &self,
        platform: Platform,
        code: &str,
        state: &str,
    ) -> Result<SocialAccount, ApiError> {
        let req = ApiRequest::post(&format!("/accounts/callback/{platform}")).json(
            &OAuthCallbackRequest {
                code: code.to_string(),
                state: state.to_string(),
            },
        )?;
        self.call(req)
    }

    pub fn feed(&self, params: PaginationParams) -> Result<PaginatedResponse<FeedItem>, ApiError> {
        self.call(ApiRequest::get("/feed").query(params.to_query()))
    }

    pub fn posts(&self, params: PaginationParams) -> Result<PaginatedResponse<Post>, ApiError> {
        self.call(ApiRequest::get("/posts").query(params.to_query()))
    }

    pub fn create_post(&self, post: &CreatePost) -> Result<Post, ApiError> {
        self.call(ApiRequest::post("/posts").json(post)?)
    }

    pub fn upload_media(&self, file: MediaFile) -> Result<MediaUpload, ApiError> {
        self.call(ApiRequest::post("/media/upload").multipart(file))
    }

    pub fn schedule_post(&self, post_id: &str, scheduled_for: &str) -> Result<Post, ApiError> {
        let id = path_segment(post_id)?;
        let req = ApiRequest::put(&format!("/posts/{id}/schedule")).json(&SchedulePost {
            scheduledFor: scheduled_for.to_string(),
        })?;
        self.call(req)
    }

    pub fn delete_post(&self, post_id: &str) -> Result<(), ApiError> {
        let id = path_segment(post_id)?;
        self.call_unit(ApiRequest::delete(&format!("/posts/{id}")))
    }

    pub fn post_metrics(&self, post_id: &str) -> Result<Vec<PostMetrics>, ApiError> {
        let id = path_segment(post_id)?;
        self.call(ApiRequest::get(&format!("/posts/{id}/metrics")))
    }

    pub fn platform_stats(&self) -> Result<Vec<PlatformStats>, ApiError> {
        self.call(ApiRequest::get("/analytics/platforms"))
    }

    pub fn notifications(
        &self,
        params: PaginationParams,
    ) -> Result<PaginatedResponse<Notification>, ApiError> {
        self.call(ApiRequest::get("/notifications").query(params.to_query()))
    }

    pub fn mark_notification_read(&self, notification_id: &str) -> Result<(), ApiError> {
        let id = path_segment(notification_id)?;
        self.call_unit(ApiRequest::put(&format!("/notifications/{id}/read")))
    }

    pub fn mark_all_notifications_read(&self) -> Result<(), ApiError> {
        self.call_unit(ApiRequest::put("/notifications/read-all"))
    }

    /// Untyped call for endpoints without a typed wrapper. Still decorated and still covered by
    /// the refresh protocol.
    pub fn raw(
        &self,
        method: Method,
        path: &str,
        query: Vec<(String, String)>,
        body: Option<Value>,
    ) -> Result<Option<Value>, ApiError> {
        let path = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{path}")
        };
        let mut req = ApiRequest::new(method, &path).query(query);
        if let Some(b) = body {
            // GET with an empty object body is what an empty field list looks like
            if method != Method::Get || b != json!({}) {
                req = req.json(&b)?;
            }
        }
        self.dispatch(&req, false)?.json_value()
    }
}

/// Checks an identifier is safe to interpolate as a single URL path segment
fn path_segment(id: &str) -> Result<&str, ApiError> {
    lazy_static! {
        static ref SEGMENT_RE: Regex = Regex::new(r"^[A-Za-z0-9._~-]{1,256}$").unwrap();
    }
    if SEGMENT_RE.is_match(id) && id != "." && id != ".." {
        Ok(id)
    } else {
        Err(ApiError::InvalidRequest(format!(
            "not a valid resource id: {id:?}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{CredentialStore, MemoryStore, ACCESS_TOKEN_SLOT, REFRESH_TOKEN_SLOT};
    use crate::transport::Body;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    type Reply = Result<ApiResponse, ApiError>;

    /// Replays canned responses in order and records what was sent
    #[derive(Clone)]
    struct ScriptedTransport {
        replies: Arc<Mutex<VecDeque<Reply>>>,
        sent: Arc<Mutex<Vec<(ApiRequest, Option<String>)>>>,
    }

    impl ScriptedTransport {
        fn new(replies: Vec<Reply>) -> Self {
            ScriptedTransport {
                replies: Arc::new(Mutex::new(replies.into_iter().collect())),
                sent: Arc::new(Mutex::new(vec![])),
            }
        }

        fn sent(&self) -> Vec<(ApiRequest, Option<String>)> {
            self.sent.lock().unwrap().clone()
        }

        fn paths(&self) -> Vec<String> {
            self.sent()
                .into_iter()
                .map(|(req, _)| format!("{} {}", req.method, req.path))
                .collect()
        }
    }

    impl Transport for ScriptedTransport {
        fn send(&self, req: &ApiRequest, bearer: Option<&str>) -> Reply {
            self.sent
                .lock()
                .unwrap()
                .push((req.clone(), bearer.map(str::to_string)));
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .expect("transport called more times than scripted")
        }
    }

    fn ok(body: Value) -> Reply {
        Ok(ApiResponse::new(200, serde_json::to_vec(&body).unwrap()))
    }

    fn status(code: u16, message: &str) -> Reply {
        Ok(ApiResponse::new(
            code,
            serde_json::to_vec(&json!({ "message": message })).unwrap(),
        ))
    }

    fn tokens_json(access: &str, refresh: &str) -> Value {
        json!({"accessToken": access, "refreshToken": refresh})
    }

    fn user_json() -> Value {
        json!({
            "id": "u1",
            "email": "ana@example.com",
            "username": "ana",
            "fullName": "Ana Lima",
            "createdAt": "2024-01-01T00:00:00Z",
        })
    }

    fn logged_in(transport: &ScriptedTransport, access: &str, refresh: Option<&str>) -> ApiClient {
        let store = MemoryStore::new();
        store.save(ACCESS_TOKEN_SLOT, access).unwrap();
        if let Some(refresh) = refresh {
            store.save(REFRESH_TOKEN_SLOT, refresh).unwrap();
        }
        ApiClient::with_transport(transport.clone(), Session::new(store))
    }

    #[test]
    fn non_unauthorized_response_passes_through() {
        let transport = ScriptedTransport::new(vec![status(404, "post not found")]);
        let client = logged_in(&transport, "a1", Some("r1"));

        let err = client.delete_post("p1").unwrap_err();
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.to_string(), "HTTP 404: post not found");
        assert_eq!(transport.paths(), vec!["DELETE /posts/p1"]);
        assert_eq!(client.session().access_token().unwrap().as_deref(), Some("a1"));
    }

    #[test]
    fn success_attaches_bearer() {
        let transport = ScriptedTransport::new(vec![ok(user_json())]);
        let client = logged_in(&transport, "a1", Some("r1"));

        let user = client.current_user().unwrap();
        assert_eq!(user.username, "ana");
        let sent = transport.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].1.as_deref(), Some("a1"));
    }

    #[test]
    fn expired_access_token_refreshes_once_and_retries() {
        let transport = ScriptedTransport::new(vec![
            status(401, "token expired"),
            ok(tokens_json("a2", "r2")),
            ok(user_json()),
        ]);
        let client = logged_in(&transport, "a1", Some("r1"));

        let user = client.current_user().unwrap();
        assert_eq!(user.id, "u1");
        assert_eq!(
            transport.paths(),
            vec!["GET /auth/me", "POST /auth/refresh", "GET /auth/me"]
        );

        let sent = transport.sent();
        assert_eq!(sent[0].1.as_deref(), Some("a1"));
        assert_eq!(sent[1].0.body, Body::Json(json!({"refreshToken": "r1"})));
        assert_eq!(sent[1].1, None);
        assert_eq!(sent[2].1.as_deref(), Some("a2"));
        // replayed request is identical to the original
        assert_eq!(sent[0].0, sent[2].0);

        assert_eq!(client.session().access_token().unwrap().as_deref(), Some("a2"));
        assert_eq!(client.session().refresh_token().unwrap().as_deref(), Some("r2"));
    }

    #[test]
    fn second_rejection_is_not_retried() {
        let transport = ScriptedTransport::new(vec![
            status(401, "token expired"),
            ok(tokens_json("a2", "r2")),
            status(401, "account suspended"),
        ]);
        let client = logged_in(&transport, "a1", Some("r1"));

        let err = client.connected_accounts().unwrap_err();
        match err {
            ApiError::Http {
                status, message, ..
            } => {
                assert_eq!(status, 401);
                assert_eq!(message, "account suspended");
            }
            other => panic!("unexpected: {other:?}"),
        }
        assert_eq!(transport.sent().len(), 3);
        // refreshed credentials stay; only a failed refresh tears the session down
        assert_eq!(client.session().access_token().unwrap().as_deref(), Some("a2"));
    }

    #[test]
    fn missing_refresh_token_clears_session_without_exchange() {
        let expired = Arc::new(AtomicUsize::new(0));
        let counter = expired.clone();
        let transport = ScriptedTransport::new(vec![status(401, "token expired")]);
        let store = MemoryStore::new();
        store.save(ACCESS_TOKEN_SLOT, "a1").unwrap();
        let session = Session::new(store).with_expiry_hook(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        let client = ApiClient::with_transport(transport.clone(), session);

        let err = client.feed(PaginationParams::new(1, 10)).unwrap_err();
        match &err {
            ApiError::SessionExpired {
                status,
                message,
                reason,
            } => {
                assert_eq!(*status, 401);
                assert_eq!(message, "token expired");
                assert!(matches!(**reason, ApiError::NotAuthenticated));
            }
            other => panic!("unexpected: {other:?}"),
        }
        assert_eq!(transport.paths(), vec!["GET /feed"]);
        assert_eq!(expired.load(Ordering::SeqCst), 1);
        assert!(!client.session().is_authenticated().unwrap());
    }

    #[test]
    fn failed_refresh_clears_both_credentials() {
        let transport = ScriptedTransport::new(vec![
            status(401, "token expired"),
            status(401, "refresh token revoked"),
        ]);
        let client = logged_in(&transport, "a1", Some("r1"));

        let err = client.platform_stats().unwrap_err();
        assert!(matches!(err, ApiError::SessionExpired { status: 401, .. }));
        assert_eq!(
            transport.paths(),
            vec!["GET /analytics/platforms", "POST /auth/refresh"]
        );
        assert_eq!(client.session().access_token().unwrap(), None);
        assert_eq!(client.session().refresh_token().unwrap(), None);
    }

    #[test]
    fn refresh_transport_failure_clears_session() {
        let transport = ScriptedTransport::new(vec![
            status(401, "token expired"),
            Err(ApiError::transport(std::io::Error::new(
                std::io::ErrorKind::ConnectionReset,
                "connection reset",
            ))),
        ]);
        let client = logged_in(&transport, "a1", Some("r1"));

        let err = client.mark_all_notifications_read().unwrap_err();
        match err {
            ApiError::SessionExpired { reason, .. } => {
                assert!(matches!(*reason, ApiError::Transport(_)))
            }
            other => panic!("unexpected: {other:?}"),
        }
        assert!(!client.session().is_authenticated().unwrap());
    }

    #[test]
    fn refresh_with_undecodable_body_clears_session() {
        let transport = ScriptedTransport::new(vec![
            status(401, "token expired"),
            Ok(ApiResponse::new(200, b"<html>".to_vec())),
        ]);
        let client = logged_in(&transport, "a1", Some("r1"));

        let err = client.current_user().unwrap_err();
        match err {
            ApiError::SessionExpired { status, reason, .. } => {
                assert_eq!(status, 401);
                assert!(matches!(*reason, ApiError::Decode(_)));
            }
            other => panic!("unexpected: {other:?}"),
        }
        assert_eq!(
            transport.paths(),
            vec!["GET /auth/me", "POST /auth/refresh"]
        );
        assert!(!client.session().is_authenticated().unwrap());
        assert_eq!(client.session().refresh_token().unwrap(), None);
    }

    #[test]
    fn transport_error_is_not_retried() {
        let transport = ScriptedTransport::new(vec![Err(ApiError::transport(
            std::io::Error::new(std::io::ErrorKind::TimedOut, "timed out"),
        ))]);
        let client = logged_in(&transport, "a1", Some("r1"));
        assert!(matches!(
            client.current_user(),
            Err(ApiError::Transport(_))
        ));
        assert_eq!(transport.sent().len(), 1);
        assert!(client.session().is_authenticated().unwrap());
    }

    #[test]
    fn login_stores_tokens_and_returns_user() {
        let transport = ScriptedTransport::new(vec![ok(json!({
            "user": user_json(),
            "tokens": tokens_json("a1", "r1"),
        }))]);
        let client = ApiClient::with_transport(transport.clone(), Session::in_memory());

        let user = client
            .login(&LoginCredentials {
                email: "ana@example.com".to_string(),
                password: "Secret123".to_string(),
            })
            .unwrap();
        assert_eq!(user.email, "ana@example.com");
        assert_eq!(transport.sent()[0].1, None);
        assert_eq!(client.session().access_token().unwrap().as_deref(), Some("a1"));
        assert_eq!(client.session().refresh_token().unwrap().as_deref(), Some("r1"));
    }

    #[test]
    fn bad_login_is_plain_http_error() {
        let transport = ScriptedTransport::new(vec![status(401, "invalid email or password")]);
        let client = logged_in(&transport, "stale", Some("r-stale"));

        let err = client
            .login(&LoginCredentials {
                email: "ana@example.com".to_string(),
                password: "wrong".to_string(),
            })
            .unwrap_err();
        assert!(matches!(err, ApiError::Http { status: 401, .. }));
        assert_eq!(transport.paths(), vec!["POST /auth/login"]);
    }

    #[test]
    fn register_validation_error_surfaces_message() {
        let transport = ScriptedTransport::new(vec![status(422, "username already taken")]);
        let client = ApiClient::with_transport(transport, Session::in_memory());

        let err = client
            .register(&RegisterData {
                email: "ana@example.com".to_string(),
                username: "ana".to_string(),
                fullName: "Ana Lima".to_string(),
                password: "Secret123".to_string(),
            })
            .unwrap_err();
        assert_eq!(err.status(), Some(422));
        assert!(err.to_string().contains("username already taken"));
        assert!(!client.session().is_authenticated().unwrap());
    }

    #[test]
    fn logout_clears_even_when_remote_fails() {
        let transport = ScriptedTransport::new(vec![status(500, "database unavailable")]);
        let client = logged_in(&transport, "a1", Some("r1"));

        assert!(client.logout().is_err());
        assert_eq!(client.session().access_token().unwrap(), None);
        assert_eq!(client.session().refresh_token().unwrap(), None);

        let transport = ScriptedTransport::new(vec![Err(ApiError::transport(
            std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "down"),
        ))]);
        let client = logged_in(&transport, "a1", Some("r1"));
        assert!(matches!(client.logout(), Err(ApiError::Transport(_))));
        assert_eq!(client.session().access_token().unwrap(), None);
        assert_eq!(client.session().refresh_token().unwrap(), None);

        let transport = ScriptedTransport::new(vec![Ok(ApiResponse::new(204, vec![]))]);
        let client = logged_in(&transport, "a1", Some("r1"));
        client.logout().unwrap();
        assert!(!client.session().is_authenticated().unwrap());
    }

    #[test]
    fn unauthenticated_calls_carry_no_bearer() {
        let transport = ScriptedTransport::new(vec![ok(json!({"authUrl": "https://x.example/oauth"}))]);
        let client = ApiClient::with_transport(transport.clone(), Session::in_memory());
        let resp = client.connect_account(Platform::Twitter).unwrap();
        assert_eq!(resp.authUrl, "https://x.example/oauth");
        assert_eq!(transport.sent()[0].1, None);
        assert_eq!(transport.paths(), vec!["POST /accounts/connect/twitter"]);
    }

    #[test]
    fn request_shapes() {
        let post = json!({
            "id": "p1",
            "content": "launch day",
            "platforms": ["twitter", "linkedin"],
            "status": "scheduled",
            "scheduledFor": "2024-05-01T09:00:00Z",
            "authorId": "u1",
            "createdAt": "2024-04-01T00:00:00Z",
            "updatedAt": "2024-04-01T00:00:00Z",
        });
        let transport = ScriptedTransport::new(vec![
            ok(post.clone()),
            ok(json!({"data": [], "total": 0, "page": 2, "limit": 50, "hasMore": false})),
            ok(json!({"url": "https://cdn.example/m/1.png"})),
            ok(json!({
                "id": "acc1",
                "platform": "instagram",
                "platformUserId": "998",
                "username": "ana.ig",
                "displayName": "Ana",
                "isActive": true,
                "connectedAt": "2024-01-01T00:00:00Z",
                "permissions": ["publish"],
            })),
            Ok(ApiResponse::new(204, vec![])),
        ]);
        let client = logged_in(&transport, "a1", Some("r1"));

        let scheduled = client
            .schedule_post("p1", "2024-05-01T09:00:00Z")
            .unwrap();
        assert_eq!(scheduled.status, PostStatus::Scheduled);
        client.notifications(PaginationParams::new(2, 50)).unwrap();
        let upload = client
            .upload_media(MediaFile::new("a.png", "image/png", vec![0x89, 0x50]))
            .unwrap();
        assert_eq!(upload.url, "https://cdn.example/m/1.png");
        let account = client
            .handle_oauth_callback(Platform::Instagram, "c0de", "st4te")
            .unwrap();
        assert_eq!(account.platform, Platform::Instagram);
        client.mark_notification_read("n-7").unwrap();

        let sent = transport.sent();
        assert_eq!(sent[0].0.method, Method::Put);
        assert_eq!(sent[0].0.path, "/posts/p1/schedule");
        assert_eq!(
            sent[0].0.body,
            Body::Json(json!({"scheduledFor": "2024-05-01T09:00:00Z"}))
        );
        assert_eq!(
            sent[1].0.query,
            vec![
                ("page".to_string(), "2".to_string()),
                ("limit".to_string(), "50".to_string())
            ]
        );
        assert!(matches!(sent[2].0.body, Body::Multipart(_)));
        assert_eq!(sent[3].0.path, "/accounts/callback/instagram");
        assert_eq!(
            sent[3].0.body,
            Body::Json(json!({"code": "c0de", "state": "st4te"}))
        );
        assert_eq!(sent[4].0.path, "/notifications/n-7/read");
    }

    #[test]
    fn rejects_unsafe_ids() {
        let transport = ScriptedTransport::new(vec![]);
        let client = logged_in(&transport, "a1", Some("r1"));
        assert!(matches!(
            client.delete_post("../accounts"),
            Err(ApiError::InvalidRequest(_))
        ));
        assert!(client.post_metrics("a/b").is_err());
        assert!(client.disconnect_account("").is_err());
        assert!(client.mark_notification_read("..").is_err());
        assert!(transport.sent().is_empty());
    }

    #[test]
    fn raw_call() {
        let transport = ScriptedTransport::new(vec![
            ok(json!({"ok": true})),
            Ok(ApiResponse::new(204, vec![])),
        ]);
        let client = logged_in(&transport, "a1", Some("r1"));
        let val = client
            .raw(
                Method::Get,
                "feed",
                vec![("page".to_string(), "1".to_string())],
                Some(json!({})),
            )
            .unwrap();
        assert_eq!(val, Some(json!({"ok": true})));
        let val = client
            .raw(Method::Post, "/posts", vec![], Some(json!({"content": "hi"})))
            .unwrap();
        assert_eq!(val, None);

        let sent = transport.sent();
        assert_eq!(sent[0].0.path, "/feed");
        assert_eq!(sent[0].0.body, Body::Empty);
        assert_eq!(sent[1].0.body, Body::Json(json!({"content": "hi"})));
    }
}
