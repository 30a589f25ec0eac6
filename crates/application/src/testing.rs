//! Fakes shared by the unit tests of this crate.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use gatehouse_domain::{
    Credentials, LoginGrant, PermissionTree, Route, SessionConfig, TokenInfo, TokenMode,
};
use parking_lot::Mutex;
use serde_json::{Value, json};

use crate::interceptor::RequestInterceptor;
use crate::ports::{
    AuthApi, Clock, HttpTransport, KeyValueStore, LoadingIndicator, MenuSource, Navigator,
    NoticeLevel, Notifier, OutboundRequest, RawResponse, StorageError, TransportError,
};
use crate::session::SessionContext;
use crate::{ApplicationError, ApplicationResult};

/// Clock that only moves when told to.
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Mutex::new(Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap()),
        }
    }

    pub fn advance_secs(&self, secs: i64) {
        *self.now.lock() += Duration::seconds(secs);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}

/// In-memory key-value store that counts removals.
#[derive(Default)]
pub struct MemoryStore {
    values: Mutex<BTreeMap<String, String>>,
    removals: Mutex<HashMap<String, usize>>,
    failing_removals: Mutex<Vec<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(&self, key: &str) -> Option<String> {
        self.values.lock().get(key).cloned()
    }

    pub fn insert(&self, key: &str, value: &str) {
        self.values.lock().insert(key.to_string(), value.to_string());
    }

    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.values.lock().clone()
    }

    /// Makes every removal of `key` fail with an I/O error.
    pub fn fail_removal_of(&self, key: &str) {
        self.failing_removals.lock().push(key.to_string());
    }

    pub fn clear_failures(&self) {
        self.failing_removals.lock().clear();
    }

    /// Number of removals of `key` that found a value.
    pub fn removals(&self, key: &str) -> usize {
        self.removals.lock().get(key).copied().unwrap_or(0)
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.value(key))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.insert(key, value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        if self.failing_removals.lock().iter().any(|k| k == key) {
            return Err(StorageError::Io(format!("cannot remove {key}")));
        }
        if self.values.lock().remove(key).is_some() {
            *self.removals.lock().entry(key.to_string()).or_default() += 1;
        }
        Ok(())
    }
}

/// Auth API answering from queued results.
#[derive(Default)]
pub struct ScriptedAuthApi {
    logins: Mutex<VecDeque<ApplicationResult<LoginGrant>>>,
    refreshes: Mutex<VecDeque<ApplicationResult<TokenInfo>>>,
    refresh_calls: AtomicUsize,
    last_refresh_token: Mutex<Option<String>>,
}

impl ScriptedAuthApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_login(&self, result: ApplicationResult<LoginGrant>) {
        self.logins.lock().push_back(result);
    }

    pub fn push_refresh(&self, result: ApplicationResult<TokenInfo>) {
        self.refreshes.lock().push_back(result);
    }

    pub fn refresh_calls(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }

    pub fn last_refresh_token(&self) -> Option<String> {
        self.last_refresh_token.lock().clone()
    }
}

#[async_trait]
impl AuthApi for ScriptedAuthApi {
    async fn login(&self, _credentials: &Credentials) -> ApplicationResult<LoginGrant> {
        let next = self.logins.lock().pop_front();
        next.unwrap_or_else(|| Err(ApplicationError::NetworkUnreachable("no login scripted".into())))
    }

    async fn refresh(&self, refresh_token: &str) -> ApplicationResult<TokenInfo> {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_refresh_token.lock() = Some(refresh_token.to_string());
        // Give concurrent callers a chance to pile up behind this refresh.
        tokio::task::yield_now().await;
        tokio::task::yield_now().await;
        let next = self.refreshes.lock().pop_front();
        next.unwrap_or_else(|| {
            Err(ApplicationError::NetworkUnreachable(
                "no refresh scripted".into(),
            ))
        })
    }
}

/// Transport answering from queued responses and recording requests.
#[derive(Default)]
pub struct ScriptedTransport {
    responses: Mutex<VecDeque<Result<RawResponse, TransportError>>>,
    requests: Mutex<Vec<OutboundRequest>>,
}

impl ScriptedTransport {
    pub fn push(&self, response: Result<RawResponse, TransportError>) {
        self.responses.lock().push_back(response);
    }

    pub fn requests(&self) -> Vec<OutboundRequest> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn send(&self, request: OutboundRequest) -> Result<RawResponse, TransportError> {
        self.requests.lock().push(request);
        let next = self.responses.lock().pop_front();
        next.unwrap_or_else(|| Err(TransportError::Unreachable("no response scripted".into())))
    }
}

/// Menu source serving a fixed tree unless a result is queued.
pub struct ScriptedMenuSource {
    tree: PermissionTree,
    queued: Mutex<VecDeque<ApplicationResult<PermissionTree>>>,
    calls: AtomicUsize,
}

impl ScriptedMenuSource {
    pub fn with_tree(tree: PermissionTree) -> Self {
        Self {
            tree,
            queued: Mutex::new(VecDeque::new()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn push(&self, result: ApplicationResult<PermissionTree>) {
        self.queued.lock().push_back(result);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MenuSource for ScriptedMenuSource {
    async fn fetch_menus(&self) -> ApplicationResult<PermissionTree> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = self.queued.lock().pop_front();
        next.unwrap_or_else(|| Ok(self.tree.clone()))
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<(NoticeLevel, String)>>,
}

impl RecordingNotifier {
    pub fn notices(&self) -> Vec<(NoticeLevel, String)> {
        self.notices.lock().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, level: NoticeLevel, message: &str) {
        self.notices.lock().push((level, message.to_string()));
    }
}

#[derive(Default)]
pub struct RecordingNavigator {
    redirects: Mutex<Vec<Route>>,
}

impl RecordingNavigator {
    pub fn redirects(&self) -> Vec<Route> {
        self.redirects.lock().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn redirect(&self, to: &Route) {
        self.redirects.lock().push(to.clone());
    }
}

#[derive(Default)]
pub struct RecordingLoading {
    shown: AtomicUsize,
    hidden: AtomicUsize,
    last_text: Mutex<Option<String>>,
}

impl RecordingLoading {
    pub fn shown(&self) -> usize {
        self.shown.load(Ordering::SeqCst)
    }

    pub fn hidden(&self) -> usize {
        self.hidden.load(Ordering::SeqCst)
    }

    pub fn last_text(&self) -> Option<String> {
        self.last_text.lock().clone()
    }
}

impl LoadingIndicator for RecordingLoading {
    fn show(&self, message: &str) {
        self.shown.fetch_add(1, Ordering::SeqCst);
        *self.last_text.lock() = Some(message.to_string());
    }

    fn hide(&self) {
        self.hidden.fetch_add(1, Ordering::SeqCst);
    }
}

pub struct SessionFixture {
    pub ctx: SessionContext,
    pub clock: Arc<ManualClock>,
    pub storage: Arc<MemoryStore>,
    pub api: Arc<ScriptedAuthApi>,
}

pub fn session_fixture(mode: TokenMode) -> SessionFixture {
    let config = SessionConfig {
        token_mode: mode,
        ..SessionConfig::default()
    };
    let clock = Arc::new(ManualClock::new());
    let storage = Arc::new(MemoryStore::new());
    let api = Arc::new(ScriptedAuthApi::new());
    let ctx = SessionContext::new(config, storage.clone(), clock.clone(), api.clone());
    SessionFixture {
        ctx,
        clock,
        storage,
        api,
    }
}

pub struct InterceptorFixture {
    pub session: SessionFixture,
    pub transport: Arc<ScriptedTransport>,
    pub notifier: Arc<RecordingNotifier>,
    pub navigator: Arc<RecordingNavigator>,
    pub loading: Arc<RecordingLoading>,
    pub interceptor: Arc<RequestInterceptor>,
}

impl InterceptorFixture {
    pub const fn ctx(&self) -> &SessionContext {
        &self.session.ctx
    }
}

pub fn interceptor_fixture(mode: TokenMode) -> InterceptorFixture {
    let session = session_fixture(mode);
    let transport = Arc::new(ScriptedTransport::default());
    let notifier = Arc::new(RecordingNotifier::default());
    let navigator = Arc::new(RecordingNavigator::default());
    let loading = Arc::new(RecordingLoading::default());
    let interceptor = Arc::new(RequestInterceptor::new(
        session.ctx.clone(),
        transport.clone(),
        notifier.clone(),
        navigator.clone(),
        loading.clone(),
    ));
    InterceptorFixture {
        session,
        transport,
        notifier,
        navigator,
        loading,
        interceptor,
    }
}

/// Standard `{ code, message, data }` envelope with HTTP 200.
pub fn envelope(code: i64, message: &str, data: Value) -> RawResponse {
    let body = json!({ "code": code, "message": message, "data": data });
    RawResponse::new(200, body.to_string())
}
