//! Test harness wiring an isolated store and runner to a scripted gateway.
//!
//! Every gateway method replays replies queued by the test. A reply can be
//! held back behind a oneshot channel so tests control the order in which
//! concurrent effects complete.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use adoption_api::{ApiError, AuthResponse, Pet, SignInRequest, UserProfile};
use adoption_store::{BaseApiGateway, CredentialStore, EffectRunner, Store};
use async_trait::async_trait;
use test_context::AsyncTestContext;
use tokio::sync::oneshot;

type Reply<T> = adoption_api::Result<T>;

enum Scripted<T> {
    Ready(Reply<T>),
    Held(oneshot::Receiver<Reply<T>>),
}

/// Queue of replies for one gateway method.
pub struct Script<T> {
    replies: Mutex<VecDeque<Scripted<T>>>,
    calls: AtomicUsize,
}

impl<T> Default for Script<T> {
    fn default() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            calls: AtomicUsize::new(0),
        }
    }
}

impl<T> Script<T> {
    pub fn reply(&self, reply: Reply<T>) {
        self.replies
            .lock()
            .unwrap()
            .push_back(Scripted::Ready(reply));
    }

    pub fn ok(&self, value: T) {
        self.reply(Ok(value));
    }

    pub fn fail(&self, status: u16, message: &str) {
        self.reply(Err(ApiError::Status {
            status,
            message: message.to_string(),
        }));
    }

    /// Queue a reply the test releases later through the returned sender.
    pub fn hold(&self) -> oneshot::Sender<Reply<T>> {
        let (tx, rx) = oneshot::channel();
        self.replies.lock().unwrap().push_back(Scripted::Held(rx));
        tx
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn next(&self) -> Reply<T> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let scripted = self.replies.lock().unwrap().pop_front();

        match scripted {
            Some(Scripted::Ready(reply)) => reply,
            Some(Scripted::Held(rx)) => rx.await.unwrap_or_else(|_| {
                Err(ApiError::Status {
                    status: 503,
                    message: "held reply dropped".into(),
                })
            }),
            None => Err(ApiError::Status {
                status: 503,
                message: "unscripted call".into(),
            }),
        }
    }
}

/// Gateway double backed by [`Script`] queues.
#[derive(Default)]
pub struct MockGateway {
    pub sign_in: Script<AuthResponse>,
    pub self_info: Script<UserProfile>,
    pub all_pets: Script<Vec<Pet>>,
    pub verify: Script<()>,
    /// `(pet_id, is_approved, bearer token)` per verification call
    pub verify_calls: Mutex<Vec<(i64, bool, Option<String>)>>,
}

#[async_trait]
impl BaseApiGateway for MockGateway {
    async fn sign_in(&self, _request: &SignInRequest) -> Reply<AuthResponse> {
        self.sign_in.next().await
    }

    async fn get_self_info(&self, _user_id: &str, _token: &str) -> Reply<UserProfile> {
        self.self_info.next().await
    }

    async fn get_all_pets(&self) -> Reply<Vec<Pet>> {
        self.all_pets.next().await
    }

    async fn verify_pet(
        &self,
        pet_id: i64,
        is_approved: bool,
        token: Option<&str>,
    ) -> Reply<()> {
        self.verify_calls
            .lock()
            .unwrap()
            .push((pet_id, is_approved, token.map(str::to_string)));
        self.verify.next().await
    }
}

/// Isolated store, credentials and runner per test.
///
/// # Example using test-context
///
/// ```ignore
/// use test_context::test_context;
///
/// #[test_context(TestHarness)]
/// #[tokio::test]
/// async fn my_test(ctx: &TestHarness) {
///     ctx.gateway.all_pets.ok(fixtures::three_pets());
///     ctx.runner.get_all_pets().await;
/// }
/// ```
pub struct TestHarness {
    pub gateway: Arc<MockGateway>,
    pub credentials: CredentialStore,
    pub store: Arc<Store>,
    pub runner: Arc<EffectRunner>,
}

impl AsyncTestContext for TestHarness {
    async fn setup() -> Self {
        // Run tests with: RUST_LOG=debug cargo test -- --nocapture
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();

        Self::new()
    }

    async fn teardown(self) {}
}

impl TestHarness {
    pub fn new() -> Self {
        Self::with_parts(CredentialStore::in_memory(), Arc::new(Store::new()))
    }

    /// Harness whose store was restored from an already persisted token.
    pub async fn restored(credentials: CredentialStore) -> Self {
        let store = Store::restore(&credentials, super::fixtures::now()).await;
        Self::with_parts(credentials, Arc::new(store))
    }

    fn with_parts(credentials: CredentialStore, store: Arc<Store>) -> Self {
        let gateway = Arc::new(MockGateway::default());
        let runner = Arc::new(
            EffectRunner::new(Arc::clone(&store), gateway.clone(), credentials.clone())
                .with_clock(super::fixtures::now),
        );

        Self {
            gateway,
            credentials,
            store,
            runner,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.store.select(|s| s.session.is_authenticated())
    }

    pub async fn persisted_token(&self) -> Option<String> {
        self.credentials.load().await
    }

    /// Let spawned tasks reach their next suspension point.
    pub async fn settle(&self) {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }
}
