use std::sync::Arc;

use auth::SigningKey;
use auth::TokenService;
use emr_service::inbound::http::router::create_router;
use emr_service::outbound::repositories::InMemoryCredentialStore;
use emr_service::role::models::RoleName;
use emr_service::role::resolver::RoleResolver;
use emr_service::user::authenticator::Authenticator;
use emr_service::user::provisioner::AccountProvisioner;

const TEST_SECRET: &[u8] = b"test-secret-key-for-jwt-signing-at-least-32-bytes";

/// Test application that spawns a real server over an in-memory store
pub struct TestApp {
    pub address: String,
    pub store: Arc<InMemoryCredentialStore>,
    pub api_client: reqwest::Client,
    pub tokens: Arc<TokenService>,
}

impl TestApp {
    /// Spawn the application with every role reference row present
    pub async fn spawn() -> Self {
        Self::spawn_with(InMemoryCredentialStore::seeded()).await
    }

    /// Spawn the application with only the given role reference rows
    pub async fn spawn_with_roles(names: &[RoleName]) -> Self {
        Self::spawn_with(InMemoryCredentialStore::with_roles(names)).await
    }

    async fn spawn_with(store: InMemoryCredentialStore) -> Self {
        // Use random port (0 = OS assigns)
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let store = Arc::new(store);
        let tokens = Arc::new(TokenService::new(
            SigningKey::from_secret(TEST_SECRET).expect("Test secret too short"),
            chrono::Duration::hours(24),
        ));

        let role_resolver = Arc::new(RoleResolver::new(Arc::clone(&store)));
        role_resolver
            .preload()
            .await
            .expect("Failed to preload roles");

        let provisioner = Arc::new(AccountProvisioner::new(Arc::clone(&store), role_resolver));
        let authenticator = Arc::new(Authenticator::new(Arc::clone(&store), Arc::clone(&tokens)));

        let router = create_router(provisioner, authenticator, Arc::clone(&tokens));

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Server error");
        });

        Self {
            address,
            store,
            api_client: reqwest::Client::new(),
            tokens,
        }
    }

    /// Helper to make POST request
    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.post(&format!("{}{}", self.address, path))
    }

    /// Helper to make POST request with Bearer token
    pub fn post_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.post(path).bearer_auth(token)
    }

    /// Register an account through the public signup route
    pub async fn signup(&self, body: serde_json::Value) -> reqwest::Response {
        self.post("/api/auth/signup")
            .json(&body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Log in and return the raw response
    pub async fn login(&self, username: &str, password: &str) -> reqwest::Response {
        self.post("/api/auth/login")
            .json(&serde_json::json!({
                "username": username,
                "password": password
            }))
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Log in and return the issued token
    pub async fn login_token(&self, username: &str, password: &str) -> String {
        let body: serde_json::Value = self
            .login(username, password)
            .await
            .json()
            .await
            .expect("Failed to parse response");
        body["token"]
            .as_str()
            .expect("Login response missing token")
            .to_string()
    }
}
