#![allow(dead_code)]

use std::net::TcpListener;
use std::sync::Arc;

use chirpy::auth::{hash_password, AccessTokenCodec, ApiKey};
use chirpy::session::SessionManager;
use chirpy::startup::{run, AppState};
use chirpy::store::{MemoryStore, UserRecord};

pub const JWT_SECRET: &str = "integration-test-secret-at-least-32-chars";
pub const API_KEY: &str = "f271c81ff7084ee5b99a5091b42d486e";

pub struct TestApp {
    pub address: String,
    pub store: Arc<MemoryStore>,
    pub codec: AccessTokenCodec,
    pub client: reqwest::Client,
}

pub fn spawn_app() -> TestApp {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    let store = Arc::new(MemoryStore::new());
    let codec = AccessTokenCodec::new(JWT_SECRET);
    let state = AppState {
        sessions: SessionManager::new(store.clone(), store.clone(), codec.clone()),
        users: store.clone(),
        api_key: ApiKey::new(API_KEY),
    };

    let server = run(listener, state).expect("Failed to bind address");
    let _ = tokio::spawn(server);

    TestApp {
        address,
        store,
        codec,
        client: reqwest::Client::new(),
    }
}

impl TestApp {
    pub fn create_user(&self, email: &str, password: &str) -> UserRecord {
        let hash = hash_password(password).expect("Failed to hash password");
        self.store
            .insert_user(email, &hash)
            .expect("Failed to insert user")
    }

    pub async fn post_login(&self, email: &str, password: &str) -> reqwest::Response {
        self.client
            .post(&format!("{}/api/login", &self.address))
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn post_with_authorization(&self, path: &str, authorization: &str) -> reqwest::Response {
        self.client
            .post(&format!("{}{}", &self.address, path))
            .header("Authorization", authorization)
            .send()
            .await
            .expect("Failed to execute request")
    }
}
