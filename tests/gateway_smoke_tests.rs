/// Live smoke checks against a running gateway instance.
///
/// Run with the server up on GATEWAY_BASE_URL (default http://localhost:3000):
///
///   cargo run -p gateway-smoke-tests --bin gateway_smoke
///
/// Set SMOKE_EMAIL / SMOKE_PASSWORD to also exercise the login flow with a
/// real account; without them only the unauthenticated contract is checked.

use reqwest::{redirect::Policy, Client, StatusCode};
use serde_json::{json, Value};

struct SmokeClient {
    client: Client,
    base_url: String,
    session_cookies: Vec<String>,
}

impl SmokeClient {
    fn new() -> Self {
        let base_url = std::env::var("GATEWAY_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:3000".to_string());

        Self {
            // Redirects stay visible: the gate contract is the 302 itself.
            client: Client::builder()
                .redirect(Policy::none())
                .build()
                .expect("client builds"),
            base_url,
            session_cookies: Vec::new(),
        }
    }

    fn cookie_header(&self) -> String {
        self.session_cookies.join("; ")
    }

    async fn get(&self, path: &str) -> reqwest::Response {
        self.client
            .get(format!("{}{}", self.base_url, path))
            .header("cookie", self.cookie_header())
            .send()
            .await
            .expect("request sends")
    }

    async fn post(&mut self, path: &str, body: Value) -> reqwest::Response {
        let response = self
            .client
            .post(format!("{}{}", self.base_url, path))
            .header("cookie", self.cookie_header())
            .json(&body)
            .send()
            .await
            .expect("request sends");

        for value in response.headers().get_all("set-cookie") {
            if let Ok(cookie) = value.to_str() {
                if let Some(pair) = cookie.split(';').next() {
                    self.session_cookies.push(pair.to_string());
                }
            }
        }

        response
    }
}

fn check(name: &str, ok: bool) -> bool {
    if ok {
        println!("✅ {}", name);
    } else {
        println!("❌ {}", name);
    }
    ok
}

#[tokio::main]
async fn main() {
    let mut client = SmokeClient::new();
    let mut all_ok = true;

    let response = client.get("/").await;
    all_ok &= check("landing page is public", response.status() == StatusCode::OK);

    let response = client.get("/api/health").await;
    all_ok &= check("health check is public", response.status() == StatusCode::OK);

    let response = client.get("/dashboard").await;
    let redirected_to_login = response.status() == StatusCode::FOUND
        && response
            .headers()
            .get("location")
            .and_then(|v| v.to_str().ok())
            == Some("/login");
    all_ok &= check("unauthenticated dashboard redirects to /login", redirected_to_login);

    let response = client.post("/auth/signup", json!({ "email": "x@y.z" })).await;
    all_ok &= check("signup is permanently disabled", response.status() == StatusCode::FORBIDDEN);

    let response = client.get("/auth/session").await;
    let signed_out = response.status() == StatusCode::OK
        && response
            .json::<Value>()
            .await
            .map(|v| v["phase"] == "signed_out")
            .unwrap_or(false);
    all_ok &= check("session snapshot reports signed_out", signed_out);

    let email = std::env::var("SMOKE_EMAIL").ok();
    let password = std::env::var("SMOKE_PASSWORD").ok();
    if let (Some(email), Some(password)) = (email, password) {
        let response = client
            .post("/auth/login", json!({ "email": email, "password": password }))
            .await;
        all_ok &= check("login succeeds", response.status() == StatusCode::OK);

        let response = client.get("/auth/session").await;
        let resolved = response.status() == StatusCode::OK
            && response
                .json::<Value>()
                .await
                .map(|v| v["phase"] == "profile_resolved")
                .unwrap_or(false);
        all_ok &= check("session snapshot resolves the profile", resolved);

        let response = client.post("/auth/logout", json!({})).await;
        all_ok &= check("logout succeeds", response.status() == StatusCode::OK);
    } else {
        println!("(skipping login flow: SMOKE_EMAIL / SMOKE_PASSWORD not set)");
    }

    if !all_ok {
        std::process::exit(1);
    }
}
