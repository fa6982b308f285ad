use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, SET_COOKIE};
use reqwest::Client;
use std::time::Duration;
use tracing::{info, warn};

/// Session cookie an x-ui panel sets on a successful login.
pub const DEFAULT_SESSION_COOKIE: &str = "x-ui";
pub const DEFAULT_LOGIN_TIMEOUT: Duration = Duration::from_secs(7);

/// Live check of panel credentials. Implementations never fail: anything other than a
/// confirmed login is `false`.
#[async_trait]
pub trait PanelVerifier: Send + Sync {
    async fn test_connection(&self, url: &str, username: &str, password: &str) -> bool;
}

/// Logs in to an x-ui style panel the way its web UI does.
#[derive(Clone)]
pub struct XuiPanelClient {
    client: Client,
    cookie_prefix: String,
}

impl XuiPanelClient {
    pub fn new(timeout: Duration, cookie_name: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build panel HTTP client")?;
        Ok(Self {
            client,
            cookie_prefix: format!("{}=", cookie_name),
        })
    }

    fn login_url(base_url: &str) -> String {
        format!("{}/login", base_url.trim_end_matches('/'))
    }

    fn has_session_cookie(&self, headers: &HeaderMap) -> bool {
        headers
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .any(|cookie| cookie.trim_start().starts_with(&self.cookie_prefix))
    }
}

#[async_trait]
impl PanelVerifier for XuiPanelClient {
    async fn test_connection(&self, url: &str, username: &str, password: &str) -> bool {
        let login_url = Self::login_url(url);

        let response = match self
            .client
            .post(&login_url)
            .form(&[("username", username), ("password", password)])
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) if e.is_timeout() => {
                warn!("Panel login at {} timed out", login_url);
                return false;
            }
            Err(e) => {
                warn!("Failed to reach panel at {}: {}", login_url, e);
                return false;
            }
        };

        let status = response.status();
        if !status.is_success() {
            warn!("Panel login at {} rejected with status {}", login_url, status);
            return false;
        }

        if self.has_session_cookie(response.headers()) {
            info!("Connected to panel at {}", url);
            true
        } else {
            warn!(
                "Panel login at {} returned {} but no '{}' cookie",
                login_url,
                status,
                self.cookie_prefix.trim_end_matches('=')
            );
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header, StatusCode};
    use axum::response::{AppendHeaders, IntoResponse, Response};
    use axum::routing::post;
    use axum::{Form, Router};
    use std::collections::HashMap;

    async fn login(Form(form): Form<HashMap<String, String>>) -> Response {
        let ok = form.get("username").map(String::as_str) == Some("admin")
            && form.get("password").map(String::as_str) == Some("s3cret");
        if ok {
            (
                AppendHeaders([
                    (header::SET_COOKIE, "lang=en-US; Path=/"),
                    (header::SET_COOKIE, "x-ui=MTcwMDAw; Path=/; HttpOnly"),
                ]),
                r#"{"success":true}"#,
            )
                .into_response()
        } else {
            (
                [(header::SET_COOKIE, "x-ui-lang=en; Path=/")],
                r#"{"success":false}"#,
            )
                .into_response()
        }
    }

    async fn spawn_panel(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn client(timeout: Duration) -> XuiPanelClient {
        XuiPanelClient::new(timeout, DEFAULT_SESSION_COOKIE).unwrap()
    }

    #[test]
    fn login_url_has_single_slash() {
        assert_eq!(
            XuiPanelClient::login_url("https://p.example:2053/base/"),
            "https://p.example:2053/base/login"
        );
        assert_eq!(
            XuiPanelClient::login_url("https://p.example"),
            "https://p.example/login"
        );
    }

    #[tokio::test]
    async fn session_cookie_means_connected() {
        let base = spawn_panel(Router::new().route("/base/login", post(login))).await;
        let panel = client(DEFAULT_LOGIN_TIMEOUT);

        assert!(
            panel
                .test_connection(&format!("{}/base", base), "admin", "s3cret")
                .await
        );
    }

    #[tokio::test]
    async fn missing_cookie_means_not_connected() {
        let base = spawn_panel(Router::new().route("/base/login", post(login))).await;
        let panel = client(DEFAULT_LOGIN_TIMEOUT);

        assert!(
            !panel
                .test_connection(&format!("{}/base", base), "admin", "wrong")
                .await
        );
    }

    #[tokio::test]
    async fn error_status_means_not_connected() {
        let app = Router::new().route(
            "/login",
            post(|| async {
                (
                    StatusCode::NOT_FOUND,
                    [(header::SET_COOKIE, "x-ui=abc; Path=/")],
                )
            }),
        );
        let base = spawn_panel(app).await;

        assert!(
            !client(DEFAULT_LOGIN_TIMEOUT)
                .test_connection(&base, "admin", "s3cret")
                .await
        );
    }

    #[tokio::test]
    async fn unreachable_panel_means_not_connected() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        assert!(
            !client(Duration::from_secs(2))
                .test_connection(&format!("http://{}", addr), "admin", "s3cret")
                .await
        );
    }

    #[tokio::test]
    async fn slow_panel_times_out() {
        let app = Router::new().route(
            "/login",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(3)).await;
                [(header::SET_COOKIE, "x-ui=late; Path=/")]
            }),
        );
        let base = spawn_panel(app).await;

        assert!(
            !client(Duration::from_millis(200))
                .test_connection(&base, "admin", "s3cret")
                .await
        );
    }

    #[tokio::test]
    async fn custom_cookie_name() {
        let app = Router::new().route(
            "/login",
            post(|| async { [(header::SET_COOKIE, "3x-ui=abc; Path=/")] }),
        );
        let base = spawn_panel(app).await;

        let panel = XuiPanelClient::new(DEFAULT_LOGIN_TIMEOUT, "3x-ui").unwrap();
        assert!(panel.test_connection(&base, "admin", "s3cret").await);
        assert!(
            !client(DEFAULT_LOGIN_TIMEOUT)
                .test_connection(&base, "admin", "s3cret")
                .await
        );
    }
}
