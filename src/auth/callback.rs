//! Loopback listener for the OAuth return redirect.
//!
//! After the user finishes the consent screen, the backend redirects the
//! browser to the application origin with the session token in the query
//! string. For a terminal client that origin is a short-lived HTTP
//! listener on localhost; it accepts a single redirect, hands the full
//! URL back to the session layer, and shows the user a close-this-tab
//! page.

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use tiny_http::{Header, Response, Server, StatusCode};
use tokio::sync::oneshot;
use url::Url;

/// Poll interval while waiting for the redirect
const ACCEPT_POLL_MS: u64 = 500;

/// Page shown in the browser once the redirect has been captured
const LANDING_HTML: &str = r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>mayl</title></head>
<body style="font-family: sans-serif; text-align: center; padding-top: 4em;">
  <h1>mayl</h1>
  <p>Sign-in complete. You can close this tab and return to the terminal.</p>
</body>
</html>"#;

/// Bind the redirect listener. Done before the browser is opened so the
/// redirect cannot race the listener.
pub fn bind(port: u16) -> Result<Server> {
    let addr = format!("127.0.0.1:{}", port);
    Server::http(&addr)
        .map_err(|e| anyhow::anyhow!("could not listen on {} for the sign-in redirect: {}", addr, e))
}

/// Wait for the browser redirect and forward the return URL.
///
/// Runs on a plain thread (tiny_http is blocking). Gives up at `timeout`,
/// dropping the sender so the caller observes a closed channel and the
/// port is released for a retry.
pub fn wait_for_redirect(server: Server, tx: oneshot::Sender<Url>, timeout: Duration) -> Result<()> {
    let port = server
        .server_addr()
        .to_ip()
        .map(|addr| addr.port())
        .unwrap_or(0);
    let deadline = Instant::now() + timeout;
    let mut tx = Some(tx);

    loop {
        if Instant::now() >= deadline {
            return Ok(());
        }

        let request = match server
            .recv_timeout(Duration::from_millis(ACCEPT_POLL_MS))
            .context("redirect listener failed")?
        {
            Some(request) => request,
            None => continue,
        };

        // Browsers also probe the listener for a favicon
        if request.url().starts_with("/favicon") {
            let _ = request.respond(Response::empty(StatusCode(404)));
            continue;
        }

        let return_url = Url::parse(&format!("http://localhost:{}{}", port, request.url()))
            .context("failed to parse redirect URL")?;

        let mut response = Response::from_string(LANDING_HTML);
        if let Ok(header) = Header::from_bytes(&b"Content-Type"[..], &b"text/html; charset=utf-8"[..]) {
            response = response.with_header(header);
        }
        request
            .respond(response)
            .context("failed to respond to redirect request")?;

        if let Some(tx) = tx.take() {
            let _ = tx.send(return_url);
        }
        return Ok(());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_redirect_is_forwarded_with_query_intact() {
        let server = Server::http("127.0.0.1:0").expect("failed to bind listener");
        let port = server.server_addr().to_ip().unwrap().port();

        let (tx, rx) = oneshot::channel();
        std::thread::spawn(move || wait_for_redirect(server, tx, Duration::from_secs(5)));

        let response = reqwest::get(format!("http://127.0.0.1:{}/mail?token=tok-xyz", port))
            .await
            .expect("redirect request failed");
        assert!(response.status().is_success());

        let url = rx.await.expect("listener dropped the sender");
        assert_eq!(url.path(), "/mail");
        assert!(url.query_pairs().any(|(k, v)| k == "token" && v == "tok-xyz"));
    }

    #[tokio::test]
    async fn test_listener_times_out_and_releases_the_port() {
        let server = Server::http("127.0.0.1:0").expect("failed to bind listener");

        let (tx, rx) = oneshot::channel();
        let handle =
            std::thread::spawn(move || wait_for_redirect(server, tx, Duration::from_millis(100)));

        // No redirect arrives; the sender is dropped on timeout
        assert!(rx.await.is_err());
        handle.join().unwrap().unwrap();
    }
}
