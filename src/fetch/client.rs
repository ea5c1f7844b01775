//! Cookie-carrying HTTP client shared by every pipeline stage.
//!
//! `Fetcher` owns the portal session: one reqwest client with one cookie jar,
//! created once per run and borrowed by each component call. Calls are awaited
//! one at a time, so the jar never sees concurrent use.

use std::panic::{AssertUnwindSafe, catch_unwind, set_hook, take_hook};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::HeaderMap;
use reqwest::{Client, ClientBuilder, Proxy, RequestBuilder, Response};
use serde::Serialize;
use tracing::{debug, instrument, warn};
use url::Url;

use super::error::TransportError;
use crate::user_agent;

/// HTTP client plus the session cookie jar.
///
/// # Example
///
/// ```no_run
/// use std::time::Duration;
/// use manual_downloader::fetch::Fetcher;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let fetcher = Fetcher::new(Duration::from_secs(30))?;
/// let html = fetcher
///     .get_text("https://example.com/", Duration::from_secs(10))
///     .await?;
/// println!("{} bytes", html.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    jar: Arc<Jar>,
}

impl Fetcher {
    /// Creates a client with an empty cookie jar.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::ClientBuild`] if reqwest rejects the configuration.
    pub fn new(connect_timeout: Duration) -> Result<Self, TransportError> {
        Self::with_cookie_jar(Arc::new(Jar::default()), connect_timeout)
    }

    /// Creates a client around an existing cookie jar.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::ClientBuild`] if reqwest rejects the configuration.
    #[instrument(level = "debug", skip(jar))]
    pub fn with_cookie_jar(jar: Arc<Jar>, connect_timeout: Duration) -> Result<Self, TransportError> {
        let client = build_client(&jar, connect_timeout)?;
        Ok(Self { client, jar })
    }

    /// GETs `url` and returns the body as text.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] on network failure, timeout, non-2xx status
    /// or an unreadable body.
    #[instrument(level = "debug", skip(self, timeout))]
    pub async fn get_text(&self, url: &str, timeout: Duration) -> Result<String, TransportError> {
        let request = self.client.get(parse_url(url)?).timeout(timeout);
        let response = send(request, url).await?;
        read_text(response, url).await
    }

    /// POSTs a JSON body with extra headers and returns the response body as text.
    ///
    /// Decoding is left to the caller so malformed payloads are reported as
    /// decode failures rather than transport failures.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] on network failure, timeout, non-2xx status
    /// or an unreadable body.
    #[instrument(level = "debug", skip(self, headers, body, timeout))]
    pub async fn post_json<B>(
        &self,
        url: &str,
        headers: HeaderMap,
        body: &B,
        timeout: Duration,
    ) -> Result<String, TransportError>
    where
        B: Serialize + ?Sized,
    {
        let request = self
            .client
            .post(parse_url(url)?)
            .headers(headers)
            .json(body)
            .timeout(timeout);
        let response = send(request, url).await?;
        read_text(response, url).await
    }

    /// POSTs URL-encoded form fields with extra headers and returns the body as text.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] on network failure, timeout, non-2xx status
    /// or an unreadable body.
    #[instrument(level = "debug", skip(self, headers, form, timeout))]
    pub async fn post_form(
        &self,
        url: &str,
        headers: HeaderMap,
        form: &[(&str, &str)],
        timeout: Duration,
    ) -> Result<String, TransportError> {
        let request = self
            .client
            .post(parse_url(url)?)
            .headers(headers)
            .form(form)
            .timeout(timeout);
        let response = send(request, url).await?;
        read_text(response, url).await
    }

    /// GETs `url` and hands back the response with its body still unread.
    ///
    /// The status has already been checked; callers stream the body with
    /// `bytes_stream()`.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] on network failure, timeout or non-2xx status.
    #[instrument(level = "debug", skip(self, timeout))]
    pub async fn get_streaming(
        &self,
        url: &str,
        timeout: Duration,
    ) -> Result<Response, TransportError> {
        let request = self.client.get(parse_url(url)?).timeout(timeout);
        send(request, url).await
    }

    /// Returns the `Cookie` header the jar would send to `url`, if any.
    #[must_use]
    pub fn cookies_for(&self, url: &str) -> Option<String> {
        let url = Url::parse(url).ok()?;
        self.jar
            .cookies(&url)
            .and_then(|value| value.to_str().ok().map(ToString::to_string))
    }

    /// Returns the shared cookie jar.
    #[must_use]
    pub fn cookie_jar(&self) -> &Arc<Jar> {
        &self.jar
    }
}

// Some platforms panic inside reqwest's system proxy discovery. The first build
// is guarded; on panic the client is rebuilt from proxy env vars only.
fn build_client(jar: &Arc<Jar>, connect_timeout: Duration) -> Result<Client, TransportError> {
    match try_build_client(jar, connect_timeout, false) {
        Ok(result) => result,
        Err(()) => {
            warn!("HTTP client builder panicked loading system proxy settings; using env proxies");
            try_build_client(jar, connect_timeout, true)
                .map_err(|()| TransportError::ClientBuildPanicked)?
        }
    }
}

// catch_unwind still runs the panic hook, so the hook is silenced while a
// guarded build runs.
static CLIENT_BUILD_PANIC_HOOK_LOCK: Mutex<()> = Mutex::new(());

fn try_build_client(
    jar: &Arc<Jar>,
    connect_timeout: Duration,
    env_proxies_only: bool,
) -> Result<Result<Client, TransportError>, ()> {
    let jar = Arc::clone(jar);
    let _guard = CLIENT_BUILD_PANIC_HOOK_LOCK
        .lock()
        .unwrap_or_else(PoisonError::into_inner);
    let previous_hook = take_hook();
    set_hook(Box::new(|_| {}));
    let outcome = catch_unwind(AssertUnwindSafe(move || {
        let mut builder = Client::builder()
            .connect_timeout(connect_timeout)
            .gzip(true)
            .user_agent(user_agent::default_user_agent())
            .cookie_provider(jar);
        if env_proxies_only {
            builder = apply_env_proxies(builder.no_proxy());
        }
        builder
            .build()
            .map_err(|source| TransportError::ClientBuild { source })
    }));
    set_hook(previous_hook);
    outcome.map_err(|_| ())
}

fn apply_env_proxies(mut builder: ClientBuilder) -> ClientBuilder {
    if let Some(proxy) = first_env_var(&["HTTPS_PROXY", "https_proxy", "ALL_PROXY", "all_proxy"])
        && let Ok(resolved) = Proxy::https(&proxy)
    {
        builder = builder.proxy(resolved);
    }
    if let Some(proxy) = first_env_var(&["HTTP_PROXY", "http_proxy", "ALL_PROXY", "all_proxy"])
        && let Ok(resolved) = Proxy::http(&proxy)
    {
        builder = builder.proxy(resolved);
    }
    builder
}

fn first_env_var(names: &[&str]) -> Option<String> {
    names.iter().find_map(|name| {
        std::env::var(name)
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    })
}

fn parse_url(url: &str) -> Result<Url, TransportError> {
    Url::parse(url).map_err(|_| TransportError::invalid_url(url))
}

async fn send(request: RequestBuilder, url: &str) -> Result<Response, TransportError> {
    let response = request
        .send()
        .await
        .map_err(|e| TransportError::from_reqwest(url, e))?;

    let status = response.status();
    debug!(status = status.as_u16(), "response received");
    if !status.is_success() {
        return Err(TransportError::http_status(url, status.as_u16()));
    }
    Ok(response)
}

async fn read_text(response: Response, url: &str) -> Result<String, TransportError> {
    response
        .text()
        .await
        .map_err(|e| TransportError::from_reqwest(url, e))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_url_rejects_relative() {
        let err = parse_url("/relative/path").unwrap_err();
        assert!(matches!(err, TransportError::InvalidUrl { .. }));
    }

    #[test]
    fn test_cookies_for_reads_shared_jar() {
        let fetcher = Fetcher::new(Duration::from_secs(5)).unwrap();
        let url = Url::parse("https://portal.example/").unwrap();
        fetcher
            .cookie_jar()
            .add_cookie_str("ASP.NET_SessionId=abc123; Path=/", &url);

        let header = fetcher.cookies_for("https://portal.example/viewer").unwrap();
        assert!(header.contains("ASP.NET_SessionId=abc123"));
        assert!(fetcher.cookies_for("https://other.example/").is_none());
    }

    #[test]
    fn test_cookies_for_invalid_url_is_none() {
        let fetcher = Fetcher::new(Duration::from_secs(5)).unwrap();
        assert!(fetcher.cookies_for("not a url").is_none());
    }

    #[test]
    fn test_env_proxy_fallback_builds_client() {
        let jar = Arc::new(Jar::default());
        let result = try_build_client(&jar, Duration::from_secs(5), true);
        assert!(matches!(result, Ok(Ok(_))));
    }

    #[tokio::test]
    async fn test_get_text_invalid_url_fails_without_network() {
        let fetcher = Fetcher::new(Duration::from_secs(5)).unwrap();
        let result = fetcher.get_text("nope", Duration::from_secs(1)).await;
        assert!(matches!(result, Err(TransportError::InvalidUrl { .. })));
    }
}
