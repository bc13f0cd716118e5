// src/i18n/loader.rs  —  DictionarySource trait + HTTP / directory / memory sources
use std::collections::HashMap;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use super::{Dictionary, LangCode};

/// Why a dictionary could not be loaded. Never escapes the translator:
/// `load_dictionary` logs it and yields `None`.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("request failed: {0}")]
    Http(String),
    #[error("server answered HTTP {0}")]
    Status(u16),
    #[error("reading {path:?}: {source}")]
    Io { path: PathBuf, #[source] source: std::io::Error },
    #[error("invalid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("dictionary root is not a JSON object")]
    NotAnObject,
    #[error("no dictionary for '{0}'")]
    Missing(String),
}

/// `{base}/i18n/{lang}.json` with exactly one slash between base and `i18n`
pub fn resource_path(base: &str, lang: &LangCode) -> String {
    format!("{}/i18n/{}.json", base.trim_end_matches('/'), lang)
}

/// Where dictionaries come from (the `fetch` of the browser version)
pub trait DictionarySource: Send + Sync {
    /// Fetch and parse the dictionary for `lang` under `base`
    fn fetch(&self, base: &str, lang: &LangCode) -> impl Future<Output = Result<Dictionary, LoadError>> + Send;
    /// Human-readable location, for log lines
    fn describe(&self, base: &str, lang: &LangCode) -> String;
}

/// Load a dictionary, absorbing every failure into `None`
pub async fn load_dictionary<S: DictionarySource>(source: &S, base: &str, lang: &LangCode) -> Option<Dictionary> {
    match source.fetch(base, lang).await {
        Ok(dict) => {
            log::info!("[loader] loaded '{}' from {}", lang, source.describe(base, lang));
            Some(dict)
        }
        Err(e) => {
            log::error!("[loader] Error loading translations from {}: {e}", source.describe(base, lang));
            None
        }
    }
}

// ── HTTP ──────────────────────────────────────────────────────────────────────
#[cfg(feature = "fetch-http")]
pub struct HttpSource {
    client: reqwest::Client,
    origin: String,
}

#[cfg(feature = "fetch-http")]
impl HttpSource {
    /// `origin` is scheme + host (+ optional port), e.g. `https://example.org`
    pub fn new(origin: &str) -> Result<Self, LoadError> {
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::limited(10))
            .user_agent(concat!("pusho-i18n/", env!("CARGO_PKG_VERSION")))
            .timeout(std::time::Duration::from_secs(15))
            .build()
            .map_err(|e| LoadError::Http(e.to_string()))?;
        Ok(Self { client, origin: origin.trim_end_matches('/').to_string() })
    }

    /// Absolute URL of the dictionary. A base that is itself an absolute URL
    /// is used as-is.
    pub fn url(&self, base: &str, lang: &LangCode) -> String {
        let path = resource_path(base, lang);
        if path.starts_with("http://") || path.starts_with("https://") {
            path
        } else if path.starts_with('/') {
            format!("{}{}", self.origin, path)
        } else {
            format!("{}/{}", self.origin, path)
        }
    }
}

#[cfg(feature = "fetch-http")]
impl DictionarySource for HttpSource {
    async fn fetch(&self, base: &str, lang: &LangCode) -> Result<Dictionary, LoadError> {
        let url = self.url(base, lang);
        let response = self.client
            .get(&url)
            .send()
            .await
            .map_err(|e| LoadError::Http(e.to_string()))?;
        if !response.status().is_success() {
            return Err(LoadError::Status(response.status().as_u16()));
        }
        let body = response.text().await.map_err(|e| LoadError::Http(e.to_string()))?;
        Dictionary::from_json(&body)
    }

    fn describe(&self, base: &str, lang: &LangCode) -> String { self.url(base, lang) }
}

// ── Local directory ───────────────────────────────────────────────────────────
/// Reads `{root}/i18n/{lang}.json`. `root` is the directory the site's base
/// URL maps to, so the base itself is not part of the path.
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self { Self { root: root.into() } }

    pub fn root(&self) -> &Path { &self.root }

    pub fn path_for(&self, lang: &LangCode) -> PathBuf {
        self.root.join("i18n").join(format!("{lang}.json"))
    }
}

impl DictionarySource for DirSource {
    async fn fetch(&self, _base: &str, lang: &LangCode) -> Result<Dictionary, LoadError> {
        let path = self.path_for(lang);
        let raw = tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| LoadError::Io { path: path.clone(), source })?;
        Dictionary::from_json(&raw)
    }

    fn describe(&self, _base: &str, lang: &LangCode) -> String {
        self.path_for(lang).display().to_string()
    }
}

// ── In-memory ─────────────────────────────────────────────────────────────────
/// Raw JSON per language, parsed on every fetch. Counts fetches so callers
/// can observe that a no-op switch never touched the source.
#[derive(Default)]
pub struct MemorySource {
    raw:     HashMap<String, String>,
    fetches: AtomicUsize,
}

impl MemorySource {
    pub fn new() -> Self { Self::default() }

    pub fn with(mut self, lang: &str, json: &str) -> Self {
        self.raw.insert(lang.to_string(), json.to_string());
        self
    }

    pub fn fetch_count(&self) -> usize { self.fetches.load(Ordering::SeqCst) }
}

impl DictionarySource for MemorySource {
    async fn fetch(&self, _base: &str, lang: &LangCode) -> Result<Dictionary, LoadError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        match self.raw.get(lang.as_str()) {
            Some(raw) => Dictionary::from_json(raw),
            None      => Err(LoadError::Missing(lang.to_string())),
        }
    }

    fn describe(&self, _base: &str, lang: &LangCode) -> String { format!("memory:{lang}") }
}

// ── Runtime-selected source ───────────────────────────────────────────────────
/// The source the binary picks from config (`--origin` / `--site-root`)
pub enum AnySource {
    #[cfg(feature = "fetch-http")]
    Http(HttpSource),
    Dir(DirSource),
    Memory(MemorySource),
}

impl DictionarySource for AnySource {
    async fn fetch(&self, base: &str, lang: &LangCode) -> Result<Dictionary, LoadError> {
        match self {
            #[cfg(feature = "fetch-http")]
            AnySource::Http(s)   => s.fetch(base, lang).await,
            AnySource::Dir(s)    => s.fetch(base, lang).await,
            AnySource::Memory(s) => s.fetch(base, lang).await,
        }
    }

    fn describe(&self, base: &str, lang: &LangCode) -> String {
        match self {
            #[cfg(feature = "fetch-http")]
            AnySource::Http(s)   => s.describe(base, lang),
            AnySource::Dir(s)    => s.describe(base, lang),
            AnySource::Memory(s) => s.describe(base, lang),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(s: &str) -> LangCode { LangCode::parse(s).unwrap() }

    #[test]
    fn resource_path_joins_with_single_slash() {
        assert_eq!(resource_path("/pusho-website/", &code("en")), "/pusho-website/i18n/en.json");
        assert_eq!(resource_path("/pusho-website", &code("it")), "/pusho-website/i18n/it.json");
        assert_eq!(resource_path("/", &code("en")), "/i18n/en.json");
        assert_eq!(resource_path("", &code("en")), "/i18n/en.json");
    }

    #[cfg(feature = "fetch-http")]
    #[test]
    fn http_url_forms() {
        let src = HttpSource::new("https://example.org/").unwrap();
        assert_eq!(src.url("/pusho-website/", &code("en")), "https://example.org/pusho-website/i18n/en.json");
        assert_eq!(src.url("site/", &code("en")), "https://example.org/site/i18n/en.json");
        assert_eq!(src.url("https://cdn.example.net/x/", &code("it")), "https://cdn.example.net/x/i18n/it.json");
    }

    /// Answer `times` requests with a fixed response; yields the request lines
    #[cfg(feature = "fetch-http")]
    async fn serve(status: &'static str, body: &'static str, times: usize)
        -> (std::net::SocketAddr, tokio::task::JoinHandle<Vec<String>>)
    {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let mut requests = Vec::new();
            for _ in 0..times {
                let (mut sock, _) = listener.accept().await.unwrap();
                let mut raw = Vec::new();
                let mut buf = [0u8; 1024];
                while !raw.windows(4).any(|w| w == b"\r\n\r\n") {
                    let n = sock.read(&mut buf).await.unwrap();
                    if n == 0 { break; }
                    raw.extend_from_slice(&buf[..n]);
                }
                let text = String::from_utf8_lossy(&raw);
                requests.push(text.lines().next().unwrap_or_default().to_string());
                let response = format!(
                    "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                sock.write_all(response.as_bytes()).await.unwrap();
                let _ = sock.shutdown().await;
            }
            requests
        });
        (addr, handle)
    }

    #[cfg(feature = "fetch-http")]
    #[tokio::test]
    async fn http_source_loads_ok_response() {
        let (addr, server) = serve("200 OK", r#"{"nav":{"home":"Home"}}"#, 1).await;
        let src = HttpSource::new(&format!("http://{addr}")).unwrap();
        let dict = load_dictionary(&src, "/pusho-website/", &code("en")).await.unwrap();
        assert_eq!(dict.lookup("nav.home"), Some("Home"));
        assert_eq!(server.await.unwrap(), vec!["GET /pusho-website/i18n/en.json HTTP/1.1".to_string()]);
    }

    #[cfg(feature = "fetch-http")]
    #[tokio::test]
    async fn http_source_not_found_is_status_error() {
        let (addr, server) = serve("404 Not Found", "{}", 2).await;
        let src = HttpSource::new(&format!("http://{addr}")).unwrap();
        assert!(matches!(src.fetch("/pusho-website/", &code("it")).await, Err(LoadError::Status(404))));
        assert!(load_dictionary(&src, "/pusho-website/", &code("it")).await.is_none());
        server.await.unwrap();
    }

    #[cfg(feature = "fetch-http")]
    #[tokio::test]
    async fn http_source_bad_body_is_parse_error() {
        let (addr, server) = serve("200 OK", "<html>oops</html>", 1).await;
        let src = HttpSource::new(&format!("http://{addr}")).unwrap();
        assert!(matches!(src.fetch("/", &code("en")).await, Err(LoadError::Parse(_))));
        server.await.unwrap();
    }

    #[cfg(feature = "fetch-http")]
    #[tokio::test]
    async fn http_source_refused_connection_is_http_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let src = HttpSource::new(&format!("http://{addr}")).unwrap();
        assert!(matches!(src.fetch("/", &code("en")).await, Err(LoadError::Http(_))));
        assert!(load_dictionary(&src, "/", &code("en")).await.is_none());
    }

    #[tokio::test]
    async fn dir_source_reads_language_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("i18n")).unwrap();
        std::fs::write(dir.path().join("i18n/en.json"), r#"{"nav":{"home":"Home"}}"#).unwrap();

        let src = DirSource::new(dir.path());
        let dict = load_dictionary(&src, "/pusho-website/", &code("en")).await.unwrap();
        assert_eq!(dict.lookup("nav.home"), Some("Home"));
        assert!(load_dictionary(&src, "/pusho-website/", &code("it")).await.is_none());
    }

    #[tokio::test]
    async fn parse_failure_yields_none() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("i18n")).unwrap();
        std::fs::write(dir.path().join("i18n/en.json"), "{ not json").unwrap();
        let src = DirSource::new(dir.path());
        assert!(load_dictionary(&src, "/", &code("en")).await.is_none());
    }

    #[tokio::test]
    async fn memory_source_counts_fetches() {
        let src = MemorySource::new().with("en", r#"{"a":"b"}"#);
        assert!(load_dictionary(&src, "/", &code("en")).await.is_some());
        assert!(load_dictionary(&src, "/", &code("it")).await.is_none());
        assert_eq!(src.fetch_count(), 2);
    }
}
