//! Row sources: where the poller gets its sheet data from

use async_trait::async_trait;
use leaderboard_engine::SheetData;
use reqwest::Client;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::config::SourceConfig;
use crate::error::{Result, ServiceError};

/// Anything that can produce the current `{headers, data}` sheet contents
#[async_trait]
pub trait RowSource: Send + Sync {
    async fn fetch(&self) -> Result<SheetData>;

    /// Short human-readable origin, for logs
    fn describe(&self) -> String;
}

#[async_trait]
impl<S: RowSource + ?Sized> RowSource for Box<S> {
    async fn fetch(&self) -> Result<SheetData> {
        (**self).fetch().await
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

#[async_trait]
impl<S: RowSource + ?Sized> RowSource for Arc<S> {
    async fn fetch(&self) -> Result<SheetData> {
        (**self).fetch().await
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

/// Build the source described by the configuration, cached when a TTL is set
pub fn build_source(config: &SourceConfig) -> Result<Box<dyn RowSource>> {
    let source: Box<dyn RowSource> = match (&config.url, &config.file) {
        (Some(url), None) => Box::new(HttpRowSource::new(url.clone(), config.request_timeout())?),
        (None, Some(path)) => Box::new(FileRowSource::new(path.clone())),
        (None, None) => return Err(ServiceError::NoSource),
        (Some(_), Some(_)) => {
            return Err(ServiceError::Config(
                "both a sheet URL and a payload file are configured".to_string(),
            ))
        }
    };

    if config.cache_ttl_ms == 0 {
        return Ok(source);
    }
    Ok(Box::new(CachedRowSource::new(source, config.cache_ttl())))
}

/// Decode a `{headers, data}` payload
pub(crate) fn decode_payload(body: &[u8]) -> Result<SheetData> {
    let sheet: SheetData = serde_json::from_slice(body)?;

    let missing = sheet.missing_columns();
    if !missing.is_empty() && !sheet.headers.is_empty() {
        warn!(
            "Sheet is missing leaderboard columns: {}",
            missing.join(", ")
        );
    }

    Ok(sheet)
}

/// Pull the `error` field out of an upstream error body
fn upstream_error_message(body: &[u8]) -> String {
    serde_json::from_slice::<serde_json::Value>(body)
        .ok()
        .and_then(|value| value.get("error")?.as_str().map(str::to_string))
        .unwrap_or_else(|| "Unknown error".to_string())
}

/// Fetches sheet data from an HTTP endpoint
pub struct HttpRowSource {
    client: Client,
    url: String,
}

impl HttpRowSource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl RowSource for HttpRowSource {
    async fn fetch(&self) -> Result<SheetData> {
        debug!("Fetching sheet data from {}", self.url);

        let response = self.client.get(&self.url).send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            return Err(ServiceError::UpstreamStatus {
                status: status.as_u16(),
                message: upstream_error_message(&body),
            });
        }

        let sheet = decode_payload(&body)?;
        debug!("Fetched {} rows from {}", sheet.data.len(), self.url);
        Ok(sheet)
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

/// Reads sheet data from a JSON file on disk
pub struct FileRowSource {
    path: PathBuf,
}

impl FileRowSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl RowSource for FileRowSource {
    async fn fetch(&self) -> Result<SheetData> {
        let body = tokio::fs::read(&self.path).await?;
        decode_payload(&body)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Serves the last successful fetch for `ttl` before asking the inner source again.
///
/// Failures are not cached. Concurrent callers share a single in-flight fetch.
pub struct CachedRowSource<S> {
    inner: S,
    ttl: Duration,
    cached: Mutex<Option<(Instant, SheetData)>>,
}

impl<S: RowSource> CachedRowSource<S> {
    pub fn new(inner: S, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            cached: Mutex::new(None),
        }
    }

    /// Drop the cached sheet so the next fetch goes to the inner source
    pub async fn invalidate(&self) {
        *self.cached.lock().await = None;
    }
}

#[async_trait]
impl<S: RowSource> RowSource for CachedRowSource<S> {
    async fn fetch(&self) -> Result<SheetData> {
        let mut cached = self.cached.lock().await;

        if let Some((fetched_at, sheet)) = cached.as_ref() {
            if fetched_at.elapsed() < self.ttl {
                debug!(
                    "Serving cached sheet data (age: {:?})",
                    fetched_at.elapsed()
                );
                return Ok(sheet.clone());
            }
        }

        let sheet = self.inner.fetch().await?;
        *cached = Some((Instant::now(), sheet.clone()));
        info!(
            "Refreshed sheet data from {} ({} rows)",
            self.inner.describe(),
            sheet.data.len()
        );
        Ok(sheet)
    }

    fn describe(&self) -> String {
        format!("{} (cached {:?})", self.inner.describe(), self.ttl)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{sheet, ScriptedSource};

    #[test]
    fn test_upstream_error_message() {
        assert_eq!(
            upstream_error_message(br#"{"error": "API Rate Limit Exceeded"}"#),
            "API Rate Limit Exceeded"
        );
        assert_eq!(
            upstream_error_message(b"<html>bad gateway</html>"),
            "Unknown error"
        );
        assert_eq!(
            upstream_error_message(br#"{"details": "no error key"}"#),
            "Unknown error"
        );
    }

    #[test]
    fn test_decode_payload() {
        let decoded = decode_payload(
            br#"{"headers": ["Team ID", "Problem", "Time", "Status"],
                 "data": [{"Team ID": "1", "Problem": "A",
                            "Time": 45746.25, "Status": "Correct"}]}"#,
        )
        .unwrap();
        assert_eq!(decoded.data.len(), 1);
        assert_eq!(decoded.data[0]["Time"], "45746.25");

        assert!(matches!(
            decode_payload(b"not json"),
            Err(ServiceError::Decode(_))
        ));
    }

    #[tokio::test]
    async fn test_file_source_reads_payload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rows.json");
        let payload = sheet(&[("1", "A", "2025-03-30 10:00:00", "Correct")]);
        std::fs::write(&path, serde_json::to_vec(&payload).unwrap()).unwrap();

        let source = FileRowSource::new(&path);
        assert_eq!(source.fetch().await.unwrap(), payload);
        assert_eq!(source.describe(), path.display().to_string());
    }

    #[tokio::test]
    async fn test_file_source_missing_file() {
        let source = FileRowSource::new("/nonexistent/leaderboard/rows.json");
        assert!(matches!(source.fetch().await, Err(ServiceError::Io(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cache_serves_within_ttl() {
        let first = sheet(&[("1", "A", "2025-03-30 10:00:00", "Correct")]);
        let second = sheet(&[("2", "A", "2025-03-30 09:00:00", "Correct")]);
        let responses = vec![Ok(first.clone()), Ok(second.clone())];
        let inner = Arc::new(ScriptedSource::new(responses));
        let cached = CachedRowSource::new(inner.clone(), Duration::from_secs(5));

        assert_eq!(cached.fetch().await.unwrap(), first);
        tokio::time::advance(Duration::from_secs(4)).await;
        assert_eq!(cached.fetch().await.unwrap(), first);
        assert_eq!(inner.calls(), 1);

        tokio::time::advance(Duration::from_secs(2)).await;
        assert_eq!(cached.fetch().await.unwrap(), second);
        assert_eq!(inner.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cache_does_not_keep_failures() {
        let rows = sheet(&[("1", "A", "2025-03-30 10:00:00", "Correct")]);
        let inner = Arc::new(ScriptedSource::new(vec![
            Err(ServiceError::UpstreamStatus {
                status: 429,
                message: "slow down".to_string(),
            }),
            Ok(rows.clone()),
        ]));
        let cached = CachedRowSource::new(inner.clone(), Duration::from_secs(5));

        assert!(cached.fetch().await.is_err());
        assert_eq!(cached.fetch().await.unwrap(), rows);
        assert_eq!(inner.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cache_invalidate() {
        let first = sheet(&[("1", "A", "2025-03-30 10:00:00", "Correct")]);
        let second = sheet(&[("1", "B", "2025-03-30 11:00:00", "Correct")]);
        let inner = Arc::new(ScriptedSource::new(vec![Ok(first), Ok(second.clone())]));
        let cached = CachedRowSource::new(inner.clone(), Duration::from_secs(5));

        cached.fetch().await.unwrap();
        cached.invalidate().await;
        assert_eq!(cached.fetch().await.unwrap(), second);
    }

    #[test]
    fn test_build_source_requires_exactly_one_origin() {
        assert!(matches!(
            build_source(&SourceConfig::default()),
            Err(ServiceError::NoSource)
        ));

        let both = SourceConfig {
            url: Some("http://example.test/sheet".to_string()),
            file: Some(PathBuf::from("rows.json")),
            ..SourceConfig::default()
        };
        assert!(matches!(build_source(&both), Err(ServiceError::Config(_))));

        let file_only = SourceConfig {
            file: Some(PathBuf::from("rows.json")),
            cache_ttl_ms: 0,
            ..SourceConfig::default()
        };
        assert_eq!(build_source(&file_only).unwrap().describe(), "rows.json");

        let cached = SourceConfig {
            file: Some(PathBuf::from("rows.json")),
            ..SourceConfig::default()
        };
        let described = build_source(&cached).unwrap().describe();
        assert!(described.starts_with("rows.json (cached"));
    }
}
