//! Engine scheduling tests with instrumented in-process transports.
//!
//! No sockets are involved; every transport here is a test double.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::{StreamExt, stream};
use harvester_core::{
    DownloadConfig, DownloadEngine, DownloadError, FailureKind, Transport, TransportResponse,
};
use tempfile::TempDir;

/// Records how many `get` calls overlap.
#[derive(Default)]
struct GaugeTransport {
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    calls: AtomicUsize,
}

#[async_trait]
impl Transport for GaugeTransport {
    async fn get(&self, url: &str, _user_agent: &str) -> Result<TransportResponse, DownloadError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        tokio::time::sleep(Duration::from_millis(20)).await;

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        let body = Bytes::from(url.as_bytes().to_vec());
        Ok(TransportResponse::new(
            200,
            stream::iter([Ok(body)]).boxed(),
        ))
    }
}

/// Never answers.
struct HangingTransport;

#[async_trait]
impl Transport for HangingTransport {
    async fn get(&self, _url: &str, _user_agent: &str) -> Result<TransportResponse, DownloadError> {
        std::future::pending().await
    }
}

/// Panics for URLs containing "boom".
struct PanickyTransport;

#[async_trait]
impl Transport for PanickyTransport {
    async fn get(&self, url: &str, _user_agent: &str) -> Result<TransportResponse, DownloadError> {
        assert!(!url.contains("boom"), "transport exploded on {url}");
        Ok(TransportResponse::new(
            200,
            stream::iter([Ok(Bytes::from_static(b"fine"))]).boxed(),
        ))
    }
}

fn config_for(dir: &TempDir, concurrency: usize) -> DownloadConfig {
    DownloadConfig {
        concurrency,
        verbose: false,
        ..DownloadConfig::for_output_dir(dir.path())
    }
}

fn urls(count: usize) -> Vec<String> {
    (0..count)
        .map(|i| format!("https://img.example/{i}.png"))
        .collect()
}

#[tokio::test]
async fn test_in_flight_transfers_never_exceed_limit() {
    let temp_dir = TempDir::new().unwrap();
    let transport = Arc::new(GaugeTransport::default());
    let engine = DownloadEngine::new(config_for(&temp_dir, 3), transport.clone()).unwrap();

    let outcomes = engine.run_batch(&urls(20)).await;

    assert!(outcomes.iter().all(|o| o.success));
    assert_eq!(transport.calls.load(Ordering::SeqCst), 20);
    let max = transport.max_in_flight.load(Ordering::SeqCst);
    assert!(max <= 3, "limit exceeded: {max} transfers overlapped");
    assert!(max >= 2, "transfers never overlapped");
}

#[tokio::test]
async fn test_concurrency_one_serializes_transfers() {
    let temp_dir = TempDir::new().unwrap();
    let transport = Arc::new(GaugeTransport::default());
    let engine = DownloadEngine::new(config_for(&temp_dir, 1), transport.clone()).unwrap();

    engine.run_batch(&urls(5)).await;

    assert_eq!(transport.max_in_flight.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_payload_written_per_item() {
    let temp_dir = TempDir::new().unwrap();
    let engine =
        DownloadEngine::new(config_for(&temp_dir, 4), Arc::new(GaugeTransport::default()))
            .unwrap();
    let urls = urls(6);

    let outcomes = engine.run_batch(&urls).await;

    for (index, outcome) in outcomes.iter().enumerate() {
        let path = temp_dir.path().join(format!("{index}.png"));
        assert_eq!(outcome.path.as_deref(), Some(path.as_path()));
        assert_eq!(std::fs::read(&path).unwrap(), urls[index].as_bytes());
    }
    assert_eq!(engine.stats().downloaded(), 6);
}

#[tokio::test(start_paused = true)]
async fn test_hanging_transport_is_cut_off_at_batch_deadline() {
    let temp_dir = TempDir::new().unwrap();
    let config = DownloadConfig {
        timeout: Duration::from_secs(10),
        ..config_for(&temp_dir, 2)
    };
    let engine = DownloadEngine::new(config, Arc::new(HangingTransport)).unwrap();

    let started = tokio::time::Instant::now();
    // 3 items at concurrency 2: 10s * ceil(3 / 2) = 20s.
    let outcomes = engine.run_batch(&urls(3)).await;

    assert!(started.elapsed() >= Duration::from_secs(20));
    assert!(started.elapsed() < Duration::from_secs(21));
    for outcome in &outcomes {
        assert_eq!(outcome.failure_kind(), Some(FailureKind::Cancelled));
        assert!(matches!(
            outcome.error,
            Some(DownloadError::DeadlineExceeded { .. })
        ));
    }
}

#[tokio::test]
async fn test_panicking_task_is_reported_without_affecting_siblings() {
    let temp_dir = TempDir::new().unwrap();
    let engine = DownloadEngine::new(config_for(&temp_dir, 2), Arc::new(PanickyTransport)).unwrap();
    let urls = vec![
        "https://img.example/ok-1.png".to_string(),
        "https://img.example/boom.png".to_string(),
        "https://img.example/ok-2.png".to_string(),
    ];

    let outcomes = engine.run_batch(&urls).await;

    assert!(outcomes[0].success);
    assert!(matches!(
        outcomes[1].error,
        Some(DownloadError::TaskPanicked { .. })
    ));
    assert_eq!(outcomes[1].url, urls[1]);
    assert!(outcomes[2].success);
    assert_eq!(engine.stats().failed(), 1);
    assert_eq!(engine.stats().total(), 3);
}

#[tokio::test]
async fn test_engines_do_not_share_limits() {
    let first_dir = TempDir::new().unwrap();
    let second_dir = TempDir::new().unwrap();
    let first = Arc::new(GaugeTransport::default());
    let second = Arc::new(GaugeTransport::default());
    let first_engine = DownloadEngine::new(config_for(&first_dir, 1), first.clone()).unwrap();
    let second_engine = DownloadEngine::new(config_for(&second_dir, 4), second.clone()).unwrap();

    let urls = urls(8);
    let (a, b) = tokio::join!(first_engine.run_batch(&urls), second_engine.run_batch(&urls));

    assert!(a.iter().chain(&b).all(|o| o.success));
    assert_eq!(first.max_in_flight.load(Ordering::SeqCst), 1);
    assert!(second.max_in_flight.load(Ordering::SeqCst) <= 4);
}

#[tokio::test]
async fn test_overlapping_batches_on_one_engine_each_get_full_limit() {
    let temp_dir = TempDir::new().unwrap();
    let transport = Arc::new(GaugeTransport::default());
    let engine = DownloadEngine::new(config_for(&temp_dir, 2), transport.clone()).unwrap();

    let first = urls(4);
    let second: Vec<String> = (0..4)
        .map(|i| format!("https://img.example/other-{i}.png"))
        .collect();
    let (a, b) = tokio::join!(engine.run_batch(&first), engine.run_batch(&second));

    assert!(a.iter().chain(&b).all(|o| o.success));
    let max = transport.max_in_flight.load(Ordering::SeqCst);
    assert!(max <= 4, "limit exceeded: {max} transfers overlapped");
    assert!(max > 2, "batches shared one limiter: only {max} transfers overlapped");
    assert_eq!(engine.stats().downloaded(), 8);
}
