//! Scan engine: worker pool, dispatcher, and result aggregation.
//!
//! One dispatcher feeds ports into a bounded task channel, a fixed pool of
//! workers probes them under a shared rate limiter, and a single aggregator
//! collects findings. Shutdown order is what keeps this correct: the
//! dispatcher finishes, then the workers drain the task channel and exit,
//! and only then does the findings channel close (last sender dropped), which
//! lets the aggregator drain without dropping in-flight findings.

pub mod progress;
pub mod rate_limiter;
pub mod tcp;
pub mod traits;
pub mod udp;

pub use rate_limiter::RateLimiter;
pub use tcp::TcpProber;
pub use traits::{Finding, ProbeOutcome, Prober, Protocol};
pub use udp::UdpProber;

use crate::error::{ScanError, ScanResult};
use crate::services;
use serde::Serialize;
use std::net::{IpAddr, SocketAddr};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Findings channel capacity. Workers may briefly block here if the
/// aggregator falls behind; that only slows probing, never loses results.
const FINDINGS_BUFFER: usize = 100;

/// Shared atomic counters for one scan.
///
/// Written by workers and the aggregator, read by the progress reporter.
/// Owned by the engine instance, so independent scans in one process never
/// share state.
#[derive(Debug, Default)]
pub struct ScanCounters {
    scanned: AtomicUsize,
    open: AtomicUsize,
}

impl ScanCounters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one completed probe, regardless of outcome.
    pub fn record_scanned(&self) {
        self.scanned.fetch_add(1, Ordering::Relaxed);
    }

    /// Record one collected finding.
    pub fn record_open(&self) {
        self.open.fetch_add(1, Ordering::Relaxed);
    }

    pub fn scanned(&self) -> usize {
        self.scanned.load(Ordering::Relaxed)
    }

    pub fn open(&self) -> usize {
        self.open.load(Ordering::Relaxed)
    }

    /// Zero both counters. Called at the start of each run so the counters
    /// always describe exactly one scan.
    fn reset(&self) {
        self.scanned.store(0, Ordering::Relaxed);
        self.open.store(0, Ordering::Relaxed);
    }
}

/// Aggregate statistics for a completed scan.
#[derive(Debug, Clone, Serialize)]
pub struct ScanStats {
    pub total_ports: usize,
    pub open_ports: usize,
    pub closed_ports: usize,
    pub duration_ms: u64,
}

/// Everything a scan produces: findings in completion order, plus stats.
///
/// Findings are *not* sorted by port number; callers that want sorted output
/// sort explicitly.
#[derive(Debug, Clone, Serialize)]
pub struct ScanOutcome {
    pub findings: Vec<Finding>,
    pub stats: ScanStats,
}

/// Configuration for a scan.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Target IP address.
    pub target: IpAddr,
    /// Ports to scan, dispatched in the order given.
    pub ports: Vec<u16>,
    /// Worker pool size.
    pub workers: usize,
    /// Per-probe timeout.
    pub timeout: Duration,
    /// Probe issuance rate, permits per second. Defaults to the worker count
    /// when unset; burst always equals the worker count.
    pub rate: Option<u32>,
    /// Render a live progress bar while scanning.
    pub show_progress: bool,
}

impl EngineConfig {
    /// Create a configuration with the defaults the CLI uses: 25 workers,
    /// 5 second timeout, rate equal to the worker count, no progress bar.
    pub fn new(target: IpAddr, ports: Vec<u16>) -> Self {
        Self {
            target,
            ports,
            workers: 25,
            timeout: Duration::from_secs(5),
            rate: None,
            show_progress: false,
        }
    }

    /// Set the worker pool size.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Set the per-probe timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set an explicit probe issuance rate in permits per second. Call order
    /// relative to `with_workers` does not matter.
    pub fn with_rate(mut self, rate: u32) -> Self {
        self.rate = Some(rate);
        self
    }

    /// Enable the live progress bar.
    pub fn with_progress(mut self) -> Self {
        self.show_progress = true;
        self
    }
}

/// The concurrent scan engine.
pub struct ScanEngine {
    config: EngineConfig,
    prober: Arc<dyn Prober>,
    counters: Arc<ScanCounters>,
    cancel: CancellationToken,
}

impl ScanEngine {
    /// Create an engine with an explicit prober implementation.
    pub fn new(config: EngineConfig, prober: Arc<dyn Prober>) -> Self {
        Self {
            config,
            prober,
            counters: Arc::new(ScanCounters::new()),
            cancel: CancellationToken::new(),
        }
    }

    /// Create an engine with the built-in prober for `protocol`.
    pub fn for_protocol(config: EngineConfig, protocol: Protocol) -> Self {
        let prober: Arc<dyn Prober> = match protocol {
            Protocol::Tcp => Arc::new(TcpProber::new(config.timeout)),
            Protocol::Udp => Arc::new(UdpProber::new(config.timeout)),
        };
        Self::new(config, prober)
    }

    /// The engine's shared counters, for external observation.
    pub fn counters(&self) -> Arc<ScanCounters> {
        Arc::clone(&self.counters)
    }

    /// Token that stops the dispatcher from issuing new tasks when cancelled.
    /// In-flight probes finish or time out naturally.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Run the scan to completion.
    ///
    /// Per-port failures never fail the run; zero findings is a normal
    /// outcome. Only an empty port set is an error, reported before any task
    /// is spawned.
    pub async fn run(&self) -> ScanResult<ScanOutcome> {
        let ports = self.config.ports.clone();
        if ports.is_empty() {
            return Err(ScanError::InvalidPortSpec("no ports to scan".to_string()));
        }

        let total = ports.len();
        let workers = self.config.workers.max(1);
        self.counters.reset();
        let start = Instant::now();

        // Task channel sized to the whole port set so the dispatcher never
        // blocks on a slow pool.
        let (task_tx, task_rx) = mpsc::channel::<u16>(total);
        let task_rx = Arc::new(Mutex::new(task_rx));
        let (finding_tx, finding_rx) = mpsc::channel::<Finding>(FINDINGS_BUFFER);
        let rate = self.config.rate.unwrap_or(workers as u32);
        let limiter = RateLimiter::new(rate, workers as u32);

        let progress_cancel = CancellationToken::new();
        let reporter = self.config.show_progress.then(|| {
            progress::spawn(Arc::clone(&self.counters), total, progress_cancel.clone())
        });

        // Aggregator: sole consumer of the findings channel. Runs until every
        // sender clone is dropped, i.e. until every worker has exited.
        let aggregator = {
            let counters = Arc::clone(&self.counters);
            let mut rx = finding_rx;
            tokio::spawn(async move {
                let mut findings = Vec::new();
                while let Some(finding) = rx.recv().await {
                    counters.record_open();
                    findings.push(finding);
                }
                findings
            })
        };

        let mut worker_handles = Vec::with_capacity(workers);
        for _ in 0..workers {
            let task_rx = Arc::clone(&task_rx);
            let finding_tx = finding_tx.clone();
            let prober = Arc::clone(&self.prober);
            let counters = Arc::clone(&self.counters);
            let limiter = limiter.clone();
            let target = self.config.target;

            worker_handles.push(tokio::spawn(async move {
                loop {
                    // Hold the receiver lock only while pulling one task.
                    let port = { task_rx.lock().await.recv().await };
                    let Some(port) = port else { break };

                    limiter.acquire().await;

                    let outcome = prober.probe(SocketAddr::new(target, port)).await;
                    counters.record_scanned();

                    match outcome {
                        ProbeOutcome::Open { banner } => {
                            let service = services::classify(&banner, port);
                            if finding_tx
                                .send(Finding::new(port, service, banner))
                                .await
                                .is_err()
                            {
                                break;
                            }
                        }
                        ProbeOutcome::ClosedOrFiltered => {
                            debug!(port, "no response");
                        }
                        ProbeOutcome::Error(reason) => {
                            warn!(port, %reason, "probe error");
                        }
                    }
                }
            }));
        }
        // The engine keeps no sender: once the workers exit, the findings
        // channel closes and the aggregator drains.
        drop(finding_tx);

        // Dispatcher: sole producer of tasks, ascending order, each port
        // exactly once. Cancellation stops new tasks from being issued.
        let dispatcher = {
            let cancel = self.cancel.clone();
            tokio::spawn(async move {
                for port in ports {
                    if cancel.is_cancelled() {
                        debug!("scan cancelled, dispatcher stopping");
                        break;
                    }
                    if task_tx.send(port).await.is_err() {
                        break;
                    }
                }
            })
        };

        // Shutdown ordering: dispatcher first, then workers, then the
        // aggregator (its channel closes only after the workers are gone).
        if dispatcher.await.is_err() {
            warn!("dispatcher task failed");
        }
        for handle in worker_handles {
            if handle.await.is_err() {
                warn!("worker task failed");
            }
        }
        let findings = match aggregator.await {
            Ok(findings) => findings,
            Err(err) => {
                warn!(error = %err, "aggregator task failed");
                Vec::new()
            }
        };

        let duration = start.elapsed();

        progress_cancel.cancel();
        if let Some(handle) = reporter {
            let _ = handle.await;
        }

        let open_ports = findings.len();
        Ok(ScanOutcome {
            stats: ScanStats {
                total_ports: total,
                open_ports,
                closed_ports: total - open_ports,
                duration_ms: duration.as_millis() as u64,
            },
            findings,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::net::Ipv4Addr;

    /// Synthetic prober that reports every port open with an SSH banner.
    struct AlwaysOpen;

    #[async_trait]
    impl Prober for AlwaysOpen {
        fn protocol(&self) -> Protocol {
            Protocol::Tcp
        }

        fn timeout(&self) -> Duration {
            Duration::from_secs(1)
        }

        async fn probe(&self, _addr: SocketAddr) -> ProbeOutcome {
            ProbeOutcome::Open {
                banner: "SSH-2.0-OpenSSH_8.9".to_string(),
            }
        }
    }

    /// Synthetic prober that never finds anything.
    struct NeverOpen;

    #[async_trait]
    impl Prober for NeverOpen {
        fn protocol(&self) -> Protocol {
            Protocol::Tcp
        }

        fn timeout(&self) -> Duration {
            Duration::from_secs(1)
        }

        async fn probe(&self, _addr: SocketAddr) -> ProbeOutcome {
            ProbeOutcome::ClosedOrFiltered
        }
    }

    fn localhost() -> IpAddr {
        IpAddr::V4(Ipv4Addr::LOCALHOST)
    }

    #[tokio::test]
    async fn test_every_port_scanned_exactly_once() {
        let ports: Vec<u16> = (1000..1100).collect();
        let config = EngineConfig::new(localhost(), ports.clone())
            .with_workers(8)
            .with_rate(10_000);
        let engine = ScanEngine::new(config, Arc::new(AlwaysOpen));
        let counters = engine.counters();

        let outcome = engine.run().await.unwrap();

        assert_eq!(counters.scanned(), ports.len());
        assert_eq!(counters.open(), ports.len());
        assert_eq!(outcome.findings.len(), ports.len());
        assert_eq!(outcome.stats.total_ports, ports.len());
        assert_eq!(outcome.stats.open_ports, ports.len());
        assert_eq!(outcome.stats.closed_ports, 0);

        let unique: HashSet<u16> = outcome.findings.iter().map(|f| f.port).collect();
        assert_eq!(unique.len(), ports.len());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_stress_no_lost_or_duplicate_findings() {
        let ports: Vec<u16> = (2000..3000).collect();
        let config = EngineConfig::new(localhost(), ports.clone())
            .with_workers(100)
            .with_rate(100_000);
        let engine = ScanEngine::new(config, Arc::new(AlwaysOpen));

        let outcome = engine.run().await.unwrap();

        assert_eq!(outcome.findings.len(), 1000);
        let unique: HashSet<u16> = outcome.findings.iter().map(|f| f.port).collect();
        assert_eq!(unique.len(), 1000);
    }

    #[tokio::test]
    async fn test_more_workers_than_ports() {
        let ports: Vec<u16> = (5000..5005).collect();
        let config = EngineConfig::new(localhost(), ports).with_workers(50);
        let engine = ScanEngine::new(config, Arc::new(AlwaysOpen));

        let outcome = engine.run().await.unwrap();
        assert_eq!(outcome.findings.len(), 5);
    }

    #[tokio::test]
    async fn test_zero_findings_is_not_an_error() {
        let ports: Vec<u16> = (1..51).collect();
        let config = EngineConfig::new(localhost(), ports)
            .with_workers(10)
            .with_rate(10_000);
        let engine = ScanEngine::new(config, Arc::new(NeverOpen));
        let counters = engine.counters();

        let outcome = engine.run().await.unwrap();

        assert!(outcome.findings.is_empty());
        assert_eq!(outcome.stats.open_ports, 0);
        assert_eq!(outcome.stats.closed_ports, 50);
        assert_eq!(counters.scanned(), 50);
    }

    #[test]
    fn test_explicit_rate_survives_worker_changes() {
        // Builder order must not matter for an explicit rate.
        let config = EngineConfig::new(localhost(), vec![80])
            .with_rate(500)
            .with_workers(10);
        assert_eq!(config.rate, Some(500));
        assert_eq!(config.workers, 10);

        // Without an explicit rate the engine falls back to the worker count.
        let config = EngineConfig::new(localhost(), vec![80]).with_workers(10);
        assert_eq!(config.rate, None);
    }

    #[tokio::test]
    async fn test_rerun_against_dead_target_is_idempotent() {
        let ports: Vec<u16> = (1..21).collect();
        let config = EngineConfig::new(localhost(), ports)
            .with_workers(5)
            .with_rate(10_000);
        let engine = ScanEngine::new(config, Arc::new(NeverOpen));
        let counters = engine.counters();

        let first = engine.run().await.unwrap();
        assert!(first.findings.is_empty());
        assert_eq!(counters.scanned(), 20);
        assert_eq!(counters.open(), 0);

        let second = engine.run().await.unwrap();
        assert!(second.findings.is_empty());
        assert_eq!(counters.scanned(), 20);
        assert_eq!(counters.open(), 0);
        assert_eq!(second.stats.total_ports, first.stats.total_ports);
        assert_eq!(second.stats.open_ports, 0);
        assert_eq!(second.stats.closed_ports, first.stats.closed_ports);
    }

    #[tokio::test]
    async fn test_empty_port_set_is_an_error() {
        let config = EngineConfig::new(localhost(), Vec::new());
        let engine = ScanEngine::new(config, Arc::new(AlwaysOpen));

        assert!(matches!(
            engine.run().await,
            Err(ScanError::InvalidPortSpec(_))
        ));
    }

    #[tokio::test]
    async fn test_cancellation_stops_dispatch() {
        let ports: Vec<u16> = (1000..2000).collect();
        let config = EngineConfig::new(localhost(), ports).with_workers(4);
        let engine = ScanEngine::new(config, Arc::new(AlwaysOpen));

        // Cancel before the dispatcher starts: nothing should be issued.
        engine.cancel_token().cancel();
        let outcome = engine.run().await.unwrap();

        assert!(outcome.findings.is_empty());
        assert_eq!(outcome.stats.total_ports, 1000);
    }

    #[tokio::test]
    async fn test_findings_classified_from_banner() {
        let config = EngineConfig::new(localhost(), vec![9999]);
        let engine = ScanEngine::new(config, Arc::new(AlwaysOpen));

        let outcome = engine.run().await.unwrap();
        assert_eq!(outcome.findings[0].service, "SSH");
        assert_eq!(outcome.findings[0].status, "open");
    }

    #[tokio::test]
    async fn test_closed_ports_against_localhost() {
        // Real TCP prober against ports that are almost certainly closed.
        let ports: Vec<u16> = (47900..47910).collect();
        let config = EngineConfig::new(localhost(), ports)
            .with_workers(5)
            .with_rate(1000)
            .with_timeout(Duration::from_millis(300));
        let engine = ScanEngine::for_protocol(config, Protocol::Tcp);

        let outcome = engine.run().await.unwrap();
        assert_eq!(outcome.stats.total_ports, 10);
    }
}
