//! 리퍼 서비스
//!
//! 연결 트래픽과 무관하게 주기적으로 레지스트리를 정리합니다.
//! 종료되었거나 착석자가 끊긴 세션, 호스트가 사라진 대기 항목을 제거합니다.

use anyhow::Result;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::time::{interval, Duration, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::service::registry_service::{ReapReport, RegistryService};

/// 리퍼 통계
#[derive(Debug, Clone, Default)]
pub struct ReaperStats {
    pub sweeps: u64,
    pub players_reaped: u64,
    pub sessions_reaped: u64,
    pub waiting_reaped: u64,
    pub last_reap_time: Option<Instant>,
}

/// 주기 정리 서비스
pub struct ReaperService {
    registry: Arc<RegistryService>,
    is_running: Arc<Mutex<bool>>,
    sweep_handle: Arc<Mutex<Option<tokio::task::JoinHandle<()>>>>,
    interval: Duration,
    stats: Arc<Mutex<ReaperStats>>,
}

impl ReaperService {
    pub fn new(registry: Arc<RegistryService>, interval: Duration) -> Self {
        Self {
            registry,
            is_running: Arc::new(Mutex::new(false)),
            sweep_handle: Arc::new(Mutex::new(None)),
            interval,
            stats: Arc::new(Mutex::new(ReaperStats::default())),
        }
    }

    /// 정리 작업 시작
    pub async fn start(&self) -> Result<()> {
        let mut is_running = self.is_running.lock().await;
        if *is_running {
            warn!("리퍼가 이미 실행 중입니다");
            return Ok(());
        }
        *is_running = true;
        drop(is_running);

        info!("🔄 리퍼 시작 ({}초 간격)", self.interval.as_secs_f64());

        let registry = self.registry.clone();
        let stats = self.stats.clone();
        let period = self.interval;

        let handle = tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // 첫 tick 은 즉시 반환되므로 건너뜁니다.
            ticker.tick().await;

            loop {
                ticker.tick().await;
                let report = registry.reap();
                record(&stats, &report).await;
                log_report(&registry, &report);
            }
        });

        *self.sweep_handle.lock().await = Some(handle);
        Ok(())
    }

    /// 정리 작업 중지
    pub async fn stop(&self) -> Result<()> {
        let mut is_running = self.is_running.lock().await;
        if !*is_running {
            debug!("리퍼가 이미 중지되어 있습니다");
            return Ok(());
        }
        *is_running = false;
        drop(is_running);

        if let Some(handle) = self.sweep_handle.lock().await.take() {
            handle.abort();
        }

        info!("✅ 리퍼 중지 완료");
        Ok(())
    }

    pub async fn is_running(&self) -> bool {
        *self.is_running.lock().await
    }

    /// 주기를 기다리지 않고 한 번 정리합니다.
    pub async fn sweep_now(&self) -> ReapReport {
        let report = self.registry.reap();
        record(&self.stats, &report).await;
        log_report(&self.registry, &report);
        report
    }

    pub async fn get_stats(&self) -> ReaperStats {
        self.stats.lock().await.clone()
    }
}

async fn record(stats: &Mutex<ReaperStats>, report: &ReapReport) {
    let mut stats = stats.lock().await;
    stats.sweeps += 1;
    stats.players_reaped += report.players as u64;
    stats.sessions_reaped += report.sessions as u64;
    stats.waiting_reaped += report.waiting_entries as u64;
    if !report.is_empty() {
        stats.last_reap_time = Some(Instant::now());
    }
}

fn log_report(registry: &RegistryService, report: &ReapReport) {
    let current = registry.stats();
    if report.is_empty() {
        debug!(
            players = current.players,
            sessions = current.sessions,
            "리퍼 점검 완료 - 정리 대상 없음"
        );
    } else {
        info!(
            reaped_players = report.players,
            reaped_sessions = report.sessions,
            reaped_waiting = report.waiting_entries,
            players = current.players,
            sessions = current.sessions,
            waiting = current.waiting,
            "리퍼 정리 완료"
        );
    }
}
