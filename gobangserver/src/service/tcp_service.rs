//! TCP 서버 메인 서비스
//!
//! 리스너 바인드, 연결 수락과 수용량 제한, 리퍼 구동, 종료 절차를 담당합니다.

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::{watch, Mutex, Semaphore};
use tokio::task::JoinSet;
use tokio::time::{sleep, timeout, Duration};
use tracing::{error, info, warn};

use crate::config::GobangServerConfig;
use crate::handler::ConnectionHandler;
use crate::service::reaper_service::ReaperService;
use crate::service::registry_service::{RegistryService, RegistryStats};
use crate::tool::error::{ErrorHandler, TcpServerError};

/// 오목 게임 서버 서비스
pub struct TcpGameService {
    config: GobangServerConfig,
    registry: Arc<RegistryService>,
    reaper: ReaperService,
    connection_handler: ConnectionHandler,
    shutdown_tx: watch::Sender<bool>,
    is_running: Mutex<bool>,
}

impl TcpGameService {
    pub fn new(config: GobangServerConfig) -> Self {
        let registry = Arc::new(RegistryService::new());
        let reaper = ReaperService::new(registry.clone(), config.reap_interval());
        let connection_handler = ConnectionHandler::new(
            registry.clone(),
            config.handshake_timeout(),
            config.outbound_buffer,
        );
        let (shutdown_tx, _) = watch::channel(false);

        Self {
            config,
            registry,
            reaper,
            connection_handler,
            shutdown_tx,
            is_running: Mutex::new(false),
        }
    }

    /// 설정된 주소에 리스너를 바인드합니다. 실패는 치명적입니다.
    pub async fn bind(&self) -> Result<TcpListener> {
        let addr = self.config.bind_address();
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|source| {
                let error = TcpServerError::bind_error(&addr, source);
                ErrorHandler::handle_error(&error, error.severity(), "TcpGameService", "bind");
                error
            })
            .context("TCP 리스너 바인드 실패")?;

        info!("✅ 오목 서버가 {}에서 대기 중입니다", addr);
        Ok(listener)
    }

    /// 종료 신호가 올 때까지 연결을 수락합니다.
    pub async fn serve(&self, listener: TcpListener) -> Result<()> {
        let mut shutdown_rx = self.shutdown_tx.subscribe();
        let already_stopped = *shutdown_rx.borrow();
        if already_stopped {
            warn!("종료 요청 이후에는 서버를 시작할 수 없습니다");
            return Ok(());
        }

        let local_addr: Option<SocketAddr> = listener.local_addr().ok();
        let permits = Arc::new(Semaphore::new(self.config.max_players));
        let mut connections = JoinSet::new();

        self.reaper.start().await.context("리퍼 시작 실패")?;
        *self.is_running.lock().await = true;
        info!(
            addr = ?local_addr,
            max_players = self.config.max_players,
            "🚀 오목 서버 시작"
        );

        loop {
            tokio::select! {
                changed = shutdown_rx.changed() => {
                    let stopping = changed.is_err() || *shutdown_rx.borrow_and_update();
                    if stopping {
                        break;
                    }
                }

                accepted = listener.accept() => match accepted {
                    Ok((stream, addr)) => {
                        let Ok(permit) = permits.clone().try_acquire_owned() else {
                            warn!(%addr, "최대 접속 수 초과; 연결 거부");
                            drop(stream);
                            continue;
                        };

                        let handler = self.connection_handler.clone();
                        connections.spawn(async move {
                            handler.handle_connection(stream, addr).await;
                            drop(permit);
                        });
                    }
                    Err(e) => {
                        error!("클라이언트 연결 수락 실패: {}", e);
                        sleep(Duration::from_millis(100)).await;
                    }
                },

                Some(joined) = connections.join_next() => {
                    if let Err(e) = joined {
                        if e.is_panic() {
                            error!("연결 태스크 패닉: {}", e);
                        }
                    }
                }
            }
        }

        drop(listener);
        self.shut_down_connections(&mut connections).await?;
        *self.is_running.lock().await = false;
        Ok(())
    }

    async fn shut_down_connections(&self, connections: &mut JoinSet<()>) -> Result<()> {
        info!("🛑 오목 서버 중지 중...");

        self.reaper.stop().await.context("리퍼 중지 실패")?;

        let disconnected = self.registry.disconnect_all();
        info!(disconnected, "모든 플레이어 연결 해제 요청");

        let grace = self.config.shutdown_grace();
        let drained = timeout(grace, async {
            while connections.join_next().await.is_some() {}
        })
        .await;

        if drained.is_err() {
            warn!(
                remaining = connections.len(),
                "유예 시간 {}초 초과; 남은 연결 강제 종료",
                grace.as_secs()
            );
            connections.shutdown().await;
        }

        info!("✅ 오목 서버가 성공적으로 중지되었습니다");
        Ok(())
    }

    /// 수락 루프에 종료를 요청합니다.
    pub fn shutdown(&self) {
        self.shutdown_tx.send_replace(true);
    }

    pub async fn is_running(&self) -> bool {
        *self.is_running.lock().await
    }

    pub fn registry(&self) -> Arc<RegistryService> {
        self.registry.clone()
    }

    pub fn stats(&self) -> RegistryStats {
        self.registry.stats()
    }

    pub fn config(&self) -> &GobangServerConfig {
        &self.config
    }
}
