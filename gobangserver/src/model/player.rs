//! 플레이어 모델
//!
//! 핸드셰이크에 성공한 연결 하나를 표현합니다. 착석 정보와 생존 플래그는
//! 원자 변수로 관리되어 레지스트리 락 없이 읽을 수 있습니다.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::sync::Notify;
use tokio::time::{Duration, Instant};
use tracing::{debug, warn};

use super::{PlayerId, SessionId};
use crate::protocol::ServerMessage;

/// 착석하지 않은 상태를 나타내는 좌석 값
const NO_SEAT: u64 = 0;

/// 연결된 플레이어
#[derive(Debug)]
pub struct Player {
    id: PlayerId,
    name: String,
    is_host: bool,
    active: AtomicBool,
    /// 현재 세션 ID (0 = 미착석)
    seat: AtomicU64,
    /// 연결 태스크가 소비하는 송신 큐
    outbound: mpsc::Sender<String>,
    /// 정리 경로가 연결 태스크를 깨우는 신호
    shutdown: Notify,
    connected_at: Instant,
}

impl Player {
    pub fn new(id: PlayerId, name: String, is_host: bool, outbound: mpsc::Sender<String>) -> Self {
        Self {
            id,
            name,
            is_host,
            active: AtomicBool::new(true),
            seat: AtomicU64::new(NO_SEAT),
            outbound,
            shutdown: Notify::new(),
            connected_at: Instant::now(),
        }
    }

    pub fn id(&self) -> PlayerId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_host(&self) -> bool {
        self.is_host
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// 현재 착석 중인 세션
    pub fn current_session(&self) -> Option<SessionId> {
        match self.seat.load(Ordering::Acquire) {
            NO_SEAT => None,
            raw => Some(SessionId::new(raw)),
        }
    }

    /// 미착석 상태일 때만 좌석을 선점합니다.
    pub(crate) fn try_claim_seat(&self, session_id: SessionId) -> bool {
        self.seat
            .compare_exchange(NO_SEAT, session_id.get(), Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// 좌석이 여전히 `session_id` 를 가리킬 때만 해제합니다.
    pub(crate) fn release_seat(&self, session_id: SessionId) -> bool {
        self.seat
            .compare_exchange(session_id.get(), NO_SEAT, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// 좌석을 비우고 이전 값을 돌려줍니다.
    pub(crate) fn take_seat(&self) -> Option<SessionId> {
        match self.seat.swap(NO_SEAT, Ordering::AcqRel) {
            NO_SEAT => None,
            raw => Some(SessionId::new(raw)),
        }
    }

    /// 메시지를 송신 큐에 넣습니다.
    ///
    /// 실패는 이 플레이어에게만 국한됩니다. 큐가 가득 차면 수신 측이 따라오지
    /// 못하는 것으로 보고 연결을 끊습니다.
    pub fn send(&self, message: &ServerMessage) -> bool {
        if !self.is_active() {
            return false;
        }

        match self.outbound.try_send(message.to_string()) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                warn!(player_id = %self.id, "송신 큐가 가득 참; 연결 종료");
                self.disconnect();
                false
            }
            Err(TrySendError::Closed(_)) => {
                debug!(player_id = %self.id, "송신 큐가 닫힘; 메시지 폐기");
                false
            }
        }
    }

    /// 비활성으로 표시하고 연결 태스크에 종료를 알립니다.
    pub fn disconnect(&self) {
        self.active.store(false, Ordering::Release);
        self.shutdown.notify_one();
    }

    /// `disconnect` 가 호출될 때까지 대기합니다.
    pub async fn closed(&self) {
        self.shutdown.notified().await
    }

    pub fn connected_for(&self) -> Duration {
        self.connected_at.elapsed()
    }
}
