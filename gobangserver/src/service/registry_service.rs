//! 플레이어/세션 레지스트리 서비스
//!
//! DashMap 세 개로 전체 상태를 관리합니다.
//!
//! - `players`: player_id -> Player
//! - `sessions`: session_id -> Session
//! - `waiting`: session_id -> 호스트 (착석자가 한 명뿐인 세션만)
//!
//! 여러 단계로 이루어진 변경(빈자리 확인 후 착석, 종료 표시 후 인덱스 정리)은
//! 모두 `sessions` 엔트리 락 하나를 잡은 상태에서 수행합니다.
//! 락 순서는 항상 `sessions` -> `waiting` -> `players` 입니다.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::model::{Color, Player, PlayerId, Session, SessionId, SessionPhase};
use crate::protocol::{ServerMessage, SessionSummary};
use crate::tool::error::{GameError, GameResult};

/// 레지스트리 현황
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegistryStats {
    pub players: usize,
    pub sessions: usize,
    pub waiting: usize,
}

/// 리퍼 한 번의 정리 결과
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReapReport {
    pub players: usize,
    pub sessions: usize,
    pub waiting_entries: usize,
}

impl ReapReport {
    pub fn is_empty(&self) -> bool {
        self.players == 0 && self.sessions == 0 && self.waiting_entries == 0
    }
}

/// 플레이어/세션 레지스트리
pub struct RegistryService {
    players: DashMap<PlayerId, Arc<Player>>,
    sessions: DashMap<SessionId, Session>,
    waiting: DashMap<SessionId, Arc<Player>>,
    next_player_id: AtomicU64,
    next_session_id: AtomicU64,
}

impl Default for RegistryService {
    fn default() -> Self {
        Self::new()
    }
}

impl RegistryService {
    pub fn new() -> Self {
        Self {
            players: DashMap::new(),
            sessions: DashMap::new(),
            waiting: DashMap::new(),
            next_player_id: AtomicU64::new(1),
            next_session_id: AtomicU64::new(1),
        }
    }

    /// 핸드셰이크를 마친 연결을 플레이어로 등록합니다.
    pub fn register_player(
        &self,
        name: String,
        is_host: bool,
        outbound: mpsc::Sender<String>,
    ) -> Arc<Player> {
        let id = PlayerId::new(self.next_player_id.fetch_add(1, Ordering::Relaxed));
        let player = Arc::new(Player::new(id, name, is_host, outbound));
        self.players.insert(id, Arc::clone(&player));

        info!(player_id = %id, name = player.name(), is_host, "플레이어 등록");
        player
    }

    pub fn player(&self, id: PlayerId) -> Option<Arc<Player>> {
        self.players.get(&id).map(|p| Arc::clone(p.value()))
    }

    /// 새 대기 세션을 만들고 호출자를 첫 착석자로 앉힙니다.
    pub fn create_session(&self, player: &Arc<Player>, label: String) -> GameResult<SessionId> {
        if !player.is_host() {
            return Err(GameError::NotHost);
        }
        if player.current_session().is_some() {
            return Err(GameError::AlreadySeated);
        }

        let session_id = SessionId::new(self.next_session_id.fetch_add(1, Ordering::Relaxed));
        if !player.try_claim_seat(session_id) {
            return Err(GameError::AlreadySeated);
        }

        {
            let entry = self.sessions.entry(session_id);
            self.waiting.insert(session_id, Arc::clone(player));
            entry.insert(Session::new(session_id, label.clone(), Arc::clone(player)));
        }

        player.send(&ServerMessage::SessionCreated { session_id, label });
        info!(player_id = %player.id(), session_id = %session_id, "세션 생성");

        self.broadcast_session_list();
        Ok(session_id)
    }

    /// 대기 세션에 두 번째 착석자로 입장합니다.
    ///
    /// 좌석 선점은 세션 엔트리 락 안에서 하므로 존재하지 않는 세션을
    /// 가리키는 좌석은 외부에 보이지 않습니다.
    pub fn join_session(&self, player: &Arc<Player>, raw_session_id: &str) -> GameResult<SessionId> {
        if player.current_session().is_some() {
            return Err(GameError::AlreadySeated);
        }
        let session_id: SessionId = raw_session_id.parse()?;

        {
            let mut session = self
                .sessions
                .get_mut(&session_id)
                .ok_or(GameError::SessionNotFound)?;
            if !session.has_room() {
                return Err(GameError::SessionFull);
            }
            if !player.try_claim_seat(session_id) {
                return Err(GameError::AlreadySeated);
            }
            if let Err(e) = session.seat_guest(Arc::clone(player)) {
                player.release_seat(session_id);
                return Err(e);
            }
            self.waiting.remove(&session_id);

            // 이탈 알림보다 먼저 도착하도록 락 안에서 보냅니다.
            let host = session.host();
            host.send(&ServerMessage::PlayerJoined {
                name: player.name().to_string(),
            });
            host.send(&ServerMessage::GameStart {
                color: Color::Black,
                opponent_name: player.name().to_string(),
                opponent_color: Color::White,
            });
            player.send(&ServerMessage::GameStart {
                color: Color::White,
                opponent_name: host.name().to_string(),
                opponent_color: Color::Black,
            });
        }

        info!(player_id = %player.id(), session_id = %session_id, "세션 입장, 대국 시작");
        self.broadcast_session_list();
        Ok(session_id)
    }

    /// 착수를 상대에게 중계하고 턴을 넘깁니다.
    pub fn make_move(&self, player: &Arc<Player>, payload: String) -> GameResult<()> {
        self.with_session(player, |session| {
            let turn = session.apply_move(player.id())?;
            if let Some(opponent) = session.opponent_of(player.id()) {
                opponent.send(&ServerMessage::Move { payload });
            }
            let change = ServerMessage::TurnChange { color: turn };
            for occupant in session.occupants() {
                occupant.send(&change);
            }
            debug!(player_id = %player.id(), session_id = %session.id(), turn = %turn, "착수 처리");
            Ok(())
        })
    }

    /// 상대에게만 채팅을 전달합니다.
    pub fn chat(&self, player: &Arc<Player>, text: String) -> GameResult<()> {
        self.with_session(player, |session| {
            if let Some(opponent) = session.opponent_of(player.id()) {
                opponent.send(&ServerMessage::Chat {
                    sender: player.name().to_string(),
                    text,
                });
            }
            Ok(())
        })
    }

    /// 재시작 요청을 상대에게 전달합니다. 상태는 바뀌지 않습니다.
    pub fn restart_request(&self, player: &Arc<Player>) -> GameResult<()> {
        self.with_session(player, |session| {
            if let Some(opponent) = session.opponent_of(player.id()) {
                opponent.send(&ServerMessage::RestartRequest {
                    sender: player.name().to_string(),
                });
            }
            Ok(())
        })
    }

    /// 재시작 수락: 상대에게 알리고 흑부터 다시 시작합니다.
    pub fn restart_accept(&self, player: &Arc<Player>) -> GameResult<()> {
        self.with_session(player, |session| {
            let turn = session.reset_turn()?;
            if let Some(opponent) = session.opponent_of(player.id()) {
                opponent.send(&ServerMessage::RestartAccepted {
                    sender: player.name().to_string(),
                });
            }
            let change = ServerMessage::TurnChange { color: turn };
            for occupant in session.occupants() {
                occupant.send(&change);
            }
            info!(player_id = %player.id(), session_id = %session.id(), "대국 재시작");
            Ok(())
        })
    }

    pub fn restart_reject(&self, player: &Arc<Player>) -> GameResult<()> {
        self.with_session(player, |session| {
            if !session.is_started() {
                return Err(GameError::GameNotStarted);
            }
            if let Some(opponent) = session.opponent_of(player.id()) {
                opponent.send(&ServerMessage::RestartRejected {
                    sender: player.name().to_string(),
                });
            }
            Ok(())
        })
    }

    /// 착석 중인 세션을 잠근 상태로 `f` 를 실행합니다.
    fn with_session<R>(
        &self,
        player: &Arc<Player>,
        f: impl FnOnce(&mut Session) -> GameResult<R>,
    ) -> GameResult<R> {
        let session_id = player.current_session().ok_or(GameError::NotSeated)?;
        let mut session = self
            .sessions
            .get_mut(&session_id)
            .ok_or(GameError::SessionNotFound)?;
        f(&mut session)
    }

    /// 대기 중인 세션 목록 (ID 순)
    pub fn list_sessions(&self) -> Vec<SessionSummary> {
        let mut entries: Vec<SessionSummary> = self
            .waiting
            .iter()
            .filter(|entry| entry.value().is_active())
            .map(|entry| SessionSummary {
                session_id: *entry.key(),
                host_name: entry.value().name().to_string(),
            })
            .collect();
        entries.sort_by_key(|entry| entry.session_id);
        entries
    }

    pub fn player_info(&self, player: &Player) -> ServerMessage {
        ServerMessage::PlayerInfo {
            player_id: player.id(),
            name: player.name().to_string(),
            is_host: player.is_host(),
        }
    }

    /// 플레이어를 정리합니다.
    ///
    /// 동시에 여러 경로에서 호출돼도 레지스트리에서 제거에 성공한 호출만
    /// 나머지 단계를 수행합니다. 대기 목록 브로드캐스트도 그 호출만 보냅니다.
    /// 실제로 정리했으면 `true`.
    pub fn cleanup_player(&self, player_id: PlayerId) -> bool {
        let Some((_, player)) = self.players.remove(&player_id) else {
            return false;
        };

        player.disconnect();

        if let Some(session_id) = player.take_seat() {
            self.close_session(session_id, Some(player_id));
        }
        self.waiting.retain(|_, host| host.id() != player_id);

        info!(
            player_id = %player_id,
            connected_secs = player.connected_for().as_secs(),
            "플레이어 정리 완료"
        );

        self.broadcast_session_list();
        true
    }

    /// 세션을 종료하고 두 테이블에서 함께 제거합니다.
    ///
    /// `leaver` 가 주어지면 그 플레이어가 착석자일 때만, 없으면 세션이 더 이상
    /// 살아 있지 않을 때만 닫습니다. 남은 착석자에게 한 번 알리고 좌석을 풀어줍니다.
    fn close_session(&self, session_id: SessionId, leaver: Option<PlayerId>) -> bool {
        let Entry::Occupied(mut entry) = self.sessions.entry(session_id) else {
            return false;
        };

        let session = entry.get_mut();
        match leaver {
            Some(leaver) if !session.contains(leaver) => return false,
            None if session.is_live() => return false,
            _ => {}
        }

        let was_started = session.is_started();
        session.mark_over();

        for occupant in session.occupants() {
            if Some(occupant.id()) == leaver {
                continue;
            }
            if occupant.release_seat(session_id)
                && was_started
                && self.players.contains_key(&occupant.id())
            {
                occupant.send(&ServerMessage::OpponentDisconnected);
            }
        }

        self.waiting.remove(&session_id);
        entry.remove();

        info!(session_id = %session_id, "세션 제거");
        true
    }

    /// 주기 정리 한 번을 수행합니다.
    ///
    /// 닫히는 세션과 대기 항목은 모두 비활성 또는 제거된 플레이어에게서 나오고,
    /// 그 플레이어의 `cleanup_player` 가 목록을 한 번 브로드캐스트합니다.
    /// 리퍼 자신은 브로드캐스트하지 않습니다.
    pub fn reap(&self) -> ReapReport {
        let mut report = ReapReport::default();

        let stale_players: Vec<PlayerId> = self
            .players
            .iter()
            .filter(|entry| !entry.value().is_active())
            .map(|entry| *entry.key())
            .collect();
        for player_id in stale_players {
            if self.cleanup_player(player_id) {
                report.players += 1;
            }
        }

        let dead_sessions: Vec<SessionId> = self
            .sessions
            .iter()
            .filter(|entry| !entry.value().is_live())
            .map(|entry| *entry.key())
            .collect();
        for session_id in dead_sessions {
            if self.close_session(session_id, None) {
                report.sessions += 1;
            }
        }

        let orphaned: Vec<SessionId> = self
            .waiting
            .iter()
            .filter(|entry| !entry.value().is_active())
            .map(|entry| *entry.key())
            .collect();
        for session_id in orphaned {
            if self.close_session(session_id, None) {
                report.sessions += 1;
            } else if self
                .waiting
                .remove_if(&session_id, |_, host| !host.is_active())
                .is_some()
            {
                report.waiting_entries += 1;
            }
        }

        report
    }

    /// 착석하지 않은 모든 플레이어에게 대기 목록을 보냅니다. 목록이 비어도 보냅니다.
    pub fn broadcast_session_list(&self) -> usize {
        let message = ServerMessage::SessionListUpdate(self.list_sessions());

        let recipients: Vec<Arc<Player>> = self
            .players
            .iter()
            .filter(|entry| entry.value().current_session().is_none())
            .map(|entry| Arc::clone(entry.value()))
            .collect();

        let delivered = recipients.iter().filter(|p| p.send(&message)).count();
        debug!(delivered, "세션 목록 브로드캐스트");
        delivered
    }

    /// 등록된 모든 플레이어를 정리합니다. 서버 종료 시 사용합니다.
    pub fn disconnect_all(&self) -> usize {
        let ids: Vec<PlayerId> = self.players.iter().map(|entry| *entry.key()).collect();
        ids.into_iter().filter(|id| self.cleanup_player(*id)).count()
    }

    pub fn session_phase(&self, session_id: SessionId) -> Option<SessionPhase> {
        self.sessions.get(&session_id).map(|s| s.phase())
    }

    pub fn is_waiting(&self, session_id: SessionId) -> bool {
        self.waiting.contains_key(&session_id)
    }

    pub fn stats(&self) -> RegistryStats {
        RegistryStats {
            players: self.players.len(),
            sessions: self.sessions.len(),
            waiting: self.waiting.len(),
        }
    }
}
