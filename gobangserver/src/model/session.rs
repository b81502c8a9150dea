//! 세션 모델
//!
//! 두 플레이어를 묶는 대국 기록과 턴 상태 기계입니다.
//!
//! ```text
//! Waiting (호스트 1명) -> Active (2명, 턴 교대) -> Over (이탈 또는 종료)
//! ```
//!
//! 게스트 입장 시 기록을 새로 만들지 않고 같은 레코드를 그대로 갱신합니다.

use std::sync::Arc;

use super::{Color, Player, PlayerId, SessionId};
use crate::tool::error::{GameError, GameResult};

/// 세션 진행 단계
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Waiting,
    Active,
    Over,
}

/// 대국 세션
#[derive(Debug)]
pub struct Session {
    id: SessionId,
    label: String,
    /// 첫 착석자 (흑)
    host: Arc<Player>,
    /// 두 번째 착석자 (백)
    guest: Option<Arc<Player>>,
    phase: SessionPhase,
    turn: Color,
}

impl Session {
    pub fn new(id: SessionId, label: String, host: Arc<Player>) -> Self {
        Self {
            id,
            label,
            host,
            guest: None,
            phase: SessionPhase::Waiting,
            turn: Color::Black,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn host(&self) -> &Arc<Player> {
        &self.host
    }

    pub fn guest(&self) -> Option<&Arc<Player>> {
        self.guest.as_ref()
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn turn(&self) -> Color {
        self.turn
    }

    pub fn is_started(&self) -> bool {
        self.phase == SessionPhase::Active
    }

    pub fn is_over(&self) -> bool {
        self.phase == SessionPhase::Over
    }

    /// 빈 자리가 있는 대기 세션인지
    pub fn has_room(&self) -> bool {
        self.phase == SessionPhase::Waiting && self.guest.is_none()
    }

    /// 두 번째 착석자를 앉히고 대국을 시작합니다.
    ///
    /// 입장 전에 설정된 상태는 유지됩니다. 턴은 항상 흑에서 시작합니다.
    pub fn seat_guest(&mut self, guest: Arc<Player>) -> GameResult<()> {
        if !self.has_room() {
            return Err(GameError::SessionFull);
        }
        self.guest = Some(guest);
        self.phase = SessionPhase::Active;
        self.turn = Color::Black;
        Ok(())
    }

    /// 착수 권한을 확인하고 턴을 넘깁니다. 새 턴 색상을 돌려줍니다.
    pub fn apply_move(&mut self, mover: PlayerId) -> GameResult<Color> {
        if !self.is_started() {
            return Err(GameError::GameNotStarted);
        }
        if self.color_of(mover) != Some(self.turn) {
            return Err(GameError::NotYourTurn);
        }
        self.turn = self.turn.opposite();
        Ok(self.turn)
    }

    /// 재시작 수락 시 흑부터 다시 시작합니다.
    pub fn reset_turn(&mut self) -> GameResult<Color> {
        if !self.is_started() {
            return Err(GameError::GameNotStarted);
        }
        self.turn = Color::Black;
        Ok(self.turn)
    }

    pub fn mark_over(&mut self) {
        self.phase = SessionPhase::Over;
    }

    /// 종료되지 않았고 모든 착석자가 살아 있는지
    pub fn is_live(&self) -> bool {
        !self.is_over() && self.occupants().all(|p| p.is_active())
    }

    pub fn occupants(&self) -> impl Iterator<Item = &Arc<Player>> {
        std::iter::once(&self.host).chain(self.guest.iter())
    }

    pub fn contains(&self, player: PlayerId) -> bool {
        self.occupants().any(|p| p.id() == player)
    }

    pub fn opponent_of(&self, player: PlayerId) -> Option<&Arc<Player>> {
        if self.host.id() == player {
            self.guest.as_ref()
        } else if self.guest.as_ref().is_some_and(|g| g.id() == player) {
            Some(&self.host)
        } else {
            None
        }
    }

    pub fn color_of(&self, player: PlayerId) -> Option<Color> {
        if self.host.id() == player {
            Some(Color::Black)
        } else if self.guest.as_ref().is_some_and(|g| g.id() == player) {
            Some(Color::White)
        } else {
            None
        }
    }
}
