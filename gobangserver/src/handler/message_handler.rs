//! 메시지 핸들러
//!
//! 한 줄 단위 명령을 해석하고 레지스트리에 위임합니다.
//! 전제조건 위반은 `ERROR:<reason>` 으로 응답하며 연결을 끊지 않습니다.

use std::sync::Arc;
use tracing::{debug, warn};

use crate::model::Player;
use crate::protocol::{ClientCommand, ServerMessage};
use crate::service::RegistryService;
use crate::tool::error::{GameError, GameResult};

/// 명령 처리 후 연결 루프가 취할 동작
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    Continue,
    Disconnect,
}

/// 명령 디스패처
#[derive(Clone)]
pub struct MessageHandler {
    registry: Arc<RegistryService>,
}

impl MessageHandler {
    pub fn new(registry: Arc<RegistryService>) -> Self {
        Self { registry }
    }

    /// 한 줄을 처리합니다.
    pub fn dispatch(&self, player: &Arc<Player>, line: &str) -> DispatchOutcome {
        let command = match ClientCommand::parse(line) {
            Ok(command) => command,
            Err(e) => {
                warn!(player_id = %player.id(), line, "알 수 없는 명령");
                player.send(&ServerMessage::error(e));
                return DispatchOutcome::Continue;
            }
        };

        debug!(player_id = %player.id(), command = command.keyword(), "명령 수신");

        match self.execute(player, command) {
            Ok(()) => DispatchOutcome::Continue,
            Err(None) => DispatchOutcome::Disconnect,
            Err(Some(reason)) => {
                debug!(player_id = %player.id(), %reason, "명령 거부");
                player.send(&ServerMessage::error(reason));
                DispatchOutcome::Continue
            }
        }
    }

    /// `Err(None)` 은 정상 종료 요청입니다.
    fn execute(&self, player: &Arc<Player>, command: ClientCommand) -> Result<(), Option<GameError>> {
        let result: GameResult<()> = match command {
            ClientCommand::CreateSession { label } => {
                self.registry.create_session(player, label).map(drop)
            }
            ClientCommand::JoinSession { session_id } => {
                self.registry.join_session(player, &session_id).map(drop)
            }
            ClientCommand::Move { payload } => self.registry.make_move(player, payload),
            ClientCommand::Chat { text } => self.registry.chat(player, text),
            ClientCommand::Restart => self.registry.restart_request(player),
            ClientCommand::RestartAccept => self.registry.restart_accept(player),
            ClientCommand::RestartReject => self.registry.restart_reject(player),
            ClientCommand::ListSessions => {
                player.send(&ServerMessage::SessionList(self.registry.list_sessions()));
                Ok(())
            }
            ClientCommand::GetPlayerInfo => {
                player.send(&self.registry.player_info(player));
                Ok(())
            }
            ClientCommand::Disconnect => {
                self.registry.cleanup_player(player.id());
                return Err(None);
            }
        };
        result.map_err(Some)
    }
}
