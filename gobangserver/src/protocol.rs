//! 오목 서버 텍스트 프로토콜
//!
//! 한 줄에 메시지 하나, 필드는 `:` 로 구분하고 명령 키워드가 맨 앞에 옵니다.
//!
//! # 프로토콜 구조
//!
//! ```text
//! C -> S  PLAYER_INFO:<name>:<true|false>      (핸드셰이크, 첫 줄)
//! S -> C  CONNECTED:<playerId>
//! C -> S  CREATE_SESSION:<label>
//! S -> C  SESSION_CREATED:<sessionId>:<label>
//! C -> S  JOIN_SESSION:<sessionId>
//! S -> C  PLAYER_JOINED:<guestName>                (호스트에게만)
//! S -> C  GAME_START:<color>:<opponentName>:<opponentColor>
//! C -> S  MOVE:<payload>
//! S -> C  MOVE:<payload> / TURN_CHANGE:<color>
//! ```
//!
//! # 사용 예시
//!
//! ```rust
//! use gobangserver::protocol::{ClientCommand, ServerMessage};
//!
//! let cmd = ClientCommand::parse("MOVE:7,7").unwrap();
//! assert_eq!(cmd, ClientCommand::Move { payload: "7,7".into() });
//! assert_eq!(ServerMessage::OpponentDisconnected.to_string(), "OPPONENT_DISCONNECTED");
//! ```

use std::fmt;

use tokio::io::{AsyncWriteExt, BufWriter};
use tokio::net::tcp::OwnedWriteHalf;

use crate::model::{Color, PlayerId, SessionId};
use crate::tool::error::{GameError, GameResult, TcpResult, TcpServerError};

/// 핸드셰이크 키워드
pub const HANDSHAKE_KEYWORD: &str = "PLAYER_INFO";

/// 핸드셰이크 실패 시 연결 종료 직전에 보내는 응답
pub const INVALID_HANDSHAKE_REPLY: &str = "ERROR:Invalid initial handshake";

/// 첫 줄로 전달되는 플레이어 정보
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Handshake {
    pub name: String,
    pub is_host: bool,
}

impl Handshake {
    /// `PLAYER_INFO:<name>:<isHost>` 를 파싱합니다.
    ///
    /// 이름은 비어 있으면 안 되고 플래그는 `true`/`false` (대소문자 무시) 만 허용합니다.
    pub fn parse(line: &str) -> TcpResult<Self> {
        let line = line.trim_end_matches('\r');
        let mut parts = line.splitn(3, ':');

        let (Some(HANDSHAKE_KEYWORD), Some(name), Some(flag)) =
            (parts.next(), parts.next(), parts.next())
        else {
            return Err(TcpServerError::invalid_handshake(line));
        };

        let is_host = match flag.trim().to_ascii_lowercase().as_str() {
            "true" => true,
            "false" => false,
            _ => return Err(TcpServerError::invalid_handshake(line)),
        };

        if name.trim().is_empty() {
            return Err(TcpServerError::invalid_handshake(line));
        }

        Ok(Self {
            name: name.to_string(),
            is_host,
        })
    }
}

/// 클라이언트 명령
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientCommand {
    CreateSession { label: String },
    /// 세션 ID는 레지스트리에서 해석합니다. 잘못된 ID는 `Session not found`.
    JoinSession { session_id: String },
    Move { payload: String },
    Chat { text: String },
    Restart,
    RestartAccept,
    RestartReject,
    ListSessions,
    GetPlayerInfo,
    Disconnect,
}

impl ClientCommand {
    /// 한 줄을 명령 키워드와 페이로드로 나누어 해석합니다.
    pub fn parse(line: &str) -> GameResult<Self> {
        let line = line.trim_end_matches('\r');
        let (keyword, payload) = line.split_once(':').unwrap_or((line, ""));

        let command = match keyword {
            "CREATE_SESSION" => ClientCommand::CreateSession {
                label: payload.to_string(),
            },
            "JOIN_SESSION" => ClientCommand::JoinSession {
                session_id: payload.to_string(),
            },
            "MOVE" => ClientCommand::Move {
                payload: payload.to_string(),
            },
            "CHAT" => ClientCommand::Chat {
                text: payload.to_string(),
            },
            "RESTART" => ClientCommand::Restart,
            "RESTART_ACCEPT" => ClientCommand::RestartAccept,
            "RESTART_REJECT" => ClientCommand::RestartReject,
            "LIST_SESSIONS" => ClientCommand::ListSessions,
            "GET_PLAYER_INFO" => ClientCommand::GetPlayerInfo,
            "DISCONNECT" => ClientCommand::Disconnect,
            _ => return Err(GameError::UnknownCommand),
        };
        Ok(command)
    }

    /// 로그용 키워드
    pub fn keyword(&self) -> &'static str {
        match self {
            ClientCommand::CreateSession { .. } => "CREATE_SESSION",
            ClientCommand::JoinSession { .. } => "JOIN_SESSION",
            ClientCommand::Move { .. } => "MOVE",
            ClientCommand::Chat { .. } => "CHAT",
            ClientCommand::Restart => "RESTART",
            ClientCommand::RestartAccept => "RESTART_ACCEPT",
            ClientCommand::RestartReject => "RESTART_REJECT",
            ClientCommand::ListSessions => "LIST_SESSIONS",
            ClientCommand::GetPlayerInfo => "GET_PLAYER_INFO",
            ClientCommand::Disconnect => "DISCONNECT",
        }
    }
}

/// 대기 세션 목록의 한 항목
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    pub session_id: SessionId,
    pub host_name: String,
}

/// 서버 -> 클라이언트 메시지
///
/// `Display` 가 개행을 제외한 와이어 형식입니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerMessage {
    Connected { player_id: PlayerId },
    SessionCreated { session_id: SessionId, label: String },
    PlayerJoined { name: String },
    GameStart {
        color: Color,
        opponent_name: String,
        opponent_color: Color,
    },
    Move { payload: String },
    TurnChange { color: Color },
    Chat { sender: String, text: String },
    RestartRequest { sender: String },
    RestartAccepted { sender: String },
    RestartRejected { sender: String },
    SessionList(Vec<SessionSummary>),
    SessionListUpdate(Vec<SessionSummary>),
    PlayerInfo {
        player_id: PlayerId,
        name: String,
        is_host: bool,
    },
    OpponentDisconnected,
    Error { reason: GameError },
}

impl ServerMessage {
    pub fn error(reason: GameError) -> Self {
        ServerMessage::Error { reason }
    }
}

fn write_session_list(f: &mut fmt::Formatter<'_>, entries: &[SessionSummary]) -> fmt::Result {
    for (i, entry) in entries.iter().enumerate() {
        if i > 0 {
            f.write_str(";")?;
        }
        write!(f, "{},{}", entry.session_id, entry.host_name)?;
    }
    Ok(())
}

impl fmt::Display for ServerMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerMessage::Connected { player_id } => write!(f, "CONNECTED:{player_id}"),
            ServerMessage::SessionCreated { session_id, label } => {
                write!(f, "SESSION_CREATED:{session_id}:{label}")
            }
            ServerMessage::PlayerJoined { name } => write!(f, "PLAYER_JOINED:{name}"),
            ServerMessage::GameStart {
                color,
                opponent_name,
                opponent_color,
            } => write!(f, "GAME_START:{color}:{opponent_name}:{opponent_color}"),
            ServerMessage::Move { payload } => write!(f, "MOVE:{payload}"),
            ServerMessage::TurnChange { color } => write!(f, "TURN_CHANGE:{color}"),
            ServerMessage::Chat { sender, text } => write!(f, "CHAT:{sender}:{text}"),
            ServerMessage::RestartRequest { sender } => write!(f, "RESTART_REQUEST:{sender}"),
            ServerMessage::RestartAccepted { sender } => write!(f, "RESTART_ACCEPTED:{sender}"),
            ServerMessage::RestartRejected { sender } => write!(f, "RESTART_REJECTED:{sender}"),
            ServerMessage::SessionList(entries) => {
                f.write_str("SESSION_LIST:")?;
                write_session_list(f, entries)
            }
            ServerMessage::SessionListUpdate(entries) => {
                f.write_str("SESSION_LIST_UPDATE:")?;
                write_session_list(f, entries)
            }
            ServerMessage::PlayerInfo {
                player_id,
                name,
                is_host,
            } => write!(f, "PLAYER_INFO:{player_id}:{name}:{is_host}"),
            ServerMessage::OpponentDisconnected => f.write_str("OPPONENT_DISCONNECTED"),
            ServerMessage::Error { reason } => write!(f, "ERROR:{reason}"),
        }
    }
}

/// 한 줄을 개행과 함께 기록합니다. 플러시는 호출자가 결정합니다.
pub async fn write_line(stream: &mut BufWriter<OwnedWriteHalf>, line: &str) -> TcpResult<()> {
    stream.write_all(line.as_bytes()).await?;
    stream.write_all(b"\n").await?;
    Ok(())
}
