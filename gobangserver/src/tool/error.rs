//! 공통 에러 처리 시스템
//!
//! 오목 서버에서 발생하는 에러를 두 갈래로 나누어 관리합니다.
//!
//! - [`GameError`]: 명령 전제조건 위반과 알 수 없는 명령. `ERROR:<reason>` 으로
//!   응답하고 연결은 유지됩니다.
//! - [`TcpServerError`]: 핸드셰이크/전송/바인드 실패. 해당 연결(또는 프로세스)만
//!   종료됩니다.

use thiserror::Error;
use tracing::{error, info, warn};

/// 명령 처리 중 발생하는 게임 에러
///
/// `Display` 문자열이 그대로 와이어의 에러 사유가 됩니다.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum GameError {
    #[error("Unknown command")]
    UnknownCommand,

    #[error("Only hosts can create sessions")]
    NotHost,

    #[error("Already in a session")]
    AlreadySeated,

    #[error("Session not found")]
    SessionNotFound,

    #[error("Session is full")]
    SessionFull,

    #[error("Not in a session")]
    NotSeated,

    #[error("Not your turn")]
    NotYourTurn,

    #[error("Game not started")]
    GameNotStarted,
}

/// TCP 서버 에러 타입
///
/// 연결 생명주기와 서버 기동 중 발생하는 에러입니다.
#[derive(Debug, Error)]
pub enum TcpServerError {
    /// 소켓 읽기/쓰기 실패
    #[error("네트워크 에러: {0}")]
    Io(#[from] std::io::Error),

    /// 핸드셰이크 제한 시간 초과
    #[error("핸드셰이크 타임아웃")]
    HandshakeTimeout,

    /// 첫 줄을 보내기 전에 연결 종료
    #[error("핸드셰이크 전에 연결이 종료되었습니다")]
    ClosedBeforeHandshake,

    /// 첫 줄이 `PLAYER_INFO:<name>:<isHost>` 형식이 아님
    #[error("잘못된 핸드셰이크: {0}")]
    InvalidHandshake(String),

    /// 리스너 바인드 실패
    #[error("바인드 실패 [{addr}]: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },
}

impl TcpServerError {
    /// 로그에 사용할 기본 심각도
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            TcpServerError::ClosedBeforeHandshake => ErrorSeverity::Info,
            TcpServerError::HandshakeTimeout | TcpServerError::InvalidHandshake(_) => {
                ErrorSeverity::Warning
            }
            TcpServerError::Io(_) => ErrorSeverity::Error,
            TcpServerError::Bind { .. } => ErrorSeverity::Critical,
        }
    }
}

/// 에러 심각도 레벨
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// 정보성 - 정상 동작 중 발생하는 예상 가능한 상황
    Info,
    /// 경고 - 주의가 필요하지만 서비스는 계속 가능
    Warning,
    /// 에러 - 해당 연결에 영향을 주지만 서버는 계속 동작
    Error,
    /// 치명적 - 서버를 계속 실행할 수 없음
    Critical,
}

/// 에러 핸들러
///
/// 에러를 심각도에 맞는 로그 레벨로 출력합니다.
pub struct ErrorHandler;

impl ErrorHandler {
    /// 에러를 처리하고 로깅합니다.
    ///
    /// ```rust
    /// use gobangserver::tool::error::{ErrorHandler, TcpServerError};
    ///
    /// let error = TcpServerError::HandshakeTimeout;
    /// ErrorHandler::handle_error(&error, error.severity(), "ConnectionHandler", "handshake");
    /// ```
    pub fn handle_error(
        error: &TcpServerError,
        severity: ErrorSeverity,
        component: &str,
        operation: &str,
    ) {
        match severity {
            ErrorSeverity::Info => info!(component, operation, "{}", error),
            ErrorSeverity::Warning => warn!(component, operation, "{}", error),
            ErrorSeverity::Error => error!(component, operation, "{}", error),
            ErrorSeverity::Critical => {
                error!(component, operation, "🚨 CRITICAL: {}", error);
            }
        }
    }

    /// 피어가 연결을 끊은 정상 종료성 I/O 에러인지 판별합니다.
    pub fn is_peer_reset(error: &std::io::Error) -> bool {
        matches!(
            error.kind(),
            std::io::ErrorKind::ConnectionReset
                | std::io::ErrorKind::ConnectionAborted
                | std::io::ErrorKind::BrokenPipe
                | std::io::ErrorKind::UnexpectedEof
        )
    }
}

/// 바인드 에러 생성 헬퍼
impl TcpServerError {
    pub fn bind_error(addr: impl Into<String>, source: std::io::Error) -> Self {
        Self::Bind {
            addr: addr.into(),
            source,
        }
    }

    pub fn invalid_handshake(line: &str) -> Self {
        Self::InvalidHandshake(line.to_string())
    }
}

/// 결과 타입 별칭
pub type TcpResult<T> = Result<T, TcpServerError>;

/// 게임 명령 결과 타입 별칭
pub type GameResult<T> = Result<T, GameError>;

