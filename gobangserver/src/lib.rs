//! 오목 대전 중계 서버 라이브러리
//!
//! 두 명의 플레이어를 대국 세션으로 묶고 턴 단위 착수를 중계하는 TCP 서버입니다.
//! 착수의 규칙 검증은 클라이언트가 담당하며 서버는 순서만 관리합니다.
//!
//! # 주요 기능
//!
//! - **매치메이킹**: 호스트가 세션을 만들고 게스트가 입장
//! - **턴 중계**: 현재 턴을 가진 착석자의 착수만 상대에게 전달
//! - **대기 목록**: 착석하지 않은 모든 플레이어에게 대기 세션 목록 브로드캐스트
//! - **정리**: 연결 종료, 명시적 종료, 주기 정리가 겹쳐도 한 번만 처리
//!
//! # 아키텍처
//!
//! ```text
//! Gobang Server
//! ├── Service Layer
//! │   ├── TcpGameService (수락, 수용량, 종료)
//! │   ├── RegistryService (플레이어/세션 레지스트리)
//! │   └── ReaperService (주기 정리)
//! ├── Handler Layer
//! │   ├── ConnectionHandler (핸드셰이크, 명령 루프)
//! │   └── MessageHandler (명령 디스패치)
//! ├── Model (Player, Session)
//! ├── Protocol (텍스트 와이어 형식)
//! └── Tool (에러 처리)
//! ```
//!
//! # 사용 예시
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use gobangserver::{GobangServerConfig, TcpGameService};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let service = Arc::new(TcpGameService::new(GobangServerConfig::from_env()?));
//! let listener = service.bind().await?;
//! service.serve(listener).await?;
//! # Ok(())
//! # }
//! ```

/// 환경 설정 관리
pub mod config;

/// 핸들러 레이어
pub mod handler;

/// 도메인 모델
pub mod model;

/// 텍스트 와이어 프로토콜
pub mod protocol;

/// 서비스 레이어
pub mod service;

/// 공통 도구
pub mod tool;

#[cfg(test)]
mod tests;

pub use config::{validate_config, GobangServerConfig};
pub use handler::{ConnectionHandler, MessageHandler};
pub use model::{Color, Player, PlayerId, Session, SessionId, SessionPhase};
pub use protocol::{ClientCommand, Handshake, ServerMessage, SessionSummary};
pub use service::{ReapReport, ReaperService, RegistryService, RegistryStats, TcpGameService};
pub use tool::error::{ErrorHandler, ErrorSeverity, GameError, TcpServerError};
