//! 오목 서버 핸들러 레이어
//!
//! 연결 생명주기와 명령 디스패치를 담당합니다.

pub mod connection_handler;
pub mod message_handler;

pub use connection_handler::ConnectionHandler;
pub use message_handler::{DispatchOutcome, MessageHandler};
