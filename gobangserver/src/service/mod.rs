//! 오목 서버 서비스 레이어
//!
//! # 서비스 구조
//!
//! ```text
//! Service Layer
//! ├── RegistryService (플레이어/세션 레지스트리)
//! │   ├── 세션 생성/입장
//! │   ├── 착수/채팅/재시작 중계
//! │   ├── 플레이어 정리
//! │   └── 대기 목록 브로드캐스트
//! ├── ReaperService (주기 정리)
//! └── TcpGameService (TCP 서버)
//!     ├── 바인드/수락
//!     ├── 수용량 제한
//!     └── 종료 절차
//! ```

pub mod reaper_service;
pub mod registry_service;
pub mod tcp_service;

pub use reaper_service::{ReaperService, ReaperStats};
pub use registry_service::{ReapReport, RegistryService, RegistryStats};
pub use tcp_service::TcpGameService;
