//! 도메인 모델
//!
//! 플레이어, 세션과 두 엔티티가 공유하는 식별자/색상 타입을 정의합니다.

pub mod player;
pub mod session;

pub use player::Player;
pub use session::{Session, SessionPhase};

use std::fmt;
use std::str::FromStr;

use crate::tool::error::GameError;

/// 서버가 할당하는 플레이어 ID (`P1`, `P2`, ...)
///
/// 프로세스 수명 동안 재사용되지 않습니다. 0은 "없음"을 표현하는 데 예약되어 있습니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlayerId(u64);

/// 서버가 할당하는 세션 ID (`S1`, `S2`, ...)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(u64);

impl PlayerId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl SessionId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S{}", self.0)
    }
}

impl FromStr for SessionId {
    type Err = GameError;

    /// `S<n>` 형식만 허용합니다. `n` 은 1 이상입니다.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s
            .trim()
            .strip_prefix('S')
            .and_then(|digits| digits.parse::<u64>().ok())
            .filter(|n| *n > 0)
            .ok_or(GameError::SessionNotFound)?;
        Ok(Self(raw))
    }
}

/// 돌 색상. 첫 번째 착석자가 흑입니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Black,
    White,
}

impl Color {
    pub fn opposite(self) -> Self {
        match self {
            Color::Black => Color::White,
            Color::White => Color::Black,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Color::Black => "black",
            Color::White => "white",
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
