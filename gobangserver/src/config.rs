//! 오목 서버 환경 설정 모듈
//!
//! .env 파일과 환경변수에서 설정을 로드하고 검증합니다.

use anyhow::Result;
use std::path::Path;
use std::str::FromStr;
use tokio::time::Duration;
use tracing::{info, warn};

/// 오목 서버 설정 구조체
#[derive(Debug, Clone)]
pub struct GobangServerConfig {
    /// 바인드 호스트 주소
    pub host: String,
    /// 리슨 포트 번호
    pub port: u16,
    /// 동시 접속 가능한 최대 연결 수
    pub max_players: usize,
    /// 리퍼 주기 (초)
    pub reap_interval_secs: u64,
    /// 핸드셰이크 대기 시간 (초, 0이면 제한 없음)
    pub handshake_timeout_secs: u64,
    /// 종료 시 연결 태스크를 기다리는 시간 (초)
    pub shutdown_grace_secs: u64,
    /// 플레이어별 송신 큐 크기
    pub outbound_buffer: usize,
}

impl Default for GobangServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 12345,
            max_players: 100,
            reap_interval_secs: 30,
            handshake_timeout_secs: 30,
            shutdown_grace_secs: 5,
            outbound_buffer: 256,
        }
    }
}

impl GobangServerConfig {
    /// 환경변수에서 설정을 로드합니다.
    ///
    /// 로드 순서:
    /// 1. 상위 디렉토리의 .env 파일
    /// 2. 현재 디렉토리의 .env 파일
    /// 3. 시스템 환경변수
    /// 4. 기본값
    pub fn from_env() -> Result<Self> {
        Self::load_env_file();

        let defaults = Self::default();
        let config = Self {
            host: std::env::var("gobang_host").unwrap_or(defaults.host),
            port: env_or("gobang_port", defaults.port),
            max_players: env_or("gobang_max_players", defaults.max_players),
            reap_interval_secs: env_or("gobang_reap_interval_secs", defaults.reap_interval_secs),
            handshake_timeout_secs: env_or(
                "gobang_handshake_timeout_secs",
                defaults.handshake_timeout_secs,
            ),
            shutdown_grace_secs: env_or("gobang_shutdown_grace_secs", defaults.shutdown_grace_secs),
            outbound_buffer: env_or("gobang_outbound_buffer", defaults.outbound_buffer),
        };

        info!("오목 서버 설정 로드 완료: {:?}", config);
        Ok(config)
    }

    /// 바인딩 주소를 반환합니다.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn reap_interval(&self) -> Duration {
        Duration::from_secs(self.reap_interval_secs)
    }

    pub fn handshake_timeout(&self) -> Option<Duration> {
        (self.handshake_timeout_secs > 0).then(|| Duration::from_secs(self.handshake_timeout_secs))
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_secs)
    }

    /// .env 파일을 로드합니다.
    fn load_env_file() {
        let env_paths = ["../.env", ".env", "../../.env"];

        let mut loaded = false;
        for path in env_paths {
            if Path::new(path).exists() && dotenv::from_filename(path).is_ok() {
                info!(".env 파일 로드 성공: {}", path);
                loaded = true;
                break;
            }
        }

        if !loaded {
            warn!(".env 파일을 찾을 수 없습니다. 기본값과 시스템 환경변수를 사용합니다.");
        }
    }
}

/// 환경변수를 읽어 파싱합니다. 없거나 형식이 틀리면 기본값을 사용합니다.
fn env_or<T: FromStr + std::fmt::Debug>(key: &str, default: T) -> T {
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("{} 값이 올바르지 않습니다 ({}); 기본값 {:?} 사용", key, raw, default);
            default
        }),
        Err(_) => default,
    }
}

/// 설정 검증 유틸리티
pub fn validate_config(config: &GobangServerConfig) -> Result<()> {
    if config.port < 1024 {
        anyhow::bail!("유효하지 않은 포트 번호: {} (1024-65535)", config.port);
    }

    if !(2..=1000).contains(&config.max_players) {
        anyhow::bail!("유효하지 않은 최대 플레이어 수: {} (2-1000)", config.max_players);
    }

    if config.host.trim().is_empty() {
        anyhow::bail!("호스트 주소가 비어있습니다");
    }

    if config.reap_interval_secs == 0 {
        anyhow::bail!("리퍼 주기는 0보다 커야 합니다");
    }

    if config.outbound_buffer == 0 {
        anyhow::bail!("송신 큐 크기는 0보다 커야 합니다");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = GobangServerConfig::default();
        assert!(validate_config(&config).is_ok());
        assert_eq!(config.bind_address(), "0.0.0.0:12345");
        assert_eq!(config.handshake_timeout(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_zero_handshake_timeout_disables_limit() {
        let config = GobangServerConfig {
            handshake_timeout_secs: 0,
            ..GobangServerConfig::default()
        };
        assert_eq!(config.handshake_timeout(), None);
    }

    #[test]
    fn test_validate_rejects_out_of_range_values() {
        let base = GobangServerConfig::default();

        let low_port = GobangServerConfig { port: 80, ..base.clone() };
        assert!(validate_config(&low_port).is_err());

        let one_player = GobangServerConfig { max_players: 1, ..base.clone() };
        assert!(validate_config(&one_player).is_err());

        let too_many = GobangServerConfig { max_players: 1001, ..base.clone() };
        assert!(validate_config(&too_many).is_err());

        let empty_host = GobangServerConfig { host: " ".into(), ..base.clone() };
        assert!(validate_config(&empty_host).is_err());

        let no_reap = GobangServerConfig { reap_interval_secs: 0, ..base.clone() };
        assert!(validate_config(&no_reap).is_err());

        let no_buffer = GobangServerConfig { outbound_buffer: 0, ..base };
        assert!(validate_config(&no_buffer).is_err());
    }
}
