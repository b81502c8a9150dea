//! 오목 대전 중계 서버
//!
//! 사용법:
//!
//! ```text
//! gobangserver [OPTIONS]
//!   -p, --port <PORT>          리슨 포트 (기본값: 12345)
//!   -m, --max-players <N>      최대 동시 접속 수 (기본값: 100)
//!   -h, --help                 도움말 출력
//! ```

use anyhow::{bail, Context, Result};
use std::sync::Arc;
use tracing::{error, info};

use gobangserver::config::{validate_config, GobangServerConfig};
use gobangserver::service::TcpGameService;

const USAGE: &str = "\
사용법: gobangserver [OPTIONS]
  -p, --port <PORT>          리슨 포트 (기본값: 12345)
  -m, --max-players <N>      최대 동시 접속 수 (기본값: 100)
  -h, --help                 도움말 출력";

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let mut config = GobangServerConfig::from_env().context("설정 로드 실패")?;
    let args: Vec<String> = std::env::args().skip(1).collect();
    if !apply_args(&mut config, &args)? {
        println!("{USAGE}");
        return Ok(());
    }
    validate_config(&config).context("설정 검증 실패")?;

    let service = Arc::new(TcpGameService::new(config));
    let listener = service.bind().await?;

    let server = {
        let service = service.clone();
        tokio::spawn(async move { service.serve(listener).await })
    };

    tokio::signal::ctrl_c()
        .await
        .context("종료 신호 대기 실패")?;
    info!("종료 신호 수신");
    service.shutdown();

    match server.await {
        Ok(result) => result?,
        Err(e) => error!("서버 태스크 비정상 종료: {}", e),
    }

    info!("👋 오목 서버 종료");
    Ok(())
}

/// 로그 초기화
///
/// `RUST_LOG` 로 필터를 지정하고 `LOG_FORMAT=json` 이면 JSON 으로 출력합니다.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .json()
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .init();
    }

    std::panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::capture();
        tracing::error!(%info, ?backtrace, "panic");
    }));
}

/// 명령줄 인자로 설정을 덮어씁니다. 도움말 요청이면 `false`.
fn apply_args(config: &mut GobangServerConfig, args: &[String]) -> Result<bool> {
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-p" | "--port" => {
                config.port = iter
                    .next()
                    .and_then(|s| s.parse().ok())
                    .with_context(|| format!("{arg} 에는 올바른 포트 번호가 필요합니다"))?;
            }
            "-m" | "--max-players" => {
                config.max_players = iter
                    .next()
                    .and_then(|s| s.parse().ok())
                    .with_context(|| format!("{arg} 에는 올바른 숫자가 필요합니다"))?;
            }
            "-h" | "--help" => return Ok(false),
            other => bail!("알 수 없는 인자: {other}\n{USAGE}"),
        }
    }
    Ok(true)
}
