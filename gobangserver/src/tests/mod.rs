//! 오목 서버 테스트 모듈
//!
//! 각 기능별로 분리된 테스트 파일들을 관리합니다.

pub mod test_handler;
pub mod test_protocol;
pub mod test_session;

// 테스트 유틸리티
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::model::Player;
use crate::service::RegistryService;

/// 테스트용 플레이어 연결 (플레이어와 송신 큐 수신 측)
pub struct TestClient {
    pub player: Arc<Player>,
    pub rx: mpsc::Receiver<String>,
}

impl TestClient {
    /// 지금까지 큐에 쌓인 메시지를 모두 꺼냅니다.
    pub fn drain(&mut self) -> Vec<String> {
        let mut lines = Vec::new();
        while let Ok(line) = self.rx.try_recv() {
            lines.push(line);
        }
        lines
    }
}

/// 테스트용 레지스트리 생성
pub fn create_test_registry() -> Arc<RegistryService> {
    Arc::new(RegistryService::new())
}

/// 레지스트리에 플레이어를 등록합니다.
pub fn connect(registry: &RegistryService, name: &str, is_host: bool) -> TestClient {
    let (tx, rx) = mpsc::channel(64);
    let player = registry.register_player(name.to_string(), is_host, tx);
    TestClient { player, rx }
}

/// 호스트 A 와 게스트 B 가 대국을 시작한 상태를 만듭니다. 큐는 비운 상태로 돌려줍니다.
pub fn start_match(registry: &RegistryService) -> (TestClient, TestClient) {
    let mut host = connect(registry, "A", true);
    let mut guest = connect(registry, "B", false);

    let session_id = registry
        .create_session(&host.player, "match1".into())
        .expect("create_session");
    registry
        .join_session(&guest.player, &session_id.to_string())
        .expect("join_session");

    host.drain();
    guest.drain();
    (host, guest)
}
