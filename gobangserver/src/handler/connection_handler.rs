//! 연결 핸들러
//!
//! 연결 하나의 전체 생명주기를 담당합니다.
//!
//! 1. 첫 줄 핸드셰이크 (`PLAYER_INFO:<name>:<isHost>`)
//! 2. 플레이어 등록 후 `CONNECTED:<id>` 응답
//! 3. 수신 줄, 송신 큐, 종료 신호를 동시에 기다리는 명령 루프
//! 4. 정리 후 남은 송신 큐를 비우고 소켓 종료
//!
//! 소켓 쓰기는 항상 종료 신호와 경쟁합니다. 상대가 읽지 않아 쓰기가 막혀도
//! 정리 경로가 연결 태스크를 깨울 수 있고, 종료 직전의 플러시는
//! `CLOSE_FLUSH_TIMEOUT` 안에 끝나지 않으면 버려집니다.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter, Lines};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::time::{timeout, Duration};
use tracing::{debug, info, info_span, Instrument, Span};

use crate::handler::message_handler::{DispatchOutcome, MessageHandler};
use crate::model::Player;
use crate::protocol::{self, Handshake, ServerMessage, INVALID_HANDSHAKE_REPLY};
use crate::service::RegistryService;
use crate::tool::error::{ErrorHandler, TcpResult, TcpServerError};

type LineReader = Lines<BufReader<OwnedReadHalf>>;
type LineWriter = BufWriter<OwnedWriteHalf>;

/// 연결을 닫기 전 남은 송신을 기다리는 최대 시간
const CLOSE_FLUSH_TIMEOUT: Duration = Duration::from_millis(500);

/// 연결 핸들러
#[derive(Clone)]
pub struct ConnectionHandler {
    registry: Arc<RegistryService>,
    messages: MessageHandler,
    /// `None` 이면 핸드셰이크 대기 시간 제한 없음
    handshake_timeout: Option<Duration>,
    outbound_buffer: usize,
}

impl ConnectionHandler {
    pub fn new(
        registry: Arc<RegistryService>,
        handshake_timeout: Option<Duration>,
        outbound_buffer: usize,
    ) -> Self {
        Self {
            messages: MessageHandler::new(registry.clone()),
            registry,
            handshake_timeout,
            outbound_buffer,
        }
    }

    /// 새 연결 처리. 에러는 이 연결 안에서만 기록되고 끝납니다.
    pub async fn handle_connection(self, stream: TcpStream, addr: SocketAddr) {
        let span = info_span!("conn", %addr, player_id = tracing::field::Empty);

        async move {
            debug!("연결 수락");
            if let Err(e) = self.serve(stream).await {
                ErrorHandler::handle_error(&e, e.severity(), "ConnectionHandler", "serve");
            }
        }
        .instrument(span)
        .await
    }

    async fn serve(&self, stream: TcpStream) -> TcpResult<()> {
        let (reader, writer) = stream.into_split();
        let mut lines = BufReader::new(reader).lines();
        let mut writer = BufWriter::new(writer);

        let handshake = match self.read_handshake(&mut lines).await {
            Ok(handshake) => handshake,
            Err(e @ TcpServerError::InvalidHandshake(_)) => {
                // 응답 실패는 무시하고 원래 에러를 보고합니다.
                let _ = timeout(CLOSE_FLUSH_TIMEOUT, async {
                    protocol::write_line(&mut writer, INVALID_HANDSHAKE_REPLY).await?;
                    writer.flush().await?;
                    writer.shutdown().await?;
                    TcpResult::Ok(())
                })
                .await;
                return Err(e);
            }
            Err(e) => return Err(e),
        };

        let (tx, mut rx) = mpsc::channel(self.outbound_buffer);
        let player = self
            .registry
            .register_player(handshake.name, handshake.is_host, tx);
        Span::current().record("player_id", tracing::field::display(player.id()));
        player.send(&ServerMessage::Connected {
            player_id: player.id(),
        });

        let result = self
            .command_loop(&player, &mut lines, &mut rx, &mut writer)
            .await;

        // 다른 경로가 먼저 정리했다면 아무것도 하지 않습니다.
        self.registry.cleanup_player(player.id());

        rx.close();
        let flushed = timeout(CLOSE_FLUSH_TIMEOUT, async {
            while let Ok(line) = rx.try_recv() {
                protocol::write_line(&mut writer, &line).await?;
            }
            writer.flush().await?;
            writer.shutdown().await?;
            TcpResult::Ok(())
        })
        .await;
        if flushed.is_err() {
            debug!("종료 플러시 시간 초과; 남은 송신 폐기");
        }

        info!("연결 종료");
        result
    }

    async fn read_handshake(&self, lines: &mut LineReader) -> TcpResult<Handshake> {
        let line = match self.handshake_timeout {
            Some(limit) => timeout(limit, lines.next_line())
                .await
                .map_err(|_| TcpServerError::HandshakeTimeout)??,
            None => lines.next_line().await?,
        };
        let line = line.ok_or(TcpServerError::ClosedBeforeHandshake)?;
        Handshake::parse(&line)
    }

    async fn command_loop(
        &self,
        player: &Arc<Player>,
        lines: &mut LineReader,
        rx: &mut mpsc::Receiver<String>,
        writer: &mut LineWriter,
    ) -> TcpResult<()> {
        while player.is_active() {
            tokio::select! {
                biased;

                _ = player.closed() => {
                    debug!("종료 신호 수신");
                    break;
                }

                Some(line) = rx.recv() => {
                    // 상대가 읽지 않으면 쓰기가 막히므로 종료 신호와 경쟁시킵니다.
                    tokio::select! {
                        biased;

                        _ = player.closed() => {
                            debug!("송신 중 종료 신호 수신");
                            break;
                        }
                        written = Self::write_pending(writer, line, rx) => written?,
                    }
                }

                read = lines.next_line() => match read {
                    Ok(Some(line)) => {
                        if self.messages.dispatch(player, &line) == DispatchOutcome::Disconnect {
                            break;
                        }
                    }
                    Ok(None) => {
                        debug!("클라이언트가 연결을 닫음");
                        break;
                    }
                    Err(e) if ErrorHandler::is_peer_reset(&e) => {
                        debug!(error = %e, "피어 연결 리셋");
                        break;
                    }
                    Err(e) => return Err(e.into()),
                },
            }
        }
        Ok(())
    }

    /// 받은 줄과 큐에 쌓인 나머지를 기록하고 한 번 플러시합니다.
    async fn write_pending(
        writer: &mut LineWriter,
        first: String,
        rx: &mut mpsc::Receiver<String>,
    ) -> TcpResult<()> {
        protocol::write_line(writer, &first).await?;
        while let Ok(line) = rx.try_recv() {
            protocol::write_line(writer, &line).await?;
        }
        writer.flush().await?;
        Ok(())
    }
}
