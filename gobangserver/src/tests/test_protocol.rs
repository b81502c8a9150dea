//! 프로토콜 파싱/인코딩 테스트

use crate::model::{Color, PlayerId, SessionId};
use crate::protocol::{ClientCommand, Handshake, ServerMessage, SessionSummary};
use crate::tool::error::{GameError, TcpServerError};

#[test]
fn test_handshake_parsing() {
    let handshake = Handshake::parse("PLAYER_INFO:alice:true").unwrap();
    assert_eq!(handshake.name, "alice");
    assert!(handshake.is_host);

    let guest = Handshake::parse("PLAYER_INFO:bob:FALSE\r").unwrap();
    assert_eq!(guest.name, "bob");
    assert!(!guest.is_host);
}

#[test]
fn test_invalid_handshakes_are_rejected() {
    for line in [
        "",
        "HELLO",
        "PLAYER_INFO:alice",
        "PLAYER_INFO::true",
        "PLAYER_INFO:alice:yes",
        "CREATE_SESSION:alice:true",
    ] {
        assert!(
            matches!(Handshake::parse(line), Err(TcpServerError::InvalidHandshake(_))),
            "should reject {line:?}"
        );
    }
}

#[test]
fn test_command_parsing_keeps_payload_verbatim() {
    assert_eq!(
        ClientCommand::parse("MOVE:7,7").unwrap(),
        ClientCommand::Move { payload: "7,7".into() }
    );
    assert_eq!(
        ClientCommand::parse("CHAT:hi: there").unwrap(),
        ClientCommand::Chat { text: "hi: there".into() }
    );
    assert_eq!(
        ClientCommand::parse("CREATE_SESSION:match1").unwrap(),
        ClientCommand::CreateSession { label: "match1".into() }
    );
    assert_eq!(
        ClientCommand::parse("JOIN_SESSION:S1").unwrap(),
        ClientCommand::JoinSession { session_id: "S1".into() }
    );
    assert_eq!(ClientCommand::parse("LIST_SESSIONS").unwrap(), ClientCommand::ListSessions);
    assert_eq!(ClientCommand::parse("DISCONNECT\r").unwrap(), ClientCommand::Disconnect);
}

#[test]
fn test_unknown_commands() {
    assert_eq!(ClientCommand::parse(""), Err(GameError::UnknownCommand));
    assert_eq!(ClientCommand::parse("move:1,1"), Err(GameError::UnknownCommand));
    assert_eq!(ClientCommand::parse("FLY:away"), Err(GameError::UnknownCommand));
}

#[test]
fn test_session_id_parsing() {
    assert_eq!("S12".parse::<SessionId>(), Ok(SessionId::new(12)));
    assert_eq!("S0".parse::<SessionId>(), Err(GameError::SessionNotFound));
    assert_eq!("12".parse::<SessionId>(), Err(GameError::SessionNotFound));
    assert_eq!("Sx".parse::<SessionId>(), Err(GameError::SessionNotFound));
}

#[test]
fn test_server_message_encoding() {
    let cases = [
        (ServerMessage::Connected { player_id: PlayerId::new(3) }, "CONNECTED:P3"),
        (
            ServerMessage::SessionCreated {
                session_id: SessionId::new(1),
                label: "match1".into(),
            },
            "SESSION_CREATED:S1:match1",
        ),
        (ServerMessage::PlayerJoined { name: "B".into() }, "PLAYER_JOINED:B"),
        (
            ServerMessage::GameStart {
                color: Color::Black,
                opponent_name: "B".into(),
                opponent_color: Color::White,
            },
            "GAME_START:black:B:white",
        ),
        (ServerMessage::TurnChange { color: Color::White }, "TURN_CHANGE:white"),
        (
            ServerMessage::Chat {
                sender: "A".into(),
                text: "gg".into(),
            },
            "CHAT:A:gg",
        ),
        (
            ServerMessage::PlayerInfo {
                player_id: PlayerId::new(1),
                name: "A".into(),
                is_host: true,
            },
            "PLAYER_INFO:P1:A:true",
        ),
        (ServerMessage::error(GameError::NotYourTurn), "ERROR:Not your turn"),
    ];

    for (message, wire) in cases {
        assert_eq!(message.to_string(), wire);
    }
}

#[test]
fn test_session_list_encoding() {
    let entries = vec![
        SessionSummary {
            session_id: SessionId::new(1),
            host_name: "A".into(),
        },
        SessionSummary {
            session_id: SessionId::new(4),
            host_name: "C".into(),
        },
    ];

    assert_eq!(
        ServerMessage::SessionList(entries.clone()).to_string(),
        "SESSION_LIST:S1,A;S4,C"
    );
    assert_eq!(
        ServerMessage::SessionListUpdate(entries).to_string(),
        "SESSION_LIST_UPDATE:S1,A;S4,C"
    );
    assert_eq!(ServerMessage::SessionListUpdate(Vec::new()).to_string(), "SESSION_LIST_UPDATE:");
}
