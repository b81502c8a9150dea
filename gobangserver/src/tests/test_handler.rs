//! 메시지 핸들러 테스트
//!
//! 와이어 문자열을 그대로 넣고 응답 문자열을 확인합니다.

use super::{connect, create_test_registry, start_match};
use crate::handler::{DispatchOutcome, MessageHandler};

#[test]
fn test_unknown_command_keeps_connection() {
    let registry = create_test_registry();
    let handler = MessageHandler::new(registry.clone());
    let mut client = connect(&registry, "A", true);

    assert_eq!(handler.dispatch(&client.player, "DANCE"), DispatchOutcome::Continue);
    assert_eq!(handler.dispatch(&client.player, ""), DispatchOutcome::Continue);
    assert_eq!(client.drain(), vec!["ERROR:Unknown command", "ERROR:Unknown command"]);
    assert!(client.player.is_active());
}

#[test]
fn test_precondition_errors_are_replied() {
    let registry = create_test_registry();
    let handler = MessageHandler::new(registry.clone());
    let mut guest = connect(&registry, "B", false);

    for (line, reply) in [
        ("CREATE_SESSION:m", "ERROR:Only hosts can create sessions"),
        ("JOIN_SESSION:S7", "ERROR:Session not found"),
        ("MOVE:1,1", "ERROR:Not in a session"),
        ("CHAT:hi", "ERROR:Not in a session"),
        ("RESTART", "ERROR:Not in a session"),
    ] {
        assert_eq!(handler.dispatch(&guest.player, line), DispatchOutcome::Continue);
        assert_eq!(guest.drain(), vec![reply], "reply to {line}");
    }
}

#[test]
fn test_full_match_over_dispatch() {
    let registry = create_test_registry();
    let handler = MessageHandler::new(registry.clone());
    let mut a = connect(&registry, "A", true);
    let mut b = connect(&registry, "B", false);

    handler.dispatch(&a.player, "CREATE_SESSION:match1");
    assert_eq!(a.drain(), vec!["SESSION_CREATED:S1:match1"]);
    assert_eq!(b.drain(), vec!["SESSION_LIST_UPDATE:S1,A"]);

    handler.dispatch(&b.player, "LIST_SESSIONS");
    assert_eq!(b.drain(), vec!["SESSION_LIST:S1,A"]);

    handler.dispatch(&b.player, "JOIN_SESSION:S1");
    assert_eq!(a.drain(), vec!["PLAYER_JOINED:B", "GAME_START:black:B:white"]);
    assert_eq!(b.drain(), vec!["GAME_START:white:A:black"]);

    handler.dispatch(&a.player, "MOVE:7,7");
    assert_eq!(b.drain(), vec!["MOVE:7,7", "TURN_CHANGE:white"]);
    assert_eq!(a.drain(), vec!["TURN_CHANGE:white"]);

    handler.dispatch(&a.player, "MOVE:8,8");
    assert_eq!(a.drain(), vec!["ERROR:Not your turn"]);
}

#[test]
fn test_player_info_and_disconnect() {
    let registry = create_test_registry();
    let handler = MessageHandler::new(registry.clone());
    let (mut host, mut guest) = start_match(&registry);

    handler.dispatch(&guest.player, "GET_PLAYER_INFO");
    assert_eq!(guest.drain(), vec!["PLAYER_INFO:P2:B:false"]);

    assert_eq!(
        handler.dispatch(&guest.player, "DISCONNECT"),
        DispatchOutcome::Disconnect
    );
    assert!(registry.player(guest.player.id()).is_none());
    assert_eq!(host.drain().first().map(String::as_str), Some("OPPONENT_DISCONNECTED"));
}
