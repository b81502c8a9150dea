//! 세션 상태 기계 테스트

use std::sync::Arc;
use tokio::sync::mpsc;

use crate::model::{Color, Player, PlayerId, Session, SessionId, SessionPhase};
use crate::tool::error::GameError;

fn player(id: u64, name: &str) -> Arc<Player> {
    let (tx, _rx) = mpsc::channel(8);
    Arc::new(Player::new(PlayerId::new(id), name.into(), id == 1, tx))
}

fn waiting_session() -> (Session, Arc<Player>) {
    let host = player(1, "A");
    (Session::new(SessionId::new(1), "match1".into(), host.clone()), host)
}

#[test]
fn test_new_session_is_waiting() {
    let (session, host) = waiting_session();
    assert_eq!(session.phase(), SessionPhase::Waiting);
    assert!(session.has_room());
    assert_eq!(session.label(), "match1");
    assert_eq!(session.color_of(host.id()), Some(Color::Black));
    assert!(session.opponent_of(host.id()).is_none());
}

#[test]
fn test_seating_guest_starts_game_with_black() {
    let (mut session, host) = waiting_session();
    let guest = player(2, "B");

    session.seat_guest(guest.clone()).unwrap();
    assert!(session.is_started());
    assert_eq!(session.turn(), Color::Black);
    assert_eq!(session.color_of(guest.id()), Some(Color::White));
    assert_eq!(session.opponent_of(host.id()).map(|p| p.id()), Some(guest.id()));
    assert_eq!(session.opponent_of(guest.id()).map(|p| p.id()), Some(host.id()));

    assert_eq!(session.seat_guest(player(3, "C")), Err(GameError::SessionFull));
}

#[test]
fn test_moves_alternate_turns() {
    let (mut session, host) = waiting_session();
    let guest = player(2, "B");

    assert_eq!(session.apply_move(host.id()), Err(GameError::GameNotStarted));

    session.seat_guest(guest.clone()).unwrap();
    assert_eq!(session.apply_move(guest.id()), Err(GameError::NotYourTurn));
    assert_eq!(session.apply_move(host.id()), Ok(Color::White));
    assert_eq!(session.apply_move(host.id()), Err(GameError::NotYourTurn));
    assert_eq!(session.apply_move(guest.id()), Ok(Color::Black));

    // 착석자가 아닌 플레이어는 턴을 가질 수 없습니다.
    assert_eq!(session.apply_move(PlayerId::new(9)), Err(GameError::NotYourTurn));
}

#[test]
fn test_reset_turn_returns_to_black() {
    let (mut session, host) = waiting_session();
    assert_eq!(session.reset_turn(), Err(GameError::GameNotStarted));

    session.seat_guest(player(2, "B")).unwrap();
    session.apply_move(host.id()).unwrap();
    assert_eq!(session.turn(), Color::White);
    assert_eq!(session.reset_turn(), Ok(Color::Black));
}

#[test]
fn test_liveness_tracks_occupants_and_phase() {
    let (mut session, _host) = waiting_session();
    let guest = player(2, "B");
    session.seat_guest(guest.clone()).unwrap();
    assert!(session.is_live());

    guest.disconnect();
    assert!(!session.is_live());

    let (mut other, _) = waiting_session();
    other.mark_over();
    assert!(other.is_over());
    assert!(!other.is_live());
    assert!(!other.has_room());
}
