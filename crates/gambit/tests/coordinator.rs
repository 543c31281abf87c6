//! Scenario tests for the coordinator, driven through a capturing
//! gateway — no network involved.

use gambit::prelude::*;
use tokio::sync::mpsc::UnboundedReceiver;

type Inbox = UnboundedReceiver<ServerMessage>;

fn coordinator() -> Coordinator<StandardChess, ChannelGateway> {
    Coordinator::new(StandardChess, ChannelGateway::new())
}

/// Registers a connection and returns its id plus the channel the
/// gateway will deliver into.
fn connect(
    c: &mut Coordinator<StandardChess, ChannelGateway>,
    id: u64,
) -> (ConnectionId, Inbox) {
    let conn = ConnectionId::new(id);
    let inbox = c.gateway_mut().register(conn);
    (conn, inbox)
}

fn drain(inbox: &mut Inbox) -> Vec<ServerMessage> {
    let mut out = Vec::new();
    while let Ok(msg) = inbox.try_recv() {
        out.push(msg);
    }
    out
}

fn initial_fen() -> String {
    let rules = StandardChess;
    let board = rules.initial();
    rules.serialize(&board)
}

/// Picks the `state` messages out of an inbox drain.
fn states(msgs: &[ServerMessage]) -> Vec<&ServerMessage> {
    msgs.iter()
        .filter(|m| matches!(m, ServerMessage::State { .. }))
        .collect()
}

// =========================================================================
// Join / seat assignment
// =========================================================================

#[test]
fn test_auto_join_order_white_black_then_spectators() {
    let mut c = coordinator();
    let room = RoomId::from("R1");
    let (a, _) = connect(&mut c, 1);
    let (b, _) = connect(&mut c, 2);
    let (s1, _) = connect(&mut c, 3);
    let (s2, _) = connect(&mut c, 4);

    assert_eq!(c.join(a, &room, SeatChoice::Auto).unwrap(), Role::White);
    assert_eq!(c.join(b, &room, SeatChoice::Auto).unwrap(), Role::Black);
    assert_eq!(
        c.join(s1, &room, SeatChoice::Auto).unwrap(),
        Role::Spectator
    );
    assert_eq!(
        c.join(s2, &room, SeatChoice::Auto).unwrap(),
        Role::Spectator
    );
}

#[test]
fn test_join_notifications_for_first_joiner() {
    let mut c = coordinator();
    let room = RoomId::from("R1");
    let (a, mut inbox_a) = connect(&mut c, 1);

    c.join(a, &room, SeatChoice::Auto).unwrap();

    let msgs = drain(&mut inbox_a);
    assert_eq!(msgs.len(), 3);
    assert_eq!(msgs[0], ServerMessage::ColorAssigned { seat: Role::White });
    assert_eq!(
        msgs[1],
        ServerMessage::State {
            position: initial_fen(),
            turn: Seat::White,
            last_move: None,
        }
    );
    assert_eq!(
        msgs[2],
        ServerMessage::Players {
            white: true,
            black: false,
        }
    );
}

#[test]
fn test_taken_seat_yields_join_error_and_changes_nothing() {
    let mut c = coordinator();
    let room = RoomId::from("R1");
    let (a, mut inbox_a) = connect(&mut c, 1);
    let (intruder, mut inbox_i) = connect(&mut c, 2);

    c.join(a, &room, SeatChoice::White).unwrap();
    drain(&mut inbox_a);

    let result = c.join(intruder, &room, SeatChoice::White);
    assert!(matches!(result, Err(RoomError::SeatTaken(Seat::White))));

    // The requester hears exactly one joinError; the incumbent hears
    // nothing at all.
    let msgs = drain(&mut inbox_i);
    assert_eq!(msgs.len(), 1);
    assert!(matches!(msgs[0], ServerMessage::JoinError { .. }));
    assert!(drain(&mut inbox_a).is_empty());

    // White is still held by A: a fresh auto joiner lands on black.
    let (b, _) = connect(&mut c, 3);
    assert_eq!(c.join(b, &room, SeatChoice::Auto).unwrap(), Role::Black);
}

#[test]
fn test_rejected_joiner_is_not_subscribed() {
    let mut c = coordinator();
    let room = RoomId::from("R1");
    let (a, _) = connect(&mut c, 1);
    let (b, _) = connect(&mut c, 2);
    let (intruder, mut inbox_i) = connect(&mut c, 3);

    c.join(a, &room, SeatChoice::Auto).unwrap();
    c.join(b, &room, SeatChoice::Auto).unwrap();
    let _ = c.join(intruder, &room, SeatChoice::White);
    drain(&mut inbox_i);

    // A room broadcast does not reach the rejected requester...
    c.submit_move(a, &room, "e2", "e4", None);
    assert!(drain(&mut inbox_i).is_empty());

    // ...until it joins properly, as a spectator.
    assert_eq!(
        c.join(intruder, &room, SeatChoice::Auto).unwrap(),
        Role::Spectator
    );
}

#[test]
fn test_rejoin_own_seat_is_idempotent() {
    let mut c = coordinator();
    let room = RoomId::from("R1");
    let (a, _) = connect(&mut c, 1);

    assert_eq!(c.join(a, &room, SeatChoice::White).unwrap(), Role::White);
    assert_eq!(c.join(a, &room, SeatChoice::White).unwrap(), Role::White);

    // Seat still reads as held by exactly one connection.
    let (b, _) = connect(&mut c, 2);
    assert_eq!(c.join(b, &room, SeatChoice::Auto).unwrap(), Role::Black);
}

// =========================================================================
// Move arbitration
// =========================================================================

#[test]
fn test_out_of_turn_move_is_a_total_noop() {
    let mut c = coordinator();
    let room = RoomId::from("R1");
    let (a, mut inbox_a) = connect(&mut c, 1);
    let (b, mut inbox_b) = connect(&mut c, 2);
    c.join(a, &room, SeatChoice::Auto).unwrap();
    c.join(b, &room, SeatChoice::Auto).unwrap();
    drain(&mut inbox_a);
    drain(&mut inbox_b);

    // Black tries to open.
    let outcome = c.submit_move(b, &room, "e7", "e5", None);
    assert_eq!(outcome, MoveOutcome::OutOfTurn);

    // No broadcast to anyone, and the board is untouched: white's
    // opening still works.
    assert!(drain(&mut inbox_a).is_empty());
    assert!(drain(&mut inbox_b).is_empty());
    assert_eq!(
        c.submit_move(a, &room, "e2", "e4", None),
        MoveOutcome::Applied
    );
}

#[test]
fn test_illegal_move_is_a_total_noop() {
    let mut c = coordinator();
    let room = RoomId::from("R1");
    let (a, mut inbox_a) = connect(&mut c, 1);
    c.join(a, &room, SeatChoice::Auto).unwrap();
    drain(&mut inbox_a);

    assert_eq!(
        c.submit_move(a, &room, "e2", "e5", None),
        MoveOutcome::Illegal
    );
    assert!(drain(&mut inbox_a).is_empty());
}

#[test]
fn test_unknown_room_intents_are_noops() {
    let mut c = coordinator();
    let ghost = RoomId::from("never-created");
    let (a, mut inbox_a) = connect(&mut c, 1);

    assert_eq!(
        c.submit_move(a, &ghost, "e2", "e4", None),
        MoveOutcome::UnknownRoom
    );
    assert!(!c.reset(&ghost));
    c.leave_room(a, &ghost);

    assert!(drain(&mut inbox_a).is_empty());
}

#[test]
fn test_accepted_move_broadcasts_one_state_to_every_member() {
    let mut c = coordinator();
    let room = RoomId::from("R1");
    let (a, mut inbox_a) = connect(&mut c, 1);
    let (b, mut inbox_b) = connect(&mut c, 2);
    let (s, mut inbox_s) = connect(&mut c, 3);
    c.join(a, &room, SeatChoice::Auto).unwrap();
    c.join(b, &room, SeatChoice::Auto).unwrap();
    c.join(s, &room, SeatChoice::Auto).unwrap();
    drain(&mut inbox_a);
    drain(&mut inbox_b);
    drain(&mut inbox_s);

    assert_eq!(
        c.submit_move(a, &room, "e2", "e4", None),
        MoveOutcome::Applied
    );

    for inbox in [&mut inbox_a, &mut inbox_b, &mut inbox_s] {
        let msgs = drain(inbox);
        let snapshots = states(&msgs);
        assert_eq!(snapshots.len(), 1);
        let ServerMessage::State {
            turn, last_move, ..
        } = snapshots[0]
        else {
            unreachable!();
        };
        assert_eq!(*turn, Seat::Black);
        assert_eq!(
            *last_move,
            Some(LastMove {
                from: "e2".into(),
                to: "e4".into(),
                san: "e4".into(),
            })
        );
    }
}

/// The first concrete scenario from the requirements: A and B auto-seat,
/// A opens, B replays A's move out of turn, then answers properly.
#[test]
fn test_two_player_opening_scenario() {
    let mut c = coordinator();
    let room = RoomId::from("R1");
    let (a, _) = connect(&mut c, 1);
    let (b, mut inbox_b) = connect(&mut c, 2);

    assert_eq!(c.join(a, &room, SeatChoice::Auto).unwrap(), Role::White);
    assert_eq!(c.join(b, &room, SeatChoice::Auto).unwrap(), Role::Black);
    drain(&mut inbox_b);

    assert_eq!(
        c.submit_move(a, &room, "e2", "e4", None),
        MoveOutcome::Applied
    );
    let msgs = drain(&mut inbox_b);
    let snapshots = states(&msgs);
    let ServerMessage::State {
        turn, last_move, ..
    } = snapshots[0]
    else {
        unreachable!();
    };
    assert_eq!(*turn, Seat::Black);
    assert_eq!(last_move.as_ref().unwrap().san, "e4");

    // It is B's turn now, but e2->e4 has no piece behind it anymore —
    // the rules engine drops it.
    assert_eq!(
        c.submit_move(b, &room, "e2", "e4", None),
        MoveOutcome::Illegal
    );

    assert_eq!(
        c.submit_move(b, &room, "e7", "e5", None),
        MoveOutcome::Applied
    );
}

#[test]
fn test_checkmate_broadcasts_game_over_once() {
    let mut c = coordinator();
    let room = RoomId::from("R1");
    let (a, mut inbox_a) = connect(&mut c, 1);
    let (b, mut inbox_b) = connect(&mut c, 2);
    c.join(a, &room, SeatChoice::Auto).unwrap();
    c.join(b, &room, SeatChoice::Auto).unwrap();

    // Fool's mate.
    c.submit_move(a, &room, "f2", "f3", None);
    c.submit_move(b, &room, "e7", "e5", None);
    c.submit_move(a, &room, "g2", "g4", None);
    let outcome = c.submit_move(b, &room, "d8", "h4", None);
    assert_eq!(
        outcome,
        MoveOutcome::Finished(Verdict::Checkmate {
            winner: Seat::Black
        })
    );

    for inbox in [&mut inbox_a, &mut inbox_b] {
        let msgs = drain(inbox);
        let game_overs: Vec<_> = msgs
            .iter()
            .filter(|m| matches!(m, ServerMessage::GameOver { .. }))
            .collect();
        assert_eq!(game_overs.len(), 1);
        assert_eq!(
            *game_overs[0],
            ServerMessage::GameOver {
                checkmate: true,
                draw: false,
                stalemate: false,
                repetition: false,
                insufficient: false,
                winner: Some(Seat::Black),
            }
        );
    }
}

// =========================================================================
// Reset
// =========================================================================

#[test]
fn test_reset_restores_initial_state() {
    let mut c = coordinator();
    let room = RoomId::from("R1");
    let (a, mut inbox_a) = connect(&mut c, 1);
    let (b, _) = connect(&mut c, 2);
    c.join(a, &room, SeatChoice::Auto).unwrap();
    c.join(b, &room, SeatChoice::Auto).unwrap();
    c.submit_move(a, &room, "e2", "e4", None);
    c.submit_move(b, &room, "e7", "e5", None);
    drain(&mut inbox_a);

    assert!(c.reset(&room));

    let msgs = drain(&mut inbox_a);
    assert_eq!(
        msgs,
        vec![ServerMessage::State {
            position: initial_fen(),
            turn: Seat::White,
            last_move: None,
        }]
    );
}

#[test]
fn test_spectators_may_reset() {
    let mut c = coordinator();
    let room = RoomId::from("R1");
    let (a, _) = connect(&mut c, 1);
    let (b, _) = connect(&mut c, 2);
    let (s, _) = connect(&mut c, 3);
    c.join(a, &room, SeatChoice::Auto).unwrap();
    c.join(b, &room, SeatChoice::Auto).unwrap();
    c.join(s, &room, SeatChoice::Auto).unwrap();
    c.submit_move(a, &room, "e2", "e4", None);

    // No authorization gate on reset, by design.
    assert!(c.reset(&room));
}

// =========================================================================
// Leave / disconnect
// =========================================================================

#[test]
fn test_leave_vacates_seat_and_unsubscribes() {
    let mut c = coordinator();
    let room = RoomId::from("R1");
    let (a, mut inbox_a) = connect(&mut c, 1);
    let (b, mut inbox_b) = connect(&mut c, 2);
    c.join(a, &room, SeatChoice::Auto).unwrap();
    c.join(b, &room, SeatChoice::Auto).unwrap();
    drain(&mut inbox_a);
    drain(&mut inbox_b);

    c.leave_room(b, &room);

    // A sees the vacancy; B is out of the broadcast group.
    assert_eq!(
        drain(&mut inbox_a),
        vec![ServerMessage::Players {
            white: true,
            black: false,
        }]
    );
    c.submit_move(a, &room, "e2", "e4", None);
    // B received its own vacancy notice (sent before unsubscription
    // takes it out of the group) and nothing after.
    let msgs = drain(&mut inbox_b);
    assert_eq!(
        msgs,
        vec![ServerMessage::Players {
            white: true,
            black: false,
        }]
    );
}

#[test]
fn test_disconnect_sweeps_all_rooms_but_only_own_seats() {
    let mut c = coordinator();
    let r1 = RoomId::from("R1");
    let r2 = RoomId::from("R2");
    let (a, _) = connect(&mut c, 1);
    let (b, mut inbox_b) = connect(&mut c, 2);

    // A seats in both rooms; B holds black in R1 only.
    c.join(a, &r1, SeatChoice::Auto).unwrap();
    c.join(a, &r2, SeatChoice::Auto).unwrap();
    c.join(b, &r1, SeatChoice::Auto).unwrap();
    drain(&mut inbox_b);

    c.disconnect(a);

    // B keeps its seat and hears the vacancy in R1.
    assert_eq!(
        drain(&mut inbox_b),
        vec![ServerMessage::Players {
            white: false,
            black: true,
        }]
    );

    // Both of A's seats are actually free again.
    let (d, _) = connect(&mut c, 3);
    assert_eq!(c.join(d, &r1, SeatChoice::Auto).unwrap(), Role::White);
    let (e, _) = connect(&mut c, 4);
    assert_eq!(c.join(e, &r2, SeatChoice::Auto).unwrap(), Role::White);
}
