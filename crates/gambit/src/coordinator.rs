//! The session coordinator: join, move arbitration, reset, leave,
//! disconnect.
//!
//! Every intent from every connection funnels through one `Coordinator`
//! behind a lock (see `server.rs`), so each operation here runs its full
//! read-validate-apply-broadcast sequence without interleaving. That is
//! the per-room atomicity guarantee: two concurrent move attempts
//! against the same room can never both be applied to the same pre-move
//! board.
//!
//! Rejections that the wire surface keeps silent (out of turn, illegal,
//! unknown room) are still returned as values, so tests and stricter
//! front ends can observe them without changing default wire behavior.

use gambit_protocol::{
    ConnectionId, LastMove, Promotion, Role, RoomId, Seat, SeatChoice,
    ServerMessage,
};
use gambit_room::{Room, RoomDirectory, RoomError};
use gambit_rules::{MoveRequest, Rules, Verdict};

use crate::Gateway;

/// What became of a submitted move. Only `Applied` and `Finished`
/// produce broadcasts; the rest are total no-ops.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MoveOutcome {
    /// Accepted and broadcast; the game continues.
    Applied,
    /// Accepted and broadcast; the resulting position is terminal.
    Finished(Verdict),
    /// The room was never created. Nothing to move against.
    UnknownRoom,
    /// The sender holds a seat and it is not that seat's turn.
    OutOfTurn,
    /// The rules engine rejected the move.
    Illegal,
}

/// Maps connections to rooms and seats, arbitrates turns, and emits
/// notifications through the gateway.
pub struct Coordinator<R: Rules, G: Gateway> {
    rules: R,
    gateway: G,
    rooms: RoomDirectory<R::Board>,
}

impl<R: Rules, G: Gateway> Coordinator<R, G> {
    /// Creates a coordinator with an empty room directory.
    pub fn new(rules: R, gateway: G) -> Self {
        Self {
            rules,
            gateway,
            rooms: RoomDirectory::new(),
        }
    }

    /// Access to the gateway, for connection registration.
    pub fn gateway_mut(&mut self) -> &mut G {
        &mut self.gateway
    }

    /// Handles a join intent: resolve the room (creating it if new),
    /// resolve the seat, subscribe, and notify.
    ///
    /// On `SeatTaken` the requester gets a `joinError` and nothing else
    /// changes — no membership, no broadcast.
    pub fn join(
        &mut self,
        conn: ConnectionId,
        room_id: &RoomId,
        choice: SeatChoice,
    ) -> Result<Role, RoomError> {
        let rules = &self.rules;
        let room = self.rooms.get_or_create(room_id, || rules.initial());

        let resolved = match choice {
            SeatChoice::White => Some(Seat::White),
            SeatChoice::Black => Some(Seat::Black),
            SeatChoice::Auto => room.seats().first_vacant(),
        };

        if let Some(seat) = resolved {
            if let Err(err) = room.seats_mut().claim(seat, conn) {
                tracing::debug!(
                    room = %room_id,
                    %conn,
                    %seat,
                    "join rejected, seat taken"
                );
                self.gateway.unicast(
                    conn,
                    ServerMessage::JoinError {
                        message: err.to_string(),
                    },
                );
                return Err(err);
            }
        }

        let role = Role::from(resolved);
        self.gateway.subscribe(room_id, conn);
        tracing::info!(room = %room_id, %conn, ?role, "joined room");

        self.gateway
            .unicast(conn, ServerMessage::ColorAssigned { seat: role });
        self.gateway
            .unicast(conn, Self::state_message(&self.rules, room));
        self.gateway
            .broadcast(room_id, Self::players_message(room));

        Ok(role)
    }

    /// Handles a move intent.
    ///
    /// Seat holders are gated on the board's turn side; spectators are
    /// not, and the rules engine's legality check is all that stands
    /// between them and the board (preserved source behavior). On
    /// acceptance, exactly one `state` broadcast goes out, plus one
    /// `gameOver` if the position is terminal.
    pub fn submit_move(
        &mut self,
        conn: ConnectionId,
        room_id: &RoomId,
        from: &str,
        to: &str,
        promotion: Option<Promotion>,
    ) -> MoveOutcome {
        let Some(room) = self.rooms.get_mut(room_id) else {
            tracing::debug!(room = %room_id, %conn, "move for unknown room ignored");
            return MoveOutcome::UnknownRoom;
        };

        if let Some(seat) = room.seats().seat_of(conn) {
            if seat != self.rules.turn_side(room.board()) {
                tracing::debug!(
                    room = %room_id,
                    %conn,
                    %seat,
                    "move out of turn ignored"
                );
                return MoveOutcome::OutOfTurn;
            }
        }

        let request = MoveRequest {
            from: from.to_string(),
            to: to.to_string(),
            promotion: promotion.unwrap_or_default(),
        };
        let applied = match self.rules.apply(room.board(), &request) {
            Ok(applied) => applied,
            Err(err) => {
                tracing::debug!(
                    room = %room_id,
                    %conn,
                    error = %err,
                    "illegal move ignored"
                );
                return MoveOutcome::Illegal;
            }
        };

        room.record_move(
            applied.board,
            LastMove {
                from: request.from,
                to: request.to,
                san: applied.san,
            },
        );
        self.gateway
            .broadcast(room_id, Self::state_message(&self.rules, room));

        let verdict = self.rules.classify(room.board());
        if let Some(msg) = game_over_message(verdict) {
            tracing::info!(room = %room_id, ?verdict, "game over");
            self.gateway.broadcast(room_id, msg);
            return MoveOutcome::Finished(verdict);
        }

        MoveOutcome::Applied
    }

    /// Handles a reset intent: fresh board, cleared last move, one
    /// `state` broadcast. Seats keep their holders. There is no
    /// authorization check — spectators may reset, documented behavior.
    /// Returns `false` for an unknown room (no-op).
    pub fn reset(&mut self, room_id: &RoomId) -> bool {
        let Some(room) = self.rooms.get_mut(room_id) else {
            return false;
        };

        room.reset(self.rules.initial());
        tracing::info!(room = %room_id, "room reset");
        self.gateway
            .broadcast(room_id, Self::state_message(&self.rules, room));
        true
    }

    /// Handles a voluntary leave: vacate any seat held in the room and
    /// announce the vacancy, then unsubscribe regardless of prior
    /// membership.
    pub fn leave_room(&mut self, conn: ConnectionId, room_id: &RoomId) {
        if let Some(room) = self.rooms.get_mut(room_id) {
            if let Some(seat) = room.seats_mut().vacate(conn) {
                tracing::info!(room = %room_id, %conn, %seat, "seat vacated");
                self.gateway
                    .broadcast(room_id, Self::players_message(room));
            }
        }
        self.gateway.unsubscribe(room_id, conn);
    }

    /// Handles connection termination. Called exactly once per
    /// connection, after its socket closes.
    ///
    /// Sweeps every room in the directory because the transport layer
    /// does not track which room(s) a connection joined — O(rooms), fine
    /// at this scale.
    pub fn disconnect(&mut self, conn: ConnectionId) {
        let mut vacated = Vec::new();
        for (room_id, room) in self.rooms.iter_mut() {
            if room.seats_mut().vacate(conn).is_some() {
                let (white, black) = room.seats().occupancy();
                vacated.push((room_id.clone(), white, black));
            }
        }
        for (room_id, white, black) in vacated {
            tracing::info!(room = %room_id, %conn, "seat vacated by disconnect");
            self.gateway
                .broadcast(&room_id, ServerMessage::Players { white, black });
        }
        self.gateway.drop_connection(conn);
        tracing::debug!(%conn, "connection removed");
    }

    fn state_message(rules: &R, room: &Room<R::Board>) -> ServerMessage {
        ServerMessage::State {
            position: rules.serialize(room.board()),
            turn: rules.turn_side(room.board()),
            last_move: room.last_move().cloned(),
        }
    }

    fn players_message(room: &Room<R::Board>) -> ServerMessage {
        let (white, black) = room.seats().occupancy();
        ServerMessage::Players { white, black }
    }
}

/// Builds the terminal-outcome notification, or `None` while the game
/// is still going.
fn game_over_message(verdict: Verdict) -> Option<ServerMessage> {
    let (checkmate, stalemate, repetition, insufficient, winner) =
        match verdict {
            Verdict::Ongoing => return None,
            Verdict::Checkmate { winner } => {
                (true, false, false, false, Some(winner))
            }
            Verdict::Stalemate => (false, true, false, false, None),
            Verdict::Repetition => (false, false, true, false, None),
            Verdict::InsufficientMaterial => {
                (false, false, false, true, None)
            }
            Verdict::OtherDraw => (false, false, false, false, None),
        };

    Some(ServerMessage::GameOver {
        checkmate,
        draw: !checkmate,
        stalemate,
        repetition,
        insufficient,
        winner,
    })
}
