//! Room state for Gambit.
//!
//! A [`Room`] owns one game: its board handle, who holds each seat, and
//! the last accepted move. The [`RoomDirectory`] is the process-wide
//! registry mapping room identifiers to rooms, creating them lazily on
//! first reference.
//!
//! Rooms are passive data — all mutation happens through the coordinator
//! in the `gambit` crate, which is responsible for holding the lock that
//! makes each read-validate-apply-broadcast sequence atomic.

mod directory;
mod error;
mod room;

pub use directory::RoomDirectory;
pub use error::RoomError;
pub use room::{Room, Seats};
