/// Events emitted by a single `Processor::advance()` step, for a
/// presentation layer or test harness to observe without re-diffing the
/// whole `World`.

use crate::domain::{ActionKind, Coordinate};

#[derive(Clone, Debug, PartialEq)]
pub enum SimEvent {
    UnitMoved { unit_id: String, position: Coordinate },
    UnitDamaged { unit_id: String, amount: i64, position: Coordinate },
    UnitDied { unit_id: String, position: Coordinate },
    UnitClimbed { unit_id: String, position: Coordinate },
    /// A MOVE stopped short of its target because the next waypoint was
    /// blocked by dynamic occupancy it couldn't pass through.
    ActionBlocked { unit_id: String, action_kind: ActionKind },
}
