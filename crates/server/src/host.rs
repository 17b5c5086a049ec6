//! Collaborator interfaces: the simulated world and the match queue.

use crate::error::HostError;
use crate::generator::SpawnableBotTemplate;
use crate::waypoint::WaypointNode;
use common::{BotId, PlayerId, Position, RegionId, TeamId};

/// Match queue identifier (battleground type and bracket).
pub type QueueId = u32;
/// Running match instance identifier.
pub type MatchId = u32;

/// The world actors are placed into.
pub trait WorldHost {
    /// Place a bot at `node`. It enters the world asynchronously.
    fn spawn(
        &mut self,
        bot: &SpawnableBotTemplate,
        node: &WaypointNode,
        level: u8,
    ) -> Result<(), HostError>;

    /// Whether a placed bot has fully entered the world.
    fn is_in_world(&self, id: BotId) -> bool;

    /// Remove a bot from the world.
    fn remove(&mut self, id: BotId) -> Result<(), HostError>;

    fn teleport(&mut self, id: BotId, region: RegionId, position: Position) -> Result<(), HostError>;

    /// Advance pending placements.
    fn update(&mut self, _diff: u32) {}
}

/// Where a player stands relative to matchmaking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerMatchStatus {
    InMatch { match_id: MatchId },
    Queued,
    /// Offline or no longer queued.
    Unreachable,
}

/// Competitive match queue.
pub trait MatchQueue {
    fn enqueue_bot(&mut self, bot: BotId, queue: QueueId, team: TeamId);

    /// Take a bot out of `queue`. `decrease_invited` also releases its invitation.
    fn remove_bot(&mut self, bot: BotId, queue: QueueId, decrease_invited: bool);

    fn player_status(&self, player: PlayerId, queue: QueueId) -> PlayerMatchStatus;

    fn has_free_slots(&self, match_id: MatchId, team: TeamId) -> bool;

    /// Team start location of a running match.
    fn start_position(&self, match_id: MatchId, team: TeamId) -> Option<(RegionId, Position)>;
}
