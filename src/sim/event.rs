/// Events emitted during a simulation step or by a player command.
/// The presentation layer consumes these for sound and logging.

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GameEvent {
    Jumped,
    Landed,
    VisionActivated,
    VisionCancelled,
    VisionExpired,
    VisionReady,
    VisionUnavailable,
    Won,
    Lost,
    Restarted,
}
