//! Inbound control-channel commands.
//!
//! A command is a whole text frame starting with [`COMMAND_SENTINEL`].
//! Matching is exact and case-sensitive: `#stop`, `#STOP ` or `#STOPNOW`
//! are not commands.  Anything that does not match is dropped by the
//! [`RailService`](super::service::RailService) without a reply.

/// First byte of every command frame.
pub const COMMAND_SENTINEL: u8 = b'#';

/// Commands a channel peer can send to the vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Ramp down to standstill (`#STOP`).
    Stop,
    /// Lower the target by one step (`#SLOWER`).
    SlowDown,
    /// Raise the target by one step (`#FASTER`).
    SpeedUp,
    /// Switch to backward travel; honoured at standstill only (`#DIRBACK`).
    ReverseToBackward,
    /// Switch to forward travel; honoured at standstill only (`#DIRFWD`).
    ReverseToForward,
}

impl Command {
    pub const ALL: [Command; 5] = [
        Command::Stop,
        Command::SlowDown,
        Command::SpeedUp,
        Command::ReverseToBackward,
        Command::ReverseToForward,
    ];

    /// Wire text of the command, sentinel included.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Stop => "#STOP",
            Self::SlowDown => "#SLOWER",
            Self::SpeedUp => "#FASTER",
            Self::ReverseToBackward => "#DIRBACK",
            Self::ReverseToForward => "#DIRFWD",
        }
    }
}

/// `true` if the frame is addressed to the command interpreter at all.
pub fn is_command_frame(message: &[u8]) -> bool {
    message.first() == Some(&COMMAND_SENTINEL)
}

/// Parse a frame into a [`Command`].
pub fn interpret(message: &[u8]) -> Option<Command> {
    if !is_command_frame(message) {
        return None;
    }
    Command::ALL
        .into_iter()
        .find(|cmd| cmd.as_str().as_bytes() == message)
}
