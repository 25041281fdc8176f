use winit::keyboard::KeyCode;

/// Discrete pose change requested by the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoseCommand {
    TurnLeft,
    TurnRight,
    Forward,
    Backward,
}

impl PoseCommand {
    /// Arrow keys or WASD.
    pub fn from_key(code: KeyCode) -> Option<Self> {
        match code {
            KeyCode::ArrowLeft | KeyCode::KeyA => Some(PoseCommand::TurnLeft),
            KeyCode::ArrowRight | KeyCode::KeyD => Some(PoseCommand::TurnRight),
            KeyCode::ArrowUp | KeyCode::KeyW => Some(PoseCommand::Forward),
            KeyCode::ArrowDown | KeyCode::KeyS => Some(PoseCommand::Backward),
            _ => None,
        }
    }
}
