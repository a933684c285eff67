use serde::{Deserialize, Serialize};

/// Eye state label, used both for the memoryless per-frame classification
/// and for the debounced state reported to the outside.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EyeState {
    #[default]
    NoFace,
    Open,
    Closed,
}

impl EyeState {
    pub const ALL: &[EyeState] = &[EyeState::NoFace, EyeState::Open, EyeState::Closed];
}

impl std::fmt::Display for EyeState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EyeState::NoFace => write!(f, "NO FACE"),
            EyeState::Open => write!(f, "OPEN"),
            EyeState::Closed => write!(f, "CLOSED"),
        }
    }
}
