use serde::{Deserialize, Serialize};

/// Tunables for the social-graph policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialConfig {
    /// When set, a declined request permanently blocks new requests between
    /// the pair. Off by default: a decline can be followed by a fresh request.
    #[serde(default)]
    pub declined_blocks_rerequest: bool,
}

impl SocialConfig {
    pub fn new(declined_blocks_rerequest: bool) -> Self {
        Self {
            declined_blocks_rerequest,
        }
    }
}
