pub use crate::backlog::{BufferedLine, ConversationBuffer, TimeBound, TimeFilter};
pub use crate::capability::{CapabilityRegistry, ClientCapability, ClientCapabilitySet};
pub use crate::config::PlaybackConfig;
pub use crate::echo::MessageKind;
pub use crate::errors::*;
pub use crate::host::{BufferPlaybackHooks, ClientId, HookAction, PlaybackHost, ReplaySink};
pub use crate::module::PlaybackModule;
pub use crate::utils::Timestamp;
