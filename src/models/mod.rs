pub mod mover;
pub mod research;
pub mod usage;

pub use mover::{Catalyst, MoverStatus, NewTrackedMover, Sentiment, TrackedMover};
pub use research::{
    ClarificationQuestion, ResearchNote, ResearchResponse, ResearchSession, SessionStatus,
    UserResponse,
};
pub use usage::{Endpoint, ModelUsageTotal, NewUsageEntry, UsageContext, UsageLogEntry};
