//! Orchestration layer shared by the HTTP, MCP, and CLI surfaces.

mod career;
mod types;

pub use career::{CareerApi, CareerService, ServiceParts};
pub use types::{
    HealthSnapshot, InterviewTarget, MatchOutcome, MatchRequest, ProfileSummary, ResumeOutcome,
    ServiceError, ServiceSettings, TailoredResumeOutcome,
};
