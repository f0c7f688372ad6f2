//! # Narrow interfaces to the two external systems.
//!
//! The core only needs a handful of calls from each side, so each collaborator is
//! a small object-safe trait that test doubles can implement in a few lines:
//!
//! | Trait                   | Used by            | Capabilities                                   |
//! |-------------------------|--------------------|------------------------------------------------|
//! | [`ProviderGateway`]     | core + commands    | list / create / destroy instances              |
//! | [`OrchestratorGateway`] | core + commands    | status / remove machine / destroy environment  |
//! | [`NetworkGateway`]      | provisioning only  | private network, floating IP, ports            |
//! | [`EnvironmentAdmin`]    | commands only      | bootstrap, register machines, discard cache    |
//!
//! Authentication, endpoint discovery and the concrete SDK calls live in the
//! implementations, not here.

mod orchestrator;
mod provider;

pub use orchestrator::{EnvironmentAdmin, OrchestratorGateway};
pub use provider::{NetworkGateway, ProviderGateway};
