//! # Operator commands composed from the reconciliation core.
//!
//! Every command takes a [`Provisor`](crate::Provisor) context, checks its preconditions
//! before mutating anything, and returns a report that lists every machine it touched.
//!
//! | Command                  | Needs                     | Returns               |
//! |--------------------------|---------------------------|-----------------------|
//! | [`Bootstrap`]            | network + admin gateways  | state-server instance |
//! | [`AddMachines`]          | network + admin gateways  | [`ProvisionReport`]   |
//! | [`TerminateMachines`]    | core gateways             | [`BatchReport`]       |
//! | [`DestroyEnvironment`]   | core (+ admin for force)  | [`TeardownReport`]    |
//! | [`ListMachines`]         | provider gateway          | instances             |

mod add_machines;
mod bootstrap;
mod destroy;
mod list;
mod provision;
mod report;
mod terminate;

pub use add_machines::AddMachines;
pub use bootstrap::Bootstrap;
pub use destroy::DestroyEnvironment;
pub use list::{ListMachines, render_table};
pub use report::{
    BatchReport, ProvisionFailure, ProvisionReport, StateServerOutcome, TeardownReport,
};
pub use terminate::TerminateMachines;
