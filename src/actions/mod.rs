//! 受控动作：注册表、人工确认网关、内置 DeleteResources

pub mod delete;
pub mod gate;
pub mod registry;

pub use delete::{DeleteResourcesAction, DeleteResourcesArgs, DELETE_RESOURCES};
pub use gate::{Affordance, ConfirmationGate, Decision, ProposalStatus, ProposalTicket, ProposalView};
pub use registry::{ActionDescriptor, ActionRegistry, DynamicAction, GatedAction, ProposalBody};
