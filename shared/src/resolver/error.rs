use thiserror::Error;

use crate::ids::CommandId;

/// Reasons an offered command is not taken by the resolver
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolverError {
    /// The command is still buffered from an earlier offer
    #[error("Command {id} is already pending")]
    AlreadyPending {
        id: CommandId,
    },

    /// The command was applied by an earlier offer
    #[error("Command {id} has already been applied")]
    AlreadyApplied {
        id: CommandId,
    },
}
