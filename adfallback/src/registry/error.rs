//! Slot registry error types.

use thiserror::Error;

use crate::host::ContainerId;

/// Errors raised while executing queued exchange commands.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// The exchange SDK refused to define the slot. Terminal for the container.
    #[error("failed to define exchange slot {ad_unit_path} in {container}")]
    SlotCreationFailed {
        container: ContainerId,
        ad_unit_path: String,
    },

    /// An earlier definition for this container failed; nothing is attempted.
    #[error("container {0} previously failed slot creation")]
    ContainerFailed(ContainerId),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_error_display() {
        let err = RegistryError::SlotCreationFailed {
            container: ContainerId::from("rfsbox1"),
            ad_unit_path: "/1/site/unit".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "failed to define exchange slot /1/site/unit in rfsbox1"
        );
    }
}
