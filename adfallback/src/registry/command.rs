//! Command queue for the exchange SDK.
//!
//! The exchange tag only accepts work through its own FIFO command queue,
//! which it drains once its script has loaded. The queue is created on the
//! first enqueue so the registry never needs the SDK to exist beforehand.

use std::collections::VecDeque;

use crate::host::ContainerId;

/// A targeting key with its values.
pub type Targeting = (String, Vec<String>);

/// Request to show the fallback slot in a container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotRequest {
    pub container: ContainerId,
    pub ad_unit_path: String,
    pub targeting: Vec<Targeting>,
}

impl SlotRequest {
    pub fn new(container: ContainerId, ad_unit_path: impl Into<String>) -> Self {
        Self {
            container,
            ad_unit_path: ad_unit_path.into(),
            targeting: Vec::new(),
        }
    }

    /// Add a targeting key. Empty value lists are skipped.
    pub fn with_targeting(mut self, key: &str, values: Vec<String>) -> Self {
        if !values.is_empty() {
            self.targeting.push((key.to_string(), values));
        }
        self
    }
}

/// Work item executed inside the exchange's command queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExchangeCommand {
    /// Define (first time) or re-display (afterwards) a container's slot.
    ShowSlot(SlotRequest),
    /// Refresh the creatives of registered slots.
    Refresh,
}

/// FIFO of commands waiting for the exchange SDK.
#[derive(Debug, Clone, Default)]
pub struct CommandQueue {
    tasks: VecDeque<ExchangeCommand>,
}

impl CommandQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, command: ExchangeCommand) {
        self.tasks.push_back(command);
    }

    pub fn pop(&mut self) -> Option<ExchangeCommand> {
        self.tasks.pop_front()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_is_fifo() {
        let mut queue = CommandQueue::new();
        queue.push(ExchangeCommand::ShowSlot(SlotRequest::new(
            ContainerId::from("a"),
            "/1/a",
        )));
        queue.push(ExchangeCommand::Refresh);

        assert_eq!(queue.len(), 2);
        assert!(matches!(queue.pop(), Some(ExchangeCommand::ShowSlot(_))));
        assert_eq!(queue.pop(), Some(ExchangeCommand::Refresh));
        assert!(queue.is_empty());
    }

    #[test]
    fn test_empty_targeting_is_skipped() {
        let request = SlotRequest::new(ContainerId::from("a"), "/1/a")
            .with_targeting("topics", Vec::new())
            .with_targeting("campaign", vec!["spring".into()]);

        assert_eq!(
            request.targeting,
            vec![("campaign".to_string(), vec!["spring".to_string()])]
        );
    }
}
