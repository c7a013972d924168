// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::message::Message;

/// The unit of data travelling along a link: a logical id plus a message.
///
/// The id is assigned once per unit of work (by a source or a merge) and is
/// carried unchanged through passthrough and splitting. States are never
/// mutated; [`SequenceState::derive`] builds a new state that shares the id.
#[derive(Debug, Clone, PartialEq)]
pub struct SequenceState {
    id: u64,
    message: Message,
}

impl SequenceState {
    pub fn new(id: u64, message: Message) -> Self {
        Self { id, message }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn message(&self) -> &Message {
        &self.message
    }

    pub fn into_message(self) -> Message {
        self.message
    }

    /// A new state carrying `message` under this state's id.
    pub fn derive(&self, message: Message) -> SequenceState {
        SequenceState {
            id: self.id,
            message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_keeps_id_and_original() {
        let original = SequenceState::new(7, Message::default().with_number("value", 1.0));
        let derived = original.derive(Message::default().with_number("value", 2.0));

        assert_eq!(derived.id(), 7);
        assert_eq!(derived.message().number("value"), Some(2.0));
        assert_eq!(original.message().number("value"), Some(1.0));
    }
}
