// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Structured records flowing between stages.
//!
//! The engine never inspects a message's full type system. It only needs to
//! build a default instance for a schema, pull a named sub-record out of a
//! message, and put one back in. [`Message`] provides exactly that over
//! `google.protobuf.Struct`, which also gives it a protobuf wire encoding for
//! the gRPC transport.

use std::collections::BTreeSet;

use prost_types::{value::Kind, Struct, Value};
use serde::Deserialize;

use crate::errors::MessageError;

/// Describes a message type by name and by which of its fields are
/// themselves structured sub-records.
///
/// Only sub-record fields can be split out by an output adapter or joined in
/// by a merging input adapter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct MessageSchema {
    pub name: String,
    #[serde(default)]
    pub records: BTreeSet<String>,
}

impl MessageSchema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            records: BTreeSet::new(),
        }
    }

    /// Declare `field` as a sub-record of this schema.
    pub fn with_record(mut self, field: impl Into<String>) -> Self {
        self.records.insert(field.into());
        self
    }

    pub fn has_record(&self, field: &str) -> bool {
        self.records.contains(field)
    }
}

/// An immutable structured record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Message(Struct);

impl Message {
    pub fn new(inner: Struct) -> Self {
        Self(inner)
    }

    /// The default instance of `schema`.
    ///
    /// Protobuf defaults leave every field unset, so this is the empty record
    /// regardless of which sub-records the schema declares.
    pub fn default_for(_schema: &MessageSchema) -> Self {
        Self::default()
    }

    /// Read the sub-record stored under `field`.
    ///
    /// An unset field reads as the empty record, the same way an unset
    /// protobuf message field reads as its default instance.
    pub fn record(&self, field: &str) -> Result<Message, MessageError> {
        match self.0.fields.get(field).and_then(|value| value.kind.as_ref()) {
            None | Some(Kind::NullValue(_)) => Ok(Message::default()),
            Some(Kind::StructValue(inner)) => Ok(Message(inner.clone())),
            Some(_) => Err(MessageError::NotARecord {
                field: field.to_string(),
            }),
        }
    }

    /// A copy of this message with `field` set to `record`.
    pub fn with_record(mut self, field: impl Into<String>, record: Message) -> Message {
        self.0.fields.insert(
            field.into(),
            Value {
                kind: Some(Kind::StructValue(record.0)),
            },
        );
        self
    }

    pub fn number(&self, field: &str) -> Option<f64> {
        match self.0.fields.get(field)?.kind.as_ref()? {
            Kind::NumberValue(n) => Some(*n),
            _ => None,
        }
    }

    pub fn with_number(mut self, field: impl Into<String>, number: f64) -> Message {
        self.0.fields.insert(
            field.into(),
            Value {
                kind: Some(Kind::NumberValue(number)),
            },
        );
        self
    }

    /// Size of the protobuf encoding, used for logging.
    pub fn encoded_len(&self) -> usize {
        prost::Message::encoded_len(&self.0)
    }

    pub fn into_inner(self) -> Struct {
        self.0
    }
}

impl From<Struct> for Message {
    fn from(inner: Struct) -> Self {
        Self(inner)
    }
}

impl From<Message> for Struct {
    fn from(message: Message) -> Self {
        message.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_for_schema_is_empty() {
        let schema = MessageSchema::new("vision.Frame").with_record("image");
        let message = Message::default_for(&schema);

        assert!(message.clone().into_inner().fields.is_empty());
        assert_eq!(message, Message::default());
    }

    #[test]
    fn test_record_round_trips_through_with_record() {
        let image = Message::default().with_number("width", 640.0);
        let frame = Message::default().with_record("image", image.clone());

        assert_eq!(frame.record("image").unwrap(), image);
    }

    #[test]
    fn test_unset_record_reads_as_default() {
        let frame = Message::default().with_number("timestamp", 12.0);

        assert_eq!(frame.record("image").unwrap(), Message::default());
    }

    #[test]
    fn test_scalar_field_is_not_a_record() {
        let frame = Message::default().with_number("timestamp", 12.0);

        match frame.record("timestamp") {
            Err(MessageError::NotARecord { field }) => assert_eq!(field, "timestamp"),
            other => panic!("Expected NotARecord, got {:?}", other),
        }
    }

    #[test]
    fn test_with_record_leaves_original_untouched() {
        let original = Message::default().with_number("value", 1.0);
        let updated = original
            .clone()
            .with_record("nested", Message::default().with_number("value", 2.0));

        assert_eq!(original.number("value"), Some(1.0));
        assert_eq!(original.record("nested").unwrap(), Message::default());
        assert_eq!(updated.record("nested").unwrap().number("value"), Some(2.0));
    }

    #[test]
    fn test_schema_deserializes_without_records() {
        let schema: MessageSchema = serde_yaml::from_str("name: vision.Frame").unwrap();

        assert_eq!(schema.name, "vision.Frame");
        assert!(schema.records.is_empty());
        assert!(!schema.has_record("image"));
    }
}
