// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Input adapters: how a stage obtains the next state to send to its method.
//!
//! The adapter is picked once, from the number of bound input links:
//!
//! * no links: [`InputAdapter::Source`] makes up its own states
//! * one link: [`InputAdapter::Passthrough`] forwards what arrives
//! * two or more: [`InputAdapter::Merge`] joins the links by sequence id
//!
//! # Merge algorithm
//!
//! The merge keeps a `floor`, the lowest id it is willing to emit next, and
//! the last state it consumed from each field's link. Producers run at their
//! own pace, so the join is a rendezvous on ids:
//!
//! 1. For every field, get a state with id >= floor, reusing the cached one if
//!    it qualifies and otherwise skipping stale values on the link.
//! 2. If a field came back with an id above the floor, raise the floor to that
//!    id and start over for all fields. Cached states are re-checked, never
//!    re-read, so nothing is consumed twice.
//! 3. Once every field sits exactly at the floor, emit one composite message
//!    (field name -> sub-record) and move the floor past it.
//!
//! Slow producers' backlogs are simply dropped. Emitted states get their own
//! id sequence starting at 0, unrelated to the ids of the joined inputs.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::config::consts::WHOLE_MESSAGE;
use crate::config::ExecutionMode;
use crate::engine::{Link, SequenceState};
use crate::errors::StageError;
use crate::message::{Message, MessageSchema};

pub enum InputAdapter {
    Source(SourceInput),
    Passthrough(Arc<Link>),
    Merge(MergeInput),
}

impl InputAdapter {
    /// Pick and build the adapter for `links`.
    ///
    /// Merged inputs must be bound under distinct, non-empty field names that
    /// `schema` declares as sub-records.
    pub fn from_bindings(
        stage_name: &str,
        mut links: Vec<(String, Arc<Link>)>,
        mode: ExecutionMode,
        schema: &MessageSchema,
    ) -> Result<Self, StageError> {
        match links.len() {
            0 => Ok(InputAdapter::Source(SourceInput::new(mode, schema.clone()))),
            1 => {
                let (_, link) = links.remove(0);
                Ok(InputAdapter::Passthrough(link))
            }
            _ => {
                let fields: Vec<String> = links.iter().map(|(field, _)| field.clone()).collect();
                let distinct: BTreeSet<&str> = fields.iter().map(String::as_str).collect();
                if distinct.len() != fields.len() || distinct.contains(WHOLE_MESSAGE) {
                    return Err(StageError::MalformedInputBindings {
                        stage_name: stage_name.to_string(),
                        fields,
                    });
                }
                if let Some(field) = fields.iter().find(|field| !schema.has_record(field)) {
                    return Err(StageError::UnknownRecordField {
                        stage_name: stage_name.to_string(),
                        field: field.clone(),
                        schema: schema.name.clone(),
                    });
                }
                Ok(InputAdapter::Merge(MergeInput::new(links)))
            }
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            InputAdapter::Source(_) => "source",
            InputAdapter::Passthrough(_) => "passthrough",
            InputAdapter::Merge(_) => "merge",
        }
    }

    /// The next state for the stage's method.
    ///
    /// Blocks on the bound links; returns `None` once `cancel` fires.
    pub async fn next(&mut self, cancel: &CancellationToken) -> Option<SequenceState> {
        match self {
            InputAdapter::Source(source) => Some(source.next()),
            InputAdapter::Passthrough(link) => link.take(cancel).await,
            InputAdapter::Merge(merge) => merge.next(cancel).await,
        }
    }
}

/// Generates states with fresh ids and a default message. Never blocks.
pub struct SourceInput {
    next_id: u64,
    schema: MessageSchema,
}

impl SourceInput {
    pub fn new(mode: ExecutionMode, schema: MessageSchema) -> Self {
        Self {
            next_id: mode.first_source_id(),
            schema,
        }
    }

    pub fn next(&mut self) -> SequenceState {
        let id = self.next_id;
        self.next_id += 1;
        SequenceState::new(id, Message::default_for(&self.schema))
    }
}

/// Rendezvous-by-id join over two or more links.
pub struct MergeInput {
    fields: Vec<(String, Arc<Link>)>,
    cached: HashMap<String, SequenceState>,
    floor: u64,
    next_id: u64,
}

impl MergeInput {
    pub fn new(mut fields: Vec<(String, Arc<Link>)>) -> Self {
        fields.sort_by(|(a, _), (b, _)| a.cmp(b));
        Self {
            fields,
            cached: HashMap::new(),
            floor: 0,
            next_id: 0,
        }
    }

    pub async fn next(&mut self, cancel: &CancellationToken) -> Option<SequenceState> {
        'rendezvous: loop {
            for (field, link) in &self.fields {
                let floor = self.floor;
                let id = match self.cached.get(field) {
                    Some(cached) if cached.id() >= floor => cached.id(),
                    _ => {
                        let state = link.take_until(cancel, |s| s.id() >= floor).await?;
                        let id = state.id();
                        self.cached.insert(field.clone(), state);
                        id
                    }
                };
                if id > floor {
                    self.floor = id;
                    continue 'rendezvous;
                }
            }
            break;
        }

        let composite = self
            .fields
            .iter()
            .filter_map(|(field, _)| self.cached.get(field).map(|state| (field, state)))
            .fold(Message::default(), |message, (field, state)| {
                message.with_record(field.clone(), state.message().clone())
            });

        let merged = SequenceState::new(self.next_id, composite);
        self.next_id += 1;
        self.floor += 1;
        Some(merged)
    }
}
