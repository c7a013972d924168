// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Output adapters: where a stage's results go.
//!
//! Picked once from the set of bound output keys:
//!
//! | bound keys                                  | adapter       |
//! |---------------------------------------------|---------------|
//! | none                                        | `Sink`        |
//! | one whole-message link                      | `Passthrough` |
//! | several whole-message links                 | `Duplicate`   |
//! | distinct field names, one link per field    | `Splitter`    |
//!
//! Any other mix is a configuration error.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::config::consts::WHOLE_MESSAGE;
use crate::engine::{Link, SequenceState};
use crate::errors::{MessageError, StageError};
use crate::message::MessageSchema;

pub enum OutputAdapter {
    Sink,
    Passthrough(Arc<Link>),
    Duplicate(Vec<Arc<Link>>),
    Splitter(Vec<(String, Arc<Link>)>),
}

impl OutputAdapter {
    /// Pick and build the adapter for `links`.
    ///
    /// Split fields must be declared as sub-records by `schema`.
    pub fn from_bindings(
        stage_name: &str,
        mut links: Vec<(String, Arc<Link>)>,
        schema: &MessageSchema,
    ) -> Result<Self, StageError> {
        if links.is_empty() {
            return Ok(OutputAdapter::Sink);
        }

        let fields: Vec<String> = links.iter().map(|(field, _)| field.clone()).collect();
        let whole_message = fields.iter().filter(|f| f.as_str() == WHOLE_MESSAGE).count();

        if whole_message == fields.len() {
            return Ok(if links.len() == 1 {
                OutputAdapter::Passthrough(links.remove(0).1)
            } else {
                OutputAdapter::Duplicate(links.into_iter().map(|(_, link)| link).collect())
            });
        }

        let distinct: BTreeSet<&str> = fields.iter().map(String::as_str).collect();
        if whole_message > 0 || distinct.len() != fields.len() {
            return Err(StageError::MalformedOutputBindings {
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

        Ok(OutputAdapter::Splitter(links))
    }

    pub fn describe(&self) -> &'static str {
        match self {
            OutputAdapter::Sink => "sink",
            OutputAdapter::Passthrough(_) => "passthrough",
            OutputAdapter::Duplicate(_) => "duplicate",
            OutputAdapter::Splitter(_) => "splitter",
        }
    }

    /// Deliver `state` to the bound links. Never blocks.
    pub fn accept(&self, state: SequenceState) -> Result<(), MessageError> {
        match self {
            OutputAdapter::Sink => {}
            OutputAdapter::Passthrough(link) => {
                link.put(state);
            }
            OutputAdapter::Duplicate(links) => {
                for link in links {
                    link.put(state.clone());
                }
            }
            OutputAdapter::Splitter(fields) => {
                // extract everything first so a bad field delivers nothing
                let parts = fields
                    .iter()
                    .map(|(field, link)| {
                        let part = state.message().record(field)?;
                        Ok((link, state.derive(part)))
                    })
                    .collect::<Result<Vec<_>, MessageError>>()?;
                for (link, part) in parts {
                    link.put(part);
                }
            }
        }
        Ok(())
    }
}
