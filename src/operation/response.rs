use crate::dispatcher::{Reply, ResponseModel, Returns};
use crate::error::{ApiConfigError, InternalConfigError};
use crate::model::classify_descriptor;
use crate::openapi::schema::{inline_schema, nullable};
use once_cell::sync::OnceCell;
use serde_json::Value;
use std::fmt;
use tracing::warn;

/// One status code of a response contract.
pub struct ResponseEntry {
    pub status: u16,
    pub model: ResponseModel,
    pub description: String,
    validator: OnceCell<Option<jsonschema::Validator>>,
}

impl fmt::Debug for ResponseEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResponseEntry")
            .field("status", &self.status)
            .field("model", &self.model.type_name)
            .finish()
    }
}

impl ResponseEntry {
    fn new(status: u16, model: ResponseModel) -> Self {
        let description = http::StatusCode::from_u16(status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or("")
            .to_string();
        Self {
            status,
            model,
            description,
            validator: OnceCell::new(),
        }
    }

    /// Validate a serialized payload against this entry's inline schema.
    ///
    /// The validator is compiled on first use and shared afterwards.
    pub fn check(&self, payload: &Value) -> Result<(), InternalConfigError> {
        let validator = self.validator.get_or_init(|| {
            let schema = nullable(inline_schema(&self.model.descriptor), &self.model.descriptor);
            match jsonschema::validator_for(&schema) {
                Ok(v) => Some(v),
                Err(e) => {
                    warn!(status = self.status, error = %e, "response schema does not compile; skipping checks");
                    None
                }
            }
        });
        let Some(validator) = validator else {
            return Ok(());
        };
        let problems: Vec<String> = validator.iter_errors(payload).map(|e| e.to_string()).collect();
        if problems.is_empty() {
            Ok(())
        } else {
            Err(InternalConfigError::ResponseSchema {
                status: self.status,
                reason: problems.join("; "),
            })
        }
    }
}

/// Declared mapping from status code to response model.
#[derive(Debug)]
pub struct ResponseContract {
    entries: Vec<ResponseEntry>,
    union: bool,
}

impl ResponseContract {
    /// Check `declared` against the handler's return type `R`.
    ///
    /// - a single return type defaults to `{200: R}` and every declared
    ///   entry must use `R`
    /// - a union needs an explicit table covering each member exactly once
    pub fn build<R: Returns>(declared: Vec<(u16, ResponseModel)>) -> Result<Self, ApiConfigError> {
        let members = R::models();
        for model in members.iter().chain(declared.iter().map(|(_, m)| m)) {
            classify_descriptor(&model.descriptor)?;
        }
        for (idx, (status, _)) in declared.iter().enumerate() {
            if !(100..=599).contains(status) {
                return Err(ApiConfigError::InvalidStatus { status: *status });
            }
            if declared[..idx].iter().any(|(s, _)| s == status) {
                return Err(ApiConfigError::DuplicateStatus { status: *status });
            }
        }

        let union = R::is_union();
        let mut entries: Vec<ResponseEntry> = if union {
            if declared.is_empty() {
                return Err(ApiConfigError::ReturnTypeNotSpecified);
            }
            for (idx, (status, model)) in declared.iter().enumerate() {
                if !members.iter().any(|m| m.type_id == model.type_id) {
                    return Err(ApiConfigError::ResponseModelMismatch {
                        status: *status,
                        model: model.type_name.to_string(),
                    });
                }
                if declared[..idx].iter().any(|(_, m)| m.type_id == model.type_id) {
                    return Err(ApiConfigError::AmbiguousResponseModel {
                        model: model.type_name.to_string(),
                    });
                }
            }
            if let Some(uncovered) = members
                .iter()
                .find(|m| !declared.iter().any(|(_, d)| d.type_id == m.type_id))
            {
                return Err(ApiConfigError::UncoveredResponseModel {
                    model: uncovered.type_name.to_string(),
                });
            }
            declared
                .into_iter()
                .map(|(status, model)| ResponseEntry::new(status, model))
                .collect()
        } else {
            let Some(only) = members.into_iter().next() else {
                return Err(ApiConfigError::ReturnTypeNotSpecified);
            };
            if let Some((status, model)) = declared.iter().find(|(_, m)| m.type_id != only.type_id) {
                return Err(ApiConfigError::ResponseModelMismatch {
                    status: *status,
                    model: model.type_name.to_string(),
                });
            }
            if declared.is_empty() {
                vec![ResponseEntry::new(200, only)]
            } else {
                declared
                    .into_iter()
                    .map(|(status, model)| ResponseEntry::new(status, model))
                    .collect()
            }
        };
        entries.sort_by_key(|e| e.status);
        Ok(Self { entries, union })
    }

    pub fn entries(&self) -> &[ResponseEntry] {
        &self.entries
    }

    pub fn is_union(&self) -> bool {
        self.union
    }

    /// Pick the entry that applies to `reply`.
    ///
    /// Single return types always use `200`, or the lowest declared code when
    /// `200` is absent. Unions select the entry whose model is exactly the
    /// reply's runtime type.
    pub fn select(&self, reply: &Reply) -> Result<&ResponseEntry, InternalConfigError> {
        let unmatched = || InternalConfigError::UnmatchedResponse {
            type_name: reply.type_name.to_string(),
        };
        if self.union {
            return self
                .entries
                .iter()
                .find(|e| e.model.type_id == reply.type_id)
                .ok_or_else(unmatched);
        }
        let entry = self
            .entries
            .iter()
            .find(|e| e.status == 200)
            .or_else(|| self.entries.first())
            .ok_or_else(unmatched)?;
        if entry.model.type_id == reply.type_id {
            Ok(entry)
        } else {
            Err(unmatched())
        }
    }
}
