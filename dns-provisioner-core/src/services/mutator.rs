//! Record Mutator

use std::sync::Arc;

use serde::Serialize;

use dns_provisioner_provider::ProviderError;

use crate::error::{CoreError, CoreResult};
use crate::services::ZoneContext;
use crate::types::DnsRecord;

/// Result of a delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeleteOutcome {
    Deleted,
    /// The id was not there; deleting it again is not an error.
    AlreadyAbsent,
}

/// Adds and deletes records. Nothing is retried.
pub struct RecordMutator {
    ctx: Arc<ZoneContext>,
}

impl RecordMutator {
    #[must_use]
    pub fn new(ctx: Arc<ZoneContext>) -> Self {
        Self { ctx }
    }

    /// Create `record` and return the provider id.
    ///
    /// The record is validated before any request is made. Add is not
    /// idempotent: run the matcher first.
    pub async fn add(&self, record: &DnsRecord) -> CoreResult<String> {
        record.validate()?;

        let created = self
            .ctx
            .provider
            .create_record(self.ctx.zone_id(), record)
            .await
            .inspect_err(|e| self.ctx.log_provider_error("Creating record", e))?;

        let id = created.provider_id.ok_or_else(|| ProviderError::ParseError {
            provider: self.ctx.provider.id().to_string(),
            detail: "created record has no id".to_string(),
        })?;
        log::info!("Created {record} with id {id}");
        Ok(id)
    }

    /// Delete by id. An id that is already gone is reported, not failed.
    pub async fn delete(&self, record_id: &str) -> CoreResult<DeleteOutcome> {
        // best effort, only for the log
        match self
            .ctx
            .provider
            .get_record(self.ctx.zone_id(), record_id)
            .await
        {
            Ok(record) => log::info!("Deleting {record} ({record_id})"),
            Err(e) => log::debug!("Could not fetch {record_id} before delete: {e}"),
        }

        match self
            .ctx
            .provider
            .delete_record(self.ctx.zone_id(), record_id)
            .await
        {
            Ok(()) => {
                log::info!("Deleted record {record_id}");
                Ok(DeleteOutcome::Deleted)
            }
            Err(ProviderError::RecordNotFound { .. }) => {
                log::info!("Record {record_id} already absent");
                Ok(DeleteOutcome::AlreadyAbsent)
            }
            Err(e) => {
                self.ctx.log_provider_error("Deleting record", &e);
                Err(e.into())
            }
        }
    }

    /// Delete `existing_id`, then add `desired`.
    ///
    /// If the delete succeeds and the add fails the zone is left without the
    /// record and [`CoreError::IncompleteReplace`] names what was deleted.
    pub async fn replace(&self, existing_id: &str, desired: &DnsRecord) -> CoreResult<String> {
        desired.validate()?;

        self.delete(existing_id).await?;
        log::warn!("Record {existing_id} deleted; creating replacement {desired}");

        match self.add(desired).await {
            Ok(id) => Ok(id),
            Err(CoreError::Provider(cause)) => {
                log::error!("Replacement for deleted record {existing_id} was not created: {cause}");
                Err(CoreError::IncompleteReplace {
                    deleted_id: existing_id.to_string(),
                    cause,
                })
            }
            Err(e) => Err(e),
        }
    }

    /// Whether `record_id` is gone from the provider.
    pub async fn verify_deleted(&self, record_id: &str) -> CoreResult<bool> {
        match self
            .ctx
            .provider
            .get_record(self.ctx.zone_id(), record_id)
            .await
        {
            Ok(record) => {
                log::warn!("Record {record_id} still present: {record}");
                Ok(false)
            }
            Err(ProviderError::RecordNotFound { .. }) => Ok(true),
            Err(e) => Err(e.into()),
        }
    }
}
