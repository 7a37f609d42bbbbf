//! Logical collection -> dispatched action table.
//!
//! Every CRUD thunk goes through these functions, so the mapping from a
//! collection to the slice it updates is written down exactly once and
//! checked exhaustively by the compiler.

use serde::Serialize;

use super::SyncError;
use crate::models::{fields_from_value, Entity, Record};
use crate::state::Action;
use crate::store::Collection;

/// The list slice a collection feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Appointment,
    ServiceProvider,
}

impl EntityKind {
    /// `None` means the collection has no slice: its thunks do not dispatch.
    pub fn of(collection: &Collection) -> Option<Self> {
        match collection {
            Collection::Appointments => Some(EntityKind::Appointment),
            Collection::ServiceProviders => Some(EntityKind::ServiceProvider),
            Collection::Users | Collection::Named(_) => None,
        }
    }

    fn collection_name(self) -> &'static str {
        match self {
            EntityKind::Appointment => "appointments",
            EntityKind::ServiceProvider => "service-providers",
        }
    }
}

pub fn fetched(kind: EntityKind, records: Vec<Record>) -> Result<Action, SyncError> {
    Ok(match kind {
        EntityKind::Appointment => Action::AppointmentsFetchSuccess(decode_all(kind, records)?),
        EntityKind::ServiceProvider => {
            Action::ServiceProvidersFetchSuccess(decode_all(kind, records)?)
        }
    })
}

pub fn added(kind: EntityKind, record: Record) -> Result<Action, SyncError> {
    Ok(match kind {
        EntityKind::Appointment => Action::AddAppointment(decode(kind, record)?),
        EntityKind::ServiceProvider => Action::AddServiceProvider(decode(kind, record)?),
    })
}

pub fn edited(kind: EntityKind, record: Record) -> Result<Action, SyncError> {
    Ok(match kind {
        EntityKind::Appointment => Action::EditAppointment(decode(kind, record)?),
        EntityKind::ServiceProvider => Action::EditServiceProvider(decode(kind, record)?),
    })
}

pub fn deleted(kind: EntityKind, id: String) -> Action {
    match kind {
        EntityKind::Appointment => Action::DeleteAppointment(id),
        EntityKind::ServiceProvider => Action::DeleteServiceProvider(id),
    }
}

/// Views a state element as a document record.
pub fn to_record<T: Entity + Serialize>(item: &T) -> Option<Record> {
    let fields = fields_from_value(serde_json::to_value(item).ok()?)?;
    Some(Record::from_document(item.id(), fields))
}

fn decode<T>(kind: EntityKind, record: Record) -> Result<T, SyncError>
where
    T: TryFrom<Record, Error = serde_json::Error>,
{
    let id = record.id.clone();
    T::try_from(record).map_err(|e| SyncError::Decode {
        collection: kind.collection_name().to_string(),
        id,
        message: e.to_string(),
    })
}

/// Decodes records into slice elements, failing on the first bad one.
pub fn decode_all<T>(kind: EntityKind, records: Vec<Record>) -> Result<Vec<T>, SyncError>
where
    T: TryFrom<Record, Error = serde_json::Error>,
{
    records.into_iter().map(|r| decode(kind, r)).collect()
}
