// SPDX-License-Identifier: MPL-2.0

//! Dashboard writes: create-or-update through typed forms and confirmed
//! deletes. Callers re-run a sync afterwards to pick up the new state.

mod forms;
mod upload;

pub use forms::{
    AlertForm, BannerForm, CompanyForm, EntityForm, EntityKind, OnCallForm, SettingsForm,
};
pub use upload::{ImageError, encode_image, encode_image_bytes};

use crate::supabase::{ClientError, DirectoryStore};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AdminError {
    #[error("Erro ao salvar: {0}")]
    Save(ClientError),
    #[error("Erro ao excluir: {0}")]
    Delete(ClientError),
}

/// What a submitted form did to the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveKind {
    Created,
    Updated,
}

/// Save `form` for `city`: update when the form carries an id, insert otherwise
pub async fn submit<S: DirectoryStore>(
    store: &S,
    form: &EntityForm,
    city: &str,
) -> Result<SaveKind, AdminError> {
    let table = form.table();
    let row = form.to_row(city, chrono::Utc::now());

    let kind = match form.id() {
        Some(id) => {
            store
                .update(table, id, &row)
                .await
                .map_err(AdminError::Save)?;
            SaveKind::Updated
        }
        None => {
            store.insert(table, &row).await.map_err(AdminError::Save)?;
            SaveKind::Created
        }
    };
    tracing::info!(%table, city, ?kind, "admin save");
    Ok(kind)
}

/// Delete a record once the user confirmed. Without confirmation nothing is
/// sent and `Ok(false)` is returned.
pub async fn delete<S: DirectoryStore>(
    store: &S,
    kind: EntityKind,
    id: &str,
    confirmed: bool,
) -> Result<bool, AdminError> {
    if !confirmed {
        return Ok(false);
    }
    let table = kind.table();
    store.delete(table, id).await.map_err(AdminError::Delete)?;
    tracing::info!(%table, id, "admin delete");
    Ok(true)
}
