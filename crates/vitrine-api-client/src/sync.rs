//! Executors that run gallery plans against the API.

use futures::future::{join, join_all};
use serde::Serialize;
use vitrine_core::{AppError, MediaId, PersistedMedia, Result};
use vitrine_gallery::{DeletePlan, Gallery, SubmitPlan};

use crate::ApiClient;

/// What a submit actually changed on the server.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SubmitReport {
    pub created: Vec<PersistedMedia>,
    pub demoted: Vec<MediaId>,
    pub promoted: Option<MediaId>,
}

fn first_error<T>(results: Vec<Result<T>>) -> (Vec<T>, Option<AppError>) {
    let mut ok = Vec::with_capacity(results.len());
    let mut error = None;
    for result in results {
        match result {
            Ok(value) => ok.push(value),
            Err(e) => {
                if error.is_none() {
                    error = Some(e);
                }
            }
        }
    }
    (ok, error)
}

/// Run a submit plan.
///
/// Demotions are awaited first. Creates and the promotion then run
/// concurrently. Every call is allowed to finish; the first failure is
/// returned and nothing is retried.
pub async fn execute_submit(client: &ApiClient, plan: &SubmitPlan) -> Result<SubmitReport> {
    let demotions = join_all(
        plan.demotions
            .iter()
            .map(|id| client.set_media_primary(id, false)),
    )
    .await;
    let (_, demotion_error) = first_error(demotions);
    if let Some(e) = demotion_error {
        tracing::error!(product_id = %plan.product_id, error = %e, "Demotion failed, submit aborted");
        return Err(e);
    }

    let creates = join_all(plan.creates.iter().map(|request| client.create_media(request)));
    let promotion = async {
        match &plan.promotion {
            Some(id) => client.set_media_primary(id, true).await,
            None => Ok(()),
        }
    };
    let (creates, promotion) = join(creates, promotion).await;

    let (created, create_error) = first_error(creates);
    if let Some(e) = create_error {
        tracing::error!(
            product_id = %plan.product_id,
            created = created.len(),
            requested = plan.creates.len(),
            error = %e,
            "Media upload failed"
        );
        return Err(e);
    }
    if let Err(e) = promotion {
        tracing::error!(product_id = %plan.product_id, error = %e, "Promotion failed");
        return Err(e);
    }

    tracing::info!(
        product_id = %plan.product_id,
        created = created.len(),
        demoted = plan.demotions.len(),
        promoted = plan.promotion.is_some(),
        "Gallery submitted"
    );

    Ok(SubmitReport {
        created,
        demoted: plan.demotions.clone(),
        promoted: plan.promotion.clone(),
    })
}

/// Submit a gallery and reload it from the server.
///
/// The reload happens whether or not the submit succeeded, so local state
/// always reflects what the server holds afterwards.
pub async fn submit_gallery(
    client: &ApiClient,
    gallery: &mut Gallery,
    product_id: &str,
) -> Result<SubmitReport> {
    let plan = gallery.reconcile_on_submit(product_id);
    if plan.is_empty() {
        tracing::debug!(product_id = %product_id, "Nothing to submit");
        return Ok(SubmitReport::default());
    }

    let outcome = execute_submit(client, &plan).await;

    match client.get_product(product_id).await {
        Ok(product) => gallery.reset_from_server(product.images),
        Err(e) => {
            tracing::warn!(product_id = %product_id, error = %e, "Refetch after submit failed");
            gallery.teardown();
            if outcome.is_ok() {
                return Err(e);
            }
        }
    }

    outcome
}

/// Delete a persisted item, promote its successor, and refresh persisted
/// records. Staged items are kept.
///
/// A failed promotion still triggers the refresh, then fails the operation.
/// A failed refresh fails it too.
pub async fn delete_persisted_media(
    client: &ApiClient,
    gallery: &mut Gallery,
    product_id: &str,
    media_id: &MediaId,
) -> Result<DeletePlan> {
    let plan = gallery.delete_persisted(media_id)?;

    client.delete_media(&plan.delete).await?;
    gallery.confirm_deleted(&plan);

    let promotion = match &plan.promote {
        Some(next) => client.set_media_primary(next, true).await,
        None => Ok(()),
    };
    if let Err(e) = &promotion {
        tracing::error!(media_id = ?plan.promote, error = %e, "Promotion after delete failed");
    }

    match client.get_product(product_id).await {
        Ok(product) => gallery.sync_persisted(product.images),
        Err(e) => {
            tracing::warn!(product_id = %product_id, error = %e, "Refetch after delete failed");
            promotion?;
            return Err(e);
        }
    }

    promotion?;
    Ok(plan)
}
