//! Domain methods for the storefront API client.

use serde::Deserialize;
use vitrine_core::{AppError, MediaId, PersistedMedia, Product, Result};
use vitrine_gallery::UploadRequest;

use crate::ApiClient;

const PRODUCT_LIST_PATH: &str = "/shops/product-list-view/";
const MEDIA_CREATE_PATH: &str = "/shops/product-image-create/";

fn product_path(product_id: &str) -> String {
    format!("/shops/product-editor/{}/", product_id)
}

fn media_path(media_id: &MediaId) -> String {
    format!("/shops/product-image-editor/{}/", media_id)
}

/// The product list comes back either flat or wrapped in an outer array.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ProductListResponse {
    Flat(Vec<Product>),
    Nested(Vec<Vec<Product>>),
}

impl ProductListResponse {
    pub fn into_products(self) -> Vec<Product> {
        match self {
            ProductListResponse::Flat(products) => products,
            ProductListResponse::Nested(pages) => pages.into_iter().flatten().collect(),
        }
    }
}

impl ApiClient {
    /// Public product list (no auth required).
    pub async fn list_products(&self) -> Result<Vec<Product>> {
        let response: ProductListResponse = self.get(PRODUCT_LIST_PATH, &[]).await?;
        Ok(response.into_products())
    }

    /// Products of one shop.
    pub async fn list_shop_products(&self, shop_id: &str) -> Result<Vec<Product>> {
        let products = self.list_products().await?;
        Ok(products
            .into_iter()
            .filter(|p| p.shop_id.as_deref() == Some(shop_id))
            .collect())
    }

    /// A single product with its embedded media.
    pub async fn get_product(&self, product_id: &str) -> Result<Product> {
        self.get(&product_path(product_id), &[]).await
    }

    /// Upload one staged item.
    pub async fn create_media(&self, request: &UploadRequest) -> Result<PersistedMedia> {
        let part = reqwest::multipart::Part::bytes(request.payload.to_vec())
            .file_name(request.file_name.clone())
            .mime_str(&request.content_type)
            .map_err(|e| {
                AppError::InvalidInput(format!(
                    "Invalid content type {}: {}",
                    request.content_type, e
                ))
            })?;

        let form = reqwest::multipart::Form::new()
            .part("media", part)
            .text("product_id", request.product_id.clone())
            .text("is_primary", request.is_primary.to_string())
            .text("order", request.order.to_string());

        let created: PersistedMedia = self.post_multipart(MEDIA_CREATE_PATH, form).await?;
        tracing::debug!(
            media_id = %created.id,
            staged_id = %request.staged_id,
            order = request.order,
            "Media created"
        );
        Ok(created)
    }

    /// Set or clear the primary flag of a persisted item.
    pub async fn set_media_primary(&self, media_id: &MediaId, is_primary: bool) -> Result<()> {
        self.patch_json(
            &media_path(media_id),
            &serde_json::json!({ "is_primary": is_primary }),
        )
        .await
    }

    /// Move a persisted item within the display sequence.
    pub async fn update_media_order(&self, media_id: &MediaId, order: i32) -> Result<()> {
        self.patch_json(&media_path(media_id), &serde_json::json!({ "order": order }))
            .await
    }

    /// Delete a persisted item.
    pub async fn delete_media(&self, media_id: &MediaId) -> Result<()> {
        self.delete(&media_path(media_id)).await
    }
}
