//! Property listing, search, and management.

use std::sync::Arc;

use serde::Serialize;
use serde_json::{json, Value};

use super::{json_field, send_json};
use crate::client::{ApiClient, RequestOptions};
use crate::envelope::ApiResponse;
use crate::error::ApiError;
use crate::http::{FileUpload, HttpMethod, MultipartForm};
use crate::types::{
    AddPropertyRequest, ListingType, Property, PropertySearchParams, PropertyStatus,
    PropertyUpdate,
};

#[derive(Debug, Clone)]
pub struct PropertyService {
    client: Arc<ApiClient>,
}

impl PropertyService {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    pub async fn get_all_properties(&self) -> ApiResponse<Vec<Property>> {
        self.client
            .request_as("/api/properties/all", RequestOptions::get())
            .await
    }

    pub async fn search_properties(
        &self,
        params: &PropertySearchParams,
    ) -> ApiResponse<Vec<Property>> {
        match search_endpoint(params) {
            Ok(endpoint) => self.client.request_as(&endpoint, RequestOptions::get()).await,
            Err(error) => ApiResponse::failure(error),
        }
    }

    pub async fn get_property(&self, id: &str) -> ApiResponse<Property> {
        self.client
            .request_as(&format!("/api/properties/{id}"), RequestOptions::get())
            .await
    }

    /// Create a listing. The payload is whatever the backend answers with,
    /// usually the stored record (`decode` it) or a text confirmation.
    pub async fn add_property(
        &self,
        property: &AddPropertyRequest,
        images: Vec<FileUpload>,
    ) -> ApiResponse<Value> {
        self.send_listing("/api/properties", HttpMethod::Post, property, images)
            .await
    }

    pub async fn update_property(
        &self,
        id: &str,
        update: &PropertyUpdate,
        images: Vec<FileUpload>,
    ) -> ApiResponse<Value> {
        self.send_listing(&format!("/api/properties/{id}"), HttpMethod::Put, update, images)
            .await
    }

    /// Multipart `property` JSON field followed by one `file` part per image.
    async fn send_listing<T: Serialize>(
        &self,
        endpoint: &str,
        method: HttpMethod,
        payload: &T,
        images: Vec<FileUpload>,
    ) -> ApiResponse<Value> {
        let property_json = match json_field(payload) {
            Ok(text) => text,
            Err(error) => return ApiResponse::failure(error),
        };
        let form = images
            .into_iter()
            .fold(MultipartForm::new().text("property", property_json), |form, image| {
                form.file("file", image)
            });
        self.client
            .request(endpoint, RequestOptions::multipart(method, form))
            .await
    }

    pub async fn delete_property(&self, id: &str) -> ApiResponse<Value> {
        self.client
            .request(
                &format!("/api/properties/{id}"),
                RequestOptions::method(HttpMethod::Delete),
            )
            .await
    }

    pub async fn get_featured_properties(&self) -> ApiResponse<Vec<Property>> {
        self.search_properties(&PropertySearchParams {
            featured: Some(true),
            ..Default::default()
        })
        .await
    }

    pub async fn get_properties_for_sale(&self) -> ApiResponse<Vec<Property>> {
        self.search_published(ListingType::Residential).await
    }

    pub async fn get_properties_for_rent(&self) -> ApiResponse<Vec<Property>> {
        self.search_published(ListingType::Rental).await
    }

    async fn search_published(&self, listing_type: ListingType) -> ApiResponse<Vec<Property>> {
        self.search_properties(&PropertySearchParams {
            status: Some(PropertyStatus::Published.as_str().to_string()),
            listing_type: Some(listing_type.as_str().to_string()),
            ..Default::default()
        })
        .await
    }

    pub async fn update_property_status(
        &self,
        id: &str,
        status: PropertyStatus,
    ) -> ApiResponse<Value> {
        send_json(
            &self.client,
            &format!("/api/properties/{id}/status"),
            HttpMethod::Put,
            &json!({ "status": status }),
        )
        .await
    }

    pub async fn toggle_featured(&self, id: &str, featured: bool) -> ApiResponse<Value> {
        send_json(
            &self.client,
            &format!("/api/properties/{id}/featured"),
            HttpMethod::Put,
            &json!({ "featured": featured }),
        )
        .await
    }
}

/// `/api/properties/search`, with `?query` only when some filter is set.
pub fn search_endpoint(params: &PropertySearchParams) -> Result<String, ApiError> {
    let pairs = params.to_pairs();
    if pairs.is_empty() {
        return Ok("/api/properties/search".to_string());
    }
    let query =
        serde_urlencoded::to_string(pairs).map_err(|e| ApiError::Serialization(e.to_string()))?;
    Ok(format!("/api/properties/search?{query}"))
}
