// src/services/catalog_gateway.rs
//
// One async operation per upstream capability. Every failure leaves this
// type as a CatalogError; raw transport failures never escape.

use std::sync::Arc;

use log::{debug, warn};

use crate::domain::{
    validate_page, validate_search_query, DiscoverQuery, DomainError, FilterOptions, Item,
    ItemId, PageResult, SortOption,
};
use crate::error::{CatalogError, ErrorClassifier};
use crate::integrations::{AssistantBackend, CatalogBackend, TransportFailure};
use crate::repositories::{ApiKeyKind, KeyConfigStore};

pub type GatewayResult<T> = Result<T, CatalogError>;

pub struct CatalogGateway {
    catalog: Arc<dyn CatalogBackend>,
    assistant: Arc<dyn AssistantBackend>,
    keys: Arc<dyn KeyConfigStore>,
}

impl CatalogGateway {
    pub fn new(
        catalog: Arc<dyn CatalogBackend>,
        assistant: Arc<dyn AssistantBackend>,
        keys: Arc<dyn KeyConfigStore>,
    ) -> Self {
        Self {
            catalog,
            assistant,
            keys,
        }
    }

    pub async fn discover(
        &self,
        page: u32,
        sort: SortOption,
        filter: &FilterOptions,
    ) -> GatewayResult<PageResult> {
        validate_page(page).map_err(Self::rejected)?;

        let api_key = self.keys.api_key(ApiKeyKind::Catalog);
        let query = DiscoverQuery::new(page, sort, filter);
        self.catalog
            .discover(&api_key, &query)
            .await
            .map_err(|failure| self.classify(failure, ApiKeyKind::Catalog))
    }

    pub async fn search(&self, query: &str, page: u32) -> GatewayResult<PageResult> {
        validate_search_query(query).map_err(Self::rejected)?;
        validate_page(page).map_err(Self::rejected)?;

        let api_key = self.keys.api_key(ApiKeyKind::Catalog);
        self.catalog
            .search(&api_key, query, page)
            .await
            .map_err(|failure| self.classify(failure, ApiKeyKind::Catalog))
    }

    pub async fn fetch_detail(&self, id: ItemId) -> GatewayResult<Item> {
        let api_key = self.keys.api_key(ApiKeyKind::Catalog);
        self.catalog
            .get_detail(id, &api_key)
            .await
            .map_err(|failure| self.classify(failure, ApiKeyKind::Catalog))
    }

    /// Request token the user has to approve out of band
    pub async fn create_auth_token(&self) -> GatewayResult<String> {
        let api_key = self.keys.api_key(ApiKeyKind::Catalog);
        let response = self
            .catalog
            .create_token(&api_key)
            .await
            .map_err(|failure| self.classify(failure, ApiKeyKind::Catalog))?;

        if response.success {
            Ok(response.request_token)
        } else {
            Err(CatalogError::ApiError(
                "Failed to create request token".to_string(),
            ))
        }
    }

    /// Exchange an approved request token for a session id
    pub async fn create_session(&self, approved_token: &str) -> GatewayResult<String> {
        let api_key = self.keys.api_key(ApiKeyKind::Catalog);
        let response = self
            .catalog
            .create_session(&api_key, approved_token)
            .await
            .map_err(|failure| self.classify(failure, ApiKeyKind::Catalog))?;

        if response.success {
            Ok(response.session_id)
        } else {
            Err(CatalogError::ApiError("Failed to create session".to_string()))
        }
    }

    pub async fn create_list(
        &self,
        session_id: &str,
        name: &str,
        description: &str,
    ) -> GatewayResult<i64> {
        let api_key = self.keys.api_key(ApiKeyKind::Catalog);
        let response = self
            .catalog
            .create_list(&api_key, session_id, name, description)
            .await
            .map_err(|failure| self.classify(failure, ApiKeyKind::Catalog))?;

        if response.success {
            Ok(response.list_id)
        } else {
            Err(CatalogError::ApiError(response.status_message))
        }
    }

    pub async fn ask_assistant(&self, prompt: &str) -> GatewayResult<String> {
        let api_key = self.keys.api_key(ApiKeyKind::Assistant);
        self.assistant
            .ask(&api_key, prompt)
            .await
            .map_err(|failure| self.classify(failure, ApiKeyKind::Assistant))
    }

    fn classify(&self, failure: TransportFailure, kind: ApiKeyKind) -> CatalogError {
        debug!("Upstream call failed: {}", failure);
        ErrorClassifier::classify(&failure, self.keys.is_configured(kind))
    }

    fn rejected(error: DomainError) -> CatalogError {
        warn!("Request rejected before reaching the upstream: {}", error);
        CatalogError::ApiError(error.to_string())
    }
}
