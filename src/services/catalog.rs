use crate::client::{ApiClient, ApiError};
use crate::domain::{Category, Page, Product};

#[derive(Clone)]
pub struct CatalogService {
    api: ApiClient,
}

impl CatalogService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn products(&self, page: u32, size: u32) -> Result<Page<Product>, ApiError> {
        let query = [("page", page.to_string()), ("size", size.to_string())];
        self.api
            .get_with_query::<Page<Product>>("products", &query)
            .await?
            .into_result()
    }

    pub async fn product(&self, id: i64) -> Result<Product, ApiError> {
        self.api
            .get::<Product>(&format!("products/{}", id))
            .await?
            .into_result()
    }

    pub async fn by_category(&self, category_id: i64) -> Result<Vec<Product>, ApiError> {
        self.api
            .get::<Vec<Product>>(&format!("products/category/{}", category_id))
            .await?
            .into_result()
    }

    /// Name search. Blank queries short-circuit to an empty list.
    pub async fn search(&self, query: &str) -> Result<Vec<Product>, ApiError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        self.api
            .get_with_query::<Vec<Product>>("products/search", &[("name", query.to_string())])
            .await?
            .into_result()
    }

    pub async fn categories(&self) -> Result<Vec<Category>, ApiError> {
        self.api
            .get::<Vec<Category>>("categories")
            .await?
            .into_result()
    }
}
