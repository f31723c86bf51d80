//! HTTP client for the inventory endpoints of the dealership API.

use super::models::{
    AveragePriceReport, InventoryItem, InventoryItemId, InventoryPage, InventoryStatistics,
    LowStockReport, NewInventoryItem, PremiumListingReport,
};
use crate::user::AuthTokenValue;
use anyhow::{Context, Result};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::collections::HashSet;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum InventoryError {
    #[error("Not authorized to access the inventory")]
    Unauthorized,

    #[error("Inventory item {0} not found")]
    NotFound(InventoryItemId),

    #[error("Request rejected with status {status}: {body}")]
    Rejected { status: StatusCode, body: String },

    #[error("Malformed inventory response: {0}")]
    MalformedResponse(String),

    #[error("Inventory service unavailable: {0}")]
    Transport(#[from] reqwest::Error),
}

pub struct InventoryClient {
    client: reqwest::Client,
    base_url: String,
}

impl InventoryClient {
    pub fn new(base_url: &str, timeout_sec: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_sec))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn authorized(&self, builder: RequestBuilder, token: &AuthTokenValue) -> RequestBuilder {
        builder.header(
            reqwest::header::AUTHORIZATION,
            format!("Token {}", token.as_str()),
        )
    }

    /// Fetches the whole inventory, following pagination links until the last page.
    pub async fn list_items(
        &self,
        token: &AuthTokenValue,
    ) -> Result<Vec<InventoryItem>, InventoryError> {
        let mut url = format!("{}/cars/", self.base_url);
        let mut visited = HashSet::new();
        let mut items = Vec::new();

        loop {
            visited.insert(url.clone());
            debug!("Fetching inventory page {}", url);
            let response = self
                .authorized(self.client.get(&url), token)
                .send()
                .await?;
            let body: serde_json::Value = check_status(response, None).await?.json().await?;

            if body.is_array() {
                // unpaginated deployments return a bare list
                let page: Vec<InventoryItem> = serde_json::from_value(body)
                    .map_err(|err| InventoryError::MalformedResponse(err.to_string()))?;
                items.extend(page);
                return Ok(items);
            }

            let page: InventoryPage = serde_json::from_value(body)
                .map_err(|err| InventoryError::MalformedResponse(err.to_string()))?;
            items.extend(page.results);
            if let Some(count) = page.count {
                debug!("Fetched {} of {} inventory items", items.len(), count);
            }

            match page.next {
                Some(next) if !visited.contains(&next) => url = next,
                Some(next) => {
                    return Err(InventoryError::MalformedResponse(format!(
                        "pagination loops back to {}",
                        next
                    )))
                }
                None => return Ok(items),
            }
        }
    }

    pub async fn create_item(
        &self,
        token: &AuthTokenValue,
        item: &NewInventoryItem,
    ) -> Result<InventoryItem, InventoryError> {
        let url = format!("{}/cars/", self.base_url);
        let response = self
            .authorized(self.client.post(&url), token)
            .json(item)
            .send()
            .await?;
        Ok(check_status(response, None).await?.json().await?)
    }

    pub async fn update_item(
        &self,
        token: &AuthTokenValue,
        id: InventoryItemId,
        item: &NewInventoryItem,
    ) -> Result<InventoryItem, InventoryError> {
        let url = format!("{}/cars/{}/", self.base_url, id);
        let response = self
            .authorized(self.client.put(&url), token)
            .json(item)
            .send()
            .await?;
        Ok(check_status(response, Some(id)).await?.json().await?)
    }

    pub async fn delete_item(
        &self,
        token: &AuthTokenValue,
        id: InventoryItemId,
    ) -> Result<(), InventoryError> {
        let url = format!("{}/cars/{}/", self.base_url, id);
        let response = self
            .authorized(self.client.delete(&url), token)
            .send()
            .await?;
        check_status(response, Some(id)).await?;
        Ok(())
    }

    async fn get_report(
        &self,
        token: &AuthTokenValue,
        path: &str,
    ) -> Result<Response, InventoryError> {
        let url = format!("{}/{}", self.base_url, path);
        debug!("Fetching report {}", url);
        Ok(self
            .authorized(self.client.get(&url), token)
            .send()
            .await?)
    }

    pub async fn statistics(
        &self,
        token: &AuthTokenValue,
    ) -> Result<InventoryStatistics, InventoryError> {
        let response = self.get_report(token, "cars/statistics/").await?;
        decode(check_status(response, None).await?).await
    }

    /// Average price over the whole inventory, `None` when there is nothing to average.
    pub async fn average_price(
        &self,
        token: &AuthTokenValue,
    ) -> Result<Option<f64>, InventoryError> {
        let response = self.get_report(token, "cars/average-price/").await?;
        if response.status() == StatusCode::NOT_FOUND {
            debug!("No average price, the inventory is empty");
            return Ok(None);
        }
        let report: AveragePriceReport = decode(check_status(response, None).await?).await?;
        Ok(report.average_price)
    }

    /// Items above the backend's premium price threshold, most expensive first.
    pub async fn premium_listing(
        &self,
        token: &AuthTokenValue,
    ) -> Result<Vec<InventoryItem>, InventoryError> {
        let response = self.get_report(token, "cars/expensive/").await?;
        let report: PremiumListingReport = decode(check_status(response, None).await?).await?;
        Ok(report.expensive_cars)
    }

    /// Items running out of stock, lowest stock first.
    pub async fn low_stock(
        &self,
        token: &AuthTokenValue,
    ) -> Result<Vec<InventoryItem>, InventoryError> {
        let response = self.get_report(token, "cars/low-stock/").await?;
        let report: LowStockReport = decode(check_status(response, None).await?).await?;
        Ok(report.low_stock_cars)
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, InventoryError> {
    let body = response.bytes().await?;
    serde_json::from_slice(&body).map_err(|err| InventoryError::MalformedResponse(err.to_string()))
}

async fn check_status(
    response: Response,
    id: Option<InventoryItemId>,
) -> Result<Response, InventoryError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    match (status, id) {
        (StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN, _) => Err(InventoryError::Unauthorized),
        (StatusCode::NOT_FOUND, Some(id)) => Err(InventoryError::NotFound(id)),
        _ => Err(InventoryError::Rejected {
            status,
            body: response.text().await.unwrap_or_default(),
        }),
    }
}
