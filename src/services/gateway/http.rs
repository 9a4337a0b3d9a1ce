use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use serde::Deserialize;

use super::{new_booking_payload, BookingBackend, CredentialProvider, DateRange, StaticCredentials};
use crate::config::AppConfig;
use crate::errors::AppError;
use crate::models::{normalize_date, BookingRecord, BookingStatus};

const DEFAULT_FULL_DATES_WINDOW_DAYS: i64 = 30;

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// reqwest implementation of [`BookingBackend`] against the `/bookings` routes.
pub struct HttpBookingGateway {
    base_url: String,
    credentials: Arc<dyn CredentialProvider>,
    full_dates_window_days: i64,
    client: reqwest::Client,
}

impl HttpBookingGateway {
    pub fn new(base_url: impl Into<String>, credentials: Arc<dyn CredentialProvider>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            credentials,
            full_dates_window_days: DEFAULT_FULL_DATES_WINDOW_DAYS,
            client: reqwest::Client::new(),
        }
    }

    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .context("failed to build HTTP client")?;
        let credentials = StaticCredentials::new(config.auth_token.clone(), config.user_id);

        Ok(Self {
            base_url: config.api_url.clone(),
            credentials: Arc::new(credentials),
            full_dates_window_days: config.full_dates_window_days,
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/bookings{}", self.base_url, path)
    }

    fn authorized(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.credentials.bearer_token() {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    async fn fetch_list(&self, req: reqwest::RequestBuilder, what: &str) -> Vec<BookingRecord> {
        let resp = match self.authorized(req).send().await {
            Ok(resp) => resp,
            Err(e) => {
                tracing::warn!(error = %e, what, "booking listing failed, treating as empty");
                return Vec::new();
            }
        };

        let status = resp.status();
        if !status.is_success() {
            tracing::warn!(%status, what, "booking listing rejected, treating as empty");
            return Vec::new();
        }

        match resp.json::<Vec<serde_json::Value>>().await {
            Ok(values) => decode_records(values),
            Err(e) => {
                tracing::warn!(error = %e, what, "unreadable booking listing, treating as empty");
                Vec::new()
            }
        }
    }

    async fn expect_success(
        &self,
        req: reqwest::RequestBuilder,
        fallback: &str,
    ) -> Result<reqwest::Response, AppError> {
        let resp = self
            .authorized(req)
            .send()
            .await
            .map_err(|e| AppError::Gateway(format!("{fallback}: {e}")))?;

        if resp.status().is_success() {
            Ok(resp)
        } else {
            let status = resp.status();
            let message = error_message(resp, fallback).await;
            tracing::warn!(%status, message = %message, "booking request rejected");
            Err(AppError::Gateway(message))
        }
    }
}

/// Backend `{ message }` if present and non-empty, otherwise `fallback`.
async fn error_message(resp: reqwest::Response, fallback: &str) -> String {
    resp.json::<ErrorBody>()
        .await
        .ok()
        .and_then(|body| body.message)
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| fallback.to_string())
}

/// One bad record is dropped instead of failing the whole listing.
fn decode_records(values: Vec<serde_json::Value>) -> Vec<BookingRecord> {
    values
        .into_iter()
        .filter_map(|value| match serde_json::from_value::<BookingRecord>(value) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(error = %e, "skipping undecodable booking record");
                None
            }
        })
        .collect()
}

fn day(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

#[async_trait]
impl BookingBackend for HttpBookingGateway {
    async fn fetch_full_dates(
        &self,
        service_id: i64,
        range: Option<DateRange>,
    ) -> Result<Vec<String>, AppError> {
        const FAILED: &str = "Failed to fetch full dates";

        let range = range.unwrap_or_else(|| {
            DateRange::upcoming(Utc::now().date_naive(), self.full_dates_window_days)
        });

        // served without a session
        let resp = self
            .client
            .get(self.url(&format!("/full-dates/{service_id}")))
            .query(&[("start", range.start_str()), ("end", range.end_str())])
            .send()
            .await
            .map_err(|e| AppError::Gateway(format!("{FAILED}: {e}")))?;

        if !resp.status().is_success() {
            tracing::warn!(service_id, status = %resp.status(), "full dates request rejected");
            return Err(AppError::Gateway(FAILED.to_string()));
        }

        let values: Vec<serde_json::Value> = resp
            .json()
            .await
            .map_err(|e| AppError::Gateway(format!("{FAILED}: {e}")))?;

        Ok(values.iter().filter_map(normalize_date).collect())
    }

    async fn fetch_bookings_for_store_in_range(
        &self,
        store_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Vec<BookingRecord> {
        let req = self
            .client
            .get(self.url(&format!("/store/{store_id}")))
            .query(&[("start", day(start)), ("end", day(end))]);
        let bookings = self.fetch_list(req, "store range").await;
        tracing::debug!(store_id, count = bookings.len(), "fetched store bookings");
        bookings
    }

    async fn fetch_bookings_for_store_on_date(
        &self,
        store_id: i64,
        date: NaiveDate,
    ) -> Vec<BookingRecord> {
        let req = self
            .client
            .get(self.url(&format!("/store/{store_id}")))
            .query(&[("date", day(date))]);
        self.fetch_list(req, "store date").await
    }

    async fn fetch_bookings_for_user(&self, user_id: i64) -> Vec<BookingRecord> {
        let req = self.client.get(self.url(&format!("/user/{user_id}")));
        self.fetch_list(req, "user").await
    }

    async fn create_booking(
        &self,
        service_id: i64,
        date: &str,
        time: &str,
        notes: Option<String>,
    ) -> Result<BookingRecord, AppError> {
        let payload = new_booking_payload(self.credentials.as_ref(), service_id, date, time, notes);
        let req = self.client.post(self.url("")).json(&payload);
        let resp = self.expect_success(req, "Failed to create booking").await?;

        let record = match resp.json::<BookingRecord>().await {
            Ok(record) => record,
            Err(e) => {
                // the booking exists server-side; reporting failure would invite a duplicate
                tracing::warn!(error = %e, "created booking response unreadable, using local copy");
                payload.to_record()
            }
        };

        tracing::info!(
            booking_id = ?record.id,
            service_id,
            date,
            time,
            "booking created"
        );
        Ok(record)
    }

    async fn update_status(&self, booking_id: i64, status: BookingStatus) -> Result<(), AppError> {
        let req = self
            .client
            .patch(self.url(&format!("/{booking_id}/status")))
            .query(&[("status", status.as_str())]);
        self.expect_success(req, "Failed to update booking").await?;
        tracing::info!(booking_id, status = status.as_str(), "booking status updated");
        Ok(())
    }

    async fn delete_booking(&self, booking_id: i64) -> Result<(), AppError> {
        let req = self.client.delete(self.url(&format!("/{booking_id}")));
        self.expect_success(req, "Failed to delete booking").await?;
        tracing::info!(booking_id, "booking deleted");
        Ok(())
    }
}
