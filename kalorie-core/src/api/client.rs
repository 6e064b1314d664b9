//! HTTP client for the Kalorie backend.

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::error::ApiError;
use super::response::{decode, decode_ack, error_message};
use crate::models::{
    DiaryEntry, DiaryEntryUpdate, EntryId, ExerciseEntry, ExerciseInput, Food, Goals,
    NewDiaryEntry, WeightEntry, WeightInput,
};

pub const DEFAULT_API_URL: &str = "http://localhost:5000/api";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Backend operations the client state depends on.
///
/// Every method resolves to the payload or an [`ApiError`]; response shape
/// differences are handled by the implementation.
#[async_trait]
pub trait CalorieApi: Send + Sync {
    async fn get_foods(&self) -> Result<Vec<Food>, ApiError>;
    async fn get_food_by_id(&self, id: i64) -> Result<Food, ApiError>;
    async fn create_food(&self, food: &Food) -> Result<Food, ApiError>;
    async fn update_food(&self, id: i64, food: &Food) -> Result<Food, ApiError>;

    async fn get_diary_entries(&self, date: NaiveDate) -> Result<Vec<DiaryEntry>, ApiError>;
    async fn add_diary_entry(&self, entry: &NewDiaryEntry) -> Result<DiaryEntry, ApiError>;
    async fn update_diary_entry(
        &self,
        id: EntryId,
        update: &DiaryEntryUpdate,
    ) -> Result<DiaryEntry, ApiError>;
    async fn delete_diary_entry(&self, id: EntryId) -> Result<(), ApiError>;

    async fn get_exercises(&self, date: NaiveDate) -> Result<Vec<ExerciseEntry>, ApiError>;
    async fn add_exercise(&self, exercise: &ExerciseInput) -> Result<ExerciseEntry, ApiError>;
    async fn update_exercise(
        &self,
        id: i64,
        exercise: &ExerciseInput,
    ) -> Result<ExerciseEntry, ApiError>;
    async fn delete_exercise(&self, id: i64) -> Result<(), ApiError>;

    async fn get_weights(&self) -> Result<Vec<WeightEntry>, ApiError>;
    async fn add_weight_entry(&self, weight: &WeightInput) -> Result<WeightEntry, ApiError>;
    async fn update_weight_entry(
        &self,
        id: i64,
        weight: &WeightInput,
    ) -> Result<WeightEntry, ApiError>;
    async fn delete_weight_entry(&self, id: i64) -> Result<(), ApiError>;

    async fn get_goals(&self) -> Result<Goals, ApiError>;
    async fn set_goals(&self, goals: &Goals) -> Result<Goals, ApiError>;
}

/// [`CalorieApi`] over JSON/HTTP.
#[derive(Debug, Clone)]
pub struct HttpApiClient {
    base_url: String,
    http: reqwest::Client,
}

impl HttpApiClient {
    /// Creates a client for `base_url` with the default request timeout.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ApiError> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Http(e.to_string()))?;
        Ok(Self {
            base_url: base_url.into(),
            http,
        })
    }

    /// Returns the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Builds an absolute URL for an endpoint path.
    fn build_url(&self, path: &str) -> String {
        let base_url = if !self.base_url.starts_with("http://")
            && !self.base_url.starts_with("https://")
        {
            format!("http://{}", self.base_url)
        } else {
            self.base_url.clone()
        };

        format!("{}{}", base_url.trim_end_matches('/'), path)
    }

    /// Sends a request and returns the body of a successful response.
    async fn execute(&self, request: RequestBuilder, path: &str) -> Result<String, ApiError> {
        let response = request
            .send()
            .await
            .map_err(|e| ApiError::Http(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Http(e.to_string()))?;

        if status.is_success() {
            Ok(body)
        } else {
            Err(status_error(status, path, &body))
        }
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        tracing::debug!(path, "GET");
        let body = self
            .execute(self.http.get(self.build_url(path)), path)
            .await?;
        decode(&body)
    }

    async fn send<B, T>(&self, method: Method, path: &str, payload: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        tracing::debug!(path, %method, "sending");
        let request = self
            .http
            .request(method, self.build_url(path))
            .json(payload);
        let body = self.execute(request, path).await?;
        decode(&body)
    }

    async fn delete(&self, path: &str) -> Result<(), ApiError> {
        tracing::debug!(path, "DELETE");
        let body = self
            .execute(self.http.delete(self.build_url(path)), path)
            .await?;
        decode_ack(&body)
    }
}

/// Maps a non-success status to an error carrying the server's explanation.
fn status_error(status: StatusCode, path: &str, body: &str) -> ApiError {
    let message = error_message(body);
    if status == StatusCode::NOT_FOUND {
        return ApiError::NotFound(message.unwrap_or_else(|| path.to_string()));
    }
    match message {
        Some(message) => {
            ApiError::Http(format!("Server returned status {}: {}", status, message))
        }
        None => ApiError::Http(format!("Server returned status {}", status)),
    }
}

#[async_trait]
impl CalorieApi for HttpApiClient {
    async fn get_foods(&self) -> Result<Vec<Food>, ApiError> {
        self.get("/foods/").await
    }

    async fn get_food_by_id(&self, id: i64) -> Result<Food, ApiError> {
        self.get(&format!("/foods/{}/", id)).await
    }

    async fn create_food(&self, food: &Food) -> Result<Food, ApiError> {
        self.send(Method::POST, "/foods/", food).await
    }

    async fn update_food(&self, id: i64, food: &Food) -> Result<Food, ApiError> {
        self.send(Method::PUT, &format!("/foods/{}/", id), food)
            .await
    }

    async fn get_diary_entries(&self, date: NaiveDate) -> Result<Vec<DiaryEntry>, ApiError> {
        self.get(&format!("/diary/entries?date={}", date)).await
    }

    async fn add_diary_entry(&self, entry: &NewDiaryEntry) -> Result<DiaryEntry, ApiError> {
        self.send(Method::POST, "/diary/entries", entry).await
    }

    async fn update_diary_entry(
        &self,
        id: EntryId,
        update: &DiaryEntryUpdate,
    ) -> Result<DiaryEntry, ApiError> {
        self.send(Method::PUT, &format!("/diary/entries/{}", id), update)
            .await
    }

    async fn delete_diary_entry(&self, id: EntryId) -> Result<(), ApiError> {
        self.delete(&format!("/diary/entries/{}", id)).await
    }

    async fn get_exercises(&self, date: NaiveDate) -> Result<Vec<ExerciseEntry>, ApiError> {
        self.get(&format!("/exercises/{}/", date)).await
    }

    async fn add_exercise(&self, exercise: &ExerciseInput) -> Result<ExerciseEntry, ApiError> {
        self.send(Method::POST, "/exercises/", exercise).await
    }

    async fn update_exercise(
        &self,
        id: i64,
        exercise: &ExerciseInput,
    ) -> Result<ExerciseEntry, ApiError> {
        self.send(Method::PUT, &format!("/exercises/{}/", id), exercise)
            .await
    }

    async fn delete_exercise(&self, id: i64) -> Result<(), ApiError> {
        self.delete(&format!("/exercises/{}/", id)).await
    }

    async fn get_weights(&self) -> Result<Vec<WeightEntry>, ApiError> {
        self.get("/weights/").await
    }

    async fn add_weight_entry(&self, weight: &WeightInput) -> Result<WeightEntry, ApiError> {
        self.send(Method::POST, "/weights/", weight).await
    }

    async fn update_weight_entry(
        &self,
        id: i64,
        weight: &WeightInput,
    ) -> Result<WeightEntry, ApiError> {
        self.send(Method::PUT, &format!("/weights/{}/", id), weight)
            .await
    }

    async fn delete_weight_entry(&self, id: i64) -> Result<(), ApiError> {
        self.delete(&format!("/weights/{}/", id)).await
    }

    async fn get_goals(&self) -> Result<Goals, ApiError> {
        self.get("/goals/").await
    }

    async fn set_goals(&self, goals: &Goals) -> Result<Goals, ApiError> {
        self.send(Method::POST, "/goals/", goals).await
    }
}
