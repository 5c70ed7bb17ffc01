//! Networking capability consumed by the board.

use async_trait::async_trait;
use common::{Job, JobAction, JobName, JOBS_PATH};
use reqwest::Url;
use std::time::Duration;

use crate::config::ApiConfig;
use crate::error::ApiError;

#[async_trait]
pub trait JobsApi: Send + Sync {
    /// `GET /api/jobs`
    async fn list_jobs(&self) -> Result<Vec<Job>, ApiError>;

    /// `GET /api/jobs/{name}`
    async fn get_job(&self, name: &JobName) -> Result<Job, ApiError>;

    /// `POST /api/jobs/{name}/{action}`; the response body is ignored.
    async fn send_action(&self, name: &JobName, action: JobAction) -> Result<(), ApiError>;
}

pub struct HttpJobsApi {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpJobsApi {
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let base_url = Url::parse(&config.base_url).map_err(|e| ApiError::InvalidBaseUrl {
            url: config.base_url.clone(),
            reason: e.to_string(),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidBaseUrl {
                url: config.base_url.clone(),
                reason: "URL cannot carry a path".to_string(),
            });
        }

        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            client: builder.build()?,
            base_url,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Appends `segments` after the jobs collection path, percent-encoding
    /// each one so a job name always stays a single segment.
    pub fn jobs_url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty();
            path.extend(JOBS_PATH.iter().chain(segments.iter()));
        }
        url
    }

    async fn read_body(response: reqwest::Response) -> Result<String, ApiError> {
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ApiError::Status { status, body });
        }
        Ok(body)
    }
}

#[async_trait]
impl JobsApi for HttpJobsApi {
    async fn list_jobs(&self) -> Result<Vec<Job>, ApiError> {
        let url = self.jobs_url(&[]);
        log::debug!("GET {}", url);
        let response = self.client.get(url).send().await?;
        let body = Self::read_body(response).await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn get_job(&self, name: &JobName) -> Result<Job, ApiError> {
        let url = self.jobs_url(&[name.as_str()]);
        log::debug!("GET {}", url);
        let response = self.client.get(url).send().await?;
        let body = Self::read_body(response).await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn send_action(&self, name: &JobName, action: JobAction) -> Result<(), ApiError> {
        let url = self.jobs_url(&[name.as_str(), action.as_str()]);
        log::debug!("POST {}", url);
        let response = self.client.post(url).send().await?;
        Self::read_body(response).await?;
        Ok(())
    }
}
