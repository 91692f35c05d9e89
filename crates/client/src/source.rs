//! The job-listing seam consumed by the history sync engine.

use async_trait::async_trait;
use enhancer_core::job::{JobDetail, JobKind, JobPage, JobRecord};

use crate::api::{EnhanceApi, ListQuery};
use crate::error::EnhanceApiError;

/// Read-only access to job listings and job details.
///
/// Implemented by [`EnhanceApi`]; tests substitute scripted fakes.
#[async_trait]
pub trait JobSource: Send + Sync {
    /// One page of jobs of `kind` plus the kind's reported total.
    async fn list(&self, kind: JobKind, page: u32, per_page: u32) -> Result<JobPage, EnhanceApiError>;

    /// One job including its base64 payloads.
    async fn detail(&self, kind: JobKind, id: &str) -> Result<JobDetail, EnhanceApiError>;
}

#[async_trait]
impl JobSource for EnhanceApi {
    async fn list(&self, kind: JobKind, page: u32, per_page: u32) -> Result<JobPage, EnhanceApiError> {
        let query = ListQuery::new(page, per_page);
        match kind {
            JobKind::Image => {
                let response = self.list_images(&query).await?;
                Ok(JobPage {
                    total: response.total,
                    records: response.images.into_iter().map(JobRecord::from_image).collect(),
                })
            }
            JobKind::Video => {
                let response = self.list_videos(&query).await?;
                Ok(JobPage {
                    total: response.total,
                    records: response.videos.into_iter().map(JobRecord::from_video).collect(),
                })
            }
        }
    }

    async fn detail(&self, kind: JobKind, id: &str) -> Result<JobDetail, EnhanceApiError> {
        match kind {
            JobKind::Image => Ok(JobDetail::from_image(self.image_detail(id).await?.image)),
            JobKind::Video => Ok(JobDetail::from_video(self.video_detail(id).await?.video)),
        }
    }
}
