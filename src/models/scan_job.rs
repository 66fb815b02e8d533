use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ScanningSettings;

/// Lifecycle of a scan job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanStatus {
    Pending,
    Processing,
    Paused,
    Completed,
    Failed,
}

impl ScanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScanStatus::Pending => "pending",
            ScanStatus::Processing => "processing",
            ScanStatus::Paused => "paused",
            ScanStatus::Completed => "completed",
            ScanStatus::Failed => "failed",
        }
    }

    /// Whether the job can no longer change state
    pub fn is_finished(&self) -> bool {
        matches!(self, ScanStatus::Completed | ScanStatus::Failed)
    }
}

impl fmt::Display for ScanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Settings a job was started with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanJobSettings {
    pub confidence_threshold: f64,
    pub auto_process: bool,
    pub image_quality: String,
}

impl From<&ScanningSettings> for ScanJobSettings {
    fn from(settings: &ScanningSettings) -> Self {
        Self {
            confidence_threshold: settings.confidence_threshold,
            auto_process: settings.auto_process,
            image_quality: settings.image_quality.clone(),
        }
    }
}

/// A batch labelling run over one folder of card photos
///
/// Jobs live in memory only and are gone after a restart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanJob {
    #[serde(rename = "_id")]
    pub id: String,
    pub job_name: String,
    pub status: ScanStatus,
    pub total_cards: u32,
    pub processed_cards: u32,
    pub failed_cards: u32,
    pub saved_cards: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub user_id: String,
    pub folder_path: String,
    pub settings: ScanJobSettings,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ScanJob {
    /// Creates a job in the `processing` state with a `scan_` prefixed id
    pub fn new(job_name: String, folder_path: String, user_id: String, settings: ScanJobSettings) -> Self {
        let now = Utc::now();
        Self {
            id: format!("scan_{}", Uuid::new_v4().simple()),
            job_name,
            status: ScanStatus::Processing,
            total_cards: 0,
            processed_cards: 0,
            failed_cards: 0,
            saved_cards: 0,
            created_at: now,
            updated_at: now,
            user_id,
            folder_path,
            settings,
            error: None,
        }
    }

    /// Sets the status and bumps `updated_at`
    pub fn set_status(&mut self, status: ScanStatus) {
        self.status = status;
        self.touch();
    }

    pub fn fail(&mut self, message: String) {
        self.error = Some(message);
        self.set_status(ScanStatus::Failed);
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Builds the progress report as of `now`
    pub fn progress_at(&self, now: DateTime<Utc>) -> ScanProgress {
        let elapsed_ms = (now - self.created_at).num_milliseconds().max(0) as f64;
        let estimated_time_remaining = if self.status == ScanStatus::Processing
            && self.total_cards > 0
            && self.processed_cards > 0
        {
            let remaining = self.total_cards.saturating_sub(self.processed_cards) as f64;
            (elapsed_ms / self.processed_cards as f64 * remaining / 1000.0).floor() as u64
        } else {
            0
        };

        ScanProgress {
            job_id: self.id.clone(),
            current_card: self.processed_cards,
            total_cards: self.total_cards,
            status: self.status,
            processing_time: (elapsed_ms / 1000.0).floor() as u64,
            estimated_time_remaining,
        }
    }
}

/// Progress snapshot of a scan job, times in seconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanProgress {
    pub job_id: String,
    pub current_card: u32,
    pub total_cards: u32,
    pub status: ScanStatus,
    pub processing_time: u64,
    pub estimated_time_remaining: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn job() -> ScanJob {
        ScanJob::new(
            "Box 1".to_string(),
            "/photos/box1".to_string(),
            "user-1".to_string(),
            ScanJobSettings::from(&ScanningSettings::default()),
        )
    }

    #[test]
    fn test_new_job_shape() {
        let job = job();
        assert!(job.id.starts_with("scan_"));
        assert_eq!(job.status, ScanStatus::Processing);
        assert_eq!(job.settings.confidence_threshold, 0.8);

        let json = serde_json::to_value(&job).unwrap();
        assert_eq!(json["_id"], job.id);
        assert_eq!(json["jobName"], "Box 1");
        assert_eq!(json["status"], "processing");
        assert!(json.get("error").is_none());
    }

    #[test]
    fn test_progress_estimate() {
        let mut job = job();
        job.total_cards = 10;
        job.processed_cards = 4;
        let progress = job.progress_at(job.created_at + Duration::seconds(20));

        assert_eq!(progress.current_card, 4);
        assert_eq!(progress.processing_time, 20);
        // 5 s per card, 6 cards left
        assert_eq!(progress.estimated_time_remaining, 30);
    }

    #[test]
    fn test_progress_without_processed_cards_has_no_estimate() {
        let mut job = job();
        job.total_cards = 10;
        let progress = job.progress_at(job.created_at + Duration::seconds(3));
        assert_eq!(progress.estimated_time_remaining, 0);

        job.processed_cards = 5;
        job.set_status(ScanStatus::Paused);
        let progress = job.progress_at(job.created_at + Duration::seconds(3));
        assert_eq!(progress.estimated_time_remaining, 0);
    }

    #[test]
    fn test_fail_records_message() {
        let mut job = job();
        job.fail("Folder not found: /nope".to_string());
        assert_eq!(job.status, ScanStatus::Failed);
        assert!(job.status.is_finished());
        assert_eq!(job.error.as_deref(), Some("Folder not found: /nope"));
    }
}
