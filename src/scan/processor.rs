use std::path::Path;
use std::sync::Arc;

use tracing::{error, info, instrument, warn};

use super::analyzer::CardImageAnalyzer;
use super::folder::list_card_images;
use super::jobs::{JobHandle, ScanJobStore};
use super::ScanError;
use crate::db::DbPool;
use crate::dto::ScanRequest;
use crate::models::{Card, ScanJob, ScanStatus};
use crate::repo;

/// Everything a running scan needs, cheap to clone into a task
#[derive(Clone)]
pub struct ScanContext {
    pub pool: Arc<DbPool>,
    pub jobs: Arc<ScanJobStore>,
    pub analyzer: Arc<dyn CardImageAnalyzer>,
}

/// What happened to one image
#[derive(Debug, PartialEq)]
enum ImageOutcome {
    Saved,
    Failed,
}

/// Registers a job for `request` and processes it in a background task
///
/// Returns the job as registered; follow its progress through the store.
pub async fn start_scan(ctx: ScanContext, request: ScanRequest, user_id: String) -> ScanJob {
    let job = ScanJob::new(request.job_name, request.folder_path, user_id, request.settings);
    let handle = ctx.jobs.create(job.clone()).await;

    tokio::spawn(run_scan_job(ctx, handle));
    job
}

/// Processes every image of the job's folder, one at a time
///
/// Stops early when the job is cancelled; waits while it is paused.
#[instrument(skip(ctx, handle), fields(job_id = %handle.job_id()))]
pub async fn run_scan_job(ctx: ScanContext, mut handle: JobHandle) {
    let job_id = handle.job_id().to_string();
    let Some(job) = ctx.jobs.get(&job_id).await else {
        warn!("Scan job vanished before it started");
        return;
    };

    let listed = list_card_images(Path::new(&job.folder_path))
        .await
        .and_then(|images| Ok((image_total(images.len())?, images)));
    let (total, images) = match listed {
        Ok(listed) => listed,
        Err(e) => {
            error!("Scan job failed: {}", e);
            ctx.jobs.update(&job_id, |j| j.fail(e.to_string())).await;
            return;
        }
    };

    info!("Found {} images to scan in {}", total, job.folder_path);
    if ctx.jobs.update(&job_id, |j| j.total_cards = total).await.is_none() {
        return;
    }

    for (index, image) in images.iter().enumerate() {
        if !handle.proceed().await {
            info!("Scan job cancelled after {} of {} images", index, total);
            return;
        }

        info!("Processing image {}/{}: {:?}", index + 1, total, image);
        let outcome = process_image(&ctx, &job, image).await;

        let updated = ctx
            .jobs
            .update(&job_id, |j| {
                j.processed_cards += 1;
                match outcome {
                    ImageOutcome::Saved => j.saved_cards += 1,
                    ImageOutcome::Failed => j.failed_cards += 1,
                }
            })
            .await;
        if updated.is_none() {
            info!("Scan job cancelled while processing {:?}", image);
            return;
        }
    }

    if let Some(done) = ctx
        .jobs
        .update(&job_id, |j| j.set_status(ScanStatus::Completed))
        .await
    {
        info!(
            "Scan job completed: {} saved, {} failed of {}",
            done.saved_cards, done.failed_cards, done.total_cards
        );
    }
}

/// Job counters are `u32`; larger folders are refused rather than miscounted
fn image_total(count: usize) -> Result<u32, ScanError> {
    u32::try_from(count).map_err(|_| ScanError::TooManyImages(count))
}

async fn process_image(ctx: &ScanContext, job: &ScanJob, image: &Path) -> ImageOutcome {
    let analysis = match ctx.analyzer.analyze(image).await {
        Ok(analysis) => analysis,
        Err(e) => {
            warn!("Failed to analyze {:?}: {}", image, e);
            return ImageOutcome::Failed;
        }
    };

    if analysis.confidence < job.settings.confidence_threshold {
        info!(
            "Skipping {:?}: confidence {} below threshold {}",
            image, analysis.confidence, job.settings.confidence_threshold
        );
        return ImageOutcome::Failed;
    }

    let fields = match analysis
        .into_draft(image, &job.job_name, &job.folder_path)
        .validate()
    {
        Ok(fields) => fields,
        Err(e) => {
            warn!("Analysis of {:?} is not a valid card: {}", image, e);
            return ImageOutcome::Failed;
        }
    };

    let card = Card::new(job.user_id.clone(), fields);
    let pool = ctx.pool.clone();
    match tokio::task::spawn_blocking(move || repo::create_card(&pool, card)).await {
        Ok(Ok(card)) => {
            info!("Saved scanned card {} ({})", card.get_id(), card.get_player_name());
            ImageOutcome::Saved
        }
        Ok(Err(e)) => {
            warn!("Failed to save card from {:?}: {}", image, e);
            ImageOutcome::Failed
        }
        Err(e) => {
            error!("Card insert task failed: {}", e);
            ImageOutcome::Failed
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    use tempfile::TempDir;

    use super::*;
    use crate::models::{ScanJobSettings, ScanningSettings};
    use crate::repo::tests::{create_test_user, setup_test_db};
    use crate::scan::CardAnalysis;
    use crate::scan::analyzer::testing::ScriptedAnalyzer;

    fn confident(player: &str, confidence: f64) -> CardAnalysis {
        CardAnalysis {
            player_name: Some(player.to_string()),
            confidence,
            ..CardAnalysis::fallback()
        }
    }

    fn photo_folder(names: &[&str]) -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        for name in names {
            fs::write(dir.path().join(name), b"img").unwrap();
        }
        dir
    }

    fn request(folder: &Path) -> ScanRequest {
        ScanRequest {
            job_name: "Box 7".to_string(),
            folder_path: folder.display().to_string(),
            settings: ScanJobSettings::from(&ScanningSettings::default()),
        }
    }

    async fn wait_until_finished(jobs: &ScanJobStore, id: &str) -> ScanJob {
        for _ in 0..200 {
            if let Some(job) = jobs.get(id).await {
                if job.status.is_finished() {
                    return job;
                }
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("scan job {} did not finish", id);
    }

    fn context(analyzer: ScriptedAnalyzer) -> (ScanContext, String) {
        let pool = setup_test_db();
        let user = create_test_user(&pool, "scanner@example.com");
        let ctx = ScanContext {
            pool,
            jobs: Arc::new(ScanJobStore::new()),
            analyzer: Arc::new(analyzer),
        };
        (ctx, user.get_id())
    }

    #[tokio::test]
    async fn test_scan_saves_confident_cards_and_counts_the_rest() {
        let folder = photo_folder(&["1.jpg", "2.jpg", "3.png", "4.jpg", "skip.txt"]);
        let mut invalid = confident("Nobody", 0.95);
        invalid.year = Some(1700);
        let analyzer = ScriptedAnalyzer::reachable()
            .with_answer("1.jpg", confident("Derek Jeter", 0.95))
            .with_answer("2.jpg", confident("Low Confidence", 0.5))
            .with_answer("3.png", invalid);
        // 4.jpg has no scripted answer and errors
        let (ctx, user_id) = context(analyzer);

        let job = start_scan(ctx.clone(), request(folder.path()), user_id.clone()).await;
        let done = wait_until_finished(&ctx.jobs, &job.id).await;

        assert_eq!(done.status, ScanStatus::Completed);
        assert_eq!(done.total_cards, 4);
        assert_eq!(done.processed_cards, 4);
        assert_eq!(done.saved_cards, 1);
        assert_eq!(done.failed_cards, 3);

        let cards = repo::list_all_cards(&ctx.pool, &user_id).unwrap();
        assert_eq!(cards.len(), 1);
        let card = &cards[0];
        assert_eq!(card.get_player_name(), "Derek Jeter");
        assert_eq!(card.get_lot_number(), Some("Box 7"));
        assert_eq!(card.get_tags(), ["Box 7".to_string(), "scanned".to_string()]);
        assert!(card.get_front_image().ends_with("1.jpg"));
        assert_eq!(card.get_front_image(), card.get_back_image());
    }

    #[tokio::test]
    async fn test_threshold_comes_from_job_settings() {
        let folder = photo_folder(&["a.jpg"]);
        let analyzer = ScriptedAnalyzer::reachable().with_answer("a.jpg", confident("X", 0.3));
        let (ctx, user_id) = context(analyzer);

        let mut req = request(folder.path());
        req.settings.confidence_threshold = 0.2;
        let job = start_scan(ctx.clone(), req, user_id).await;
        let done = wait_until_finished(&ctx.jobs, &job.id).await;

        assert_eq!(done.saved_cards, 1);
        assert_eq!(done.failed_cards, 0);
    }

    #[test]
    fn test_image_total_refuses_oversized_folders() {
        assert_eq!(image_total(3).unwrap(), 3);
        assert_eq!(image_total(u32::MAX as usize).unwrap(), u32::MAX);

        let too_many = u32::MAX as usize + 1;
        let err = image_total(too_many).unwrap_err();
        assert!(matches!(err, ScanError::TooManyImages(n) if n == too_many));
    }

    #[tokio::test]
    async fn test_missing_folder_fails_the_job() {
        let dir = tempfile::tempdir().unwrap();
        let (ctx, user_id) = context(ScriptedAnalyzer::reachable());

        let job = start_scan(ctx.clone(), request(&dir.path().join("gone")), user_id).await;
        let done = wait_until_finished(&ctx.jobs, &job.id).await;

        assert_eq!(done.status, ScanStatus::Failed);
        assert!(done.error.unwrap().starts_with("Folder not found: "));
    }

    #[tokio::test]
    async fn test_empty_folder_fails_the_job() {
        let folder = photo_folder(&["notes.txt"]);
        let (ctx, user_id) = context(ScriptedAnalyzer::reachable());

        let job = start_scan(ctx.clone(), request(folder.path()), user_id).await;
        let done = wait_until_finished(&ctx.jobs, &job.id).await;

        assert_eq!(done.status, ScanStatus::Failed);
        assert_eq!(done.error.as_deref(), Some("No image files found in the specified folder"));
    }

    #[tokio::test]
    async fn test_paused_job_processes_nothing_until_resumed() {
        let folder = photo_folder(&["a.jpg", "b.jpg"]);
        let analyzer = Arc::new(
            ScriptedAnalyzer::reachable()
                .with_answer("a.jpg", confident("A", 0.9))
                .with_answer("b.jpg", confident("B", 0.9)),
        );
        let (mut ctx, user_id) = context(ScriptedAnalyzer::reachable());
        ctx.analyzer = analyzer.clone();

        let job = ScanJob::new(
            "paused".to_string(),
            folder.path().display().to_string(),
            user_id,
            ScanJobSettings::from(&ScanningSettings::default()),
        );
        let handle = ctx.jobs.create(job.clone()).await;
        ctx.jobs.pause(&job.id).await.unwrap();
        tokio::spawn(run_scan_job(ctx.clone(), handle));

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(analyzer.calls.load(Ordering::SeqCst), 0);
        let paused = ctx.jobs.get(&job.id).await.unwrap();
        assert_eq!(paused.status, ScanStatus::Paused);
        assert_eq!(paused.total_cards, 2);

        ctx.jobs.resume(&job.id).await.unwrap();
        let done = wait_until_finished(&ctx.jobs, &job.id).await;
        assert_eq!(done.saved_cards, 2);
        assert_eq!(analyzer.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_cancelled_job_stops() {
        let folder = photo_folder(&["a.jpg", "b.jpg", "c.jpg"]);
        let analyzer = Arc::new(ScriptedAnalyzer::reachable().with_answer("a.jpg", confident("A", 0.9)));
        let (mut ctx, user_id) = context(ScriptedAnalyzer::reachable());
        ctx.analyzer = analyzer.clone();

        let job = ScanJob::new(
            "cancel me".to_string(),
            folder.path().display().to_string(),
            user_id.clone(),
            ScanJobSettings::from(&ScanningSettings::default()),
        );
        let handle = ctx.jobs.create(job.clone()).await;
        ctx.jobs.pause(&job.id).await.unwrap();
        let task = tokio::spawn(run_scan_job(ctx.clone(), handle));

        tokio::time::sleep(Duration::from_millis(20)).await;
        ctx.jobs.cancel(&job.id).await.unwrap();
        tokio::time::timeout(Duration::from_secs(2), task).await.unwrap().unwrap();

        assert_eq!(analyzer.calls.load(Ordering::SeqCst), 0);
        assert!(ctx.jobs.get(&job.id).await.is_none());
        assert!(repo::list_all_cards(&ctx.pool, &user_id).unwrap().is_empty());
    }
}
