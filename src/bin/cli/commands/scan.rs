use cardwise::dto::{ScanSettingsDto, StartScanDto};
use clap::Subcommand;

use crate::client::CardwiseClient;
use crate::output::{self, OutputConfig};

/// Batch scanning commands
#[derive(Subcommand, Debug)]
pub enum ScanCommands {
    /// Start labelling every photo in a folder on the server
    Start {
        /// Name for the job, also used as the cards' lot number
        #[clap(long)]
        name: String,
        /// Folder of card photos, as seen by the server
        #[clap(long)]
        folder: String,
        /// Minimum confidence (0.0 to 1.0) for a card to be saved
        #[clap(long)]
        confidence_threshold: Option<f64>,
    },
    /// List scan jobs
    Jobs,
    /// Show progress of a job
    Progress {
        /// The job ID
        job_id: String,
    },
    /// Pause a running job
    Pause {
        /// The job ID
        job_id: String,
    },
    /// Resume a paused job
    Resume {
        /// The job ID
        job_id: String,
    },
    /// Cancel a job and forget it
    Cancel {
        /// The job ID
        job_id: String,
    },
}

/// Executes a scan command
pub async fn execute(
    client: &CardwiseClient,
    cmd: ScanCommands,
    config: &OutputConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        ScanCommands::Start {
            name,
            folder,
            confidence_threshold,
        } => {
            let dto = StartScanDto {
                job_name: Some(name),
                folder_path: Some(folder),
                settings: confidence_threshold.map(|threshold| ScanSettingsDto {
                    confidence_threshold: Some(threshold),
                    ..Default::default()
                }),
            };
            let job = client.start_scan(&dto).await?;
            output::print_scan_job(&job, config);
        }
        ScanCommands::Jobs => {
            let jobs = client.list_scan_jobs().await?;
            output::print_scan_jobs(&jobs, config);
        }
        ScanCommands::Progress { job_id } => {
            let progress = client.scan_progress(&job_id).await?;
            output::print_progress(&progress, config);
        }
        ScanCommands::Pause { job_id } => {
            let message = client.control_scan("pause", &job_id).await?;
            output::print_success(&message, config);
        }
        ScanCommands::Resume { job_id } => {
            let message = client.control_scan("resume", &job_id).await?;
            output::print_success(&message, config);
        }
        ScanCommands::Cancel { job_id } => {
            let message = client.control_scan("cancel", &job_id).await?;
            output::print_success(&message, config);
        }
    }
    Ok(())
}
