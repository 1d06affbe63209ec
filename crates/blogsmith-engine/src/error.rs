use blogsmith_db::DbError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// The per-campaign generation lock is held by another cycle. Manual
    /// triggers surface this as a conflict; the scheduled sweep skips.
    #[error("a generation is already in flight for campaign {campaign_id}")]
    AlreadyRunning { campaign_id: i64 },
    /// The campaign exists but is not in a runnable status. No execution log
    /// entry is written for these attempts.
    #[error("campaign {campaign_id} is '{status}'; only active campaigns generate")]
    NotActive { campaign_id: i64, status: String },
    #[error("OPENAI_API_KEY is not configured; the writer client cannot be built")]
    MissingWriterKey,
    #[error("failed to build the {component} client: {reason}")]
    ClientBuild {
        component: &'static str,
        reason: String,
    },
    #[error("failed to encode article metadata: {0}")]
    Encode(#[from] serde_json::Error),
    #[error(transparent)]
    Db(#[from] DbError),
}
