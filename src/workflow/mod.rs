pub mod submission_ctx;
pub mod submission_pipeline;

pub use submission_ctx::SubmissionCtx;
pub use submission_pipeline::SubmissionPipeline;
