pub mod amino_acid;
pub mod identity;
pub mod limits;
pub mod loaders;
pub mod record;
pub mod request;
pub mod submission;

pub use identity::{Identity, UserId};
pub use limits::SubmissionLimits;
pub use loaders::{load_all_requests, load_submission_request, load_users};
pub use record::Record;
pub use request::{SubmissionRequest, UsersFile};
pub use submission::{Submission, SubmissionId, SubmissionReceipt, SubmissionStatus};
