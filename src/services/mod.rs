//! 业务能力层
//!
//! 每个服务只描述"我能做什么"，不关心调用顺序

pub mod batch_validator;
pub mod fasta_parser;
pub mod quota_enforcer;
pub mod record_validator;
pub mod rejection_writer;

pub use batch_validator::validate_batch;
pub use fasta_parser::parse_fasta;
pub use quota_enforcer::{QuotaEnforcer, QuotaUsage};
pub use record_validator::{validate_record, validate_records};
pub use rejection_writer::RejectionWriter;
