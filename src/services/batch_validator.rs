use crate::error::SubmitError;
use crate::models::record::Record;

/// 校验整批记录的数量：至少 1 条，最多 `max_sequences` 条
pub fn validate_batch(records: &[Record], max_sequences: usize) -> Result<(), SubmitError> {
    if records.is_empty() {
        return Err(SubmitError::NoSequences);
    }

    if records.len() > max_sequences {
        return Err(SubmitError::TooManySequences {
            count: records.len(),
            max: max_sequences,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batch(n: usize) -> Vec<Record> {
        (1..=n).map(|i| Record::new(format!("s{i}"), "ACDE")).collect()
    }

    #[test]
    fn test_bounds() {
        assert!(matches!(validate_batch(&[], 10), Err(SubmitError::NoSequences)));
        assert!(validate_batch(&batch(1), 10).is_ok());
        assert!(validate_batch(&batch(10), 10).is_ok());
        assert!(matches!(
            validate_batch(&batch(11), 10),
            Err(SubmitError::TooManySequences { count: 11, max: 10 })
        ));
    }
}
