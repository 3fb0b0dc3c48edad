//! Pre-flight checks run before any page exists.

use super::ReportModel;
use crate::error::ValidationError;

/// Reject a model that cannot produce a meaningful protocol.
///
/// Checks run in a fixed order (model, id, date, address) and the first
/// failure is reported. Whitespace-only values count as empty.
pub fn validate(model: Option<&ReportModel>) -> Result<(), ValidationError> {
    let model = model.ok_or(ValidationError::MissingField("model"))?;

    let required: [(&'static str, &str); 3] = [
        ("id", model.id.as_str()),
        ("date", model.date.as_str()),
        ("address", model.address.as_str()),
    ];
    for (name, value) in required {
        if value.trim().is_empty() {
            return Err(ValidationError::MissingField(name));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete() -> ReportModel {
        ReportModel {
            id: "P-1".into(),
            date: "2026-01-10".into(),
            address: "Main St 4".into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_accepts_complete_model() {
        assert_eq!(validate(Some(&complete())), Ok(()));
    }

    #[test]
    fn test_absent_model() {
        assert_eq!(validate(None), Err(ValidationError::MissingField("model")));
    }

    #[test]
    fn test_first_failure_wins() {
        let model = ReportModel::default();
        assert_eq!(
            validate(Some(&model)),
            Err(ValidationError::MissingField("id"))
        );

        let model = ReportModel {
            date: String::new(),
            address: String::new(),
            ..complete()
        };
        assert_eq!(
            validate(Some(&model)),
            Err(ValidationError::MissingField("date"))
        );
    }

    #[test]
    fn test_whitespace_address_is_empty() {
        let model = ReportModel {
            address: "   ".into(),
            ..complete()
        };
        assert_eq!(
            validate(Some(&model)),
            Err(ValidationError::MissingField("address"))
        );
    }
}
