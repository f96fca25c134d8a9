use hyprviz_messages::AudioSnapshot;
use thiserror::Error;

/// Why a record could not be turned into a snapshot.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("expected {expected} fields, found {found}")]
    WrongArity { expected: usize, found: usize },

    #[error("field {index} is not a finite number: {field:?}")]
    BadNumber { index: usize, field: String },
}

/// Parse one comma-separated record into a snapshot of `expected` bands.
///
/// Whitespace around each field is ignored. `NaN` and infinities are
/// rejected like any other unparsable field: every band ends up in a
/// shader uniform, where a non-finite value poisons the whole frame.
pub fn decode(record: &str, expected: usize) -> Result<AudioSnapshot, DecodeError> {
    let found = record.split(',').count();
    if found != expected {
        return Err(DecodeError::WrongArity { expected, found });
    }

    let bands = record
        .split(',')
        .enumerate()
        .map(|(index, field)| {
            let field = field.trim();
            field
                .parse::<f32>()
                .ok()
                .filter(|value| value.is_finite())
                .ok_or_else(|| DecodeError::BadNumber {
                    index,
                    field: field.to_owned(),
                })
        })
        .collect::<Result<Vec<f32>, DecodeError>>()?;

    Ok(AudioSnapshot::from_bands(bands))
}
