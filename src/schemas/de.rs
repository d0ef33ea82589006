use serde::{Deserialize, Deserializer};

/// Treats an explicit `null` the same as a missing field.
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Integer(u64),
    Float(f64),
    Text(String),
}

/// Form inputs post numbers as strings; accept both, and `""`/`null` as unset.
pub(crate) fn optional_u32_flexible<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error as _;

    let Some(raw) = Option::<NumberOrText>::deserialize(deserializer)? else {
        return Ok(None);
    };

    match raw {
        NumberOrText::Integer(value) => u32::try_from(value)
            .map(Some)
            .map_err(|_| D::Error::custom(format!("number out of range: {value}"))),
        NumberOrText::Float(value) if value >= 0.0 && value.fract() == 0.0 => {
            if value > u32::MAX as f64 {
                return Err(D::Error::custom(format!("number out of range: {value}")));
            }
            Ok(Some(value as u32))
        }
        NumberOrText::Float(value) => {
            Err(D::Error::custom(format!("expected a whole number, got {value}")))
        }
        NumberOrText::Text(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            trimmed
                .parse::<u32>()
                .map(Some)
                .map_err(|_| D::Error::custom(format!("expected a number, got '{text}'")))
        }
    }
}

pub(crate) fn u32_flexible<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    optional_u32_flexible(deserializer).map(Option::unwrap_or_default)
}
