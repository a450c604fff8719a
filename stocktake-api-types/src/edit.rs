use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Tri-state field for partial updates.
///
/// Update payloads need to distinguish "leave this field alone" from "clear
/// it": an omitted key keeps the stored value while an explicit `null` erases
/// it. Fields of this type must be tagged
/// `#[serde(default, skip_serializing_if = "FieldEdit::is_unchanged")]` so
/// `Unchanged` stays out of the payload entirely and `Clear` lands as `null`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldEdit<T> {
    Unchanged,
    Clear,
    Set(T),
}

impl<T> FieldEdit<T> {
    pub fn is_unchanged(&self) -> bool {
        matches!(self, FieldEdit::Unchanged)
    }

    pub fn is_set(&self) -> bool {
        matches!(self, FieldEdit::Set(_))
    }

    pub fn as_set(&self) -> Option<&T> {
        match self {
            FieldEdit::Set(value) => Some(value),
            _ => None,
        }
    }
}

impl<T> Default for FieldEdit<T> {
    fn default() -> Self {
        FieldEdit::Unchanged
    }
}

impl<T> From<Option<T>> for FieldEdit<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => FieldEdit::Set(value),
            None => FieldEdit::Clear,
        }
    }
}

impl<T: Serialize> Serialize for FieldEdit<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            // Unchanged relies on skip_serializing_if to stay out of the payload.
            FieldEdit::Unchanged | FieldEdit::Clear => serializer.serialize_none(),
            FieldEdit::Set(value) => serializer.serialize_some(value),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for FieldEdit<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // A missing key never reaches the deserializer; serde's `default`
        // supplies Unchanged for it.
        match Option::<T>::deserialize(deserializer)? {
            Some(value) => Ok(FieldEdit::Set(value)),
            None => Ok(FieldEdit::Clear),
        }
    }
}
