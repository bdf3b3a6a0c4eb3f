use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Patient {
    pub id: Uuid,
    pub name: String,
    /// National identity document, when the clinic records one.
    pub national_id: Option<String>,
    pub birth_date: jiff::civil::Date,
    pub notes: String,
    pub created_at: jiff::Timestamp,
}

impl Patient {
    pub fn new(name: impl Into<String>, birth_date: jiff::civil::Date) -> Self {
        Patient {
            id: Uuid::new_v4(),
            name: name.into(),
            national_id: None,
            birth_date,
            notes: String::new(),
            created_at: jiff::Timestamp::now(),
        }
    }

    pub fn with_national_id(mut self, national_id: impl Into<String>) -> Self {
        self.national_id = Some(national_id.into());
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }
}
