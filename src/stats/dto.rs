use serde::{Deserialize, Deserializer};

use super::repo_types::{NewUserStat, UserStatChanges};
use crate::error::{ApiError, FieldErrors};

const UNIT_MAX: usize = 50;
const NOTE_MAX: usize = 100;

/// Stats bodies arrive nested under `user_stats_dict`.
#[derive(Debug, Deserialize)]
pub struct StatsEnvelope<T> {
    #[serde(alias = "user_stat_dict")]
    pub user_stats_dict: T,
}

#[derive(Debug, Deserialize)]
pub struct CreateStatBody {
    #[serde(default)]
    pub user_id: Option<i64>,
    pub value: i32,
    pub unit: String,
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StatKeyBody {
    pub id: i64,
    #[serde(default)]
    pub user_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatBody {
    pub id: i64,
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub value: Option<i32>,
    #[serde(default)]
    pub unit: Option<String>,
    /// Absent keeps the stored note; `null` clears it.
    #[serde(default, deserialize_with = "present")]
    pub note: Option<Option<String>>,
}

fn present<'de, D>(de: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(de).map(Some)
}

fn check_unit(errors: &mut FieldErrors, unit: &str) {
    let len = unit.trim().chars().count();
    if len == 0 || len > UNIT_MAX {
        errors.add("unit", format!("Length must be between 1 and {UNIT_MAX} characters"));
    }
}

fn check_note(errors: &mut FieldErrors, note: Option<&str>) {
    if note.is_some_and(|n| n.chars().count() > NOTE_MAX) {
        errors.add("note", format!("Must be at most {NOTE_MAX} characters"));
    }
}

impl CreateStatBody {
    pub fn validate(self) -> Result<NewUserStat, ApiError> {
        let mut errors = FieldErrors::default();
        check_unit(&mut errors, &self.unit);
        check_note(&mut errors, self.note.as_deref());
        errors.into_result()?;
        Ok(NewUserStat {
            value: self.value,
            unit: self.unit.trim().to_string(),
            note: self.note,
        })
    }
}

impl UpdateStatBody {
    pub fn validate(self) -> Result<UserStatChanges, ApiError> {
        let mut errors = FieldErrors::default();
        if let Some(unit) = &self.unit {
            check_unit(&mut errors, unit);
        }
        check_note(&mut errors, self.note.as_ref().and_then(|n| n.as_deref()));
        errors.into_result()?;
        Ok(UserStatChanges {
            value: self.value,
            unit: self.unit.map(|u| u.trim().to_string()),
            note: self.note,
        })
    }
}
