use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDateTime, Utc};

pub const NAME_MAX_LEN: usize = 100;
pub const DESCRIPTION_MAX_LEN: usize = 1000;

/// Editable fields of the plan form
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Name,
    Description,
    Date,
}

impl Field {
    pub const ALL: [Field; 3] = [Field::Name, Field::Description, Field::Date];
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Field::Name => "name",
            Field::Description => "description",
            Field::Date => "date",
        };
        write!(f, "{}", name)
    }
}

/// Field values as typed into the form
#[derive(Debug, Clone, PartialEq)]
pub struct FormValues {
    pub name: String,
    pub description: String,
    /// `None` when the date is missing or could not be parsed
    pub date: Option<DateTime<Utc>>,
}

/// Field-scoped validation messages
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<Field, String>);

impl FieldErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.0.get(&field).map(|s| s.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.0.iter().map(|(f, m)| (*f, m.as_str()))
    }

    fn insert(&mut self, field: Field, message: String) {
        self.0.insert(field, message);
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self.iter().map(|(field, msg)| format!("{}: {}", field, msg)).collect();
        write!(f, "{}", parts.join("; "))
    }
}

/// Validate the plan form. Lengths are counted in characters.
pub fn validate(values: &FormValues) -> FieldErrors {
    let mut errors = FieldErrors::default();

    if values.name.trim().is_empty() {
        errors.insert(Field::Name, "Name is required".to_string());
    } else if values.name.chars().count() > NAME_MAX_LEN {
        errors.insert(
            Field::Name,
            format!("Name must be at most {} characters", NAME_MAX_LEN),
        );
    }

    if values.description.chars().count() > DESCRIPTION_MAX_LEN {
        errors.insert(
            Field::Description,
            format!("Description must be at most {} characters", DESCRIPTION_MAX_LEN),
        );
    }

    if values.date.is_none() {
        errors.insert(Field::Date, "A valid date is required".to_string());
    }

    errors
}

/// Parse RFC 3339, or a naive `YYYY-MM-DDTHH:MM[:SS]` taken as UTC
pub fn parse_date(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }

    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .map(|naive| naive.and_utc())
}
