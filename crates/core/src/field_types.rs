//! Template field types, name-based type inference, and helpers for
//! select options, labels and preview sample data.
//!
//! Inference is a keyword heuristic on the field name. The keyword lists
//! include the French vocabulary the first template libraries were written
//! in (`montant`, `prix`, `nom`, ...), so they are kept as-is.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Field type
// ---------------------------------------------------------------------------

/// The declared input type of a template field.
///
/// Values stored for a field are free text regardless of the type; the type
/// only drives how a client renders the input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    #[default]
    Text,
    Textarea,
    Number,
    Date,
    Email,
    Url,
    Select,
}

/// Every valid wire value, in declaration order.
pub const VALID_FIELD_TYPES: &[&str] = &[
    "text", "textarea", "number", "date", "email", "url", "select",
];

impl FieldType {
    /// The lowercase string stored in the database.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Textarea => "textarea",
            Self::Number => "number",
            Self::Date => "date",
            Self::Email => "email",
            Self::Url => "url",
            Self::Select => "select",
        }
    }

    pub fn parse(s: &str) -> Result<Self, String> {
        match s {
            "text" => Ok(Self::Text),
            "textarea" => Ok(Self::Textarea),
            "number" => Ok(Self::Number),
            "date" => Ok(Self::Date),
            "email" => Ok(Self::Email),
            "url" => Ok(Self::Url),
            "select" => Ok(Self::Select),
            _ => Err(format!(
                "Invalid field_type '{s}'. Must be one of: {}",
                VALID_FIELD_TYPES.join(", ")
            )),
        }
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Inference
// ---------------------------------------------------------------------------

const TEXTAREA_KEYWORDS: &[&str] = &["description", "commentaire"];
const NUMBER_KEYWORDS: &[&str] = &["montant", "prix", "salaire"];

/// Field names that are marked required when auto-created.
pub const DEFAULT_REQUIRED_FIELDS: &[&str] = &[
    "nom_client",
    "nom_entreprise",
    "email",
    "date_debut",
    "montant_total",
];

/// Guess a field type from its name. First matching rule wins.
pub fn infer_field_type(field_name: &str) -> FieldType {
    let lower = field_name.to_lowercase();
    if lower.contains("email") {
        FieldType::Email
    } else if lower.contains("date") {
        FieldType::Date
    } else if TEXTAREA_KEYWORDS.iter().any(|k| lower.contains(k)) {
        FieldType::Textarea
    } else if NUMBER_KEYWORDS.iter().any(|k| lower.contains(k)) {
        FieldType::Number
    } else {
        FieldType::Text
    }
}

/// Whether an auto-created field with this name starts out required.
pub fn is_required_by_default(field_name: &str) -> bool {
    let lower = field_name.to_lowercase();
    DEFAULT_REQUIRED_FIELDS.contains(&lower.as_str())
}

/// Turn `nom_client` into `Nom Client`.
pub fn humanize_label(field_name: &str) -> String {
    field_name
        .split('_')
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

// ---------------------------------------------------------------------------
// Select options
// ---------------------------------------------------------------------------

/// Parse stored select options.
///
/// A JSON array of strings is accepted as-is; anything else is split on
/// newlines with blank lines dropped.
pub fn parse_options(raw: Option<&str>) -> Vec<String> {
    let Some(raw) = raw else {
        return Vec::new();
    };
    if let Ok(list) = serde_json::from_str::<Vec<String>>(raw) {
        return list;
    }
    raw.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

// ---------------------------------------------------------------------------
// Preview sample data
// ---------------------------------------------------------------------------

/// Example value used when previewing a template without real data.
pub fn sample_value(field_name: &str, today: NaiveDate) -> String {
    let lower = field_name.to_lowercase();
    let today_str = today.format("%d/%m/%Y").to_string();

    if lower.contains("email") {
        "contact@example.com".to_string()
    } else if lower.contains("date") {
        today_str
    } else if lower.contains("nom") && lower.contains("client") {
        "Jean Dupont".to_string()
    } else if lower.contains("nom") && lower.contains("entreprise") {
        "ACME Corporation".to_string()
    } else if lower.contains("adresse") {
        "123 Rue de la Paix, 75001 Paris".to_string()
    } else if lower.contains("telephone") || lower.contains("tel") {
        "01 23 45 67 89".to_string()
    } else if lower.contains("montant") || lower.contains("prix") {
        "1 250,00 €".to_string()
    } else if lower.contains("numero") || lower.contains("ref") {
        "REF-2024-001".to_string()
    } else if lower.contains("ville") {
        "Paris".to_string()
    } else {
        match field_name {
            "salaire" => "3 500 €".to_string(),
            "poste" => "Développeur Full-Stack".to_string(),
            _ => format!("[Example for {}]", field_name.replace('_', " ")),
        }
    }
}
