// src/models/lead.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

// --- ENUMS ---

// Mapeia o CREATE TYPE lead_status do banco.
// A grafia de cada variante é exatamente a usada pelo frontend (com espaços).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema,
)]
#[sqlx(type_name = "lead_status")]
pub enum LeadStatus {
    #[default]
    New,
    #[serde(rename = "Call not picked up")]
    #[sqlx(rename = "Call not picked up")]
    CallNotPickedUp,
    #[serde(rename = "Sent details on WhatsApp")]
    #[sqlx(rename = "Sent details on WhatsApp")]
    SentDetailsOnWhatsApp,
    #[serde(rename = "Follow up")]
    #[sqlx(rename = "Follow up")]
    FollowUp,
    #[serde(rename = "On going")]
    #[sqlx(rename = "On going")]
    OnGoing,
    #[serde(rename = "Fake lead")]
    #[sqlx(rename = "Fake lead")]
    FakeLead,
    Reject,
    Converted,
    #[serde(rename = "Not Interested")]
    #[sqlx(rename = "Not Interested")]
    NotInterested,
    Interested,
    #[serde(rename = "Demo Scheduled")]
    #[sqlx(rename = "Demo Scheduled")]
    DemoScheduled,
    Pending,
}

impl LeadStatus {
    pub const ALL: [LeadStatus; 12] = [
        LeadStatus::New,
        LeadStatus::CallNotPickedUp,
        LeadStatus::SentDetailsOnWhatsApp,
        LeadStatus::FollowUp,
        LeadStatus::OnGoing,
        LeadStatus::FakeLead,
        LeadStatus::Reject,
        LeadStatus::Converted,
        LeadStatus::NotInterested,
        LeadStatus::Interested,
        LeadStatus::DemoScheduled,
        LeadStatus::Pending,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LeadStatus::New => "New",
            LeadStatus::CallNotPickedUp => "Call not picked up",
            LeadStatus::SentDetailsOnWhatsApp => "Sent details on WhatsApp",
            LeadStatus::FollowUp => "Follow up",
            LeadStatus::OnGoing => "On going",
            LeadStatus::FakeLead => "Fake lead",
            LeadStatus::Reject => "Reject",
            LeadStatus::Converted => "Converted",
            LeadStatus::NotInterested => "Not Interested",
            LeadStatus::Interested => "Interested",
            LeadStatus::DemoScheduled => "Demo Scheduled",
            LeadStatus::Pending => "Pending",
        }
    }
}

impl std::fmt::Display for LeadStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// Mapeia o CREATE TYPE lead_stage do banco
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema,
)]
#[sqlx(type_name = "lead_stage")]
pub enum LeadStage {
    #[default]
    Cold,
    Warm,
    Hot,
    Closed,
}

impl LeadStage {
    /// Prioridade usada para ordenar a lista de ligações (maior primeiro).
    pub fn priority(&self) -> u8 {
        match self {
            LeadStage::Hot => 3,
            LeadStage::Warm => 2,
            LeadStage::Cold => 1,
            LeadStage::Closed => 0,
        }
    }
}

// --- LEAD (O registro) ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub id: Uuid,

    #[schema(example = "Cantina da Nonna")]
    pub restaurant_name: String,
    #[schema(example = "+55 (11) 98765-4321")]
    pub phone: String,
    #[schema(example = "São Paulo")]
    pub city: Option<String>,
    pub contact_person: Option<String>,
    pub notes: Option<String>,

    pub current_status: LeadStatus,
    pub lead_stage: LeadStage,

    #[schema(value_type = Option<String>, format = Date, example = "2026-10-19")]
    pub next_follow_up_date: Option<NaiveDate>,
    // Desnormalizado: sempre reflete o follow-up mais recente
    pub last_follow_up_date: Option<DateTime<Utc>>,

    // Snapshots antigos (schema v1) não tinham esse campo
    #[serde(default)]
    pub archived: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Lead {
    /// Monta um lead novo a partir do payload, aplicando os padrões
    /// (`New` / `Cold`) e gerando id e timestamps.
    pub fn from_new(new: NewLead, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            restaurant_name: new.restaurant_name.trim().to_string(),
            phone: new.phone.trim().to_string(),
            city: new.city,
            contact_person: new.contact_person,
            notes: new.notes,
            current_status: new.current_status.unwrap_or_default(),
            lead_stage: new.lead_stage.unwrap_or_default(),
            next_follow_up_date: new.next_follow_up_date,
            last_follow_up_date: None,
            archived: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Aplica uma edição parcial. Campos ausentes ficam como estão.
    pub fn apply_changes(&mut self, changes: LeadChanges, now: DateTime<Utc>) {
        if let Some(name) = changes.restaurant_name {
            self.restaurant_name = name.trim().to_string();
        }
        if let Some(phone) = changes.phone {
            self.phone = phone.trim().to_string();
        }
        if let Some(city) = changes.city {
            self.city = city;
        }
        if let Some(contact) = changes.contact_person {
            self.contact_person = contact;
        }
        if let Some(notes) = changes.notes {
            self.notes = notes;
        }
        if let Some(status) = changes.current_status {
            self.current_status = status;
        }
        if let Some(stage) = changes.lead_stage {
            self.lead_stage = stage;
        }
        if let Some(date) = changes.next_follow_up_date {
            self.next_follow_up_date = date;
        }
        if let Some(archived) = changes.archived {
            self.archived = archived;
        }
        self.updated_at = now;
    }

    /// O lead está vencido (hoje ou atrasado) e não foi arquivado?
    pub fn is_due_on(&self, today: NaiveDate) -> bool {
        !self.archived && self.next_follow_up_date.is_some_and(|date| date <= today)
    }
}

// ---
// Validação Customizada
// ---

// Pontuação aceita em nomes além de letras, dígitos e espaços
const NAME_PUNCTUATION: &[char] = &['&', '\'', '.', ',', '-', '_', '(', ')', '/', '#', '!', '@', ':', '+'];

pub(crate) fn validate_name_chars(value: &str) -> Result<(), ValidationError> {
    let ok = value
        .chars()
        .all(|c| c.is_alphanumeric() || c.is_whitespace() || NAME_PUNCTUATION.contains(&c));
    if !ok {
        let mut err = ValidationError::new("invalid_characters");
        err.message = Some("Contém caracteres não permitidos (ex.: '<' ou '>').".into());
        return Err(err);
    }
    Ok(())
}

fn validate_required_name(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("required");
        err.message = Some("O nome do restaurante é obrigatório.".into());
        return Err(err);
    }
    validate_name_chars(value)
}

pub(crate) fn validate_phone(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("required");
        err.message = Some("O telefone é obrigatório.".into());
        return Err(err);
    }
    let allowed = value
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | ' ' | '(' | ')'));
    if !allowed || !value.chars().any(|c| c.is_ascii_digit()) {
        let mut err = ValidationError::new("invalid_phone");
        err.message = Some("O telefone só pode conter dígitos, '+', '-', espaços e parênteses.".into());
        return Err(err);
    }
    Ok(())
}

const NOTES_MAX_CHARS: usize = 2000;

fn validate_notes(value: &str) -> Result<(), ValidationError> {
    if value.chars().count() > NOTES_MAX_CHARS {
        let mut err = ValidationError::new("length");
        err.message = Some("As notas devem ter no máximo 2000 caracteres.".into());
        return Err(err);
    }
    Ok(())
}

// --- PAYLOADS ---

// Dados para criação de um lead.
// Os campos obrigatórios usam `default` para que a ausência vire um erro
// de validação com o nome do campo, e não um erro de JSON genérico.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewLead {
    #[serde(default)]
    #[validate(custom(function = "validate_required_name"))]
    #[schema(example = "Cantina da Nonna")]
    pub restaurant_name: String,

    #[serde(default)]
    #[validate(custom(function = "validate_phone"))]
    #[schema(example = "+55 (11) 98765-4321")]
    pub phone: String,

    #[validate(custom(function = "validate_name_chars"))]
    pub city: Option<String>,

    #[validate(custom(function = "validate_name_chars"))]
    pub contact_person: Option<String>,

    #[validate(length(max = 2000, message = "As notas devem ter no máximo 2000 caracteres."))]
    pub notes: Option<String>,

    pub current_status: Option<LeadStatus>,
    pub lead_stage: Option<LeadStage>,

    #[schema(value_type = Option<String>, format = Date, example = "2026-10-20")]
    pub next_follow_up_date: Option<NaiveDate>,
}

// Edição parcial de um lead (PUT /api/leads/{id})
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeadChanges {
    #[validate(custom(function = "validate_required_name"))]
    pub restaurant_name: Option<String>,

    #[validate(custom(function = "validate_phone"))]
    pub phone: Option<String>,

    // Campos que aceitam `null` (limpar): validados em `check`
    #[serde(default, deserialize_with = "deserialize_present")]
    #[schema(value_type = Option<String>)]
    pub city: Option<Option<String>>,

    #[serde(default, deserialize_with = "deserialize_present")]
    #[schema(value_type = Option<String>)]
    pub contact_person: Option<Option<String>>,

    #[serde(default, deserialize_with = "deserialize_present")]
    #[schema(value_type = Option<String>)]
    pub notes: Option<Option<String>>,

    pub current_status: Option<LeadStatus>,
    pub lead_stage: Option<LeadStage>,

    // Ausente = não mexe; `null` = limpa a data
    #[serde(default, deserialize_with = "deserialize_present")]
    #[schema(value_type = Option<String>, format = Date, example = "2026-10-20")]
    pub next_follow_up_date: Option<Option<NaiveDate>>,

    pub archived: Option<bool>,
}

type FieldValidator = fn(&str) -> Result<(), ValidationError>;

impl LeadChanges {
    /// Validação completa da edição: o derive cobre nome e telefone, e os
    /// campos limpáveis (`Option<Option<_>>`) são checados aqui.
    pub fn check(&self) -> Result<(), ValidationErrors> {
        let mut errors = self.validate().err().unwrap_or_else(ValidationErrors::new);

        let clearable: [(&'static str, &Option<Option<String>>, FieldValidator); 3] = [
            ("city", &self.city, validate_name_chars),
            ("contact_person", &self.contact_person, validate_name_chars),
            ("notes", &self.notes, validate_notes),
        ];
        for (field, value, validate_fn) in clearable {
            if let Some(Some(value)) = value {
                if let Err(err) = validate_fn(value) {
                    errors.add(field, err);
                }
            }
        }

        if errors.field_errors().is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

// Distingue "campo ausente" (None) de "campo null" (Some(None))
fn deserialize_present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_lead() -> NewLead {
        NewLead {
            restaurant_name: "Joe's Café & Grill".to_string(),
            phone: "+1 (555) 010-2030".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_status_wire_spelling() {
        let json = serde_json::to_value(LeadStatus::CallNotPickedUp).unwrap();
        assert_eq!(json, json!("Call not picked up"));

        let parsed: LeadStatus = serde_json::from_value(json!("Sent details on WhatsApp")).unwrap();
        assert_eq!(parsed, LeadStatus::SentDetailsOnWhatsApp);

        for status in LeadStatus::ALL {
            assert_eq!(serde_json::to_value(status).unwrap(), json!(status.as_str()));
        }
    }

    #[test]
    fn test_unknown_status_is_rejected() {
        assert!(serde_json::from_value::<LeadStatus>(json!("Maybe later")).is_err());
    }

    #[test]
    fn test_stage_priority_order() {
        assert!(LeadStage::Hot.priority() > LeadStage::Warm.priority());
        assert!(LeadStage::Warm.priority() > LeadStage::Cold.priority());
        assert!(LeadStage::Cold.priority() > LeadStage::Closed.priority());
    }

    #[test]
    fn test_valid_lead_passes() {
        assert!(valid_lead().validate().is_ok());
    }

    #[test]
    fn test_name_with_angle_brackets_is_rejected() {
        let lead = NewLead {
            restaurant_name: "<script>alert(1)</script>".to_string(),
            ..valid_lead()
        };
        let errors = lead.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("restaurant_name"));
    }

    #[test]
    fn test_phone_with_letters_is_rejected() {
        let lead = NewLead {
            phone: "555-CALL-NOW".to_string(),
            ..valid_lead()
        };
        let errors = lead.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("phone"));
    }

    #[test]
    fn test_missing_required_fields_are_named() {
        let lead: NewLead = serde_json::from_value(json!({ "city": "Lisboa" })).unwrap();
        let errors = lead.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("restaurant_name"));
        assert!(fields.contains_key("phone"));
    }

    #[test]
    fn test_from_new_applies_defaults() {
        let now = Utc::now();
        let lead = Lead::from_new(valid_lead(), now);
        assert_eq!(lead.current_status, LeadStatus::New);
        assert_eq!(lead.lead_stage, LeadStage::Cold);
        assert!(!lead.archived);
        assert!(lead.last_follow_up_date.is_none());
        assert_eq!(lead.created_at, now);
        assert_eq!(lead.updated_at, now);
    }

    #[test]
    fn test_changes_distinguish_absent_from_null() {
        let absent: LeadChanges = serde_json::from_value(json!({ "city": "Porto" })).unwrap();
        assert_eq!(absent.next_follow_up_date, None);

        let cleared: LeadChanges =
            serde_json::from_value(json!({ "nextFollowUpDate": null })).unwrap();
        assert_eq!(cleared.next_follow_up_date, Some(None));

        let set: LeadChanges =
            serde_json::from_value(json!({ "nextFollowUpDate": "2026-11-01" })).unwrap();
        assert_eq!(
            set.next_follow_up_date,
            Some(NaiveDate::from_ymd_opt(2026, 11, 1))
        );
    }

    #[test]
    fn test_changes_can_clear_text_fields() {
        let cleared: LeadChanges = serde_json::from_value(json!({ "city": null })).unwrap();
        assert_eq!(cleared.city, Some(None));
        assert_eq!(cleared.notes, None);

        let mut lead = Lead::from_new(
            NewLead {
                city: Some("Recife".to_string()),
                notes: Some("Ligar cedo".to_string()),
                ..valid_lead()
            },
            Utc::now(),
        );
        lead.apply_changes(cleared, Utc::now());
        assert_eq!(lead.city, None);
        assert_eq!(lead.notes.as_deref(), Some("Ligar cedo"));
    }

    #[test]
    fn test_check_validates_clearable_fields() {
        let changes: LeadChanges = serde_json::from_value(json!({
            "city": "<b>Recife</b>",
            "notes": "x".repeat(2001),
            "contactPerson": null,
            "phone": "sem número"
        }))
        .unwrap();
        let errors = changes.check().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("city"));
        assert!(fields.contains_key("notes"));
        assert!(fields.contains_key("phone"));
        assert!(!fields.contains_key("contact_person"));

        let ok: LeadChanges = serde_json::from_value(json!({ "city": null, "notes": "ok" })).unwrap();
        assert!(ok.check().is_ok());
    }

    #[test]
    fn test_apply_changes_keeps_omitted_fields() {
        let created = Utc::now();
        let mut lead = Lead::from_new(
            NewLead {
                city: Some("Recife".to_string()),
                next_follow_up_date: NaiveDate::from_ymd_opt(2026, 10, 19),
                ..valid_lead()
            },
            created,
        );
        let later = created + chrono::Duration::minutes(5);
        lead.apply_changes(
            LeadChanges {
                lead_stage: Some(LeadStage::Hot),
                next_follow_up_date: Some(None),
                ..Default::default()
            },
            later,
        );

        assert_eq!(lead.lead_stage, LeadStage::Hot);
        assert_eq!(lead.city.as_deref(), Some("Recife"));
        assert_eq!(lead.next_follow_up_date, None);
        assert_eq!(lead.updated_at, later);
        assert_eq!(lead.created_at, created);
    }

    #[test]
    fn test_is_due_on() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        let mut lead = Lead::from_new(valid_lead(), Utc::now());
        assert!(!lead.is_due_on(today));

        lead.next_follow_up_date = today.pred_opt();
        assert!(lead.is_due_on(today));

        lead.next_follow_up_date = today.succ_opt();
        assert!(!lead.is_due_on(today));

        lead.next_follow_up_date = Some(today);
        lead.archived = true;
        assert!(!lead.is_due_on(today));
    }
}
