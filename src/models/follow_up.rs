// src/models/follow_up.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::lead::{Lead, LeadStage, LeadStatus};

// Um follow-up é só de inserção: não existe edição nem remoção individual.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FollowUp {
    pub id: Uuid,
    pub lead_id: Uuid,
    pub follow_up_date: DateTime<Utc>,
    pub status: LeadStatus,
    pub notes: Option<String>,
    #[schema(value_type = Option<String>, format = Date, example = "2026-10-22")]
    pub next_follow_up_date: Option<NaiveDate>,
    pub lead_stage: Option<LeadStage>,
    pub created_at: DateTime<Utc>,
}

impl FollowUp {
    pub fn from_new(new: NewFollowUp, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            lead_id: new.lead_id,
            follow_up_date: new.follow_up_date.unwrap_or(now),
            status: new.status,
            notes: new.notes,
            next_follow_up_date: new.next_follow_up_date,
            lead_stage: new.lead_stage,
            created_at: now,
        }
    }

    /// Propaga o follow-up para o lead (a "cascata").
    /// Status e data do último contato sempre; próxima data e estágio só se vierem.
    pub fn cascade_into(&self, lead: &mut Lead, now: DateTime<Utc>) {
        lead.current_status = self.status;
        lead.last_follow_up_date = Some(self.follow_up_date);
        if let Some(date) = self.next_follow_up_date {
            lead.next_follow_up_date = Some(date);
        }
        if let Some(stage) = self.lead_stage {
            lead.lead_stage = stage;
        }
        lead.updated_at = now;
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewFollowUp {
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub lead_id: Uuid,

    // Padrão: momento da inserção
    pub follow_up_date: Option<DateTime<Utc>>,

    #[schema(example = "Call not picked up")]
    pub status: LeadStatus,

    #[validate(length(max = 2000, message = "As notas devem ter no máximo 2000 caracteres."))]
    pub notes: Option<String>,

    #[schema(value_type = Option<String>, format = Date, example = "2026-10-22")]
    pub next_follow_up_date: Option<NaiveDate>,

    pub lead_stage: Option<LeadStage>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::lead::NewLead;
    use serde_json::json;

    fn lead() -> Lead {
        Lead::from_new(
            NewLead {
                restaurant_name: "Tasca do Zé".to_string(),
                phone: "912 345 678".to_string(),
                lead_stage: Some(LeadStage::Warm),
                next_follow_up_date: NaiveDate::from_ymd_opt(2026, 10, 1),
                ..Default::default()
            },
            Utc::now(),
        )
    }

    #[test]
    fn test_cascade_sets_status_and_dates() {
        let mut lead = lead();
        let next = NaiveDate::from_ymd_opt(2026, 10, 25).unwrap();
        let now = Utc::now();
        let follow_up = FollowUp::from_new(
            NewFollowUp {
                lead_id: lead.id,
                follow_up_date: None,
                status: LeadStatus::Interested,
                notes: Some("Pediu o cardápio".to_string()),
                next_follow_up_date: Some(next),
                lead_stage: None,
            },
            now,
        );

        follow_up.cascade_into(&mut lead, now);

        assert_eq!(lead.current_status, LeadStatus::Interested);
        assert_eq!(lead.next_follow_up_date, Some(next));
        assert_eq!(lead.last_follow_up_date, Some(now));
        // Estágio não veio no follow-up: continua o mesmo
        assert_eq!(lead.lead_stage, LeadStage::Warm);
    }

    #[test]
    fn test_cascade_without_next_date_keeps_existing_one() {
        let mut lead = lead();
        let previous = lead.next_follow_up_date;
        let now = Utc::now();
        let follow_up = FollowUp::from_new(
            NewFollowUp {
                lead_id: lead.id,
                follow_up_date: None,
                status: LeadStatus::Converted,
                notes: None,
                next_follow_up_date: None,
                lead_stage: Some(LeadStage::Closed),
            },
            now,
        );

        follow_up.cascade_into(&mut lead, now);

        assert_eq!(lead.next_follow_up_date, previous);
        assert_eq!(lead.lead_stage, LeadStage::Closed);
        assert_eq!(lead.current_status, LeadStatus::Converted);
    }

    #[test]
    fn test_payload_uses_camel_case() {
        let payload: NewFollowUp = serde_json::from_value(json!({
            "leadId": "550e8400-e29b-41d4-a716-446655440000",
            "status": "Demo Scheduled",
            "nextFollowUpDate": "2026-10-30",
            "leadStage": "Hot"
        }))
        .unwrap();
        assert_eq!(payload.status, LeadStatus::DemoScheduled);
        assert_eq!(payload.lead_stage, Some(LeadStage::Hot));
        assert!(payload.follow_up_date.is_none());
    }
}
