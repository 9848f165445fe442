// src/services/follow_up_service.rs

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    db::LeadStore,
    models::follow_up::{FollowUp, NewFollowUp},
};

#[derive(Clone)]
pub struct FollowUpService {
    store: Arc<dyn LeadStore>,
}

impl FollowUpService {
    pub fn new(store: Arc<dyn LeadStore>) -> Self {
        Self { store }
    }

    /// Registra o contato e propaga status/datas/estágio para o lead.
    /// Tudo numa unidade de trabalho do store: ou as duas escritas entram, ou nenhuma.
    pub async fn record_follow_up(&self, new_follow_up: NewFollowUp) -> Result<FollowUp, AppError> {
        new_follow_up.validate()?;

        let now = Utc::now();
        let follow_up = FollowUp::from_new(new_follow_up, now);

        let (recorded, lead) = self.store.record_follow_up(&follow_up, now).await?;

        tracing::info!(
            lead_id = %lead.id,
            follow_up_id = %recorded.id,
            status = %lead.current_status,
            "Follow-up registrado"
        );

        Ok(recorded)
    }

    pub async fn list_for_lead(&self, lead_id: Uuid) -> Result<Vec<FollowUp>, AppError> {
        // Lead inexistente é 404, não lista vazia
        if self.store.find_lead(lead_id).await?.is_none() {
            return Err(AppError::LeadNotFound(lead_id));
        }
        self.store.list_follow_ups(lead_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::LocalLeadStore;
    use crate::models::lead::{Lead, LeadStage, LeadStatus, NewLead};
    use chrono::{Duration, NaiveDate};

    async fn setup() -> (Arc<LocalLeadStore>, FollowUpService, Lead) {
        let store = Arc::new(LocalLeadStore::in_memory());
        let lead = Lead::from_new(
            NewLead {
                restaurant_name: "Boteco 7".to_string(),
                phone: "21 99999-0000".to_string(),
                ..Default::default()
            },
            Utc::now(),
        );
        store.insert_lead(&lead).await.unwrap();
        let service = FollowUpService::new(store.clone());
        (store, service, lead)
    }

    fn payload(lead_id: Uuid, status: LeadStatus) -> NewFollowUp {
        NewFollowUp {
            lead_id,
            follow_up_date: None,
            status,
            notes: None,
            next_follow_up_date: None,
            lead_stage: None,
        }
    }

    #[tokio::test]
    async fn test_follow_up_cascades_into_lead() {
        let (store, service, lead) = setup().await;
        let next = NaiveDate::from_ymd_opt(2026, 10, 23).unwrap();

        let recorded = service
            .record_follow_up(NewFollowUp {
                next_follow_up_date: Some(next),
                lead_stage: Some(LeadStage::Warm),
                ..payload(lead.id, LeadStatus::SentDetailsOnWhatsApp)
            })
            .await
            .unwrap();

        let updated = store.find_lead(lead.id).await.unwrap().unwrap();
        assert_eq!(updated.current_status, LeadStatus::SentDetailsOnWhatsApp);
        assert_eq!(updated.next_follow_up_date, Some(next));
        assert_eq!(updated.lead_stage, LeadStage::Warm);
        assert_eq!(updated.last_follow_up_date, Some(recorded.follow_up_date));
    }

    #[tokio::test]
    async fn test_latest_follow_up_wins() {
        let (store, service, lead) = setup().await;
        service
            .record_follow_up(payload(lead.id, LeadStatus::CallNotPickedUp))
            .await
            .unwrap();
        let last = service
            .record_follow_up(payload(lead.id, LeadStatus::DemoScheduled))
            .await
            .unwrap();

        let updated = store.find_lead(lead.id).await.unwrap().unwrap();
        assert_eq!(updated.current_status, LeadStatus::DemoScheduled);
        assert_eq!(updated.last_follow_up_date, Some(last.follow_up_date));
    }

    #[tokio::test]
    async fn test_unknown_lead_is_not_found_and_nothing_written() {
        let (_store, service, _lead) = setup().await;
        let ghost = Uuid::new_v4();

        let err = service
            .record_follow_up(payload(ghost, LeadStatus::Pending))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::LeadNotFound(_)));
        assert!(matches!(
            service.list_for_lead(ghost).await,
            Err(AppError::LeadNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_list_is_newest_first() {
        let (_store, service, lead) = setup().await;
        let base = Utc::now();
        for (offset, status) in [(2, LeadStatus::FollowUp), (0, LeadStatus::New), (1, LeadStatus::OnGoing)] {
            service
                .record_follow_up(NewFollowUp {
                    follow_up_date: Some(base - Duration::days(offset)),
                    ..payload(lead.id, status)
                })
                .await
                .unwrap();
        }

        let statuses: Vec<LeadStatus> = service
            .list_for_lead(lead.id)
            .await
            .unwrap()
            .into_iter()
            .map(|f| f.status)
            .collect();
        assert_eq!(
            statuses,
            vec![LeadStatus::New, LeadStatus::OnGoing, LeadStatus::FollowUp]
        );
    }

    #[tokio::test]
    async fn test_long_notes_are_rejected() {
        let (_store, service, lead) = setup().await;
        let result = service
            .record_follow_up(NewFollowUp {
                notes: Some("x".repeat(2001)),
                ..payload(lead.id, LeadStatus::Pending)
            })
            .await;
        assert!(matches!(result, Err(AppError::ValidationError(_))));
        assert!(service.list_for_lead(lead.id).await.unwrap().is_empty());
    }
}
