// ============================================================================
// Attendance Core - Record Service
// File: crates/attendance-core/src/services/record_service.rs
// ============================================================================
//! Daily check-in/check-out records, manual and card driven

use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use attendance_shared::utils::normalize_card_id;

use crate::domain::record::truncate_to_minute;
use crate::domain::{Actor, Member, Record, RecordPatch, RecordType, RecordView};
use crate::error::DomainError;
use crate::repositories::{MemberRepository, RecordFilter, RecordRepository, TableRepository};

use super::clock::Clock;
use super::table_service::load_table;

#[derive(Debug, Clone, Default)]
pub struct RecordQuery {
    pub table_id: Option<Uuid>,
    pub member_id: Option<Uuid>,
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Clone)]
pub struct ManualRecord {
    pub table_id: Uuid,
    pub member_id: Uuid,
    pub record_type: RecordType,
    pub date: NaiveDate,
    pub time: NaiveTime,
}

#[derive(Debug, Clone)]
pub struct CardCheckin {
    pub card_id: String,
    pub table_id: Uuid,
    pub record_type: RecordType,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CardCheckinResult {
    pub member_name: String,
    pub member_employee_id: String,
    #[serde(with = "date_format")]
    pub date: NaiveDate,
    #[serde(with = "time_format")]
    pub time: NaiveTime,
    pub record_type: RecordType,
    #[serde(skip)]
    pub record: Option<Record>,
}

pub struct RecordService {
    record_repo: Arc<dyn RecordRepository>,
    member_repo: Arc<dyn MemberRepository>,
    table_repo: Arc<dyn TableRepository>,
    clock: Arc<dyn Clock>,
}

impl RecordService {
    pub fn new(
        record_repo: Arc<dyn RecordRepository>,
        member_repo: Arc<dyn MemberRepository>,
        table_repo: Arc<dyn TableRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            record_repo,
            member_repo,
            table_repo,
            clock,
        }
    }

    pub async fn list(&self, actor: &Actor, query: RecordQuery) -> Result<Vec<RecordView>, DomainError> {
        if let Some(table_id) = query.table_id {
            load_table(self.table_repo.as_ref(), actor, &table_id).await?;
        }
        self.record_repo
            .list(&RecordFilter {
                table_id: query.table_id,
                member_id: query.member_id,
                date: query.date,
                user_group: actor.group_scope().map(str::to_string),
            })
            .await
    }

    /// Set the check-in or check-out of a member's day, creating the
    /// record when the day has none yet.
    pub async fn upsert(&self, actor: &Actor, input: ManualRecord) -> Result<Record, DomainError> {
        load_table(self.table_repo.as_ref(), actor, &input.table_id).await?;
        self.member_of_table(&input.member_id, &input.table_id).await?;

        let time = truncate_to_minute(input.time);
        let record = self
            .stamp(input.table_id, input.member_id, input.record_type, input.date, time)
            .await?;
        info!(
            "Manual {} for member {} on {}",
            input.record_type.as_str(),
            input.member_id,
            input.date
        );
        Ok(record)
    }

    pub async fn update(
        &self,
        actor: &Actor,
        id: &Uuid,
        patch: RecordPatch,
    ) -> Result<Record, DomainError> {
        let mut record = self.load_record(actor, id).await?;
        patch.apply_to(&mut record)?;
        self.record_repo.update(&record).await
    }

    pub async fn delete(&self, actor: &Actor, id: &Uuid) -> Result<(), DomainError> {
        self.load_record(actor, id).await?;
        self.record_repo.delete(id).await?;
        info!("Record {} deleted", id);
        Ok(())
    }

    /// Stamp the current local date and minute for the member holding the
    /// card. A check-out needs today's record to exist.
    pub async fn card_checkin(
        &self,
        actor: &Actor,
        input: CardCheckin,
    ) -> Result<CardCheckinResult, DomainError> {
        let card_id = normalize_card_id(&input.card_id)
            .ok_or_else(|| DomainError::ValidationError("Card id is required".to_string()))?;
        let member = self
            .member_repo
            .find_by_card(&card_id)
            .await?
            .ok_or_else(|| {
                warn!("Card {} is not bound to any member", card_id);
                DomainError::CardNotBound(card_id.clone())
            })?;
        load_table(self.table_repo.as_ref(), actor, &input.table_id).await?;
        if member.table_id != input.table_id {
            warn!("Card {} belongs to another table", card_id);
            return Err(DomainError::MemberNotInTable);
        }

        let now = self.clock.now();
        let date = now.date();
        let time = truncate_to_minute(now.time());

        let record = match input.record_type {
            RecordType::CheckIn => {
                self.stamp(member.table_id, member.id, RecordType::CheckIn, date, time)
                    .await?
            }
            RecordType::CheckOut => {
                let mut record = self
                    .record_repo
                    .find_for_day(&member.table_id, &member.id, date)
                    .await?
                    .filter(|record| record.checkin_date == Some(date))
                    .ok_or(DomainError::CheckinRequired)?;
                record.apply(RecordType::CheckOut, date, time);
                self.record_repo.update(&record).await?
            }
        };

        info!(
            "Card {} for {} ({}) at {} {}",
            input.record_type.as_str(),
            member.name,
            member.employee_id,
            date,
            time
        );
        Ok(CardCheckinResult {
            member_name: member.name,
            member_employee_id: member.employee_id,
            date,
            time,
            record_type: input.record_type,
            record: Some(record),
        })
    }

    async fn stamp(
        &self,
        table_id: Uuid,
        member_id: Uuid,
        record_type: RecordType,
        date: NaiveDate,
        time: NaiveTime,
    ) -> Result<Record, DomainError> {
        match self.record_repo.find_for_day(&table_id, &member_id, date).await? {
            Some(mut record) => {
                record.apply(record_type, date, time);
                self.record_repo.update(&record).await
            }
            None => {
                let record = Record::new(table_id, member_id, record_type, date, time);
                self.record_repo.create(&record).await
            }
        }
    }

    async fn member_of_table(&self, member_id: &Uuid, table_id: &Uuid) -> Result<Member, DomainError> {
        let member = self
            .member_repo
            .find_by_id(member_id)
            .await?
            .ok_or(DomainError::MemberNotFound)?;
        if member.table_id != *table_id {
            return Err(DomainError::MemberNotInTable);
        }
        Ok(member)
    }

    async fn load_record(&self, actor: &Actor, id: &Uuid) -> Result<Record, DomainError> {
        let record = self
            .record_repo
            .find_by_id(id)
            .await?
            .ok_or(DomainError::RecordNotFound)?;
        match load_table(self.table_repo.as_ref(), actor, &record.table_id).await {
            Ok(_) => Ok(record),
            Err(DomainError::TableNotFound) => Err(DomainError::RecordNotFound),
            Err(e) => Err(e),
        }
    }
}

mod date_format {
    use chrono::NaiveDate;
    use serde::Serializer;

    pub fn serialize<S: Serializer>(date: &NaiveDate, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&crate::domain::record::format_date(*date))
    }
}

mod time_format {
    use chrono::NaiveTime;
    use serde::Serializer;

    pub fn serialize<S: Serializer>(time: &NaiveTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&crate::domain::record::format_time(*time))
    }
}
