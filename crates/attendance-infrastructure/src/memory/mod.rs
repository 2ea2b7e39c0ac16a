// ============================================================================
// Attendance Infrastructure - In-Memory Store
// File: crates/attendance-infrastructure/src/memory/mod.rs
// Description: Every repository port over process memory. Enforces the same
//              uniqueness rules and cascades as the PostgreSQL schema.
// ============================================================================

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::RwLock;
use uuid::Uuid;

use attendance_core::domain::{
    AttendanceTable, Member, Record, RecordView, TableSummary, User,
};
use attendance_core::error::DomainError;
use attendance_core::repositories::{
    MemberFilter, MemberRepository, RecordFilter, RecordRepository, SettingsRepository,
    StoreHealth, TableRepository, UserRepository,
};

#[derive(Default)]
struct Data {
    users: Vec<User>,
    tables: Vec<AttendanceTable>,
    members: Vec<Member>,
    records: Vec<Record>,
    settings: HashMap<(String, String), String>,
}

impl Data {
    fn table_group(&self, table_id: &Uuid) -> Option<&str> {
        self.tables
            .iter()
            .find(|t| t.id == *table_id)
            .map(|t| t.user_group.as_str())
    }

    fn in_group(&self, table_id: &Uuid, user_group: Option<&str>) -> bool {
        match user_group {
            None => true,
            Some(group) => self.table_group(table_id) == Some(group),
        }
    }

    fn summary(&self, table: &AttendanceTable) -> TableSummary {
        TableSummary {
            table: table.clone(),
            member_count: self.members.iter().filter(|m| m.table_id == table.id).count() as i64,
        }
    }

    fn check_user(&self, user: &User) -> Result<(), DomainError> {
        if self
            .users
            .iter()
            .any(|u| u.id != user.id && u.username == user.username)
        {
            return Err(DomainError::UsernameAlreadyExists(user.username.clone()));
        }
        if user.is_super_admin && self.users.iter().any(|u| u.id != user.id && u.is_super_admin) {
            return Err(DomainError::SetupAlreadyCompleted);
        }
        Ok(())
    }

    fn check_member(&self, member: &Member) -> Result<(), DomainError> {
        for other in self.members.iter().filter(|m| m.id != member.id) {
            if other.table_id == member.table_id && other.employee_id == member.employee_id {
                return Err(DomainError::EmployeeIdAlreadyExists(member.employee_id.clone()));
            }
            if member.card_id.is_some() && other.card_id == member.card_id {
                return Err(DomainError::CardAlreadyBound(
                    member.card_id.clone().unwrap_or_default(),
                ));
            }
        }
        Ok(())
    }

    fn check_record(&self, record: &Record) -> Result<(), DomainError> {
        let day = record.record_date().ok_or_else(|| {
            DomainError::ValidationError("A record needs a check-in or check-out date".to_string())
        })?;
        if self.records.iter().any(|r| {
            r.id != record.id
                && r.table_id == record.table_id
                && r.member_id == record.member_id
                && r.record_date() == Some(day)
        }) {
            return Err(DomainError::RecordAlreadyExists);
        }
        Ok(())
    }

    fn remove_members(&mut self, ids: &[Uuid]) -> u64 {
        let before = self.members.len();
        self.members.retain(|m| !ids.contains(&m.id));
        self.records.retain(|r| !ids.contains(&r.member_id));
        (before - self.members.len()) as u64
    }
}

/// Shared in-memory backing for all repositories
#[derive(Default)]
pub struct MemoryStore {
    data: RwLock<Data>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn count(&self) -> Result<i64, DomainError> {
        Ok(self.data.read().await.users.len() as i64)
    }

    async fn find_by_id(&self, id: &Uuid) -> Result<Option<User>, DomainError> {
        Ok(self.data.read().await.users.iter().find(|u| u.id == *id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DomainError> {
        Ok(self
            .data
            .read()
            .await
            .users
            .iter()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn list(&self) -> Result<Vec<User>, DomainError> {
        let mut users = self.data.read().await.users.clone();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(users)
    }

    async fn create(&self, user: &User) -> Result<User, DomainError> {
        let mut data = self.data.write().await;
        data.check_user(user)?;
        data.users.push(user.clone());
        Ok(user.clone())
    }

    async fn update(&self, user: &User) -> Result<User, DomainError> {
        let mut data = self.data.write().await;
        data.check_user(user)?;
        let slot = data
            .users
            .iter_mut()
            .find(|u| u.id == user.id)
            .ok_or(DomainError::UserNotFound)?;
        *slot = user.clone();
        Ok(user.clone())
    }

    async fn delete(&self, id: &Uuid) -> Result<bool, DomainError> {
        let mut data = self.data.write().await;
        let before = data.users.len();
        data.users.retain(|u| u.id != *id);
        Ok(data.users.len() < before)
    }

    async fn delete_many(&self, ids: &[Uuid]) -> Result<u64, DomainError> {
        let mut data = self.data.write().await;
        let before = data.users.len();
        data.users.retain(|u| u.is_super_admin || !ids.contains(&u.id));
        Ok((before - data.users.len()) as u64)
    }

    async fn delete_all(&self) -> Result<u64, DomainError> {
        let mut data = self.data.write().await;
        let count = data.users.len() as u64;
        data.users.clear();
        Ok(count)
    }
}

#[async_trait]
impl TableRepository for MemoryStore {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<AttendanceTable>, DomainError> {
        Ok(self.data.read().await.tables.iter().find(|t| t.id == *id).cloned())
    }

    async fn find_summary(&self, id: &Uuid) -> Result<Option<TableSummary>, DomainError> {
        let data = self.data.read().await;
        Ok(data.tables.iter().find(|t| t.id == *id).map(|t| data.summary(t)))
    }

    async fn list(&self, user_group: Option<String>) -> Result<Vec<TableSummary>, DomainError> {
        let data = self.data.read().await;
        let mut tables: Vec<TableSummary> = data
            .tables
            .iter()
            .filter(|t| user_group.as_deref().map_or(true, |g| t.user_group == g))
            .map(|t| data.summary(t))
            .collect();
        tables.sort_by(|a, b| b.table.created_at.cmp(&a.table.created_at));
        Ok(tables)
    }

    async fn create(&self, table: &AttendanceTable) -> Result<AttendanceTable, DomainError> {
        self.data.write().await.tables.push(table.clone());
        Ok(table.clone())
    }

    async fn update(&self, table: &AttendanceTable) -> Result<AttendanceTable, DomainError> {
        let mut data = self.data.write().await;
        let slot = data
            .tables
            .iter_mut()
            .find(|t| t.id == table.id)
            .ok_or(DomainError::TableNotFound)?;
        *slot = table.clone();
        Ok(table.clone())
    }

    async fn delete(&self, id: &Uuid) -> Result<bool, DomainError> {
        let mut data = self.data.write().await;
        let before = data.tables.len();
        data.tables.retain(|t| t.id != *id);
        data.members.retain(|m| m.table_id != *id);
        data.records.retain(|r| r.table_id != *id);
        Ok(data.tables.len() < before)
    }
}

#[async_trait]
impl MemberRepository for MemoryStore {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Member>, DomainError> {
        Ok(self.data.read().await.members.iter().find(|m| m.id == *id).cloned())
    }

    async fn find_by_card(&self, card_id: &str) -> Result<Option<Member>, DomainError> {
        Ok(self
            .data
            .read()
            .await
            .members
            .iter()
            .find(|m| m.card_id.as_deref() == Some(card_id))
            .cloned())
    }

    async fn find_by_employee_id(
        &self,
        table_id: &Uuid,
        employee_id: &str,
    ) -> Result<Option<Member>, DomainError> {
        Ok(self
            .data
            .read()
            .await
            .members
            .iter()
            .find(|m| m.table_id == *table_id && m.employee_id == employee_id)
            .cloned())
    }

    async fn list(&self, filter: &MemberFilter) -> Result<Vec<Member>, DomainError> {
        let data = self.data.read().await;
        let mut members: Vec<Member> = data
            .members
            .iter()
            .filter(|m| filter.table_id.map_or(true, |id| m.table_id == id))
            .filter(|m| data.in_group(&m.table_id, filter.user_group.as_deref()))
            .cloned()
            .collect();
        members.sort_by(|a, b| b.joined_at.cmp(&a.joined_at));
        Ok(members)
    }

    async fn create(&self, member: &Member) -> Result<Member, DomainError> {
        let mut data = self.data.write().await;
        if data.table_group(&member.table_id).is_none() {
            return Err(DomainError::TableNotFound);
        }
        data.check_member(member)?;
        data.members.push(member.clone());
        Ok(member.clone())
    }

    async fn update(&self, member: &Member) -> Result<Member, DomainError> {
        let mut data = self.data.write().await;
        data.check_member(member)?;
        let slot = data
            .members
            .iter_mut()
            .find(|m| m.id == member.id)
            .ok_or(DomainError::MemberNotFound)?;
        *slot = member.clone();
        Ok(member.clone())
    }

    async fn delete(&self, id: &Uuid) -> Result<bool, DomainError> {
        Ok(self.data.write().await.remove_members(&[*id]) > 0)
    }

    async fn delete_many(
        &self,
        ids: &[Uuid],
        user_group: Option<String>,
    ) -> Result<u64, DomainError> {
        let mut data = self.data.write().await;
        let targets: Vec<Uuid> = data
            .members
            .iter()
            .filter(|m| ids.contains(&m.id))
            .filter(|m| data.in_group(&m.table_id, user_group.as_deref()))
            .map(|m| m.id)
            .collect();
        Ok(data.remove_members(&targets))
    }
}

#[async_trait]
impl RecordRepository for MemoryStore {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Record>, DomainError> {
        Ok(self.data.read().await.records.iter().find(|r| r.id == *id).cloned())
    }

    async fn find_for_day(
        &self,
        table_id: &Uuid,
        member_id: &Uuid,
        date: NaiveDate,
    ) -> Result<Option<Record>, DomainError> {
        Ok(self
            .data
            .read()
            .await
            .records
            .iter()
            .find(|r| {
                r.table_id == *table_id && r.member_id == *member_id && r.record_date() == Some(date)
            })
            .cloned())
    }

    async fn list(&self, filter: &RecordFilter) -> Result<Vec<RecordView>, DomainError> {
        let data = self.data.read().await;
        let mut views: Vec<RecordView> = data
            .records
            .iter()
            .filter(|r| filter.table_id.map_or(true, |id| r.table_id == id))
            .filter(|r| filter.member_id.map_or(true, |id| r.member_id == id))
            .filter(|r| {
                filter
                    .date
                    .map_or(true, |d| r.checkin_date == Some(d) || r.checkout_date == Some(d))
            })
            .filter(|r| data.in_group(&r.table_id, filter.user_group.as_deref()))
            .filter_map(|r| {
                let member = data.members.iter().find(|m| m.id == r.member_id)?;
                Some(RecordView {
                    record: r.clone(),
                    member_name: member.name.clone(),
                    member_employee_id: member.employee_id.clone(),
                })
            })
            .collect();

        // Check-in date descending with undated rows last, then newest first
        views.sort_by(|a, b| {
            let by_date = match (a.record.checkin_date, b.record.checkin_date) {
                (Some(x), Some(y)) => y.cmp(&x),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => std::cmp::Ordering::Equal,
            };
            by_date.then(b.record.created_at.cmp(&a.record.created_at))
        });
        Ok(views)
    }

    async fn list_by_table(&self, table_id: &Uuid) -> Result<Vec<Record>, DomainError> {
        let mut records: Vec<Record> = self
            .data
            .read()
            .await
            .records
            .iter()
            .filter(|r| r.table_id == *table_id)
            .cloned()
            .collect();
        records.sort_by(|a, b| {
            a.record_date()
                .cmp(&b.record_date())
                .then(a.checkin_time.cmp(&b.checkin_time))
        });
        Ok(records)
    }

    async fn create(&self, record: &Record) -> Result<Record, DomainError> {
        let mut data = self.data.write().await;
        if !data.members.iter().any(|m| m.id == record.member_id) {
            return Err(DomainError::MemberNotFound);
        }
        data.check_record(record)?;
        data.records.push(record.clone());
        Ok(record.clone())
    }

    async fn update(&self, record: &Record) -> Result<Record, DomainError> {
        let mut data = self.data.write().await;
        data.check_record(record)?;
        let slot = data
            .records
            .iter_mut()
            .find(|r| r.id == record.id)
            .ok_or(DomainError::RecordNotFound)?;
        *slot = record.clone();
        Ok(record.clone())
    }

    async fn delete(&self, id: &Uuid) -> Result<bool, DomainError> {
        let mut data = self.data.write().await;
        let before = data.records.len();
        data.records.retain(|r| r.id != *id);
        Ok(data.records.len() < before)
    }
}

#[async_trait]
impl SettingsRepository for MemoryStore {
    async fn get_all(&self, user_group: &str) -> Result<Vec<(String, String)>, DomainError> {
        Ok(self
            .data
            .read()
            .await
            .settings
            .iter()
            .filter(|((group, _), _)| group == user_group)
            .map(|((_, key), value)| (key.clone(), value.clone()))
            .collect())
    }

    async fn set(&self, user_group: &str, key: &str, value: &str) -> Result<(), DomainError> {
        self.data
            .write()
            .await
            .settings
            .insert((user_group.to_string(), key.to_string()), value.to_string());
        Ok(())
    }
}

#[async_trait]
impl StoreHealth for MemoryStore {
    async fn ping(&self) -> Result<(), DomainError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use attendance_core::domain::{RecordType, UserRole};
    use chrono::NaiveTime;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn nine() -> NaiveTime {
        NaiveTime::from_hms_opt(9, 0, 0).unwrap()
    }

    async fn seeded() -> (MemoryStore, AttendanceTable, Member) {
        let store = MemoryStore::new();
        let table = AttendanceTable::new("Lab".to_string(), None, "physics".to_string()).unwrap();
        TableRepository::create(&store, &table).await.unwrap();
        let member = Member::new(table.id, "Ada".to_string(), "E1".to_string(), None).unwrap();
        MemberRepository::create(&store, &member).await.unwrap();
        (store, table, member)
    }

    #[tokio::test]
    async fn test_single_super_admin() {
        let store = MemoryStore::new();
        let first = User::new_super_admin("root".to_string(), "h".to_string()).unwrap();
        let second = User::new_super_admin("root2".to_string(), "h".to_string()).unwrap();

        UserRepository::create(&store, &first).await.unwrap();
        let err = UserRepository::create(&store, &second).await.unwrap_err();
        assert!(matches!(err, DomainError::SetupAlreadyCompleted));
    }

    #[tokio::test]
    async fn test_duplicate_username() {
        let store = MemoryStore::new();
        let a = User::new("bob".to_string(), "h".to_string(), UserRole::User, None, None).unwrap();
        let b = User::new("bob".to_string(), "h".to_string(), UserRole::Admin, None, None).unwrap();

        UserRepository::create(&store, &a).await.unwrap();
        let err = UserRepository::create(&store, &b).await.unwrap_err();
        assert!(matches!(err, DomainError::UsernameAlreadyExists(_)));
    }

    #[tokio::test]
    async fn test_batch_delete_spares_super_admin() {
        let store = MemoryStore::new();
        let root = User::new_super_admin("root".to_string(), "h".to_string()).unwrap();
        let bob = User::new("bob".to_string(), "h".to_string(), UserRole::User, None, None).unwrap();
        UserRepository::create(&store, &root).await.unwrap();
        UserRepository::create(&store, &bob).await.unwrap();

        let deleted = UserRepository::delete_many(&store, &[root.id, bob.id]).await.unwrap();
        assert_eq!(deleted, 1);
        assert_eq!(UserRepository::count(&store).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_card_unique_across_tables() {
        let (store, _, mut ada) = seeded().await;
        let other = AttendanceTable::new("Other".to_string(), None, "physics".to_string()).unwrap();
        TableRepository::create(&store, &other).await.unwrap();
        let mut bob = Member::new(other.id, "Bob".to_string(), "E1".to_string(), None).unwrap();
        MemberRepository::create(&store, &bob).await.unwrap();

        ada.bind_card("CAFE".to_string());
        MemberRepository::update(&store, &ada).await.unwrap();
        bob.bind_card("CAFE".to_string());
        let err = MemberRepository::update(&store, &bob).await.unwrap_err();
        assert!(matches!(err, DomainError::CardAlreadyBound(_)));
    }

    #[tokio::test]
    async fn test_one_record_per_day() {
        let (store, table, ada) = seeded().await;
        let first = Record::new(table.id, ada.id, RecordType::CheckIn, day(1), nine());
        let again = Record::new(table.id, ada.id, RecordType::CheckOut, day(1), nine());
        let next_day = Record::new(table.id, ada.id, RecordType::CheckIn, day(2), nine());

        RecordRepository::create(&store, &first).await.unwrap();
        let err = RecordRepository::create(&store, &again).await.unwrap_err();
        assert!(matches!(err, DomainError::RecordAlreadyExists));
        RecordRepository::create(&store, &next_day).await.unwrap();
    }

    #[tokio::test]
    async fn test_table_delete_cascades() {
        let (store, table, ada) = seeded().await;
        let record = Record::new(table.id, ada.id, RecordType::CheckIn, day(1), nine());
        RecordRepository::create(&store, &record).await.unwrap();

        assert!(TableRepository::delete(&store, &table.id).await.unwrap());
        assert!(MemberRepository::find_by_id(&store, &ada.id).await.unwrap().is_none());
        assert!(RecordRepository::find_by_id(&store, &record.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_record_list_order_and_date_filter() {
        let (store, table, ada) = seeded().await;
        let older = Record::new(table.id, ada.id, RecordType::CheckIn, day(1), nine());
        let newer = Record::new(table.id, ada.id, RecordType::CheckIn, day(2), nine());
        let checkout_only = Record::new(table.id, ada.id, RecordType::CheckOut, day(3), nine());
        for r in [&older, &newer, &checkout_only] {
            RecordRepository::create(&store, r).await.unwrap();
        }

        let all = RecordRepository::list(&store, &RecordFilter::default()).await.unwrap();
        let ids: Vec<Uuid> = all.iter().map(|v| v.record.id).collect();
        assert_eq!(ids, vec![newer.id, older.id, checkout_only.id]);
        assert_eq!(all[0].member_name, "Ada");

        let filtered = RecordRepository::list(
            &store,
            &RecordFilter {
                date: Some(day(3)),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].record.id, checkout_only.id);
    }

    #[tokio::test]
    async fn test_member_count_and_group_filter() {
        let (store, _, _) = seeded().await;
        let foreign = AttendanceTable::new("Chem".to_string(), None, "chemistry".to_string()).unwrap();
        TableRepository::create(&store, &foreign).await.unwrap();

        let physics = TableRepository::list(&store, Some("physics".to_string())).await.unwrap();
        assert_eq!(physics.len(), 1);
        assert_eq!(physics[0].member_count, 1);
        assert_eq!(TableRepository::list(&store, None).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_settings_are_per_group() {
        let store = MemoryStore::new();
        store.set("physics", "mode", "checkout").await.unwrap();
        store.set("physics", "mode", "checkin").await.unwrap();
        store.set("chemistry", "mode", "checkout").await.unwrap();

        let physics = store.get_all("physics").await.unwrap();
        assert_eq!(physics, vec![("mode".to_string(), "checkin".to_string())]);
    }
}
