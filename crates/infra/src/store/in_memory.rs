use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use lsp_assessment::{Assessee, Assessment, Assessor, CertificationSchema, Competency, CompetencyUnit};
use lsp_auth::User;
use lsp_core::{
    AssesseeId, AssessmentId, AssessorId, CompetencyId, FormApl01Id, FormApl02Id, SchemaId, UnitId,
    UserId,
};
use lsp_forms::{FormApl01, FormApl02};

use super::r#trait::{
    Apl01Store, Apl02Store, AssesseeStore, AssessmentStore, AssessorStore, CatalogStore, StoreError,
    UserStore,
};

#[derive(Debug, Default)]
struct Tables {
    users: HashMap<UserId, User>,
    assessees: HashMap<AssesseeId, Assessee>,
    assessors: HashMap<AssessorId, Assessor>,
    competencies: HashMap<CompetencyId, Competency>,
    schemas: HashMap<SchemaId, CertificationSchema>,
    units: HashMap<UnitId, CompetencyUnit>,
    assessments: HashMap<AssessmentId, Assessment>,
    apl01: HashMap<FormApl01Id, FormApl01>,
    apl02: HashMap<FormApl02Id, FormApl02>,
}

/// In-memory store for tests/dev.
///
/// All tables sit behind one lock, so every call sees a consistent snapshot.
/// Uniqueness rules mirror the Postgres schema's unique constraints.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>, StoreError> {
        self.tables
            .read()
            .map_err(|_| StoreError::Backend("in-memory store lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>, StoreError> {
        self.tables
            .write()
            .map_err(|_| StoreError::Backend("in-memory store lock poisoned".to_string()))
    }
}

/// Replace an existing row or report `NotFound`.
fn replace<K, V>(table: &mut HashMap<K, V>, key: K, value: V) -> Result<(), StoreError>
where
    K: Eq + std::hash::Hash,
{
    match table.get_mut(&key) {
        Some(slot) => {
            *slot = value;
            Ok(())
        }
        None => Err(StoreError::NotFound),
    }
}

fn remove<K, V>(table: &mut HashMap<K, V>, key: &K) -> Result<V, StoreError>
where
    K: Eq + std::hash::Hash,
{
    table.remove(key).ok_or(StoreError::NotFound)
}

fn sorted<T: Clone, K: Ord>(items: impl Iterator<Item = T>, key: impl Fn(&T) -> K) -> Vec<T> {
    let mut out: Vec<T> = items.collect();
    out.sort_by_key(|item| key(item));
    out
}

fn assessments_of(tables: &Tables, assessee: AssesseeId) -> Vec<AssessmentId> {
    tables
        .assessments
        .values()
        .filter(|a| a.assessee_id == Some(assessee))
        .map(|a| a.id)
        .collect()
}

fn unlink_assessee(tables: &mut Tables, id: AssesseeId) {
    for assessment in tables.assessments.values_mut() {
        if assessment.assessee_id == Some(id) {
            assessment.assessee_id = None;
        }
    }
}

fn unlink_assessor(tables: &mut Tables, id: AssessorId) {
    for assessment in tables.assessments.values_mut() {
        if assessment.assessor_id == Some(id) {
            assessment.assessor_id = None;
        }
    }
}

#[async_trait]
impl UserStore for InMemoryStore {
    async fn insert_user(&self, user: &User) -> Result<(), StoreError> {
        let mut t = self.write()?;
        if t.users.values().any(|u| u.email == user.email) {
            return Err(StoreError::Conflict("email already registered".to_string()));
        }
        if t.users.values().any(|u| u.username == user.username) {
            return Err(StoreError::Conflict("username already taken".to_string()));
        }
        t.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn update_user(&self, user: &User) -> Result<(), StoreError> {
        let mut t = self.write()?;
        if t
            .users
            .values()
            .any(|u| u.id != user.id && (u.email == user.email || u.username == user.username))
        {
            return Err(StoreError::Conflict("email or username already in use".to_string()));
        }
        replace(&mut t.users, user.id, user.clone())
    }

    /// Profiles owned by the account go with it; assessments keep their
    /// rows but lose the link, as `ON DELETE CASCADE` / `SET NULL` do.
    async fn delete_user(&self, id: UserId) -> Result<(), StoreError> {
        let mut t = self.write()?;
        remove(&mut t.users, &id)?;

        let assessees: Vec<AssesseeId> = t.assessees.values().filter(|a| a.user_id == id).map(|a| a.id).collect();
        let assessors: Vec<AssessorId> = t.assessors.values().filter(|a| a.user_id == id).map(|a| a.id).collect();
        for assessee in assessees {
            t.assessees.remove(&assessee);
            unlink_assessee(&mut t, assessee);
        }
        for assessor in assessors {
            t.assessors.remove(&assessor);
            unlink_assessor(&mut t, assessor);
        }
        Ok(())
    }

    async fn find_user(&self, id: UserId) -> Result<Option<User>, StoreError> {
        Ok(self.read()?.users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let email = lsp_auth::normalize_email(email);
        Ok(self.read()?.users.values().find(|u| u.email == email).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let username = username.trim();
        Ok(self.read()?.users.values().find(|u| u.username == username).cloned())
    }
}

#[async_trait]
impl AssesseeStore for InMemoryStore {
    async fn insert_assessee(&self, assessee: &Assessee) -> Result<(), StoreError> {
        let mut t = self.write()?;
        if t.assessees.values().any(|a| a.user_id == assessee.user_id) {
            return Err(StoreError::Conflict("user already has an assessee profile".to_string()));
        }
        t.assessees.insert(assessee.id, assessee.clone());
        Ok(())
    }

    async fn find_assessee(&self, id: AssesseeId) -> Result<Option<Assessee>, StoreError> {
        Ok(self.read()?.assessees.get(&id).cloned())
    }

    async fn find_assessee_by_user(&self, user_id: UserId) -> Result<Option<Assessee>, StoreError> {
        Ok(self.read()?.assessees.values().find(|a| a.user_id == user_id).cloned())
    }
}

#[async_trait]
impl AssessorStore for InMemoryStore {
    async fn insert_assessor(&self, assessor: &Assessor) -> Result<(), StoreError> {
        let mut t = self.write()?;
        if t
            .assessors
            .values()
            .any(|a| a.registration_number == assessor.registration_number)
        {
            return Err(StoreError::Conflict("registration number already exists".to_string()));
        }
        t.assessors.insert(assessor.id, assessor.clone());
        Ok(())
    }

    async fn update_assessor(&self, assessor: &Assessor) -> Result<(), StoreError> {
        let mut t = self.write()?;
        if t
            .assessors
            .values()
            .any(|a| a.id != assessor.id && a.registration_number == assessor.registration_number)
        {
            return Err(StoreError::Conflict("registration number already exists".to_string()));
        }
        replace(&mut t.assessors, assessor.id, assessor.clone())
    }

    async fn delete_assessor(&self, id: AssessorId) -> Result<(), StoreError> {
        let mut t = self.write()?;
        remove(&mut t.assessors, &id)?;
        unlink_assessor(&mut t, id);
        Ok(())
    }

    async fn find_assessor(&self, id: AssessorId) -> Result<Option<Assessor>, StoreError> {
        Ok(self.read()?.assessors.get(&id).cloned())
    }

    async fn find_assessor_by_registration(&self, number: &str) -> Result<Option<Assessor>, StoreError> {
        let number = number.trim();
        Ok(self
            .read()?
            .assessors
            .values()
            .find(|a| a.registration_number == number)
            .cloned())
    }

    async fn list_assessors(&self) -> Result<Vec<Assessor>, StoreError> {
        let t = self.read()?;
        Ok(sorted(t.assessors.values().cloned(), |a| a.created_at))
    }
}

#[async_trait]
impl CatalogStore for InMemoryStore {
    async fn insert_competency(&self, competency: &Competency) -> Result<(), StoreError> {
        let mut t = self.write()?;
        if t.competencies.values().any(|c| c.code == competency.code) {
            return Err(StoreError::Conflict(format!("kompetensi '{}' already exists", competency.code)));
        }
        t.competencies.insert(competency.id, competency.clone());
        Ok(())
    }

    async fn list_competencies(&self) -> Result<Vec<Competency>, StoreError> {
        let t = self.read()?;
        Ok(sorted(t.competencies.values().cloned(), |c| c.code.clone()))
    }

    async fn find_competencies(&self, ids: &[CompetencyId]) -> Result<Vec<Competency>, StoreError> {
        let t = self.read()?;
        Ok(ids.iter().filter_map(|id| t.competencies.get(id).cloned()).collect())
    }

    async fn insert_schema(&self, schema: &CertificationSchema) -> Result<(), StoreError> {
        let mut t = self.write()?;
        if t.schemas.values().any(|s| s.number == schema.number) {
            return Err(StoreError::Conflict(format!("skema '{}' already exists", schema.number)));
        }
        t.schemas.insert(schema.id, schema.clone());
        Ok(())
    }

    async fn find_schema(&self, id: SchemaId) -> Result<Option<CertificationSchema>, StoreError> {
        Ok(self.read()?.schemas.get(&id).cloned())
    }

    async fn list_schemas(&self) -> Result<Vec<CertificationSchema>, StoreError> {
        let t = self.read()?;
        Ok(sorted(t.schemas.values().cloned(), |s| s.created_at))
    }

    async fn insert_unit(&self, unit: &CompetencyUnit) -> Result<(), StoreError> {
        let mut t = self.write()?;
        if t.units.values().any(|u| u.code == unit.code) {
            return Err(StoreError::Conflict(format!("unit '{}' already exists", unit.code)));
        }
        t.units.insert(unit.id, unit.clone());
        Ok(())
    }

    async fn list_units(&self, schema_id: SchemaId) -> Result<Vec<CompetencyUnit>, StoreError> {
        let t = self.read()?;
        Ok(sorted(
            t.units.values().filter(|u| u.schema_id == schema_id).cloned(),
            |u| u.code.clone(),
        ))
    }
}

#[async_trait]
impl AssessmentStore for InMemoryStore {
    async fn insert_assessment(&self, assessment: &Assessment) -> Result<(), StoreError> {
        self.write()?.assessments.insert(assessment.id, assessment.clone());
        Ok(())
    }

    async fn update_assessment(&self, assessment: &Assessment) -> Result<(), StoreError> {
        replace(&mut self.write()?.assessments, assessment.id, assessment.clone())
    }

    async fn delete_assessment(&self, id: AssessmentId) -> Result<(), StoreError> {
        let mut t = self.write()?;
        remove(&mut t.assessments, &id)?;
        t.apl01.retain(|_, f| f.assessment_id != id);
        t.apl02.retain(|_, f| f.assessment_id != id);
        Ok(())
    }

    async fn find_assessment(&self, id: AssessmentId) -> Result<Option<Assessment>, StoreError> {
        Ok(self.read()?.assessments.get(&id).cloned())
    }

    async fn list_assessments_by_assessee(&self, id: AssesseeId) -> Result<Vec<Assessment>, StoreError> {
        let t = self.read()?;
        Ok(sorted(
            t.assessments.values().filter(|a| a.assessee_id == Some(id)).cloned(),
            |a| a.created_at,
        ))
    }

    async fn list_assessments_by_assessor(&self, id: AssessorId) -> Result<Vec<Assessment>, StoreError> {
        let t = self.read()?;
        Ok(sorted(
            t.assessments.values().filter(|a| a.assessor_id == Some(id)).cloned(),
            |a| a.created_at,
        ))
    }
}

#[async_trait]
impl Apl01Store for InMemoryStore {
    async fn insert_apl01(&self, form: &FormApl01) -> Result<(), StoreError> {
        let mut t = self.write()?;
        if t.apl01.values().any(|f| f.assessment_id == form.assessment_id) {
            return Err(StoreError::Conflict(
                "form APL01 already exists for this asesmen".to_string(),
            ));
        }
        t.apl01.insert(form.id, form.clone());
        Ok(())
    }

    async fn update_apl01(&self, form: &FormApl01) -> Result<(), StoreError> {
        replace(&mut self.write()?.apl01, form.id, form.clone())
    }

    async fn delete_apl01(&self, id: FormApl01Id) -> Result<(), StoreError> {
        remove(&mut self.write()?.apl01, &id).map(|_| ())
    }

    async fn find_apl01(&self, id: FormApl01Id) -> Result<Option<FormApl01>, StoreError> {
        Ok(self.read()?.apl01.get(&id).cloned())
    }

    async fn find_apl01_by_assessment(&self, id: AssessmentId) -> Result<Option<FormApl01>, StoreError> {
        Ok(self.read()?.apl01.values().find(|f| f.assessment_id == id).cloned())
    }

    async fn list_apl01_by_assessee(&self, id: AssesseeId) -> Result<Vec<FormApl01>, StoreError> {
        let t = self.read()?;
        let owned = assessments_of(&t, id);
        Ok(sorted(
            t.apl01.values().filter(|f| owned.contains(&f.assessment_id)).cloned(),
            |f| f.created_at,
        ))
    }
}

#[async_trait]
impl Apl02Store for InMemoryStore {
    async fn insert_apl02(&self, form: &FormApl02) -> Result<(), StoreError> {
        self.write()?.apl02.insert(form.id, form.clone());
        Ok(())
    }

    async fn update_apl02(&self, form: &FormApl02) -> Result<(), StoreError> {
        replace(&mut self.write()?.apl02, form.id, form.clone())
    }

    async fn delete_apl02(&self, id: FormApl02Id) -> Result<(), StoreError> {
        remove(&mut self.write()?.apl02, &id).map(|_| ())
    }

    async fn find_apl02(&self, id: FormApl02Id) -> Result<Option<FormApl02>, StoreError> {
        Ok(self.read()?.apl02.get(&id).cloned())
    }

    async fn list_apl02_by_assessment(&self, id: AssessmentId) -> Result<Vec<FormApl02>, StoreError> {
        let t = self.read()?;
        Ok(sorted(
            t.apl02.values().filter(|f| f.assessment_id == id).cloned(),
            |f| f.created_at,
        ))
    }

    async fn list_apl02_by_assessee(&self, id: AssesseeId) -> Result<Vec<FormApl02>, StoreError> {
        let t = self.read()?;
        let owned = assessments_of(&t, id);
        Ok(sorted(
            t.apl02.values().filter(|f| owned.contains(&f.assessment_id)).cloned(),
            |f| f.created_at,
        ))
    }
}
