//! Postgres-backed store implementation.
//!
//! One `PostgresStore` implements every store trait over a shared `PgPool`.
//! Uniqueness (emails, registration numbers, one APL01 per assessment) is
//! enforced by the schema's unique constraints.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError |
//! |------------|----------------------|------------|
//! | Database (unique violation) | `23505` | `Conflict` |
//! | Database (other) | any other | `Backend` |
//! | PoolClosed / Io / other | N/A | `Backend` |
//!
//! Updates and deletes that touch zero rows report `NotFound`.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{FromRow, PgPool, Row};
use tracing::instrument;
use uuid::Uuid;

use lsp_assessment::{
    Assessee, Assessment, AssessmentResult, AssessmentStatus, Assessor, CatalogStatus,
    CertificationSchema, Competency, CompetencyUnit, Gender, SchemaKind, SchemaStatus,
};
use lsp_auth::{Role, User, UserStatus};
use lsp_core::{
    AssesseeId, AssessmentId, AssessorId, CompetencyId, DomainError, FormApl01Id, FormApl02Id,
    SchemaId, UnitId, UserId,
};
use lsp_forms::{Apl02Status, FormApl01, FormApl02};

use super::r#trait::{
    Apl01Store, Apl02Store, AssesseeStore, AssessmentStore, AssessorStore, CatalogStore, StoreError,
    UserStore,
};

const SCHEMA_SQL: &str = include_str!("../../migrations/0001_init.sql");

/// Postgres-backed store.
///
/// Uses SQLx connection pool which is thread-safe (Arc + Send + Sync).
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: Arc<PgPool>,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool: Arc::new(pool) }
    }

    /// Open a pool against `database_url`.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        Ok(Self::new(pool))
    }

    /// Apply the schema. Every statement is idempotent.
    #[instrument(skip(self), err)]
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::raw_sql(SCHEMA_SQL)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("migrate", e))?;
        tracing::info!("database schema applied");
        Ok(())
    }
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.code() {
                Some(code) if code.as_ref() == "23505" => StoreError::Conflict(
                    db_err
                        .constraint()
                        .map(|c| format!("duplicate value violates {c}"))
                        .unwrap_or(msg),
                ),
                _ => StoreError::Backend(msg),
            }
        }
        sqlx::Error::PoolClosed => {
            StoreError::Backend(format!("connection pool closed in {}", operation))
        }
        _ => StoreError::Backend(format!("sqlx error in {}: {}", operation, err)),
    }
}

/// Turn a zero-row update/delete into `NotFound`.
fn expect_row(operation: &str, result: Result<sqlx::postgres::PgQueryResult, sqlx::Error>) -> Result<(), StoreError> {
    let done = result.map_err(|e| map_sqlx_error(operation, e))?;
    if done.rows_affected() == 0 {
        return Err(StoreError::NotFound);
    }
    Ok(())
}

fn decode_err(e: DomainError) -> sqlx::Error {
    sqlx::Error::Decode(Box::new(e))
}

fn opt_uuid<T: Into<Uuid>>(id: Option<T>) -> Option<Uuid> {
    id.map(Into::into)
}

// SQLx row types

struct UserRow(User);

impl<'r> FromRow<'r, PgRow> for UserRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        let role: String = row.try_get("role")?;
        let is_active: bool = row.try_get("is_active")?;
        Ok(Self(User {
            id: UserId::from_uuid(row.try_get("id")?),
            username: row.try_get("username")?,
            email: row.try_get("email")?,
            password_hash: row.try_get("password_hash")?,
            role: role.parse::<Role>().map_err(decode_err)?,
            related_id: row.try_get("id_related")?,
            last_login: row.try_get("last_login")?,
            status: UserStatus::from_active_flag(is_active),
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        }))
    }
}

struct AssesseeRow(Assessee);

impl<'r> FromRow<'r, PgRow> for AssesseeRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        let gender: Option<String> = row.try_get("jenis_kelamin")?;
        Ok(Self(Assessee {
            id: AssesseeId::from_uuid(row.try_get("id")?),
            user_id: UserId::from_uuid(row.try_get("user_id")?),
            full_name: row.try_get("nama_lengkap")?,
            id_card_number: row.try_get("no_ktp")?,
            birth_place: row.try_get("tempat_lahir")?,
            birth_date: row.try_get::<Option<NaiveDate>, _>("tanggal_lahir")?,
            gender: gender.map(|g| g.parse::<Gender>()).transpose().map_err(decode_err)?,
            address: row.try_get("alamat")?,
            postal_code: row.try_get("kode_pos")?,
            phone: row.try_get("no_telepon")?,
            email: row.try_get("email")?,
            education: row.try_get("kualifikasi_pendidikan")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        }))
    }
}

struct AssessorRow(Assessor);

impl<'r> FromRow<'r, PgRow> for AssessorRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self(Assessor {
            id: AssessorId::from_uuid(row.try_get("id")?),
            user_id: UserId::from_uuid(row.try_get("user_id")?),
            full_name: row.try_get("nama_lengkap")?,
            registration_number: row.try_get("no_registrasi")?,
            email: row.try_get("email")?,
            phone: row.try_get("no_telepon")?,
            competencies: row.try_get("kompetensi")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        }))
    }
}

struct CompetencyRow(Competency);

impl<'r> FromRow<'r, PgRow> for CompetencyRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        let status: String = row.try_get("status")?;
        Ok(Self(Competency {
            id: CompetencyId::from_uuid(row.try_get("id")?),
            code: row.try_get("kode")?,
            name: row.try_get("nama")?,
            description: row.try_get("deskripsi")?,
            kind: row.try_get("jenis")?,
            level: row.try_get("level")?,
            status: CatalogStatus::parse(&status).map_err(decode_err)?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        }))
    }
}

struct SchemaRow(CertificationSchema);

impl<'r> FromRow<'r, PgRow> for SchemaRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        let kind: String = row.try_get("jenis_skema")?;
        let status: String = row.try_get("status")?;
        Ok(Self(CertificationSchema {
            id: SchemaId::from_uuid(row.try_get("id")?),
            title: row.try_get("judul_skema")?,
            number: row.try_get("nomor_skema")?,
            kind: SchemaKind::parse(&kind).map_err(decode_err)?,
            description: row.try_get("deskripsi")?,
            valid_from: row.try_get("tanggal_berlaku")?,
            status: SchemaStatus::parse(&status).map_err(decode_err)?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        }))
    }
}

struct UnitRow(CompetencyUnit);

impl<'r> FromRow<'r, PgRow> for UnitRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self(CompetencyUnit {
            id: UnitId::from_uuid(row.try_get("id")?),
            schema_id: SchemaId::from_uuid(row.try_get("id_skema")?),
            code: row.try_get("kode_unit")?,
            title: row.try_get("judul_unit")?,
            description: row.try_get("deskripsi")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        }))
    }
}

struct AssessmentRow(Assessment);

impl<'r> FromRow<'r, PgRow> for AssessmentRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        let status: String = row.try_get("status")?;
        let result: String = row.try_get("hasil")?;
        Ok(Self(Assessment {
            id: AssessmentId::from_uuid(row.try_get("id")?),
            schema_id: row.try_get::<Option<Uuid>, _>("id_skema")?.map(SchemaId::from_uuid),
            assessee_id: row.try_get::<Option<Uuid>, _>("id_asesi")?.map(AssesseeId::from_uuid),
            assessor_id: row.try_get::<Option<Uuid>, _>("id_asesor")?.map(AssessorId::from_uuid),
            started_at: row.try_get::<Option<DateTime<Utc>>, _>("tanggal_mulai")?,
            finished_at: row.try_get::<Option<DateTime<Utc>>, _>("tanggal_selesai")?,
            venue: row.try_get("tuk")?,
            status: status.parse::<AssessmentStatus>().map_err(decode_err)?,
            result: result.parse::<AssessmentResult>().map_err(decode_err)?,
            notes: row.try_get("catatan")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        }))
    }
}

struct Apl01Row(FormApl01);

impl<'r> FromRow<'r, PgRow> for Apl01Row {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        let gender: Option<String> = row.try_get("jenis_kelamin")?;
        Ok(Self(FormApl01 {
            id: FormApl01Id::from_uuid(row.try_get("id")?),
            assessment_id: AssessmentId::from_uuid(row.try_get("id_asesmen")?),
            full_name: row.try_get("nama_lengkap")?,
            id_card_number: row.try_get("no_ktp")?,
            birth_place: row.try_get("tempat_lahir")?,
            birth_date: row.try_get("tanggal_lahir")?,
            gender: gender.map(|g| g.parse::<Gender>()).transpose().map_err(decode_err)?,
            nationality: row.try_get("kebangsaan")?,
            address: row.try_get("alamat")?,
            postal_code: row.try_get("kode_pos")?,
            home_phone: row.try_get("no_rumah")?,
            office_phone: row.try_get("no_kantor")?,
            mobile_phone: row.try_get("no_hp")?,
            email: row.try_get("email")?,
            education: row.try_get("kualifikasi_pendidikan")?,
            institution: row.try_get("institusi")?,
            position: row.try_get("jabatan")?,
            office_address: row.try_get("alamat_kantor")?,
            office_postal_code: row.try_get("kode_pos_kantor")?,
            office_tel: row.try_get("telp_kantor")?,
            office_fax: row.try_get("fax_kantor")?,
            office_email: row.try_get("email_kantor")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        }))
    }
}

struct Apl02Row(FormApl02);

impl<'r> FromRow<'r, PgRow> for Apl02Row {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        let status: String = row.try_get("status")?;
        Ok(Self(FormApl02 {
            id: FormApl02Id::from_uuid(row.try_get("id")?),
            assessment_id: AssessmentId::from_uuid(row.try_get("id_asesmen")?),
            unit_code: row.try_get("kode_unit")?,
            unit_title: row.try_get("judul_unit")?,
            element: row.try_get("elemen")?,
            criteria: row.try_get("kuk")?,
            status: status.parse::<Apl02Status>().map_err(decode_err)?,
            evidence: row.try_get("bukti")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        }))
    }
}

// Store trait implementations

#[async_trait]
impl UserStore for PostgresStore {
    #[instrument(skip(self, user), fields(user_id = %user.id), err)]
    async fn insert_user(&self, user: &User) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO users (
                id, username, email, password_hash, role, id_related,
                last_login, is_active, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(user.id.as_uuid())
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(user.related_id)
        .bind(user.last_login)
        .bind(user.status.is_active())
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_user", e))?;
        Ok(())
    }

    #[instrument(skip(self, user), fields(user_id = %user.id), err)]
    async fn update_user(&self, user: &User) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET username = $2, email = $3, password_hash = $4, role = $5, id_related = $6,
                last_login = $7, is_active = $8, updated_at = $9
            WHERE id = $1
            "#,
        )
        .bind(user.id.as_uuid())
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(user.related_id)
        .bind(user.last_login)
        .bind(user.status.is_active())
        .bind(user.updated_at)
        .execute(&*self.pool)
        .await;
        expect_row("update_user", result)
    }

    async fn delete_user(&self, id: UserId) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&*self.pool)
            .await;
        expect_row("delete_user", result)
    }

    async fn find_user(&self, id: UserId) -> Result<Option<User>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_user", e))?;
        Ok(row.map(|r| r.0))
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE email = $1")
            .bind(lsp_auth::normalize_email(email))
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_user_by_email", e))?;
        Ok(row.map(|r| r.0))
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE username = $1")
            .bind(username.trim())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_user_by_username", e))?;
        Ok(row.map(|r| r.0))
    }
}

#[async_trait]
impl AssesseeStore for PostgresStore {
    #[instrument(skip(self, assessee), fields(assessee_id = %assessee.id), err)]
    async fn insert_assessee(&self, assessee: &Assessee) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO asesi (
                id, user_id, nama_lengkap, no_ktp, tempat_lahir, tanggal_lahir, jenis_kelamin,
                alamat, kode_pos, no_telepon, email, kualifikasi_pendidikan, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#,
        )
        .bind(assessee.id.as_uuid())
        .bind(assessee.user_id.as_uuid())
        .bind(&assessee.full_name)
        .bind(&assessee.id_card_number)
        .bind(&assessee.birth_place)
        .bind(assessee.birth_date)
        .bind(assessee.gender.map(|g| g.as_str()))
        .bind(&assessee.address)
        .bind(&assessee.postal_code)
        .bind(&assessee.phone)
        .bind(&assessee.email)
        .bind(&assessee.education)
        .bind(assessee.created_at)
        .bind(assessee.updated_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_assessee", e))?;
        Ok(())
    }

    async fn find_assessee(&self, id: AssesseeId) -> Result<Option<Assessee>, StoreError> {
        let row = sqlx::query_as::<_, AssesseeRow>("SELECT * FROM asesi WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_assessee", e))?;
        Ok(row.map(|r| r.0))
    }

    async fn find_assessee_by_user(&self, user_id: UserId) -> Result<Option<Assessee>, StoreError> {
        let row = sqlx::query_as::<_, AssesseeRow>("SELECT * FROM asesi WHERE user_id = $1")
            .bind(user_id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_assessee_by_user", e))?;
        Ok(row.map(|r| r.0))
    }
}

#[async_trait]
impl AssessorStore for PostgresStore {
    #[instrument(skip(self, assessor), fields(assessor_id = %assessor.id), err)]
    async fn insert_assessor(&self, assessor: &Assessor) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO asesor (
                id, user_id, nama_lengkap, no_registrasi, email, no_telepon, kompetensi,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(assessor.id.as_uuid())
        .bind(assessor.user_id.as_uuid())
        .bind(&assessor.full_name)
        .bind(&assessor.registration_number)
        .bind(&assessor.email)
        .bind(&assessor.phone)
        .bind(&assessor.competencies)
        .bind(assessor.created_at)
        .bind(assessor.updated_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_assessor", e))?;
        Ok(())
    }

    #[instrument(skip(self, assessor), fields(assessor_id = %assessor.id), err)]
    async fn update_assessor(&self, assessor: &Assessor) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE asesor
            SET nama_lengkap = $2, no_registrasi = $3, email = $4, no_telepon = $5,
                kompetensi = $6, updated_at = $7
            WHERE id = $1
            "#,
        )
        .bind(assessor.id.as_uuid())
        .bind(&assessor.full_name)
        .bind(&assessor.registration_number)
        .bind(&assessor.email)
        .bind(&assessor.phone)
        .bind(&assessor.competencies)
        .bind(assessor.updated_at)
        .execute(&*self.pool)
        .await;
        expect_row("update_assessor", result)
    }

    async fn delete_assessor(&self, id: AssessorId) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM asesor WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&*self.pool)
            .await;
        expect_row("delete_assessor", result)
    }

    async fn find_assessor(&self, id: AssessorId) -> Result<Option<Assessor>, StoreError> {
        let row = sqlx::query_as::<_, AssessorRow>("SELECT * FROM asesor WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_assessor", e))?;
        Ok(row.map(|r| r.0))
    }

    async fn find_assessor_by_registration(&self, number: &str) -> Result<Option<Assessor>, StoreError> {
        let row = sqlx::query_as::<_, AssessorRow>("SELECT * FROM asesor WHERE no_registrasi = $1")
            .bind(number.trim())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_assessor_by_registration", e))?;
        Ok(row.map(|r| r.0))
    }

    async fn list_assessors(&self) -> Result<Vec<Assessor>, StoreError> {
        let rows = sqlx::query_as::<_, AssessorRow>("SELECT * FROM asesor ORDER BY created_at ASC")
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_assessors", e))?;
        Ok(rows.into_iter().map(|r| r.0).collect())
    }
}

#[async_trait]
impl CatalogStore for PostgresStore {
    async fn insert_competency(&self, competency: &Competency) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO kompetensi (id, kode, nama, deskripsi, jenis, level, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(competency.id.as_uuid())
        .bind(&competency.code)
        .bind(&competency.name)
        .bind(&competency.description)
        .bind(&competency.kind)
        .bind(&competency.level)
        .bind(competency.status.as_str())
        .bind(competency.created_at)
        .bind(competency.updated_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_competency", e))?;
        Ok(())
    }

    async fn list_competencies(&self) -> Result<Vec<Competency>, StoreError> {
        let rows = sqlx::query_as::<_, CompetencyRow>("SELECT * FROM kompetensi ORDER BY kode ASC")
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_competencies", e))?;
        Ok(rows.into_iter().map(|r| r.0).collect())
    }

    async fn find_competencies(&self, ids: &[CompetencyId]) -> Result<Vec<Competency>, StoreError> {
        let ids: Vec<Uuid> = ids.iter().map(|id| *id.as_uuid()).collect();
        let rows = sqlx::query_as::<_, CompetencyRow>("SELECT * FROM kompetensi WHERE id = ANY($1)")
            .bind(&ids)
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_competencies", e))?;
        Ok(rows.into_iter().map(|r| r.0).collect())
    }

    async fn insert_schema(&self, schema: &CertificationSchema) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO skema (
                id, judul_skema, nomor_skema, jenis_skema, deskripsi, tanggal_berlaku, status,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(schema.id.as_uuid())
        .bind(&schema.title)
        .bind(&schema.number)
        .bind(schema.kind.as_str())
        .bind(&schema.description)
        .bind(schema.valid_from)
        .bind(schema.status.as_str())
        .bind(schema.created_at)
        .bind(schema.updated_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_schema", e))?;
        Ok(())
    }

    async fn find_schema(&self, id: SchemaId) -> Result<Option<CertificationSchema>, StoreError> {
        let row = sqlx::query_as::<_, SchemaRow>("SELECT * FROM skema WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_schema", e))?;
        Ok(row.map(|r| r.0))
    }

    async fn list_schemas(&self) -> Result<Vec<CertificationSchema>, StoreError> {
        let rows = sqlx::query_as::<_, SchemaRow>("SELECT * FROM skema ORDER BY created_at ASC")
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_schemas", e))?;
        Ok(rows.into_iter().map(|r| r.0).collect())
    }

    async fn insert_unit(&self, unit: &CompetencyUnit) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO unit_kompetensi (id, id_skema, kode_unit, judul_unit, deskripsi, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(unit.id.as_uuid())
        .bind(unit.schema_id.as_uuid())
        .bind(&unit.code)
        .bind(&unit.title)
        .bind(&unit.description)
        .bind(unit.created_at)
        .bind(unit.updated_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_unit", e))?;
        Ok(())
    }

    async fn list_units(&self, schema_id: SchemaId) -> Result<Vec<CompetencyUnit>, StoreError> {
        let rows = sqlx::query_as::<_, UnitRow>(
            "SELECT * FROM unit_kompetensi WHERE id_skema = $1 ORDER BY kode_unit ASC",
        )
        .bind(schema_id.as_uuid())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_units", e))?;
        Ok(rows.into_iter().map(|r| r.0).collect())
    }
}

#[async_trait]
impl AssessmentStore for PostgresStore {
    #[instrument(skip(self, assessment), fields(assessment_id = %assessment.id), err)]
    async fn insert_assessment(&self, assessment: &Assessment) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO asesmen (
                id, id_skema, id_asesi, id_asesor, tanggal_mulai, tanggal_selesai, tuk,
                status, hasil, catatan, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(assessment.id.as_uuid())
        .bind(opt_uuid(assessment.schema_id))
        .bind(opt_uuid(assessment.assessee_id))
        .bind(opt_uuid(assessment.assessor_id))
        .bind(assessment.started_at)
        .bind(assessment.finished_at)
        .bind(&assessment.venue)
        .bind(assessment.status.as_str())
        .bind(assessment.result.as_str())
        .bind(&assessment.notes)
        .bind(assessment.created_at)
        .bind(assessment.updated_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_assessment", e))?;
        Ok(())
    }

    #[instrument(skip(self, assessment), fields(assessment_id = %assessment.id), err)]
    async fn update_assessment(&self, assessment: &Assessment) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE asesmen
            SET tanggal_selesai = $2, status = $3, hasil = $4, catatan = $5, updated_at = $6
            WHERE id = $1
            "#,
        )
        .bind(assessment.id.as_uuid())
        .bind(assessment.finished_at)
        .bind(assessment.status.as_str())
        .bind(assessment.result.as_str())
        .bind(&assessment.notes)
        .bind(assessment.updated_at)
        .execute(&*self.pool)
        .await;
        expect_row("update_assessment", result)
    }

    async fn delete_assessment(&self, id: AssessmentId) -> Result<(), StoreError> {
        // Forms go with it through ON DELETE CASCADE.
        let result = sqlx::query("DELETE FROM asesmen WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&*self.pool)
            .await;
        expect_row("delete_assessment", result)
    }

    async fn find_assessment(&self, id: AssessmentId) -> Result<Option<Assessment>, StoreError> {
        let row = sqlx::query_as::<_, AssessmentRow>("SELECT * FROM asesmen WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_assessment", e))?;
        Ok(row.map(|r| r.0))
    }

    async fn list_assessments_by_assessee(&self, id: AssesseeId) -> Result<Vec<Assessment>, StoreError> {
        let rows = sqlx::query_as::<_, AssessmentRow>(
            "SELECT * FROM asesmen WHERE id_asesi = $1 ORDER BY created_at ASC",
        )
        .bind(id.as_uuid())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_assessments_by_assessee", e))?;
        Ok(rows.into_iter().map(|r| r.0).collect())
    }

    async fn list_assessments_by_assessor(&self, id: AssessorId) -> Result<Vec<Assessment>, StoreError> {
        let rows = sqlx::query_as::<_, AssessmentRow>(
            "SELECT * FROM asesmen WHERE id_asesor = $1 ORDER BY created_at ASC",
        )
        .bind(id.as_uuid())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_assessments_by_assessor", e))?;
        Ok(rows.into_iter().map(|r| r.0).collect())
    }
}

#[async_trait]
impl Apl01Store for PostgresStore {
    #[instrument(skip(self, form), fields(form_id = %form.id, assessment_id = %form.assessment_id), err)]
    async fn insert_apl01(&self, form: &FormApl01) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO form_apl01 (
                id, id_asesmen, nama_lengkap, no_ktp, tempat_lahir, tanggal_lahir, jenis_kelamin,
                kebangsaan, alamat, kode_pos, no_rumah, no_kantor, no_hp, email,
                kualifikasi_pendidikan, institusi, jabatan, alamat_kantor, kode_pos_kantor,
                telp_kantor, fax_kantor, email_kantor, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17,
                    $18, $19, $20, $21, $22, $23, $24)
            "#,
        )
        .bind(form.id.as_uuid())
        .bind(form.assessment_id.as_uuid())
        .bind(&form.full_name)
        .bind(&form.id_card_number)
        .bind(&form.birth_place)
        .bind(form.birth_date)
        .bind(form.gender.map(|g| g.as_str()))
        .bind(&form.nationality)
        .bind(&form.address)
        .bind(&form.postal_code)
        .bind(&form.home_phone)
        .bind(&form.office_phone)
        .bind(&form.mobile_phone)
        .bind(&form.email)
        .bind(&form.education)
        .bind(&form.institution)
        .bind(&form.position)
        .bind(&form.office_address)
        .bind(&form.office_postal_code)
        .bind(&form.office_tel)
        .bind(&form.office_fax)
        .bind(&form.office_email)
        .bind(form.created_at)
        .bind(form.updated_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| match map_sqlx_error("insert_apl01", e) {
            StoreError::Conflict(_) => {
                StoreError::Conflict("form APL01 already exists for this asesmen".to_string())
            }
            other => other,
        })?;
        Ok(())
    }

    #[instrument(skip(self, form), fields(form_id = %form.id), err)]
    async fn update_apl01(&self, form: &FormApl01) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE form_apl01
            SET nama_lengkap = $2, no_ktp = $3, tempat_lahir = $4, tanggal_lahir = $5,
                jenis_kelamin = $6, kebangsaan = $7, alamat = $8, kode_pos = $9, no_rumah = $10,
                no_kantor = $11, no_hp = $12, email = $13, kualifikasi_pendidikan = $14,
                institusi = $15, jabatan = $16, alamat_kantor = $17, kode_pos_kantor = $18,
                telp_kantor = $19, fax_kantor = $20, email_kantor = $21, updated_at = $22
            WHERE id = $1
            "#,
        )
        .bind(form.id.as_uuid())
        .bind(&form.full_name)
        .bind(&form.id_card_number)
        .bind(&form.birth_place)
        .bind(form.birth_date)
        .bind(form.gender.map(|g| g.as_str()))
        .bind(&form.nationality)
        .bind(&form.address)
        .bind(&form.postal_code)
        .bind(&form.home_phone)
        .bind(&form.office_phone)
        .bind(&form.mobile_phone)
        .bind(&form.email)
        .bind(&form.education)
        .bind(&form.institution)
        .bind(&form.position)
        .bind(&form.office_address)
        .bind(&form.office_postal_code)
        .bind(&form.office_tel)
        .bind(&form.office_fax)
        .bind(&form.office_email)
        .bind(form.updated_at)
        .execute(&*self.pool)
        .await;
        expect_row("update_apl01", result)
    }

    async fn delete_apl01(&self, id: FormApl01Id) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM form_apl01 WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&*self.pool)
            .await;
        expect_row("delete_apl01", result)
    }

    async fn find_apl01(&self, id: FormApl01Id) -> Result<Option<FormApl01>, StoreError> {
        let row = sqlx::query_as::<_, Apl01Row>("SELECT * FROM form_apl01 WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_apl01", e))?;
        Ok(row.map(|r| r.0))
    }

    async fn find_apl01_by_assessment(&self, id: AssessmentId) -> Result<Option<FormApl01>, StoreError> {
        let row = sqlx::query_as::<_, Apl01Row>("SELECT * FROM form_apl01 WHERE id_asesmen = $1")
            .bind(id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_apl01_by_assessment", e))?;
        Ok(row.map(|r| r.0))
    }

    async fn list_apl01_by_assessee(&self, id: AssesseeId) -> Result<Vec<FormApl01>, StoreError> {
        let rows = sqlx::query_as::<_, Apl01Row>(
            r#"
            SELECT f.*
            FROM form_apl01 f
            JOIN asesmen a ON a.id = f.id_asesmen
            WHERE a.id_asesi = $1
            ORDER BY f.created_at ASC
            "#,
        )
        .bind(id.as_uuid())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_apl01_by_assessee", e))?;
        Ok(rows.into_iter().map(|r| r.0).collect())
    }
}

#[async_trait]
impl Apl02Store for PostgresStore {
    #[instrument(skip(self, form), fields(form_id = %form.id, assessment_id = %form.assessment_id), err)]
    async fn insert_apl02(&self, form: &FormApl02) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO form_apl02 (
                id, id_asesmen, kode_unit, judul_unit, elemen, kuk, status, bukti,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(form.id.as_uuid())
        .bind(form.assessment_id.as_uuid())
        .bind(&form.unit_code)
        .bind(&form.unit_title)
        .bind(&form.element)
        .bind(&form.criteria)
        .bind(form.status.as_str())
        .bind(&form.evidence)
        .bind(form.created_at)
        .bind(form.updated_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_apl02", e))?;
        Ok(())
    }

    #[instrument(skip(self, form), fields(form_id = %form.id), err)]
    async fn update_apl02(&self, form: &FormApl02) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE form_apl02
            SET kode_unit = $2, judul_unit = $3, elemen = $4, kuk = $5, status = $6, bukti = $7,
                updated_at = $8
            WHERE id = $1
            "#,
        )
        .bind(form.id.as_uuid())
        .bind(&form.unit_code)
        .bind(&form.unit_title)
        .bind(&form.element)
        .bind(&form.criteria)
        .bind(form.status.as_str())
        .bind(&form.evidence)
        .bind(form.updated_at)
        .execute(&*self.pool)
        .await;
        expect_row("update_apl02", result)
    }

    async fn delete_apl02(&self, id: FormApl02Id) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM form_apl02 WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&*self.pool)
            .await;
        expect_row("delete_apl02", result)
    }

    async fn find_apl02(&self, id: FormApl02Id) -> Result<Option<FormApl02>, StoreError> {
        let row = sqlx::query_as::<_, Apl02Row>("SELECT * FROM form_apl02 WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_apl02", e))?;
        Ok(row.map(|r| r.0))
    }

    async fn list_apl02_by_assessment(&self, id: AssessmentId) -> Result<Vec<FormApl02>, StoreError> {
        let rows = sqlx::query_as::<_, Apl02Row>(
            "SELECT * FROM form_apl02 WHERE id_asesmen = $1 ORDER BY created_at ASC",
        )
        .bind(id.as_uuid())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_apl02_by_assessment", e))?;
        Ok(rows.into_iter().map(|r| r.0).collect())
    }

    async fn list_apl02_by_assessee(&self, id: AssesseeId) -> Result<Vec<FormApl02>, StoreError> {
        let rows = sqlx::query_as::<_, Apl02Row>(
            r#"
            SELECT f.*
            FROM form_apl02 f
            JOIN asesmen a ON a.id = f.id_asesmen
            WHERE a.id_asesi = $1
            ORDER BY f.created_at ASC
            "#,
        )
        .bind(id.as_uuid())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_apl02_by_assessee", e))?;
        Ok(rows.into_iter().map(|r| r.0).collect())
    }
}

#[cfg(test)]
mod tests {
    use std::borrow::Cow;
    use std::error::Error as StdError;

    use sqlx::error::{DatabaseError, ErrorKind};
    use sqlx::postgres::PgQueryResult;

    use super::*;

    /// Stand-in for a server-side error with a SQLSTATE code.
    #[derive(Debug)]
    struct PgFailure {
        code: &'static str,
        constraint: Option<&'static str>,
    }

    impl std::fmt::Display for PgFailure {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "sqlstate {}", self.code)
        }
    }

    impl StdError for PgFailure {}

    impl DatabaseError for PgFailure {
        fn message(&self) -> &str {
            "duplicate key value"
        }

        fn code(&self) -> Option<Cow<'_, str>> {
            Some(Cow::Borrowed(self.code))
        }

        fn constraint(&self) -> Option<&str> {
            self.constraint
        }

        fn as_error(&self) -> &(dyn StdError + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn StdError + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn StdError + Send + Sync + 'static> {
            self
        }

        fn kind(&self) -> ErrorKind {
            match self.code {
                "23505" => ErrorKind::UniqueViolation,
                _ => ErrorKind::Other,
            }
        }
    }

    fn db_error(code: &'static str, constraint: Option<&'static str>) -> sqlx::Error {
        sqlx::Error::Database(Box::new(PgFailure { code, constraint }))
    }

    #[test]
    fn unique_violation_maps_to_conflict() {
        let err = map_sqlx_error("insert_user", db_error("23505", Some("users_email_key")));
        assert_eq!(err, StoreError::Conflict("duplicate value violates users_email_key".to_string()));

        let err = map_sqlx_error("insert_user", db_error("23505", None));
        assert!(matches!(err, StoreError::Conflict(ref m) if m.contains("insert_user")));
    }

    #[test]
    fn other_failures_map_to_backend() {
        assert!(matches!(
            map_sqlx_error("insert_assessment", db_error("23503", None)),
            StoreError::Backend(_)
        ));
        assert!(matches!(
            map_sqlx_error("find_user", sqlx::Error::PoolClosed),
            StoreError::Backend(ref m) if m.contains("pool closed")
        ));
        assert!(matches!(
            map_sqlx_error("find_user", sqlx::Error::RowNotFound),
            StoreError::Backend(_)
        ));
    }

    #[test]
    fn zero_rows_affected_is_not_found() {
        assert_eq!(
            expect_row("update_user", Ok(PgQueryResult::default())),
            Err(StoreError::NotFound)
        );
        assert!(matches!(
            expect_row("update_user", Err(db_error("23505", None))),
            Err(StoreError::Conflict(_))
        ));
    }

    #[test]
    fn bad_enum_text_is_a_decode_error() {
        let err = decode_err(DomainError::validation("unknown role: Guru"));
        assert!(matches!(err, sqlx::Error::Decode(_)));
    }
}
