//! Competency catalog and certification schemas.
//!
//! Admins write; every authenticated caller may read.

use chrono::Utc;
use tracing::{info, instrument};

use lsp_assessment::{
    CertificationSchema, Competency, CompetencyUnit, NewCompetency, NewSchema, NewUnit,
};
use lsp_auth::{Principal, Role, require_role};
use lsp_core::SchemaId;

use super::{Found, ServiceError};
use crate::store::Stores;

#[derive(Clone)]
pub struct CatalogService {
    stores: Stores,
}

impl CatalogService {
    pub fn new(stores: Stores) -> Self {
        Self { stores }
    }

    #[instrument(skip(self, principal, input), fields(kode = %input.code))]
    pub async fn create_competency(&self, principal: &Principal, input: NewCompetency) -> Result<Competency, ServiceError> {
        require_role(principal, &[Role::Admin])?;
        let competency = Competency::new(input, Utc::now())?;
        self.stores.catalog.insert_competency(&competency).await?;
        info!(competency_id = %competency.id, "competency created");
        Ok(competency)
    }

    pub async fn list_competencies(&self) -> Result<Vec<Competency>, ServiceError> {
        Ok(self.stores.catalog.list_competencies().await?)
    }

    #[instrument(skip(self, principal, input), fields(nomor_skema = %input.number))]
    pub async fn create_schema(&self, principal: &Principal, input: NewSchema) -> Result<CertificationSchema, ServiceError> {
        require_role(principal, &[Role::Admin])?;
        let schema = CertificationSchema::new(input, Utc::now())?;
        self.stores.catalog.insert_schema(&schema).await?;
        info!(schema_id = %schema.id, "schema created");
        Ok(schema)
    }

    pub async fn get_schema(&self, id: SchemaId) -> Result<CertificationSchema, ServiceError> {
        self.stores.catalog.find_schema(id).await.or_not_found("skema")
    }

    pub async fn list_schemas(&self) -> Result<Vec<CertificationSchema>, ServiceError> {
        Ok(self.stores.catalog.list_schemas().await?)
    }

    #[instrument(skip(self, principal, input), fields(kode_unit = %input.code))]
    pub async fn create_unit(
        &self,
        principal: &Principal,
        schema_id: SchemaId,
        input: NewUnit,
    ) -> Result<CompetencyUnit, ServiceError> {
        require_role(principal, &[Role::Admin])?;
        self.get_schema(schema_id).await?;
        let unit = CompetencyUnit::new(schema_id, input, Utc::now())?;
        self.stores.catalog.insert_unit(&unit).await?;
        info!(unit_id = %unit.id, schema_id = %schema_id, "competency unit created");
        Ok(unit)
    }

    pub async fn list_units(&self, schema_id: SchemaId) -> Result<Vec<CompetencyUnit>, ServiceError> {
        self.get_schema(schema_id).await?;
        Ok(self.stores.catalog.list_units(schema_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing;
    use lsp_assessment::{SchemaKind, SchemaStatus};

    fn new_schema(number: &str) -> NewSchema {
        NewSchema {
            title: "Junior Web Developer".to_string(),
            number: number.to_string(),
            kind: SchemaKind::Kkni,
            description: String::new(),
            valid_from: None,
            status: SchemaStatus::Active,
        }
    }

    fn new_unit(code: &str) -> NewUnit {
        NewUnit {
            code: code.to_string(),
            title: "Menggunakan Struktur Data".to_string(),
            description: String::new(),
        }
    }

    #[tokio::test]
    async fn units_belong_to_existing_schema() {
        let (services, _) = testing::services();
        let admin = testing::admin();
        let schema = services.catalog.create_schema(&admin, new_schema("SKM/001")).await.unwrap();

        services
            .catalog
            .create_unit(&admin, schema.id, new_unit("J.620100.004.02"))
            .await
            .unwrap();
        let units = services.catalog.list_units(schema.id).await.unwrap();
        assert_eq!(units.len(), 1);
        assert_eq!(units[0].schema_id, schema.id);

        assert!(matches!(
            services.catalog.create_unit(&admin, SchemaId::new(), new_unit("X.1")).await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn duplicate_schema_number_conflicts() {
        let (services, _) = testing::services();
        let admin = testing::admin();
        services.catalog.create_schema(&admin, new_schema("SKM/002")).await.unwrap();
        assert!(matches!(
            services.catalog.create_schema(&admin, new_schema("SKM/002")).await,
            Err(ServiceError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn non_admin_cannot_write() {
        let (services, _) = testing::services();
        assert!(matches!(
            services.catalog.create_schema(&testing::assessor(), new_schema("SKM/003")).await,
            Err(ServiceError::Forbidden(_))
        ));
        assert!(services.catalog.list_schemas().await.unwrap().is_empty());
    }
}
