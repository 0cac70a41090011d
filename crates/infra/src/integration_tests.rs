//! Integration tests for the Postgres store.
//!
//! Tests: schema migration → row encoding → row decoding → constraint mapping
//!
//! Verifies:
//! - Rows round-trip through the `*Row` decoders
//! - Unique constraints surface as `StoreError::Conflict`
//! - Assessee-scoped form listings only return that assessee's rows
//! - `ON DELETE SET NULL` unlinks assessments from a removed assessor
//!
//! These need a live database and run with
//! `DATABASE_URL=postgres://... cargo test -p lsp-infra -- --ignored`.

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use lsp_assessment::{
        Assessee, Assessment, Assessor, CertificationSchema, NewAssessment, NewAssessor, NewSchema,
        SchemaKind, SchemaStatus,
    };
    use lsp_auth::{Role, User};
    use lsp_forms::{Apl01Fields, Apl02Status, FormApl01, FormApl02, NewApl02};

    use crate::store::{
        Apl01Store, Apl02Store, AssesseeStore, AssessmentStore, AssessorStore, CatalogStore,
        PostgresStore, StoreError, UserStore,
    };

    async fn store() -> PostgresStore {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for --ignored tests");
        let store = PostgresStore::connect(&url).await.expect("connect");
        store.migrate().await.expect("migrate");
        store
    }

    /// Suffix keeping unique columns distinct across runs against one database.
    fn tag() -> String {
        let id = Uuid::now_v7().simple().to_string();
        id[id.len() - 12..].to_string()
    }

    async fn user(store: &PostgresStore, role: Role) -> User {
        let t = tag();
        let user = User::new(format!("user-{t}"), format!("{t}@lsp.test"), "$argon2id$stub", role, Utc::now());
        store.insert_user(&user).await.expect("insert user");
        user
    }

    async fn assessee(store: &PostgresStore) -> Assessee {
        let user = user(store, Role::Assessee).await;
        let assessee = Assessee::new(user.id, "Budi Santoso", user.email.clone(), Utc::now());
        store.insert_assessee(&assessee).await.expect("insert assessee");
        assessee
    }

    async fn assessor(store: &PostgresStore) -> Assessor {
        let user = user(store, Role::Assessor).await;
        let input = NewAssessor {
            full_name: "Siti Rahma".to_string(),
            registration_number: format!("MET.{}", tag()),
            email: user.email.clone(),
            phone: "0812".to_string(),
            username: None,
            password: "unused".to_string(),
            competency_ids: Vec::new(),
        };
        let assessor = Assessor::new(user.id, &input, vec!["K-01".to_string()], Utc::now());
        store.insert_assessor(&assessor).await.expect("insert assessor");
        assessor
    }

    async fn assessment(store: &PostgresStore, assessee: &Assessee, assessor: &Assessor) -> Assessment {
        let schema = CertificationSchema::new(
            NewSchema {
                title: "Junior Web Developer".to_string(),
                number: format!("SKM-{}", tag()),
                kind: SchemaKind::Kkni,
                description: String::new(),
                valid_from: None,
                status: SchemaStatus::Active,
            },
            Utc::now(),
        )
        .expect("valid schema");
        store.insert_schema(&schema).await.expect("insert schema");

        let assessment = Assessment::new(
            NewAssessment {
                assessee_id: assessee.id,
                assessor_id: assessor.id,
                schema_id: schema.id,
                venue: "TUK Sewaktu".to_string(),
            },
            Utc::now(),
        );
        store.insert_assessment(&assessment).await.expect("insert assessment");
        assessment
    }

    fn apl02(assessment: &Assessment, unit_code: &str, status: Apl02Status) -> FormApl02 {
        FormApl02::new(
            NewApl02 {
                assessment_id: Some(assessment.id),
                unit_code: Some(unit_code.to_string()),
                unit_title: Some("Menggunakan Struktur Data".to_string()),
                element: Some("Mengidentifikasi konsep data".to_string()),
                criteria: Some("Konsep data diidentifikasi".to_string()),
                status: Some(status),
                evidence: Some("portofolio.pdf".to_string()),
            },
            Utc::now(),
        )
        .expect("valid apl02")
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL"]
    async fn user_rows_round_trip() {
        let store = store().await;
        let user = user(&store, Role::Assessor).await;

        let by_email = store.find_user_by_email(&user.email).await.unwrap().expect("by email");
        assert_eq!(by_email.id, user.id);
        assert_eq!(by_email.role, Role::Assessor);
        assert_eq!(by_email.username, user.username);

        let by_name = store.find_user_by_username(&user.username).await.unwrap().expect("by username");
        assert_eq!(by_name.id, user.id);
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL"]
    async fn duplicate_email_is_conflict() {
        let store = store().await;
        let first = user(&store, Role::Assessee).await;

        let clash = User::new(format!("other-{}", tag()), first.email.clone(), "$argon2id$stub", Role::Assessee, Utc::now());
        assert!(matches!(store.insert_user(&clash).await, Err(StoreError::Conflict(_))));
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL"]
    async fn second_apl01_for_an_assessment_is_conflict() {
        let store = store().await;
        let (asesi, asesor) = (assessee(&store).await, assessor(&store).await);
        let assessment = assessment(&store, &asesi, &asesor).await;

        let form = FormApl01::new(assessment.id, Apl01Fields::default(), Utc::now());
        store.insert_apl01(&form).await.expect("first apl01");

        let found = store.find_apl01_by_assessment(assessment.id).await.unwrap().expect("stored");
        assert_eq!(found.id, form.id);

        let again = FormApl01::new(assessment.id, Apl01Fields::default(), Utc::now());
        assert!(matches!(store.insert_apl01(&again).await, Err(StoreError::Conflict(_))));
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL"]
    async fn assessee_listings_only_see_own_forms() {
        let store = store().await;
        let asesor = assessor(&store).await;
        let (mine, theirs) = (assessee(&store).await, assessee(&store).await);
        let my_assessment = assessment(&store, &mine, &asesor).await;
        let their_assessment = assessment(&store, &theirs, &asesor).await;

        let k = format!("J.{}", tag());
        let bk = format!("J.{}", tag());
        store.insert_apl02(&apl02(&my_assessment, &k, Apl02Status::K)).await.unwrap();
        store.insert_apl02(&apl02(&their_assessment, &bk, Apl02Status::Bk)).await.unwrap();
        store
            .insert_apl01(&FormApl01::new(their_assessment.id, Apl01Fields::default(), Utc::now()))
            .await
            .unwrap();

        let forms = store.list_apl02_by_assessee(mine.id).await.unwrap();
        assert_eq!(forms.len(), 1);
        assert_eq!(forms[0].unit_code, k);
        assert_eq!(forms[0].status, Apl02Status::K);

        assert!(store.list_apl01_by_assessee(mine.id).await.unwrap().is_empty());
        assert_eq!(store.list_apl01_by_assessee(theirs.id).await.unwrap().len(), 1);

        let listed = store.list_assessments_by_assessee(mine.id).await.unwrap();
        assert_eq!(listed.iter().map(|a| a.id).collect::<Vec<_>>(), vec![my_assessment.id]);
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL"]
    async fn updating_a_missing_row_is_not_found() {
        let store = store().await;
        let ghost = User::new(format!("ghost-{}", tag()), format!("{}@lsp.test", tag()), "x", Role::Admin, Utc::now());

        assert_eq!(store.update_user(&ghost).await, Err(StoreError::NotFound));
        assert_eq!(store.delete_user(ghost.id).await, Err(StoreError::NotFound));
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL"]
    async fn deleting_assessor_keeps_assessments_unlinked() {
        let store = store().await;
        let (asesi, asesor) = (assessee(&store).await, assessor(&store).await);
        let assessment = assessment(&store, &asesi, &asesor).await;

        store.delete_assessor(asesor.id).await.unwrap();

        let kept = store.find_assessment(assessment.id).await.unwrap().expect("assessment survives");
        assert_eq!(kept.assessor_id, None);
        assert_eq!(kept.assessee_id, Some(asesi.id));
        assert_eq!(store.find_assessor(asesor.id).await.unwrap(), None);
    }
}
