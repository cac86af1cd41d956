//! Cross-layer tests for the Scammer crate
//!
//! Everything runs against the in-memory document store.

#[cfg(test)]
mod support {
    use std::sync::Arc;

    use platform::document::MemoryDocumentStore;
    use serde_json::{Value, json};

    use crate::domain::entities::ScammerCandidate;
    use crate::infra::document::DocumentScammerRepository;

    pub type Repo = DocumentScammerRepository<MemoryDocumentStore>;

    pub fn repo() -> (Arc<MemoryDocumentStore>, Arc<Repo>) {
        let store = Arc::new(MemoryDocumentStore::new());
        let repo = Arc::new(DocumentScammerRepository::new(store.clone()));
        (store, repo)
    }

    pub fn body(email: &str, status: &str, threat_level: u8) -> Value {
        json!({
            "email": email,
            "phoneNumbers": ["+1234567890"],
            "scamTypes": ["phishing", "investment"],
            "status": status,
            "threatLevel": threat_level,
            "reportedLocations": [{
                "country": "United States",
                "city": "New York",
                "coordinates": {"type": "Point", "coordinates": [-73.935242, 40.730610]},
            }],
        })
    }

    pub fn candidate(email: &str, status: &str, threat_level: u8) -> ScammerCandidate {
        serde_json::from_value(body(email, status, threat_level)).unwrap()
    }
}

#[cfg(test)]
mod store_tests {
    use platform::document::DocumentStore;
    use serde_json::json;

    use super::support::*;
    use crate::application::PrepareScammerStoreUseCase;
    use crate::domain::index_plan::SCAMMERS_COLLECTION;
    use crate::error::ScammerError;

    #[tokio::test]
    async fn test_prepare_twice_is_idempotent() {
        let (store, repo) = repo();
        let prepare = PrepareScammerStoreUseCase::new(repo.clone());

        let first = prepare.execute().await.unwrap();
        let second = prepare.execute().await.unwrap();
        assert_eq!(first.indexes, second.indexes);
        assert_eq!(first.indexes.len(), 7);

        let indexes = DocumentStore::list_indexes(store.as_ref(), SCAMMERS_COLLECTION)
            .await
            .unwrap();
        assert_eq!(indexes.len(), 7);
        let unique: Vec<String> = indexes
            .iter()
            .filter(|i| i.is_unique())
            .map(|i| i.name())
            .collect();
        assert_eq!(unique, vec!["email_1"]);
    }

    #[tokio::test]
    async fn test_prepare_prunes_records_without_email() {
        let (store, repo) = repo();
        for doc in [
            json!({"threatLevel": 1}),
            json!({"email": null, "threatLevel": 2}),
            json!({"email": "kept@example.com", "threatLevel": 3}),
        ] {
            DocumentStore::insert_one(store.as_ref(), SCAMMERS_COLLECTION, doc)
                .await
                .unwrap();
        }

        let report = PrepareScammerStoreUseCase::new(repo.clone())
            .execute()
            .await
            .unwrap();
        assert_eq!(report.pruned, 2);

        let remaining = DocumentStore::find(
            store.as_ref(),
            SCAMMERS_COLLECTION,
            &platform::document::Filter::All,
            &Default::default(),
        )
        .await
        .unwrap();
        assert_eq!(remaining.len(), 1);
    }

    #[tokio::test]
    async fn test_prepare_fails_over_duplicate_emails() {
        let (store, repo) = repo();
        for _ in 0..2 {
            DocumentStore::insert_one(
                store.as_ref(),
                SCAMMERS_COLLECTION,
                json!({"email": "dup@example.com"}),
            )
            .await
            .unwrap();
        }

        let err = PrepareScammerStoreUseCase::new(repo.clone())
            .execute()
            .await
            .unwrap_err();
        assert!(matches!(err, ScammerError::Store(ref e) if e.is_duplicate_key()));
    }
}

#[cfg(test)]
mod use_case_tests {
    use std::sync::Arc;

    use super::support::*;
    use crate::application::{
        CreateScammerUseCase, GetScammerUseCase, ListScammersInput, ListScammersUseCase,
        PrepareScammerStoreUseCase, ScammerConfig, UpdateScammerUseCase,
    };
    use crate::domain::value_objects::ScammerStatus;
    use crate::error::ScammerError;

    async fn prepared() -> Arc<Repo> {
        let (_, repo) = repo();
        PrepareScammerStoreUseCase::new(repo.clone())
            .execute()
            .await
            .unwrap();
        repo
    }

    #[tokio::test]
    async fn test_create_then_get() {
        let repo = prepared().await;
        let id = CreateScammerUseCase::new(repo.clone())
            .execute(candidate("scammer@example.com", "active", 4))
            .await
            .unwrap();

        let record = GetScammerUseCase::new(repo.clone())
            .execute(&id.to_string())
            .await
            .unwrap();
        assert_eq!(record.id, Some(id.to_string()));
        assert_eq!(record.email, "scammer@example.com");
        assert_eq!(record.status, ScammerStatus::Active);
        assert_eq!(record.reported_locations[0].city.as_deref(), Some("New York"));
    }

    #[tokio::test]
    async fn test_create_duplicate_email() {
        let repo = prepared().await;
        let create = CreateScammerUseCase::new(repo.clone());
        create
            .execute(candidate("scammer@example.com", "active", 4))
            .await
            .unwrap();

        let err = create
            .execute(candidate("SCAMMER@example.com", "blocked", 2))
            .await
            .unwrap_err();
        assert!(matches!(err, ScammerError::DuplicateEmail));
    }

    #[tokio::test]
    async fn test_create_invalid_reports_every_field() {
        let repo = prepared().await;
        let mut input = candidate("scammer@example.com", "active", 4);
        input.threat_level = None;
        input.status = Some(serde_json::json!("unknown"));

        let err = CreateScammerUseCase::new(repo.clone())
            .execute(input)
            .await
            .unwrap_err();
        let ScammerError::Validation(errors) = err else {
            panic!("expected validation error");
        };
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["status", "threatLevel"]);
    }

    #[tokio::test]
    async fn test_get_bad_and_unknown_ids() {
        let repo = prepared().await;
        let get = GetScammerUseCase::new(repo.clone());

        assert!(matches!(
            get.execute("not-a-uuid").await.unwrap_err(),
            ScammerError::InvalidId(_)
        ));
        assert!(matches!(
            get.execute(&uuid::Uuid::new_v4().to_string()).await.unwrap_err(),
            ScammerError::NotFound
        ));
    }

    #[tokio::test]
    async fn test_update_keeps_first_reported() {
        let repo = prepared().await;
        let id = CreateScammerUseCase::new(repo.clone())
            .execute(candidate("scammer@example.com", "under_investigation", 2))
            .await
            .unwrap();
        let before = GetScammerUseCase::new(repo.clone())
            .execute(&id.to_string())
            .await
            .unwrap();

        let updated = UpdateScammerUseCase::new(repo.clone())
            .execute(&id.to_string(), candidate("scammer@example.com", "confirmed", 5))
            .await
            .unwrap();
        assert_eq!(updated.first_reported, before.first_reported);
        assert!(updated.last_updated >= before.last_updated);

        let after = GetScammerUseCase::new(repo.clone())
            .execute(&id.to_string())
            .await
            .unwrap();
        assert_eq!(after.status, ScammerStatus::Confirmed);
        assert_eq!(after.threat_level, 5);
        assert_eq!(after.first_reported, before.first_reported);
    }

    #[tokio::test]
    async fn test_update_errors() {
        let repo = prepared().await;
        let create = CreateScammerUseCase::new(repo.clone());
        create
            .execute(candidate("first@example.com", "active", 1))
            .await
            .unwrap();
        let second = create
            .execute(candidate("second@example.com", "active", 1))
            .await
            .unwrap();

        let update = UpdateScammerUseCase::new(repo.clone());
        let err = update
            .execute(&uuid::Uuid::new_v4().to_string(), candidate("x@example.com", "active", 1))
            .await
            .unwrap_err();
        assert!(matches!(err, ScammerError::NotFound));

        let err = update
            .execute(&second.to_string(), candidate("first@example.com", "active", 1))
            .await
            .unwrap_err();
        assert!(matches!(err, ScammerError::DuplicateEmail));
    }

    #[tokio::test]
    async fn test_list_filters_sort_and_limit() {
        let repo = prepared().await;
        let create = CreateScammerUseCase::new(repo.clone());
        create.execute(candidate("a@example.com", "active", 2)).await.unwrap();
        create.execute(candidate("b@example.com", "active", 5)).await.unwrap();
        create.execute(candidate("c@example.com", "blocked", 3)).await.unwrap();

        let list = ListScammersUseCase::new(repo.clone(), Arc::new(ScammerConfig::default()));

        let all = list.execute(ListScammersInput::default()).await.unwrap();
        let order: Vec<&str> = all.iter().map(|r| r.email.as_str()).collect();
        assert_eq!(order, vec!["b@example.com", "a@example.com", "c@example.com"]);

        let active = list
            .execute(ListScammersInput {
                status: Some("active".to_string()),
                limit: Some(1),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].email, "b@example.com");

        let by_country = list
            .execute(ListScammersInput {
                country: Some("United States".to_string()),
                scam_type: Some("investment".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(by_country.len(), 3);

        let none = list
            .execute(ListScammersInput {
                scam_type: Some("romance".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_list_rejects_bad_parameters() {
        let repo = prepared().await;
        let list = ListScammersUseCase::new(repo.clone(), Arc::new(ScammerConfig::default()));

        let err = list
            .execute(ListScammersInput {
                status: Some("wanted".to_string()),
                sort: Some("oldest".to_string()),
                limit: Some(0),
                ..Default::default()
            })
            .await
            .unwrap_err();
        let ScammerError::Validation(errors) = err else {
            panic!("expected validation error");
        };
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["status", "sort", "limit"]);
    }
}

#[cfg(test)]
mod error_tests {
    use axum::body::to_bytes;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use platform::document::DocumentStoreError;

    use crate::domain::entities::ValidationError;
    use crate::error::ScammerError;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ScammerError::Validation(vec![]).status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(ScammerError::NotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            ScammerError::InvalidId("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ScammerError::DuplicateEmail.status_code(), StatusCode::CONFLICT);
        assert_eq!(
            ScammerError::Store(DocumentStoreError::Unavailable("down".into())).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ScammerError::Internal("boom".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_validation_body_lists_fields() {
        let response = ScammerError::Validation(vec![
            ValidationError::new("threatLevel", "Field required"),
            ValidationError::new(
                "reportedLocations[0].coordinates.coordinates",
                "Longitude must be between -180 and 180",
            ),
        ])
        .into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        let errors = body["details"]["errors"].as_array().unwrap();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0]["field"], "threatLevel");
        assert_eq!(
            errors[1]["field"],
            "reportedLocations[0].coordinates.coordinates"
        );
    }
}

#[cfg(test)]
mod router_tests {
    use std::sync::Arc;

    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use serde_json::Value;
    use tower::ServiceExt;

    use super::support::*;
    use crate::application::{PrepareScammerStoreUseCase, ScammerConfig};
    use crate::presentation::router::scammer_router;

    async fn app() -> axum::Router {
        let (_, repo) = repo();
        PrepareScammerStoreUseCase::new(repo.clone())
            .execute()
            .await
            .unwrap();
        scammer_router(repo, Arc::new(ScammerConfig::default()))
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_create_get_update_list() {
        let app = app().await;

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/scammers/",
                body("scammer@example.com", "active", 4),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let id = body_json(response).await["id"].as_str().unwrap().to_string();

        let response = app
            .clone()
            .oneshot(
                Request::get(format!("/scammers/{}", id))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let record = body_json(response).await;
        assert_eq!(record["id"], id.as_str());
        assert_eq!(record["threatLevel"], 4);
        assert_eq!(record["scamTypes"][1], "investment");
        assert!(record["lastUpdated"].as_str().unwrap().ends_with('Z'));

        let response = app
            .clone()
            .oneshot(json_request(
                "PUT",
                &format!("/scammers/{}", id),
                body("scammer@example.com", "blocked", 5),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "blocked");

        let response = app
            .oneshot(
                Request::get("/scammers/?status=blocked&sort=recent")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_record_is_unprocessable() {
        let app = app().await;
        let response = app
            .oneshot(json_request(
                "POST",
                "/scammers/",
                serde_json::json!({
                    "email": "scammer@example.com",
                    "scamTypes": ["phishing"],
                    "reportedLocations": [{
                        "country": "US",
                        "coordinates": {"coordinates": [200, 10]},
                    }],
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = body_json(response).await;
        assert_eq!(body["details"]["errors"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_wrongly_typed_fields_are_listed_with_the_rest() {
        let app = app().await;
        let response = app
            .oneshot(json_request(
                "POST",
                "/scammers/",
                serde_json::json!({
                    "email": "scammer@example.com",
                    "scamTypes": ["phishing"],
                    "tags": "not-a-list",
                    "reportedLocations": [{
                        "country": "US",
                        "coordinates": {"type": "Point", "coordinates": [200, 10]},
                    }],
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body = body_json(response).await;
        let fields: Vec<&str> = body["details"]["errors"]
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["field"].as_str().unwrap())
            .collect();
        assert_eq!(
            fields,
            vec![
                "reportedLocations[0].coordinates.coordinates",
                "threatLevel",
                "tags",
            ]
        );
    }

    #[tokio::test]
    async fn test_unreadable_body_is_unprocessable() {
        let app = app().await;
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/scammers/")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from("{\"email\": "))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body = body_json(response).await;
        assert_eq!(body["details"]["errors"][0]["field"], "body");
    }

    #[tokio::test]
    async fn test_bad_and_unknown_ids() {
        let app = app().await;

        let response = app
            .clone()
            .oneshot(Request::get("/scammers/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = app
            .oneshot(
                Request::get(format!("/scammers/{}", uuid::Uuid::new_v4()))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_duplicate_email_conflict() {
        let app = app().await;
        for expected in [StatusCode::CREATED, StatusCode::CONFLICT] {
            let response = app
                .clone()
                .oneshot(json_request(
                    "POST",
                    "/scammers/",
                    body("dup@example.com", "active", 1),
                ))
                .await
                .unwrap();
            assert_eq!(response.status(), expected);
        }
    }
}
