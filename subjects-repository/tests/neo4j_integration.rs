//! Integration tests for the Neo4j subject repositories.
//!
//! These tests require a running Neo4j instance reachable through `NEO4J_URI`
//! (plus `NEO4J_USER` / `NEO4J_PASSWORD`). Each test works in its own scope so
//! tests can share one database.
//!
//! Run with: `cargo test --test neo4j_integration -- --ignored --test-threads=1`

use std::env;
use std::sync::Arc;

use subjects_repository::neo4j::{
    self, Neo4jAdminRepository, Neo4jRelationRepository, Neo4jSubjectRepository,
};
use subjects_repository::{
    AdminRepository, ErrorKind, GraphQueryEngine, RelationStore, SubjectStore, SubjectStoreConfig,
};
use subjects_shared::{Scope, SubjectId, SubjectLookup};
use uuid::Uuid;

fn graph() -> neo4rs::Graph {
    dotenv::dotenv().ok();
    let uri = env::var("NEO4J_URI").unwrap_or_else(|_| "bolt://localhost:7687".to_string());
    let user = env::var("NEO4J_USER").unwrap_or_else(|_| "neo4j".to_string());
    let password = env::var("NEO4J_PASSWORD").unwrap_or_default();
    neo4j::connect(&uri, &user, &password).unwrap()
}

fn fresh_scope() -> Scope {
    Scope::new(format!("test-{}", Uuid::new_v4()))
}

async fn setup(config: SubjectStoreConfig) -> (Neo4jSubjectRepository, Neo4jRelationRepository) {
    let graph = graph();
    Neo4jAdminRepository::new(graph.clone())
        .ensure_schema()
        .await
        .unwrap();
    (
        Neo4jSubjectRepository::new(graph.clone(), config),
        Neo4jRelationRepository::new(graph),
    )
}

#[tokio::test]
#[ignore = "requires a Neo4j instance"]
async fn test_create_and_fetch_subject() {
    let (subjects, _) = setup(SubjectStoreConfig::strict()).await;
    let scope = fresh_scope();

    let created = subjects.create_subject("Physics", Some(&scope)).await.unwrap();
    assert_eq!(created.scope, Some(scope.clone()));

    let by_id = subjects
        .fetch_subject_by_id(&created.id, Some(&scope))
        .await
        .unwrap();
    let by_name = subjects
        .fetch_subject_by_name("Physics", Some(&scope))
        .await
        .unwrap();
    assert_eq!(by_id, created);
    assert_eq!(by_name, created);

    let err = subjects
        .fetch_subject_by_id(&SubjectId::new("not-an-element-id"), Some(&scope))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
#[ignore = "requires a Neo4j instance"]
async fn test_strict_and_merge_policies() {
    let (strict, _) = setup(SubjectStoreConfig::strict()).await;
    let (merge, _) = setup(SubjectStoreConfig::merge()).await;
    let scope = fresh_scope();

    let first = strict.create_subject("Physics", Some(&scope)).await.unwrap();
    let err = strict
        .create_subject("Physics", Some(&scope))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);

    let merged = merge.create_subject("Physics", Some(&scope)).await.unwrap();
    assert_eq!(merged, first);
}

#[tokio::test]
#[ignore = "requires a Neo4j instance"]
async fn test_relation_lifecycle() {
    let (subjects, relations) = setup(SubjectStoreConfig::strict()).await;
    let scope = fresh_scope();
    let physics = subjects.create_subject("Physics", Some(&scope)).await.unwrap();
    let maths = subjects
        .create_subject("Mathematics", Some(&scope))
        .await
        .unwrap();

    let relation = relations
        .create_relation(&physics.id, &maths.id, Some(&scope))
        .await
        .unwrap();
    assert!(relation.id.is_none());

    let err = relations
        .create_relation(&physics.id, &maths.id, Some(&scope))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);

    let err = relations
        .create_relation(&physics.id, &physics.id, Some(&scope))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    let err = relations
        .create_relation(&physics.id, &maths.id, Some(&fresh_scope()))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let engine = GraphQueryEngine::new(Arc::new(subjects), Arc::new(relations));
    let view = engine
        .get_with_relations(&SubjectLookup::from(&maths.id), Some(&scope))
        .await
        .unwrap();
    assert!(view.related_to.is_empty());
    assert_eq!(view.related_from, vec![physics.id]);
}

#[tokio::test]
#[ignore = "requires a Neo4j instance"]
async fn test_reset_all() {
    let (subjects, relations) = setup(SubjectStoreConfig::strict()).await;
    let admin = Neo4jAdminRepository::new(graph());
    let scope = fresh_scope();

    let a = subjects.create_subject("A", Some(&scope)).await.unwrap();
    let b = subjects.create_subject("B", Some(&scope)).await.unwrap();
    relations
        .create_relation(&a.id, &b.id, Some(&scope))
        .await
        .unwrap();

    admin.reset_all().await.unwrap();
    admin.reset_all().await.unwrap();

    let err = subjects
        .fetch_subject_by_name("A", Some(&scope))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert!(relations
        .related_from(&b.id, Some(&scope))
        .await
        .unwrap()
        .is_empty());
}
