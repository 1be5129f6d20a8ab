//! Integration tests for the repository against the Postgres document store.
//!
//! Tests: ItemRepository → PostgresDocumentStore → JSONB table
//!
//! These run only when `TEST_DATABASE_URL` is set, and it must point at a
//! reachable, disposable database: any setup failure fails the test. Every
//! test uses its own table.

#[cfg(test)]
mod tests {
    use serde_json::json;
    use sqlx::postgres::PgPoolOptions;

    use stockroom_core::{DomainError, ItemId};
    use stockroom_inventory::{ItemUpdate, NewItem};

    use crate::document_store::PostgresDocumentStore;
    use crate::repository::{ItemRepository, RepositoryError};

    async fn setup(collection: &str) -> Option<(ItemRepository<PostgresDocumentStore>, sqlx::PgPool)> {
        let Ok(url) = std::env::var("TEST_DATABASE_URL") else {
            return None;
        };
        let pool = PgPoolOptions::new()
            .max_connections(2)
            .connect(&url)
            .await
            .expect("TEST_DATABASE_URL is set but the database is unreachable");

        sqlx::query(&format!("DROP TABLE IF EXISTS {collection}"))
            .execute(&pool)
            .await
            .expect("failed to drop test table");

        let store = PostgresDocumentStore::new(pool.clone(), collection).expect("invalid test collection name");
        store.ensure_schema().await.expect("failed to create test table");
        Some((ItemRepository::new(store), pool))
    }

    fn new_item(name: &str, price: f64) -> NewItem {
        NewItem {
            name: name.to_string(),
            description: Some(format!("{name} description")),
            price,
            quantity: 1,
        }
    }

    #[tokio::test]
    async fn postgres_item_lifecycle() {
        let Some((repo, _pool)) = setup("it_items_lifecycle").await else {
            return;
        };

        let created = repo.insert(new_item("Widget", 10.0)).await.unwrap();
        assert_eq!(created.created_at, created.updated_at);

        let id = created.id.to_string();
        assert_eq!(repo.find_by_id(&id).await.unwrap(), created);

        let patch: ItemUpdate = serde_json::from_value(json!({"quantity": 4, "description": null})).unwrap();
        let updated = repo.update_by_id(&id, &patch).await.unwrap();
        assert_eq!(updated.quantity, 4);
        assert_eq!(updated.description, None);
        assert_eq!(updated.name, "Widget");
        assert!(updated.updated_at >= created.updated_at);

        assert!(repo.delete_by_id(&id).await.unwrap());
        let err = repo.find_by_id(&id).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Domain(DomainError::NotFound)));
        assert!(!repo.delete_by_id(&ItemId::new().to_string()).await.unwrap());
    }

    #[tokio::test]
    async fn postgres_price_range_is_exclusive_and_ordered() {
        let Some((repo, _pool)) = setup("it_items_price_range").await else {
            return;
        };

        for (name, price) in [("a", 6000.0), ("b", 7000.0), ("c", 8000.0)] {
            repo.insert(new_item(name, price)).await.unwrap();
        }

        let names: Vec<String> = repo
            .find_by_price_range(5000.0, 8000.0)
            .await
            .unwrap()
            .into_iter()
            .map(|i| i.name)
            .collect();
        assert_eq!(names, vec!["a", "b"]);

        assert_eq!(repo.find_all().await.unwrap().len(), 3);
    }
}
