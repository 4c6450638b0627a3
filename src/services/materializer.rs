use thiserror::Error;
use tracing::info;

use crate::db::operations::progress::{self, ConceptRow, NewConcept};
use crate::db::DatabaseProxy;
use crate::services::assessment::Category;
use crate::services::catalog;
use crate::services::generation::GenerationProvider;
use crate::services::prompts;

/// Persistence the materializer needs from the learning_progress table.
/// DatabaseProxy is the production implementation; tests substitute an
/// in-memory store.
#[allow(async_fn_in_trait)]
pub trait ProgressStore {
    async fn concept_count(&self, user_id: &str) -> Result<i64, sqlx::Error>;
    async fn find_concept(
        &self,
        user_id: &str,
        concept_name: &str,
    ) -> Result<Option<ConceptRow>, sqlx::Error>;
    async fn max_order_index(&self, user_id: &str) -> Result<Option<i32>, sqlx::Error>;
    async fn insert_concepts(
        &self,
        user_id: &str,
        concepts: &[NewConcept],
    ) -> Result<usize, sqlx::Error>;
    async fn insert_concept(
        &self,
        user_id: &str,
        concept: &NewConcept,
    ) -> Result<String, sqlx::Error>;
    async fn update_concept_description(
        &self,
        concept_id: &str,
        description: &str,
        difficulty_level: &str,
    ) -> Result<(), sqlx::Error>;
}

impl ProgressStore for DatabaseProxy {
    async fn concept_count(&self, user_id: &str) -> Result<i64, sqlx::Error> {
        progress::count_for_user(self, user_id).await
    }

    async fn find_concept(
        &self,
        user_id: &str,
        concept_name: &str,
    ) -> Result<Option<ConceptRow>, sqlx::Error> {
        progress::find_by_name(self, user_id, concept_name).await
    }

    async fn max_order_index(&self, user_id: &str) -> Result<Option<i32>, sqlx::Error> {
        progress::max_order_index(self, user_id).await
    }

    async fn insert_concepts(
        &self,
        user_id: &str,
        concepts: &[NewConcept],
    ) -> Result<usize, sqlx::Error> {
        progress::insert_batch(self, user_id, concepts).await
    }

    async fn insert_concept(
        &self,
        user_id: &str,
        concept: &NewConcept,
    ) -> Result<String, sqlx::Error> {
        progress::insert_one(self, user_id, concept).await
    }

    async fn update_concept_description(
        &self,
        concept_id: &str,
        description: &str,
        difficulty_level: &str,
    ) -> Result<(), sqlx::Error> {
        progress::update_description(self, concept_id, description, difficulty_level).await
    }
}

/// Text source for concept descriptions.
#[allow(async_fn_in_trait)]
pub trait ConceptDescriber {
    async fn describe(&self, concept_name: &str, prompt: &str) -> String;
}

impl ConceptDescriber for GenerationProvider {
    async fn describe(&self, concept_name: &str, prompt: &str) -> String {
        self.describe_concept(concept_name, prompt).await
    }
}

#[derive(Debug, Error)]
pub enum MaterializeError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Debug)]
pub enum BatchOutcome {
    /// The user already has concept rows; nothing was inserted.
    AlreadyGenerated,
    Generated { inserted: usize },
}

#[derive(Debug)]
pub struct UpsertOutcome {
    pub description: String,
    pub created: bool,
    pub order_index: i32,
}

/// Generates the category's fixed onboarding catalog and inserts it as one
/// bulk write, order_index = catalog position. Idempotent: any existing row
/// short-circuits to AlreadyGenerated.
pub async fn generate_initial<S, G>(
    store: &S,
    generation: &G,
    user_id: &str,
    category: Category,
    language: &str,
) -> Result<BatchOutcome, MaterializeError>
where
    S: ProgressStore,
    G: ConceptDescriber,
{
    if store.concept_count(user_id).await? > 0 {
        return Ok(BatchOutcome::AlreadyGenerated);
    }

    let concepts = catalog::catalog().concepts_for(category);
    let mut rows = Vec::with_capacity(concepts.len());

    for (index, concept_name) in concepts.iter().enumerate() {
        let prompt = prompts::build_prompt(category, concept_name, language);
        let description = generation.describe(concept_name, &prompt).await;
        rows.push(NewConcept {
            concept_name: concept_name.clone(),
            concept_description: description,
            difficulty_level: category.difficulty(),
            order_index: index as i32,
        });
    }

    let inserted = store.insert_concepts(user_id, &rows).await?;
    info!(user_id, inserted, category = category.as_str(), "initial catalog materialized");
    Ok(BatchOutcome::Generated { inserted })
}

/// Generates a description for one concept and upserts it, treating
/// (user_id, concept_name) as the dedup key. The description is always
/// returned directly so the caller never depends on a read-after-write.
pub async fn upsert_concept<S, G>(
    store: &S,
    generation: &G,
    user_id: &str,
    concept_name: &str,
    category: Category,
    language: &str,
) -> Result<UpsertOutcome, MaterializeError>
where
    S: ProgressStore,
    G: ConceptDescriber,
{
    let prompt = prompts::build_prompt(category, concept_name, language);
    let description = generation.describe(concept_name, &prompt).await;

    if let Some(existing) = store.find_concept(user_id, concept_name).await? {
        store
            .update_concept_description(&existing.id, &description, category.difficulty())
            .await?;
        return Ok(UpsertOutcome {
            description,
            created: false,
            order_index: existing.order_index,
        });
    }

    let order_index = store
        .max_order_index(user_id)
        .await?
        .map_or(0, |max| max + 1);

    store
        .insert_concept(
            user_id,
            &NewConcept {
                concept_name: concept_name.to_string(),
                concept_description: description.clone(),
                difficulty_level: category.difficulty(),
                order_index,
            },
        )
        .await?;

    Ok(UpsertOutcome {
        description,
        created: true,
        order_index,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemoryStore {
        rows: Mutex<Vec<ConceptRow>>,
    }

    impl MemoryStore {
        fn seeded(user_id: &str, concept_name: &str) -> Self {
            let store = Self::default();
            store
                .rows
                .lock()
                .unwrap()
                .push(row(user_id, concept_name, "seed description", 0));
            store
        }

        fn row_count(&self) -> usize {
            self.rows.lock().unwrap().len()
        }
    }

    fn row(user_id: &str, name: &str, description: &str, order_index: i32) -> ConceptRow {
        ConceptRow {
            id: format!("row-{order_index}-{name}"),
            user_id: user_id.to_string(),
            concept_name: name.to_string(),
            concept_description: description.to_string(),
            difficulty_level: "beginner".to_string(),
            is_completed: false,
            order_index,
            created_at: String::new(),
            completed_at: None,
        }
    }

    impl ProgressStore for MemoryStore {
        async fn concept_count(&self, user_id: &str) -> Result<i64, sqlx::Error> {
            let rows = self.rows.lock().unwrap();
            Ok(rows.iter().filter(|r| r.user_id == user_id).count() as i64)
        }

        async fn find_concept(
            &self,
            user_id: &str,
            concept_name: &str,
        ) -> Result<Option<ConceptRow>, sqlx::Error> {
            let rows = self.rows.lock().unwrap();
            Ok(rows
                .iter()
                .find(|r| r.user_id == user_id && r.concept_name == concept_name)
                .cloned())
        }

        async fn max_order_index(&self, user_id: &str) -> Result<Option<i32>, sqlx::Error> {
            let rows = self.rows.lock().unwrap();
            Ok(rows
                .iter()
                .filter(|r| r.user_id == user_id)
                .map(|r| r.order_index)
                .max())
        }

        async fn insert_concepts(
            &self,
            user_id: &str,
            concepts: &[NewConcept],
        ) -> Result<usize, sqlx::Error> {
            let mut rows = self.rows.lock().unwrap();
            for concept in concepts {
                let id = format!("row-{}", rows.len());
                rows.push(ConceptRow {
                    id,
                    user_id: user_id.to_string(),
                    concept_name: concept.concept_name.clone(),
                    concept_description: concept.concept_description.clone(),
                    difficulty_level: concept.difficulty_level.to_string(),
                    is_completed: false,
                    order_index: concept.order_index,
                    created_at: String::new(),
                    completed_at: None,
                });
            }
            Ok(concepts.len())
        }

        async fn insert_concept(
            &self,
            user_id: &str,
            concept: &NewConcept,
        ) -> Result<String, sqlx::Error> {
            let mut rows = self.rows.lock().unwrap();
            let id = format!("row-{}", rows.len());
            rows.push(ConceptRow {
                id: id.clone(),
                user_id: user_id.to_string(),
                concept_name: concept.concept_name.clone(),
                concept_description: concept.concept_description.clone(),
                difficulty_level: concept.difficulty_level.to_string(),
                is_completed: false,
                order_index: concept.order_index,
                created_at: String::new(),
                completed_at: None,
            });
            Ok(id)
        }

        async fn update_concept_description(
            &self,
            concept_id: &str,
            description: &str,
            difficulty_level: &str,
        ) -> Result<(), sqlx::Error> {
            let mut rows = self.rows.lock().unwrap();
            if let Some(row) = rows.iter_mut().find(|r| r.id == concept_id) {
                row.concept_description = description.to_string();
                row.difficulty_level = difficulty_level.to_string();
            }
            Ok(())
        }
    }

    /// Returns a distinct description on every call so update-in-place is
    /// observable.
    #[derive(Default)]
    struct ScriptedDescriber {
        calls: AtomicUsize,
    }

    impl ScriptedDescriber {
        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl ConceptDescriber for ScriptedDescriber {
        async fn describe(&self, concept_name: &str, _prompt: &str) -> String {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            format!("{concept_name} explained in depth (revision {n})")
        }
    }

    #[tokio::test]
    async fn test_first_upsert_creates_at_order_zero() {
        let store = MemoryStore::default();
        let describer = ScriptedDescriber::default();

        let outcome = upsert_concept(
            &store,
            &describer,
            "u1",
            "Recursion and Backtracking",
            Category::Advanced,
            "programming",
        )
        .await
        .unwrap();

        assert!(outcome.created);
        assert_eq!(outcome.order_index, 0);
        assert_eq!(store.row_count(), 1);
    }

    #[tokio::test]
    async fn test_second_upsert_updates_in_place() {
        let store = MemoryStore::default();
        let describer = ScriptedDescriber::default();

        let first = upsert_concept(
            &store,
            &describer,
            "u1",
            "Dynamic Programming",
            Category::Advanced,
            "programming",
        )
        .await
        .unwrap();
        let second = upsert_concept(
            &store,
            &describer,
            "u1",
            "Dynamic Programming",
            Category::Advanced,
            "programming",
        )
        .await
        .unwrap();

        assert!(first.created);
        assert!(!second.created);
        assert_eq!(second.order_index, first.order_index);
        assert_ne!(first.description, second.description);
        assert_eq!(store.row_count(), 1);

        let stored = store
            .find_concept("u1", "Dynamic Programming")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.concept_description, second.description);
    }

    #[tokio::test]
    async fn test_upsert_appends_after_existing_rows() {
        let store = MemoryStore::seeded("u1", "Loops (for, while)");
        let describer = ScriptedDescriber::default();

        let outcome = upsert_concept(
            &store,
            &describer,
            "u1",
            "Graph Algorithms",
            Category::Advanced,
            "programming",
        )
        .await
        .unwrap();

        assert!(outcome.created);
        assert_eq!(outcome.order_index, 1);
        assert_eq!(store.row_count(), 2);
    }

    #[tokio::test]
    async fn test_initial_batch_materializes_catalog_in_order() {
        let store = MemoryStore::default();
        let describer = ScriptedDescriber::default();

        let outcome = generate_initial(
            &store,
            &describer,
            "u1",
            Category::Structured,
            "programming",
        )
        .await
        .unwrap();

        let expected = catalog::catalog().concepts_for(Category::Structured);
        match outcome {
            BatchOutcome::Generated { inserted } => assert_eq!(inserted, expected.len()),
            BatchOutcome::AlreadyGenerated => panic!("expected a fresh batch"),
        }

        let rows = store.rows.lock().unwrap();
        assert_eq!(rows.len(), expected.len());
        for (index, name) in expected.iter().enumerate() {
            assert_eq!(rows[index].concept_name, *name);
            assert_eq!(rows[index].order_index, index as i32);
            assert_eq!(rows[index].difficulty_level, "beginner");
        }
    }

    #[tokio::test]
    async fn test_initial_batch_noop_when_any_row_exists() {
        let store = MemoryStore::seeded("u1", "Variables and Data Types");
        let describer = ScriptedDescriber::default();

        let outcome = generate_initial(
            &store,
            &describer,
            "u1",
            Category::Structured,
            "programming",
        )
        .await
        .unwrap();

        assert!(matches!(outcome, BatchOutcome::AlreadyGenerated));
        assert_eq!(store.row_count(), 1);
        assert_eq!(describer.call_count(), 0);
    }
}
