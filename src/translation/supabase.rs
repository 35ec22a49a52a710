use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use std::collections::HashMap;
use std::time::Duration;

use crate::config::TranslationConfig;
use crate::error::FinderError;
use crate::translation::{CachedTranslation, TranslationCache};

const COLUMNS: &str = "recipe_id,locale,name,instructions,ingredients";

/// Translation cache stored in a Supabase table, read through PostgREST
pub struct SupabaseTranslationCache {
    client: Client,
    url: String,
    api_key: String,
    table: String,
}

impl SupabaseTranslationCache {
    /// Create a new cache client from configuration
    pub fn new(config: &TranslationConfig, timeout: Duration) -> Result<Self, FinderError> {
        let url = config
            .url
            .clone()
            .or_else(|| std::env::var("SUPABASE_URL").ok())
            .ok_or_else(|| {
                FinderError::TranslationError(
                    "SUPABASE_URL not found in config or environment".to_string(),
                )
            })?;
        let api_key = config
            .api_key
            .clone()
            .or_else(|| std::env::var("SUPABASE_ANON_KEY").ok())
            .ok_or_else(|| {
                FinderError::TranslationError(
                    "SUPABASE_ANON_KEY not found in config or environment".to_string(),
                )
            })?;

        let client = Client::builder().timeout(timeout).build()?;

        Ok(SupabaseTranslationCache {
            client,
            url: url.trim_end_matches('/').to_string(),
            api_key,
            table: config.table.clone(),
        })
    }

    #[doc(hidden)]
    pub fn with_base_url(url: String, api_key: String, table: String) -> Self {
        SupabaseTranslationCache {
            client: Client::new(),
            url,
            api_key,
            table,
        }
    }

    async fn select(&self, filters: &[(&str, String)]) -> Result<Vec<CachedTranslation>, FinderError> {
        let response = self
            .client
            .get(format!("{}/rest/v1/{}", self.url, self.table))
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .query(&[("select", COLUMNS)])
            .query(filters)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FinderError::TranslationError(format!(
                "{} returned {}: {}",
                self.table, status, body
            )));
        }

        let rows: Vec<CachedTranslation> = response.json().await?;
        debug!("{} rows from {}", rows.len(), self.table);
        Ok(rows)
    }
}

/// PostgREST `in` list, quoted so ids containing commas survive
fn in_list(ids: &[String]) -> String {
    let quoted: Vec<String> = ids
        .iter()
        .map(|id| format!("\"{}\"", id.replace('"', "\\\"")))
        .collect();
    format!("in.({})", quoted.join(","))
}

#[async_trait]
impl TranslationCache for SupabaseTranslationCache {
    fn cache_name(&self) -> &str {
        "supabase"
    }

    async fn lookup(
        &self,
        recipe_id: &str,
        locale: &str,
    ) -> Result<Option<CachedTranslation>, FinderError> {
        let rows = self
            .select(&[
                ("recipe_id", format!("eq.{}", recipe_id)),
                ("locale", format!("eq.{}", locale)),
                ("limit", "1".to_string()),
            ])
            .await?;
        Ok(rows.into_iter().next())
    }

    async fn lookup_many(
        &self,
        recipe_ids: &[String],
        locale: &str,
    ) -> Result<HashMap<String, CachedTranslation>, FinderError> {
        if recipe_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = self
            .select(&[
                ("recipe_id", in_list(recipe_ids)),
                ("locale", format!("eq.{}", locale)),
            ])
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| (row.recipe_id.clone(), row))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    fn cache_for(server: &Server) -> SupabaseTranslationCache {
        SupabaseTranslationCache::with_base_url(
            server.url(),
            "anon-key".to_string(),
            "recipe_translations".to_string(),
        )
    }

    #[tokio::test]
    async fn test_lookup_single_recipe() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/rest/v1/recipe_translations")
            .match_header("apikey", "anon-key")
            .match_header("authorization", "Bearer anon-key")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("recipe_id".into(), "eq.52771".into()),
                Matcher::UrlEncoded("locale".into(), "eq.fr".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"[{
                    "recipe_id": "52771",
                    "locale": "fr",
                    "name": "Penne all'arrabbiata",
                    "instructions": "Porter une grande casserole d'eau à ébullition.",
                    "ingredients": [{"name": "penne", "measure": "450 g"}]
                }]"#,
            )
            .create_async()
            .await;

        let found = cache_for(&server).lookup("52771", "fr").await.unwrap().unwrap();

        assert_eq!(found.name, "Penne all'arrabbiata");
        assert_eq!(found.ingredients.unwrap()[0].measure, "450 g");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_lookup_miss() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/rest/v1/recipe_translations")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;

        assert!(cache_for(&server).lookup("1", "de").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_lookup_many_uses_one_query() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/rest/v1/recipe_translations")
            .match_query(Matcher::UrlEncoded(
                "recipe_id".into(),
                r#"in.("1","2","3")"#.into(),
            ))
            .with_status(200)
            .with_body(
                r#"[
                    {"recipe_id": "1", "locale": "es", "name": "Pollo"},
                    {"recipe_id": "3", "locale": "es", "name": "Arroz", "instructions": null}
                ]"#,
            )
            .expect(1)
            .create_async()
            .await;

        let ids = vec!["1".to_string(), "2".to_string(), "3".to_string()];
        let found = cache_for(&server).lookup_many(&ids, "es").await.unwrap();

        assert_eq!(found.len(), 2);
        assert_eq!(found["1"].name, "Pollo");
        assert!(found.get("2").is_none());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_error_status_is_translation_error() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/rest/v1/recipe_translations")
            .match_query(Matcher::Any)
            .with_status(401)
            .with_body(r#"{"message": "Invalid API key"}"#)
            .create_async()
            .await;

        let result = cache_for(&server).lookup("1", "fr").await;
        match result {
            Err(FinderError::TranslationError(message)) => {
                assert!(message.contains("Invalid API key"))
            }
            other => panic!("Expected translation error, got {:?}", other),
        }
    }

    #[test]
    fn test_in_list_quotes_ids() {
        let ids = vec!["a,b".to_string(), "c".to_string()];
        assert_eq!(in_list(&ids), r#"in.("a,b","c")"#);
    }
}
