use crate::models::{
    ABTest, ABTestSample, ContractorProfile, EventDetails, JobRecord, ServiceRequirement,
};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur when reading from the hosted backend
#[derive(Debug, Error)]
pub enum RecordStoreError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: invalid API key")]
    Unauthorized,

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// Table names in the hosted database
#[derive(Debug, Clone)]
pub struct RecordTables {
    pub events: String,
    pub service_requirements: String,
    pub business_profiles: String,
    pub contractor_services: String,
    pub jobs: String,
    pub ab_tests: String,
    pub ab_test_results: String,
}

impl Default for RecordTables {
    fn default() -> Self {
        Self {
            events: "events".to_string(),
            service_requirements: "service_requirements".to_string(),
            business_profiles: "business_profiles".to_string(),
            contractor_services: "contractor_services".to_string(),
            jobs: "jobs".to_string(),
            ab_tests: "ab_tests".to_string(),
            ab_test_results: "ab_test_results".to_string(),
        }
    }
}

/// Client for the hosted backend's REST gateway
///
/// Reads the records the matching core consumes:
/// - Events and their service requirements
/// - Verified contractor profiles
/// - Job history and A/B test participants
pub struct RecordStoreClient {
    base_url: String,
    api_key: String,
    client: Client,
    tables: RecordTables,
}

impl RecordStoreClient {
    /// Create a new record store client
    pub fn new(
        base_url: String,
        api_key: String,
        timeout_secs: u64,
        tables: RecordTables,
    ) -> Result<Self, RecordStoreError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            base_url,
            api_key,
            client,
            tables,
        })
    }

    /// Fetch a single event
    pub async fn get_event(&self, event_id: Uuid) -> Result<EventDetails, RecordStoreError> {
        let query = format!("id=eq.{}&select=id,title,location_data", event_id);
        self.fetch_one(&self.tables.events, &query, || format!("Event {} not found", event_id))
            .await
    }

    /// Fetch the service requirements of an event
    pub async fn get_service_requirements(
        &self,
        event_id: Uuid,
    ) -> Result<Vec<ServiceRequirement>, RecordStoreError> {
        let query = format!("event_id=eq.{}&select=*&order=created_at.asc", event_id);
        self.fetch_rows(&self.tables.service_requirements, &query).await
    }

    /// Verified contractors offering at least one of `categories`
    pub async fn query_contractors(
        &self,
        categories: &[String],
    ) -> Result<Vec<ContractorProfile>, RecordStoreError> {
        if categories.is_empty() {
            return Ok(vec![]);
        }

        let overlap = overlap_filter(categories);

        let query = format!(
            "is_verified=eq.true&service_categories={}&select={}",
            urlencoding::encode(&overlap),
            urlencoding::encode(&self.profile_select()),
        );

        let profiles: Vec<ContractorProfile> =
            self.fetch_rows(&self.tables.business_profiles, &query).await?;

        tracing::debug!(
            "Queried {} verified contractors for categories {:?}",
            profiles.len(),
            categories
        );

        Ok(profiles)
    }

    /// Fetch a single contractor profile
    pub async fn get_contractor(
        &self,
        contractor_id: Uuid,
    ) -> Result<ContractorProfile, RecordStoreError> {
        let query = format!(
            "id=eq.{}&select={}",
            contractor_id,
            urlencoding::encode(&self.profile_select())
        );
        self.fetch_one(&self.tables.business_profiles, &query, || {
            format!("Contractor {} not found", contractor_id)
        })
        .await
    }

    /// Job history of a contractor
    pub async fn get_jobs(&self, contractor_id: Uuid) -> Result<Vec<JobRecord>, RecordStoreError> {
        let query = format!("contractor_id=eq.{}&select=id,contractor_id,status,amount,created_at", contractor_id);
        self.fetch_rows(&self.tables.jobs, &query).await
    }

    /// Fetch an A/B test definition
    pub async fn get_ab_test(&self, test_id: Uuid) -> Result<ABTest, RecordStoreError> {
        let query = format!("id=eq.{}&select=*", test_id);
        self.fetch_one(&self.tables.ab_tests, &query, || format!("A/B test {} not found", test_id))
            .await
    }

    /// Participant rows of an A/B test
    pub async fn get_ab_test_samples(
        &self,
        test_id: Uuid,
    ) -> Result<Vec<ABTestSample>, RecordStoreError> {
        let query = format!("test_id=eq.{}&select=variant,metric_value", test_id);
        self.fetch_rows(&self.tables.ab_test_results, &query).await
    }

    fn profile_select(&self) -> String {
        format!(
            "*,services:{}(category,price_range_min,price_range_max)",
            self.tables.contractor_services
        )
    }

    async fn fetch_one<T, F>(&self, table: &str, query: &str, not_found: F) -> Result<T, RecordStoreError>
    where
        T: DeserializeOwned,
        F: FnOnce() -> String,
    {
        self.fetch_rows(table, query)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| RecordStoreError::NotFound(not_found()))
    }

    async fn fetch_rows<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &str,
    ) -> Result<Vec<T>, RecordStoreError> {
        let url = format!(
            "{}/rest/v1/{}?{}",
            self.base_url.trim_end_matches('/'),
            table,
            query
        );

        tracing::debug!("Fetching rows from: {}", url);

        let response = self
            .client
            .get(&url)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(RecordStoreError::Unauthorized);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_else(|_| "Unable to read body".to_string());
            tracing::error!("Failed to query {}: {} - {}", table, status, body);
            return Err(RecordStoreError::ApiError(format!(
                "Failed to query {}: {}",
                table, status
            )));
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            RecordStoreError::InvalidResponse(format!("Failed to parse {} rows: {}", table, e))
        })
    }
}

/// PostgREST array-overlap filter with each element quoted
fn overlap_filter(categories: &[String]) -> String {
    let elements: Vec<String> = categories
        .iter()
        .map(|c| format!("\"{}\"", c.replace('\\', "\\\\").replace('"', "\\\"")))
        .collect();
    format!("ov.{{{}}}", elements.join(","))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn client(base_url: String) -> RecordStoreClient {
        RecordStoreClient::new(base_url, "test_key".to_string(), 5, RecordTables::default())
            .expect("client")
    }

    #[test]
    fn test_record_store_client_creation() {
        let client = client("https://backend.test/".to_string());

        assert_eq!(client.base_url, "https://backend.test/");
        assert_eq!(client.api_key, "test_key");
        assert!(client.profile_select().contains("contractor_services"));
    }

    #[tokio::test]
    async fn test_get_event() {
        let mut server = mockito::Server::new_async().await;
        let event_id = Uuid::new_v4();

        let mock = server
            .mock("GET", "/rest/v1/events")
            .match_query(Matcher::UrlEncoded("id".into(), format!("eq.{}", event_id)))
            .match_header("apikey", "test_key")
            .with_status(200)
            .with_body(format!(
                r#"[{{"id":"{}","title":"Gala","location_data":{{"city":"Auckland","region":null}}}}]"#,
                event_id
            ))
            .create_async()
            .await;

        let event = client(server.url()).get_event(event_id).await.unwrap();

        mock.assert_async().await;
        assert_eq!(event.title, "Gala");
        assert_eq!(event.location_data.unwrap().city.as_deref(), Some("Auckland"));
    }

    #[tokio::test]
    async fn test_missing_event_is_not_found() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/rest/v1/events")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;

        let result = client(server.url()).get_event(Uuid::new_v4()).await;

        assert!(matches!(result, Err(RecordStoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_query_contractors_parses_services() {
        let mut server = mockito::Server::new_async().await;
        let contractor_id = Uuid::new_v4();

        server
            .mock("GET", "/rest/v1/business_profiles")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("is_verified".into(), "eq.true".into()),
                Matcher::UrlEncoded("service_categories".into(), r#"ov.{"catering"}"#.into()),
            ]))
            .with_status(200)
            .with_body(format!(
                r#"[{{
                    "id": "{}",
                    "business_name": "Kai Kitchen",
                    "service_categories": ["catering"],
                    "average_rating": 4.5,
                    "review_count": 60,
                    "service_areas": ["Auckland"],
                    "is_verified": true,
                    "services": [{{"category": "catering", "price_range_min": 500, "price_range_max": 2500}}]
                }}]"#,
                contractor_id
            ))
            .create_async()
            .await;

        let contractors = client(server.url())
            .query_contractors(&["catering".to_string()])
            .await
            .unwrap();

        assert_eq!(contractors.len(), 1);
        assert_eq!(contractors[0].id, contractor_id);
        assert_eq!(contractors[0].services[0].price_range_max, Some(2500.0));
    }

    #[tokio::test]
    async fn test_unauthorized() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/rest/v1/jobs")
            .match_query(Matcher::Any)
            .with_status(401)
            .create_async()
            .await;

        let result = client(server.url()).get_jobs(Uuid::new_v4()).await;

        assert!(matches!(result, Err(RecordStoreError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_no_categories_skips_request() {
        let contractors = client("http://127.0.0.1:9".to_string())
            .query_contractors(&[])
            .await
            .unwrap();

        assert!(contractors.is_empty());
    }

    #[test]
    fn test_overlap_filter_escapes_quotes_and_backslashes() {
        let categories = vec![
            "catering".to_string(),
            r#"say "cheese""#.to_string(),
            r"a\b".to_string(),
        ];

        assert_eq!(
            overlap_filter(&categories),
            r#"ov.{"catering","say \"cheese\"","a\\b"}"#
        );
    }
}
