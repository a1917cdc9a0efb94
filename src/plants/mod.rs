//! Client for the house-plant database API.
//!
//! The API only resolves care data by plant id; names are ambiguous, so callers
//! search a category first and look the returned ids up one by one.

use crate::config;
use crate::error;
use crate::model;

pub mod normalize;
pub mod schema;
pub mod search;

pub struct PlantApi {
    log: slog::Logger,
    client: reqwest::Client,
    search_url: String,
    plant_url: String,
    token: String,
}

/// Outcome of looking up one id found by a survey.
pub struct SurveyEntry {
    pub id: model::PlantId,
    pub profile: Result<schema::PlantProfile, error::Error>,
}

impl PlantApi {
    pub fn new(log: slog::Logger, config: &config::PlantApi) -> Result<Self, error::Error> {
        let token = config.token.clone().ok_or_else(|| {
            error::Error::Configuration("plant_api.token (ZYLALABS_API_KEY) is not set".to_owned())
        })?;
        let client = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| error::Error::Configuration(format!("could not build HTTP client: {}", e)))?;

        Ok(PlantApi {
            log,
            client,
            search_url: join_url(&config.base_url, &config.search_path),
            plant_url: join_url(&config.base_url, &config.plant_path),
            token,
        })
    }

    /// Every plant id the API reports for a category, in API order.
    pub async fn search_ids(&self, term: &str) -> Result<Vec<model::PlantId>, error::Error> {
        let results = self.search_results(term).await?;
        let ids = search::ids(&results)?;
        debug!(self.log, "search finished"; "term" => term, "hits" => ids.len());
        Ok(ids)
    }

    pub async fn search(
        &self,
        term: &str,
        limit: usize,
    ) -> Result<Vec<schema::PlantSummary>, error::Error> {
        let results = self.search_results(term).await?;
        search::summaries(&results, limit)
    }

    pub async fn fetch_profile(
        &self,
        id: &model::PlantId,
    ) -> Result<schema::PlantProfile, error::Error> {
        let record = self.record(id).await?;
        let profile = normalize::profile(&record)?;
        debug!(self.log, "normalized plant profile"; "id" => %id, "profile" => ?profile);
        Ok(profile)
    }

    pub async fn fetch_details(
        &self,
        id: &model::PlantId,
    ) -> Result<schema::PlantDetails, error::Error> {
        let record = self.record(id).await?;
        normalize::details(id, &record)
    }

    /// Searches a category and fetches the profile of every hit.
    ///
    /// A failing lookup is recorded in its entry; only a failing search aborts.
    pub async fn survey(&self, term: &str) -> Result<Vec<SurveyEntry>, error::Error> {
        let ids = self.search_ids(term).await?;
        info!(self.log, "surveying plants"; "term" => term, "count" => ids.len());

        let mut entries = Vec::with_capacity(ids.len());
        for id in ids {
            let profile = self.fetch_profile(&id).await;
            if let Err(ref e) = profile {
                warn!(self.log, "could not fetch plant profile"; "id" => %id, "error" => %e);
            }
            entries.push(SurveyEntry { id, profile });
        }

        Ok(entries)
    }

    async fn search_results(&self, term: &str) -> Result<serde_json::Value, error::Error> {
        let term = term.trim();
        if term.is_empty() {
            return Err(error::Error::parsing("query", "search term is empty"));
        }
        self.get_json(&self.search_url, &[("query", term)]).await
    }

    async fn record(&self, id: &model::PlantId) -> Result<serde_json::Value, error::Error> {
        self.get_json(&self.plant_url, &[("plant_id", id.0.as_str())])
            .await
    }

    async fn get_json(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<serde_json::Value, error::Error> {
        let transport = |cause| error::Error::Transport {
            url: url.to_owned(),
            cause,
        };

        debug!(self.log, "requesting"; "url" => url, "query" => ?query);
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.token)
            .header(reqwest::header::ACCEPT, "application/json")
            .query(query)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(transport)?;
        let body = response.text().await.map_err(transport)?;

        serde_json::from_str(&body)
            .map_err(|e| error::Error::parsing("response body", e.to_string()))
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::util::tests::serve_once;

    fn api_config(token: Option<&str>) -> config::PlantApi {
        api_config_at("https://plants.example/api/", token)
    }

    fn api_config_at(base_url: &str, token: Option<&str>) -> config::PlantApi {
        config::PlantApi {
            base_url: base_url.to_owned(),
            search_path: "/509/search".to_owned(),
            plant_path: "510/get+plant+by+id".to_owned(),
            token: token.map(str::to_owned),
        }
    }

    fn discard() -> slog::Logger {
        slog::Logger::root(slog::Discard, o!())
    }

    #[test]
    fn missing_token_is_a_configuration_error() {
        match PlantApi::new(discard(), &api_config(None)) {
            Err(error::Error::Configuration(_)) => {}
            Err(e) => panic!("unexpected error: {}", e),
            Ok(_) => panic!("client built without a token"),
        }
    }

    #[test]
    fn endpoints_are_joined_onto_the_base_url() {
        let api = PlantApi::new(discard(), &api_config(Some("token"))).unwrap();

        assert_eq!(api.search_url, "https://plants.example/api/509/search");
        assert_eq!(
            api.plant_url,
            "https://plants.example/api/510/get+plant+by+id"
        );
    }

    #[tokio::test]
    async fn empty_search_term_is_rejected_before_any_request() {
        let api = PlantApi::new(discard(), &api_config(Some("token"))).unwrap();

        let err = api.search_ids("   ").await.unwrap_err();
        assert_eq!(err.location(), Some("query"));
    }

    async fn api_serving(
        status: &str,
        body: &str,
    ) -> (PlantApi, tokio::task::JoinHandle<String>) {
        let (url, request) = serve_once(status, body).await;
        let api = PlantApi::new(discard(), &api_config_at(&url, Some("secret"))).unwrap();
        (api, request)
    }

    #[tokio::test]
    async fn search_sends_the_term_and_keeps_api_order() {
        let (api, request) = api_serving(
            "200 OK",
            r#"[{"item":{"id":"12"}},{"item":{"id":"34"}}]"#,
        )
        .await;

        let ids = api.search_ids("cactus").await.unwrap();

        assert_eq!(
            ids,
            vec![model::PlantId::from("12"), model::PlantId::from("34")]
        );
        let request = request.await.unwrap().to_lowercase();
        assert!(request.starts_with("get /509/search?query=cactus "), "{}", request);
        assert!(request.contains("authorization: bearer secret\r\n"), "{}", request);
        assert!(request.contains("accept: application/json\r\n"), "{}", request);
    }

    #[tokio::test]
    async fn profile_lookup_sends_the_plant_id() {
        let (api, request) = api_serving(
            "200 OK",
            r#"{"Watering":"w","Light ideal":"Full sun (10000/5000 lux)","Temperature min":null,"Temperature max":{"C":30}}"#,
        )
        .await;

        let profile = api.fetch_profile(&model::PlantId::from("12")).await.unwrap();

        assert_eq!(profile.min_light_lux, 10000);
        assert_eq!(profile.max_light_lux, None);
        assert_eq!(profile.max_temp_c, Some(30.0));
        let request = request.await.unwrap().to_lowercase();
        assert!(
            request.starts_with("get /510/get+plant+by+id?plant_id=12 "),
            "{}",
            request
        );
    }

    #[tokio::test]
    async fn error_status_is_a_transport_error() {
        let (api, request) = api_serving("500 Internal Server Error", "{}").await;

        match api.search_ids("cactus").await {
            Err(error::Error::Transport { url, .. }) => assert!(url.ends_with("/509/search")),
            Err(e) => panic!("unexpected error: {}", e),
            Ok(ids) => panic!("error status accepted: {:?}", ids),
        }
        request.await.unwrap();
    }

    #[tokio::test]
    async fn invalid_json_is_a_parsing_error_on_the_body() {
        let (api, request) = api_serving("200 OK", "nop").await;

        let err = api
            .fetch_details(&model::PlantId::from("12"))
            .await
            .unwrap_err();

        assert_eq!(err.location(), Some("response body"));
        request.await.unwrap();
    }
}
