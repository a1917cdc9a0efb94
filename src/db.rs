use crate::config;
use crate::error;
use crate::model;

/// Row-insert client for the hosted table store's REST interface.
pub struct TableStore {
    log: slog::Logger,
    client: reqwest::Client,
    insert_url: String,
    key: String,
}

impl TableStore {
    pub fn connect(log: slog::Logger, config: &config::TableStore) -> Result<Self, error::Error> {
        let url = config.url.as_ref().ok_or_else(|| {
            error::Error::Configuration("table_store.url (SUPABASE_URL) is not set".to_owned())
        })?;
        let key = config.key.clone().ok_or_else(|| {
            error::Error::Configuration("table_store.key (SUPABASE_ANON_KEY) is not set".to_owned())
        })?;
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| error::Error::Configuration(format!("could not build HTTP client: {}", e)))?;

        let insert_url = insert_url(url, &config.table);
        debug!(log, "table store configured"; "url" => &insert_url);

        Ok(TableStore {
            log,
            client,
            insert_url,
            key,
        })
    }

    pub async fn insert_reading(
        &self,
        reading: &model::EnvironmentReading,
    ) -> Result<(), error::Error> {
        self.client
            .post(&self.insert_url)
            .header("apikey", self.key.as_str())
            .bearer_auth(&self.key)
            .header("Prefer", "return=minimal")
            .json(reading)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|cause| error::Error::Transport {
                url: self.insert_url.clone(),
                cause,
            })?;

        debug!(self.log, "inserted reading"; "collected_at" => %reading.collected_at);
        Ok(())
    }
}

fn insert_url(base: &str, table: &str) -> String {
    format!("{}/rest/v1/{}", base.trim_end_matches('/'), table)
}
