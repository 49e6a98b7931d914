use reqwest::StatusCode;

use crate::{requests, responses};

type ReqwestResult = Result<reqwest::Response, reqwest::Error>;

/// Client for the read-only blood bank directory API.
///
/// Purely a transport adapter: no retry, no caching. The caller interprets
/// failures.
pub struct DirectoryClient {
    pub address: String,
    pub inner_client: reqwest::Client,
}

impl DirectoryClient {
    fn format_url(&self, path: &str) -> String {
        format!("{}/{path}", self.address.trim_end_matches('/'))
    }

    async fn get(&self, path: &str, query: &[(&str, &str)]) -> ReqwestResult {
        self.inner_client
            .get(self.format_url(path))
            .query(query)
            .send()
            .await
    }

    pub async fn list_states(
        &self,
    ) -> Result<responses::StatesResponse, ClientError> {
        let response = self.get("states", &[]).await?;
        ok_body(response).await
    }

    pub async fn list_districts(
        &self,
        state_id: &str,
    ) -> Result<responses::DistrictsResponse, ClientError> {
        let response = self.get("districts", &[("stateId", state_id)]).await?;
        ok_body(response).await
    }

    pub async fn list_stock_nearby(
        &self,
        state_id: &str,
        district_id: &str,
        blood_type: &str,
    ) -> Result<responses::StockNearbyResponse, ClientError> {
        let response = self
            .get(
                "stock-nearby",
                &[
                    ("stateId", state_id),
                    ("districtId", district_id),
                    ("bloodType", blood_type),
                ],
            )
            .await?;
        ok_body(response).await
    }
}

/// Client for the assistant text-generation backend.
pub struct AssistantClient {
    pub base_path: String,
    pub inner_client: reqwest::Client,
}

impl AssistantClient {
    fn format_url(&self) -> String {
        format!(
            "{}/api/voice-chat",
            self.base_path.trim_end_matches('/')
        )
    }

    /// Send one user utterance and return the assistant's reply text.
    pub async fn ask(&self, message: &str) -> Result<String, ClientError> {
        let body = requests::AssistantQuery {
            message: message.to_string(),
        };
        let response = self
            .inner_client
            .post(self.format_url())
            .json(&body)
            .send()
            .await?;
        let reply: responses::AssistantReply = ok_body(response).await?;
        Ok(reply.response)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// An unhandled API error to display, containing response text.
    #[error("{1}")]
    Api(StatusCode, String),
    #[error("Network error. Please check your connection.")]
    Network(#[from] reqwest::Error),
    #[error("Received an unexpected response from the server.")]
    Decode(#[source] reqwest::Error),
}

/// Deserialize a successful request into the desired type, or return an
/// appropriate error.
pub async fn ok_body<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, ClientError> {
    if !response.status().is_success() {
        return Err(ClientError::Api(
            response.status(),
            response.text().await?,
        ));
    }
    response.json::<T>().await.map_err(|e| {
        if e.is_decode() {
            ClientError::Decode(e)
        } else {
            ClientError::Network(e)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directory_urls_join_cleanly() {
        let client = DirectoryClient {
            address: "http://localhost:8080/api/blood-banks/".into(),
            inner_client: reqwest::Client::new(),
        };
        assert_eq!(
            client.format_url("states"),
            "http://localhost:8080/api/blood-banks/states"
        );
    }

    #[test]
    fn assistant_url_appends_endpoint() {
        let client = AssistantClient {
            base_path: "http://localhost:3000".into(),
            inner_client: reqwest::Client::new(),
        };
        assert_eq!(
            client.format_url(),
            "http://localhost:3000/api/voice-chat"
        );
    }
}
