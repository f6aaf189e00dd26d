use crate::api::paths::{API_PATH, Method, Operation};
use crate::api::{ApiError, ApiResult, EquipRequest, RemoteApi, TransferRequest};
use crate::config::Config;
use crate::models::profile::{CharacterResponse, ManifestInfo, Membership, ProfileResponse, UserMemberships};
use crate::models::types::CharacterId;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

/// Attempts for idempotent reads that hit a transient failure.
const MAX_GET_ATTEMPTS: u32 = 3;

/// Every response is wrapped like this. `ErrorCode == 1` means success.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Envelope {
    error_code: i32,
    #[serde(default)]
    error_status: String,
    #[serde(default)]
    message: String,
    #[serde(default)]
    response: Value,
}

/// Unwrap the response envelope into its payload.
fn open_envelope(body: Value) -> ApiResult<Value> {
    let envelope: Envelope = serde_json::from_value(body)?;
    if envelope.error_code == 1 {
        return Ok(envelope.response);
    }
    Err(ApiError::Platform {
        code: envelope.error_code,
        status: envelope.error_status,
        message: envelope.message,
    })
}

fn join_components(components: &[u32]) -> String {
    components.iter().map(u32::to_string).collect::<Vec<_>>().join(",")
}

/// HTTP client for the remote platform API.
pub struct BungieClient {
    http: reqwest::Client,
    api_root: String,
    api_key: String,
    access_token: Option<String>,
}

impl BungieClient {
    pub fn new(config: &Config) -> ApiResult<Self> {
        let http = reqwest::Client::builder()
            .pool_max_idle_per_host(8)
            .tcp_nodelay(true)
            .build()?;

        Ok(Self {
            http,
            api_root: format!("{}{}", config.api_base.trim_end_matches('/'), API_PATH),
            api_key: config.api_key.clone(),
            access_token: config.access_token.clone(),
        })
    }

    fn request(&self, op: &Operation, path: &str, components: &[u32]) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.api_root, path);
        let mut req = match op.method {
            Method::Get => self.http.get(url),
            Method::Post => self.http.post(url),
        };
        req = req.header("X-API-Key", &self.api_key);

        if op.needs_auth(components) {
            match &self.access_token {
                Some(token) => req = req.bearer_auth(token),
                None => tracing::debug!(operation = %op, "no access token for a secured call"),
            }
        }
        if !components.is_empty() {
            req = req.query(&[("components", join_components(components))]);
        }
        req
    }

    async fn send(&self, req: reqwest::RequestBuilder) -> ApiResult<Value> {
        let res = req.send().await?;
        let status = res.status();
        if !status.is_success() {
            return Err(ApiError::Status(status.as_u16()));
        }
        let body: Value = res.json().await?;
        open_envelope(body)
    }

    async fn get<T: DeserializeOwned>(&self, op: &Operation, params: &[(&str, &str)], components: &[u32]) -> ApiResult<T> {
        let path = op.expand(params)?;

        let mut attempt = 0u32;
        loop {
            attempt += 1;
            match self.send(self.request(op, &path, components)).await {
                Ok(value) => return Ok(serde_json::from_value(value)?),
                Err(e) if e.is_transient() && attempt < MAX_GET_ATTEMPTS => {
                    tracing::debug!(operation = %op, attempt, error = %e, "retrying");
                    tokio::time::sleep(Duration::from_millis(150 * u64::from(attempt))).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Actions are never retried; a repeated transfer would move twice.
    async fn post<B: Serialize + Sync>(&self, op: &Operation, body: &B) -> ApiResult<Value> {
        let path = op.expand(&[])?;
        self.send(self.request(op, &path, &[]).json(body)).await
    }
}

#[async_trait]
impl RemoteApi for BungieClient {
    async fn get_memberships(&self) -> ApiResult<Vec<Membership>> {
        let data: UserMemberships = self.get(&Operation::GET_MEMBERSHIPS, &[], &[]).await?;
        Ok(data.destiny_memberships)
    }

    async fn get_profile(&self, membership: &Membership, components: &[u32]) -> ApiResult<ProfileResponse> {
        let membership_type = membership.membership_type.to_string();
        let params = [
            ("membershipType", membership_type.as_str()),
            ("destinyMembershipId", membership.membership_id.as_str()),
        ];
        self.get(&Operation::GET_PROFILE, &params, components).await
    }

    async fn get_character(
        &self,
        membership: &Membership,
        character: &CharacterId,
        components: &[u32],
    ) -> ApiResult<CharacterResponse> {
        let membership_type = membership.membership_type.to_string();
        let params = [
            ("membershipType", membership_type.as_str()),
            ("destinyMembershipId", membership.membership_id.as_str()),
            ("characterId", character.as_str()),
        ];
        self.get(&Operation::GET_CHARACTER, &params, components).await
    }

    async fn transfer_item(&self, req: &TransferRequest) -> ApiResult<()> {
        self.post(&Operation::TRANSFER_ITEM, req).await?;
        Ok(())
    }

    async fn equip_item(&self, req: &EquipRequest) -> ApiResult<()> {
        self.post(&Operation::EQUIP_ITEM, req).await?;
        Ok(())
    }

    async fn get_manifest(&self) -> ApiResult<ManifestInfo> {
        self.get(&Operation::GET_MANIFEST, &[], &[]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn success_envelope_yields_response() {
        let body = json!({"ErrorCode": 1, "ErrorStatus": "Success", "Message": "Ok", "Response": {"version": "96"}});
        let value = open_envelope(body).unwrap();
        assert_eq!(value["version"], "96");
    }

    #[test]
    fn error_envelope_is_a_platform_error() {
        let body = json!({
            "ErrorCode": 1623,
            "ErrorStatus": "DestinyItemNotFound",
            "Message": "The item requested was not found.",
        });
        match open_envelope(body).unwrap_err() {
            ApiError::Platform { code, status, .. } => {
                assert_eq!(code, 1623);
                assert_eq!(status, "DestinyItemNotFound");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn components_are_comma_joined() {
        assert_eq!(join_components(&[200, 201, 205]), "200,201,205");
        assert_eq!(join_components(&[]), "");
    }
}
