use async_trait::async_trait;
use dagen_core::api as core_api;
use dagen_core::publish::models::{ApiRequest, ApiResponse, ProfileListPayload};
use serde::de::DeserializeOwned;
use serde::Serialize;

const BODY_PREVIEW_LIMIT: usize = 512;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    Timeout,
    Connect,
    Request,
    Body,
    Decode,
    Unknown,
}

impl ApiErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Timeout => "timeout",
            Self::Connect => "connect",
            Self::Request => "request",
            Self::Body => "body",
            Self::Decode => "decode",
            Self::Unknown => "unknown",
        }
    }

    fn of(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_connect() {
            Self::Connect
        } else if err.is_request() {
            Self::Request
        } else if err.is_body() {
            Self::Body
        } else if err.is_decode() {
            Self::Decode
        } else {
            Self::Unknown
        }
    }
}

fn network_error(err: reqwest::Error, url: &str) -> core_api::PublishError {
    core_api::PublishError::Network {
        kind: ApiErrorKind::of(&err).as_str(),
        url: url.to_string(),
        message: err.to_string(),
    }
}

fn decode_error(url: &str, err: serde_json::Error, body: &str) -> core_api::PublishError {
    core_api::PublishError::Network {
        kind: ApiErrorKind::Decode.as_str(),
        url: url.to_string(),
        message: format!(
            "failed to decode response body: {} | body={}",
            err,
            preview_body(body)
        ),
    }
}

fn preview_body(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "<empty body>".to_string();
    }

    let mut out = String::new();
    let mut truncated = false;
    for (idx, ch) in trimmed.chars().enumerate() {
        if idx >= BODY_PREVIEW_LIMIT {
            truncated = true;
            break;
        }
        out.push(ch);
    }

    if truncated {
        out.push_str("...");
    }

    out
}

fn parse_message<T: DeserializeOwned>(url: &str, body: &str) -> Result<T, core_api::PublishError> {
    serde_json::from_str::<ApiResponse<T>>(body)
        .map(|r| r.payload.message)
        .map_err(|err| decode_error(url, err, body))
}

/// `reqwest` client for the remote deployment management API.
#[derive(Clone)]
pub struct HttpDeploymentApi {
    token: String,
    http: reqwest::Client,
    url_deploy: String,
    url_profiles: String,
}

impl HttpDeploymentApi {
    pub fn new(cfg: &core_api::ApiConfig) -> anyhow::Result<Self> {
        let mut builder = reqwest::Client::builder()
            .timeout(std::time::Duration::from_millis(cfg.timeout_ms))
            .danger_accept_invalid_certs(!cfg.verify_tls);

        if let Some(path) = cfg.client_cert.as_deref().filter(|p| !p.trim().is_empty()) {
            let pem = std::fs::read(path)
                .map_err(|e| anyhow::anyhow!("cannot read client certificate {path}: {e}"))?;
            builder = builder.identity(reqwest::Identity::from_pem(&pem)?);
        }

        let normalized = cfg.endpoint.trim().trim_end_matches('/');
        if normalized.is_empty() {
            anyhow::bail!("api.endpoint is not configured");
        }

        Ok(Self {
            token: cfg.token.clone(),
            http: builder.build()?,
            url_deploy: format!("{}/dag-generator-v2", normalized),
            url_profiles: format!("{}/project-profile", normalized),
        })
    }

    fn auth(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if self.token.trim().is_empty() {
            req
        } else {
            req.bearer_auth(&self.token)
        }
    }

    async fn send<T: Serialize + Sync>(
        &self,
        req: reqwest::RequestBuilder,
        url: &str,
        payload: &T,
    ) -> Result<(u16, String), core_api::PublishError> {
        let resp = self
            .auth(req.json(&ApiRequest { payload }))
            .send()
            .await
            .map_err(|err| network_error(err, url))?;
        let status = resp.status().as_u16();
        let body = resp.text().await.map_err(|err| network_error(err, url))?;
        Ok((status, body))
    }
}

#[async_trait]
impl core_api::DeploymentApi for HttpDeploymentApi {
    fn name(&self) -> &str {
        "http"
    }

    async fn list_project_profiles(
        &self,
        uid: &str,
    ) -> Result<Vec<String>, core_api::PublishError> {
        let url = &self.url_profiles;
        tracing::debug!(target: "dagen.api", stage = "api.profiles.in", url = %url);
        let payload = ProfileListPayload {
            uid: uid.to_string(),
        };
        let (status, body) = self.send(self.http.post(url), url, &payload).await?;
        tracing::debug!(target: "dagen.api", stage = "api.profiles.out", status);
        if !(200..300).contains(&status) {
            return Err(core_api::PublishError::TransportFailure {
                status,
                url: url.clone(),
                body,
            });
        }
        parse_message(url, &body)
    }

    async fn check_exists(
        &self,
        payload: &core_api::CheckExistsPayload,
    ) -> Result<core_api::Existence, core_api::PublishError> {
        let url = &self.url_deploy;
        tracing::debug!(
            target: "dagen.api",
            stage = "api.check.in",
            url = %url,
            dag_file = %payload.dag_file.name,
            profile = %payload.project_profile
        );
        let (status, body) = self.send(self.http.put(url), url, payload).await?;
        tracing::debug!(target: "dagen.api", stage = "api.check.out", status);
        match status {
            404 => Ok(core_api::Existence::NotFound),
            200 => Ok(core_api::Existence::Exists {
                message: parse_message::<serde_json::Value>(url, &body)
                    .map(|m| match m {
                        serde_json::Value::String(s) => s,
                        other => other.to_string(),
                    })
                    .unwrap_or_else(|_| preview_body(&body)),
            }),
            _ => Err(core_api::PublishError::TransportFailure {
                status,
                url: url.clone(),
                body,
            }),
        }
    }

    async fn submit(
        &self,
        payload: &core_api::SubmitPayload,
    ) -> Result<String, core_api::PublishError> {
        let url = &self.url_deploy;
        tracing::debug!(
            target: "dagen.api",
            stage = "api.submit.in",
            url = %url,
            dag_file = %payload.dag_file.name,
            resource_len = payload.resource.len(),
            dag_len = payload.dag_file.data.len()
        );
        let (status, body) = self.send(self.http.put(url), url, payload).await?;
        tracing::debug!(target: "dagen.api", stage = "api.submit.out", status);
        if !(200..300).contains(&status) {
            return Err(core_api::PublishError::TransportFailure {
                status,
                url: url.clone(),
                body,
            });
        }
        let message: serde_json::Value = parse_message(url, &body)?;
        Ok(match message {
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        })
    }
}
