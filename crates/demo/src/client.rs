//! HTTP client for the fleet API endpoints the walkthrough calls.
//!
//! Every method returns the parsed JSON body; a non-2xx answer becomes
//! [`DemoError::Status`].

use reqwest::{Method, RequestBuilder};
use serde_json::{json, Value};

use crate::error::DemoError;

pub struct FleetApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl FleetApiClient {
    /// * `base_url` - API root without a trailing slash, e.g. `http://localhost:8000`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            token: None,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Attach a bearer token to every later request.
    pub fn set_token(&mut self, token: impl Into<String>) {
        self.token = Some(token.into());
    }

    /// `GET /docs`. Any transport error or non-2xx status counts as down.
    pub async fn probe_docs(&self) -> Result<(), DemoError> {
        let url = format!("{}/docs", self.base_url);
        let unreachable = |reason: String| DemoError::ApiUnreachable {
            url: url.clone(),
            reason,
        };

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| unreachable(e.to_string()))?;
        if !response.status().is_success() {
            return Err(unreachable(format!("status {}", response.status())));
        }
        Ok(())
    }

    pub async fn register(
        &self,
        email: &str,
        password: &str,
        full_name: &str,
    ) -> Result<Value, DemoError> {
        let body = json!({ "email": email, "password": password, "full_name": full_name });
        self.send_json(Method::POST, "/api/v1/auth/register", Some(&body))
            .await
    }

    /// Form-encoded login. Returns the `access_token`.
    pub async fn login(&self, email: &str, password: &str) -> Result<String, DemoError> {
        let path = "/api/v1/auth/login";
        let request = self
            .request(Method::POST, path)
            .form(&[("username", email), ("password", password)]);
        let body = self.execute(Method::POST, path, request).await?;
        let json = parse_json(&body, &context(&Method::POST, path))?;
        str_field(&json, "access_token", &context(&Method::POST, path))
    }

    pub async fn create_robot(&self, robot: &Value) -> Result<Value, DemoError> {
        self.send_json(Method::POST, "/api/v1/robots", Some(robot)).await
    }

    /// Raw `GET /api/v1/robots` body; the caller decides how strictly to
    /// parse it.
    pub async fn list_robots_raw(&self) -> Result<String, DemoError> {
        let path = "/api/v1/robots";
        let request = self.request(Method::GET, path);
        self.execute(Method::GET, path, request).await
    }

    pub async fn list_robots(&self) -> Result<Value, DemoError> {
        self.send_json(Method::GET, "/api/v1/robots", None).await
    }

    pub async fn update_robot_status(&self, robot_id: &str, status: &str) -> Result<Value, DemoError> {
        let body = json!({ "status": status });
        self.send_json(
            Method::PATCH,
            &format!("/api/v1/robots/{robot_id}/status"),
            Some(&body),
        )
        .await
    }

    pub async fn create_mission(&self, mission: &Value) -> Result<Value, DemoError> {
        self.send_json(Method::POST, "/api/v1/missions", Some(mission))
            .await
    }

    pub async fn list_missions(&self) -> Result<Value, DemoError> {
        self.send_json(Method::GET, "/api/v1/missions", None).await
    }

    pub async fn assign_mission(&self, mission_id: &str, robot_id: &str) -> Result<Value, DemoError> {
        let body = json!({ "robot_id": robot_id });
        self.send_json(
            Method::POST,
            &format!("/api/v1/missions/{mission_id}/assign"),
            Some(&body),
        )
        .await
    }

    pub async fn start_mission(&self, mission_id: &str) -> Result<Value, DemoError> {
        self.send_json(Method::POST, &format!("/api/v1/missions/{mission_id}/start"), None)
            .await
    }

    pub async fn complete_mission(&self, mission_id: &str) -> Result<Value, DemoError> {
        self.send_json(
            Method::POST,
            &format!("/api/v1/missions/{mission_id}/complete"),
            None,
        )
        .await
    }

    /// Queue a fleet health check. Returns the queuing acknowledgment.
    pub async fn trigger_fleet_health_check(&self) -> Result<Value, DemoError> {
        self.send_json(Method::POST, "/api/v1/tasks/fleet-health-check", None)
            .await
    }

    // -- plumbing --

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.http.request(method, format!("{}{path}", self.base_url));
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send_json(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Value, DemoError> {
        let mut request = self.request(method.clone(), path);
        if let Some(body) = body {
            request = request.json(body);
        }
        let text = self.execute(method.clone(), path, request).await?;
        parse_json(&text, &context(&method, path))
    }

    async fn execute(
        &self,
        method: Method,
        path: &str,
        request: RequestBuilder,
    ) -> Result<String, DemoError> {
        tracing::debug!(%method, path, "Calling fleet API");
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(DemoError::Status {
                method: method.to_string(),
                path: path.to_string(),
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }
}

fn context(method: &Method, path: &str) -> String {
    format!("{method} {path}")
}

fn parse_json(body: &str, context: &str) -> Result<Value, DemoError> {
    serde_json::from_str(body).map_err(|source| DemoError::InvalidJson {
        context: context.to_string(),
        source,
    })
}

/// A non-empty string field, or a number rendered as a string.
pub fn str_field(value: &Value, field: &'static str, context: &str) -> Result<String, DemoError> {
    match value.get(field) {
        Some(Value::String(s)) if !s.is_empty() => Ok(s.clone()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        _ => Err(DemoError::MissingField {
            field,
            context: context.to_string(),
        }),
    }
}
