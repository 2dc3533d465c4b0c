//! LandView HTTP client
//!
//! One method per backend call. Failures carry the operation that was being
//! attempted, the HTTP status and an excerpt of the response body.

use async_trait::async_trait;
use reqwest::{header, Client, Method, StatusCode};
use serde_json::{json, Value};
use tracing::{debug, info, trace, warn};

use lv_connector::config::ConnectorConfig;
use lv_connector::error::{ConnectorError, ConnectorResult};

use crate::config::LandViewConfig;
use crate::endpoint::{row_url, table_url, Table};
use crate::page::{collect_all, Page, PageSource};

/// Longest response body excerpt kept in errors and logs.
const BODY_EXCERPT_LEN: usize = 512;

/// HTTP client for the LandView REST API.
pub struct LandViewClient {
    config: LandViewConfig,
    auth_header: Option<(String, String)>,
    client: Client,
}

impl std::fmt::Debug for LandViewClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LandViewClient")
            .field("config", &self.config.redacted())
            .finish()
    }
}

impl LandViewClient {
    /// Create a client for a validated configuration.
    pub fn new(config: LandViewConfig) -> ConnectorResult<Self> {
        config.validate()?;

        let client = Self::build_client(&config)?;
        let auth_header = config.effective_credentials().to_header();

        Ok(Self {
            config,
            auth_header,
            client,
        })
    }

    /// Build the reqwest client with configuration.
    fn build_client(config: &LandViewConfig) -> ConnectorResult<Client> {
        let mut builder = Client::builder()
            .timeout(config.timeouts.read())
            .connect_timeout(config.timeouts.connect());

        if config.ignore_ssl {
            warn!(
                target: "security",
                base_url = %config.base_url,
                "ignoreSSL is set, TLS certificate verification is disabled"
            );
            builder = builder.danger_accept_invalid_certs(true);
        }

        builder.build().map_err(|e| {
            ConnectorError::invalid_configuration(format!("Failed to build HTTP client: {e}"))
        })
    }

    /// The configuration this client was built from.
    pub fn config(&self) -> &LandViewConfig {
        &self.config
    }

    fn url(&self, table: Table) -> String {
        table_url(&self.config.base_url, table)
    }

    fn row(&self, table: Table, id: &str) -> String {
        row_url(&self.config.base_url, table, id)
    }

    /// Table URL with URL-encoded query parameters.
    fn query_url(&self, table: Table, params: &[(&str, &str)]) -> ConnectorResult<String> {
        let mut url = url::Url::parse(&self.url(table)).map_err(|e| {
            ConnectorError::invalid_configuration(format!("invalid baseUrl: {e}"))
        })?;
        url.query_pairs_mut().extend_pairs(params);
        Ok(url.into())
    }

    /// Add authentication and accept headers to a request.
    fn build_request(&self, method: Method, url: &str) -> reqwest::RequestBuilder {
        let builder = self
            .client
            .request(method, url)
            .header(header::ACCEPT, "application/json");

        match &self.auth_header {
            Some((name, value)) => builder.header(name.as_str(), value.as_str()),
            None => builder,
        }
    }

    /// Send a request and return the raw body of a successful response.
    ///
    /// `operation` names what is being attempted ("read account 42") and is
    /// used in logs and error messages.
    async fn execute(
        &self,
        method: Method,
        url: &str,
        body: Option<&Value>,
        operation: &str,
    ) -> ConnectorResult<String> {
        let verbosity = self.config.log_verbosity;

        let mut request = self.build_request(method.clone(), url);
        if let Some(json_body) = body {
            request = request.json(json_body);
        }

        if verbosity.is_enabled() {
            debug!(
                url = %url,
                method = %method,
                operation = %operation,
                "Sending LandView request"
            );
        }

        let response = request
            .send()
            .await
            .map_err(|e| transport_error(operation, e))?;

        let status = response.status();
        let text = response.text().await.map_err(|e| {
            ConnectorError::network(
                format!("Issue when trying to {operation}: unreadable response"),
                e,
            )
        })?;

        if !status.is_success() {
            warn!(
                url = %url,
                status = status.as_u16(),
                response = %excerpt(&text),
                "Issue when trying to {}",
                operation
            );
            return Err(handle_response_error(status, &text, operation));
        }

        if verbosity.is_enabled() {
            info!(operation = %operation, status = status.as_u16(), "LandView call successful");
        }
        if verbosity.log_bodies() {
            trace!(operation = %operation, body = %text, "LandView response body");
        }

        Ok(text)
    }

    /// Send a request and decode its JSON body. An empty body decodes to null.
    async fn send(
        &self,
        method: Method,
        url: &str,
        body: Option<&Value>,
        operation: &str,
    ) -> ConnectorResult<Value> {
        let text = self.execute(method, url, body, operation).await?;

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&text).map_err(|e| {
            ConnectorError::invalid_data(format!(
                "Issue when trying to {operation}: response is not JSON: {e}"
            ))
        })
    }

    /// Send a write whose response body is not needed. Any 2xx is success.
    async fn write(
        &self,
        method: Method,
        url: &str,
        body: Option<&Value>,
        operation: &str,
    ) -> ConnectorResult<()> {
        self.execute(method, url, body, operation).await?;
        Ok(())
    }

    /// GET one page.
    async fn get_page(&self, url: &str, operation: &str) -> ConnectorResult<Page> {
        let body = self.send(Method::GET, url, None, operation).await?;
        if body.is_null() {
            return Ok(Page::default());
        }
        serde_json::from_value(body).map_err(|e| {
            ConnectorError::invalid_data(format!(
                "Issue when trying to {operation}: unexpected response shape: {e}"
            ))
        })
    }

    /// GET a URL and every page after it.
    async fn get_all(&self, url: &str, operation: &str) -> ConnectorResult<Vec<Value>> {
        let pages = Paged {
            client: self,
            operation,
        };
        collect_all(&pages, url).await
    }

    /// Check that the backend answers an authenticated `sys_user` read.
    pub async fn test_connection(&self) -> ConnectorResult<()> {
        self.execute(
            Method::GET,
            &self.url(Table::SysUser),
            None,
            "connect to LandView",
        )
        .await?;
        Ok(())
    }

    /// All `sys_user` rows.
    pub async fn get_accounts(&self) -> ConnectorResult<Vec<Value>> {
        self.get_all(&self.url(Table::SysUser), "list accounts")
            .await
    }

    /// The `sys_user` row with the given id.
    pub async fn get_account(&self, id: &str) -> ConnectorResult<Page> {
        self.get_page(
            &self.row(Table::SysUser, id),
            &format!("read account {id}"),
        )
        .await
    }

    /// `sys_user` rows with the given email address.
    pub async fn query_account(&self, email_address: &str) -> ConnectorResult<Page> {
        let url = self.query_url(Table::SysUser, &[("email_address", email_address)])?;
        self.get_page(&url, &format!("query account {email_address}"))
            .await
    }

    /// Insert a `sys_user` row.
    pub async fn create_account(&self, user: &Value) -> ConnectorResult<Value> {
        self.send(
            Method::POST,
            &self.url(Table::SysUser),
            Some(user),
            "create account",
        )
        .await
    }

    /// Update columns of a `sys_user` row.
    pub async fn update_user(&self, user_id: &str, body: &Value) -> ConnectorResult<()> {
        self.write(
            Method::PUT,
            &self.row(Table::SysUser, user_id),
            Some(body),
            &format!("update account {user_id}"),
        )
        .await
    }

    /// All `user_group` rows of a user.
    pub async fn get_user_groups(&self, user_id: &str) -> ConnectorResult<Vec<Value>> {
        let url = self.query_url(Table::UserGroup, &[("user_id", user_id)])?;
        self.get_all(&url, &format!("retrieve groups of account {user_id}"))
            .await
    }

    /// `user_group` rows linking one user to one group.
    pub async fn get_user_group_rel(&self, user_id: &str, group_id: &str) -> ConnectorResult<Page> {
        let url = self.query_url(
            Table::UserGroup,
            &[("user_id", user_id), ("group_id", group_id)],
        )?;
        self.get_page(
            &url,
            &format!("look up membership of account {user_id} in group {group_id}"),
        )
        .await
    }

    /// Insert a `user_group` row.
    pub async fn assign_user_group(&self, user_id: &str, group_id: &str) -> ConnectorResult<()> {
        let body = json!({
            "user_id": user_id,
            "group_id": group_id,
        });
        self.write(
            Method::POST,
            &self.url(Table::UserGroup),
            Some(&body),
            &format!("add account {user_id} to group {group_id}"),
        )
        .await
    }

    /// Delete a `user_group` row by relation id.
    pub async fn remove_user_group(&self, rel_id: &str) -> ConnectorResult<()> {
        self.write(
            Method::DELETE,
            &self.row(Table::UserGroup, rel_id),
            None,
            &format!("remove group membership {rel_id}"),
        )
        .await
    }

    /// All `sys_group` rows.
    pub async fn get_groups(&self) -> ConnectorResult<Vec<Value>> {
        self.get_all(&self.url(Table::SysGroup), "list groups").await
    }

    /// The `sys_group` row with the given id.
    pub async fn get_group(&self, id: &str) -> ConnectorResult<Page> {
        self.get_page(&self.row(Table::SysGroup, id), &format!("read group {id}"))
            .await
    }

    /// All `sys_group_permission` rows of a group.
    pub async fn get_group_permissions(&self, group_id: &str) -> ConnectorResult<Vec<Value>> {
        let url = self.query_url(Table::SysGroupPermission, &[("group_id", group_id)])?;
        self.get_all(&url, &format!("retrieve permissions of group {group_id}"))
            .await
    }

    /// All `sys_permission` rows.
    pub async fn get_permissions(&self) -> ConnectorResult<Vec<Value>> {
        self.get_all(&self.url(Table::SysPermission), "list permissions")
            .await
    }

    /// The `sys_permission` row with the given id.
    pub async fn get_permission(&self, id: &str) -> ConnectorResult<Page> {
        self.get_page(
            &self.row(Table::SysPermission, id),
            &format!("read permission {id}"),
        )
        .await
    }

    /// All `sys_group_permission` rows of a permission.
    pub async fn get_permission_groups(&self, permission_id: &str) -> ConnectorResult<Vec<Value>> {
        let url = self.query_url(
            Table::SysGroupPermission,
            &[("permission_id", permission_id)],
        )?;
        self.get_all(
            &url,
            &format!("retrieve groups of permission {permission_id}"),
        )
        .await
    }
}

/// Page source bound to one logical operation, so every page fetch reports
/// the same context on failure.
struct Paged<'a> {
    client: &'a LandViewClient,
    operation: &'a str,
}

#[async_trait]
impl PageSource for Paged<'_> {
    async fn fetch_page(&self, url: &str) -> ConnectorResult<Page> {
        self.client.get_page(url, self.operation).await
    }
}

/// Map a reqwest transport failure.
fn transport_error(operation: &str, err: reqwest::Error) -> ConnectorError {
    let message = format!("Issue when trying to {operation}");
    if err.is_timeout() {
        ConnectorError::ConnectionTimeout {
            message: format!("{message}: {err}"),
        }
    } else if err.is_connect() {
        ConnectorError::connect(message, err)
    } else {
        ConnectorError::network(message, err)
    }
}

/// Map a non-success response to an error.
fn handle_response_error(status: StatusCode, body: &str, operation: &str) -> ConnectorError {
    let body = excerpt(body);
    let message = format!("Issue when trying to {operation}");
    let detail = format!("{message} - {} - {body}", status.as_u16());

    match status {
        StatusCode::UNAUTHORIZED => ConnectorError::AuthenticationFailed { message: detail },
        StatusCode::FORBIDDEN => ConnectorError::InsufficientPermission { message: detail },
        StatusCode::NOT_FOUND => ConnectorError::ObjectNotFound { identifier: detail },
        StatusCode::CONFLICT => ConnectorError::ObjectAlreadyExists { identifier: detail },
        s if s.is_server_error() => ConnectorError::TargetUnavailable { message: detail },
        s => ConnectorError::OperationFailed {
            message,
            status: s.as_u16(),
            body,
        },
    }
}

/// Truncate a response body for logs and errors.
fn excerpt(body: &str) -> String {
    if body.len() <= BODY_EXCERPT_LEN {
        return body.to_string();
    }
    let mut end = BODY_EXCERPT_LEN;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}
