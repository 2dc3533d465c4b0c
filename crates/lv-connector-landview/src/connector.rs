//! LandView connector implementation

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use tracing::{debug, info, instrument, warn};

use lv_connector::command::AccountCreateInput;
use lv_connector::config::ConnectorConfig;
use lv_connector::error::{ConnectorError, ConnectorResult};
use lv_connector::operation::{AttributeChange, AttributeChangeOp, AttributeValue};
use lv_connector::record::{AccountRecord, EntitlementRecord};
use lv_connector::traits::{
    AccountOp, AccountStatusOp, Connector, CreateAccountOp, EntitlementOp, ResultSink,
    UpdateAccountOp,
};

use crate::client::LandViewClient;
use crate::config::LandViewConfig;
use crate::model::{
    id_field, ids_from_rows, Account, Group, Permission, ENTITLEMENT_TYPE, STATUS_ACTIVE,
    STATUS_INACTIVE,
};
use crate::page::Page;

/// Account attribute holding group memberships.
const GROUPS_ATTRIBUTE: &str = "groups";

/// LandView connector for account and group lifecycle management.
pub struct LandViewConnector {
    client: LandViewClient,
    display_name: String,
}

impl std::fmt::Debug for LandViewConnector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LandViewConnector")
            .field("config", &self.client.config().redacted())
            .field("display_name", &self.display_name)
            .finish()
    }
}

impl LandViewConnector {
    /// Create a new LandView connector with the given configuration.
    pub fn new(config: LandViewConfig) -> ConnectorResult<Self> {
        let display_name = format!("LandView: {}", config.base_url);
        let client = LandViewClient::new(config)?;

        Ok(Self {
            client,
            display_name,
        })
    }

    /// Set a custom display name.
    #[must_use]
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = name.into();
        self
    }

    /// The underlying HTTP client.
    pub fn client(&self) -> &LandViewClient {
        &self.client
    }

    /// Read a user row together with its group memberships.
    async fn load_account(&self, user_id: &str) -> ConnectorResult<Account> {
        let row = first_row(self.client.get_account(user_id).await?, "account", user_id)?;
        let account = Account::from_row(&row)?;

        let memberships = self.client.get_user_groups(&account.identity).await?;
        let groups = ids_from_rows(&memberships, "group_id");
        debug!(user_id = %account.identity, groups = groups.len(), "Loaded account groups");

        Ok(account.with_groups(groups))
    }

    /// Read a group row together with the permissions it grants.
    async fn load_group(&self, group_id: &str) -> ConnectorResult<Group> {
        let row = first_row(self.client.get_group(group_id).await?, "group", group_id)?;
        let group = Group::from_row(&row)?;

        let grants = self.client.get_group_permissions(&group.identity).await?;
        Ok(group.with_permissions(ids_from_rows(&grants, "permission_id")))
    }

    /// Read a permission row together with the groups granting it.
    async fn load_permission(&self, permission_id: &str) -> ConnectorResult<Permission> {
        let row = first_row(
            self.client.get_permission(permission_id).await?,
            "permission",
            permission_id,
        )?;
        let permission = Permission::from_row(&row)?;

        let grants = self.client.get_permission_groups(&permission.identity).await?;
        Ok(permission.with_groups(ids_from_rows(&grants, "group_id")))
    }

    /// Add a user to a group unless the membership already exists.
    async fn add_membership(&self, user_id: &str, group_id: &str) -> ConnectorResult<()> {
        let existing = self.client.get_user_group_rel(user_id, group_id).await?;

        if !existing.is_empty() {
            info!(
                user_id = %user_id,
                group_id = %group_id,
                "Account already has access to group, skipping"
            );
            return Ok(());
        }

        self.client.assign_user_group(user_id, group_id).await?;
        info!(user_id = %user_id, group_id = %group_id, "Group membership added");
        Ok(())
    }

    /// Remove every relation linking a user to a group.
    async fn remove_membership(&self, user_id: &str, group_id: &str) -> ConnectorResult<()> {
        let existing = self.client.get_user_group_rel(user_id, group_id).await?;
        let rel_ids = ids_from_rows(&existing.data, "rel_id");

        if rel_ids.is_empty() {
            info!(
                user_id = %user_id,
                group_id = %group_id,
                "Account is not a member of group, nothing to remove"
            );
            return Ok(());
        }

        for rel_id in &rel_ids {
            self.client.remove_user_group(rel_id).await?;
        }
        info!(
            user_id = %user_id,
            group_id = %group_id,
            relations = rel_ids.len(),
            "Group membership removed"
        );
        Ok(())
    }

    /// Write a status value and return the refreshed account.
    async fn set_status(&self, identity: &str, status: &str) -> ConnectorResult<AccountRecord> {
        let account = self.load_account(identity).await?;

        self.client
            .update_user(&account.identity, &json!({ "status": status }))
            .await?;
        info!(
            user_id = %account.identity,
            name = %account.full_name(),
            status,
            "Account status updated"
        );

        Ok(self.load_account(&account.identity).await?.into())
    }

    /// Apply one attribute change.
    async fn apply_change(&self, user_id: &str, change: &AttributeChange) -> ConnectorResult<()> {
        match (change.op, change.attribute == GROUPS_ATTRIBUTE) {
            (AttributeChangeOp::Add, true) => {
                for group_id in value_ids(&change.values())? {
                    self.add_membership(user_id, &group_id).await?;
                }
                Ok(())
            }
            (AttributeChangeOp::Remove, true) => {
                for group_id in value_ids(&change.values())? {
                    self.remove_membership(user_id, &group_id).await?;
                }
                Ok(())
            }
            (AttributeChangeOp::Set, false)
                if !matches!(
                    change.value,
                    AttributeValue::Array(_) | AttributeValue::Object(_)
                ) =>
            {
                let mut body = Map::new();
                body.insert(change.attribute.clone(), change.value.to_json());
                self.client.update_user(user_id, &Value::Object(body)).await?;
                debug!(user_id = %user_id, attribute = %change.attribute, "Account attribute set");
                Ok(())
            }
            _ => Err(ConnectorError::UnsupportedOperation {
                operation: format!("{} on attribute '{}'", change.op, change.attribute),
            }),
        }
    }

    fn check_entitlement_type(entitlement_type: &str) -> ConnectorResult<()> {
        if entitlement_type == ENTITLEMENT_TYPE {
            Ok(())
        } else {
            Err(ConnectorError::UnsupportedOperation {
                operation: format!("entitlement type '{entitlement_type}'"),
            })
        }
    }
}

/// First row of a single-row read, or `ObjectNotFound`.
fn first_row(page: Page, kind: &str, id: &str) -> ConnectorResult<Value> {
    page.data
        .into_iter()
        .next()
        .ok_or_else(|| ConnectorError::ObjectNotFound {
            identifier: format!("{kind} {id}"),
        })
}

/// Identifier strings of attribute values, rejecting values that cannot be ids.
fn value_ids(values: &[&AttributeValue]) -> ConnectorResult<Vec<String>> {
    values
        .iter()
        .map(|value| {
            value.to_id_string().ok_or_else(|| {
                ConnectorError::invalid_request(format!("not a group id: {}", value.to_json()))
            })
        })
        .collect()
}

/// Id of a newly created user: top-level `user_id`, then `data[0].user_id`,
/// then `data.user_id`.
fn created_user_id(response: &Value) -> Option<String> {
    let data = response.get("data");
    id_field(response, "user_id")
        .or_else(|| {
            data.and_then(|d| d.get(0))
                .and_then(|row| id_field(row, "user_id"))
        })
        .or_else(|| data.and_then(|d| id_field(d, "user_id")))
}

#[async_trait]
impl Connector for LandViewConnector {
    fn display_name(&self) -> &str {
        &self.display_name
    }

    #[instrument(skip(self))]
    async fn test_connection(&self) -> ConnectorResult<()> {
        self.client.test_connection().await?;

        info!(
            base_url = %self.client.config().base_url,
            "LandView connection test successful"
        );
        Ok(())
    }
}

#[async_trait]
impl AccountOp for LandViewConnector {
    #[instrument(skip(self, sink))]
    async fn list_accounts(&self, sink: &mut dyn ResultSink<AccountRecord>) -> ConnectorResult<()> {
        let rows = self.client.get_accounts().await?;
        let total = rows.len();

        for row in &rows {
            let user_id = id_field(row, "user_id").ok_or_else(|| {
                ConnectorError::invalid_data(format!("sys_user row has no user_id: {row}"))
            })?;
            let account = self.load_account(&user_id).await?;
            sink.send(account.into())?;
        }

        info!(accounts = total, "Account aggregation complete");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn read_account(&self, identity: &str) -> ConnectorResult<AccountRecord> {
        Ok(self.load_account(identity).await?.into())
    }
}

#[async_trait]
impl CreateAccountOp for LandViewConnector {
    #[instrument(skip(self, input))]
    async fn create_account(&self, input: AccountCreateInput) -> ConnectorResult<AccountRecord> {
        let email = input
            .attributes
            .get_string("email_address")
            .filter(|e| !e.is_empty())
            .ok_or_else(|| ConnectorError::invalid_request("email_address is required"))?;

        let existing = self.client.query_account(email).await?;
        if !existing.is_empty() {
            let user_id = existing
                .first_row()
                .and_then(|row| id_field(row, "user_id"))
                .ok_or_else(|| {
                    ConnectorError::invalid_data(format!(
                        "account lookup for {email} returned rows without user_id"
                    ))
                })?;
            info!(user_id = %user_id, email = %email, "Account already exists, returning it");
            return self.read_account(&user_id).await;
        }

        let mut attributes = input.attributes.clone();
        let groups = attributes
            .remove(GROUPS_ATTRIBUTE)
            .map(|value| match value {
                AttributeValue::Null => Ok(Vec::new()),
                AttributeValue::Array(ref items) => {
                    value_ids(&items.iter().filter(|v| !v.is_null()).collect::<Vec<_>>())
                }
                ref single => value_ids(&[single]),
            })
            .transpose()?
            .unwrap_or_default();

        let response = self
            .client
            .create_account(&Value::Object(attributes.to_json_object()))
            .await?;
        let user_id = created_user_id(&response).ok_or_else(|| {
            ConnectorError::invalid_data(format!(
                "create account response has no user_id: {response}"
            ))
        })?;
        info!(user_id = %user_id, email = %email, "Account created");

        for group_id in &groups {
            self.add_membership(&user_id, group_id).await?;
        }

        self.read_account(&user_id).await
    }
}

#[async_trait]
impl UpdateAccountOp for LandViewConnector {
    #[instrument(skip(self, changes), fields(changes = changes.len()))]
    async fn update_account(
        &self,
        identity: &str,
        changes: &[AttributeChange],
    ) -> ConnectorResult<AccountRecord> {
        let account = self.load_account(identity).await?;

        for change in changes {
            if let Err(e) = self.apply_change(&account.identity, change).await {
                warn!(
                    user_id = %account.identity,
                    op = %change.op,
                    attribute = %change.attribute,
                    error = %e,
                    "Account update failed"
                );
                return Err(e);
            }
        }

        self.read_account(&account.identity).await
    }
}

#[async_trait]
impl AccountStatusOp for LandViewConnector {
    #[instrument(skip(self))]
    async fn enable_account(&self, identity: &str) -> ConnectorResult<AccountRecord> {
        self.set_status(identity, STATUS_ACTIVE).await
    }

    #[instrument(skip(self))]
    async fn disable_account(&self, identity: &str) -> ConnectorResult<AccountRecord> {
        self.set_status(identity, STATUS_INACTIVE).await
    }
}

#[async_trait]
impl EntitlementOp for LandViewConnector {
    #[instrument(skip(self, sink))]
    async fn list_entitlements(
        &self,
        entitlement_type: &str,
        sink: &mut dyn ResultSink<EntitlementRecord>,
    ) -> ConnectorResult<()> {
        Self::check_entitlement_type(entitlement_type)?;

        let groups = self.client.get_groups().await?;
        for row in &groups {
            let group_id = id_field(row, "group_id").ok_or_else(|| {
                ConnectorError::invalid_data(format!("sys_group row has no group_id: {row}"))
            })?;
            sink.send(self.load_group(&group_id).await?.into())?;
        }

        let permissions = self.client.get_permissions().await?;
        for row in &permissions {
            let permission_id = id_field(row, "permission_id").ok_or_else(|| {
                ConnectorError::invalid_data(format!(
                    "sys_permission row has no permission_id: {row}"
                ))
            })?;
            sink.send(self.load_permission(&permission_id).await?.into())?;
        }

        info!(
            groups = groups.len(),
            permissions = permissions.len(),
            "Entitlement aggregation complete"
        );
        Ok(())
    }

    #[instrument(skip(self))]
    async fn read_entitlement(
        &self,
        identity: &str,
        entitlement_type: &str,
    ) -> ConnectorResult<EntitlementRecord> {
        Self::check_entitlement_type(entitlement_type)?;
        Ok(self.load_group(identity).await?.into())
    }
}
