// Gravity database groups
//
// Groups are the one resource with a structured JSON wire format and an
// update operation. All group operations are session-only; the token
// interface has no group surface.

use reqwest::{Method, StatusCode};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::client::{AuthMode, Client};
use crate::error::Error;
use crate::models::{Group, GroupCreateRequest, GroupUpdateRequest, timestamp};

#[derive(Debug, Deserialize)]
struct GroupsResponse {
    #[serde(default)]
    groups: Vec<GroupEntry>,
}

#[derive(Debug, Deserialize)]
struct GroupEntry {
    id: i64,
    name: String,
    #[serde(default)]
    comment: Option<String>,
    enabled: bool,
    #[serde(default)]
    date_added: i64,
    #[serde(default)]
    date_modified: i64,
}

impl GroupEntry {
    fn into_group(self) -> Group {
        Group {
            id: self.id,
            enabled: self.enabled,
            name: self.name,
            date_added: timestamp(self.date_added),
            date_modified: timestamp(self.date_modified),
            description: self.comment.unwrap_or_default(),
        }
    }
}

/// Group names must not contain any whitespace.
fn valid_group_name(name: &str) -> bool {
    !name.chars().any(char::is_whitespace)
}

impl Client {
    /// List the gravity database groups.
    ///
    /// `GET /api/groups` -> 200. Not available in token mode.
    pub async fn list_groups(&self) -> Result<Vec<Group>, Error> {
        match &self.mode {
            AuthMode::Token(_) => Err(Error::NotImplementedTokenClient {
                operation: "list groups",
            }),
            AuthMode::Session(session) => {
                debug!("listing groups");
                let res = session.send(Method::GET, "/api/groups", None).await?;

                let status = res.status();
                if status != StatusCode::OK {
                    return Err(Error::UnexpectedStatus {
                        operation: "list groups",
                        status: status.as_u16(),
                    });
                }

                let body = res.text().await?;
                let parsed: GroupsResponse =
                    serde_json::from_str(&body).map_err(|e| Error::Deserialization {
                        message: e.to_string(),
                        body,
                    })?;

                Ok(parsed
                    .groups
                    .into_iter()
                    .map(GroupEntry::into_group)
                    .collect())
            }
        }
    }

    /// Look up a group by name via a scan over the list result.
    pub async fn get_group(&self, name: &str) -> Result<Group, Error> {
        match &self.mode {
            AuthMode::Token(_) => Err(Error::NotImplementedTokenClient {
                operation: "get group",
            }),
            AuthMode::Session(_) => {
                let groups = self.list_groups().await?;
                groups
                    .into_iter()
                    .find(|g| g.name == name)
                    .ok_or_else(|| Error::NotFound {
                        message: format!("group with name {name:?} not found"),
                    })
            }
        }
    }

    /// Look up a group by its numeric id.
    pub async fn get_group_by_id(&self, id: i64) -> Result<Group, Error> {
        match &self.mode {
            AuthMode::Token(_) => Err(Error::NotImplementedTokenClient {
                operation: "get group",
            }),
            AuthMode::Session(_) => {
                let groups = self.list_groups().await?;
                groups
                    .into_iter()
                    .find(|g| g.id == id)
                    .ok_or_else(|| Error::NotFound {
                        message: format!("group with id {id} not found"),
                    })
            }
        }
    }

    /// Create a group.
    ///
    /// Names containing whitespace are rejected locally, before any
    /// request is issued. `POST /api/groups` -> 201, then the group is
    /// re-read by name (the mutation response carries no canonical
    /// record).
    pub async fn create_group(&self, request: &GroupCreateRequest) -> Result<Group, Error> {
        match &self.mode {
            AuthMode::Token(_) => Err(Error::NotImplementedTokenClient {
                operation: "create group",
            }),
            AuthMode::Session(session) => {
                let name = request.name.trim();
                if !valid_group_name(name) {
                    return Err(Error::InvalidGroupName {
                        name: request.name.clone(),
                    });
                }

                debug!(name, "creating group");
                let body = json!({
                    "name": request.name,
                    "comment": request.description,
                });
                let res = session
                    .send(Method::POST, "/api/groups", Some(&body))
                    .await?;

                let status = res.status();
                if status != StatusCode::CREATED {
                    return Err(Error::UnexpectedStatus {
                        operation: "create group",
                        status: status.as_u16(),
                    });
                }

                self.get_group(name).await
            }
        }
    }

    /// Update a group, addressed by name.
    ///
    /// `PUT /api/groups/<name>` -> 200, then the group is re-read.
    pub async fn update_group(&self, request: &GroupUpdateRequest) -> Result<Group, Error> {
        match &self.mode {
            AuthMode::Token(_) => Err(Error::NotImplementedTokenClient {
                operation: "update group",
            }),
            AuthMode::Session(session) => {
                debug!(name = %request.name, "updating group");
                let path = format!("/api/groups/{}", request.name);
                let body = json!({
                    "name": request.name,
                    "comment": request.description,
                    "enabled": request.enabled,
                });
                let res = session.send(Method::PUT, &path, Some(&body)).await?;

                let status = res.status();
                if status != StatusCode::OK {
                    return Err(Error::UnexpectedStatus {
                        operation: "update group",
                        status: status.as_u16(),
                    });
                }

                self.get_group(&request.name).await
            }
        }
    }

    /// Delete a group by name.
    ///
    /// `DELETE /api/groups/<name>` -> 204
    pub async fn delete_group(&self, name: &str) -> Result<(), Error> {
        match &self.mode {
            AuthMode::Token(_) => Err(Error::NotImplementedTokenClient {
                operation: "delete group",
            }),
            AuthMode::Session(session) => {
                debug!(name, "deleting group");
                let path = format!("/api/groups/{name}");
                let res = session.send(Method::DELETE, &path, None).await?;

                let status = res.status();
                if status != StatusCode::NO_CONTENT {
                    return Err(Error::UnexpectedStatus {
                        operation: "delete group",
                        status: status.as_u16(),
                    });
                }

                Ok(())
            }
        }
    }
}
