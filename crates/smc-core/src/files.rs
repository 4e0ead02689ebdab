//! Wire contract of the remote file endpoints and the path rules the client
//! applies before the server canonicalizes anything.

use crate::api::ApiError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

pub const ROOT_PATH: &str = "/";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FileEntry {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    pub is_directory: bool,
    pub size: u64,
    pub modified_time: i64,
    pub permissions: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ListResponse {
    pub success: bool,
    pub current_path: String,
    pub files: Vec<FileEntry>,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReadResponse {
    pub success: bool,
    pub file_name: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified_time: Option<i64>,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AckResponse {
    pub success: bool,
    pub message: String,
}

/// `current_path` is the server's canonical echo, `requested_path` what the
/// client asked for. The server may echo the root as an absolute OS path, so
/// only the requested path tells whether this is the top level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryListing {
    pub current_path: String,
    pub requested_path: String,
    pub entries: Vec<FileEntry>,
}

impl DirectoryListing {
    pub fn is_root(&self) -> bool {
        self.requested_path == ROOT_PATH
    }

    pub fn find(&self, name: &str) -> Option<&FileEntry> {
        self.entries.iter().find(|entry| entry.name == name)
    }
}

/// Child under root is the bare name; anywhere else it is `parent/name`.
pub fn child_path(parent: &str, name: &str) -> String {
    if parent == ROOT_PATH {
        name.to_string()
    } else {
        format!("{parent}/{name}")
    }
}

/// Drops the last "/"-delimited segment, collapsing to root.
pub fn parent_path(path: &str) -> String {
    match path.rfind('/') {
        Some(0) | None => ROOT_PATH.to_string(),
        Some(index) => path[..index].to_string(),
    }
}

/// Last path segment, for display when the server omits a file name.
pub fn base_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOrigin {
    Save,
    Upload,
}

/// One file-manager round trip, described before it is sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileRequest {
    List {
        path: String,
    },
    Read {
        path: String,
    },
    Write {
        path: String,
        content: String,
        origin: WriteOrigin,
    },
    Create {
        path: String,
        is_directory: bool,
    },
    Rename {
        path: String,
        new_name: String,
    },
    Delete {
        path: String,
    },
}

impl FileRequest {
    pub fn endpoint(&self) -> &'static str {
        match self {
            FileRequest::List { .. } => "/api/files/list",
            FileRequest::Read { .. } => "/api/files/read",
            FileRequest::Write { .. } => "/api/files/write",
            FileRequest::Create { .. } => "/api/files/create",
            FileRequest::Rename { .. } => "/api/files/rename",
            FileRequest::Delete { .. } => "/api/files/delete",
        }
    }

    pub fn method(&self) -> HttpMethod {
        match self {
            FileRequest::Write { .. } => HttpMethod::Post,
            _ => HttpMethod::Get,
        }
    }

    pub fn path(&self) -> &str {
        match self {
            FileRequest::List { path }
            | FileRequest::Read { path }
            | FileRequest::Write { path, .. }
            | FileRequest::Create { path, .. }
            | FileRequest::Rename { path, .. }
            | FileRequest::Delete { path } => path.as_str(),
        }
    }

    /// Query parameters in wire order, token excluded.
    pub fn query(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("path", self.path().to_string())];
        match self {
            FileRequest::Create { is_directory, .. } => {
                pairs.push(("isDirectory", is_directory.to_string()));
            }
            FileRequest::Rename { new_name, .. } => {
                pairs.push(("newName", new_name.clone()));
            }
            _ => {}
        }
        pairs
    }

    pub fn body(&self) -> Option<&str> {
        match self {
            FileRequest::Write { content, .. } => Some(content.as_str()),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FileRequest::List { .. } => "list",
            FileRequest::Read { .. } => "read",
            FileRequest::Write {
                origin: WriteOrigin::Save,
                ..
            } => "save",
            FileRequest::Write {
                origin: WriteOrigin::Upload,
                ..
            } => "upload",
            FileRequest::Create {
                is_directory: true, ..
            } => "create directory",
            FileRequest::Create { .. } => "create file",
            FileRequest::Rename { .. } => "rename",
            FileRequest::Delete { .. } => "delete",
        }
    }

    pub fn is_mutation(&self) -> bool {
        !matches!(self, FileRequest::List { .. } | FileRequest::Read { .. })
    }
}

/// A successful, already-validated reply to a [`FileRequest`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileReply {
    Listing(ListResponse),
    Content(ReadResponse),
    Ack(AckResponse),
}

impl FileReply {
    /// Parses a response body with the shape the request expects and turns
    /// `success:false` into [`ApiError::Rejected`].
    pub fn from_body(request: &FileRequest, body: &str) -> Result<Self, ApiError> {
        match request {
            FileRequest::List { .. } => {
                let response: ListResponse = parse_body(body)?;
                ensure_success(response.success, &response.message)?;
                Ok(FileReply::Listing(response))
            }
            FileRequest::Read { .. } => {
                let response: ReadResponse = parse_body(body)?;
                ensure_success(response.success, &response.message)?;
                Ok(FileReply::Content(response))
            }
            _ => {
                let response: AckResponse = parse_body(body)?;
                ensure_success(response.success, &response.message)?;
                Ok(FileReply::Ack(response))
            }
        }
    }

    pub fn message(&self) -> &str {
        match self {
            FileReply::Listing(response) => response.message.as_str(),
            FileReply::Content(response) => response.message.as_str(),
            FileReply::Ack(response) => response.message.as_str(),
        }
    }
}

fn parse_body<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|err| ApiError::Malformed(err.to_string()))
}

fn ensure_success(success: bool, message: &str) -> Result<(), ApiError> {
    if success {
        Ok(())
    } else if message.trim().is_empty() {
        Err(ApiError::Rejected("request rejected".to_string()))
    } else {
        Err(ApiError::Rejected(message.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn child_under_root_is_bare_name() {
        assert_eq!(child_path("/", "x"), "x");
        assert_eq!(child_path("/srv", "x"), "/srv/x");
        assert_eq!(child_path("/srv/data", "notes.txt"), "/srv/data/notes.txt");
    }

    #[test]
    fn parent_strips_last_segment() {
        assert_eq!(parent_path("/a/b"), "/a");
        assert_eq!(parent_path("/a"), "/");
        assert_eq!(parent_path("/"), "/");
        assert_eq!(parent_path("a"), "/");
        assert_eq!(parent_path("a/b"), "a");
    }

    #[test]
    fn base_name_takes_last_segment() {
        assert_eq!(base_name("/srv/data/notes.txt"), "notes.txt");
        assert_eq!(base_name("notes.txt"), "notes.txt");
    }

    #[test]
    fn request_query_matches_endpoint_contract() {
        let create = FileRequest::Create {
            path: "/srv/new".to_string(),
            is_directory: true,
        };
        assert_eq!(create.endpoint(), "/api/files/create");
        assert_eq!(
            create.query(),
            vec![
                ("path", "/srv/new".to_string()),
                ("isDirectory", "true".to_string())
            ]
        );
        assert_eq!(create.method(), HttpMethod::Get);

        let rename = FileRequest::Rename {
            path: "a.txt".to_string(),
            new_name: "b.txt".to_string(),
        };
        assert_eq!(
            rename.query(),
            vec![
                ("path", "a.txt".to_string()),
                ("newName", "b.txt".to_string())
            ]
        );

        let write = FileRequest::Write {
            path: "/srv/a.txt".to_string(),
            content: "hello\n".to_string(),
            origin: WriteOrigin::Save,
        };
        assert_eq!(write.method(), HttpMethod::Post);
        assert_eq!(write.body(), Some("hello\n"));
        assert_eq!(write.query(), vec![("path", "/srv/a.txt".to_string())]);
        assert!(write.is_mutation());
        assert!(!FileRequest::List { path: "/".to_string() }.is_mutation());
    }

    #[test]
    fn list_body_parses_entries() {
        let request = FileRequest::List {
            path: "/".to_string(),
        };
        let body = r#"{
            "success": true,
            "currentPath": "/srv",
            "files": [
                {"name": "logs", "path": "/srv/logs", "isDirectory": true, "size": 4096,
                 "modifiedTime": 1700000000000, "permissions": "rwx"},
                {"name": "a.txt", "isDirectory": false, "size": 12,
                 "modifiedTime": 1700000000000, "permissions": "rw-"}
            ]
        }"#;
        let reply = FileReply::from_body(&request, body).expect("list reply");
        let FileReply::Listing(listing) = reply else {
            panic!("expected listing");
        };
        assert_eq!(listing.current_path, "/srv");
        assert_eq!(listing.files.len(), 2);
        assert!(listing.files[0].is_directory);
        assert_eq!(listing.files[1].path, None);
        assert_eq!(listing.message, "");
    }

    #[test]
    fn unsuccessful_body_becomes_rejection_with_server_message() {
        let request = FileRequest::Delete {
            path: "gone.txt".to_string(),
        };
        let err = FileReply::from_body(&request, r#"{"success":false,"message":"file missing"}"#)
            .expect_err("rejected");
        assert_eq!(err, ApiError::Rejected("file missing".to_string()));
        assert_eq!(err.to_string(), "file missing");
    }

    #[test]
    fn garbage_body_is_malformed() {
        let request = FileRequest::Read {
            path: "a".to_string(),
        };
        let err = FileReply::from_body(&request, "unauthorized").expect_err("malformed");
        assert!(matches!(err, ApiError::Malformed(_)));
    }
}
