//! Decorative profile directory fetched at startup.
//!
//! The directory is cosmetic sidebar content with no connection to presence:
//! the people listed here are not chat participants. A fetch failure is
//! logged and the client starts without it.

use serde::Deserialize;

use crate::error::ClientError;

/// Default public directory endpoint (15 random profiles, stable seed).
pub const DEFAULT_DIRECTORY_URL: &str = "https://randomuser.me/api/?results=15&seed=idobata";

/// One directory entry after flattening the provider's response shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryProfile {
    pub username: String,
    pub display_name: String,
    pub avatar: String,
}

#[derive(Debug, Deserialize)]
struct DirectoryDocument {
    results: Vec<DirectoryEntry>,
}

#[derive(Debug, Deserialize)]
struct DirectoryEntry {
    login: LoginField,
    name: NameField,
    picture: PictureField,
}

#[derive(Debug, Deserialize)]
struct LoginField {
    username: String,
}

#[derive(Debug, Deserialize)]
struct NameField {
    first: String,
    last: String,
}

#[derive(Debug, Deserialize)]
struct PictureField {
    large: String,
}

/// Fetch and flatten the profile directory.
pub async fn fetch_directory(url: &str) -> Result<Vec<DirectoryProfile>, ClientError> {
    let response = reqwest::get(url)
        .await
        .map_err(|e| ClientError::Directory(e.to_string()))?
        .error_for_status()
        .map_err(|e| ClientError::Directory(e.to_string()))?;
    let body = response
        .text()
        .await
        .map_err(|e| ClientError::Directory(e.to_string()))?;
    parse_directory(&body)
}

/// Parse a directory response document.
pub fn parse_directory(body: &str) -> Result<Vec<DirectoryProfile>, ClientError> {
    let document: DirectoryDocument =
        serde_json::from_str(body).map_err(|e| ClientError::Directory(e.to_string()))?;
    Ok(document
        .results
        .into_iter()
        .map(|entry| DirectoryProfile {
            username: entry.login.username,
            display_name: format!("{} {}", entry.name.first, entry.name.last),
            avatar: entry.picture.large,
        })
        .collect())
}
