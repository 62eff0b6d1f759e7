use anyhow::Context;
use std::fs;
use std::path::Path;

pub const EXAMPLE_SCHEMA: &str = "CREATE TABLE Users (
    UserID int NOT NULL PRIMARY KEY,
    LastName varchar(255) NOT NULL,
    FirstName varchar(255),
    Email varchar(255) UNIQUE
);

CREATE TABLE Orders (
    OrderID int NOT NULL PRIMARY KEY,
    OrderNumber int NOT NULL,
    UserID int,
    FOREIGN KEY (UserID) REFERENCES Users(UserID)
);";

pub const EXAMPLE_QUERY: &str =
    "SELECT UserID, FirsName FROM Users WHERE Email = 'test@example.com'";

/// Picks inline text over file content over the example. Nothing given yields an
/// empty string so the submission gate can reject it.
pub fn resolve(
    text: Option<String>,
    file: Option<&Path>,
    example: Option<&str>,
) -> Result<String, anyhow::Error> {
    if let Some(text) = text {
        return Ok(text);
    }
    if let Some(path) = file {
        return fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()));
    }
    Ok(example.unwrap_or_default().to_string())
}
