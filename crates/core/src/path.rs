//! Path parsing and resolution
//!
//! Handles parsing of data paths in the format: alias/container[/key]
//! The key part addresses an object, a table, a table item or a stream,
//! depending on the operation.

use crate::error::{Error, Result};

/// A parsed path pointing to a location on a GridStore cluster
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemotePath {
    /// Alias name
    pub alias: String,
    /// Data container name
    pub container: String,
    /// Key within the container (empty for container root)
    pub key: String,
    /// Whether the path ends with a slash (directory semantics)
    pub is_dir: bool,
}

impl RemotePath {
    /// Create a new RemotePath
    pub fn new(
        alias: impl Into<String>,
        container: impl Into<String>,
        key: impl Into<String>,
    ) -> Self {
        let key = key.into();
        let is_dir = key.ends_with('/') || key.is_empty();
        Self {
            alias: alias.into(),
            container: container.into(),
            key,
            is_dir,
        }
    }

    /// Get the full path as a string (alias/container/key)
    pub fn to_full_path(&self) -> String {
        if self.key.is_empty() {
            format!("{}/{}", self.alias, self.container)
        } else {
            format!("{}/{}/{}", self.alias, self.container, self.key)
        }
    }

    /// Join a child path component
    pub fn join(&self, child: &str) -> Self {
        let base = self.key.trim_end_matches('/');
        let key = if base.is_empty() {
            child.to_string()
        } else {
            format!("{base}/{child}")
        };
        let is_dir = child.ends_with('/');
        Self {
            alias: self.alias.clone(),
            container: self.container.clone(),
            key,
            is_dir,
        }
    }

    /// Last component of the key (the object or item name)
    pub fn file_name(&self) -> &str {
        let key = self.key.trim_end_matches('/');
        match key.rfind('/') {
            Some(pos) => &key[pos + 1..],
            None => key,
        }
    }
}

impl std::fmt::Display for RemotePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_full_path())
    }
}

/// Parse a path string into a RemotePath
///
/// Paths have the format: alias/container[/key]
/// The alias and container parts are required; the key may be empty.
pub fn parse_remote_path(path: &str) -> Result<RemotePath> {
    if path.is_empty() {
        return Err(Error::InvalidPath("Path cannot be empty".into()));
    }

    let parts: Vec<&str> = path.splitn(3, '/').collect();

    match parts.len() {
        1 => Err(Error::InvalidPath(format!(
            "Path '{path}' is incomplete. Use format: alias/container[/key]"
        ))),
        2 => {
            let alias = parts[0];
            let container = parts[1];

            if !is_valid_alias_name(alias) {
                return Err(Error::InvalidPath(format!("Invalid alias name: {alias}")));
            }
            if container.is_empty() {
                return Err(Error::InvalidPath("Container name cannot be empty".into()));
            }

            Ok(RemotePath::new(alias, container, ""))
        }
        3 => {
            let alias = parts[0];
            let container = parts[1];
            let key = parts[2];

            if !is_valid_alias_name(alias) {
                return Err(Error::InvalidPath(format!("Invalid alias name: {alias}")));
            }
            if container.is_empty() {
                return Err(Error::InvalidPath("Container name cannot be empty".into()));
            }

            Ok(RemotePath::new(alias, container, key))
        }
        _ => unreachable!(),
    }
}

/// Check if a string is a valid alias name
fn is_valid_alias_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_path() {
        let path = parse_remote_path("mygrid/projects/data/file.txt").unwrap();
        assert_eq!(path.alias, "mygrid");
        assert_eq!(path.container, "projects");
        assert_eq!(path.key, "data/file.txt");
        assert!(!path.is_dir);
    }

    #[test]
    fn test_parse_dir_path() {
        let path = parse_remote_path("mygrid/projects/dir/").unwrap();
        assert_eq!(path.key, "dir/");
        assert!(path.is_dir);
    }

    #[test]
    fn test_parse_container_only() {
        let path = parse_remote_path("mygrid/projects").unwrap();
        assert_eq!(path.alias, "mygrid");
        assert_eq!(path.container, "projects");
        assert_eq!(path.key, "");
        assert!(path.is_dir);
    }

    #[test]
    fn test_parse_empty_path() {
        assert!(parse_remote_path("").is_err());
    }

    #[test]
    fn test_parse_alias_only() {
        assert!(parse_remote_path("mygrid").is_err());
    }

    #[test]
    fn test_parse_empty_container() {
        assert!(parse_remote_path("mygrid//key").is_err());
    }

    #[test]
    fn test_parse_bad_alias_name() {
        assert!(parse_remote_path("my.grid/projects/key").is_err());
    }

    #[test]
    fn test_remote_path_join() {
        let path = RemotePath::new("mygrid", "projects", "");
        let child = path.join("table/");
        assert_eq!(child.key, "table/");
        assert!(child.is_dir);

        let item = child.join("item-1");
        assert_eq!(item.key, "table/item-1");
        assert!(!item.is_dir);
    }

    #[test]
    fn test_remote_path_file_name() {
        let path = RemotePath::new("mygrid", "projects", "a/b/c.txt");
        assert_eq!(path.file_name(), "c.txt");

        let path = RemotePath::new("mygrid", "projects", "a/b/");
        assert_eq!(path.file_name(), "b");

        let path = RemotePath::new("mygrid", "projects", "plain");
        assert_eq!(path.file_name(), "plain");
    }

    #[test]
    fn test_remote_path_display() {
        let path = RemotePath::new("mygrid", "projects", "key/file.txt");
        assert_eq!(path.to_string(), "mygrid/projects/key/file.txt");

        let path = RemotePath::new("mygrid", "projects", "");
        assert_eq!(path.to_string(), "mygrid/projects");
    }
}
