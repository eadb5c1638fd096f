use std::collections::HashSet;
use std::str::FromStr;

use crate::error::DomainError;

/// Capabilities an authenticated caller may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    AddPost,
    ChangePost,
    DeletePost,
    AddCategory,
}

/// Everything needed to create, edit or delete posts.
pub const POST_EDITOR: [Permission; 3] = [
    Permission::AddPost,
    Permission::ChangePost,
    Permission::DeletePost,
];

impl Permission {
    pub fn as_str(self) -> &'static str {
        match self {
            Permission::AddPost => "news.add_post",
            Permission::ChangePost => "news.change_post",
            Permission::DeletePost => "news.delete_post",
            Permission::AddCategory => "news.add_category",
        }
    }
}

impl FromStr for Permission {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "news.add_post" => Ok(Permission::AddPost),
            "news.change_post" => Ok(Permission::ChangePost),
            "news.delete_post" => Ok(Permission::DeletePost),
            "news.add_category" => Ok(Permission::AddCategory),
            _ => Err(()),
        }
    }
}

/// The party on whose behalf a service operation runs.
#[derive(Debug, Clone, Default)]
pub struct Caller {
    permissions: HashSet<Permission>,
}

impl Caller {
    /// A caller holding no permissions at all.
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn with_permissions(permissions: impl IntoIterator<Item = Permission>) -> Self {
        Self {
            permissions: permissions.into_iter().collect(),
        }
    }

    /// Build a caller from permission names, skipping names we do not know.
    pub fn from_names<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        Self::with_permissions(names.into_iter().filter_map(|n| n.parse().ok()))
    }

    pub fn has(&self, permission: Permission) -> bool {
        self.permissions.contains(&permission)
    }

    /// Fails with `Forbidden` naming the first permission the caller lacks.
    pub fn require(&self, required: &[Permission]) -> Result<(), DomainError> {
        match required.iter().find(|p| !self.has(**p)) {
            Some(missing) => Err(DomainError::Forbidden(missing.as_str())),
            None => Ok(()),
        }
    }
}
