//! Qualified names

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::schema::Revision;

/// Namespace and revision of the module a name belongs to
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QNameModule {
    pub namespace: String,
    pub revision: Option<Revision>,
}

impl QNameModule {
    #[must_use]
    pub fn new(namespace: &str, revision: Option<Revision>) -> Self {
        Self {
            namespace: namespace.to_string(),
            revision,
        }
    }
}

impl fmt::Display for QNameModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.revision {
            Some(rev) => write!(f, "{}?revision={rev}", self.namespace),
            None => f.write_str(&self.namespace),
        }
    }
}

/// Name of a schema node qualified by its module
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QName {
    pub module: QNameModule,
    pub local_name: String,
}

impl QName {
    #[must_use]
    pub fn new(module: &QNameModule, local_name: &str) -> Self {
        Self {
            module: module.clone(),
            local_name: local_name.to_string(),
        }
    }

    /// Sibling name in the same module
    #[must_use]
    pub fn sibling(&self, local_name: &str) -> Self {
        Self::new(&self.module, local_name)
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}){}", self.module, self.local_name)
    }
}
