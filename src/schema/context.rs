//! Compiled schema context: the set of modules a mount or codec understands

use thiserror::Error;

use super::{Revision, SourceIdentifier};
use crate::model::{QName, QNameModule};

/// Failures while assembling a schema context
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContextError {
    /// Two modules share name and revision
    #[error("duplicate module {0}")]
    DuplicateModule(SourceIdentifier),

    /// Two modules claim the same namespace and revision
    #[error("namespace {0} is declared by more than one module")]
    DuplicateNamespace(String),
}

/// Definitions contributed by one module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleInfo {
    pub name: String,
    pub module: QNameModule,
    /// Local names of `rpc` statements
    pub rpcs: Vec<String>,
    /// Local names of `notification` statements
    pub notifications: Vec<String>,
    /// Data tree paths defined by the module, as local names from the root
    pub data_paths: Vec<Vec<String>>,
}

impl ModuleInfo {
    /// Describe a module with no definitions yet
    #[must_use]
    pub fn new(name: &str, namespace: &str, revision: Option<Revision>) -> Self {
        Self {
            name: name.to_string(),
            module: QNameModule::new(namespace, revision),
            rpcs: Vec::new(),
            notifications: Vec::new(),
            data_paths: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_rpc(mut self, local_name: &str) -> Self {
        self.rpcs.push(local_name.to_string());
        self
    }

    #[must_use]
    pub fn with_notification(mut self, local_name: &str) -> Self {
        self.notifications.push(local_name.to_string());
        self
    }

    #[must_use]
    pub fn with_data_path(mut self, path: &[&str]) -> Self {
        self.data_paths
            .push(path.iter().map(ToString::to_string).collect());
        self
    }

    /// Identifier of the module source
    #[must_use]
    pub fn source_identifier(&self) -> SourceIdentifier {
        SourceIdentifier::new(&self.name, self.module.revision)
    }
}

/// Immutable set of modules
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaContext {
    modules: Vec<ModuleInfo>,
}

impl SchemaContext {
    /// Compile modules into a context
    ///
    /// # Errors
    ///
    /// Returns error if a module or namespace is declared twice
    pub fn from_modules(modules: Vec<ModuleInfo>) -> Result<Self, ContextError> {
        for (i, module) in modules.iter().enumerate() {
            for earlier in &modules[..i] {
                if earlier.name == module.name && earlier.module.revision == module.module.revision
                {
                    return Err(ContextError::DuplicateModule(module.source_identifier()));
                }
                if earlier.module == module.module {
                    return Err(ContextError::DuplicateNamespace(module.module.to_string()));
                }
            }
        }
        Ok(Self { modules })
    }

    /// All modules in declaration order
    #[must_use]
    pub fn modules(&self) -> &[ModuleInfo] {
        &self.modules
    }

    /// Find a module by name, newest revision when `revision` is `None`
    #[must_use]
    pub fn find_module(&self, name: &str, revision: Option<Revision>) -> Option<&ModuleInfo> {
        let mut candidates = self.modules.iter().filter(|m| m.name == name);
        match revision {
            Some(rev) => candidates.find(|m| m.module.revision == Some(rev)),
            None => candidates.max_by_key(|m| m.module.revision),
        }
    }

    /// Find the module owning a namespace
    #[must_use]
    pub fn find_module_by_namespace(&self, module: &QNameModule) -> Option<&ModuleInfo> {
        self.modules.iter().find(|m| &m.module == module)
    }

    /// Whether an `rpc` with this name is defined
    #[must_use]
    pub fn has_rpc(&self, name: &QName) -> bool {
        self.find_module_by_namespace(&name.module)
            .is_some_and(|m| m.rpcs.iter().any(|r| *r == name.local_name))
    }

    /// Whether a `notification` with this name is defined
    #[must_use]
    pub fn has_notification(&self, name: &QName) -> bool {
        self.find_module_by_namespace(&name.module)
            .is_some_and(|m| m.notifications.iter().any(|n| *n == name.local_name))
    }

    /// Whether a data tree path is defined, all steps in the first step's namespace
    #[must_use]
    pub fn has_data_path(&self, path: &[QName]) -> bool {
        let Some(first) = path.first() else {
            return false;
        };
        if path.iter().any(|q| q.module != first.module) {
            return false;
        }
        self.find_module_by_namespace(&first.module).is_some_and(|m| {
            m.data_paths.iter().any(|p| {
                p.len() == path.len() && p.iter().zip(path).all(|(l, q)| *l == q.local_name)
            })
        })
    }

    /// Identifiers of every module source in the context
    #[must_use]
    pub fn source_identifiers(&self) -> Vec<SourceIdentifier> {
        self.modules.iter().map(ModuleInfo::source_identifier).collect()
    }
}
