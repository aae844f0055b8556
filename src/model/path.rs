//! Data tree and schema tree paths

use std::fmt;

use serde::{Deserialize, Serialize};

use super::QName;

/// Path to a node in a data tree
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InstanceIdentifier {
    steps: Vec<QName>,
}

impl InstanceIdentifier {
    /// Path of the data tree root
    #[must_use]
    pub const fn root() -> Self {
        Self { steps: Vec::new() }
    }

    /// Append a step
    #[must_use]
    pub fn node(mut self, name: QName) -> Self {
        self.steps.push(name);
        self
    }

    #[must_use]
    pub fn steps(&self) -> &[QName] {
        &self.steps
    }

    /// Name of the addressed node, `None` for the root
    #[must_use]
    pub fn last(&self) -> Option<&QName> {
        self.steps.last()
    }
}

impl fmt::Display for InstanceIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.steps.is_empty() {
            return f.write_str("/");
        }
        for step in &self.steps {
            write!(f, "/{step}")?;
        }
        Ok(())
    }
}

/// Path to a definition in the schema tree (rpc, notification, container)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SchemaPath {
    absolute: bool,
    steps: Vec<QName>,
}

impl SchemaPath {
    #[must_use]
    pub const fn create(absolute: bool, steps: Vec<QName>) -> Self {
        Self { absolute, steps }
    }

    /// Absolute path with a single step, the usual shape for rpcs and notifications
    #[must_use]
    pub fn top_level(name: QName) -> Self {
        Self::create(true, vec![name])
    }

    #[must_use]
    pub fn child(&self, name: QName) -> Self {
        let mut steps = self.steps.clone();
        steps.push(name);
        Self::create(self.absolute, steps)
    }

    #[must_use]
    pub const fn is_absolute(&self) -> bool {
        self.absolute
    }

    #[must_use]
    pub fn steps(&self) -> &[QName] {
        &self.steps
    }

    #[must_use]
    pub fn last(&self) -> Option<&QName> {
        self.steps.last()
    }
}

impl fmt::Display for SchemaPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self.steps.iter().map(ToString::to_string).collect();
        if self.absolute {
            write!(f, "/{}", names.join("/"))
        } else {
            f.write_str(&names.join("/"))
        }
    }
}
