//! Tool registry storage

use std::collections::HashMap;

use super::{ToolCategory, ToolDescriptor};

/// Lookup table of tool descriptors.
///
/// Keeps registration order for `tools/list`; lookups go through a name index.
pub struct ToolRegistry {
    tools: Vec<ToolDescriptor>,
    index: HashMap<&'static str, usize>,
}

impl ToolRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            tools: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Create a registry holding the full tool catalog.
    pub fn with_catalog() -> Self {
        let mut registry = Self::new();
        for tool in super::catalog::all_tools() {
            registry.register(tool);
        }
        registry
    }

    /// Register a tool, replacing any previous tool with the same name.
    pub fn register(&mut self, tool: ToolDescriptor) {
        match self.index.get(tool.name) {
            Some(&slot) => self.tools[slot] = tool,
            None => {
                self.index.insert(tool.name, self.tools.len());
                self.tools.push(tool);
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&ToolDescriptor> {
        self.index.get(name).map(|&slot| &self.tools[slot])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Tool names in registration order.
    pub fn names(&self) -> Vec<&'static str> {
        self.tools.iter().map(|t| t.name).collect()
    }

    /// Tool names in one category, in registration order.
    pub fn by_category(&self, category: ToolCategory) -> Vec<&'static str> {
        self.tools
            .iter()
            .filter(|t| t.category == category)
            .map(|t| t.name)
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ToolDescriptor> {
        self.tools.iter()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
