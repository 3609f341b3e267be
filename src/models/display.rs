//! Display model implementations for table and JSON output

use serde::Serialize;
use tabled::Tabled;

use crate::cache::CacheStats;
use crate::client::models::{DesignVariable, NodeMetadata, PageSummary};

/// Node row: the node itself followed by its direct children.
#[derive(Debug, Clone, Tabled, Serialize)]
pub struct NodeDisplay {
    #[tabled(rename = "NODE ID")]
    pub id: String,

    #[tabled(rename = "NAME")]
    pub name: String,

    #[tabled(rename = "TYPE")]
    #[serde(rename = "type")]
    pub node_type: String,

    /// `W×H`, or `-` when the node has no bounding box
    #[tabled(rename = "SIZE")]
    pub size: String,

    #[tabled(rename = "CHILDREN")]
    pub children: usize,
}

impl From<&NodeMetadata> for NodeDisplay {
    fn from(node: &NodeMetadata) -> Self {
        let size = node
            .bounds
            .as_ref()
            .map(|b| format!("{}×{}", b.width.round(), b.height.round()))
            .unwrap_or_else(|| "-".to_string());

        Self {
            id: node.id.clone(),
            name: node.name.clone(),
            node_type: node.node_type.clone(),
            size,
            children: node.children.len(),
        }
    }
}

impl NodeDisplay {
    /// Rows for a node and its direct children
    pub fn rows(node: &NodeMetadata) -> Vec<Self> {
        std::iter::once(node)
            .chain(node.children.iter())
            .map(Self::from)
            .collect()
    }
}

/// Page row for `file` output.
#[derive(Debug, Clone, Tabled, Serialize)]
pub struct PageDisplay {
    #[tabled(rename = "PAGE ID")]
    pub id: String,

    #[tabled(rename = "NAME")]
    pub name: String,
}

impl From<&PageSummary> for PageDisplay {
    fn from(page: &PageSummary) -> Self {
        Self {
            id: page.id.clone(),
            name: page.name.clone(),
        }
    }
}

/// Design variable row.
#[derive(Debug, Clone, Tabled, Serialize)]
pub struct VariableDisplay {
    #[tabled(rename = "NAME")]
    pub name: String,

    #[tabled(rename = "CATEGORY")]
    pub category: String,

    #[tabled(rename = "VALUE")]
    pub value: String,
}

impl From<&DesignVariable> for VariableDisplay {
    fn from(variable: &DesignVariable) -> Self {
        Self {
            name: variable.name.clone(),
            category: variable.category.clone(),
            value: variable.value.clone(),
        }
    }
}

/// Cache statistics row.
#[derive(Debug, Clone, Tabled, Serialize)]
pub struct StatsDisplay {
    #[tabled(rename = "TOTAL")]
    pub total: usize,

    #[tabled(rename = "VALID")]
    pub valid: usize,

    #[tabled(rename = "EXPIRED")]
    pub expired: usize,

    #[tabled(rename = "DEFAULT TTL")]
    pub default_ttl: String,
}

impl From<&CacheStats> for StatsDisplay {
    fn from(stats: &CacheStats) -> Self {
        Self {
            total: stats.total_entries,
            valid: stats.valid_entries,
            expired: stats.expired_entries,
            default_ttl: format!("{}m", stats.default_ttl_minutes),
        }
    }
}

/// One batch step outcome.
#[derive(Debug, Clone, Tabled, Serialize)]
pub struct BatchStepDisplay {
    #[tabled(rename = "#")]
    pub step: usize,

    #[tabled(rename = "OP")]
    pub op: String,

    #[tabled(rename = "TARGET")]
    pub target: String,

    #[tabled(rename = "STATUS")]
    pub status: String,

    #[tabled(rename = "DETAIL")]
    pub detail: String,
}
