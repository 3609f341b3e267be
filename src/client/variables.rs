//! Built-in design variable table
//!
//! The Figma REST API has no variables endpoint on non-enterprise plans, so
//! the table is static rather than derived from the file's styles.

use super::models::{DesignVariable, VariableTable};

const BUILTIN_VARIABLES: &[(&str, &str, &str)] = &[
    ("color/primary", "color", "#2563EB"),
    ("color/secondary", "color", "#7C3AED"),
    ("color/background", "color", "#FFFFFF"),
    ("color/surface", "color", "#F8FAFC"),
    ("color/text", "color", "#0F172A"),
    ("color/muted", "color", "#64748B"),
    ("spacing/xs", "spacing", "4px"),
    ("spacing/sm", "spacing", "8px"),
    ("spacing/md", "spacing", "16px"),
    ("spacing/lg", "spacing", "24px"),
    ("spacing/xl", "spacing", "40px"),
    ("radius/sm", "radius", "4px"),
    ("radius/md", "radius", "8px"),
    ("radius/full", "radius", "9999px"),
    ("font/family/body", "typography", "Inter"),
    ("font/size/body", "typography", "16px"),
    ("font/size/heading", "typography", "32px"),
];

/// The built-in variable table
pub fn builtin_variables() -> VariableTable {
    VariableTable {
        source: "static".to_string(),
        variables: BUILTIN_VARIABLES
            .iter()
            .map(|(name, category, value)| DesignVariable {
                name: name.to_string(),
                category: category.to_string(),
                value: value.to_string(),
            })
            .collect(),
    }
}
