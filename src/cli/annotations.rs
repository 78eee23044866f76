//! List the annotations of a document

use super::CliError;
use crate::{NodePath, output::to_json};

/// One annotation, with the node it is attached to.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationEntry {
    pub path: NodePath,
    pub name: String,
    /// Arguments rendered as compact JSON
    pub arguments: Vec<String>,
}

impl std::fmt::Display for AnnotationEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}\t@{}", self.path, self.name)?;
        if !self.arguments.is_empty() {
            write!(f, "({})", self.arguments.join(", "))?;
        }
        Ok(())
    }
}

/// Parse `source` and list every annotation in source order.
pub fn list_annotations(source: &str) -> Result<Vec<AnnotationEntry>, CliError> {
    let document = crate::parse(source)?;

    Ok(document
        .annotations()
        .flat_map(|(path, annotations)| {
            annotations.iter().map(move |annotation| AnnotationEntry {
                path: path.clone(),
                name: annotation.name.clone(),
                arguments: annotation.arguments.iter().map(to_json).collect(),
            })
        })
        .collect())
}
