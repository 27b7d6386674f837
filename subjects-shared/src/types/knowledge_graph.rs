//! Name-based knowledge-graph document used for bulk import and subgraph export.
//!
//! The document lists subjects by name along with the names of the subjects
//! each one relates to:
//!
//! ```json
//! { "subjects": [ { "name": "cooking", "related_subjects": ["baking", "grilling"] } ] }
//! ```

use serde::{Deserialize, Serialize};

/// One subject of a knowledge-graph document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeGraphNode {
    pub name: String,
    #[serde(default)]
    pub related_subjects: Vec<String>,
}

impl KnowledgeGraphNode {
    pub fn new(name: impl Into<String>, related_subjects: Vec<String>) -> Self {
        Self {
            name: name.into(),
            related_subjects,
        }
    }
}

/// A set of subjects and their outgoing relations, keyed by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeGraph {
    pub subjects: Vec<KnowledgeGraphNode>,
}

impl KnowledgeGraph {
    /// Every distinct name mentioned in the document, either as a node or as a
    /// relation target, in first-seen order.
    pub fn subject_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for node in &self.subjects {
            for name in std::iter::once(&node.name).chain(node.related_subjects.iter()) {
                if !names.contains(&name.as_str()) {
                    names.push(name.as_str());
                }
            }
        }
        names
    }

    /// Every `(subject, related_subject)` name pair in document order.
    pub fn relation_pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.subjects.iter().flat_map(|node| {
            node.related_subjects
                .iter()
                .map(move |related| (node.name.as_str(), related.as_str()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_without_related_subjects() {
        let graph: KnowledgeGraph =
            serde_json::from_str(r#"{"subjects":[{"name":"cooking"}]}"#).unwrap();
        assert_eq!(graph.subjects.len(), 1);
        assert!(graph.subjects[0].related_subjects.is_empty());
    }

    #[test]
    fn test_subject_names_include_targets_once() {
        let graph = KnowledgeGraph {
            subjects: vec![
                KnowledgeGraphNode::new("cooking", vec!["baking".into(), "grilling".into()]),
                KnowledgeGraphNode::new("baking", vec!["cooking".into()]),
            ],
        };
        assert_eq!(graph.subject_names(), vec!["cooking", "baking", "grilling"]);
        assert_eq!(graph.relation_pairs().count(), 3);
    }
}
