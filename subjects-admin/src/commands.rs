//! Command-line commands and their execution.

use std::path::{Path, PathBuf};

use serde_json::{Value, json};
use subjects_repository::{OperationContext, SubjectGraphService};
use subjects_shared::{KnowledgeGraph, Scope, SubjectLookup};
use tracing::info;

use crate::AdminError;

pub const USAGE: &str = "usage: subjects-admin <ensure-schema | reset | import <file.json> | show <name>>";

/// An administrative command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Create the backend schema if it is missing.
    EnsureSchema,
    /// Delete every subject and relation in every scope.
    Reset,
    /// Import a `{"subjects": [{"name", "related_subjects"}]}` document.
    Import(PathBuf),
    /// Print a subject, its relations and its neighbourhood.
    Show(String),
}

impl Command {
    /// Parse the arguments that follow the program name.
    pub fn parse<S: AsRef<str>>(args: &[S]) -> Result<Self, AdminError> {
        let args: Vec<&str> = args.iter().map(|arg| arg.as_ref()).collect();
        match args.as_slice() {
            ["ensure-schema"] => Ok(Self::EnsureSchema),
            ["reset"] => Ok(Self::Reset),
            ["import", path] => Ok(Self::Import(PathBuf::from(path))),
            ["show", name] => Ok(Self::Show(name.to_string())),
            [] => Err(AdminError::usage(USAGE)),
            [other, ..] => Err(AdminError::usage(format!(
                "unrecognized arguments starting at '{}'\n{}",
                other, USAGE
            ))),
        }
    }
}

/// Read a knowledge-graph document from disk.
pub fn load_knowledge_graph(path: &Path) -> Result<KnowledgeGraph, AdminError> {
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

/// Run `command` against `service` and return the JSON report to print.
pub async fn execute(
    service: &SubjectGraphService,
    ctx: &OperationContext,
    command: &Command,
    scope: Option<&Scope>,
) -> Result<Value, AdminError> {
    match command {
        Command::EnsureSchema => {
            service.ensure_schema(ctx).await?;
            Ok(json!({ "status": "ok" }))
        }
        Command::Reset => {
            service.reset_all(ctx).await?;
            info!("All subjects and relations deleted");
            Ok(json!({ "status": "ok" }))
        }
        Command::Import(path) => {
            let graph = load_knowledge_graph(path)?;
            info!(path = %path.display(), subjects = graph.subjects.len(), "Importing knowledge graph");
            let summary = service.import_knowledge_graph(ctx, &graph, scope).await?;
            Ok(serde_json::to_value(summary)?)
        }
        Command::Show(name) => {
            let lookup = SubjectLookup::Name(name.clone());
            let view = service.get_with_relations(ctx, &lookup, scope).await?;
            let subgraph = service.knowledge_graph_for(ctx, &lookup, scope).await?;
            Ok(json!({
                "subject": view.subject,
                "related_to": view.related_to,
                "related_from": view.related_from,
                "knowledge_graph": subgraph,
            }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use subjects_repository::{ErrorKind, SubjectStoreConfig};
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::parse(&["ensure-schema"]).unwrap(), Command::EnsureSchema);
        assert_eq!(Command::parse(&["reset"]).unwrap(), Command::Reset);
        assert_eq!(
            Command::parse(&["import", "graph.json"]).unwrap(),
            Command::Import(PathBuf::from("graph.json"))
        );
        assert_eq!(
            Command::parse(&["show", "Physics"]).unwrap(),
            Command::Show("Physics".to_string())
        );
    }

    #[test]
    fn test_parse_rejects_bad_arguments() {
        let empty: [&str; 0] = [];
        assert!(matches!(Command::parse(&empty), Err(AdminError::UsageError(_))));
        assert!(matches!(Command::parse(&["import"]), Err(AdminError::UsageError(_))));
        assert!(matches!(
            Command::parse(&["reset", "--force"]),
            Err(AdminError::UsageError(_))
        ));
        assert!(matches!(Command::parse(&["drop"]), Err(AdminError::UsageError(_))));
    }

    #[tokio::test]
    async fn test_import_then_show() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(
            br#"{"subjects":[{"name":"Physics","related_subjects":["Mathematics"]},{"name":"Mathematics"}]}"#,
        )
        .unwrap();

        let service = SubjectGraphService::in_memory(SubjectStoreConfig::strict());
        let ctx = OperationContext::new();

        let report = execute(
            &service,
            &ctx,
            &Command::Import(file.path().to_path_buf()),
            None,
        )
        .await
        .unwrap();
        assert_eq!(report["subjects_created"], 2);
        assert_eq!(report["relations_created"], 1);

        let report = execute(&service, &ctx, &Command::Show("Mathematics".to_string()), None)
            .await
            .unwrap();
        assert_eq!(report["subject"]["name"], "Mathematics");
        assert_eq!(report["related_to"].as_array().unwrap().len(), 0);
        assert_eq!(report["related_from"].as_array().unwrap().len(), 1);
        assert_eq!(report["knowledge_graph"]["subjects"].as_array().unwrap().len(), 2);

        execute(&service, &ctx, &Command::Reset, None).await.unwrap();
        let err = execute(&service, &ctx, &Command::Show("Mathematics".to_string()), None)
            .await
            .unwrap_err();
        match err {
            AdminError::Repository(e) => assert_eq!(e.kind(), ErrorKind::NotFound),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[tokio::test]
    async fn test_import_missing_file() {
        let service = SubjectGraphService::in_memory(SubjectStoreConfig::strict());
        let err = execute(
            &service,
            &OperationContext::new(),
            &Command::Import(PathBuf::from("/nonexistent/graph.json")),
            None,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AdminError::Io(_)));
    }
}
