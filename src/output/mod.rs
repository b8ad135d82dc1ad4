//! Display items handed back to the host, and the formatter that turns a
//! query's outcome into them.

pub mod print;

use crate::search::PipelineOutcome;
use crate::utils::paths::containing_dir;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const PROMPT_MESSAGE: &str = "Enter your search criteria.";
pub const NO_RESULTS_MESSAGE: &str = "No results found.";
pub const GENERIC_ERROR_MESSAGE: &str = "There was an error running this extension.";

/// Icon identifiers, serialized as the image paths hosts resolve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Icon {
    #[serde(rename = "images/icon.png")]
    Info,
    #[serde(rename = "images/error.png")]
    Error,
    #[serde(rename = "images/sub-icon.png")]
    Match,
}

impl Icon {
    pub fn path(self) -> &'static str {
        match self {
            Icon::Info => "images/icon.png",
            Icon::Error => "images/error.png",
            Icon::Match => "images/sub-icon.png",
        }
    }
}

/// What the host does when an item is activated
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Action {
    OpenPath { path: PathBuf },
    DoNothing,
}

/// One row of output for the host to render
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayItem {
    pub icon: Icon,
    pub name: String,
    pub on_enter: Action,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_alt_enter: Option<Action>,
    /// Rendered as a compact row (match items)
    #[serde(default)]
    pub compact: bool,
}

impl DisplayItem {
    /// Inert item carrying a message
    pub fn message(msg: impl Into<String>, icon: Icon) -> Self {
        Self {
            icon,
            name: msg.into(),
            on_enter: Action::DoNothing,
            on_alt_enter: None,
            compact: false,
        }
    }

    /// Item for a matched path: open it, or open the directory holding it
    pub fn path_match(path: &str) -> Self {
        let target = PathBuf::from(path);
        let container = containing_dir(&target);
        Self {
            icon: Icon::Match,
            name: path.to_string(),
            on_enter: Action::OpenPath { path: target },
            on_alt_enter: Some(Action::OpenPath { path: container }),
            compact: true,
        }
    }

    pub fn is_match(&self) -> bool {
        self.icon == Icon::Match
    }
}

/// Where a query ended up, in priority order
#[derive(Debug)]
pub enum QueryState {
    /// Missing dependencies and/or invalid preferences
    Errors(Vec<String>),
    /// Nothing typed yet; no pipeline was run
    EmptyQuery,
    /// The pipeline ran
    Searched(PipelineOutcome),
}

/// Turn a query's final state into display items
pub fn format(state: QueryState) -> Vec<DisplayItem> {
    match state {
        QueryState::Errors(errors) => no_op_items(errors, Icon::Error),
        QueryState::EmptyQuery => no_op_items([PROMPT_MESSAGE], Icon::Info),
        QueryState::Searched(PipelineOutcome::NoMatches) => {
            no_op_items([NO_RESULTS_MESSAGE], Icon::Info)
        }
        // Failure detail stays in the logs
        QueryState::Searched(PipelineOutcome::Failed(_)) => {
            no_op_items([GENERIC_ERROR_MESSAGE], Icon::Error)
        }
        QueryState::Searched(PipelineOutcome::Matches(found)) => found
            .paths
            .iter()
            .map(|path| DisplayItem::path_match(path))
            .collect(),
    }
}

fn no_op_items<I, S>(msgs: I, icon: Icon) -> Vec<DisplayItem>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    msgs.into_iter()
        .map(|msg| DisplayItem::message(msg, icon))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deps::ToolRole;
    use crate::search::{PipelineError, SearchResult};

    #[test]
    fn test_errors_become_error_items() {
        let items = format(QueryState::Errors(vec![
            "Missing dependency fzf. Please install fzf.".to_string(),
            "Result limit must be an integer.".to_string(),
        ]));

        assert_eq!(items.len(), 2);
        assert!(items.iter().all(|item| item.icon == Icon::Error));
        assert!(items.iter().all(|item| item.on_enter == Action::DoNothing));
        assert_eq!(items[1].name, "Result limit must be an integer.");
    }

    #[test]
    fn test_empty_query_prompts() {
        let items = format(QueryState::EmptyQuery);
        assert_eq!(items, vec![DisplayItem::message(PROMPT_MESSAGE, Icon::Info)]);
    }

    #[test]
    fn test_no_matches() {
        let items = format(QueryState::Searched(PipelineOutcome::NoMatches));
        assert_eq!(items, vec![DisplayItem::message(NO_RESULTS_MESSAGE, Icon::Info)]);
    }

    #[test]
    fn test_failure_is_generic() {
        let failure = PipelineError::Unbound {
            role: ToolRole::Filter,
        };
        let items = format(QueryState::Searched(PipelineOutcome::Failed(failure)));
        assert_eq!(
            items,
            vec![DisplayItem::message(GENERIC_ERROR_MESSAGE, Icon::Error)]
        );
    }

    #[test]
    fn test_matches_keep_order_and_actions() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("report.pdf");
        std::fs::write(&file, "pdf").unwrap();
        let dir_str = dir.path().to_string_lossy().to_string();
        let file_str = file.to_string_lossy().to_string();

        let found = SearchResult {
            paths: vec![file_str.clone(), dir_str.clone()],
        };
        let items = format(QueryState::Searched(PipelineOutcome::Matches(found)));

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].name, file_str);
        assert_eq!(items[0].on_enter, Action::OpenPath { path: file.clone() });
        assert_eq!(
            items[0].on_alt_enter,
            Some(Action::OpenPath {
                path: dir.path().to_path_buf()
            })
        );

        // A directory opens itself for the alternate action
        assert_eq!(
            items[1].on_alt_enter,
            Some(Action::OpenPath {
                path: dir.path().to_path_buf()
            })
        );
        assert!(items.iter().all(|item| item.compact && item.is_match()));
    }

    #[test]
    fn test_item_json_shape() {
        let item = DisplayItem::message(NO_RESULTS_MESSAGE, Icon::Info);
        let json = serde_json::to_value(&item).unwrap();

        assert_eq!(json["icon"], "images/icon.png");
        assert_eq!(json["on_enter"]["type"], "DoNothing");
        assert!(json.get("on_alt_enter").is_none());

        let parsed: DisplayItem = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, item);
    }
}
