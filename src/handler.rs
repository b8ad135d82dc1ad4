//! Per-query entry point: locate tools, resolve preferences, search, format.

use crate::deps::{ExecutableProbe, Locator, SystemPath};
use crate::output::{DisplayItem, QueryState, format};
use crate::prefs::{RawPreferences, resolve};
use crate::search::{ProcessPipeline, SearchPipeline};
use tracing::{debug, info_span};

/// Answers host queries. Holds no per-query state, so one handler can
/// serve any number of independent calls.
pub struct QueryHandler<P = ProcessPipeline, E = SystemPath> {
    locator: Locator<E>,
    pipeline: P,
}

impl QueryHandler {
    /// Handler using the process `PATH` and real child processes
    pub fn new() -> Self {
        Self {
            locator: Locator::system(),
            pipeline: ProcessPipeline,
        }
    }
}

impl Default for QueryHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: SearchPipeline, E: ExecutableProbe> QueryHandler<P, E> {
    pub fn with_parts(locator: Locator<E>, pipeline: P) -> Self {
        Self { locator, pipeline }
    }

    /// Handle one query from the host
    pub fn handle(&self, query: &str, raw: &RawPreferences) -> Vec<DisplayItem> {
        let span = info_span!("query", query);
        let _guard = span.enter();

        format(self.evaluate(query, raw))
    }

    /// Walk the query through its states in priority order:
    /// configuration errors, then empty query, then the pipeline.
    pub fn evaluate(&self, query: &str, raw: &RawPreferences) -> QueryState {
        let (binding, mut errors) = self.locator.locate();

        let config = match resolve(raw) {
            Ok(config) if errors.is_empty() => config,
            Ok(_) => return QueryState::Errors(errors),
            Err(invalid) => {
                errors.extend(invalid.into_messages());
                return QueryState::Errors(errors);
            }
        };

        if query.is_empty() {
            debug!("Empty query, prompting for input");
            return QueryState::EmptyQuery;
        }

        QueryState::Searched(self.pipeline.run(query, &config, &binding))
    }
}
