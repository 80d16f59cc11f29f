use crate::datamodel::{DataQuery, DataResult};
use crate::error::CheckError;
use std::collections::{HashMap, HashSet};

/// Matches fetch results back to the queries they answer.
///
/// A query is used once a result with at least one datapoint came back for
/// it; every other query stays unused.
#[derive(Debug)]
pub struct Reconciler<'q> {
    queries: &'q [DataQuery],
    by_id: HashMap<&'q str, usize>,
    used: Vec<bool>,
}

impl<'q> Reconciler<'q> {
    pub fn new(queries: &'q [DataQuery]) -> Self {
        let by_id = queries
            .iter()
            .enumerate()
            .map(|(index, query)| (query.id.as_str(), index))
            .collect();
        Self {
            queries,
            by_id,
            used: vec![false; queries.len()],
        }
    }

    /// Resolve every result of one fetch response to its query.
    ///
    /// Fails on an unknown identifier or on an identifier repeated within the
    /// same response.
    pub fn resolve<'r>(
        &mut self,
        results: &'r [DataResult],
    ) -> Result<Vec<(&'q DataQuery, &'r DataResult)>, CheckError> {
        let queries = self.queries;
        let mut seen: HashSet<&str> = HashSet::with_capacity(results.len());
        let mut resolved = Vec::with_capacity(results.len());

        for result in results {
            let index = *self
                .by_id
                .get(result.id.as_str())
                .ok_or_else(|| CheckError::Reconciliation {
                    id: result.id.clone(),
                })?;
            if !seen.insert(result.id.as_str()) {
                return Err(CheckError::DuplicateResult {
                    id: result.id.clone(),
                });
            }
            if result.has_datapoints() {
                self.used[index] = true;
            }
            resolved.push((&queries[index], result));
        }

        Ok(resolved)
    }

    /// Mark queries as used without a fetch, for dry runs.
    pub fn mark_used(&mut self, batch: &[DataQuery]) {
        for query in batch {
            if let Some(&index) = self.by_id.get(query.id.as_str()) {
                self.used[index] = true;
            }
        }
    }

    pub fn used_count(&self) -> usize {
        self.used.iter().filter(|used| **used).count()
    }

    pub fn unused(&self) -> impl Iterator<Item = &'q DataQuery> + '_ {
        self.queries
            .iter()
            .zip(&self.used)
            .filter(|(_, used)| !**used)
            .map(|(query, _)| query)
    }
}
