//! Graph commands (RedisGraph module)

use std::collections::HashMap;

use crate::codec::Codecs;
use crate::error::{RedisError, Result};
use crate::executor::{Direct, Executor, RedisFuture, Request};
use crate::marshaller::{decode_strings, Role, Slot};
use crate::protocol::{Command, Reply};
use crate::validation;

/// Decoded `GRAPH.QUERY` reply
///
/// Cells are kept as reply nodes: scalars decode with the usual `Reply`
/// conversions, nodes and relations stay as nested arrays.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GraphQueryResult {
    pub columns: Vec<String>,
    pub rows: Vec<HashMap<String, Reply>>,
    /// Execution statistics (`Nodes created: 1`, `Query internal execution time: ...`)
    pub statistics: Vec<String>,
}

impl GraphQueryResult {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cell of `column` in row `index`
    pub fn get(&self, index: usize, column: &str) -> Option<&Reply> {
        self.rows.get(index)?.get(column)
    }
}

/// A header cell is either the column name or `[type, name]`
fn column_name(cell: &Reply) -> Result<String> {
    match cell {
        Reply::Array(parts) => parts
            .last()
            .ok_or_else(|| RedisError::Decoding("empty graph header cell".to_string()))?
            .to_string_value(),
        scalar => scalar.to_string_value(),
    }
}

fn decode_graph(reply: Reply) -> Result<GraphQueryResult> {
    let mut parts = reply.into_array()?;
    match parts.len() {
        // Write-only queries return statistics alone
        1 => Ok(GraphQueryResult {
            statistics: decode_strings(&parts[0])?,
            ..Default::default()
        }),
        3 => {
            let statistics = decode_strings(&parts[2])?;
            let columns = parts[0]
                .as_array()?
                .iter()
                .map(column_name)
                .collect::<Result<Vec<_>>>()?;

            let raw_rows = std::mem::replace(&mut parts[1], Reply::Nil).into_array()?;
            let mut rows = Vec::with_capacity(raw_rows.len());
            for row in raw_rows {
                let cells = row.into_array()?;
                if cells.len() != columns.len() {
                    return Err(RedisError::Decoding(format!(
                        "graph row has {} cells for {} columns",
                        cells.len(),
                        columns.len()
                    )));
                }
                rows.push(columns.iter().cloned().zip(cells).collect());
            }

            Ok(GraphQueryResult {
                columns,
                rows,
                statistics,
            })
        }
        n => Err(RedisError::Decoding(format!(
            "graph reply must have 1 or 3 parts, got {}",
            n
        ))),
    }
}

pub struct GraphCommands<K, E = Direct> {
    executor: E,
    keys: Slot<K>,
}

impl<K, E> GraphCommands<K, E>
where
    K: Send + 'static,
    E: Executor,
{
    pub(crate) fn new(executor: E, codecs: &Codecs) -> Result<Self> {
        Ok(Self {
            executor,
            keys: codecs.slot(Role::Key)?,
        })
    }

    /// Run a Cypher query against the graph stored at `key`
    pub fn graph_query(&self, key: &K, query: &str) -> RedisFuture<E::Output<GraphQueryResult>> {
        self.executor.run(|| {
            validation::not_blank(query, "query")?;
            let command = Command::new("GRAPH.QUERY")
                .put(self.keys.encode(key)?)
                .put(query);
            Ok(Request::new(command, decode_graph))
        })
    }

    pub fn graph_delete(&self, key: &K) -> RedisFuture<E::Output<()>> {
        self.executor.run(|| {
            let command = Command::new("GRAPH.DELETE").put(self.keys.encode(key)?);
            Ok(Request::new(command, |reply| reply.to_unit()))
        })
    }

    pub fn graph_list(&self) -> RedisFuture<E::Output<Vec<String>>> {
        self.executor.run(|| {
            let command = Command::new("GRAPH.LIST");
            Ok(Request::new(command, |reply| decode_strings(&reply)))
        })
    }
}
