//! Full-text search commands (RediSearch module)
//!
//! ## FT.SEARCH reply shapes
//! ```text
//! RESP2: [total, key1, [f1, v1, ...], key2, [f1, v1, ...], ...]
//!        (a score follows each key with WITHSCORES, the field list is
//!         absent with NOCONTENT)
//! RESP3: {total_results: n, results: [{id, score?, extra_attributes: {..}}, ...]}
//! ```

use std::collections::HashMap;

use crate::error::{RedisError, Result};
use crate::executor::{Direct, Executor, RedisFuture, Request};
use crate::marshaller::{decode_pairs, decode_strings};
use crate::protocol::{Args, Command, Reply};
use crate::validation;

/// One matching document
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub key: String,
    pub score: Option<f64>,
    pub properties: HashMap<String, String>,
}

/// Decoded `FT.SEARCH` reply
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SearchResult {
    /// Total number of matches, which may exceed `documents.len()` (paging)
    pub total: i64,
    pub documents: Vec<Document>,
}

impl SearchResult {
    pub fn count(&self) -> usize {
        self.documents.len()
    }

    pub fn document(&self, key: &str) -> Option<&Document> {
        self.documents.iter().find(|d| d.key == key)
    }
}

fn decode_properties(reply: &Reply) -> Result<HashMap<String, String>> {
    Ok(decode_pairs(reply, Reply::to_string_value, Reply::to_string_value)?
        .into_iter()
        .collect())
}

#[derive(Debug, Clone, Copy)]
struct SearchShape {
    with_scores: bool,
    no_content: bool,
}

impl SearchShape {
    /// Read the reply-shaping flags from the caller's `FT.SEARCH` options
    ///
    /// Operands of other options are skipped, so a parameter value or a
    /// returned field spelled like a flag does not change the shape.
    fn from_args(args: &Args) -> Self {
        let mut shape = Self {
            with_scores: false,
            no_content: false,
        };
        let mut tokens = args.as_slice().iter();
        while let Some(token) = tokens.next() {
            let token = String::from_utf8_lossy(token).to_ascii_uppercase();
            let skip = match token.as_str() {
                "WITHSCORES" => {
                    shape.with_scores = true;
                    0
                }
                "NOCONTENT" => {
                    shape.no_content = true;
                    0
                }
                // counted operand lists
                "PARAMS" | "RETURN" | "INKEYS" | "INFIELDS" | "FIELDS" => tokens
                    .next()
                    .and_then(|n| std::str::from_utf8(n).ok()?.parse::<usize>().ok())
                    .unwrap_or(0),
                "LIMIT" | "TAGS" => 2,
                "FILTER" => 3,
                "GEOFILTER" => 5,
                "SORTBY" | "LANGUAGE" | "SCORER" | "EXPANDER" | "PAYLOAD" | "DIALECT"
                | "TIMEOUT" | "SLOP" | "FRAGS" | "LEN" | "SEPARATOR" => 1,
                _ => 0,
            };
            for _ in 0..skip {
                tokens.next();
            }
        }
        shape
    }
}

fn decode_search(reply: Reply, shape: SearchShape) -> Result<SearchResult> {
    match reply {
        Reply::Map(_) => decode_search_map(&reply),
        other => decode_search_flat(other.into_array()?, shape),
    }
}

fn decode_search_flat(items: Vec<Reply>, shape: SearchShape) -> Result<SearchResult> {
    let mut items = items.into_iter();
    let total = match items.next() {
        Some(total) => total.to_i64()?,
        None => return Ok(SearchResult::default()),
    };

    let mut documents = Vec::new();
    while let Some(key) = items.next() {
        let key = key.to_string_value()?;
        let score = if shape.with_scores {
            let score = items
                .next()
                .ok_or_else(|| RedisError::Decoding(format!("missing score for `{}`", key)))?;
            Some(score.to_f64()?)
        } else {
            None
        };
        let properties = if shape.no_content {
            HashMap::new()
        } else {
            let fields = items
                .next()
                .ok_or_else(|| RedisError::Decoding(format!("missing fields for `{}`", key)))?;
            decode_properties(&fields)?
        };
        documents.push(Document {
            key,
            score,
            properties,
        });
    }

    Ok(SearchResult { total, documents })
}

fn decode_search_map(reply: &Reply) -> Result<SearchResult> {
    let total = match reply.map_get("total_results") {
        Some(total) => total.to_i64()?,
        None => 0,
    };
    let mut documents = Vec::new();
    if let Some(results) = reply.map_get("results") {
        for result in results.as_array()? {
            let key = result
                .map_get("id")
                .ok_or_else(|| RedisError::Decoding("search result without `id`".to_string()))?
                .to_string_value()?;
            let score = result.map_get("score").map(Reply::to_f64).transpose()?;
            let properties = match result.map_get("extra_attributes") {
                Some(attributes) => decode_properties(attributes)?,
                None => HashMap::new(),
            };
            documents.push(Document {
                key,
                score,
                properties,
            });
        }
    }
    Ok(SearchResult { total, documents })
}

pub struct SearchCommands<E = Direct> {
    executor: E,
}

impl<E: Executor> SearchCommands<E> {
    pub(crate) fn new(executor: E) -> Self {
        Self { executor }
    }

    /// `FT.CREATE index <args>`; the schema is a pre-built argument list
    pub fn ft_create(&self, index: &str, args: &Args) -> RedisFuture<E::Output<()>> {
        self.executor.run(|| {
            validation::not_blank(index, "index")?;
            validation::not_empty(args.as_slice(), "args")?;
            let command = Command::new("FT.CREATE").put(index).put(args);
            Ok(Request::new(command, |reply| reply.to_unit()))
        })
    }

    /// `FT.SEARCH index query <args>`
    pub fn ft_search(&self, index: &str, query: &str, args: &Args) -> RedisFuture<E::Output<SearchResult>> {
        self.executor.run(|| {
            validation::not_blank(index, "index")?;
            validation::not_blank(query, "query")?;
            let shape = SearchShape::from_args(args);
            let command = Command::new("FT.SEARCH").put(index).put(query).put(args);
            Ok(Request::new(command, move |reply| decode_search(reply, shape)))
        })
    }

    /// Drop an index, optionally deleting the indexed documents too
    pub fn ft_drop_index(&self, index: &str, delete_documents: bool) -> RedisFuture<E::Output<()>> {
        self.executor.run(|| {
            validation::not_blank(index, "index")?;
            let command = Command::new("FT.DROPINDEX")
                .put(index)
                .put(delete_documents.then_some("DD"));
            Ok(Request::new(command, |reply| reply.to_unit()))
        })
    }

    /// Names of every index
    pub fn ft_list(&self) -> RedisFuture<E::Output<Vec<String>>> {
        self.executor.run(|| {
            let command = Command::new("FT._LIST");
            Ok(Request::new(command, |reply| decode_strings(&reply)))
        })
    }
}
