use crate::filter::{BadRequest, Compiler, FilterNode, Normalizer, Predicate};
use crate::record::{Record, RecordStore, StorageError};
use crate::schema::Schema;
use crate::value::compare_for_sort;
use serde_json::{Value, json};
use std::cmp::Ordering;
use thiserror::Error;
use tracing::{debug, info};

/// Errors of a complete search request
#[derive(Debug, Error)]
pub enum SearchError {
    /// The filter was rejected; nothing was read from the store
    #[error(transparent)]
    BadRequest(#[from] BadRequest),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Keep the records matching `predicate`, ordered by the schema sort keys
pub fn execute<R: Record>(records: Vec<R>, predicate: &Predicate, schema: &Schema) -> Vec<R> {
    let total = records.len();
    let mut matched: Vec<R> = records
        .into_iter()
        .filter(|record| predicate.matches(record))
        .collect();
    sort_records(&mut matched, schema);
    debug!(total, matched = matched.len(), "executed filter");
    matched
}

/// Stable sort by the schema sort keys, most significant first
pub fn sort_records<R: Record>(records: &mut [R], schema: &Schema) {
    let keys = schema.sort_keys();
    if keys.is_empty() {
        return;
    }
    records.sort_by_cached_key(|record| SortKey(keys.iter().map(|key| record.field(key)).collect()));
}

/// Sort-key tuple of one record
#[derive(Debug, PartialEq)]
struct SortKey(Vec<Option<Value>>);

impl Eq for SortKey {}

impl PartialOrd for SortKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SortKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0
            .iter()
            .zip(&other.0)
            .map(|(a, b)| compare_for_sort(a.as_ref(), b.as_ref()))
            .find(|ordering| ordering.is_ne())
            .unwrap_or(Ordering::Equal)
    }
}

/// Search request against one record store
#[derive(Debug, Clone, Copy)]
pub struct Search<'a, S> {
    store: &'a S,
    schema: &'a Schema,
    normalizer: Normalizer,
}

impl<'a, S: RecordStore> Search<'a, S> {
    pub fn new(store: &'a S, schema: &'a Schema) -> Self {
        Self {
            store,
            schema,
            normalizer: Normalizer::default(),
        }
    }

    pub fn with_normalizer(mut self, normalizer: Normalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    /// Advanced search with a raw client expression.
    ///
    /// The filter is compiled before the store is read, so a bad filter
    /// never costs a scan.
    pub fn advanced(&self, raw: &Value) -> Result<Vec<S::Record>, SearchError> {
        let predicate = Compiler::new(self.schema)
            .with_normalizer(self.normalizer)
            .compile_raw(raw)?;
        self.run(&predicate)
    }

    /// Search with an already built filter tree
    pub fn filtered(&self, node: &FilterNode) -> Result<Vec<S::Record>, SearchError> {
        let predicate = Compiler::new(self.schema).compile(node)?;
        self.run(&predicate)
    }

    /// Simple search: `browser` contains `browser` OR `country` contains `country`
    pub fn simple(&self, browser: &str, country: &str) -> Result<Vec<S::Record>, SearchError> {
        self.filtered(&simple_filter(browser, country))
    }

    fn run(&self, predicate: &Predicate) -> Result<Vec<S::Record>, SearchError> {
        let records = self.store.fetch_all()?;
        let results = execute(records, predicate, self.schema);
        info!(schema = self.schema.name(), results = results.len(), "search finished");
        Ok(results)
    }
}

/// Filter used by the simple search entry point
pub fn simple_filter(browser: &str, country: &str) -> FilterNode {
    FilterNode::or(vec![
        FilterNode::comparison("browser", "contains", json!(browser)),
        FilterNode::comparison("country", "contains", json!(country)),
    ])
}

/// Parse the text of an advanced-search query.
///
/// Strict JSON is tried first; with `lenient` set, JSON5 (unquoted keys,
/// single quotes, trailing commas) is accepted as a fallback.
pub fn parse_query(text: &str, lenient: bool) -> Result<Value, BadRequest> {
    match serde_json::from_str::<Value>(text) {
        Ok(value) => Ok(value),
        Err(strict) if lenient => json5::from_str::<Value>(text).map_err(|_| invalid_query(strict)),
        Err(strict) => Err(invalid_query(strict)),
    }
}

fn invalid_query(err: serde_json::Error) -> BadRequest {
    BadRequest::from(crate::filter::FilterError::MalformedExpression(format!(
        "query is not valid JSON: {err}"
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{FilterError, normalize_and_compile};
    use crate::record::{LogRecord, MemoryStore, parse_created};
    use crate::schema::{FieldDescriptor, FieldKind};
    use std::cell::Cell;

    fn record(id: i64, browser: &str, country: &str) -> LogRecord {
        LogRecord {
            id,
            browser: browser.to_string(),
            page_url: String::new(),
            country: country.to_string(),
            message: String::new(),
            created: parse_created("2018-01-01 00:00:00").unwrap(),
        }
    }

    fn ids(records: &[LogRecord]) -> Vec<i64> {
        records.iter().map(|r| r.id).collect()
    }

    #[test]
    fn test_execute_filters_and_sorts() {
        let records = vec![
            record(3, "Chrome", "Italy"),
            record(1, "Chrome", "Spain"),
            record(2, "Safari", "Italy"),
        ];
        let predicate =
            normalize_and_compile(LogRecord::schema(), &json!({"IS": {"browser": "Chrome"}}))
                .unwrap();
        let out = execute(records, &predicate, LogRecord::schema());
        assert_eq!(ids(&out), vec![1, 3]);
    }

    #[test]
    fn test_sort_uses_later_keys_for_ties() {
        let schema = Schema::new(
            "log",
            LogRecord::schema().fields().to_vec(),
            &["country", "id"],
        );
        let mut records = vec![
            record(5, "IE", "Spain"),
            record(2, "IE", "Italy"),
            record(1, "IE", "Spain"),
        ];
        sort_records(&mut records, &schema);
        assert_eq!(ids(&records), vec![2, 1, 5]);
    }

    #[test]
    fn test_simple_search_matches_either_field() {
        let store = MemoryStore::new(vec![
            record(1, "Chrome", "Italy"),
            record(2, "Safari", "Philippines"),
            record(3, "Firefox", "Germany"),
        ]);
        let out = Search::new(&store, LogRecord::schema())
            .simple("chrome", "philippines")
            .unwrap();
        assert_eq!(ids(&out), vec![1, 2]);
    }

    #[test]
    fn test_bad_filter_is_bad_request() {
        let store = MemoryStore::new(vec![record(1, "Chrome", "Italy")]);
        let err = Search::new(&store, LogRecord::schema())
            .advanced(&json!({"IS": {"colour": "red"}}))
            .unwrap_err();
        match err {
            SearchError::BadRequest(bad) => {
                assert_eq!(bad.cause, FilterError::UnknownField("colour".to_string()))
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    /// Store whose reads always fail, counting how often it was asked
    struct BrokenStore {
        fetches: Cell<usize>,
    }

    impl RecordStore for BrokenStore {
        type Record = LogRecord;

        fn fetch_all(&self) -> Result<Vec<LogRecord>, StorageError> {
            self.fetches.set(self.fetches.get() + 1);
            Err(StorageError::Read {
                path: "logs.json".to_string(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
            })
        }
    }

    #[test]
    fn test_bad_filter_never_reads_the_store() {
        let store = BrokenStore {
            fetches: Cell::new(0),
        };
        let err = Search::new(&store, LogRecord::schema())
            .advanced(&json!({"IS": {"colour": "red"}}))
            .unwrap_err();
        assert!(matches!(err, SearchError::BadRequest(_)));
        assert_eq!(store.fetches.get(), 0);
    }

    #[test]
    fn test_storage_errors_pass_through() {
        let store = BrokenStore {
            fetches: Cell::new(0),
        };
        let err = Search::new(&store, LogRecord::schema())
            .advanced(&json!({"IS": {"browser": "Chrome"}}))
            .unwrap_err();
        assert!(matches!(err, SearchError::Storage(StorageError::Read { .. })));
        assert_eq!(store.fetches.get(), 1);
    }

    #[derive(Debug, Clone)]
    struct Row {
        id: i64,
        key: Value,
    }

    impl Record for Row {
        fn field(&self, name: &str) -> Option<Value> {
            match name {
                "id" => Some(json!(self.id)),
                "k" => Some(self.key.clone()),
                _ => None,
            }
        }
    }

    #[test]
    fn test_sort_with_mixed_type_keys() {
        let schema = Schema::new(
            "rows",
            vec![
                FieldDescriptor::new("id", FieldKind::Integer),
                FieldDescriptor::new("k", FieldKind::Text),
            ],
            &["k"],
        );
        let mut rows: Vec<Row> = (0..200)
            .map(|i: i64| Row {
                id: i,
                key: if i % 3 == 0 {
                    json!(format!("s{}", (i * 7) % 50))
                } else if i % 3 == 1 {
                    json!((i * 13) % 50)
                } else {
                    Value::Null
                },
            })
            .collect();
        sort_records(&mut rows, &schema);

        let ranks: Vec<u8> = rows
            .iter()
            .map(|row| match row.key {
                Value::Null => 0,
                Value::Number(_) => 1,
                _ => 2,
            })
            .collect();
        assert!(ranks.windows(2).all(|pair| pair[0] <= pair[1]));
        assert!(rows.windows(2).all(|pair| {
            compare_for_sort(Some(&pair[0].key), Some(&pair[1].key)) != Ordering::Greater
        }));
    }

    #[test]
    fn test_parse_query_strict_and_lenient() {
        assert!(parse_query(r#"{"IS": {"browser": "Chrome"}}"#, false).is_ok());
        assert!(parse_query("{IS: {browser: 'Chrome'}}", false).is_err());
        assert_eq!(
            parse_query("{IS: {browser: 'Chrome',},}", true).unwrap(),
            json!({"IS": {"browser": "Chrome"}})
        );
        let err = parse_query("{IS:", true).unwrap_err();
        assert!(matches!(err.cause, FilterError::MalformedExpression(_)));
    }
}
