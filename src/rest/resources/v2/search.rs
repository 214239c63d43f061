//! The `/search` endpoint.
//!
//! Two entry points are provided:
//!
//! - [`Search::query`]: a free-text query (`q`) with optional filters
//! - [`Search::advanced`]: structured terms, flat or grouped by category
//!
//! Both validate every parameter name against the client's allow-list
//! before a request is made. Results are paged by cursor only; passing
//! `page` is rejected. [`Search::each`] and [`Search::advanced_each`] walk
//! every page lazily.
//!
//! # Parameter mapping
//!
//! | Input      | Sent as                      |
//! |------------|------------------------------|
//! | `limit`    | `perPage` (integer)          |
//! | `images`   | `f=has_images` when `true`   |
//! | `accepted` | `accepted` (boolean)         |
//! | `null`     | dropped                      |
//!
//! [`Search::query`] then sends the query's own page size, replacing any
//! `perPage` mapped from `limit`.

use std::collections::BTreeSet;

use serde_json::{json, Value};

use crate::clients::{HttpClient, Params};
use crate::rest::errors::{ResourceError, ValidationError};
use crate::rest::paginator::Paginator;
use crate::rest::path::SEARCH_PATH;
use crate::rest::response::{Response, TERMINAL_CURSOR};
use crate::rest::validation;

/// Cursor requesting the first page.
pub const DEFAULT_CURSOR: &str = TERMINAL_CURSOR;

/// Rows per page when none is given.
pub const DEFAULT_PER_PAGE: u32 = 24;

/// A free-text search request.
///
/// # Example
///
/// ```rust
/// use powo_api::rest::SearchQuery;
///
/// let query = SearchQuery::new("Acacia")
///     .filter("accepted", true)
///     .filter("family", "Fabaceae")
///     .per_page(50);
///
/// assert_eq!(query.query(), "Acacia");
/// assert_eq!(query.cursor_value(), "*");
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct SearchQuery {
    query: String,
    filters: Params,
    cursor: String,
    per_page: u32,
}

impl SearchQuery {
    /// Creates a query for `q`, starting at the first page.
    #[must_use]
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            filters: Params::new(),
            cursor: DEFAULT_CURSOR.to_string(),
            per_page: DEFAULT_PER_PAGE,
        }
    }

    /// Adds one filter.
    #[must_use]
    pub fn filter(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.insert(key.into(), value.into());
        self
    }

    /// Adds every entry of `filters`.
    #[must_use]
    pub fn filters(mut self, filters: Params) -> Self {
        self.filters.extend(filters);
        self
    }

    /// Sets the cursor. A blank cursor means the first page.
    #[must_use]
    pub fn cursor(mut self, cursor: impl Into<String>) -> Self {
        self.cursor = cursor.into();
        self
    }

    /// Sets the page size sent as `perPage`. Defaults to
    /// [`DEFAULT_PER_PAGE`] and always overrides a `limit` filter.
    #[must_use]
    pub const fn per_page(mut self, per_page: u32) -> Self {
        self.per_page = per_page;
        self
    }

    /// Returns the query text.
    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Returns the cursor as it will be sent.
    #[must_use]
    pub fn cursor_value(&self) -> &str {
        normalize_cursor(&self.cursor)
    }
}

/// Endpoint wrapper for `/search`.
///
/// Obtained from [`PowoClient::search`](crate::PowoClient::search).
#[derive(Clone, Copy, Debug)]
pub struct Search<'a> {
    http_client: &'a HttpClient,
    allowed_params: &'a BTreeSet<String>,
    group_keys: &'static [&'static str],
}

impl<'a> Search<'a> {
    /// Creates a wrapper over `http_client` with the given vocabulary.
    #[must_use]
    pub const fn new(
        http_client: &'a HttpClient,
        allowed_params: &'a BTreeSet<String>,
        group_keys: &'static [&'static str],
    ) -> Self {
        Self {
            http_client,
            allowed_params,
            group_keys,
        }
    }

    /// Runs a free-text search.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::Validation`] for a blank query, a `page`
    /// filter, an unsupported filter name or a badly typed filter value,
    /// and [`ResourceError::Request`] if the request fails.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let response = client
    ///     .search()
    ///     .query(&SearchQuery::new("Acacia").filter("accepted", true))
    ///     .await?;
    /// println!("{:?} matches", response.total_count());
    /// ```
    pub async fn query(&self, query: &SearchQuery) -> Result<Response, ResourceError> {
        validation::presence_str(&query.query, "query")?;
        reject_page(&query.filters)?;

        let mut params = self.normalize_filters(&query.filters)?;
        params.insert("q".to_string(), Value::String(query.query.clone()));
        params.insert(
            "cursor".to_string(),
            Value::String(query.cursor_value().to_string()),
        );
        params.insert("perPage".to_string(), json!(query.per_page));

        self.fetch(&params).await
    }

    /// Runs a structured search.
    ///
    /// Keys naming a group (e.g. `name`, `geography` in POWO mode) must hold
    /// an object, whose entries are merged into the top level.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::Validation`] for a non-object group, a
    /// `page` key, an unsupported name or a badly typed value, and
    /// [`ResourceError::Request`] if the request fails.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let terms = json!({ "name": { "genus": "Acacia" }, "accepted": true });
    /// let response = client.search().advanced(terms.as_object().unwrap()).await?;
    /// ```
    pub async fn advanced(&self, params: &Params) -> Result<Response, ResourceError> {
        let flat = self.flatten_groups(params)?;
        reject_page(&flat)?;
        let normalized = self.normalize_filters(&flat)?;

        self.fetch(&normalized).await
    }

    /// Iterates every row of a free-text search, following cursors.
    ///
    /// Input errors surface as the first item.
    #[must_use]
    pub fn each(&self, query: SearchQuery) -> Paginator<'a, Response, ResourceError> {
        let search = *self;
        let initial = query.cursor.clone();
        Paginator::by_cursor(initial, move |cursor| {
            let page_query = query.clone().cursor(cursor);
            Box::pin(async move { search.query(&page_query).await })
        })
    }

    /// Iterates every row of a structured search, following cursors.
    ///
    /// The initial cursor is taken from `cursor` and the page size from
    /// `perPage`, then `limit`, then [`DEFAULT_PER_PAGE`]. The remaining
    /// terms are validated before anything is fetched.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] if the terms are rejected.
    pub fn advanced_each(
        &self,
        params: &Params,
    ) -> Result<Paginator<'a, Response, ResourceError>, ValidationError> {
        let mut flat = self.flatten_groups(params)?;
        reject_page(&flat)?;

        let initial = flat
            .remove("cursor")
            .map(|cursor| scalar_string(&cursor))
            .unwrap_or_default();
        let per_page_value = flat.remove("perPage");
        let limit_value = flat.remove("limit");
        let per_page = match (per_page_value, limit_value) {
            (Some(value), _) if !value.is_null() => validation::integer(&value, "perPage")?,
            (_, Some(value)) if !value.is_null() => validation::integer(&value, "limit")?,
            _ => i64::from(DEFAULT_PER_PAGE),
        };

        let normalized = self.normalize_filters(&flat)?;
        let search = *self;
        Ok(Paginator::by_cursor(initial, move |cursor| {
            let mut page_params = normalized.clone();
            page_params.insert("cursor".to_string(), Value::String(cursor));
            page_params.insert("perPage".to_string(), json!(per_page));
            Box::pin(async move { search.fetch(&page_params).await })
        }))
    }

    async fn fetch(&self, params: &Params) -> Result<Response, ResourceError> {
        let raw = self
            .http_client
            .request(SEARCH_PATH.http_method, SEARCH_PATH.template, params)
            .await?;
        Ok(Response::new(raw))
    }

    fn flatten_groups(&self, params: &Params) -> Result<Params, ValidationError> {
        let mut flat = Params::new();
        for (key, value) in params {
            if self.group_keys.contains(&key.as_str()) {
                let members = validation::object(value, key)?;
                for (member, member_value) in members {
                    flat.insert(member.clone(), member_value.clone());
                }
            } else {
                flat.insert(key.clone(), value.clone());
            }
        }
        Ok(flat)
    }

    fn normalize_filters(&self, input: &Params) -> Result<Params, ValidationError> {
        let unknown: Vec<String> = input
            .keys()
            .filter(|key| !self.allowed_params.contains(key.as_str()))
            .cloned()
            .collect();
        if !unknown.is_empty() {
            return Err(ValidationError::UnsupportedParams {
                unknown,
                supported: self.allowed_params.iter().cloned().collect(),
            });
        }

        let mut normalized = Params::new();
        for (key, value) in input {
            if value.is_null() {
                continue;
            }
            match key.as_str() {
                "limit" => {
                    let limit = validation::integer(value, "limit")?;
                    normalized.insert("perPage".to_string(), json!(limit));
                }
                "images" => {
                    if validation::boolean(value, "images")? {
                        normalized.insert("f".to_string(), json!("has_images"));
                    }
                }
                "accepted" => {
                    let accepted = validation::boolean(value, "accepted")?;
                    normalized.insert("accepted".to_string(), Value::Bool(accepted));
                }
                "page" => {
                    let page = validation::integer(value, "page")?;
                    normalized.insert("page".to_string(), json!(page));
                }
                _ => {
                    normalized.insert(key.clone(), value.clone());
                }
            }
        }
        Ok(normalized)
    }
}

fn reject_page(params: &Params) -> Result<(), ValidationError> {
    if params.contains_key("page") {
        return Err(ValidationError::PagePagination);
    }
    Ok(())
}

fn normalize_cursor(cursor: &str) -> &str {
    if cursor.trim().is_empty() {
        DEFAULT_CURSOR
    } else {
        cursor
    }
}

fn scalar_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::{HttpMethod, HttpResponse, Transport, TransportError, TransportRequest};
    use crate::config::{ClientMode, PowoConfig};
    use crate::rest::terms::Terms;
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    #[derive(Debug)]
    struct Canned {
        bodies: Mutex<Vec<&'static str>>,
        seen: Mutex<Vec<TransportRequest>>,
    }

    #[async_trait]
    impl Transport for Canned {
        async fn send(&self, request: &TransportRequest) -> Result<HttpResponse, TransportError> {
            self.seen.lock().unwrap().push(request.clone());
            let mut bodies = self.bodies.lock().unwrap();
            let body = if bodies.len() > 1 { bodies.remove(0) } else { bodies[0] };
            Ok(HttpResponse::new(200, body))
        }
    }

    fn fixture(bodies: Vec<&'static str>) -> (HttpClient, Arc<Canned>, BTreeSet<String>) {
        let transport = Arc::new(Canned {
            bodies: Mutex::new(bodies),
            seen: Mutex::new(Vec::new()),
        });
        let config = PowoConfig::builder().build().unwrap();
        let client = HttpClient::with_transport(&config, transport.clone());
        let allowed = Terms::builtin().allowed_params(ClientMode::Powo);
        (client, transport, allowed)
    }

    fn query_of(request: &TransportRequest) -> Vec<(&str, &str)> {
        request
            .query
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect()
    }

    #[tokio::test]
    async fn test_query_sends_q_cursor_and_per_page() {
        let (client, transport, allowed) = fixture(vec![r#"{"results":[{"name":"Acacia"}]}"#]);
        let search = Search::new(&client, &allowed, ClientMode::Powo.group_keys());

        let query = SearchQuery::new("Acacia")
            .filter("accepted", true)
            .filter("images", true)
            .per_page(10);
        let response = search.query(&query).await.unwrap();

        assert_eq!(response.results().len(), 1);
        let seen = transport.seen.lock().unwrap();
        assert_eq!(seen[0].method, HttpMethod::Get);
        assert_eq!(
            query_of(&seen[0]),
            vec![
                ("accepted", "true"),
                ("cursor", "*"),
                ("f", "has_images"),
                ("perPage", "10"),
                ("q", "Acacia"),
            ]
        );
    }

    #[tokio::test]
    async fn test_query_rejects_blank_query() {
        let (client, transport, allowed) = fixture(vec!["{}"]);
        let search = Search::new(&client, &allowed, ClientMode::Powo.group_keys());

        let error = search.query(&SearchQuery::new("  ")).await.unwrap_err();

        assert!(matches!(
            error,
            ResourceError::Validation(ValidationError::Missing { ref name }) if name == "query"
        ));
        assert!(transport.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_query_rejects_page() {
        let (client, _, allowed) = fixture(vec!["{}"]);
        let search = Search::new(&client, &allowed, ClientMode::Powo.group_keys());

        let error = search
            .query(&SearchQuery::new("Acacia").filter("page", 2))
            .await
            .unwrap_err();
        assert!(matches!(
            error,
            ResourceError::Validation(ValidationError::PagePagination)
        ));
    }

    #[tokio::test]
    async fn test_unknown_filters_list_supported_names_sorted() {
        let (client, _, allowed) = fixture(vec!["{}"]);
        let search = Search::new(&client, &allowed, ClientMode::Powo.group_keys());

        let error = search
            .query(&SearchQuery::new("Acacia").filter("colour", "green"))
            .await
            .unwrap_err();

        match error {
            ResourceError::Validation(ValidationError::UnsupportedParams { unknown, supported }) => {
                assert_eq!(unknown, vec!["colour".to_string()]);
                let mut sorted = supported.clone();
                sorted.sort();
                assert_eq!(supported, sorted);
                assert!(supported.contains(&"genus".to_string()));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_images_false_adds_nothing_and_nulls_are_dropped() {
        let (client, transport, allowed) = fixture(vec!["{}"]);
        let search = Search::new(&client, &allowed, ClientMode::Powo.group_keys());

        let params = json!({"images": false, "family": null, "genus": "Acacia"});
        search.advanced(params.as_object().unwrap()).await.unwrap();

        let seen = transport.seen.lock().unwrap();
        assert_eq!(query_of(&seen[0]), vec![("genus", "Acacia")]);
    }

    #[tokio::test]
    async fn test_images_must_be_boolean() {
        let (client, _, allowed) = fixture(vec!["{}"]);
        let search = Search::new(&client, &allowed, ClientMode::Powo.group_keys());

        let params = json!({"images": "yes"});
        let error = search.advanced(params.as_object().unwrap()).await.unwrap_err();
        assert!(matches!(
            error,
            ResourceError::Validation(ValidationError::NotBoolean { .. })
        ));
    }

    #[tokio::test]
    async fn test_advanced_flattens_groups() {
        let (client, transport, allowed) = fixture(vec!["{}"]);
        let search = Search::new(&client, &allowed, ClientMode::Powo.group_keys());

        let params = json!({
            "name": {"genus": "Acacia", "family": "Fabaceae"},
            "geography": {"region": "Asia"},
            "accepted": true
        });
        search.advanced(params.as_object().unwrap()).await.unwrap();

        let seen = transport.seen.lock().unwrap();
        assert_eq!(
            query_of(&seen[0]),
            vec![
                ("accepted", "true"),
                ("family", "Fabaceae"),
                ("genus", "Acacia"),
                ("region", "Asia"),
            ]
        );
    }

    #[tokio::test]
    async fn test_advanced_group_must_be_object() {
        let (client, _, allowed) = fixture(vec!["{}"]);
        let search = Search::new(&client, &allowed, ClientMode::Powo.group_keys());

        let params = json!({"name": "Acacia"});
        let error = search.advanced(params.as_object().unwrap()).await.unwrap_err();
        assert!(matches!(
            error,
            ResourceError::Validation(ValidationError::NotObject { ref name }) if name == "name"
        ));
    }

    #[tokio::test]
    async fn test_each_follows_cursor_until_terminal() {
        let (client, transport, allowed) = fixture(vec![
            r#"{"cursor":"next-token","results":[1,2]}"#,
            r#"{"cursor":"*","results":[3,4]}"#,
        ]);
        let search = Search::new(&client, &allowed, ClientMode::Powo.group_keys());

        let rows = search
            .each(SearchQuery::new("Acacia"))
            .try_collect()
            .await
            .unwrap();

        assert_eq!(rows, vec![json!(1), json!(2), json!(3), json!(4)]);
        let seen = transport.seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert!(seen[1].query.contains(&("cursor".to_string(), "next-token".to_string())));
    }

    #[tokio::test]
    async fn test_advanced_each_sends_cursor_and_page_size() {
        let (client, transport, allowed) = fixture(vec![r#"{"cursor":"*","results":[1]}"#]);
        let search = Search::new(&client, &allowed, ClientMode::Powo.group_keys());

        let params = json!({"name": {"genus": "Acacia"}, "cursor": "start", "limit": 5});
        let rows = search
            .advanced_each(params.as_object().unwrap())
            .unwrap()
            .try_collect()
            .await
            .unwrap();

        assert_eq!(rows, vec![json!(1)]);
        let seen = transport.seen.lock().unwrap();
        assert_eq!(
            query_of(&seen[0]),
            vec![("cursor", "start"), ("genus", "Acacia"), ("perPage", "5")]
        );
    }

    #[test]
    fn test_advanced_each_validates_eagerly() {
        let (client, _, allowed) = fixture(vec!["{}"]);
        let search = Search::new(&client, &allowed, ClientMode::Powo.group_keys());

        let params = json!({"page": 3});
        assert_eq!(
            search.advanced_each(params.as_object().unwrap()).unwrap_err(),
            ValidationError::PagePagination
        );

        let params = json!({"perPage": "lots"});
        assert!(matches!(
            search.advanced_each(params.as_object().unwrap()).unwrap_err(),
            ValidationError::NotInteger { .. }
        ));
    }

    #[tokio::test]
    async fn test_query_defaults_page_size() {
        let (client, transport, allowed) = fixture(vec!["{}"]);
        let search = Search::new(&client, &allowed, ClientMode::Powo.group_keys());

        search.query(&SearchQuery::new("Acacia")).await.unwrap();
        search
            .query(&SearchQuery::new("Acacia").filter("limit", 5).per_page(50))
            .await
            .unwrap();

        let seen = transport.seen.lock().unwrap();
        assert!(seen[0].query.contains(&("perPage".to_string(), "24".to_string())));
        assert!(seen[1].query.contains(&("perPage".to_string(), "50".to_string())));
    }

    #[tokio::test]
    async fn test_query_page_size_overrides_limit_filter() {
        let (client, transport, allowed) = fixture(vec!["{}"]);
        let search = Search::new(&client, &allowed, ClientMode::Powo.group_keys());

        search
            .query(&SearchQuery::new("Acacia").filter("limit", 5))
            .await
            .unwrap();

        let seen = transport.seen.lock().unwrap();
        let page_sizes: Vec<_> = seen[0].query.iter().filter(|(k, _)| k == "perPage").collect();
        assert_eq!(page_sizes, vec![&("perPage".to_string(), "24".to_string())]);
    }

    #[test]
    fn test_search_query_cursor_normalization() {
        assert_eq!(SearchQuery::new("x").cursor("").cursor_value(), "*");
        assert_eq!(SearchQuery::new("x").cursor("abc").cursor_value(), "abc");
    }
}
