//! Lazy, pull-based pagination over page-shaped results.
//!
//! A [`Paginator`] holds a page-fetch function and the position of the next
//! page. Each call to [`Paginator::next`] yields one row, fetching the next
//! page only when the rows already fetched are used up.
//!
//! # Termination
//!
//! A page-numbered paginator stops once a page reports no further pages. A
//! cursor paginator additionally stops when the next cursor is absent,
//! blank, or the terminal `"*"`, even if the page claims more results.
//!
//! A fetch function that always reports more pages with fresh cursors yields
//! an endless sequence. Bounding it (with [`Paginator::take`], for example)
//! is the caller's responsibility.
//!
//! # Example
//!
//! ```rust,ignore
//! use powo_api::rest::Paginator;
//!
//! let mut rows = Paginator::by_cursor("*", |cursor| {
//!     let query = SearchQuery::new("Acacia").cursor(cursor);
//!     Box::pin(async move { search.query(&query).await })
//! });
//!
//! while let Some(row) = rows.next().await {
//!     println!("{}", row?["name"]);
//! }
//! ```

use std::collections::VecDeque;
use std::fmt;

use futures::future::BoxFuture;
use futures::stream::{self, Stream};

use crate::rest::response::TERMINAL_CURSOR;

/// A page of results: rows plus a "more pages" signal.
pub trait Page {
    /// The row type.
    type Row;

    /// Returns `true` if the source reports further pages.
    fn has_next_page(&self) -> bool;

    /// Returns the cursor for the next page, for cursor-paged sources.
    fn next_cursor(&self) -> Option<String> {
        None
    }

    /// Consumes the page, returning its rows in order.
    fn into_rows(self) -> Vec<Self::Row>;
}

type FetchFn<'a, A, P, E> = Box<dyn FnMut(A) -> BoxFuture<'a, Result<P, E>> + Send + 'a>;

enum Position<'a, P, E> {
    Number {
        page: u32,
        fetch: FetchFn<'a, u32, P, E>,
    },
    Cursor {
        cursor: String,
        fetch: FetchFn<'a, String, P, E>,
    },
}

/// A lazy sequence of rows drawn from successive pages.
///
/// Each paginator is independent: constructing a new one restarts from the
/// given position. A paginator is consumed by a single task.
pub struct Paginator<'a, P: Page, E> {
    position: Position<'a, P, E>,
    buffer: VecDeque<P::Row>,
    done: bool,
}

impl<'a, P: Page, E> Paginator<'a, P, E> {
    /// Pages by number, starting at `start` and adding one per page.
    #[must_use]
    pub fn by_page<F>(start: u32, fetch: F) -> Self
    where
        F: FnMut(u32) -> BoxFuture<'a, Result<P, E>> + Send + 'a,
    {
        Self {
            position: Position::Number {
                page: start,
                fetch: Box::new(fetch),
            },
            buffer: VecDeque::new(),
            done: false,
        }
    }

    /// Pages by cursor, starting at `initial`. A blank cursor starts at `"*"`.
    #[must_use]
    pub fn by_cursor<F>(initial: impl Into<String>, fetch: F) -> Self
    where
        F: FnMut(String) -> BoxFuture<'a, Result<P, E>> + Send + 'a,
    {
        let initial = initial.into();
        let cursor = if initial.trim().is_empty() {
            TERMINAL_CURSOR.to_string()
        } else {
            initial
        };
        Self {
            position: Position::Cursor {
                cursor,
                fetch: Box::new(fetch),
            },
            buffer: VecDeque::new(),
            done: false,
        }
    }

    /// Returns the next row, fetching a page if needed.
    ///
    /// Returns `None` once the sequence is exhausted. A fetch error is
    /// returned once, after which the sequence is exhausted.
    pub async fn next(&mut self) -> Option<Result<P::Row, E>> {
        loop {
            if let Some(row) = self.buffer.pop_front() {
                return Some(Ok(row));
            }
            if self.done {
                return None;
            }

            let fetched = match &mut self.position {
                Position::Number { page, fetch } => fetch(*page).await,
                Position::Cursor { cursor, fetch } => fetch(cursor.clone()).await,
            };
            let page = match fetched {
                Ok(page) => page,
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            };

            let has_next = page.has_next_page();
            match &mut self.position {
                Position::Number { page: number, .. } => match number.checked_add(1) {
                    Some(next) if has_next => *number = next,
                    _ => self.done = true,
                },
                Position::Cursor { cursor, .. } => match page.next_cursor() {
                    Some(next) if has_next && is_usable_cursor(&next) => *cursor = next,
                    _ => self.done = true,
                },
            }

            self.buffer.extend(page.into_rows());
        }
    }

    /// Collects up to `n` rows, fetching only the pages needed.
    ///
    /// # Errors
    ///
    /// Returns the first fetch error.
    pub async fn take(&mut self, n: usize) -> Result<Vec<P::Row>, E> {
        let mut rows = Vec::with_capacity(n.min(1024));
        while rows.len() < n {
            match self.next().await {
                Some(row) => rows.push(row?),
                None => break,
            }
        }
        Ok(rows)
    }

    /// Collects every remaining row.
    ///
    /// # Errors
    ///
    /// Returns the first fetch error.
    pub async fn try_collect(mut self) -> Result<Vec<P::Row>, E> {
        let mut rows = Vec::new();
        while let Some(row) = self.next().await {
            rows.push(row?);
        }
        Ok(rows)
    }

    /// Converts the paginator into a [`Stream`] of rows.
    pub fn into_stream(self) -> impl Stream<Item = Result<P::Row, E>> + 'a
    where
        P: 'a,
        P::Row: 'a,
        E: 'a,
    {
        stream::unfold(self, |mut paginator| async move {
            paginator.next().await.map(|item| (item, paginator))
        })
    }
}

fn is_usable_cursor(cursor: &str) -> bool {
    !cursor.trim().is_empty() && cursor != TERMINAL_CURSOR
}

impl<P: Page, E> fmt::Debug for Paginator<'_, P, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct("Paginator");
        match &self.position {
            Position::Number { page, .. } => debug.field("page", page),
            Position::Cursor { cursor, .. } => debug.field("cursor", cursor),
        };
        debug
            .field("buffered", &self.buffer.len())
            .field("done", &self.done)
            .finish()
    }
}
