use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value as JsonValue;

/// A fetched model together with its eager-loaded relations and counts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Entry<M> {
    #[serde(flatten)]
    pub model: M,
    #[serde(flatten)]
    pub relations: BTreeMap<String, JsonValue>,
    #[serde(flatten)]
    pub counts: BTreeMap<String, u64>,
}

impl<M> Entry<M> {
    pub fn new(model: M) -> Self {
        Self {
            model,
            relations: BTreeMap::new(),
            counts: BTreeMap::new(),
        }
    }

    pub fn relation(&self, name: &str) -> Option<&JsonValue> {
        self.relations.get(name)
    }

    pub fn count(&self, relation: &str) -> Option<u64> {
        self.counts.get(&count_key(relation)).copied()
    }

    pub fn set_count(&mut self, relation: &str, count: u64) {
        self.counts.insert(count_key(relation), count);
    }
}

fn count_key(relation: &str) -> String {
    format!("{relation}_count")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageLinks {
    pub first: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last: Option<String>,
    pub prev: Option<String>,
    pub next: Option<String>,
}

/// One page of results.
///
/// `total` and `last_page` are only known in full pagination mode. The
/// request parameters of the listing are carried in `query` so that page
/// links keep the sort, search and filter state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub current_page: u64,
    pub per_page: u64,
    pub from: Option<u64>,
    pub to: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_page: Option<u64>,
    pub has_more_pages: bool,
    #[serde(skip)]
    pub query: Vec<(String, String)>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub links: Option<PageLinks>,
}

impl<T> Page<T> {
    pub fn new(
        data: Vec<T>,
        current_page: u64,
        per_page: u64,
        total: Option<u64>,
        has_more_pages: bool,
        query: Vec<(String, String)>,
    ) -> Self {
        let (from, to) = if data.is_empty() {
            (None, None)
        } else {
            let from = (current_page - 1) * per_page + 1;
            (Some(from), Some(from + data.len() as u64 - 1))
        };
        let last_page = total.map(|total| total.div_ceil(per_page).max(1));

        Self {
            data,
            current_page,
            per_page,
            from,
            to,
            total,
            last_page,
            has_more_pages,
            query,
            links: None,
        }
    }

    /// Swaps the items of the page, keeping its position and links.
    pub fn with_data<U>(self, data: Vec<U>) -> Page<U> {
        Page {
            data,
            current_page: self.current_page,
            per_page: self.per_page,
            from: self.from,
            to: self.to,
            total: self.total,
            last_page: self.last_page,
            has_more_pages: self.has_more_pages,
            query: self.query,
            links: self.links,
        }
    }

    /// URL of `page` under `path`, keeping the carried query parameters.
    pub fn url(&self, path: &str, page: u64) -> String {
        let page = page.to_string();
        let query = self
            .query
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
            .chain(std::iter::once(("page", page.as_str())))
            .map(|(key, value)| {
                format!(
                    "{}={}",
                    urlencoding::encode(key),
                    urlencoding::encode(value)
                )
            })
            .collect::<Vec<String>>()
            .join("&");

        format!("{path}?{query}")
    }

    /// Attaches first/last/prev/next links rooted at `path`.
    pub fn with_path(mut self, path: &str) -> Self {
        let prev = (self.current_page > 1).then(|| self.url(path, self.current_page - 1));
        let next = self
            .has_more_pages
            .then(|| self.url(path, self.current_page + 1));

        self.links = Some(PageLinks {
            first: self.url(path, 1),
            last: self.last_page.map(|last| self.url(path, last)),
            prev,
            next,
        });
        self
    }
}

/// Result of a listing: a page when pagination applied, every row otherwise.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Listing<M> {
    Paginated(Page<Entry<M>>),
    Collection(Vec<Entry<M>>),
}

impl<M> Listing<M> {
    pub fn entries(&self) -> &[Entry<M>] {
        match self {
            Listing::Paginated(page) => &page.data,
            Listing::Collection(entries) => entries,
        }
    }

    pub fn into_entries(self) -> Vec<Entry<M>> {
        match self {
            Listing::Paginated(page) => page.data,
            Listing::Collection(entries) => entries,
        }
    }

    pub fn is_paginated(&self) -> bool {
        matches!(self, Listing::Paginated(_))
    }
}

/// A record argument: either already loaded, or a route key to resolve.
#[derive(Debug, Clone, PartialEq)]
pub enum Record<M> {
    Model(M),
    RouteKey(String),
}

impl<M> From<&str> for Record<M> {
    fn from(key: &str) -> Self {
        Record::RouteKey(key.to_string())
    }
}

impl<M> From<String> for Record<M> {
    fn from(key: String) -> Self {
        Record::RouteKey(key)
    }
}
