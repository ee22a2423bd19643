use std::collections::HashMap;

/// Status recorded for pages the service returned without a classification.
pub const UNKNOWN_STATUS: &str = "unknown";

/// Normalized metadata for one discovered URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRecord {
    pub url: String,
    pub status: String,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub heading_count: Option<u64>,
    pub internal_link_count: Option<u64>,
    /// Links by url; resolve them with [`ResultSet::linked_records`].
    pub internal_links: Option<Vec<String>>,
}

impl PageRecord {
    /// A record for a URL the service listed without any metadata.
    pub fn bare(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            status: UNKNOWN_STATUS.to_string(),
            meta_title: None,
            meta_description: None,
            heading_count: None,
            internal_link_count: None,
            internal_links: None,
        }
    }

    pub fn has_known_status(&self) -> bool {
        self.status != UNKNOWN_STATUS
    }
}

/// Canonical url -> record mapping. Iteration follows discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultSet {
    records: Vec<PageRecord>,
    index: HashMap<String, usize>,
}

impl ResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a record keyed by its url.
    ///
    /// A url that is already present keeps its first position and takes
    /// the new record's contents. Returns `true` when the url was new.
    pub fn insert(&mut self, record: PageRecord) -> bool {
        match self.index.get(&record.url) {
            Some(&slot) => {
                self.records[slot] = record;
                false
            }
            None => {
                self.index.insert(record.url.clone(), self.records.len());
                self.records.push(record);
                true
            }
        }
    }

    pub fn get(&self, url: &str) -> Option<&PageRecord> {
        self.index.get(url).map(|&slot| &self.records[slot])
    }

    pub fn contains(&self, url: &str) -> bool {
        self.index.contains_key(url)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PageRecord> {
        self.records.iter()
    }

    pub fn urls(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|record| record.url.as_str())
    }

    /// Records in this set that `url` links to, in link order.
    ///
    /// Links to pages outside the set are skipped.
    pub fn linked_records(&self, url: &str) -> Vec<&PageRecord> {
        self.get(url)
            .and_then(|record| record.internal_links.as_ref())
            .map(|links| links.iter().filter_map(|link| self.get(link)).collect())
            .unwrap_or_default()
    }
}

impl<'a> IntoIterator for &'a ResultSet {
    type Item = &'a PageRecord;
    type IntoIter = std::slice::Iter<'a, PageRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

impl FromIterator<PageRecord> for ResultSet {
    fn from_iter<I: IntoIterator<Item = PageRecord>>(iter: I) -> Self {
        let mut set = ResultSet::new();
        for record in iter {
            set.insert(record);
        }
        set
    }
}
