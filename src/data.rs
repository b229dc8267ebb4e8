use crate::extract::NA;
use crate::CrawlerError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One cell of the frame view. Sentinels collapse to `Missing`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Missing,
    Text(String),
    List(Vec<String>),
}

impl Value {
    pub fn text<S: AsRef<str>>(s: S) -> Value {
        let s = s.as_ref();
        if s.is_empty() || s == NA {
            Value::Missing
        } else {
            Value::Text(s.to_string())
        }
    }

    pub fn list(items: &[String]) -> Value {
        if items.is_empty() {
            Value::Missing
        } else {
            Value::List(items.to_vec())
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

impl<T: AsRef<str>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Missing, Value::text)
    }
}

pub trait Record: Clone {
    fn link(&self) -> &str;
    fn category(&self) -> &str;

    /// Whether `field` currently holds its sentinel.
    fn is_missing(&self, field: &str) -> bool;

    /// Named cells in column order.
    fn cells(&self) -> Vec<(String, Value)>;
}

/// Rows keyed by link. A link can only be inserted once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    try_from = "Vec<R>",
    into = "Vec<R>",
    bound(serialize = "R: Record + Serialize", deserialize = "R: Record + Deserialize<'de>")
)]
pub struct Table<R: Record> {
    rows: Vec<R>,
    index: HashMap<String, usize>,
}

impl<R: Record> Default for Table<R> {
    fn default() -> Self {
        Self {
            rows: vec![],
            index: HashMap::new(),
        }
    }
}

impl<R: Record> Table<R> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn is_exist<I: AsRef<str>>(&self, link: I) -> bool {
        self.index.contains_key(link.as_ref())
    }

    pub fn insert(&mut self, record: R) -> Result<(), CrawlerError> {
        let link = record.link().to_string();
        if self.index.contains_key(&link) {
            return Err(CrawlerError::DuplicateLink(link));
        }
        self.index.insert(link, self.rows.len());
        self.rows.push(record);
        Ok(())
    }

    pub fn get<I: AsRef<str>>(&self, link: I) -> Option<&R> {
        self.index.get(link.as_ref()).map(|i| &self.rows[*i])
    }

    pub fn get_mut<I: AsRef<str>>(&mut self, link: I) -> Option<&mut R> {
        self.index.get(link.as_ref()).map(|i| &mut self.rows[*i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &R> {
        self.rows.iter()
    }

    pub fn links(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().map(Record::link)
    }
}

impl<R: Record> TryFrom<Vec<R>> for Table<R> {
    type Error = CrawlerError;

    fn try_from(rows: Vec<R>) -> Result<Self, Self::Error> {
        let mut table = Table::new();
        for row in rows {
            table.insert(row)?;
        }
        Ok(table)
    }
}

impl<R: Record> From<Table<R>> for Vec<R> {
    fn from(table: Table<R>) -> Self {
        table.rows
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub(crate) struct Row {
        pub link: String,
        pub category: String,
        pub note: String,
    }

    impl Record for Row {
        fn link(&self) -> &str {
            &self.link
        }

        fn category(&self) -> &str {
            &self.category
        }

        fn is_missing(&self, _field: &str) -> bool {
            self.note == NA
        }

        fn cells(&self) -> Vec<(String, Value)> {
            vec![
                ("link".to_string(), Value::text(&self.link)),
                ("category".to_string(), Value::text(&self.category)),
                ("note".to_string(), Value::text(&self.note)),
            ]
        }
    }

    pub(crate) fn row(link: &str, note: &str) -> Row {
        Row {
            link: link.to_string(),
            category: "market".to_string(),
            note: note.to_string(),
        }
    }

    #[test]
    fn insert_rejects_duplicate_links() {
        let mut t = Table::new();
        t.insert(row("a", "x")).unwrap();
        assert!(matches!(
            t.insert(row("a", "y")),
            Err(CrawlerError::DuplicateLink(l)) if l == "a"
        ));
        assert_eq!(t.count(), 1);
        assert_eq!(t.get("a").unwrap().note, "x");
    }

    #[test]
    fn get_mut_updates_in_place() {
        let mut t = Table::new();
        t.insert(row("a", "x")).unwrap();
        t.insert(row("b", "y")).unwrap();
        t.get_mut("b").unwrap().note = "z".to_string();
        assert_eq!(t.links().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(t.get("b").unwrap().note, "z");
        assert!(t.get_mut("c").is_none());
    }

    #[test]
    fn json_roundtrip_rebuilds_index() {
        let mut t = Table::new();
        t.insert(row("a", "x")).unwrap();
        let json = serde_json::to_string(&t).unwrap();
        let back: Table<Row> = serde_json::from_str(&json).unwrap();
        assert!(back.is_exist("a"));
        assert_eq!(back, t);
    }

    #[test]
    fn json_with_duplicate_links_is_rejected() {
        let json = r#"[{"link":"a","category":"c","note":"1"},{"link":"a","category":"c","note":"2"}]"#;
        assert!(serde_json::from_str::<Table<Row>>(json).is_err());
    }

    #[test]
    fn sentinels_are_missing_values() {
        assert!(Value::text(NA).is_missing());
        assert!(Value::text("").is_missing());
        assert!(Value::list(&[]).is_missing());
        assert_eq!(Value::from(Some("x")), Value::Text("x".to_string()));
        assert_eq!(Value::from(None::<String>), Value::Missing);
    }
}
