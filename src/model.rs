use serde::{Deserialize, Deserializer, Serialize, de};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub year: Option<i64>,
}

/// Body of create and update requests. Missing `title`/`author` are passed through
/// as NULL so the store's NOT NULL constraint reports them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookInput {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default, deserialize_with = "deserialize_year")]
    pub year: Option<i64>,
}

impl From<&Book> for BookInput {
    fn from(book: &Book) -> Self {
        BookInput {
            title: Some(book.title.clone()),
            author: Some(book.author.clone()),
            year: book.year,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum YearRepr {
    Int(i64),
    Text(String),
}

// Browser number inputs submit strings, so "1965" and "" are accepted alongside 1965 and null.
fn deserialize_year<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<YearRepr>::deserialize(deserializer)? {
        None => Ok(None),
        Some(YearRepr::Int(year)) => Ok(Some(year)),
        Some(YearRepr::Text(text)) => parse_year(&text).map_err(de::Error::custom),
    }
}

pub fn parse_year(text: &str) -> Result<Option<i64>, String> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }
    text.parse::<i64>()
        .map(Some)
        .map_err(|_| format!("invalid input syntax for type integer: \"{}\"", text))
}
