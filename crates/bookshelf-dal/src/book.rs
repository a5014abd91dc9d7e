use crate::{Error, ListingParams, error::Result};
use futures::{StreamExt as _, TryStreamExt as _};
use garde::Validate;
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::Pool;
use time::{Date, OffsetDateTime, PrimitiveDateTime};
use tracing::debug;

const SELECT_FIELDS: &str =
    "id, title, author, isbn, publication_date, description, created_at, updated_at";

#[derive(Debug, Serialize, Deserialize, Clone, Validate)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CreateBook {
    #[garde(length(chars, min = 1, max = 255))]
    pub title: String,
    #[garde(length(chars, min = 1, max = 255))]
    pub author: String,
    #[garde(length(chars, min = 10, max = 13))]
    pub isbn: String,
    #[garde(skip)]
    pub publication_date: Date,
    #[garde(length(chars, max = 1000))]
    #[serde(default)]
    pub description: Option<String>,
}

/// Partial update, a field left out of the payload keeps its stored value.
///
/// `description` is the only nullable column, so it distinguishes a missing key
/// (`None`) from an explicit `null` (`Some(None)`), which clears it.
#[derive(Debug, Serialize, Deserialize, Clone, Default, Validate)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UpdateBook {
    #[garde(length(chars, min = 1, max = 255))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[garde(length(chars, min = 1, max = 255))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[garde(length(chars, min = 10, max = 13))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isbn: Option<String>,
    #[garde(skip)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publication_date: Option<Date>,
    #[garde(length(chars, max = 1000))]
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>))]
    pub description: Option<Option<String>>,
}

fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

impl UpdateBook {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.author.is_none()
            && self.isbn.is_none()
            && self.publication_date.is_none()
            && self.description.is_none()
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, sqlx::FromRow)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub publication_date: Date,
    pub description: Option<String>,
    pub created_at: PrimitiveDateTime,
    pub updated_at: PrimitiveDateTime,
}

pub(crate) fn now() -> PrimitiveDateTime {
    let now = OffsetDateTime::now_utc();
    PrimitiveDateTime::new(now.date(), now.time())
}

/// Escapes LIKE wildcards so the query matches literally.
fn like_pattern(query: &str) -> String {
    let mut pattern = String::with_capacity(query.len() + 2);
    pattern.push('%');
    for c in query.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

pub type BookRepository = BookRepositoryImpl<Pool<crate::ChosenDB>>;

pub struct BookRepositoryImpl<E> {
    executor: E,
}

impl<'c, E> BookRepositoryImpl<E>
where
    for<'a> &'a E: sqlx::Executor<'c, Database = crate::ChosenDB>,
{
    pub fn new(executor: E) -> Self {
        Self { executor }
    }

    pub async fn create(&self, payload: CreateBook) -> Result<Book> {
        let timestamp = now();
        let sql = format!(
            "INSERT INTO books (title, author, isbn, publication_date, description, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            RETURNING {SELECT_FIELDS}"
        );
        let record = sqlx::query_as::<_, Book>(&sql)
            .bind(&payload.title)
            .bind(&payload.author)
            .bind(&payload.isbn)
            .bind(payload.publication_date)
            .bind(&payload.description)
            .bind(timestamp)
            .bind(timestamp)
            .fetch_one(&self.executor)
            .await?;

        debug!("Created book {}", record.id);
        Ok(record)
    }

    /// Single statement, so concurrent writers just wait for the database lock.
    /// Absent fields keep their stored values and `updated_at` never drops below `created_at`.
    pub async fn update(&self, id: i64, payload: UpdateBook) -> Result<Book> {
        if payload.is_empty() {
            return Err(Error::NothingToUpdate);
        }
        let (description_present, description) = match payload.description {
            Some(description) => (true, description),
            None => (false, None),
        };
        let sql = format!(
            "UPDATE books SET
                title = COALESCE(?, title),
                author = COALESCE(?, author),
                isbn = COALESCE(?, isbn),
                publication_date = COALESCE(?, publication_date),
                description = CASE WHEN ? THEN ? ELSE description END,
                updated_at = MAX(?, created_at)
            WHERE id = ?
            RETURNING {SELECT_FIELDS}"
        );
        let record = sqlx::query_as::<_, Book>(&sql)
            .bind(payload.title)
            .bind(payload.author)
            .bind(payload.isbn)
            .bind(payload.publication_date)
            .bind(description_present)
            .bind(description)
            .bind(now())
            .bind(id)
            .fetch_one(&self.executor)
            .await?;

        debug!("Updated book {id}");
        Ok(record)
    }

    pub async fn count(&self) -> Result<u64> {
        let count: u64 = sqlx::query_scalar("SELECT count(*) FROM books")
            .fetch_one(&self.executor)
            .await?;
        Ok(count)
    }

    pub async fn list(&self, params: ListingParams) -> Result<Vec<Book>> {
        let sql = format!(
            "SELECT {SELECT_FIELDS} FROM books ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?"
        );
        let records = sqlx::query_as::<_, Book>(&sql)
            .bind(params.limit)
            .bind(params.offset)
            .fetch(&self.executor)
            .take(crate::MAX_LIMIT)
            .try_collect::<Vec<_>>()
            .await?;
        Ok(records)
    }

    /// Case-insensitive substring search, title matches rank above author matches,
    /// which rank above description-only matches. Each tier is newest first.
    pub async fn search(&self, query: &str, params: ListingParams) -> Result<Vec<Book>> {
        let pattern = like_pattern(query);
        let sql = format!(
            r#"SELECT {SELECT_FIELDS} FROM books
            WHERE title LIKE ? ESCAPE '\' OR author LIKE ? ESCAPE '\' OR description LIKE ? ESCAPE '\'
            ORDER BY
                CASE
                    WHEN title LIKE ? ESCAPE '\' THEN 0
                    WHEN author LIKE ? ESCAPE '\' THEN 1
                    ELSE 2
                END,
                created_at DESC, id DESC
            LIMIT ? OFFSET ?"#
        );
        let records = sqlx::query_as::<_, Book>(&sql)
            .bind(&pattern)
            .bind(&pattern)
            .bind(&pattern)
            .bind(&pattern)
            .bind(&pattern)
            .bind(params.limit)
            .bind(params.offset)
            .fetch(&self.executor)
            .take(crate::MAX_LIMIT)
            .try_collect::<Vec<_>>()
            .await?;
        Ok(records)
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        let res = sqlx::query("DELETE FROM books WHERE id = ?")
            .bind(id)
            .execute(&self.executor)
            .await?;

        if res.rows_affected() == 0 {
            Err(Error::RecordNotFound("Book".to_string()))
        } else {
            debug!("Deleted book {id}");
            Ok(())
        }
    }

    pub async fn get(&self, id: i64) -> Result<Book> {
        let sql = format!("SELECT {SELECT_FIELDS} FROM books WHERE id = ?");
        let record = sqlx::query_as::<_, Book>(&sql)
            .bind(id)
            .fetch_one(&self.executor)
            .await?;
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn create_payload() -> CreateBook {
        CreateBook {
            title: "Dune".into(),
            author: "Herbert".into(),
            isbn: "9780441013593".into(),
            publication_date: date!(1965 - 06 - 01),
            description: None,
        }
    }

    #[test]
    fn test_create_validation() {
        assert!(create_payload().validate().is_ok());

        let mut payload = create_payload();
        payload.title = String::new();
        assert!(payload.validate().is_err());

        let mut payload = create_payload();
        payload.author = "a".repeat(256);
        assert!(payload.validate().is_err());

        let mut payload = create_payload();
        payload.isbn = "123456789".into();
        assert!(payload.validate().is_err());

        let mut payload = create_payload();
        payload.isbn = "12345678901234".into();
        assert!(payload.validate().is_err());

        let mut payload = create_payload();
        payload.description = Some("x".repeat(1001));
        assert!(payload.validate().is_err());

        let mut payload = create_payload();
        payload.description = Some("x".repeat(1000));
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn test_lengths_count_characters() {
        let mut payload = create_payload();
        payload.title = "č".repeat(255);
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn test_create_payload_deserialization() {
        let payload: CreateBook = serde_json::from_str(
            r#"{"title":"Dune","author":"Herbert","isbn":"9780441013593","publication_date":"1965-06-01"}"#,
        )
        .unwrap();
        assert_eq!(payload.publication_date, date!(1965 - 06 - 01));
        assert_eq!(payload.description, None);

        let missing_isbn = serde_json::from_str::<CreateBook>(
            r#"{"title":"Dune","author":"Herbert","publication_date":"1965-06-01"}"#,
        );
        assert!(missing_isbn.is_err());
    }

    #[test]
    fn test_update_presence() {
        let update: UpdateBook = serde_json::from_str("{}").unwrap();
        assert!(update.is_empty());

        let update: UpdateBook = serde_json::from_str(r#"{"description":null}"#).unwrap();
        assert!(!update.is_empty());
        assert_eq!(update.description, Some(None));

        let update: UpdateBook = serde_json::from_str(r#"{"description":"epic"}"#).unwrap();
        assert_eq!(update.description, Some(Some("epic".to_string())));

        let update: UpdateBook = serde_json::from_str(r#"{"title":null}"#).unwrap();
        assert!(update.is_empty());
    }

    #[test]
    fn test_update_validation() {
        let update = UpdateBook {
            isbn: Some("short".into()),
            ..Default::default()
        };
        assert!(update.validate().is_err());

        let update = UpdateBook {
            description: Some(Some("x".repeat(1001))),
            ..Default::default()
        };
        assert!(update.validate().is_err());

        let update = UpdateBook {
            description: Some(None),
            title: Some("X".into()),
            ..Default::default()
        };
        assert!(update.validate().is_ok());
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("dune"), "%dune%");
        assert_eq!(like_pattern("100%"), "%100\\%%");
        assert_eq!(like_pattern("a_b\\c"), "%a\\_b\\\\c%");
        assert_eq!(like_pattern(""), "%%");
    }
}
