use anyhow::Result;
use bookshelf_dal::book::Book;
use reqwest::Url;
use serde_json::json;
use tracing::info;

pub async fn create_book(
    client: &reqwest::Client,
    base_url: &Url,
    title: &str,
    author: &str,
    isbn: &str,
    description: Option<&str>,
) -> Result<Book> {
    let payload = json!({
        "title": title,
        "author": author,
        "isbn": isbn,
        "publication_date": "1965-06-01",
        "description": description,
    });
    let api_url = base_url.join("api/books")?;

    let response = client.post(api_url).json(&payload).send().await?;
    info!("Response: {:#?}", response);
    assert!(response.status().is_success());
    assert!(response.status().as_u16() == 201);

    let new_book: Book = response.json().await?;
    Ok(new_book)
}

pub async fn list_books(client: &reqwest::Client, url: Url) -> Result<Vec<Book>> {
    let response = client.get(url).send().await?;
    info!("Response: {:#?}", response);
    assert!(response.status().is_success());
    let books: Vec<Book> = response.json().await?;
    Ok(books)
}
