use crate::model::{Book, BookInput};

use super::CatalogApi;

pub struct CatalogView<A> {
    api: A,
    books: Vec<Book>,
    draft: BookInput,
    editing: Option<Book>,
}

impl<A: CatalogApi> CatalogView<A> {
    pub fn new(api: A) -> Self {
        CatalogView {
            api,
            books: Vec::new(),
            draft: BookInput::default(),
            editing: None,
        }
    }

    pub fn books(&self) -> &[Book] {
        &self.books
    }

    pub fn draft(&self) -> &BookInput {
        &self.draft
    }

    pub fn editing(&self) -> Option<&Book> {
        self.editing.as_ref()
    }

    pub fn set_draft(&mut self, draft: BookInput) {
        self.draft = draft;
    }

    pub fn draft_mut(&mut self) -> &mut BookInput {
        &mut self.draft
    }

    pub async fn mount(&mut self) -> bool {
        self.refresh().await
    }

    /// Replaces the local list wholesale. On failure the previous list stays.
    pub async fn refresh(&mut self) -> bool {
        match self.api.list().await {
            Ok(books) => {
                self.books = books;
                true
            }
            Err(e) => {
                tracing::error!(error = %e, "error fetching books");
                false
            }
        }
    }

    /// Sends the draft: an update while editing, a create otherwise. The draft and
    /// the edit target are cleared only when the request succeeds.
    pub async fn submit(&mut self) -> bool {
        let result = match &self.editing {
            Some(target) => self.api.update(target.id, &self.draft).await.map(|_| ()),
            None => self.api.create(&self.draft).await.map(|_| ()),
        };

        if let Err(e) = result {
            tracing::error!(error = %e, editing = self.editing.is_some(), "error saving book");
            return false;
        }

        self.editing = None;
        self.draft = BookInput::default();
        self.refresh().await;
        true
    }

    pub async fn delete(&mut self, id: i64) -> bool {
        if let Err(e) = self.api.delete(id).await {
            tracing::error!(error = %e, book_id = id, "error deleting book");
            return false;
        }
        self.refresh().await;
        true
    }

    /// Copies the book's fields into the draft and marks it as the edit target.
    /// Returns `false` when `id` is not in the current list.
    pub fn start_edit(&mut self, id: i64) -> bool {
        let Some(book) = self.books.iter().find(|b| b.id == id).cloned() else {
            return false;
        };
        self.draft = BookInput::from(&book);
        self.editing = Some(book);
        true
    }

    pub fn cancel_edit(&mut self) {
        self.editing = None;
        self.draft = BookInput::default();
    }
}

pub fn render_table(books: &[Book]) -> String {
    let rows: Vec<[String; 4]> = books
        .iter()
        .map(|b| {
            [
                b.id.to_string(),
                b.title.clone(),
                b.author.clone(),
                b.year.map(|y| y.to_string()).unwrap_or_default(),
            ]
        })
        .collect();

    let header = ["ID", "Title", "Author", "Year"].map(String::from);
    let mut widths = header.clone().map(|h| h.chars().count());
    for row in &rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let line = |cells: &[String; 4]| {
        cells
            .iter()
            .zip(widths)
            .map(|(c, w)| format!("{:<w$}", c, w = w))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut out = vec![line(&header)];
    out.extend(rows.iter().map(line));
    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MessageResponse;
    use crate::client::http::Result;
    use crate::error::ClientError;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    #[derive(Default)]
    struct FakeCatalog {
        books: Mutex<Vec<Book>>,
        next_id: AtomicUsize,
        fail: AtomicBool,
        list_calls: AtomicUsize,
    }

    impl FakeCatalog {
        fn check(&self) -> Result<()> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(ClientError::Status {
                    status: 500,
                    body: r#"{"error":"connection refused"}"#.to_string(),
                });
            }
            Ok(())
        }
    }

    #[async_trait]
    impl<'a> CatalogApi for &'a FakeCatalog {
        async fn list(&self) -> Result<Vec<Book>> {
            self.list_calls.fetch_add(1, Ordering::SeqCst);
            self.check()?;
            let mut books = self.books.lock().unwrap().clone();
            books.sort_by(|a, b| b.id.cmp(&a.id));
            Ok(books)
        }

        async fn create(&self, input: &BookInput) -> Result<Book> {
            self.check()?;
            let id = self.next_id.fetch_add(1, Ordering::SeqCst) as i64 + 1;
            let book = Book {
                id,
                title: input.title.clone().unwrap_or_default(),
                author: input.author.clone().unwrap_or_default(),
                year: input.year,
            };
            self.books.lock().unwrap().push(book.clone());
            Ok(book)
        }

        async fn update(&self, id: i64, input: &BookInput) -> Result<Option<Book>> {
            self.check()?;
            let mut books = self.books.lock().unwrap();
            Ok(books.iter_mut().find(|b| b.id == id).map(|b| {
                b.title = input.title.clone().unwrap_or_default();
                b.author = input.author.clone().unwrap_or_default();
                b.year = input.year;
                b.clone()
            }))
        }

        async fn delete(&self, id: i64) -> Result<MessageResponse> {
            self.check()?;
            self.books.lock().unwrap().retain(|b| b.id != id);
            Ok(MessageResponse::deleted())
        }
    }

    fn draft(title: &str, author: &str, year: Option<i64>) -> BookInput {
        BookInput {
            title: Some(title.to_string()),
            author: Some(author.to_string()),
            year,
        }
    }

    #[tokio::test]
    async fn test_submit_creates_clears_draft_and_refetches() {
        let api = FakeCatalog::default();
        let mut view = CatalogView::new(&api);
        assert!(view.mount().await);
        assert!(view.books().is_empty());

        view.set_draft(draft("Dune", "Herbert", Some(1965)));
        assert!(view.submit().await);

        assert_eq!(view.draft(), &BookInput::default());
        assert_eq!(view.books().len(), 1);
        assert_eq!(view.books()[0].title, "Dune");
        assert_eq!(api.list_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_edit_flow_puts_to_target() {
        let api = FakeCatalog::default();
        let mut view = CatalogView::new(&api);
        view.set_draft(draft("Dune", "Herbert", Some(1965)));
        view.submit().await;

        assert!(view.start_edit(1));
        assert_eq!(view.draft(), &draft("Dune", "Herbert", Some(1965)));
        assert_eq!(view.editing().map(|b| b.id), Some(1));

        view.draft_mut().author = Some("Frank Herbert".to_string());
        assert!(view.submit().await);

        assert!(view.editing().is_none());
        assert_eq!(view.books().len(), 1);
        assert_eq!(view.books()[0].author, "Frank Herbert");
    }

    #[tokio::test]
    async fn test_start_edit_unknown_id() {
        let api = FakeCatalog::default();
        let mut view = CatalogView::new(&api);
        view.mount().await;
        assert!(!view.start_edit(5));
        assert!(view.editing().is_none());
    }

    #[tokio::test]
    async fn test_cancel_edit_resets_draft() {
        let api = FakeCatalog::default();
        let mut view = CatalogView::new(&api);
        view.set_draft(draft("Emma", "Austen", None));
        view.submit().await;

        view.start_edit(1);
        view.cancel_edit();
        assert!(view.editing().is_none());
        assert_eq!(view.draft(), &BookInput::default());
    }

    #[tokio::test]
    async fn test_delete_refetches() {
        let api = FakeCatalog::default();
        let mut view = CatalogView::new(&api);
        for title in ["A", "B"] {
            view.set_draft(draft(title, "Anon", None));
            view.submit().await;
        }
        assert_eq!(view.books().iter().map(|b| b.id).collect::<Vec<_>>(), vec![2, 1]);

        assert!(view.delete(2).await);
        assert_eq!(view.books().iter().map(|b| b.id).collect::<Vec<_>>(), vec![1]);
    }

    #[tokio::test]
    async fn test_failures_leave_stale_state() {
        let api = FakeCatalog::default();
        let mut view = CatalogView::new(&api);
        view.set_draft(draft("Dune", "Herbert", None));
        view.submit().await;

        api.fail.store(true, Ordering::SeqCst);

        view.set_draft(draft("Emma", "Austen", None));
        assert!(!view.submit().await);
        assert_eq!(view.draft(), &draft("Emma", "Austen", None));

        assert!(!view.delete(1).await);
        assert!(!view.refresh().await);
        assert_eq!(view.books().len(), 1);
        assert_eq!(view.books()[0].title, "Dune");
    }

    #[test]
    fn test_render_table() {
        let books = vec![
            Book {
                id: 2,
                title: "Emma".to_string(),
                author: "Jane Austen".to_string(),
                year: None,
            },
            Book {
                id: 1,
                title: "Dune".to_string(),
                author: "Herbert".to_string(),
                year: Some(1965),
            },
        ];
        let table = render_table(&books);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines[0], "ID  Title  Author       Year");
        assert_eq!(lines[1], "2   Emma   Jane Austen");
        assert_eq!(lines[2], "1   Dune   Herbert      1965");
    }
}
