//! Server-rendered pages. All user-supplied text goes through `escape_html`.

use std::fmt::Write;

use axum::http::StatusCode;

use crate::modules::books::models::Book;
use crate::modules::categories::models::Category;
use crate::utils::escape_html;

fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title}</title>
</head>
<body>
<nav><a href="/">Home</a> | <a href="/books">Books</a> | <a href="/categories">Categories</a></nav>
<h1>{title}</h1>
{body}
</body>
</html>
"#,
        title = escape_html(title),
        body = body,
    )
}

fn error_banner(message: Option<&str>) -> String {
    match message {
        Some(message) => format!(
            r#"<p class="error" role="alert">{}</p>"#,
            escape_html(message)
        ),
        None => String::new(),
    }
}

pub fn index() -> String {
    layout(
        "Bookstore",
        r#"<ul>
<li><a href="/books">Books</a></li>
<li><a href="/categories">Categories</a></li>
</ul>"#,
    )
}

pub fn book_list(books: &[Book]) -> String {
    let mut body = String::from(r#"<p><a href="/books/new">+ New Book</a></p>"#);

    if books.is_empty() {
        body.push_str("<p>No books</p>");
        return layout("Book List", &body);
    }

    body.push_str(
        r#"<table id="booksTable">
<thead><tr><th>ID</th><th>Title</th><th>Author</th><th>ISBN</th><th>Published</th><th>Available</th><th>Category</th><th></th></tr></thead>
<tbody>
"#,
    );
    for book in books {
        let id = book.id.map(|id| id.to_string()).unwrap_or_default();
        let category = book
            .category()
            .and_then(|reference| reference.name.as_deref())
            .unwrap_or("");
        let _ = writeln!(
            body,
            r#"<tr><td>{id}</td><td>{title}</td><td>{author}</td><td>{isbn}</td><td>{published}</td><td>{available}</td><td>{category}</td><td><a href="/books/{id}/edit">Edit</a> <form method="post" action="/books/{id}/delete" style="display:inline"><button type="submit">Delete</button></form></td></tr>"#,
            id = id,
            title = escape_html(&book.title),
            author = escape_html(book.author.as_deref().unwrap_or("")),
            isbn = escape_html(book.isbn.as_deref().unwrap_or("")),
            published = book
                .published_date
                .map(|date| date.to_string())
                .unwrap_or_default(),
            available = if book.available { "yes" } else { "no" },
            category = escape_html(category),
        );
    }
    body.push_str("</tbody>\n</table>");

    layout("Book List", &body)
}

/// New-book form when `book` is `None`, edit form otherwise.
pub fn book_form(book: Option<&Book>, categories: &[Category]) -> String {
    let (title, action, method_field) = match book.and_then(|book| book.id) {
        Some(id) => (
            "Edit Book",
            format!("/books/{}", id),
            r#"<input type="hidden" name="_method" value="put">"#,
        ),
        None => ("New Book", "/books".to_string(), ""),
    };

    let value = |field: Option<&str>| escape_html(field.unwrap_or(""));
    let selected_category = book.and_then(Book::category_id);

    let mut options = String::from(r#"<option value="">No category</option>"#);
    for category in categories {
        let Some(id) = category.id() else { continue };
        let selected = if selected_category == Some(id) {
            " selected"
        } else {
            ""
        };
        let _ = write!(
            options,
            r#"<option value="{id}"{selected}>{name}</option>"#,
            name = escape_html(category.name()),
        );
    }

    let body = format!(
        r#"<form method="post" action="{action}">
{method_field}
<p><label for="title">Title</label> <input id="title" name="title" value="{title_value}"></p>
<p><label for="author">Author</label> <input id="author" name="author" value="{author}"></p>
<p><label for="isbn">ISBN</label> <input id="isbn" name="isbn" value="{isbn}"></p>
<p><label for="publishedDate">Published</label> <input id="publishedDate" name="publishedDate" type="date" value="{published}"></p>
<p><label for="available">Available</label> <input id="available" name="available" type="checkbox" value="true"{checked}></p>
<p><label for="category">Category</label> <select id="category" name="category">{options}</select></p>
<p><button type="submit" name="btn_submit">Save</button> <a href="/books">Cancel</a></p>
</form>"#,
        title_value = value(book.map(|book| book.title.as_str())),
        author = value(book.and_then(|book| book.author.as_deref())),
        isbn = value(book.and_then(|book| book.isbn.as_deref())),
        published = book
            .and_then(|book| book.published_date)
            .map(|date| date.to_string())
            .unwrap_or_default(),
        checked = if book.is_some_and(|book| book.available) {
            " checked"
        } else {
            ""
        },
    );

    layout(title, &body)
}

/// Category list, with `error` shown above the table when a delete failed.
pub fn category_list(categories: &[Category], error: Option<&str>) -> String {
    let mut body = error_banner(error);
    body.push_str(r#"<p><a href="/categories/new">+ New Category</a></p>"#);

    if categories.is_empty() {
        body.push_str("<p>No categories</p>");
        return layout("Categories", &body);
    }

    body.push_str(
        r#"<table id="categoriesTable">
<thead><tr><th>ID</th><th>Name</th><th>Books</th><th></th></tr></thead>
<tbody>
"#,
    );
    for category in categories {
        let id = category.id().map(|id| id.to_string()).unwrap_or_default();
        let count = category.books().len();
        let warning = if count > 0 {
            r#" <span class="category-has-books-warning">has books</span>"#
        } else {
            ""
        };
        let _ = writeln!(
            body,
            r#"<tr><td>{id}</td><td>{name}</td><td>{count}{warning}</td><td><a href="/categories/{id}/edit">Edit</a> <form method="post" action="/categories/{id}/delete" style="display:inline"><button type="submit">Delete</button></form></td></tr>"#,
            name = escape_html(category.name()),
        );
    }
    body.push_str("</tbody>\n</table>");

    layout("Categories", &body)
}

/// New-category form when `category` is `None`, edit form otherwise.
pub fn category_form(category: Option<&Category>) -> String {
    let (title, action, method_field) = match category.and_then(Category::id) {
        Some(id) => (
            "Edit Category",
            format!("/categories/{}", id),
            r#"<input type="hidden" name="_method" value="put">"#,
        ),
        None => ("New Category", "/categories".to_string(), ""),
    };

    let body = format!(
        r#"<form method="post" action="{action}">
{method_field}
<p><label for="name">Name</label> <input id="name" name="name" value="{name}"></p>
<p><button type="submit" name="btn_submit">Save</button> <a href="/categories">Cancel</a></p>
</form>"#,
        name = escape_html(category.map(Category::name).unwrap_or("")),
    );

    layout(title, &body)
}

pub fn error_page(status: StatusCode, message: &str) -> String {
    let title = status.canonical_reason().unwrap_or("Error");
    layout(title, &error_banner(Some(message)))
}
