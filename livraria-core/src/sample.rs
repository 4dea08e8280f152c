//! The starter catalog loaded into an empty collection.

use crate::book::NewBook;

fn book(
    title: &str,
    author: &str,
    publisher: &str,
    year: i32,
    quantity: u32,
    price: f64,
) -> NewBook {
    NewBook {
        title: title.to_string(),
        author: author.to_string(),
        publisher: publisher.to_string(),
        year,
        quantity,
        price,
    }
}

/// Five classics, one of them out of stock.
pub fn sample_catalog() -> Vec<NewBook> {
    vec![
        book("O Pequeno Príncipe", "Antoine de Saint-Exupéry", "Editora A", 1943, 3, 25.0),
        book("1984", "George Orwell", "Editora B", 1949, 5, 30.0),
        book("Dom Quixote", "Miguel de Cervantes", "Editora C", 1605, 2, 50.0),
        book("A Revolução dos Bichos", "George Orwell", "Editora B", 1945, 0, 20.0),
        book("O Hobbit", "J.R.R. Tolkien", "Editora D", 1937, 4, 45.0),
    ]
}
