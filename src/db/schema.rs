//! SQL DDL for the inventory tables.
//! Every statement is idempotent so it can run on each startup.

/// SQLite schema with:
/// - `categories.name` UNIQUE, so duplicates are rejected by the store
/// - `products.price_cents` holding `numeric(10,2)` as exact minor units, never negative
/// - `products.category_id` referencing `categories(id)` with cascading delete
/// - an index on `products.category_id` for the by-category listing
pub const SQLITE_INIT: &str = r#"
CREATE TABLE IF NOT EXISTS categories (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name VARCHAR(100) NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS products (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name VARCHAR(100) NOT NULL,
    description VARCHAR(255) NULL,
    price_cents INTEGER NOT NULL CHECK (price_cents >= 0),
    category_id INTEGER NOT NULL REFERENCES categories(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_products_category_id ON products(category_id);
"#;
