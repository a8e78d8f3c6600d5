use crate::db::models::{Category, Product};
use crate::db::pool::PoolProvisioner;
use crate::db::schema::SQLITE_INIT;
use crate::error::InventoryError;
use crate::types::NewProduct;
use crate::types::product::{PRICE_SCALE, round_price};
use rust_decimal::Decimal;
use sqlx::pool::PoolConnection;
use sqlx::sqlite::SqliteRow;
use sqlx::{Column, Row, Sqlite};
use std::sync::Arc;

const CATEGORY_COLUMNS: &[&str] = &["id", "name"];
const PRODUCT_COLUMNS: &[&str] = &["id", "name", "description", "price_cents", "category_id"];

/// Data access for categories and products. Every call checks out one pooled
/// connection and returns it when the call finishes, successfully or not.
#[derive(Clone)]
pub struct InventoryStorage {
    provisioner: Arc<PoolProvisioner>,
}

impl InventoryStorage {
    pub fn new(provisioner: Arc<PoolProvisioner>) -> Self {
        Self { provisioner }
    }

    pub fn provisioner(&self) -> &PoolProvisioner {
        &self.provisioner
    }

    async fn acquire(&self) -> Result<PoolConnection<Sqlite>, InventoryError> {
        let pool = self.provisioner.pool().await?;
        Ok(pool.acquire().await?)
    }

    /// Initialize the schema by executing the bundled DDL.
    pub async fn init_schema(&self) -> Result<(), InventoryError> {
        let mut conn = self.acquire().await?;
        // sqlx::query runs one statement at a time
        for stmt in SQLITE_INIT.split(';') {
            let s = stmt.trim();
            if s.is_empty() {
                continue;
            }
            sqlx::query(s).execute(&mut *conn).await?;
        }
        Ok(())
    }

    /// Insert a category. A duplicate name fails with a unique-constraint violation.
    pub async fn create_category(&self, name: &str) -> Result<Category, InventoryError> {
        let mut conn = self.acquire().await?;
        let row = sqlx::query("INSERT INTO categories (name) VALUES (?) RETURNING id, name")
            .bind(name)
            .fetch_one(&mut *conn)
            .await?;
        Self::row_to_category(row)
    }

    /// All categories ordered by name.
    pub async fn list_categories(&self) -> Result<Vec<Category>, InventoryError> {
        let mut conn = self.acquire().await?;
        let rows = sqlx::query("SELECT id, name FROM categories ORDER BY name")
            .fetch_all(&mut *conn)
            .await?;
        rows.into_iter().map(Self::row_to_category).collect()
    }

    pub async fn get_category(&self, id: i64) -> Result<Option<Category>, InventoryError> {
        let mut conn = self.acquire().await?;
        let row = sqlx::query("SELECT id, name FROM categories WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;
        row.map(Self::row_to_category).transpose()
    }

    /// Remove a category; the store drops its products through the cascade.
    pub async fn delete_category(&self, id: i64) -> Result<bool, InventoryError> {
        let mut conn = self.acquire().await?;
        let result = sqlx::query("DELETE FROM categories WHERE id = ?")
            .bind(id)
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn count_categories(&self) -> Result<i64, InventoryError> {
        let mut conn = self.acquire().await?;
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM categories")
            .fetch_one(&mut *conn)
            .await?;
        Ok(count)
    }

    /// Insert a product. Category existence is the caller's precondition; a missing
    /// category still fails here through the foreign key.
    pub async fn create_product(&self, new: &NewProduct) -> Result<Product, InventoryError> {
        let price_cents = price_to_cents(new.price)?;
        let mut conn = self.acquire().await?;
        let row = sqlx::query(
            r#"INSERT INTO products (name, description, price_cents, category_id)
               VALUES (?, ?, ?, ?)
               RETURNING id, name, description, price_cents, category_id"#,
        )
        .bind(&new.name)
        .bind(&new.description)
        .bind(price_cents)
        .bind(new.category_id)
        .fetch_one(&mut *conn)
        .await?;
        Self::row_to_product(row)
    }

    /// All products ordered by id.
    pub async fn list_products(&self) -> Result<Vec<Product>, InventoryError> {
        let mut conn = self.acquire().await?;
        let rows = sqlx::query(
            r#"SELECT id, name, description, price_cents, category_id
               FROM products ORDER BY id"#,
        )
        .fetch_all(&mut *conn)
        .await?;
        rows.into_iter().map(Self::row_to_product).collect()
    }

    /// Products of one category ordered by id; empty when the category has none.
    pub async fn list_products_by_category(
        &self,
        category_id: i64,
    ) -> Result<Vec<Product>, InventoryError> {
        let mut conn = self.acquire().await?;
        let rows = sqlx::query(
            r#"SELECT id, name, description, price_cents, category_id
               FROM products WHERE category_id = ? ORDER BY id"#,
        )
        .bind(category_id)
        .fetch_all(&mut *conn)
        .await?;
        rows.into_iter().map(Self::row_to_product).collect()
    }

    pub async fn get_product(&self, id: i64) -> Result<Option<Product>, InventoryError> {
        let mut conn = self.acquire().await?;
        let row = sqlx::query(
            r#"SELECT id, name, description, price_cents, category_id
               FROM products WHERE id = ?"#,
        )
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
        row.map(Self::row_to_product).transpose()
    }

    /// Replace every mutable field of a product. `None` when no row has `id`.
    pub async fn update_product(
        &self,
        id: i64,
        new: &NewProduct,
    ) -> Result<Option<Product>, InventoryError> {
        let price_cents = price_to_cents(new.price)?;
        let mut conn = self.acquire().await?;
        let row = sqlx::query(
            r#"UPDATE products SET
                name = ?,
                description = ?,
                price_cents = ?,
                category_id = ?
              WHERE id = ?
              RETURNING id, name, description, price_cents, category_id"#,
        )
        .bind(&new.name)
        .bind(&new.description)
        .bind(price_cents)
        .bind(new.category_id)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
        row.map(Self::row_to_product).transpose()
    }

    /// True when a row was removed.
    pub async fn delete_product(&self, id: i64) -> Result<bool, InventoryError> {
        let mut conn = self.acquire().await?;
        let result = sqlx::query("DELETE FROM products WHERE id = ?")
            .bind(id)
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    fn row_to_category(row: SqliteRow) -> Result<Category, InventoryError> {
        expect_columns(&row, CATEGORY_COLUMNS)?;
        let id: i64 = row.try_get("id")?;
        let name: String = row.try_get("name")?;
        Ok(Category { id, name })
    }

    fn row_to_product(row: SqliteRow) -> Result<Product, InventoryError> {
        expect_columns(&row, PRODUCT_COLUMNS)?;
        let id: i64 = row.try_get("id")?;
        let name: String = row.try_get("name")?;
        let description: Option<String> = row.try_get("description")?;
        let price_cents: i64 = row.try_get("price_cents")?;
        let category_id: i64 = row.try_get("category_id")?;

        Ok(Product {
            id,
            name,
            description,
            price: cents_to_price(price_cents),
            category_id,
        })
    }
}

fn expect_columns(row: &SqliteRow, expected: &[&str]) -> Result<(), sqlx::Error> {
    let actual: Vec<&str> = row.columns().iter().map(|c| c.name()).collect();
    if actual != expected {
        return Err(sqlx::Error::Protocol(format!(
            "unexpected columns {actual:?}, expected {expected:?}"
        )));
    }
    Ok(())
}

/// Exact minor units for storage. Rounds to the stored scale first.
fn price_to_cents(price: Decimal) -> Result<i64, sqlx::Error> {
    let mut scaled = round_price(price);
    scaled.rescale(PRICE_SCALE);
    i64::try_from(scaled.mantissa())
        .map_err(|e| sqlx::Error::Encode(format!("price {price} out of range: {e}").into()))
}

fn cents_to_price(cents: i64) -> Decimal {
    Decimal::new(cents, PRICE_SCALE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConstraintKind;
    use crate::db::test_support::temp_database_url;
    use std::path::PathBuf;
    use std::str::FromStr;

    async fn storage(tag: &str) -> (InventoryStorage, PathBuf) {
        let (url, path) = temp_database_url(tag);
        let provisioner = Arc::new(PoolProvisioner::new(&url).unwrap());
        let storage = InventoryStorage::new(provisioner);
        storage.init_schema().await.unwrap();
        (storage, path)
    }

    async fn cleanup(storage: InventoryStorage, path: PathBuf) {
        storage.provisioner().close().await;
        let _ = std::fs::remove_file(path);
    }

    fn new_product(name: &str, price: &str, category_id: i64) -> NewProduct {
        NewProduct {
            name: name.to_string(),
            description: None,
            price: Decimal::from_str(price).unwrap(),
            category_id,
        }
    }

    #[test]
    fn cents_conversion_is_exact() {
        let price = Decimal::from_str("499.99").unwrap();
        assert_eq!(price_to_cents(price).unwrap(), 49_999);
        assert_eq!(cents_to_price(49_999), price);
        assert_eq!(price_to_cents(Decimal::from(5)).unwrap(), 500);
    }

    #[tokio::test]
    async fn schema_setup_is_idempotent() {
        let (storage, path) = storage("schema-twice").await;
        storage.init_schema().await.unwrap();
        assert_eq!(storage.count_categories().await.unwrap(), 0);
        cleanup(storage, path).await;
    }

    #[tokio::test]
    async fn category_round_trip() {
        let (storage, path) = storage("category-round-trip").await;
        let created = storage.create_category("Electronics").await.unwrap();
        let fetched = storage.get_category(created.id).await.unwrap();
        assert_eq!(fetched, Some(created));
        assert_eq!(storage.get_category(999_999).await.unwrap(), None);
        cleanup(storage, path).await;
    }

    #[tokio::test]
    async fn duplicate_category_name_is_a_constraint_violation() {
        let (storage, path) = storage("category-dup").await;
        storage.create_category("Books").await.unwrap();
        let err = storage.create_category("Books").await.unwrap_err();
        assert!(err.is_constraint(ConstraintKind::Unique), "{err:?}");
        assert_eq!(storage.count_categories().await.unwrap(), 1);
        cleanup(storage, path).await;
    }

    #[tokio::test]
    async fn categories_are_listed_by_name() {
        let (storage, path) = storage("category-order").await;
        for name in ["Toys", "Books", "Garden"] {
            storage.create_category(name).await.unwrap();
        }
        let names: Vec<_> = storage
            .list_categories()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, ["Books", "Garden", "Toys"]);
        cleanup(storage, path).await;
    }

    #[tokio::test]
    async fn product_with_unknown_category_is_not_inserted() {
        let (storage, path) = storage("product-fk").await;
        let err = storage
            .create_product(&new_product("Ghost", "1.00", 999_999))
            .await
            .unwrap_err();
        assert!(err.is_constraint(ConstraintKind::ForeignKey), "{err:?}");
        assert!(storage.list_products().await.unwrap().is_empty());
        cleanup(storage, path).await;
    }

    #[tokio::test]
    async fn products_by_category_are_filtered_and_ordered() {
        let (storage, path) = storage("product-by-category").await;
        let a = storage.create_category("A").await.unwrap();
        let b = storage.create_category("B").await.unwrap();
        let empty = storage.create_category("Empty").await.unwrap();

        let p1 = storage.create_product(&new_product("p1", "1.00", a.id)).await.unwrap();
        storage.create_product(&new_product("p2", "2.00", b.id)).await.unwrap();
        let p3 = storage.create_product(&new_product("p3", "3.00", a.id)).await.unwrap();

        let in_a = storage.list_products_by_category(a.id).await.unwrap();
        assert_eq!(in_a, vec![p1, p3]);
        assert!(storage.list_products_by_category(empty.id).await.unwrap().is_empty());

        let all_ids: Vec<_> = storage
            .list_products()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert!(all_ids.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(all_ids.len(), 3);
        cleanup(storage, path).await;
    }

    #[tokio::test]
    async fn deleting_a_category_cascades_to_products() {
        let (storage, path) = storage("cascade").await;
        let c = storage.create_category("Doomed").await.unwrap();
        let p1 = storage.create_product(&new_product("p1", "1.00", c.id)).await.unwrap();
        let p2 = storage.create_product(&new_product("p2", "2.00", c.id)).await.unwrap();

        assert!(storage.delete_category(c.id).await.unwrap());
        assert_eq!(storage.get_product(p1.id).await.unwrap(), None);
        assert_eq!(storage.get_product(p2.id).await.unwrap(), None);
        assert!(!storage.delete_category(c.id).await.unwrap());
        cleanup(storage, path).await;
    }

    #[tokio::test]
    async fn update_replaces_all_fields() {
        let (storage, path) = storage("update").await;
        let old = storage.create_category("Old").await.unwrap();
        let new_cat = storage.create_category("New").await.unwrap();
        let p = storage.create_product(&new_product("Phone", "499.99", old.id)).await.unwrap();

        let mut replacement = new_product("Tablet", "250.50", new_cat.id);
        replacement.description = Some("10 inch".to_string());
        let updated = storage.update_product(p.id, &replacement).await.unwrap().unwrap();
        assert_eq!(updated.name, "Tablet");
        assert_eq!(updated.description.as_deref(), Some("10 inch"));
        assert_eq!(updated.price, Decimal::from_str("250.50").unwrap());
        assert_eq!(updated.category_id, new_cat.id);
        assert_eq!(storage.get_product(p.id).await.unwrap(), Some(updated));
        cleanup(storage, path).await;
    }

    #[tokio::test]
    async fn update_of_missing_product_is_absent_without_side_effects() {
        let (storage, path) = storage("update-missing").await;
        let c = storage.create_category("C").await.unwrap();
        let p = storage.create_product(&new_product("p", "1.00", c.id)).await.unwrap();

        let res = storage
            .update_product(p.id + 100, &new_product("x", "9.00", c.id))
            .await
            .unwrap();
        assert_eq!(res, None);
        assert_eq!(storage.list_products().await.unwrap(), vec![p]);
        cleanup(storage, path).await;
    }

    #[tokio::test]
    async fn negative_price_on_update_is_rejected_by_the_store() {
        let (storage, path) = storage("update-negative").await;
        let c = storage.create_category("C").await.unwrap();
        let p = storage.create_product(&new_product("p", "1.00", c.id)).await.unwrap();

        let err = storage
            .update_product(p.id, &new_product("p", "-1.00", c.id))
            .await
            .unwrap_err();
        assert!(err.is_constraint(ConstraintKind::Check), "{err:?}");
        assert_eq!(storage.get_product(p.id).await.unwrap(), Some(p));
        cleanup(storage, path).await;
    }

    #[tokio::test]
    async fn delete_reports_whether_a_row_was_removed() {
        let (storage, path) = storage("delete").await;
        let c = storage.create_category("C").await.unwrap();
        let p = storage.create_product(&new_product("p", "1.00", c.id)).await.unwrap();

        assert!(storage.delete_product(p.id).await.unwrap());
        assert!(!storage.delete_product(p.id).await.unwrap());
        assert_eq!(storage.get_product(p.id).await.unwrap(), None);
        cleanup(storage, path).await;
    }
}
