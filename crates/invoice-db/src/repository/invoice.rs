//! # Invoice Repository
//!
//! Database operations for invoices and their line items.
//!
//! ## Write Path
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Invoice Writes                                   │
//! │                                                                         │
//! │  Input items (client prices)                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  validate_items ── reject empty / oversized / negative amounts          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  pricing engine ── recompute every subtotal and the total server-side   │
//! │       │            (client-supplied derived amounts are discarded)      │
//! │       ▼                                                                 │
//! │  BEGIN                                                                  │
//! │    write header row                                                     │
//! │    write item rows (entry order preserved via position)                 │
//! │  COMMIT            ── header and items land atomically or not at all    │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Ownership
//! Every read and write is scoped by `user_id`. An invoice that exists but
//! belongs to someone else is indistinguishable from one that does not
//! exist: both come back as `DbError::NotFound`.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use invoice_core::pricing;
use invoice_core::types::{Invoice, LineItem, LineItemInput};
use invoice_core::validation::{validate_customer_name, validate_items};

use crate::error::{DbError, DbResult};

// =============================================================================
// Row Types
// =============================================================================

/// Raw invoice header row.
#[derive(Debug, sqlx::FromRow)]
struct InvoiceRow {
    id: String,
    user_id: String,
    customer_name: String,
    total_paise: i64,
    created_at: DateTime<Utc>,
}

/// Raw line item row.
#[derive(Debug, sqlx::FromRow)]
struct LineItemRow {
    id: String,
    invoice_id: String,
    item_name: String,
    price_paise: i64,
    quantity: i64,
    discount_paise: i64,
    gst_rate: i64,
    subtotal_paise: i64,
    position: i64,
}

impl From<LineItemRow> for LineItem {
    fn from(row: LineItemRow) -> Self {
        LineItem {
            id: row.id,
            invoice_id: row.invoice_id,
            item_name: row.item_name,
            price_paise: row.price_paise,
            quantity: row.quantity,
            discount_paise: row.discount_paise,
            gst_rate: row.gst_rate,
            subtotal_paise: row.subtotal_paise,
            position: row.position,
        }
    }
}

impl InvoiceRow {
    fn into_invoice(self, items: Vec<LineItem>) -> Invoice {
        Invoice {
            id: self.id,
            user_id: self.user_id,
            customer_name: self.customer_name,
            total_paise: self.total_paise,
            created_at: self.created_at,
            items,
        }
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for invoice storage.
#[derive(Debug, Clone)]
pub struct InvoiceRepository {
    pool: SqlitePool,
}

impl InvoiceRepository {
    /// Creates a new invoice repository.
    pub fn new(pool: SqlitePool) -> Self {
        InvoiceRepository { pool }
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Lists all invoices for one owner, newest first, items in entry order.
    pub async fn list_for_owner(&self, user_id: &str) -> DbResult<Vec<Invoice>> {
        debug!(user_id, "Listing invoices");

        let headers = sqlx::query_as::<_, InvoiceRow>(
            r#"
            SELECT id, user_id, customer_name, total_paise, created_at
            FROM invoices
            WHERE user_id = ?
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let mut invoices = Vec::with_capacity(headers.len());
        for header in headers {
            let items = self.items_for(&header.id).await?;
            invoices.push(header.into_invoice(items));
        }

        Ok(invoices)
    }

    /// Fetches one invoice, scoped by owner.
    pub async fn find_for_owner(&self, invoice_id: &str, user_id: &str) -> DbResult<Invoice> {
        let header = sqlx::query_as::<_, InvoiceRow>(
            r#"
            SELECT id, user_id, customer_name, total_paise, created_at
            FROM invoices
            WHERE id = ? AND user_id = ?
            "#,
        )
        .bind(invoice_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("Invoice", invoice_id))?;

        let items = self.items_for(invoice_id).await?;
        Ok(header.into_invoice(items))
    }

    async fn items_for(&self, invoice_id: &str) -> DbResult<Vec<LineItem>> {
        let rows = sqlx::query_as::<_, LineItemRow>(
            r#"
            SELECT id, invoice_id, item_name, price_paise, quantity,
                   discount_paise, gst_rate, subtotal_paise, position
            FROM invoice_items
            WHERE invoice_id = ?
            ORDER BY position ASC
            "#,
        )
        .bind(invoice_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(LineItem::from).collect())
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Creates a new invoice with its line items.
    ///
    /// The header and every item row commit in one transaction. All derived
    /// amounts (item subtotals, invoice total) are recomputed here; any
    /// client-supplied figures are ignored.
    pub async fn create(
        &self,
        user_id: &str,
        customer_name: &str,
        items: &[LineItemInput],
    ) -> DbResult<Invoice> {
        validate_customer_name(customer_name)?;
        validate_items(items)?;

        let invoice_id = Uuid::new_v4().to_string();
        let now = Utc::now();
        let total = pricing::invoice_total(items);

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO invoices (id, user_id, customer_name, total_paise, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&invoice_id)
        .bind(user_id)
        .bind(customer_name.trim())
        .bind(total.paise())
        .bind(now)
        .execute(&mut *tx)
        .await?;

        let rows = Self::insert_items(&mut tx, &invoice_id, items).await?;

        tx.commit().await?;

        info!(
            invoice_id = %invoice_id,
            user_id,
            items = rows.len(),
            total_paise = total.paise(),
            "Invoice created"
        );

        Ok(Invoice {
            id: invoice_id,
            user_id: user_id.to_string(),
            customer_name: customer_name.trim().to_string(),
            total_paise: total.paise(),
            created_at: now,
            items: rows,
        })
    }

    /// Replaces an invoice's contents: new customer name, new item set.
    ///
    /// The prior item set is discarded entirely and the total recomputed
    /// from the replacement. `created_at` is preserved. Fails with NotFound
    /// when the invoice doesn't exist or belongs to another user, in which
    /// case nothing is modified.
    pub async fn replace(
        &self,
        invoice_id: &str,
        user_id: &str,
        customer_name: &str,
        items: &[LineItemInput],
    ) -> DbResult<Invoice> {
        validate_customer_name(customer_name)?;
        validate_items(items)?;

        let total = pricing::invoice_total(items);

        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            r#"
            UPDATE invoices
            SET customer_name = ?, total_paise = ?
            WHERE id = ? AND user_id = ?
            "#,
        )
        .bind(customer_name.trim())
        .bind(total.paise())
        .bind(invoice_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            // No row touched yet, so rolling back is a no-op either way
            return Err(DbError::not_found("Invoice", invoice_id));
        }

        sqlx::query("DELETE FROM invoice_items WHERE invoice_id = ?")
            .bind(invoice_id)
            .execute(&mut *tx)
            .await?;

        let rows = Self::insert_items(&mut tx, invoice_id, items).await?;

        let created_at: DateTime<Utc> =
            sqlx::query_scalar("SELECT created_at FROM invoices WHERE id = ?")
                .bind(invoice_id)
                .fetch_one(&mut *tx)
                .await?;

        tx.commit().await?;

        info!(
            invoice_id,
            user_id,
            items = rows.len(),
            total_paise = total.paise(),
            "Invoice updated"
        );

        Ok(Invoice {
            id: invoice_id.to_string(),
            user_id: user_id.to_string(),
            customer_name: customer_name.trim().to_string(),
            total_paise: total.paise(),
            created_at,
            items: rows,
        })
    }

    /// Deletes an invoice and (via cascade) its line items.
    ///
    /// Ownership-scoped: deleting someone else's invoice is NotFound.
    pub async fn delete(&self, invoice_id: &str, user_id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM invoices WHERE id = ? AND user_id = ?")
            .bind(invoice_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Invoice", invoice_id));
        }

        info!(invoice_id, user_id, "Invoice deleted");
        Ok(())
    }

    /// Inserts the item rows for an invoice, positions assigned from entry
    /// order, subtotals recomputed by the pricing engine.
    async fn insert_items(
        tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
        invoice_id: &str,
        items: &[LineItemInput],
    ) -> DbResult<Vec<LineItem>> {
        let mut rows = Vec::with_capacity(items.len());

        for (position, item) in items.iter().enumerate() {
            let id = Uuid::new_v4().to_string();
            let subtotal = pricing::compute_line(item);

            sqlx::query(
                r#"
                INSERT INTO invoice_items
                    (id, invoice_id, item_name, price_paise, quantity,
                     discount_paise, gst_rate, subtotal_paise, position)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&id)
            .bind(invoice_id)
            .bind(item.item_name.trim())
            .bind(item.price.paise())
            .bind(item.quantity)
            .bind(item.discount.paise())
            .bind(item.gst_rate.percent() as i64)
            .bind(subtotal.paise())
            .bind(position as i64)
            .execute(&mut **tx)
            .await?;

            rows.push(LineItem {
                id,
                invoice_id: invoice_id.to_string(),
                item_name: item.item_name.trim().to_string(),
                price_paise: item.price.paise(),
                quantity: item.quantity,
                discount_paise: item.discount.paise(),
                gst_rate: item.gst_rate.percent() as i64,
                subtotal_paise: subtotal.paise(),
                position: position as i64,
            });
        }

        Ok(rows)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use invoice_core::money::Money;
    use invoice_core::types::GstRate;
    use invoice_core::ValidationError;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    async fn seed_user(db: &Database, id: &str) {
        sqlx::query(
            r#"
            INSERT INTO users (id, username, email, password_hash, created_at, updated_at)
            VALUES (?, ?, ?, 'hash', ?, ?)
            "#,
        )
        .bind(id)
        .bind(format!("user-{id}"))
        .bind(format!("{id}@shop.test"))
        .bind(Utc::now())
        .bind(Utc::now())
        .execute(db.pool())
        .await
        .unwrap();
    }

    fn item(name: &str, price: i64, qty: i64, discount: i64, rate: GstRate) -> LineItemInput {
        LineItemInput {
            item_name: name.to_string(),
            price: Money::from_paise(price),
            quantity: qty,
            discount: Money::from_paise(discount),
            gst_rate: rate,
        }
    }

    #[tokio::test]
    async fn test_create_recomputes_total() {
        let db = test_db().await;
        seed_user(&db, "u1").await;

        // 100.00 x2 - 20.00, 18% => 212.40
        let invoice = db
            .invoices()
            .create(
                "u1",
                "Asha Traders",
                &[item("Notebook", 10_000, 2, 2_000, GstRate::Eighteen)],
            )
            .await
            .unwrap();

        assert_eq!(invoice.total_paise, 21_240);
        assert_eq!(invoice.items.len(), 1);
        assert_eq!(invoice.items[0].subtotal_paise, 21_240);
        assert_eq!(invoice.items[0].position, 0);
    }

    #[tokio::test]
    async fn test_create_rejects_empty_items() {
        let db = test_db().await;
        seed_user(&db, "u1").await;

        let err = db.invoices().create("u1", "Asha", &[]).await.unwrap_err();
        assert!(matches!(
            err,
            DbError::Validation(ValidationError::EmptyItems)
        ));

        // Nothing persisted
        assert!(db.invoices().list_for_owner("u1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_is_owner_scoped_and_newest_first() {
        let db = test_db().await;
        seed_user(&db, "u1").await;
        seed_user(&db, "u2").await;

        let first = db
            .invoices()
            .create("u1", "First", &[item("A", 100, 1, 0, GstRate::Zero)])
            .await
            .unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let second = db
            .invoices()
            .create("u1", "Second", &[item("B", 100, 1, 0, GstRate::Zero)])
            .await
            .unwrap();
        db.invoices()
            .create("u2", "Other", &[item("C", 100, 1, 0, GstRate::Zero)])
            .await
            .unwrap();

        let listed = db.invoices().list_for_owner("u1").await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, second.id);
        assert_eq!(listed[1].id, first.id);
    }

    #[tokio::test]
    async fn test_replace_swaps_item_set() {
        let db = test_db().await;
        seed_user(&db, "u1").await;

        let invoice = db
            .invoices()
            .create(
                "u1",
                "Asha",
                &[
                    item("A", 10_000, 1, 0, GstRate::Zero),
                    item("B", 5_000, 1, 0, GstRate::Zero),
                ],
            )
            .await
            .unwrap();

        let updated = db
            .invoices()
            .replace(
                &invoice.id,
                "u1",
                "Asha Traders",
                &[item("C", 10_000, 1, 0, GstRate::Five)],
            )
            .await
            .unwrap();

        assert_eq!(updated.customer_name, "Asha Traders");
        assert_eq!(updated.items.len(), 1);
        assert_eq!(updated.total_paise, 10_500);
        assert_eq!(updated.created_at, invoice.created_at);

        // Old items are gone, not merged
        let fetched = db.invoices().find_for_owner(&invoice.id, "u1").await.unwrap();
        assert_eq!(fetched.items.len(), 1);
        assert_eq!(fetched.items[0].item_name, "C");
    }

    #[tokio::test]
    async fn test_replace_other_users_invoice_is_not_found() {
        let db = test_db().await;
        seed_user(&db, "u1").await;
        seed_user(&db, "u2").await;

        let invoice = db
            .invoices()
            .create("u1", "Asha", &[item("A", 100, 1, 0, GstRate::Zero)])
            .await
            .unwrap();

        let err = db
            .invoices()
            .replace(&invoice.id, "u2", "Hijack", &[item("X", 1, 1, 0, GstRate::Zero)])
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));

        // Untouched
        let fetched = db.invoices().find_for_owner(&invoice.id, "u1").await.unwrap();
        assert_eq!(fetched.customer_name, "Asha");
    }

    #[tokio::test]
    async fn test_delete_cascades_items() {
        let db = test_db().await;
        seed_user(&db, "u1").await;

        let invoice = db
            .invoices()
            .create("u1", "Asha", &[item("A", 100, 1, 0, GstRate::Zero)])
            .await
            .unwrap();

        db.invoices().delete(&invoice.id, "u1").await.unwrap();

        let orphans: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM invoice_items WHERE invoice_id = ?")
                .bind(&invoice.id)
                .fetch_one(db.pool())
                .await
                .unwrap();
        assert_eq!(orphans, 0);
    }

    #[tokio::test]
    async fn test_delete_other_users_invoice_is_not_found() {
        let db = test_db().await;
        seed_user(&db, "u1").await;
        seed_user(&db, "u2").await;

        let invoice = db
            .invoices()
            .create("u1", "Asha", &[item("A", 100, 1, 0, GstRate::Zero)])
            .await
            .unwrap();

        let err = db.invoices().delete(&invoice.id, "u2").await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
        assert_eq!(db.invoices().list_for_owner("u1").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_negative_subtotal_flows_into_total() {
        let db = test_db().await;
        seed_user(&db, "u1").await;

        // 100.00 x1 - 500.00 at 18% => -472.00
        let invoice = db
            .invoices()
            .create(
                "u1",
                "Asha",
                &[
                    item("Refund", 10_000, 1, 50_000, GstRate::Eighteen),
                    item("Sale", 10_000, 1, 0, GstRate::Zero),
                ],
            )
            .await
            .unwrap();

        assert_eq!(invoice.items[0].subtotal_paise, -47_200);
        assert_eq!(invoice.total_paise, -47_200 + 10_000);
    }
}
