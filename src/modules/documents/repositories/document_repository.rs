// MySQL persistence for documents and their line items.
//
// A document row carries the calculated amounts snapshot taken at save
// time; line items live in their own table and are replaced wholesale on
// update, inside the same transaction as the document row.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{MySql, MySqlPool, QueryBuilder, Transaction};
use std::str::FromStr;

use crate::core::{AppError, Result, RoundingPolicy};
use crate::modules::documents::models::{
    Document, DocumentHeader, DocumentQuery, DocumentStatus, DocumentType, LineItem,
};
use crate::modules::taxes::models::{CalculatedAmounts, DocumentTaxSettings, TaxClass, TaxMode};

/// Storage operations the document service relies on
#[async_trait]
pub trait DocumentRepository: Send + Sync {
    /// Insert a document and its line items
    async fn create(&self, document: &Document) -> Result<()>;

    /// Find a document of the given type, including line items
    async fn find_by_id(&self, document_type: DocumentType, id: &str)
        -> Result<Option<Document>>;

    /// List documents matching the query, newest first, without line items
    async fn list(&self, query: &DocumentQuery) -> Result<Vec<Document>>;

    /// Overwrite a document row and replace its line items
    async fn update(&self, document: &Document) -> Result<()>;

    async fn update_status(
        &self,
        document_type: DocumentType,
        id: &str,
        status: DocumentStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<()>;

    async fn delete(&self, document_type: DocumentType, id: &str) -> Result<()>;

    /// Whether a document number is taken within a type
    async fn exists_by_number(&self, document_type: DocumentType, number: &str) -> Result<bool>;
}

const DOCUMENT_COLUMNS: &str = r#"
    id, document_type, document_number, title, client_name, department,
    issue_date, due_date, status, tax_mode, tax_rate, rounding_policy,
    subtotal, tax_amount, tax_amount_8, tax_amount_10, total_amount, tax_breakdown,
    notes, source_document_id, created_at, updated_at
"#;

/// Repository backed by a MySQL pool
pub struct MySqlDocumentRepository {
    pool: MySqlPool,
}

impl MySqlDocumentRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    async fn insert_line_items(
        tx: &mut Transaction<'_, MySql>,
        document: &Document,
    ) -> Result<()> {
        for item in &document.line_items {
            let id = item
                .id
                .clone()
                .ok_or_else(|| AppError::internal("Line item has no id"))?;

            sqlx::query(
                r#"
                INSERT INTO document_line_items (
                    id, document_id, position, name, quantity, unit_price,
                    tax_class, tax_rate, remarks, amount
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(id)
            .bind(&document.id)
            .bind(item.position)
            .bind(&item.name)
            .bind(item.quantity)
            .bind(item.unit_price)
            .bind(item.tax_class.as_str())
            .bind(item.tax_rate)
            .bind(&item.remarks)
            .bind(item.amount)
            .execute(&mut **tx)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to create line item: {}", e)))?;
        }

        Ok(())
    }

    async fn fetch_line_items(&self, document_id: &str) -> Result<Vec<LineItem>> {
        let rows = sqlx::query_as::<_, LineItemRow>(
            r#"
            SELECT id, document_id, position, name, quantity, unit_price,
                   tax_class, tax_rate, remarks, amount
            FROM document_line_items
            WHERE document_id = ?
            ORDER BY position
            "#,
        )
        .bind(document_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(LineItemRow::into_line_item).collect()
    }
}

fn map_write_error(e: sqlx::Error, document: &Document) -> AppError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() {
            return AppError::conflict(format!(
                "Document number '{}' already exists",
                document.header.document_number
            ));
        }
    }
    AppError::Database(e)
}

#[async_trait]
impl DocumentRepository for MySqlDocumentRepository {
    async fn create(&self, document: &Document) -> Result<()> {
        let breakdown = serde_json::to_string(&document.amounts.tax_breakdown)?;
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO documents (
                id, document_type, document_number, title, client_name, department,
                issue_date, due_date, status, tax_mode, tax_rate, rounding_policy,
                subtotal, tax_amount, tax_amount_8, tax_amount_10, total_amount, tax_breakdown,
                notes, source_document_id, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&document.id)
        .bind(document.document_type.as_str())
        .bind(&document.header.document_number)
        .bind(&document.header.title)
        .bind(&document.header.client_name)
        .bind(&document.header.department)
        .bind(document.header.issue_date)
        .bind(document.header.due_date)
        .bind(document.status.as_str())
        .bind(document.tax_settings.tax_mode.as_str())
        .bind(document.tax_settings.tax_rate)
        .bind(document.tax_settings.rounding_policy.as_str())
        .bind(document.amounts.subtotal)
        .bind(document.amounts.tax_amount)
        .bind(document.amounts.tax_amount_8)
        .bind(document.amounts.tax_amount_10)
        .bind(document.amounts.total_amount)
        .bind(breakdown)
        .bind(&document.header.notes)
        .bind(&document.source_document_id)
        .bind(document.created_at)
        .bind(document.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_write_error(e, document))?;

        Self::insert_line_items(&mut tx, document).await?;
        tx.commit().await?;

        tracing::debug!(
            document_id = %document.id,
            document_type = %document.document_type,
            line_items = document.line_items.len(),
            "Document stored"
        );

        Ok(())
    }

    async fn find_by_id(
        &self,
        document_type: DocumentType,
        id: &str,
    ) -> Result<Option<Document>> {
        let sql = format!(
            "SELECT {} FROM documents WHERE id = ? AND document_type = ?",
            DOCUMENT_COLUMNS
        );
        let row = sqlx::query_as::<_, DocumentRow>(&sql)
            .bind(id)
            .bind(document_type.as_str())
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let line_items = self.fetch_line_items(id).await?;
        Ok(Some(row.into_document(line_items)?))
    }

    async fn list(&self, query: &DocumentQuery) -> Result<Vec<Document>> {
        let mut builder: QueryBuilder<MySql> = QueryBuilder::new(format!(
            "SELECT {} FROM documents WHERE document_type = ",
            DOCUMENT_COLUMNS
        ));
        builder.push_bind(query.document_type.as_str());

        if let Some(status) = query.status {
            builder.push(" AND status = ").push_bind(status.as_str());
        }
        if let Some(department) = &query.department {
            builder.push(" AND department = ").push_bind(department.clone());
        }
        if let Some(client) = &query.client {
            builder
                .push(" AND LOWER(client_name) LIKE ")
                .push_bind(format!("%{}%", escape_like(&client.to_lowercase())))
                .push(" ESCAPE '!'");
        }

        builder
            .push(" ORDER BY created_at DESC LIMIT ")
            .push_bind(query.limit)
            .push(" OFFSET ")
            .push_bind(query.offset);

        let rows = builder
            .build_query_as::<DocumentRow>()
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter()
            .map(|row| row.into_document(Vec::new()))
            .collect()
    }

    async fn update(&self, document: &Document) -> Result<()> {
        let breakdown = serde_json::to_string(&document.amounts.tax_breakdown)?;
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE documents SET
                document_number = ?, title = ?, client_name = ?, department = ?,
                issue_date = ?, due_date = ?, status = ?, tax_mode = ?, tax_rate = ?,
                rounding_policy = ?, subtotal = ?, tax_amount = ?, tax_amount_8 = ?,
                tax_amount_10 = ?, total_amount = ?, tax_breakdown = ?, notes = ?,
                updated_at = ?
            WHERE id = ? AND document_type = ?
            "#,
        )
        .bind(&document.header.document_number)
        .bind(&document.header.title)
        .bind(&document.header.client_name)
        .bind(&document.header.department)
        .bind(document.header.issue_date)
        .bind(document.header.due_date)
        .bind(document.status.as_str())
        .bind(document.tax_settings.tax_mode.as_str())
        .bind(document.tax_settings.tax_rate)
        .bind(document.tax_settings.rounding_policy.as_str())
        .bind(document.amounts.subtotal)
        .bind(document.amounts.tax_amount)
        .bind(document.amounts.tax_amount_8)
        .bind(document.amounts.tax_amount_10)
        .bind(document.amounts.total_amount)
        .bind(breakdown)
        .bind(&document.header.notes)
        .bind(document.updated_at)
        .bind(&document.id)
        .bind(document.document_type.as_str())
        .execute(&mut *tx)
        .await
        .map_err(|e| map_write_error(e, document))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!(
                "Document with id '{}' not found",
                document.id
            )));
        }

        sqlx::query("DELETE FROM document_line_items WHERE document_id = ?")
            .bind(&document.id)
            .execute(&mut *tx)
            .await?;
        Self::insert_line_items(&mut tx, document).await?;

        tx.commit().await?;
        Ok(())
    }

    async fn update_status(
        &self,
        document_type: DocumentType,
        id: &str,
        status: DocumentStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE documents
            SET status = ?, updated_at = ?
            WHERE id = ? AND document_type = ?
            "#,
        )
        .bind(status.as_str())
        .bind(updated_at)
        .bind(id)
        .bind(document_type.as_str())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!(
                "Document with id '{}' not found",
                id
            )));
        }

        Ok(())
    }

    async fn delete(&self, document_type: DocumentType, id: &str) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM document_line_items WHERE document_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM documents WHERE id = ? AND document_type = ?")
            .bind(id)
            .bind(document_type.as_str())
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!(
                "Document with id '{}' not found",
                id
            )));
        }

        tx.commit().await?;
        Ok(())
    }

    async fn exists_by_number(&self, document_type: DocumentType, number: &str) -> Result<bool> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM documents
            WHERE document_type = ? AND document_number = ?
            "#,
        )
        .bind(document_type.as_str())
        .bind(number)
        .fetch_one(&self.pool)
        .await?;

        Ok(count > 0)
    }
}

/// Escape LIKE wildcards so the client filter matches a literal substring.
/// `!` is the escape character declared in the query.
fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '!' | '%' | '_') {
            escaped.push('!');
        }
        escaped.push(c);
    }
    escaped
}

// Helper structs for database mapping

#[derive(Debug, sqlx::FromRow)]
struct DocumentRow {
    id: String,
    document_type: String,
    document_number: String,
    title: String,
    client_name: String,
    department: Option<String>,
    issue_date: NaiveDate,
    due_date: Option<NaiveDate>,
    status: String,
    tax_mode: String,
    tax_rate: Decimal,
    rounding_policy: String,
    subtotal: Decimal,
    tax_amount: Decimal,
    tax_amount_8: Option<Decimal>,
    tax_amount_10: Option<Decimal>,
    total_amount: Decimal,
    tax_breakdown: String,
    notes: Option<String>,
    source_document_id: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn parse_column<T: FromStr<Err = String>>(value: &str) -> Result<T> {
    T::from_str(value).map_err(|e| AppError::Internal(format!("Invalid value in database: {}", e)))
}

impl DocumentRow {
    fn into_document(self, line_items: Vec<LineItem>) -> Result<Document> {
        let tax_settings = DocumentTaxSettings {
            tax_mode: parse_column::<TaxMode>(&self.tax_mode)?,
            tax_rate: self.tax_rate,
            rounding_policy: parse_column::<RoundingPolicy>(&self.rounding_policy)?,
        };

        Ok(Document {
            id: self.id,
            document_type: parse_column(&self.document_type)?,
            header: DocumentHeader {
                document_number: self.document_number,
                title: self.title,
                client_name: self.client_name,
                department: self.department,
                issue_date: self.issue_date,
                due_date: self.due_date,
                notes: self.notes,
            },
            status: parse_column(&self.status)?,
            tax_settings,
            amounts: CalculatedAmounts {
                subtotal: self.subtotal,
                tax_amount: self.tax_amount,
                tax_amount_8: self.tax_amount_8,
                tax_amount_10: self.tax_amount_10,
                total_amount: self.total_amount,
                tax_breakdown: serde_json::from_str(&self.tax_breakdown)?,
            },
            source_document_id: self.source_document_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
            line_items,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct LineItemRow {
    id: String,
    document_id: String,
    position: u32,
    name: String,
    quantity: Decimal,
    unit_price: Decimal,
    tax_class: String,
    tax_rate: Option<Decimal>,
    remarks: Option<String>,
    amount: Decimal,
}

impl LineItemRow {
    fn into_line_item(self) -> Result<LineItem> {
        Ok(LineItem {
            id: Some(self.id),
            document_id: Some(self.document_id),
            position: self.position,
            name: self.name,
            quantity: self.quantity,
            unit_price: self.unit_price,
            tax_class: parse_column::<TaxClass>(&self.tax_class)?,
            tax_rate: self.tax_rate,
            remarks: self.remarks,
            amount: self.amount,
        })
    }
}
