//! Repository for the `orders` table.

use fgvistos_core::status::PaymentStatus;
use fgvistos_core::types::DbId;
use sqlx::PgPool;

use crate::models::applicant::Applicant;
use crate::models::order::{CreateOrder, Order};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, plan_id, applicant_count, payment_status, \
                        payment_details, created_at, updated_at";

/// Applicant columns returned when an order is created.
const APPLICANT_COLUMNS: &str = "id, user_id, order_id, is_responsible, name, form_answers, \
                                  form_status, process_status, passport_attachment_id, \
                                  created_at, updated_at";

/// Provides CRUD operations for orders.
pub struct OrderRepo;

impl OrderRepo {
    /// Create an order and one applicant per name in a single transaction.
    ///
    /// Every applicant is owned by the ordering user; the first one is
    /// flagged as the responsible applicant.
    pub async fn create_with_applicants(
        pool: &PgPool,
        input: &CreateOrder,
    ) -> Result<(Order, Vec<Applicant>), sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO orders (user_id, plan_id, applicant_count)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        let order = sqlx::query_as::<_, Order>(&query)
            .bind(input.user_id)
            .bind(input.plan_id)
            .bind(input.applicant_names.len() as i32)
            .fetch_one(&mut *tx)
            .await?;

        let insert_applicant = format!(
            "INSERT INTO applicants (user_id, order_id, is_responsible, name)
             VALUES ($1, $2, $3, $4)
             RETURNING {APPLICANT_COLUMNS}"
        );
        let mut applicants = Vec::with_capacity(input.applicant_names.len());
        for (i, name) in input.applicant_names.iter().enumerate() {
            let applicant = sqlx::query_as::<_, Applicant>(&insert_applicant)
                .bind(order.user_id)
                .bind(order.id)
                .bind(i == 0)
                .bind(name)
                .fetch_one(&mut *tx)
                .await?;
            applicants.push(applicant);
        }

        tx.commit().await?;
        Ok((order, applicants))
    }

    /// Find an order by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Order>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM orders WHERE id = $1");
        sqlx::query_as::<_, Order>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List every order, newest first.
    pub async fn list(pool: &PgPool) -> Result<Vec<Order>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM orders ORDER BY created_at DESC, id DESC");
        sqlx::query_as::<_, Order>(&query).fetch_all(pool).await
    }

    /// List the orders placed by one user, newest first.
    pub async fn list_by_user(pool: &PgPool, user_id: DbId) -> Result<Vec<Order>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM orders WHERE user_id = $1 ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, Order>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Mark an order as paid and record the gateway payload.
    ///
    /// Already-paid orders keep their original details, so replayed
    /// confirmations are harmless. Returns `None` if the order does not exist.
    pub async fn mark_paid(
        pool: &PgPool,
        id: DbId,
        details: &serde_json::Value,
    ) -> Result<Option<Order>, sqlx::Error> {
        let query = format!(
            "UPDATE orders SET
                payment_details = CASE WHEN payment_status = $2
                                       THEN payment_details ELSE $3 END,
                payment_status = $2
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Order>(&query)
            .bind(id)
            .bind(PaymentStatus::Paid.as_str())
            .bind(details)
            .fetch_optional(pool)
            .await
    }
}
