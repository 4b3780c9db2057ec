//! Unified SQL OrderStore implementation.
//!
//! Uses a macro to generate implementations for each SQL backend,
//! eliminating code duplication while maintaining type safety.

use std::marker::PhantomData;

use super::SqlDatabase;

/// SQL-based implementation of OrderStore.
///
/// This generic implementation works with any SQL database that implements
/// the `SqlDatabase` trait (PostgreSQL, SQLite). The pool hands out one
/// connection per statement and returns it on drop, including on error paths.
pub struct SqlOrderStore<DB: SqlDatabase> {
    pool: DB::Pool,
    _marker: PhantomData<DB>,
}

impl<DB: SqlDatabase> SqlOrderStore<DB> {
    /// Create a new SQL order store with the given pool.
    pub fn new(pool: DB::Pool) -> Self {
        Self {
            pool,
            _marker: PhantomData,
        }
    }

    /// Get the underlying pool.
    pub fn pool(&self) -> &DB::Pool {
        &self.pool
    }
}

/// Macro to implement OrderStore for a specific SQL backend.
macro_rules! impl_order_store {
    ($db_type:ty, $feature:literal) => {
        #[cfg(feature = $feature)]
        impl SqlOrderStore<$db_type> {
            /// Create the orders table and indexes if missing.
            pub async fn init(&self) -> crate::interfaces::order_store::Result<()> {
                sqlx::raw_sql(crate::storage::schema::CREATE_ORDERS_TABLE)
                    .execute(&self.pool)
                    .await?;
                Ok(())
            }

            /// Run a rendered select. Statements are rendered before any await,
            /// since sea-query statements are not `Send`.
            async fn fetch_orders(
                &self,
                sql: String,
            ) -> crate::interfaces::order_store::Result<Vec<crate::orders::StoredOrder>> {
                let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
                rows.iter()
                    .map(|row| crate::storage::helpers::decode_order_row!(row))
                    .collect()
            }

            fn select_orders() -> sea_query::SelectStatement {
                use crate::storage::schema::{Orders, ORDER_COLUMNS};

                sea_query::Query::select()
                    .columns(ORDER_COLUMNS)
                    .from(Orders::Table)
                    .to_owned()
            }
        }

        #[cfg(feature = $feature)]
        #[async_trait::async_trait]
        impl crate::interfaces::OrderStore for SqlOrderStore<$db_type> {
            async fn upsert(
                &self,
                order: &crate::orders::Order,
            ) -> crate::interfaces::order_store::Result<crate::orders::StoredOrder> {
                use sea_query::{OnConflict, Query};

                use crate::interfaces::OrderStore;
                use crate::storage::schema::{Orders, MUTABLE_COLUMNS, UPSERT_COLUMNS};

                let stmt = Query::insert()
                    .into_table(Orders::Table)
                    .columns(UPSERT_COLUMNS)
                    .values_panic(crate::storage::helpers::upsert_values(order)?)
                    .on_conflict(
                        OnConflict::column(Orders::ExternalOrderId)
                            .update_columns(MUTABLE_COLUMNS)
                            .to_owned(),
                    )
                    .to_owned();

                let sql = <$db_type>::build_insert(stmt);
                sqlx::query(&sql).execute(&self.pool).await?;

                self.get_by_external_id(&order.external_order_id)
                    .await?
                    .ok_or_else(|| {
                        crate::interfaces::StorageError::NotFound(order.external_order_id.clone())
                    })
            }

            async fn get_by_external_id(
                &self,
                external_order_id: &str,
            ) -> crate::interfaces::order_store::Result<Option<crate::orders::StoredOrder>> {
                use sea_query::Expr;

                use crate::storage::schema::Orders;

                let sql = <$db_type>::build_select(
                    Self::select_orders()
                        .and_where(Expr::col(Orders::ExternalOrderId).eq(external_order_id))
                        .to_owned(),
                );

                Ok(self.fetch_orders(sql).await?.into_iter().next())
            }

            async fn mark_dispatched(
                &self,
                external_order_id: &str,
                partner_delivery_id: &str,
            ) -> crate::interfaces::order_store::Result<()> {
                use sea_query::{Expr, Query};

                use crate::interfaces::OrderStore;
                use crate::storage::helpers::format_timestamp;
                use crate::storage::schema::Orders;

                let dispatched_at = format_timestamp(&chrono::Utc::now());

                // Only the first transition writes; repeats leave the record untouched.
                let stmt = Query::update()
                    .table(Orders::Table)
                    .values([
                        (Orders::DispatchSent, 1i32.into()),
                        (Orders::PartnerDeliveryId, partner_delivery_id.into()),
                        (Orders::DispatchedAt, dispatched_at.into()),
                    ])
                    .and_where(Expr::col(Orders::ExternalOrderId).eq(external_order_id))
                    .and_where(Expr::col(Orders::DispatchSent).eq(0i32))
                    .to_owned();

                let sql = <$db_type>::build_update(stmt);
                let result = sqlx::query(&sql).execute(&self.pool).await?;

                if result.rows_affected() == 0
                    && self.get_by_external_id(external_order_id).await?.is_none()
                {
                    return Err(crate::interfaces::StorageError::NotFound(
                        external_order_id.to_string(),
                    ));
                }

                Ok(())
            }

            async fn list_by_status(
                &self,
                status: &str,
            ) -> crate::interfaces::order_store::Result<Vec<crate::orders::StoredOrder>> {
                use sea_query::{Expr, Order as SortOrder};

                use crate::storage::schema::Orders;

                let sql = <$db_type>::build_select(
                    Self::select_orders()
                        .and_where(Expr::col(Orders::Status).eq(status))
                        .order_by(Orders::CreatedAt, SortOrder::Desc)
                        .to_owned(),
                );

                self.fetch_orders(sql).await
            }

            async fn list_recent(
                &self,
                window_minutes: u32,
            ) -> crate::interfaces::order_store::Result<Vec<crate::orders::StoredOrder>> {
                use sea_query::{Expr, Order as SortOrder};

                use crate::storage::helpers::format_timestamp;
                use crate::storage::schema::Orders;

                let cutoff = chrono::Utc::now() - chrono::Duration::minutes(i64::from(window_minutes));

                let sql = <$db_type>::build_select(
                    Self::select_orders()
                        .and_where(Expr::col(Orders::CreatedAt).gte(format_timestamp(&cutoff)))
                        .order_by(Orders::CreatedAt, SortOrder::Desc)
                        .to_owned(),
                );

                self.fetch_orders(sql).await
            }

            async fn list_all(
                &self,
                limit: u32,
            ) -> crate::interfaces::order_store::Result<Vec<crate::orders::StoredOrder>> {
                use sea_query::Order as SortOrder;

                use crate::storage::schema::Orders;

                let sql = <$db_type>::build_select(
                    Self::select_orders()
                        .order_by(Orders::CreatedAt, SortOrder::Desc)
                        .limit(u64::from(limit))
                        .to_owned(),
                );

                self.fetch_orders(sql).await
            }

            async fn count(&self) -> crate::interfaces::order_store::Result<u64> {
                use sea_query::{Expr, Query};
                use sqlx::Row;

                use crate::storage::schema::Orders;

                let stmt = Query::select()
                    .expr(Expr::col(Orders::ExternalOrderId).count())
                    .from(Orders::Table)
                    .to_owned();

                let sql = <$db_type>::build_select(stmt);
                let row = sqlx::query(&sql).fetch_one(&self.pool).await?;
                let total: i64 = row.try_get(0)?;
                Ok(total.max(0) as u64)
            }
        }
    };
}

// Generate implementations for each SQL backend
impl_order_store!(super::postgres::Postgres, "postgres");
impl_order_store!(super::sqlite::Sqlite, "sqlite");
