//! `PostgreSQL` customer repository.
//!
//! Queries are built at runtime with `query_as` so the crate compiles without
//! a live database.

use async_trait::async_trait;
use sqlx::PgPool;

use farmaup_core::{Customer, CustomerFilter, CustomerId, Email, NewCustomer, Phone};

use super::{CustomerStore, RepositoryError};

/// Raw `customers` row.
#[derive(Debug, sqlx::FromRow)]
struct CustomerRow {
    id: i32,
    name: String,
    email: String,
    phone: String,
    city: String,
}

impl TryFrom<CustomerRow> for Customer {
    type Error = RepositoryError;

    fn try_from(row: CustomerRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;
        let phone = Phone::parse(&row.phone).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid phone in database: {e}"))
        })?;

        Ok(Self {
            id: CustomerId::new(row.id),
            name: row.name,
            email,
            phone,
            city: row.city,
        })
    }
}

/// Map a failed write, turning a unique violation into `Conflict`.
fn map_write_error(e: sqlx::Error) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict("email already exists".to_owned());
    }
    RepositoryError::Database(e)
}

/// Customer store backed by a `PostgreSQL` pool.
#[derive(Debug, Clone)]
pub struct PgCustomerStore {
    pool: PgPool,
}

impl PgCustomerStore {
    /// Create a new store over an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Delete every customer, returning how many rows were removed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete_all(&self) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM customers")
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

#[async_trait]
impl CustomerStore for PgCustomerStore {
    async fn find_many(&self, filter: &CustomerFilter) -> Result<Vec<Customer>, RepositoryError> {
        let rows = sqlx::query_as::<_, CustomerRow>(
            r"
            SELECT id, name, email, phone, city
            FROM customers
            WHERE ($1::text IS NULL OR strpos(lower(name), lower($1)) > 0)
              AND ($2::text IS NULL OR strpos(lower(city), lower($2)) > 0)
            ORDER BY id ASC
            ",
        )
        .bind(filter.name.as_deref())
        .bind(filter.city.as_deref())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Customer::try_from).collect()
    }

    async fn find_by_id(&self, id: CustomerId) -> Result<Option<Customer>, RepositoryError> {
        let row = sqlx::query_as::<_, CustomerRow>(
            r"
            SELECT id, name, email, phone, city
            FROM customers
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Customer::try_from).transpose()
    }

    async fn find_by_email(
        &self,
        email: &Email,
        exclude: Option<CustomerId>,
    ) -> Result<Option<Customer>, RepositoryError> {
        let row = sqlx::query_as::<_, CustomerRow>(
            r"
            SELECT id, name, email, phone, city
            FROM customers
            WHERE lower(email) = lower($1)
              AND ($2::int4 IS NULL OR id <> $2)
            ORDER BY id ASC
            LIMIT 1
            ",
        )
        .bind(email.as_str())
        .bind(exclude)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Customer::try_from).transpose()
    }

    async fn insert(&self, customer: &NewCustomer) -> Result<Customer, RepositoryError> {
        let row = sqlx::query_as::<_, CustomerRow>(
            r"
            INSERT INTO customers (name, email, phone, city)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, email, phone, city
            ",
        )
        .bind(&customer.name)
        .bind(customer.email.as_str())
        .bind(customer.phone.as_str())
        .bind(&customer.city)
        .fetch_one(&self.pool)
        .await
        .map_err(map_write_error)?;

        Customer::try_from(row)
    }

    async fn replace(
        &self,
        id: CustomerId,
        customer: &NewCustomer,
    ) -> Result<Option<Customer>, RepositoryError> {
        let row = sqlx::query_as::<_, CustomerRow>(
            r"
            UPDATE customers
            SET name = $2, email = $3, phone = $4, city = $5
            WHERE id = $1
            RETURNING id, name, email, phone, city
            ",
        )
        .bind(id)
        .bind(&customer.name)
        .bind(customer.email.as_str())
        .bind(customer.phone.as_str())
        .bind(&customer.city)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_write_error)?;

        row.map(Customer::try_from).transpose()
    }

    async fn remove(&self, id: CustomerId) -> Result<Option<Customer>, RepositoryError> {
        let row = sqlx::query_as::<_, CustomerRow>(
            r"
            DELETE FROM customers
            WHERE id = $1
            RETURNING id, name, email, phone, city
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Customer::try_from).transpose()
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "postgres"
    }
}
