//! Address repository: CRUD, default flag, and the shipping address
//! resolver used by checkout and order creation.

use serde::Deserialize;
use sqlx::PgPool;

use okome_core::{AddressId, UserId};

use super::RepositoryError;
use crate::models::Address;

const ADDRESS_COLUMNS: &str = "id, user_id, recipient_name, postal_code, address_1, address_2, \
                               phone, is_default, created_at, updated_at";

/// Input for creating or updating an address.
#[derive(Debug, Clone, Deserialize)]
pub struct AddressInput {
    pub recipient_name: String,
    pub postal_code: String,
    pub address_1: String,
    #[serde(default)]
    pub address_2: Option<String>,
    pub phone: String,
}

impl AddressInput {
    /// Basic field validation mirroring the API contract: every field but
    /// `address_2` is required and non-blank.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        ![
            &self.recipient_name,
            &self.postal_code,
            &self.address_1,
            &self.phone,
        ]
        .iter()
        .any(|f| f.trim().is_empty())
    }
}

/// Repository for address database operations.
pub struct AddressRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AddressRepository<'a> {
    /// Create a new address repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List a user's addresses, default first, newest next.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, user_id: UserId) -> Result<Vec<Address>, RepositoryError> {
        let rows = sqlx::query_as::<_, Address>(&format!(
            "SELECT {ADDRESS_COLUMNS} FROM user_addresses
             WHERE user_id = $1
             ORDER BY is_default DESC, created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }

    /// Fetch an address only if it is owned by the given user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_owned(
        &self,
        user_id: UserId,
        address_id: AddressId,
    ) -> Result<Option<Address>, RepositoryError> {
        let row = sqlx::query_as::<_, Address>(&format!(
            "SELECT {ADDRESS_COLUMNS} FROM user_addresses WHERE id = $1 AND user_id = $2"
        ))
        .bind(address_id)
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row)
    }

    /// Create a new address for a user. The default flag is only set via
    /// [`Self::set_default`].
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(
        &self,
        user_id: UserId,
        input: &AddressInput,
    ) -> Result<Address, RepositoryError> {
        let row = sqlx::query_as::<_, Address>(&format!(
            "INSERT INTO user_addresses
                 (user_id, recipient_name, postal_code, address_1, address_2, phone)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {ADDRESS_COLUMNS}"
        ))
        .bind(user_id)
        .bind(&input.recipient_name)
        .bind(&input.postal_code)
        .bind(&input.address_1)
        .bind(&input.address_2)
        .bind(&input.phone)
        .fetch_one(self.pool)
        .await?;

        Ok(row)
    }

    /// Update an address owned by the user. Returns `None` if the address
    /// does not exist or belongs to someone else.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn update(
        &self,
        user_id: UserId,
        address_id: AddressId,
        input: &AddressInput,
    ) -> Result<Option<Address>, RepositoryError> {
        let row = sqlx::query_as::<_, Address>(&format!(
            "UPDATE user_addresses
             SET recipient_name = $3, postal_code = $4, address_1 = $5, address_2 = $6,
                 phone = $7, updated_at = NOW()
             WHERE id = $1 AND user_id = $2
             RETURNING {ADDRESS_COLUMNS}"
        ))
        .bind(address_id)
        .bind(user_id)
        .bind(&input.recipient_name)
        .bind(&input.postal_code)
        .bind(&input.address_1)
        .bind(&input.address_2)
        .bind(&input.phone)
        .fetch_optional(self.pool)
        .await?;

        Ok(row)
    }

    /// Delete an address owned by the user.
    ///
    /// # Returns
    ///
    /// `true` if a row was deleted, `false` if it didn't exist or was not
    /// owned by the user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn delete(
        &self,
        user_id: UserId,
        address_id: AddressId,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM user_addresses WHERE id = $1 AND user_id = $2")
            .bind(address_id)
            .bind(user_id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Make `address_id` the user's single default address.
    ///
    /// Clears the flag on every sibling and sets it on the target inside one
    /// transaction, so no interleaving can observe two defaults (or none).
    /// Returns `None` (and commits nothing) if the target is not owned by
    /// the user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any statement fails; the
    /// transaction rolls back.
    pub async fn set_default(
        &self,
        user_id: UserId,
        address_id: AddressId,
    ) -> Result<Option<Address>, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "UPDATE user_addresses SET is_default = FALSE, updated_at = NOW()
             WHERE user_id = $1 AND id <> $2 AND is_default",
        )
        .bind(user_id)
        .bind(address_id)
        .execute(&mut *tx)
        .await?;

        let row = sqlx::query_as::<_, Address>(&format!(
            "UPDATE user_addresses SET is_default = TRUE, updated_at = NOW()
             WHERE id = $1 AND user_id = $2
             RETURNING {ADDRESS_COLUMNS}"
        ))
        .bind(address_id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;

        if row.is_none() {
            // Target not owned; drop the transaction without committing.
            return Ok(None);
        }

        tx.commit().await?;

        Ok(row)
    }

    /// Pick the effective shipping address for an order.
    ///
    /// Priority: the requested address if owned by the user, then the
    /// default, then the oldest, then none.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn resolve(
        &self,
        user_id: UserId,
        requested: Option<AddressId>,
    ) -> Result<Option<AddressId>, RepositoryError> {
        if let Some(id) = requested
            && self.find_owned(user_id, id).await?.is_some()
        {
            return Ok(Some(id));
        }

        let id = sqlx::query_scalar::<_, AddressId>(
            "SELECT id FROM user_addresses
             WHERE user_id = $1
             ORDER BY is_default DESC, created_at ASC
             LIMIT 1",
        )
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(recipient: &str) -> AddressInput {
        AddressInput {
            recipient_name: recipient.to_owned(),
            postal_code: "150-0001".to_owned(),
            address_1: "Tokyo, Shibuya 1-2-3".to_owned(),
            address_2: None,
            phone: "03-1234-5678".to_owned(),
        }
    }

    #[test]
    fn test_input_valid() {
        assert!(input("Yamada Taro").is_valid());
    }

    #[test]
    fn test_input_requires_non_blank_fields() {
        assert!(!input("").is_valid());
        assert!(!input("   ").is_valid());

        let mut missing_phone = input("Yamada Taro");
        missing_phone.phone = String::new();
        assert!(!missing_phone.is_valid());
    }

    #[test]
    fn test_input_address_2_optional() {
        let mut with_building = input("Yamada Taro");
        with_building.address_2 = Some("Building 4F".to_owned());
        assert!(with_building.is_valid());
    }
}
