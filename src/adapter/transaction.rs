use super::{RelationalAdapter, SybaseAdapter};
use crate::client::TdsConnector;
use crate::error::SybaseDbError;

/// Transaction scope borrowed from a [`SybaseAdapter`].
///
/// Dropping a `Transaction` without calling [`commit`](Transaction::commit) or
/// [`rollback`](Transaction::rollback) leaves the connection mid-transaction.
/// Always finish the transaction explicitly.
pub struct Transaction<'a, K: TdsConnector> {
    adapter: &'a mut SybaseAdapter<K>,
    open: bool,
}

impl<K: TdsConnector> SybaseAdapter<K> {
    /// Issue `BEGIN TRAN` and return a scope that must be committed or rolled back.
    ///
    /// # Errors
    /// Returns an error if the BEGIN statement fails.
    pub async fn transaction(&mut self) -> Result<Transaction<'_, K>, SybaseDbError> {
        self.begin_db_transaction().await?;
        Ok(Transaction {
            adapter: self,
            open: true,
        })
    }
}

impl<K: TdsConnector> Transaction<'_, K> {
    /// The adapter, for statements that belong to this transaction.
    pub fn adapter(&mut self) -> &mut SybaseAdapter<K> {
        self.adapter
    }

    /// Commit the transaction.
    ///
    /// # Errors
    /// Returns `SybaseDbError` if commit fails.
    pub async fn commit(mut self) -> Result<(), SybaseDbError> {
        if self.open {
            self.adapter.commit_db_transaction().await?;
            self.open = false;
        }
        Ok(())
    }

    /// Roll back the transaction.
    ///
    /// # Errors
    /// Returns `SybaseDbError` if rollback fails.
    pub async fn rollback(mut self) -> Result<(), SybaseDbError> {
        if self.open {
            self.adapter.rollback_db_transaction().await?;
            self.open = false;
        }
        Ok(())
    }
}
