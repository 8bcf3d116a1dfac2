use thiserror::Error;

use crate::bot::error::Error;
use crate::store::SettingsStore;

/// Starting balance for a freshly registered account.
pub const REGISTER_CREDITS: i64 = 0;

#[derive(Debug, Error)]
pub enum BankError {
    #[error("no account")]
    NoAccount,
    #[error("insufficient balance: have {balance}, need {amount}")]
    Insufficient { balance: i64, amount: i64 },
    #[error(transparent)]
    Store(#[from] Error),
}

/// Open an account for the user. Returns false if one already exists.
pub async fn register(store: &SettingsStore, guild_id: u64, user_id: u64) -> Result<bool, Error> {
    store
        .update(|d| {
            let bank = &mut d.guilds.entry(guild_id).or_default().bank;
            if bank.contains_key(&user_id) {
                false
            } else {
                bank.insert(user_id, REGISTER_CREDITS);
                true
            }
        })
        .await
}

pub async fn balance(store: &SettingsStore, guild_id: u64, user_id: u64) -> Option<i64> {
    store
        .read(|d| d.guilds.get(&guild_id).and_then(|g| g.bank.get(&user_id).copied()))
        .await
}

pub async fn has_account(store: &SettingsStore, guild_id: u64, user_id: u64) -> bool {
    balance(store, guild_id, user_id).await.is_some()
}

pub async fn can_spend(store: &SettingsStore, guild_id: u64, user_id: u64, amount: i64) -> bool {
    balance(store, guild_id, user_id)
        .await
        .is_some_and(|balance| balance >= amount)
}

/// Take `amount` out of the account. Returns the new balance.
pub async fn withdraw(
    store: &SettingsStore,
    guild_id: u64,
    user_id: u64,
    amount: i64,
) -> Result<i64, BankError> {
    store
        .update(|d| {
            let Some(balance) = d
                .guilds
                .get_mut(&guild_id)
                .and_then(|g| g.bank.get_mut(&user_id))
            else {
                return Err(BankError::NoAccount);
            };
            if *balance < amount {
                return Err(BankError::Insufficient {
                    balance: *balance,
                    amount,
                });
            }
            *balance -= amount;
            Ok(*balance)
        })
        .await?
}

/// Add `amount` to the account. Returns the new balance.
pub async fn deposit(
    store: &SettingsStore,
    guild_id: u64,
    user_id: u64,
    amount: i64,
) -> Result<i64, BankError> {
    store
        .update(|d| {
            let Some(balance) = d
                .guilds
                .get_mut(&guild_id)
                .and_then(|g| g.bank.get_mut(&user_id))
            else {
                return Err(BankError::NoAccount);
            };
            *balance += amount;
            Ok(*balance)
        })
        .await?
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_store() -> (tempfile::TempDir, SettingsStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::open(dir.path()).unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn test_register_once() {
        let (_dir, store) = open_store();

        assert!(!has_account(&store, 1, 7).await);
        assert!(register(&store, 1, 7).await.unwrap());
        assert!(!register(&store, 1, 7).await.unwrap());
        assert_eq!(balance(&store, 1, 7).await, Some(REGISTER_CREDITS));
    }

    #[tokio::test]
    async fn test_withdraw_guards() {
        let (_dir, store) = open_store();

        assert!(matches!(
            withdraw(&store, 1, 7, 5).await,
            Err(BankError::NoAccount)
        ));

        register(&store, 1, 7).await.unwrap();
        assert_eq!(deposit(&store, 1, 7, 100).await.unwrap(), 100);

        assert!(matches!(
            withdraw(&store, 1, 7, 150).await,
            Err(BankError::Insufficient { balance: 100, amount: 150 })
        ));
        assert_eq!(withdraw(&store, 1, 7, 30).await.unwrap(), 70);
        assert!(can_spend(&store, 1, 7, 70).await);
        assert!(!can_spend(&store, 1, 7, 71).await);
    }
}
