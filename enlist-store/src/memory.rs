//! In-memory account store.

use crate::{require_live, validate_new, AccountStore, StoreError, StoreResult};
use crate::credential::make_credential;
use chrono::{DateTime, Utc};
use enlist_types::{Account, AccountId, ActivationRecord, ActivationToken, NewAccount};
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

#[derive(Default)]
struct State {
    accounts: BTreeMap<AccountId, Account>,
    tokens: BTreeMap<AccountId, ActivationToken>,
}

impl State {
    fn record(&self, id: &AccountId) -> Option<ActivationRecord> {
        let account = self.accounts.get(id)?;
        let token = self.tokens.get(id)?;
        Some(ActivationRecord {
            account: account.clone(),
            token: token.clone(),
        })
    }

    fn id_for_token(&self, token: &ActivationToken) -> Option<AccountId> {
        self.tokens
            .iter()
            .find(|(_, t)| *t == token)
            .map(|(id, _)| *id)
    }
}

/// Account store held entirely in process memory.
///
/// A single mutex guards all state, so each operation is atomic.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of accounts currently held.
    pub fn len(&self) -> StoreResult<usize> {
        Ok(self.lock()?.accounts.len())
    }

    /// Returns true if the store holds no accounts.
    pub fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.len()? == 0)
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, State>> {
        self.state
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".into()))
    }
}

impl AccountStore for MemoryStore {
    fn create_inactive(&self, new: NewAccount, token: &ActivationToken) -> StoreResult<Account> {
        validate_new(&new)?;
        require_live(token)?;
        let mut state = self.lock()?;

        let lowered = new.username.to_lowercase();
        if state
            .accounts
            .values()
            .any(|a| a.username.to_lowercase() == lowered)
        {
            return Err(StoreError::Conflict("username already exists".into()));
        }
        if state.id_for_token(token).is_some() {
            return Err(StoreError::Conflict("activation token already exists".into()));
        }

        let account = Account {
            id: AccountId::new(),
            username: new.username,
            email: new.email,
            password: make_credential(&new.password),
            is_active: false,
            date_joined: new.date_joined,
        };
        state.accounts.insert(account.id, account.clone());
        state.tokens.insert(account.id, token.clone());
        Ok(account)
    }

    fn get_account(&self, id: AccountId) -> StoreResult<Option<Account>> {
        Ok(self.lock()?.accounts.get(&id).cloned())
    }

    fn find_record(&self, token: &ActivationToken) -> StoreResult<Option<ActivationRecord>> {
        let state = self.lock()?;
        Ok(state.id_for_token(token).and_then(|id| state.record(&id)))
    }

    fn activate(
        &self,
        token: &ActivationToken,
        cutoff: DateTime<Utc>,
    ) -> StoreResult<Option<Account>> {
        require_live(token)?;
        let mut state = self.lock()?;

        let Some(id) = state.id_for_token(token) else {
            return Ok(None);
        };
        let Some(account) = state.accounts.get_mut(&id) else {
            return Ok(None);
        };
        if account.date_joined <= cutoff {
            return Ok(None);
        }

        account.is_active = true;
        let activated = account.clone();
        state.tokens.insert(id, ActivationToken::activated());
        Ok(Some(activated))
    }

    fn records(&self) -> StoreResult<Vec<ActivationRecord>> {
        let state = self.lock()?;
        let mut records: Vec<_> = state
            .tokens
            .keys()
            .filter_map(|id| state.record(id))
            .collect();
        records.sort_by(|a, b| {
            a.account
                .date_joined
                .cmp(&b.account.date_joined)
                .then(a.account.id.cmp(&b.account.id))
        });
        Ok(records)
    }

    fn delete_expired(&self, id: AccountId, cutoff: DateTime<Utc>) -> StoreResult<bool> {
        let mut state = self.lock()?;
        let Some(record) = state.record(&id) else {
            return Ok(false);
        };
        let expired = record.token.is_activated() || record.account.date_joined <= cutoff;
        if record.account.is_active || !expired {
            return Ok(false);
        }
        state.accounts.remove(&id);
        state.tokens.remove(&id);
        Ok(true)
    }

    fn username_exists(&self, username: &str) -> StoreResult<bool> {
        let lowered = username.to_lowercase();
        Ok(self
            .lock()?
            .accounts
            .values()
            .any(|a| a.username.to_lowercase() == lowered))
    }

    fn email_exists(&self, email: &str) -> StoreResult<bool> {
        let lowered = email.to_lowercase();
        Ok(self
            .lock()?
            .accounts
            .values()
            .any(|a| a.email.to_lowercase() == lowered))
    }

    fn find_active_by_email(&self, email: &str) -> StoreResult<Vec<Account>> {
        let lowered = email.to_lowercase();
        Ok(self
            .lock()?
            .accounts
            .values()
            .filter(|a| a.is_active && a.email.to_lowercase() == lowered)
            .cloned()
            .collect())
    }
}
