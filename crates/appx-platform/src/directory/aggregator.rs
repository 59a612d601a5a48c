//! Directory Aggregator
//!
//! Merges the realm's interactive users with the service-account users of every
//! client that has service accounts enabled.
//!
//! Listing order: interactive users as the provider returns them, then one record per
//! service-account client in client listing order. Any failure aborts the call.

use std::collections::HashSet;

use futures::future::try_join_all;
use tracing::{info, instrument, warn};

use super::admin_client::KeycloakAdminClient;
use super::entity::{ClientDescriptor, UserRecord};
use super::DirectoryError;

pub struct DirectoryAggregator {
    admin: KeycloakAdminClient,
}

impl DirectoryAggregator {
    pub fn new(admin: KeycloakAdminClient) -> Self {
        Self { admin }
    }

    #[instrument(skip(self), fields(realm = %self.admin.realm()))]
    pub async fn list_all_users(&self) -> Result<Vec<UserRecord>, DirectoryError> {
        let session = self.admin.open_session().await?;

        let interactive: Vec<UserRecord> = session
            .list_users()
            .await?
            .into_iter()
            .map(UserRecord::from)
            .collect();

        let service_clients: Vec<ClientDescriptor> = session
            .list_clients()
            .await?
            .into_iter()
            .map(ClientDescriptor::from)
            .filter(|c| c.service_accounts_enabled)
            .collect();

        // try_join_all keeps input order and fails fast
        let service_accounts: Vec<UserRecord> = try_join_all(
            service_clients
                .iter()
                .map(|client| session.service_account_user(&client.id)),
        )
        .await?
        .into_iter()
        .map(UserRecord::from)
        .collect();

        info!(
            interactive = interactive.len(),
            service_accounts = service_accounts.len(),
            "Directory listing aggregated"
        );

        Ok(merge_unique(interactive, service_accounts))
    }
}

/// Concatenate, keeping the first record seen for each id.
fn merge_unique(
    interactive: Vec<UserRecord>,
    service_accounts: Vec<UserRecord>,
) -> Vec<UserRecord> {
    let mut seen = HashSet::new();
    let mut merged = Vec::with_capacity(interactive.len() + service_accounts.len());

    for record in interactive.into_iter().chain(service_accounts) {
        if seen.insert(record.id.clone()) {
            merged.push(record);
        } else {
            warn!(id = %record.id, username = %record.username, "Duplicate user id dropped");
        }
    }

    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, username: &str) -> UserRecord {
        UserRecord {
            id: id.to_string(),
            username: username.to_string(),
            email: None,
        }
    }

    #[test]
    fn test_merge_keeps_order() {
        let merged = merge_unique(
            vec![record("b", "normaluser"), record("a", "adminuser")],
            vec![record("s", "service-account-appx-backend")],
        );
        let names: Vec<_> = merged.iter().map(|r| r.username.as_str()).collect();
        assert_eq!(names, vec!["normaluser", "adminuser", "service-account-appx-backend"]);
    }

    #[test]
    fn test_merge_drops_repeated_ids() {
        let merged = merge_unique(
            vec![record("a", "adminuser")],
            vec![record("a", "adminuser"), record("s", "service-account-x")],
        );
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].id, "a");
        assert_eq!(merged[1].id, "s");
    }
}
