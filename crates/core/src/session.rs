//! Top-level assembly of the three domains over one collaborator set.

use log::{info, warn};

use crate::errors::Result;
use crate::finance::FinanceDomain;
use crate::planner::PlannerDomain;
use crate::store::ChangeFeed;
use crate::sync::{RemoteContext, SubscriptionHandle, SyncConfig};
use crate::workout::WorkoutDomain;

/// All domain engines wired over shared collaborators.
pub struct Daybook {
    context: RemoteContext,
    pub finance: FinanceDomain,
    pub workout: WorkoutDomain,
    pub planner: PlannerDomain,
}

impl Daybook {
    pub fn new(context: RemoteContext, config: SyncConfig) -> Self {
        Self {
            finance: FinanceDomain::new(&context, config.clone()),
            workout: WorkoutDomain::new(&context, config.clone()),
            planner: PlannerDomain::new(&context, config),
            context,
        }
    }

    /// Session-start sequence, ahead of normal mutation traffic.
    ///
    /// Signed in: run the one-time mirror migration per kind, then hydrate
    /// every collection from remote truth. Signed out: hydrate from the
    /// durable mirror for offline continuity.
    pub async fn start_session(&self) -> Result<()> {
        if self.context.principal.current_principal_id().is_none() {
            let loaded = self.finance.accounts.migration().bootstrap_offline()?
                + self.finance.transactions.migration().bootstrap_offline()?
                + self.finance.budgets.migration().bootstrap_offline()?
                + self.finance.goals.migration().bootstrap_offline()?
                + self.workout.programs.migration().bootstrap_offline()?
                + self.workout.sessions.migration().bootstrap_offline()?
                + self.planner.tasks.migration().bootstrap_offline()?;
            info!("offline session: {} records restored from the mirror", loaded);
            return Ok(());
        }

        let outcomes = [
            self.finance.accounts.migration().run().await?,
            self.finance.transactions.migration().run().await?,
            self.finance.budgets.migration().run().await?,
            self.finance.goals.migration().run().await?,
            self.workout.programs.migration().run().await?,
            self.workout.sessions.migration().run().await?,
            self.planner.tasks.migration().run().await?,
        ];
        info!("startup migration outcomes: {:?}", outcomes);

        for (name, result) in [
            ("accounts", self.finance.accounts.invalidator().reload_now().await),
            ("transactions", self.finance.transactions.invalidator().reload_now().await),
            ("budgets", self.finance.budgets.invalidator().reload_now().await),
            ("savings_goals", self.finance.goals.invalidator().reload_now().await),
            ("programs", self.workout.programs.invalidator().reload_now().await),
            ("workout_sessions", self.workout.sessions.invalidator().reload_now().await),
            ("tasks", self.planner.tasks.invalidator().reload_now().await),
        ] {
            if let Err(err) = result {
                warn!("initial reload of {} failed: {}", name, err);
            }
        }
        Ok(())
    }

    /// Subscribe every collection's invalidation stream. Handles tear the
    /// subscriptions down on drop.
    pub fn subscribe_all(&self, feed: &dyn ChangeFeed) -> Vec<SubscriptionHandle> {
        let principal = self.context.principal.as_ref();
        [
            self.finance.accounts.subscribe(feed, principal),
            self.finance.transactions.subscribe(feed, principal),
            self.finance.budgets.subscribe(feed, principal),
            self.finance.goals.subscribe(feed, principal),
            self.workout.programs.subscribe(feed, principal),
            self.workout.sessions.subscribe(feed, principal),
            self.planner.tasks.subscribe(feed, principal),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}
