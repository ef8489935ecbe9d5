use std::{
    future::Future,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};

use solana_account::Account;
use solana_pubkey::Pubkey;
use solana_sdk::signature::{Keypair, Signature, Signer};
use tokio::{task::JoinSet, time::MissedTickBehavior};
use tracing::{debug, error, info, warn};

use autodeploy_api::{decide, pda::miner_pda, Action, DelegationRecord, MiningRecord, SquareSelection};

use crate::{
    error::{CrankError, Result},
    ledger::Ledger,
    round::{RoundProvider, RoundStatus},
    submit::{submit, SubmitPolicy},
    tx,
};

// ── Reports ─────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// Every discovered account was attempted.
    Completed,
    /// The round is not active; nothing was discovered or submitted.
    Inactive(RoundStatus),
    /// Round fetch or discovery failed; no account was touched.
    Aborted(String),
    /// A previous tick was still running, so this one did nothing.
    Overlapped,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TickReport {
    pub outcome: TickOutcome,
    pub round_id: Option<u64>,
    pub discovered: usize,
    pub deployed: usize,
    pub checkpointed: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl TickReport {
    fn new(outcome: TickOutcome) -> Self {
        Self {
            outcome,
            round_id: None,
            discovered: 0,
            deployed: 0,
            checkpointed: 0,
            skipped: 0,
            failed: 0,
        }
    }

    fn record(&mut self, action: &Action) {
        match action {
            Action::Skip => self.skipped += 1,
            Action::CheckpointOnly { .. } => self.checkpointed += 1,
            Action::DeployOnly { .. } => self.deployed += 1,
            Action::CheckpointThenDeploy { .. } => {
                self.checkpointed += 1;
                self.deployed += 1;
            }
        }
    }
}

/// What happened to one delegation account.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccountOutcome {
    pub action: Action,
    pub signature: Option<Signature>,
}

// ── Crank ───────────────────────────────────────────────────────────────────

/// The executor loop. Holds the signing key for the process lifetime; every
/// other input is re-read from the ledger each tick.
pub struct Crank<R, L> {
    rounds: R,
    ledger: L,
    executor: Keypair,
    program_id: Pubkey,
    selection: Box<dyn SquareSelection>,
    policy: SubmitPolicy,
    ticking: AtomicBool,
}

/// Clears the in-progress flag when a tick ends, however it ends.
struct TickGuard<'a>(&'a AtomicBool);

impl Drop for TickGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl<R: RoundProvider, L: Ledger> Crank<R, L> {
    pub fn new(
        rounds: R,
        ledger: L,
        executor: Keypair,
        program_id: Pubkey,
        selection: Box<dyn SquareSelection>,
        policy: SubmitPolicy,
    ) -> Self {
        Self {
            rounds,
            ledger,
            executor,
            program_id,
            selection,
            policy,
            ticking: AtomicBool::new(false),
        }
    }

    pub fn executor(&self) -> Pubkey {
        self.executor.pubkey()
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    /// Run one tick. Never fails: tick-level errors abort the tick, and
    /// account-level errors are logged and counted.
    pub async fn tick(&self) -> TickReport {
        if self.ticking.swap(true, Ordering::AcqRel) {
            warn!("previous tick still running, skipping");
            return TickReport::new(TickOutcome::Overlapped);
        }
        let _guard = TickGuard(&self.ticking);

        let round = match self.rounds.fetch_round().await {
            Ok(round) => round,
            Err(err) => {
                warn!(kind = err.name(), error = %err, "round fetch failed, skipping tick");
                return TickReport::new(TickOutcome::Aborted(err.to_string()));
            }
        };
        if !round.status.is_active() {
            debug!(round_id = round.round_id, status = ?round.status, "round not active");
            let mut report = TickReport::new(TickOutcome::Inactive(round.status));
            report.round_id = Some(round.round_id);
            return report;
        }

        let executor = self.executor.pubkey();
        let accounts = match self.ledger.find_delegations(&self.program_id, &executor).await {
            Ok(accounts) => accounts,
            Err(err) => {
                warn!(kind = err.name(), error = %err, "delegation discovery failed, skipping tick");
                let mut report = TickReport::new(TickOutcome::Aborted(err.to_string()));
                report.round_id = Some(round.round_id);
                return report;
            }
        };

        let mut report = TickReport::new(TickOutcome::Completed);
        report.round_id = Some(round.round_id);
        report.discovered = accounts.len();

        for (address, account) in &accounts {
            match self.process(address, &account.data, round.round_id).await {
                Ok(outcome) => {
                    report.record(&outcome.action);
                    match outcome.signature {
                        Some(signature) => info!(
                            delegation = %address,
                            round_id = round.round_id,
                            %signature,
                            "{}",
                            outcome.action.label()
                        ),
                        None => info!(delegation = %address, "skipped"),
                    }
                }
                Err(err) => {
                    report.failed += 1;
                    error!(
                        delegation = %address,
                        kind = err.name(),
                        error = %err,
                        "delegation failed"
                    );
                }
            }
        }

        info!(
            round_id = round.round_id,
            discovered = report.discovered,
            deployed = report.deployed,
            checkpointed = report.checkpointed,
            skipped = report.skipped,
            failed = report.failed,
            "tick complete"
        );
        report
    }

    /// Decode, decide, build, sign and submit for one delegation.
    pub async fn process(
        &self,
        address: &Pubkey,
        data: &[u8],
        round_id: u64,
    ) -> Result<AccountOutcome> {
        let delegation = DelegationRecord::decode(data)?;

        let executor = self.executor.pubkey();
        if delegation.executor != executor {
            warn!(
                delegation = %address,
                executor = %delegation.executor,
                "delegation names another executor"
            );
            return Ok(AccountOutcome {
                action: Action::Skip,
                signature: None,
            });
        }

        let miner_address = miner_pda(&self.program_id, &delegation.authority).0;
        let mining = match self.ledger.get_account(&miner_address).await? {
            Some(account) => Some(self.miner_for(&delegation, &miner_address, &account)?),
            None => None,
        };

        let action = decide(&delegation, mining.as_ref(), round_id);
        debug!(
            delegation = %address,
            authority = %delegation.authority,
            balance = delegation.balance,
            checkpoint_id = mining.map(|m| m.checkpoint_id),
            miner_round_id = mining.map(|m| m.round_id),
            ?action,
            "decided"
        );
        if action == Action::Skip {
            return Ok(AccountOutcome {
                action,
                signature: None,
            });
        }

        let instructions = tx::plan(
            &action,
            &self.program_id,
            &executor,
            &delegation,
            self.selection.as_ref(),
        );
        let (blockhash, last_valid_block_height) = self.ledger.latest_blockhash().await?;
        let prepared = tx::sign(&instructions, &self.executor, blockhash, last_valid_block_height);
        let signature = submit(&self.ledger, &prepared, &self.policy).await?;

        Ok(AccountOutcome {
            action,
            signature: Some(signature),
        })
    }

    /// Decode the miner account at `address`, which must be owned by the
    /// mining program and name the delegation's authority.
    fn miner_for(
        &self,
        delegation: &DelegationRecord,
        address: &Pubkey,
        account: &Account,
    ) -> Result<MiningRecord> {
        if account.owner != self.program_id {
            return Err(CrankError::ForeignMiner {
                address: *address,
                reason: format!("owned by {}", account.owner),
            });
        }
        let mining = MiningRecord::decode(&account.data)?;
        if mining.authority != delegation.authority {
            return Err(CrankError::ForeignMiner {
                address: *address,
                reason: format!(
                    "authority {} != {}",
                    mining.authority, delegation.authority
                ),
            });
        }
        Ok(mining)
    }
}

impl<R, L> Crank<R, L>
where
    R: RoundProvider + 'static,
    L: Ledger + 'static,
{
    /// Tick immediately, then every `interval` (start to start) until
    /// Ctrl-C.
    pub async fn run(self: Arc<Self>, interval: Duration) {
        self.run_until(interval, async {
            if let Err(err) = tokio::signal::ctrl_c().await {
                error!(error = %err, "cannot listen for Ctrl-C");
                std::future::pending::<()>().await;
            }
        })
        .await
    }

    /// Tick until `shutdown` resolves. Each tick runs on its own task; a tick
    /// that would overlap a running one is skipped by the in-progress flag.
    /// Returns only after every spawned tick has finished.
    pub async fn run_until(self: Arc<Self>, interval: Duration, shutdown: impl Future<Output = ()>) {
        let mut timer = tokio::time::interval(interval);
        timer.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tokio::pin!(shutdown);
        let mut ticks = JoinSet::new();

        info!(executor = %self.executor(), program = %self.program_id, ?interval, "crank started");
        loop {
            tokio::select! {
                _ = timer.tick() => {
                    let crank = Arc::clone(&self);
                    ticks.spawn(async move { crank.tick().await });
                }
                _ = &mut shutdown => {
                    info!("shutdown requested");
                    break;
                }
            }
            while ticks.try_join_next().is_some() {}
        }

        while let Some(joined) = ticks.join_next().await {
            if let Err(err) = joined {
                error!(error = %err, "tick task panicked");
            }
        }
        info!("crank stopped");
    }
}
