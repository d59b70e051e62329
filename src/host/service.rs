// Ledger service - single-writer actor around the executor
//
// One tokio task owns the executor. Every other task talks to it through a
// cloneable `LedgerHandle`, so calls are applied strictly one at a time in the
// order they reach the queue.

use crate::call::SignedCall;
use crate::host::{Executor, ExecutorError, LedgerState, Receipt};
use crate::identity::Address;
use crate::token::{Amount, MinterId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{error, info};

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error(transparent)]
    Executor(#[from] ExecutorError),

    #[error("Call rolled back because persisting failed: {0}")]
    Persistence(String),

    #[error("Ledger service has stopped")]
    Closed,
}

/// Receives the state after every committed call
#[async_trait]
pub trait CommitSink: Send + Sync {
    async fn commit(&self, state: &LedgerState, receipt: &Receipt) -> Result<(), String>;
}

/// Sink that keeps nothing (in-memory ledgers)
pub struct NullSink;

#[async_trait]
impl CommitSink for NullSink {
    async fn commit(&self, _state: &LedgerState, _receipt: &Receipt) -> Result<(), String> {
        Ok(())
    }
}

enum Command {
    Submit {
        call: Box<SignedCall>,
        reply: oneshot::Sender<Result<Receipt, ServiceError>>,
    },
    BalanceOf {
        account: Address,
        minter: Option<MinterId>,
        reply: oneshot::Sender<Amount>,
    },
    TotalSupply {
        reply: oneshot::Sender<Amount>,
    },
    Allowance {
        owner: Address,
        spender: Address,
        reply: oneshot::Sender<Amount>,
    },
    Audit {
        reply: oneshot::Sender<Result<(), ExecutorError>>,
    },
    Snapshot {
        reply: oneshot::Sender<LedgerState>,
    },
    Shutdown {
        reply: oneshot::Sender<LedgerState>,
    },
}

pub struct LedgerService;

impl LedgerService {
    /// Move the executor into its own task and return a handle to it
    pub fn spawn(executor: Executor, sink: Arc<dyn CommitSink>, capacity: usize) -> (LedgerHandle, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let task = tokio::spawn(run(executor, sink, rx));
        (LedgerHandle { tx }, task)
    }
}

async fn run(mut executor: Executor, sink: Arc<dyn CommitSink>, mut rx: mpsc::Receiver<Command>) {
    info!("ledger service started");

    while let Some(command) = rx.recv().await {
        match command {
            Command::Submit { call, reply } => {
                // Memory and the sink must agree, so a failed commit undoes the call
                let before = executor.state().clone();
                let result = match executor.submit(&call) {
                    Ok(receipt) => match sink.commit(executor.state(), &receipt).await {
                        Ok(()) => Ok(receipt),
                        Err(e) => {
                            executor.restore_state(before);
                            error!(call_id = %receipt.call_id(), error = %e, "failed to persist call, rolled back");
                            Err(ServiceError::Persistence(e))
                        }
                    },
                    Err(e) => Err(e.into()),
                };
                let _ = reply.send(result);
            }
            Command::BalanceOf { account, minter, reply } => {
                let ledger = executor.ledger();
                let amount = match minter {
                    Some(minter) => ledger.balance_of_minter(&account, &minter),
                    None => ledger.balance_of(&account),
                };
                let _ = reply.send(amount);
            }
            Command::TotalSupply { reply } => {
                let _ = reply.send(executor.ledger().total_supply());
            }
            Command::Allowance { owner, spender, reply } => {
                let _ = reply.send(executor.ledger().allowance(&owner, &spender));
            }
            Command::Audit { reply } => {
                let _ = reply.send(executor.ledger().check_invariants().map_err(ExecutorError::from));
            }
            Command::Snapshot { reply } => {
                let _ = reply.send(executor.state().clone());
            }
            Command::Shutdown { reply } => {
                let _ = reply.send(executor.into_state());
                info!("ledger service stopped");
                return;
            }
        }
    }

    info!("ledger service stopped: all handles dropped");
}

/// Cloneable client of a running ledger service
#[derive(Clone)]
pub struct LedgerHandle {
    tx: mpsc::Sender<Command>,
}

impl LedgerHandle {
    async fn request<T>(&self, make: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T, ServiceError> {
        let (reply, rx) = oneshot::channel();
        self.tx.send(make(reply)).await.map_err(|_| ServiceError::Closed)?;
        rx.await.map_err(|_| ServiceError::Closed)
    }

    /// Queue a signed call and wait for its receipt
    pub async fn submit(&self, call: SignedCall) -> Result<Receipt, ServiceError> {
        self.request(|reply| Command::Submit {
            call: Box::new(call),
            reply,
        })
        .await?
    }

    pub async fn balance_of(&self, account: Address) -> Result<Amount, ServiceError> {
        self.request(|reply| Command::BalanceOf {
            account,
            minter: None,
            reply,
        })
        .await
    }

    pub async fn balance_of_minter(&self, account: Address, minter: MinterId) -> Result<Amount, ServiceError> {
        self.request(|reply| Command::BalanceOf {
            account,
            minter: Some(minter),
            reply,
        })
        .await
    }

    pub async fn total_supply(&self) -> Result<Amount, ServiceError> {
        self.request(|reply| Command::TotalSupply { reply }).await
    }

    pub async fn allowance(&self, owner: Address, spender: Address) -> Result<Amount, ServiceError> {
        self.request(|reply| Command::Allowance { owner, spender, reply }).await
    }

    /// Run the conservation audit inside the service
    pub async fn audit(&self) -> Result<(), ServiceError> {
        self.request(|reply| Command::Audit { reply }).await?.map_err(ServiceError::from)
    }

    /// Copy of the full host state
    pub async fn snapshot(&self) -> Result<LedgerState, ServiceError> {
        self.request(|reply| Command::Snapshot { reply }).await
    }

    /// Stop the service and take back its state
    pub async fn shutdown(self) -> Result<LedgerState, ServiceError> {
        self.request(|reply| Command::Shutdown { reply }).await
    }
}
