//! Invocation dispatch: operation name and positional string arguments in,
//! [`Response`] out.
//!
//! Each call gets its own [`TxContext`](crate::storage::TxContext). The
//! context is committed when the operation succeeds and dropped when it
//! fails, so a failed invocation leaves the store exactly as it found it.

use serde::{Deserialize, Serialize};
use tracing::{debug, info_span, warn};

use crate::error::{ErrorKind, LedgerError, LedgerResult};
use crate::ledger::Ledger;
use crate::storage::{StateBackend, StoreError, WorldState};

/// Status reported for a successful invocation.
pub const STATUS_OK: u16 = 200;
/// Status reported for any failed invocation.
pub const STATUS_ERROR: u16 = 500;

/// The operations a caller can invoke by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    InitWallet,
    CreateWallet,
    Transaction,
    GetWalletInfo,
}

/// `(name, operation, arity)`, in declaration order of [`Operation`].
const OPERATIONS: &[(&str, Operation, usize)] = &[
    ("initWallet", Operation::InitWallet, 1),
    ("createWallet", Operation::CreateWallet, 3),
    ("transaction", Operation::Transaction, 4),
    ("getWalletInfo", Operation::GetWalletInfo, 2),
];

impl Operation {
    pub fn from_name(name: &str) -> Option<Self> {
        OPERATIONS
            .iter()
            .find(|(n, _, _)| *n == name)
            .map(|(_, op, _)| *op)
    }

    pub fn name(self) -> &'static str {
        self.entry().0
    }

    /// Number of positional arguments the operation takes.
    pub fn arity(self) -> usize {
        self.entry().2
    }

    pub fn all() -> impl Iterator<Item = Operation> {
        OPERATIONS.iter().map(|(_, op, _)| *op)
    }

    fn entry(self) -> &'static (&'static str, Operation, usize) {
        &OPERATIONS[self as usize]
    }

    /// Run against `state`; `args` already has the right length.
    fn execute<W: WorldState + ?Sized>(
        self,
        ledger: &Ledger,
        state: &mut W,
        args: &[String],
    ) -> LedgerResult<String> {
        match self {
            Operation::InitWallet => {
                ledger.bootstrap(state, &args[0])?;
                Ok(String::new())
            }
            Operation::CreateWallet => {
                ledger.create_account(state, &args[0], &args[1], &args[2])?;
                Ok(String::new())
            }
            Operation::Transaction => {
                ledger.transfer(state, &args[0], &args[1], &args[2], &args[3])?;
                Ok(String::new())
            }
            Operation::GetWalletInfo => {
                let view = ledger.query_balance(state, &args[0], &args[1])?;
                serde_json::to_string(&view)
                    .map_err(|e| StoreError::Serialization(e.to_string()).into())
            }
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Outcome of one invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    pub status: u16,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub payload: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<ErrorKind>,
}

impl Response {
    pub fn success(payload: String) -> Self {
        Self {
            status: STATUS_OK,
            message: String::new(),
            payload,
            kind: None,
        }
    }

    pub fn failure(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            status: STATUS_ERROR,
            message: message.into(),
            payload: String::new(),
            kind: Some(kind),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == STATUS_OK
    }
}

impl From<LedgerError> for Response {
    fn from(err: LedgerError) -> Self {
        Response::failure(err.kind(), err.to_string())
    }
}

/// Run `function(args)` as one atomic invocation against `backend`.
pub fn invoke<B: StateBackend>(
    backend: &B,
    ledger: &Ledger,
    function: &str,
    args: &[String],
) -> Response {
    let Some(op) = Operation::from_name(function) else {
        warn!(%function, "unknown operation");
        return Response::failure(
            ErrorKind::UnknownOperation,
            format!("unknown operation: {function}"),
        );
    };

    let span = info_span!("invoke", op = op.name());
    let _guard = span.enter();

    if args.len() != op.arity() {
        return LedgerError::Validation(format!(
            "incorrect number of arguments: expected {}, got {}",
            op.arity(),
            args.len()
        ))
        .into();
    }

    let mut ctx = backend.begin();
    let outcome = op.execute(ledger, &mut ctx, args).and_then(|payload| {
        ctx.commit()?;
        Ok(payload)
    });

    match outcome {
        Ok(payload) => {
            debug!("invocation committed");
            Response::success(payload)
        }
        Err(err) => {
            debug!(kind = %err.kind(), error = %err, "invocation failed");
            err.into()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amount::Amount;
    use crate::config::{LedgerConfig, MASTER_WALLET_ID};
    use crate::crypto::digest;
    use crate::storage::MemoryStore;

    fn args(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn setup() -> (MemoryStore, Ledger) {
        let ledger = Ledger::new(LedgerConfig::new(
            digest("master-pw"),
            Amount::from_units(1_000).unwrap(),
        ));
        (MemoryStore::new(), ledger)
    }

    #[test]
    fn table_is_consistent() {
        for (i, op) in Operation::all().enumerate() {
            assert_eq!(op as usize, i);
            assert_eq!(Operation::from_name(op.name()), Some(op));
        }
        assert_eq!(Operation::Transaction.arity(), 4);
        assert_eq!(Operation::from_name("InitWallet"), None);
    }

    #[test]
    fn unknown_operation() {
        let (store, ledger) = setup();
        let resp = invoke(&store, &ledger, "mint", &[]);
        assert_eq!(resp.status, STATUS_ERROR);
        assert_eq!(resp.kind, Some(ErrorKind::UnknownOperation));
        assert_eq!(resp.message, "unknown operation: mint");
    }

    #[test]
    fn wrong_arity() {
        let (store, ledger) = setup();
        let resp = invoke(&store, &ledger, "createWallet", &args(&["alice", "Alice"]));
        assert_eq!(resp.kind, Some(ErrorKind::Validation));
        assert_eq!(
            resp.message,
            "incorrect number of arguments: expected 3, got 2"
        );
        assert!(store.is_empty());
    }

    #[test]
    fn wallet_info_payload_has_no_digest() {
        let (store, ledger) = setup();
        assert!(invoke(&store, &ledger, "initWallet", &args(&["master-pw"])).is_success());
        assert!(invoke(&store, &ledger, "createWallet", &args(&["alice", "Alice", "pw1"])).is_success());
        assert!(invoke(
            &store,
            &ledger,
            "transaction",
            &args(&[MASTER_WALLET_ID, "alice", "12.5", "master-pw"])
        )
        .is_success());

        let resp = invoke(&store, &ledger, "getWalletInfo", &args(&["alice", "pw1"]));
        assert!(resp.is_success());
        assert_eq!(
            resp.payload,
            r#"{"id":"alice","owner":"Alice","balance":"12.50"}"#
        );
        assert!(!resp.payload.contains(digest("pw1").as_str()));
    }

    #[test]
    fn failure_commits_nothing() {
        let (store, ledger) = setup();
        let resp = invoke(&store, &ledger, "initWallet", &args(&["wrong"]));
        assert_eq!(resp.kind, Some(ErrorKind::Auth));
        assert!(resp.payload.is_empty());
        assert!(store.is_empty());
    }

    #[test]
    fn response_json_omits_kind_on_success() {
        let json = serde_json::to_string(&Response::success(String::new())).unwrap();
        assert_eq!(json, r#"{"status":200,"message":"","payload":""}"#);

        let json = serde_json::to_value(Response::failure(ErrorKind::NotFound, "x")).unwrap();
        assert_eq!(json["kind"], "not_found");
    }
}
