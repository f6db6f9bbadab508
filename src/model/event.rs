use crate::model::{
    transaction::{TradeGroup, Transaction, TransactionRoute},
    waiver::WaiverClaim,
};

/// Structured event handed to the notification sink.
///
/// Rendering the event into a chat message is up to the sink.
#[derive(Debug, Clone, PartialEq)]
pub enum NotificationEvent {
    /// A non-trade transaction seen for the first time.
    NewTransaction {
        transaction: Transaction,
        route: TransactionRoute,
    },
    /// Every leg of a trade seen for the first time.
    NewTrade(TradeGroup),
    /// A waiver period ran out; addressed to the user and message that started it.
    WaiverExpired(WaiverClaim),
}

impl NotificationEvent {
    pub fn new_transaction(transaction: Transaction) -> Self {
        let route = transaction.route();
        Self::NewTransaction { transaction, route }
    }

    /// Short label used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NewTransaction { .. } => "transaction",
            Self::NewTrade(_) => "trade",
            Self::WaiverExpired(_) => "waiver expiry",
        }
    }
}
