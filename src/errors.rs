//! Component G: the top-level error type composing each subsystem's own
//! `thiserror` enum, per spec §7 / SPEC_FULL §4.G.

use thiserror::Error;

use crate::config::RouterOptionsError;
use crate::pattern::PatternError;
use crate::radix::RadixError;
use crate::transaction::TransactionError;

#[derive(Debug, Error)]
pub enum RouterError {
    #[error(transparent)]
    Pattern(#[from] PatternError),
    #[error(transparent)]
    Radix(#[from] RadixError),
    #[error(transparent)]
    Transaction(#[from] TransactionError),
    #[error(transparent)]
    Options(#[from] RouterOptionsError),
}

pub type RouterResult<T> = Result<T, RouterError>;
