//! Store-backed custody ledger.
//!
//! Balances live in the `balances` tree under `owner(20B) || denom`. A
//! missing key is a zero balance, and a balance that drops to zero is
//! deleted rather than stored.

use tracing::trace;

use super::{CustodyLedger, LedgerError, LedgerResult};
use crate::storage::{Space, TxContext};
use crate::types::{AccAddress, Coin};

fn balance_key(address: &AccAddress, denom: &str) -> Vec<u8> {
    let mut key = Vec::with_capacity(address.as_bytes().len() + denom.len());
    key.extend_from_slice(address.as_bytes());
    key.extend_from_slice(denom.as_bytes());
    key
}

/// [`CustodyLedger`] over the transaction context's `balances` tree.
#[derive(Debug, Default, Clone, Copy)]
pub struct BankLedger;

impl BankLedger {
    pub fn new() -> Self {
        Self
    }

    fn write_balance(
        &self,
        ctx: &mut TxContext<'_>,
        address: &AccAddress,
        denom: &str,
        amount: u128,
    ) -> LedgerResult<()> {
        let key = balance_key(address, denom);
        if amount == 0 {
            ctx.delete(Space::Balances, key);
        } else {
            ctx.set_encoded(Space::Balances, key, &amount)?;
        }
        Ok(())
    }

    fn credit(&self, ctx: &mut TxContext<'_>, to: &AccAddress, coin: &Coin) -> LedgerResult<()> {
        let current = self.balance(ctx, to, &coin.denom)?;
        let updated = current
            .checked_add(coin.amount)
            .ok_or_else(|| LedgerError::Overflow {
                address: *to,
                denom: coin.denom.clone(),
                amount: coin.amount,
            })?;
        self.write_balance(ctx, to, &coin.denom, updated)
    }

    fn debit(&self, ctx: &mut TxContext<'_>, from: &AccAddress, coin: &Coin) -> LedgerResult<()> {
        let current = self.balance(ctx, from, &coin.denom)?;
        if current < coin.amount {
            return Err(LedgerError::InsufficientFunds {
                address: *from,
                denom: coin.denom.clone(),
                available: current,
                requested: coin.amount,
            });
        }
        self.write_balance(ctx, from, &coin.denom, current - coin.amount)
    }
}

impl CustodyLedger for BankLedger {
    fn balance(&self, ctx: &TxContext<'_>, address: &AccAddress, denom: &str) -> LedgerResult<u128> {
        Ok(ctx
            .get_decoded::<u128>(Space::Balances, &balance_key(address, denom))?
            .unwrap_or(0))
    }

    fn send(
        &self,
        ctx: &mut TxContext<'_>,
        from: &AccAddress,
        to: &AccAddress,
        coin: &Coin,
    ) -> LedgerResult<()> {
        coin.validate()?;
        self.debit(ctx, from, coin)?;
        self.credit(ctx, to, coin)?;
        trace!(%from, %to, %coin, "coins sent");
        Ok(())
    }

    fn mint(&self, ctx: &mut TxContext<'_>, to: &AccAddress, coin: &Coin) -> LedgerResult<()> {
        coin.validate()?;
        self.credit(ctx, to, coin)?;
        trace!(%to, %coin, "coins minted");
        Ok(())
    }

    fn burn(&self, ctx: &mut TxContext<'_>, from: &AccAddress, coin: &Coin) -> LedgerResult<()> {
        coin.validate()?;
        self.debit(ctx, from, coin)?;
        trace!(%from, %coin, "coins burned");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::EarnDB;

    fn alice() -> AccAddress {
        AccAddress::module("alice")
    }

    fn bob() -> AccAddress {
        AccAddress::module("bob")
    }

    #[test]
    fn unknown_balance_is_zero() {
        let db = EarnDB::open_temporary().unwrap();
        let ctx = db.begin(1);
        assert_eq!(BankLedger.balance(&ctx, &alice(), "usdc").unwrap(), 0);
    }

    #[test]
    fn mint_then_send_moves_funds() {
        let db = EarnDB::open_temporary().unwrap();
        let mut ctx = db.begin(1);
        let bank = BankLedger::new();

        bank.mint(&mut ctx, &alice(), &Coin::new("usdc", 1000)).unwrap();
        bank.send(&mut ctx, &alice(), &bob(), &Coin::new("usdc", 400)).unwrap();

        assert_eq!(bank.balance(&ctx, &alice(), "usdc").unwrap(), 600);
        assert_eq!(bank.balance(&ctx, &bob(), "usdc").unwrap(), 400);
        assert_eq!(bank.balance(&ctx, &bob(), "usdt").unwrap(), 0);
    }

    #[test]
    fn send_rejects_insufficient_funds() {
        let db = EarnDB::open_temporary().unwrap();
        let mut ctx = db.begin(1);
        let bank = BankLedger::new();

        bank.mint(&mut ctx, &alice(), &Coin::new("usdc", 100)).unwrap();
        let err = bank
            .send(&mut ctx, &alice(), &bob(), &Coin::new("usdc", 101))
            .unwrap_err();

        assert!(matches!(
            err,
            LedgerError::InsufficientFunds {
                available: 100,
                requested: 101,
                ..
            }
        ));
        assert_eq!(bank.balance(&ctx, &alice(), "usdc").unwrap(), 100);
    }

    #[test]
    fn mint_rejects_overflow() {
        let db = EarnDB::open_temporary().unwrap();
        let mut ctx = db.begin(1);
        let bank = BankLedger::new();

        bank.mint(&mut ctx, &alice(), &Coin::new("usdc", u128::MAX)).unwrap();
        assert!(matches!(
            bank.mint(&mut ctx, &alice(), &Coin::new("usdc", 1)),
            Err(LedgerError::Overflow { .. })
        ));
    }

    #[test]
    fn burn_to_zero_removes_entry() {
        let db = EarnDB::open_temporary().unwrap();
        let mut ctx = db.begin(1);
        let bank = BankLedger::new();

        bank.mint(&mut ctx, &alice(), &Coin::new("usdc", 50)).unwrap();
        bank.burn(&mut ctx, &alice(), &Coin::new("usdc", 50)).unwrap();
        ctx.commit().unwrap();

        let ctx = db.begin(2);
        assert!(ctx.scan_prefix(Space::Balances, &[]).unwrap().is_empty());
    }

    #[test]
    fn invalid_denom_is_rejected() {
        let db = EarnDB::open_temporary().unwrap();
        let mut ctx = db.begin(1);
        assert!(matches!(
            BankLedger.mint(&mut ctx, &alice(), &Coin::new("x", 1)),
            Err(LedgerError::InvalidCoin(_))
        ));
    }
}
