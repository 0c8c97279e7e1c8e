//! Property-based tests for transfer planning.
//!
//! Conservation: for every valid transfer,
//! `new_source + new_target == old_source + old_target`, exactly.

use ledgerlock_shared::types::AccountId;
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::plan::TransferPlan;
use super::request::TransferRequest;

/// Strategy to generate a balance, negative ones included.
fn balance() -> impl Strategy<Value = Decimal> {
    // -10,000,000.00 to 10,000,000.00
    (-1_000_000_000i64..1_000_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy to generate a valid positive amount (> 0).
fn positive_amount() -> impl Strategy<Value = Decimal> {
    (1i64..100_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy to generate a pair of distinct account IDs.
fn distinct_accounts() -> impl Strategy<Value = (AccountId, AccountId)> {
    (1i64..1_000, 1i64..1_000)
        .prop_filter("accounts must differ", |(a, b)| a != b)
        .prop_map(|(a, b)| (AccountId(a), AccountId(b)))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Every plan conserves the combined balance.
    #[test]
    fn prop_plan_conserves_total(
        (source, target) in distinct_accounts(),
        amount in positive_amount(),
        source_balance in balance(),
        target_balance in balance(),
    ) {
        let request = TransferRequest::new(source, target, amount).unwrap();
        let plan = TransferPlan::compute(&request, source_balance, target_balance).unwrap();

        prop_assert!(plan.is_conserving());
        prop_assert_eq!(
            plan.after.source + plan.after.target,
            source_balance + target_balance
        );
    }

    /// The source loses exactly the amount and the target gains exactly the amount.
    #[test]
    fn prop_plan_moves_exact_amount(
        (source, target) in distinct_accounts(),
        amount in positive_amount(),
        source_balance in balance(),
        target_balance in balance(),
    ) {
        let request = TransferRequest::new(source, target, amount).unwrap();
        let plan = TransferPlan::compute(&request, source_balance, target_balance).unwrap();

        prop_assert_eq!(source_balance - plan.after.source, amount);
        prop_assert_eq!(plan.after.target - target_balance, amount);
    }

    /// Lock order always lists both accounts, lowest first.
    #[test]
    fn prop_lock_order_sorted(
        (source, target) in distinct_accounts(),
        amount in positive_amount(),
    ) {
        let request = TransferRequest::new(source, target, amount).unwrap();
        let [first, second] = request.lock_order();

        prop_assert!(first < second);
        prop_assert!([source, target].contains(&first));
        prop_assert!([source, target].contains(&second));
    }
}
