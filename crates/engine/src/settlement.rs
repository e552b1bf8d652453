//! Debt netting.
//!
//! Every expense makes each participant (other than the payer) owe the payer
//! the per-person share. Debts between the same two members are netted into a
//! single transfer. Chains are **not** consolidated: if A owes B and B owes C
//! the result keeps both transfers.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::{Expense, MemberId};

/// A directed payment instruction: `from` pays `amount` to `to`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    pub from: MemberId,
    pub to: MemberId,
    pub amount: i64,
}

/// Unordered member pair, stored with `low < high`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct MemberPair {
    low: MemberId,
    high: MemberId,
}

/// Compute the pairwise transfers that settle `expenses`.
///
/// The output follows the order in which each pair of members first appears
/// while walking the expenses. Amounts are exact for expenses of a validated
/// group; larger inputs saturate instead of overflowing.
///
/// # Examples
///
/// ```rust
/// use chrono::NaiveDate;
/// use engine::{Expense, Settlement, compute_settlement};
///
/// let dinner = Expense {
///     id: 0,
///     title: "Dinner".to_string(),
///     amount: 300,
///     payer_id: 0,
///     participants: vec![0, 1, 2],
///     per_person_amount: 100,
///     date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
/// };
///
/// assert_eq!(
///     compute_settlement(&[dinner]),
///     vec![
///         Settlement { from: 1, to: 0, amount: 100 },
///         Settlement { from: 2, to: 0, amount: 100 },
///     ]
/// );
/// ```
pub fn compute_settlement(expenses: &[Expense]) -> Vec<Settlement> {
    // Positive balance means `low` owes `high`.
    let mut order: Vec<MemberPair> = Vec::new();
    let mut balances: HashMap<MemberPair, i64> = HashMap::new();

    for expense in expenses {
        let payer = expense.payer_id;
        for &debtor in &expense.participants {
            if debtor == payer {
                continue;
            }
            let (pair, amount) = if debtor < payer {
                (
                    MemberPair {
                        low: debtor,
                        high: payer,
                    },
                    expense.per_person_amount,
                )
            } else {
                (
                    MemberPair {
                        low: payer,
                        high: debtor,
                    },
                    expense.per_person_amount.saturating_neg(),
                )
            };

            balances
                .entry(pair)
                .and_modify(|balance| *balance = balance.saturating_add(amount))
                .or_insert_with(|| {
                    order.push(pair);
                    amount
                });
        }
    }

    order
        .into_iter()
        .filter_map(|pair| {
            let net = balances.get(&pair).copied().unwrap_or_default();
            match net {
                0 => None,
                net if net > 0 => Some(Settlement {
                    from: pair.low,
                    to: pair.high,
                    amount: net,
                }),
                net => Some(Settlement {
                    from: pair.high,
                    to: pair.low,
                    amount: net.saturating_neg(),
                }),
            }
        })
        .collect()
}

/// Net position of every member computed straight from the per-expense debts.
///
/// Positive values are owed to the member, negative values are owed by the
/// member. Members that never appear in a debt are absent.
pub fn net_positions(expenses: &[Expense]) -> BTreeMap<MemberId, i64> {
    let mut positions = BTreeMap::new();
    for expense in expenses {
        for &debtor in &expense.participants {
            if debtor == expense.payer_id {
                continue;
            }
            let credit = positions.entry(expense.payer_id).or_insert(0i64);
            *credit = credit.saturating_add(expense.per_person_amount);
            let debt = positions.entry(debtor).or_insert(0i64);
            *debt = debt.saturating_sub(expense.per_person_amount);
        }
    }
    positions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::group::tests::{group_with, new_expense};

    fn expenses(list: &[(i64, MemberId, Vec<MemberId>)]) -> Vec<Expense> {
        let names: Vec<String> = (0..6).map(|i| format!("M{i}")).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let mut group = group_with(&refs);
        for (amount, payer, participants) in list {
            group = group
                .add_expense(new_expense(*amount, *payer, participants.clone()))
                .unwrap();
        }
        group.expenses
    }

    fn s(from: MemberId, to: MemberId, amount: i64) -> Settlement {
        Settlement { from, to, amount }
    }

    #[test]
    fn single_expense_split_three_ways() {
        let list = expenses(&[(300, 0, vec![0, 1, 2])]);
        assert_eq!(compute_settlement(&list), vec![s(1, 0, 100), s(2, 0, 100)]);
    }

    #[test]
    fn two_expenses_are_netted_per_pair() {
        let list = expenses(&[(300, 0, vec![0, 1, 2]), (150, 1, vec![1, 2])]);
        assert_eq!(
            compute_settlement(&list),
            vec![s(1, 0, 100), s(2, 0, 100), s(2, 1, 75)]
        );
    }

    #[test]
    fn opposite_debts_cancel() {
        let list = expenses(&[(200, 0, vec![0, 1]), (200, 1, vec![0, 1])]);
        assert!(compute_settlement(&list).is_empty());

        let list = expenses(&[(200, 0, vec![0, 1]), (120, 1, vec![0, 1])]);
        assert_eq!(compute_settlement(&list), vec![s(1, 0, 40)]);

        let list = expenses(&[(120, 0, vec![0, 1]), (200, 1, vec![0, 1])]);
        assert_eq!(compute_settlement(&list), vec![s(0, 1, 40)]);
    }

    #[test]
    fn chains_are_not_consolidated() {
        // 1 owes 0, 2 owes 1: two transfers, not a single 2 -> 0.
        let list = expenses(&[(100, 0, vec![1]), (100, 1, vec![2])]);
        assert_eq!(compute_settlement(&list), vec![s(1, 0, 100), s(2, 1, 100)]);
    }

    #[test]
    fn payer_only_expense_produces_nothing() {
        let list = expenses(&[(500, 3, vec![3])]);
        assert!(compute_settlement(&list).is_empty());
        assert!(net_positions(&list).is_empty());
    }

    #[test]
    fn payer_outside_participants_is_owed_everything() {
        let list = expenses(&[(300, 0, vec![1, 2])]);
        assert_eq!(compute_settlement(&list), vec![s(1, 0, 150), s(2, 0, 150)]);
    }

    fn sample() -> Vec<Expense> {
        expenses(&[
            (300, 0, vec![0, 1, 2]),
            (150, 1, vec![1, 2]),
            (1000, 2, vec![0, 1, 2, 3, 4]),
            (77, 4, vec![0, 3]),
            (999, 3, vec![5, 3, 1]),
            (40, 1, vec![0]),
            (310, 5, vec![0, 1, 2, 3, 4, 5]),
        ])
    }

    #[test]
    fn settlement_is_zero_sum_against_net_positions() {
        let list = sample();
        let settlements = compute_settlement(&list);
        let mut flows: BTreeMap<MemberId, i64> = BTreeMap::new();
        for settlement in &settlements {
            *flows.entry(settlement.to).or_insert(0) += settlement.amount;
            *flows.entry(settlement.from).or_insert(0) -= settlement.amount;
        }
        let positions = net_positions(&list);
        for (member, position) in &positions {
            assert_eq!(flows.get(member).copied().unwrap_or_default(), *position);
        }
        assert_eq!(positions.values().sum::<i64>(), 0);
    }

    #[test]
    fn settlement_is_idempotent_and_has_no_self_payments() {
        let list = sample();
        let first = compute_settlement(&list);
        let second = compute_settlement(&list);
        assert_eq!(first, second);
        assert!(first.iter().all(|s| s.from != s.to && s.amount > 0));
    }

    #[test]
    fn at_most_one_transfer_per_pair() {
        let settlements = compute_settlement(&sample());
        for (i, a) in settlements.iter().enumerate() {
            for b in &settlements[i + 1..] {
                let same = (a.from == b.from && a.to == b.to) || (a.from == b.to && a.to == b.from);
                assert!(!same, "{a:?} and {b:?}");
            }
        }
    }

    #[test]
    fn empty_expenses_settle_to_nothing() {
        assert!(compute_settlement(&[]).is_empty());
    }
}
