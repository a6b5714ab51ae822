use super::*;

fn three_silos(amounts: [(GrainType, u64); 3]) -> Depot {
    let mut depot = base_depot();
    for (grain, amount) in amounts {
        assert!(depot.store(harvest(grain, amount)).unwrap());
    }
    depot
}

#[test]
fn fair_withdraw_spreads_equal_shares() {
    let mut depot = three_silos([
        (GrainType::Wheat, 900),
        (GrainType::Corn, 600),
        (GrainType::Barley, 300),
    ]);
    assert_eq!(depot.withdraw(300), 300);
    assert_eq!(fills(&depot), vec![800, 500, 200]);
}

#[test]
fn fair_withdraw_redistributes_shortfall() {
    let mut depot = three_silos([
        (GrainType::Wheat, 900),
        (GrainType::Corn, 100),
        (GrainType::Barley, 500),
    ]);
    assert_eq!(depot.withdraw(600), 600);
    assert_eq!(fills(&depot), vec![650, 0, 250]);
    assert_eq!(grains(&depot)[1], None);
}

#[test]
fn fair_withdraw_remainder_starts_at_first_silo() {
    let mut depot = three_silos([
        (GrainType::Wheat, 10),
        (GrainType::Corn, 10),
        (GrainType::Barley, 10),
    ]);
    assert_eq!(depot.withdraw(4), 4);
    assert_eq!(fills(&depot), vec![8, 9, 9]);
}

#[test]
fn fair_withdraw_skips_emptied_silos_in_later_passes() {
    let mut depot = three_silos([
        (GrainType::Wheat, 2),
        (GrainType::Corn, 50),
        (GrainType::Barley, 50),
    ]);
    // share 10 each: wheat gives 2, shortfall 8 + remainder 0 over two silos.
    assert_eq!(depot.withdraw(30), 30);
    assert_eq!(fills(&depot), vec![0, 36, 36]);
}

#[test]
fn withdraw_more_than_stock_empties_depot() {
    let mut depot = mixed_depot();
    assert_eq!(depot.withdraw(5_000), 1_800);
    assert_eq!(depot.total_fill_level(), 0);
    assert!(grains(&depot).iter().all(Option::is_none));
}

#[test]
fn withdraw_exact_stock_empties_depot() {
    let mut depot = mixed_depot();
    assert_eq!(depot.withdraw(1_800), 1_800);
    assert_eq!(depot.total_fill_level(), 0);
}

#[test]
fn withdraw_zero_takes_nothing() {
    let mut depot = mixed_depot();
    assert_eq!(depot.withdraw(0), 0);
    assert_eq!(depot.total_fill_level(), 1_800);
}

#[test]
fn withdraw_from_empty_depot_returns_zero() {
    let mut depot = base_depot();
    assert_eq!(depot.withdraw(10), 0);
    let mut none = Depot::default();
    assert_eq!(none.withdraw(10), 0);
}

#[test]
fn bulk_passes_match_unit_by_unit_collection() {
    // Reference: one unit per stocked silo per pass, in silo order.
    fn unit_by_unit(mut fills: Vec<u64>, mut remainder: u64) -> Vec<u64> {
        while remainder > 0 && fills.iter().any(|&f| f > 0) {
            for fill in &mut fills {
                if remainder > 0 && *fill > 0 {
                    *fill -= 1;
                    remainder -= 1;
                }
            }
        }
        fills
    }

    let start = [(GrainType::Wheat, 7), (GrainType::Corn, 40), (GrainType::Rye, 23)];
    for amount in [1, 5, 17, 31, 50, 69] {
        let mut depot = three_silos(start);
        depot.withdraw(amount);

        let share = amount / 3;
        let mut remainder = amount % 3;
        let after_share: Vec<u64> = start
            .iter()
            .map(|&(_, fill)| {
                if fill < share {
                    remainder += share - fill;
                    0
                } else {
                    fill - share
                }
            })
            .collect();
        assert_eq!(fills(&depot), unit_by_unit(after_share, remainder), "amount {amount}");
    }
}
