use super::*;

fn fill_levels(statuses: &OrderedList<SiloStatus>) -> Vec<u64> {
    statuses.iter().map(|status| status.fill_level).collect()
}

#[test]
fn unfiltered_unordered_keeps_silo_order() {
    let depot = mixed_depot();
    let mut rng = make_rng();
    let statuses = inspect(&depot, SiloFilter::All, SiloOrder::Unordered, &mut rng);
    assert_eq!(fill_levels(&statuses), vec![600, 900, 300, 0]);
}

#[test]
fn grain_filter_excludes_empty_silos() {
    let depot = mixed_depot();
    let mut rng = make_rng();
    let statuses = inspect(
        &depot,
        SiloFilter::Grain(GrainType::Corn),
        SiloOrder::Unordered,
        &mut rng,
    );
    assert_eq!(fill_levels(&statuses), vec![900]);
}

#[test]
fn fill_bounds_are_inclusive() {
    let depot = mixed_depot();
    let mut rng = make_rng();
    let at_least = inspect(&depot, SiloFilter::MinFill(600), SiloOrder::Unordered, &mut rng);
    let at_most = inspect(&depot, SiloFilter::MaxFill(300), SiloOrder::Unordered, &mut rng);
    assert_eq!(fill_levels(&at_least), vec![600, 900]);
    assert_eq!(fill_levels(&at_most), vec![300, 0]);
}

#[test]
fn orders_by_fill_and_grain() {
    let depot = mixed_depot();
    let mut rng = make_rng();
    let by_fill = inspect(&depot, SiloFilter::All, SiloOrder::FillLevel, &mut rng);
    assert_eq!(fill_levels(&by_fill), vec![0, 300, 600, 900]);

    let by_grain = inspect(&depot, SiloFilter::All, SiloOrder::Grain, &mut rng);
    let grains: Vec<Option<GrainType>> = by_grain.iter().map(|s| s.grain_type).collect();
    assert_eq!(
        grains,
        vec![
            None,
            Some(GrainType::Barley),
            Some(GrainType::Corn),
            Some(GrainType::Wheat)
        ]
    );
}

#[test]
fn capacity_order_is_stable() {
    let mut depot = mixed_depot();
    depot.expand(1, 200).unwrap();
    let mut rng = make_rng();
    let statuses = inspect(&depot, SiloFilter::All, SiloOrder::Capacity, &mut rng);
    let capacities: Vec<u64> = statuses.iter().map(|s| s.capacity).collect();
    assert_eq!(capacities, vec![200, 1_000, 1_000, 1_000, 1_000]);
    // Equal capacities keep depot order.
    let tail: Vec<u64> = fill_levels(&statuses).into_iter().skip(1).collect();
    let depot_order: Vec<u64> = fill_levels(&depot.statuses()).into_iter().take(4).collect();
    assert_eq!(tail, depot_order);
}

#[test]
fn random_order_is_a_seeded_permutation() {
    let depot = mixed_depot();
    let first = inspect(&depot, SiloFilter::All, SiloOrder::Random, &mut make_rng());
    let again = inspect(&depot, SiloFilter::All, SiloOrder::Random, &mut make_rng());
    assert_eq!(first, again);

    let mut sorted = fill_levels(&first);
    sorted.sort_unstable();
    assert_eq!(sorted, vec![0, 300, 600, 900]);
}

#[test]
fn inspect_leaves_depot_untouched() {
    let depot = mixed_depot();
    let before = depot.snapshot();
    let mut rng = make_rng();
    let _ = inspect(&depot, SiloFilter::MinFill(1), SiloOrder::FillLevel, &mut rng);
    assert_eq!(depot.snapshot(), before);
}

#[test]
fn render_lists_each_silo() {
    let depot = mixed_depot();
    let text = render_statuses(&depot.statuses());
    assert_eq!(text.matches("Silo ").count(), 4);
    assert!(text.contains("Silo 2: CORN\nAmount of Grain: 900 units\n"));
    assert!(text.contains("|==================--| 90.00% filled"));
    assert!(text.contains("|--------------------| 0.00% filled"));
}
