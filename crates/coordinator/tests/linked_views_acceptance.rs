use analytics::{aggregate_by_faction, attribute_summary, compute_quantile_stats, QuantileSummary};
use coordinator::{CoordinatorSettings, DispatchOutcome, SelectionCoordinator};
use entry_store::{EntryStore, PartyRecord};
use shared::{
    attributes::Attribute,
    domain::{PartyId, PartySet, ViewId, Year},
    protocol::{StoreChange, ViewCommand},
};

fn dataset() -> Vec<PartyRecord> {
    let mut rows = Vec::new();
    for (year, shift) in [(1999, 0.0), (2002, 0.5), (2006, 1.0)] {
        for party_id in 1..=4 {
            rows.push(
                PartyRecord::new(party_id, year)
                    .party(format!("P{party_id}"))
                    .country(party_id % 2 + 1)
                    .family(if party_id <= 2 { 1 } else { 4 })
                    .value(Attribute::Lrgen, party_id as f64 + shift),
            );
        }
    }
    rows
}

fn session() -> SelectionCoordinator {
    let mut store = EntryStore::new();
    store.load(dataset()).expect("load dataset");
    SelectionCoordinator::new(store, &CoordinatorSettings::default())
}

fn ids(raw: &[i64]) -> PartySet {
    raw.iter().copied().map(PartyId).collect()
}

#[test]
fn year_filter_and_point_hover_scenario() {
    let mut coordinator = session();
    coordinator.set_year(Year(2002));

    let rows = coordinator.table().entries_in_active_year();
    assert_eq!(rows.len(), 4);
    assert!(rows.iter().all(|entry| entry.year == Year(2002)));
    let party_one: Vec<_> = coordinator
        .entries_in_year(Year(2002))
        .into_iter()
        .filter(|entry| entry.party_id == PartyId(1))
        .collect();
    assert_eq!(party_one.len(), 1);

    coordinator
        .set_hover_single(PartyId(1), Year(2002), true)
        .expect("hover");
    let hovered: Vec<_> = coordinator
        .entries()
        .iter()
        .filter(|entry| entry.hovered)
        .map(|entry| entry.key())
        .collect();
    assert_eq!(hovered, vec![(PartyId(1), Year(2002))]);
}

#[test]
fn scripted_session_notifies_every_queue_subscriber() {
    let mut coordinator = session();
    let (tx, rx) = crossbeam_channel::unbounded();
    coordinator.subscribe_channel(tx);

    let script = r#"[
        { "type": "set_mode", "payload": { "view_id": "scatter", "mode": "brush" } },
        { "type": "set_mode", "payload": { "view_id": "parallel", "mode": "brush" } },
        { "type": "brush", "payload": { "view_id": "scatter", "selection": [1, 2, 3] } },
        { "type": "brush", "payload": { "view_id": "parallel", "selection": [2, 3, 4] } },
        { "type": "hover", "payload": {
            "source": "radviz",
            "target": { "kind": "aggregate", "key": "faction_4" },
            "on": true
        } },
        { "type": "brush", "payload": { "view_id": "scatter", "selection": null } }
    ]"#;
    let commands: Vec<ViewCommand> = serde_json::from_str(script).expect("script");
    let outcomes: Vec<DispatchOutcome> = commands
        .into_iter()
        .map(|command| coordinator.dispatch(command).expect("dispatch"))
        .collect();

    assert!(matches!(outcomes[0], DispatchOutcome::ModeChanged { .. }));
    assert!(outcomes[2..]
        .iter()
        .all(|outcome| *outcome == DispatchOutcome::Applied));
    assert_eq!(coordinator.canonical_selection(), Some(&ids(&[2, 3, 4])));
    assert_eq!(coordinator.table().brushed_count(), 9);
    // faction 4 holds parties 3 and 4 in every year
    assert_eq!(coordinator.table().hovered_count(), 6);

    let changes: Vec<StoreChange> = rx.try_iter().collect();
    assert_eq!(changes.len(), 4);
    assert_eq!(changes[1], StoreChange::BrushChanged { brushed: 6 });
    assert_eq!(changes[2], StoreChange::HoverChanged { hovered: 6 });
}

#[test]
fn summaries_follow_the_brush() {
    let mut coordinator = session();
    coordinator.set_year(Year(1999));
    coordinator
        .apply_brush(&ViewId::new("radviz"), Some(ids(&[2, 3, 4])))
        .expect("brush");

    let rows = coordinator.table().entries_in_active_year();
    let all = attribute_summary(rows.iter().copied(), Attribute::Lrgen, false);
    let brushed = attribute_summary(rows.iter().copied(), Attribute::Lrgen, true);
    assert_eq!(all.stats().map(|stats| stats.min), Some(1.0));
    assert_eq!(brushed.stats().map(|stats| stats.median), Some(3.0));
    assert_eq!(
        attribute_summary(rows.iter().copied(), Attribute::Vote, false),
        QuantileSummary::NoData
    );

    let factions = aggregate_by_faction(rows.iter().copied(), &[Attribute::Lrgen]);
    let means: Vec<_> = factions
        .iter()
        .map(|group| (group.key.to_string(), group.value(Attribute::Lrgen)))
        .collect();
    assert_eq!(
        means,
        vec![
            ("faction_1".to_string(), Some(1.5)),
            ("faction_4".to_string(), Some(3.5))
        ]
    );
}

#[test]
fn quantile_reference_values() {
    let stats = compute_quantile_stats((1..=8).map(f64::from));
    let stats = stats.stats().copied().expect("stats");
    assert_eq!(
        (stats.min, stats.q1, stats.median, stats.q3, stats.max),
        (1.0, 2.75, 4.5, 6.25, 8.0)
    );
}
