use flowdeploy::hierarchy::{FlowRecord, Hierarchy};
use flowdeploy::path::{
    auto_select_path, calculate_level, match_positions, select_matching_path, synthesize_path,
    CandidatePath, PathConfig, PathConfigSet,
};
use flowdeploy::types::Side;
use proptest::prelude::*;

fn segs(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|s| s.to_string()).collect()
}

fn hierarchy() -> Hierarchy {
    Hierarchy::from_names(["DC", "O", "OU", "CN"]).unwrap()
}

fn flow() -> FlowRecord {
    FlowRecord::builder("flow-1")
        .value("DC", "dc1", "")
        .value("O", "o1", "")
        .value("OU", "ou1", "")
        .value("CN", "cn1", "")
        .templates(Some(7), None)
        .build()
}

fn configs() -> PathConfigSet {
    PathConfigSet::new(vec![PathConfig::parse(
        "nifi-1",
        Side::Source,
        "pg-base",
        "/NiFi Flow/From DC1",
    )])
}

#[test]
fn selects_matching_path_and_derives_level() {
    let hierarchy = hierarchy();
    let configs = configs();
    let available = vec![
        CandidatePath::new("pg-o1", segs(&["NiFi Flow", "From DC1", "o1"])),
        CandidatePath::new("pg-ou1", segs(&["NiFi Flow", "From DC1", "o1", "ou1"])),
    ];

    let selected =
        auto_select_path(&hierarchy, &flow(), Side::Source, "nifi-1", &configs, &available)
            .unwrap();
    assert_eq!(selected.container_id, "pg-ou1");

    let config = configs.get("nifi-1", Side::Source).unwrap();
    assert_eq!(calculate_level(&selected.segments, config, &hierarchy), Some("OU"));
}

#[test]
fn no_infix_value_after_prefix_means_no_selection() {
    let available = vec![
        CandidatePath::new("a", segs(&["NiFi Flow", "From DC1", "o2", "ou1"])),
        CandidatePath::new("b", segs(&["NiFi Flow", "o1", "From DC1", "ou1"])),
    ];
    assert!(auto_select_path(
        &hierarchy(),
        &flow(),
        Side::Source,
        "nifi-1",
        &configs(),
        &available
    )
    .is_none());
}

#[test]
fn absent_config_or_empty_listing_yields_none() {
    let available = vec![CandidatePath::new(
        "x",
        segs(&["NiFi Flow", "From DC1", "o1", "ou1"]),
    )];
    assert!(auto_select_path(
        &hierarchy(),
        &flow(),
        Side::Destination,
        "nifi-1",
        &configs(),
        &available
    )
    .is_none());
    assert!(auto_select_path(&hierarchy(), &flow(), Side::Source, "nifi-1", &configs(), &[]).is_none());
}

#[test]
fn unrelated_segments_between_infix_values_still_match() {
    let available = vec![CandidatePath::new(
        "deep",
        segs(&["NiFi Flow", "From DC1", "shared", "o1", "misc", "ou1"]),
    )];
    let selected =
        auto_select_path(&hierarchy(), &flow(), Side::Source, "nifi-1", &configs(), &available);
    assert_eq!(selected.map(|c| c.container_id.as_str()), Some("deep"));
}

#[test]
fn first_match_in_listing_order_wins() {
    let prefix = segs(&["root"]);
    let infix = segs(&["x"]);
    let candidates = vec![
        CandidatePath::new("second-listed-shorter", segs(&["root", "x"])),
        CandidatePath::new("later", segs(&["root", "y", "x"])),
    ];
    let selected = select_matching_path(&prefix, &infix, &candidates).unwrap();
    assert_eq!(selected.container_id, "second-listed-shorter");
}

#[test]
fn synthesized_path_maps_to_level_after_infix() {
    let hierarchy = hierarchy();
    let config = PathConfig::parse("nifi-1", Side::Source, "pg-base", "/NiFi Flow/From DC1");
    let path = synthesize_path(&config.segments, &segs(&["o1", "ou1"]));
    assert_eq!(path, segs(&["NiFi Flow", "From DC1", "o1", "ou1"]));
    assert_eq!(calculate_level(&path, &config, &hierarchy), Some("OU"));
}

fn segment() -> impl Strategy<Value = String> {
    "[a-c]{1,2}"
}

proptest! {
    #[test]
    fn accepted_candidates_keep_prefix_and_order(
        prefix in proptest::collection::vec(segment(), 0..3),
        infix in proptest::collection::vec(segment(), 0..3),
        candidates in proptest::collection::vec(proptest::collection::vec(segment(), 0..7), 0..8),
    ) {
        for segments in &candidates {
            if let Some(positions) = match_positions(segments, &prefix, &infix) {
                prop_assert!(segments.len() >= prefix.len());
                prop_assert_eq!(&segments[..prefix.len()], &prefix[..]);
                prop_assert_eq!(positions.len(), infix.len());
                for (position, wanted) in positions.iter().zip(&infix) {
                    prop_assert!(*position >= prefix.len());
                    prop_assert_eq!(&segments[*position], wanted);
                }
                prop_assert!(positions.windows(2).all(|w| w[0] < w[1]));
            }
        }
    }

    #[test]
    fn synthesized_paths_always_match_themselves(
        prefix in proptest::collection::vec(segment(), 0..3),
        infix in proptest::collection::vec(segment(), 0..3),
    ) {
        let path = synthesize_path(&prefix, &infix);
        prop_assert!(match_positions(&path, &prefix, &infix).is_some());
    }

    #[test]
    fn level_round_trip(k in 1usize..4) {
        let hierarchy = hierarchy();
        let config = PathConfig::parse("nifi-1", Side::Source, "pg", "/NiFi Flow/From DC1");
        let infix: Vec<String> = (0..k).map(|i| format!("v{}", i)).collect();
        let path = synthesize_path(&config.segments, &infix);
        let expected = hierarchy.level_at(k).map(|l| l.name.as_str());
        prop_assert_eq!(calculate_level(&path, &config, &hierarchy), expected);
    }
}
