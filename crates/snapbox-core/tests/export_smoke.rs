use snapbox_core::prelude::*;

#[test]
fn export_json_smoke() {
    let cfg = LayoutConfig::default();
    let items = vec![
        LayoutItem { key: "a", w: 32, h: 16 },
        LayoutItem { key: "b", w: 10, h: 10 },
        LayoutItem { key: "c", w: 5, h: 50 },
        LayoutItem { key: "d", w: 7, h: 7 },
        LayoutItem { key: "e", w: 9, h: 3 },
    ];
    let layout = layout_items(items, &cfg, &Helvetica, |_| {}).expect("layout");

    let v = snapbox_core::to_json(&layout);
    let obj = v.as_object().expect("object");
    assert!(obj.contains_key("pages"));
    assert!(obj.contains_key("meta"));

    let pages = v["pages"].as_array().expect("pages");
    assert_eq!(pages.len(), 2);
    let first = &pages[0]["placements"][0];
    assert_eq!(first["key"], "a");
    assert_eq!(first["slot"], "top_left");
    assert_eq!(first["label"]["text"], "#1");
    assert_eq!(pages[1]["placements"][0]["label"]["number"], 5);
    assert_eq!(v["meta"]["app"], "snapbox");
    assert_eq!(v["meta"]["slots_per_page"], 4);

    let stats = snapbox_core::stats_json(&layout);
    assert_eq!(stats["pages"], 2);
    assert_eq!(stats["images"], 5);
    assert_eq!(stats["empty_slots"], 3);
}

#[test]
fn stats_summary_mentions_counts() {
    let cfg = LayoutConfig::builder().numbering(false).build();
    let items = vec![LayoutItem { key: "a", w: 95, h: 126 }];
    let layout = layout_items(items, &cfg, &Helvetica, |_| {}).expect("layout");
    let stats = layout.stats();
    assert_eq!(stats.num_pages, 1);
    assert_eq!(stats.num_labeled, 0);
    assert!(stats.coverage > 0.0 && stats.coverage < 1.0);
    let s = stats.summary();
    assert!(s.contains("Pages: 1"));
    assert!(s.contains("Images: 1"));
}
