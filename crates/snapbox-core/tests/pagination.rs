mod common;

use snapbox_core::prelude::*;

#[test]
fn page_count_is_ceil_of_quarter() {
    let cfg = LayoutConfig::default();
    for n in 1..=13usize {
        let sizes = vec![(40, 30); n];
        let layout = layout_items(common::items(&sizes), &cfg, &Helvetica, |_| {}).expect("layout");
        assert_eq!(layout.pages.len(), n.div_ceil(4), "n={}", n);
        assert_eq!(layout.placements().count(), n);
    }
}

#[test]
fn slots_fill_left_to_right_top_to_bottom() {
    let cfg = LayoutConfig::default();
    let layout = layout_items(common::items(&[(10, 10); 6]), &cfg, &Helvetica, |_| {}).expect("layout");

    let first: Vec<SlotPosition> = layout.pages[0].placements.iter().map(|p| p.slot).collect();
    assert_eq!(first, SlotPosition::ALL.to_vec());
    let second: Vec<SlotPosition> = layout.pages[1].placements.iter().map(|p| p.slot).collect();
    assert_eq!(second, vec![SlotPosition::TopLeft, SlotPosition::TopRight]);

    // input order preserved across pages
    let keys: Vec<&str> = layout.placements().map(|p| p.key.as_str()).collect();
    assert_eq!(keys, vec!["img_0", "img_1", "img_2", "img_3", "img_4", "img_5"]);
    for (i, p) in layout.placements().enumerate() {
        assert_eq!(p.index, i);
        assert_eq!(p.page, i / 4);
    }
}

#[test]
fn fewer_than_four_leave_slots_empty() {
    let cfg = LayoutConfig::default();
    let layout = layout_items(common::items(&[(10, 20), (20, 10)]), &cfg, &Helvetica, |_| {}).expect("layout");
    assert_eq!(layout.pages.len(), 1);
    assert_eq!(layout.pages[0].placements.len(), 2);
    let stats = layout.stats();
    assert_eq!(stats.empty_slots, 2);
}

#[test]
fn slot_geometry_is_identical_on_every_page() {
    let cfg = LayoutConfig::default();
    let layout = layout_items(common::items(&[(30, 30); 12]), &cfg, &Helvetica, |_| {}).expect("layout");
    let reference: Vec<Rect> = layout.pages[0].placements.iter().map(|p| p.frame).collect();
    for page in &layout.pages[1..] {
        let frames: Vec<Rect> = page.placements.iter().map(|p| p.frame).collect();
        assert_eq!(frames, reference, "page {}", page.id);
    }
}

#[test]
fn page_records_carry_page_size() {
    let cfg = LayoutConfig::builder().page_size(PageSize::Letter).build();
    let layout = layout_items(common::items(&[(5, 5)]), &cfg, &Helvetica, |_| {}).expect("layout");
    assert_eq!((layout.pages[0].width, layout.pages[0].height), (215.9, 279.4));
    assert_eq!(layout.meta.page_size, (215.9, 279.4));
    assert_eq!(layout.meta.unit, "mm");
}

#[test]
fn empty_input_is_rejected() {
    let cfg = LayoutConfig::default();
    let r = layout_items(Vec::<LayoutItem<String>>::new(), &cfg, &Helvetica, |_| {});
    assert!(matches!(r, Err(SnapBoxError::Empty)));
}
