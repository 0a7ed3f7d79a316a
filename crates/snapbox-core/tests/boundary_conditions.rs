use snapbox_core::config::{LayoutConfig, PageSize};
use snapbox_core::error::SnapBoxError;
use snapbox_core::{Helvetica, LayoutItem, layout_items};

/// Test zero-sized page
#[test]
fn test_zero_width_page() {
    let cfg = LayoutConfig {
        page_size: PageSize::Custom {
            width: 0.0,
            height: 297.0,
        },
        ..Default::default()
    };

    match cfg.validate() {
        Err(SnapBoxError::InvalidPageSize { width, height }) => {
            assert_eq!(width, 0.0);
            assert_eq!(height, 297.0);
        }
        other => panic!("Expected InvalidPageSize error, got {:?}", other),
    }
}

#[test]
fn test_nan_page_height() {
    let cfg = LayoutConfig {
        page_size: PageSize::Custom {
            width: 100.0,
            height: f32::NAN,
        },
        ..Default::default()
    };
    assert!(matches!(cfg.validate(), Err(SnapBoxError::InvalidPageSize { .. })));
}

/// Margins that swallow the page
#[test]
fn test_horizontal_margins_exceed_width() {
    let cfg = LayoutConfig {
        margin_x: 105.0,
        ..Default::default()
    };
    match cfg.validate() {
        Err(SnapBoxError::InvalidConfig(msg)) => assert!(msg.contains("margin_x")),
        other => panic!("Expected InvalidConfig error, got {:?}", other),
    }
}

#[test]
fn test_row_spacing_leaves_no_slot_height() {
    let cfg = LayoutConfig {
        row_spacing: 267.0,
        ..Default::default()
    };
    match cfg.validate() {
        Err(SnapBoxError::InvalidConfig(msg)) => assert!(msg.contains("slot height")),
        other => panic!("Expected InvalidConfig error, got {:?}", other),
    }
}

#[test]
fn test_negative_margin() {
    let cfg = LayoutConfig {
        margin_top: -1.0,
        ..Default::default()
    };
    match cfg.validate() {
        Err(SnapBoxError::InvalidConfig(msg)) => assert!(msg.contains("margin_top")),
        other => panic!("Expected InvalidConfig error, got {:?}", other),
    }
}

#[test]
fn test_zero_font_size() {
    let cfg = LayoutConfig {
        font_size: 0.0,
        ..Default::default()
    };
    assert!(matches!(cfg.validate(), Err(SnapBoxError::InvalidConfig(_))));
}

#[test]
fn test_zero_margins_are_valid() {
    let cfg = LayoutConfig::builder().margins(0.0, 0.0, 0.0).row_spacing(0.0).build();
    assert!(cfg.validate().is_ok());
}

/// Invalid config is reported before any layout work
#[test]
fn test_layout_validates_config() {
    let cfg = LayoutConfig {
        margin_x: 200.0,
        ..Default::default()
    };
    let items = vec![LayoutItem { key: "a", w: 10, h: 10 }];
    assert!(matches!(
        layout_items(items, &cfg, &Helvetica, |_| {}),
        Err(SnapBoxError::InvalidConfig(_))
    ));
}

#[test]
fn test_zero_sized_item() {
    let cfg = LayoutConfig::default();
    let items = vec![
        LayoutItem { key: "ok", w: 10, h: 10 },
        LayoutItem { key: "flat", w: 10, h: 0 },
    ];
    assert!(matches!(
        layout_items(items, &cfg, &Helvetica, |_| {}),
        Err(SnapBoxError::InvalidInput(_))
    ));
}

#[test]
fn test_single_pixel_image() {
    let cfg = LayoutConfig::default();
    let items = vec![LayoutItem { key: "px", w: 1, h: 1 }];
    let layout = layout_items(items, &cfg, &Helvetica, |_| {}).expect("layout");
    let p = &layout.pages[0].placements[0];
    assert_eq!(p.frame.w, p.frame.h);
    assert_eq!(p.frame.w, 95.0);
}

#[test]
fn test_config_round_trips_through_json() {
    let cfg = LayoutConfig::builder()
        .page_size(PageSize::Custom {
            width: 100.0,
            height: 150.0,
        })
        .start_number(7)
        .build();
    let s = serde_json::to_string(&cfg).expect("serialize");
    let back: LayoutConfig = serde_json::from_str(&s).expect("deserialize");
    assert_eq!(back, cfg);
}
