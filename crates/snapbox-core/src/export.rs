use crate::model::{DocumentLayout, Rect};
use serde_json::{Value, json};

fn rect_json(r: &Rect) -> Value {
    json!({"x": r.x, "y": r.y, "w": r.w, "h": r.h})
}

/// Serialize a layout as `{ pages: [{ id, width, height, placements }], meta }`.
/// Lengths are millimetres from the page's top-left corner.
pub fn to_json<K: ToString>(layout: &DocumentLayout<K>) -> Value {
    let pages_val = layout
        .pages
        .iter()
        .map(|p| {
            let placements: Vec<Value> = p
                .placements
                .iter()
                .map(|pl| {
                    let label = pl.label.as_ref().map(|l| {
                        json!({
                            "text": l.text,
                            "number": l.number,
                            "x": l.x,
                            "y": l.y,
                            "fontSize": l.font_size,
                            "width": l.width,
                        })
                    });
                    json!({
                        "key": pl.key.to_string(),
                        "index": pl.index,
                        "slot": pl.slot,
                        "frame": rect_json(&pl.frame),
                        "scale": pl.scale,
                        "sourceSize": {"w": pl.source_size.0, "h": pl.source_size.1},
                        "label": label,
                    })
                })
                .collect();
            json!({
                "id": p.id,
                "width": p.width,
                "height": p.height,
                "placements": placements,
            })
        })
        .collect::<Vec<_>>();
    json!({"pages": pages_val, "meta": &layout.meta})
}

/// Flat usage numbers for `--export-stats`.
pub fn stats_json<K>(layout: &DocumentLayout<K>) -> Value {
    let s = layout.stats();
    json!({
        "pages": s.num_pages,
        "images": s.num_images,
        "total_page_area": s.total_page_area,
        "used_image_area": s.used_image_area,
        "coverage": s.coverage,
        "empty_slots": s.empty_slots,
        "labeled": s.num_labeled,
        "upscaled": s.num_upscaled,
    })
}
