use serde_json::json;
use shadowlight_lib::{
    audit, contrast_ratio, effective_background, remediate, revert, Color, ContrastThresholds,
    Document, DomSnapshot, NodeAccess,
};

fn document(value: serde_json::Value) -> Document {
    let snapshot: DomSnapshot = serde_json::from_value(value).expect("valid snapshot json");
    Document::from_snapshot(snapshot).expect("consistent snapshot")
}

/// body > main(transparent) > [banner(yellow) > headline, form > field, submit, hidden]
fn landing_page() -> Document {
    document(json!({
        "url": "https://shop.example.com/",
        "nodes": [
            { "id": "body", "tag": "body", "children": ["main"],
              "computedStyle": { "backgroundColor": "rgb(255, 255, 255)", "color": "rgb(0, 0, 0)" } },
            { "id": "main", "tag": "main", "parent": "body", "children": ["banner", "form"],
              "computedStyle": { "backgroundColor": "rgba(0, 0, 0, 0)" } },
            { "id": "banner", "tag": "section", "parent": "main", "children": ["headline"],
              "computedStyle": { "backgroundColor": "rgb(255, 255, 0)" } },
            { "id": "headline", "tag": "h1", "parent": "banner", "text": "Summer sale",
              "computedStyle": { "color": "rgb(255, 255, 255)", "backgroundColor": "transparent",
                                 "fontSize": 16.0, "fontWeight": "400" } },
            { "id": "form", "tag": "form", "parent": "main", "children": ["field", "submit", "hidden"],
              "computedStyle": { "backgroundColor": "transparent" } },
            { "id": "field", "tag": "input", "parent": "form",
              "computedStyle": { "color": "#000000", "borderColor": "#eeeeee",
                                 "backgroundColor": "transparent", "fontSize": 16.0 } },
            { "id": "submit", "tag": "button", "parent": "form", "text": "Subscribe",
              "computedStyle": { "color": "#949494", "backgroundColor": "transparent",
                                 "borderColor": "#000000", "fontSize": 24.0 } },
            { "id": "hidden", "tag": "p", "parent": "form", "text": "Only for screen readers",
              "computedStyle": { "color": "#ffffff", "display": "none" } }
        ]
    }))
}

#[test]
fn white_text_on_yellow_becomes_near_black() {
    let mut doc = landing_page();
    let headline = doc.find("headline").unwrap();
    let bg = effective_background(&doc, headline).unwrap();
    assert_eq!(bg, Color::new(255, 255, 0));
    assert!(contrast_ratio(Color::WHITE, bg) < 1.1);

    remediate(&mut doc, &ContrastThresholds::default());

    let fixed = doc.overrides(headline).color.unwrap();
    assert_eq!(fixed, Color::NEAR_BLACK);
    assert!(contrast_ratio(fixed, bg) >= 4.5);
    assert!(doc.is_remediated(headline));
}

#[test]
fn large_gray_text_passes_relaxed_threshold() {
    let mut doc = landing_page();
    let submit = doc.find("submit").unwrap();
    remediate(&mut doc, &ContrastThresholds::default());
    // #949494 on white is about 3.03: fine for 24px text.
    assert!(doc.overrides(submit).color.is_none());
    assert!(!doc.is_remediated(submit));
}

#[test]
fn faint_input_border_is_fixed() {
    let mut doc = landing_page();
    let field = doc.find("field").unwrap();
    let report = remediate(&mut doc, &ContrastThresholds::default());

    assert_eq!(report.border_fixed, 1);
    let border = doc.overrides(field).border_color.unwrap();
    assert!(contrast_ratio(border, Color::WHITE) >= 3.0);
    assert!(doc.overrides(field).color.is_none());
}

#[test]
fn hidden_and_decorative_nodes_are_untouched() {
    let mut doc = landing_page();
    remediate(&mut doc, &ContrastThresholds::default());
    for key in ["body", "main", "banner", "form", "hidden"] {
        let id = doc.find(key).unwrap();
        assert!(doc.overrides(id).is_empty(), "{key} should be untouched");
    }
}

#[test]
fn second_pass_makes_no_further_changes() {
    let mut doc = landing_page();
    let first = remediate(&mut doc, &ContrastThresholds::default());
    let before = doc.to_snapshot();
    let second = remediate(&mut doc, &ContrastThresholds::default());

    assert_eq!(first.nodes_changed(), 2);
    assert_eq!(second.nodes_changed(), 0);
    assert_eq!(second.already_remediated, 2);
    assert_eq!(
        serde_json::to_value(before).unwrap(),
        serde_json::to_value(doc.to_snapshot()).unwrap()
    );
}

#[test]
fn remediated_snapshot_round_trips_and_reverts() {
    let mut doc = landing_page();
    remediate(&mut doc, &ContrastThresholds::default());

    let json = serde_json::to_string(&doc.to_snapshot()).unwrap();
    assert!(json.contains("\"remediated\":true"));
    assert!(json.contains("\"inlineStyle\""));

    let mut reread = Document::from_snapshot(serde_json::from_str(&json).unwrap()).unwrap();
    assert_eq!(reread.override_count(), 2);
    assert!(audit(&reread, &ContrastThresholds::default()).is_empty());

    assert_eq!(revert(&mut reread), 2);
    assert_eq!(reread.override_count(), 0);
    assert_eq!(audit(&reread, &ContrastThresholds::default()).len(), 2);
}

#[test]
fn mid_gray_background_forces_a_background_override() {
    // Neither near-black nor white reaches 4.5 against rgb(120, 120, 120).
    let mut doc = document(json!({
        "nodes": [
            { "id": "card", "tag": "div", "children": ["label"],
              "computedStyle": { "backgroundColor": "rgb(120, 120, 120)" } },
            { "id": "label", "tag": "span", "parent": "card", "text": "Details",
              "computedStyle": { "color": "rgb(130, 130, 130)", "fontSize": 14.0 } }
        ]
    }));
    let label = doc.find("label").unwrap();
    let report = remediate(&mut doc, &ContrastThresholds::default());

    assert_eq!(report.background_forced, 1);
    let overrides = *doc.overrides(label);
    let text = overrides.color.unwrap();
    let forced_bg = overrides.background_color.unwrap();
    assert!(forced_bg == Color::BLACK || forced_bg == Color::WHITE);
    assert!(contrast_ratio(text, forced_bg) >= 4.5);
}

#[test]
fn unparseable_colors_are_skipped_silently() {
    let mut doc = document(json!({
        "nodes": [
            { "id": "hero", "tag": "div", "text": "Welcome",
              "computedStyle": { "color": "var(--brand)", "backgroundColor": "#ffffff" } },
            { "id": "grad", "tag": "div", "text": "Gradient",
              "computedStyle": { "color": "#ffffff", "backgroundColor": "linear-gradient(red, blue)" } }
        ]
    }));
    let report = remediate(&mut doc, &ContrastThresholds::default());
    assert_eq!(report.nodes_changed(), 0);
    assert_eq!(doc.override_count(), 0);
}
