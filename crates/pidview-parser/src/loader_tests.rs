//! Tests for loading SVG documents into scenes.

use float_cmp::assert_approx_eq;

use pidview_core::{geometry::Bounds, scene::Scene, selector::Selector};

use crate::{ErrorCode, parse};

fn load(source: &str) -> Scene {
    match parse(source) {
        Ok(scene) => scene,
        Err(err) => panic!("Expected document to load, but got error: {err}"),
    }
}

fn load_error(source: &str) -> ErrorCode {
    let err = parse(source).expect_err("Expected document to fail");
    err.diagnostics()[0]
        .code()
        .expect("loader diagnostics carry a code")
}

fn assert_bounds(b: Bounds, min_x: f32, min_y: f32, width: f32, height: f32) {
    assert_approx_eq!(f32, b.min_x(), min_x, epsilon = 1e-4);
    assert_approx_eq!(f32, b.min_y(), min_y, epsilon = 1e-4);
    assert_approx_eq!(f32, b.width(), width, epsilon = 1e-4);
    assert_approx_eq!(f32, b.height(), height, epsilon = 1e-4);
}

fn local_bounds(scene: &Scene, selector: &str) -> Bounds {
    let index = scene
        .select_first(&Selector::new(selector))
        .unwrap_or_else(|| panic!("no element matches {selector}"));
    scene
        .element(index)
        .local_bounds()
        .unwrap_or_else(|| panic!("{selector} is not measured"))
}

#[test]
fn test_root_frame_from_view_box() {
    let scene = load(r#"<svg viewBox="0 0 100 50"></svg>"#);
    assert_bounds(scene.frame(), 0.0, 0.0, 100.0, 50.0);
    assert_eq!(scene.element(scene.root()).name(), "svg");
}

#[test]
fn test_root_frame_from_dimensions() {
    let scene = load(r#"<svg width="200px" height="80"></svg>"#);
    assert_bounds(scene.frame(), 0.0, 0.0, 200.0, 80.0);
}

#[test]
fn test_view_box_wins_over_dimensions() {
    let scene = load(r#"<svg width="400" height="400" viewBox="-10 -10 20 20"/>"#);
    assert_bounds(scene.frame(), -10.0, -10.0, 20.0, 20.0);
}

#[test]
fn test_elements_in_document_order() {
    let scene = load(
        r#"<svg viewBox="0 0 10 10">
            <g id="a"><rect id="b" width="1" height="1"/></g>
            <circle id="c" r="1"/>
        </svg>"#,
    );

    let names: Vec<&str> = scene.iter().map(|(_, e)| e.name()).collect();
    assert_eq!(names, ["svg", "g", "rect", "circle"]);

    let b = scene.select_first(&Selector::new("#b")).unwrap();
    let a = scene.select_first(&Selector::new("#a")).unwrap();
    assert_eq!(scene.element(b).parent(), Some(a));
}

#[test]
fn test_nested_transform_bounds() {
    let scene = load(
        r#"<svg viewBox="0 0 100 100">
            <g id="outer" transform="translate(10,5)">
                <g id="inner" transform="scale(2)">
                    <rect id="r" x="5" y="5" width="20" height="10"/>
                </g>
            </g>
        </svg>"#,
    );

    assert_bounds(local_bounds(&scene, "#r"), 5.0, 5.0, 20.0, 10.0);
    // Container bounds are in the container's own coordinates
    assert_bounds(local_bounds(&scene, "#inner"), 5.0, 5.0, 20.0, 10.0);
    assert_bounds(local_bounds(&scene, "#outer"), 10.0, 10.0, 40.0, 20.0);

    let root = scene.element(scene.root()).local_bounds().unwrap();
    assert_bounds(root, 20.0, 15.0, 40.0, 20.0);
}

#[test]
fn test_shape_measurement() {
    let scene = load(
        r#"<svg viewBox="0 0 100 100">
            <circle id="circle" cx="10" cy="10" r="5"/>
            <ellipse id="ellipse" cx="50" cy="50" rx="10" ry="4"/>
            <line id="line" x1="30" y1="40" x2="10" y2="20"/>
            <polygon id="poly" points="0,0 10,5 5,20"/>
            <path id="path" d="M 1 2 L 11 12"/>
            <use id="use" x="3" y="4" width="5" height="6"/>
        </svg>"#,
    );

    assert_bounds(local_bounds(&scene, "#circle"), 5.0, 5.0, 10.0, 10.0);
    assert_bounds(local_bounds(&scene, "#ellipse"), 40.0, 46.0, 20.0, 8.0);
    assert_bounds(local_bounds(&scene, "#line"), 10.0, 20.0, 20.0, 20.0);
    assert_bounds(local_bounds(&scene, "#poly"), 0.0, 0.0, 10.0, 20.0);
    assert_bounds(local_bounds(&scene, "#path"), 1.0, 2.0, 10.0, 10.0);
    assert_bounds(local_bounds(&scene, "#use"), 3.0, 4.0, 5.0, 6.0);
}

#[test]
fn test_text_measurement() {
    let scene = load(
        r#"<svg viewBox="0 0 100 100">
            <text id="plain" x="10" y="30" font-size="10">PUMP</text>
            <text id="centered" x="50" y="30" text-anchor="middle">AB</text>
        </svg>"#,
    );

    // 4 glyphs * 0.6 * 10
    assert_bounds(local_bounds(&scene, "#plain"), 10.0, 20.0, 24.0, 10.0);
    // 2 glyphs * 0.6 * 16, centred on x
    assert_bounds(local_bounds(&scene, "#centered"), 40.4, 14.0, 19.2, 16.0);
}

#[test]
fn test_unmeasurable_elements() {
    let scene = load(
        r#"<svg viewBox="0 0 100 100">
            <rect id="no-size" x="1" y="1"/>
            <rect id="percent" width="50%" height="10"/>
            <text id="empty" x="1" y="1"> </text>
            <g id="empty-group"/>
        </svg>"#,
    );

    for selector in ["#no-size", "#percent", "#empty", "#empty-group"] {
        let index = scene.select_first(&Selector::new(selector)).unwrap();
        assert!(
            scene.element(index).local_bounds().is_none(),
            "{selector} should be unmeasured"
        );
    }
}

#[test]
fn test_non_rendered_subtrees() {
    let scene = load(
        r#"<svg viewBox="0 0 100 100">
            <defs><rect id="template" width="10" height="10"/></defs>
            <rect id="hidden" width="10" height="10" display="none"/>
            <rect id="shown" x="50" y="50" width="10" height="10"/>
        </svg>"#,
    );

    let template = scene.select_first(&Selector::new("#template")).unwrap();
    assert!(!scene.element(template).is_rendered());
    let hidden = scene.select_first(&Selector::new("#hidden")).unwrap();
    assert!(!scene.element(hidden).is_rendered());

    // Only the visible rect contributes to the root's bounds
    let root = scene.element(scene.root()).local_bounds().unwrap();
    assert_bounds(root, 50.0, 50.0, 10.0, 10.0);
}

#[test]
fn test_nested_svg_viewport() {
    let scene = load(
        r#"<svg viewBox="0 0 200 200">
            <svg id="inset" x="100" y="0" width="100" height="50" viewBox="0 0 20 10">
                <rect width="20" height="10"/>
            </svg>
        </svg>"#,
    );

    let inset = scene.select_first(&Selector::new("#inset")).unwrap();
    let element = scene.element(inset);
    let placed = element
        .transform()
        .apply_to_bounds(element.local_bounds().unwrap());
    assert_bounds(placed, 100.0, 0.0, 100.0, 50.0);
}

#[test]
fn test_ids_classes_and_labels() {
    let scene = load(
        r#"<svg viewBox="0 0 10 10">
            <g id="valve" class="equipment  isolation">
                <title> Isolation valve </title>
                <rect width="1" height="1"/>
            </g>
            <g id="labelled" aria-label="Feed line"><title>ignored</title></g>
        </svg>"#,
    );

    let valve = scene.select_first(&Selector::new("#valve")).unwrap();
    let classes: Vec<&str> = scene.element_classes(valve).collect();
    assert_eq!(classes, ["equipment", "isolation"]);
    assert_eq!(scene.element(valve).label(), Some("Isolation valve"));
    assert_eq!(scene.select(&Selector::new(".isolation")), vec![valve]);

    let labelled = scene.select_first(&Selector::new("#labelled")).unwrap();
    assert_eq!(scene.element(labelled).label(), Some("Feed line"));
}

#[test]
fn test_attributes_preserved() {
    let scene = load(r#"<svg viewBox="0 0 10 10"><rect id="r" fill="red" width="1" height="1"/></svg>"#);
    let r = scene.select_first(&Selector::new("#r")).unwrap();
    let element = scene.element(r);
    assert_eq!(element.attribute("fill"), Some("red"));
    assert_eq!(element.attribute("id"), Some("r"));
    let keys: Vec<&str> = element.attributes().keys().map(String::as_str).collect();
    assert_eq!(keys, ["fill", "height", "id", "width"]);
}

#[test]
fn test_invalid_transform_degrades_to_identity() {
    let scene = load(
        r#"<svg viewBox="0 0 10 10"><rect id="r" transform="wobble(3)" width="1" height="1"/></svg>"#,
    );
    let r = scene.select_first(&Selector::new("#r")).unwrap();
    assert!(scene.element(r).transform().is_identity());
}

#[test]
fn test_invalid_path_is_unmeasured() {
    let scene = load(r#"<svg viewBox="0 0 10 10"><path id="p" d="L 1 1"/></svg>"#);
    let p = scene.select_first(&Selector::new("#p")).unwrap();
    assert!(scene.element(p).local_bounds().is_none());
}

#[test]
fn test_structural_errors() {
    assert_eq!(load_error(""), ErrorCode::E004);
    assert_eq!(load_error("   "), ErrorCode::E004);
    assert_eq!(load_error(r#"<svg viewBox="0 0 1 1"><g></svg>"#), ErrorCode::E002);
    assert_eq!(load_error(r#"<svg viewBox="0 0 1 1"><g>"#), ErrorCode::E003);
    assert_eq!(
        load_error(r#"<svg viewBox="0 0 1 1"></svg><svg viewBox="0 0 1 1"></svg>"#),
        ErrorCode::E005
    );
    assert_eq!(load_error(r#"<html><body/></html>"#), ErrorCode::E100);
}

#[test]
fn test_frame_errors() {
    assert_eq!(load_error(r#"<svg></svg>"#), ErrorCode::E101);
    assert_eq!(load_error(r#"<svg width="100%" height="100%"></svg>"#), ErrorCode::E101);
    assert_eq!(load_error(r#"<svg viewBox="0 0 -10 50"></svg>"#), ErrorCode::E102);
    assert_eq!(load_error(r#"<svg viewBox="0 0 10"></svg>"#), ErrorCode::E102);
}

#[test]
fn test_entities_decoded() {
    let scene = load(
        r#"<svg viewBox="0 0 100 100">
            <g id="V1" data-service="H&#8322;O &lt;hot&gt;"><title>A &amp; B</title>
                <text id="tag" x="0" y="10" font-size="10">P&amp;ID</text>
            </g>
        </svg>"#,
    );

    let valve = scene.select_first(&Selector::new("#V1")).unwrap();
    assert_eq!(scene.element(valve).label(), Some("A & B"));
    assert_eq!(scene.element(valve).attribute("data-service"), Some("H\u{2082}O <hot>"));

    let tag = scene.select_first(&Selector::new("#tag")).unwrap();
    assert_eq!(scene.element(tag).text(), Some("P&ID"));
    // 4 glyphs * 0.6 * 10
    assert_bounds(local_bounds(&scene, "#tag"), 0.0, 0.0, 24.0, 10.0);
}

#[test]
fn test_unknown_entity_kept_verbatim() {
    let scene = load(r#"<svg viewBox="0 0 10 10"><title>a&nbsp;b</title></svg>"#);
    assert_eq!(scene.element(scene.root()).label(), Some("a&nbsp;b"));
}

#[test]
fn test_odd_points_drop_last_coordinate() {
    let scene = load(
        r#"<svg viewBox="0 0 100 100"><polyline id="odd" points="0,0 10,5 40"/></svg>"#,
    );
    assert_bounds(local_bounds(&scene, "#odd"), 0.0, 0.0, 10.0, 5.0);
}
