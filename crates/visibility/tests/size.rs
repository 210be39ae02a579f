#![allow(clippy::unwrap_used, reason = "tests")]

use dom::{DOM, NodeKey};
use visibility::{HiddenReason, Rect, Verdict, VisibilityEvaluator};

fn page() -> (DOM, NodeKey) {
    let _ = env_logger::builder().is_test(true).try_init();
    let dom = DOM::html_page(800.0, 600.0).unwrap();
    let body = dom.body().unwrap();
    (dom, body)
}

fn positive(dom: &DOM, element: NodeKey) -> bool {
    VisibilityEvaluator::new(dom).has_positive_size(element).unwrap()
}

fn verdict(dom: &DOM, element: NodeKey) -> Verdict {
    VisibilityEvaluator::new(dom).evaluate(element).unwrap()
}

#[test]
fn zero_sized_box_with_sized_child_counts() {
    let (mut dom, body) = page();
    let wrapper = dom.create_element(body, "div").unwrap();
    let child = dom.create_element(wrapper, "div").unwrap();
    dom.set_rect(child, Rect::new(0.0, 0.0, 30.0, 30.0)).unwrap();

    assert!(positive(&dom, wrapper));
    assert_eq!(verdict(&dom, wrapper), Verdict::Visible);

    dom.set_style(wrapper, "overflow", "hidden").unwrap();
    assert!(!positive(&dom, wrapper));
    assert_eq!(
        verdict(&dom, wrapper),
        Verdict::Hidden(HiddenReason::ZeroSize)
    );
}

#[test]
fn one_hidden_axis_still_lets_children_count() {
    let (mut dom, body) = page();
    let wrapper = dom.create_element(body, "div").unwrap();
    dom.set_style(wrapper, "overflow-x", "hidden").unwrap();
    let child = dom.create_element(wrapper, "div").unwrap();
    dom.set_rect(child, Rect::new(0.0, 0.0, 30.0, 30.0)).unwrap();

    assert!(positive(&dom, wrapper));
}

#[test]
fn text_gives_a_box_size() {
    let (mut dom, body) = page();
    let paragraph = dom.create_element(body, "p").unwrap();
    assert!(!positive(&dom, paragraph));

    dom.create_text(paragraph, "words").unwrap();
    assert!(positive(&dom, paragraph));
}

#[test]
fn size_is_found_at_any_depth() {
    let (mut dom, body) = page();
    let outer = dom.create_element(body, "div").unwrap();
    let middle = dom.create_element(outer, "span").unwrap();
    dom.create_comment(middle, "not content").unwrap();
    assert!(!positive(&dom, outer));

    let leaf = dom.create_element(middle, "img").unwrap();
    dom.set_rect(leaf, Rect::new(5.0, 5.0, 1.0, 1.0)).unwrap();
    assert!(positive(&dom, outer));
}

#[test]
fn clipped_box_with_a_visible_child_is_not_hidden_by_overflow() {
    let (mut dom, body) = page();
    let clipper = dom.create_element(body, "div").unwrap();
    dom.set_rect(clipper, Rect::new(0.0, 0.0, 100.0, 100.0)).unwrap();
    dom.set_style(clipper, "overflow", "hidden").unwrap();
    let element = dom.create_element(clipper, "div").unwrap();
    dom.set_rect(element, Rect::new(150.0, 0.0, 10.0, 10.0)).unwrap();
    let child = dom.create_element(element, "div").unwrap();
    dom.set_rect(child, Rect::new(20.0, 20.0, 10.0, 10.0)).unwrap();

    assert_eq!(verdict(&dom, element), Verdict::Visible);
    assert_eq!(verdict(&dom, child), Verdict::Visible);

    dom.set_rect(child, Rect::default()).unwrap();
    assert_eq!(
        verdict(&dom, element),
        Verdict::Hidden(HiddenReason::ClippedByOverflow)
    );
}
